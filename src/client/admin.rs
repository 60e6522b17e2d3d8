//! App-level operations: identity, server utilities, type registry, app
//! settings, votes, reindexing, validation constraints and resource
//! permissions.

use serde_json::{json, Value};

use super::StrataClient;
use crate::constraint::Constraint;
use crate::errors::ClientResult;
use crate::object::GenericObject;
use crate::request::{urlenc, Operation};

impl StrataClient {
    // =========================================================================
    // Identity & server info
    // =========================================================================

    /// The user or app that is currently authenticated
    pub async fn me(&self) -> ClientResult<GenericObject> {
        self.get_object(Operation::get("_me")).await
    }

    /// The app for the current access key
    pub async fn app(&self) -> ClientResult<GenericObject> {
        self.me().await
    }

    /// Version string of the backend server, `"unknown"` when unreported
    pub async fn server_version(&self) -> ClientResult<String> {
        let value = self.get_value(Operation::get("")).await?;
        Ok(value
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string())
    }

    /// Generate a new set of access/secret keys for the app. The old
    /// secret is invalid afterwards; this client keeps its construction-
    /// time credentials, so build a new client from the returned pair.
    pub async fn new_keys(&self) -> ClientResult<Value> {
        self.get_value(Operation::post("_newkeys")).await
    }

    /// All registered types, plural to singular
    pub async fn types(&self) -> ClientResult<Value> {
        self.get_value(Operation::get("_types")).await
    }

    /// Object counts per registered type
    pub async fn types_count(&self) -> ClientResult<Value> {
        self.get_value(Operation::get("_types").param("count", "true"))
            .await
    }

    // =========================================================================
    // Server-side utilities
    // =========================================================================

    /// A new server-generated unique id
    pub async fn new_id(&self) -> ClientResult<String> {
        self.get_string(Operation::get("utils/newid")).await
    }

    /// The server's current timestamp, epoch millis
    pub async fn server_timestamp(&self) -> ClientResult<i64> {
        let value = self.get_value(Operation::get("utils/timestamp")).await?;
        Ok(value.as_i64().unwrap_or(0))
    }

    /// Format the current date server-side
    pub async fn format_date(&self, format: &str, locale: Option<&str>) -> ClientResult<String> {
        let mut op = Operation::get("utils/formatdate").param("format", format);
        if let Some(locale) = locale {
            op = op.param("locale", locale);
        }
        self.get_string(op).await
    }

    /// Replace spaces in a string with a replacement token
    pub async fn no_spaces(&self, string: &str, replacement: &str) -> ClientResult<String> {
        self.get_string(
            Operation::get("utils/nospaces")
                .param("string", string)
                .param("replacement", replacement),
        )
        .await
    }

    /// Strip symbols, punctuation and control characters from a string
    pub async fn strip_and_trim(&self, string: &str) -> ClientResult<String> {
        self.get_string(Operation::get("utils/nosymbols").param("string", string))
            .await
    }

    /// Convert Markdown to HTML
    pub async fn markdown_to_html(&self, markdown: &str) -> ClientResult<String> {
        self.get_string(Operation::get("utils/md2html").param("md", markdown))
            .await
    }

    /// Human-readable description of a time delta in millis, e.g. `"5m"`
    pub async fn approximately(&self, delta_ms: i64) -> ClientResult<String> {
        self.get_string(Operation::get("utils/timeago").param("delta", &delta_ms.to_string()))
            .await
    }

    pub(crate) async fn get_string(&self, operation: Operation) -> ClientResult<String> {
        let value = self.get_value(operation).await?;
        Ok(match value {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    // =========================================================================
    // App settings
    // =========================================================================

    /// All app settings, or the value of one setting
    pub async fn app_settings(&self, key: Option<&str>) -> ClientResult<Value> {
        let path = match key {
            Some(key) if !key.trim().is_empty() => format!("_settings/{}", urlenc(key)),
            _ => "_settings".to_string(),
        };
        self.get_value(Operation::get(&path)).await
    }

    /// Add or overwrite one app setting
    pub async fn add_app_setting(&self, key: &str, value: Value) -> ClientResult<()> {
        if key.trim().is_empty() {
            return Ok(());
        }
        let path = format!("_settings/{}", urlenc(key));
        self.invoke(Operation::put(&path).body(json!({ "value": value })))
            .await?;
        Ok(())
    }

    /// Overwrite all app settings
    pub async fn set_app_settings(&self, settings: Value) -> ClientResult<()> {
        self.invoke(Operation::put("_settings").body(settings)).await?;
        Ok(())
    }

    /// Remove one app setting
    pub async fn remove_app_setting(&self, key: &str) -> ClientResult<()> {
        if key.trim().is_empty() {
            return Ok(());
        }
        let path = format!("_settings/{}", urlenc(key));
        self.invoke_delete(&path, Vec::new()).await?;
        Ok(())
    }

    // =========================================================================
    // Votes & index maintenance
    // =========================================================================

    /// Register an upvote on an object by a voter
    pub async fn vote_up(&self, object: &GenericObject, voter_id: &str) -> ClientResult<bool> {
        self.vote(object, voter_id, "_voteup").await
    }

    /// Register a downvote on an object by a voter
    pub async fn vote_down(&self, object: &GenericObject, voter_id: &str) -> ClientResult<bool> {
        self.vote(object, voter_id, "_votedown").await
    }

    async fn vote(
        &self,
        object: &GenericObject,
        voter_id: &str,
        direction: &str,
    ) -> ClientResult<bool> {
        if voter_id.is_empty() {
            return Ok(false);
        }
        let value = self
            .get_value(
                Operation::patch(&object.object_uri()).body(json!({ direction: voter_id })),
            )
            .await?;
        Ok(!value.is_null())
    }

    /// Rebuild the entire search index, optionally into a different index
    pub async fn rebuild_index(&self, destination: Option<&str>) -> ClientResult<Value> {
        let mut op = Operation::post("_reindex");
        if let Some(destination) = destination {
            op = op.param("destinationIndex", destination);
        }
        self.get_value(op).await
    }

    // =========================================================================
    // Validation constraints
    // =========================================================================

    /// Validation constraints for one type, or for all types
    pub async fn validation_constraints(&self, object_type: &str) -> ClientResult<Value> {
        let path = format!("_constraints/{}", urlenc(object_type));
        self.get_value(Operation::get(&path)).await
    }

    /// Attach a constraint to a field of a type
    pub async fn add_validation_constraint(
        &self,
        object_type: &str,
        field: &str,
        constraint: &Constraint,
    ) -> ClientResult<Value> {
        let path = format!(
            "_constraints/{}/{}/{}",
            urlenc(object_type),
            field,
            constraint.name
        );
        self.get_value(Operation::put(&path).body(constraint.payload.clone()))
            .await
    }

    /// Remove a named constraint from a field of a type
    pub async fn remove_validation_constraint(
        &self,
        object_type: &str,
        field: &str,
        constraint_name: &str,
    ) -> ClientResult<Value> {
        let path = format!(
            "_constraints/{}/{}/{}",
            urlenc(object_type),
            field,
            constraint_name
        );
        self.get_value(Operation::delete(&path)).await
    }

    // =========================================================================
    // Resource permissions
    // =========================================================================

    /// Permissions for one subject, or for all subjects
    pub async fn resource_permissions(&self, subject_id: Option<&str>) -> ClientResult<Value> {
        let path = match subject_id {
            Some(subject) => format!("_permissions/{}", urlenc(subject)),
            None => "_permissions".to_string(),
        };
        self.get_value(Operation::get(&path)).await
    }

    /// Allow a subject to call the given HTTP methods on a resource.
    /// With `allow_guests` and the wildcard subject, unauthenticated
    /// requests pass too.
    pub async fn grant_resource_permission(
        &self,
        subject_id: &str,
        resource_path: &str,
        methods: &[&str],
        allow_guests: bool,
    ) -> ClientResult<Value> {
        let mut permission: Vec<String> = methods.iter().map(|m| m.to_string()).collect();
        if allow_guests && subject_id == "*" {
            permission.push("?".to_string());
        }
        let path = format!(
            "_permissions/{}/{}",
            urlenc(subject_id),
            urlenc(resource_path)
        );
        self.get_value(Operation::put(&path).body(json!(permission)))
            .await
    }

    /// Revoke a subject's access to one resource
    pub async fn revoke_resource_permission(
        &self,
        subject_id: &str,
        resource_path: &str,
    ) -> ClientResult<Value> {
        let path = format!(
            "_permissions/{}/{}",
            urlenc(subject_id),
            urlenc(resource_path)
        );
        self.get_value(Operation::delete(&path)).await
    }

    /// Revoke all permissions for a subject
    pub async fn revoke_all_resource_permissions(
        &self,
        subject_id: &str,
    ) -> ClientResult<Value> {
        let path = format!("_permissions/{}", urlenc(subject_id));
        self.get_value(Operation::delete(&path)).await
    }

    /// Check whether a subject may call a method on a resource
    pub async fn is_allowed_to(
        &self,
        subject_id: &str,
        resource_path: &str,
        http_method: &str,
    ) -> ClientResult<bool> {
        let path = format!(
            "_permissions/{}/{}/{}",
            urlenc(subject_id),
            urlenc(resource_path),
            http_method
        );
        match self.get_value(Operation::get(&path)).await {
            Ok(value) => Ok(value.as_bool().unwrap_or(!value.is_null())),
            Err(crate::errors::ClientError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
