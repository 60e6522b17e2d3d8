//! Relationship operations: many-to-many links between objects and
//! one-to-many parent/child traversal. Only the link records are touched;
//! the linked objects themselves are never modified.

use serde_json::Value;

use super::StrataClient;
use crate::errors::{ClientError, ClientResult};
use crate::object::GenericObject;
use crate::pager::{Page, Pager};
use crate::request::{urlenc, Operation};
use crate::response::Decoded;

impl StrataClient {
    fn links_path(object: &GenericObject) -> ClientResult<String> {
        match object.id.as_deref() {
            Some(id) if !id.is_empty() => Ok(format!("{}/links", object.object_uri())),
            _ => Err(ClientError::invalid_input(
                object.object_uri(),
                "object id is required for link operations",
            )),
        }
    }

    /// Link another object to this one in a many-to-many relationship.
    /// Returns the id of the link record, when the server reports one.
    pub async fn link(
        &self,
        object: &GenericObject,
        id2: &str,
    ) -> ClientResult<Option<String>> {
        let path = format!("{}/{}", Self::links_path(object)?, urlenc(id2));
        match self.invoke(Operation::post(&path)).await? {
            Decoded::Json(Value::String(id)) => Ok(Some(id)),
            Decoded::Json(value) => Ok(value
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string)),
            Decoded::Empty => Ok(None),
        }
    }

    /// Remove the link between two objects. Objects are left untouched.
    pub async fn unlink(
        &self,
        object: &GenericObject,
        type2: &str,
        id2: &str,
    ) -> ClientResult<()> {
        let path = format!(
            "{}/{}/{}",
            Self::links_path(object)?,
            urlenc(type2),
            urlenc(id2)
        );
        self.invoke_delete(&path, Vec::new()).await?;
        Ok(())
    }

    /// Remove every link this object participates in
    pub async fn unlink_all(&self, object: &GenericObject) -> ClientResult<()> {
        let path = Self::links_path(object)?;
        self.invoke_delete(&path, Vec::new()).await?;
        Ok(())
    }

    /// Check whether two objects are linked
    pub async fn is_linked(
        &self,
        object: &GenericObject,
        type2: &str,
        id2: &str,
    ) -> ClientResult<bool> {
        let path = format!(
            "{}/{}/{}",
            Self::links_path(object)?,
            urlenc(type2),
            urlenc(id2)
        );
        match self.invoke_get(&path, Vec::new()).await {
            Ok(Decoded::Json(Value::Bool(linked))) => Ok(linked),
            Ok(Decoded::Json(Value::Null)) | Ok(Decoded::Empty) => Ok(false),
            Ok(Decoded::Json(_)) => Ok(true),
            Err(ClientError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Check whether this object is linked to another object. An object
    /// without an id cannot be linked, so the answer is `false`.
    pub async fn is_linked_to(
        &self,
        object: &GenericObject,
        other: &GenericObject,
    ) -> ClientResult<bool> {
        match other.id.as_deref() {
            Some(id) if !id.is_empty() => self.is_linked(object, &other.object_type, id).await,
            _ => Ok(false),
        }
    }

    /// All objects of a type linked to this one
    pub async fn linked_objects(
        &self,
        object: &GenericObject,
        type2: &str,
        pager: Option<&mut Pager>,
    ) -> ClientResult<Page> {
        let path = format!("{}/{}", Self::links_path(object)?, urlenc(type2));
        let params = pager.as_deref().map(Pager::to_params).unwrap_or_default();
        self.get_page(Operation::get(&path).params(params), pager).await
    }

    /// Search through the objects linked to this one
    pub async fn find_linked_objects(
        &self,
        object: &GenericObject,
        type2: &str,
        field: &str,
        query: &str,
        pager: Option<&mut Pager>,
    ) -> ClientResult<Page> {
        let path = format!("{}/{}", Self::links_path(object)?, urlenc(type2));
        let mut params = pager.as_deref().map(Pager::to_params).unwrap_or_default();
        params.push(("field".to_string(), field.to_string()));
        params.push(("q".to_string(), query.to_string()));
        self.get_page(Operation::get(&path).params(params), pager).await
    }

    /// Number of links between this object and objects of another type
    pub async fn count_links(
        &self,
        object: &GenericObject,
        type2: &str,
    ) -> ClientResult<u64> {
        let path = format!("{}/{}", Self::links_path(object)?, urlenc(type2));
        let params = vec![("count".to_string(), "true".to_string())];
        let mut pager = Pager::default();
        self.get_page(Operation::get(&path).params(params), Some(&mut pager))
            .await?;
        Ok(pager.count.unwrap_or(0))
    }

    /// Child objects connected to this one via their `parentid` field,
    /// optionally filtered on a field/term pair
    pub async fn children(
        &self,
        object: &GenericObject,
        type2: &str,
        field: Option<&str>,
        term: Option<&str>,
        pager: Option<&mut Pager>,
    ) -> ClientResult<Page> {
        let path = format!("{}/{}", Self::links_path(object)?, urlenc(type2));
        let mut params = pager.as_deref().map(Pager::to_params).unwrap_or_default();
        params.push(("childrenonly".to_string(), "true".to_string()));
        if let Some(field) = field {
            params.push(("field".to_string(), field.to_string()));
        }
        if let Some(term) = term {
            params.push(("term".to_string(), term.to_string()));
        }
        self.get_page(Operation::get(&path).params(params), pager).await
    }

    /// Search through this object's children
    pub async fn find_children(
        &self,
        object: &GenericObject,
        type2: &str,
        query: &str,
        pager: Option<&mut Pager>,
    ) -> ClientResult<Page> {
        let path = format!("{}/{}", Self::links_path(object)?, urlenc(type2));
        let mut params = pager.as_deref().map(Pager::to_params).unwrap_or_default();
        params.push(("childrenonly".to_string(), "true".to_string()));
        params.push(("q".to_string(), query.to_string()));
        self.get_page(Operation::get(&path).params(params), pager).await
    }

    /// Permanently delete all children of a type
    pub async fn delete_children(
        &self,
        object: &GenericObject,
        type2: &str,
    ) -> ClientResult<()> {
        let path = format!("{}/{}", Self::links_path(object)?, urlenc(type2));
        let params = vec![("childrenonly".to_string(), "true".to_string())];
        self.invoke_delete(&path, params).await?;
        Ok(())
    }

    /// Number of child objects of a type
    pub async fn count_children(
        &self,
        object: &GenericObject,
        type2: &str,
    ) -> ClientResult<u64> {
        let path = format!("{}/{}", Self::links_path(object)?, urlenc(type2));
        let params = vec![
            ("count".to_string(), "true".to_string()),
            ("childrenonly".to_string(), "true".to_string()),
        ];
        let mut pager = Pager::default();
        self.get_page(Operation::get(&path).params(params), Some(&mut pager))
            .await?;
        Ok(pager.count.unwrap_or(0))
    }
}
