//! # Generic Object Access API
//!
//! The public client surface: CRUD, listing, search, batch and
//! relationship operations, all composed from the same pipeline —
//! build → sign → send → decode. The client is safe for concurrent use;
//! each call reads one immutable config snapshot, so a configuration
//! change never affects a request already in flight.

mod admin;
mod batch;
mod links;
mod search;
mod tokens;

pub use batch::BatchResults;

use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;

use crate::config::{AccessToken, SessionConfig, JWT_PATH};
use crate::errors::{ClientError, ClientResult};
use crate::object::GenericObject;
use crate::pager::{Page, Pager};
use crate::request::{self, urlenc, Operation};
use crate::response::{self, Decoded};
use crate::signing::{self, Credentials};
use crate::transport::Transport;

/// Client for a remote object-persistence backend
#[derive(Debug)]
pub struct StrataClient {
    credentials: Credentials,
    config: RwLock<Arc<SessionConfig>>,
    transport: Transport,
}

impl StrataClient {
    /// Create a client with an access/secret key pair. A blank secret key
    /// switches the client to anonymous (unsigned) access.
    pub fn new(access_key: &str, secret_key: &str) -> Self {
        StrataClient {
            credentials: Credentials::new(access_key, secret_key),
            config: RwLock::new(Arc::new(SessionConfig::default())),
            transport: Transport::new(),
        }
    }

    /// The configured access key
    pub fn access_key(&self) -> String {
        self.credentials.access_key().to_string()
    }

    // =========================================================================
    // Session configuration
    // =========================================================================

    /// Current config snapshot. In-flight calls keep the snapshot they
    /// started with.
    pub(crate) fn snapshot(&self) -> Arc<SessionConfig> {
        self.config
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub(crate) fn update_config<F: FnOnce(&mut SessionConfig)>(&self, mutate: F) {
        let mut guard = self.config.write().unwrap_or_else(|e| e.into_inner());
        let mut next = (**guard).clone();
        mutate(&mut next);
        *guard = Arc::new(next);
    }

    /// Set the API endpoint URL. Takes effect on the next call.
    pub fn set_endpoint(&self, endpoint: &str) -> ClientResult<()> {
        let mut guard = self.config.write().unwrap_or_else(|e| e.into_inner());
        let mut next = (**guard).clone();
        next.set_endpoint(endpoint)?;
        *guard = Arc::new(next);
        Ok(())
    }

    /// The configured endpoint URL
    pub fn endpoint(&self) -> String {
        self.snapshot().endpoint.to_string()
    }

    /// Set the API version path, e.g. `"/v2/"`
    pub fn set_api_path(&self, path: &str) {
        self.update_config(|c| c.set_api_path(path));
    }

    /// The configured API version path
    pub fn api_path(&self) -> String {
        self.snapshot().api_path.clone()
    }

    /// Set the per-request timeout
    pub fn set_timeout(&self, timeout: Duration) {
        self.update_config(|c| c.timeout = timeout);
    }

    /// Install a bearer access token; subsequent requests skip signing and
    /// send the token instead
    pub fn set_access_token(&self, token: &str) -> ClientResult<()> {
        let parsed = AccessToken::parse(token)?;
        self.update_config(|c| c.access_token = Some(parsed.clone()));
        Ok(())
    }

    /// The configured bearer token, if any
    pub fn access_token(&self) -> Option<String> {
        self.snapshot().access_token.as_ref().map(|t| t.token.clone())
    }

    /// Drop the bearer token from memory; signing resumes on the next call
    pub fn clear_access_token(&self) {
        self.update_config(|c| c.access_token = None);
    }

    // =========================================================================
    // Request pipeline
    // =========================================================================

    /// Run one logical call: snapshot config, build, sign, send, decode
    pub(crate) async fn invoke(&self, operation: Operation) -> ClientResult<Decoded> {
        if !operation.path.starts_with(JWT_PATH) {
            Box::pin(self.refresh_token_if_due()).await;
        }
        let config = self.snapshot();
        let unsigned = request::build(&operation, &config)?;
        let path = unsigned.resource_path.clone();
        let token = config.access_token.as_ref().map(|t| t.token.clone());
        let signed = signing::authorize(unsigned, &self.credentials, token.as_deref(), Utc::now())?;
        let raw = self.transport.send(signed, config.timeout).await?;
        response::decode(raw.status, &path, &raw.body)
    }

    pub(crate) async fn invoke_get(
        &self,
        path: &str,
        params: Vec<(String, String)>,
    ) -> ClientResult<Decoded> {
        self.invoke(Operation::get(path).params(params)).await
    }

    pub(crate) async fn invoke_delete(
        &self,
        path: &str,
        params: Vec<(String, String)>,
    ) -> ClientResult<Decoded> {
        self.invoke(Operation::delete(path).params(params)).await
    }

    /// Invoke and decode a single object from the response
    pub(crate) async fn get_object(&self, operation: Operation) -> ClientResult<GenericObject> {
        let path = operation.path.clone();
        match self.invoke(operation).await? {
            Decoded::Json(value) => response::into_object(value, &path),
            Decoded::Empty => Err(ClientError::Decode {
                status: 200,
                path,
                message: "expected an object, got an empty body".to_string(),
            }),
        }
    }

    /// Invoke and decode the JSON value of the response, `Null` for empty
    pub(crate) async fn get_value(&self, operation: Operation) -> ClientResult<Value> {
        Ok(self.invoke(operation).await?.into_json().unwrap_or(Value::Null))
    }

    /// Invoke and decode a page of objects, updating the pager
    pub(crate) async fn get_page(
        &self,
        operation: Operation,
        pager: Option<&mut Pager>,
    ) -> ClientResult<Page> {
        match self.invoke(operation).await? {
            Decoded::Json(value) => Ok(response::into_page(&value, "items", pager)),
            Decoded::Empty => Ok(Page::default()),
        }
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Persist an object. With both type and id set this is a full
    /// replacement (`PUT`); otherwise the server assigns an id (`POST`).
    /// Returns the stored object including server-populated fields.
    pub async fn create(&self, object: &GenericObject) -> ClientResult<GenericObject> {
        if object.object_type.is_empty() {
            return Err(ClientError::invalid_input(
                object.object_uri(),
                "object type is required for create",
            ));
        }
        let operation = if object.id.as_deref().is_some_and(|id| !id.is_empty()) {
            Operation::put(&object.object_uri()).body(object.to_value())
        } else {
            Operation::post(&urlenc(&object.object_type)).body(object.to_value())
        };
        self.get_object(operation).await
    }

    /// Retrieve an object by type and id. Absence is a `NotFound` error;
    /// use [`read_opt`](Self::read_opt) for the soft variant.
    pub async fn read(&self, object_type: &str, id: &str) -> ClientResult<GenericObject> {
        if id.is_empty() {
            return Err(ClientError::invalid_input(
                format!("/{}", urlenc(object_type)),
                "id is required for read",
            ));
        }
        let path = if object_type.is_empty() {
            format!("_id/{}", urlenc(id))
        } else {
            format!("{}/{}", urlenc(object_type), urlenc(id))
        };
        self.get_object(Operation::get(&path)).await
    }

    /// Retrieve an object, treating absence as `None` instead of an error
    pub async fn read_opt(
        &self,
        object_type: &str,
        id: &str,
    ) -> ClientResult<Option<GenericObject>> {
        match self.read(object_type, id).await {
            Ok(object) => Ok(Some(object)),
            Err(ClientError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Retrieve an object by id alone, when its type is unknown
    pub async fn read_by_id(&self, id: &str) -> ClientResult<GenericObject> {
        self.read("", id).await
    }

    /// Update an object. Partial-field semantics: only the supplied fields
    /// change server-side; concurrent updates are last-write-wins.
    pub async fn update(&self, object: &GenericObject) -> ClientResult<GenericObject> {
        if object.id.as_deref().map_or(true, str::is_empty) {
            return Err(ClientError::invalid_input(
                object.object_uri(),
                "object id is required for update",
            ));
        }
        self.get_object(Operation::patch(&object.object_uri()).body(object.to_value()))
            .await
    }

    /// Delete an object. Idempotent: deleting an already-absent object is
    /// still a success.
    pub async fn delete(&self, object_type: &str, id: &str) -> ClientResult<()> {
        let path = format!("{}/{}", urlenc(object_type), urlenc(id));
        match self.invoke_delete(&path, Vec::new()).await {
            Ok(_) => Ok(()),
            Err(ClientError::NotFound { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// One page of all objects of a type
    pub async fn list(
        &self,
        object_type: &str,
        pager: Option<&mut Pager>,
    ) -> ClientResult<Page> {
        let params = pager.as_deref().map(Pager::to_params).unwrap_or_default();
        self.get_page(Operation::get(&urlenc(object_type)).params(params), pager)
            .await
    }

    /// Collect every object of a type by walking all pages. Stops on the
    /// first empty page or once the server-reported total is reached,
    /// whichever comes first.
    pub async fn list_all(
        &self,
        object_type: &str,
        page_size: u64,
    ) -> ClientResult<Vec<GenericObject>> {
        let mut pager = Pager::new(1, page_size);
        let mut all = Vec::new();
        loop {
            let page = self.list(object_type, Some(&mut pager)).await?;
            if page.is_empty() {
                break;
            }
            all.extend(page.items);
            if let Some(total) = pager.count {
                if all.len() as u64 >= total {
                    break;
                }
            }
            pager.page += 1;
        }
        Ok(all)
    }
}
