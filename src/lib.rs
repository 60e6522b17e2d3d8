//! strata-client - client SDK for the Strata object-persistence backend
//!
//! Turns high-level calls (create object, query, update fields, batch
//! read) into authenticated, correctly-encoded HTTP requests, and decodes
//! heterogeneous JSON responses back into typed or untyped objects with
//! pagination and per-item batch outcomes.
//!
//! ```no_run
//! use strata_client::{GenericObject, StrataClient};
//! use serde_json::json;
//!
//! # async fn run() -> strata_client::ClientResult<()> {
//! let client = StrataClient::new("app:myapp", "my-secret-key");
//! client.set_endpoint("http://localhost:8080")?;
//!
//! let mut cat = GenericObject::new("cat");
//! cat.name = Some("Tom".to_string());
//! cat.set("color", json!("gray"));
//!
//! let stored = client.create(&cat).await?;
//! let found = client.read("cat", stored.id.as_deref().unwrap_or_default()).await?;
//! assert_eq!(found.get("color"), Some(&json!("gray")));
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod constraint;
pub mod errors;
pub mod object;
pub mod pager;
pub mod request;
pub mod response;
pub mod retry;
pub mod signing;
pub mod transport;

pub use client::{BatchResults, StrataClient};
pub use constraint::Constraint;
pub use errors::{ClientError, ClientResult};
pub use object::GenericObject;
pub use pager::{Page, Pager};
pub use retry::RetryPolicy;
pub use signing::Credentials;
