//! OKS REST API Client
//!
//! A small typed client for the OKS provider API, covering what the CLI needs
//! before it can talk to a cluster: name resolution, network facts and
//! kubeconfig retrieval.
//!
//! # Example
//!
//! ```no_run
//! use oks_client::{Credentials, OksClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OksClient::new(
//!     oks_client::default_endpoint("eu-west-2"),
//!     Credentials::AccessKey {
//!         access_key: "AK".to_string(),
//!         secret_key: "SK".to_string(),
//!     },
//! )?;
//!
//! let projects = client.find_projects("my-project").await?;
//! let clusters = client.find_clusters(&projects[0].id, "my-cluster").await?;
//! let kubeconfig = client.get_kubeconfig(&clusters[0].id, None, None).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod common;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod oks_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::{OksClient, default_endpoint};
pub use common::{Credentials, HttpClient};
pub use error::OksError;
pub use models::*;
pub use oks_trait::OksClientTrait;
#[cfg(feature = "test-util")]
pub use mock::MockOksClient;
