//! # tallyboard-remote
//!
//! Client for the remote work-board service, spoken over GraphQL.
//!
//! - [`Transport`] sends one request and returns the raw JSON response
//! - [`HttpTransport`] is the HTTPS implementation
//! - [`ScriptedTransport`] answers from memory and records requests
//! - [`BoardClient`] issues typed queries and mutations for one board
//!
//! ## Example
//!
//! ```rust,no_run
//! use tallyboard_core::Credentials;
//! use tallyboard_remote::{BoardClient, HttpTransport, RemoteConfig};
//!
//! # async fn run() -> tallyboard_remote::Result<()> {
//! let credentials = Credentials::new("secret-token", "1234567890").unwrap();
//! let client = BoardClient::new(HttpTransport::new(&RemoteConfig::default()), credentials);
//!
//! let page = client.items_page(None, 100).await?;
//! println!("{} items, more: {}", page.items.len(), page.cursor.is_some());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod query;
pub mod scripted;
pub mod transport;
pub mod types;

pub use client::BoardClient;
pub use config::RemoteConfig;
pub use error::{RemoteError, Result};
pub use scripted::ScriptedTransport;
pub use transport::{extract_data, GraphqlRequest, HttpTransport, Transport};
pub use types::ItemsPage;
