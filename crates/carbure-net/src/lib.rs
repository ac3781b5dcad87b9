//! REST access for Carbure option lists.
//!
//! - [`ApiClient`]: JSON client for the backend, unwrapping the `data`
//!   envelope and mapping error statuses
//! - [`RestSource`]: builds `GetItems` / `FindItems` fetchers from an
//!   endpoint
//!
//! # Example
//!
//! ```ignore
//! use carbure_net::{ApiClient, RestSource};
//! use carbure_select::model::AsyncList;
//!
//! let client = ApiClient::builder("https://carbure.beta.gouv.fr/api").build()?;
//! let depots = RestSource::new(client, "/resources/depots");
//!
//! let list = AsyncList::builder(normalize_depot)
//!     .find_items(depots.find_items())
//!     .build();
//! list.execute("fos").await?;
//! ```
//!
//! Errors are [`NetworkError`]s, converted into
//! [`FetchError`](carbure_core::FetchError) at the fetcher boundary.

pub mod client;
pub mod error;
pub mod source;

pub use client::{ApiClient, ApiClientBuilder};
pub use error::{NetworkError, Result};
pub use source::{RestSource, SEARCH_PARAM};
