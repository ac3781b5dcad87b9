//! Option sources backed by REST endpoints.
//!
//! A [`RestSource`] turns an endpoint returning `{ "data": [...] }` into the
//! fetchers consumed by the async option list.

use serde::de::DeserializeOwned;

use carbure_core::fetch::{FindItems, GetItems, find_items, get_items};
use carbure_core::FetchError;

use crate::client::ApiClient;
use crate::error::Result;

/// Query parameter carrying the search text.
pub const SEARCH_PARAM: &str = "query";

/// An endpoint listing options.
#[derive(Debug, Clone)]
pub struct RestSource {
    client: ApiClient,
    path: String,
    params: Vec<(String, String)>,
}

impl RestSource {
    /// A source reading `path` through `client`.
    pub fn new(client: ApiClient, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into(),
            params: Vec::new(),
        }
    }

    /// Add a fixed query parameter, such as a filter on the entity.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// The endpoint path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Fetch the options, optionally filtered by `query`.
    ///
    /// An empty query is not sent.
    pub async fn fetch<T: DeserializeOwned>(&self, query: Option<&str>) -> Result<Vec<T>> {
        let mut params = self.params.clone();
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            params.push((SEARCH_PARAM.to_string(), query.to_string()));
        }
        self.client.get_json(&self.path, &params).await
    }

    /// A fetcher loading the whole option set.
    pub fn get_items<T>(&self) -> GetItems<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let source = self.clone();
        get_items(move || {
            let source = source.clone();
            async move { source.fetch(None).await.map_err(FetchError::from) }
        })
    }

    /// A fetcher sending the search text as `query=`.
    pub fn find_items<T>(&self) -> FindItems<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let source = self.clone();
        find_items(move |query: String| {
            let source = source.clone();
            async move { source.fetch(Some(query.as_str())).await.map_err(FetchError::from) }
        })
    }
}
