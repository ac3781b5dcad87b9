//! Fetcher types shared by option sources and the async option cache.
//!
//! A fetcher is a shareable closure returning a boxed, `Send` future. Two
//! shapes exist:
//!
//! - [`GetItems`]: fetch the full option set.
//! - [`FindItems`]: fetch the options matching a search query.
//!
//! ```
//! use carbure_core::fetch::{find_items, FindItems};
//!
//! let search: FindItems<String> = find_items(|query: String| async move {
//!     Ok(vec![format!("{query}-1"), format!("{query}-2")])
//! });
//! ```

use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use crate::error::Result;

/// Future returned by every fetcher.
pub type FetchFuture<T> = BoxFuture<'static, Result<Vec<T>>>;

/// Fetches the complete option set.
pub type GetItems<T> = Arc<dyn Fn() -> FetchFuture<T> + Send + Sync>;

/// Fetches the options matching a query string.
pub type FindItems<T> = Arc<dyn Fn(String) -> FetchFuture<T> + Send + Sync>;

/// Wrap an async closure as a [`GetItems`] fetcher.
pub fn get_items<T, F, Fut>(f: F) -> GetItems<T>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<T>>> + Send + 'static,
{
    Arc::new(move || f().boxed())
}

/// Wrap an async closure as a [`FindItems`] fetcher.
pub fn find_items<T, F, Fut>(f: F) -> FindItems<T>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<T>>> + Send + 'static,
{
    Arc::new(move |query| f(query).boxed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;

    #[tokio::test]
    async fn test_get_items_wrapper() {
        let fetch = get_items(|| async { Ok(vec![1, 2, 3]) });
        assert_eq!(fetch().await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_find_items_wrapper_passes_query() {
        let fetch = find_items(|query: String| async move {
            if query.is_empty() {
                Err(FetchError::other("empty query"))
            } else {
                Ok(vec![query])
            }
        });

        assert_eq!(fetch("eth".into()).await.unwrap(), vec!["eth".to_string()]);
        assert!(fetch(String::new()).await.is_err());
    }
}
