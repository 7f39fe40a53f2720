use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;

use tokio::time;

use super::{client::ApiClient, client::ApiError, models::SearchResponse};

pub const DEBOUNCE: Duration = Duration::from_millis(200);

/// Debounced typeahead search with a generation token. Each call bumps the
/// generation; a call whose generation has been superseded by the time it
/// wakes (or by the time its response lands) resolves to `Ok(None)` instead
/// of delivering stale results. Both the search page and the mentions
/// dropdown go through this, so neither can be overwritten by a late
/// response.
#[derive(Clone)]
pub struct TypeaheadSearcher {
    client: ApiClient,
    generation: Arc<AtomicU64>,
    debounce: Duration,
}

impl TypeaheadSearcher {
    pub fn with_debounce(client: ApiClient, debounce: Duration) -> Self {
        Self {
            client,
            generation: Arc::new(AtomicU64::new(0)),
            debounce,
        }
    }

    pub async fn search(&self, query: String) -> Result<Option<SearchResponse>, ApiError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        time::sleep(self.debounce).await;
        if self.generation.load(Ordering::SeqCst) != generation {
            return Ok(None);
        }

        let response = self.client.search(Some(&query)).await?;

        if self.generation.load(Ordering::SeqCst) != generation {
            return Ok(None);
        }
        Ok(Some(response))
    }

    /// Invalidate any in-flight search (query cleared, widget dismissed).
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn superseded_search_is_dropped_before_it_hits_the_network() {
        let searcher =
            TypeaheadSearcher::with_debounce(ApiClient::new("http://localhost:5000"), DEBOUNCE);

        let pending = tokio::spawn({
            let searcher = searcher.clone();
            async move { searcher.search("ja".to_string()).await }
        });

        // A newer keystroke invalidates the sleeping search; it must resolve
        // to None without ever issuing a request.
        tokio::task::yield_now().await;
        searcher.cancel();
        time::advance(DEBOUNCE).await;

        let result = pending.await.unwrap().unwrap();
        assert!(result.is_none());
    }
}
