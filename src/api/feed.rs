use super::{client::ApiClient, client::ApiError, models::FeedPage};

/// Hard cap on feed pagination; past this the pager reports a terminal
/// "no more" state and stops issuing requests.
pub const MAX_FEED_PAGES: u32 = 50;

/// Sequential feed-page fetcher. Page 1 is rendered server-side, so the
/// first fetch asks for page 2, mirroring the infinite-scroll widget.
pub struct FeedPager {
    client: ApiClient,
    feed_path: String,
    page_param: String,
    current_page: u32,
    loading: bool,
    has_more: bool,
}

impl FeedPager {
    pub fn new(client: ApiClient, feed_path: impl Into<String>, page_param: impl Into<String>) -> Self {
        Self {
            client,
            feed_path: feed_path.into(),
            page_param: page_param.into(),
            current_page: 1,
            loading: false,
            has_more: true,
        }
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Fetch the next page. `Ok(None)` means there is nothing further to
    /// load (exhausted, capped, or a fetch already in flight). A network
    /// error leaves the page counter untouched so the caller can retry.
    pub async fn next_page(&mut self) -> Result<Option<FeedPage>, ApiError> {
        if self.loading || !self.has_more {
            return Ok(None);
        }
        if self.current_page >= MAX_FEED_PAGES {
            self.has_more = false;
            return Ok(None);
        }

        self.loading = true;
        let page = self.current_page + 1;
        let result = self
            .client
            .fetch_feed_page(&self.feed_path, &self.page_param, page)
            .await;
        self.loading = false;

        let fetched = result?;
        if fetched.html.trim().is_empty() {
            self.has_more = false;
            return Ok(None);
        }
        self.current_page = page;
        self.has_more = fetched.has_more;
        Ok(Some(fetched))
    }
}
