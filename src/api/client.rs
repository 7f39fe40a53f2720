use std::sync::{Arc, RwLock};

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::session::SessionLedger;

use super::models::{
    ConnectResponse, FeedPage, JoinResponse, LikeResponse, ReactionResponse, SearchResponse,
};

const CSRF_HEADER: &str = "X-CSRFToken";
const AJAX_MARKER_HEADER: &str = "X-Requested-With";
const AJAX_MARKER_VALUE: &str = "XMLHttpRequest";

/// Path the post-creation form submits to.
const SUBMIT_PATH: &str = "/post/create-session";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error("could not encode session: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Add at least one bier to your session first.")]
    EmptySession,
}

/// Form fields for the post-submission endpoint. The ledger travels in
/// `session_beers_json`, exactly as the original hidden input does.
#[derive(Debug, Clone, PartialEq)]
pub struct PostSubmission {
    pub session_beers_json: String,
    pub caption: String,
    pub is_public: bool,
    pub groups: Vec<i64>,
}

impl PostSubmission {
    /// Build the payload, rejecting an empty ledger up front.
    pub fn from_ledger(
        ledger: &SessionLedger,
        caption: &str,
        is_public: bool,
        groups: Vec<i64>,
    ) -> Result<Self, ApiError> {
        if ledger.is_empty() {
            return Err(ApiError::EmptySession);
        }
        Ok(Self {
            session_beers_json: ledger.serialize()?,
            caption: caption.to_string(),
            is_public,
            groups,
        })
    }

    fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("session_beers_json", self.session_beers_json.clone()),
            ("caption", self.caption.clone()),
        ];
        if self.is_public {
            fields.push(("is_public", "y".to_string()));
        }
        for group_id in &self.groups {
            fields.push(("groups", group_id.to_string()));
        }
        fields
    }
}

/// Typed client for the backend endpoints. Mutating calls carry the
/// anti-forgery token and the ajax marker header; there is no retry policy,
/// callers revert their UI state on error.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    csrf_token: Arc<RwLock<String>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            csrf_token: Arc::new(RwLock::new(String::new())),
        }
    }

    /// Token sourced from the page-level meta tag, handed over by the
    /// frontend once it has rendered.
    pub fn set_csrf_token(&self, token: String) {
        *self.csrf_token.write().expect("csrf token lock poisoned") = token;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn csrf_token(&self) -> String {
        self.csrf_token
            .read()
            .expect("csrf token lock poisoned")
            .clone()
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, ApiError> {
        let response = self
            .http
            .post(self.url(path))
            .header(CSRF_HEADER, self.csrf_token())
            .header(AJAX_MARKER_HEADER, AJAX_MARKER_VALUE)
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        Ok(response.json().await?)
    }

    /// Typeahead search. Without a query the server returns suggestion
    /// defaults.
    pub async fn search(&self, query: Option<&str>) -> Result<SearchResponse, ApiError> {
        let mut request = self
            .http
            .get(self.url("/api/search"))
            .header(AJAX_MARKER_HEADER, AJAX_MARKER_VALUE);
        if let Some(q) = query {
            request = request.query(&[("q", q)]);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        Ok(response.json().await?)
    }

    pub async fn toggle_like(&self, post_id: i64) -> Result<LikeResponse, ApiError> {
        self.post_json(&format!("/api/posts/{post_id}/like"), serde_json::json!({}))
            .await
    }

    pub async fn toggle_reaction(
        &self,
        post_id: i64,
        emoji: &str,
    ) -> Result<ReactionResponse, ApiError> {
        self.post_json(
            &format!("/api/posts/{post_id}/reaction"),
            serde_json::json!({ "emoji": emoji }),
        )
        .await
    }

    pub async fn request_connection(&self, username: &str) -> Result<ConnectResponse, ApiError> {
        self.post_json(&format!("/api/connect/{username}"), serde_json::json!({}))
            .await
    }

    pub async fn request_group_join(&self, group_id: i64) -> Result<JoinResponse, ApiError> {
        self.post_json(
            &format!("/api/groups/{group_id}/join"),
            serde_json::json!({}),
        )
        .await
    }

    pub async fn fetch_feed_page(
        &self,
        feed_path: &str,
        page_param: &str,
        page: u32,
    ) -> Result<FeedPage, ApiError> {
        let response = self
            .http
            .get(self.url(feed_path))
            .header(AJAX_MARKER_HEADER, AJAX_MARKER_VALUE)
            .query(&[(page_param, page.to_string())])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        Ok(response.json().await?)
    }

    pub async fn submit_session(&self, submission: &PostSubmission) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.url(SUBMIT_PATH))
            .header(CSRF_HEADER, self.csrf_token())
            .header(AJAX_MARKER_HEADER, AJAX_MARKER_VALUE)
            .form(&submission.form_fields())
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::entry::{PendingSelection, SessionEntry};

    #[test]
    fn submission_rejects_an_empty_ledger() {
        let ledger = SessionLedger::new();
        let result = PostSubmission::from_ledger(&ledger, "", true, vec![]);
        assert!(matches!(result, Err(ApiError::EmptySession)));
    }

    #[test]
    fn submission_carries_the_serialized_ledger_and_groups() {
        let mut ledger = SessionLedger::new();
        ledger.append(SessionEntry::timed(8.2, &PendingSelection::default(), Some(1)));

        let submission =
            PostSubmission::from_ledger(&ledger, "proost", true, vec![3, 7]).unwrap();
        assert_eq!(submission.session_beers_json, ledger.serialize().unwrap());

        let fields = submission.form_fields();
        assert!(fields.contains(&("is_public", "y".to_string())));
        let groups: Vec<&String> = fields
            .iter()
            .filter(|(name, _)| *name == "groups")
            .map(|(_, value)| value)
            .collect();
        assert_eq!(groups, [&"3".to_string(), &"7".to_string()]);
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = ApiClient::new("http://localhost:5000/");
        assert_eq!(client.url("/api/search"), "http://localhost:5000/api/search");
    }
}
