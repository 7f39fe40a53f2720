//! Wire types for the backend's JSON API. Field names match the server
//! responses, so these stay snake_case.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    #[serde(default)]
    pub users: Vec<UserResult>,
    #[serde(default)]
    pub groups: Vec<GroupResult>,
    #[serde(default)]
    pub tags: Vec<TagResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserResult {
    pub username: String,
    pub display_name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub connection_status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupResult {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub member_count: u32,
    #[serde(default)]
    pub is_member: bool,
    #[serde(default)]
    pub has_pending_request: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TagResult {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LikeResponse {
    pub success: bool,
    pub liked: bool,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReactionResponse {
    pub success: bool,
    pub toggled: bool,
    #[serde(default)]
    pub counts: HashMap<String, i64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Accepted,
    Pending,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectResponse {
    pub success: bool,
    pub status: ConnectionStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JoinResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FeedPage {
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub has_more: bool,
}
