//! @-mention parsing and completion for note and caption inputs.
//!
//! The text field itself lives in the webview; this module owns the logic:
//! finding the active `@token` under the cursor, turning a search response
//! into candidates, and splicing a chosen candidate back into the text.

use serde::Serialize;

use crate::api::models::SearchResponse;

/// An active mention token: the byte offset of its `@` and the query typed
/// so far (without the `@`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionSpan {
    pub start: usize,
    pub query: String,
}

/// Find the mention token ending at the cursor, if any.
///
/// Rules (matching the original widget): the last `@` before the cursor
/// starts the token; an `@` directly after a word character (think email
/// addresses) does not trigger; the query runs to the cursor and must be
/// non-empty with no whitespace.
pub fn mention_query(text: &str, cursor: usize) -> Option<MentionSpan> {
    let before = text.get(..cursor)?;
    let at = before.rfind('@')?;

    if let Some(prev) = before[..at].chars().last() {
        if prev.is_alphanumeric() || prev == '_' {
            return None;
        }
    }

    let raw = &before[at + 1..];
    if raw.is_empty() || raw.chars().any(char::is_whitespace) {
        return None;
    }

    Some(MentionSpan {
        start: at,
        query: raw.to_string(),
    })
}

/// Replace the active token with `@value ` and return the new text plus the
/// new cursor position (just past the inserted trailing space).
pub fn apply_mention(
    text: &str,
    span: &MentionSpan,
    cursor: usize,
    value: &str,
) -> (String, usize) {
    let before = &text[..span.start];
    let after = text.get(cursor..).unwrap_or("");
    let insert = format!("@{value} ");
    let new_cursor = before.len() + insert.len();
    (format!("{before}{insert}{after}"), new_cursor)
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MentionKind {
    Person,
    Group,
    Tag,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MentionCandidate {
    /// Token inserted into the text (no spaces).
    pub value: String,
    /// Human-readable name shown in the dropdown.
    pub display: String,
    pub kind: MentionKind,
}

/// Flatten a search response into the dropdown order: people, then groups,
/// then tags. Group and tag names get whitespace collapsed to `_` so the
/// inserted token stays one word.
pub fn candidates(response: &SearchResponse) -> Vec<MentionCandidate> {
    let mut out = Vec::new();
    for user in &response.users {
        out.push(MentionCandidate {
            value: user.username.clone(),
            display: user.display_name.clone(),
            kind: MentionKind::Person,
        });
    }
    for group in &response.groups {
        out.push(MentionCandidate {
            value: collapse_whitespace(&group.name),
            display: group.name.clone(),
            kind: MentionKind::Group,
        });
    }
    for tag in &response.tags {
        out.push(MentionCandidate {
            value: collapse_whitespace(&tag.name),
            display: tag.name.clone(),
            kind: MentionKind::Tag,
        });
    }
    out
}

/// Each run of whitespace becomes a single underscore.
fn collapse_whitespace(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for ch in name.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
        } else {
            out.push(ch);
            in_whitespace = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{GroupResult, TagResult, UserResult};

    #[test]
    fn finds_the_token_under_the_cursor() {
        let text = "lekker met @ja";
        let span = mention_query(text, text.len()).unwrap();
        assert_eq!(span.start, 11);
        assert_eq!(span.query, "ja");
    }

    #[test]
    fn bare_at_or_closed_token_does_not_trigger() {
        assert_eq!(mention_query("hoi @", 5), None);
        // A space closes the token.
        assert_eq!(mention_query("met @jan erbij", 14), None);
        assert_eq!(mention_query("geen mention", 12), None);
    }

    #[test]
    fn at_inside_a_word_does_not_trigger() {
        let text = "mail jan@club";
        assert_eq!(mention_query(text, text.len()), None);
    }

    #[test]
    fn cursor_in_the_middle_limits_the_query() {
        let text = "@jans verhaal";
        let span = mention_query(text, 3).unwrap();
        assert_eq!(span.query, "ja");
    }

    #[test]
    fn apply_splices_the_value_and_moves_the_cursor() {
        let text = "met @ja nog meer";
        let span = mention_query(text, 7).unwrap();
        let (new_text, new_cursor) = apply_mention(text, &span, 7, "jan");
        assert_eq!(new_text, "met @jan  nog meer");
        assert_eq!(new_cursor, "met @jan ".len());
    }

    #[test]
    fn candidates_keep_dropdown_order_and_slug_names() {
        let response = SearchResponse {
            users: vec![UserResult {
                username: "jan".into(),
                display_name: "Jan".into(),
                avatar: None,
                connection_status: None,
            }],
            groups: vec![GroupResult {
                id: 1,
                name: "Zaterdag  Club".into(),
                avatar: None,
                member_count: 8,
                is_member: false,
                has_pending_request: false,
            }],
            tags: vec![TagResult {
                name: "vrije daling".into(),
            }],
        };

        let list = candidates(&response);
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].kind, MentionKind::Person);
        assert_eq!(list[0].value, "jan");
        assert_eq!(list[1].value, "Zaterdag_Club");
        assert_eq!(list[2].value, "vrije_daling");
        assert_eq!(list[2].display, "vrije daling");
    }
}
