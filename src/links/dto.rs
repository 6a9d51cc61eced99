use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::links::repo::{Link, LinkType};
use crate::links::youtube;

#[derive(Debug, Deserialize)]
pub struct CreateLinkRequest {
    pub url: String,
    #[serde(rename = "type", default)]
    pub link_type: LinkType,
}

/// Link as returned to clients. YouTube links additionally carry the parsed
/// video id so a client can embed a player without reparsing the URL.
#[derive(Debug, Serialize)]
pub struct LinkPayload {
    pub id: Uuid,
    pub url: String,
    #[serde(rename = "type")]
    pub link_type: LinkType,
    pub uploaded_by: Option<Uuid>,
    pub is_admin_pinned: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube_id: Option<String>,
}

impl From<Link> for LinkPayload {
    fn from(link: Link) -> Self {
        let youtube_id = match link.link_type {
            LinkType::Youtube => youtube::video_id(&link.url),
            _ => None,
        };
        Self {
            id: link.id,
            url: link.url,
            link_type: link.link_type,
            uploaded_by: link.uploaded_by,
            is_admin_pinned: link.is_admin_pinned,
            created_at: link.created_at,
            youtube_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedLinkResponse {
    pub ok: bool,
    pub link: LinkPayload,
}

#[derive(Debug, Serialize)]
pub struct NextLinkResponse {
    pub link: Option<LinkPayload>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_link(url: &str, link_type: LinkType) -> Link {
        Link {
            id: Uuid::new_v4(),
            url: url.into(),
            link_type,
            uploaded_by: None,
            is_admin_pinned: false,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn youtube_links_carry_a_video_id() {
        let payload =
            LinkPayload::from(make_link("https://youtu.be/dQw4w9WgXcQ", LinkType::Youtube));
        assert_eq!(payload.youtube_id.as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn non_youtube_links_do_not() {
        let payload = LinkPayload::from(make_link(
            "https://example.com/watch?v=notavideo",
            LinkType::Website,
        ));
        assert_eq!(payload.youtube_id, None);
        let json = serde_json::to_string(&payload).unwrap();
        assert!(!json.contains("youtube_id"));
        assert!(json.contains("\"type\":\"website\""));
    }

    #[test]
    fn create_request_defaults_type_to_website() {
        let request: CreateLinkRequest =
            serde_json::from_str(r#"{"url":"https://example.com"}"#).unwrap();
        assert_eq!(request.link_type, LinkType::Website);
    }

    #[test]
    fn next_response_serializes_null_when_exhausted() {
        let json = serde_json::to_string(&NextLinkResponse { link: None }).unwrap();
        assert_eq!(json, r#"{"link":null}"#);
    }
}
