//! Graph API request and response types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Container creation parameters, one variant per container shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerRequest {
    Photo { image_url: String, caption: String },
    Reel { video_url: String, caption: String },
    CarouselImage { image_url: String },
    CarouselVideo { video_url: String },
    /// Parent container; children are joined in order
    Carousel { children: Vec<String>, caption: String },
}

impl ContainerRequest {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            ContainerRequest::Photo { .. } => "photo",
            ContainerRequest::Reel { .. } => "reel",
            ContainerRequest::CarouselImage { .. } => "carousel_image",
            ContainerRequest::CarouselVideo { .. } => "carousel_video",
            ContainerRequest::Carousel { .. } => "carousel",
        }
    }

    /// Query parameters for `POST /{user_id}/media` (without the token).
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            ContainerRequest::Photo { image_url, caption } => vec![
                ("image_url", image_url.clone()),
                ("caption", caption.clone()),
            ],
            ContainerRequest::Reel { video_url, caption } => vec![
                ("media_type", "REELS".to_string()),
                ("video_url", video_url.clone()),
                ("caption", caption.clone()),
            ],
            ContainerRequest::CarouselImage { image_url } => vec![
                ("image_url", image_url.clone()),
                ("is_carousel_item", "true".to_string()),
            ],
            ContainerRequest::CarouselVideo { video_url } => vec![
                ("media_type", "VIDEO".to_string()),
                ("video_url", video_url.clone()),
                ("is_carousel_item", "true".to_string()),
            ],
            ContainerRequest::Carousel { children, caption } => vec![
                ("media_type", "CAROUSEL".to_string()),
                ("caption", caption.clone()),
                ("children", children.join(",")),
            ],
        }
    }
}

/// Any Graph object reply carrying an id.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphObject {
    #[serde(default)]
    pub id: Option<String>,
}

impl GraphObject {
    /// The id, treating an empty string as missing.
    pub fn into_id(self) -> Option<String> {
        self.id.filter(|id| !id.trim().is_empty())
    }
}

/// Reply to `GET /{container_id}?fields=status_code,status`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub status_code: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl StatusResponse {
    /// `status_code` wins; `status` is the fallback.
    pub fn code(&self) -> StatusCode {
        let raw = self
            .status_code
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.status.as_deref())
            .unwrap_or_default();
        StatusCode::parse(raw)
    }
}

/// Processing status of a remote container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCode {
    Finished,
    Ready,
    Error,
    InProgress,
    /// Anything else; treated as still processing
    Other(String),
}

impl StatusCode {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "FINISHED" => StatusCode::Finished,
            "READY" => StatusCode::Ready,
            "ERROR" => StatusCode::Error,
            "IN_PROGRESS" => StatusCode::InProgress,
            _ => StatusCode::Other(raw.trim().to_string()),
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCode::Finished => write!(f, "FINISHED"),
            StatusCode::Ready => write!(f, "READY"),
            StatusCode::Error => write!(f, "ERROR"),
            StatusCode::InProgress => write!(f, "IN_PROGRESS"),
            StatusCode::Other(raw) => write!(f, "{}", raw),
        }
    }
}

/// Account behind the configured token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_fallback() {
        let both = StatusResponse {
            status_code: Some("FINISHED".into()),
            status: Some("IN_PROGRESS".into()),
        };
        assert_eq!(both.code(), StatusCode::Finished);

        let only_status = StatusResponse {
            status_code: None,
            status: Some("ready".into()),
        };
        assert_eq!(only_status.code(), StatusCode::Ready);

        let empty_code = StatusResponse {
            status_code: Some(String::new()),
            status: Some("ERROR".into()),
        };
        assert_eq!(empty_code.code(), StatusCode::Error);

        assert_eq!(StatusResponse::default().code(), StatusCode::Other(String::new()));
    }

    #[test]
    fn test_status_parse_other() {
        assert_eq!(StatusCode::parse("PUBLISHED"), StatusCode::Other("PUBLISHED".into()));
        assert_eq!(StatusCode::parse(" in_progress "), StatusCode::InProgress);
    }

    #[test]
    fn test_carousel_query_preserves_order() {
        let request = ContainerRequest::Carousel {
            children: vec!["c3".into(), "c1".into(), "c2".into()],
            caption: "facts".into(),
        };
        let query = request.query();
        assert!(query.contains(&("children", "c3,c1,c2".to_string())));
        assert!(query.contains(&("media_type", "CAROUSEL".to_string())));
    }

    #[test]
    fn test_graph_object_empty_id() {
        let obj: GraphObject = serde_json::from_str(r#"{"id": ""}"#).unwrap();
        assert_eq!(obj.into_id(), None);
        let obj: GraphObject = serde_json::from_str(r#"{"error": {}}"#).unwrap();
        assert_eq!(obj.into_id(), None);
    }
}
