//! Wikipedia REST summary source.
//!
//! # Responsibility
//! - Fetch `page/summary/{title}` for an author name.
//! - Extract a one-paragraph biography and a photo URL.
//!
//! # Invariants
//! - A missing page (404) is "no data", not an error.
//! - Response parsing is pure and independent of the HTTP client.

use super::source::{ProfileData, ProfileSource, SourceError};
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;

const SOURCE_NAME: &str = "wikipedia";
const SUMMARY_BASE_URL: &str = "https://en.wikipedia.org/api/rest_v1/page/summary/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct WikiSummary {
    extract: Option<String>,
    originalimage: Option<WikiImage>,
    thumbnail: Option<WikiImage>,
}

#[derive(Debug, Deserialize)]
struct WikiImage {
    source: String,
}

/// Looks up author bios and photos on English Wikipedia.
pub struct WikipediaSummarySource {
    client: Client,
    base_url: Url,
}

impl WikipediaSummarySource {
    /// Builds a source against the public Wikipedia endpoint.
    pub fn new() -> Result<Self, SourceError> {
        Self::with_base_url(SUMMARY_BASE_URL)
    }

    /// Builds a source against another summary endpoint (mirrors, tests).
    pub fn with_base_url(base_url: &str) -> Result<Self, SourceError> {
        let base_url = Url::parse(base_url).map_err(|err| http_error(err.to_string()))?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("quotedesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| http_error(err.to_string()))?;
        Ok(Self { client, base_url })
    }

    /// Summary URL for `author_name`: spaces become underscores and the
    /// title is percent-encoded as one path segment.
    pub fn summary_url(&self, author_name: &str) -> Result<Url, SourceError> {
        let title = author_name.trim().replace(' ', "_");
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| http_error(format!("base url `{}` cannot take a path", self.base_url)))?
            .pop_if_empty()
            .push(&title);
        Ok(url)
    }
}

impl ProfileSource for WikipediaSummarySource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn lookup(&self, author_name: &str) -> Result<Option<ProfileData>, SourceError> {
        if author_name.trim().is_empty() {
            return Ok(None);
        }

        let url = self.summary_url(author_name)?;
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| http_error(err.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body = response.text().map_err(|err| http_error(err.to_string()))?;
                parse_summary(&body).map(Some)
            }
            status => Err(http_error(format!("unexpected status {status}"))),
        }
    }
}

/// Extracts profile data from a summary JSON body.
///
/// Newlines in `extract` become spaces; `originalimage` wins over
/// `thumbnail`. Blank values are dropped.
pub fn parse_summary(body: &str) -> Result<ProfileData, SourceError> {
    let summary: WikiSummary = serde_json::from_str(body).map_err(|err| SourceError::Parse {
        source: SOURCE_NAME,
        message: err.to_string(),
    })?;

    let description = summary
        .extract
        .map(|text| text.replace('\n', " ").trim().to_string())
        .filter(|text| !text.is_empty());
    let image_url = summary
        .originalimage
        .or(summary.thumbnail)
        .map(|image| image.source.trim().to_string())
        .filter(|source| !source.is_empty());

    Ok(ProfileData {
        description,
        image_url,
    })
}

fn http_error(message: String) -> SourceError {
    SourceError::Http {
        source: SOURCE_NAME,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_summary, WikipediaSummarySource};
    use crate::enrich::source::SourceError;

    #[test]
    fn summary_url_uses_underscores_and_encodes() {
        let source = WikipediaSummarySource::new().expect("client should build");
        let url = source.summary_url(" Ada Lovelace ").expect("url");
        assert_eq!(
            url.as_str(),
            "https://en.wikipedia.org/api/rest_v1/page/summary/Ada_Lovelace"
        );
        let url = source.summary_url("Who? Me/You").expect("url");
        assert_eq!(
            url.as_str(),
            "https://en.wikipedia.org/api/rest_v1/page/summary/Who%3F_Me%2FYou"
        );
    }

    #[test]
    fn parse_prefers_original_image_and_flattens_extract() {
        let body = r#"{
            "title": "Ada Lovelace",
            "extract": "Augusta Ada King.\nMathematician.",
            "originalimage": {"source": "https://upload.example/full.jpg", "width": 800},
            "thumbnail": {"source": "https://upload.example/thumb.jpg"}
        }"#;
        let data = parse_summary(body).expect("should parse");
        assert_eq!(
            data.description.as_deref(),
            Some("Augusta Ada King. Mathematician.")
        );
        assert_eq!(data.image_url.as_deref(), Some("https://upload.example/full.jpg"));
    }

    #[test]
    fn parse_falls_back_to_thumbnail_and_drops_blank_extract() {
        let body = r#"{"extract": "  ", "thumbnail": {"source": "https://upload.example/t.jpg"}}"#;
        let data = parse_summary(body).expect("should parse");
        assert_eq!(data.description, None);
        assert_eq!(data.image_url.as_deref(), Some("https://upload.example/t.jpg"));
    }

    #[test]
    fn parse_rejects_malformed_json() {
        let err = parse_summary("<html>").expect_err("must fail");
        assert!(matches!(err, SourceError::Parse { source: "wikipedia", .. }));
    }
}
