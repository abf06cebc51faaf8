//! Numbered Newsmax joke pages and latest-page discovery.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::StatusCode;

use super::{body_text, HttpClient};
use crate::error::FetchError;
use crate::model::{RawPost, Source};

pub const BASE_URL: &str = "https://www.newsmax.com/jokes";
pub const ARCHIVE_URL: &str = "https://www.newsmax.com/jokes/archive/";

static URL_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/jokes/(\d+)/?$").unwrap());
static CANONICAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<link[^>]+rel=["']canonical["'][^>]+href=["'][^"']*/jokes/(\d+)/?["']"#).unwrap()
});
static BODY_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/jokes/(\d+)").unwrap());

pub fn page_url(page: i64) -> String {
    format!("{}/{}", BASE_URL, page)
}

/// `None` when the page does not exist.
pub async fn fetch_page(client: &HttpClient, page: i64) -> Result<Option<RawPost>, FetchError> {
    let url = page_url(page);
    let resp = client.get(&url, &[]).await?;
    match resp.status() {
        StatusCode::NOT_FOUND => Ok(None),
        s if s.is_success() => {
            let html = body_text(resp).await?;
            Ok(Some(RawPost::page(page, Source::Newsmax, html)))
        }
        s => Err(FetchError::Status { url, status: s.as_u16() }),
    }
}

/// Id of the newest joke page, read from the archive landing page.
pub async fn discover_latest_page(client: &HttpClient) -> Result<i64, FetchError> {
    let resp = client.get(ARCHIVE_URL, &[]).await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status { url: ARCHIVE_URL.to_string(), status: status.as_u16() });
    }
    let final_url = resp.url().to_string();
    let body = body_text(resp).await?;
    latest_page_id(&final_url, &body).ok_or_else(|| FetchError::Decode {
        url: ARCHIVE_URL.to_string(),
        reason: "no joke page id in redirect, canonical link or body".into(),
    })
}

/// Redirect target first, then the canonical link, then any joke link.
pub fn latest_page_id(final_url: &str, body: &str) -> Option<i64> {
    URL_ID_RE
        .captures(final_url)
        .or_else(|| CANONICAL_RE.captures(body))
        .or_else(|| BODY_ID_RE.captures(body))
        .and_then(|caps| caps[1].parse().ok())
}
