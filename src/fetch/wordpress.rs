//! WordPress REST API paging (`/wp-json/wp/v2/posts`).

use reqwest::StatusCode;
use serde::Deserialize;

use super::{body_text, HttpClient};
use crate::error::FetchError;
use crate::model::{RawPost, Source};

pub const LATENIGHTER_API: &str = "https://latenighter.com/wp-json/wp/v2/posts";
pub const LATENIGHTER_MONOLOGUE_TAG: i64 = 180;
pub const SCRAPS_API: &str = "https://scrapsfromtheloft.com/wp-json/wp/v2/posts";

const PER_PAGE: u32 = 100;
const FIELDS: &str = "id,date,link,title,content";
const TOTAL_PAGES_HEADER: &str = "X-WP-TotalPages";

#[derive(Debug, Default, Deserialize)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

#[derive(Debug, Deserialize)]
pub struct WpPost {
    pub id: i64,
    pub date: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub title: Rendered,
    #[serde(default)]
    pub content: Rendered,
}

impl WpPost {
    pub fn into_raw(self, source: Source) -> RawPost {
        RawPost {
            id: self.id,
            publish_date: self.date,
            title: self.title.rendered,
            link: self.link,
            content: self.content.rendered,
            source,
        }
    }
}

/// One page of posts plus the total page count the API reported.
#[derive(Debug)]
pub struct PostsPage {
    pub posts: Vec<RawPost>,
    pub total_pages: Option<u32>,
}

impl PostsPage {
    pub fn is_last(&self, page: u32) -> bool {
        self.posts.is_empty() || self.total_pages.is_some_and(|total| page >= total)
    }
}

pub fn parse_posts(json: &str, source: Source) -> Result<Vec<RawPost>, serde_json::Error> {
    let posts: Vec<WpPost> = serde_json::from_str(json)?;
    Ok(posts.into_iter().map(|p| p.into_raw(source)).collect())
}

/// Fetch page `page` (1-based) of posts tagged `tag`. `None` once the API
/// answers 400, which it does for pages past the end.
pub async fn fetch_page(
    client: &HttpClient,
    api: &str,
    source: Source,
    tag: i64,
    page: u32,
) -> Result<Option<PostsPage>, FetchError> {
    let query = [
        ("tags", tag.to_string()),
        ("per_page", PER_PAGE.to_string()),
        ("page", page.to_string()),
        ("_fields", FIELDS.to_string()),
    ];
    let resp = client.get(api, &query).await?;
    let status = resp.status();
    if status == StatusCode::BAD_REQUEST {
        return Ok(None);
    }
    if !status.is_success() {
        return Err(FetchError::Status { url: api.to_string(), status: status.as_u16() });
    }

    let total_pages = resp
        .headers()
        .get(TOTAL_PAGES_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok());
    let body = body_text(resp).await?;
    let posts = parse_posts(&body, source).map_err(|e| FetchError::Decode {
        url: api.to_string(),
        reason: e.to_string(),
    })?;
    Ok(Some(PostsPage { posts, total_pages }))
}
