//! GitHub code search provider
//!
//! Uses GitHub's official REST API (`/search/code`) with text-match
//! fragments as descriptions.

use super::traits::*;
use crate::config::GithubSettings;
use crate::network::HttpClient;
use crate::results::RawResult;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use url::form_urlencoded;

/// Longest description kept, in bytes
const MAX_DESCRIPTION: usize = 255;

/// GitHub code search provider
pub struct GitHub {
    client: HttpClient,
    url: String,
    token: Option<String>,
    search_user: Option<String>,
}

impl GitHub {
    pub const NAME: &'static str = "github";
    pub const TITLE: &'static str = "Github";

    pub fn new(client: HttpClient, settings: &GithubSettings) -> Self {
        Self {
            client,
            url: settings.url.trim_end_matches('/').to_string(),
            token: settings.token.clone().filter(|t| !t.is_empty()),
            search_user: settings.search_user.clone().filter(|u| !u.is_empty()),
        }
    }

    /// Build the search URL for the given arguments
    fn search_url(&self, args: &SearchArgs) -> String {
        let page = if args.page < 1 { 1 } else { args.page };
        let mut url = format!(
            "{}/search/code?page={}&per_page=10&q={}",
            self.url,
            page,
            escape(&args.keyword)
        );
        if let Some(ref user) = self.search_user {
            url.push_str("+user:");
            url.push_str(&escape(user));
        }
        url
    }
}

#[async_trait]
impl Searcher for GitHub {
    async fn search(&self, ctx: &SearchContext, args: &SearchArgs) -> Result<Vec<RawResult>> {
        let mut request = self
            .client
            .get(&self.search_url(args))
            .header("Accept", "application/vnd.github.v3.text-match+json");
        if let Some(ref token) = self.token {
            request = request.header("Authorization", format!("token {}", token));
        }

        let response = self
            .client
            .send(ctx, request)
            .await
            .context("failed to fetch data")?;
        if !response.is_success() {
            return Err(anyhow!("bad response: {}", response.status));
        }

        let body: SearchResponse = response
            .json()
            .context("failed to unmarshal JSON data")?;

        Ok(body.items.into_iter().filter_map(SearchItem::into_raw).collect())
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    path: String,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    repository: Repository,
    #[serde(default)]
    text_matches: Vec<TextMatch>,
}

#[derive(Debug, Default, Deserialize)]
struct Repository {
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TextMatch {
    #[serde(default)]
    fragment: String,
}

impl SearchItem {
    /// Items without a link can't be opened and are skipped
    fn into_raw(self) -> Option<RawResult> {
        if self.html_url.is_empty() {
            return None;
        }

        let description = if self.text_matches.is_empty() {
            self.repository.description.unwrap_or_default()
        } else {
            self.text_matches
                .iter()
                .map(|m| format!("{}...", m.fragment))
                .collect()
        };

        let title = format!(
            "{}/{}",
            self.repository.full_name,
            self.path.trim_start_matches('/')
        );

        Some(RawResult::new(self.html_url, title).with_description(clean_description(&description)))
    }
}

fn escape(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Trim the trailing ellipsis and cap the length
fn clean_description(description: &str) -> String {
    let trimmed = description
        .strip_suffix("...")
        .unwrap_or(description)
        .trim();

    if trimmed.len() <= MAX_DESCRIPTION {
        return trimmed.to_string();
    }

    let mut end = MAX_DESCRIPTION - 3;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &trimmed[..end])
}
