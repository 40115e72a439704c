use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use url::Url;

use crate::error::{AppError, Result};

const USER_AGENT_STRING: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Turns a URL into a title plus cleaned article text. All failures surface
/// as `AppError::Extraction` with the collaborator's diagnostic.
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<ExtractedContent>;
}

#[derive(Debug, Clone)]
pub struct ExtractedContent {
    pub title: String,
    pub content: String,
}

pub struct HttpExtractor {
    client: Client,
    title_re: Regex,
}

impl HttpExtractor {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        let title_re = Regex::new(r"(?is)<title[^>]*>(.*?)</title>")
            .expect("invalid title regex");

        Self { client, title_re }
    }

    fn extract_title(&self, html: &str, url: &str) -> String {
        let title = self
            .title_re
            .captures(html)
            .and_then(|c| c.get(1))
            .map(|m| collapse_whitespace(m.as_str()))
            .filter(|t| !t.is_empty());

        title.unwrap_or_else(|| url.to_string())
    }
}

impl Default for HttpExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentExtractor for HttpExtractor {
    async fn extract(&self, url: &str) -> Result<ExtractedContent> {
        let parsed = Url::parse(url).map_err(|e| AppError::Extraction(format!("invalid URL: {}", e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(AppError::Extraction(format!(
                "unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_STRING));

        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| AppError::Extraction(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Extraction(format!("HTTP {}", response.status())));
        }

        let html = response
            .text()
            .await
            .map_err(|e| AppError::Extraction(e.to_string()))?;

        let title = self.extract_title(&html, url);
        let content = clean_html(&html)?;

        Ok(ExtractedContent { title, content })
    }
}

/// HTML -> plain text, with blank lines and edge whitespace stripped.
fn clean_html(html: &str) -> Result<String> {
    let text = html2text::from_read(html.as_bytes(), 80)
        .map_err(|e| AppError::Extraction(format!("failed to convert HTML to text: {}", e)))?;

    let cleaned: String = text
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if cleaned.is_empty() {
        return Err(AppError::Extraction("no readable content".to_string()));
    }

    Ok(cleaned)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_pulled_from_html() {
        let extractor = HttpExtractor::new();
        let html = "<html><head><title>\n  Hello   World </title></head><body>x</body></html>";
        assert_eq!(
            extractor.extract_title(html, "https://example.com"),
            "Hello World"
        );
    }

    #[test]
    fn missing_title_falls_back_to_url() {
        let extractor = HttpExtractor::new();
        assert_eq!(
            extractor.extract_title("<html></html>", "https://example.com/a"),
            "https://example.com/a"
        );
    }

    #[test]
    fn cleaning_rejects_empty_documents() {
        assert!(matches!(clean_html(""), Err(AppError::Extraction(_))));
    }

    #[test]
    fn cleaning_strips_blank_lines() {
        let text = clean_html("<p>one</p>\n\n<p>two</p>").unwrap();
        assert_eq!(text, "one\ntwo");
    }
}
