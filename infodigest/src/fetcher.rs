use common::{ElementSignature, SourceConfig};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::document::{DocumentNode, HtmlDocument, StructuredDocument};
use crate::error::FetchError;
use crate::models::ArticleStub;

/// Retrieves a page body. Listing and detail pages both go through this.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// `reqwest` fetcher with the scraping timeout and user agent applied.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout_secs: u64) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()
            .map_err(|source| FetchError::Request {
                url: String::new(),
                source,
            })?;
        Ok(Self { client })
    }

    pub fn from_config(source: &SourceConfig) -> Result<Self, FetchError> {
        Self::new(&source.user_agent, source.fetch_timeout_seconds)
    }
}

#[async_trait::async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let request_error = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(request_error)?;
        debug!(%url, bytes = body.len(), "fetched page");
        Ok(body)
    }
}

/// Flattened text of the detail page's content section, `None` when the
/// section is missing or empty.
pub fn article_text_from_html(body: &str, content: &ElementSignature) -> Option<String> {
    let doc = HtmlDocument::parse(body);
    doc.find_container(content)
        .map(|section| section.flat_text(" "))
        .filter(|text| !text.is_empty())
}

/// Fetches a detail page and extracts its body text.
pub async fn fetch_article_text<F: PageFetcher + ?Sized>(
    fetcher: &F,
    url: &Url,
    content: &ElementSignature,
) -> Result<Option<String>, FetchError> {
    info!(%url, "reading article");
    let body = fetcher.fetch(url).await?;
    Ok(article_text_from_html(&body, content))
}

/// Full article text for a stub: the detail page when it can be read and is
/// non-empty, otherwise the stub's own flattened text.
pub async fn resolve_article_text<F: PageFetcher + ?Sized>(
    fetcher: &F,
    stub: &ArticleStub,
    content: &ElementSignature,
) -> String {
    if let Some(url) = &stub.detail_link {
        match fetch_article_text(fetcher, url, content).await {
            Ok(Some(text)) => return text,
            Ok(None) => debug!(%url, "article page has no content section; using listing text"),
            Err(e) => warn!(%url, error = %e, "failed to read article; using listing text"),
        }
    }
    stub.raw_text.clone()
}
