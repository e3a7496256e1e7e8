#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use common::Config;
use infodigest::delivery::Delivery;
use infodigest::error::{DeliveryError, FetchError, LlmError};
use infodigest::fetcher::PageFetcher;
use infodigest::llm::{LlmProvider, LlmRequest, LlmResponse, UsageMetadata};
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

pub const BASE: &str = "http://eav.test/infomobilita-ferrovia/";

pub fn page(n: u32) -> String {
    if n <= 1 {
        BASE.to_string()
    } else {
        format!("{}page/{}/", BASE, n)
    }
}

pub fn detail(slug: &str) -> String {
    format!("http://eav.test/{}/", slug)
}

pub fn reference_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 20).unwrap()
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.source.base_url = BASE.to_string();
    config.reference_day = Some(reference_day());
    config
}

/// One listing card.
pub struct Card<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub slug: Option<&'a str>,
}

pub fn card<'a>(title: &'a str, body: &'a str, slug: Option<&'a str>) -> Card<'a> {
    Card { title, body, slug }
}

pub fn listing(cards: &[Card<'_>]) -> String {
    let items: String = cards
        .iter()
        .map(|c| {
            let link = c
                .slug
                .map(|s| format!(r#"<a class="read-more" href="{}">Leggi</a>"#, detail(s)))
                .unwrap_or_default();
            format!(
                r#"<article class="card"><h4 class="card-title">{}</h4><p class="card-text">{}</p>{}</article>"#,
                c.title, c.body, link
            )
        })
        .collect();
    format!(
        r#"<html><body><nav>Menu</nav><div class="card-columns">{}</div></body></html>"#,
        items
    )
}

pub fn article_page(text: &str) -> String {
    format!(
        r#"<html><body><header>EAV</header><section class="entry-content"><p>{}</p></section></body></html>"#,
        text
    )
}

/// URL → body map; anything else answers 404. Records every fetched URL.
#[derive(Default)]
pub struct MemoryFetcher {
    pages: HashMap<String, Result<String, u16>>,
    fetched: Mutex<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), Ok(body.into()));
        self
    }

    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.pages.insert(url.into(), Err(status));
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for MemoryFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        self.fetched.lock().unwrap().push(url.to_string());
        match self.pages.get(url.as_str()) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// Answers every request with a fixed reply (or error) and keeps the requests.
pub struct RecordingLlm {
    reply: Result<String, (u16, String)>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl RecordingLlm {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16, body: &str) -> Self {
        Self {
            reply: Err((status, body.to_string())),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for RecordingLlm {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request);
        match &self.reply {
            Ok(text) => Ok(LlmResponse {
                content: text.clone(),
                usage: UsageMetadata::default(),
            }),
            Err((status, body)) => Err(LlmError::Upstream {
                status: *status,
                body: body.clone(),
            }),
        }
    }
}

/// Keeps delivered messages in memory.
#[derive(Default)]
pub struct RecordingDelivery {
    messages: Mutex<Vec<String>>,
}

impl RecordingDelivery {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Delivery for RecordingDelivery {
    async fn deliver(&self, text: &str) -> Result<(), DeliveryError> {
        self.messages.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
