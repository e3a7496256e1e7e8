//! Listing traversal: fetch pages in order, stop at the first notice older
//! than the reference day, keep dated and in-scope notices.
//!
//! The scan is a two-level state machine. [`RunScan`] walks pages
//! `1..=max_pages`; for each page a [`PageScan`] walks the stubs, and every
//! stub evaluation answers with a [`ScanSignal`] telling the loops whether to
//! go on, leave the page, or end the run.

use chrono::NaiveDate;
use common::{Config, SourceConfig, StopPolicy};
use tracing::{debug, info};
use url::Url;

use crate::dates::DateGate;
use crate::error::FetchError;
use crate::extractor::extract_stubs_from_html;
use crate::fetcher::{resolve_article_text, PageFetcher};
use crate::filter::{CategoryFilter, FilterVerdict};
use crate::models::{ArticleRecord, ArticleStub, NewsBatch, StopReason};

/// Answer of one stub evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanSignal {
    /// Go on with the next stub
    Continue,
    /// Leave this page, fetch the next one
    StopPage,
    /// End the whole scan
    StopRun,
}

/// Per-page state.
#[derive(Debug)]
pub struct PageScan {
    pub page: u32,
    pub kept: Vec<ArticleRecord>,
    pub undated: usize,
    pub rejected: usize,
}

impl PageScan {
    fn new(page: u32) -> Self {
        Self {
            page,
            kept: Vec::new(),
            undated: 0,
            rejected: 0,
        }
    }
}

/// Per-run state, accumulated across pages.
#[derive(Debug)]
pub struct RunScan {
    pub records: Vec<ArticleRecord>,
    pub pages_fetched: u32,
    pub stop_reason: Option<StopReason>,
}

impl RunScan {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            pages_fetched: 0,
            stop_reason: None,
        }
    }

    fn absorb(&mut self, page: PageScan) {
        debug!(
            page = page.page,
            kept = page.kept.len(),
            undated = page.undated,
            rejected = page.rejected,
            "page scanned"
        );
        self.records.extend(page.kept);
    }

    fn finish(self, reference_day: NaiveDate) -> NewsBatch {
        NewsBatch {
            reference_day,
            records: self.records,
            pages_fetched: self.pages_fetched,
            stop_reason: self.stop_reason.unwrap_or(StopReason::PageLimit),
        }
    }
}

pub struct PaginationController<'f, F: PageFetcher + ?Sized> {
    fetcher: &'f F,
    source: SourceConfig,
    base_url: Url,
    dates: DateGate,
    filter: CategoryFilter,
    reference_day: NaiveDate,
}

impl<'f, F: PageFetcher + ?Sized> PaginationController<'f, F> {
    pub fn new(fetcher: &'f F, config: &Config, reference_day: NaiveDate) -> Result<Self, FetchError> {
        let base_url = Url::parse(&config.source.base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", config.source.base_url, e)))?;
        Ok(Self {
            fetcher,
            source: config.source.clone(),
            base_url,
            dates: DateGate::new(&config.dates),
            filter: CategoryFilter::new(&config.filter),
            reference_day,
        })
    }

    /// Page 1 is the bare listing URL, page n is `{base}page/{n}/`.
    pub fn page_url(&self, page: u32) -> Result<Url, FetchError> {
        if page <= 1 {
            return Ok(self.base_url.clone());
        }
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join(&format!("page/{}/", page))
            .map_err(|e| FetchError::InvalidUrl(format!("page {} of {}: {}", page, self.base_url, e)))
    }

    /// Runs the scan. A listing page that cannot be fetched aborts it.
    pub async fn collect(&self) -> Result<NewsBatch, FetchError> {
        let mut run = RunScan::new();

        for page in 1..=self.source.max_pages {
            let url = self.page_url(page)?;
            info!(page, %url, "navigating listing page");
            let body = self.fetcher.fetch(&url).await?;
            run.pages_fetched += 1;

            let stubs = extract_stubs_from_html(&body, &self.source.layout, &url);
            if stubs.is_empty() {
                info!(page, "listing page has no items; stopping");
                run.stop_reason = Some(StopReason::EmptyPage);
                break;
            }

            let mut scan = PageScan::new(page);
            let mut signal = ScanSignal::Continue;
            for stub in stubs {
                signal = self.evaluate(stub, &mut scan).await;
                if signal != ScanSignal::Continue {
                    break;
                }
            }
            run.absorb(scan);

            if signal == ScanSignal::StopRun {
                run.stop_reason = Some(StopReason::PastDate);
                break;
            }
        }

        let batch = run.finish(self.reference_day);
        info!(
            kept = batch.len(),
            pages = batch.pages_fetched,
            stop_reason = ?batch.stop_reason,
            "listing scan finished"
        );
        Ok(batch)
    }

    /// Date gate, stop condition, text resolution and filter for one stub.
    async fn evaluate(&self, stub: ArticleStub, scan: &mut PageScan) -> ScanSignal {
        let Some(date) = self.dates.parse_local_date(&stub.raw_text) else {
            debug!(title = %stub.title, "no date token; skipping item");
            scan.undated += 1;
            return ScanSignal::Continue;
        };

        if date < self.reference_day {
            info!(%date, reference_day = %self.reference_day, "found an item older than the reference day; stopping");
            return match self.source.stop_policy {
                StopPolicy::Run => ScanSignal::StopRun,
                StopPolicy::Page => ScanSignal::StopPage,
            };
        }

        let text =
            resolve_article_text(self.fetcher, &stub, &self.source.layout.detail_content).await;

        match self.filter.evaluate(&text) {
            FilterVerdict::Keep => {
                debug!(title = %stub.title, %date, "keeping item");
                scan.kept.push(ArticleRecord {
                    title: stub.title,
                    date,
                    text,
                    url: stub.detail_link,
                });
            }
            FilterVerdict::Excluded(keyword) => {
                debug!(title = %stub.title, %keyword, "item mentions an excluded location; discarding");
                scan.rejected += 1;
            }
            FilterVerdict::OffTopic => {
                debug!(title = %stub.title, "item is not railway infomobility; discarding");
                scan.rejected += 1;
            }
        }
        ScanSignal::Continue
    }
}
