use chrono::{Local, NaiveDate};
use common::Config;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::delivery::Delivery;
use crate::digest::DigestComposer;
use crate::error::{FetchError, LlmError, PipelineError};
use crate::fetcher::PageFetcher;
use crate::llm::LlmProvider;
use crate::models::NewsBatch;
use crate::pagination::PaginationController;

/// What a completed run handed to the delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No notice today; the fixed "nothing today" message was sent
    NothingToday,
    /// A digest of `articles` notices was sent
    Delivered { articles: usize, summarized: bool },
}

/// One end-to-end run: scan, compose, summarize, deliver.
///
/// Holds no state between runs; every batch lives inside [`Pipeline::run_once`].
pub struct Pipeline {
    config: Config,
    fetcher: Arc<dyn PageFetcher>,
    summarizer: Option<Arc<dyn LlmProvider>>,
    delivery: Arc<dyn Delivery>,
    composer: DigestComposer,
}

impl Pipeline {
    /// `summarizer = None` delivers the verbatim digest instead of a summary.
    pub fn new(
        config: Config,
        fetcher: Arc<dyn PageFetcher>,
        summarizer: Option<Arc<dyn LlmProvider>>,
        delivery: Arc<dyn Delivery>,
    ) -> Self {
        let composer = DigestComposer::new(&config.digest);
        Self {
            config,
            fetcher,
            summarizer,
            delivery,
            composer,
        }
    }

    /// Configured reference day, or today's local date.
    pub fn reference_day(&self) -> NaiveDate {
        self.config
            .reference_day
            .unwrap_or_else(|| Local::now().date_naive())
    }

    pub async fn collect(&self, reference_day: NaiveDate) -> Result<NewsBatch, FetchError> {
        PaginationController::new(&*self.fetcher, &self.config, reference_day)?
            .collect()
            .await
    }

    /// Final message for `batch`, already cut to the delivery limit.
    ///
    /// An empty batch gives the fixed "nothing today" message without calling
    /// the summarizer.
    pub async fn compose(&self, batch: &NewsBatch) -> Result<String, LlmError> {
        if batch.is_empty() {
            return Ok(self.composer.finalize(self.composer.empty_message()));
        }

        let message = match &self.summarizer {
            Some(summarizer) => {
                let block = self.composer.prompt_block(batch);
                let user_prompt = self.composer.user_prompt(&block);
                debug!(%user_prompt, "summarization input");
                let summary = summarizer
                    .summarize(self.composer.system_prompt(), &user_prompt)
                    .await?;
                self.composer.summary_message(&summary)
            }
            None => self.composer.verbatim_message(batch),
        };
        Ok(self.composer.finalize(&message))
    }

    pub async fn run_once(&self) -> Result<RunOutcome, PipelineError> {
        let reference_day = self.reference_day();
        info!(%reference_day, "starting infomobility collection");

        let batch = self.collect(reference_day).await?;
        let message = self.compose(&batch).await?;
        self.delivery.deliver(&message).await?;

        if batch.is_empty() {
            info!("no notices for today; sent the empty-day message");
            return Ok(RunOutcome::NothingToday);
        }
        info!(articles = batch.len(), "digest delivered");
        Ok(RunOutcome::Delivered {
            articles: batch.len(),
            summarized: self.summarizer.is_some(),
        })
    }

    /// [`Pipeline::run_once`] with failures logged instead of returned.
    pub async fn run(&self) -> Option<RunOutcome> {
        let t0 = Instant::now();
        match self.run_once().await {
            Ok(outcome) => {
                info!(?outcome, elapsed_ms = t0.elapsed().as_millis() as u64, "run complete");
                Some(outcome)
            }
            Err(e) => {
                error!(error = %e, elapsed_ms = t0.elapsed().as_millis() as u64, "run aborted");
                None
            }
        }
    }
}
