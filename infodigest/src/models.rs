use chrono::NaiveDate;
use serde::Serialize;
use url::Url;

/// One listing entry before full-text enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleStub {
    /// Card title, empty when the item has none
    pub title: String,
    /// Flattened text of the whole item; carries the date token and doubles
    /// as the body when the detail page cannot be read
    pub raw_text: String,
    pub detail_link: Option<Url>,
}

/// A kept, dated, filtered notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleRecord {
    pub title: String,
    pub date: NaiveDate,
    pub text: String,
    pub url: Option<Url>,
}

/// Why the listing scan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// A page had no items at all
    EmptyPage,
    /// An item older than the reference day was reached
    PastDate,
    /// `max_pages` pages were scanned
    PageLimit,
}

/// Records of one run, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsBatch {
    pub reference_day: NaiveDate,
    pub records: Vec<ArticleRecord>,
    pub pages_fetched: u32,
    pub stop_reason: StopReason,
}

impl NewsBatch {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
