use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use common::DatesConfig;

/// `<day> <MON> <year>`, e.g. "20 GEN 2026"; matched on upper-cased text
static RE_DATE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})\s+([A-Z]{3})\s+(\d{4})").unwrap());

/// Parses the day/month-code/year tokens the listing pages print on each item.
#[derive(Debug, Clone)]
pub struct DateGate {
    months: HashMap<String, u32>,
}

impl DateGate {
    pub fn new(config: &DatesConfig) -> Self {
        let months = config
            .months
            .iter()
            .map(|(code, month)| (code.to_uppercase(), *month))
            .collect();
        Self { months }
    }

    /// First date token found in `text`, or `None` when there is no token,
    /// the month code is unknown, or the day does not exist in that month.
    pub fn parse_local_date(&self, text: &str) -> Option<NaiveDate> {
        let upper = text.to_uppercase();
        let caps = RE_DATE_TOKEN.captures(&upper)?;

        let day: u32 = caps[1].parse().ok()?;
        let month = *self.months.get(&caps[2])?;
        let year: i32 = caps[3].parse().ok()?;

        NaiveDate::from_ymd_opt(year, month, day)
    }
}

impl Default for DateGate {
    fn default() -> Self {
        Self::new(&DatesConfig::default())
    }
}

/// [`DateGate::parse_local_date`] with the built-in Italian month table.
pub fn parse_local_date(text: &str) -> Option<NaiveDate> {
    static DEFAULT_GATE: Lazy<DateGate> = Lazy::new(DateGate::default);
    DEFAULT_GATE.parse_local_date(text)
}
