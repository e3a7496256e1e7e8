use chrono::{Duration, NaiveDateTime, NaiveTime};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("invalid run time {0:?}: expected HH:MM")]
    InvalidTime(String),
    #[error("no run times configured")]
    Empty,
}

/// Daily wall-clock run times, sorted and deduplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    times: Vec<NaiveTime>,
}

impl Schedule {
    /// Parse `"HH:MM"` entries as found in `scheduler.times`.
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> Result<Self, ScheduleError> {
        let mut times = entries
            .iter()
            .map(|raw| {
                let raw = raw.as_ref().trim();
                NaiveTime::parse_from_str(raw, "%H:%M")
                    .map_err(|_| ScheduleError::InvalidTime(raw.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if times.is_empty() {
            return Err(ScheduleError::Empty);
        }
        times.sort();
        times.dedup();
        Ok(Self { times })
    }

    pub fn times(&self) -> &[NaiveTime] {
        &self.times
    }

    /// First scheduled instant strictly after `now`.
    pub fn next_after(&self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date();
        if let Some(t) = self.times.iter().find(|t| today.and_time(**t) > now) {
            return today.and_time(*t);
        }
        // past the last slot: first slot tomorrow
        (today + Duration::days(1)).and_time(self.times[0])
    }

    /// How long to sleep from `now` until the next run.
    pub fn wait_from(&self, now: NaiveDateTime) -> std::time::Duration {
        (self.next_after(now) - now)
            .to_std()
            .unwrap_or(std::time::Duration::ZERO)
    }
}
