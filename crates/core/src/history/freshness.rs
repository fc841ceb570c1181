//! When stored history is recent enough to serve.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::constants::HISTORY_STALENESS_HOURS;

/// Policy deciding whether a symbol's stored history can be served.
///
/// Stored history is served when its latest date is on or after
/// [`HistoryFreshness::cutoff`]; otherwise the full series is refetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HistoryFreshness {
    /// Latest stored date must be no older than the date 24 hours ago.
    #[default]
    TrailingDay,
    /// As `TrailingDay`, but a Saturday or Sunday cutoff moves back to the
    /// preceding Friday, so Friday's close stays fresh over the weekend.
    SkipWeekends,
}

impl HistoryFreshness {
    pub fn cutoff(&self, now: DateTime<Utc>) -> NaiveDate {
        let trailing = (now - Duration::hours(HISTORY_STALENESS_HOURS)).date_naive();
        match self {
            Self::TrailingDay => trailing,
            Self::SkipWeekends => match trailing.weekday() {
                Weekday::Sat => trailing - Duration::days(1),
                Weekday::Sun => trailing - Duration::days(2),
                _ => trailing,
            },
        }
    }

    pub fn is_fresh(&self, max_date: NaiveDate, now: DateTime<Utc>) -> bool {
        max_date >= self.cutoff(now)
    }
}
