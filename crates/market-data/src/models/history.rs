use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Inclusive calendar date range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, swapping the bounds if they are reversed.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Window used for history requests that do not name one.
    pub fn unbounded() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN),
            end: NaiveDate::from_ymd_opt(2099, 1, 1).unwrap_or(NaiveDate::MAX),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// One trading day of a historical series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub adj_close: Decimal,
    pub volume: i64,
}

/// Daily history of one symbol over `[from, to]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hist {
    pub symbol: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub entries: Vec<HistoryEntry>,
}

impl Hist {
    pub fn new(symbol: impl Into<String>, range: DateRange, entries: Vec<HistoryEntry>) -> Self {
        Self {
            symbol: symbol.into(),
            from: range.start,
            to: range.end,
            entries,
        }
    }

    pub fn range(&self) -> DateRange {
        DateRange::new(self.from, self.to)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sort entries by date, keep the last entry for a repeated date and widen
    /// `[from, to]` so that it covers every entry.
    ///
    /// The merge replaces exactly `[from, to]`, so an entry outside the window
    /// would otherwise be inserted next to an existing row for the same date.
    pub fn normalized(mut self) -> Self {
        // stable sort keeps provider order within a date, so "last" is well defined
        self.entries.sort_by_key(|e| e.date);
        let mut deduped: Vec<HistoryEntry> = Vec::with_capacity(self.entries.len());
        for entry in self.entries.drain(..) {
            match deduped.last_mut() {
                Some(last) if last.date == entry.date => *last = entry,
                _ => deduped.push(entry),
            }
        }
        self.entries = deduped;

        let range = self.range();
        self.from = range.start;
        self.to = range.end;
        if let (Some(first), Some(last)) = (self.entries.first(), self.entries.last()) {
            self.from = self.from.min(first.date);
            self.to = self.to.max(last.date);
        }
        self
    }

    /// Shrink `[from, to]` to the dates of the first and last entry, which
    /// must be sorted. An empty history keeps its window.
    pub fn narrowed(mut self) -> Self {
        if let (Some(first), Some(last)) = (self.entries.first(), self.entries.last()) {
            self.from = first.date;
            self.to = last.date;
        }
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DividendEntry {
    pub date: NaiveDate,
    pub amount: Decimal,
}

/// Dividend payments of one symbol. Never cached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DividendHist {
    pub symbol: String,
    pub dividends: Vec<DividendEntry>,
}
