//! Property-based tests for freshness cutoffs and history normalization.
//!
//! These tests verify that universal properties hold across all valid inputs,
//! using the `proptest` crate for random test case generation.

use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use marketcache_core::history::HistoryFreshness;
use marketcache_market_data::{DateRange, Hist, HistoryEntry};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashSet;

// =============================================================================
// Generators
// =============================================================================

/// Generates a date between 2000-01-01 and roughly 2040.
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..15_000).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2000, 1, 1).unwrap() + Duration::days(offset)
    })
}

fn arb_entry() -> impl Strategy<Value = HistoryEntry> {
    (arb_date(), 1i64..100_000, 0i64..10_000_000).prop_map(|(date, cents, volume)| {
        let price = Decimal::new(cents, 2);
        HistoryEntry {
            date,
            open: price,
            high: price,
            low: price,
            close: price,
            adj_close: price,
            volume,
        }
    })
}

fn arb_hist() -> impl Strategy<Value = Hist> {
    (
        arb_date(),
        arb_date(),
        proptest::collection::vec(arb_entry(), 0..40),
    )
        .prop_map(|(a, b, entries)| Hist::new("TEST", DateRange::new(a, b), entries))
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn normalized_entries_are_strictly_increasing(hist in arb_hist()) {
        let normalized = hist.normalized();
        for pair in normalized.entries.windows(2) {
            prop_assert!(pair[0].date < pair[1].date);
        }
    }

    #[test]
    fn normalized_window_contains_every_entry(hist in arb_hist()) {
        let original = hist.range();
        let normalized = hist.normalized();
        let window = normalized.range();
        prop_assert!(window.start <= original.start);
        prop_assert!(window.end >= original.end);
        for entry in &normalized.entries {
            prop_assert!(window.contains(entry.date));
        }
    }

    #[test]
    fn normalized_keeps_one_entry_per_distinct_date(hist in arb_hist()) {
        let distinct: HashSet<NaiveDate> = hist.entries.iter().map(|e| e.date).collect();
        let normalized = hist.normalized();
        prop_assert_eq!(normalized.entries.len(), distinct.len());
    }

    #[test]
    fn skip_weekends_cutoff_is_a_weekday_at_most_two_days_earlier(
        days in 0i64..15_000,
        hour in 0u32..24,
    ) {
        let now = Utc.with_ymd_and_hms(2000, 1, 1, hour, 0, 0).unwrap() + Duration::days(days);
        let trailing = HistoryFreshness::TrailingDay.cutoff(now);
        let skipping = HistoryFreshness::SkipWeekends.cutoff(now);

        prop_assert!(!matches!(skipping.weekday(), Weekday::Sat | Weekday::Sun));
        prop_assert!(skipping <= trailing);
        prop_assert!(trailing - skipping <= Duration::days(2));
    }

    #[test]
    fn freshness_is_monotonic_in_max_date(date in arb_date(), days in 0i64..15_000) {
        let now = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap() + Duration::days(days);
        for policy in [HistoryFreshness::TrailingDay, HistoryFreshness::SkipWeekends] {
            if policy.is_fresh(date, now) {
                prop_assert!(policy.is_fresh(date + Duration::days(1), now));
            }
        }
    }
}
