use std::collections::BTreeMap;

use tracing::debug;

use crate::model::{DailyRecord, Quote};

/// Folds quotes into one `DailyRecord` per date.
///
/// Within a date each speaker keeps encounter order; an identical text for the
/// same speaker is ignored rather than replacing the earlier one.
#[derive(Debug, Default)]
pub struct Aggregator {
    days: BTreeMap<String, DailyRecord>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the quote was already present for that speaker and date.
    pub fn add(&mut self, quote: Quote) -> bool {
        let record = self
            .days
            .entry(quote.date.clone())
            .or_insert_with(|| DailyRecord::new(quote.date.clone()));
        if record.quotes_for(quote.speaker.as_str()).contains(&quote.text) {
            debug!(
                source = %quote.source,
                date = %quote.date,
                speaker = quote.speaker.as_str(),
                "duplicate quote dropped"
            );
            return false;
        }
        let quotes = record.speakers.entry(quote.speaker).or_default();
        quotes.push(quote.text);
        true
    }

    pub fn extend(&mut self, quotes: impl IntoIterator<Item = Quote>) -> usize {
        quotes.into_iter().map(|q| self.add(q)).filter(|added| *added).count()
    }

    pub fn records(&self) -> impl Iterator<Item = &DailyRecord> {
        self.days.values()
    }

    /// Records in date order.
    pub fn into_records(self) -> impl Iterator<Item = DailyRecord> {
        self.days.into_values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Source, Speaker};

    fn day<'a>(agg: &'a Aggregator, date: &str) -> &'a DailyRecord {
        agg.records().find(|r| r.date == date).unwrap()
    }

    fn quote(date: &str, speaker: &str, text: &str) -> Quote {
        Quote {
            text: text.to_string(),
            speaker: Speaker::Named(speaker.to_string()),
            date: date.to_string(),
            source: Source::Scraps,
        }
    }

    #[test]
    fn identical_text_kept_once() {
        let mut agg = Aggregator::new();
        assert!(agg.add(quote("2020-01-01", "Jon Stewart", "Same joke twice, told once.")));
        assert!(!agg.add(quote("2020-01-01", "Jon Stewart", "Same joke twice, told once.")));
        let day = day(&agg, "2020-01-01");
        assert_eq!(day.quotes_for("Jon Stewart").len(), 1);
    }

    #[test]
    fn same_text_different_speakers_both_kept() {
        let mut agg = Aggregator::new();
        agg.add(quote("2020-01-01", "Jon Stewart", "A shared line for both hosts."));
        agg.add(quote("2020-01-01", "Trevor Noah", "A shared line for both hosts."));
        assert_eq!(day(&agg, "2020-01-01").quote_count(), 2);
    }

    #[test]
    fn encounter_order_and_date_order() {
        let mut agg = Aggregator::new();
        agg.add(quote("2020-01-02", "Seth Meyers", "second day first line here"));
        agg.add(quote("2020-01-01", "Seth Meyers", "first day line one here"));
        agg.add(quote("2020-01-01", "Seth Meyers", "first day line two here"));
        let dates: Vec<_> = agg.records().map(|r| r.date.clone()).collect();
        assert_eq!(dates, vec!["2020-01-01", "2020-01-02"]);
        assert_eq!(
            day(&agg, "2020-01-01").quotes_for("Seth Meyers"),
            ["first day line one here", "first day line two here"]
        );
    }

    #[test]
    fn into_records_hands_over_every_day() {
        let mut agg = Aggregator::new();
        agg.add(quote("2020-01-03", "Jon Stewart", "third day line for the show"));
        agg.add(quote("2020-01-01", "Jon Stewart", "first day line for the show"));
        agg.add(quote("2020-01-01", "Trevor Noah", "another first day line here"));
        let records: Vec<DailyRecord> = agg.into_records().collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, "2020-01-01");
        assert_eq!(records[0].quote_count(), 2);
        assert_eq!(records[1].quotes_for("Jon Stewart"), ["third day line for the show"]);
    }
}
