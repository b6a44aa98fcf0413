//! Relevance scoring for the in-process index.
//!
//! A query is split into lowercase whitespace tokens. A record matches when
//! every token fuzzy-matches at least one searchable attribute; its score is
//! the sum, over tokens, of the best attribute score. Attributes earlier in
//! [`Field::ALL`] weigh more, so a hit on the name outranks the same hit on
//! the address, the way hosted indexes rank by attribute order.

use crate::domain::{Field, RestaurantRecord};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

/// Bonus per step of attribute priority.
const ATTRIBUTE_WEIGHT: i64 = 8;

/// Scores records against one query.
pub struct Ranker {
    tokens: Vec<String>,
    matcher: SkimMatcherV2,
}

impl Ranker {
    #[must_use]
    pub fn new(term: &str) -> Self {
        Self {
            tokens: term.split_whitespace().map(str::to_lowercase).collect(),
            matcher: SkimMatcherV2::default(),
        }
    }

    /// Returns the record's score, or `None` if it does not match.
    ///
    /// An empty query matches everything with score zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use restaurant_admin::domain::{Restaurant, RestaurantRecord};
    /// use restaurant_admin::index::ranking::Ranker;
    ///
    /// let record = RestaurantRecord::new("1", Restaurant::new("Burma Superstar", "Burmese"));
    /// assert!(Ranker::new("burma").score(&record).is_some());
    /// assert!(Ranker::new("sushi").score(&record).is_none());
    /// ```
    #[must_use]
    pub fn score(&self, record: &RestaurantRecord) -> Option<i64> {
        let mut total = 0;
        for token in &self.tokens {
            total += self.best_attribute_score(record, token)?;
        }
        Some(total)
    }

    fn best_attribute_score(&self, record: &RestaurantRecord, token: &str) -> Option<i64> {
        let attribute_count = i64::try_from(Field::ALL.len()).unwrap_or(i64::MAX);

        Field::ALL
            .iter()
            .zip(0_i64..)
            .filter_map(|(field, position)| {
                let value = record.field(*field)?.to_lowercase();
                let score = self.matcher.fuzzy_match(&value, token)?;
                Some(score + (attribute_count - position) * ATTRIBUTE_WEIGHT)
            })
            .max()
    }
}

/// Orders matching records by descending score.
///
/// The sort is stable, so equally relevant records keep the order they were
/// indexed in and pagination stays deterministic.
#[must_use]
pub fn rank<'a, I>(term: &str, records: I) -> Vec<&'a RestaurantRecord>
where
    I: IntoIterator<Item = &'a RestaurantRecord>,
{
    let ranker = Ranker::new(term);
    let mut scored: Vec<(i64, &RestaurantRecord)> = records
        .into_iter()
        .filter_map(|record| ranker.score(record).map(|score| (score, record)))
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, record)| record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Restaurant;

    fn record(id: &str, name: &str, food_type: &str, city: &str) -> RestaurantRecord {
        RestaurantRecord::new(id, Restaurant::new(name, food_type).with(Field::City, city))
    }

    #[test]
    fn every_token_must_match_some_attribute() {
        let rec = record("1", "Tartine", "Bakery", "San Francisco");

        assert!(Ranker::new("tartine francisco").score(&rec).is_some());
        assert!(Ranker::new("tartine tokyo").score(&rec).is_none());
    }

    #[test]
    fn name_hits_outrank_city_hits() {
        let by_name = record("1", "Oakland Grill", "American", "Berkeley");
        let by_city = record("2", "Commis", "American", "Oakland");

        let ranked = rank("oakland", [&by_city, &by_name]);

        let ids: Vec<_> = ranked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn empty_query_keeps_index_order() {
        let a = record("a", "A", "x", "y");
        let b = record("b", "B", "x", "y");

        let ranked = rank("   ", [&a, &b]);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].id.as_str(), "a");
    }

    #[test]
    fn absent_attributes_do_not_match() {
        let rec = RestaurantRecord::new("1", Restaurant::default());
        assert!(Ranker::new("anything").score(&rec).is_none());
    }
}
