//! Client-side narrowing of an already fetched page.
//!
//! The food-type filter never reaches the index; it only hides rows of the
//! current page. Optionally the search term is re-checked locally too, over
//! the five named attributes. Matching is a case-insensitive substring test
//! and an absent attribute simply does not match.

use crate::domain::{Field, RestaurantRecord};

/// The local narrowing in effect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalFilter {
    /// Substring the record's food type must contain; empty matches all.
    pub food_type: String,
    /// Substring at least one named attribute must contain, when set.
    pub term: Option<String>,
}

impl LocalFilter {
    /// Whether the filter hides anything at all.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.food_type.is_empty() || self.term.as_deref().is_some_and(|t| !t.is_empty())
    }
}

fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
}

/// Decides whether a record stays visible under `filter`.
///
/// # Examples
///
/// ```
/// use restaurant_admin::app::local_filter::{matches, LocalFilter};
/// use restaurant_admin::domain::{Restaurant, RestaurantRecord};
///
/// let record = RestaurantRecord::new("1", Restaurant::new("Kin Khao", "Thai"));
/// let filter = LocalFilter { food_type: "THA".into(), term: None };
/// assert!(matches(&record, &filter));
/// ```
#[must_use]
pub fn matches(record: &RestaurantRecord, filter: &LocalFilter) -> bool {
    if !filter.food_type.is_empty() && !contains_ci(record.field(Field::FoodType), &filter.food_type)
    {
        return false;
    }

    match filter.term.as_deref() {
        Some(term) if !term.is_empty() => Field::ALL
            .iter()
            .any(|field| contains_ci(record.field(*field), term)),
        _ => true,
    }
}

/// Keeps the records visible under `filter`, in order.
#[must_use]
pub fn apply<'a>(records: &'a [RestaurantRecord], filter: &LocalFilter) -> Vec<&'a RestaurantRecord> {
    records.iter().filter(|record| matches(record, filter)).collect()
}
