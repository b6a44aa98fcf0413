//! Restaurant record model and pre-flight validation.
//!
//! [`Restaurant`] is the attribute body of a restaurant as the hosted index
//! stores it; it doubles as the create payload, which is why it carries no
//! identifier. [`RestaurantRecord`] is a restaurant that has been indexed and
//! therefore owns a [`RecordId`] assigned by the index.

use crate::domain::error::SyncFailure;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque identifier assigned by the search index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The named text attributes a restaurant carries.
///
/// These are the fields free-text search looks at and the only ones
/// validation can require. Everything else passes through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    FoodType,
    City,
    Address,
    PhoneNumber,
}

impl Field {
    /// Every searchable field, in display order.
    pub const ALL: [Self; 5] = [
        Self::Name,
        Self::FoodType,
        Self::City,
        Self::Address,
        Self::PhoneNumber,
    ];

    /// Human-readable label used in form errors.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::FoodType => "food type",
            Self::City => "city",
            Self::Address => "address",
            Self::PhoneNumber => "phone number",
        }
    }
}

/// Which fields `create` insists on.
///
/// The strict profile is the default: a restaurant without a way to reach
/// or find it is not worth indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationProfile {
    /// Name and food type only.
    Minimal,
    /// Name, food type, address, phone number and city.
    #[default]
    Strict,
}

impl ValidationProfile {
    #[must_use]
    pub const fn required(self) -> &'static [Field] {
        match self {
            Self::Minimal => &[Field::Name, Field::FoodType],
            Self::Strict => &[
                Field::Name,
                Field::FoodType,
                Field::Address,
                Field::PhoneNumber,
                Field::City,
            ],
        }
    }

    /// Parses a profile name, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "minimal" => Some(Self::Minimal),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }
}

/// Attribute body of a restaurant.
///
/// Uses the hosted index's attribute names (`food_type`, `phone_number`).
/// Attributes the admin does not interpret (price range, stars,
/// neighborhood, image URLs, ...) are kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,

    /// Pass-through attributes.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Restaurant {
    /// Starts a restaurant with its two always-required attributes.
    ///
    /// # Examples
    ///
    /// ```
    /// use restaurant_admin::domain::{Field, Restaurant};
    ///
    /// let draft = Restaurant::new("Chez Panisse", "Californian")
    ///     .with(Field::City, "Berkeley");
    /// assert_eq!(draft.field(Field::City), Some("Berkeley"));
    /// ```
    pub fn new(name: impl Into<String>, food_type: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            food_type: Some(food_type.into()),
            ..Self::default()
        }
    }

    /// Sets one of the named attributes.
    #[must_use]
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        *self.slot_mut(field) = Some(value.into());
        self
    }

    /// Sets a pass-through attribute.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Returns a named attribute.
    ///
    /// A missing or blank phone number falls back to the legacy `phone`
    /// attribute some records were indexed with.
    #[must_use]
    pub fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => self.name.as_deref(),
            Field::FoodType => self.food_type.as_deref(),
            Field::City => self.city.as_deref(),
            Field::Address => self.address.as_deref(),
            Field::PhoneNumber => self
                .phone_number
                .as_deref()
                .filter(|number| !number.trim().is_empty())
                .or_else(|| self.extra.get("phone").and_then(serde_json::Value::as_str)),
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Name => &mut self.name,
            Field::FoodType => &mut self.food_type,
            Field::City => &mut self.city,
            Field::Address => &mut self.address,
            Field::PhoneNumber => &mut self.phone_number,
        }
    }

    /// Lists every field the profile requires that is absent or blank.
    #[must_use]
    pub fn missing_fields(&self, profile: ValidationProfile) -> Vec<Field> {
        profile
            .required()
            .iter()
            .copied()
            .filter(|field| self.field(*field).map_or(true, |v| v.trim().is_empty()))
            .collect()
    }

    /// Checks the restaurant against a validation profile.
    ///
    /// # Errors
    ///
    /// Returns [`SyncFailure::ValidationFailed`] naming all missing fields,
    /// not just the first one.
    pub fn validate(&self, profile: ValidationProfile) -> Result<(), SyncFailure> {
        let missing = self.missing_fields(profile);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SyncFailure::ValidationFailed { missing })
        }
    }

    /// Trims the named attributes and drops the ones left blank.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        for field in Field::ALL {
            let slot = self.slot_mut(field);
            *slot = slot
                .take()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
        }
        self
    }
}

/// A restaurant as stored in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantRecord {
    #[serde(rename = "objectID")]
    pub id: RecordId,

    #[serde(flatten)]
    pub restaurant: Restaurant,
}

impl RestaurantRecord {
    pub fn new(id: impl Into<RecordId>, restaurant: Restaurant) -> Self {
        Self {
            id: id.into(),
            restaurant,
        }
    }

    #[must_use]
    pub fn field(&self, field: Field) -> Option<&str> {
        self.restaurant.field(field)
    }
}
