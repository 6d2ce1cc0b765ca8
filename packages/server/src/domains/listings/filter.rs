//! Optional constraints for the public active-listings query.

use rust_decimal::Decimal;
use serde::Deserialize;

use super::ListingError;

/// Every field is optional; absent means "no constraint" and present fields
/// are ANDed together. Price and credit bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPredicate {
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_credits: Option<Decimal>,
    pub max_credits: Option<Decimal>,
    pub biome_type: Option<String>,
    pub location: Option<String>,
}

/// Raw query string values for [`FilterPredicate`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterQuery {
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub min_credits: Option<String>,
    pub max_credits: Option<String>,
    pub biome_type: Option<String>,
    pub location: Option<String>,
}

impl FilterQuery {
    pub fn into_predicate(self) -> Result<FilterPredicate, ListingError> {
        Ok(FilterPredicate {
            min_price: parse_bound("minPrice", self.min_price)?,
            max_price: parse_bound("maxPrice", self.max_price)?,
            min_credits: parse_bound("minCredits", self.min_credits)?,
            max_credits: parse_bound("maxCredits", self.max_credits)?,
            biome_type: non_empty(self.biome_type),
            location: non_empty(self.location),
        })
    }
}

impl FilterPredicate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.is_empty())
}

fn parse_bound(name: &str, raw: Option<String>) -> Result<Option<Decimal>, ListingError> {
    let Some(raw) = non_empty(raw) else {
        return Ok(None);
    };

    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|e| ListingError::Validation(format!("invalid {}: {}", name, e)))?;

    if !value.is_finite() {
        return Err(ListingError::Validation(format!(
            "invalid {}: must be a finite number",
            name
        )));
    }

    Decimal::try_from(value)
        .map(Some)
        .map_err(|e| ListingError::Validation(format!("invalid {}: {}", name, e)))
}
