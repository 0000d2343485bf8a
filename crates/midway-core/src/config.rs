//! # Pricing Configuration
//!
//! Venue settings the pricing pass reads. Pure data: loading it from a file
//! or the environment is the caller's job.
//!
//! ```toml
//! tax_rate = 825
//! tax_title = "Sales Tax"
//! auto_fulfilled_categories = ["drinks", "merchandise"]
//! default_station = "pickup"
//! wildcard_class = 255000
//! unmerged_categories = ["food"]
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{ModClassId, Rate};

/// Settings for one venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Sales tax in basis points.
    pub tax_rate: Rate,

    /// Title of the tax line.
    pub tax_title: String,

    /// Kitchen tickets for these categories start prepared and fulfilled
    /// (substring match on the category).
    pub auto_fulfilled_categories: Vec<String>,

    /// KDS station used when neither the item nor the property names one.
    pub default_station: String,

    /// Composite modifier class that is offered in every scope.
    pub wildcard_class: ModClassId,

    /// Categories whose repeated adds always start a new line.
    pub unmerged_categories: Vec<String>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        PricingConfig {
            tax_rate: Rate::from_bps(825),
            tax_title: "Sales Tax".to_string(),
            auto_fulfilled_categories: vec!["drinks".to_string(), "merchandise".to_string()],
            default_station: "pickup".to_string(),
            wildcard_class: 255_000,
            unmerged_categories: vec!["food".to_string()],
        }
    }
}

impl PricingConfig {
    /// True if a ticket for `category` starts prepared and fulfilled.
    pub fn is_auto_fulfilled(&self, category: Option<&str>) -> bool {
        category.is_some_and(|category| {
            self.auto_fulfilled_categories
                .iter()
                .any(|auto| category.contains(auto.as_str()))
        })
    }

    /// True if repeated adds of `category` must not merge.
    pub fn is_unmerged(&self, category: Option<&str>) -> bool {
        category.is_some_and(|category| {
            self.unmerged_categories
                .iter()
                .any(|unmerged| category.eq_ignore_ascii_case(unmerged))
        })
    }

    /// Station for a routing entry, falling back to the default.
    pub fn station_or_default<'a>(&'a self, station: Option<&'a str>) -> &'a str {
        match station {
            Some(station) if !station.is_empty() => station,
            _ => &self.default_station,
        }
    }
}
