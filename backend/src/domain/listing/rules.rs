//! Configurable product constants used by listing validation.

use super::Condition;

/// Upper bound on images attached to a single listing.
pub const MAX_LISTING_IMAGES: usize = 5;

const DEFAULT_CATEGORIES: [&str; 6] = [
    "books",
    "electronics",
    "cycles",
    "hostel-needs",
    "accessories",
    "other",
];

const DEFAULT_MEETUP_LOCATIONS: [&str; 5] = ["canteen", "library", "main-gate", "hostel", "other"];

/// Validation thresholds and allowed tag sets for new listings.
///
/// The tag sets are product configuration rather than protocol, so the
/// server may override them at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRules {
    pub title_min_chars: usize,
    pub description_min_chars: usize,
    pub categories: Vec<String>,
    pub meetup_locations: Vec<String>,
    pub default_condition: Condition,
    pub max_images: usize,
}

impl ListingRules {
    /// Replace the category set when `categories` is non-empty.
    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        if !categories.is_empty() {
            self.categories = categories;
        }
        self
    }

    /// Replace the meetup-location set when `locations` is non-empty.
    pub fn with_meetup_locations(mut self, locations: Vec<String>) -> Self {
        if !locations.is_empty() {
            self.meetup_locations = locations;
        }
        self
    }

    pub fn allows_category(&self, value: &str) -> bool {
        self.categories.iter().any(|c| c == value)
    }

    pub fn allows_meetup_location(&self, value: &str) -> bool {
        self.meetup_locations.iter().any(|l| l == value)
    }
}

impl Default for ListingRules {
    fn default() -> Self {
        Self {
            title_min_chars: 5,
            description_min_chars: 10,
            categories: DEFAULT_CATEGORIES.iter().map(|s| (*s).to_owned()).collect(),
            meetup_locations: DEFAULT_MEETUP_LOCATIONS
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            default_condition: Condition::default(),
            max_images: MAX_LISTING_IMAGES,
        }
    }
}
