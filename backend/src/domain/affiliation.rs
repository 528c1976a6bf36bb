//! Affiliation groups scope live notifications to one college.

use std::fmt;

use serde::{Deserialize, Serialize};

const GROUP_PREFIX: &str = "college-";

/// Normalised broadcast group name derived from an affiliation string.
///
/// Listeners and the ingest service both derive the group through
/// [`AffiliationGroup::from_affiliation`], so the two always agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AffiliationGroup(String);

impl AffiliationGroup {
    /// Normalise a college name: trim, collapse whitespace runs to `-`,
    /// lowercase, then prefix. Blank input yields `None`.
    ///
    /// # Examples
    /// ```
    /// use campus_trade::domain::AffiliationGroup;
    ///
    /// let group = AffiliationGroup::from_affiliation("IIT  Delhi").expect("group");
    /// assert_eq!(group.as_str(), "college-iit-delhi");
    /// assert!(AffiliationGroup::from_affiliation("   ").is_none());
    /// ```
    pub fn from_affiliation(affiliation: &str) -> Option<Self> {
        let words: Vec<&str> = affiliation.split_whitespace().collect();
        if words.is_empty() {
            return None;
        }
        let slug = words.join("-").to_lowercase();
        Some(Self(format!("{GROUP_PREFIX}{slug}")))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for AffiliationGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
