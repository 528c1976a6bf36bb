//! Field validation for new listing submissions.
//!
//! Rules run in a fixed order and every violation is collected, so a caller
//! sees all problems with a submission at once.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Condition, ListingRules, Price};

/// Text fields exactly as received from the upload layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawListingFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub category: Option<String>,
    pub meetup_location: Option<String>,
    pub condition: Option<String>,
}

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldViolation {
    /// Wire name of the offending field.
    pub field: String,
    pub message: String,
    /// Submitted value, when one was present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Validated listing fields awaiting images, seller, and an id.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub meetup_location: String,
    pub condition: Condition,
}

/// Validated owner edits to an existing listing.
///
/// Only descriptive fields appear here; status, seller, images, and view
/// counts cannot be edited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub category: Option<String>,
    pub meetup_location: Option<String>,
    pub condition: Option<Condition>,
}

impl ListingChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.meetup_location.is_none()
            && self.condition.is_none()
    }
}

type Check = fn(&RawListingFields, &ListingRules) -> bool;
type Message = fn(&ListingRules) -> String;
type Value = fn(&RawListingFields) -> Option<&String>;

struct Rule {
    field: &'static str,
    value: Value,
    check: Check,
    message: Message,
}

const RULES: &[Rule] = &[
    Rule {
        field: "title",
        value: |f| f.title.as_ref(),
        check: |f, r| trimmed(&f.title).is_some_and(|t| t.chars().count() >= r.title_min_chars),
        message: |r| format!("Title must be at least {} characters", r.title_min_chars),
    },
    Rule {
        field: "description",
        value: |f| f.description.as_ref(),
        check: |f, r| {
            trimmed(&f.description).is_some_and(|d| d.chars().count() >= r.description_min_chars)
        },
        message: |r| {
            format!(
                "Description must be at least {} characters",
                r.description_min_chars
            )
        },
    },
    Rule {
        field: "price",
        value: |f| f.price.as_ref(),
        check: |f, _| parse_price(&f.price).is_some(),
        message: |_| "Price must be a positive number".to_owned(),
    },
    Rule {
        field: "category",
        value: |f| f.category.as_ref(),
        check: |f, r| trimmed(&f.category).is_some_and(|c| r.allows_category(c)),
        message: |_| "Invalid category".to_owned(),
    },
    Rule {
        field: "meetupLocation",
        value: |f| f.meetup_location.as_ref(),
        check: |f, r| trimmed(&f.meetup_location).is_some_and(|l| r.allows_meetup_location(l)),
        message: |_| "Invalid meetup location".to_owned(),
    },
    Rule {
        field: "condition",
        value: |f| f.condition.as_ref(),
        check: |f, _| parse_condition(&f.condition).is_some(),
        message: |_| "Invalid condition".to_owned(),
    },
];

fn violation(rule: &Rule, fields: &RawListingFields, rules: &ListingRules) -> FieldViolation {
    FieldViolation {
        field: rule.field.to_owned(),
        message: (rule.message)(rules),
        value: (rule.value)(fields).cloned(),
    }
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim)
}

fn parse_price(value: &Option<String>) -> Option<Price> {
    let raw = trimmed(value)?;
    let amount = raw.parse::<f64>().ok()?;
    Price::new(amount).ok()
}

/// `None` means "explicitly supplied and unknown"; a missing or blank field
/// falls back to the default.
fn parse_condition(value: &Option<String>) -> Option<Option<Condition>> {
    match trimmed(value) {
        None | Some("") => Some(None),
        Some(raw) => raw.parse::<Condition>().ok().map(Some),
    }
}

/// Validate raw submission fields against `rules`.
///
/// Returns every violation in rule order when any check fails.
///
/// # Examples
/// ```
/// use campus_trade::domain::{ListingRules, RawListingFields, validate_submission};
///
/// let fields = RawListingFields {
///     title: Some("Calc".into()),
///     ..RawListingFields::default()
/// };
/// let violations = validate_submission(&fields, &ListingRules::default()).unwrap_err();
/// assert_eq!(violations[0].field, "title");
/// ```
pub fn validate_submission(
    fields: &RawListingFields,
    rules: &ListingRules,
) -> Result<ListingDraft, Vec<FieldViolation>> {
    let violations: Vec<FieldViolation> = RULES
        .iter()
        .filter(|rule| !(rule.check)(fields, rules))
        .map(|rule| violation(rule, fields, rules))
        .collect();

    if !violations.is_empty() {
        return Err(violations);
    }

    // Every rule passed, so each lookup below is populated.
    let (Some(title), Some(description), Some(price), Some(category), Some(location), Some(condition)) = (
        trimmed(&fields.title),
        trimmed(&fields.description),
        parse_price(&fields.price),
        trimmed(&fields.category),
        trimmed(&fields.meetup_location),
        parse_condition(&fields.condition),
    ) else {
        return Err(Vec::new());
    };

    Ok(ListingDraft {
        title: title.to_owned(),
        description: description.to_owned(),
        price,
        category: category.to_owned(),
        meetup_location: location.to_owned(),
        condition: condition.unwrap_or(rules.default_condition),
    })
}

/// Validate owner edits. Only supplied fields are checked, against the same
/// rules as a new submission; a blank `condition` leaves it unchanged.
///
/// # Examples
/// ```
/// use campus_trade::domain::{ListingRules, RawListingFields, validate_changes};
///
/// let fields = RawListingFields {
///     price: Some("18.50".into()),
///     ..RawListingFields::default()
/// };
/// let changes = validate_changes(&fields, &ListingRules::default()).unwrap();
/// assert_eq!(changes.price.map(|p| p.amount()), Some(18.5));
/// assert!(changes.title.is_none());
/// ```
pub fn validate_changes(
    fields: &RawListingFields,
    rules: &ListingRules,
) -> Result<ListingChanges, Vec<FieldViolation>> {
    let violations: Vec<FieldViolation> = RULES
        .iter()
        .filter(|rule| (rule.value)(fields).is_some() && !(rule.check)(fields, rules))
        .map(|rule| violation(rule, fields, rules))
        .collect();
    if !violations.is_empty() {
        return Err(violations);
    }

    Ok(ListingChanges {
        title: trimmed(&fields.title).map(str::to_owned),
        description: trimmed(&fields.description).map(str::to_owned),
        price: parse_price(&fields.price),
        category: trimmed(&fields.category).map(str::to_owned),
        meetup_location: trimmed(&fields.meetup_location).map(str::to_owned),
        condition: parse_condition(&fields.condition).flatten(),
    })
}
