//! Required-property rules.

use crate::VCard;
use thiserror::Error;

/// A structural rule the card violates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("required property {0} is missing")]
    MissingProperty(&'static str),
    #[error("property {0} may appear only once")]
    DuplicateProperty(&'static str),
    #[error("unsupported vCard version {0:?}")]
    UnsupportedVersion(String),
}

pub(crate) fn validate(card: &VCard) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let versions: Vec<&str> = card.get_all("VERSION").map(|p| p.value.trim()).collect();
    let version = match versions.as_slice() {
        [] => {
            issues.push(ValidationIssue::MissingProperty("VERSION"));
            None
        }
        [v] if *v == "3.0" || *v == "4.0" => Some(*v),
        [v] => {
            issues.push(ValidationIssue::UnsupportedVersion((*v).to_string()));
            None
        }
        _ => {
            issues.push(ValidationIssue::DuplicateProperty("VERSION"));
            None
        }
    };

    match card.get_all("FN").count() {
        0 => issues.push(ValidationIssue::MissingProperty("FN")),
        1 => {}
        _ => issues.push(ValidationIssue::DuplicateProperty("FN")),
    }

    if version == Some("3.0") {
        match card.get_all("N").count() {
            0 => issues.push(ValidationIssue::MissingProperty("N")),
            1 => {}
            _ => issues.push(ValidationIssue::DuplicateProperty("N")),
        }
    }

    match card.get_all("UID").count() {
        0 => issues.push(ValidationIssue::MissingProperty("UID")),
        1 => {}
        _ => issues.push(ValidationIssue::DuplicateProperty("UID")),
    }

    if !issues.is_empty() {
        tracing::trace!(issues = issues.len(), "card failed validation");
    }

    issues
}
