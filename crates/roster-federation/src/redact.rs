//! Scope redaction of contact records.

use roster_types::{ContactRecord, Scope, SCOPE_PARAM};
use roster_vcard::{Property, VCard, VCardError, ValidationIssue};
use thiserror::Error;

/// Why a record cannot be disclosed after redaction.
///
/// Never surfaced to callers directly: the gate turns it into `Forbidden`,
/// an omission, or a deletion depending on the operation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RedactionError {
    #[error("stored card could not be decoded: {0}")]
    Decode(#[from] VCardError),
    #[error("card is structurally invalid after redaction ({} issues)", .0.len())]
    Invalid(Vec<ValidationIssue>),
}

/// Returns a copy of `record` without its local-only properties.
///
/// Properties whose `X-NC-SCOPE` is `v2-local` are dropped; everything
/// else keeps its original order. The remaining card must still satisfy
/// the format's required-property rules, otherwise the record is
/// undisclosable. `id` and `acl` are carried over unchanged.
pub fn redact(record: &ContactRecord) -> Result<ContactRecord, RedactionError> {
    let card = VCard::parse(&record.raw_data)?;
    let visible = card.retain(|p| !is_local_only(p));

    let issues = visible.validate();
    if !issues.is_empty() {
        return Err(RedactionError::Invalid(issues));
    }

    Ok(ContactRecord {
        id: record.id.clone(),
        raw_data: visible.serialize(),
        acl: record.acl.clone(),
    })
}

fn is_local_only(property: &Property) -> bool {
    property.param(SCOPE_PARAM).and_then(Scope::parse) == Some(Scope::Local)
}
