//! Error taxonomy of the sync core
//!
//! None of these errors is fatal: every one of them is reported to the user as a notice,
//! and the component that produced it stays usable.

use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::document::{CollectionPath, DocumentId, DocumentPath};
use crate::traits::StoreError;


/// What is wrong with a single form field
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Problem {
    /// The field is mandatory and empty
    Required,
    /// The field has fewer characters than allowed
    TooShort(usize),
    /// The field does not match its expected format
    Malformed,
}

impl Display for Problem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Problem::Required => write!(f, "is required"),
            Problem::TooShort(min) => write!(f, "must have at least {} characters", min),
            Problem::Malformed => write!(f, "is malformed"),
        }
    }
}

/// A problem attached to a named field
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: &'static str,
    pub problem: Problem,
}

impl FieldIssue {
    pub fn new(field: &'static str, problem: Problem) -> Self {
        Self { field, problem }
    }
}


/// A draft failed local validation. Nothing has been sent to the store.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid form: {}", describe(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    /// Returns `Ok(())` if there is no issue at all
    pub fn check(issues: Vec<FieldIssue>) -> Result<(), Self> {
        if issues.is_empty() {
            Ok(())
        } else {
            Err(Self { issues })
        }
    }

    pub fn is_about(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }
}

fn describe(issues: &[FieldIssue]) -> String {
    issues.iter()
        .map(|issue| format!("{} {}", issue.field, issue.problem))
        .collect::<Vec<_>>()
        .join(", ")
}


/// Subscribing to a collection failed, or the subscription broke afterwards
#[derive(Debug, Error)]
#[error("subscription to {path} failed: {source}")]
pub struct SubscriptionError {
    pub path: CollectionPath,
    #[source]
    pub source: StoreError,
}


/// The kind of write that was rejected
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOp {
    Add,
    Update,
    Delete,
}

impl Display for WriteOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteOp::Add => write!(f, "add"),
            WriteOp::Update => write!(f, "update"),
            WriteOp::Delete => write!(f, "delete"),
        }
    }
}

/// The store rejected a write. No local state has been modified.
#[derive(Debug, Error)]
#[error("{op} on {target} was rejected: {source}")]
pub struct WriteError {
    pub op: WriteOp,
    pub target: String,
    #[source]
    pub source: StoreError,
}


/// Why a form action did not go through
#[derive(Debug, Error)]
pub enum FormError {
    /// Nobody is signed in, so there is no collection to write to
    #[error("no authenticated user")]
    Unauthenticated,
    /// Records of this kind can be edited, but not created from a form
    #[error("this form can only edit existing records")]
    EditOnly,
    /// The record is not one of the signed-in user's records
    #[error("{0} does not belong to the signed-in user")]
    NotOwned(DocumentId),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Write(#[from] WriteError),
}

impl WriteError {
    pub(crate) fn on_collection(op: WriteOp, path: &CollectionPath, source: StoreError) -> Self {
        Self { op, target: path.to_string(), source }
    }

    pub(crate) fn on_document(op: WriteOp, path: &DocumentPath, source: StoreError) -> Self {
        Self { op, target: path.to_string(), source }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages() {
        assert!(ValidationError::check(Vec::new()).is_ok());

        let err = ValidationError::check(vec![
            FieldIssue::new("titulo", Problem::Required),
            FieldIssue::new("username", Problem::TooShort(3)),
        ]).unwrap_err();
        assert!(err.is_about("titulo"));
        assert!(err.is_about("username") && !err.is_about("telefono"));
        assert_eq!(err.to_string(), "invalid form: titulo is required, username must have at least 3 characters");
    }
}
