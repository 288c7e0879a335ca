//! # Error Types
//!
//! Errors raised by core type constructors and record mutation. All errors
//! use `thiserror` for derive-based `Display` and `Error` implementations.

use thiserror::Error;

use crate::disposition::Disposition;

/// Input rejected by a validating constructor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field was empty or whitespace.
    #[error("{field} must not be empty")]
    Empty {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A text field exceeded its maximum length.
    #[error("{field} must not exceed {max} characters")]
    TooLong {
        /// Name of the offending field.
        field: &'static str,
        /// Maximum permitted length.
        max: usize,
    },

    /// A name did not map to a known variant.
    #[error("unknown {kind}: {value:?}")]
    UnknownVariant {
        /// The kind of value being parsed.
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// A timestamp string could not be parsed.
    #[error("invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp {
        /// The rejected input.
        value: String,
        /// Parser message.
        reason: String,
    },
}

/// Rejected mutation of an [`AuditRecord`](crate::AuditRecord).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Only records awaiting human review can be resolved.
    #[error("record for supplier {supplier_id} is {disposition}, not awaiting review")]
    NotAwaitingReview {
        /// Supplier whose record was targeted.
        supplier_id: String,
        /// The disposition the record actually carries.
        disposition: Disposition,
    },
}
