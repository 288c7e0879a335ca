//! # Supplier
//!
//! A supplier as returned by discovery. Suppliers are immutable once
//! discovered and are owned by the engine for the duration of a run.
//!
//! Emissions intensity is nominally normalized to `[0, 1]` and the
//! compliance flag count nominally ranges over `0..=5`, but neither range
//! is guaranteed by the data source. Out-of-range values are accepted here
//! and clamped by the scorer.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::identity::SupplierId;

/// Maximum length of free-text supplier fields.
pub const MAX_FIELD_LEN: usize = 255;

/// A discovered supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    /// Unique supplier identifier.
    pub id: SupplierId,
    /// Supplier display name.
    pub name: String,
    /// Industry classification (e.g. "Steel", "Electronics").
    pub industry: String,
    /// Location, usually "City, Country".
    pub location: String,
    /// Estimated emissions intensity, nominally in `[0, 1]`.
    #[serde(alias = "estimated_emissions", alias = "estimatedEmissions")]
    pub emissions: f64,
    /// Count of past compliance flags, nominally `0..=5`.
    #[serde(alias = "complianceFlags")]
    pub compliance_flags: u32,
}

impl Supplier {
    /// Create a supplier, validating the text fields.
    ///
    /// Numeric fields are accepted as-is.
    pub fn new(
        id: SupplierId,
        name: impl Into<String>,
        industry: impl Into<String>,
        location: impl Into<String>,
        emissions: f64,
        compliance_flags: u32,
    ) -> Result<Self, ValidationError> {
        let supplier = Self {
            id,
            name: name.into(),
            industry: industry.into(),
            location: location.into(),
            emissions,
            compliance_flags,
        };
        supplier.validate()?;
        Ok(supplier)
    }

    /// Check the text-field rules. Used for suppliers that arrive through
    /// deserialization rather than [`Supplier::new`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Empty { field: "name" });
        }
        for (field, value) in [
            ("name", &self.name),
            ("industry", &self.industry),
            ("location", &self.location),
        ] {
            if value.chars().count() > MAX_FIELD_LEN {
                return Err(ValidationError::TooLong {
                    field,
                    max: MAX_FIELD_LEN,
                });
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for Supplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
