//! # scaudit-providers — Discovery, Signal and Report Providers
//!
//! Implementations of the collaborator traits defined in
//! `scaudit-workflow`:
//!
//! | Concern | Online | Offline |
//! |---------|--------|---------|
//! | Discovery | [`HttpDiscovery`] | [`StaticDiscovery`] |
//! | Signals | [`HttpSignalProvider`] | [`HeuristicSignalProvider`] |
//! | Reports | [`HttpReportProvider`] | [`TemplateReportProvider`] |
//!
//! The online providers share one [`RiskIntelClient`]. Signal and report
//! failures degrade to the fixed fallback values and are only logged.
//! Discovery failures surface as errors and are replaced by the fallback
//! supplier list in [`discover_or_fallback`].
//!
//! ## Crate Policy
//!
//! - This crate is the only place that performs outbound HTTP.
//! - Each call is a single attempt; no retries.

pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod report;
pub mod signals;

pub use client::{DiscoveredSupplier, RiskIntelClient};
pub use config::{ConfigError, ProviderConfig};
pub use discovery::{discover_or_fallback, fallback_suppliers, HttpDiscovery, StaticDiscovery};
pub use error::ClientError;
pub use report::{HttpReportProvider, TemplateReportProvider};
pub use signals::{HeuristicSignalProvider, HttpSignalProvider};
