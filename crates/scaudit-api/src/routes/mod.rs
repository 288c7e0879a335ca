//! # API Route Modules
//!
//! - `audits`: audit run lifecycle: start, status, decision, cancel.

pub mod audits;
