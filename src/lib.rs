//! # Lunara
#![allow(non_snake_case)]
//!
//! Local-first menstrual cycle insights engine.
//!
//! This crate provides:
//! - Composite PCOS risk scoring with explainable factor contributions
//! - Pattern anomaly and clinical red-flag detection over cycle histories
//! - Weighted-moving-average cycle forecasting with calendar projection
//! - A deduplicated, persistent alert ledger
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (cycles, symptoms, assessments, alerts)
//! - `ports`: Trait definitions for external operations
//! - `adapters`: Concrete implementations (SQLite storage, log sanitization)
//! - `application`: Computation services and caller-facing orchestration

pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub use domain::{CycleRecord, RiskAssessment, RiskCategory};

/// Result type for Lunara operations
pub type Result<T> = std::result::Result<T, LunaraError>;

/// Main error type for Lunara
#[derive(Debug, thiserror::Error)]
pub enum LunaraError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Storage operation failed: {0}")]
    Storage(#[from] adapters::StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Alert ledger unavailable: {0}")]
    Ledger(String),
}
