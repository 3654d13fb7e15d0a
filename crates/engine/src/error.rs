//! The module contains the errors the engine can throw.
//!
//! The errors fall in three families:
//!
//! - validation errors ([`MissingName`], [`MissingSelection`],
//!   [`InvalidQuantity`], [`InvalidAmount`], [`ConfirmationRequired`],
//!   [`Busy`]) are raised before any computation or I/O happens and leave the
//!   worksheet untouched;
//! - [`KeyNotFound`] is raised when a line or a saved scenario does not exist;
//! - storage errors ([`Database`], [`Storage`], [`Export`]) come from the
//!   persistence adapter or from writing export bytes.
//!
//! The computation itself never fails: every division is guarded.
//!
//!  [`MissingName`]: EngineError::MissingName
//!  [`MissingSelection`]: EngineError::MissingSelection
//!  [`InvalidQuantity`]: EngineError::InvalidQuantity
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`ConfirmationRequired`]: EngineError::ConfirmationRequired
//!  [`Busy`]: EngineError::Busy
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Database`]: EngineError::Database
//!  [`Storage`]: EngineError::Storage
//!  [`Export`]: EngineError::Export
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0} name must not be empty")]
    MissingName(String),
    #[error("No catalog variant selected")]
    MissingSelection,
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Confirmation required: {0}")]
    ConfirmationRequired(String),
    #[error("A {0} is already in progress")]
    Busy(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Export failed: {0}")]
    Export(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Returns `true` for failures of the persistence layer.
    #[must_use]
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Database(_))
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::MissingName(a), Self::MissingName(b)) => a == b,
            (Self::MissingSelection, Self::MissingSelection) => true,
            (Self::InvalidQuantity(a), Self::InvalidQuantity(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::ConfirmationRequired(a), Self::ConfirmationRequired(b)) => a == b,
            (Self::Busy(a), Self::Busy(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Storage(a), Self::Storage(b)) => a == b,
            (Self::Export(a), Self::Export(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
