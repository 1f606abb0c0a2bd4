//! Error Types
//!
//! This module defines the error types used throughout the renderer.
//!
//! # Overview
//!
//! The main error type [`PrismError`] covers all failure modes including:
//! - Scene validation failures during pressing
//! - Render buffer and profile validation
//! - Engine state machine violations
//!
//! All public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, PrismError>`.
//!
//! Numerical trouble on the hot path is deliberately *not* an error:
//! total internal reflection flows through sampling as an impossible
//! sample, and non-finite radiance is clamped to black and counted on
//! the progress interface.

use thiserror::Error;

use crate::engine::EngineState;

/// The main error type for the renderer.
#[derive(Error, Debug)]
pub enum PrismError {
    // ========================================================================
    // Scene Errors
    // ========================================================================
    /// The source scene cannot be pressed into a renderable form.
    #[error("Invalid scene: {0}")]
    InvalidScene(String),

    // ========================================================================
    // Render Target Errors
    // ========================================================================
    /// The render buffer is missing or has a degenerate size.
    #[error("Invalid render buffer: {0}")]
    InvalidBuffer(String),

    // ========================================================================
    // Engine Errors
    // ========================================================================
    /// The requested operation is not legal in the current engine state.
    #[error("Operation `{operation}` is not legal while the engine is {state:?}")]
    InvalidState {
        /// The operation that was attempted.
        operation: &'static str,
        /// The state the engine was in at the time.
        state: EngineState,
    },

    /// A render profile field is out of range.
    #[error("Invalid render profile: {0}")]
    InvalidProfile(String),

    // ========================================================================
    // Resource Errors
    // ========================================================================
    /// Image decoding error while loading texture pixels.
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for PrismError {
    fn from(err: image::ImageError) -> Self {
        PrismError::ImageDecode(err.to_string())
    }
}

/// Alias for `Result<T, PrismError>`.
pub type Result<T> = std::result::Result<T, PrismError>;
