//! Error types for the Tardy plugins.

use std::fmt;

use crate::port::PortKind;

/// Errors that can occur while setting up or restoring a module.
///
/// None of these are raised on the audio thread: `process` never fails, it
/// degrades to skipping a channel or passing silence instead.
#[derive(Debug)]
pub enum PluginError {
    /// Module initialization failed.
    InitializationFailed(String),
    /// Working memory could not be reserved.
    AllocationFailed(String),
    /// A port in the host-provided list does not have the kind the module
    /// expects at that position.
    PortMismatch {
        index: usize,
        expected: PortKind,
        found: Option<PortKind>,
    },
    /// State serialization/deserialization error.
    StateError(String),
    /// No descriptor with the requested identifier is registered.
    UnknownPlugin(String),
}

impl fmt::Display for PluginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Self::AllocationFailed(msg) => write!(f, "Allocation failed: {}", msg),
            Self::PortMismatch {
                index,
                expected,
                found: Some(found),
            } => write!(
                f,
                "Port mismatch at position {}: expected {:?}, found {:?}",
                index, expected, found
            ),
            Self::PortMismatch {
                index,
                expected,
                found: None,
            } => write!(
                f,
                "Port mismatch at position {}: expected {:?}, port list too short",
                index, expected
            ),
            Self::StateError(msg) => write!(f, "State error: {}", msg),
            Self::UnknownPlugin(uid) => write!(f, "Unknown plugin: {}", uid),
        }
    }
}

impl std::error::Error for PluginError {}

/// Result type for Tardy operations.
pub type PluginResult<T> = Result<T, PluginError>;
