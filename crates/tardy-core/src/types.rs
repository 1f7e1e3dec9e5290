//! Common limits used throughout the Tardy crates.

/// Maximum number of audio channels per direction a [`Block`](crate::Block)
/// can carry.
pub const MAX_CHANNELS: usize = 32;

/// Size of the scratch chunk modules process at most at once.
///
/// Bounds intermediate memory independently of the host's block size.
pub const BUFFER_SIZE: usize = 0x1000;
