//! The module lifecycle the host drives.
//!
//! ```text
//!   Factory::create()
//!        |
//!        v
//!   init(ports) ---------- fails --> inert (every later call is a no-op)
//!        |
//!        v
//!   update_sample_rate(sr) <-------+
//!        |                         |  between blocks only
//!        v                         |
//!   update_settings() <------------+
//!        |                         |
//!        v                         |
//!   process(block) ----------------+
//!        |
//!        v
//!   destroy()
//! ```
//!
//! # Thread Safety
//!
//! All lifecycle calls arrive sequentially on one thread. `process`,
//! `update_settings` and `update_sample_rate` are called on the audio thread
//! and must be real-time safe:
//! - No allocations (all memory is reserved in `init`)
//! - No locks
//! - No syscalls, no logging
//! - No unbounded loops

use crate::buffer::Block;
use crate::dump::StateDumper;
use crate::error::PluginResult;
use crate::meta::PluginMeta;
use crate::port::PortSet;

/// A processing module instantiated from a [`PluginMeta`].
pub trait Module: Send {
    /// The descriptor this module was created from.
    fn meta(&self) -> &'static PluginMeta;

    /// Bind ports and reserve all working memory.
    ///
    /// `ports` is in the order of the descriptor's port table. The module
    /// keeps shared handles to control and meter ports; the host keeps
    /// ownership. On failure the module stays inert and the error says why.
    fn init(&mut self, ports: &PortSet) -> PluginResult<()>;

    /// Release everything reserved by `init`. Idempotent.
    fn destroy(&mut self);

    /// Re-derive every sample-rate-dependent quantity.
    ///
    /// Called at least once before the first `process`.
    fn update_sample_rate(&mut self, sample_rate: u32);

    /// Current sample rate (0 until `update_sample_rate` was called).
    fn sample_rate(&self) -> u32;

    /// Read control ports and push the values into the processors.
    fn update_settings(&mut self);

    /// Process one block of audio.
    ///
    /// Channels whose buffers are not connected in `block` are skipped.
    fn process(&mut self, block: &mut Block<'_>);

    /// Describe the internal state for debugging.
    ///
    /// Default writes nothing.
    fn dump(&self, _v: &mut dyn StateDumper) {}

    /// Save control state to opaque bytes.
    ///
    /// Default returns an empty vector.
    fn save_state(&self) -> Vec<u8> {
        Vec::new()
    }

    /// Restore control state from bytes produced by `save_state`.
    ///
    /// Takes effect on the next `update_settings`. Default does nothing.
    fn load_state(&mut self, _data: &[u8]) -> PluginResult<()> {
        Ok(())
    }
}
