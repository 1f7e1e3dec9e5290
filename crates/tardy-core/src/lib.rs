//! # tardy-core
//!
//! Host-facing abstractions and DSP units for the Tardy delay plugins.
//!
//! A host framework owns the ports and drives a [`Module`] through its
//! lifecycle; this crate defines that contract and the building blocks a
//! module is made of. Binding ports to a concrete plugin format (LV2, VST3,
//! CLAP, ...) is left to format wrappers.
//!
//! ## Main Traits
//!
//! - [`Module`] - Lifecycle hooks the host invokes
//! - [`StateDumper`] / [`Dumpable`] - Diagnostic state walk
//!
//! ## Types
//!
//! - [`PluginMeta`] - Static descriptor with the port table
//! - [`Factory`] - Descriptor registry and module constructor
//! - [`Port`], [`PortSet`], [`PortMeta`] - Typed host bindings
//! - [`Block`] - Per-call audio buffers
//! - [`Delay`] - Circular delay line with ramped delay changes
//! - [`Bypass`] - Click-free bypass crossfader
//! - [`PluginError`] - Error types

pub mod buffer;
pub mod bypass;
pub mod delay;
pub mod dump;
pub mod error;
pub mod factory;
pub mod meta;
pub mod module;
pub mod port;
pub mod state;
pub mod types;
pub mod units;

// Re-exports for convenience
pub use buffer::Block;
pub use bypass::{Bypass, BypassState, CrossfadeCurve, BYPASS_TIME};
pub use delay::Delay;
pub use dump::{Dumpable, JsonDumper, StateDumper};
pub use error::{PluginError, PluginResult};
pub use factory::{Constructor, Factory};
pub use meta::{Extensions, PluginMeta, Version};
pub use module::Module;
pub use port::{
    AudioPort, ControlPort, MeterPort, Port, PortKind, PortMeta, PortSet, Unit, GAIN_AMP_P_20_DB,
    GAIN_AMP_P_48_DB,
};
pub use types::{BUFFER_SIZE, MAX_CHANNELS};
