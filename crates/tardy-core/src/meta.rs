//! Static plugin descriptors.
//!
//! A [`PluginMeta`] is everything the host needs to know about one plugin
//! variant before instantiating it: identity, version, and the port table.
//! The port table order is the binding contract between host and module.
//!
//! # Example
//!
//! ```ignore
//! static PORTS: [PortMeta; 3] = [
//!     PortMeta::audio_in("in", "Input"),
//!     PortMeta::audio_out("out", "Output"),
//!     PortMeta::bypass(),
//! ];
//!
//! pub static MONO: PluginMeta = PluginMeta::new("my_mono", "My Plugin Mono", &PORTS)
//!     .with_acronym("MPM")
//!     .with_version(Version::new(1, 0, 0));
//! ```

use std::fmt;

use serde::Serialize;

use crate::port::{PortKind, PortMeta};

/// Semantic version of a plugin descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
    pub micro: u16,
}

impl Version {
    pub const fn new(major: u16, minor: u16, micro: u16) -> Self {
        Self {
            major,
            minor,
            micro,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)
    }
}

/// Optional capabilities a plugin advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Extensions {
    /// The module implements a meaningful diagnostic state dump.
    pub dump_state: bool,
}

/// Format-agnostic plugin descriptor.
#[derive(Debug, Clone, Serialize)]
pub struct PluginMeta {
    /// Unique identifier, also used as the factory lookup key.
    pub uid: &'static str,
    /// Plugin name displayed in the host.
    pub name: &'static str,
    /// Short acronym.
    pub acronym: &'static str,
    pub version: Version,
    pub description: &'static str,
    pub extensions: Extensions,
    /// Port table, in binding order.
    pub ports: &'static [PortMeta],
}

impl PluginMeta {
    pub const fn new(uid: &'static str, name: &'static str, ports: &'static [PortMeta]) -> Self {
        Self {
            uid,
            name,
            acronym: "",
            version: Version::new(1, 0, 0),
            description: "",
            extensions: Extensions { dump_state: false },
            ports,
        }
    }

    pub const fn with_acronym(mut self, acronym: &'static str) -> Self {
        self.acronym = acronym;
        self
    }

    pub const fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Advertise diagnostic state dump support.
    pub const fn with_dump_state(mut self) -> Self {
        self.extensions.dump_state = true;
        self
    }

    /// Number of ports of the given kind.
    pub fn count(&self, kind: PortKind) -> usize {
        self.ports.iter().filter(|p| p.kind == kind).count()
    }

    /// Number of audio inputs, which is the number of processing channels.
    pub fn audio_inputs(&self) -> usize {
        self.count(PortKind::AudioInput)
    }

    pub fn audio_outputs(&self) -> usize {
        self.count(PortKind::AudioOutput)
    }
}
