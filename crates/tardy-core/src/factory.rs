//! Plugin factory: maps descriptors to module constructors.
//!
//! A plugin crate exposes one static [`Factory`] listing every variant it
//! provides (e.g. mono and stereo) and a constructor taking the chosen
//! descriptor.
//!
//! ```ignore
//! static PLUGINS: [&PluginMeta; 2] = [&MONO, &STEREO];
//!
//! fn construct(meta: &'static PluginMeta) -> Box<dyn Module> {
//!     Box::new(MyModule::new(meta))
//! }
//!
//! pub static FACTORY: Factory = Factory::new(construct, &PLUGINS);
//! ```

use crate::error::{PluginError, PluginResult};
use crate::meta::PluginMeta;
use crate::module::Module;
use crate::port::PortSet;

/// Module constructor for a given descriptor.
pub type Constructor = fn(&'static PluginMeta) -> Box<dyn Module>;

/// Static registry of plugin variants sharing one constructor.
pub struct Factory {
    constructor: Constructor,
    plugins: &'static [&'static PluginMeta],
}

impl Factory {
    pub const fn new(constructor: Constructor, plugins: &'static [&'static PluginMeta]) -> Self {
        Self {
            constructor,
            plugins,
        }
    }

    /// All registered descriptors.
    pub fn descriptors(&self) -> impl Iterator<Item = &'static PluginMeta> {
        self.plugins.iter().copied()
    }

    /// Descriptor registered under `uid`.
    pub fn find(&self, uid: &str) -> Option<&'static PluginMeta> {
        self.descriptors().find(|meta| meta.uid == uid)
    }

    /// Construct an uninitialized module for `uid`.
    pub fn create(&self, uid: &str) -> PluginResult<Box<dyn Module>> {
        let meta = self
            .find(uid)
            .ok_or_else(|| PluginError::UnknownPlugin(uid.to_owned()))?;
        log::debug!("Creating module '{}' ({})", meta.uid, meta.name);
        Ok((self.constructor)(meta))
    }

    /// Construct a module together with fresh ports and run `init`.
    ///
    /// This is what a host wrapper does on instantiation. The returned ports
    /// start at their declared defaults.
    pub fn instantiate(&self, uid: &str) -> PluginResult<(Box<dyn Module>, PortSet)> {
        let mut module = self.create(uid)?;
        let ports = PortSet::instantiate(module.meta());
        module.init(&ports)?;
        Ok((module, ports))
    }
}
