//! # tardy-delay
//!
//! Sample-accurate delay for latency compensation, in mono and stereo
//! variants.
//!
//! Each channel runs its input through a delay line, mixes the delayed
//! (wet) and unprocessed (dry) signal, applies the output gain and finally
//! crossfades against the untouched input when bypass is toggled. Delay
//! changes glide across one block instead of jumping.
//!
//! ## Quick Start
//!
//! ```ignore
//! use tardy_core::{Block, Module};
//!
//! let (mut module, ports) = tardy_delay::FACTORY.instantiate("tardy_mono")?;
//! module.update_sample_rate(48000);
//!
//! ports.control("d_in").unwrap().set_value(64.0);
//! module.update_settings();
//!
//! let mut block = Block::from_slices([&input[..]], [&mut output[..]], input.len());
//! module.process(&mut block);
//! ```

pub mod channel;
pub mod engine;
pub mod meta;

pub use channel::{Channel, ControlGroup};
pub use engine::DelayEngine;
pub use meta::{DELAY_OUT_MAX_TIME, MONO, SAMPLES, STEREO};

use tardy_core::{Factory, Module, PluginMeta};

static PLUGINS: [&PluginMeta; 2] = [&MONO, &STEREO];

fn construct(meta: &'static PluginMeta) -> Box<dyn Module> {
    Box::new(DelayEngine::new(meta))
}

/// Every variant this crate provides.
pub static FACTORY: Factory = Factory::new(construct, &PLUGINS);

/// Uninitialized mono delay.
pub fn create_mono() -> DelayEngine {
    DelayEngine::new(&MONO)
}

/// Uninitialized stereo delay.
pub fn create_stereo() -> DelayEngine {
    DelayEngine::new(&STEREO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tardy_core::{Block, PluginError};

    #[test]
    fn test_factory_lists_both_variants() {
        let uids: Vec<_> = FACTORY.descriptors().map(|m| m.uid).collect();
        assert_eq!(uids, ["tardy_mono", "tardy_stereo"]);
    }

    #[test]
    fn test_unknown_uid() {
        assert!(matches!(
            FACTORY.create("tardy_surround"),
            Err(PluginError::UnknownPlugin(_))
        ));
    }

    #[test]
    fn test_channel_counts() {
        assert_eq!(create_mono().channels(), 1);
        assert_eq!(create_stereo().channels(), 2);
    }

    #[test]
    fn test_instantiated_module_processes() {
        let (mut module, ports) = FACTORY.instantiate("tardy_stereo").expect("instantiate");
        assert_eq!(module.meta().uid, "tardy_stereo");
        module.update_sample_rate(96000);
        ports.control("dry").expect("dry").set_value(1.0);
        ports.control("wet").expect("wet").set_value(0.0);
        module.update_settings();

        let left = [0.5f32; 64];
        let right = [-0.5f32; 64];
        let mut out_l = [0.0f32; 64];
        let mut out_r = [0.0f32; 64];
        let mut block = Block::from_slices(
            [&left[..], &right[..]],
            [&mut out_l[..], &mut out_r[..]],
            64,
        );
        module.process(&mut block);
        drop(block);

        assert_eq!(out_l, left);
        assert_eq!(out_r, right);
        assert_eq!(ports.meter("min_r").map(|m| m.value()), Some(0.5));
    }
}
