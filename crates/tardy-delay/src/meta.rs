//! Descriptors and port tables of the mono and stereo variants.
//!
//! The order of each table is the positional binding contract with the
//! engine: audio inputs, audio outputs, bypass, the shared delay/dry/wet
//! controls, output gain, then meters (shared delay meter first, followed by
//! per-channel input/output levels).
//!
//! Port identifiers stay within 7 characters so they fit VST2 parameter
//! name buffers.

use tardy_core::{PluginMeta, PortMeta, Unit, Version, GAIN_AMP_P_48_DB};

/// Largest delay the delay control accepts, in samples.
pub const SAMPLES: f32 = 10000.0;

/// Largest delay time the line reserves room for, in milliseconds. Also the
/// range of the delay time meter.
pub const DELAY_OUT_MAX_TIME: f32 = 10000.0;

pub static MONO_PORTS: [PortMeta; 10] = [
    // Input and output audio ports
    PortMeta::audio_in("in", "Input"),
    PortMeta::audio_out("out", "Output"),
    // Input controls
    PortMeta::bypass(),
    PortMeta::int_control("d_in", "Delay in samples", Unit::Samples, SAMPLES),
    PortMeta::dry_gain(0.0),
    PortMeta::wet_gain(1.0),
    PortMeta::out_gain(),
    // Output controls
    PortMeta::meter_minmax(
        "d_out",
        "Delay time in milliseconds",
        Unit::Millis,
        0.0,
        DELAY_OUT_MAX_TIME,
    ),
    PortMeta::meter_gain("min", "Input gain", GAIN_AMP_P_48_DB),
    PortMeta::meter_gain("mout", "Output gain", GAIN_AMP_P_48_DB),
];

pub static STEREO_PORTS: [PortMeta; 14] = [
    // Input and output audio ports
    PortMeta::audio_in("in_l", "Input left"),
    PortMeta::audio_in("in_r", "Input right"),
    PortMeta::audio_out("out_l", "Output left"),
    PortMeta::audio_out("out_r", "Output right"),
    // Input controls
    PortMeta::bypass(),
    PortMeta::int_control("d_in", "Delay in samples", Unit::Samples, SAMPLES),
    PortMeta::dry_gain(0.0),
    PortMeta::wet_gain(1.0),
    PortMeta::out_gain(),
    // Output controls
    PortMeta::meter_minmax(
        "d_out",
        "Delay time in milliseconds",
        Unit::Millis,
        0.0,
        DELAY_OUT_MAX_TIME,
    ),
    PortMeta::meter_gain("min_l", "Input gain left", GAIN_AMP_P_48_DB),
    PortMeta::meter_gain("mout_l", "Output gain left", GAIN_AMP_P_48_DB),
    PortMeta::meter_gain("min_r", "Input gain right", GAIN_AMP_P_48_DB),
    PortMeta::meter_gain("mout_r", "Output gain right", GAIN_AMP_P_48_DB),
];

const VERSION: Version = Version::new(1, 0, 0);

const DESCRIPTION: &str = "Delays the signal by a fixed number of samples, with dry/wet mix \
                           and click-free bypass";

pub static MONO: PluginMeta = PluginMeta::new("tardy_mono", "Tardy Mono", &MONO_PORTS)
    .with_acronym("TDM")
    .with_version(VERSION)
    .with_description(DESCRIPTION)
    .with_dump_state();

pub static STEREO: PluginMeta = PluginMeta::new("tardy_stereo", "Tardy Stereo", &STEREO_PORTS)
    .with_acronym("TDS")
    .with_version(VERSION)
    .with_description(DESCRIPTION)
    .with_dump_state();

#[cfg(test)]
mod tests {
    use super::*;
    use tardy_core::PortKind;

    fn ids(meta: &PluginMeta) -> Vec<&'static str> {
        meta.ports.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_mono_layout() {
        assert_eq!(MONO.audio_inputs(), 1);
        assert_eq!(MONO.audio_outputs(), 1);
        assert_eq!(
            ids(&MONO),
            ["in", "out", "bypass", "d_in", "dry", "wet", "g_out", "d_out", "min", "mout"]
        );
    }

    #[test]
    fn test_stereo_layout() {
        assert_eq!(STEREO.audio_inputs(), 2);
        assert_eq!(STEREO.count(PortKind::Meter), 5);
        assert_eq!(
            ids(&STEREO),
            [
                "in_l", "in_r", "out_l", "out_r", "bypass", "d_in", "dry", "wet", "g_out",
                "d_out", "min_l", "mout_l", "min_r", "mout_r"
            ]
        );
    }

    #[test]
    fn test_ids_fit_vst2_names() {
        for meta in [&MONO, &STEREO] {
            assert!(meta.ports.iter().all(|p| p.id.len() <= 7));
        }
    }

    #[test]
    fn test_control_ranges() {
        let delay = MONO_PORTS.iter().find(|p| p.id == "d_in").expect("delay port");
        assert_eq!((delay.min, delay.max, delay.step), (0.0, 10000.0, 1.0));
        let meter = MONO_PORTS.iter().find(|p| p.id == "d_out").expect("delay meter");
        assert_eq!((meter.min, meter.max), (0.0, 10000.0));
    }
}
