//! Ports: the typed bindings between the host and a module.
//!
//! Every port is declared statically by a [`PortMeta`] in the plugin's port
//! table. At instantiation the host turns that table into a [`PortSet`],
//! one [`Port`] per declaration, in declaration order. A module binds the
//! ports it needs positionally during `init`.
//!
//! # Port kinds
//!
//! - [`Port::AudioInput`] / [`Port::AudioOutput`] - audio streams. The port
//!   itself only records which channel slot of the per-call
//!   [`Block`](crate::buffer::Block) carries the samples.
//! - [`Port::Control`] - scalar written by the host, read by the module.
//! - [`Port::Meter`] - scalar written by the module, read by the host.
//!
//! Control and meter storage is atomic, so UI or automation threads may
//! touch a port while the audio thread reads it. The host keeps ownership
//! of the ports; modules hold shared handles and never outlive their use.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::dump::{Dumpable, StateDumper};
use crate::meta::PluginMeta;

/// +20 dB expressed as linear amplitude.
pub const GAIN_AMP_P_20_DB: f32 = 10.0;

/// +48 dB expressed as linear amplitude.
pub const GAIN_AMP_P_48_DB: f32 = 251.188_64;

// =============================================================================
// Port metadata
// =============================================================================

/// What a port carries and in which direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PortKind {
    AudioInput,
    AudioOutput,
    Control,
    Meter,
}

/// Display unit of a scalar port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Unit {
    None,
    Bool,
    Samples,
    Millis,
    /// Linear amplitude gain.
    Gain,
}

/// Static description of a single port.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PortMeta {
    /// Short identifier (at most 7 characters, VST2 parameter name limit).
    pub id: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    pub kind: PortKind,
    pub unit: Unit,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    /// Value quantization. 0 = continuous.
    pub step: f32,
}

impl PortMeta {
    #[allow(clippy::too_many_arguments)]
    const fn scalar(
        id: &'static str,
        name: &'static str,
        kind: PortKind,
        unit: Unit,
        min: f32,
        max: f32,
        default: f32,
        step: f32,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            unit,
            min,
            max,
            default,
            step,
        }
    }

    /// Audio input stream.
    pub const fn audio_in(id: &'static str, name: &'static str) -> Self {
        Self::scalar(id, name, PortKind::AudioInput, Unit::None, 0.0, 0.0, 0.0, 0.0)
    }

    /// Audio output stream.
    pub const fn audio_out(id: &'static str, name: &'static str) -> Self {
        Self::scalar(id, name, PortKind::AudioOutput, Unit::None, 0.0, 0.0, 0.0, 0.0)
    }

    /// Global bypass switch. Values >= 0.5 mean bypassed.
    pub const fn bypass() -> Self {
        Self::scalar("bypass", "Bypass", PortKind::Control, Unit::Bool, 0.0, 1.0, 0.0, 1.0)
    }

    /// Integer control in `0..=max`, default 0.
    pub const fn int_control(id: &'static str, name: &'static str, unit: Unit, max: f32) -> Self {
        Self::scalar(id, name, PortKind::Control, unit, 0.0, max, 0.0, 1.0)
    }

    /// Amount of unprocessed signal in the output.
    pub const fn dry_gain(default: f32) -> Self {
        Self::scalar(
            "dry",
            "Dry amount",
            PortKind::Control,
            Unit::Gain,
            0.0,
            GAIN_AMP_P_20_DB,
            default,
            0.0,
        )
    }

    /// Amount of processed signal in the output.
    pub const fn wet_gain(default: f32) -> Self {
        Self::scalar(
            "wet",
            "Wet amount",
            PortKind::Control,
            Unit::Gain,
            0.0,
            GAIN_AMP_P_20_DB,
            default,
            0.0,
        )
    }

    /// Global output gain, default unity.
    pub const fn out_gain() -> Self {
        Self::scalar(
            "g_out",
            "Output gain",
            PortKind::Control,
            Unit::Gain,
            0.0,
            GAIN_AMP_P_20_DB,
            1.0,
            0.0,
        )
    }

    /// Meter with an explicit range.
    pub const fn meter_minmax(
        id: &'static str,
        name: &'static str,
        unit: Unit,
        min: f32,
        max: f32,
    ) -> Self {
        Self::scalar(id, name, PortKind::Meter, unit, min, max, min, 0.0)
    }

    /// Peak level meter in linear gain.
    pub const fn meter_gain(id: &'static str, name: &'static str, max: f32) -> Self {
        Self::scalar(id, name, PortKind::Meter, Unit::Gain, 0.0, max, 0.0, 0.0)
    }

    /// Clamp and quantize a value to this port's range.
    ///
    /// NaN maps to the default value.
    pub fn normalize(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default;
        }
        let value = value.clamp(self.min, self.max);
        if self.step >= 1.0 {
            (value / self.step).round() * self.step
        } else {
            value
        }
    }
}

// =============================================================================
// Scalar ports
// =============================================================================

/// Host-written scalar parameter.
#[derive(Debug)]
pub struct ControlPort {
    meta: &'static PortMeta,
    value: AtomicU32,
}

impl ControlPort {
    /// Create a control initialized to its default value.
    pub fn new(meta: &'static PortMeta) -> Self {
        Self {
            meta,
            value: AtomicU32::new(meta.default.to_bits()),
        }
    }

    #[inline]
    pub fn meta(&self) -> &'static PortMeta {
        self.meta
    }

    #[inline]
    pub fn id(&self) -> &'static str {
        self.meta.id
    }

    /// Current value. Lock-free, safe on the audio thread.
    #[inline]
    pub fn value(&self) -> f32 {
        f32::from_bits(self.value.load(Ordering::Relaxed))
    }

    /// Set a new value, clamped and quantized to the declared range.
    pub fn set_value(&self, value: f32) {
        let value = self.meta.normalize(value);
        self.value.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Module-written scalar output (level and time meters).
#[derive(Debug)]
pub struct MeterPort {
    meta: &'static PortMeta,
    value: AtomicU32,
}

impl MeterPort {
    pub fn new(meta: &'static PortMeta) -> Self {
        Self {
            meta,
            value: AtomicU32::new(meta.default.to_bits()),
        }
    }

    #[inline]
    pub fn meta(&self) -> &'static PortMeta {
        self.meta
    }

    #[inline]
    pub fn id(&self) -> &'static str {
        self.meta.id
    }

    #[inline]
    pub fn value(&self) -> f32 {
        f32::from_bits(self.value.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn set_value(&self, value: f32) {
        self.value.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Audio stream port.
#[derive(Debug, Clone, Copy)]
pub struct AudioPort {
    meta: &'static PortMeta,
    channel: usize,
}

impl AudioPort {
    #[inline]
    pub fn meta(&self) -> &'static PortMeta {
        self.meta
    }

    #[inline]
    pub fn id(&self) -> &'static str {
        self.meta.id
    }

    /// Channel slot in the per-call block (nth port of its direction).
    #[inline]
    pub fn channel(&self) -> usize {
        self.channel
    }
}

// =============================================================================
// Port
// =============================================================================

/// A single instantiated port.
#[derive(Debug, Clone)]
pub enum Port {
    AudioInput(AudioPort),
    AudioOutput(AudioPort),
    Control(Arc<ControlPort>),
    Meter(Arc<MeterPort>),
}

impl Port {
    pub fn meta(&self) -> &'static PortMeta {
        match self {
            Port::AudioInput(p) | Port::AudioOutput(p) => p.meta(),
            Port::Control(p) => p.meta(),
            Port::Meter(p) => p.meta(),
        }
    }

    #[inline]
    pub fn id(&self) -> &'static str {
        self.meta().id
    }

    #[inline]
    pub fn kind(&self) -> PortKind {
        self.meta().kind
    }

    pub fn as_audio_input(&self) -> Option<&AudioPort> {
        match self {
            Port::AudioInput(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_audio_output(&self) -> Option<&AudioPort> {
        match self {
            Port::AudioOutput(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_control(&self) -> Option<&Arc<ControlPort>> {
        match self {
            Port::Control(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_meter(&self) -> Option<&Arc<MeterPort>> {
        match self {
            Port::Meter(p) => Some(p),
            _ => None,
        }
    }
}

impl Dumpable for ControlPort {
    fn dump(&self, v: &mut dyn StateDumper) {
        v.write("id", json!(self.id()));
        v.write("value", json!(self.value()));
    }
}

impl Dumpable for MeterPort {
    fn dump(&self, v: &mut dyn StateDumper) {
        v.write("id", json!(self.id()));
        v.write("value", json!(self.value()));
    }
}

impl Dumpable for Port {
    fn dump(&self, v: &mut dyn StateDumper) {
        v.write("id", json!(self.id()));
        v.write("kind", json!(self.kind()));
        match self {
            Port::AudioInput(p) | Port::AudioOutput(p) => v.write("channel", json!(p.channel())),
            Port::Control(p) => v.write("value", json!(p.value())),
            Port::Meter(p) => v.write("value", json!(p.value())),
        }
    }
}

// =============================================================================
// PortSet
// =============================================================================

/// The instantiated ports of one plugin instance, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct PortSet {
    ports: Vec<Port>,
}

impl PortSet {
    /// Build ports from a descriptor's port table.
    pub fn instantiate(meta: &'static PluginMeta) -> Self {
        Self::from_metas(meta.ports)
    }

    /// Build ports from an arbitrary port table.
    pub fn from_metas(metas: &'static [PortMeta]) -> Self {
        let mut audio_in = 0;
        let mut audio_out = 0;
        let ports = metas
            .iter()
            .map(|meta| match meta.kind {
                PortKind::AudioInput => {
                    audio_in += 1;
                    Port::AudioInput(AudioPort {
                        meta,
                        channel: audio_in - 1,
                    })
                }
                PortKind::AudioOutput => {
                    audio_out += 1;
                    Port::AudioOutput(AudioPort {
                        meta,
                        channel: audio_out - 1,
                    })
                }
                PortKind::Control => Port::Control(Arc::new(ControlPort::new(meta))),
                PortKind::Meter => Port::Meter(Arc::new(MeterPort::new(meta))),
            })
            .collect();
        Self { ports }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Port at a position, if any.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Port> {
        self.ports.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Port> {
        self.ports.iter()
    }

    /// Find a port by identifier.
    pub fn find(&self, id: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.id() == id)
    }

    /// Find a control port by identifier.
    pub fn control(&self, id: &str) -> Option<&Arc<ControlPort>> {
        self.find(id).and_then(Port::as_control)
    }

    /// Find a meter port by identifier.
    pub fn meter(&self, id: &str) -> Option<&Arc<MeterPort>> {
        self.find(id).and_then(Port::as_meter)
    }

    /// Iterate over the control ports only.
    pub fn controls(&self) -> impl Iterator<Item = &Arc<ControlPort>> {
        self.ports.iter().filter_map(Port::as_control)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static PORTS: [PortMeta; 6] = [
        PortMeta::audio_in("in", "Input"),
        PortMeta::audio_out("out", "Output"),
        PortMeta::bypass(),
        PortMeta::int_control("d_in", "Delay", Unit::Samples, 100.0),
        PortMeta::out_gain(),
        PortMeta::meter_gain("mout", "Output level", GAIN_AMP_P_48_DB),
    ];

    #[test]
    fn test_instantiate_kinds_and_defaults() {
        let ports = PortSet::from_metas(&PORTS);
        assert_eq!(ports.len(), 6);
        assert_eq!(ports.get(0).map(Port::kind), Some(PortKind::AudioInput));
        assert_eq!(ports.get(1).map(Port::kind), Some(PortKind::AudioOutput));
        assert_eq!(ports.control("g_out").map(|p| p.value()), Some(1.0));
        assert_eq!(ports.control("bypass").map(|p| p.value()), Some(0.0));
        assert!(ports.meter("mout").is_some());
        assert!(ports.control("mout").is_none());
        assert!(ports.get(6).is_none());
    }

    #[test]
    fn test_control_clamps_and_quantizes() {
        let ports = PortSet::from_metas(&PORTS);
        let delay = ports.control("d_in").cloned().expect("delay port");

        delay.set_value(42.4);
        assert_eq!(delay.value(), 42.0);
        delay.set_value(1000.0);
        assert_eq!(delay.value(), 100.0);
        delay.set_value(-3.0);
        assert_eq!(delay.value(), 0.0);
        delay.set_value(f32::NAN);
        assert_eq!(delay.value(), 0.0);
    }

    #[test]
    fn test_handles_share_storage() {
        let ports = PortSet::from_metas(&PORTS);
        let a = ports.control("g_out").cloned().expect("gain port");
        let b = ports.control("g_out").cloned().expect("gain port");
        a.set_value(0.5);
        assert_eq!(b.value(), 0.5);
    }

    #[test]
    fn test_audio_channel_slots() {
        static STEREO: [PortMeta; 4] = [
            PortMeta::audio_in("in_l", "Input left"),
            PortMeta::audio_in("in_r", "Input right"),
            PortMeta::audio_out("out_l", "Output left"),
            PortMeta::audio_out("out_r", "Output right"),
        ];
        let ports = PortSet::from_metas(&STEREO);
        let slots: Vec<usize> = ports
            .iter()
            .filter_map(|p| p.as_audio_input().or(p.as_audio_output()))
            .map(AudioPort::channel)
            .collect();
        assert_eq!(slots, vec![0, 1, 0, 1]);
    }

    #[test]
    fn test_dump() {
        use crate::dump::JsonDumper;

        let ports = PortSet::from_metas(&PORTS);
        let mut dumper = JsonDumper::new();
        {
            let v: &mut dyn StateDumper = &mut dumper;
            v.begin_array("ports");
            for port in ports.iter() {
                v.write_object("port", port);
            }
            v.end_array();
        }
        let state = dumper.finish();

        assert_eq!(state["ports"][0], json!({ "id": "in", "kind": "AudioInput", "channel": 0 }));
        assert_eq!(state["ports"][4], json!({ "id": "g_out", "kind": "Control", "value": 1.0 }));
        assert_eq!(state["ports"][5]["kind"], "Meter");
    }
}
