//! The delay module: owns the channels and drives them through the
//! host lifecycle.

use std::sync::Arc;

use serde_json::json;
use tardy_core::state::{load_controls, save_controls};
use tardy_core::units::millis_to_samples;
use tardy_core::{
    AudioPort, Block, ControlPort, MeterPort, Module, PluginError, PluginMeta, PluginResult,
    Port, PortKind, PortSet, StateDumper, BUFFER_SIZE,
};

use crate::channel::{Channel, ControlGroup};
use crate::meta::DELAY_OUT_MAX_TIME;

/// Everything that exists only between a successful `init` and `destroy`.
#[derive(Debug)]
struct Bound {
    channels: Vec<Channel>,
    /// Shared control sets, indexed by [`Channel::group`].
    groups: Vec<ControlGroup>,
    /// Scratch buffer for the wet signal, reused across channels.
    buffer: Vec<f32>,

    bypass: Arc<ControlPort>,
    gain_out: Arc<ControlPort>,

    /// Every bound control port, in port-table order.
    controls: Vec<Arc<ControlPort>>,
}

/// Delay engine for one plugin instance.
///
/// Channel count is fixed at construction by the number of audio inputs in
/// the descriptor. Until `init` succeeds (or after `destroy`) the engine is
/// inert: every lifecycle call is a no-op and `process` writes nothing.
#[derive(Debug)]
pub struct DelayEngine {
    meta: &'static PluginMeta,
    n_channels: usize,
    sample_rate: u32,
    bound: Option<Bound>,
}

impl DelayEngine {
    pub fn new(meta: &'static PluginMeta) -> Self {
        Self {
            meta,
            n_channels: meta.audio_inputs(),
            sample_rate: 0,
            bound: None,
        }
    }

    /// Number of processing channels.
    #[inline]
    pub fn channels(&self) -> usize {
        self.n_channels
    }

    /// Returns true between a successful `init` and `destroy`.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.bound.is_some()
    }

    /// Channel state, if initialized.
    pub fn channel(&self, index: usize) -> Option<&Channel> {
        self.bound.as_ref().and_then(|b| b.channels.get(index))
    }

    fn bind(&self, ports: &PortSet) -> PluginResult<Bound> {
        let n = self.n_channels;
        let mut cursor = PortCursor::new(ports);

        log::trace!("Binding ports");

        // Bind input audio ports
        let inputs = (0..n)
            .map(|_| cursor.audio_input())
            .collect::<PluginResult<Vec<_>>>()?;

        // Bind output audio ports
        let outputs = (0..n)
            .map(|_| cursor.audio_output())
            .collect::<PluginResult<Vec<_>>>()?;

        let bypass = cursor.control()?;

        // One delay/dry/wet set, shared by all channels
        let delay = cursor.control()?;
        let dry = cursor.control()?;
        let wet = cursor.control()?;

        let gain_out = cursor.control()?;

        // Meters: the delay time meter is shared, levels are per channel
        let out_delay = cursor.meter()?;
        let mut levels = Vec::new();
        levels
            .try_reserve_exact(n)
            .map_err(|e| PluginError::AllocationFailed(e.to_string()))?;
        for _ in 0..n {
            let in_level = cursor.meter()?;
            let out_level = cursor.meter()?;
            levels.push((in_level, out_level));
        }

        let bypassed = bypass.value() >= 0.5;
        let mut channels = Vec::new();
        channels
            .try_reserve_exact(n)
            .map_err(|e| PluginError::AllocationFailed(e.to_string()))?;
        for ((input, output), (in_level, out_level)) in inputs.into_iter().zip(outputs).zip(levels)
        {
            channels.push(Channel::new(input, output, 0, in_level, out_level, bypassed));
        }

        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(BUFFER_SIZE)
            .map_err(|e| PluginError::AllocationFailed(format!("scratch buffer: {}", e)))?;
        buffer.resize(BUFFER_SIZE, 0.0);

        let controls = vec![
            bypass.clone(),
            delay.clone(),
            dry.clone(),
            wet.clone(),
            gain_out.clone(),
        ];

        Ok(Bound {
            channels,
            groups: vec![ControlGroup {
                delay,
                dry,
                wet,
                out_delay,
            }],
            buffer,
            bypass,
            gain_out,
            controls,
        })
    }
}

impl Module for DelayEngine {
    fn meta(&self) -> &'static PluginMeta {
        self.meta
    }

    fn init(&mut self, ports: &PortSet) -> PluginResult<()> {
        self.destroy();

        match self.bind(ports) {
            Ok(mut bound) => {
                // Ports may be re-bound after the sample rate is known
                if self.sample_rate > 0 {
                    let max_delay = millis_to_samples(self.sample_rate, DELAY_OUT_MAX_TIME);
                    for c in &mut bound.channels {
                        c.update_sample_rate(self.sample_rate, max_delay);
                    }
                }
                log::debug!(
                    "Initialized '{}' with {} channel(s)",
                    self.meta.uid,
                    self.n_channels
                );
                self.bound = Some(bound);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to initialize '{}': {}", self.meta.uid, e);
                Err(e)
            }
        }
    }

    fn destroy(&mut self) {
        if let Some(mut bound) = self.bound.take() {
            for c in &mut bound.channels {
                c.destroy();
            }
            log::debug!("Destroyed '{}'", self.meta.uid);
        }
    }

    fn update_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate;
        let Some(bound) = self.bound.as_mut() else {
            return;
        };

        let max_delay = millis_to_samples(sample_rate, DELAY_OUT_MAX_TIME);
        for c in &mut bound.channels {
            c.update_sample_rate(sample_rate, max_delay);
        }
        log::debug!(
            "Sample rate {} Hz, delay lines hold {} samples",
            sample_rate,
            max_delay
        );
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn update_settings(&mut self) {
        let Some(Bound {
            channels,
            groups,
            bypass,
            gain_out,
            ..
        }) = self.bound.as_mut()
        else {
            return;
        };

        let out_gain = gain_out.value();
        let bypass = bypass.value() >= 0.5;

        for c in channels.iter_mut() {
            if let Some(controls) = groups.get(c.group()) {
                c.update_settings(controls, out_gain, bypass);
            }
        }
    }

    fn process(&mut self, block: &mut Block<'_>) {
        let sample_rate = self.sample_rate;
        let Some(Bound {
            channels,
            groups,
            buffer,
            ..
        }) = self.bound.as_mut()
        else {
            return;
        };

        // Channels are independent; the scratch buffer is reused by each
        for c in channels.iter_mut() {
            if let Some(controls) = groups.get(c.group()) {
                c.process(block, buffer, controls, sample_rate);
            }
        }
    }

    fn dump(&self, v: &mut dyn StateDumper) {
        v.write("uid", json!(self.meta.uid));
        v.write("channels", json!(self.n_channels));
        v.write("sample_rate", json!(self.sample_rate));
        v.write("initialized", json!(self.bound.is_some()));

        let Some(bound) = self.bound.as_ref() else {
            return;
        };

        v.begin_array("vChannels");
        for c in &bound.channels {
            v.begin_object("channel");
            if let Some(controls) = bound.groups.get(c.group()) {
                c.dump(v, controls);
            }
            v.end_object();
        }
        v.end_array();

        v.write("buffer", json!(bound.buffer.len()));
        v.write("bypass", json!(bound.bypass.id()));
        v.write("gain_out", json!(bound.gain_out.id()));

        v.begin_array("controls");
        for port in &bound.controls {
            v.write_object("port", &**port);
        }
        v.end_array();
    }

    fn save_state(&self) -> Vec<u8> {
        self.bound
            .as_ref()
            .map(|b| save_controls(&b.controls))
            .unwrap_or_default()
    }

    fn load_state(&mut self, data: &[u8]) -> PluginResult<()> {
        let Some(bound) = self.bound.as_ref() else {
            return Ok(());
        };
        let restored = load_controls(&bound.controls, data)?;
        log::debug!("Restored {} control(s)", restored);
        Ok(())
    }
}

impl Drop for DelayEngine {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Positional port reader that checks each port's kind.
struct PortCursor<'a> {
    ports: &'a PortSet,
    index: usize,
}

impl<'a> PortCursor<'a> {
    fn new(ports: &'a PortSet) -> Self {
        Self { ports, index: 0 }
    }

    fn next(&mut self, expected: PortKind) -> PluginResult<&'a Port> {
        let index = self.index;
        let port = self.ports.get(index).ok_or(PluginError::PortMismatch {
            index,
            expected,
            found: None,
        })?;
        if port.kind() != expected {
            return Err(PluginError::PortMismatch {
                index,
                expected,
                found: Some(port.kind()),
            });
        }
        log::trace!("  port id={} index={}", port.id(), index);
        self.index += 1;
        Ok(port)
    }

    fn audio_input(&mut self) -> PluginResult<AudioPort> {
        let port = self.next(PortKind::AudioInput)?;
        port.as_audio_input()
            .copied()
            .ok_or_else(|| self.mismatch(PortKind::AudioInput, port))
    }

    fn audio_output(&mut self) -> PluginResult<AudioPort> {
        let port = self.next(PortKind::AudioOutput)?;
        port.as_audio_output()
            .copied()
            .ok_or_else(|| self.mismatch(PortKind::AudioOutput, port))
    }

    fn control(&mut self) -> PluginResult<Arc<ControlPort>> {
        let port = self.next(PortKind::Control)?;
        port.as_control()
            .cloned()
            .ok_or_else(|| self.mismatch(PortKind::Control, port))
    }

    fn meter(&mut self) -> PluginResult<Arc<MeterPort>> {
        let port = self.next(PortKind::Meter)?;
        port.as_meter()
            .cloned()
            .ok_or_else(|| self.mismatch(PortKind::Meter, port))
    }

    /// Error for the port most recently returned by `next`.
    fn mismatch(&self, expected: PortKind, port: &Port) -> PluginError {
        PluginError::PortMismatch {
            index: self.index.saturating_sub(1),
            expected,
            found: Some(port.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{MONO, STEREO};
    use approx::assert_relative_eq;
    use tardy_core::{BypassState, JsonDumper, PortMeta};

    const SR: u32 = 48000;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn setup(meta: &'static PluginMeta) -> (DelayEngine, PortSet) {
        init_logger();
        let mut engine = DelayEngine::new(meta);
        let ports = PortSet::instantiate(meta);
        engine.init(&ports).expect("init");
        engine.update_sample_rate(SR);
        (engine, ports)
    }

    fn set(ports: &PortSet, id: &str, value: f32) {
        ports.control(id).expect("control port").set_value(value);
    }

    fn meter(ports: &PortSet, id: &str) -> f32 {
        ports.meter(id).expect("meter port").value()
    }

    fn run_mono(engine: &mut DelayEngine, input: &[f32]) -> Vec<f32> {
        let mut output = vec![0.0f32; input.len()];
        let mut block = Block::from_slices([input], [&mut output[..]], input.len());
        engine.process(&mut block);
        drop(block);
        output
    }

    fn run_stereo(engine: &mut DelayEngine, left: &[f32], right: &[f32]) -> (Vec<f32>, Vec<f32>) {
        let n = left.len();
        let mut out_l = vec![0.0f32; n];
        let mut out_r = vec![0.0f32; n];
        let mut block = Block::from_slices([left, right], [&mut out_l[..], &mut out_r[..]], n);
        engine.process(&mut block);
        drop(block);
        (out_l, out_r)
    }

    fn noise(n: usize) -> Vec<f32> {
        let mut seed = 0x1234_5678u32;
        (0..n)
            .map(|_| {
                seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                (seed >> 8) as f32 / (1u32 << 24) as f32 - 0.5
            })
            .collect()
    }

    #[test]
    fn test_impulse_is_delayed() {
        let (mut engine, ports) = setup(&MONO);
        set(&ports, "d_in", 100.0);
        engine.update_settings();

        // The delay glides from 0 to 100 during the first block
        run_mono(&mut engine, &[0.0; 256]);

        let mut impulse = vec![0.0f32; 512];
        impulse[0] = 1.0;
        let out = run_mono(&mut engine, &impulse);

        for (n, &y) in out.iter().enumerate() {
            let expected = if n == 100 { 1.0 } else { 0.0 };
            assert_eq!(y, expected, "sample {}", n);
        }
        assert_relative_eq!(meter(&ports, "d_out"), 100.0 * 1000.0 / 48000.0, epsilon = 1e-5);
        assert_eq!(meter(&ports, "min"), 1.0);
        assert_eq!(meter(&ports, "mout"), 1.0);
    }

    #[test]
    fn test_first_block_after_delay_change_glides() {
        let (mut engine, ports) = setup(&MONO);
        set(&ports, "d_in", 100.0);
        engine.update_settings();

        let mut impulse = vec![0.0f32; 512];
        impulse[0] = 1.0;
        let out = run_mono(&mut engine, &impulse);

        // Delay at the first sample is still 0
        assert_eq!(out[0], 1.0);
        assert_eq!(engine.channel(0).map(|c| c.line().delay()), Some(100));
    }

    #[test]
    fn test_stereo_bypass_is_synchronous() {
        let (mut engine, ports) = setup(&STEREO);
        set(&ports, "d_in", 0.0);
        set(&ports, "dry", 0.0);
        set(&ports, "wet", 0.5);
        engine.update_settings();

        let ones = vec![1.0f32; 480];
        let (l, r) = run_stereo(&mut engine, &ones, &ones);
        assert!(l.iter().chain(&r).all(|&y| y == 0.5));

        set(&ports, "bypass", 1.0);
        engine.update_settings();
        let (l, r) = run_stereo(&mut engine, &ones, &ones);

        assert_eq!(l, r);
        assert_eq!(l[0], 0.5);
        assert!(l[1] > 0.5 && l[239] < 1.0);
        assert!(l.windows(2).all(|w| w[1] >= w[0]));
        assert!(l[240..].iter().all(|&y| y == 1.0));
        for i in 0..2 {
            assert_eq!(
                engine.channel(i).map(|c| c.bypass().state()),
                Some(BypassState::Bypassed)
            );
        }
    }

    #[test]
    fn test_meters_track_peaks_across_chunks() {
        let (mut engine, ports) = setup(&MONO);
        set(&ports, "wet", 2.0);
        engine.update_settings();

        let mut input = vec![0.25f32; 10000];
        input[9000] = -3.0;
        run_mono(&mut engine, &input);

        assert_eq!(meter(&ports, "min"), 3.0);
        assert_eq!(meter(&ports, "mout"), 6.0);
    }

    #[test]
    fn test_output_gain_scales_dry_and_wet() {
        let (mut engine, ports) = setup(&MONO);
        set(&ports, "d_in", 0.0);
        set(&ports, "dry", 1.0);
        set(&ports, "wet", 1.0);
        set(&ports, "g_out", 0.5);
        engine.update_settings();

        let out = run_mono(&mut engine, &[0.5; 64]);
        assert!(out.iter().all(|&y| y == 0.5));
        let channel = engine.channel(0).expect("channel");
        assert_eq!(channel.dry_gain(), 0.5);
        assert_eq!(channel.wet_gain(), 0.5);
    }

    #[test]
    fn test_output_is_independent_of_call_size() {
        let input = noise(10000);

        let (mut whole, ports) = setup(&MONO);
        set(&ports, "d_in", 100.0);
        set(&ports, "dry", 0.3);
        whole.update_settings();
        let expected = run_mono(&mut whole, &input);

        let (mut split, ports) = setup(&MONO);
        set(&ports, "d_in", 100.0);
        set(&ports, "dry", 0.3);
        split.update_settings();
        let mut actual = Vec::new();
        for range in [0..4096, 4096..8192, 8192..10000] {
            actual.extend(run_mono(&mut split, &input[range]));
        }

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_repeated_update_settings_is_idempotent() {
        let input = noise(1024);

        let (mut once, ports_once) = setup(&MONO);
        let (mut twice, ports_twice) = setup(&MONO);
        for ports in [&ports_once, &ports_twice] {
            set(ports, "d_in", 17.0);
            set(ports, "bypass", 1.0);
        }
        once.update_settings();
        twice.update_settings();
        twice.update_settings();

        assert_eq!(
            twice.channel(0).map(|c| c.bypass().state()),
            Some(BypassState::RampingToBypassed)
        );

        let a = run_mono(&mut once, &input[..100]);
        let b = run_mono(&mut twice, &input[..100]);
        assert_eq!(a, b);

        // Re-asserting mid-ramp must not restart the crossfade
        once.update_settings();
        let a = run_mono(&mut once, &input[100..]);
        let b = run_mono(&mut twice, &input[100..]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_unconnected_channel_is_skipped() {
        let (mut engine, ports) = setup(&STEREO);
        engine.update_settings();

        let left = vec![0.5f32; 128];
        let mut out_l = vec![0.0f32; 128];
        let mut out_r = vec![7.0f32; 128];
        let before = (meter(&ports, "min_r"), meter(&ports, "mout_r"));

        let mut block = Block::new(
            [Some(&left[..]), None],
            [Some(&mut out_l[..]), Some(&mut out_r[..])],
            128,
        );
        engine.process(&mut block);
        drop(block);

        assert!(out_l.iter().all(|&y| y == 0.5));
        assert!(out_r.iter().all(|&y| y == 7.0));
        assert_eq!(meter(&ports, "min_l"), 0.5);
        assert_eq!((meter(&ports, "min_r"), meter(&ports, "mout_r")), before);
    }

    #[test]
    fn test_short_buffer_is_treated_as_unconnected() {
        let (mut engine, _ports) = setup(&MONO);
        engine.update_settings();

        let input = [1.0f32; 16];
        let mut output = [3.0f32; 16];
        let mut block = Block::from_slices([&input[..]], [&mut output[..]], 32);
        engine.process(&mut block);
        drop(block);
        assert_eq!(output, [3.0; 16]);
    }

    #[test]
    fn test_failed_init_leaves_module_inert() {
        init_logger();
        let mut engine = DelayEngine::new(&STEREO);
        let ports = PortSet::instantiate(&MONO);

        let err = engine.init(&ports).unwrap_err();
        assert!(matches!(
            err,
            PluginError::PortMismatch {
                index: 1,
                expected: PortKind::AudioInput,
                found: Some(PortKind::AudioOutput),
            }
        ));
        assert!(!engine.is_initialized());

        engine.update_sample_rate(SR);
        engine.update_settings();
        let input = [1.0f32; 32];
        let mut out_l = [9.0f32; 32];
        let mut out_r = [9.0f32; 32];
        let mut block = Block::from_slices(
            [&input[..], &input[..]],
            [&mut out_l[..], &mut out_r[..]],
            32,
        );
        engine.process(&mut block);
        drop(block);

        assert_eq!(out_l, [9.0; 32]);
        assert_eq!(out_r, [9.0; 32]);
        assert!(engine.save_state().is_empty());
        assert!(engine.load_state(&[1, b'x']).is_ok());
    }

    #[test]
    fn test_short_port_list_fails() {
        init_logger();
        static TRUNCATED: [PortMeta; 3] = [
            PortMeta::audio_in("in", "Input"),
            PortMeta::audio_out("out", "Output"),
            PortMeta::bypass(),
        ];
        let mut engine = DelayEngine::new(&MONO);
        let err = engine.init(&PortSet::from_metas(&TRUNCATED)).unwrap_err();
        assert!(matches!(
            err,
            PluginError::PortMismatch {
                index: 3,
                expected: PortKind::Control,
                found: None,
            }
        ));
        assert!(!engine.is_initialized());
    }

    #[test]
    fn test_channels_share_controls_but_not_meters() {
        let (mut engine, ports) = setup(&STEREO);
        set(&ports, "d_in", 10.0);
        set(&ports, "wet", 0.0);
        set(&ports, "dry", 1.0);
        engine.update_settings();

        assert_eq!(engine.channel(0).map(Channel::delay), Some(10));
        assert_eq!(engine.channel(1).map(Channel::delay), Some(10));
        assert_eq!(engine.channel(0).map(Channel::group), engine.channel(1).map(Channel::group));

        run_stereo(&mut engine, &[0.5; 64], &[-0.25; 64]);
        assert_eq!(meter(&ports, "min_l"), 0.5);
        assert_eq!(meter(&ports, "min_r"), 0.25);
        assert_eq!(meter(&ports, "mout_l"), 0.5);
        assert_eq!(meter(&ports, "mout_r"), 0.25);
    }

    #[test]
    fn test_dry_only_passes_input_through() {
        let (mut engine, ports) = setup(&MONO);
        set(&ports, "d_in", 500.0);
        set(&ports, "dry", 1.0);
        set(&ports, "wet", 0.0);
        engine.update_settings();

        let input = noise(2048);
        assert_eq!(run_mono(&mut engine, &input), input);
    }

    #[test]
    fn test_initially_bypassed_passes_dry_signal() {
        init_logger();
        let mut engine = DelayEngine::new(&MONO);
        let ports = PortSet::instantiate(&MONO);
        set(&ports, "bypass", 1.0);
        set(&ports, "d_in", 100.0);
        engine.init(&ports).expect("init");
        engine.update_sample_rate(SR);
        engine.update_settings();

        assert_eq!(
            engine.channel(0).map(|c| c.bypass().state()),
            Some(BypassState::Bypassed)
        );
        let input = noise(512);
        assert_eq!(run_mono(&mut engine, &input), input);
    }

    #[test]
    fn test_capacity_follows_sample_rate() {
        let (mut engine, _ports) = setup(&MONO);
        assert_eq!(engine.channel(0).map(|c| c.line().capacity()), Some(480_000));

        engine.update_sample_rate(44100);
        assert_eq!(engine.channel(0).map(|c| c.line().capacity()), Some(441_000));
        assert_eq!(engine.sample_rate(), 44100);
    }

    #[test]
    fn test_sample_rate_before_init_is_applied() {
        init_logger();
        let mut engine = DelayEngine::new(&MONO);
        engine.update_sample_rate(44100);
        engine.init(&PortSet::instantiate(&MONO)).expect("init");

        let channel = engine.channel(0).expect("channel");
        assert_eq!(channel.line().capacity(), 441_000);
        assert_eq!(channel.bypass().ramp_samples(), 220);
    }

    #[test]
    fn test_state_round_trip() {
        let (engine, ports) = setup(&STEREO);
        set(&ports, "d_in", 123.0);
        set(&ports, "wet", 0.75);
        set(&ports, "bypass", 1.0);
        let data = engine.save_state();

        let (mut restored, fresh) = setup(&STEREO);
        restored.load_state(&data).expect("load");
        assert_eq!(fresh.control("d_in").map(|p| p.value()), Some(123.0));
        assert_eq!(fresh.control("wet").map(|p| p.value()), Some(0.75));
        assert_eq!(fresh.control("bypass").map(|p| p.value()), Some(1.0));
        assert_eq!(fresh.control("g_out").map(|p| p.value()), Some(1.0));

        restored.update_settings();
        assert_eq!(restored.channel(1).map(Channel::delay), Some(123));
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let (mut engine, _ports) = setup(&MONO);
        engine.destroy();
        engine.destroy();
        assert!(!engine.is_initialized());
        assert!(engine.channel(0).is_none());

        let input = [1.0f32; 16];
        let mut output = [4.0f32; 16];
        let mut block = Block::from_slices([&input[..]], [&mut output[..]], 16);
        engine.process(&mut block);
        drop(block);
        assert_eq!(output, [4.0; 16]);

        // Can be brought back
        engine.init(&PortSet::instantiate(&MONO)).expect("re-init");
        assert_eq!(engine.channel(0).map(|c| c.line().capacity()), Some(480_000));
    }

    #[test]
    fn test_dump() {
        let (mut engine, ports) = setup(&STEREO);
        set(&ports, "d_in", 42.0);
        engine.update_settings();

        let mut dumper = JsonDumper::new();
        engine.dump(&mut dumper);
        let state = dumper.finish();

        assert_eq!(state["uid"], "tardy_stereo");
        assert_eq!(state["channels"], 2);
        assert_eq!(state["initialized"], true);
        assert_eq!(state["buffer"], BUFFER_SIZE);
        let channels = state["vChannels"].as_array().expect("channels");
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0]["delay"], 42);
        assert_eq!(channels[0]["input"], "in_l");
        assert_eq!(channels[1]["out_level"], "mout_r");
        assert_eq!(channels[1]["line"]["capacity"], 480_000);
        assert_eq!(state["controls"][1]["id"], "d_in");
        assert_eq!(state["controls"][1]["value"], 42.0);

        engine.destroy();
        let mut dumper = JsonDumper::new();
        engine.dump(&mut dumper);
        let state = dumper.finish();
        assert_eq!(state["initialized"], false);
        assert!(state.get("vChannels").is_none());
    }
}
