//! One audio lane: delay line, dry/wet mix, bypass crossfade and metering.

use std::sync::Arc;

use serde_json::json;
use tardy_core::units::{abs_max, fmadd_k3, samples_to_millis};
use tardy_core::{
    AudioPort, Block, Bypass, ControlPort, Delay, MeterPort, StateDumper, BUFFER_SIZE,
};

/// Controls and meters shared by every channel of an instance.
///
/// The control surface exposes a single delay/dry/wet set, so channels
/// reference one group by index instead of each holding its own ports.
#[derive(Debug, Clone)]
pub struct ControlGroup {
    /// Delay in samples.
    pub delay: Arc<ControlPort>,
    /// Dry (unprocessed) amount.
    pub dry: Arc<ControlPort>,
    /// Wet (processed) amount.
    pub wet: Arc<ControlPort>,
    /// Delay time meter, in milliseconds.
    pub out_delay: Arc<MeterPort>,
}

/// Processing state of a single channel.
#[derive(Debug)]
pub struct Channel {
    // DSP processing modules
    line: Delay,
    bypass: Bypass,

    // Parameters
    delay: usize,
    dry_gain: f32,
    wet_gain: f32,

    // Bindings
    input: AudioPort,
    output: AudioPort,
    group: usize,
    in_level: Arc<MeterPort>,
    out_level: Arc<MeterPort>,
}

impl Channel {
    pub fn new(
        input: AudioPort,
        output: AudioPort,
        group: usize,
        in_level: Arc<MeterPort>,
        out_level: Arc<MeterPort>,
        bypassed: bool,
    ) -> Self {
        Self {
            line: Delay::new(),
            bypass: Bypass::new(bypassed),
            delay: 0,
            dry_gain: 0.0,
            wet_gain: 0.0,
            input,
            output,
            group,
            in_level,
            out_level,
        }
    }

    /// Index of the control group this channel reads.
    #[inline]
    pub fn group(&self) -> usize {
        self.group
    }

    #[inline]
    pub fn delay(&self) -> usize {
        self.delay
    }

    #[inline]
    pub fn dry_gain(&self) -> f32 {
        self.dry_gain
    }

    #[inline]
    pub fn wet_gain(&self) -> f32 {
        self.wet_gain
    }

    #[inline]
    pub fn line(&self) -> &Delay {
        &self.line
    }

    #[inline]
    pub fn bypass(&self) -> &Bypass {
        &self.bypass
    }

    /// Resize the delay line for `max_delay` samples and retime the bypass
    /// ramp for the new sample rate.
    pub fn update_sample_rate(&mut self, sample_rate: u32, max_delay: usize) {
        if let Err(e) = self.line.init(max_delay) {
            log::error!("Channel {} delay line unusable: {}", self.input.id(), e);
        }
        self.bypass.init(sample_rate);
    }

    /// Take a snapshot of the controls.
    pub fn update_settings(&mut self, controls: &ControlGroup, out_gain: f32, bypass: bool) {
        self.dry_gain = controls.dry.value() * out_gain;
        self.wet_gain = controls.wet.value() * out_gain;
        self.delay = controls.delay.value().max(0.0) as usize;

        self.line.set_delay(self.delay);
        self.bypass.set_bypass(bypass);
    }

    /// Process this channel's slots of `block`.
    ///
    /// `scratch` holds the wet signal between the delay line and the bypass
    /// crossfade, which must see the untouched input as its dry signal. The
    /// block is processed in chunks of at most `scratch.len()` samples.
    pub fn process(
        &mut self,
        block: &mut Block<'_>,
        scratch: &mut [f32],
        controls: &ControlGroup,
        sample_rate: u32,
    ) {
        let chunk = scratch.len().min(BUFFER_SIZE);
        if chunk == 0 {
            return;
        }
        let Some((input, output)) = block.channel(self.input.channel(), self.output.channel())
        else {
            return;
        };

        let mut in_peak = 0.0f32;
        let mut out_peak = 0.0f32;

        for (src, dst) in input.chunks(chunk).zip(output.chunks_mut(chunk)) {
            let count = src.len();
            let wet = &mut scratch[..count];

            self.line
                .process_ramping(wet, src, self.wet_gain, self.delay, count);
            if self.dry_gain != 0.0 {
                fmadd_k3(wet, src, self.dry_gain);
            }

            in_peak = in_peak.max(abs_max(src));
            out_peak = out_peak.max(abs_max(wet));

            self.bypass.process(dst, src, wet, count);
        }

        self.in_level.set_value(in_peak);
        self.out_level.set_value(out_peak);
        controls
            .out_delay
            .set_value(samples_to_millis(sample_rate, self.delay));
    }

    /// Release the delay line.
    pub fn destroy(&mut self) {
        self.line.destroy();
    }

    pub fn dump(&self, v: &mut dyn StateDumper, controls: &ControlGroup) {
        v.write_object("line", &self.line);
        v.write_object("bypass", &self.bypass);

        v.write("delay", json!(self.delay));
        v.write("dry_gain", json!(self.dry_gain));
        v.write("wet_gain", json!(self.wet_gain));

        v.write("input", json!(self.input.id()));
        v.write("output", json!(self.output.id()));
        v.write("group", json!(self.group));
        v.write("delay_port", json!(controls.delay.id()));
        v.write("dry_port", json!(controls.dry.id()));
        v.write("wet_port", json!(controls.wet.id()));

        v.write("out_delay", json!(controls.out_delay.id()));
        v.write("in_level", json!(self.in_level.id()));
        v.write("out_level", json!(self.out_level.id()));
    }
}
