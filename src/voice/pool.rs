//! Oscillator voice-slot arena.
//!
//! Voices live in a fixed-capacity indexed arena so the per-frame update
//! loop performs no heap allocation. Slots are owned exclusively by the
//! pool and referenced by id only; the pool's cardinality always equals the
//! most recent requested voice count.

use crate::audio::{AudioSink, VoiceId, VoiceParams};
use crate::geometry::GeometryPoint;
use crate::voice::params::map_voice_params;
use log::{debug, warn};

/// Maximum number of simultaneous voices the arena can hold.
pub const MAX_VOICES: usize = 64;

/// One arena slot.
#[derive(Debug, Clone, Copy)]
struct VoiceSlot {
    id: VoiceId,
    params: VoiceParams,
    active: bool,
}

impl VoiceSlot {
    const fn empty() -> Self {
        Self {
            id: 0,
            params: VoiceParams {
                frequency: 0.0,
                amplitude: 0.0,
                pan: 0.0,
            },
            active: false,
        }
    }
}

/// Maps geometry points to synthesized audio voices and updates them in
/// place each tick.
pub struct OscillatorVoicePool {
    slots: [VoiceSlot; MAX_VOICES],
    active_count: usize,

    base_frequency: f32,
    gain_level: f32,
    ramp_ms: f32,
}

impl OscillatorVoicePool {
    /// Create an empty pool.
    ///
    /// # Arguments
    /// * `base_frequency` - Base frequency in Hz geometry maps onto
    /// * `gain_level` - Upper bound for voice amplitudes, in [0, 1]
    /// * `ramp_ms` - Parameter ramp time in milliseconds (10-50 ms)
    pub fn new(base_frequency: f32, gain_level: f32, ramp_ms: f32) -> Self {
        Self {
            slots: [VoiceSlot::empty(); MAX_VOICES],
            active_count: 0,
            base_frequency,
            gain_level,
            ramp_ms: ramp_ms.clamp(10.0, 50.0),
        }
    }

    /// Allocate a voice slot, map the geometry to parameters, and start
    /// audible output on the sink.
    ///
    /// Requests beyond [`MAX_VOICES`] are dropped with a warning rather
    /// than failing the session.
    pub fn create_voice(
        &mut self,
        sink: &mut dyn AudioSink,
        id: VoiceId,
        point: &GeometryPoint,
        harmonic_depth: u32,
    ) {
        if self.active_count >= MAX_VOICES {
            warn!("[VOICES] Arena full ({} voices), dropping voice {}", MAX_VOICES, id);
            return;
        }
        if self.slot_index(id).is_some() {
            debug!("[VOICES] Voice {} already exists, updating instead", id);
            self.update_voice(sink, id, point, harmonic_depth);
            return;
        }

        let params = map_voice_params(point, self.base_frequency, self.gain_level, harmonic_depth);
        self.slots[self.active_count] = VoiceSlot {
            id,
            params,
            active: true,
        };
        self.active_count += 1;
        sink.start_voice(id, params);
    }

    /// Re-map parameters on an existing slot using a short ramp to avoid
    /// audible clicks. Never retriggers the voice; unknown ids are ignored.
    pub fn update_voice(
        &mut self,
        sink: &mut dyn AudioSink,
        id: VoiceId,
        point: &GeometryPoint,
        harmonic_depth: u32,
    ) {
        let params = map_voice_params(point, self.base_frequency, self.gain_level, harmonic_depth);
        if let Some(index) = self.slot_index(id) {
            self.slots[index].params = params;
            sink.update_voice(id, params, self.ramp_ms);
        }
    }

    /// Scale an existing voice's amplitude by a channel gain in [0, 1],
    /// ramped on the sink like any other parameter change.
    pub fn scale_voice_amplitude(&mut self, sink: &mut dyn AudioSink, id: VoiceId, gain: f32) {
        let gain = if gain.is_finite() { gain.clamp(0.0, 1.0) } else { 0.0 };
        if let Some(index) = self.slot_index(id) {
            let mut params = self.slots[index].params;
            params.amplitude = (params.amplitude * gain).clamp(0.0, self.gain_level);
            self.slots[index].params = params;
            sink.update_voice(id, params, self.ramp_ms);
        }
    }

    /// Ramp every voice to silence, then release all slots.
    pub fn stop_all(&mut self, sink: &mut dyn AudioSink) {
        for slot in self.slots.iter_mut().take(self.active_count) {
            if slot.active {
                sink.stop_voice(slot.id, self.ramp_ms);
            }
            *slot = VoiceSlot::empty();
        }
        if self.active_count > 0 {
            debug!("[VOICES] Released {} voices", self.active_count);
        }
        self.active_count = 0;
    }

    /// Number of active voices.
    pub fn active_count(&self) -> usize {
        self.active_count
    }

    /// Current parameters of a voice, if it exists.
    pub fn voice_params(&self, id: VoiceId) -> Option<VoiceParams> {
        self.slot_index(id).map(|i| self.slots[i].params)
    }

    /// Ids of all active voices, in slot order.
    pub fn active_ids(&self) -> Vec<VoiceId> {
        self.slots[..self.active_count]
            .iter()
            .filter(|s| s.active)
            .map(|s| s.id)
            .collect()
    }

    /// Peak amplitude across the active voices.
    pub fn peak_amplitude(&self) -> f32 {
        self.slots[..self.active_count]
            .iter()
            .filter(|s| s.active)
            .map(|s| s.params.amplitude)
            .fold(0.0, f32::max)
    }

    /// Root-mean-square of the active voice amplitudes.
    pub fn rms_amplitude(&self) -> f32 {
        if self.active_count == 0 {
            return 0.0;
        }
        let sum_sq: f32 = self.slots[..self.active_count]
            .iter()
            .filter(|s| s.active)
            .map(|s| s.params.amplitude * s.params.amplitude)
            .sum();
        (sum_sq / self.active_count as f32).sqrt()
    }

    /// Mean frequency across the active voices, or the base frequency when
    /// the pool is empty.
    pub fn mean_frequency(&self) -> f32 {
        if self.active_count == 0 {
            return self.base_frequency;
        }
        let sum: f32 = self.slots[..self.active_count]
            .iter()
            .filter(|s| s.active)
            .map(|s| s.params.frequency)
            .sum();
        sum / self.active_count as f32
    }

    fn slot_index(&self, id: VoiceId) -> Option<usize> {
        self.slots[..self.active_count]
            .iter()
            .position(|s| s.active && s.id == id)
    }
}
