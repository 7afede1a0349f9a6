//! Floating background field: bounded sinusoidal bob plus an unbounded,
//! wheel-driven drift that wraps around the visible band.

use crate::config::{FloatingConfig, WheelConfig};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use smallvec::SmallVec;

/// Static description of one decorative instance.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SlotSpec {
    pub base_position: Vec3,
    /// Radians.
    pub phase: f32,
    /// World units.
    pub amplitude: f32,
    /// Radians per millisecond.
    pub speed: f32,
    /// Multiplier on the shared wheel drift.
    pub scroll_speed: f32,
    /// Radians added to Y rotation every stepped frame.
    pub rotation_speed: f32,
    /// Fixed X tilt set at load.
    pub tilt_x: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Loading,
    Active,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FloatingSlot {
    pub spec: SlotSpec,
    pub state: SlotState,
    /// Persists across frames; only drift and wrap-around change it.
    pub scroll_offset: f32,
    pub float_offset: f32,
    pub position: Vec3,
    pub rotation: Vec3,
}

impl FloatingSlot {
    pub fn new(spec: SlotSpec) -> Self {
        Self {
            spec,
            state: SlotState::Loading,
            scroll_offset: 0.0,
            float_offset: 0.0,
            position: spec.base_position,
            rotation: Vec3::new(spec.tilt_x, 0.0, 0.0),
        }
    }

    #[inline]
    pub fn float_offset_at(&self, elapsed_ms: f64) -> f32 {
        let angle = self.spec.phase as f64 + self.spec.speed as f64 * elapsed_ms;
        angle.sin() as f32 * self.spec.amplitude
    }

    #[inline]
    pub fn activate(&mut self) {
        self.state = SlotState::Active;
    }

    /// `base + float + offset`, the decomposition the field maintains.
    #[inline]
    pub fn candidate_y(&self) -> f32 {
        self.spec.base_position.y + self.float_offset + self.scroll_offset
    }
}

/// Short-lived "kick" from wheel input.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelImpulse {
    direction: f32,
    intensity: f32,
    last_event_ms: Option<f64>,
}

impl WheelImpulse {
    /// Returns false when the event was below the noise threshold.
    pub fn on_wheel(&mut self, delta_y: f64, now_ms: f64, cfg: &WheelConfig) -> bool {
        if !delta_y.is_finite() || delta_y.abs() <= cfg.noise_threshold {
            return false;
        }
        self.direction = if delta_y > 0.0 { 1.0 } else { -1.0 };
        self.intensity = (self.intensity + delta_y.abs() as f32 * cfg.intensity_per_delta)
            .min(cfg.intensity_max);
        self.last_event_ms = Some(now_ms);
        true
    }

    /// Debounce: a quiet period longer than `debounce_ms` ends the impulse.
    pub fn settle(&mut self, now_ms: f64, cfg: &WheelConfig) {
        if let Some(last) = self.last_event_ms {
            if now_ms - last > cfg.debounce_ms {
                self.direction = 0.0;
                self.intensity = 0.0;
                self.last_event_ms = None;
            }
        }
    }

    #[inline]
    pub fn decay(&mut self, cfg: &WheelConfig) {
        self.intensity *= cfg.decay_per_frame;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.direction != 0.0 && self.intensity > 0.0
    }

    #[inline]
    pub fn direction(&self) -> f32 {
        self.direction
    }

    #[inline]
    pub fn intensity(&self) -> f32 {
        self.intensity
    }
}

pub struct FloatingField {
    slots: SmallVec<[FloatingSlot; 2]>,
    wheel: WheelImpulse,
    wheel_cfg: WheelConfig,
    cfg: FloatingConfig,
    origin_ms: f64,
    half_height: f32,
    rng: StdRng,
    last_drift: f32,
}

impl FloatingField {
    pub fn new(
        wheel_cfg: WheelConfig,
        cfg: FloatingConfig,
        half_height: f32,
        origin_ms: f64,
        seed: u64,
    ) -> Self {
        let slots = cfg.slots.iter().copied().map(FloatingSlot::new).collect();
        Self {
            slots,
            wheel: WheelImpulse::default(),
            wheel_cfg,
            cfg,
            origin_ms,
            half_height: half_height.max(0.0),
            rng: StdRng::seed_from_u64(seed),
            last_drift: 0.0,
        }
    }

    #[inline]
    pub fn slots(&self) -> &[FloatingSlot] {
        &self.slots
    }

    #[inline]
    pub fn slot_mut(&mut self, index: usize) -> Option<&mut FloatingSlot> {
        self.slots.get_mut(index)
    }

    #[inline]
    pub fn wheel(&self) -> &WheelImpulse {
        &self.wheel
    }

    /// Largest absolute drift applied to any slot in the last step.
    #[inline]
    pub fn last_drift(&self) -> f32 {
        self.last_drift
    }

    /// Visible half-height in world units; changes on resize.
    pub fn set_half_height(&mut self, half_height: f32) {
        self.half_height = half_height.max(0.0);
    }

    /// `(bottom, top)` of the band slots are kept inside.
    #[inline]
    pub fn band(&self) -> (f32, f32) {
        let top = self.half_height + self.cfg.wrap_margin;
        (-top, top)
    }

    pub fn on_wheel(&mut self, delta_y: f64, now_ms: f64) -> bool {
        self.wheel.on_wheel(delta_y, now_ms, &self.wheel_cfg)
    }

    /// Let time pass without stepping the animation (debounce only).
    pub fn advance(&mut self, now_ms: f64) {
        self.wheel.settle(now_ms, &self.wheel_cfg);
    }

    /// One animation frame. Order is fixed: debounce, per-slot float,
    /// drift, wrap, spin, then impulse decay.
    pub fn step(&mut self, now_ms: f64) {
        self.wheel.settle(now_ms, &self.wheel_cfg);
        let elapsed_ms = now_ms - self.origin_ms;
        let (_, top) = self.band();
        let active = self.wheel.is_active();
        let kick = -self.wheel.direction() * self.wheel.intensity() * self.cfg.step_scale;
        let jitter_max = self.cfg.wrap_jitter;
        let mut max_drift = 0.0f32;

        for slot in self.slots.iter_mut() {
            slot.float_offset = slot.float_offset_at(elapsed_ms);
            if active {
                let drift = kick * slot.spec.scroll_speed;
                slot.scroll_offset += drift;
                max_drift = max_drift.max(drift.abs());
            }

            let candidate = slot.candidate_y();
            if candidate > top || candidate < -top {
                let jitter = if jitter_max.is_finite() && jitter_max > 0.0 {
                    self.rng.gen_range(0.0..jitter_max)
                } else {
                    0.0
                };
                let pull = (2.0 * slot.spec.amplitude.abs() + jitter).min(top);
                let target = if candidate > top {
                    -top + pull
                } else {
                    top - pull
                };
                slot.scroll_offset = target - slot.spec.base_position.y - slot.float_offset;
            }

            slot.position = Vec3::new(
                slot.spec.base_position.x,
                slot.candidate_y(),
                slot.spec.base_position.z,
            );
            slot.rotation.y += slot.spec.rotation_speed;
        }

        self.last_drift = max_drift;
        self.wheel.decay(&self.wheel_cfg);
    }
}
