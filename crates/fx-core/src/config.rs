//! Layer configuration. Every heuristic number is a tunable here; defaults
//! come from `constants.rs`. Hosts may override any subset as JSON.

use crate::asset::{Anchor, TransformSpec};
use crate::camera::CameraSpec;
use crate::constants::*;
use crate::error::ConfigError;
use crate::floating::SlotSpec;
use crate::geometry::FallbackShape;
use glam::Vec3;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    pub noise_threshold: f64,
    pub intensity_per_delta: f32,
    pub intensity_max: f32,
    pub debounce_ms: f64,
    pub decay_per_frame: f32,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            noise_threshold: WHEEL_NOISE_THRESHOLD,
            intensity_per_delta: WHEEL_INTENSITY_PER_DELTA,
            intensity_max: WHEEL_INTENSITY_MAX,
            debounce_ms: WHEEL_DEBOUNCE_MS,
            decay_per_frame: WHEEL_DECAY_PER_FRAME,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FloatingConfig {
    pub routes: Vec<String>,
    pub step_scale: f32,
    pub wrap_margin: f32,
    pub wrap_jitter: f32,
    pub slots: Vec<SlotSpec>,
}

impl Default for FloatingConfig {
    fn default() -> Self {
        Self {
            routes: default_routes(),
            step_scale: FLOAT_STEP_SCALE,
            wrap_margin: FLOAT_WRAP_MARGIN,
            wrap_jitter: FLOAT_WRAP_JITTER,
            slots: vec![
                SlotSpec {
                    base_position: Vec3::new(-4.2, 1.2, -2.0),
                    phase: 0.0,
                    amplitude: 0.35,
                    speed: 0.0012,
                    scroll_speed: 1.0,
                    rotation_speed: 0.006,
                    tilt_x: LOGO_TILT_X,
                },
                SlotSpec {
                    base_position: Vec3::new(4.4, -1.6, -3.0),
                    phase: 2.1,
                    amplitude: 0.45,
                    speed: 0.0009,
                    scroll_speed: 1.35,
                    rotation_speed: -0.004,
                    tilt_x: LOGO_TILT_X,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    pub routes: Vec<String>,
    pub lerp: f32,
    pub dwell_ms: f64,
    pub press_cooldown_ms: f64,
    pub pulse_ms: f64,
    pub press_dip: f32,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            routes: default_routes(),
            lerp: CURSOR_LERP,
            dwell_ms: CURSOR_DWELL_MS,
            press_cooldown_ms: CURSOR_PRESS_COOLDOWN_MS,
            pulse_ms: CURSOR_PULSE_MS,
            press_dip: CURSOR_PRESS_DIP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParallaxConfig {
    pub default_intensity: f32,
    pub tilt_numerator: f32,
    pub translate_z_max_px: f32,
    pub perspective_px: f32,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            default_intensity: PARALLAX_DEFAULT_INTENSITY,
            tilt_numerator: PARALLAX_TILT_NUMERATOR,
            translate_z_max_px: PARALLAX_TRANSLATE_Z_MAX_PX,
            perspective_px: PARALLAX_PERSPECTIVE_PX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub logo_path: String,
    pub cursor_path: String,
    pub logo_scale: f32,
    pub cursor_scale: f32,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            logo_path: LOGO_ASSET_PATH.to_string(),
            cursor_path: CURSOR_ASSET_PATH.to_string(),
            logo_scale: LOGO_SCALE,
            cursor_scale: CURSOR_SCALE,
        }
    }
}

impl AssetConfig {
    pub fn logo_spec(&self) -> TransformSpec {
        TransformSpec {
            scale: self.logo_scale,
            rotation: Vec3::ZERO,
            anchor: Anchor::Center,
            fallback: FallbackShape::Sphere,
        }
    }

    /// Cursor models are authored pointing up; tilt them like a system arrow.
    pub fn cursor_spec(&self) -> TransformSpec {
        TransformSpec {
            scale: self.cursor_scale,
            rotation: Vec3::new(0.0, 0.0, 0.45),
            anchor: Anchor::Tip,
            fallback: FallbackShape::Cone,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct FxConfig {
    pub wheel: WheelConfig,
    pub floating: FloatingConfig,
    pub cursor: CursorConfig,
    pub parallax: ParallaxConfig,
    pub assets: AssetConfig,
}

trait FiniteOr {
    fn finite_or(self, fallback: Self) -> Self;
}

impl FiniteOr for f32 {
    #[inline]
    fn finite_or(self, fallback: f32) -> f32 {
        if self.is_finite() {
            self
        } else {
            fallback
        }
    }
}

impl FiniteOr for f64 {
    #[inline]
    fn finite_or(self, fallback: f64) -> f64 {
        if self.is_finite() {
            self
        } else {
            fallback
        }
    }
}

fn default_routes() -> Vec<String> {
    vec!["/".to_string(), "/dashboard".to_string(), "/tasks/*".to_string()]
}

impl FxConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: FxConfig = serde_json::from_str(json)?;
        Ok(cfg.validated())
    }

    /// Clamp values that would break the animation math. Non-finite numbers
    /// (JSON `1e39` parses to infinity) fall back to the defaults.
    pub fn validated(mut self) -> Self {
        let d = FxConfig::default();
        let w = &mut self.wheel;
        w.noise_threshold = w.noise_threshold.finite_or(d.wheel.noise_threshold).max(0.0);
        w.intensity_per_delta = w
            .intensity_per_delta
            .finite_or(d.wheel.intensity_per_delta)
            .max(0.0);
        if !(w.intensity_max.is_finite() && w.intensity_max > 0.0) {
            w.intensity_max = d.wheel.intensity_max;
        }
        w.debounce_ms = w.debounce_ms.finite_or(d.wheel.debounce_ms).max(0.0);
        if !(w.decay_per_frame > 0.0 && w.decay_per_frame < 1.0) {
            w.decay_per_frame = d.wheel.decay_per_frame;
        }

        let c = &mut self.cursor;
        if !(c.lerp > 0.0 && c.lerp <= 1.0) {
            c.lerp = d.cursor.lerp;
        }
        c.dwell_ms = c.dwell_ms.finite_or(d.cursor.dwell_ms).max(0.0);
        c.press_cooldown_ms = c
            .press_cooldown_ms
            .finite_or(d.cursor.press_cooldown_ms)
            .max(0.0);
        c.pulse_ms = c.pulse_ms.finite_or(d.cursor.pulse_ms).max(0.0);
        c.press_dip = c.press_dip.finite_or(d.cursor.press_dip).clamp(0.0, 1.0);

        let p = &mut self.parallax;
        if !(p.default_intensity.is_finite() && p.default_intensity > 0.0) {
            p.default_intensity = d.parallax.default_intensity;
        }
        p.tilt_numerator = p.tilt_numerator.finite_or(d.parallax.tilt_numerator);
        p.translate_z_max_px = p
            .translate_z_max_px
            .finite_or(d.parallax.translate_z_max_px);
        p.perspective_px = p.perspective_px.finite_or(d.parallax.perspective_px);

        let f = &mut self.floating;
        f.step_scale = f.step_scale.finite_or(d.floating.step_scale);
        f.wrap_margin = f.wrap_margin.finite_or(d.floating.wrap_margin).max(0.0);
        f.wrap_jitter = f.wrap_jitter.finite_or(d.floating.wrap_jitter).max(0.0);
        for slot in &mut f.slots {
            let base = slot.base_position;
            slot.base_position = Vec3::new(
                base.x.finite_or(0.0),
                base.y.finite_or(0.0),
                base.z.finite_or(0.0),
            );
            slot.phase = slot.phase.finite_or(0.0);
            slot.amplitude = slot.amplitude.finite_or(0.0).abs();
            slot.speed = slot.speed.finite_or(0.0);
            slot.scroll_speed = slot.scroll_speed.finite_or(1.0);
            slot.rotation_speed = slot.rotation_speed.finite_or(0.0);
            slot.tilt_x = slot.tilt_x.finite_or(LOGO_TILT_X);
        }

        let a = &mut self.assets;
        if !(a.logo_scale.is_finite() && a.logo_scale > 0.0) {
            a.logo_scale = d.assets.logo_scale;
        }
        if !(a.cursor_scale.is_finite() && a.cursor_scale > 0.0) {
            a.cursor_scale = d.assets.cursor_scale;
        }
        self
    }

    pub fn background_camera(&self) -> CameraSpec {
        CameraSpec {
            fov_y_deg: BACKGROUND_FOV_Y_DEG,
            near: BACKGROUND_NEAR,
            far: BACKGROUND_FAR,
            eye_z: BACKGROUND_CAMERA_Z,
        }
    }

    pub fn cursor_camera(&self) -> CameraSpec {
        CameraSpec {
            fov_y_deg: CURSOR_FOV_Y_DEG,
            near: CURSOR_NEAR,
            far: CURSOR_FAR,
            eye_z: CURSOR_CAMERA_Z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = FxConfig::from_json(r#"{ "cursor": { "dwell_ms": 1500 } }"#).unwrap();
        assert_eq!(cfg.cursor.dwell_ms, 1500.0);
        assert_eq!(cfg.cursor.press_cooldown_ms, CURSOR_PRESS_COOLDOWN_MS);
        assert_eq!(cfg.floating.slots.len(), 2);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(FxConfig::from_json("{ cursor: ").is_err());
    }

    #[test]
    fn validation_clamps_broken_values() {
        let cfg = FxConfig::from_json(
            r#"{ "wheel": { "decay_per_frame": 1.5 }, "cursor": { "lerp": 0.0, "press_dip": 4 } }"#,
        )
        .unwrap();
        assert_eq!(cfg.wheel.decay_per_frame, WHEEL_DECAY_PER_FRAME);
        assert_eq!(cfg.cursor.lerp, CURSOR_LERP);
        assert_eq!(cfg.cursor.press_dip, 1.0);
    }

    #[test]
    fn slots_parse_from_json() {
        let cfg = FxConfig::from_json(
            r#"{ "floating": { "slots": [ { "base_position": [0.0, 0.0, 0.0], "phase": 0.5,
                 "amplitude": -0.3, "speed": 0.001, "scroll_speed": 1.0,
                 "rotation_speed": 0.01, "tilt_x": 0.2 } ] } }"#,
        )
        .unwrap();
        assert_eq!(cfg.floating.slots.len(), 1);
        assert_eq!(cfg.floating.slots[0].amplitude, 0.3);
    }

    #[test]
    fn overflowing_numbers_fall_back_to_defaults() {
        let cfg = FxConfig::from_json(
            r#"{ "floating": { "wrap_jitter": 1e39, "step_scale": -1e39, "wrap_margin": 1e39,
                 "slots": [ { "base_position": [0.0, 1e39, 0.0], "phase": 0.0,
                 "amplitude": 1e39, "speed": 1e39, "scroll_speed": -1e39,
                 "rotation_speed": 0.01, "tilt_x": 0.2 } ] },
                 "wheel": { "intensity_max": 1e39, "intensity_per_delta": 1e39 },
                 "cursor": { "press_dip": 1e39 },
                 "assets": { "logo_scale": 1e39 } }"#,
        )
        .unwrap();
        assert_eq!(cfg.floating.wrap_jitter, FLOAT_WRAP_JITTER);
        assert_eq!(cfg.floating.step_scale, FLOAT_STEP_SCALE);
        assert_eq!(cfg.floating.wrap_margin, FLOAT_WRAP_MARGIN);
        let slot = cfg.floating.slots[0];
        assert!(slot.base_position.is_finite());
        assert_eq!(slot.amplitude, 0.0);
        assert_eq!(slot.speed, 0.0);
        assert_eq!(slot.scroll_speed, 1.0);
        assert_eq!(cfg.wheel.intensity_max, WHEEL_INTENSITY_MAX);
        assert_eq!(cfg.wheel.intensity_per_delta, WHEEL_INTENSITY_PER_DELTA);
        assert_eq!(cfg.cursor.press_dip, CURSOR_PRESS_DIP);
        assert_eq!(cfg.assets.logo_scale, LOGO_SCALE);
    }

    #[test]
    fn overflowing_jitter_no_longer_breaks_the_wrap() {
        use crate::floating::FloatingField;
        let cfg = FxConfig::from_json(
            r#"{ "floating": { "wrap_jitter": 1e39, "slots": [ { "base_position": [0.0, 100.0, 0.0],
                 "phase": 0.0, "amplitude": 0.3, "speed": 0.001, "scroll_speed": 1.0,
                 "rotation_speed": 0.0, "tilt_x": 0.0 } ] } }"#,
        )
        .unwrap();
        let mut field = FloatingField::new(cfg.wheel, cfg.floating.clone(), 3.0, 0.0, 7);
        field.step(16.0);
        let (bottom, top) = field.band();
        let y = field.slots()[0].position.y;
        assert!(y.is_finite() && (bottom..=top).contains(&y));
    }
}
