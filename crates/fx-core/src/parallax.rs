use crate::config::ParallaxConfig;
use glam::Vec2;

/// Element box in CSS pixels (as from `getBoundingClientRect`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.left + self.width * 0.5, self.top + self.height * 0.5)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParallaxTilt {
    pub rotate_x_deg: f32,
    pub rotate_y_deg: f32,
    pub translate_z_px: f32,
}

// two decimals, and never "-0"
#[inline]
fn css_num(v: f32) -> f32 {
    (v * 100.0).round() / 100.0 + 0.0
}

impl ParallaxTilt {
    /// Tilt toward the viewer for a pointer at `pointer` over `rect`.
    /// Rotation shrinks as `intensity` grows.
    pub fn compute(pointer: Vec2, rect: Rect, intensity: f32, cfg: &ParallaxConfig) -> Self {
        let half = Vec2::new(rect.width * 0.5, rect.height * 0.5);
        if half.x <= 0.0 || half.y <= 0.0 {
            return Self::default();
        }
        let n = ((pointer - rect.center()) / half).clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
        let intensity = if intensity > 0.0 {
            intensity
        } else {
            cfg.default_intensity
        };
        let k = cfg.tilt_numerator / intensity;
        Self {
            rotate_x_deg: -n.y * k,
            rotate_y_deg: n.x * k,
            translate_z_px: n.length().min(1.0) * cfg.translate_z_max_px,
        }
    }

    pub fn to_css(&self, perspective_px: f32) -> String {
        format!(
            "perspective({}px) rotateX({}deg) rotateY({}deg) translateZ({}px)",
            css_num(perspective_px),
            css_num(self.rotate_x_deg),
            css_num(self.rotate_y_deg),
            css_num(self.translate_z_px),
        )
    }
}

/// Transform applied when the pointer leaves a hooked element.
pub fn neutral_transform(cfg: &ParallaxConfig) -> String {
    ParallaxTilt::default().to_css(cfg.perspective_px)
}

/// Per-element hook state with animation-frame coalescing.
///
/// Pointer moves only record the latest sample; at most one frame is
/// outstanding at a time and `flush` does the layout read and recompute.
#[derive(Debug, Clone)]
pub struct ParallaxTracker {
    enabled: bool,
    intensity: f32,
    cfg: ParallaxConfig,
    pending: Option<Vec2>,
    frame_requested: bool,
    transform: String,
}

impl ParallaxTracker {
    pub fn new(enabled: bool, intensity: f32, cfg: ParallaxConfig) -> Self {
        Self {
            enabled,
            intensity,
            cfg,
            pending: None,
            frame_requested: false,
            transform: String::new(),
        }
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn transform(&self) -> &str {
        &self.transform
    }

    /// Returns true when the caller must schedule a frame.
    pub fn on_pointer_move(&mut self, client: Vec2) -> bool {
        if !self.enabled {
            return false;
        }
        self.pending = Some(client);
        if self.frame_requested {
            return false;
        }
        self.frame_requested = true;
        true
    }

    /// Frame callback. Returns the new transform if one was computed.
    pub fn flush(&mut self, rect: Rect) -> Option<&str> {
        self.frame_requested = false;
        let pointer = self.pending.take()?;
        if !self.enabled {
            return None;
        }
        let tilt = ParallaxTilt::compute(pointer, rect, self.intensity, &self.cfg);
        self.transform = tilt.to_css(self.cfg.perspective_px);
        Some(&self.transform)
    }

    /// Back to neutral. Returns true if a requested frame should be cancelled.
    pub fn on_pointer_leave(&mut self) -> bool {
        if !self.enabled {
            return false;
        }
        let had_frame = self.frame_requested;
        self.pending = None;
        self.frame_requested = false;
        self.transform = neutral_transform(&self.cfg);
        had_frame
    }

    #[inline]
    pub fn frame_requested(&self) -> bool {
        self.frame_requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECT: Rect = Rect {
        left: 100.0,
        top: 100.0,
        width: 200.0,
        height: 100.0,
    };

    #[test]
    fn center_is_flat() {
        let t = ParallaxTilt::compute(RECT.center(), RECT, 10.0, &ParallaxConfig::default());
        assert_eq!(t.to_css(1000.0), neutral_transform(&ParallaxConfig::default()));
    }

    #[test]
    fn neutral_string_is_exact() {
        assert_eq!(
            neutral_transform(&ParallaxConfig::default()),
            "perspective(1000px) rotateX(0deg) rotateY(0deg) translateZ(0px)"
        );
    }

    #[test]
    fn right_edge_tilts_around_y() {
        let cfg = ParallaxConfig::default();
        let t = ParallaxTilt::compute(Vec2::new(300.0, 150.0), RECT, 10.0, &cfg);
        assert!((t.rotate_y_deg - 10.0).abs() < 1e-4);
        assert!(t.rotate_x_deg.abs() < 1e-6);
        assert!((t.translate_z_px - cfg.translate_z_max_px).abs() < 1e-4);
    }

    #[test]
    fn higher_intensity_means_less_tilt() {
        let cfg = ParallaxConfig::default();
        let p = Vec2::new(300.0, 100.0);
        let soft = ParallaxTilt::compute(p, RECT, 40.0, &cfg);
        let hard = ParallaxTilt::compute(p, RECT, 10.0, &cfg);
        assert!(soft.rotate_y_deg.abs() < hard.rotate_y_deg.abs());
    }

    #[test]
    fn moves_coalesce_into_one_frame() {
        let mut t = ParallaxTracker::new(true, 10.0, ParallaxConfig::default());
        assert!(t.on_pointer_move(Vec2::new(120.0, 120.0)));
        assert!(!t.on_pointer_move(Vec2::new(150.0, 120.0)));
        assert!(!t.on_pointer_move(Vec2::new(300.0, 150.0)));
        let css = t.flush(RECT).unwrap().to_string();
        assert!(css.contains("rotateY(10deg)"), "{css}");
        assert!(t.flush(RECT).is_none());
        assert!(t.on_pointer_move(Vec2::new(120.0, 120.0)));
    }
}
