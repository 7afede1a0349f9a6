use crate::constants::*;

/// Raw device/viewport readings taken from the browser once per mount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceSignals {
    pub inner_width: f64,
    pub inner_height: f64,
    pub device_pixel_ratio: f64,
    pub touch_capable: bool,
    pub reduced_motion: bool,
}

impl Default for DeviceSignals {
    fn default() -> Self {
        Self {
            inner_width: 1280.0,
            inner_height: 800.0,
            device_pixel_ratio: 1.0,
            touch_capable: false,
            reduced_motion: false,
        }
    }
}

/// Capability tier computed once and handed to every effect, so no effect
/// re-derives "is this mobile" on its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceProfile {
    pub low_power: bool,
    pub touch_only: bool,
    pub reduced_motion: bool,
    pub pixel_ratio_cap: f64,
    pub device_pixel_ratio: f64,
    pub shadows_enabled: bool,
    pub antialias: bool,
    pub target_fps: f64,
}

impl DeviceProfile {
    pub fn from_signals(s: &DeviceSignals) -> Self {
        let low_power = s.inner_width < MOBILE_BREAKPOINT_PX;
        let cap = if low_power {
            DPR_CAP_MOBILE
        } else {
            DPR_CAP_DESKTOP
        };
        Self {
            low_power,
            touch_only: s.touch_capable,
            reduced_motion: s.reduced_motion,
            pixel_ratio_cap: cap,
            device_pixel_ratio: s.device_pixel_ratio,
            shadows_enabled: !low_power,
            antialias: !low_power,
            target_fps: if low_power {
                TARGET_FPS_MOBILE
            } else {
                TARGET_FPS_DESKTOP
            },
        }
    }

    /// Device pixel ratio actually used for backing stores.
    #[inline]
    pub fn pixel_ratio(&self) -> f64 {
        let dpr = if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio
        } else {
            1.0
        };
        dpr.min(self.pixel_ratio_cap)
    }

    #[inline]
    pub fn msaa_samples(&self) -> u32 {
        if self.antialias {
            MSAA_SAMPLES_DESKTOP
        } else {
            1
        }
    }

    /// Backing-store size for a CSS box, never zero.
    pub fn backing_size(&self, css_width: f64, css_height: f64) -> (u32, u32) {
        let r = self.pixel_ratio();
        let w = (css_width.max(0.0) * r).round() as u32;
        let h = (css_height.max(0.0) * r).round() as u32;
        (w.max(1), h.max(1))
    }

    /// Pointer-driven tilt only makes sense with a hovering pointer.
    #[inline]
    pub fn allows_hover_effects(&self) -> bool {
        !self.low_power && !self.touch_only && !self.reduced_motion
    }
}

#[inline]
pub fn should_mount_background(profile: &DeviceProfile, route: &str, routes: &[String]) -> bool {
    !profile.low_power && !profile.reduced_motion && route_matches(route, routes)
}

#[inline]
pub fn should_mount_cursor(profile: &DeviceProfile, route: &str, routes: &[String]) -> bool {
    !profile.low_power && !profile.touch_only && route_matches(route, routes)
}

/// Exact match, or prefix match for entries ending in `/*`.
pub fn route_matches(route: &str, routes: &[String]) -> bool {
    let path = normalize_route(route);
    routes.iter().any(|r| match r.strip_suffix("/*") {
        Some(prefix) => {
            let prefix = normalize_route(prefix);
            path == prefix || path.starts_with(&format!("{}/", prefix.trim_end_matches('/')))
        }
        None => normalize_route(r) == path,
    })
}

fn normalize_route(route: &str) -> &str {
    let path = route.split(['?', '#']).next().unwrap_or("");
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else if path.is_empty() {
        "/"
    } else {
        path
    }
}

/// Elapsed-time frame limiter. The browser may call back at 120Hz; the
/// effect only steps when a full target interval has passed.
#[derive(Debug, Clone, Copy)]
pub struct FrameGate {
    interval_ms: f64,
    last_ms: Option<f64>,
}

impl FrameGate {
    pub fn new(target_fps: f64) -> Self {
        let fps = if target_fps > 0.0 { target_fps } else { 60.0 };
        Self {
            interval_ms: 1000.0 / fps,
            last_ms: None,
        }
    }

    pub fn for_profile(profile: &DeviceProfile) -> Self {
        Self::new(profile.target_fps)
    }

    /// Returns true when a frame should run at `now_ms`.
    pub fn ready(&mut self, now_ms: f64) -> bool {
        match self.last_ms {
            Some(last) if now_ms - last < self.interval_ms - FRAME_GATE_TOLERANCE_MS => false,
            _ => {
                self.last_ms = Some(now_ms);
                true
            }
        }
    }

    #[inline]
    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }
}
