// Tuning defaults for the decorative layer. Everything here can be overridden
// through `FxConfig`; these are the values the portal ships with.

// Device profile
pub const MOBILE_BREAKPOINT_PX: f64 = 768.0;
pub const DPR_CAP_MOBILE: f64 = 1.5;
pub const DPR_CAP_DESKTOP: f64 = 2.0;
pub const TARGET_FPS_MOBILE: f64 = 30.0;
pub const TARGET_FPS_DESKTOP: f64 = 60.0;
// rAF timestamps jitter by a fraction of a millisecond
pub const FRAME_GATE_TOLERANCE_MS: f64 = 1.0;
pub const MSAA_SAMPLES_DESKTOP: u32 = 4;

// Wheel impulse
pub const WHEEL_NOISE_THRESHOLD: f64 = 3.0;
pub const WHEEL_INTENSITY_PER_DELTA: f32 = 0.02;
pub const WHEEL_INTENSITY_MAX: f32 = 3.0;
pub const WHEEL_DEBOUNCE_MS: f64 = 150.0;
pub const WHEEL_DECAY_PER_FRAME: f32 = 0.95;

// Floating background
pub const FLOAT_STEP_SCALE: f32 = 0.04; // world units per frame at intensity 1
pub const FLOAT_WRAP_MARGIN: f32 = 1.5; // world units beyond the visible band
pub const FLOAT_WRAP_JITTER: f32 = 0.4;
pub const BACKGROUND_CAMERA_Z: f32 = 10.0;
pub const BACKGROUND_FOV_Y_DEG: f32 = 45.0;
pub const BACKGROUND_NEAR: f32 = 0.1;
pub const BACKGROUND_FAR: f32 = 100.0;
pub const LOGO_TILT_X: f32 = 0.35; // radians, faces the viewer slightly from above

// Cursor
pub const CURSOR_LERP: f32 = 0.2;
pub const CURSOR_DWELL_MS: f64 = 2000.0;
pub const CURSOR_PRESS_COOLDOWN_MS: f64 = 4000.0;
pub const CURSOR_PULSE_MS: f64 = 350.0;
pub const CURSOR_PRESS_DIP: f32 = 0.2; // fraction of scale lost at the bottom of a press
pub const CURSOR_CAMERA_Z: f32 = 20.0;
pub const CURSOR_FOV_Y_DEG: f32 = 35.0;
pub const CURSOR_NEAR: f32 = 1.0;
pub const CURSOR_FAR: f32 = 50.0;

// Parallax
pub const PARALLAX_DEFAULT_INTENSITY: f32 = 15.0;
pub const PARALLAX_TILT_NUMERATOR: f32 = 100.0;
pub const PARALLAX_TRANSLATE_Z_MAX_PX: f32 = 12.0;
pub const PARALLAX_PERSPECTIVE_PX: f32 = 1000.0;

// Assets
pub const LOGO_ASSET_PATH: &str = "/models/logo.glb";
pub const CURSOR_ASSET_PATH: &str = "/models/cursor.glb";
pub const LOGO_SCALE: f32 = 1.6;
pub const CURSOR_SCALE: f32 = 0.9;
pub const FALLBACK_BASE_COLOR: [f32; 3] = [0.36, 0.42, 0.95]; // portal indigo
pub const MOBILE_EMISSIVE_FRACTION: f32 = 0.2;
