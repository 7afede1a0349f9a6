/// DOM contract and presentation constants for the web layer.
///
/// Animation tuning lives in the core crate; these are the names and styles
/// the page and the layer agree on.
// Marker attributes read from the host page
pub const ATTR_CURSOR_ACTION: &str = "data-cursor-action";
pub const ATTR_CURSOR_PULSE: &str = "data-cursor-pulse";
pub const ATTR_BACKGROUND: &str = "data-fx-background";
pub const ATTR_PARALLAX: &str = "data-parallax";
pub const ATTR_CONFIG: &str = "data-fx-config";

// Set on every canvas the layer creates; value is the layer kind
pub const ATTR_LAYER: &str = "data-fx-layer";

// Class toggled on the pulse target while a press is active
pub const PRESS_CLASS: &str = "fx-press";

// Injected while the custom cursor is mounted
pub const CURSOR_HIDE_STYLE_ID: &str = "fx-cursor-hide";
pub const CURSOR_HIDE_CSS: &str = "* { cursor: none !important; }";

// Canvas stacking; the background sits under content, the cursor over everything
pub const BACKGROUND_Z_INDEX: i32 = 0;
pub const CURSOR_Z_INDEX: i32 = 2_147_483_000;

pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

// Lighting shared by both effects (direction toward the light, world space)
pub const LIGHT_DIR: [f32; 3] = [-0.4, 0.65, 1.0];

// Planar drop shadow: distance of the receiving plane behind each object and its opacity
pub const SHADOW_PLANE_OFFSET: f32 = 1.2;
pub const SHADOW_ALPHA: f32 = 0.18;

/// Selector for elements carrying `attr`.
#[inline]
pub fn marker_selector(attr: &str) -> String {
    format!("[{attr}]")
}
