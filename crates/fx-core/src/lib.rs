pub static MESH_WGSL: &str = include_str!("../shaders/mesh.wgsl");

pub mod asset;
pub mod camera;
pub mod cleanup;
pub mod config;
pub mod constants;
pub mod cursor;
pub mod error;
pub mod floating;
pub mod geometry;
pub mod material;
pub mod parallax;
pub mod profile;
pub mod scene;

pub use asset::{resolve, Anchor, LoadOutcome, TransformSpec};
pub use camera::{planar_shadow, Camera, CameraSpec};
pub use cleanup::CleanupRegistry;
pub use config::{AssetConfig, CursorConfig, FloatingConfig, FxConfig, ParallaxConfig, WheelConfig};
pub use cursor::{CursorState, PulseChange};
pub use error::{AssetError, ConfigError};
pub use floating::{FloatingField, FloatingSlot, SlotSpec, SlotState, WheelImpulse};
pub use geometry::{FallbackShape, MeshData};
pub use material::{MaterialParams, MaterialTier};
pub use parallax::{neutral_transform, ParallaxTilt, ParallaxTracker, Rect};
pub use profile::{DeviceProfile, DeviceSignals, FrameGate};
pub use scene::{LoadState, SceneObject, Transform};
