use crate::constants::{FALLBACK_BASE_COLOR, MOBILE_EMISSIVE_FRACTION};
use crate::profile::DeviceProfile;

/// Which shading path a material was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialTier {
    /// Single layer, flat emissive tint. Used on low-power profiles.
    Lite,
    /// Clearcoat + transmission + reflectivity with an environment boost.
    Rich,
}

/// Shading parameters uploaded per object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialParams {
    pub tier: MaterialTier,
    pub base_color: [f32; 3],
    pub emissive: [f32; 3],
    pub metalness: f32,
    pub roughness: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub transmission: f32,
    pub reflectivity: f32,
    pub env_intensity: f32,
    pub opacity: f32,
}

impl MaterialParams {
    pub fn lite(original: [f32; 3]) -> Self {
        Self {
            tier: MaterialTier::Lite,
            base_color: original,
            emissive: original.map(|c| c * MOBILE_EMISSIVE_FRACTION),
            metalness: 0.5,
            roughness: 0.4,
            clearcoat: 0.0,
            clearcoat_roughness: 0.0,
            transmission: 0.0,
            reflectivity: 0.0,
            env_intensity: 1.0,
            opacity: 1.0,
        }
    }

    pub fn rich(original: [f32; 3]) -> Self {
        Self {
            tier: MaterialTier::Rich,
            base_color: original,
            emissive: original.map(|c| c * 0.08),
            metalness: 0.35,
            roughness: 0.18,
            clearcoat: 1.0,
            clearcoat_roughness: 0.08,
            transmission: 0.15,
            reflectivity: 0.9,
            env_intensity: 1.6,
            opacity: 1.0,
        }
    }

    /// Material override chosen by device profile, tinted from the asset's own colour.
    pub fn for_profile(profile: &DeviceProfile, original: [f32; 3]) -> Self {
        if profile.low_power {
            Self::lite(original)
        } else {
            Self::rich(original)
        }
    }

    /// Default material for procedural fallback shapes.
    pub fn fallback(profile: &DeviceProfile) -> Self {
        Self::for_profile(profile, FALLBACK_BASE_COLOR)
    }
}
