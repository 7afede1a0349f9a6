use crate::geometry::MeshData;
use crate::material::MaterialParams;
use glam::{EulerRot, Mat4, Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub scale: f32,
    /// XYZ Euler angles in radians.
    pub rotation: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: 1.0,
            rotation: Vec3::ZERO,
        }
    }
}

impl Transform {
    #[inline]
    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    #[inline]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.quat(), self.position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Pending,
    Loaded,
    Fallback,
}

/// One visual owned by exactly one effect.
///
/// `pivot` is the normalization applied at load (scale, rotation, re-centering);
/// `transform` is what the effect animates every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub transform: Transform,
    pub pivot: Transform,
    pub material: MaterialParams,
    pub load_state: LoadState,
    pub mesh: MeshData,
}

impl SceneObject {
    /// Placeholder held by an effect while its asset request is in flight.
    /// It tracks the animation but is never drawn.
    pub fn pending(material: MaterialParams) -> Self {
        Self {
            transform: Transform::default(),
            pivot: Transform::default(),
            material,
            load_state: LoadState::Pending,
            mesh: MeshData::default(),
        }
    }

    /// Take geometry, normalization and material from a resolved load,
    /// keeping the transform the effect has been animating.
    pub fn settle(&mut self, resolved: SceneObject) {
        let transform = self.transform;
        *self = SceneObject {
            transform,
            ..resolved
        };
    }

    #[inline]
    pub fn is_drawable(&self) -> bool {
        self.load_state != LoadState::Pending && !self.mesh.is_empty()
    }

    #[inline]
    pub fn model_matrix(&self) -> Mat4 {
        self.transform.matrix() * self.pivot.matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::FallbackShape;
    use crate::profile::{DeviceProfile, DeviceSignals};

    fn material() -> MaterialParams {
        MaterialParams::fallback(&DeviceProfile::from_signals(&DeviceSignals::default()))
    }

    #[test]
    fn pending_object_is_not_drawable() {
        let obj = SceneObject::pending(material());
        assert_eq!(obj.load_state, LoadState::Pending);
        assert!(!obj.is_drawable());
    }

    #[test]
    fn settle_keeps_animated_transform() {
        let mut obj = SceneObject::pending(material());
        obj.transform.position = Vec3::new(1.0, 2.0, -3.0);
        obj.transform.rotation.y = 0.5;
        let resolved = SceneObject {
            transform: Transform::default(),
            pivot: Transform {
                position: Vec3::new(0.0, -1.0, 0.0),
                ..Default::default()
            },
            material: material(),
            load_state: LoadState::Fallback,
            mesh: FallbackShape::Sphere.build(),
        };
        obj.settle(resolved);
        assert_eq!(obj.load_state, LoadState::Fallback);
        assert!(obj.is_drawable());
        assert_eq!(obj.transform.position, Vec3::new(1.0, 2.0, -3.0));
        assert_eq!(obj.transform.rotation.y, 0.5);
        assert_eq!(obj.pivot.position.y, -1.0);
    }
}
