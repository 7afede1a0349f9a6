use glam::{Mat4, Vec2, Vec3, Vec4};

/// Fixed-look perspective camera sitting on +Z and looking at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSpec {
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
    pub eye_z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub spec: CameraSpec,
    pub aspect: f32,
}

impl Camera {
    pub fn new(spec: CameraSpec, width: f32, height: f32) -> Self {
        let mut cam = Self { spec, aspect: 1.0 };
        cam.set_viewport(width, height);
        cam
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.aspect = width.max(1.0) / height.max(1.0);
    }

    #[inline]
    pub fn eye(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.spec.eye_z)
    }

    #[inline]
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.spec.fov_y_deg.to_radians(),
            self.aspect,
            self.spec.near,
            self.spec.far,
        )
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), Vec3::ZERO, Vec3::Y)
    }

    #[inline]
    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Half the visible height, in world units, of the plane at `z`.
    pub fn visible_half_height(&self, z: f32) -> f32 {
        let dist = (self.spec.eye_z - z).abs();
        (self.spec.fov_y_deg.to_radians() * 0.5).tan() * dist
    }

    /// Compute a world-space ray from CSS pixel coordinates inside a viewport
    /// of `viewport` CSS pixels.
    ///
    /// Returns `(ray_origin, ray_direction)`.
    pub fn screen_to_world_ray(&self, px: Vec2, viewport: Vec2) -> (Vec3, Vec3) {
        let w = viewport.x.max(1.0);
        let h = viewport.y.max(1.0);
        let ndc_x = (2.0 * px.x / w) - 1.0;
        let ndc_y = 1.0 - (2.0 * px.y / h);
        let inv = self.view_proj().inverse();
        let p_far = inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let p1: Vec3 = p_far.truncate() / p_far.w;
        let ro = self.eye();
        let rd = (p1 - ro).normalize();
        (ro, rd)
    }

    /// Where the pointer ray through `px` meets the plane `z = plane_z`.
    pub fn screen_to_plane(&self, px: Vec2, viewport: Vec2, plane_z: f32) -> Option<Vec3> {
        let (ro, rd) = self.screen_to_world_ray(px, viewport);
        ray_plane_z(ro, rd, plane_z)
    }
}

#[inline]
pub fn ray_plane_z(ray_origin: Vec3, ray_dir: Vec3, plane_z: f32) -> Option<Vec3> {
    if ray_dir.z.abs() <= 1e-6 {
        return None;
    }
    let t = (plane_z - ray_origin.z) / ray_dir.z;
    (t >= 0.0).then(|| ray_origin + ray_dir * t)
}

/// Flattens geometry onto `plane` (`n·p + d = 0`) along the homogeneous
/// `light` vector. `w = 0` is a directional light.
pub fn planar_shadow(plane: Vec4, light: Vec4) -> Mat4 {
    let d = plane.dot(light);
    Mat4::from_cols(
        Vec4::new(d, 0.0, 0.0, 0.0) - light * plane.x,
        Vec4::new(0.0, d, 0.0, 0.0) - light * plane.y,
        Vec4::new(0.0, 0.0, d, 0.0) - light * plane.z,
        Vec4::new(0.0, 0.0, 0.0, d) - light * plane.w,
    )
}
