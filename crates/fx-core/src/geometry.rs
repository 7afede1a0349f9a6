use glam::{Mat4, Vec3};
use std::f32::consts::{PI, TAU};

/// Indexed triangle list in object space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

impl MeshData {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty() || self.positions.is_empty()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Bounding box of the vertices after applying `m`.
    pub fn bounds_under(&self, m: Mat4) -> Option<Aabb> {
        let mut it = self
            .positions
            .iter()
            .map(|p| m.transform_point3(Vec3::from_array(*p)));
        let first = it.next()?;
        let (min, max) = it.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Aabb { min, max })
    }

    pub fn bounds(&self) -> Option<Aabb> {
        self.bounds_under(Mat4::IDENTITY)
    }

    /// Append `other` with its vertices transformed by `m`.
    pub fn append_transformed(&mut self, other: &MeshData, m: Mat4) {
        let base = self.positions.len() as u32;
        let normal_m = m.inverse().transpose();
        self.positions.extend(
            other
                .positions
                .iter()
                .map(|p| m.transform_point3(Vec3::from_array(*p)).to_array()),
        );
        self.normals.extend(other.normals.iter().map(|n| {
            normal_m
                .transform_vector3(Vec3::from_array(*n))
                .normalize_or_zero()
                .to_array()
        }));
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Area-weighted smooth normals, replacing whatever was there.
    pub fn recompute_normals(&mut self) {
        let mut acc = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            if a >= acc.len() || b >= acc.len() || c >= acc.len() {
                continue;
            }
            let pa = Vec3::from_array(self.positions[a]);
            let pb = Vec3::from_array(self.positions[b]);
            let pc = Vec3::from_array(self.positions[c]);
            let n = (pb - pa).cross(pc - pa);
            acc[a] += n;
            acc[b] += n;
            acc[c] += n;
        }
        self.normals = acc
            .into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
            .collect();
    }

    /// Every index is in range and the list is made of whole triangles.
    pub fn is_well_formed(&self) -> bool {
        let n = self.positions.len() as u32;
        self.indices.len() % 3 == 0
            && self.normals.len() == self.positions.len()
            && self.indices.iter().all(|i| *i < n)
    }
}

/// Procedural stand-ins used when a real asset cannot be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackShape {
    /// Arrow-like cone, apex on +Y.
    Cone,
    /// Smooth ball for logo slots.
    Sphere,
}

impl FallbackShape {
    pub fn build(self) -> MeshData {
        match self {
            FallbackShape::Cone => cone(0.5, 1.4, 24),
            FallbackShape::Sphere => uv_sphere(0.9, 24, 16),
        }
    }
}

/// Cone with the apex at `+height/2` and a capped base at `-height/2`.
pub fn cone(radius: f32, height: f32, segments: u32) -> MeshData {
    let segments = segments.max(3);
    let half = height * 0.5;
    let mut mesh = MeshData::default();
    let slope = radius / height;
    // side: one apex vertex per segment so normals stay sharp at the tip
    for i in 0..segments {
        let a0 = TAU * i as f32 / segments as f32;
        let a1 = TAU * (i + 1) as f32 / segments as f32;
        let am = (a0 + a1) * 0.5;
        let base = mesh.positions.len() as u32;
        let side_n = |a: f32| Vec3::new(a.cos(), slope, a.sin()).normalize().to_array();
        mesh.positions.push([0.0, half, 0.0]);
        mesh.normals.push(side_n(am));
        mesh.positions
            .push([radius * a1.cos(), -half, radius * a1.sin()]);
        mesh.normals.push(side_n(a1));
        mesh.positions
            .push([radius * a0.cos(), -half, radius * a0.sin()]);
        mesh.normals.push(side_n(a0));
        mesh.indices.extend([base, base + 1, base + 2]);
    }
    // base cap
    let center = mesh.positions.len() as u32;
    mesh.positions.push([0.0, -half, 0.0]);
    mesh.normals.push([0.0, -1.0, 0.0]);
    for i in 0..segments {
        let a = TAU * i as f32 / segments as f32;
        mesh.positions.push([radius * a.cos(), -half, radius * a.sin()]);
        mesh.normals.push([0.0, -1.0, 0.0]);
    }
    for i in 0..segments {
        let a = center + 1 + i;
        let b = center + 1 + (i + 1) % segments;
        mesh.indices.extend([center, a, b]);
    }
    mesh
}

pub fn uv_sphere(radius: f32, sectors: u32, stacks: u32) -> MeshData {
    let sectors = sectors.max(3);
    let stacks = stacks.max(2);
    let mut mesh = MeshData::default();
    for j in 0..=stacks {
        let phi = PI * j as f32 / stacks as f32;
        for i in 0..=sectors {
            let theta = TAU * i as f32 / sectors as f32;
            let n = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            mesh.positions.push((n * radius).to_array());
            mesh.normals.push(n.to_array());
        }
    }
    let row = sectors + 1;
    for j in 0..stacks {
        for i in 0..sectors {
            let a = j * row + i;
            let b = a + row;
            if j != 0 {
                mesh.indices.extend([a, a + 1, b]);
            }
            if j != stacks - 1 {
                mesh.indices.extend([a + 1, b + 1, b]);
            }
        }
    }
    mesh
}
