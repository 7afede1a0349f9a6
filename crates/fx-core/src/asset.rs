//! glTF parsing, transform normalization and fallback substitution.
//!
//! Network access lives in the web crate; everything here works on bytes
//! already in hand so a rejected fetch turns into a drawable fallback in the
//! same tick.

use crate::error::AssetError;
use crate::geometry::{FallbackShape, MeshData};
use crate::material::MaterialParams;
use crate::profile::DeviceProfile;
use crate::scene::{LoadState, SceneObject, Transform};
use glam::{Mat4, Vec3};

/// Where the object's origin ends up after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Bounding-box center at the origin.
    Center,
    /// Centered on X/Z with the top of the bounding box at the origin, so a
    /// pointer-shaped model touches the anchor with its tip.
    Tip,
    /// Keep the authored origin.
    AsAuthored,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformSpec {
    pub scale: f32,
    /// XYZ Euler radians applied before re-centering.
    pub rotation: Vec3,
    pub anchor: Anchor,
    pub fallback: FallbackShape,
}

/// A geometry-only view of a parsed glTF scene.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAsset {
    pub mesh: MeshData,
    pub base_color: [f32; 3],
}

/// Result of a load attempt. Both arms carry a drawable object.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded(SceneObject),
    Fallback {
        object: SceneObject,
        reason: AssetError,
    },
}

impl LoadOutcome {
    #[inline]
    pub fn object(&self) -> &SceneObject {
        match self {
            LoadOutcome::Loaded(o) => o,
            LoadOutcome::Fallback { object, .. } => object,
        }
    }

    #[inline]
    pub fn into_object(self) -> SceneObject {
        match self {
            LoadOutcome::Loaded(o) => o,
            LoadOutcome::Fallback { object, .. } => object,
        }
    }

    #[inline]
    pub fn reason(&self) -> Option<&AssetError> {
        match self {
            LoadOutcome::Loaded(_) => None,
            LoadOutcome::Fallback { reason, .. } => Some(reason),
        }
    }

    #[inline]
    pub fn is_fallback(&self) -> bool {
        matches!(self, LoadOutcome::Fallback { .. })
    }
}

fn map_gltf_error(e: gltf::Error) -> AssetError {
    match e {
        gltf::Error::ExternalReferenceInSliceImport => AssetError::ExternalBuffer(e.to_string()),
        other => AssetError::Parse(other.to_string()),
    }
}

/// Parse a `.glb` (or self-contained `.gltf`) and flatten every triangle
/// primitive of the default scene into one mesh in scene space.
pub fn parse_gltf(bytes: &[u8]) -> Result<ParsedAsset, AssetError> {
    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes).map_err(map_gltf_error)?;
    let buffers = gltf::import_buffers(&document, None, blob).map_err(map_gltf_error)?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(AssetError::EmptyScene)?;

    let mut out = MeshData::default();
    let mut base_color: Option<[f32; 3]> = None;
    let mut stack: Vec<(gltf::Node, Mat4)> =
        scene.nodes().map(|n| (n, Mat4::IDENTITY)).collect();
    // glTF nodes form strict trees; a second visit means a cycle or a shared child
    let mut visited = vec![false; document.nodes().count()];

    while let Some((node, parent)) = stack.pop() {
        match visited.get_mut(node.index()) {
            Some(seen) if !*seen => *seen = true,
            _ => return Err(AssetError::InvalidGeometry("cyclic node graph".into())),
        }
        let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
        if let Some(mesh) = node.mesh() {
            for prim in mesh.primitives() {
                if prim.mode() != gltf::mesh::Mode::Triangles {
                    return Err(AssetError::UnsupportedPrimitive(format!("{:?}", prim.mode())));
                }
                let reader = prim.reader(|b| buffers.get(b.index()).map(|d| d.0.as_slice()));
                let positions: Vec<[f32; 3]> = match reader.read_positions() {
                    Some(it) => it.collect(),
                    None => continue,
                };
                if positions.iter().flatten().any(|v| !v.is_finite()) {
                    return Err(AssetError::InvalidGeometry(
                        "non-finite vertex position".into(),
                    ));
                }
                let indices: Vec<u32> = match reader.read_indices() {
                    Some(ix) => ix.into_u32().collect(),
                    None => (0..positions.len() as u32).collect(),
                };
                let mut part = MeshData {
                    normals: Vec::new(),
                    positions,
                    indices,
                };
                match reader.read_normals() {
                    Some(it) => part.normals = it.collect(),
                    None => part.recompute_normals(),
                }
                if part.normals.len() != part.positions.len() {
                    part.recompute_normals();
                }
                if !part.is_well_formed() {
                    return Err(AssetError::InvalidGeometry(format!(
                        "mesh {:?} has out-of-range indices",
                        mesh.name().unwrap_or("unnamed")
                    )));
                }
                if base_color.is_none() {
                    let c = prim.material().pbr_metallic_roughness().base_color_factor();
                    base_color = Some([c[0], c[1], c[2]]);
                }
                out.append_transformed(&part, world);
            }
        }
        stack.extend(node.children().map(|c| (c, world)));
    }

    if out.is_empty() {
        return Err(AssetError::EmptyScene);
    }
    Ok(ParsedAsset {
        mesh: out,
        base_color: base_color.unwrap_or([1.0, 1.0, 1.0]),
    })
}

/// Apply the requested scale and rotation, then re-center on the anchor.
pub fn normalize(mesh: &MeshData, spec: &TransformSpec) -> Result<Transform, AssetError> {
    let mut pivot = Transform {
        position: Vec3::ZERO,
        scale: spec.scale,
        rotation: spec.rotation,
    };
    let b = mesh
        .bounds_under(pivot.matrix())
        .ok_or_else(|| AssetError::InvalidGeometry("no vertices".into()))?;
    if !(b.min.is_finite() && b.max.is_finite()) {
        return Err(AssetError::InvalidGeometry("non-finite bounds".into()));
    }
    let c = b.center();
    pivot.position = match spec.anchor {
        Anchor::Center => -c,
        Anchor::Tip => Vec3::new(-c.x, -c.y - b.size().y * 0.5, -c.z),
        Anchor::AsAuthored => Vec3::ZERO,
    };
    Ok(pivot)
}

/// Procedural placeholder carrying the default material.
pub fn fallback_object(spec: &TransformSpec, profile: &DeviceProfile) -> SceneObject {
    let mesh = spec.fallback.build();
    let pivot = normalize(&mesh, spec).unwrap_or_default();
    SceneObject {
        transform: Transform::default(),
        pivot,
        material: MaterialParams::fallback(profile),
        load_state: LoadState::Fallback,
        mesh,
    }
}

fn build_loaded(
    bytes: &[u8],
    spec: &TransformSpec,
    profile: &DeviceProfile,
) -> Result<SceneObject, AssetError> {
    let parsed = parse_gltf(bytes)?;
    let pivot = normalize(&parsed.mesh, spec)?;
    Ok(SceneObject {
        transform: Transform::default(),
        pivot,
        material: MaterialParams::for_profile(profile, parsed.base_color),
        load_state: LoadState::Loaded,
        mesh: parsed.mesh,
    })
}

/// Turn fetched bytes (or the fetch error) into a drawable object. Never fails.
pub fn resolve(
    fetched: Result<Vec<u8>, AssetError>,
    spec: &TransformSpec,
    profile: &DeviceProfile,
) -> LoadOutcome {
    match fetched.and_then(|bytes| build_loaded(&bytes, spec, profile)) {
        Ok(object) => LoadOutcome::Loaded(object),
        Err(reason) => LoadOutcome::Fallback {
            object: fallback_object(spec, profile),
            reason,
        },
    }
}
