use glam::Vec3;
use portal_fx_core::asset::{normalize, parse_gltf};
use portal_fx_core::{
    resolve, Anchor, AssetError, DeviceProfile, DeviceSignals, FallbackShape, LoadOutcome,
    LoadState, MaterialTier, TransformSpec,
};

fn desktop() -> DeviceProfile {
    DeviceProfile::from_signals(&DeviceSignals::default())
}

fn mobile() -> DeviceProfile {
    DeviceProfile::from_signals(&DeviceSignals {
        inner_width: 390.0,
        touch_capable: true,
        ..Default::default()
    })
}

fn tip_spec() -> TransformSpec {
    TransformSpec {
        scale: 1.0,
        rotation: Vec3::ZERO,
        anchor: Anchor::Tip,
        fallback: FallbackShape::Cone,
    }
}

fn pad_to_4(mut v: Vec<u8>, fill: u8) -> Vec<u8> {
    while v.len() % 4 != 0 {
        v.push(fill);
    }
    v
}

/// Minimal binary glTF: one red triangle under a node translated to y=5.
fn triangle_glb() -> Vec<u8> {
    glb_with_nodes(r#"[{"mesh":0,"translation":[0.0,5.0,0.0]}]"#)
}

fn glb_with_nodes(nodes: &str) -> Vec<u8> {
    let mut bin = Vec::new();
    for p in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 2.0, 0.0]] {
        for c in p {
            bin.extend_from_slice(&c.to_le_bytes());
        }
    }
    for i in [0u16, 1, 2] {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    let bin = pad_to_4(bin, 0);
    let json = format!(
        r#"{{"asset":{{"version":"2.0"}},"scene":0,"scenes":[{{"nodes":[0]}}],
"nodes":{nodes},
"meshes":[{{"primitives":[{{"attributes":{{"POSITION":0}},"indices":1,"material":0}}]}}],
"materials":[{{"pbrMetallicRoughness":{{"baseColorFactor":[1.0,0.0,0.0,1.0]}}}}],
"buffers":[{{"byteLength":{len}}}],
"bufferViews":[{{"buffer":0,"byteOffset":0,"byteLength":36}},{{"buffer":0,"byteOffset":36,"byteLength":6}}],
"accessors":[{{"bufferView":0,"componentType":5126,"count":3,"type":"VEC3","min":[0.0,0.0,0.0],"max":[1.0,2.0,0.0]}},
{{"bufferView":1,"componentType":5123,"count":3,"type":"SCALAR"}}]}}"#,
        len = bin.len(),
        nodes = nodes
    );
    let json = pad_to_4(json.into_bytes(), b' ');

    let total = 12 + 8 + json.len() + 8 + bin.len();
    let mut glb = Vec::with_capacity(total);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total as u32).to_le_bytes());
    glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"JSON");
    glb.extend_from_slice(&json);
    glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"BIN\0");
    glb.extend_from_slice(&bin);
    glb
}

#[test]
fn network_failure_yields_fallback_immediately() {
    let out = resolve(
        Err(AssetError::Fetch("TypeError: Failed to fetch".into())),
        &tip_spec(),
        &desktop(),
    );
    assert!(out.is_fallback());
    assert!(matches!(out.reason(), Some(AssetError::Fetch(_))));
    let obj = out.object();
    assert_eq!(obj.load_state, LoadState::Fallback);
    assert!(obj.is_drawable());
    assert!(obj.mesh.is_well_formed());
}

#[test]
fn http_404_falls_back_with_status() {
    let out = resolve(Err(AssetError::HttpStatus(404)), &tip_spec(), &mobile());
    assert_eq!(out.reason(), Some(&AssetError::HttpStatus(404)));
    assert_eq!(out.object().material.tier, MaterialTier::Lite);
}

#[test]
fn garbage_bytes_fall_back_with_parse_error() {
    let out = resolve(Ok(b"definitely not a model".to_vec()), &tip_spec(), &desktop());
    assert!(matches!(out.reason(), Some(AssetError::Parse(_))));
    assert!(out.object().is_drawable());
}

#[test]
fn truncated_glb_falls_back() {
    let mut glb = triangle_glb();
    glb.truncate(glb.len() - 20);
    let out = resolve(Ok(glb), &tip_spec(), &desktop());
    assert!(out.is_fallback());
}

#[test]
fn minimal_glb_parses_with_node_transform_and_color() {
    let parsed = parse_gltf(&triangle_glb()).unwrap();
    assert_eq!(parsed.mesh.triangle_count(), 1);
    assert_eq!(parsed.base_color, [1.0, 0.0, 0.0]);
    let b = parsed.mesh.bounds().unwrap();
    assert!((b.min.y - 5.0).abs() < 1e-5);
    assert!((b.max.y - 7.0).abs() < 1e-5);
    // normals were synthesized from winding
    assert!((parsed.mesh.normals[0][2] - 1.0).abs() < 1e-5);
}

#[test]
fn loaded_object_takes_material_from_profile() {
    match resolve(Ok(triangle_glb()), &tip_spec(), &desktop()) {
        LoadOutcome::Loaded(obj) => {
            assert_eq!(obj.load_state, LoadState::Loaded);
            assert_eq!(obj.material.tier, MaterialTier::Rich);
            assert_eq!(obj.material.base_color, [1.0, 0.0, 0.0]);
        }
        other => panic!("expected loaded, got {:?}", other.reason()),
    }
    let lite = resolve(Ok(triangle_glb()), &tip_spec(), &mobile()).into_object();
    assert_eq!(lite.material.tier, MaterialTier::Lite);
    assert_eq!(lite.material.emissive, [0.2, 0.0, 0.0]);
}

#[test]
fn tip_anchor_puts_top_at_origin() {
    let obj = resolve(Ok(triangle_glb()), &tip_spec(), &desktop()).into_object();
    let b = obj.mesh.bounds_under(obj.model_matrix()).unwrap();
    assert!(b.max.y.abs() < 1e-5, "top at {}", b.max.y);
    assert!(b.center().x.abs() < 1e-5);
    assert!(b.center().z.abs() < 1e-5);
}

#[test]
fn center_anchor_respects_scale() {
    let parsed = parse_gltf(&triangle_glb()).unwrap();
    let spec = TransformSpec {
        scale: 2.0,
        anchor: Anchor::Center,
        ..tip_spec()
    };
    let pivot = normalize(&parsed.mesh, &spec).unwrap();
    let b = parsed.mesh.bounds_under(pivot.matrix()).unwrap();
    assert!(b.center().length() < 1e-4);
    assert!((b.size().y - 4.0).abs() < 1e-4);
}

#[test]
fn fallback_cone_is_also_tip_aligned() {
    let obj = resolve(Err(AssetError::EmptyScene), &tip_spec(), &desktop()).into_object();
    let b = obj.mesh.bounds_under(obj.model_matrix()).unwrap();
    assert!(b.max.y.abs() < 1e-5);
}

#[test]
fn self_referencing_node_is_rejected() {
    let err = parse_gltf(&glb_with_nodes(r#"[{"mesh":0,"children":[0]}]"#)).unwrap_err();
    assert!(matches!(err, AssetError::InvalidGeometry(ref m) if m.contains("cyclic")));
}

#[test]
fn node_cycle_through_ancestor_falls_back() {
    let glb = glb_with_nodes(r#"[{"mesh":0,"children":[1]},{"mesh":0,"children":[0]}]"#);
    let out = resolve(Ok(glb), &tip_spec(), &desktop());
    assert!(out.is_fallback());
    assert!(matches!(out.reason(), Some(AssetError::InvalidGeometry(_))));
    assert!(out.object().mesh.is_well_formed());
}

#[test]
fn child_nodes_are_still_flattened() {
    let glb = glb_with_nodes(r#"[{"children":[1]},{"mesh":0,"translation":[0.0,5.0,0.0]}]"#);
    let parsed = parse_gltf(&glb).unwrap();
    assert_eq!(parsed.mesh.positions.len(), 3);
}
