use super::helpers;
use glam::{Mat4, Vec3};
use portal_fx_core::{MaterialParams, MeshData, SceneObject};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct CameraUniforms {
    pub(crate) view_proj: [[f32; 4]; 4],
    pub(crate) eye: [f32; 4],
    pub(crate) light_dir: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct ObjectUniforms {
    model: [[f32; 4]; 4],
    normal_mat: [[f32; 4]; 4],
    base_color: [f32; 4],
    emissive: [f32; 4],
    surface: [f32; 4],
    layers: [f32; 4],
}

impl ObjectUniforms {
    pub(crate) fn lit(model: Mat4, material: &MaterialParams) -> Self {
        Self::build(model, model.inverse().transpose(), material, 0.0)
    }

    /// Flattened copy; the shadow pass ignores normals.
    pub(crate) fn shadow(flat_model: Mat4, material: &MaterialParams, alpha: f32) -> Self {
        Self::build(flat_model, Mat4::IDENTITY, material, alpha)
    }

    fn build(model: Mat4, normal_mat: Mat4, material: &MaterialParams, shadow_alpha: f32) -> Self {
        let [r, g, b] = material.base_color;
        let [er, eg, eb] = material.emissive;
        Self {
            model: model.to_cols_array_2d(),
            normal_mat: normal_mat.to_cols_array_2d(),
            base_color: [r, g, b, material.opacity],
            emissive: [er, eg, eb, material.env_intensity],
            surface: [
                material.metalness,
                material.roughness,
                material.clearcoat,
                material.clearcoat_roughness,
            ],
            layers: [material.transmission, material.reflectivity, shadow_alpha, 0.0],
        }
    }
}

/// GPU copy of one scene object. The shadow pass gets its own uniforms so
/// both draws can be recorded in one pass.
pub struct GpuObject {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    pub(crate) bind_group: wgpu::BindGroup,
    shadow_buffer: wgpu::Buffer,
    pub(crate) shadow_bind_group: wgpu::BindGroup,
    pub visible: bool,
}

impl GpuObject {
    pub(crate) fn upload(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        object: &SceneObject,
    ) -> Self {
        let vertices = interleave(&object.mesh);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("fx_vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("fx_indices"),
            contents: bytemuck::cast_slice(&object.mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let initial = ObjectUniforms::lit(object.model_matrix(), &object.material);
        let make_uniform = |label: &str| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::bytes_of(&initial),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
        };
        let uniform_buffer = make_uniform("fx_object_ubo");
        let shadow_buffer = make_uniform("fx_shadow_ubo");
        let bind_group = helpers::uniform_bind_group(device, "fx_object_bg", layout, &uniform_buffer);
        let shadow_bind_group =
            helpers::uniform_bind_group(device, "fx_shadow_bg", layout, &shadow_buffer);
        Self {
            vertex_buffer,
            index_buffer,
            index_count: object.mesh.indices.len() as u32,
            uniform_buffer,
            bind_group,
            shadow_buffer,
            shadow_bind_group,
            visible: true,
        }
    }

    pub(crate) fn write(&self, queue: &wgpu::Queue, object: &SceneObject, shadow: Option<(Mat4, f32)>) {
        let model = object.model_matrix();
        let lit = ObjectUniforms::lit(model, &object.material);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&lit));
        if let Some((flatten, alpha)) = shadow {
            let flat = ObjectUniforms::shadow(flatten * model, &object.material, alpha);
            queue.write_buffer(&self.shadow_buffer, 0, bytemuck::bytes_of(&flat));
        }
    }

    pub(crate) fn draw(&self, pass: &mut wgpu::RenderPass<'_>, bind_group: &wgpu::BindGroup) {
        pass.set_bind_group(1, bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

fn interleave(mesh: &MeshData) -> Vec<Vertex> {
    mesh.positions
        .iter()
        .zip(mesh.normals.iter().chain(std::iter::repeat(&[0.0, 0.0, 1.0])))
        .map(|(p, n)| Vertex {
            position: *p,
            normal: *n,
        })
        .collect()
}

/// Plane `z = depth` for `planar_shadow`, facing the camera.
#[inline]
pub(crate) fn shadow_plane(depth: f32) -> glam::Vec4 {
    Vec3::Z.extend(-depth)
}
