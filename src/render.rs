use crate::constants::{LIGHT_DIR, SHADOW_ALPHA, SHADOW_PLANE_OFFSET};
use crate::dom::{self, CanvasLayer};
use glam::{Vec2, Vec3};
use portal_fx_core::{planar_shadow, Camera, CameraSpec, DeviceProfile, SceneObject, MESH_WGSL};
use web_sys as web;
use wgpu::util::DeviceExt;

mod helpers;
mod mesh;
mod targets;

pub use mesh::GpuObject;
use mesh::{CameraUniforms, Vertex};
use targets::{RenderTargets, DEPTH_FORMAT};

/// One transparent WebGPU canvas with its own device, camera and pipelines.
///
/// Owned by exactly one effect. Dropping it destroys the device and removes
/// the canvas from the page.
pub struct RenderHost {
    canvas: web::HtmlCanvasElement,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    targets: RenderTargets,
    camera: Camera,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    mesh_pipeline: wgpu::RenderPipeline,
    shadow_pipeline: Option<wgpu::RenderPipeline>,
    profile: DeviceProfile,
    css_size: Vec2,
}

impl RenderHost {
    pub async fn new(
        container: &web::Element,
        layer: CanvasLayer,
        profile: DeviceProfile,
        camera: CameraSpec,
    ) -> anyhow::Result<Self> {
        let canvas = dom::create_layer_canvas(container, layer)?;
        match Self::init(canvas.clone(), profile, camera).await {
            Ok(host) => Ok(host),
            Err(e) => {
                canvas.remove();
                Err(e)
            }
        }
    }

    async fn init(
        canvas: web::HtmlCanvasElement,
        profile: DeviceProfile,
        camera_spec: CameraSpec,
    ) -> anyhow::Result<Self> {
        let (css_w, css_h) = dom::sync_canvas_backing_size(&canvas, &profile);
        let width = canvas.width();
        let height = canvas.height();

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: if profile.low_power {
                    wgpu::PowerPreference::LowPower
                } else {
                    wgpu::PowerPreference::HighPerformance
                },
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                    label: Some("fx_device"),
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        // transparent canvas over the page
        let alpha_mode = if caps
            .alpha_modes
            .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
        {
            wgpu::CompositeAlphaMode::PreMultiplied
        } else {
            caps.alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        };
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let sample_count = profile.msaa_samples();
        let targets = RenderTargets::new(&device, width, height, format, sample_count);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("fx_mesh_shader"),
            source: wgpu::ShaderSource::Wgsl(MESH_WGSL.into()),
        });
        let camera_layout = helpers::uniform_layout(&device, "fx_camera_bgl");
        let object_layout = helpers::uniform_layout(&device, "fx_object_bgl");
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("fx_mesh_pl"),
            bind_group_layouts: &[&camera_layout, &object_layout],
            push_constant_ranges: &[],
        });
        let mut desc = helpers::MeshPipelineDesc {
            label: "fx_mesh_pipeline",
            layout: &pipeline_layout,
            shader: &shader,
            frag_entry: "fs_main",
            color_format: format,
            depth_format: DEPTH_FORMAT,
            depth_write: true,
            sample_count,
        };
        let mesh_pipeline = helpers::make_mesh_pipeline(&device, &desc, Vertex::layout());
        let shadow_pipeline = profile.shadows_enabled.then(|| {
            desc.label = "fx_shadow_pipeline";
            desc.frag_entry = "fs_shadow";
            desc.depth_write = false;
            helpers::make_mesh_pipeline(&device, &desc, Vertex::layout())
        });

        let camera = Camera::new(camera_spec, css_w as f32, css_h as f32);
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("fx_camera_ubo"),
            contents: bytemuck::bytes_of(&camera_uniforms(&camera)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group =
            helpers::uniform_bind_group(&device, "fx_camera_bg", &camera_layout, &camera_buffer);

        log::info!(
            "[render] host ready {}x{} msaa={} shadows={}",
            width,
            height,
            sample_count,
            shadow_pipeline.is_some()
        );

        Ok(Self {
            canvas,
            surface,
            device,
            queue,
            config,
            targets,
            camera,
            camera_buffer,
            camera_bind_group,
            object_layout,
            mesh_pipeline,
            shadow_pipeline,
            profile,
            css_size: Vec2::new(css_w as f32, css_h as f32),
        })
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Canvas size in CSS pixels.
    #[inline]
    pub fn css_size(&self) -> Vec2 {
        self.css_size
    }

    /// Re-read the canvas box and resize everything that depends on it.
    pub fn resize(&mut self) {
        let (css_w, css_h) = dom::sync_canvas_backing_size(&self.canvas, &self.profile);
        self.css_size = Vec2::new(css_w as f32, css_h as f32);
        self.camera.set_viewport(css_w as f32, css_h as f32);
        let (width, height) = (self.canvas.width(), self.canvas.height());
        if width == 0 || height == 0 {
            return;
        }
        if width != self.config.width || height != self.config.height {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.targets.recreate(&self.device, width, height);
        }
    }

    pub fn upload(&self, object: &SceneObject) -> GpuObject {
        GpuObject::upload(&self.device, &self.object_layout, object)
    }

    /// Push the object's current transform and material to its GPU copy.
    pub fn write_object(&self, gpu: &GpuObject, object: &SceneObject) {
        let shadow = self.shadow_pipeline.as_ref().map(|_| {
            let plane = mesh::shadow_plane(object.transform.position.z - SHADOW_PLANE_OFFSET);
            (planar_shadow(plane, light_dir().extend(0.0)), SHADOW_ALPHA)
        });
        gpu.write(&self.queue, object, shadow);
    }

    /// Draw one frame. A lost or outdated surface is reconfigured and the
    /// frame skipped.
    pub fn render(&mut self, objects: &[&GpuObject]) {
        match self.try_render(objects) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
            }
            Err(e) => log::error!("[render] frame skipped: {:?}", e),
        }
    }

    fn try_render(&mut self, objects: &[&GpuObject]) -> Result<(), wgpu::SurfaceError> {
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&camera_uniforms(&self.camera)),
        );
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let (color_view, resolve_target) = match &self.targets.msaa_view {
            Some(msaa) => (msaa, Some(&view)),
            None => (&view, None),
        };
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("fx_encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("fx_scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_bind_group(0, &self.camera_bind_group, &[]);
            pass.set_pipeline(&self.mesh_pipeline);
            for obj in objects.iter().filter(|o| o.visible) {
                obj.draw(&mut pass, &obj.bind_group);
            }
            if let Some(shadow) = &self.shadow_pipeline {
                pass.set_pipeline(shadow);
                for obj in objects.iter().filter(|o| o.visible) {
                    obj.draw(&mut pass, &obj.shadow_bind_group);
                }
            }
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

impl Drop for RenderHost {
    fn drop(&mut self) {
        self.device.destroy();
        self.canvas.remove();
        log::debug!("[render] host released");
    }
}

#[inline]
fn light_dir() -> Vec3 {
    Vec3::from_array(LIGHT_DIR).normalize()
}

fn camera_uniforms(camera: &Camera) -> CameraUniforms {
    CameraUniforms {
        view_proj: camera.view_proj().to_cols_array_2d(),
        eye: camera.eye().extend(1.0).to_array(),
        light_dir: light_dir().extend(0.0).to_array(),
    }
}
