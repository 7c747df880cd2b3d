use anyhow::Context as _;
use cgmath::{Deg, EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, SquareMatrix};
use wgpu::util::DeviceExt;

use crate::{
    camera::OPENGL_TO_WGPU_MATRIX,
    data_structures::{material::Colour, texture},
};

/// The near plane of the spot light's shadow camera.
const SHADOW_NEAR: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpotLight {
    pub colour: Colour,
    pub intensity: f32,
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    /// Half-angle of the outer cone.
    pub angle: Rad<f32>,
    /// Fraction of the cone over which the edge fades out.
    pub penumbra: f32,
    pub decay: f32,
    /// Range of the light; zero means unlimited.
    pub distance: f32,
    pub cast_shadow: bool,
    pub shadow_map_size: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    Ambient { colour: Colour, intensity: f32 },
    Spot(SpotLight),
    /// Shines from `position` towards the origin.
    Directional {
        colour: Colour,
        intensity: f32,
        position: Point3<f32>,
    },
}

impl SpotLight {
    /// View-projection of the shadow camera: a square frustum covering the cone.
    pub fn shadow_view_proj(&self) -> Matrix4<f32> {
        let far = if self.distance > 0.0 { self.distance } else { 100.0 };
        let fovy = Deg::from(self.angle) * 2.0;
        let projection = cgmath::perspective(fovy, 1.0, SHADOW_NEAR, far);
        let view = Matrix4::look_at_rh(self.position, self.target, cgmath::Vector3::unit_y());
        OPENGL_TO_WGPU_MATRIX * projection * view
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub ambient: [f32; 4],
    pub spot_position: [f32; 4],
    pub spot_direction: [f32; 4],
    pub spot_colour: [f32; 4],
    /// cos(outer angle), cos(inner angle), decay, distance
    pub spot_params: [f32; 4],
    pub fill_direction: [f32; 4],
    pub fill_colour: [f32; 4],
    /// x > 0.5 enables shadow lookups
    pub shadow_params: [f32; 4],
    pub shadow_view_proj: [[f32; 4]; 4],
}

impl Default for LightUniform {
    fn default() -> Self {
        Self {
            ambient: [0.0; 4],
            spot_position: [0.0; 4],
            spot_direction: [0.0, -1.0, 0.0, 0.0],
            spot_colour: [0.0; 4],
            spot_params: [1.0, 1.0, 0.0, 0.0],
            fill_direction: [0.0, 1.0, 0.0, 0.0],
            fill_colour: [0.0; 4],
            shadow_params: [0.0; 4],
            shadow_view_proj: Matrix4::identity().into(),
        }
    }
}

fn radiance(colour: Colour, intensity: f32) -> [f32; 4] {
    let [r, g, b] = colour.to_linear();
    [r * intensity, g * intensity, b * intensity, 0.0]
}

impl LightUniform {
    /// Ambient lights add up. Only the first spot and directional light are used.
    pub fn from_lights(lights: &[Light]) -> Self {
        let mut uniform = Self::default();
        let mut spots = 0;
        let mut fills = 0;
        for light in lights {
            match light {
                Light::Ambient { colour, intensity } => {
                    let add = radiance(*colour, *intensity);
                    for (sum, value) in uniform.ambient.iter_mut().zip(add) {
                        *sum += value;
                    }
                }
                Light::Spot(spot) => {
                    spots += 1;
                    if spots > 1 {
                        continue;
                    }
                    let direction = (spot.target - spot.position).normalize();
                    uniform.spot_position = spot.position.to_homogeneous().into();
                    uniform.spot_direction = direction.extend(0.0).into();
                    uniform.spot_colour = radiance(spot.colour, spot.intensity);
                    uniform.spot_params = [
                        spot.angle.0.cos(),
                        (spot.angle.0 * (1.0 - spot.penumbra.clamp(0.0, 1.0))).cos(),
                        spot.decay,
                        spot.distance,
                    ];
                    if spot.cast_shadow {
                        uniform.shadow_params = [1.0, 0.0, 0.0, 0.0];
                        uniform.shadow_view_proj = spot.shadow_view_proj().into();
                    }
                }
                Light::Directional {
                    colour,
                    intensity,
                    position,
                } => {
                    fills += 1;
                    if fills > 1 {
                        continue;
                    }
                    uniform.fill_direction = position.to_vec().normalize().extend(0.0).into();
                    uniform.fill_colour = radiance(*colour, *intensity);
                }
            }
        }
        if spots > 1 || fills > 1 {
            log::warn!("only one spot and one directional light are supported; {spots} spots and {fills} directional lights given");
        }
        uniform
    }

    pub fn casts_shadow(&self) -> bool {
        self.shadow_params[0] > 0.5
    }
}

/// Shadow map resolution requested by the lights, if any spot light casts shadows.
pub fn shadow_map_size(lights: &[Light]) -> Option<u32> {
    lights.iter().find_map(|light| match light {
        Light::Spot(spot) if spot.cast_shadow => Some(spot.shadow_map_size.max(1)),
        _ => None,
    })
}

#[derive(Debug)]
pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub shadow_map: texture::Texture,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
    /// The uniform alone, for the depth pass from the light's point of view.
    pub shadow_bind_group: wgpu::BindGroup,
    pub shadow_bind_group_layout: wgpu::BindGroupLayout,
}

pub const DEFAULT_SHADOW_MAP_SIZE: u32 = 2048;

impl LightResources {
    pub fn new(
        uniform: LightUniform,
        shadow_map_size: u32,
        device: &wgpu::Device,
    ) -> anyhow::Result<Self> {
        let buffer = mk_buffer(device, uniform);
        let bind_group_layout = mk_bind_group_layout(device);
        let shadow_bind_group_layout = mk_shadow_bind_group_layout(device);
        let shadow_map = mk_shadow_map(device, shadow_map_size);
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer, &shadow_map)?;
        let shadow_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &shadow_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("shadow_bind_group"),
        });
        Ok(Self {
            uniform,
            buffer,
            shadow_map,
            bind_group,
            bind_group_layout,
            shadow_bind_group,
            shadow_bind_group_layout,
        })
    }

    /// Replaces the lighting setup. The shadow map is only recreated if its size changes.
    pub fn set_lights(
        &mut self,
        lights: &[Light],
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> anyhow::Result<()> {
        self.uniform = LightUniform::from_lights(lights);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
        if let Some(size) = shadow_map_size(lights) {
            if self.shadow_map.texture.width() != size {
                log::info!("recreating shadow map at {size}x{size}");
                self.shadow_map = mk_shadow_map(device, size);
                self.bind_group =
                    mk_bind_group(device, &self.bind_group_layout, &self.buffer, &self.shadow_map)?;
            }
        }
        Ok(())
    }
}

fn mk_shadow_map(device: &wgpu::Device, size: u32) -> texture::Texture {
    texture::Texture::create_depth_texture(device, [size, size], "shadow_map")
}

pub fn mk_buffer(device: &wgpu::Device, light_uniform: LightUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Buffer"),
        contents: bytemuck::cast_slice(&[light_uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Depth,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                count: None,
            },
        ],
        label: Some("light_bind_group_layout"),
    })
}

fn mk_shadow_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("shadow_bind_group_layout"),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    light_buffer: &wgpu::Buffer,
    shadow_map: &texture::Texture,
) -> anyhow::Result<wgpu::BindGroup> {
    let sampler = shadow_map
        .sampler
        .as_ref()
        .context("the shadow map has no comparison sampler")?;
    Ok(device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: light_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&shadow_map.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
        label: Some("light_bind_group"),
    }))
}
