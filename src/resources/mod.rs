use std::{collections::HashMap, rc::Rc};

use anyhow::ensure;
use wgpu::util::DeviceExt;

use crate::data_structures::{
    geometry::Geometry,
    material::Material,
    model::{self, GpuMaterial},
    texture::Texture,
};

/**
 * This module turns CPU-side scene data (procedural textures, materials, geometries) into GPU
 * resources.
 */
pub mod sponge;

pub fn material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
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
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("material_bind_group_layout"),
    })
}

/**
 * Uploads shared materials and geometries exactly once.
 *
 * Scene nodes hold their material and geometry behind an `Rc`; the allocation address is the
 * cache key, so every node that shares an `Rc` also shares the GPU buffers and bind group.
 * The cache must not outlive the scene it uploads.
 */
pub struct ResourceCache<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    layout: &'a wgpu::BindGroupLayout,
    white: Texture,
    materials: HashMap<usize, GpuMaterial>,
    meshes: HashMap<usize, model::Mesh>,
}

impl<'a> ResourceCache<'a> {
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        layout: &'a wgpu::BindGroupLayout,
    ) -> Self {
        let white = Texture::create_solid([255; 4], device, queue, "white");
        Self {
            device,
            queue,
            layout,
            white,
            materials: HashMap::new(),
            meshes: HashMap::new(),
        }
    }

    pub fn material(&mut self, material: &Rc<Material>) -> anyhow::Result<GpuMaterial> {
        let key = Rc::as_ptr(material) as usize;
        if let Some(gpu_material) = self.materials.get(&key) {
            return Ok(gpu_material.clone());
        }

        let texture = match material.texture() {
            Some(sponge) => Texture::from_image(
                self.device,
                self.queue,
                &sponge.image,
                Some(&material.name),
            )?,
            None => self.white.clone(),
        };
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Material Buffer", material.name)),
                contents: bytemuck::cast_slice(&[material.to_uniform()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let sampler = match &texture.sampler {
            Some(sampler) => sampler.clone(),
            None => crate::data_structures::texture::create_default_sampler(self.device),
        };
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
            label: Some(&material.name),
        });

        log::debug!("uploaded material {}", material.name);
        let gpu_material = GpuMaterial {
            name: material.name.clone(),
            pass: material.pass(),
            buffer,
            bind_group,
        };
        self.materials.insert(key, gpu_material.clone());
        Ok(gpu_material)
    }

    pub fn mesh(&mut self, name: &str, geometry: &Rc<Geometry>) -> anyhow::Result<model::Mesh> {
        let key = Rc::as_ptr(geometry) as usize;
        if let Some(mesh) = self.meshes.get(&key) {
            return Ok(mesh.clone());
        }
        ensure!(
            !geometry.indices.is_empty(),
            "geometry of {name} has no triangles"
        );

        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{name} Vertex Buffer")),
                contents: bytemuck::cast_slice(&geometry.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{name} Index Buffer")),
                contents: bytemuck::cast_slice(&geometry.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        let mesh = model::Mesh {
            name: name.to_string(),
            vertex_buffer,
            index_buffer,
            num_elements: geometry.indices.len() as u32,
        };
        self.meshes.insert(key, mesh.clone());
        Ok(mesh)
    }

    pub fn device(&self) -> &'a wgpu::Device {
        self.device
    }

    pub fn uploaded_materials(&self) -> usize {
        self.materials.len()
    }
}
