use crate::data_structures::{
    instance::InstanceRaw,
    model::{self, Vertex},
    texture::Texture,
};

/// The three main-pass pipelines. They share one shader and one layout and differ in fragment
/// entry point, depth bias and blending.
#[derive(Debug)]
pub struct MaterialPipelines {
    pub standard: wgpu::RenderPipeline,
    pub polygon_offset: wgpu::RenderPipeline,
    pub shadow_catcher: wgpu::RenderPipeline,
}

pub fn mk_material_pipelines(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    material_bind_group_layout: &wgpu::BindGroupLayout,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    light_bind_group_layout: &wgpu::BindGroupLayout,
) -> MaterialPipelines {
    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Material Pipeline Layout"),
        bind_group_layouts: &[
            material_bind_group_layout,
            camera_bind_group_layout,
            light_bind_group_layout,
        ],
        push_constant_ranges: &[],
    });
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Standard Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("standard.wgsl").into()),
    });
    let opaque = Some(wgpu::BlendState {
        alpha: wgpu::BlendComponent::REPLACE,
        color: wgpu::BlendComponent::REPLACE,
    });
    let vertex_layouts = [model::ModelVertex::desc(), InstanceRaw::desc()];

    let standard = mk_render_pipeline(
        device,
        &render_pipeline_layout,
        &shader,
        PipelineOptions {
            label: "Standard Pipeline",
            fragment_entry: "fs_main",
            color_format: config.format,
            blend: opaque,
            depth_write: true,
            bias: wgpu::DepthBiasState::default(),
        },
        &vertex_layouts,
    );
    // Pushes coplanar surfaces (the frosting shell against the inner layers) back in depth
    let polygon_offset = mk_render_pipeline(
        device,
        &render_pipeline_layout,
        &shader,
        PipelineOptions {
            label: "Polygon Offset Pipeline",
            fragment_entry: "fs_main",
            color_format: config.format,
            blend: opaque,
            depth_write: true,
            bias: wgpu::DepthBiasState {
                constant: 1,
                slope_scale: 1.0,
                clamp: 0.0,
            },
        },
        &vertex_layouts,
    );
    let shadow_catcher = mk_render_pipeline(
        device,
        &render_pipeline_layout,
        &shader,
        PipelineOptions {
            label: "Shadow Catcher Pipeline",
            fragment_entry: "fs_shadow_catcher",
            color_format: config.format,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            depth_write: false,
            bias: wgpu::DepthBiasState::default(),
        },
        &vertex_layouts,
    );

    MaterialPipelines {
        standard,
        polygon_offset,
        shadow_catcher,
    }
}

pub struct PipelineOptions<'a> {
    pub label: &'a str,
    pub fragment_entry: &'a str,
    pub color_format: wgpu::TextureFormat,
    pub blend: Option<wgpu::BlendState>,
    pub depth_write: bool,
    pub bias: wgpu::DepthBiasState,
}

pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    options: PipelineOptions,
    vertex_layouts: &[wgpu::VertexBufferLayout],
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some(options.label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(options.fragment_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format: options.color_format,
                blend: options.blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: Texture::DEPTH_FORMAT,
            depth_write_enabled: options.depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: options.bias,
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}
