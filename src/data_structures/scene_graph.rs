//! Scene graph and hierarchical scene organization.
//!
//! A scene is a tree of boxed [`SceneNode`]s. Groups only carry a transform; meshes additionally
//! own a shared geometry and material and, once uploaded, the GPU buffers to draw them. The world
//! transform of every node is `parent_world * local`.

use std::rc::Rc;

use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        geometry::{Bounds, Geometry},
        instance::{Instance, InstanceRaw},
        material::Material,
        model,
    },
    render::Instanced,
    resources::ResourceCache,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Group,
    Mesh,
}

pub trait SceneNode {
    fn name(&self) -> &str;

    fn kind(&self) -> NodeKind;

    fn get_local_transform(&self) -> &Instance;

    /// Valid after the last [`SceneNode::update_world_transforms`].
    fn get_world_transform(&self) -> &Instance;

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>>;

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>>;

    /// Recomputes the world transform of this node and all of its descendants.
    fn update_world_transforms(&mut self, parents_world_transform: &Instance);

    /// Creates the GPU resources of this subtree. Shared materials and geometries are uploaded
    /// once through the cache.
    fn upload(&mut self, cache: &mut ResourceCache) -> anyhow::Result<()>;

    fn write_to_buffers(&mut self, queue: &wgpu::Queue);

    fn get_render(&self) -> Vec<Instanced<'_>>;

    fn as_mesh(&self) -> Option<&MeshNode> {
        None
    }
}

pub struct GroupNode {
    name: String,
    local: Instance,
    world: Instance,
    pub children: Vec<Box<dyn SceneNode>>,
}

impl GroupNode {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            local: Instance::default(),
            world: Instance::default(),
            children: vec![],
        }
    }

    pub fn with_transform(mut self, instance: Instance) -> Self {
        self.local = instance;
        self
    }

    pub fn with_child(mut self, child: impl SceneNode + 'static) -> Self {
        self.children.push(Box::new(child));
        self
    }
}

impl SceneNode for GroupNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Group
    }

    fn get_local_transform(&self) -> &Instance {
        &self.local
    }

    fn get_world_transform(&self) -> &Instance {
        &self.world
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn update_world_transforms(&mut self, parents_world_transform: &Instance) {
        self.world = parents_world_transform * &self.local;
        for child in self.children.iter_mut() {
            child.update_world_transforms(&self.world);
        }
    }

    fn upload(&mut self, cache: &mut ResourceCache) -> anyhow::Result<()> {
        for child in self.children.iter_mut() {
            child.upload(cache)?;
        }
        Ok(())
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue) {
        self.get_children_mut()
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue));
    }

    fn get_render(&self) -> Vec<Instanced<'_>> {
        self.children
            .iter()
            .flat_map(|child| child.get_render())
            .collect()
    }
}

struct GpuMesh {
    model: model::Model,
    instance_buffer: wgpu::Buffer,
}

pub struct MeshNode {
    name: String,
    geometry: Rc<Geometry>,
    material: Rc<Material>,
    local: Instance,
    world: Instance,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    children: Vec<Box<dyn SceneNode>>,
    gpu: Option<GpuMesh>,
}

impl MeshNode {
    pub fn new(name: &str, geometry: Rc<Geometry>, material: Rc<Material>) -> Self {
        Self {
            name: name.to_string(),
            geometry,
            material,
            local: Instance::default(),
            world: Instance::default(),
            cast_shadow: false,
            receive_shadow: false,
            children: vec![],
            gpu: None,
        }
    }

    pub fn with_transform(mut self, instance: Instance) -> Self {
        self.local = instance;
        self
    }

    /// Moves the node without touching its rotation or scale.
    pub fn with_position(mut self, position: cgmath::Vector3<f32>) -> Self {
        self.local.position = position;
        self
    }

    pub fn with_shadows(mut self, cast: bool, receive: bool) -> Self {
        self.cast_shadow = cast;
        self.receive_shadow = receive;
        self
    }

    pub fn geometry(&self) -> &Rc<Geometry> {
        &self.geometry
    }

    pub fn material(&self) -> &Rc<Material> {
        &self.material
    }

    /// Axis-aligned bounds of the geometry under the current world transform.
    pub fn world_bounds(&self) -> Bounds {
        self.geometry.transformed_bounds(&self.world.to_matrix())
    }

    fn raw(&self) -> InstanceRaw {
        self.world.to_raw(self.receive_shadow)
    }
}

impl SceneNode for MeshNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Mesh
    }

    fn get_local_transform(&self) -> &Instance {
        &self.local
    }

    fn get_world_transform(&self) -> &Instance {
        &self.world
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn update_world_transforms(&mut self, parents_world_transform: &Instance) {
        self.world = parents_world_transform * &self.local;
        for child in self.children.iter_mut() {
            child.update_world_transforms(&self.world);
        }
    }

    fn upload(&mut self, cache: &mut ResourceCache) -> anyhow::Result<()> {
        let mesh = cache.mesh(&self.name, &self.geometry)?;
        let material = cache.material(&self.material)?;
        let instance_buffer = cache
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Instance Buffer", self.name)),
                contents: bytemuck::cast_slice(&[self.raw()]),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
        self.gpu = Some(GpuMesh {
            model: model::Model { mesh, material },
            instance_buffer,
        });
        for child in self.children.iter_mut() {
            child.upload(cache)?;
        }
        Ok(())
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue) {
        if let Some(gpu) = &self.gpu {
            queue.write_buffer(&gpu.instance_buffer, 0, bytemuck::cast_slice(&[self.raw()]));
        }
        self.get_children_mut()
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue));
    }

    fn get_render(&self) -> Vec<Instanced<'_>> {
        self.children
            .iter()
            .flat_map(|child| child.get_render())
            .chain(self.gpu.iter().map(|gpu| Instanced {
                instance: &gpu.instance_buffer,
                model: &gpu.model,
                amount: 1,
                cast_shadow: self.cast_shadow,
            }))
            .collect()
    }

    fn as_mesh(&self) -> Option<&MeshNode> {
        Some(self)
    }
}

/// Depth-first, pre-order visit of `node` and all of its descendants.
pub fn walk<'a>(node: &'a dyn SceneNode, visit: &mut dyn FnMut(&'a dyn SceneNode)) {
    visit(node);
    for child in node.get_children() {
        walk(child.as_ref(), visit);
    }
}

/// First node called `name` in depth-first order.
pub fn find<'a>(node: &'a dyn SceneNode, name: &str) -> Option<&'a dyn SceneNode> {
    if node.name() == name {
        return Some(node);
    }
    node.get_children()
        .iter()
        .find_map(|child| find(child.as_ref(), name))
}

/// Every node called `name`, in depth-first order.
pub fn find_all<'a>(node: &'a dyn SceneNode, name: &str) -> Vec<&'a dyn SceneNode> {
    let mut found = Vec::new();
    walk(node, &mut |n| {
        if n.name() == name {
            found.push(n);
        }
    });
    found
}
