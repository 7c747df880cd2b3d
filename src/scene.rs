//! The complete scene: a cake on a cake stand above an invisible ground that only shows shadows.
//!
//! [`compose`] builds everything on the CPU and returns an owned [`CakeScene`]. [`CakeFlow`] is the
//! [`GraphicsFlow`] that uploads that scene once and renders it every frame.

use std::{
    f32::consts::{FRAC_PI_2, FRAC_PI_4, PI},
    rc::Rc,
};

use cgmath::{Point3, Rad, Vector2, Vector3};
use instant::Duration;
use rand::Rng;
use winit::event::{DeviceEvent, WindowEvent};

use crate::{
    cake::{CakeConfig, CakeMaterials, build_cake},
    camera::CameraSetup,
    context::{Context, InitContext},
    data_structures::{
        geometry::Geometry,
        instance::Instance,
        material::{Colour, Material, PolygonOffset},
        scene_graph::{GroupNode, MeshNode, NodeKind, SceneNode, walk},
    },
    error::SceneError,
    flow::{FlowConstructor, FlowFuture, GraphicsFlow, Out},
    pipelines::light::{DEFAULT_SHADOW_MAP_SIZE, Light, SpotLight},
    render::Render,
    resources::{
        ResourceCache,
        sponge::{make_texture, time_seeded_rng},
    },
};

/// Radius/height pairs of the stem's lathe profile, bottom to top.
pub const STEM_PROFILE: [[f32; 2]; 6] = [
    [0.0, -1.5],
    [0.55, -1.5],
    [0.85, -1.2],
    [0.55, -0.7],
    [0.35, -0.2],
    [0.40, 0.0],
];

/// The two colours a sponge texture is painted with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpongeColours {
    pub background: Colour,
    pub dots: Colour,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneConfig {
    pub cake: CakeConfig,
    pub plate_radius: f32,
    pub plate_height: f32,
    pub base_radius: f32,
    pub base_height: f32,
    pub base_y: f32,
    pub stand_segments: u32,
    pub stand_colour: Colour,
    pub ground_size: f32,
    pub ground_y: f32,
    pub ground_opacity: f32,
    /// Gap between the plate top and the cake bottom.
    pub cake_clearance: f32,
    pub cake_rotation: Rad<f32>,
    pub frosting_colour: Colour,
    pub cream_colour: Colour,
    pub red_sponge: SpongeColours,
    pub yellow_sponge: SpongeColours,
    pub background: Colour,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            cake: CakeConfig::default(),
            plate_radius: 2.4,
            plate_height: 0.16,
            base_radius: 1.2,
            base_height: 0.2,
            base_y: -1.6,
            stand_segments: 64,
            stand_colour: Colour::from_hex(0x111015),
            ground_size: 20.0,
            ground_y: -1.8,
            ground_opacity: 0.2,
            cake_clearance: 0.02,
            cake_rotation: Rad(-FRAC_PI_4),
            frosting_colour: Colour::from_hex(0xfff165),
            cream_colour: Colour::from_hex(0xfffbf2),
            red_sponge: SpongeColours {
                background: Colour::from_hex(0xff6b5c),
                dots: Colour::from_hex(0xc4332f),
            },
            yellow_sponge: SpongeColours {
                background: Colour::from_hex(0xffe8a6),
                dots: Colour::from_hex(0xd8b262),
            },
            background: Colour::WHITE,
        }
    }
}

impl SceneConfig {
    /// Height of the plate's top face in world space.
    pub fn plate_top(&self) -> f32 {
        self.plate_height / 2.0
    }

    /// World-space height of the cake group's origin.
    pub fn cake_center_y(&self) -> f32 {
        self.plate_top() + self.cake_clearance + self.cake.height / 2.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SceneStats {
    pub meshes: usize,
    /// Groups below the root.
    pub groups: usize,
    pub lights: usize,
    pub cameras: usize,
}

pub struct CakeScene {
    pub root: GroupNode,
    pub lights: Vec<Light>,
    pub camera: CameraSetup,
    pub background: Colour,
}

impl CakeScene {
    pub fn stats(&self) -> SceneStats {
        let mut stats = SceneStats {
            lights: self.lights.len(),
            cameras: 1,
            ..Default::default()
        };
        for child in self.root.get_children() {
            walk(child.as_ref(), &mut |node| match node.kind() {
                NodeKind::Group => stats.groups += 1,
                NodeKind::Mesh => stats.meshes += 1,
            });
        }
        stats
    }
}

pub fn default_lights() -> Vec<Light> {
    vec![
        Light::Ambient {
            colour: Colour::WHITE,
            intensity: 0.6,
        },
        Light::Spot(SpotLight {
            colour: Colour::WHITE,
            intensity: 0.9,
            position: Point3::new(6.0, 8.0, 4.0),
            target: Point3::new(0.0, 0.0, 0.0),
            angle: Rad(PI / 5.0),
            penumbra: 0.45,
            decay: 2.0,
            distance: 40.0,
            cast_shadow: true,
            shadow_map_size: DEFAULT_SHADOW_MAP_SIZE,
        }),
        Light::Directional {
            colour: Colour::WHITE,
            intensity: 0.35,
            position: Point3::new(-5.0, 4.0, -4.0),
        },
    ]
}

fn build_stand(config: &SceneConfig) -> GroupNode {
    let segments = config.stand_segments;
    let material = Rc::new(Material::coloured("stand", config.stand_colour, 0.35, 0.2));

    let plate = MeshNode::new(
        "plate",
        Rc::new(Geometry::cylinder(
            config.plate_radius,
            config.plate_radius,
            config.plate_height,
            segments,
        )),
        Rc::clone(&material),
    )
    .with_shadows(false, true);

    let profile: Vec<Vector2<f32>> = STEM_PROFILE
        .iter()
        .map(|[x, y]| Vector2::new(*x, *y))
        .collect();
    let stem = MeshNode::new(
        "stem",
        Rc::new(Geometry::lathe(&profile, segments)),
        Rc::clone(&material),
    )
    .with_position(Vector3::new(0.0, -config.plate_top(), 0.0))
    .with_shadows(true, true);

    let base = MeshNode::new(
        "base",
        Rc::new(Geometry::cylinder(
            config.base_radius,
            config.base_radius,
            config.base_height,
            segments,
        )),
        material,
    )
    .with_position(Vector3::new(0.0, config.base_y, 0.0))
    .with_shadows(true, true);

    GroupNode::new("stand")
        .with_child(plate)
        .with_child(stem)
        .with_child(base)
}

fn build_ground(config: &SceneConfig) -> MeshNode {
    MeshNode::new(
        "ground",
        Rc::new(Geometry::plane(config.ground_size, config.ground_size)),
        Rc::new(Material::shadow_catcher("ground", config.ground_opacity)),
    )
    .with_transform(
        Instance::from_position(0.0, config.ground_y, 0.0).with_rotation_x(Rad(-FRAC_PI_2)),
    )
    .with_shadows(false, true)
}

fn cake_materials<R: Rng>(config: &SceneConfig, rng: &mut R) -> Result<CakeMaterials, SceneError> {
    let sponge = |name: &str, colours: SpongeColours, rng: &mut R| {
        make_texture(colours.background, colours.dots, rng)
            .map(|texture| Rc::new(Material::textured(name, Rc::new(texture), 0.9, 0.03)))
    };
    let red = sponge("red_sponge", config.red_sponge, rng)?;
    let yellow = sponge("yellow_sponge", config.yellow_sponge, rng)?;
    let cream = Rc::new(Material::coloured("cream", config.cream_colour, 0.95, 0.02));
    let frosting = Rc::new(
        Material::coloured("frosting", config.frosting_colour, 0.6, 0.05).with_polygon_offset(
            PolygonOffset {
                factor: 1.0,
                units: 1,
            },
        ),
    );

    Ok(CakeMaterials {
        frosting,
        layers: [red, cream, yellow],
    })
}

/// Builds the whole scene. `rng` drives the sponge textures only.
pub fn compose<R: Rng>(config: &SceneConfig, rng: &mut R) -> Result<CakeScene, SceneError> {
    let materials = cake_materials(config, rng)?;
    let cake = build_cake(&config.cake, &materials)?.with_transform(
        Instance::from_position(0.0, config.cake_center_y(), 0.0)
            .with_rotation_y(config.cake_rotation),
    );

    let mut root = GroupNode::new("scene")
        .with_child(build_stand(config))
        .with_child(build_ground(config))
        .with_child(cake);
    root.update_world_transforms(&Instance::default());

    let scene = CakeScene {
        root,
        lights: default_lights(),
        camera: CameraSetup::default(),
        background: config.background,
    };
    let stats = scene.stats();
    log::info!(
        "composed scene: {} meshes, {} groups, {} lights",
        stats.meshes,
        stats.groups,
        stats.lights
    );
    Ok(scene)
}

/// Renders a [`CakeScene`].
pub struct CakeFlow {
    scene: CakeScene,
}

impl CakeFlow {
    /// Uploads every mesh of `scene`; shared geometries and materials are uploaded once.
    pub fn new(ctx: &InitContext, mut scene: CakeScene) -> anyhow::Result<Self> {
        let mut cache = ResourceCache::new(&ctx.device, &ctx.queue, &ctx.material_layout);
        scene.root.upload(&mut cache)?;
        log::info!("uploaded scene: {} materials", cache.uploaded_materials());
        Ok(Self { scene })
    }

    pub fn scene(&self) -> &CakeScene {
        &self.scene
    }

    /// Composes the scene with a clock-seeded generator once the GPU is ready.
    pub fn constructor<S: 'static>(config: SceneConfig) -> FlowConstructor<S> {
        Box::new(move |ctx: InitContext| -> FlowFuture<S> {
            Box::pin(async move {
                let mut rng = time_seeded_rng();
                let scene = compose(&config, &mut rng)?;
                let flow: Box<dyn GraphicsFlow<S>> = Box::new(CakeFlow::new(&ctx, scene)?);
                Ok::<_, anyhow::Error>(flow)
            })
        })
    }
}

impl<S> GraphicsFlow<S> for CakeFlow {
    fn on_init(&mut self, ctx: &mut Context, _: &mut S) -> Out {
        ctx.clear_colour = self.scene.background.to_wgpu();
        let (camera, projection) = self.scene.camera.build(ctx.config.width, ctx.config.height);
        ctx.set_camera(camera, projection);
        let lights = self.scene.lights.clone();
        Out::Configure(Box::new(move |ctx: &mut Context| ctx.set_lights(&lights)))
    }

    fn on_update(&mut self, ctx: &Context, _: &mut S, _: Duration) -> Out {
        self.scene.root.write_to_buffers(&ctx.queue);
        Out::Empty
    }

    fn on_device_events(&mut self, _: &Context, _: &mut S, _: &DeviceEvent) -> Out {
        Out::Empty
    }

    fn on_window_events(&mut self, _: &Context, _: &mut S, _: &WindowEvent) -> Out {
        Out::Empty
    }

    fn on_render(&self) -> Render<'_> {
        let root: &dyn SceneNode = &self.scene.root;
        root.into()
    }

    #[cfg(feature = "integration-tests")]
    fn render_to_texture(
        &self,
        _: &Context,
        _: &mut S,
        _: &mut image::RgbaImage,
    ) -> Result<crate::flow::ImageTestResult, anyhow::Error> {
        Ok(crate::flow::ImageTestResult::Passed)
    }
}
