use std::rc::Rc;

use layer_cake::{
    cake::LAYER_NAMES,
    camera::CameraSetup,
    data_structures::{
        material::MaterialPass,
        scene_graph::{MeshNode, SceneNode, find, find_all},
    },
    pipelines::light::{Light, LightUniform},
    scene::{CakeScene, SceneConfig, SceneStats, compose},
};
use rand::SeedableRng;
use rand_pcg::Pcg64;

fn scene() -> CakeScene {
    compose(&SceneConfig::default(), &mut Pcg64::seed_from_u64(11)).unwrap()
}

fn mesh<'a>(scene: &'a CakeScene, name: &str) -> &'a MeshNode {
    find(&scene.root, name)
        .and_then(|node| node.as_mesh())
        .unwrap_or_else(|| panic!("no mesh called {name}"))
}

#[test]
fn should_count_scene_objects() {
    assert_eq!(
        scene().stats(),
        SceneStats {
            meshes: 22,
            groups: 9,
            lights: 3,
            cameras: 1,
        }
    );
}

#[test]
fn should_contain_every_part() {
    let scene = scene();
    for name in ["stand", "cake", "plate", "stem", "base", "ground", "frosting"] {
        assert!(find(&scene.root, name).is_some(), "{name} is missing");
    }
    for name in LAYER_NAMES {
        assert!(find(&scene.root, name).is_some(), "{name} is missing");
    }
    assert_eq!(find_all(&scene.root, "drip").len(), 7);
    assert_eq!(find_all(&scene.root, "drip_body").len(), 7);
    assert_eq!(find_all(&scene.root, "drip_tip").len(), 7);
}

#[test]
fn should_rest_cake_just_above_the_plate() {
    let scene = scene();
    let plate_top = mesh(&scene, "plate").world_bounds().max.y;
    let cake_bottom = mesh(&scene, "frosting").world_bounds().min.y;
    assert!((plate_top - 0.08).abs() < 1e-4);
    assert!((cake_bottom - plate_top - 0.02).abs() < 1e-4);

    let cake_top = mesh(&scene, "frosting").world_bounds().max.y;
    assert!((cake_top - cake_bottom - 2.0).abs() < 1e-4);
}

#[test]
fn should_keep_inner_layers_inside_the_frosting() {
    let scene = scene();
    let frosting = mesh(&scene, "frosting").world_bounds();
    let mut previous_top: Option<f32> = None;
    for name in LAYER_NAMES {
        let layer = mesh(&scene, name).world_bounds();
        assert!(layer.min.y >= frosting.min.y - 1e-4 && layer.max.y <= frosting.max.y + 1e-4);
        if let Some(top) = previous_top {
            assert!((layer.min.y - top).abs() < 1e-4, "{name} should touch the layer below");
        }
        previous_top = Some(layer.max.y);
    }
}

#[test]
fn should_place_drips_on_the_rim() {
    let scene = scene();
    let cake_axis = find(&scene.root, "cake").unwrap().get_world_transform().origin();
    for drip in find_all(&scene.root, "drip") {
        let p = drip.get_world_transform().origin();
        let radial = ((p.x - cake_axis.x).powi(2) + (p.z - cake_axis.z).powi(2)).sqrt();
        assert!((radial - 2.02).abs() < 1e-4);
    }
}

#[test]
fn should_share_materials_by_role() {
    let scene = scene();
    let frosting = mesh(&scene, "frosting").material();
    assert_eq!(frosting.pass(), MaterialPass::PolygonOffset);
    for body in find_all(&scene.root, "drip_body") {
        let body = body.as_mesh().unwrap();
        assert!(Rc::ptr_eq(body.material(), frosting));
    }

    let plate = mesh(&scene, "plate").material();
    assert!(Rc::ptr_eq(mesh(&scene, "stem").material(), plate));
    assert!(Rc::ptr_eq(mesh(&scene, "base").material(), plate));

    assert_eq!(mesh(&scene, "ground").material().pass(), MaterialPass::ShadowCatcher);
    assert!(mesh(&scene, "red_layer").material().texture().is_some());
    assert!(mesh(&scene, "yellow_layer").material().texture().is_some());
    assert!(mesh(&scene, "cream_layer").material().texture().is_none());
}

#[test]
fn should_configure_shadows() {
    let scene = scene();
    let plate = mesh(&scene, "plate");
    assert!(!plate.cast_shadow && plate.receive_shadow);
    let ground = mesh(&scene, "ground");
    assert!(!ground.cast_shadow && ground.receive_shadow);
    assert!(mesh(&scene, "frosting").cast_shadow);

    let spots = scene
        .lights
        .iter()
        .filter(|light| matches!(light, Light::Spot(spot) if spot.cast_shadow))
        .count();
    assert_eq!(spots, 1);
    assert!(LightUniform::from_lights(&scene.lights).casts_shadow());
}

#[test]
fn should_look_at_the_origin_from_above() {
    let scene = scene();
    let (camera, projection) = scene.camera.build(800, 600);
    assert_eq!(camera.position, cgmath::Point3::new(4.2, 4.0, 4.2));
    assert_eq!(camera.target, cgmath::Point3::new(0.0, 0.0, 0.0));
    assert!((projection.aspect() - 800.0 / 600.0).abs() < 1e-6);
    assert_eq!(scene.background, layer_cake::data_structures::material::Colour::WHITE);
}

#[test]
fn should_share_the_start_camera_with_the_context() {
    // The window context starts from the same setup before any flow configures it
    assert_eq!(scene().camera, CameraSetup::default());
    let (camera, projection) = CameraSetup::default().build(1, 1);
    assert_eq!(camera.position, cgmath::Point3::new(4.2, 4.0, 4.2));
    assert!((projection.aspect() - 1.0).abs() < 1e-6);
}

#[test]
fn should_reject_bad_cake_dimensions() {
    let mut config = SceneConfig::default();
    config.cake.inner_radius = 2.5;
    assert!(compose(&config, &mut Pcg64::seed_from_u64(0)).is_err());

    let mut config = SceneConfig::default();
    config.cake.drip_count = 0;
    assert!(compose(&config, &mut Pcg64::seed_from_u64(0)).is_err());

    let mut config = SceneConfig::default();
    config.cake.height = -1.0;
    assert!(compose(&config, &mut Pcg64::seed_from_u64(0)).is_err());
}
