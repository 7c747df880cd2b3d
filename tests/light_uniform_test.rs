use cgmath::{InnerSpace, Point3, Rad, Vector3};
use layer_cake::{
    data_structures::material::Colour,
    pipelines::light::{Light, LightUniform, SpotLight, shadow_map_size},
    scene::default_lights,
};

fn spot(intensity: f32, cast_shadow: bool, size: u32) -> SpotLight {
    SpotLight {
        colour: Colour::WHITE,
        intensity,
        position: Point3::new(6.0, 8.0, 4.0),
        target: Point3::new(0.0, 0.0, 0.0),
        angle: Rad(std::f32::consts::PI / 5.0),
        penumbra: 0.45,
        decay: 2.0,
        distance: 40.0,
        cast_shadow,
        shadow_map_size: size,
    }
}

#[test]
fn should_pack_default_lights() {
    let uniform = LightUniform::from_lights(&default_lights());
    assert!((uniform.ambient[0] - 0.6).abs() < 1e-5);
    assert!((uniform.spot_colour[1] - 0.9).abs() < 1e-5);
    assert!((uniform.fill_colour[2] - 0.35).abs() < 1e-5);
    assert!(uniform.casts_shadow());

    let direction = Vector3::new(
        uniform.spot_direction[0],
        uniform.spot_direction[1],
        uniform.spot_direction[2],
    );
    let expected = (Point3::new(0.0, 0.0, 0.0) - Point3::new(6.0, 8.0, 4.0)).normalize();
    assert!((direction - expected).magnitude() < 1e-5);

    // The inner cone is narrower than the outer one
    assert!(uniform.spot_params[1] > uniform.spot_params[0]);
    assert_eq!(shadow_map_size(&default_lights()), Some(2048));
}

#[test]
fn should_sum_ambient_lights() {
    let lights = [
        Light::Ambient {
            colour: Colour::WHITE,
            intensity: 0.25,
        },
        Light::Ambient {
            colour: Colour::WHITE,
            intensity: 0.5,
        },
    ];
    let uniform = LightUniform::from_lights(&lights);
    assert!((uniform.ambient[0] - 0.75).abs() < 1e-5);
    assert!(!uniform.casts_shadow());
    assert_eq!(shadow_map_size(&lights), None);
}

#[test]
fn should_use_first_spot_only() {
    let lights = [Light::Spot(spot(0.9, false, 512)), Light::Spot(spot(0.1, true, 1024))];
    let uniform = LightUniform::from_lights(&lights);
    assert!((uniform.spot_colour[0] - 0.9).abs() < 1e-5);
    assert!(!uniform.casts_shadow());
}

#[test]
fn should_cover_the_cone_with_the_shadow_camera() {
    let light = spot(0.9, true, 2048);
    let view_proj = light.shadow_view_proj();
    // The target lies in the middle of the shadow map
    let clip = view_proj * Point3::new(0.0, 0.0, 0.0).to_homogeneous();
    let ndc = clip.truncate() / clip.w;
    assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
    assert!(ndc.z > 0.0 && ndc.z < 1.0);
}
