#[cfg(feature = "integration-tests")]
mod common;

#[cfg(feature = "integration-tests")]
fn to_pixel(colour: wgpu::Color) -> image::Rgba<u8> {
    let f_to_u8 = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    image::Rgba([
        f_to_u8(colour.r),
        f_to_u8(colour.g),
        f_to_u8(colour.b),
        f_to_u8(colour.a),
    ])
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_render_clear_colour() {
    use crate::common::test_utils::Empty;
    use layer_cake::flow::ImageTestResult;

    golden_image_test!(
        |_| -> anyhow::Result<Box<dyn GraphicsFlow<FrameCounter>>> {
            Ok(Box::new(Empty(wgpu::Color::WHITE)))
        },
        |_, state: &mut FrameCounter, texture: &mut image::RgbaImage| {
            if state.frame() == 0 {
                return Ok(ImageTestResult::Waiting);
            }
            let desired_pixel = to_pixel(wgpu::Color::WHITE);
            for pixel in texture.pixels() {
                assert_eq!(*pixel, desired_pixel);
            }
            Ok(ImageTestResult::Passed)
        }
    );
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_draw_cake_on_white_background() {
    use layer_cake::{
        flow::ImageTestResult,
        scene::{CakeFlow, SceneConfig, compose},
    };
    use rand::SeedableRng;

    golden_image_test!(
        |ctx: InitContext| -> anyhow::Result<Box<dyn GraphicsFlow<FrameCounter>>> {
            let mut rng = rand_pcg::Pcg64::seed_from_u64(3);
            let scene = compose(&SceneConfig::default(), &mut rng)?;
            Ok(Box::new(CakeFlow::new(&ctx, scene)?))
        },
        |_, state: &mut FrameCounter, texture: &mut image::RgbaImage| {
            if state.frame() < 2 {
                return Ok(ImageTestResult::Waiting);
            }
            let white = to_pixel(wgpu::Color::WHITE);
            let (width, height) = texture.dimensions();

            assert_eq!(*texture.get_pixel(0, 0), white, "top left corner");
            assert_eq!(*texture.get_pixel(width - 1, 0), white, "top right corner");
            assert_ne!(
                *texture.get_pixel(width / 2, height / 2),
                white,
                "the cake should cover the centre of the frame"
            );
            Ok(ImageTestResult::Passed)
        }
    );
}
