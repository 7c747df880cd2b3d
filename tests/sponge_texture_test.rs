use layer_cake::{
    SceneError,
    data_structures::material::Colour,
    resources::sponge::{TEXTURE_REPEAT, TEXTURE_SIZE, make_texture},
};
use rand::SeedableRng;
use rand_pcg::Pcg64;

#[test]
fn should_always_be_square_and_tiled() {
    for seed in 0..5 {
        let texture = make_texture("#ff6b5c", "#c4332f", &mut Pcg64::seed_from_u64(seed)).unwrap();
        assert_eq!(texture.size(), (TEXTURE_SIZE, TEXTURE_SIZE));
        assert_eq!(texture.size(), (128, 128));
        assert_eq!(texture.repeat, TEXTURE_REPEAT);
    }
}

#[test]
fn should_reproduce_with_equal_seeds() {
    let a = make_texture("#ffe8a6", "#d8b262", &mut Pcg64::seed_from_u64(42)).unwrap();
    let b = make_texture("#ffe8a6", "#d8b262", &mut Pcg64::seed_from_u64(42)).unwrap();
    assert_eq!(a, b);

    let c = make_texture("#ffe8a6", "#d8b262", &mut Pcg64::seed_from_u64(43)).unwrap();
    assert_ne!(a.image, c.image);
}

#[test]
fn should_differ_between_colour_pairs() {
    let red = make_texture("#ff6b5c", "#c4332f", &mut Pcg64::seed_from_u64(1)).unwrap();
    let yellow = make_texture("#ffe8a6", "#d8b262", &mut Pcg64::seed_from_u64(1)).unwrap();
    assert_ne!(red.image, yellow.image);
}

#[test]
fn should_keep_background_and_blend_dots() {
    let background = Colour::from_hex(0xff6b5c);
    let dot = Colour::from_hex(0xc4332f);
    let texture = make_texture(background, dot, &mut Pcg64::seed_from_u64(9)).unwrap();
    let bg = background.to_rgba8();

    let untouched = texture.image.pixels().filter(|p| p.0 == bg).count();
    let speckled = texture.image.pixels().filter(|p| p.0 != bg).count();
    assert!(untouched > 0, "the background should show between the dots");
    assert!(speckled > 0, "some dots should have been painted");

    // Source-over between two colours stays within their per-channel range, up to rounding
    let dot = dot.to_rgba8();
    for pixel in texture.image.pixels() {
        for channel in 0..3 {
            let lo = bg[channel].min(dot[channel]).saturating_sub(1);
            let hi = bg[channel].max(dot[channel]).saturating_add(1);
            assert!((lo..=hi).contains(&pixel.0[channel]));
        }
        assert_eq!(pixel.0[3], 255);
    }
}

#[test]
fn should_soften_dot_edges() {
    let background = Colour::from_hex(0xff6b5c);
    let dot = Colour::from_hex(0xc4332f);
    let texture = make_texture(background, dot, &mut Pcg64::seed_from_u64(3)).unwrap();
    let (bg, dot) = (background.to_rgba8(), dot.to_rgba8());

    // Green spans 0x6b..0x33, so the blend weight of a pixel can be read off that channel
    let weight = |g: u8| (bg[1] as f32 - g as f32) / (bg[1] as f32 - dot[1] as f32);
    let faint = texture
        .image
        .pixels()
        .map(|p| weight(p.0[1]))
        .filter(|w| *w > 0.02 && *w < 0.25)
        .count();
    // Every dot is at least 30% opaque, so fainter pixels come from partially covered rims
    assert!(faint > 0, "dot rims should be anti-aliased");
}

#[test]
fn should_reject_invalid_colours() {
    let mut rng = Pcg64::seed_from_u64(0);
    assert!(matches!(
        make_texture("#12345", "#c4332f", &mut rng),
        Err(SceneError::InvalidArgument { what: "colour", .. })
    ));
    assert!(make_texture("#ff6b5c", "red", &mut rng).is_err());
    assert!(make_texture(Colour::new(1.5, 0.0, 0.0), "#c4332f", &mut rng).is_err());
}

#[test]
fn should_parse_colours() {
    assert_eq!(Colour::parse("#ffffff").unwrap(), Colour::WHITE);
    assert_eq!(Colour::parse("000000").unwrap(), Colour::BLACK);
    assert_eq!(Colour::parse("#fff165").unwrap(), Colour::from_hex(0xfff165));
    assert_eq!(Colour::from(0xc4332f_u32).to_rgba8(), [0xc4, 0x33, 0x2f, 255]);
    assert!(Colour::parse("#ggg000").is_err());
}
