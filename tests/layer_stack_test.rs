use layer_cake::{
    SceneError,
    cake::stack::{LayerProportions, LayerStack},
};

const EPS: f32 = 1e-5;

#[test]
fn should_fill_85_percent_of_the_cake() {
    let stack = LayerStack::new(2.0, &LayerProportions::default()).unwrap();
    assert!((stack.inner_height() - 0.85 * 2.0).abs() < EPS);
    assert!((stack.gap_bottom - 0.075 * 2.0).abs() < EPS);
    assert!((stack.gap_top - stack.gap_bottom).abs() < EPS);
}

#[test]
fn should_stack_layers_in_contact() {
    for height in [0.5, 1.0, 2.0, 3.7, 10.0] {
        let stack = LayerStack::new(height, &LayerProportions::default()).unwrap();
        let [bottom, middle, top] = stack.slots;

        assert!((bottom.bottom - (-height / 2.0 + stack.gap_bottom)).abs() < EPS);
        assert!((middle.bottom - bottom.top).abs() < EPS);
        assert!((top.bottom - middle.top).abs() < EPS);
        assert!((height / 2.0 - top.top - stack.gap_top).abs() < EPS);

        for slot in stack.slots {
            assert!((slot.center_y - (slot.bottom + slot.height / 2.0)).abs() < EPS);
        }
    }
}

#[test]
fn should_size_layers_by_proportion() {
    let stack = LayerStack::new(2.0, &LayerProportions::default()).unwrap();
    assert!((stack.bottom().height - 0.9).abs() < EPS);
    assert!((stack.middle().height - 0.3).abs() < EPS);
    assert!((stack.top().height - 0.5).abs() < EPS);
    assert!((stack.bottom().center_y - -0.4).abs() < EPS);
}

#[test]
fn should_leave_no_gap_for_full_proportions() {
    let proportions = LayerProportions {
        bottom: 0.5,
        middle: 0.25,
        top: 0.25,
    };
    let stack = LayerStack::new(1.0, &proportions).unwrap();
    assert!(stack.gap_bottom.abs() < EPS);
    assert!((stack.top().top - 0.5).abs() < EPS);
}

#[test]
fn should_reject_invalid_input() {
    let defaults = LayerProportions::default();
    assert!(matches!(
        LayerStack::new(0.0, &defaults),
        Err(SceneError::InvalidArgument { what: "cake_height", .. })
    ));
    assert!(LayerStack::new(-2.0, &defaults).is_err());

    let too_much = LayerProportions {
        bottom: 0.6,
        middle: 0.3,
        top: 0.3,
    };
    assert!(matches!(
        LayerStack::new(2.0, &too_much),
        Err(SceneError::InvalidArgument { what: "proportions", .. })
    ));

    let negative = LayerProportions {
        middle: -0.1,
        ..defaults
    };
    assert!(LayerStack::new(2.0, &negative).is_err());
}
