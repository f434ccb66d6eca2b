use approx::assert_relative_eq;
use cgmath::{InnerSpace, Point3};
use vr_aquarium::{
    camera::Camera,
    motion::MotionParams,
    ui::{
        QuadList, Rect,
        joystick::{Anchor, Joystick, JoystickMode},
        slider::{Slider, SliderBinding, default_sliders},
    },
};
use winit::dpi::PhysicalPosition;

const SCREEN: [f32; 2] = [800.0, 600.0];

fn radius_slider() -> Slider {
    Slider::new(
        "orbit radius",
        SliderBinding::OrbitRadius,
        50.0,
        300.0,
        Rect::new(20.0, 24.0, 200.0, 8.0),
    )
}

#[test]
fn slider_value_is_monotonic_and_clamped() {
    let slider = radius_slider();
    assert_eq!(slider.value_at(-100.0), 50.0);
    assert_eq!(slider.value_at(20.0), 50.0);
    assert_relative_eq!(slider.value_at(120.0), 175.0, epsilon = 1e-4);
    assert_eq!(slider.value_at(220.0), 300.0);
    assert_eq!(slider.value_at(10_000.0), 300.0);

    let samples: Vec<f32> = (0..=40).map(|i| slider.value_at(i as f64 * 6.0)).collect();
    assert!(samples.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn swapped_bounds_are_normalised() {
    let slider = Slider::new("h", SliderBinding::OrbitHeight, 10.0, -10.0, Rect::new(0.0, 0.0, 100.0, 5.0));
    assert_eq!((slider.min, slider.max), (-10.0, 10.0));
    assert_relative_eq!(slider.fraction_of(0.0), 0.5);
}

#[test]
fn dragging_writes_the_bound_parameter() {
    let slider = radius_slider();
    let mut params = MotionParams::default();
    let before = params.clone();
    slider.drag_to(&mut params, 220.0);

    assert_eq!(params.orbit.radius, 300.0);
    assert_eq!(params.flocking, before.flocking);
    assert_eq!(params.particles, before.particles);
}

#[test]
fn slider_hit_includes_slack_around_track() {
    let slider = radius_slider();
    assert!(slider.hit(PhysicalPosition::new(100.0, 28.0)));
    assert!(slider.hit(PhysicalPosition::new(100.0, 20.0)));
    assert!(!slider.hit(PhysicalPosition::new(100.0, 60.0)));
}

#[test]
fn fish_speed_slider_only_with_swarm() {
    let has_fish = |sliders: Vec<Slider>| sliders.iter().any(|s| s.binding == SliderBinding::FishSpeed);
    assert!(!has_fish(default_sliders(false)));
    assert!(has_fish(default_sliders(true)));
}

#[test]
fn sliders_draw_track_fill_and_knob() {
    let mut quads = QuadList::default();
    let params = MotionParams::default();
    for slider in default_sliders(true) {
        slider.draw(&params, &mut quads, SCREEN);
    }
    assert_eq!(quads.quad_count(), 3 * default_sliders(true).len());
}

#[test]
fn every_slider_fills_in_its_own_colour() {
    let sliders = default_sliders(true);
    let mut quads = QuadList::default();
    let params = MotionParams::default();
    for slider in &sliders {
        slider.draw(&params, &mut quads, SCREEN);
    }
    // track, fill and knob take four vertices each
    let fills: Vec<[f32; 4]> = (0..sliders.len()).map(|i| quads.vertices[i * 12 + 4].colour).collect();
    for (i, slider) in sliders.iter().enumerate() {
        assert_eq!(fills[i], slider.binding.colour(), "{}", slider.label);
        for other in &fills[i + 1..] {
            assert_ne!(fills[i], *other, "{} shares its fill colour", slider.label);
        }
    }
}

#[test]
fn joystick_displacement_is_bounded_by_radius() {
    let stick = Joystick::new(Anchor::BottomLeft, JoystickMode::Walk, 60.0, 10.0);
    let [cx, cy] = stick.centre(SCREEN);
    for (dx, dy) in [(500.0, 0.0), (-300.0, 400.0), (20.0, -10.0), (0.0, 0.0)] {
        let d = stick.displacement(PhysicalPosition::new((cx + dx) as f64, (cy + dy) as f64), SCREEN);
        assert!(d.magnitude() <= 60.0 + 1e-3);
    }
    let inside = stick.displacement(PhysicalPosition::new((cx + 20.0) as f64, (cy - 10.0) as f64), SCREEN);
    assert_relative_eq!(inside.x, 20.0, epsilon = 1e-4);
    assert_relative_eq!(inside.y, -10.0, epsilon = 1e-4);
}

#[test]
fn joystick_only_grabs_on_its_base() {
    let mut stick = Joystick::new(Anchor::BottomRight, JoystickMode::Lift, 50.0, 10.0);
    assert!(!stick.grab(PhysicalPosition::new(10.0, 10.0), SCREEN));
    assert!(!stick.is_active());

    let [cx, cy] = stick.centre(SCREEN);
    assert!(stick.grab(PhysicalPosition::new(cx as f64, cy as f64), SCREEN));
    stick.drag(PhysicalPosition::new(cx as f64, (cy - 500.0) as f64), SCREEN);
    assert_relative_eq!(stick.knob().y, -50.0, epsilon = 1e-4);

    stick.release();
    assert!(!stick.is_active());
    assert_eq!(stick.knob().magnitude(), 0.0);
}

#[test]
fn lift_joystick_moves_camera_up() {
    let camera = Camera::look_at(Point3::new(0.0, 0.0, 10.0), Point3::new(0.0, 0.0, 0.0));
    let mut stick = Joystick::new(Anchor::BottomLeft, JoystickMode::Lift, 40.0, 10.0);
    assert_eq!(stick.camera_delta(&camera, 1.0).magnitude(), 0.0);

    let [cx, cy] = stick.centre(SCREEN);
    stick.grab(PhysicalPosition::new(cx as f64, cy as f64), SCREEN);
    stick.drag(PhysicalPosition::new(cx as f64, (cy - 40.0) as f64), SCREEN);
    let delta = stick.camera_delta(&camera, 0.5);
    assert_relative_eq!(delta.y, 5.0, epsilon = 1e-4);
    assert_relative_eq!(delta.x, 0.0, epsilon = 1e-4);
}
