use approx::assert_relative_eq;
use cgmath::{InnerSpace, Point3, Vector3};
use rand::{SeedableRng, rngs::StdRng};
use vr_aquarium::{
    camera::Ray,
    motion::{
        flocking::{Fish, FlockingParams, Swarm, avoid_between, clamp_speed},
        gate::{GateParams, SpinGate, is_near},
        orbit::{OrbitParams, orbit_pose},
        particles::{ParticleField, ParticleParams},
    },
};

fn swarm_of(fish: Vec<Fish>) -> Swarm {
    Swarm {
        fish,
        home: Vector3::new(0.0, 0.0, 0.0),
    }
}

fn fish_at(x: f32, y: f32, z: f32) -> Fish {
    Fish {
        position: Vector3::new(x, y, z),
        velocity: Vector3::new(0.0, 0.0, 0.0),
    }
}

#[test]
fn clamped_speed_never_exceeds_max() {
    let fast = clamp_speed(Vector3::new(30.0, 40.0, 0.0), 10.0);
    assert_relative_eq!(fast.magnitude(), 10.0, epsilon = 1e-4);
    assert_relative_eq!(fast.normalize(), Vector3::new(0.6, 0.8, 0.0), epsilon = 1e-5);

    let slow = Vector3::new(1.0, 0.0, 0.0);
    assert_eq!(clamp_speed(slow, 10.0), slow);
}

#[test]
fn steering_keeps_every_fish_under_max_speed() {
    let mut rng = StdRng::seed_from_u64(7);
    let params = FlockingParams::default();
    let mut swarm = Swarm::scatter(64, Vector3::new(10.0, 0.0, -5.0), 8.0, 40.0, &mut rng);
    for _ in 0..20 {
        swarm.update(&params, 1.0 / 60.0);
        for fish in &swarm.fish {
            assert!(fish.velocity.magnitude() <= params.max_speed + 1e-3);
        }
    }
}

#[test]
fn steering_does_not_depend_on_visiting_order() {
    let mut rng = StdRng::seed_from_u64(42);
    let params = FlockingParams::default();
    let mut forward = Swarm::scatter(30, Vector3::new(0.0, 0.0, 0.0), 6.0, 5.0, &mut rng);
    let mut backward = forward.clone();
    backward.fish.reverse();

    forward.steer(&params);
    backward.steer(&params);
    backward.fish.reverse();

    for (a, b) in forward.fish.iter().zip(&backward.fish) {
        assert_relative_eq!(a.velocity, b.velocity, epsilon = 1e-4);
    }
}

#[test]
fn separation_pushes_close_neighbours_apart() {
    let params = FlockingParams::default();
    let mut swarm = swarm_of(vec![fish_at(-1.0, 0.0, 0.0), fish_at(1.0, 0.0, 0.0)]);
    swarm.steer(&params);
    assert!(swarm.fish[0].velocity.x < 0.0);
    assert!(swarm.fish[1].velocity.x > 0.0);
}

fn only_weight(alignment: f32, cohesion: f32) -> FlockingParams {
    FlockingParams {
        separation_weight: 0.0,
        alignment_weight: alignment,
        cohesion_weight: cohesion,
        containment_weight: 0.0,
        max_speed: 1000.0,
        ..FlockingParams::default()
    }
}

fn moving_at(x: f32, vx: f32) -> Fish {
    Fish {
        position: Vector3::new(x, 0.0, 0.0),
        velocity: Vector3::new(vx, 0.0, 0.0),
    }
}

#[test]
fn alignment_adds_mean_neighbour_velocity() {
    let params = only_weight(0.02, 0.0);
    let mut swarm = swarm_of(vec![fish_at(0.0, 0.0, 0.0), moving_at(-5.0, 2.0), moving_at(5.0, 4.0)]);
    swarm.steer(&params);
    assert_relative_eq!(swarm.fish[0].velocity, Vector3::new(3.0 * 0.02, 0.0, 0.0), epsilon = 1e-6);
}

#[test]
fn cohesion_steers_towards_neighbour_centroid() {
    let params = only_weight(0.0, 0.01);
    let mut swarm = swarm_of(vec![fish_at(0.0, 0.0, 0.0), fish_at(4.0, 0.0, 0.0), fish_at(8.0, 6.0, 0.0)]);
    swarm.steer(&params);
    assert_relative_eq!(swarm.fish[0].velocity, Vector3::new(6.0, 3.0, 0.0) * 0.01, epsilon = 1e-6);
}

#[test]
fn neighbours_beyond_every_threshold_are_ignored() {
    let mut params = only_weight(0.02, 0.01);
    params.separation_weight = 0.6;
    let far = params.cohesion_distance + 8.0;
    let mut swarm = swarm_of(vec![fish_at(0.0, 0.0, 0.0), moving_at(far, 5.0)]);
    swarm.steer(&params);
    assert_eq!(swarm.fish[0].velocity, Vector3::new(0.0, 0.0, 0.0));
    assert_eq!(swarm.fish[1].velocity, Vector3::new(5.0, 0.0, 0.0));
}

#[test]
fn fish_outside_containment_turn_home() {
    let params = FlockingParams::default();
    let far = params.containment_radius + 50.0;
    let mut swarm = swarm_of(vec![fish_at(far, 0.0, 0.0)]);
    swarm.steer(&params);
    assert!(swarm.fish[0].velocity.x < 0.0);
}

#[test]
fn avoidance_increases_distance_between_swarms() {
    let params = FlockingParams::default();
    let mut a = swarm_of(vec![fish_at(0.0, 0.0, 0.0)]);
    let mut b = swarm_of(vec![fish_at(3.0, 0.0, 0.0)]);
    avoid_between(&mut a, &mut b, &params, 0.05);

    let distance = (a.fish[0].position - b.fish[0].position).magnitude();
    assert_relative_eq!(distance, 3.0 + 2.0 * params.avoidance_speed * 0.05, epsilon = 1e-4);
}

#[test]
fn avoidance_ignores_distant_and_coincident_fish() {
    let params = FlockingParams::default();
    let far = 2.0 * params.separation_distance + 1.0;
    let mut a = swarm_of(vec![fish_at(0.0, 0.0, 0.0), fish_at(100.0, 0.0, 0.0)]);
    let mut b = swarm_of(vec![fish_at(far, 0.0, 0.0), fish_at(100.0, 0.0, 0.0)]);
    let (before_a, before_b) = (a.clone(), b.clone());

    avoid_between(&mut a, &mut b, &params, 0.1);

    assert_eq!(a, before_a);
    assert_eq!(b, before_b);
}

#[test]
fn empty_swarm_has_no_centroid() {
    assert_eq!(swarm_of(Vec::new()).centroid(), None);
    let pair = swarm_of(vec![fish_at(-2.0, 4.0, 0.0), fish_at(2.0, 0.0, 0.0)]);
    assert_eq!(pair.centroid(), Some(Vector3::new(0.0, 2.0, 0.0)));
}

#[test]
fn orbit_follows_circle_plus_wobble() {
    let params = OrbitParams {
        centre: Vector3::new(5.0, 0.0, -5.0),
        radius: 100.0,
        height: 20.0,
        outer_speed: 0.5,
        wobble_speed: 2.0,
        wobble: (8.0, 4.0),
    };
    let t = 1.3;
    let pose = orbit_pose(&params, 0.25, t);

    let theta = 0.25 + 0.5 * t;
    let phi = 2.0 * t;
    let expected = Vector3::new(
        5.0 + 100.0 * theta.cos() + 8.0 * phi.cos(),
        20.0,
        -5.0 + 100.0 * theta.sin() + 4.0 * phi.sin(),
    );
    assert_relative_eq!(pose.position, expected, epsilon = 1e-3);
}

#[test]
fn orbit_tangent_is_perpendicular_to_radius() {
    let params = OrbitParams::default();
    for phase in [0.0, 1.0, std::f32::consts::PI] {
        let pose = orbit_pose(&params, phase, 0.0);
        let radial = Vector3::new(phase.cos(), 0.0, phase.sin());
        assert_relative_eq!(pose.tangent.dot(radial), 0.0, epsilon = 1e-5);
        assert_relative_eq!(pose.tangent.magnitude(), 1.0, epsilon = 1e-5);
    }
}

#[test]
fn orbit_phases_start_opposite() {
    let params = OrbitParams {
        wobble: (0.0, 0.0),
        ..OrbitParams::default()
    };
    let a = orbit_pose(&params, 0.0, 0.0).position - params.centre;
    let b = orbit_pose(&params, std::f32::consts::PI, 0.0).position - params.centre;
    assert_relative_eq!(a.x, -b.x, epsilon = 1e-3);
    assert_relative_eq!(a.z, -b.z, epsilon = 1e-3);
}

#[test]
fn particles_stay_inside_the_field() {
    let mut rng = StdRng::seed_from_u64(3);
    let params = ParticleParams {
        half_extent: 5.0,
        step: 3.0,
        spin_speed: 1.0,
    };
    let mut field = ParticleField::scatter(200, params.half_extent, &mut rng);
    assert_eq!(field.positions.len(), 200);
    for _ in 0..50 {
        field.perturb(&params, 0.5, &mut rng);
    }
    for p in &field.positions {
        assert!(p.x.abs() <= 5.0 && p.y.abs() <= 5.0 && p.z.abs() <= 5.0, "{p:?}");
    }
    assert!(field.rotation.0 >= 0.0 && field.rotation.0 < std::f32::consts::TAU);
}

#[test]
fn particles_without_step_do_not_move() {
    let mut rng = StdRng::seed_from_u64(11);
    let params = ParticleParams {
        step: 0.0,
        ..ParticleParams::default()
    };
    let mut field = ParticleField::scatter(10, params.half_extent, &mut rng);
    let before = field.positions.clone();
    field.perturb(&params, 1.0, &mut rng);
    assert_eq!(field.positions, before);
}

fn ray_towards(origin: Point3<f32>, target: Point3<f32>) -> Ray {
    Ray {
        origin,
        direction: (target - origin).normalize(),
    }
}

#[test]
fn gate_stops_while_cursor_points_at_focal_point() {
    let focal = Point3::new(0.0, 10.0, 0.0);
    let params = GateParams::default();
    let mut gate = SpinGate::new();

    let on_target = ray_towards(Point3::new(0.0, 10.0, 100.0), focal);
    gate.update(Some(&on_target), focal, &params, 1.0);
    assert!(!gate.spinning);
    assert_eq!(gate.angle, 0.0);

    let elsewhere = ray_towards(Point3::new(0.0, 10.0, 100.0), Point3::new(200.0, 10.0, 0.0));
    gate.update(Some(&elsewhere), focal, &params, 1.0);
    assert!(gate.spinning);
    assert_relative_eq!(gate.angle, params.spin_speed, epsilon = 1e-6);
}

#[test]
fn gate_keeps_spinning_without_cursor() {
    let params = GateParams::default();
    let mut gate = SpinGate::new();
    gate.update(None, Point3::new(0.0, 0.0, 0.0), &params, 2.0);
    assert!(gate.spinning);
    assert_relative_eq!(gate.angle, 2.0 * params.spin_speed, epsilon = 1e-6);
}

#[test]
fn near_uses_closest_point_on_ray() {
    let ray = ray_towards(Point3::new(0.0, 0.0, 50.0), Point3::new(0.0, 0.0, 0.0));
    assert!(is_near(&ray, Point3::new(3.0, 0.0, 0.0), 5.0));
    assert!(!is_near(&ray, Point3::new(6.0, 0.0, 0.0), 5.0));
}
