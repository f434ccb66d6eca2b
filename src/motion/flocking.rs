//! Boids flocking: separation, alignment and cohesion within a swarm plus
//! pairwise avoidance between two swarms.
//!
//! Every fish reads its neighbours from a snapshot taken before the update,
//! so the result does not depend on the order the fish are visited in.

use cgmath::{InnerSpace, Vector3, Zero};
use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub struct FlockingParams {
    pub separation_distance: f32,
    pub alignment_distance: f32,
    pub cohesion_distance: f32,
    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    /// World units per second.
    pub max_speed: f32,
    /// Fish further than this from their swarm's home are steered back.
    pub containment_radius: f32,
    pub containment_weight: f32,
    /// World units per second two fish of different swarms are pushed apart.
    pub avoidance_speed: f32,
}

impl Default for FlockingParams {
    fn default() -> Self {
        Self {
            separation_distance: 4.0,
            alignment_distance: 10.0,
            cohesion_distance: 12.0,
            separation_weight: 0.6,
            alignment_weight: 0.02,
            cohesion_weight: 0.01,
            max_speed: 14.0,
            containment_radius: 60.0,
            containment_weight: 0.02,
            avoidance_speed: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fish {
    pub position: Vector3<f32>,
    pub velocity: Vector3<f32>,
}

/// Scales `velocity` down to `max_speed` if it is faster.
pub fn clamp_speed(velocity: Vector3<f32>, max_speed: f32) -> Vector3<f32> {
    let speed = velocity.magnitude();
    if speed > max_speed && speed > 0.0 {
        velocity * (max_speed / speed)
    } else {
        velocity
    }
}

/// A fixed-size group of fish circling around `home`.
#[derive(Debug, Clone, PartialEq)]
pub struct Swarm {
    pub fish: Vec<Fish>,
    pub home: Vector3<f32>,
}

impl Swarm {
    /// `count` fish placed uniformly in a cube of half-size `spread` around `home`, drifting slowly.
    pub fn scatter(count: usize, home: Vector3<f32>, spread: f32, speed: f32, rng: &mut impl Rng) -> Self {
        let mut component = |range: f32| {
            if range > 0.0 { rng.gen_range(-range..=range) } else { 0.0 }
        };
        let fish = (0..count)
            .map(|_| {
                let offset = Vector3::new(component(spread), component(spread), component(spread));
                let velocity = Vector3::new(component(speed), component(speed), component(speed));
                Fish {
                    position: home + offset,
                    velocity,
                }
            })
            .collect();
        Self { fish, home }
    }

    pub fn len(&self) -> usize {
        self.fish.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fish.is_empty()
    }

    /// Applies the three boid rules and containment to every velocity, then clamps it.
    pub fn steer(&mut self, params: &FlockingParams) {
        let snapshot = self.fish.clone();
        for (i, fish) in self.fish.iter_mut().enumerate() {
            let mut separation = Vector3::zero();
            let mut alignment = Vector3::zero();
            let mut aligned = 0usize;
            let mut centroid = Vector3::zero();
            let mut cohesive = 0usize;

            for (j, other) in snapshot.iter().enumerate() {
                if i == j {
                    continue;
                }
                let away = fish.position - other.position;
                let distance = away.magnitude();
                if distance > 0.0 && distance < params.separation_distance {
                    separation += away / distance;
                }
                if distance < params.alignment_distance {
                    alignment += other.velocity;
                    aligned += 1;
                }
                if distance < params.cohesion_distance {
                    centroid += other.position;
                    cohesive += 1;
                }
            }

            let mut velocity = fish.velocity + separation * params.separation_weight;
            if aligned > 0 {
                velocity += alignment / aligned as f32 * params.alignment_weight;
            }
            if cohesive > 0 {
                velocity += (centroid / cohesive as f32 - fish.position) * params.cohesion_weight;
            }

            let to_home = self.home - fish.position;
            let overshoot = to_home.magnitude() - params.containment_radius;
            if overshoot > 0.0 {
                velocity += to_home.normalize() * overshoot * params.containment_weight;
            }

            fish.velocity = clamp_speed(velocity, params.max_speed);
        }
    }

    pub fn integrate(&mut self, dt: f32) {
        for fish in &mut self.fish {
            fish.position += fish.velocity * dt;
        }
    }

    pub fn update(&mut self, params: &FlockingParams, dt: f32) {
        self.steer(params);
        self.integrate(dt);
    }

    pub fn centroid(&self) -> Option<Vector3<f32>> {
        if self.fish.is_empty() {
            return None;
        }
        let sum = self
            .fish
            .iter()
            .fold(Vector3::zero(), |acc, fish| acc + fish.position);
        Some(sum / self.fish.len() as f32)
    }
}

/// Pushes apart every pair of fish from different swarms closer than twice the separation distance.
///
/// Both fish move by `avoidance_speed * dt` along the line between them.
/// Coincident fish have no such line and stay where they are.
pub fn avoid_between(a: &mut Swarm, b: &mut Swarm, params: &FlockingParams, dt: f32) {
    let threshold = 2.0 * params.separation_distance;
    let step = params.avoidance_speed * dt;
    for fa in &mut a.fish {
        for fb in &mut b.fish {
            let apart = fa.position - fb.position;
            let distance = apart.magnitude();
            if distance > 0.0 && distance < threshold {
                let push = apart / distance * step;
                fa.position += push;
                fb.position -= push;
            }
        }
    }
}
