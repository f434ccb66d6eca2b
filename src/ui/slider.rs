//! Horizontal range sliders bound to one motion parameter each.

use winit::dpi::PhysicalPosition;

use crate::{
    motion::MotionParams,
    ui::{QuadList, Rect},
};

const TRACK_COLOUR: [f32; 4] = [1.0, 1.0, 1.0, 0.25];
const KNOB_COLOUR: [f32; 4] = [1.0, 1.0, 1.0, 0.95];

/// The parameter a slider writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderBinding {
    OrbitRadius,
    OrbitHeight,
    OrbitSpeed,
    WobbleSpeed,
    FishSpeed,
    ParticleStep,
}

impl SliderBinding {
    pub fn get(&self, params: &MotionParams) -> f32 {
        match self {
            Self::OrbitRadius => params.orbit.radius,
            Self::OrbitHeight => params.orbit.height,
            Self::OrbitSpeed => params.orbit.outer_speed,
            Self::WobbleSpeed => params.orbit.wobble_speed,
            Self::FishSpeed => params.flocking.max_speed,
            Self::ParticleStep => params.particles.step,
        }
    }

    /// Fill colour of the bar, unique per binding.
    pub fn colour(&self) -> [f32; 4] {
        match self {
            Self::OrbitRadius => [0.35, 0.75, 1.0, 0.8],
            Self::OrbitHeight => [0.3, 0.9, 0.55, 0.8],
            Self::OrbitSpeed => [1.0, 0.8, 0.3, 0.8],
            Self::WobbleSpeed => [0.95, 0.45, 0.8, 0.8],
            Self::FishSpeed => [1.0, 0.5, 0.3, 0.8],
            Self::ParticleStep => [0.7, 0.6, 1.0, 0.8],
        }
    }

    pub fn set(&self, params: &mut MotionParams, value: f32) {
        let target = match self {
            Self::OrbitRadius => &mut params.orbit.radius,
            Self::OrbitHeight => &mut params.orbit.height,
            Self::OrbitSpeed => &mut params.orbit.outer_speed,
            Self::WobbleSpeed => &mut params.orbit.wobble_speed,
            Self::FishSpeed => &mut params.flocking.max_speed,
            Self::ParticleStep => &mut params.particles.step,
        };
        *target = value;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slider {
    pub label: &'static str,
    pub binding: SliderBinding,
    pub min: f32,
    pub max: f32,
    pub track: Rect,
}

impl Slider {
    pub fn new(label: &'static str, binding: SliderBinding, min: f32, max: f32, track: Rect) -> Self {
        Self {
            label,
            binding,
            min: min.min(max),
            max: max.max(min),
            track,
        }
    }

    /// Maps a cursor x coordinate onto `[min, max]`. Positions outside the track clamp to the ends.
    pub fn value_at(&self, x: f64) -> f32 {
        let t = if self.track.width > 0.0 {
            ((x as f32 - self.track.x) / self.track.width).clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.min + t * (self.max - self.min)
    }

    /// Where `value` sits on the track, from 0 to 1.
    pub fn fraction_of(&self, value: f32) -> f32 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }

    /// The track plus some slack so thin tracks are easy to grab.
    pub fn hit(&self, pos: PhysicalPosition<f64>) -> bool {
        self.track.inflate(6.0).contains(pos)
    }

    pub fn drag_to(&self, params: &mut MotionParams, x: f64) {
        let value = self.value_at(x);
        log::debug!("{} = {value:.3}", self.label);
        self.binding.set(params, value);
    }

    pub fn draw(&self, params: &MotionParams, quads: &mut QuadList, screen: [f32; 2]) {
        let fraction = self.fraction_of(self.binding.get(params));
        let track = self.track;
        quads.push_rect(track, TRACK_COLOUR, screen);
        quads.push_rect(
            Rect::new(track.x, track.y, track.width * fraction, track.height),
            self.binding.colour(),
            screen,
        );
        let knob_x = track.x + track.width * fraction;
        quads.push_square([knob_x, track.y + track.height / 2.0], track.height, KNOB_COLOUR, screen);
    }
}

/// The sliders of the shark and swarm stages, stacked in the top left corner.
pub fn default_sliders(with_swarm: bool) -> Vec<Slider> {
    let mut specs = vec![
        ("orbit radius", SliderBinding::OrbitRadius, 50.0, 300.0),
        ("orbit height", SliderBinding::OrbitHeight, -100.0, 150.0),
        ("orbit speed", SliderBinding::OrbitSpeed, 0.0, 1.0),
        ("wobble speed", SliderBinding::WobbleSpeed, 0.0, 5.0),
        ("particle jitter", SliderBinding::ParticleStep, 0.0, 2.0),
    ];
    if with_swarm {
        specs.push(("fish speed", SliderBinding::FishSpeed, 1.0, 40.0));
    }
    specs
        .into_iter()
        .enumerate()
        .map(|(i, (label, binding, min, max))| {
            Slider::new(label, binding, min, max, Rect::new(20.0, 24.0 + i as f32 * 28.0, 220.0, 8.0))
        })
        .collect()
}
