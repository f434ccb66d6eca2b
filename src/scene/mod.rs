//! The three demo stages and the flows they are made of.
//!
//! Each stage adds flows on top of the previous one:
//!
//! | flow          | Headset | Sharks | Swarm |
//! |---------------|---------|--------|-------|
//! | environment   | x       | x      | x     |
//! | headset       | x       | x      | x     |
//! | sharks        |         | x      | x     |
//! | particles     |         | x      | x     |
//! | swarm         |         |        | x     |
//! | controls      |         | x      | x     |
//! | stats         | x       | x      | x     |

use std::{future::Future, pin::Pin};

use cgmath::Point3;

use crate::{
    config::SceneConfig,
    context::InitContext,
    data_structures::scene_graph::{ContainerNode, SceneNode},
    flow::{self, FlowConsturctor, GraphicsFlow},
    motion::MotionParams,
};

pub mod controls;
pub mod environment;
pub mod headset;
pub mod particles;
pub mod sharks;
pub mod stats;
pub mod swarm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Headset,
    Sharks,
    Swarm,
}

impl Stage {
    pub fn has_sharks(&self) -> bool {
        matches!(self, Stage::Sharks | Stage::Swarm)
    }

    pub fn has_swarm(&self) -> bool {
        matches!(self, Stage::Swarm)
    }
}

/// Everything flows share. The event loop hands it to every hook as `&mut`.
#[derive(Debug, Clone, Default)]
pub struct State {
    pub params: MotionParams,
    /// Centre of the headset bounds, known once the headset has loaded.
    pub focal_point: Option<Point3<f32>>,
}

/// The scene has no custom events.
pub enum SceneEvent {}

type BoxedFlow = Box<dyn GraphicsFlow<State, SceneEvent>>;

fn constructor<F, Fut>(make: F) -> FlowConsturctor<State, SceneEvent>
where
    F: FnOnce(InitContext) -> Fut + 'static,
    Fut: Future<Output = BoxedFlow> + 'static,
{
    Box::new(move |ctx| Box::pin(make(ctx)) as Pin<Box<dyn Future<Output = BoxedFlow>>>)
}

/// Wraps `node` in a root with `count` instances. The subtree grows along so
/// every root instance draws a full copy of it.
pub(crate) fn replicate(mut node: Box<dyn SceneNode>, count: usize) -> ContainerNode {
    let template = node.get_local_transform(0).unwrap_or_default();
    while node.instance_count() < count {
        node.add_instance(template.clone());
    }
    let mut root = ContainerNode::new(count, Vec::new());
    root.add_child(node);
    root
}

pub fn constructors(stage: Stage, config: SceneConfig) -> Vec<FlowConsturctor<State, SceneEvent>> {
    let mut flows = Vec::new();

    let cfg = config.clone();
    flows.push(constructor(move |ctx| async move {
        Box::new(environment::EnvironmentFlow::new(ctx, cfg).await) as BoxedFlow
    }));
    let cfg = config.clone();
    flows.push(constructor(move |ctx| async move {
        Box::new(headset::HeadsetFlow::new(ctx, cfg).await) as BoxedFlow
    }));
    if stage.has_sharks() {
        let cfg = config.clone();
        flows.push(constructor(move |ctx| async move {
            Box::new(sharks::SharkFlow::new(ctx, cfg).await) as BoxedFlow
        }));
        let cfg = config.clone();
        flows.push(constructor(move |ctx| async move {
            Box::new(particles::ParticleFlow::new(ctx, cfg)) as BoxedFlow
        }));
    }
    if stage.has_swarm() {
        let cfg = config.clone();
        flows.push(constructor(move |ctx| async move {
            Box::new(swarm::SwarmFlow::new(ctx, cfg).await) as BoxedFlow
        }));
    }
    if stage.has_sharks() {
        flows.push(constructor(move |ctx| async move {
            Box::new(controls::ControlsFlow::new(ctx, stage)) as BoxedFlow
        }));
    }
    flows.push(constructor(|_| async { Box::new(stats::StatsFlow::default()) as BoxedFlow }));
    flows
}

pub fn run(stage: Stage) -> anyhow::Result<()> {
    log::info!("Starting the {stage:?} stage");
    flow::run(constructors(stage, SceneConfig::default()))
}
