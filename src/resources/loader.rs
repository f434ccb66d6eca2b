//! Callback-style asset loading used by the flow constructors.
//!
//! Every load reports progress per fetched file and ends in exactly one of
//! `on_load` or `on_error`. Failures are not retried.

use crate::{
    context::InitContext,
    data_structures::{scene_graph::SceneNode, texture::Texture},
    resources::{hdri, load_model_gltf},
};

/// Files fetched so far out of the files a load needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub loaded: usize,
    pub total: usize,
}

impl Progress {
    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            return 100.0;
        }
        self.loaded as f32 / self.total as f32 * 100.0
    }
}

/// Hands a finished load to the matching callback.
pub fn settle<V, T>(
    result: anyhow::Result<V>,
    on_load: impl FnOnce(V) -> T,
    on_error: impl FnOnce(anyhow::Error),
) -> Option<T> {
    match result {
        Ok(value) => Some(on_load(value)),
        Err(e) => {
            on_error(e);
            None
        }
    }
}

/// Logs the percentage of `file_name` that has arrived.
pub fn log_progress(file_name: &str) -> impl FnMut(Progress) + '_ {
    move |progress| log::info!("{file_name}: {:.0}% loaded", progress.percent())
}

pub fn log_error(file_name: &str) -> impl FnOnce(anyhow::Error) + '_ {
    move |e| log::error!("Failed to load {file_name}: {e:#}")
}

#[derive(Debug, Clone)]
pub struct AssetLoader {
    ctx: InitContext,
}

impl AssetLoader {
    pub fn new(ctx: InitContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &InitContext {
        &self.ctx
    }

    pub async fn load_gltf<T>(
        &self,
        file_name: &str,
        on_load: impl FnOnce(Box<dyn SceneNode>) -> T,
        mut on_progress: impl FnMut(Progress),
        on_error: impl FnOnce(anyhow::Error),
    ) -> Option<T> {
        let result = load_model_gltf(
            file_name,
            &self.ctx.device,
            &self.ctx.queue,
            &self.ctx.material_layout,
            &mut on_progress,
        )
        .await;
        settle(result, on_load, on_error)
    }

    /// The panorama is shrunk to the largest texture the device accepts.
    pub async fn load_hdri<T>(
        &self,
        file_name: &str,
        on_load: impl FnOnce(Texture) -> T,
        mut on_progress: impl FnMut(Progress),
        on_error: impl FnOnce(anyhow::Error),
    ) -> Option<T> {
        let result = hdri::load_hdri(file_name, &self.ctx.device, &self.ctx.queue, self.ctx.max_texture_dimension)
            .await
            .inspect(|_| on_progress(Progress { loaded: 1, total: 1 }));
        settle(result, on_load, on_error)
    }
}
