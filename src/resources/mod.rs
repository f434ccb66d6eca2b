//! Loading meshes, textures, animations and the HDRI from external files.
//!
//! - `loader` the callback-style entry point flows use
//! - `hdri` decodes the Radiance panorama
//! - `animation` keyframe sampling and playback
//! - `texture` file access and the material bind group layout

use std::collections::{HashMap, HashSet};

use anyhow::{Context as _, bail};

use crate::{
    data_structures::{
        model::Material,
        scene_graph::{AnimationClip, ContainerNode, SceneNode, to_scene_node},
        texture::Texture,
    },
    resources::{animation::Keyframes, loader::Progress, texture::load_binary},
};

pub mod animation;
pub mod hdri;
pub mod loader;
pub mod texture;

const DRACO_EXTENSION: &str = "KHR_draco_mesh_compression";

/// Parses a GLTF/GLB document and rejects files this importer cannot decode.
pub fn parse_document(bytes: &[u8]) -> anyhow::Result<gltf::Gltf> {
    let unchecked = gltf::Gltf::from_slice_without_validation(bytes).context("not a GLTF document")?;
    if unchecked.extensions_required().any(|ext| ext == DRACO_EXTENSION) {
        bail!("{DRACO_EXTENSION} is required but Draco decoding is not supported");
    }
    Ok(gltf::Gltf::from_slice(bytes)?)
}

/// Number of files a document needs: itself, its external buffers and the
/// distinct external images some material uses as base colour.
pub fn file_count(gltf: &gltf::Gltf) -> usize {
    let buffers = gltf
        .buffers()
        .filter(|b| matches!(b.source(), gltf::buffer::Source::Uri(_)))
        .count();
    let images: HashSet<usize> = gltf
        .materials()
        .filter_map(|m| m.pbr_metallic_roughness().base_color_texture())
        .map(|info| info.texture().source())
        .filter(|image| matches!(image.source(), gltf::image::Source::Uri { .. }))
        .map(|image| image.index())
        .collect();
    1 + buffers + images.len()
}

/// Resolves a URI inside a GLTF file relative to the directory of that file.
pub fn resolve_uri(document: &str, uri: &str) -> anyhow::Result<String> {
    if uri.starts_with("data:") {
        bail!("embedded data URIs are not supported ({document})");
    }
    let uri = uri.replace("%20", " ");
    Ok(match document.rfind('/') {
        Some(idx) => format!("{}/{uri}", &document[..idx]),
        None => uri,
    })
}

fn read_animations(gltf: &gltf::Gltf, buffer_data: &[Vec<u8>]) -> HashMap<usize, Vec<AnimationClip>> {
    let mut animations: HashMap<usize, Vec<AnimationClip>> = HashMap::new();
    for animation in gltf.animations() {
        let name = animation.name().unwrap_or("Default").to_string();
        for channel in animation.channels() {
            let reader = channel.reader(|buffer| buffer_data.get(buffer.index()).map(Vec::as_slice));
            let timestamps: Vec<f32> = match reader.read_inputs() {
                Some(inputs) => inputs.collect(),
                None => {
                    log::warn!("No timestamps in channel {} of {name}", channel.index());
                    continue;
                }
            };
            let keyframes = match reader.read_outputs() {
                Some(gltf::animation::util::ReadOutputs::Translations(t)) => {
                    Keyframes::Translation(t.map(Into::into).collect())
                }
                Some(gltf::animation::util::ReadOutputs::Rotations(r)) => Keyframes::Rotation(
                    r.into_f32()
                        .map(|[x, y, z, w]| cgmath::Quaternion::new(w, x, y, z))
                        .collect(),
                ),
                Some(gltf::animation::util::ReadOutputs::Scales(s)) => Keyframes::Scale(s.map(Into::into).collect()),
                Some(gltf::animation::util::ReadOutputs::MorphTargetWeights(_)) | None => Keyframes::Other,
            };
            animations
                .entry(channel.target().node().index())
                .or_default()
                .push(AnimationClip {
                    name: name.clone(),
                    keyframes,
                    timestamps,
                });
        }
    }
    animations
}

async fn read_image(
    file_name: &str,
    image: gltf::Image<'_>,
    buffer_data: &[Vec<u8>],
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    progress: &mut dyn FnMut(Progress),
    loaded: &mut Progress,
) -> anyhow::Result<Texture> {
    match image.source() {
        gltf::image::Source::View { view, mime_type } => {
            let buffer = buffer_data
                .get(view.buffer().index())
                .context("image references a missing buffer")?;
            let bytes = buffer
                .get(view.offset()..view.offset() + view.length())
                .context("image buffer view out of range")?;
            Texture::from_bytes(device, queue, bytes, file_name, mime_type.split('/').next_back())
        }
        gltf::image::Source::Uri { uri, mime_type } => {
            let path = resolve_uri(file_name, uri)?;
            let bytes = load_binary(&path).await?;
            loaded.loaded += 1;
            progress(*loaded);
            let format = mime_type
                .and_then(|mt| mt.split('/').next_back())
                .or_else(|| path.rsplit('.').next());
            Texture::from_bytes(device, queue, &bytes, &path, format)
        }
    }
}

/// Loads a GLTF file into a scene subtree.
///
/// Materials keep their base colour factor and texture; a plain white default
/// material is appended last for primitives without one. `progress` is called
/// once per fetched file.
pub async fn load_model_gltf(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    material_layout: &wgpu::BindGroupLayout,
    progress: &mut dyn FnMut(Progress),
) -> anyhow::Result<Box<dyn SceneNode>> {
    let bytes = load_binary(file_name).await?;
    let gltf = parse_document(&bytes).with_context(|| format!("parsing {file_name}"))?;
    let mut loaded = Progress {
        loaded: 1,
        total: file_count(&gltf),
    };
    progress(loaded);

    // Load buffers
    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                let blob = gltf.blob.as_deref().context("GLB buffer without binary chunk")?;
                buffer_data.push(blob.to_vec());
            }
            gltf::buffer::Source::Uri(uri) => {
                let bin = load_binary(&resolve_uri(file_name, uri)?).await?;
                buffer_data.push(bin);
                loaded.loaded += 1;
                progress(loaded);
            }
        }
    }

    let animations = read_animations(&gltf, &buffer_data);

    // Each image is decoded once even if several materials share it
    let mut textures: HashMap<usize, Texture> = HashMap::new();
    let mut materials = Vec::new();
    for material in gltf.materials() {
        let pbr = material.pbr_metallic_roughness();
        let diffuse_texture = match pbr.base_color_texture() {
            Some(info) => {
                let image = info.texture().source();
                let idx = image.index();
                match textures.get(&idx) {
                    Some(texture) => texture.clone(),
                    None => {
                        let texture =
                            read_image(file_name, image, &buffer_data, device, queue, progress, &mut loaded).await?;
                        textures.insert(idx, texture.clone());
                        texture
                    }
                }
            }
            None => Texture::create_solid(device, queue, [255; 4], "white"),
        };
        let name = material.name().unwrap_or("material");
        materials.push(Material::new(
            device,
            &format!("{file_name}:{name}"),
            diffuse_texture,
            pbr.base_color_factor(),
            false,
            material_layout,
        ));
    }
    materials.push(Material::new(
        device,
        &format!("{file_name}:default"),
        Texture::create_solid(device, queue, [255; 4], "white"),
        [1.0; 4],
        false,
        material_layout,
    ));

    let scene = gltf
        .default_scene()
        .or_else(|| gltf.scenes().next())
        .context("the document contains no scene")?;
    let mut models: Vec<Box<dyn SceneNode>> = scene
        .nodes()
        .map(|node| to_scene_node(node, &buffer_data, device, &materials, &animations))
        .collect();

    let mut root_node = if models.len() == 1 {
        models.remove(0)
    } else {
        let mut root_node = ContainerNode::new(1, Vec::new());
        root_node.children = models;
        Box::new(root_node)
    };
    root_node.update_world_transform_all();
    log::info!("Loaded {file_name}");

    Ok(root_node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uris_resolve_next_to_the_document() {
        assert_eq!(resolve_uri("models/shark.gltf", "shark.bin").unwrap(), "models/shark.bin");
        assert_eq!(resolve_uri("shark.gltf", "tex/skin%20a.png").unwrap(), "tex/skin a.png");
        assert!(resolve_uri("shark.gltf", "data:application/octet-stream;base64,AAAA").is_err());
    }

    #[test]
    fn minimal_document_counts_itself() {
        let gltf = parse_document(br#"{"asset":{"version":"2.0"}}"#).unwrap();
        assert_eq!(file_count(&gltf), 1);
    }
}
