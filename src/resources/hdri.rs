//! Radiance `.hdr` panoramas for the background and the chrome reflections.

use anyhow::Context as _;
use image::{ImageFormat, Rgba32FImage, imageops::FilterType};

use crate::{data_structures::texture::Texture, resources::texture::load_binary};

pub fn decode_hdr(bytes: &[u8]) -> anyhow::Result<Rgba32FImage> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Hdr).context("decoding Radiance HDR")?;
    Ok(img.into_rgba32f())
}

/// Downscales the panorama until both sides fit into `max_dimension`, keeping the aspect ratio.
pub fn fit_to_limit(img: Rgba32FImage, max_dimension: u32) -> Rgba32FImage {
    let (width, height) = img.dimensions();
    let longest = width.max(height);
    if longest <= max_dimension || max_dimension == 0 {
        return img;
    }
    let scale = max_dimension as f64 / longest as f64;
    let new_width = ((width as f64 * scale).round() as u32).clamp(1, max_dimension);
    let new_height = ((height as f64 * scale).round() as u32).clamp(1, max_dimension);
    log::info!("Downscaling HDRI from {width}x{height} to {new_width}x{new_height}");
    image::imageops::resize(&img, new_width, new_height, FilterType::Triangle)
}

pub async fn load_hdri(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    max_dimension: u32,
) -> anyhow::Result<Texture> {
    let bytes = load_binary(file_name).await?;
    let img = fit_to_limit(decode_hdr(&bytes)?, max_dimension);
    let (width, height) = img.dimensions();
    Texture::from_hdr_texels(device, queue, img.as_raw(), width, height, file_name)
}
