//! Raster output for previews and reports
//!
//! Produces packed RGB8 buffers (row-major, 3 bytes per pixel) that any image
//! library or display surface can consume.

use glam::Vec3;

use crate::image::SourceImage;
use crate::tessellation::Tessellation;

/// Packed RGB8 color
pub type Rgb8 = [u8; 3];

fn to_rgb8(color: Vec3) -> Rgb8 {
    let c = color.round().clamp(Vec3::ZERO, Vec3::splat(255.0));
    [c.x as u8, c.y as u8, c.z as u8]
}

fn pack(image: &SourceImage) -> Vec<u8> {
    image.colors().iter().flat_map(|&c| to_rgb8(c)).collect()
}

/// The source image with every segment edge pixel painted `color`
pub fn boundary_overlay(image: &SourceImage, tessellation: &Tessellation, color: Rgb8) -> Vec<u8> {
    let mut buffer = pack(image);
    let width = image.width() as usize;

    for pixel in tessellation.edge_pixels() {
        let offset = (pixel.y as usize * width + pixel.x as usize) * 3;
        buffer[offset..offset + 3].copy_from_slice(&color);
    }

    buffer
}

/// Every pixel painted with the centroid of its segment
pub fn mean_color_fill(image: &SourceImage, tessellation: &Tessellation) -> Vec<u8> {
    let mut buffer = pack(image);
    let width = image.width() as usize;

    for segment in tessellation.occupied() {
        let Some(centroid) = segment.centroid() else {
            continue;
        };
        let rgb = to_rgb8(centroid);
        for pixel in segment.pixels() {
            let offset = (pixel.y as usize * width + pixel.x as usize) * 3;
            buffer[offset..offset + 3].copy_from_slice(&rgb);
        }
    }

    buffer
}
