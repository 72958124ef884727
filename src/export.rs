//! Writing worlds to disk: PNG rasters and a JSON dataset.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use log::info;
use serde::Serialize;

use crate::biome_blend::blend_for_render;
use crate::biomes::TileType;
use crate::error::ExportError;
use crate::plates::{CrustType, PlateId};
use crate::world::{Stage, World};

fn require_complete(world: &World) -> Result<(), ExportError> {
    if world.is_complete() {
        Ok(())
    } else {
        Err(ExportError::Incomplete(world.stage()))
    }
}

/// Save the blended biome map as a PNG.
pub fn export_blended_map(world: &World, steps: usize, path: impl AsRef<Path>) -> Result<(), ExportError> {
    require_complete(world)?;
    let img = blend_for_render(world, steps);
    img.save(path.as_ref())?;
    info!("wrote blended map ({steps} passes) to {}", path.as_ref().display());
    Ok(())
}

/// Render heights as 8-bit grayscale, black at the lowest cell and white at
/// the highest. A flat world renders black.
pub fn render_heightmap(world: &World) -> GrayImage {
    let heights = world.height_map();
    let mut img: GrayImage = ImageBuffer::new(heights.width as u32, heights.height as u32);
    let (min_h, max_h) = heights.min_max().unwrap_or((0.0, 0.0));
    let range = max_h - min_h;

    for (x, y, &h) in heights.iter() {
        let value = if range > 0.0 {
            ((h - min_h) / range * 255.0).round() as u8
        } else {
            0
        };
        img.put_pixel(x as u32, y as u32, Luma([value]));
    }
    img
}

/// Save the grayscale heightmap as a PNG.
pub fn export_heightmap(world: &World, path: impl AsRef<Path>) -> Result<(), ExportError> {
    if world.stage() < Stage::Terrain {
        return Err(ExportError::Incomplete(world.stage()));
    }
    render_heightmap(world).save(path.as_ref())?;
    info!("wrote heightmap to {}", path.as_ref().display());
    Ok(())
}

/// Stable display color for a plate, spreading hues by the golden ratio.
pub fn plate_color(id: PlateId) -> [u8; 3] {
    let hue = (id.0 as f32 * 0.618_034).fract();
    hsv_to_rgb(hue, 0.55, 0.9)
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [u8; 3] {
    let sector = h * 6.0;
    let i = sector.floor();
    let f = sector - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match i as u32 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    [(r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8]
}

/// Render plate ownership, one color per plate, with boundary cells
/// darkened once boundaries are known.
pub fn render_plate_map(world: &World) -> RgbImage {
    let plate_map = world.plate_map();
    let mut img: RgbImage = ImageBuffer::new(plate_map.width as u32, plate_map.height as u32);

    for (x, y, &id) in plate_map.iter() {
        let base = plate_color(id);
        let color = if world.cell(x, y).is_boundary {
            base.map(|c| c / 2)
        } else {
            base
        };
        img.put_pixel(x as u32, y as u32, Rgb(color));
    }
    img
}

/// Save the plate visualisation as a PNG.
pub fn export_plate_map(world: &World, path: impl AsRef<Path>) -> Result<(), ExportError> {
    render_plate_map(world).save(path.as_ref())?;
    info!("wrote plate map to {}", path.as_ref().display());
    Ok(())
}

/// Per-cell fields of a finished world, row-major.
#[derive(Debug, Serialize)]
pub struct WorldDataset {
    pub width: usize,
    pub height: usize,
    #[serde(rename = "height_m")]
    pub heights: Vec<f32>,
    pub biome: Vec<TileType>,
    pub crust_type: Vec<CrustType>,
    pub moisture: Vec<f32>,
}

impl WorldDataset {
    pub fn from_world(world: &World) -> Result<Self, ExportError> {
        require_complete(world)?;
        let cells = world.cells().as_slice();

        Ok(Self {
            width: world.width,
            height: world.height,
            heights: cells.iter().map(|c| c.height).collect(),
            biome: cells.iter().filter_map(|c| c.tile_type).collect(),
            crust_type: cells.iter().map(|c| c.crust_type).collect(),
            moisture: world.moisture_map().as_slice().to_vec(),
        })
    }
}

/// Write height, biome, crust type and moisture as a JSON dataset.
pub fn export_dataset(world: &World, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let dataset = WorldDataset::from_world(world)?;
    let writer = BufWriter::new(File::create(path.as_ref())?);
    serde_json::to_writer(writer, &dataset)?;
    info!("wrote dataset to {}", path.as_ref().display());
    Ok(())
}
