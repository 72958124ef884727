//! Render-time biome color blending
//!
//! Softens hard biome borders for display without touching the world.
//! Each pass widens the neighborhood by one cell and pulls every cell
//! towards the height-weighted mean color of its same-category neighbors,
//! so land colors never bleed into the sea and vice versa.

use image::{ImageBuffer, Rgb, RgbImage};

use crate::biomes::BiomeCategory;
use crate::tilemap::Tilemap;
use crate::world::World;

/// Added to each neighbor's height to form its weight.
const WEIGHT_BIAS: f32 = 1e-3;
/// Weight sums smaller than this leave the cell unchanged.
const MIN_WEIGHT_SUM: f32 = 1e-6;

/// Blend the classified colors of a finished world into an image.
///
/// Pass `s` (1-based) averages over the `(2s+1)²` square around each cell,
/// weighting neighbors by `height + 1e-3`, and mixes the result in with
/// factor `1/(2s)`. Every pass reads the previous pass's colors. With
/// `steps == 0` the classified colors are returned as-is. Cells that were
/// never classified render black and count as land.
pub fn blend_for_render(world: &World, steps: usize) -> RgbImage {
    let cells = world.cells();
    let category = cells.map(|c| {
        c.tile_type
            .map(|t| t.category())
            .unwrap_or(BiomeCategory::Land)
    });
    let heights = cells.map(|c| c.height);

    let mut colors: Tilemap<[f32; 3]> = cells.map(|c| c.color.map(f32::from));
    for step in 1..=steps {
        colors = blend_pass(&colors, &category, &heights, step);
    }

    to_image(&colors)
}

/// One blending pass over a snapshot of the working colors.
fn blend_pass(
    prev: &Tilemap<[f32; 3]>,
    category: &Tilemap<BiomeCategory>,
    heights: &Tilemap<f32>,
    step: usize,
) -> Tilemap<[f32; 3]> {
    let factor = 1.0 / (2.0 * step as f32);
    let mut next = prev.clone();

    for (x, y, out) in next.iter_mut() {
        let own = *category.get(x, y);
        let mut sum = [0.0f32; 3];
        let mut weight_sum = 0.0f32;
        let mut found = false;

        for (nx, ny) in prev.square_neighborhood(x, y, step) {
            if *category.get(nx, ny) != own {
                continue;
            }
            let w = *heights.get(nx, ny) + WEIGHT_BIAS;
            let c = prev.get(nx, ny);
            for i in 0..3 {
                sum[i] += c[i] * w;
            }
            weight_sum += w;
            found = true;
        }

        if !found || weight_sum.abs() < MIN_WEIGHT_SUM {
            continue;
        }

        let current = *prev.get(x, y);
        for i in 0..3 {
            let avg = sum[i] / weight_sum;
            out[i] = (1.0 - factor) * current[i] + factor * avg;
        }
    }

    next
}

fn to_image(colors: &Tilemap<[f32; 3]>) -> RgbImage {
    let mut img: RgbImage = ImageBuffer::new(colors.width as u32, colors.height as u32);
    for (x, y, c) in colors.iter() {
        let px = c.map(|v| v.clamp(0.0, 255.0).round() as u8);
        img.put_pixel(x as u32, y as u32, Rgb(px));
    }
    img
}
