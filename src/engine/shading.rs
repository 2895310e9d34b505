//! Fabric shadow pass
//!
//! Multiplies the template's own shading back over the freshly drawn design so
//! folds and creases of garment photos show through the artwork.

use image::RgbaImage;
use rayon::prelude::*;

/// Default strength of the shadow pass. A tuning value, not a contract.
pub const DEFAULT_SHADOW_OPACITY: f64 = 0.35;

/// Apply the shadow pass over the design footprint.
///
/// * `canvas` - output image the design has already been drawn onto
/// * `base` - the untouched template at the same size as `canvas`
/// * `design` - the transformed design that was drawn
/// * `origin` - where the design's top-left corner landed on the canvas
/// * `opacity` - 0.0 disables the pass, 1.0 is a full multiply
pub fn apply_shadow_pass(
    canvas: &mut RgbaImage,
    base: &RgbaImage,
    design: &RgbaImage,
    origin: (i64, i64),
    opacity: f64,
) {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity == 0.0 {
        return;
    }

    let (width, height) = canvas.dimensions();
    let (design_width, design_height) = design.dimensions();
    let row_len = width as usize * 4;

    // Process rows in parallel using Rayon
    canvas
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let dy = y as i64 - origin.1;
            if dy < 0 || dy >= design_height as i64 || y as u32 >= height {
                return;
            }

            for x in 0..width {
                let dx = x as i64 - origin.0;
                if dx < 0 || dx >= design_width as i64 {
                    continue;
                }

                let coverage = design.get_pixel(dx as u32, dy as u32).0[3] as f64 / 255.0;
                if coverage == 0.0 {
                    continue;
                }

                let shade = base.get_pixel(x, y as u32);
                let strength = opacity * coverage;
                let offset = x as usize * 4;

                for i in 0..3 {
                    let current = row[offset + i] as f64;
                    let multiplied = current * shade.0[i] as f64 / 255.0;
                    row[offset + i] = (current + (multiplied - current) * strength)
                        .round()
                        .clamp(0.0, 255.0) as u8;
                }
            }
        });
}
