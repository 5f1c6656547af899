//! Frame sampling helpers
//!
//! Crops and averages regions of a captured screenshot.

use image::RgbaImage;

use super::{Region, VisionError};

/// Check that a region fits the frame before sampling it
fn check_bounds(frame: &RgbaImage, region: Region) -> Result<(), VisionError> {
    let (width, height) = frame.dimensions();
    if region.fits(width, height) {
        Ok(())
    } else {
        Err(VisionError::RegionOutOfBounds {
            region,
            width,
            height,
        })
    }
}

/// Extract a region of the frame
pub fn crop(frame: &RgbaImage, region: Region) -> Result<RgbaImage, VisionError> {
    check_bounds(frame, region)?;
    let sub_image = image::imageops::crop_imm(frame, region.x, region.y, region.width, region.height);
    Ok(sub_image.to_image())
}

/// Mean RGB color of a region
pub fn average_color(frame: &RgbaImage, region: Region) -> Result<[f32; 3], VisionError> {
    check_bounds(frame, region)?;

    let mut sum = [0u64; 3];
    for y in region.y..region.y + region.height {
        for x in region.x..region.x + region.width {
            let pixel = frame.get_pixel(x, y);
            sum[0] += pixel[0] as u64;
            sum[1] += pixel[1] as u64;
            sum[2] += pixel[2] as u64;
        }
    }

    let count = (region.width as u64 * region.height as u64) as f32;
    Ok([
        sum[0] as f32 / count,
        sum[1] as f32 / count,
        sum[2] as f32 / count,
    ])
}

/// Check if two colors match within tolerance on every channel
pub fn color_similar(a: [f32; 3], b: [f32; 3], tolerance: u8) -> bool {
    a.iter()
        .zip(b.iter())
        .all(|(x, y)| (x - y).abs() <= tolerance as f32)
}
