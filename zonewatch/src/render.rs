//! Canvas rendering: perspective warp, measurement grid, zone outlines, and
//! track markers
//!
//! The warp walks output rows in parallel and pulls each canvas pixel from
//! the camera frame through the inverse homography with bilinear sampling.
//! Canvas pixels whose source falls outside the frame stay black.

use crate::calibration::Calibration;
use crate::types::Frame;
use image::Rgb;
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut};
use rayon::prelude::*;

pub const GRID_COLOR: Rgb<u8> = Rgb([128, 128, 128]);
pub const ZONE_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
pub const MARKER_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const MARKER_HIT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const PREDICTED_COLOR: Rgb<u8> = Rgb([255, 165, 0]);

const MARKER_RADIUS: i32 = 6;

/// Warp the camera frame into the top-down canvas defined by `calibration`
pub fn warp_frame(frame: &Frame, calibration: &Calibration) -> Frame {
    let width = calibration.output_width;
    let height = calibration.output_height;
    let row_stride = width as usize * 3;

    let mut pixels = vec![0u8; row_stride * height as usize];
    pixels
        .par_chunks_mut(row_stride)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..width as usize {
                let src = calibration.inverse.apply((x as f64, y as f64));
                if let Some(rgb) = bilinear_sample(frame, src.0, src.1) {
                    row[x * 3..x * 3 + 3].copy_from_slice(&rgb);
                }
            }
        });

    // Buffer length matches the dimensions by construction.
    Frame::from_raw(width, height, pixels).unwrap_or_else(|| Frame::new(width, height))
}

/// Bilinear sample at fractional pixel coordinates; `None` outside the frame
fn bilinear_sample(frame: &Frame, x: f64, y: f64) -> Option<[u8; 3]> {
    if !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 {
        return None;
    }
    let max_x = frame.width() as f64 - 1.0;
    let max_y = frame.height() as f64 - 1.0;
    if x > max_x || y > max_y {
        return None;
    }

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(frame.width() - 1);
    let y1 = (y0 + 1).min(frame.height() - 1);
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = frame.get_pixel(x0, y0).0;
    let p10 = frame.get_pixel(x1, y0).0;
    let p01 = frame.get_pixel(x0, y1).0;
    let p11 = frame.get_pixel(x1, y1).0;

    let mut out = [0u8; 3];
    for c in 0..3 {
        let top = p00[c] as f64 * (1.0 - fx) + p10[c] as f64 * fx;
        let bottom = p01[c] as f64 * (1.0 - fx) + p11[c] as f64 * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round() as u8;
    }
    Some(out)
}

/// Overlay the measurement grid at `spacing` pixels per cell
pub fn draw_grid(canvas: &mut Frame, spacing: u32) {
    if spacing == 0 {
        return;
    }
    let w = canvas.width() as f32;
    let h = canvas.height() as f32;
    for x in (0..canvas.width()).step_by(spacing as usize) {
        draw_line_segment_mut(canvas, (x as f32, 0.0), (x as f32, h - 1.0), GRID_COLOR);
    }
    for y in (0..canvas.height()).step_by(spacing as usize) {
        draw_line_segment_mut(canvas, (0.0, y as f32), (w - 1.0, y as f32), GRID_COLOR);
    }
}

/// Translucent fill over every zone's interior. Works on the closed rings
/// as stored; the closing vertex is trimmed for the containment test.
pub fn draw_zone_fill(canvas: &mut Frame, zones: &[Vec<(f64, f64)>]) {
    const ALPHA: f64 = 0.25;
    for ring in zones {
        if ring.len() < 4 {
            continue;
        }
        let interior = &ring[..ring.len() - 1];
        let min_x = interior.iter().map(|p| p.0).fold(f64::MAX, f64::min).max(0.0) as u32;
        let min_y = interior.iter().map(|p| p.1).fold(f64::MAX, f64::min).max(0.0) as u32;
        let max_x = (interior.iter().map(|p| p.0).fold(f64::MIN, f64::max) as u32)
            .min(canvas.width().saturating_sub(1));
        let max_y = (interior.iter().map(|p| p.1).fold(f64::MIN, f64::max) as u32)
            .min(canvas.height().saturating_sub(1));

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                if floormap::point_in_polygon((x as f64, y as f64), interior) {
                    let pixel = canvas.get_pixel_mut(x, y);
                    for c in 0..3 {
                        let blended =
                            pixel[c] as f64 * (1.0 - ALPHA) + ZONE_COLOR.0[c] as f64 * ALPHA;
                        pixel[c] = blended.round() as u8;
                    }
                }
            }
        }
    }
}

/// Outline every zone ring. Rings are stored closed, so drawing consecutive
/// segments traces the full polygon.
pub fn draw_zone_outlines(canvas: &mut Frame, zones: &[Vec<(f64, f64)>]) {
    for ring in zones {
        for pair in ring.windows(2) {
            draw_line_segment_mut(
                canvas,
                (pair[0].0 as f32, pair[0].1 as f32),
                (pair[1].0 as f32, pair[1].1 as f32),
                ZONE_COLOR,
            );
        }
    }
}

/// Draw the current-position marker (filled) and, when available, the
/// predicted-position marker (hollow) with a connecting line. Intrusions
/// recolor the corresponding marker.
pub fn draw_track_marker(
    canvas: &mut Frame,
    current: (f64, f64),
    predicted: Option<(f64, f64)>,
    hit: bool,
    predicted_hit: bool,
) {
    let current_px = (current.0.round() as i32, current.1.round() as i32);

    if let Some(pred) = predicted {
        draw_line_segment_mut(
            canvas,
            (current.0 as f32, current.1 as f32),
            (pred.0 as f32, pred.1 as f32),
            PREDICTED_COLOR,
        );
        let pred_px = (pred.0.round() as i32, pred.1.round() as i32);
        let color = if predicted_hit {
            MARKER_HIT_COLOR
        } else {
            PREDICTED_COLOR
        };
        draw_hollow_circle_mut(canvas, pred_px, MARKER_RADIUS, color);
    }

    let color = if hit { MARKER_HIT_COLOR } else { MARKER_COLOR };
    draw_filled_circle_mut(canvas, current_px, MARKER_RADIUS, color);
}
