//! Overlay rendering for annotated frames
//!
//! Color overlay: every target detection gets its box and a center dot. The
//! distance label is drawn only when the projection located depth.
//!
//! Depth overlay: known samples min/max normalised through a jet colormap,
//! unknown samples black, with a marker at every projected depth pixel.

use std::ops::RangeInclusive;

use contracts::{AnnotatedFrame, DepthFrame};
use image::{Rgb, RgbImage};

use crate::error::DispatcherError;

pub const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const CENTER_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
pub const LABEL_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const DEPTH_MARKER_COLOR: Rgb<u8> = Rgb([255, 255, 0]);

const LINE_WIDTH: i64 = 2;
const DOT_RADIUS: i64 = 5;
const MARKER_HALF_SIZE: i64 = 10;

const GLYPH_ROWS: usize = 7;
const GLYPH_COLS: i64 = 5;
const GLYPH_SCALE: i64 = 2;
const GLYPH_ADVANCE: i64 = (GLYPH_COLS + 1) * GLYPH_SCALE;

/// Text drawn next to a located detection
pub fn distance_label(meters: f32) -> String {
    format!("{meters:.2}m")
}

/// Draw boxes, center dots and distance labels over the color image.
///
/// # Errors
/// The color payload is shorter than its declared geometry.
pub fn render_annotated(frame: &AnnotatedFrame) -> Result<RgbImage, DispatcherError> {
    let color = &frame.color;
    let mut image = RgbImage::from_raw(color.width, color.height, color.to_rgb()).ok_or_else(|| {
        DispatcherError::render(
            frame.frame_id,
            format!(
                "payload of {} bytes does not fill {}x{}",
                color.data.len(),
                color.width,
                color.height
            ),
        )
    })?;

    for c in &frame.correlations {
        let (x1, y1, x2, y2) = c.detection.corners();
        draw_rectangle(&mut image, x1, y1, x2, y2, BOX_COLOR);
        fill_circle(&mut image, c.center.0, c.center.1, DOT_RADIUS, CENTER_COLOR);

        if let Some(distance) = c.projection.distance() {
            // Baseline sits 10 px above the bottom edge, 60 px left of the right edge
            let top = y2.saturating_sub(10 + text_height());
            let left = x2.saturating_sub(60);
            draw_text(&mut image, left, top, &distance_label(distance), LABEL_COLOR);
        }
    }

    Ok(image)
}

/// Colorized depth snapshot with markers, `None` when the frame had no depth
pub fn render_depth(frame: &AnnotatedFrame) -> Option<RgbImage> {
    let depth = frame.depth.as_deref()?;
    let mut image = colorize_depth(depth);

    for c in &frame.correlations {
        let (Some((dx, dy)), Some(distance)) = (c.projection.depth_pixel(), c.projection.distance())
        else {
            continue;
        };
        draw_rectangle(
            &mut image,
            dx - MARKER_HALF_SIZE,
            dy - MARKER_HALF_SIZE,
            dx + MARKER_HALF_SIZE,
            dy + MARKER_HALF_SIZE,
            DEPTH_MARKER_COLOR,
        );
        fill_circle(&mut image, dx, dy, DOT_RADIUS, CENTER_COLOR);
        draw_text(
            &mut image,
            dx,
            dy - 10 - text_height(),
            &distance_label(distance),
            DEPTH_MARKER_COLOR,
        );
    }

    Some(image)
}

/// Jet colormap over the known depth range
pub fn colorize_depth(depth: &DepthFrame) -> RgbImage {
    let (lo, hi) = depth.depth_range().unwrap_or((0.0, 0.0));
    let span = hi - lo;
    let samples = depth.samples();
    let width = depth.width as usize;

    RgbImage::from_fn(depth.width, depth.height, |x, y| {
        let d = samples
            .get(y as usize * width + x as usize)
            .copied()
            .unwrap_or(0.0);
        if d <= 0.0 {
            return Rgb([0, 0, 0]);
        }
        let v = if span > 0.0 { (d - lo) / span } else { 0.5 };
        jet(v)
    })
}

/// Jet colormap: dark blue at 0, through cyan, yellow, to dark red at 1
pub fn jet(v: f32) -> Rgb<u8> {
    let v = v.clamp(0.0, 1.0);
    let channel =
        |peak: f32| ((1.5 - (4.0 * v - peak).abs()).clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgb([channel(3.0), channel(2.0), channel(1.0)])
}

fn put(image: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x < 0 || y < 0 || x >= image.width() as i64 || y >= image.height() as i64 {
        return;
    }
    image.put_pixel(x as u32, y as u32, color);
}

/// Part of `lo..=hi` inside `0..len`, `None` when they do not overlap
fn visible(lo: i64, hi: i64, len: u32) -> Option<RangeInclusive<i64>> {
    let lo = lo.max(0);
    let hi = hi.min(i64::from(len) - 1);
    (lo <= hi).then_some(lo..=hi)
}

fn fill_rect(image: &mut RgbImage, x1: i64, y1: i64, x2: i64, y2: i64, color: Rgb<u8>) {
    let (Some(xs), Some(ys)) = (
        visible(x1, x2, image.width()),
        visible(y1, y2, image.height()),
    ) else {
        return;
    };
    for y in ys {
        for x in xs.clone() {
            image.put_pixel(x as u32, y as u32, color);
        }
    }
}

fn draw_rectangle(image: &mut RgbImage, x1: i64, y1: i64, x2: i64, y2: i64, color: Rgb<u8>) {
    let (left, right) = (x1.min(x2), x1.max(x2));
    let (top, bottom) = (y1.min(y2), y1.max(y2));
    let inset = LINE_WIDTH - 1;

    fill_rect(image, left, top, right, top.saturating_add(inset), color);
    fill_rect(image, left, bottom.saturating_sub(inset), right, bottom, color);
    fill_rect(image, left, top, left.saturating_add(inset), bottom, color);
    fill_rect(image, right.saturating_sub(inset), top, right, bottom, color);
}

fn fill_circle(image: &mut RgbImage, cx: i64, cy: i64, radius: i64, color: Rgb<u8>) {
    let (Some(xs), Some(ys)) = (
        visible(cx.saturating_sub(radius), cx.saturating_add(radius), image.width()),
        visible(cy.saturating_sub(radius), cy.saturating_add(radius), image.height()),
    ) else {
        return;
    };
    for y in ys {
        let dy = y - cy;
        for x in xs.clone() {
            let dx = x - cx;
            if dx * dx + dy * dy <= radius * radius {
                image.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

fn text_height() -> i64 {
    GLYPH_ROWS as i64 * GLYPH_SCALE
}

fn draw_text(image: &mut RgbImage, x: i64, y: i64, text: &str, color: Rgb<u8>) {
    if visible(y, y.saturating_add(text_height() - 1), image.height()).is_none() {
        return;
    }
    let width = i64::from(image.width());

    for (i, ch) in text.chars().enumerate() {
        let origin_x = x.saturating_add(i as i64 * GLYPH_ADVANCE);
        if origin_x >= width {
            break;
        }
        if origin_x.saturating_add(GLYPH_ADVANCE) <= 0 {
            continue;
        }
        let Some(rows) = glyph(ch.to_ascii_uppercase()) else {
            continue;
        };
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_COLS {
                if (bits >> (GLYPH_COLS - 1 - col)) & 1 == 0 {
                    continue;
                }
                let px = origin_x + col * GLYPH_SCALE;
                let py = y + row as i64 * GLYPH_SCALE;
                for sy in 0..GLYPH_SCALE {
                    for sx in 0..GLYPH_SCALE {
                        put(image, px + sx, py + sy, color);
                    }
                }
            }
        }
    }
}

/// 5x7 bitmaps, one row per byte, most significant of the low 5 bits on the left
fn glyph(ch: char) -> Option<[u8; GLYPH_ROWS]> {
    let rows = match ch {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1E, 0x01, 0x01, 0x0E, 0x01, 0x01, 0x1E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        ' ' => [0x00; GLYPH_ROWS],
        _ => return None,
    };
    Some(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{annotated_frame, correlation};
    use contracts::{Correlation, ProjectionResult};

    fn count_color(image: &RgbImage, color: Rgb<u8>) -> usize {
        image.pixels().filter(|p| **p == color).count()
    }

    #[test]
    fn test_distance_label_format() {
        assert_eq!(distance_label(1.5), "1.50m");
        assert_eq!(distance_label(0.126), "0.13m");
    }

    #[test]
    fn test_box_and_dot_drawn() {
        let frame = annotated_frame(1, vec![correlation(ProjectionResult::NoDepth)], None);
        let image = render_annotated(&frame).unwrap();

        // Box corners (20, 10) and (60, 40), center (40, 25)
        assert_eq!(*image.get_pixel(20, 10), BOX_COLOR);
        assert_eq!(*image.get_pixel(59, 39), BOX_COLOR);
        assert_eq!(*image.get_pixel(40, 25), CENTER_COLOR);
        assert_eq!(*image.get_pixel(40, 12), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_label_only_when_located() {
        let no_depth = annotated_frame(1, vec![correlation(ProjectionResult::NoDepth)], None);
        let image = render_annotated(&no_depth).unwrap();
        assert_eq!(count_color(&image, LABEL_COLOR), 0);

        let located = annotated_frame(
            2,
            vec![correlation(ProjectionResult::Located {
                depth_pixel_x: 5,
                depth_pixel_y: 6,
                distance_meters: 1.25,
            })],
            None,
        );
        let image = render_annotated(&located).unwrap();
        assert!(count_color(&image, LABEL_COLOR) > 0);
    }

    fn far_box(x1: f32, y1: f32, x2: f32, y2: f32, projection: ProjectionResult) -> Correlation {
        let mut c = correlation(projection);
        c.detection.x1 = x1;
        c.detection.y1 = y1;
        c.detection.x2 = x2;
        c.detection.y2 = y2;
        c.center = c.detection.center();
        c
    }

    #[test]
    fn test_box_past_frame_edges_is_clipped() {
        let located = ProjectionResult::Located {
            depth_pixel_x: 5,
            depth_pixel_y: 6,
            distance_meters: 1.25,
        };
        let frame = annotated_frame(3, vec![far_box(20.0, 10.0, 2e9, 2e9, located)], None);
        let image = render_annotated(&frame).unwrap();

        // Top and left edges stay visible, right/bottom edges, dot and label are off-frame
        assert_eq!(*image.get_pixel(79, 10), BOX_COLOR);
        assert_eq!(*image.get_pixel(79, 11), BOX_COLOR);
        assert_eq!(*image.get_pixel(20, 59), BOX_COLOR);
        assert_eq!(*image.get_pixel(21, 59), BOX_COLOR);
        assert_eq!(*image.get_pixel(79, 59), Rgb([0, 0, 0]));
        assert_eq!(count_color(&image, CENTER_COLOR), 0);
        assert_eq!(count_color(&image, LABEL_COLOR), 0);
    }

    #[test]
    fn test_box_with_negative_far_corner() {
        let frame = annotated_frame(
            4,
            vec![far_box(-2e9, -2e9, 30.0, 20.0, ProjectionResult::NoDepth)],
            None,
        );
        let image = render_annotated(&frame).unwrap();

        assert_eq!(*image.get_pixel(0, 20), BOX_COLOR);
        assert_eq!(*image.get_pixel(30, 0), BOX_COLOR);
        assert_eq!(*image.get_pixel(29, 19), BOX_COLOR);
        assert_eq!(*image.get_pixel(10, 10), Rgb([0, 0, 0]));
        assert_eq!(*image.get_pixel(31, 20), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_box_entirely_outside_draws_nothing() {
        let frame = annotated_frame(
            5,
            vec![far_box(
                f32::INFINITY,
                1e19,
                f32::INFINITY,
                1e19,
                ProjectionResult::Located {
                    depth_pixel_x: 0,
                    depth_pixel_y: 0,
                    distance_meters: 2.0,
                },
            )],
            None,
        );
        let image = render_annotated(&frame).unwrap();
        assert!(image.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }

    #[test]
    fn test_short_payload_is_render_error() {
        let mut frame = annotated_frame(9, vec![], None);
        frame.color.data = frame.color.data.slice(0..10);
        assert!(matches!(
            render_annotated(&frame),
            Err(DispatcherError::Render { frame_id: 9, .. })
        ));
    }

    #[test]
    fn test_jet_endpoints() {
        assert_eq!(jet(0.0), Rgb([0, 0, 128]));
        assert_eq!(jet(0.5), Rgb([128, 255, 128]));
        assert_eq!(jet(1.0), Rgb([128, 0, 0]));
        assert_eq!(jet(7.0), jet(1.0));
    }

    #[test]
    fn test_colorize_depth_unknown_is_black() {
        let depth = contracts::DepthFrame::from_meters(
            3,
            1,
            contracts::DepthEncoding::Float32Meters,
            0.0,
            None,
            vec![0.0, 1.0, 3.0],
        )
        .unwrap();
        let image = colorize_depth(&depth);
        assert_eq!(*image.get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_eq!(*image.get_pixel(1, 0), jet(0.0));
        assert_eq!(*image.get_pixel(2, 0), jet(1.0));
    }

    #[test]
    fn test_render_depth_needs_snapshot() {
        let frame = annotated_frame(1, vec![correlation(ProjectionResult::NoDepth)], None);
        assert!(render_depth(&frame).is_none());
    }

    #[test]
    fn test_render_depth_marks_projected_pixel() {
        let depth = contracts::DepthFrame::from_meters(
            48,
            27,
            contracts::DepthEncoding::Float32Meters,
            0.0,
            Some(2),
            vec![1.0; 48 * 27],
        )
        .unwrap();
        let frame = annotated_frame(
            1,
            vec![correlation(ProjectionResult::Located {
                depth_pixel_x: 24,
                depth_pixel_y: 13,
                distance_meters: 1.0,
            })],
            Some(depth),
        );

        let image = render_depth(&frame).unwrap();
        assert_eq!(image.dimensions(), (48, 27));
        assert_eq!(*image.get_pixel(24, 13), CENTER_COLOR);
        assert_eq!(*image.get_pixel(14, 13), DEPTH_MARKER_COLOR);
    }
}
