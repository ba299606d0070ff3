//! Raw depth message decoding
//!
//! Turns a transport `RawDepthMessage` into a meters-valued `DepthFrame`.
//! Handles both recognized encodings, either byte order, and padded rows.

use std::borrow::Cow;

use contracts::{DepthEncoding, DepthFrame, RawDepthMessage};

use crate::error::{DecodeError, Result};

/// Decode a raw depth message.
///
/// Pure: no logging, no side effects. The caller decides what to do with
/// the error.
pub fn decode_depth(msg: &RawDepthMessage) -> Result<DepthFrame> {
    let encoding = DepthEncoding::from_tag(&msg.encoding).ok_or_else(|| {
        DecodeError::UnsupportedEncoding {
            encoding: msg.encoding.clone(),
        }
    })?;

    if msg.width == 0 || msg.height == 0 {
        return Err(DecodeError::ZeroDimension {
            width: msg.width,
            height: msg.height,
        });
    }

    let width = msg.width as usize;
    let height = msg.height as usize;
    let row_bytes = width * encoding.sample_size();
    let step = msg.step as usize;

    if step < row_bytes {
        return Err(DecodeError::StepTooSmall {
            step,
            min_step: row_bytes,
        });
    }

    let expected = step * height;
    if msg.data.len() != expected {
        return Err(DecodeError::SizeMismatch {
            expected,
            actual: msg.data.len(),
        });
    }

    let packed = pack_rows(&msg.data, step, row_bytes);
    let swap = msg.is_bigendian != cfg!(target_endian = "big");
    let scale = encoding.meters_per_unit();

    let meters: Vec<f32> = match encoding {
        DepthEncoding::Mono16Millimeters => {
            let raw: Vec<u16> = bytemuck::pod_collect_to_vec(&packed);
            raw.into_iter()
                .map(|v| if swap { v.swap_bytes() } else { v })
                .map(|mm| mm as f32 * scale)
                .collect()
        }
        DepthEncoding::Float32Meters => {
            let raw: Vec<u32> = bytemuck::pod_collect_to_vec(&packed);
            raw.into_iter()
                .map(|v| if swap { v.swap_bytes() } else { v })
                .map(|bits| f32::from_bits(bits) * scale)
                .collect()
        }
    };

    let actual = meters.len();
    DepthFrame::from_meters(
        msg.width,
        msg.height,
        encoding,
        msg.timestamp,
        msg.frame_id,
        meters,
    )
    .ok_or(DecodeError::SizeMismatch {
        expected: width * height,
        actual,
    })
}

/// Strip per-row padding. Borrows when rows are already tightly packed.
fn pack_rows(data: &[u8], step: usize, row_bytes: usize) -> Cow<'_, [u8]> {
    if step == row_bytes {
        return Cow::Borrowed(data);
    }
    let mut packed = Vec::with_capacity(data.len() / step * row_bytes);
    for row in data.chunks_exact(step) {
        packed.extend_from_slice(&row[..row_bytes]);
    }
    Cow::Owned(packed)
}
