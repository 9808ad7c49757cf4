//! Stitches placement records out of a decoded frame's payload.
//!
//! The Frame Decoder has already checked that the payload divides evenly
//! into [`RECORD_LEN`] chunks, so extraction here cannot fail on malformed
//! input, only on exceeding the caller-chosen output capacity.

use heapless::Vec;

use luz_util::{Error, Result};

use crate::color::Color;
use crate::fields::{read_u16_le, RECORD_LEN};
use crate::fragment_buffer::FragmentBuffer;
use crate::frame_decoder::DecodedFrame;
use crate::placement::Placement;

/// Reads every placement record out of `frame`'s payload in `buffer`.
///
/// Records may straddle segment boundaries; bytes are staged one record at
/// a time rather than requiring the whole payload to be contiguous.
///
/// Fails if the frame holds more than `MAX_PLACEMENTS` records.
pub fn extract<const SEGMENT_CAPACITY: usize, const MAX_SEGMENTS: usize, const MAX_PLACEMENTS: usize>(
    buffer: &FragmentBuffer<SEGMENT_CAPACITY, MAX_SEGMENTS>,
    frame: &DecodedFrame,
) -> Result<Vec<Placement, MAX_PLACEMENTS>> {
    let spans = buffer
        .spans_of(frame.payload_start, frame.payload_len)
        .ok_or(Error)?;

    let mut placements = Vec::new();
    let mut staging = [0u8; RECORD_LEN];
    let mut staged = 0usize;

    for span in spans.iter() {
        for &byte in span.iter() {
            staging[staged] = byte;
            staged += 1;
            if staged == RECORD_LEN {
                let position = read_u16_le(&staging[0..2]);
                let color = Color::from_packed(staging[2]);
                placements
                    .push(Placement::new(position, color))
                    .map_err(|_| Error)?;
                staged = 0;
            }
        }
    }

    debug_assert_eq!(staged, 0, "frame decoder guarantees a whole number of records");

    Ok(placements)
}
