//! Parses one frame out of the head of a [`FragmentBuffer`], without
//! consuming it: the caller decides what to do with the buffer based on the
//! returned [`DecodeStatus`].

use crate::fields::{
    FIRST_SENTINEL, HEADER_LEN, FOOTER_LEN, OFFSET_CHECKSUM, OFFSET_FIRST_SENTINEL,
    OFFSET_INDEX_MARKER, OFFSET_PAYLOAD_SIZE, OFFSET_SECOND_SENTINEL, RECORD_LEN,
    SECOND_SENTINEL, THIRD_SENTINEL,
};
use crate::fragment_buffer::FragmentBuffer;
use crate::placement::IndexMarker;

/// The logical position of one successfully parsed frame within a
/// [`FragmentBuffer`].
///
/// This does not own the payload bytes; callers re-read them from the
/// buffer via [`FragmentBuffer::spans_of`] (the Placement Extractor does
/// exactly that).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecodedFrame {
    /// Total bytes occupied by this frame, header through footer inclusive.
    pub total_len: usize,
    /// Logical offset of the first placement-record byte.
    pub payload_start: usize,
    /// Number of placement-record bytes between header and footer. Always a
    /// multiple of [`RECORD_LEN`].
    pub payload_len: usize,
    pub index_marker: IndexMarker,
}

/// Outcome of attempting to parse one frame from the head of the buffer.
///
/// Variants are checked in this order by [`decode`], matching the reference
/// decoder: a header that is merely short is distinguished from one that is
/// present but malformed, and checksum failure is detected before the
/// footer is even inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeStatus {
    /// Fewer than [`HEADER_LEN`] bytes are available; wait for more data.
    InsufficientHeaderBytes,
    /// A full header is available but its sentinels, index marker, or
    /// `payload_size` field are invalid.
    BadHeader,
    /// The header is valid but the full frame (per its `payload_size`) has
    /// not arrived yet; wait for more data.
    Incomplete,
    /// The frame is fully buffered but its checksum does not match.
    BadChecksum,
    /// The checksum matched but the terminating sentinel is missing.
    BadFooter,
    /// The frame is well-formed but its payload does not hold a whole
    /// number of placement records.
    BadPayload,
    /// A complete, checksum-valid, well-formed frame.
    Success(DecodedFrame),
}

/// Attempts to decode the frame at the head of `buffer`.
///
/// Does not mutate `buffer`. Callers advance or resynchronize it based on
/// the returned status (see [`crate::driver::ProtocolDriver`]).
pub fn decode<const SEGMENT_CAPACITY: usize, const MAX_SEGMENTS: usize>(
    buffer: &FragmentBuffer<SEGMENT_CAPACITY, MAX_SEGMENTS>,
) -> DecodeStatus {
    if buffer.size() < HEADER_LEN {
        return DecodeStatus::InsufficientHeaderBytes;
    }
    // Enough bytes exist, but `span_of` only succeeds within a single
    // segment: a header straddling a fragment boundary is treated the same
    // as any other malformed header rather than waited on, since it will
    // never resolve itself without a resync.
    let header = match buffer.span_of(0, HEADER_LEN) {
        Some(header) => header,
        None => return DecodeStatus::BadHeader,
    };

    if header[OFFSET_FIRST_SENTINEL] != FIRST_SENTINEL
        || header[OFFSET_SECOND_SENTINEL] != SECOND_SENTINEL
    {
        return DecodeStatus::BadHeader;
    }

    let index_marker = match IndexMarker::from_byte(header[OFFSET_INDEX_MARKER]) {
        Some(marker) => marker,
        None => return DecodeStatus::BadHeader,
    };

    // The wire's payload_size byte counts the index marker as part of the
    // payload, even though it is stored in the fixed header here; subtract
    // its one byte to get the number of placement-record bytes that follow.
    let payload_len = match (header[OFFSET_PAYLOAD_SIZE] as usize).checked_sub(1) {
        Some(len) => len,
        None => return DecodeStatus::BadHeader,
    };
    let checksum = header[OFFSET_CHECKSUM];
    let total_len = HEADER_LEN + payload_len + FOOTER_LEN;

    if buffer.size() < total_len {
        return DecodeStatus::Incomplete;
    }

    let payload_start = HEADER_LEN;
    let payload_spans = buffer
        .spans_of(payload_start, payload_len)
        .expect("size already checked above");

    let mut acc = header[OFFSET_INDEX_MARKER];
    for span in payload_spans.iter() {
        for &byte in span.iter() {
            acc = acc.wrapping_add(byte);
        }
    }
    if !acc != checksum {
        return DecodeStatus::BadChecksum;
    }

    // As with the header, a footer byte straddling a segment boundary is
    // indistinguishable from one that is simply wrong.
    let footer = match buffer.span_of(payload_start + payload_len, FOOTER_LEN) {
        Some(footer) => footer,
        None => return DecodeStatus::BadFooter,
    };
    if footer[0] != THIRD_SENTINEL {
        return DecodeStatus::BadFooter;
    }

    if payload_len % RECORD_LEN != 0 {
        return DecodeStatus::BadPayload;
    }

    DecodeStatus::Success(DecodedFrame {
        total_len,
        payload_start,
        payload_len,
        index_marker,
    })
}
