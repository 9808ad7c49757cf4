//! The Fragment Buffer: an append-only, ordered list of owned byte segments
//! representing the unconsumed tail of the incoming stream.
//!
//! Segments are never coalesced. Logical addressing lets the Frame Decoder
//! and Placement Extractor read across segment boundaries without the
//! buffer ever copying a received fragment except into its own owned
//! storage on [`FragmentBuffer::append`].

use heapless::{Deque, Vec};

use luz_util::{Error, Result};

/// One fragment as received from the transport, copied into owned, fixed-
/// capacity storage.
///
/// `SEGMENT_CAPACITY` bounds a single fragment's size; it should be sized to
/// the transport's maximum fragment (e.g. the negotiated BLE ATT MTU minus
/// its own header).
type Segment<const SEGMENT_CAPACITY: usize> = Vec<u8, SEGMENT_CAPACITY>;

/// A small, fixed-capacity list of owned byte segments addressed as one
/// logical byte stream.
///
/// `MAX_SEGMENTS` bounds the number of fragments retained across one
/// reassembly window; together with `SEGMENT_CAPACITY` it bounds the whole
/// working set, satisfying the "no dynamic allocation beyond a small bounded
/// working set" non-goal.
pub struct FragmentBuffer<const SEGMENT_CAPACITY: usize, const MAX_SEGMENTS: usize> {
    segments: Deque<Segment<SEGMENT_CAPACITY>, MAX_SEGMENTS>,
}

impl<const SEGMENT_CAPACITY: usize, const MAX_SEGMENTS: usize>
    FragmentBuffer<SEGMENT_CAPACITY, MAX_SEGMENTS>
{
    pub const fn new() -> Self {
        Self {
            segments: Deque::new(),
        }
    }

    /// Copies `bytes` into a new owned segment appended at the tail.
    ///
    /// Fails if `bytes` does not fit in one segment or the segment list is
    /// already at capacity. This is the one fatal condition `spec.md` §7
    /// calls out: memory exhaustion, to be surfaced to the transport owner
    /// for backpressure. The driver logs and drops the fragment rather than
    /// panicking (see `DESIGN.md`).
    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        let segment = Segment::<SEGMENT_CAPACITY>::from_slice(bytes).map_err(|()| Error)?;
        self.segments.push_back(segment).map_err(|_| Error)?;
        Ok(())
    }

    /// Sum of segment sizes. `O(segments)`.
    pub fn size(&self) -> usize {
        self.segments.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Discards the first segment. Used by the driver's resynchronization
    /// policy after a failed parse.
    pub fn pop_front(&mut self) {
        self.segments.pop_front();
    }

    /// Discards all segments.
    pub fn clear(&mut self) {
        self.segments.clear();
    }

    /// Returns a single contiguous view of `n` bytes starting at logical
    /// offset `start`.
    ///
    /// Returns `None` if the range does not fit in the buffer, or if it
    /// straddles a segment boundary. The wire protocol only ever needs
    /// contiguous reads for the header and the one-byte footer; callers that
    /// need to tolerate straddling (payload traversal) use
    /// [`Self::spans_of`] instead.
    pub fn span_of(&self, start: usize, n: usize) -> Option<&[u8]> {
        let mut offset = start;
        for segment in self.segments.iter() {
            if offset < segment.len() {
                let end = offset.checked_add(n)?;
                return segment.get(offset..end);
            }
            offset -= segment.len();
        }
        None
    }

    /// Returns an ordered list of contiguous views whose concatenation is
    /// the logical range `[start, start + n)`.
    ///
    /// The list has length equal to the number of segment boundaries
    /// crossed plus one. Returns `None` if the range exceeds the buffer's
    /// logical size or there are more boundary crossings than
    /// `MAX_SEGMENTS` (which cannot happen for a well-formed buffer, since
    /// the buffer itself never holds more than `MAX_SEGMENTS` segments).
    pub fn spans_of(&self, start: usize, n: usize) -> Option<Vec<&[u8], MAX_SEGMENTS>> {
        if start.checked_add(n)? > self.size() {
            return None;
        }

        let mut spans = Vec::new();
        let mut offset = start;
        let mut remaining = n;
        for segment in self.segments.iter() {
            if remaining == 0 {
                break;
            }
            if offset >= segment.len() {
                offset -= segment.len();
                continue;
            }

            let available = segment.len() - offset;
            let take = available.min(remaining);
            spans.push(&segment[offset..offset + take]).ok()?;
            remaining -= take;
            offset = 0;
        }

        if remaining == 0 {
            Some(spans)
        } else {
            None
        }
    }
}

impl<const SEGMENT_CAPACITY: usize, const MAX_SEGMENTS: usize> Default
    for FragmentBuffer<SEGMENT_CAPACITY, MAX_SEGMENTS>
{
    fn default() -> Self {
        Self::new()
    }
}
