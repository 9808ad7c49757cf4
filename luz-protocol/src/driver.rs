//! Wires the Fragment Buffer, Frame Decoder and Placement Extractor into the
//! single entry point transport code calls as bytes arrive.

use heapless::Vec;

use luz_util::{error, warn};

use crate::fragment_buffer::FragmentBuffer;
use crate::frame_decoder::{decode, DecodeStatus};
use crate::placement::{IndexMarker, Placement};
use crate::placement_extractor::extract;

/// One fully decoded frame: its role in the (possibly multi-frame) problem
/// it belongs to, and the placements it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedProblem<const MAX_PLACEMENTS: usize> {
    pub index_marker: IndexMarker,
    pub placements: Vec<Placement, MAX_PLACEMENTS>,
}

/// Maintains one reassembly window over an unreliable, fragmenting byte
/// stream and turns it into decoded frames.
///
/// `SEGMENT_CAPACITY` and `MAX_SEGMENTS` bound the Fragment Buffer; the
/// driver holds at most one frame's worth of fragments at a time, since a
/// successful decode clears the buffer outright rather than only consuming
/// the bytes of the frame just parsed (`spec.md` §4.3's single
/// current-frame reassembly window). `MAX_PLACEMENTS` bounds how many
/// records a single frame may carry.
pub struct ProtocolDriver<
    const SEGMENT_CAPACITY: usize,
    const MAX_SEGMENTS: usize,
    const MAX_PLACEMENTS: usize,
> {
    buffer: FragmentBuffer<SEGMENT_CAPACITY, MAX_SEGMENTS>,
}

impl<const SEGMENT_CAPACITY: usize, const MAX_SEGMENTS: usize, const MAX_PLACEMENTS: usize>
    ProtocolDriver<SEGMENT_CAPACITY, MAX_SEGMENTS, MAX_PLACEMENTS>
{
    pub const fn new() -> Self {
        Self {
            buffer: FragmentBuffer::new(),
        }
    }

    /// Feeds one transport fragment into the reassembly window.
    ///
    /// Returns `(completed, placements)`: `completed` is `true` only when
    /// this call produced a fully validated frame, matching `spec.md` §4.4's
    /// two-state "frame ready" / "not ready" contract — every other path
    /// (more bytes needed, a malformed frame recovered from, a buffer
    /// overrun, an empty fragment) reports `false`.
    ///
    /// An empty fragment is a no-op: it is not buffered and does not consume
    /// a segment slot (`spec.md` §8, "Empty fragment: no state change,
    /// returns not-ready").
    ///
    /// If `fragment` cannot be buffered (it overran `SEGMENT_CAPACITY`, or
    /// the segment list was already full) it is dropped and the window is
    /// left untouched, matching `spec.md` §7's "surface, don't panic on,
    /// memory exhaustion".
    ///
    /// On a malformed or unsynchronized frame — including a header that is
    /// merely too short to have arrived yet in one segment — the oldest
    /// buffered segment is discarded and parsing retried, repeating until a
    /// frame completes or the buffer runs dry. Only `Incomplete` (a valid
    /// header waiting on the rest of its payload) leaves the buffer
    /// untouched, since more bytes from a later call may still complete it.
    pub fn process(&mut self, fragment: &[u8]) -> (bool, Option<DecodedProblem<MAX_PLACEMENTS>>) {
        if fragment.is_empty() {
            return (false, None);
        }

        if self.buffer.append(fragment).is_err() {
            error!("luz-protocol: dropping fragment, reassembly buffer is full");
            return (false, None);
        }

        loop {
            if self.buffer.is_empty() {
                return (false, None);
            }

            match decode(&self.buffer) {
                DecodeStatus::Incomplete => {
                    return (false, None);
                }
                DecodeStatus::Success(frame) => {
                    let placements = match extract(&self.buffer, &frame) {
                        Ok(placements) => placements,
                        Err(_) => {
                            warn!("luz-protocol: frame carried more records than fit, resyncing");
                            self.buffer.pop_front();
                            continue;
                        }
                    };
                    let index_marker = frame.index_marker;
                    self.buffer.clear();
                    return (true, Some(DecodedProblem { index_marker, placements }));
                }
                DecodeStatus::InsufficientHeaderBytes
                | DecodeStatus::BadHeader
                | DecodeStatus::BadChecksum
                | DecodeStatus::BadFooter
                | DecodeStatus::BadPayload => {
                    warn!("luz-protocol: discarding unsynchronized segment");
                    self.buffer.pop_front();
                }
            }
        }
    }
}

impl<const SEGMENT_CAPACITY: usize, const MAX_SEGMENTS: usize, const MAX_PLACEMENTS: usize> Default
    for ProtocolDriver<SEGMENT_CAPACITY, MAX_SEGMENTS, MAX_PLACEMENTS>
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    type TestDriver = ProtocolDriver<32, 4, 8>;

    fn frame_with_valid_checksum(mut frame: Vec<u8, 32>) -> Vec<u8, 32> {
        let mut acc = frame[4];
        for &b in &frame[5..frame.len() - 1] {
            acc = acc.wrapping_add(b);
        }
        frame[2] = !acc;
        frame
    }

    fn one_record_frame() -> Vec<u8, 32> {
        let bytes: &[u8] = &[0x01, 4, 0x00, 0x02, 0x54, 0x2C, 0x00, 0xE3, 0x03];
        frame_with_valid_checksum(Vec::from_slice(bytes).unwrap())
    }

    #[test]
    fn decodes_a_frame_delivered_in_one_fragment() {
        let mut driver = TestDriver::new();
        let frame = one_record_frame();
        let (completed, result) = driver.process(&frame);
        assert!(completed);
        let problem = result.expect("frame should decode");
        assert_eq!(problem.index_marker, IndexMarker::Solo);
        assert_eq!(problem.placements.len(), 1);
        assert_eq!(problem.placements[0].position, 44);
        assert_eq!(problem.placements[0].color, Color::from_packed(0xE3));
    }

    #[test]
    fn decodes_a_frame_split_across_fragments() {
        let mut driver = TestDriver::new();
        let frame = one_record_frame();

        let (completed, result) = driver.process(&frame[..5]);
        assert!(!completed);
        assert!(result.is_none());

        let (completed, result) = driver.process(&frame[5..]);
        assert!(completed);
        assert!(result.is_some());
    }

    #[test]
    fn resynchronizes_past_a_garbage_segment() {
        // The garbage fragment is shorter than a header, so this also
        // exercises `InsufficientHeaderBytes` being bucketed with the other
        // resync statuses rather than retained like `Incomplete`.
        // Resynchronization discards whole buffered segments, not
        // individual bytes, so the garbage must arrive as its own fragment
        // to exercise `pop_front` rather than landing in the same segment
        // as the valid frame.
        let mut driver = TestDriver::new();
        let frame = one_record_frame();

        let (completed, result) = driver.process(&[0xAA, 0xBB, 0xCC]);
        assert!(!completed);
        assert!(result.is_none());

        let (completed, result) = driver.process(&frame);
        assert!(completed);
        assert!(result.is_some());
    }

    #[test]
    fn recovers_after_a_corrupted_frame() {
        let mut driver = TestDriver::new();
        let mut bad = one_record_frame();
        bad[2] ^= 0xFF; // corrupt checksum
        let good = one_record_frame();

        let (_, result) = driver.process(&bad);
        assert!(result.is_none());

        let (_, result) = driver.process(&good);
        assert!(result.is_some());
    }

    /// "top row": a 17-placement problem delivered as three fragments, none
    /// of which lands on a frame boundary.
    mod scenario_a_top_row {
        use super::*;

        type SceneDriver = ProtocolDriver<32, 4, 20>;

        const P1: [u8; 20] = [
            1, 52, 32, 2, 84, 17, 0, 224, 52, 0, 224, 87, 0, 227, 122, 0, 227, 157, 0, 227,
        ];
        const P2: [u8; 20] = [
            192, 0, 227, 227, 0, 227, 6, 1, 227, 41, 1, 227, 76, 1, 28, 111, 1, 3, 146, 1,
        ];
        const P3: [u8; 17] = [3, 181, 1, 3, 216, 1, 3, 251, 1, 227, 30, 2, 227, 65, 2, 227, 3];

        #[test]
        fn assembles_across_three_fragments() {
            let mut driver = SceneDriver::new();

            let (completed, result) = driver.process(&P1);
            assert!(!completed);
            assert!(result.is_none());

            let (completed, result) = driver.process(&P2);
            assert!(!completed);
            assert!(result.is_none());

            let (completed, result) = driver.process(&P3);
            assert!(completed);
            let problem = result.expect("third fragment completes the frame");

            assert_eq!(problem.placements.len(), 17);
            assert_eq!(problem.placements[0].position, 17);
            for i in 1..problem.placements.len() {
                assert_eq!(
                    problem.placements[i].position - problem.placements[i - 1].position,
                    35
                );
            }
        }
    }

    /// "wilbur": a 10-placement problem delivered as two fragments, plus the
    /// dropped-fragment and corrupted-field recovery variants built on it.
    mod scenario_b_wilbur {
        use super::*;

        type SceneDriver = ProtocolDriver<32, 4, 16>;

        const P1: [u8; 20] = [
            0x01, 0x1F, 0xD6, 0x02, 0x54, 0x29, 0x01, 0xE0, 0x6C, 0x00, 0xE3, 0x8D, 0x01, 0x03,
            0x12, 0x01, 0x1C, 0xAA, 0x00, 0x1C,
        ];
        const P2: [u8; 16] = [
            0xEC, 0x00, 0x03, 0x0F, 0x01, 0x03, 0x34, 0x01, 0xE3, 0x7C, 0x01, 0xE3, 0x78, 0x01,
            0x03, 0x03,
        ];

        const EXPECTED: [(u16, Color); 10] = [
            (297, Color::new(224, 0, 0)),
            (108, Color::new(224, 0, 192)),
            (397, Color::new(0, 0, 192)),
            (274, Color::new(0, 224, 0)),
            (170, Color::new(0, 224, 0)),
            (236, Color::new(0, 0, 192)),
            (271, Color::new(0, 0, 192)),
            (308, Color::new(224, 0, 192)),
            (380, Color::new(224, 0, 192)),
            (376, Color::new(0, 0, 192)),
        ];

        fn assert_is_wilbur(problem: &DecodedProblem<16>) {
            assert_eq!(problem.placements.len(), EXPECTED.len());
            for (placement, (position, color)) in problem.placements.iter().zip(EXPECTED.iter()) {
                assert_eq!(placement.position, *position);
                assert_eq!(placement.color, *color);
            }
        }

        #[test]
        fn assembles_across_two_fragments() {
            let mut driver = SceneDriver::new();

            let (completed, result) = driver.process(&P1);
            assert!(!completed);
            assert!(result.is_none());

            let (completed, result) = driver.process(&P2);
            assert!(completed);
            assert_is_wilbur(&result.expect("second fragment completes the frame"));
        }

        #[test]
        fn recovers_from_a_dropped_leading_fragment() {
            // p2 arrives first (p1 was dropped in transit), fails to parse
            // on its own, then the retransmitted p1/p2 pair completes.
            let mut driver = SceneDriver::new();

            let (completed, result) = driver.process(&P2);
            assert!(!completed);
            assert!(result.is_none());

            let (completed, result) = driver.process(&P1);
            assert!(!completed);
            assert!(result.is_none());

            let (completed, result) = driver.process(&P2);
            assert!(completed);
            assert_is_wilbur(&result.expect("retransmission completes the frame"));
        }

        #[test]
        fn recovers_from_a_corrupted_first_sentinel() {
            let mut mutated_p1 = P1;
            mutated_p1[0] = 0x02;
            let mut driver = SceneDriver::new();

            let (completed, result) = driver.process(&mutated_p1);
            assert!(!completed);
            assert!(result.is_none());
            let (completed, result) = driver.process(&P2);
            assert!(!completed);
            assert!(result.is_none());
            let (completed, result) = driver.process(&P1);
            assert!(!completed);
            assert!(result.is_none());
            let (completed, result) = driver.process(&P2);
            assert!(completed);
            assert_is_wilbur(&result.expect("retransmission completes the frame"));
        }

        #[test]
        fn recovers_from_a_corrupted_footer() {
            let mut mutated_p2 = P2;
            *mutated_p2.last_mut().unwrap() = 0x01;
            let mut driver = SceneDriver::new();

            let (completed, result) = driver.process(&P1);
            assert!(!completed);
            assert!(result.is_none());
            let (completed, result) = driver.process(&mutated_p2);
            assert!(!completed);
            assert!(result.is_none());
            let (completed, result) = driver.process(&P1);
            assert!(!completed);
            assert!(result.is_none());
            let (completed, result) = driver.process(&P2);
            assert!(completed);
            assert_is_wilbur(&result.expect("retransmission completes the frame"));
        }

        #[test]
        fn recovers_from_a_zeroed_checksum() {
            let mut mutated_p1 = P1;
            mutated_p1[2] = 0x00;
            let mut driver = SceneDriver::new();

            let (completed, result) = driver.process(&mutated_p1);
            assert!(!completed);
            assert!(result.is_none());
            let (completed, result) = driver.process(&P2);
            assert!(!completed);
            assert!(result.is_none());
            let (completed, result) = driver.process(&P1);
            assert!(!completed);
            assert!(result.is_none());
            let (completed, result) = driver.process(&P2);
            assert!(completed);
            assert_is_wilbur(&result.expect("retransmission completes the frame"));
        }
    }

    #[test]
    fn empty_fragment_is_a_no_op() {
        let mut driver = TestDriver::new();
        let (completed, result) = driver.process(&[]);
        assert!(!completed);
        assert!(result.is_none());

        // The empty fragment must not have consumed a segment slot or
        // otherwise perturbed the window: a real frame delivered right
        // after still decodes normally.
        let frame = one_record_frame();
        let (completed, result) = driver.process(&frame);
        assert!(completed);
        assert!(result.is_some());
    }

}
