//! Board-facing glue: the traits external code implements to connect
//! `luz-protocol`'s decoder to a real transport, a real LED strip, and a
//! real board's hole layout.
//!
//! `luz-protocol` knows nothing about BLE, SPI-driven LEDs, or which
//! physical hole a wire position number refers to; those concerns live
//! here, mirroring the split `dot15d4-driver` draws between the MAC/PHY
//! frame stack and the radio hardware it eventually talks to.

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(feature = "strict", deny(warnings))]

pub mod position_table;
pub mod sink;
pub mod source;

use luz_protocol::{Color, DecodedProblem, IndexMarker, ProtocolDriver};
use luz_util::{warn, Result};

pub use position_table::{IdentityPositionTable, BOARD_HOLD_COUNT};
pub use sink::LoggingPlacementSink;
pub use source::SliceFragmentSource;

/// Maximum placement records this crate's default wiring will decode from a
/// single frame. Sized for one full repaint of a 144-hold board.
pub const MAX_PLACEMENTS: usize = BOARD_HOLD_COUNT;

/// A decoded frame's placements, sized for this crate's default board.
pub type BoardProblem = DecodedProblem<MAX_PLACEMENTS>;

/// Maps a wire-format placement's logical position to the physical LED it
/// should drive.
///
/// Implementations that only support a subset of positions (a board with
/// fewer holes wired than the protocol's 16-bit position space allows)
/// return [`luz_util::Error`] for anything out of range rather than
/// panicking.
pub trait PositionTable {
    fn led_index(&self, position: u16) -> Result<usize>;
}

/// Receives placements as they are decoded, addressed to physical LED
/// indices.
///
/// `commit` is called once per decoded frame, after every placement it
/// carried has been passed to [`Self::place`], so that a sink backed by a
/// double-buffered strip can flip buffers atomically rather than tearing
/// mid-frame.
pub trait PlacementSink {
    fn place(&mut self, led_index: usize, color: Color);
    fn commit(&mut self, index_marker: IndexMarker);
}

/// Supplies raw transport fragments as they arrive.
///
/// One call returns one fragment (e.g. one BLE notification's payload);
/// the driver does not care how many bytes that is as long as it fits
/// `buf`.
pub trait FragmentSource {
    /// Writes the next available fragment into `buf`, returning its length,
    /// or `Ok(0)` if none is currently available.
    fn read_fragment(&mut self, buf: &mut [u8]) -> Result<usize>;
}

/// Wires a [`FragmentSource`], [`ProtocolDriver`], [`PositionTable`] and
/// [`PlacementSink`] together into the board's main decode loop.
pub struct BoardController<Source, Table, Sink, const SEGMENT_CAPACITY: usize, const MAX_SEGMENTS: usize>
{
    source: Source,
    driver: ProtocolDriver<SEGMENT_CAPACITY, MAX_SEGMENTS, MAX_PLACEMENTS>,
    table: Table,
    sink: Sink,
}

impl<Source, Table, Sink, const SEGMENT_CAPACITY: usize, const MAX_SEGMENTS: usize>
    BoardController<Source, Table, Sink, SEGMENT_CAPACITY, MAX_SEGMENTS>
where
    Source: FragmentSource,
    Table: PositionTable,
    Sink: PlacementSink,
{
    pub const fn new(source: Source, table: Table, sink: Sink) -> Self {
        Self {
            source,
            driver: ProtocolDriver::new(),
            table,
            sink,
        }
    }

    /// Reads one fragment from the source and feeds it through the decoder,
    /// forwarding any completed frame's placements to the sink.
    ///
    /// Returns `true` if a frame completed this call.
    pub fn poll(&mut self) -> bool {
        let mut fragment = [0u8; SEGMENT_CAPACITY];
        let len = match self.source.read_fragment(&mut fragment) {
            Ok(0) => return false,
            Ok(len) => len,
            Err(_) => {
                warn!("luz-board: fragment source reported an error");
                return false;
            }
        };

        let (_, problem) = self.driver.process(&fragment[..len]);
        match problem {
            Some(problem) => {
                self.dispatch(&problem);
                true
            }
            None => false,
        }
    }

    fn dispatch(&mut self, problem: &BoardProblem) {
        for placement in problem.placements.iter() {
            match self.table.led_index(placement.position) {
                Ok(led_index) => self.sink.place(led_index, placement.color),
                Err(_) => warn!("luz-board: placement position out of range, dropping"),
            }
        }
        self.sink.commit(problem.index_marker);
    }
}
