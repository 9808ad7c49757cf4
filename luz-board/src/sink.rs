//! Reference [`PlacementSink`](crate::PlacementSink) implementations.

use luz_protocol::{Color, IndexMarker};
use luz_util::info;

use crate::PlacementSink;

/// A sink that only logs what it receives, for bring-up and tests. Not
/// meant to drive real hardware.
#[derive(Debug, Default)]
pub struct LoggingPlacementSink {
    placements_seen: usize,
    commits_seen: usize,
}

impl LoggingPlacementSink {
    pub const fn new() -> Self {
        Self {
            placements_seen: 0,
            commits_seen: 0,
        }
    }

    pub fn placements_seen(&self) -> usize {
        self.placements_seen
    }

    pub fn commits_seen(&self) -> usize {
        self.commits_seen
    }
}

impl PlacementSink for LoggingPlacementSink {
    fn place(&mut self, led_index: usize, color: Color) {
        let Color { r, g, b } = color;
        info!("luz-board: place led={} color=({}, {}, {})", led_index, r, g, b);
        self.placements_seen += 1;
    }

    fn commit(&mut self, index_marker: IndexMarker) {
        info!("luz-board: commit {:?}", index_marker);
        self.commits_seen += 1;
    }
}
