//! Maps wire-format placement positions to physical LED indices.

use luz_util::{Error, Result};

use crate::PositionTable;

/// Number of holes on the reference board this crate's default wiring
/// targets: a 12×12 grid.
pub const BOARD_HOLD_COUNT: usize = 144;

/// A [`PositionTable`] that treats the wire position as the LED index
/// directly, rejecting anything beyond [`BOARD_HOLD_COUNT`].
///
/// Boards whose physical wiring does not match placement order one-to-one
/// should implement [`PositionTable`] themselves, e.g. backed by a lookup
/// array built at flash time.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityPositionTable;

impl PositionTable for IdentityPositionTable {
    fn led_index(&self, position: u16) -> Result<usize> {
        let index = position as usize;
        if index < BOARD_HOLD_COUNT {
            Ok(index)
        } else {
            Err(Error)
        }
    }
}

/// A [`PositionTable`] backed by an explicit lookup array, for boards where
/// wire position order does not match physical LED order.
pub struct ArrayPositionTable<const N: usize> {
    led_indices: [usize; N],
}

impl<const N: usize> ArrayPositionTable<N> {
    pub const fn new(led_indices: [usize; N]) -> Self {
        Self { led_indices }
    }
}

impl<const N: usize> PositionTable for ArrayPositionTable<N> {
    fn led_index(&self, position: u16) -> Result<usize> {
        self.led_indices.get(position as usize).copied().ok_or(Error)
    }
}
