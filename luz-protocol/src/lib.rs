//! Framed reassembly-and-decode protocol for the luz decoy board.
//!
//! Bytes arrive from an unreliable transport in arbitrary-sized fragments.
//! [`ProtocolDriver`] buffers them, finds frame boundaries via sentinel
//! bytes and a length-prefixed header, validates a running checksum, and
//! hands decoded [`Placement`] records up to the caller. The crate has no
//! notion of the transport (BLE, a serial line, a test harness) or of
//! physical LED addressing; those live in `luz-board`, which consumes this
//! crate's output through its own traits.
//!
//! Everything here is `no_std` and allocation-free: buffer sizes are fixed
//! at compile time through const generics, matching the bounded working set
//! a microcontroller-class target can afford.

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(feature = "strict", deny(warnings))]

mod color;
mod fields;
mod fragment_buffer;
mod frame_decoder;
mod placement;
mod placement_extractor;

pub mod driver;

pub use color::Color;
pub use driver::{DecodedProblem, ProtocolDriver};
pub use fields::{FIRST_SENTINEL, HEADER_LEN, FOOTER_LEN, RECORD_LEN, SECOND_SENTINEL, THIRD_SENTINEL};
pub use fragment_buffer::FragmentBuffer;
pub use frame_decoder::{decode, DecodeStatus, DecodedFrame};
pub use placement::{IndexMarker, Placement};
pub use placement_extractor::extract;
