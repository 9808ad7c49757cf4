//! Reference [`FragmentSource`](crate::FragmentSource) implementations.

use luz_util::{Error, Result};

use crate::FragmentSource;

/// A [`FragmentSource`] that replays a fixed list of fragments, for tests
/// and bring-up without a real transport.
pub struct SliceFragmentSource<'a> {
    fragments: &'a [&'a [u8]],
    next: usize,
}

impl<'a> SliceFragmentSource<'a> {
    pub const fn new(fragments: &'a [&'a [u8]]) -> Self {
        Self { fragments, next: 0 }
    }
}

impl FragmentSource for SliceFragmentSource<'_> {
    fn read_fragment(&mut self, buf: &mut [u8]) -> Result<usize> {
        let Some(&fragment) = self.fragments.get(self.next) else {
            return Ok(0);
        };
        if fragment.len() > buf.len() {
            return Err(Error);
        }
        buf[..fragment.len()].copy_from_slice(fragment);
        self.next += 1;
        Ok(fragment.len())
    }
}
