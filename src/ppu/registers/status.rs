use bitflags::bitflags;

bitflags! {
    /// `$2002` PPUSTATUS.
    ///
    /// Only the top three bits are driven by status logic; the low five
    /// surface stale data-bus contents on reads. Reading the register also
    /// clears the vblank bit and resets the shared `$2005`/`$2006` write
    /// latch.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) struct Status: u8 {
        /// Bit 5: more than eight sprites fell on a single scanline.
        const SPRITE_OVERFLOW = 0b0010_0000;

        /// Bit 6: an opaque sprite-0 pixel met an opaque background pixel.
        const SPRITE_ZERO_HIT = 0b0100_0000;

        /// Bit 7: the PPU is inside vertical blank.
        const VBLANK = 0b1000_0000;
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::empty()
    }
}
