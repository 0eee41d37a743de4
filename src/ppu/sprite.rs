use bitflags::bitflags;

bitflags! {
    /// Attribute bits carried in the third byte of an OAM entry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) struct SpriteAttributes: u8 {
        /// Bits 0-1: which of the four sprite palettes to use.
        const PALETTE = 0b0000_0011;

        /// Bit 5: the sprite loses to an opaque background pixel.
        const PRIORITY_BEHIND_BACKGROUND = 0b0010_0000;

        /// Bit 6: mirror the sprite left-to-right.
        const FLIP_HORIZONTAL = 0b0100_0000;

        /// Bit 7: mirror the sprite top-to-bottom.
        const FLIP_VERTICAL = 0b1000_0000;
    }
}

impl Default for SpriteAttributes {
    fn default() -> Self {
        Self::empty()
    }
}

impl SpriteAttributes {
    /// Sprite palette select (0..=3); the palette-RAM index adds 4 because
    /// the first four palettes belong to the background.
    pub(crate) fn palette(self) -> u8 {
        self.bits() & Self::PALETTE.bits()
    }
}

/// Borrowed view over a single 4-byte sprite entry in primary or secondary OAM.
///
/// The NES encodes each sprite as four consecutive bytes:
/// - byte 0: Y position
/// - byte 1: tile index
/// - byte 2: attribute bits (see [`SpriteAttributes`])
/// - byte 3: X position
#[derive(Debug, Clone, Copy)]
pub(crate) struct SpriteView<'a> {
    bytes: &'a [u8],
}

impl<'a> SpriteView<'a> {
    pub(crate) const BYTES_PER_SPRITE: usize = 4;

    /// Wraps a single sprite worth of bytes (4 bytes) in a view.
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        debug_assert_eq!(bytes.len(), Self::BYTES_PER_SPRITE);
        Self { bytes }
    }

    /// Sprite Y position.
    pub(crate) fn y(&self) -> u8 {
        self.bytes[0]
    }

    /// Sprite tile index.
    pub(crate) fn tile(&self) -> u8 {
        self.bytes[1]
    }

    /// Decoded attribute flags for this sprite.
    pub(crate) fn attributes(&self) -> SpriteAttributes {
        SpriteAttributes::from_bits_retain(self.bytes[2])
    }

    /// Sprite X position.
    pub(crate) fn x(&self) -> u8 {
        self.bytes[3]
    }

    /// Raw four-byte record backing this sprite.
    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.bytes
    }
}
