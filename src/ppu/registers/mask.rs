use bitflags::bitflags;

bitflags! {
    /// `$2001` PPUMASK.
    ///
    /// Write-only. Switches the two render layers on and off, decides
    /// whether they appear in the leftmost eight pixels, and selects the
    /// greyscale and color-emphasis output treatments.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) struct Mask: u8 {
        /// Bit 0: collapse output colors onto the grey column of the palette.
        const GREYSCALE = 0b0000_0001;

        /// Bit 1: keep the background visible in the left eight pixels.
        const BACKGROUND_LEFT = 0b0000_0010;

        /// Bit 2: keep sprites visible in the left eight pixels.
        const SPRITES_LEFT = 0b0000_0100;

        /// Bit 3: background layer on.
        const BACKGROUND = 0b0000_1000;

        /// Bit 4: sprite layer on.
        const SPRITES = 0b0001_0000;

        /// Bit 5: emphasize red output (dims the other channels).
        const EMPHASIS_RED = 0b0010_0000;

        /// Bit 6: emphasize green output.
        const EMPHASIS_GREEN = 0b0100_0000;

        /// Bit 7: emphasize blue output.
        const EMPHASIS_BLUE = 0b1000_0000;
    }
}

impl Default for Mask {
    fn default() -> Self {
        Self::empty()
    }
}

impl Mask {
    /// The PPU counts as "rendering" whenever either layer is switched on;
    /// scroll updates and the odd-frame skip key off this.
    pub(crate) fn rendering_enabled(self) -> bool {
        self.intersects(Self::BACKGROUND | Self::SPRITES)
    }

    /// Whether any color-emphasis bit is set.
    pub(crate) fn emphasis_active(self) -> bool {
        self.intersects(Self::EMPHASIS_RED | Self::EMPHASIS_GREEN | Self::EMPHASIS_BLUE)
    }
}
