use bitflags::bitflags;

use crate::memory::ppu as ppu_mem;

bitflags! {
    /// `$2000` PPUCTRL.
    ///
    /// Write-only. The low two bits seed the temporary scroll register's
    /// nametable selection; the rest pick pattern-table bases, the `$2007`
    /// stride, sprite height, and whether vblank raises an NMI.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) struct Control: u8 {
        /// Bits 0-1: which of the four nametables scrolling starts from.
        const NAMETABLE_SELECT = 0b0000_0011;

        /// Bit 2: `$2007` accesses advance the address by 32 (one tile row
        /// down) instead of 1.
        const VRAM_STRIDE_32 = 0b0000_0100;

        /// Bit 3: 8x8 sprites fetch their patterns from table 1 at `$1000`.
        const SPRITE_PATTERN_HI = 0b0000_1000;

        /// Bit 4: the background fetches its patterns from table 1 at `$1000`.
        const BACKGROUND_PATTERN_HI = 0b0001_0000;

        /// Bit 5: sprites are 8x16 pixels instead of 8x8.
        const TALL_SPRITES = 0b0010_0000;

        /// Bit 6: master/slave select on the EXT pins. Latched but unused.
        const MASTER_SLAVE = 0b0100_0000;

        /// Bit 7: raise the NMI line when the vblank flag turns on.
        const NMI_AT_VBLANK = 0b1000_0000;
    }
}

impl Default for Control {
    fn default() -> Self {
        Self::empty()
    }
}

impl Control {
    /// Returns the nametable select bits (0..3).
    pub(crate) fn nametable_index(self) -> u8 {
        self.bits() & Self::NAMETABLE_SELECT.bits()
    }

    /// Returns the `$2007` address stride (1 or 32).
    pub(crate) fn vram_increment(self) -> u16 {
        if self.contains(Self::VRAM_STRIDE_32) {
            32
        } else {
            1
        }
    }

    /// Base address of the pattern table 8x8 sprites fetch from.
    pub(crate) fn sprite_pattern_table(self) -> u16 {
        if self.contains(Self::SPRITE_PATTERN_HI) {
            ppu_mem::PATTERN_TABLE_1
        } else {
            ppu_mem::PATTERN_TABLE_0
        }
    }

    /// Base address of the pattern table the background fetches from.
    pub(crate) fn background_pattern_table(self) -> u16 {
        if self.contains(Self::BACKGROUND_PATTERN_HI) {
            ppu_mem::PATTERN_TABLE_1
        } else {
            ppu_mem::PATTERN_TABLE_0
        }
    }

    /// Sprite height in rows (8 or 16).
    pub(crate) fn sprite_height(self) -> i16 {
        if self.contains(Self::TALL_SPRITES) { 16 } else { 8 }
    }

    /// Whether vblank entry should raise the NMI line.
    pub(crate) fn nmi_enabled(self) -> bool {
        self.contains(Self::NMI_AT_VBLANK)
    }
}
