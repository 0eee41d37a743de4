//! Palette RAM and the 64-entry system palette.
//!
//! Palette RAM is 32 bytes mirrored every 32 across `$3F00-$3FFF`, with the
//! quirk that `$3F10/$3F14/$3F18/$3F1C` are aliases of
//! `$3F00/$3F04/$3F08/$3F0C`. Both read and write paths redirect through the
//! same mirror so the aliasing holds in every direction.

use std::{fs, path::Path};

use crate::{
    error::Error,
    mem_block::ppu::PaletteBytes,
    memory::ppu as ppu_mem,
    video::Rgba,
};

/// Expected byte length of a `.pal` file: 64 colors x (R, G, B).
pub const PALETTE_FILE_LEN: usize = 192;

/// Number of colors the PPU can output.
pub const PALETTE_COLORS: usize = 64;

/// Dedicated 32-byte palette RAM with hardware mirroring applied on access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct PaletteRam(PaletteBytes);

impl PaletteRam {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Folds a `$3F00-$3FFF` address onto the 32 physical bytes, applying the
    /// forced backdrop mirrors.
    fn mirrored_index(addr: u16) -> usize {
        let mut index = (addr as usize) % ppu_mem::PALETTE_RAM_SIZE;
        if matches!(index, 0x10 | 0x14 | 0x18 | 0x1C) {
            index -= 0x10;
        }
        index
    }

    pub(crate) fn read(&self, addr: u16) -> u8 {
        self.0[Self::mirrored_index(addr)]
    }

    pub(crate) fn write(&mut self, addr: u16, value: u8) {
        self.0[Self::mirrored_index(addr)] = value;
    }
}

/// The 64-entry RGBA system palette used to resolve final pixel colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette([Rgba; PALETTE_COLORS]);

impl Palette {
    /// Builds a palette from a flat 192-byte RGB dump (alpha forced to 255).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != PALETTE_FILE_LEN {
            return Err(Error::PaletteSize {
                actual: bytes.len(),
            });
        }

        let mut colors = [Rgba::BLACK; PALETTE_COLORS];
        for (color, rgb) in colors.iter_mut().zip(bytes.chunks_exact(3)) {
            *color = Rgba::new(rgb[0], rgb[1], rgb[2]);
        }
        Ok(Self(colors))
    }

    /// Loads a `.pal` file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Color for a palette index; the index is masked to the 64-entry range.
    pub fn color(&self, index: u8) -> Rgba {
        self.0[(index & 0x3F) as usize]
    }
}

impl Default for Palette {
    /// The canonical 2C02 NTSC palette, for setups without a `.pal` file.
    fn default() -> Self {
        let mut colors = [Rgba::BLACK; PALETTE_COLORS];
        for (color, packed) in colors.iter_mut().zip(DEFAULT_NTSC) {
            *color = Rgba::new((packed >> 16) as u8, (packed >> 8) as u8, packed as u8);
        }
        Self(colors)
    }
}

#[rustfmt::skip]
const DEFAULT_NTSC: [u32; PALETTE_COLORS] = [
    0x666666, 0x002A88, 0x1412A7, 0x3B00A4, 0x5C007E, 0x6E0040, 0x6C0600, 0x561D00,
    0x333500, 0x0B4800, 0x005200, 0x004F08, 0x00404D, 0x000000, 0x000000, 0x000000,
    0xADADAD, 0x155FD9, 0x4240FF, 0x7527FE, 0xA01ACC, 0xB71E7B, 0xB53120, 0x994E00,
    0x6B6D00, 0x388700, 0x0C9300, 0x008F32, 0x007C8D, 0x000000, 0x000000, 0x000000,
    0xFFFEFF, 0x64B0FF, 0x9290FF, 0xC676FF, 0xF36AFF, 0xFE6ECC, 0xFE8170, 0xEA9E22,
    0xBCBE00, 0x88D800, 0x5CE430, 0x45E082, 0x48CDDE, 0x4F4F4F, 0x000000, 0x000000,
    0xFFFEFF, 0xC0DFFF, 0xD3D2FF, 0xE8C8FF, 0xFBC2FF, 0xFEC4EA, 0xFECCC5, 0xF7D8A5,
    0xE4E594, 0xCFEF96, 0xBDF4AB, 0xB3F3CC, 0xB5EBF2, 0xB8B8B8, 0x000000, 0x000000,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backdrop_mirrors_redirect_both_ways() {
        let mut ram = PaletteRam::new();
        for (alias, target) in [(0x3F10, 0x3F00), (0x3F14, 0x3F04), (0x3F18, 0x3F08), (0x3F1C, 0x3F0C)] {
            ram.write(alias, 0xAB);
            assert_eq!(ram.read(target), 0xAB, "alias {alias:#06X}");
            ram.write(target, 0xCD);
            assert_eq!(ram.read(alias), 0xCD, "target {target:#06X}");
        }
    }

    #[test]
    fn palette_space_mirrors_every_32_bytes() {
        let mut ram = PaletteRam::new();
        ram.write(0x3F01, 0x42);
        assert_eq!(ram.read(0x3F21), 0x42);
        assert_eq!(ram.read(0x3FE1), 0x42);
    }

    #[test]
    fn non_backdrop_entries_stay_distinct() {
        let mut ram = PaletteRam::new();
        ram.write(0x3F11, 0x11);
        assert_eq!(ram.read(0x3F01), 0x00);
        assert_eq!(ram.read(0x3F11), 0x11);
    }

    #[test]
    fn from_bytes_reads_rgb_triplets() {
        let mut bytes = vec![0u8; PALETTE_FILE_LEN];
        bytes[3] = 10;
        bytes[4] = 20;
        bytes[5] = 30;
        let palette = Palette::from_bytes(&bytes).expect("valid palette");
        assert_eq!(palette.color(1), Rgba::new(10, 20, 30));
        assert_eq!(palette.color(1).a, 255);
    }

    #[test]
    fn wrong_length_is_a_boot_error() {
        assert!(matches!(
            Palette::from_bytes(&[0u8; 100]),
            Err(Error::PaletteSize { actual: 100 })
        ));
    }

    #[test]
    fn color_lookup_masks_to_64_entries() {
        let palette = Palette::default();
        assert_eq!(palette.color(0x41), palette.color(0x01));
    }
}
