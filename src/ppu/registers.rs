//! CPU-visible PPU register state and internal VRAM address latches.
//!
//! Everything a `$2000-$2007` access can touch lives here: the three flag
//! registers, primary OAM with its pointer, the `v/t/x/w` scroll latches,
//! and the delayed `$2007` read buffer. Bit-level layouts sit in submodules.

mod control;
mod mask;
mod status;
mod vram_addr;
mod vram_registers;

pub(crate) use control::Control;
pub(crate) use mask::Mask;
pub(crate) use status::Status;
pub use vram_addr::VramAddr;
pub(crate) use vram_registers::VramRegisters;

use crate::mem_block::ppu::OamRam;

/// All register-file state the CPU can reach through `$2000-$2007`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Registers {
    /// Last value written to `$2000`.
    pub(crate) control: Control,
    /// Last value written to `$2001`.
    pub(crate) mask: Mask,
    /// Live status bits surfaced through `$2002`.
    pub(crate) status: Status,
    /// OAM byte pointer, set via `$2003` and used by `$2004`.
    pub(crate) oam_addr: u8,
    /// Primary sprite memory behind `$2004`.
    pub(crate) oam: OamRam,
    /// The `v/t/x/w` scroll latch block.
    pub(crate) vram: VramRegisters,
    /// One-byte buffer giving `$2007` reads their one-access delay.
    pub(crate) vram_buffer: u8,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    /// Creates a new register block with the power-on reset state.
    pub(crate) fn new() -> Self {
        Self {
            control: Control::default(),
            mask: Mask::default(),
            status: Status::default(),
            oam_addr: 0,
            oam: OamRam::new(),
            vram: VramRegisters::default(),
            vram_buffer: 0,
        }
    }

    /// Restores all register values to their reset defaults.
    pub(crate) fn reset(&mut self) {
        *self = Registers::new();
    }

    /// Updates control, also syncing the nametable bits into `t`.
    pub(crate) fn write_control(&mut self, value: u8) {
        self.control = Control::from_bits_retain(value);
        self.vram.t.nametable = self.control.nametable_index();
    }
}
