//! Cycle-driven NES core: the picture processing unit, the system bus that
//! ties CPU, PPU, cartridge, and work RAM together, and the clock driver that
//! advances them in lockstep.
//!
//! The CPU itself is consumed as a clockable black box through [`cpu::Cpu`];
//! the display is consumed through [`video::Screen`]. Everything else - the
//! dot-accurate PPU, the address routing, and NROM cartridge ingestion -
//! lives here.

pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod error;
pub mod mem_block;
pub mod memory;
pub mod ppu;
pub mod video;

pub use bus::{CpuBus, PatternBus};
pub use cartridge::Cartridge;
pub use cpu::Cpu;
pub use error::Error;
pub use ppu::{Ppu, palette::Palette};
pub use video::{FrameBuffer, Rgba, SCREEN_HEIGHT, SCREEN_WIDTH, Screen};

use mem_block::cpu::WorkRam;

/// Zero-page byte where the nestest ROM reports its first error class.
pub const DIAG_RESULT_LO: u16 = 0x0002;
/// Zero-page byte where the nestest ROM reports its second error class.
pub const DIAG_RESULT_HI: u16 = 0x0003;
/// Entry point the nestest diagnostic expects when run headless.
pub const NESTEST_ENTRY: u16 = 0xC000;

/// Result of a single system tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockResult {
    /// True when this tick completed a frame (the display was presented).
    pub frame_complete: bool,
    /// True when the CPU was clocked on this tick.
    pub cpu_clocked: bool,
}

/// The console: owns work RAM, the PPU, and the cartridge, and drives an
/// attached CPU in the hardware's 3:1 dot ratio.
///
/// Components form no ownership cycles: the CPU reaches the PPU and cartridge
/// only through a [`CpuBus`] view lent per access, and the PPU reaches the
/// cartridge only through a [`PatternBus`] view lent per tick.
#[derive(Debug)]
pub struct Nes<C> {
    cpu: C,
    ppu: Ppu,
    ram: WorkRam,
    cartridge: Option<Cartridge>,
    clock_count: u64,
}

impl<C: Cpu> Nes<C> {
    /// Creates a console around the given processor, with no cartridge.
    pub fn new(cpu: C) -> Self {
        Self {
            cpu,
            ppu: Ppu::new(),
            ram: WorkRam::new(),
            cartridge: None,
            clock_count: 0,
        }
    }

    /// Replaces the system palette used by the PPU.
    pub fn set_palette(&mut self, palette: Palette) {
        self.ppu.set_palette(palette);
    }

    /// Inserts a cartridge and runs the reset sequence.
    pub fn insert_cartridge(&mut self, cartridge: Cartridge) {
        self.cartridge = Some(cartridge);
        self.reset();
    }

    /// Loads a ROM image from raw bytes and inserts it.
    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let cartridge = Cartridge::new(bytes)?;
        self.insert_cartridge(cartridge);
        Ok(())
    }

    /// Loads the nestest diagnostic: a 16 KiB PRG image that the NROM mirror
    /// maps at both `$8000` and `$C000`, entered at `$C000` instead of the
    /// reset vector.
    pub fn load_nestest(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.load_rom(bytes)?;
        self.cpu.force_pc(NESTEST_ENTRY);
        Ok(())
    }

    /// Zero-page bytes `$0002`/`$0003` where the nestest ROM records failure
    /// codes; both zero means every executed test passed.
    pub fn diagnostic_codes(&self) -> (u8, u8) {
        (
            self.ram[DIAG_RESULT_LO as usize],
            self.ram[DIAG_RESULT_HI as usize],
        )
    }

    /// The attached processor.
    pub fn cpu(&self) -> &C {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut C {
        &mut self.cpu
    }

    /// The picture processing unit.
    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn ppu_mut(&mut self) -> &mut Ppu {
        &mut self.ppu
    }

    /// Total system ticks since power-on or the last reset.
    pub fn clock_count(&self) -> u64 {
        self.clock_count
    }

    /// Resets the console: the CPU re-runs its reset sequence through the bus
    /// and the clock counter returns to zero. PPU and cartridge state stay
    /// intact, matching the hardware's reset button.
    pub fn reset(&mut self) {
        let Self {
            cpu,
            ppu,
            ram,
            cartridge,
            clock_count,
        } = self;
        let mut bus = CpuBus::new(ram, ppu, cartridge.as_mut());
        cpu.reset(&mut bus);
        *clock_count = 0;
    }

    /// Reads one byte from the CPU address space, with normal bus side
    /// effects (register reads behave as the CPU would see them).
    pub fn cpu_read(&mut self, addr: u16) -> u8 {
        let Self {
            ppu,
            ram,
            cartridge,
            ..
        } = self;
        CpuBus::new(ram, ppu, cartridge.as_mut()).read(addr)
    }

    /// Writes one byte to the CPU address space.
    pub fn cpu_write(&mut self, addr: u16, value: u8) {
        let Self {
            ppu,
            ram,
            cartridge,
            ..
        } = self;
        CpuBus::new(ram, ppu, cartridge.as_mut()).write(addr, value);
    }

    /// Advances the system by one tick: the PPU steps one dot, the CPU steps
    /// on every third tick, and a pending NMI edge is delivered before the
    /// CPU runs. Frame completion presents the display.
    pub fn clock(&mut self, screen: &mut dyn Screen) -> ClockResult {
        let Self {
            cpu,
            ppu,
            ram,
            cartridge,
            clock_count,
        } = self;

        {
            let mut pattern = PatternBus::new(cartridge.as_mut());
            ppu.clock(&mut pattern, screen);
        }

        // The PPU advances first within a tick, so an NMI raised on this dot
        // reaches the CPU before its very next cycle.
        let nmi = ppu.take_nmi();
        let cpu_clocked = *clock_count % 3 == 0;
        {
            let mut bus = CpuBus::new(ram, ppu, cartridge.as_mut());
            if nmi {
                cpu.nmi(&mut bus);
            }
            if cpu_clocked {
                cpu.clock(&mut bus);
            }
        }
        *clock_count += 1;

        let frame_complete = ppu.take_frame_complete();
        if frame_complete {
            screen.present();
        }

        ClockResult {
            frame_complete,
            cpu_clocked,
        }
    }

    /// Clocks the system until the PPU finishes the current frame.
    pub fn run_frame(&mut self, screen: &mut dyn Screen) {
        while !self.clock(screen).frame_complete {}
    }
}
