//! Address-space routing between the CPU, work RAM, the PPU registers, and
//! the cartridge, plus the borrowed view the PPU uses to reach cartridge
//! pattern memory.

use crate::{
    cartridge::{Cartridge, header::Mirroring},
    mem_block::cpu::WorkRam,
    memory::cpu as cpu_mem,
    ppu::Ppu,
};

/// Temporary view that lets the PPU reach the cartridge pattern space without
/// storing a raw pointer.
///
/// The bus creates one of these per PPU call, so lifetimes remain explicit and
/// borrow-checked.
#[derive(Default)]
pub struct PatternBus<'a> {
    cartridge: Option<&'a mut Cartridge>,
}

impl<'a> PatternBus<'a> {
    pub fn new(cartridge: Option<&'a mut Cartridge>) -> Self {
        Self { cartridge }
    }

    /// A view with no cartridge attached; pattern accesses fall back to the
    /// PPU's internal pattern RAM.
    pub fn none() -> Self {
        Self { cartridge: None }
    }

    pub fn from_cartridge(cartridge: &'a mut Cartridge) -> Self {
        Self {
            cartridge: Some(cartridge),
        }
    }

    pub(crate) fn read(&mut self, addr: u16) -> Option<u8> {
        self.cartridge.as_deref().map(|cart| cart.ppu_read(addr))
    }

    pub(crate) fn write(&mut self, addr: u16, value: u8) -> bool {
        if let Some(cart) = self.cartridge.as_deref_mut() {
            cart.ppu_write(addr, value);
            true
        } else {
            false
        }
    }

    pub(crate) fn mirroring(&self) -> Mirroring {
        self.cartridge
            .as_deref()
            .map(|cart| cart.mirroring())
            .unwrap_or(Mirroring::Horizontal)
    }
}

/// CPU-visible bus bridging the processor to RAM, the PPU, and the cartridge.
///
/// The system driver owns every device and lends them to this view for the
/// duration of one CPU access, so ownership stays at the system level without
/// reference counting or back edges.
#[derive(Debug)]
pub struct CpuBus<'a> {
    pub(crate) ram: &'a mut WorkRam,
    pub(crate) ppu: &'a mut Ppu,
    pub(crate) cartridge: Option<&'a mut Cartridge>,
}

impl<'a> CpuBus<'a> {
    pub fn new(
        ram: &'a mut WorkRam,
        ppu: &'a mut Ppu,
        cartridge: Option<&'a mut Cartridge>,
    ) -> Self {
        Self {
            ram,
            ppu,
            cartridge,
        }
    }

    /// Reads one byte from the CPU address space.
    ///
    /// Unmapped regions (the APU/controller window this core does not model)
    /// read as zero.
    pub fn read(&mut self, addr: u16) -> u8 {
        match addr {
            cpu_mem::INTERNAL_RAM_START..=cpu_mem::INTERNAL_RAM_MIRROR_END => {
                self.ram[(addr & cpu_mem::INTERNAL_RAM_MASK) as usize]
            }
            cpu_mem::PPU_REGISTER_BASE..=cpu_mem::PPU_REGISTER_MIRROR_END => {
                let mut pattern = PatternBus::new(self.cartridge.as_deref_mut());
                self.ppu.cpu_read(addr, &mut pattern)
            }
            cpu_mem::CARTRIDGE_SPACE_BASE..=cpu_mem::CPU_ADDR_END => self
                .cartridge
                .as_deref()
                .map(|cart| cart.cpu_read(addr))
                .unwrap_or(0),
            _ => 0,
        }
    }

    /// Writes one byte to the CPU address space. Writes to unmapped regions
    /// are discarded.
    pub fn write(&mut self, addr: u16, value: u8) {
        match addr {
            cpu_mem::INTERNAL_RAM_START..=cpu_mem::INTERNAL_RAM_MIRROR_END => {
                self.ram[(addr & cpu_mem::INTERNAL_RAM_MASK) as usize] = value;
            }
            cpu_mem::PPU_REGISTER_BASE..=cpu_mem::PPU_REGISTER_MIRROR_END => {
                let mut pattern = PatternBus::new(self.cartridge.as_deref_mut());
                self.ppu.cpu_write(addr, value, &mut pattern);
            }
            cpu_mem::CARTRIDGE_SPACE_BASE..=cpu_mem::CPU_ADDR_END => {
                if let Some(cart) = self.cartridge.as_deref_mut() {
                    cart.cpu_write(addr, value);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::ppu::Register;

    fn devices() -> (WorkRam, Ppu) {
        (WorkRam::new(), Ppu::new())
    }

    #[test]
    fn work_ram_mirrors_every_2_kib() {
        let (mut ram, mut ppu) = devices();
        let mut bus = CpuBus::new(&mut ram, &mut ppu, None);
        bus.write(0x0002, 0xDE);
        assert_eq!(bus.read(0x0002), 0xDE);
        assert_eq!(bus.read(0x0802), 0xDE);
        assert_eq!(bus.read(0x1002), 0xDE);
        assert_eq!(bus.read(0x1802), 0xDE);
    }

    #[test]
    fn ppu_registers_mirror_every_8_bytes() {
        let (mut ram, mut ppu) = devices();
        let mut bus = CpuBus::new(&mut ram, &mut ppu, None);
        // Latch OAMADDR through a mirror, then write OAMDATA through another.
        bus.write(0x2003 + 0x18, 0x05);
        bus.write(0x3FF4, 0x77);
        assert_eq!(bus.read(Register::OamData.addr()), 0x77);
    }

    #[test]
    fn unmapped_regions_read_zero_and_drop_writes() {
        let (mut ram, mut ppu) = devices();
        let mut bus = CpuBus::new(&mut ram, &mut ppu, None);
        bus.write(0x4000, 0xFF);
        bus.write(0x4017, 0xFF);
        assert_eq!(bus.read(0x4000), 0);
        assert_eq!(bus.read(0x4017), 0);
        assert_eq!(bus.read(0x5000), 0);
    }

    #[test]
    fn cartridge_space_reads_zero_without_cartridge() {
        let (mut ram, mut ppu) = devices();
        let mut bus = CpuBus::new(&mut ram, &mut ppu, None);
        assert_eq!(bus.read(0x8000), 0);
        assert_eq!(bus.read(0xFFFC), 0);
    }
}
