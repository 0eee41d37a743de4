use crate::bus::CpuBus;

/// Clockable processor attached to the CPU bus.
///
/// The core treats the 6502 as a black box: it only needs something that can
/// be ticked in lockstep with the PPU, reset through the bus, and handed the
/// edge-triggered NMI signal the PPU raises at vblank. Instruction decoding
/// lives entirely behind this trait.
pub trait Cpu {
    /// Advances the processor by one of its own clock cycles. The system
    /// driver calls this on every third PPU dot.
    fn clock(&mut self, bus: &mut CpuBus<'_>);

    /// Runs the hardware reset sequence (vector fetch, register init).
    fn reset(&mut self, bus: &mut CpuBus<'_>);

    /// Delivers a non-maskable interrupt edge. The driver has already cleared
    /// the PPU-side latch when this is called.
    fn nmi(&mut self, bus: &mut CpuBus<'_>);

    /// Overrides the program counter. Used by the nestest diagnostic path,
    /// which enters at `$C000` instead of the reset vector.
    fn force_pc(&mut self, pc: u16);
}
