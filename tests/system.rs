//! Driver-level scenarios exercised through the public `Nes` API with a
//! scripted CPU double standing in for the 6502.

use anyhow::{Result, ensure};
use famicore::{Cpu, CpuBus, FrameBuffer, NESTEST_ENTRY, Nes};

const TICKS_PER_FRAME: usize = 89_342;

/// Records every interaction the driver has with the processor.
#[derive(Debug, Default)]
struct ProbeCpu {
    clocks: u64,
    resets: u64,
    nmis: u64,
    pc: u16,
    clocks_at_first_nmi: Option<u64>,
}

impl Cpu for ProbeCpu {
    fn clock(&mut self, _bus: &mut CpuBus<'_>) {
        self.clocks += 1;
    }

    fn reset(&mut self, bus: &mut CpuBus<'_>) {
        self.resets += 1;
        let lo = bus.read(0xFFFC);
        let hi = bus.read(0xFFFD);
        self.pc = u16::from_le_bytes([lo, hi]);
    }

    fn nmi(&mut self, _bus: &mut CpuBus<'_>) {
        self.nmis += 1;
        self.clocks_at_first_nmi.get_or_insert(self.clocks);
    }

    fn force_pc(&mut self, pc: u16) {
        self.pc = pc;
    }
}

fn synthetic_rom(prg_banks: u8) -> Vec<u8> {
    let mut rom = vec![
        b'N', b'E', b'S', 0x1A, prg_banks, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    ];
    let prg_len = prg_banks as usize * 16 * 1024;
    rom.extend((0..prg_len).map(|value| (value % 251) as u8));
    rom
}

#[test]
fn vblank_reaches_the_cpu_once_per_frame() -> Result<()> {
    let mut nes = Nes::new(ProbeCpu::default());
    let mut screen = FrameBuffer::new();
    nes.cpu_write(0x2000, 0x80);

    let mut vblank_sets = 0;
    let mut first_set = None;
    let mut was_vblank = false;
    for tick in 0..TICKS_PER_FRAME {
        nes.clock(&mut screen);
        if nes.ppu().vblank() && !was_vblank {
            vblank_sets += 1;
            first_set.get_or_insert(tick);
        }
        was_vblank = nes.ppu().vblank();
    }

    ensure!(vblank_sets == 1, "vblank set {vblank_sets} times");
    let first = first_set.expect("vblank must be reached");
    ensure!(
        (82_522..=82_524).contains(&first),
        "vblank set at tick {first}"
    );
    ensure!(first < 89_001);
    ensure!(nes.cpu().nmis == 1, "nmi delivered {} times", nes.cpu().nmis);
    Ok(())
}

#[test]
fn cpu_ticks_every_third_dot_and_sees_nmi_first() -> Result<()> {
    let mut nes = Nes::new(ProbeCpu::default());
    let mut screen = FrameBuffer::new();
    nes.cpu_write(0x2000, 0x80);

    for _ in 0..16 {
        nes.clock(&mut screen);
    }
    ensure!(nes.cpu().clocks == 6, "clocked {} times", nes.cpu().clocks);

    for _ in 16..TICKS_PER_FRAME {
        nes.clock(&mut screen);
    }
    // The PPU raised NMI on the dot at tick 82,523; the delivery must land
    // before the CPU cycle belonging to that same tick window runs.
    // CPU cycles executed on ticks 0, 3, ..., 82_521 before the NMI lands.
    let delivered_at = nes.cpu().clocks_at_first_nmi.expect("nmi was delivered");
    ensure!(
        delivered_at == 82_521 / 3 + 1,
        "nmi delivered after {delivered_at} cpu cycles"
    );
    Ok(())
}

#[test]
fn run_frame_presents_exactly_once() -> Result<()> {
    let mut nes = Nes::new(ProbeCpu::default());
    let mut screen = FrameBuffer::new();
    nes.run_frame(&mut screen);
    ensure!(screen.frames_presented() == 1);
    nes.run_frame(&mut screen);
    ensure!(screen.frames_presented() == 2);
    Ok(())
}

#[test]
fn reset_reruns_cpu_and_zeroes_clock_but_leaves_ppu_alone() -> Result<()> {
    let mut nes = Nes::new(ProbeCpu::default());
    let mut screen = FrameBuffer::new();
    nes.load_rom(&synthetic_rom(1))?;
    ensure!(nes.cpu().resets == 1, "insertion runs the reset sequence");

    // Park a distinctive byte in palette RAM through the data port.
    nes.cpu_write(0x2006, 0x3F);
    nes.cpu_write(0x2006, 0x01);
    nes.cpu_write(0x2007, 0x2C);

    for _ in 0..1_000 {
        nes.clock(&mut screen);
    }
    nes.reset();

    ensure!(nes.clock_count() == 0);
    ensure!(nes.cpu().resets == 2);
    // PPU memory survives a reset.
    nes.cpu_write(0x2006, 0x3F);
    nes.cpu_write(0x2006, 0x01);
    ensure!(nes.cpu_read(0x2007) == 0x2C);
    Ok(())
}

#[test]
fn reset_vector_is_read_through_the_bus() -> Result<()> {
    let mut nes = Nes::new(ProbeCpu::default());
    nes.load_rom(&synthetic_rom(1))?;
    // $FFFC mirrors PRG offset $3FFC in a 16 KiB image.
    let lo = (0x3FFC % 251) as u8;
    let hi = (0x3FFD % 251) as u8;
    ensure!(nes.cpu().pc == u16::from_le_bytes([lo, hi]));
    Ok(())
}

#[test]
fn nestest_maps_sixteen_kib_at_both_banks() -> Result<()> {
    let mut nes = Nes::new(ProbeCpu::default());
    nes.load_nestest(&synthetic_rom(1))?;

    for offset in [0u16, 0x0001, 0x1000, 0x3FFF] {
        ensure!(
            nes.cpu_read(0x8000 + offset) == nes.cpu_read(0xC000 + offset),
            "offset {offset:#06X}"
        );
    }
    ensure!(nes.cpu().pc == NESTEST_ENTRY);
    ensure!(nes.diagnostic_codes() == (0, 0));
    Ok(())
}
