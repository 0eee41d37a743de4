//! NES Picture Processing Unit (PPU) implementation with dot-level timing.
//!
//! **Quick primer**
//! - The PPU draws 262 scanlines per frame. Scanline `-1` is the *prerender*
//!   line, `0..=239` are visible, `240` is post-render, and `241..=260` are
//!   vblank. Each scanline has 341 PPU cycles ("dots").
//! - The CPU sees eight registers at `$2000-$2007` (mirrored up to `$3FFF`).
//!   Most of the PPU state lives in tiny internal latches and shift registers;
//!   mirroring that behavior is what makes the code look odd in places.
//! - Background (tiles) and foreground (sprites) render through separate
//!   pipelines. The background side runs four 16-bit shifters refilled every
//!   8 dots; the sprite side holds up to eight 8-bit shifter pairs gated by
//!   per-sprite X counters.
//! - Several features depend on *which* dot or scanline you are on (the
//!   odd-frame skipped dot, scroll copies, the sprite evaluation and fetch
//!   dots). Those checks are explicit in `clock()`.

pub mod palette;

mod background_pipeline;
mod registers;
mod sprite;
mod sprite_pipeline;

use crate::{
    bus::PatternBus,
    cartridge::header::Mirroring,
    mem_block::ppu::{Ciram, PatternRam, SecondaryOamRam},
    memory::ppu::{self as ppu_mem, Register},
    ppu::{
        background_pipeline::BgPipeline,
        palette::{Palette, PaletteRam},
        registers::{Mask, Registers, Status},
        sprite::{SpriteAttributes, SpriteView},
        sprite_pipeline::{PreparedSprite, SpritePipeline, SpritePixel},
    },
    video::{Rgba, Screen},
};

pub use registers::VramAddr;

const DOTS_PER_SCANLINE: u16 = 341;
const LAST_SCANLINE: i16 = 260;
const PRERENDER_SCANLINE: i16 = -1;
const PATTERN_SHEET_DIM: usize = 128;

/// The picture processing unit: eight CPU-visible registers in front of a
/// dot-clocked rendering state machine.
#[derive(Debug, Clone)]
pub struct Ppu {
    /// Collection of CPU visible registers and their helper latches.
    registers: Registers,
    /// Internal 2 KiB nametable RAM, mirrored per the cartridge mode.
    ciram: Ciram,
    /// Fallback pattern storage used when no cartridge drives `$0000-$1FFF`.
    pattern_ram: PatternRam,
    /// Dedicated palette RAM. Addresses between `$3F00` and `$3FFF` map here.
    palette_ram: PaletteRam,
    /// System palette resolving palette-RAM indices to RGBA.
    palette: Palette,
    /// Current dot (0..=340) within the active scanline.
    cycle: u16,
    /// Current scanline. `-1` is the prerender line, `0..=239` are visible.
    scanline: i16,
    /// Total number of frames produced so far.
    frame: u64,
    /// Tracks whether the current frame is odd. Drives the skipped-dot logic.
    odd_frame: bool,
    /// Set when the scanline counter wraps; the driver takes and clears it.
    frame_complete: bool,
    /// Background pixel pipeline (pattern and attribute shifters).
    bg_pipeline: BgPipeline,
    /// Sprite pixel pipeline for the current scanline.
    sprite_pipeline: SpritePipeline,
    /// Secondary OAM filled by sprite evaluation at dot 257.
    secondary_oam: SecondaryOamRam,
    /// Number of sprites selected for the next scanline (0..=8).
    sprite_count: u8,
    /// Whether OAM entry 0 was selected during the last evaluation.
    sprite_zero_possible: bool,
    /// Current level of the NMI output line (true = asserted).
    nmi_output: bool,
    /// Latched NMI request, cleared by the driver when delivered.
    nmi_pending: bool,
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Ppu {
    /// Creates a new PPU with cleared memories and default register values.
    pub fn new() -> Self {
        Self::with_palette(Palette::default())
    }

    /// Creates a new PPU resolving colors through the given system palette.
    pub fn with_palette(palette: Palette) -> Self {
        Self {
            registers: Registers::new(),
            ciram: Ciram::new(),
            pattern_ram: PatternRam::new(),
            palette_ram: PaletteRam::new(),
            palette,
            cycle: 0,
            scanline: PRERENDER_SCANLINE,
            frame: 0,
            odd_frame: false,
            frame_complete: false,
            bg_pipeline: BgPipeline::new(),
            sprite_pipeline: SpritePipeline::new(),
            secondary_oam: SecondaryOamRam::new(),
            sprite_count: 0,
            sprite_zero_possible: false,
            nmi_output: false,
            nmi_pending: false,
        }
    }

    /// Restores the device to its power-on state. Memories, registers, and
    /// position counters all return to the cold-boot values; the system
    /// palette is kept.
    pub fn reset(&mut self) {
        let palette = std::mem::replace(&mut self.palette, Palette::default());
        *self = Self::with_palette(palette);
    }

    /// Replaces the system palette used for color resolution.
    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    /// Current scanline (`-1..=260`).
    pub fn scanline(&self) -> i16 {
        self.scanline
    }

    /// Current dot within the scanline (`0..=340`).
    pub fn cycle(&self) -> u16 {
        self.cycle
    }

    /// Frame counter (increments when scanline 260 wraps to the prerender line).
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Non-destructive view of the vblank flag (reading `$2002` clears it).
    pub fn vblank(&self) -> bool {
        self.registers.status.contains(Status::VBLANK)
    }

    /// Non-destructive view of the sprite-zero-hit flag.
    pub fn sprite_zero_hit(&self) -> bool {
        self.registers.status.contains(Status::SPRITE_ZERO_HIT)
    }

    /// Non-destructive view of the sprite-overflow flag.
    pub fn sprite_overflow(&self) -> bool {
        self.registers.status.contains(Status::SPRITE_OVERFLOW)
    }

    /// Current NMI output level: asserted while vblank is set and the
    /// generate-NMI control bit is on.
    pub fn nmi_output(&self) -> bool {
        self.nmi_output
    }

    /// Consumes the pending NMI edge, if one has been latched.
    pub fn take_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi_pending)
    }

    /// True after the last dot of a frame until the driver consumes it.
    pub fn frame_complete(&self) -> bool {
        self.frame_complete
    }

    /// Consumes the frame-complete flag.
    pub fn take_frame_complete(&mut self) -> bool {
        std::mem::take(&mut self.frame_complete)
    }

    /// Read-only view of primary OAM.
    pub fn oam(&self) -> &[u8] {
        self.registers.oam.as_slice()
    }

    /// Mutable view of primary OAM, for DMA-style bulk uploads.
    pub fn oam_mut(&mut self) -> &mut [u8] {
        self.registers.oam.as_mut_slice()
    }

    // ------------------------------------------------------------------
    // CPU register interface ($2000-$2007, mirrored)
    // ------------------------------------------------------------------

    /// Handles CPU reads from the mirrored PPU register space.
    pub fn cpu_read(&mut self, addr: u16, pattern: &mut PatternBus<'_>) -> u8 {
        match Register::from_cpu_addr(addr) {
            Register::Status => self.read_status(),
            Register::OamData => self.registers.oam[self.registers.oam_addr as usize],
            Register::Data => self.read_vram_data(pattern),
            // Write-only registers are not driven on reads.
            _ => 0,
        }
    }

    /// Handles CPU writes to the mirrored PPU register space.
    pub fn cpu_write(&mut self, addr: u16, value: u8, pattern: &mut PatternBus<'_>) {
        match Register::from_cpu_addr(addr) {
            Register::Control => {
                self.registers.write_control(value);
                // Turning the NMI enable on mid-vblank produces a fresh edge.
                self.update_nmi_output();
            }
            Register::Mask => self.registers.mask = Mask::from_bits_retain(value),
            Register::Status => {} // read-only
            Register::OamAddr => self.registers.oam_addr = value,
            Register::OamData => {
                self.registers.oam[self.registers.oam_addr as usize] = value;
            }
            Register::Scroll => self.registers.vram.write_scroll(value),
            Register::Addr => {
                if let Some(addr) = self.registers.vram.write_addr(value) {
                    self.registers.vram.v = addr;
                }
            }
            Register::Data => self.write_vram_data(value, pattern),
        }
    }

    fn read_status(&mut self) -> u8 {
        // The undriven low five bits carry stale data-buffer remnants.
        let value = self.registers.status.bits() | (self.registers.vram_buffer & 0x1F);
        self.registers.status.remove(Status::VBLANK);
        self.registers.vram.reset_latch();
        self.update_nmi_output();
        value
    }

    fn write_vram_data(&mut self, value: u8, pattern: &mut PatternBus<'_>) {
        let addr = self.registers.vram.v.raw() & ppu_mem::VRAM_MIRROR_MASK;
        self.write_vram(pattern, addr, value);
        let increment = self.registers.control.vram_increment();
        self.registers.vram.v.increment(increment);
    }

    fn read_vram_data(&mut self, pattern: &mut PatternBus<'_>) -> u8 {
        let addr = self.registers.vram.v.raw() & ppu_mem::VRAM_MIRROR_MASK;
        let data = self.read_vram(pattern, addr);

        let value = if addr >= ppu_mem::PALETTE_BASE {
            // Palette reads bypass the buffer, which is refilled from the
            // nametable space underneath the palette window.
            self.registers.vram_buffer = self.read_vram(pattern, addr & 0x2FFF);
            data
        } else {
            std::mem::replace(&mut self.registers.vram_buffer, data)
        };

        let increment = self.registers.control.vram_increment();
        self.registers.vram.v.increment(increment);
        value
    }

    // ------------------------------------------------------------------
    // PPU bus ($0000-$3FFF)
    // ------------------------------------------------------------------

    /// Reads one byte from the 14-bit PPU address space.
    pub fn read_vram(&mut self, pattern: &mut PatternBus<'_>, addr: u16) -> u8 {
        let addr = addr & ppu_mem::VRAM_MIRROR_MASK;
        match addr {
            0x0000..=ppu_mem::PATTERN_SPACE_END => match pattern.read(addr) {
                Some(value) => value,
                None => self.pattern_ram[addr as usize],
            },
            ppu_mem::NAMETABLE_BASE..=ppu_mem::NAMETABLE_END => {
                self.ciram[ciram_index(addr, pattern.mirroring())]
            }
            _ => self.palette_ram.read(addr),
        }
    }

    /// Writes one byte to the 14-bit PPU address space.
    pub fn write_vram(&mut self, pattern: &mut PatternBus<'_>, addr: u16, value: u8) {
        let addr = addr & ppu_mem::VRAM_MIRROR_MASK;
        match addr {
            0x0000..=ppu_mem::PATTERN_SPACE_END => {
                if !pattern.write(addr, value) {
                    self.pattern_ram[addr as usize] = value;
                }
            }
            ppu_mem::NAMETABLE_BASE..=ppu_mem::NAMETABLE_END => {
                self.ciram[ciram_index(addr, pattern.mirroring())] = value;
            }
            _ => self.palette_ram.write(addr, value),
        }
    }

    // ------------------------------------------------------------------
    // Dot clock
    // ------------------------------------------------------------------

    /// Advances the PPU by a single dot.
    ///
    /// This is the main timing entry: it runs the fetch windows, drives both
    /// pixel pipelines, emits one pixel on visible dots, and raises vblank at
    /// scanline 241 dot 1. Call once per system tick (three times per CPU
    /// cycle for NTSC timing).
    pub fn clock(&mut self, pattern: &mut PatternBus<'_>, screen: &mut dyn Screen) {
        let rendering = self.registers.mask.rendering_enabled();

        if (PRERENDER_SCANLINE..=239).contains(&self.scanline) {
            // Odd frames drop the idle dot at the top-left corner.
            if self.scanline == 0 && self.cycle == 0 && self.odd_frame && rendering {
                self.cycle = 1;
            }

            if self.scanline == PRERENDER_SCANLINE && self.cycle == 1 {
                self.registers
                    .status
                    .remove(Status::VBLANK | Status::SPRITE_OVERFLOW | Status::SPRITE_ZERO_HIT);
                self.sprite_pipeline.clear();
                self.nmi_pending = false;
                self.update_nmi_output();
            }

            // The five-phase memory cadence repeats every 8 dots across the
            // visible window and the two-tile prefetch at the end of the line.
            let in_fetch_window =
                (2..=257).contains(&self.cycle) || (321..=337).contains(&self.cycle);
            if in_fetch_window {
                self.shift_pipelines();

                match (self.cycle - 1) % 8 {
                    0 => {
                        self.bg_pipeline.reload_from_latch();
                        let addr = self.registers.vram.v.tile_address();
                        let id = self.read_vram(pattern, addr);
                        self.bg_pipeline.latch_tile_id(id);
                    }
                    2 => {
                        let v = self.registers.vram.v;
                        let mut attribute = self.read_vram(pattern, v.attribute_address());
                        // The attribute byte packs four 2x2-tile quadrants;
                        // coarse X/Y bit 1 selects which pair of bits applies.
                        if v.coarse_y & 0b10 != 0 {
                            attribute >>= 4;
                        }
                        if v.coarse_x & 0b10 != 0 {
                            attribute >>= 2;
                        }
                        self.bg_pipeline.latch_attribute(attribute & 0b11);
                    }
                    4 => {
                        let addr = self.background_pattern_addr();
                        let low = self.read_vram(pattern, addr);
                        self.bg_pipeline.latch_pattern_low(low);
                    }
                    6 => {
                        let addr = self.background_pattern_addr() + 8;
                        let high = self.read_vram(pattern, addr);
                        self.bg_pipeline.latch_pattern_high(high);
                    }
                    7 => {
                        if rendering {
                            self.registers.vram.v.advance_tile();
                        }
                    }
                    _ => {}
                }
            }

            if self.cycle == 256 && rendering {
                self.registers.vram.v.advance_row();
            }

            if self.cycle == 257 {
                self.bg_pipeline.reload_from_latch();
                if rendering {
                    let t = self.registers.vram.t;
                    self.registers.vram.v.reload_horizontal(t);
                }
                if self.scanline >= 0 {
                    self.evaluate_sprites();
                }
            }

            // Redundant nametable fetches at the end of the line.
            if self.cycle == 337 || self.cycle == 339 {
                let addr = self.registers.vram.v.tile_address();
                let id = self.read_vram(pattern, addr);
                self.bg_pipeline.latch_tile_id(id);
            }

            if self.scanline == PRERENDER_SCANLINE
                && (280..=304).contains(&self.cycle)
                && rendering
            {
                let t = self.registers.vram.t;
                self.registers.vram.v.reload_vertical(t);
            }

            if self.cycle == 340 && self.scanline >= 0 {
                self.fetch_sprites(pattern);
            }
        }

        if self.scanline == 241 && self.cycle == 1 {
            self.registers.status.insert(Status::VBLANK);
            tracing::trace!(frame = self.frame, "vblank start");
            self.update_nmi_output();
        }

        if (0..=239).contains(&self.scanline) && (1..=256).contains(&self.cycle) {
            self.render_pixel(screen);
        }

        self.advance_cycle();
    }

    /// Advances to the next dot / scanline / frame.
    fn advance_cycle(&mut self) {
        self.cycle += 1;
        if self.cycle >= DOTS_PER_SCANLINE {
            self.cycle = 0;
            self.scanline += 1;

            if self.scanline > LAST_SCANLINE {
                self.scanline = PRERENDER_SCANLINE;
                self.frame = self.frame.wrapping_add(1);
                self.odd_frame = !self.odd_frame;
                self.frame_complete = true;
            }
        }
    }

    /// Recomputes the NMI output level, latching a pending NMI on the rising
    /// edge. The level is `vblank && generate_nmi`, so both setting vblank and
    /// enabling the control bit mid-vblank can produce an edge.
    fn update_nmi_output(&mut self) {
        let level =
            self.registers.status.contains(Status::VBLANK) && self.registers.control.nmi_enabled();
        if level && !self.nmi_output {
            self.nmi_pending = true;
            tracing::trace!(
                frame = self.frame,
                scanline = self.scanline,
                cycle = self.cycle,
                "nmi edge"
            );
        }
        self.nmi_output = level;
    }

    // ------------------------------------------------------------------
    // Background pipeline
    // ------------------------------------------------------------------

    /// Advances shifters by one dot inside the fetch window. Background
    /// shifters run only while background rendering is enabled; sprite X
    /// counters run only while sprite rendering is enabled, during the
    /// visible portion of the line.
    fn shift_pipelines(&mut self) {
        if self.registers.mask.contains(Mask::BACKGROUND) {
            self.bg_pipeline.shift();
        }
        if self.registers.mask.contains(Mask::SPRITES) && self.cycle < 258 {
            self.sprite_pipeline.tick();
        }
    }

    /// Pattern address of the currently latched background tile row.
    fn background_pattern_addr(&self) -> u16 {
        self.registers.control.background_pattern_table()
            | (u16::from(self.bg_pipeline.tile_id()) << 4)
            | u16::from(self.registers.vram.v.fine_y)
    }

    // ------------------------------------------------------------------
    // Sprite pipeline
    // ------------------------------------------------------------------

    /// Sprite evaluation at dot 257: selects up to 8 sprites from primary OAM
    /// for the next scanline. A ninth in-range sprite sets the overflow flag
    /// and ends the scan.
    fn evaluate_sprites(&mut self) {
        self.secondary_oam.as_mut_slice().fill(0xFF);
        self.sprite_count = 0;
        self.sprite_zero_possible = false;

        let sprite_height = self.registers.control.sprite_height();

        for (index, entry) in self
            .registers
            .oam
            .chunks_exact(ppu_mem::OAM_ENTRY_SIZE)
            .enumerate()
        {
            let sprite = SpriteView::new(entry);
            let row = self.scanline - i16::from(sprite.y());
            if !(0..sprite_height).contains(&row) {
                continue;
            }

            if self.sprite_count < 8 {
                if index == 0 {
                    self.sprite_zero_possible = true;
                }
                let base = self.sprite_count as usize * ppu_mem::OAM_ENTRY_SIZE;
                self.secondary_oam[base..base + ppu_mem::OAM_ENTRY_SIZE]
                    .copy_from_slice(sprite.as_bytes());
                self.sprite_count += 1;
            } else {
                self.registers.status.insert(Status::SPRITE_OVERFLOW);
                break;
            }
        }
    }

    /// Sprite fetch at dot 340: reads pattern data for every selected sprite
    /// and arms the shifter slots for the next scanline.
    fn fetch_sprites(&mut self, pattern: &mut PatternBus<'_>) {
        let mut line = [PreparedSprite::default(); 8];
        let count = self.sprite_count as usize;

        for (index, prepared) in line.iter_mut().take(count).enumerate() {
            let base = index * ppu_mem::OAM_ENTRY_SIZE;
            let entry = SpriteView::new(&self.secondary_oam[base..base + ppu_mem::OAM_ENTRY_SIZE]);
            let (y, tile, attributes, x) = (entry.y(), entry.tile(), entry.attributes(), entry.x());

            let (low_addr, high_addr) = self.sprite_pattern_addr(y, tile, attributes);
            let mut low = self.read_vram(pattern, low_addr);
            let mut high = self.read_vram(pattern, high_addr);
            if attributes.contains(SpriteAttributes::FLIP_HORIZONTAL) {
                low = low.reverse_bits();
                high = high.reverse_bits();
            }

            *prepared = PreparedSprite {
                pattern_low: low,
                pattern_high: high,
                attributes,
                x,
                sprite0: self.sprite_zero_possible && index == 0,
            };
        }

        self.sprite_pipeline.load_scanline(&line[..count]);
    }

    /// Low/high pattern addresses for one sprite row, covering 8x8 and 8x16
    /// modes with vertical flip.
    fn sprite_pattern_addr(&self, y: u8, tile: u8, attributes: SpriteAttributes) -> (u16, u16) {
        let control = self.registers.control;
        let height = control.sprite_height();
        let row = (self.scanline - i16::from(y)).clamp(0, height - 1) as u16;
        let flip_v = attributes.contains(SpriteAttributes::FLIP_VERTICAL);
        let fine = if flip_v { 7 - (row & 7) } else { row & 7 };

        let low = if height == 8 {
            control.sprite_pattern_table() | (u16::from(tile) << 4) | fine
        } else {
            // 8x16: bit 0 of the tile id selects the table, the even id is
            // the top half. Vertical flip swaps which half serves which rows.
            let table = if tile & 1 != 0 {
                ppu_mem::PATTERN_TABLE_1
            } else {
                ppu_mem::PATTERN_TABLE_0
            };
            let top = u16::from(tile & 0xFE);
            let half = if (row < 8) != flip_v { top } else { top + 1 };
            table | (half << 4) | fine
        };

        (low, low + 8)
    }

    // ------------------------------------------------------------------
    // Pixel output
    // ------------------------------------------------------------------

    /// Combines the background and sprite pixels for the current dot,
    /// resolves priority and sprite-zero hits, and emits one RGBA pixel.
    fn render_pixel(&mut self, screen: &mut dyn Screen) {
        let mask = self.registers.mask;
        let x = i32::from(self.cycle) - 1;
        let y = i32::from(self.scanline);

        let (mut bg_palette, mut bg_pixel) = (0u8, 0u8);
        if mask.contains(Mask::BACKGROUND) && (x >= 8 || mask.contains(Mask::BACKGROUND_LEFT)) {
            let (palette, pixel) = self.bg_pipeline.sample(self.registers.vram.x);
            bg_palette = palette;
            bg_pixel = pixel;
        }

        let mut sprite = SpritePixel::default();
        if mask.contains(Mask::SPRITES) && (x >= 8 || mask.contains(Mask::SPRITES_LEFT)) {
            sprite = self.sprite_pipeline.sample();
        }

        let (pixel, palette) = match (bg_pixel != 0, sprite.color != 0) {
            (false, false) => (0, 0),
            (false, true) => (sprite.color, sprite.palette + 4),
            (true, false) => (bg_pixel, bg_palette),
            (true, true) => {
                self.detect_sprite_zero_hit(sprite.sprite0);
                if sprite.priority_behind_bg {
                    (bg_pixel, bg_palette)
                } else {
                    (sprite.color, sprite.palette + 4)
                }
            }
        };

        let color = self.resolve_color(palette, pixel);
        screen.draw_pixel(x, y, color);
    }

    /// Sets the sprite-zero-hit flag when an opaque sprite-0 pixel overlaps an
    /// opaque background pixel, subject to the left-edge policy of the mask
    /// register.
    fn detect_sprite_zero_hit(&mut self, pixel_from_sprite0: bool) {
        if !pixel_from_sprite0 || !self.sprite_zero_possible {
            return;
        }

        let mask = self.registers.mask;
        if !mask.contains(Mask::BACKGROUND) || !mask.contains(Mask::SPRITES) {
            return;
        }

        // With both left-8 bits clear, the first eight dots cannot hit.
        let min_cycle = if mask.contains(Mask::BACKGROUND_LEFT) || mask.contains(Mask::SPRITES_LEFT)
        {
            1
        } else {
            9
        };
        if (min_cycle..=257).contains(&self.cycle) {
            if !self.registers.status.contains(Status::SPRITE_ZERO_HIT) {
                tracing::trace!(
                    scanline = self.scanline,
                    cycle = self.cycle,
                    "sprite zero hit"
                );
            }
            self.registers.status.insert(Status::SPRITE_ZERO_HIT);
        }
    }

    /// Looks up the final RGBA color for a palette/pixel pair, applying the
    /// greyscale and emphasis bits of the mask register.
    fn resolve_color(&self, palette: u8, pixel: u8) -> Rgba {
        let addr = ppu_mem::PALETTE_BASE | (u16::from(palette) << 2) | u16::from(pixel);
        let mut index = self.palette_ram.read(addr) & 0x3F;
        if self.registers.mask.contains(Mask::GREYSCALE) {
            index &= 0x30;
        }
        self.apply_emphasis(self.palette.color(index))
    }

    fn apply_emphasis(&self, color: Rgba) -> Rgba {
        let mask = self.registers.mask;
        if !mask.emphasis_active() {
            return color;
        }

        // Each emphasis bit dims the other two channels to three quarters.
        let attenuate = |channel: u8| (u16::from(channel) * 3 / 4) as u8;
        let mut out = color;
        if mask.contains(Mask::EMPHASIS_RED) {
            out.g = attenuate(out.g);
            out.b = attenuate(out.b);
        }
        if mask.contains(Mask::EMPHASIS_GREEN) {
            out.r = attenuate(out.r);
            out.b = attenuate(out.b);
        }
        if mask.contains(Mask::EMPHASIS_BLUE) {
            out.r = attenuate(out.r);
            out.g = attenuate(out.g);
        }
        out
    }

    // ------------------------------------------------------------------
    // Debug helpers
    // ------------------------------------------------------------------

    /// Decodes one 4 KiB pattern table into a 128x128 RGBA tile sheet using
    /// the given palette. Intended for `Screen::draw_rgba` debug overlays.
    pub fn pattern_table_sheet(
        &mut self,
        pattern: &mut PatternBus<'_>,
        table: u8,
        palette: u8,
    ) -> Vec<Rgba> {
        let base = u16::from(table & 1) * ppu_mem::PATTERN_TABLE_SIZE;
        let mut sheet = vec![Rgba::BLACK; PATTERN_SHEET_DIM * PATTERN_SHEET_DIM];

        for tile_y in 0..16u16 {
            for tile_x in 0..16u16 {
                let offset = tile_y * 256 + tile_x * 16;
                for row in 0..8u16 {
                    let mut low = self.read_vram(pattern, base + offset + row);
                    let mut high = self.read_vram(pattern, base + offset + row + 8);
                    for col in 0..8usize {
                        let pixel = (low & 1) | ((high & 1) << 1);
                        low >>= 1;
                        high >>= 1;
                        // The least significant bit is the rightmost pixel.
                        let x = tile_x as usize * 8 + (7 - col);
                        let y = tile_y as usize * 8 + row as usize;
                        sheet[y * PATTERN_SHEET_DIM + x] = self.resolve_color(palette, pixel);
                    }
                }
            }
        }

        sheet
    }
}

/// Folds a nametable address (`$2000-$3EFF`) onto the 2 KiB CIRAM according
/// to the cartridge's mirroring mode.
fn ciram_index(addr: u16, mirroring: Mirroring) -> usize {
    let relative = addr & 0x0FFF;
    let table = (relative / ppu_mem::NAMETABLE_SIZE) as u8;
    let offset = relative & 0x03FF;

    let physical = match mirroring {
        // Horizontal: $2000/$2400 share table 0, $2800/$2C00 share table 1.
        Mirroring::Horizontal => (table >> 1) & 0b01,
        // Vertical: $2000/$2800 share table 0, $2400/$2C00 share table 1.
        Mirroring::Vertical => table & 0b01,
    };

    usize::from(physical) * ppu_mem::NAMETABLE_SIZE as usize + offset as usize
}
