use super::sprite::SpriteAttributes;

/// A single sprite slot for the current scanline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
struct SpriteSlot {
    /// Pattern bitplane 0 (shifted left once per dot after X expires).
    pattern_low: u8,
    /// Pattern bitplane 1 (shifted left once per dot after X expires).
    pattern_high: u8,
    /// Latched attributes (palette select, priority, flips).
    attributes: SpriteAttributes,
    /// X counter delaying sprite visibility.
    x_counter: u8,
    /// Indicates this slot belongs to OAM sprite 0.
    sprite0: bool,
}

/// Sprite data prepared by the dot-340 fetch for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct PreparedSprite {
    /// Bitplane 0, already bit-reversed when the sprite is flipped
    /// horizontally so that shifting left always walks pixels left-to-right.
    pub(crate) pattern_low: u8,
    /// Bitplane 1, same pre-flip treatment as `pattern_low`.
    pub(crate) pattern_high: u8,
    pub(crate) attributes: SpriteAttributes,
    pub(crate) x: u8,
    pub(crate) sprite0: bool,
}

/// Sprite pixel information produced by the pipeline for a single dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub(crate) struct SpritePixel {
    /// Sprite palette select (0..=3).
    pub(crate) palette: u8,
    /// Sprite color index within the palette (0..=3, 0 means transparent).
    pub(crate) color: u8,
    /// Whether the sprite has background priority (is drawn behind).
    pub(crate) priority_behind_bg: bool,
    /// Whether this pixel came from sprite 0.
    pub(crate) sprite0: bool,
}

/// Sprite pixel pipeline for the current scanline.
///
/// The PPU has space for eight sprites per scanline. Each sprite has two
/// 8-bit pattern shifters and an X counter. While the counter is non-zero the
/// slot is invisible; once it expires the shifters output one pixel per dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct SpritePipeline {
    slots: [SpriteSlot; 8],
    active_count: u8,
}

impl SpritePipeline {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Clears all sprite shifters and deactivates every slot.
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }

    /// Loads sprite data for the next scanline from the fetch stage.
    pub(crate) fn load_scanline(&mut self, sprites: &[PreparedSprite]) {
        self.clear();
        self.active_count = sprites.len().min(8) as u8;

        for (slot, sprite) in self.slots.iter_mut().zip(sprites) {
            *slot = SpriteSlot {
                pattern_low: sprite.pattern_low,
                pattern_high: sprite.pattern_high,
                attributes: sprite.attributes,
                x_counter: sprite.x,
                sprite0: sprite.sprite0,
            };
        }
    }

    /// Advances every active slot by one dot: counts down X, then shifts.
    pub(crate) fn tick(&mut self) {
        for slot in self.slots.iter_mut().take(self.active_count as usize) {
            if slot.x_counter > 0 {
                slot.x_counter -= 1;
            } else {
                slot.pattern_low <<= 1;
                slot.pattern_high <<= 1;
            }
        }
    }

    /// Samples the sprite pixel for the current dot.
    ///
    /// Slots are scanned in secondary-OAM order; the first slot whose X delay
    /// has expired and whose pixel is opaque wins, which is how the hardware
    /// resolves sprite-on-sprite priority.
    pub(crate) fn sample(&self) -> SpritePixel {
        for slot in self.slots.iter().take(self.active_count as usize) {
            if slot.x_counter != 0 {
                continue;
            }

            let bit0 = (slot.pattern_low >> 7) & 1;
            let bit1 = (slot.pattern_high >> 7) & 1;
            let color = (bit1 << 1) | bit0;
            if color != 0 {
                return SpritePixel {
                    palette: slot.attributes.palette(),
                    color,
                    priority_behind_bg: slot
                        .attributes
                        .contains(SpriteAttributes::PRIORITY_BEHIND_BACKGROUND),
                    sprite0: slot.sprite0,
                };
            }
        }

        SpritePixel::default()
    }
}
