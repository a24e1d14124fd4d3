//! Architecture presets and the quirk flags that separate CHIP-8's dialects.

use bitflags::bitflags;

/// One of the seven instruction dialects the core can emulate.
///
/// Selecting an `Architecture` fixes the default [`QuirkFlags`], the
/// memory size, the stack capacity and the number of display planes;
/// individual quirks can still be overridden afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    /// Original 1977 Cosmac VIP interpreter, 64x32, 4 KiB RAM.
    Chip8,
    /// Cosmac VIP "hi-res" variant, 64x64, otherwise identical to [`Architecture::Chip8`].
    Chip8HiRes,
    /// HP48 CHIP-48 port, introduces the shift/jump/load quirks.
    Chip48,
    /// HP48 Super-CHIP 1.0, adds 128x64 mode and RPL flag registers.
    SuperChip1_0,
    /// HP48 Super-CHIP 1.1, the commonly emulated Super-CHIP dialect.
    SuperChip1_1,
    /// Octo's XO-CHIP extension: 64 KiB RAM, up to 4 planes, audio pattern buffer.
    XoChip,
    /// XO-CHIP with the 16-colour (4-plane) palette extension.
    XoChip16Color,
}

impl Architecture {
    /// Number of bytes of addressable memory.
    pub const fn memory_size(self) -> usize {
        match self {
            Architecture::XoChip | Architecture::XoChip16Color => 0x10000,
            _ => 0x1000,
        }
    }

    /// Number of 12-bit return addresses the call stack can hold.
    pub const fn stack_capacity(self) -> usize {
        match self {
            Architecture::Chip8 | Architecture::Chip8HiRes => 12,
            _ => 16,
        }
    }

    /// Number of independent display planes.
    pub const fn plane_count(self) -> u8 {
        match self {
            Architecture::XoChip16Color => 4,
            Architecture::XoChip => 2,
            _ => 1,
        }
    }

    /// Number of persistent user-flag (RPL) registers addressable by
    /// `FX75`/`FX85`.
    pub const fn flag_register_count(self) -> usize {
        match self {
            Architecture::SuperChip1_0 | Architecture::SuperChip1_1 => 8,
            Architecture::XoChip | Architecture::XoChip16Color => 16,
            _ => 0,
        }
    }

    /// Native (low-resolution) display dimensions.
    pub const fn base_resolution(self) -> (usize, usize) {
        match self {
            Architecture::Chip8HiRes => (64, 64),
            _ => (64, 32),
        }
    }

    /// High-resolution display dimensions, when the architecture supports
    /// toggling into one via `00FE`/`00FF`.
    pub const fn extended_resolution(self) -> Option<(usize, usize)> {
        match self {
            Architecture::Chip48
            | Architecture::SuperChip1_0
            | Architecture::SuperChip1_1
            | Architecture::XoChip
            | Architecture::XoChip16Color => Some((128, 64)),
            _ => None,
        }
    }

    /// Default quirk set for this architecture, before any caller override.
    pub fn default_quirks(self) -> QuirkFlags {
        match self {
            Architecture::Chip8 | Architecture::Chip8HiRes => {
                QuirkFlags::LOGIC | QuirkFlags::SPRITE_DELAY
            }
            Architecture::Chip48 => QuirkFlags::SHIFT | QuirkFlags::JUMP | QuirkFlags::SCREEN_WRAP,
            Architecture::SuperChip1_0 | Architecture::SuperChip1_1 => {
                QuirkFlags::SHIFT | QuirkFlags::JUMP | QuirkFlags::LOAD | QuirkFlags::SPRITE_DELAY
            }
            Architecture::XoChip | Architecture::XoChip16Color => {
                QuirkFlags::SCREEN_WRAP | QuirkFlags::INDEX_INCREMENT
            }
        }
    }
}

bitflags! {
    /// Deviations between otherwise identically-encoded opcodes.
    ///
    /// An `Architecture` fixes a sensible default; callers may still flip
    /// individual bits to emulate a specific interpreter's idiosyncrasies.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct QuirkFlags: u16 {
        /// `FX55`/`FX65` leave `I` unchanged (off: `I += x + 1`).
        const LOAD = 1 << 0;
        /// `8XY6`/`8XYE` shift `Vx` in place (off: shift `Vy` into `Vx`).
        const SHIFT = 1 << 1;
        /// `8XY1`/`8XY2`/`8XY3` clear `VF` after the operation.
        const LOGIC = 1 << 2;
        /// `FX1E` sets `VF` on 12-bit index overflow.
        const INDEX_OVERFLOW = 1 << 3;
        /// `FX55`/`FX65` increment `I` by `x` rather than `x + 1`.
        const INDEX_INCREMENT = 1 << 4;
        /// `BNNN` uses `Vx` (high nibble of NNN selects the register) rather than `V0`.
        const JUMP = 1 << 5;
        /// `DXYN` stalls the CPU until the next 60 Hz video tick.
        const SPRITE_DELAY = 1 << 6;
        /// Sprites wrap around both axes instead of clipping at the edges.
        const SCREEN_WRAP = 1 << 7;
    }
}
