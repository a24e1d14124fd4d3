//! Top-level machine state: the single owned aggregate of memory,
//! registers, stack, framebuffer, timers, and keypad for one ROM run.

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::dispatch::DISPATCH_TABLE;
use crate::display::Framebuffer;
use crate::error::{ConfigError, Trap};
use crate::keypad::Keypad;
use crate::memory::Memory;
use crate::opcode::Decoded;
use crate::quirks::{Architecture, QuirkFlags};
use crate::registers::Registers;
use crate::stack::Stack;
use crate::timers::Timers;

/// Base tone frequency, in Hz, that XO-CHIP pitch (`FX3A`) scales from.
pub const XO_CHIP_BASE_TONE_HZ: f32 = 4000.0;
/// `FX3A` argument that reproduces the base tone unscaled.
pub const DEFAULT_PITCH: u8 = 64;
/// Bytes consumed by every fetch (instructions are always 16-bit words).
const INSTRUCTION_STEP: u16 = 2;

/// One runnable instance of the emulation core.
///
/// Owns every piece of mutable state named in the architecture's data
/// model: memory, registers, stack, framebuffer, timers, and keypad.
/// There is no process-wide singleton; the host constructs one
/// `Machine` per ROM run and pairs it with a [`crate::Scheduler`] and
/// the three port implementations.
pub struct Machine {
    pub(crate) memory: Memory,
    pub(crate) registers: Registers,
    pub(crate) stack: Stack<u16>,
    pub(crate) framebuffer: Framebuffer,
    pub(crate) timers: Timers,
    pub(crate) keypad: Keypad,
    pub(crate) rng: SmallRng,
    pub(crate) architecture: Architecture,
    pub(crate) quirks: QuirkFlags,
    /// XO-CHIP `F002` pattern buffer, clocked by the `Audio` port.
    pub(crate) audio_pattern: [u8; 16],
    /// XO-CHIP `FX3A` pitch register.
    pub(crate) pitch: u8,
    /// Set by the `00FD` (Super-CHIP EXIT) opcode.
    pub(crate) halted: bool,
    /// When set, a decode error is logged and skipped instead of trapping.
    pub(crate) debug_on_invalid_opcode: bool,
    /// Set once [`Machine::tick_timers`] has run at least once. The
    /// `sprite_delay` quirk's video-timer gate only engages after this,
    /// so a host driving `step` directly without a `Scheduler` (tests,
    /// deterministic tooling) never deadlocks waiting for a 60 Hz tick
    /// that nobody is producing.
    pub(crate) clock_has_ticked: bool,
}

impl Machine {
    /// Boots a machine for `architecture` with its default quirks.
    ///
    /// Equivalent to `Machine::with_quirks(architecture, architecture.default_quirks())`.
    pub fn new(architecture: Architecture) -> Result<Self, ConfigError> {
        Self::with_quirks(architecture, architecture.default_quirks())
    }

    /// Boots a machine for `architecture`, overriding its default quirks.
    pub fn with_quirks(architecture: Architecture, quirks: QuirkFlags) -> Result<Self, ConfigError> {
        let plane_count = architecture.plane_count();
        if plane_count > 4 {
            return Err(ConfigError::TooManyPlanes {
                requested: plane_count,
                max: 4,
            });
        }
        let stack_capacity = architecture.stack_capacity();
        let min_stack = 12;
        if stack_capacity < min_stack {
            return Err(ConfigError::StackTooSmall {
                requested: stack_capacity,
                min: min_stack,
            });
        }

        let memory = Memory::new(architecture.memory_size());
        let pc = crate::memory::PROGRAM_START;
        Ok(Self {
            memory,
            registers: Registers::new(pc),
            stack: Stack::new(stack_capacity),
            framebuffer: Framebuffer::new(architecture),
            timers: Timers::new(),
            keypad: Keypad::new(),
            rng: SmallRng::seed_from_u64(0xDEAD_CAFE_DEAD_CAFE),
            architecture,
            quirks,
            audio_pattern: [0; 16],
            pitch: DEFAULT_PITCH,
            halted: false,
            debug_on_invalid_opcode: false,
            clock_has_ticked: false,
        })
    }

    /// Seeds the random number generator used by `CXNN`. Tests and
    /// deterministic replays should call this before loading a ROM.
    pub fn seed_rng(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }

    /// Downgrades decode errors to a logged skip instead of a fatal trap.
    pub fn set_debug_on_invalid_opcode(&mut self, debug: bool) {
        self.debug_on_invalid_opcode = debug;
    }

    /// Loads `rom` at the program start address.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), ConfigError> {
        let capacity = self.memory.rom_capacity();
        if rom.len() > capacity {
            return Err(ConfigError::RomTooLarge {
                len: rom.len(),
                capacity,
            });
        }
        self.memory.load_rom(rom);
        Ok(())
    }

    /// Restarts execution at the program start address. Memory beyond the
    /// reserved font area, registers, the stack, and the framebuffer are
    /// cleared; persistent user-flag registers and ROM content are not
    /// reloaded (callers must `load_rom` again for a fresh run).
    pub fn reset(&mut self) {
        self.registers.reset(crate::memory::PROGRAM_START);
        self.stack.clear();
        self.framebuffer.clear_selected();
        self.framebuffer.set_plane_mask(1);
        self.timers = Timers::new();
        self.halted = false;
        self.clock_has_ticked = false;
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn architecture(&self) -> Architecture {
        self.architecture
    }

    pub fn quirks(&self) -> QuirkFlags {
        self.quirks
    }

    pub fn set_quirks(&mut self, quirks: QuirkFlags) {
        self.quirks = quirks;
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.framebuffer
    }

    pub fn keypad_mut(&mut self) -> &mut Keypad {
        &mut self.keypad
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn audio_pattern(&self) -> [u8; 16] {
        self.audio_pattern
    }

    /// Current XO-CHIP tone frequency, derived from the pitch register.
    pub fn tone_hz(&self) -> f32 {
        let exponent = (self.pitch as f32 - DEFAULT_PITCH as f32) / 48.0;
        XO_CHIP_BASE_TONE_HZ * libm_pow2(exponent)
    }

    pub fn program_counter(&self) -> u16 {
        self.registers.pc
    }

    /// Advances the timers by one 60 Hz tick. Called by the
    /// [`crate::Scheduler`], never by `step` itself.
    pub fn tick_timers(&mut self) {
        self.timers.tick();
        self.clock_has_ticked = true;
    }

    /// Fetches, decodes, and executes exactly one instruction.
    ///
    /// `FX0A` (key wait) and a `sprite_delay`-gated `DXYN` may leave `PC`
    /// unchanged so the same instruction is re-entered on the next call,
    /// rather than suspending this call.
    pub fn step(&mut self) -> Result<(), Trap> {
        if self.halted {
            return Err(Trap::Halt);
        }
        let pc = self.registers.pc;
        let word = self.memory.read_word(pc as u32);
        self.registers.pc = pc.wrapping_add(INSTRUCTION_STEP);

        let decoded = Decoded::new(word);
        let handler = DISPATCH_TABLE[((decoded.op as usize) << 4) | decoded.x as usize];
        match handler(self, decoded) {
            Ok(()) => Ok(()),
            Err(Trap::InvalidOpcode { word, pc }) if self.debug_on_invalid_opcode => {
                log_invalid_opcode(word, pc);
                Ok(())
            }
            Err(trap) => Err(trap),
        }
    }

    /// Skips the next instruction, or the next two words if they form an
    /// `F000 NNNN` long-addressing sequence, so three-word sequences stay
    /// atomic under a skip.
    pub(crate) fn skip_next(&mut self) {
        let next = self.memory.read_word(self.registers.pc as u32);
        let step = if next == 0xF000 {
            INSTRUCTION_STEP * 2
        } else {
            INSTRUCTION_STEP
        };
        self.registers.pc = self.registers.pc.wrapping_add(step);
    }
}

// `no_std`-friendly 2^x for non-integer x, avoiding a libm/std dependency
// for the one transcendental computation this crate needs. `f32::floor`
// itself is a `std`-only method, so it's reimplemented here by truncating
// towards zero and correcting for negative non-integers.
fn floor_f32(x: f32) -> f32 {
    let truncated = x as i32 as f32;
    if x < 0.0 && truncated != x {
        truncated - 1.0
    } else {
        truncated
    }
}

fn libm_pow2(exponent: f32) -> f32 {
    // exp2(x) = 2^floor(x) * 2^frac(x); the fractional part is approximated
    // with a short polynomial, accurate to within audio-tolerant error.
    let floor = floor_f32(exponent);
    let frac = exponent - floor;
    let frac_pow2 = 1.0 + frac * (0.6931472 + frac * (0.2401795 + frac * 0.0558302));
    let whole = if floor >= 0.0 {
        (1u32 << (floor as u32).min(30)) as f32
    } else {
        1.0 / (1u32 << ((-floor) as u32).min(30)) as f32
    };
    whole * frac_pow2
}

#[cfg(feature = "logging")]
fn log_invalid_opcode(word: u16, pc: u16) {
    log::warn!("invalid opcode {word:#06x} at pc={pc:#06x}, skipping");
}

#[cfg(not(feature = "logging"))]
fn log_invalid_opcode(_word: u16, _pc: u16) {}
