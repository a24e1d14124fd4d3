#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

mod dispatch;
mod display;
mod error;
mod font;
mod instructions;
mod keypad;
mod machine;
mod memory;
mod opcode;
mod ports;
mod quirks;
mod registers;
mod scheduler;
mod stack;
mod timers;

pub use display::{Color, Framebuffer, PlanePixels, PlaneRows, DEFAULT_PALETTE, MAX_HEIGHT, MAX_WIDTH};
pub use error::{ConfigError, Trap};
pub use font::{
    GLYPH_COUNT, HIGH_RES_ADDRESS, HIGH_RES_FONT, HIGH_RES_STEP, LOW_RES_ADDRESS, LOW_RES_FONT,
    LOW_RES_STEP,
};
pub use keypad::{Keypad, KEY_COUNT};
pub use machine::{Machine, DEFAULT_PITCH, XO_CHIP_BASE_TONE_HZ};
pub use memory::{Memory, PROGRAM_START};
pub use opcode::Decoded;
pub use ports::{Audio, DirtyRect, Display as DisplayPort, Input, NullAudio, NullDisplay, NullInput};
pub use quirks::{Architecture, QuirkFlags};
pub use registers::Registers;
pub use scheduler::Scheduler;
pub use timers::{Timers, REFRESH_RATE_HZ};
