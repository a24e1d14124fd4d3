//! Boundary behaviours for sprite blitting, driven end-to-end through
//! `Machine` rather than the `Framebuffer` API directly.

use poly8_core::{Architecture, Machine, QuirkFlags};

/// V0 = vx, V1 = vy, I = the address of the 0xFF sprite byte appended
/// after this code, then draw a 1-row 8-wide sprite at (V0, V1).
fn rom_draw_full_byte_at(vx: u8, vy: u8) -> [u8; 9] {
    [
        0x60, vx, // V0 = vx
        0x61, vy, // V1 = vy
        0xA2, 0x08, // I = 0x200 + 8 (the byte below)
        0xD0, 0x11, // draw
        0xFF, // sprite data: one fully-set row
    ]
}

#[test]
fn clip_drops_columns_past_the_right_edge_when_wrap_is_off() {
    let mut machine = Machine::new(Architecture::Chip8).unwrap();
    let mut quirks = machine.quirks();
    quirks.remove(QuirkFlags::SCREEN_WRAP);
    machine.set_quirks(quirks);
    machine.load_rom(&rom_draw_full_byte_at(60, 0)).unwrap();
    for _ in 0..4 {
        machine.step().unwrap();
    }
    // Columns 64..68 would wrap to 0..4 if wrapping were on; clipped
    // instead, column 0 stays unset and column 63 is the last one set.
    assert!(!machine.framebuffer().plane_pixels(0).get(0, 0));
    assert!(machine.framebuffer().plane_pixels(0).get(63, 0));
}

#[test]
fn wrap_carries_columns_past_the_right_edge_to_column_zero() {
    let mut machine = Machine::new(Architecture::XoChip).unwrap();
    assert!(machine.quirks().contains(QuirkFlags::SCREEN_WRAP));
    machine.load_rom(&rom_draw_full_byte_at(60, 0)).unwrap();
    for _ in 0..4 {
        machine.step().unwrap();
    }
    assert!(machine.framebuffer().plane_pixels(0).get(0, 0));
    assert!(machine.framebuffer().plane_pixels(0).get(63, 0));
}
