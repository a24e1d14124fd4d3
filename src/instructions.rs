//! One function per opcode (or opcode family sharing a handler), grouped
//! to match the dispatch table's primary nibble. Each takes the already
//! -decoded instruction and mutates the machine in program order: memory
//! writes, then `VF`, then `I`, then `PC`.

use rand::Rng;

use crate::dispatch::{invalid_opcode, is_xo_chip, supports_extended_display};
use crate::display::PlaneRows;
use crate::error::Trap;
use crate::machine::Machine;
use crate::opcode::Decoded;
use crate::quirks::QuirkFlags;

fn unsupported_unless(machine: &Machine, decoded: &Decoded, supported: bool) -> Result<(), Trap> {
    if supported {
        Ok(())
    } else {
        Err(invalid_opcode(machine, decoded))
    }
}

// -- 0-group: clear, return, and the Super-CHIP/XO-CHIP screen ops --

pub(crate) fn op_00e0(machine: &mut Machine) -> Result<(), Trap> {
    machine.framebuffer.clear_selected();
    Ok(())
}

pub(crate) fn op_00ee(machine: &mut Machine) -> Result<(), Trap> {
    machine.registers.pc = machine.stack.pop()?;
    Ok(())
}

pub(crate) fn op_00fd(machine: &mut Machine) -> Result<(), Trap> {
    machine.halted = true;
    Err(Trap::Halt)
}

pub(crate) fn op_00fe(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    unsupported_unless(machine, decoded, supports_extended_display(machine.architecture))?;
    machine.framebuffer.set_high_resolution(false);
    Ok(())
}

pub(crate) fn op_00ff(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    unsupported_unless(machine, decoded, supports_extended_display(machine.architecture))?;
    machine.framebuffer.set_high_resolution(true);
    Ok(())
}

pub(crate) fn op_00fb(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    unsupported_unless(machine, decoded, supports_extended_display(machine.architecture))?;
    machine.framebuffer.scroll_horizontal(4, true);
    Ok(())
}

pub(crate) fn op_00fc(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    unsupported_unless(machine, decoded, supports_extended_display(machine.architecture))?;
    machine.framebuffer.scroll_horizontal(4, false);
    Ok(())
}

pub(crate) fn op_00cn(machine: &mut Machine, decoded: &Decoded, n: u8) -> Result<(), Trap> {
    unsupported_unless(machine, decoded, supports_extended_display(machine.architecture))?;
    machine.framebuffer.scroll_vertical(n as usize, true);
    Ok(())
}

pub(crate) fn op_00dn(machine: &mut Machine, decoded: &Decoded, n: u8) -> Result<(), Trap> {
    unsupported_unless(machine, decoded, supports_extended_display(machine.architecture))?;
    machine.framebuffer.scroll_vertical(n as usize, false);
    Ok(())
}

// -- Control flow --

pub(crate) fn op_1nnn(machine: &mut Machine, decoded: Decoded) -> Result<(), Trap> {
    machine.registers.pc = decoded.nnn;
    Ok(())
}

pub(crate) fn op_2nnn(machine: &mut Machine, decoded: Decoded) -> Result<(), Trap> {
    machine.stack.push(machine.registers.pc)?;
    machine.registers.pc = decoded.nnn;
    Ok(())
}

pub(crate) fn op_3xnn(machine: &mut Machine, decoded: Decoded) -> Result<(), Trap> {
    if machine.registers.v[decoded.x as usize] == decoded.nn {
        machine.skip_next();
    }
    Ok(())
}

pub(crate) fn op_4xnn(machine: &mut Machine, decoded: Decoded) -> Result<(), Trap> {
    if machine.registers.v[decoded.x as usize] != decoded.nn {
        machine.skip_next();
    }
    Ok(())
}

pub(crate) fn op_5xy0(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    if machine.registers.v[decoded.x as usize] == machine.registers.v[decoded.y as usize] {
        machine.skip_next();
    }
    Ok(())
}

pub(crate) fn op_9xy0(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    if machine.registers.v[decoded.x as usize] != machine.registers.v[decoded.y as usize] {
        machine.skip_next();
    }
    Ok(())
}

pub(crate) fn op_6xnn(machine: &mut Machine, decoded: Decoded) -> Result<(), Trap> {
    machine.registers.v[decoded.x as usize] = decoded.nn;
    Ok(())
}

pub(crate) fn op_7xnn(machine: &mut Machine, decoded: Decoded) -> Result<(), Trap> {
    let x = decoded.x as usize;
    machine.registers.v[x] = machine.registers.v[x].wrapping_add(decoded.nn);
    Ok(())
}

pub(crate) fn op_bnnn(machine: &mut Machine, decoded: Decoded) -> Result<(), Trap> {
    let base = if machine.quirks.contains(QuirkFlags::JUMP) {
        machine.registers.v[decoded.x as usize]
    } else {
        machine.registers.v[0]
    };
    machine.registers.pc = decoded.nnn.wrapping_add(base as u16);
    Ok(())
}

pub(crate) fn op_cxnn(machine: &mut Machine, decoded: Decoded) -> Result<(), Trap> {
    let byte: u8 = machine.rng.gen();
    machine.registers.v[decoded.x as usize] = byte & decoded.nn;
    Ok(())
}

// -- 8-group: arithmetic and logic --

pub(crate) fn op_8xy0(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    machine.registers.v[decoded.x as usize] = machine.registers.v[decoded.y as usize];
    Ok(())
}

pub(crate) fn op_8xy1(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    let x = decoded.x as usize;
    machine.registers.v[x] |= machine.registers.v[decoded.y as usize];
    clear_vf_if_logic_quirk(machine);
    Ok(())
}

pub(crate) fn op_8xy2(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    let x = decoded.x as usize;
    machine.registers.v[x] &= machine.registers.v[decoded.y as usize];
    clear_vf_if_logic_quirk(machine);
    Ok(())
}

pub(crate) fn op_8xy3(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    let x = decoded.x as usize;
    machine.registers.v[x] ^= machine.registers.v[decoded.y as usize];
    clear_vf_if_logic_quirk(machine);
    Ok(())
}

fn clear_vf_if_logic_quirk(machine: &mut Machine) {
    if machine.quirks.contains(QuirkFlags::LOGIC) {
        machine.registers.set_vf(0);
    }
}

pub(crate) fn op_8xy4(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    let vx = machine.registers.v[decoded.x as usize];
    let vy = machine.registers.v[decoded.y as usize];
    let (sum, carry) = vx.overflowing_add(vy);
    machine.registers.v[decoded.x as usize] = sum;
    machine.registers.set_vf(carry as u8);
    Ok(())
}

pub(crate) fn op_8xy5(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    let vx = machine.registers.v[decoded.x as usize];
    let vy = machine.registers.v[decoded.y as usize];
    let flag = (vx >= vy) as u8;
    machine.registers.v[decoded.x as usize] = vx.wrapping_sub(vy);
    machine.registers.set_vf(flag);
    Ok(())
}

pub(crate) fn op_8xy7(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    let vx = machine.registers.v[decoded.x as usize];
    let vy = machine.registers.v[decoded.y as usize];
    let flag = (vy >= vx) as u8;
    machine.registers.v[decoded.x as usize] = vy.wrapping_sub(vx);
    machine.registers.set_vf(flag);
    Ok(())
}

pub(crate) fn op_8xy6(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    let source = if machine.quirks.contains(QuirkFlags::SHIFT) {
        machine.registers.v[decoded.x as usize]
    } else {
        machine.registers.v[decoded.y as usize]
    };
    let shifted_out = source & 0x1;
    machine.registers.v[decoded.x as usize] = source >> 1;
    machine.registers.set_vf(shifted_out);
    Ok(())
}

pub(crate) fn op_8xye(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    let source = if machine.quirks.contains(QuirkFlags::SHIFT) {
        machine.registers.v[decoded.x as usize]
    } else {
        machine.registers.v[decoded.y as usize]
    };
    let shifted_out = (source >> 7) & 0x1;
    machine.registers.v[decoded.x as usize] = source << 1;
    machine.registers.set_vf(shifted_out);
    Ok(())
}

// -- Memory & index --

pub(crate) fn op_annn(machine: &mut Machine, decoded: Decoded) -> Result<(), Trap> {
    machine.registers.i = decoded.nnn as u32;
    Ok(())
}

pub(crate) fn op_fx1e(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    let sum = machine.registers.i + machine.registers.v[decoded.x as usize] as u32;
    if machine.quirks.contains(QuirkFlags::INDEX_OVERFLOW) {
        machine.registers.set_vf((sum > 0xFFF) as u8);
    }
    machine.registers.i = sum % machine.memory.size() as u32;
    Ok(())
}

fn apply_index_increment(machine: &mut Machine, x: u8) {
    if machine.quirks.contains(QuirkFlags::LOAD) {
        return;
    }
    let step = if machine.quirks.contains(QuirkFlags::INDEX_INCREMENT) {
        x as u32
    } else {
        x as u32 + 1
    };
    machine.registers.i = (machine.registers.i + step) % machine.memory.size() as u32;
}

pub(crate) fn op_fx55(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    let i = machine.registers.i;
    for offset in 0..=decoded.x as u32 {
        let value = machine.registers.v[offset as usize];
        machine.memory.write(i + offset, value);
    }
    apply_index_increment(machine, decoded.x);
    Ok(())
}

pub(crate) fn op_fx65(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    let i = machine.registers.i;
    for offset in 0..=decoded.x as u32 {
        machine.registers.v[offset as usize] = machine.memory.read(i + offset);
    }
    apply_index_increment(machine, decoded.x);
    Ok(())
}

pub(crate) fn op_fx75(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    let count = machine.architecture.flag_register_count();
    unsupported_unless(machine, decoded, count > 0)?;
    let upto = (decoded.x as usize + 1).min(count);
    machine.registers.flags[..upto].copy_from_slice(&machine.registers.v[..upto]);
    Ok(())
}

pub(crate) fn op_fx85(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    let count = machine.architecture.flag_register_count();
    unsupported_unless(machine, decoded, count > 0)?;
    let upto = (decoded.x as usize + 1).min(count);
    machine.registers.v[..upto].copy_from_slice(&machine.registers.flags[..upto]);
    Ok(())
}

// -- XO-CHIP extensions living in the F group --

pub(crate) fn op_f000(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    unsupported_unless(machine, decoded, is_xo_chip(machine.architecture))?;
    let nnnn = machine.memory.read_word(machine.registers.pc as u32);
    machine.registers.i = nnnn as u32;
    machine.registers.pc = machine.registers.pc.wrapping_add(2);
    Ok(())
}

pub(crate) fn op_fn01(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    unsupported_unless(machine, decoded, is_xo_chip(machine.architecture))?;
    machine.framebuffer.set_plane_mask(decoded.x);
    Ok(())
}

pub(crate) fn op_f002(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    unsupported_unless(machine, decoded, is_xo_chip(machine.architecture))?;
    let data = machine.memory.read_range(machine.registers.i, 16)?;
    machine.audio_pattern.copy_from_slice(data);
    Ok(())
}

pub(crate) fn op_fx3a(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    unsupported_unless(machine, decoded, is_xo_chip(machine.architecture))?;
    machine.pitch = machine.registers.v[decoded.x as usize];
    Ok(())
}

// -- Timers --

pub(crate) fn op_fx07(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    machine.registers.v[decoded.x as usize] = machine.timers.delay;
    Ok(())
}

pub(crate) fn op_fx15(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    machine.timers.delay = machine.registers.v[decoded.x as usize];
    Ok(())
}

pub(crate) fn op_fx18(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    machine.timers.sound = machine.registers.v[decoded.x as usize];
    Ok(())
}

// -- Font --

pub(crate) fn op_fx29(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    let digit = machine.registers.v[decoded.x as usize];
    machine.registers.i = crate::font::low_res_glyph_address(digit) as u32;
    Ok(())
}

pub(crate) fn op_fx30(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    let digit = machine.registers.v[decoded.x as usize];
    machine.registers.i = crate::font::high_res_glyph_address(digit) as u32;
    Ok(())
}

// -- BCD --

pub(crate) fn op_fx33(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    let value = machine.registers.v[decoded.x as usize];
    let i = machine.registers.i;
    machine.memory.write(i, value / 100);
    machine.memory.write(i + 1, (value / 10) % 10);
    machine.memory.write(i + 2, value % 10);
    Ok(())
}

// -- Input --

pub(crate) fn op_ex9e(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    let key = machine.registers.v[decoded.x as usize];
    if machine.keypad.is_pressed(key) {
        machine.skip_next();
    }
    Ok(())
}

pub(crate) fn op_exa1(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    let key = machine.registers.v[decoded.x as usize];
    if !machine.keypad.is_pressed(key) {
        machine.skip_next();
    }
    Ok(())
}

pub(crate) fn op_fx0a(machine: &mut Machine, decoded: &Decoded) -> Result<(), Trap> {
    match machine.keypad.poll_wait() {
        Some(key) => {
            machine.registers.v[decoded.x as usize] = key;
        }
        None => {
            machine.registers.pc = machine.registers.pc.wrapping_sub(2);
        }
    }
    Ok(())
}

// -- Display --

/// Maximum rows a single-plane sprite read can span: 16 for the
/// Super-CHIP/XO-CHIP 16x16 big-sprite form, otherwise `N` (0..15).
const MAX_SPRITE_ROWS: usize = 16;
const MAX_SPRITE_PLANES: usize = 4;

pub(crate) fn op_dxyn(machine: &mut Machine, decoded: Decoded) -> Result<(), Trap> {
    let sprite_delay_active = machine.quirks.contains(QuirkFlags::SPRITE_DELAY) && machine.clock_has_ticked;
    if sprite_delay_active && machine.timers.video > 0 {
        machine.registers.pc = machine.registers.pc.wrapping_sub(2);
        return Ok(());
    }

    let high_res = machine.framebuffer.is_high_resolution();
    let big = decoded.n == 0 && (high_res || is_xo_chip(machine.architecture));
    let (width, height) = if big { (16usize, 16usize) } else { (8usize, decoded.n as usize) };
    let bytes_per_row = width / 8;
    let sprite_size = bytes_per_row * height;

    let plane_count = machine.framebuffer.plane_count();
    let mask = machine.framebuffer.plane_mask();

    let mut rows_storage = [[0u16; MAX_SPRITE_ROWS]; MAX_SPRITE_PLANES];
    let mut plane_indices = [0usize; MAX_SPRITE_PLANES];
    let mut count = 0usize;

    for plane in 0..plane_count as usize {
        if mask & (1 << plane) == 0 {
            continue;
        }
        let base = machine.registers.i + (plane as u32) * sprite_size as u32;
        let data = machine.memory.read_range(base, sprite_size)?;
        for row in 0..height {
            rows_storage[count][row] = if bytes_per_row == 2 {
                ((data[row * 2] as u16) << 8) | data[row * 2 + 1] as u16
            } else {
                data[row] as u16
            };
        }
        plane_indices[count] = plane;
        count += 1;
    }

    let planes_rows: [PlaneRows<'_>; MAX_SPRITE_PLANES] = core::array::from_fn(|i| PlaneRows {
        plane_index: plane_indices[i],
        rows: &rows_storage[i][..height],
        width,
    });

    let vx = machine.registers.v[decoded.x as usize];
    let vy = machine.registers.v[decoded.y as usize];
    let wrap = machine.quirks.contains(QuirkFlags::SCREEN_WRAP);
    let collision = machine.framebuffer.blit(vx, vy, &planes_rows[..count], wrap);
    machine.registers.set_vf(collision as u8);

    if machine.quirks.contains(QuirkFlags::SPRITE_DELAY) {
        machine.timers.video = 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quirks::Architecture;

    fn machine_with_rom(architecture: Architecture, rom: &[u8]) -> Machine {
        let mut machine = Machine::new(architecture).unwrap();
        machine.load_rom(rom).unwrap();
        machine
    }

    #[test]
    fn scenario_add_without_carry() {
        let mut m = machine_with_rom(Architecture::Chip8, &[0x60, 0x05, 0x61, 0x04, 0x80, 0x14]);
        m.step().unwrap();
        m.step().unwrap();
        m.step().unwrap();
        assert_eq!(m.registers.v[0], 0x09);
        assert_eq!(m.registers.v[0xF], 0);
    }

    #[test]
    fn scenario_add_with_carry() {
        let mut m = machine_with_rom(Architecture::Chip8, &[0x60, 0xFF, 0x61, 0x01, 0x80, 0x14]);
        m.step().unwrap();
        m.step().unwrap();
        m.step().unwrap();
        assert_eq!(m.registers.v[0], 0x00);
        assert_eq!(m.registers.v[0xF], 0x01);
    }

    #[test]
    fn scenario_draw_glyph_then_collide() {
        let mut m = machine_with_rom(Architecture::Chip8, &[0xA0, 0x50, 0xD0, 0x15, 0xD0, 0x15]);
        for (offset, byte) in [0xF0u8, 0x90, 0x90, 0x90, 0xF0].into_iter().enumerate() {
            m.memory.write(0x050 + offset as u32, byte);
        }
        m.step().unwrap();
        m.step().unwrap();
        assert_eq!(m.registers.v[0xF], 0);
        m.step().unwrap();
        assert_eq!(m.registers.v[0xF], 0x01);
    }

    #[test]
    fn scenario_xo_chip_long_jump() {
        let mut m =
            machine_with_rom(Architecture::XoChip, &[0xF0, 0x00, 0x12, 0x34]);
        let pc_before = m.program_counter();
        m.step().unwrap();
        assert_eq!(m.registers.i, 0x1234);
        assert_eq!(m.program_counter(), pc_before + 4);
    }

    #[test]
    fn scenario_fx0a_waits_for_press_then_release() {
        let mut m = machine_with_rom(Architecture::Chip8, &[0xF0, 0x0A, 0x00, 0xE0]);
        let pc_before = m.program_counter();
        m.step().unwrap();
        assert_eq!(m.program_counter(), pc_before, "no key pressed yet");
        m.keypad_mut().press(0x7);
        m.step().unwrap();
        assert_eq!(m.program_counter(), pc_before, "still held, not resolved");
        m.keypad_mut().release(0x7);
        m.step().unwrap();
        assert_eq!(m.program_counter(), pc_before + 2);
        assert_eq!(m.registers.v[0], 0x7);
    }

    #[test]
    fn shift_quirk_off_reads_vy() {
        let mut m = machine_with_rom(Architecture::Chip8HiRes, &[0x80, 0x16]);
        m.registers.v[0] = 0xFF;
        m.registers.v[1] = 0b0000_0010;
        m.step().unwrap();
        assert_eq!(m.registers.v[0], 0b0000_0001);
        assert_eq!(m.registers.v[0xF], 0);
    }

    #[test]
    fn subn_sets_borrow_complement() {
        let mut m = machine_with_rom(Architecture::Chip8, &[0x80, 0x17]);
        m.registers.v[0] = 0x05;
        m.registers.v[1] = 0x0A;
        m.step().unwrap();
        assert_eq!(m.registers.v[0], 0x05);
        assert_eq!(m.registers.v[0xF], 0x01);
    }

    #[test]
    fn extended_display_opcodes_trap_on_plain_chip8() {
        let mut m = machine_with_rom(Architecture::Chip8, &[0x00, 0xFF]);
        assert!(matches!(m.step(), Err(Trap::InvalidOpcode { .. })));
    }

    #[test]
    fn fx55_fx65_round_trip_restores_registers() {
        let mut m = machine_with_rom(
            Architecture::SuperChip1_1,
            &[0xA3, 0x00, 0xF3, 0x55, 0xF3, 0x65],
        );
        for v in 0..=3 {
            m.registers.v[v] = (v as u8 + 1) * 10;
        }
        let snapshot = m.registers.v;
        m.step().unwrap();
        m.step().unwrap();
        m.registers.v = [0; 16];
        m.registers.i = 0x300;
        m.step().unwrap();
        assert_eq!(&m.registers.v[..4], &snapshot[..4]);
    }
}
