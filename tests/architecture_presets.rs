//! Cross-architecture invariants: properties that must hold for every
//! dialect the core claims to support, not just the default preset.

use poly8_core::{Architecture, Machine, Trap};

const ALL_ARCHITECTURES: [Architecture; 7] = [
    Architecture::Chip8,
    Architecture::Chip8HiRes,
    Architecture::Chip48,
    Architecture::SuperChip1_0,
    Architecture::SuperChip1_1,
    Architecture::XoChip,
    Architecture::XoChip16Color,
];

#[test]
fn cls_then_ret_on_empty_stack_traps_on_every_architecture() {
    for architecture in ALL_ARCHITECTURES {
        let mut machine = Machine::new(architecture).unwrap();
        machine.load_rom(&[0x00, 0xE0, 0x00, 0xEE]).unwrap();
        machine.step().expect("CLS should never trap");
        assert_eq!(
            machine.step(),
            Err(Trap::StackUnderflow),
            "{architecture:?} did not trap on an empty return stack"
        );
    }
}

#[test]
fn program_counter_starts_even_on_every_architecture() {
    for architecture in ALL_ARCHITECTURES {
        let machine = Machine::new(architecture).unwrap();
        assert_eq!(machine.program_counter() % 2, 0);
    }
}

#[test]
fn call_stack_fills_to_capacity_then_overflows() {
    // 2NNN that calls itself: every architecture's stack must accept
    // exactly `stack_capacity` nested calls before trapping.
    for architecture in ALL_ARCHITECTURES {
        let mut machine = Machine::new(architecture).unwrap();
        machine.load_rom(&[0x22, 0x00]).unwrap(); // 2200: call self
        let capacity = architecture.stack_capacity();
        for _ in 0..capacity {
            machine.step().expect("call within capacity should not trap");
        }
        assert_eq!(machine.step(), Err(Trap::StackOverflow));
    }
}

#[test]
fn rpl_flags_are_unsupported_on_architectures_without_them() {
    for architecture in [Architecture::Chip8, Architecture::Chip8HiRes, Architecture::Chip48] {
        let mut machine = Machine::new(architecture).unwrap();
        machine.load_rom(&[0xF3, 0x75]).unwrap(); // FX75 save R0..R3
        assert!(matches!(machine.step(), Err(Trap::InvalidOpcode { .. })));
    }
}

#[test]
fn xo_chip_opcodes_are_unsupported_outside_xo_chip() {
    for architecture in [
        Architecture::Chip8,
        Architecture::Chip8HiRes,
        Architecture::Chip48,
        Architecture::SuperChip1_0,
        Architecture::SuperChip1_1,
    ] {
        let mut machine = Machine::new(architecture).unwrap();
        machine.load_rom(&[0xF0, 0x01]).unwrap(); // FN01 plane-mask select
        assert!(matches!(machine.step(), Err(Trap::InvalidOpcode { .. })));
    }
}
