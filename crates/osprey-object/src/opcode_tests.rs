use super::opcode::*;

#[test]
fn opcode_byte_roundtrip() {
    for op in [
        Opcode::Nop,
        Opcode::Return,
        Opcode::LoadArg,
        Opcode::LoadReceiver,
        Opcode::Trap,
        Opcode::Jump,
        Opcode::JumpIfZero,
        Opcode::JumpIfLt,
        Opcode::JumpIfGt,
        Opcode::JumpIfLe,
        Opcode::JumpIfGe,
    ] {
        assert_eq!(Opcode::from_u8(op as u8), Some(op));
    }
    assert_eq!(Opcode::from_u8(0xFF), None);
}

#[test]
fn jump_family() {
    assert!(Opcode::Jump.is_jump());
    assert!(Opcode::JumpIfGe.is_jump());
    assert!(!Opcode::Trap.is_jump());
    // Every jump carries a 16-bit target.
    for op in [
        Opcode::Jump,
        Opcode::JumpIfZero,
        Opcode::JumpIfLt,
        Opcode::JumpIfGt,
        Opcode::JumpIfLe,
        Opcode::JumpIfGe,
    ] {
        assert_eq!(op.operand_len(), 2);
    }
}

#[test]
fn operand_widths() {
    assert_eq!(Opcode::Nop.operand_len(), 0);
    assert_eq!(Opcode::Return.operand_len(), 0);
    assert_eq!(Opcode::LoadReceiver.operand_len(), 0);
    assert_eq!(Opcode::LoadArg.operand_len(), 2);
    assert_eq!(Opcode::Trap.operand_len(), 3);
}

#[test]
fn trap_marker_slot_is_reserved() {
    // The index-follows marker must never collide with a real slot; real
    // slots are assigned from 0 upward.
    assert_eq!(TRAP_SLOT_INDEX_FOLLOWS, u16::MAX);
    assert_eq!(TRAP_INDEX_FOLLOWS, 1);
}
