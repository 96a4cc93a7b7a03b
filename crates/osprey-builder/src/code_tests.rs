use osprey_object::{Opcode, TRAP_INDEX_FOLLOWS, TRAP_SLOT_INDEX_FOLLOWS, TrapTable};

use crate::code::CodeWriter;
use crate::error::BuildError;

fn traps() -> TrapTable {
    TrapTable::from_names(["gc.collect", "io.print"])
}

#[test]
fn straight_line_body() {
    let traps = traps();
    let mut w = CodeWriter::new(&traps, 2);
    w.load_argument(0);
    w.load_argument(1);
    w.write_opcode(Opcode::Return);
    let body = w.finish().unwrap();

    assert_eq!(
        body.bytes(),
        &[
            Opcode::LoadArg as u8, 0, 0,
            Opcode::LoadArg as u8, 1, 0,
            Opcode::Return as u8,
        ]
    );
    assert_eq!(body.num_args(), 2);
    assert_eq!(body.num_locals(), 0);
}

#[test]
fn frame_slot_allocation() {
    let traps = traps();
    let mut w = CodeWriter::new(&traps, 0);
    assert_eq!(w.alloc_local(), 0);
    assert_eq!(w.alloc_local(), 1);
    assert_eq!(w.alloc_lexical(), 0);
    let body = w.finish().unwrap();
    assert_eq!(body.num_locals(), 2);
    assert_eq!(body.num_lexicals(), 1);
}

#[test]
fn forward_jump_patches_to_label_offset() {
    let traps = traps();
    let mut w = CodeWriter::new(&traps, 1);
    w.load_argument(0);
    let site = w.jump_if_zero();
    w.load_receiver();
    let target = w.make_label();
    w.write_opcode(Opcode::Return);
    w.patch(site, target).unwrap();
    let body = w.finish().unwrap();

    // load.arg(3) + jump(3) + load.receiver(1) puts the label at byte 7.
    assert_eq!(target.offset(), 7);
    assert_eq!(body.bytes()[3], Opcode::JumpIfZero as u8);
    assert_eq!(u16::from_le_bytes([body.bytes()[4], body.bytes()[5]]), 7);
}

#[test]
fn backward_jump_is_just_an_earlier_label() {
    let traps = traps();
    let mut w = CodeWriter::new(&traps, 0);
    let top = w.make_label();
    w.load_receiver();
    let site = w.jump();
    w.patch(site, top).unwrap();
    let body = w.finish().unwrap();
    assert_eq!(u16::from_le_bytes([body.bytes()[2], body.bytes()[3]]), 0);
}

#[test]
fn unpatched_jump_fails_finish() {
    let traps = traps();
    let mut w = CodeWriter::new(&traps, 0);
    let _site = w.jump();
    let err = w.finish().unwrap_err();
    assert!(matches!(err, BuildError::UnpatchedJump(0)));
}

#[test]
fn jump_site_from_another_writer_rejected() {
    let traps = traps();
    let mut other = CodeWriter::new(&traps, 0);
    let foreign = other.jump();

    let mut w = CodeWriter::new(&traps, 0);
    let label = w.make_label();
    let err = w.patch(foreign, label).unwrap_err();
    assert!(matches!(err, BuildError::UnknownJumpSite(0)));
}

#[test]
fn double_patch_rejected() {
    let traps = traps();
    let mut w = CodeWriter::new(&traps, 0);
    let site = w.jump();
    let label = w.make_label();
    w.patch(site, label).unwrap();
    let err = w.patch(site, label).unwrap_err();
    assert!(matches!(err, BuildError::AlreadyPatched(0)));
}

#[test]
fn trap_resolves_symbolic_name() {
    let traps = traps();
    let mut w = CodeWriter::new(&traps, 0);
    w.trap("io.print", 0).unwrap();
    let body = w.finish().unwrap();
    assert_eq!(body.bytes()[0], Opcode::Trap as u8);
    assert_eq!(u16::from_le_bytes([body.bytes()[1], body.bytes()[2]]), 1);
    assert_eq!(body.bytes()[3], 0);
}

#[test]
fn unknown_trap_rejected() {
    let traps = traps();
    let mut w = CodeWriter::new(&traps, 0);
    let err = w.trap("fs.unlink", 0).unwrap_err();
    assert!(matches!(err, BuildError::UnknownTrap(name) if name == "fs.unlink"));
}

#[test]
fn trap_index_follows_embeds_marker_slot() {
    let traps = traps();
    let mut w = CodeWriter::new(&traps, 0);
    w.trap_index_follows(0);
    let body = w.finish().unwrap();
    assert_eq!(
        u16::from_le_bytes([body.bytes()[1], body.bytes()[2]]),
        TRAP_SLOT_INDEX_FOLLOWS
    );
    assert_eq!(body.bytes()[3] & TRAP_INDEX_FOLLOWS, TRAP_INDEX_FOLLOWS);
}
