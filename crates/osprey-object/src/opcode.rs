//! Instruction opcodes and encodings.
//!
//! Instructions are a one-byte opcode followed by a fixed-width operand
//! (`operand_len`). Jump operands are 16-bit absolute byte offsets within
//! the owning procedure's body; trap operands are a 16-bit slot plus a
//! flags byte.

/// One-byte opcode. Values 0x00-0x0F are plain operations, 0x10-0x1F the
/// jump family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    Nop = 0x00,
    Return = 0x01,
    /// Push argument `n` (u16 operand).
    LoadArg = 0x02,
    /// Push the bound receiver.
    LoadReceiver = 0x03,
    /// Invoke a native hook: u16 slot + u8 flags.
    Trap = 0x04,

    Jump = 0x10,
    JumpIfZero = 0x11,
    JumpIfLt = 0x12,
    JumpIfGt = 0x13,
    JumpIfLe = 0x14,
    JumpIfGe = 0x15,
}

impl Opcode {
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0x00 => Self::Nop,
            0x01 => Self::Return,
            0x02 => Self::LoadArg,
            0x03 => Self::LoadReceiver,
            0x04 => Self::Trap,
            0x10 => Self::Jump,
            0x11 => Self::JumpIfZero,
            0x12 => Self::JumpIfLt,
            0x13 => Self::JumpIfGt,
            0x14 => Self::JumpIfLe,
            0x15 => Self::JumpIfGe,
            _ => return None,
        })
    }

    /// Operand width in bytes following the opcode byte.
    pub fn operand_len(self) -> usize {
        match self {
            Self::Nop | Self::Return | Self::LoadReceiver => 0,
            Self::LoadArg => 2,
            Self::Trap => 3,
            Self::Jump
            | Self::JumpIfZero
            | Self::JumpIfLt
            | Self::JumpIfGt
            | Self::JumpIfLe
            | Self::JumpIfGe => 2,
        }
    }

    pub fn is_jump(self) -> bool {
        matches!(
            self,
            Self::Jump
                | Self::JumpIfZero
                | Self::JumpIfLt
                | Self::JumpIfGt
                | Self::JumpIfLe
                | Self::JumpIfGe
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Nop => "nop",
            Self::Return => "return",
            Self::LoadArg => "load.arg",
            Self::LoadReceiver => "load.receiver",
            Self::Trap => "trap",
            Self::Jump => "jump",
            Self::JumpIfZero => "jump.zero",
            Self::JumpIfLt => "jump.lt",
            Self::JumpIfGt => "jump.gt",
            Self::JumpIfLe => "jump.le",
            Self::JumpIfGe => "jump.ge",
        }
    }
}

/// Trap flag: the embedded slot is the marker below and the real numeric
/// index is supplied as a runtime argument instead.
pub const TRAP_INDEX_FOLLOWS: u8 = 0x01;

/// Marker slot embedded by the `TRAP_INDEX_FOLLOWS` form.
pub const TRAP_SLOT_INDEX_FOLLOWS: u16 = u16::MAX;
