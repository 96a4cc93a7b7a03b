//! Per-procedure bytecode assembler.
//!
//! [`CodeWriter`] appends instructions to one procedure body. Forward jump
//! targets go through a label/patch protocol: every jump emits a 16-bit
//! placeholder and returns a [`JumpSite`]; [`CodeWriter::make_label`]
//! records the current write cursor; [`CodeWriter::patch`] binds a site to
//! a label. All fixups are kept as an explicit site → target list and
//! written in [`CodeWriter::finish`], which is also where an unpatched
//! site fails the build.
//!
//! Symbolic trap names resolve against the externally supplied
//! [`TrapTable`] at assembly time; the table must match the one the
//! interpreter dispatches with at run time.

use osprey_object::{
    Opcode, TRAP_INDEX_FOLLOWS, TRAP_SLOT_INDEX_FOLLOWS, TrapTable,
};

use crate::error::{BuildError, Result};

/// Handle for the yet-unresolved target of one emitted jump.
///
/// Must be patched exactly once before `finish`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpSite(usize);

/// A recorded write-cursor position, used as a patch target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label(usize);

impl Label {
    /// Byte offset within the procedure body.
    pub fn offset(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct Fixup {
    /// Byte offset of the 16-bit placeholder operand.
    at: usize,
    /// Bound target, set by `patch`.
    target: Option<Label>,
}

/// Finished procedure body plus its frame counts.
#[derive(Debug, Clone)]
pub struct CodeBody {
    pub(crate) bytes: Vec<u8>,
    pub(crate) num_args: u16,
    pub(crate) num_locals: u16,
    pub(crate) num_lexicals: u16,
}

impl CodeBody {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn num_args(&self) -> u16 {
        self.num_args
    }

    pub fn num_locals(&self) -> u16 {
        self.num_locals
    }

    pub fn num_lexicals(&self) -> u16 {
        self.num_lexicals
    }
}

/// Builder for one procedure's instruction stream.
pub struct CodeWriter<'t> {
    traps: &'t TrapTable,
    buf: Vec<u8>,
    fixups: Vec<Fixup>,
    num_args: u16,
    num_locals: u16,
    num_lexicals: u16,
}

impl<'t> CodeWriter<'t> {
    pub fn new(traps: &'t TrapTable, num_args: u16) -> Self {
        Self {
            traps,
            buf: Vec::new(),
            fixups: Vec::new(),
            num_args,
            num_locals: 0,
            num_lexicals: 0,
        }
    }

    /// Current write cursor, in bytes from the body start.
    pub fn cursor(&self) -> usize {
        self.buf.len()
    }

    /// Allocate a local slot, returning its index.
    pub fn alloc_local(&mut self) -> u16 {
        let slot = self.num_locals;
        self.num_locals += 1;
        slot
    }

    /// Allocate a lexical (closure-captured) slot, returning its index.
    pub fn alloc_lexical(&mut self) -> u16 {
        let slot = self.num_lexicals;
        self.num_lexicals += 1;
        slot
    }

    /// Emit a bare opcode with no operand.
    pub fn write_opcode(&mut self, op: Opcode) {
        debug_assert_eq!(op.operand_len(), 0, "{op:?} takes an operand");
        self.buf.push(op as u8);
    }

    /// Emit `load.arg n`.
    pub fn load_argument(&mut self, n: u16) {
        self.buf.push(Opcode::LoadArg as u8);
        self.buf.extend_from_slice(&n.to_le_bytes());
    }

    /// Emit `load.receiver`.
    pub fn load_receiver(&mut self) {
        self.buf.push(Opcode::LoadReceiver as u8);
    }

    /// Emit a trap by symbolic name, resolving it against the trap table.
    pub fn trap(&mut self, name: &str, flags: u8) -> Result<()> {
        let slot = self
            .traps
            .resolve(name)
            .ok_or_else(|| BuildError::UnknownTrap(name.to_owned()))?;
        self.emit_trap(slot, flags);
        Ok(())
    }

    /// Emit a trap whose numeric index is supplied as a runtime argument:
    /// the marker slot is embedded and the interpreter substitutes the
    /// index when the instruction executes.
    pub fn trap_index_follows(&mut self, flags: u8) {
        self.emit_trap(TRAP_SLOT_INDEX_FOLLOWS, flags | TRAP_INDEX_FOLLOWS);
    }

    fn emit_trap(&mut self, slot: u16, flags: u8) {
        self.buf.push(Opcode::Trap as u8);
        self.buf.extend_from_slice(&slot.to_le_bytes());
        self.buf.push(flags);
    }

    pub fn jump(&mut self) -> JumpSite {
        self.emit_jump(Opcode::Jump)
    }

    pub fn jump_if_zero(&mut self) -> JumpSite {
        self.emit_jump(Opcode::JumpIfZero)
    }

    pub fn jump_if_less_than(&mut self) -> JumpSite {
        self.emit_jump(Opcode::JumpIfLt)
    }

    pub fn jump_if_greater_than(&mut self) -> JumpSite {
        self.emit_jump(Opcode::JumpIfGt)
    }

    pub fn jump_if_less_or_equal(&mut self) -> JumpSite {
        self.emit_jump(Opcode::JumpIfLe)
    }

    pub fn jump_if_greater_or_equal(&mut self) -> JumpSite {
        self.emit_jump(Opcode::JumpIfGe)
    }

    fn emit_jump(&mut self, op: Opcode) -> JumpSite {
        self.buf.push(op as u8);
        let at = self.buf.len();
        // Placeholder until finish resolves the fixup list.
        self.buf.extend_from_slice(&u16::MAX.to_le_bytes());
        let site = JumpSite(self.fixups.len());
        self.fixups.push(Fixup { at, target: None });
        site
    }

    /// Record the current cursor as a jump target.
    pub fn make_label(&mut self) -> Label {
        Label(self.buf.len())
    }

    /// Bind a jump site to a label. Each site must be patched exactly once
    /// and must come from this writer.
    pub fn patch(&mut self, site: JumpSite, label: Label) -> Result<()> {
        let fixup = self
            .fixups
            .get_mut(site.0)
            .ok_or(BuildError::UnknownJumpSite(site.0))?;
        if fixup.target.is_some() {
            return Err(BuildError::AlreadyPatched(site.0));
        }
        if label.0 > u16::MAX as usize {
            return Err(BuildError::JumpOffsetOverflow(label.0));
        }
        fixup.target = Some(label);
        Ok(())
    }

    /// Resolve all fixups and produce the finished body.
    ///
    /// Fails if any jump site was never patched; a half-wired procedure
    /// must never reach the serializer.
    pub fn finish(mut self) -> Result<CodeBody> {
        for (site, fixup) in self.fixups.iter().enumerate() {
            let Some(target) = fixup.target else {
                return Err(BuildError::UnpatchedJump(site));
            };
            let offset = target.0 as u16;
            self.buf[fixup.at..fixup.at + 2].copy_from_slice(&offset.to_le_bytes());
        }
        Ok(CodeBody {
            bytes: self.buf,
            num_args: self.num_args,
            num_locals: self.num_locals,
            num_lexicals: self.num_lexicals,
        })
    }
}
