//! Format constants shared by the writer and the reader.

/// Magic bytes at offset 0 of every Osprey object.
pub const MAGIC: [u8; 4] = *b"OSPO";

/// Format version. Objects with a different major version are rejected;
/// minor/patch are informational.
pub const VERSION_MAJOR: u16 = 1;
pub const VERSION_MINOR: u16 = 0;
pub const VERSION_PATCH: u16 = 0;

/// Envelope header size in bytes.
pub const HEADER_SIZE: usize = 128;

/// Every section starts on this alignment.
pub const SECTION_ALIGN: usize = 64;

/// Reserved "absent" cross-reference value: no super type, no receiver,
/// no template, unnamed rest parameter, bodiless call.
pub const INVALID_INDEX: u32 = u32::MAX;

/// Size of the per-procedure header at the start of each call's code.
pub const PROC_HEADER_SIZE: usize = 16;

/// Round `value` up to the next multiple of `align` (power of two).
#[inline]
pub fn align_up(value: u32, align: u32) -> u32 {
    (value + align - 1) & !(align - 1)
}
