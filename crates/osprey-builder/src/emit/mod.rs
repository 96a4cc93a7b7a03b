//! Serialization of a finished build session.

mod emitter;
mod string_table;

pub(crate) use emitter::emit;
