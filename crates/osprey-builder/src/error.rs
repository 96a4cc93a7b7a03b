//! Build and serialization errors.

use osprey_object::Section;

/// Build-time invariant violation.
///
/// These are programmer errors in the calling compiler, not user input
/// errors: the build must be aborted, never retried, because partial
/// builder state is presumed inconsistent after any of them.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BuildError {
    #[error("duplicate symbol path `{0}`")]
    DuplicateSymbol(String),

    #[error("unknown receiver path `{0}`")]
    UnknownReceiver(String),

    #[error("receiver `{path}` is a {section}, which cannot own a {what}")]
    InvalidReceiver {
        path: String,
        section: &'static str,
        what: &'static str,
    },

    #[error("receiver `{0}` already has a constructor")]
    DuplicateCtor(String),

    #[error("concept `{concept}` declares no action named `{name}`")]
    UnknownAction { concept: String, name: String },

    #[error("unknown impl index {0}")]
    UnknownImpl(u32),

    #[error("unknown concept index {0}")]
    UnknownConcept(u32),

    #[error("unknown type index {0}")]
    UnknownType(u32),

    #[error("unknown template index {0}")]
    UnknownTemplate(u32),

    #[error("template `{template}` constraint names unknown placeholder `{name}`")]
    UnknownPlaceholder { template: String, name: String },

    #[error("template `{template}` declares placeholder `{name}` twice")]
    DuplicatePlaceholder { template: String, name: String },

    #[error("duplicate parameter name `{0}`")]
    DuplicateParam(String),

    #[error("positional parameter `{0}` follows a named or context parameter")]
    PositionalAfterNamed(String),

    #[error("required positional parameter `{0}` follows an optional one")]
    RequiredAfterOptional(String),

    #[error("named or context parameter has no name")]
    MissingParamName,

    #[error("rest parameter is not the last parameter")]
    RestNotLast,

    #[error("rest parameter must not have a name")]
    RestNamed,

    #[error("sealed-subtype receiver `{0}` is not flagged sealed")]
    SealedReceiverNotSealed(String),

    #[error("sealed subtype `{0}` is not flagged final")]
    SealedSubtypeNotFinal(String),

    #[error("sealed subtype `{subtype}` does not declare `{receiver}` as its super type")]
    SealedSuperMismatch { subtype: String, receiver: String },

    #[error("unknown trap name `{0}`")]
    UnknownTrap(String),

    #[error("jump site {0} does not belong to this procedure")]
    UnknownJumpSite(usize),

    #[error("jump site {0} was never patched")]
    UnpatchedJump(usize),

    #[error("jump site {0} patched twice")]
    AlreadyPatched(usize),

    #[error("jump target offset {0} exceeds the 16-bit instruction field")]
    JumpOffsetOverflow(usize),
}

impl BuildError {
    pub(crate) fn invalid_receiver(path: &str, section: Section, what: &'static str) -> Self {
        Self::InvalidReceiver {
            path: path.to_owned(),
            section: section.name(),
            what,
        }
    }
}

/// Serialization failure.
///
/// Unlike [`BuildError`], these are recoverable at the caller's boundary:
/// `to_bytes` and `write_to_file` return them without leaving a partially
/// written object anywhere.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("section `{section}` has {len} entries, exceeding the format limit")]
    SectionTooLarge { section: &'static str, len: usize },

    #[error("bytecode segment of {0} bytes exceeds the format limit")]
    CodeTooLarge(usize),

    #[error("string blob of {0} bytes exceeds the format limit")]
    StringBlobTooLarge(usize),

    #[error("serialized object exceeds the u32 file size range")]
    ObjectTooLarge,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for builder operations.
pub type Result<T> = std::result::Result<T, BuildError>;
