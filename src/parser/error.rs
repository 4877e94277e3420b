use thiserror::Error;

/// Malformed or out-of-range binary content. Always fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected end of input at offset {offset}: needed {needed} more byte(s)")]
    UnexpectedEof { offset: usize, needed: usize },

    #[error("magic header not detected: expected 0061736d, got {0}")]
    BadMagic(String),

    #[error("unknown binary version: {0}")]
    UnknownVersion(u32),

    #[error("integer representation too long at offset {0}")]
    IntegerTooLong(usize),

    #[error("integer too large at offset {0}")]
    IntegerTooLarge(usize),

    #[error("malformed UTF-8 encoding at offset {0}")]
    MalformedUtf8(usize),

    #[error("malformed section id {id} at offset {offset}")]
    UnknownSection { id: u8, offset: usize },

    #[error("unexpected content after last section: section {id} at offset {offset} is duplicated or out of order")]
    SectionOutOfOrder { id: u8, offset: usize },

    #[error("section size mismatch: section {id} declared {declared} byte(s), decoder consumed {consumed}")]
    SectionSizeMismatch {
        id: u8,
        declared: usize,
        consumed: usize,
    },

    #[error("malformed type form 0x{form:02x} at offset {offset}: expected 0x60")]
    BadTypeForm { form: u8, offset: usize },

    #[error("malformed {context} kind 0x{tag:02x} at offset {offset}")]
    BadKind {
        context: &'static str,
        tag: u8,
        offset: usize,
    },

    #[error("malformed limits flags 0x{flags:02x} at offset {offset}")]
    BadLimits { flags: u8, offset: usize },

    #[error("unknown type: {context} references type {index}, but only {count} type(s) are declared")]
    UnknownType {
        context: String,
        index: u32,
        count: usize,
    },

    #[error("unknown {space} {index} in export \"{name}\": index space has {count} entr(ies)")]
    UnknownExportIndex {
        name: String,
        space: &'static str,
        index: u32,
        count: usize,
    },

    #[error("function and code section have inconsistent lengths: {functions} function(s), {bodies} bod(ies)")]
    FunctionCodeMismatch { functions: usize, bodies: usize },
}
