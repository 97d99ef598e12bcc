use proto_wire::WireError;
use thiserror::Error;

/// Result alias for compilation-time operations.
pub type CompileResult<T> = Result<T, CompileError>;

/// Errors raised while turning a schema tree into codec artifacts, or
/// while configuring the compiled artifacts afterwards.
#[derive(Debug, Error)]
pub enum CompileError {
    /// A field or nesting edge pointed at a message index outside the
    /// arena. Schema validation proper happens upstream; this is the
    /// structural minimum the compiler still has to notice.
    #[error("message index {index} is not present in the schema arena")]
    DanglingMessageRef { index: usize },

    #[error("enum index {index} is not present in the schema arena")]
    DanglingEnumRef { index: usize },

    /// A declared default does not fit the field's type.
    #[error("field '{field}' of message '{message}' has an unusable default value")]
    InvalidDefault { message: String, field: String },

    /// A default referred to an enum member that the target enum does not
    /// declare.
    #[error("field '{field}' of message '{message}' defaults to unknown enum member '{member}'")]
    UnknownDefaultMember {
        message: String,
        field: String,
        member: String,
    },

    /// Hook installation was attempted on a message whose triggers option
    /// left the hook seams uncompiled.
    #[error("message '{message}' was compiled without hook seams")]
    HooksNotCompiled { message: String },
}

/// Errors raised while serializing an instance.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// A required string/bytes/message field held no value. Raised before
    /// any bytes for the field are written.
    #[error("required field '{field}' of message '{message}' is absent")]
    RequiredFieldMissing { message: String, field: String },

    /// The slot held a value of a different kind than the field declares.
    #[error("field '{field}' of message '{message}' expects {expected}")]
    ValueKindMismatch {
        message: String,
        field: String,
        expected: &'static str,
    },

    #[error("message '{message}' has no field named '{field}'")]
    UnknownField { message: String, field: String },

    /// The instance does not match the codec it was handed to.
    #[error("instance shape does not match compiled message '{message}'")]
    InstanceShapeMismatch { message: String },

    #[error("no compiled codec for message index {index}")]
    MissingCodec { index: usize },

    #[error(transparent)]
    Wire(#[from] WireError),
}

/// Errors raised while deserializing an instance. Clean key-read
/// exhaustion is loop termination, not an error, and never surfaces here.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// A key with field id 0 marks a malformed stream.
    #[error("field id 0 while decoding message '{message}': malformed stream")]
    ZeroFieldId { message: String },

    /// The instance supplied for merging does not match the codec.
    #[error("instance shape does not match compiled message '{message}'")]
    InstanceShapeMismatch { message: String },

    #[error("no compiled codec for message index {index}")]
    MissingCodec { index: usize },

    #[error(transparent)]
    Wire(#[from] WireError),
}
