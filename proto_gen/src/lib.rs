/* Schema-to-Codec Compiler
 *
 * This library compiles a fully-resolved message schema (proto_types) into
 * executable codec artifacts: one codec per message that encodes and
 * decodes dynamic instances against the protobuf binary wire format, using
 * the proto_wire runtime for all low-level byte work.
 */

pub mod assembler;
pub mod errors;
pub mod field;
pub mod hooks;
pub mod input;
pub mod manifest;
pub mod resolver;
pub mod value;
pub mod walker;

pub use assembler::{MessageAssembler, MessageCodec};
pub use errors::{CompileError, CompileResult, DecodeError, EncodeError};
pub use field::FieldCodec;
pub use hooks::{Hook, HookSet};
pub use input::{load_schema, InputError};
pub use manifest::{
    CodecManifest, EnumManifest, FieldManifest, MessageManifest, MANIFEST_VERSION,
};
pub use resolver::TypeResolver;
pub use value::{FieldSlot, MessageValue, Value};
pub use walker::{
    compile, compile_with_config, Artifact, CompiledSchema, CompilerConfig, EnumArtifact,
    SchemaWalker,
};
