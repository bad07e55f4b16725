//! # protomodel
//!
//! Derive a deterministic proto3 schema from an object model: a root type
//! with typed properties plus a set of commands.
//!
//! The generated schema contains:
//!
//! - a `{Model}State` message with one field per root property
//! - one message per nested composite, expanded exactly once
//! - synthesized entry messages for dictionaries that cannot be native maps
//! - the fixed property-sync control messages
//! - a `{Command}Request` / `{Command}Response` pair per command
//! - a `{Model}Service` with state, update, subscribe, command and ping RPCs
//!
//! ## Example
//!
//! ```rust
//! use protomodel::{
//!     CommandDescriptor, MemberDescriptor, ObjectModel, SchemaEmitter, TypeDescriptor,
//! };
//!
//! let model = ObjectModel::new("CounterViewModel")
//!     .with_property("Count", TypeDescriptor::named("i32"))
//!     .with_command(CommandDescriptor::new("Reset"));
//!
//! let no_members = |_: &TypeDescriptor| Vec::<MemberDescriptor>::new();
//! let output = SchemaEmitter::default().emit(&model, &no_members).unwrap();
//!
//! assert!(output.text().contains("int32 count = 1;"));
//! assert!(output.text().contains("rpc Reset(ResetRequest) returns (ResetResponse);"));
//! ```

pub mod classifier;
pub mod collection;
pub mod descriptor;
pub mod dictionary;
pub mod emitter;
pub mod encoding;
pub mod error;
pub mod naming;
pub mod registry;
pub mod schema;

pub use classifier::{ScalarKind, TypeClassifier, TypeReference, WellKnownKind};
pub use collection::CollectionMapper;
pub use descriptor::{
    CommandDescriptor, CommandParameterDescriptor, MemberDescriptor, MemberLookup, ObjectModel,
    PropertyDescriptor, TypeDescriptor, TypeShape,
};
pub use dictionary::DictionaryMapper;
pub use emitter::{EmitterConfig, GenerationOutput, SchemaEmitter};
pub use encoding::FieldMapper;
pub use error::{Diagnostic, DiagnosticKind, Diagnostics, GenerateError, GenerateResult};
pub use registry::{NominalId, Registry};
pub use schema::{
    EnumDescriptor, FieldDescriptor, FieldEncoding, ImportFlags, MessageDescriptor, Provenance,
    RpcDescriptor, Schema, ServiceDescriptor,
};

/// Generate a schema with the default configuration.
pub fn generate(
    model: &ObjectModel,
    lookup: &dyn MemberLookup,
) -> GenerateResult<GenerationOutput> {
    SchemaEmitter::default().emit(model, lookup)
}
