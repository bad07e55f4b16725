//! Type classification.
//!
//! The [`TypeClassifier`] maps one [`TypeDescriptor`] onto exactly one
//! [`TypeReference`] variant. Classification is total: a type that cannot be
//! mapped yields [`TypeReference::Unsupported`] plus a soft diagnostic.
//!
//! # Precedence
//!
//! Rules are tried in this order and the first match wins:
//!
//! | # | Rule | Result |
//! |---|------|--------|
//! | 1 | byte array / byte buffer | `bytes` |
//! | 2 | `Option<T>` of a primitive | wrapper (`google.protobuf.Int32Value`) |
//! | 3 | dictionary-shaped generic | `Dictionary(key, value)` |
//! | 4 | enumerable or array | `Enumerable(elem)` / `Array(elem)` |
//! | 5 | enum | `int32` |
//! | 6 | well-known scalar table | scalar or well-known message |
//! | 7 | async wrapper of `T` | `T`, or `google.protobuf.Any` when bare |
//! | 8 | user-defined composite | `Message(id)`, enqueued once |
//! | 9 | anything else | `Unsupported`, encoded as `int32` |

use serde::Serialize;

use crate::descriptor::{TypeDescriptor, TypeShape};
use crate::error::{DiagnosticKind, Diagnostics};
use crate::naming;
use crate::registry::{NominalId, Registry};

/// Namespaces whose types are never expanded as composites.
pub const DEFAULT_DISALLOWED_NAMESPACES: &[&str] = &["std", "core", "alloc"];

/// Default suffix appended to composite type names.
pub const DEFAULT_MESSAGE_SUFFIX: &str = "State";

const BYTE_BUFFER_NAMES: &[&str] = &["Bytes", "BytesMut", "ByteBuf"];
const BYTE_ELEMENT_NAMES: &[&str] = &["u8"];
const NULLABLE_NAMES: &[&str] = &["Option", "Nullable"];
const DICTIONARY_NAMES: &[&str] = &[
    "HashMap",
    "BTreeMap",
    "IndexMap",
    "Dictionary",
    "SortedDictionary",
];
const ENUMERABLE_NAMES: &[&str] = &[
    "Vec",
    "VecDeque",
    "LinkedList",
    "HashSet",
    "BTreeSet",
    "IndexSet",
    "SmallVec",
    "List",
    "IEnumerable",
];
const TEXT_NAMES: &[&str] = &["String", "str"];
const ASYNC_WRAPPER_NAMES: &[&str] = &[
    "Future",
    "BoxFuture",
    "LocalBoxFuture",
    "JoinHandle",
    "Task",
    "ValueTask",
];

/// Protocol scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScalarKind {
    Bool,
    Int32,
    Int64,
    UInt32,
    UInt64,
    Float,
    Double,
    String,
}

impl ScalarKind {
    /// Look up a scalar by type name.
    pub fn from_type_name(name: &str) -> Option<Self> {
        let kind = match name {
            "bool" => Self::Bool,
            "i8" | "i16" | "i32" => Self::Int32,
            "i64" | "isize" => Self::Int64,
            "u8" | "u16" | "u32" => Self::UInt32,
            "u64" | "usize" => Self::UInt64,
            "f32" => Self::Float,
            "f64" => Self::Double,
            "String" | "str" | "char" => Self::String,
            _ => return None,
        };
        Some(kind)
    }

    /// The proto scalar type name.
    pub fn proto_type(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
        }
    }

    /// The explicit-presence wrapper message for this scalar.
    pub fn wrapper_type(self) -> &'static str {
        match self {
            Self::Bool => "google.protobuf.BoolValue",
            Self::Int32 => "google.protobuf.Int32Value",
            Self::Int64 => "google.protobuf.Int64Value",
            Self::UInt32 => "google.protobuf.UInt32Value",
            Self::UInt64 => "google.protobuf.UInt64Value",
            Self::Float => "google.protobuf.FloatValue",
            Self::Double => "google.protobuf.DoubleValue",
            Self::String => "google.protobuf.StringValue",
        }
    }

    /// Name used when building synthesized message names.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::UInt32 => "UInt32",
            Self::UInt64 => "UInt64",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::String => "String",
        }
    }

    /// Whether the protocol accepts this kind as a native map key.
    pub fn is_map_key(self) -> bool {
        !matches!(self, Self::Float | Self::Double)
    }
}

/// Well-known encodings beyond the plain scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WellKnownKind {
    Bytes,
    Timestamp,
    Duration,
    Uuid,
    Uri,
    Decimal,
    BigInteger,
    /// Untyped placeholder for a bare async wrapper.
    Opaque,
}

impl WellKnownKind {
    /// Look up a well-known type by name.
    pub fn from_type_name(name: &str) -> Option<Self> {
        let kind = match name {
            "DateTime" | "NaiveDateTime" | "NaiveDate" | "SystemTime" | "OffsetDateTime"
            | "Timestamp" | "DateTimeOffset" => Self::Timestamp,
            "Duration" | "TimeDelta" | "TimeSpan" => Self::Duration,
            "Uuid" | "Guid" => Self::Uuid,
            "Url" | "Uri" => Self::Uri,
            "Decimal" | "BigDecimal" => Self::Decimal,
            "i128" | "u128" | "BigInt" | "BigInteger" => Self::BigInteger,
            _ => return None,
        };
        Some(kind)
    }

    pub fn proto_type(self) -> &'static str {
        match self {
            Self::Bytes => "bytes",
            Self::Timestamp => "google.protobuf.Timestamp",
            Self::Duration => "google.protobuf.Duration",
            Self::Uuid | Self::Uri | Self::Decimal | Self::BigInteger => "string",
            Self::Opaque => "google.protobuf.Any",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Bytes => "Bytes",
            Self::Timestamp => "Timestamp",
            Self::Duration => "Duration",
            Self::Uuid => "Uuid",
            Self::Uri => "Uri",
            Self::Decimal => "Decimal",
            Self::BigInteger => "BigInteger",
            Self::Opaque => "Any",
        }
    }
}

/// The closed set of shapes a type can classify to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TypeReference {
    Primitive(ScalarKind),
    /// A well-known encoding, with the type name it was written as.
    WellKnown {
        kind: WellKnownKind,
        type_name: String,
    },
    /// Optional primitive, encoded through its wrapper message.
    Nullable(ScalarKind),
    Array {
        element: Box<TypeReference>,
        rank: usize,
    },
    Enumerable(Box<TypeReference>),
    Dictionary {
        key: Box<TypeReference>,
        value: Box<TypeReference>,
    },
    Enum {
        name: String,
    },
    Message {
        id: NominalId,
        type_name: String,
        message_name: String,
    },
    Unsupported {
        type_name: String,
    },
}

impl TypeReference {
    /// A well-known reference named after its kind.
    pub fn well_known(kind: WellKnownKind) -> Self {
        Self::named_well_known(kind, kind.name())
    }

    /// A well-known reference that keeps the name it was declared with
    /// (`Guid` stays `Guid` even though it encodes like `Uuid`).
    pub fn named_well_known(kind: WellKnownKind, type_name: impl Into<String>) -> Self {
        Self::WellKnown {
            kind,
            type_name: type_name.into(),
        }
    }

    /// The proto type of a single value, or `None` for collections and
    /// dictionaries.
    pub fn singular_type(&self) -> Option<String> {
        match self {
            Self::Primitive(kind) => Some(kind.proto_type().to_string()),
            Self::WellKnown { kind, .. } => Some(kind.proto_type().to_string()),
            Self::Nullable(kind) => Some(kind.wrapper_type().to_string()),
            Self::Enum { .. } | Self::Unsupported { .. } => Some("int32".to_string()),
            Self::Message { message_name, .. } => Some(message_name.clone()),
            Self::Array { .. } | Self::Enumerable(_) | Self::Dictionary { .. } => None,
        }
    }

    /// Whether this is a collection (array or enumerable).
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Array { .. } | Self::Enumerable(_))
    }

    /// Structural identity, used to dedup synthesized messages.
    pub fn identity(&self) -> String {
        match self {
            Self::Primitive(kind) => kind.proto_type().to_string(),
            Self::WellKnown { kind, type_name } => format!("wk:{}:{}", kind.name(), type_name),
            Self::Nullable(kind) => kind.wrapper_type().to_string(),
            Self::Array { element, rank } => {
                format!("{}[{}]", element.identity(), ",".repeat(rank.saturating_sub(1)))
            }
            Self::Enumerable(element) => format!("seq({})", element.identity()),
            Self::Dictionary { key, value } => {
                format!("map({},{})", key.identity(), value.identity())
            }
            Self::Enum { name } => format!("enum:{}", name),
            Self::Message { id, .. } => format!("msg:{}", id),
            Self::Unsupported { type_name } => format!("unsupported:{}", type_name),
        }
    }

    /// Name fragment used when naming synthesized messages.
    pub fn name_part(&self) -> String {
        match self {
            Self::Primitive(kind) => kind.name().to_string(),
            Self::WellKnown { type_name, .. } => {
                naming::sanitize_type_name(&naming::to_pascal_case(type_name))
            }
            Self::Nullable(kind) => format!("Nullable{}", kind.name()),
            Self::Array { element, .. } | Self::Enumerable(element) => {
                format!("{}List", element.name_part())
            }
            Self::Dictionary { key, value } => {
                format!("{}{}Map", key.name_part(), value.name_part())
            }
            Self::Enum { name } => naming::sanitize_type_name(name),
            Self::Message { type_name, .. } => naming::sanitize_type_name(type_name),
            Self::Unsupported { type_name } => naming::sanitize_type_name(type_name),
        }
    }

    /// Human-readable description for error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Primitive(kind) => kind.proto_type().to_string(),
            Self::WellKnown { type_name, .. } => type_name.clone(),
            Self::Nullable(kind) => format!("Option<{}>", kind.proto_type()),
            Self::Array { element, rank } => {
                format!("{}[{}]", element.describe(), ",".repeat(rank.saturating_sub(1)))
            }
            Self::Enumerable(element) => format!("Enumerable<{}>", element.describe()),
            Self::Dictionary { key, value } => {
                format!("Dictionary<{}, {}>", key.describe(), value.describe())
            }
            Self::Enum { name } => name.clone(),
            Self::Message { type_name, .. } => type_name.clone(),
            Self::Unsupported { type_name } => type_name.clone(),
        }
    }
}

/// Maps type descriptors onto [`TypeReference`]s.
#[derive(Debug, Clone)]
pub struct TypeClassifier {
    disallowed_namespaces: Vec<String>,
    message_suffix: String,
}

impl Default for TypeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeClassifier {
    /// Create a classifier with the default namespaces and suffix.
    pub fn new() -> Self {
        Self {
            disallowed_namespaces: DEFAULT_DISALLOWED_NAMESPACES
                .iter()
                .map(|ns| ns.to_string())
                .collect(),
            message_suffix: DEFAULT_MESSAGE_SUFFIX.to_string(),
        }
    }

    /// Add namespaces whose types must never become messages.
    pub fn with_disallowed_namespaces<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for ns in namespaces {
            let ns = ns.into();
            if !self.disallowed_namespaces.contains(&ns) {
                self.disallowed_namespaces.push(ns);
            }
        }
        self
    }

    /// Set the suffix appended to composite message names.
    pub fn with_message_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.message_suffix = suffix.into();
        self
    }

    pub fn message_suffix(&self) -> &str {
        &self.message_suffix
    }

    /// Whether `ty` is an asynchronous result wrapper (`Future<T>`, `Task`).
    pub fn is_async_wrapper(ty: &TypeDescriptor) -> bool {
        ty.shape == TypeShape::Named && ASYNC_WRAPPER_NAMES.contains(&ty.name.as_str())
    }

    /// Classify a type descriptor.
    ///
    /// Composite types are enqueued on `registry` unless already processed.
    /// `path` names the property or parameter for diagnostics.
    pub fn classify(
        &self,
        ty: &TypeDescriptor,
        path: &str,
        registry: &mut Registry,
        diagnostics: &mut Diagnostics,
    ) -> TypeReference {
        if let Some(reference) = Self::byte_buffer(ty) {
            return reference;
        }
        if let Some(reference) = self.nullable(ty, path, registry, diagnostics) {
            return reference;
        }
        if let Some(reference) = self.dictionary(ty, path, registry, diagnostics) {
            return reference;
        }
        if let Some(reference) = self.enumerable(ty, path, registry, diagnostics) {
            return reference;
        }
        if ty.shape == TypeShape::Enum {
            return TypeReference::Enum {
                name: ty.display_name(),
            };
        }
        if let Some(reference) = Self::well_known(ty) {
            return reference;
        }
        if let Some(reference) = self.async_wrapper(ty, path, registry, diagnostics) {
            return reference;
        }
        if let Some(reference) = self.composite(ty, registry) {
            return reference;
        }

        let type_name = ty.canonical_id();
        diagnostics.push(
            DiagnosticKind::UnsupportedType,
            type_name.clone(),
            path,
            "type has no wire mapping; encoded as int32",
        );
        TypeReference::Unsupported { type_name }
    }

    /// Rule 1: byte arrays and byte-element buffers.
    fn byte_buffer(ty: &TypeDescriptor) -> Option<TypeReference> {
        let is_byte = |element: &TypeDescriptor| {
            element.shape == TypeShape::Named
                && element.args.is_empty()
                && BYTE_ELEMENT_NAMES.contains(&element.name.as_str())
        };

        let matches = match ty.shape {
            TypeShape::Array { rank: 1 } => ty.args.len() == 1 && is_byte(&ty.args[0]),
            TypeShape::Named => {
                (ty.args.is_empty() && BYTE_BUFFER_NAMES.contains(&ty.name.as_str()))
                    || (ty.args.len() == 1
                        && ENUMERABLE_NAMES.contains(&ty.name.as_str())
                        && is_byte(&ty.args[0]))
            }
            _ => false,
        };

        matches.then(|| TypeReference::well_known(WellKnownKind::Bytes))
    }

    /// Rule 2: optional values.
    ///
    /// An optional primitive becomes a wrapper. Any other optional is
    /// classified as its inner type; messages and well-known messages already
    /// carry presence, and collections cannot be optional.
    fn nullable(
        &self,
        ty: &TypeDescriptor,
        path: &str,
        registry: &mut Registry,
        diagnostics: &mut Diagnostics,
    ) -> Option<TypeReference> {
        if ty.shape != TypeShape::Named
            || ty.args.len() != 1
            || !NULLABLE_NAMES.contains(&ty.name.as_str())
        {
            return None;
        }

        let inner = &ty.args[0];
        if inner.shape == TypeShape::Named && inner.args.is_empty() {
            if let Some(kind) = ScalarKind::from_type_name(&inner.name) {
                return Some(TypeReference::Nullable(kind));
            }
        }

        Some(self.classify(inner, path, registry, diagnostics))
    }

    /// Rule 3: key/value generics.
    fn dictionary(
        &self,
        ty: &TypeDescriptor,
        path: &str,
        registry: &mut Registry,
        diagnostics: &mut Diagnostics,
    ) -> Option<TypeReference> {
        if ty.shape != TypeShape::Named
            || ty.args.len() != 2
            || !DICTIONARY_NAMES.contains(&ty.name.as_str())
        {
            return None;
        }

        let key = self.classify(&ty.args[0], path, registry, diagnostics);
        let value = self.classify(&ty.args[1], path, registry, diagnostics);
        Some(TypeReference::Dictionary {
            key: Box::new(key),
            value: Box::new(value),
        })
    }

    /// Rule 4: arrays and enumerables, never text.
    fn enumerable(
        &self,
        ty: &TypeDescriptor,
        path: &str,
        registry: &mut Registry,
        diagnostics: &mut Diagnostics,
    ) -> Option<TypeReference> {
        if TEXT_NAMES.contains(&ty.name.as_str()) && ty.shape == TypeShape::Named {
            return None;
        }

        match ty.shape {
            TypeShape::Array { rank } => {
                let element = ty.first_arg()?;
                let element = self.classify(element, path, registry, diagnostics);
                Some(TypeReference::Array {
                    element: Box::new(element),
                    rank,
                })
            }
            TypeShape::Named
                if ty.args.len() == 1 && ENUMERABLE_NAMES.contains(&ty.name.as_str()) =>
            {
                let element = self.classify(&ty.args[0], path, registry, diagnostics);
                Some(TypeReference::Enumerable(Box::new(element)))
            }
            _ => None,
        }
    }

    /// Rule 6: the fixed scalar and well-known tables.
    fn well_known(ty: &TypeDescriptor) -> Option<TypeReference> {
        if ty.shape != TypeShape::Named {
            return None;
        }

        if ty.args.is_empty() {
            if let Some(kind) = ScalarKind::from_type_name(&ty.name) {
                return Some(TypeReference::Primitive(kind));
            }
        }

        WellKnownKind::from_type_name(&ty.name)
            .map(|kind| TypeReference::named_well_known(kind, ty.name.as_str()))
    }

    /// Rule 7: asynchronous result wrappers.
    fn async_wrapper(
        &self,
        ty: &TypeDescriptor,
        path: &str,
        registry: &mut Registry,
        diagnostics: &mut Diagnostics,
    ) -> Option<TypeReference> {
        if !Self::is_async_wrapper(ty) {
            return None;
        }

        match ty.first_arg() {
            Some(inner) if !inner.is_unit() => {
                Some(self.classify(inner, path, registry, diagnostics))
            }
            _ => Some(TypeReference::well_known(WellKnownKind::Opaque)),
        }
    }

    /// Rule 8: user-defined composites.
    fn composite(&self, ty: &TypeDescriptor, registry: &mut Registry) -> Option<TypeReference> {
        if ty.shape != TypeShape::Named || self.is_foundational(ty) {
            return None;
        }

        let id = NominalId::new(ty.canonical_id());
        let type_name = ty.display_name();
        let message_name = naming::message_name(&type_name, &self.message_suffix);

        registry.enqueue(id.clone(), ty.clone(), message_name.clone());

        Some(TypeReference::Message {
            id,
            type_name,
            message_name,
        })
    }

    /// Whether the type lives in a disallowed namespace or reuses the name of
    /// a container the earlier rules failed to match.
    fn is_foundational(&self, ty: &TypeDescriptor) -> bool {
        let in_disallowed_namespace = self
            .disallowed_namespaces
            .iter()
            .any(|ns| ty.is_in_namespace(ns));

        let name = ty.name.as_str();
        let is_container_name = NULLABLE_NAMES.contains(&name)
            || DICTIONARY_NAMES.contains(&name)
            || ENUMERABLE_NAMES.contains(&name)
            || TEXT_NAMES.contains(&name);

        in_disallowed_namespace || is_container_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(ty: &TypeDescriptor) -> (TypeReference, Registry, Diagnostics) {
        let mut registry = Registry::new();
        let mut diagnostics = Diagnostics::new();
        let reference =
            TypeClassifier::new().classify(ty, "Model.field", &mut registry, &mut diagnostics);
        (reference, registry, diagnostics)
    }

    fn named(name: &str) -> TypeDescriptor {
        TypeDescriptor::named(name)
    }

    fn generic(name: &str, args: Vec<TypeDescriptor>) -> TypeDescriptor {
        TypeDescriptor::generic(name, args)
    }

    #[test]
    fn test_primitives() {
        let cases = [
            ("bool", ScalarKind::Bool),
            ("i8", ScalarKind::Int32),
            ("i32", ScalarKind::Int32),
            ("i64", ScalarKind::Int64),
            ("usize", ScalarKind::UInt64),
            ("u16", ScalarKind::UInt32),
            ("f32", ScalarKind::Float),
            ("f64", ScalarKind::Double),
            ("String", ScalarKind::String),
            ("char", ScalarKind::String),
        ];

        for (name, expected) in cases {
            let (reference, _, _) = classify(&named(name));
            assert_eq!(reference, TypeReference::Primitive(expected), "{}", name);
        }
    }

    #[test]
    fn test_byte_vec_is_bytes() {
        let (reference, _, _) = classify(&generic("Vec", vec![named("u8")]));
        assert_eq!(reference, TypeReference::well_known(WellKnownKind::Bytes));
    }

    #[test]
    fn test_byte_array_and_buffers_are_bytes() {
        for ty in [
            TypeDescriptor::array(named("u8"), 1),
            named("Bytes"),
            generic("VecDeque", vec![named("u8")]),
        ] {
            let (reference, _, _) = classify(&ty);
            assert_eq!(reference, TypeReference::well_known(WellKnownKind::Bytes));
        }
    }

    #[test]
    fn test_two_dimensional_byte_array_is_not_bytes() {
        let (reference, _, _) = classify(&TypeDescriptor::array(named("u8"), 2));
        assert!(matches!(reference, TypeReference::Array { rank: 2, .. }));
    }

    #[test]
    fn test_optional_primitive_is_wrapper() {
        let (reference, _, _) = classify(&generic("Option", vec![named("i32")]));
        assert_eq!(reference, TypeReference::Nullable(ScalarKind::Int32));
        assert_eq!(
            reference.singular_type().unwrap(),
            "google.protobuf.Int32Value"
        );
    }

    #[test]
    fn test_optional_well_known_unwraps() {
        let (reference, _, _) = classify(&generic("Option", vec![named("DateTime")]));
        assert_eq!(
            reference,
            TypeReference::named_well_known(WellKnownKind::Timestamp, "DateTime")
        );
    }

    #[test]
    fn test_optional_composite_unwraps() {
        let (reference, registry, _) = classify(&generic("Option", vec![named("Node")]));
        assert!(matches!(reference, TypeReference::Message { .. }));
        assert_eq!(registry.pending(), 1);
    }

    #[test]
    fn test_dictionary() {
        let (reference, _, _) = classify(&generic("HashMap", vec![named("String"), named("i32")]));
        assert_eq!(
            reference,
            TypeReference::Dictionary {
                key: Box::new(TypeReference::Primitive(ScalarKind::String)),
                value: Box::new(TypeReference::Primitive(ScalarKind::Int32)),
            }
        );
    }

    #[test]
    fn test_enumerable() {
        let (reference, _, _) = classify(&generic("Vec", vec![named("String")]));
        assert_eq!(
            reference,
            TypeReference::Enumerable(Box::new(TypeReference::Primitive(ScalarKind::String)))
        );
    }

    #[test]
    fn test_enum_is_int32() {
        let (reference, _, _) = classify(&TypeDescriptor::enumeration("Color"));
        assert_eq!(reference.singular_type().unwrap(), "int32");
    }

    #[test]
    fn test_well_known_types() {
        let cases = [
            ("DateTime", "google.protobuf.Timestamp"),
            ("SystemTime", "google.protobuf.Timestamp"),
            ("Duration", "google.protobuf.Duration"),
            ("Uuid", "string"),
            ("Url", "string"),
            ("Decimal", "string"),
            ("i128", "string"),
        ];

        for (name, expected) in cases {
            let (reference, _, _) = classify(&named(name));
            assert_eq!(reference.singular_type().unwrap(), expected, "{}", name);
        }
    }

    #[test]
    fn test_generic_well_known_ignores_args() {
        let (reference, _, _) = classify(&generic("DateTime", vec![named("Utc")]));
        assert_eq!(
            reference,
            TypeReference::named_well_known(WellKnownKind::Timestamp, "DateTime")
        );
    }

    #[test]
    fn test_well_known_aliases_keep_their_name() {
        let (guid, _, _) = classify(&named("Guid"));
        let (uuid, _, _) = classify(&named("Uuid"));

        assert_eq!(guid.singular_type(), uuid.singular_type());
        assert_eq!(guid.name_part(), "Guid");
        assert_eq!(uuid.name_part(), "Uuid");
        assert_ne!(guid.identity(), uuid.identity());
    }

    #[test]
    fn test_async_wrapper_unwraps() {
        let (reference, _, _) = classify(&generic("Future", vec![named("i64")]));
        assert_eq!(reference, TypeReference::Primitive(ScalarKind::Int64));
    }

    #[test]
    fn test_is_async_wrapper() {
        assert!(TypeClassifier::is_async_wrapper(&generic("BoxFuture", vec![named("i32")])));
        assert!(TypeClassifier::is_async_wrapper(&named("Task")));
        assert!(!TypeClassifier::is_async_wrapper(&named("Result")));
    }

    #[test]
    fn test_bare_async_wrapper_is_opaque() {
        for ty in [named("Task"), generic("JoinHandle", vec![TypeDescriptor::tuple(vec![])])] {
            let (reference, _, _) = classify(&ty);
            assert_eq!(reference.singular_type().unwrap(), "google.protobuf.Any");
        }
    }

    #[test]
    fn test_composite_is_enqueued_once() {
        let mut registry = Registry::new();
        let mut diagnostics = Diagnostics::new();
        let classifier = TypeClassifier::new();
        let node = named("Node");

        let first = classifier.classify(&node, "a", &mut registry, &mut diagnostics);
        let second = classifier.classify(&node, "b", &mut registry, &mut diagnostics);

        assert_eq!(first, second);
        assert_eq!(registry.pending(), 1);
        assert_eq!(first.singular_type().unwrap(), "NodeState");
    }

    #[test]
    fn test_disallowed_namespace_is_unsupported() {
        let ty = named("Instant").with_namespace(["std", "time"]);
        let (reference, registry, diagnostics) = classify(&ty);

        assert!(matches!(reference, TypeReference::Unsupported { .. }));
        assert_eq!(reference.singular_type().unwrap(), "int32");
        assert_eq!(registry.pending(), 0);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_configured_namespace_is_unsupported() {
        let mut registry = Registry::new();
        let mut diagnostics = Diagnostics::new();
        let classifier = TypeClassifier::new().with_disallowed_namespaces(["tokio"]);
        let ty = named("Sender").with_namespace(["tokio", "sync"]);

        let reference = classifier.classify(&ty, "M.tx", &mut registry, &mut diagnostics);
        assert!(matches!(reference, TypeReference::Unsupported { .. }));
    }

    #[test]
    fn test_tuple_is_unsupported_with_diagnostic() {
        let ty = TypeDescriptor::tuple(vec![named("i32"), named("i32")]);
        let (reference, _, diagnostics) = classify(&ty);

        assert!(matches!(reference, TypeReference::Unsupported { .. }));
        let diagnostic = diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.kind, DiagnosticKind::UnsupportedType);
        assert_eq!(diagnostic.type_name, "(i32,i32)");
        assert_eq!(diagnostic.path, "Model.field");
    }

    #[test]
    fn test_container_with_wrong_arity_is_unsupported() {
        let (reference, registry, _) = classify(&generic("HashMap", vec![named("String")]));
        assert!(matches!(reference, TypeReference::Unsupported { .. }));
        assert_eq!(registry.pending(), 0);
    }

    #[test]
    fn test_custom_message_suffix() {
        let mut registry = Registry::new();
        let mut diagnostics = Diagnostics::new();
        let classifier = TypeClassifier::new().with_message_suffix("Dto");

        let reference = classifier.classify(&named("Node"), "p", &mut registry, &mut diagnostics);
        assert_eq!(reference.singular_type().unwrap(), "NodeDto");
    }

    #[test]
    fn test_name_parts() {
        assert_eq!(TypeReference::Primitive(ScalarKind::Int32).name_part(), "Int32");
        assert_eq!(TypeReference::well_known(WellKnownKind::Uuid).name_part(), "Uuid");
        assert_eq!(
            TypeReference::named_well_known(WellKnownKind::BigInteger, "i128").name_part(),
            "I128"
        );
        let list =
            TypeReference::Enumerable(Box::new(TypeReference::Primitive(ScalarKind::String)));
        assert_eq!(list.name_part(), "StringList");
    }
}
