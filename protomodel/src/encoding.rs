//! Mapping of classified types onto field encodings.

use crate::classifier::{TypeClassifier, TypeReference};
use crate::collection::CollectionMapper;
use crate::descriptor::{MemberDescriptor, TypeDescriptor};
use crate::dictionary::DictionaryMapper;
use crate::error::{Diagnostics, GenerateResult};
use crate::naming;
use crate::registry::Registry;
use crate::schema::{FieldDescriptor, FieldEncoding};

/// Turns type descriptors into [`FieldEncoding`]s.
///
/// Holds only configuration; per-run state lives in the [`Registry`] and
/// [`Diagnostics`] passed to each call.
#[derive(Debug, Clone, Default)]
pub struct FieldMapper {
    classifier: TypeClassifier,
}

impl FieldMapper {
    pub fn new(classifier: TypeClassifier) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &TypeClassifier {
        &self.classifier
    }

    /// Classify and encode a type.
    pub fn map_type(
        &self,
        ty: &TypeDescriptor,
        path: &str,
        registry: &mut Registry,
        diagnostics: &mut Diagnostics,
    ) -> GenerateResult<FieldEncoding> {
        let reference = self.classifier.classify(ty, path, registry, diagnostics);
        self.encode(&reference, path, registry, diagnostics)
    }

    /// Encode an already classified type.
    pub fn encode(
        &self,
        reference: &TypeReference,
        path: &str,
        registry: &mut Registry,
        diagnostics: &mut Diagnostics,
    ) -> GenerateResult<FieldEncoding> {
        match reference {
            TypeReference::Primitive(kind) => Ok(FieldEncoding::singular(kind.proto_type())),
            TypeReference::WellKnown { kind, .. } => Ok(FieldEncoding::singular(kind.proto_type())),
            TypeReference::Nullable(kind) => Ok(FieldEncoding::singular(kind.wrapper_type())),
            TypeReference::Enum { .. } | TypeReference::Unsupported { .. } => {
                Ok(FieldEncoding::singular("int32"))
            }
            TypeReference::Message { message_name, .. } => {
                Ok(FieldEncoding::singular(message_name.as_str()))
            }
            TypeReference::Array { element, rank } => {
                CollectionMapper::map(self, element, *rank, path, registry, diagnostics)
            }
            TypeReference::Enumerable(element) => {
                CollectionMapper::map(self, element, 1, path, registry, diagnostics)
            }
            TypeReference::Dictionary { key, value } => {
                DictionaryMapper::map(self, key, value, path, registry, diagnostics)
            }
        }
    }

    /// Map the members of a composite to fields numbered from 1 in order.
    ///
    /// `owner` prefixes the diagnostic path of each member.
    pub fn map_members(
        &self,
        owner: &str,
        members: &[MemberDescriptor],
        registry: &mut Registry,
        diagnostics: &mut Diagnostics,
    ) -> GenerateResult<Vec<FieldDescriptor>> {
        members
            .iter()
            .zip(1u32..)
            .map(|(member, number)| {
                let path = format!("{}.{}", owner, member.name);
                let encoding = self.map_type(&member.ty, &path, registry, diagnostics)?;
                Ok(FieldDescriptor::new(
                    naming::field_name(&member.name),
                    number,
                    encoding,
                ))
            })
            .collect()
    }
}
