//! Encoding of arrays and enumerables.

use crate::classifier::TypeReference;
use crate::dictionary::DictionaryMapper;
use crate::encoding::FieldMapper;
use crate::error::{Diagnostics, GenerateError, GenerateResult};
use crate::registry::Registry;
use crate::schema::FieldEncoding;

/// Maps collections to `repeated` fields.
pub struct CollectionMapper;

impl CollectionMapper {
    /// Encode a collection of `element` with `rank` dimensions.
    ///
    /// - rank above 1 fails
    /// - an element that is itself a collection fails
    /// - a dictionary element is wrapped in a synthesized message
    pub fn map(
        mapper: &FieldMapper,
        element: &TypeReference,
        rank: usize,
        path: &str,
        registry: &mut Registry,
        diagnostics: &mut Diagnostics,
    ) -> GenerateResult<FieldEncoding> {
        if rank > 1 {
            return Err(GenerateError::unsupported_shape(
                format!("{}[{}]", element.describe(), ",".repeat(rank - 1)),
                path,
                format!("arrays of rank {} have no wire representation", rank),
            ));
        }

        match element {
            TypeReference::Array { .. } | TypeReference::Enumerable(_) => {
                Err(GenerateError::unsupported_shape(
                    format!("Enumerable<{}>", element.describe()),
                    path,
                    "nested collections have no wire representation",
                ))
            }
            TypeReference::Dictionary { key, value } => {
                let wrapper = DictionaryMapper::wrapper_message(
                    mapper,
                    key,
                    value,
                    path,
                    registry,
                    diagnostics,
                )?;
                Ok(FieldEncoding::repeated(wrapper))
            }
            TypeReference::Primitive(_)
            | TypeReference::WellKnown { .. }
            | TypeReference::Nullable(_)
            | TypeReference::Enum { .. }
            | TypeReference::Message { .. }
            | TypeReference::Unsupported { .. } => element
                .singular_type()
                .map(FieldEncoding::repeated)
                .ok_or_else(|| {
                    GenerateError::unsupported_shape(
                        element.describe(),
                        path,
                        "collection element has no singular encoding",
                    )
                }),
        }
    }
}
