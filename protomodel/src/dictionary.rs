//! Encoding of key/value dictionaries.
//!
//! A dictionary becomes a native `map<K, V>` field when the protocol allows
//! it. Otherwise a `{K}_{V}_Entry` message with `key = 1` and `value = 2` is
//! synthesized and the field becomes `repeated {K}_{V}_Entry`.
//!
//! Synthesized messages are cached by the structural identity of their key
//! and value, so every identical pair in a run shares one message.

use crate::classifier::TypeReference;
use crate::encoding::FieldMapper;
use crate::error::{DiagnosticKind, Diagnostics, GenerateError, GenerateResult};
use crate::registry::{NameClaim, Registry};
use crate::schema::{FieldDescriptor, FieldEncoding, MessageDescriptor, Provenance};

/// Maps dictionaries to native maps or synthesized entry messages.
pub struct DictionaryMapper;

impl DictionaryMapper {
    /// Encode a dictionary field.
    pub fn map(
        mapper: &FieldMapper,
        key: &TypeReference,
        value: &TypeReference,
        path: &str,
        registry: &mut Registry,
        diagnostics: &mut Diagnostics,
    ) -> GenerateResult<FieldEncoding> {
        Self::ensure_mappable(key, value, path)?;

        if let (true, Some(key_type), Some(value_type)) = (
            Self::is_native_key(key),
            key.singular_type(),
            value.singular_type(),
        ) {
            return Ok(FieldEncoding::map(key_type, value_type));
        }

        let entry = Self::entry_message(mapper, key, value, path, registry, diagnostics)?;
        Ok(FieldEncoding::repeated(entry))
    }

    /// Whether `key` is accepted as a native map key: integral, bool or text.
    pub fn is_native_key(key: &TypeReference) -> bool {
        matches!(key, TypeReference::Primitive(kind) if kind.is_map_key())
    }

    /// Synthesize (or reuse) the `{K}_{V}_Entry` message for a pair.
    pub fn entry_message(
        mapper: &FieldMapper,
        key: &TypeReference,
        value: &TypeReference,
        path: &str,
        registry: &mut Registry,
        diagnostics: &mut Diagnostics,
    ) -> GenerateResult<String> {
        let identity = format!("entry({}=>{})", key.identity(), value.identity());
        let name = format!("{}_{}_Entry", key.name_part(), value.name_part());

        Self::synthesize(&identity, name, path, registry, diagnostics, |registry, diagnostics| {
            let key_path = format!("{}.key", path);
            let value_path = format!("{}.value", path);
            Ok(vec![
                FieldDescriptor::new(
                    "key",
                    1,
                    mapper.encode(key, &key_path, registry, diagnostics)?,
                ),
                FieldDescriptor::new(
                    "value",
                    2,
                    mapper.encode(value, &value_path, registry, diagnostics)?,
                ),
            ])
        })
    }

    /// Synthesize (or reuse) the `{K}_{V}_Entries` wrapper used when a
    /// dictionary is itself a collection element.
    ///
    /// The wrapper has one field, `entries`, holding the dictionary.
    pub fn wrapper_message(
        mapper: &FieldMapper,
        key: &TypeReference,
        value: &TypeReference,
        path: &str,
        registry: &mut Registry,
        diagnostics: &mut Diagnostics,
    ) -> GenerateResult<String> {
        let identity = format!("entries({}=>{})", key.identity(), value.identity());
        let name = format!("{}_{}_Entries", key.name_part(), value.name_part());

        Self::synthesize(&identity, name, path, registry, diagnostics, |registry, diagnostics| {
            let encoding = Self::map(mapper, key, value, path, registry, diagnostics)?;
            Ok(vec![FieldDescriptor::new("entries", 1, encoding)])
        })
    }

    /// Keys and values with no wire mapping make the whole dictionary
    /// unrepresentable.
    fn ensure_mappable(
        key: &TypeReference,
        value: &TypeReference,
        path: &str,
    ) -> GenerateResult<()> {
        for (role, reference) in [("key", key), ("value", value)] {
            if let TypeReference::Unsupported { type_name } = reference {
                return Err(GenerateError::unsupported_shape(
                    format!("Dictionary<{}, {}>", key.describe(), value.describe()),
                    path,
                    format!("dictionary {} type '{}' has no wire mapping", role, type_name),
                ));
            }
        }
        Ok(())
    }

    fn synthesize<F>(
        identity: &str,
        name: String,
        path: &str,
        registry: &mut Registry,
        diagnostics: &mut Diagnostics,
        build: F,
    ) -> GenerateResult<String>
    where
        F: FnOnce(&mut Registry, &mut Diagnostics) -> GenerateResult<Vec<FieldDescriptor>>,
    {
        if let Some(existing) = registry.synthesized_name(identity) {
            return Ok(existing.to_string());
        }

        match registry.claim_name(identity, &name) {
            NameClaim::Claimed => {
                tracing::debug!(name = %name, identity, "synthesized message");
                let fields = build(registry, diagnostics)?;
                registry.emit(
                    MessageDescriptor::new(name.clone(), Provenance::SynthesizedEntry)
                        .with_fields(fields),
                );
            }
            NameClaim::Taken { owner } => {
                diagnostics.push(
                    DiagnosticKind::NamingCollision,
                    name.clone(),
                    path,
                    format!(
                        "'{}' already defined for {}; {} reuses it",
                        name, owner, identity
                    ),
                );
            }
        }

        Ok(name)
    }
}
