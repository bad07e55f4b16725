//! Rust source parsing.
//!
//! Every scanned file is parsed with `syn` and its structs, enums and
//! inherent impl methods are recorded in a [`TypeIndex`]. Inline modules are
//! walked; `#[cfg(test)]` items are skipped.

use std::path::Path;

use syn::ext::IdentExt;
use syn::{Attribute, FnArg, Item, ItemImpl, LitStr, Meta, Pat, Token, Visibility};

use crate::error::ParseError;
use crate::index::{FieldDef, MethodDef, SourceLocation, StructDef, StructKind, TypeIndex};
use crate::scanner::SourceFile;

/// Parser filling a [`TypeIndex`] from source files.
#[derive(Debug, Default)]
pub struct RustParser;

impl RustParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse all files into one index.
    ///
    /// A file that fails to parse is reported and skipped; the rest are
    /// still indexed.
    pub fn parse_files(&self, files: &[SourceFile]) -> (TypeIndex, Vec<ParseError>) {
        let mut index = TypeIndex::default();
        let mut errors = Vec::new();

        for file in files {
            if let Err(e) = self.parse_file(file, &mut index) {
                tracing::warn!(file = %file.path.display(), error = %e, "skipping unparsable file");
                errors.push(e);
            }
        }

        (index, errors)
    }

    /// Parse a single file into `index`.
    pub fn parse_file(&self, file: &SourceFile, index: &mut TypeIndex) -> Result<(), ParseError> {
        let syntax = syn::parse_file(&file.content).map_err(|e| {
            let start = e.span().start();
            ParseError::syntax(file.path.clone(), start.line, start.column + 1, e.to_string())
        })?;

        for module in module_names(&file.relative_path) {
            index.insert_module(module);
        }

        let before = index.len();
        self.visit_items(&syntax.items, &file.path, index);
        tracing::debug!(
            file = %file.relative_path.display(),
            types = index.len() - before,
            "parsed source"
        );
        Ok(())
    }

    fn visit_items(&self, items: &[Item], file: &Path, index: &mut TypeIndex) {
        for item in items {
            match item {
                Item::Struct(item) if !is_cfg_test(&item.attrs) => {
                    let location = SourceLocation::of(file, item.ident.span());
                    let def = StructDef {
                        name: item.ident.unraw().to_string(),
                        generics: item
                            .generics
                            .type_params()
                            .map(|param| param.ident.to_string())
                            .collect(),
                        kind: StructKind::of(&item.fields),
                        fields: parse_fields(&item.fields),
                        location,
                    };
                    index.insert_struct(def);
                }
                Item::Enum(item) if !is_cfg_test(&item.attrs) => {
                    index.insert_enum(
                        item.ident.unraw().to_string(),
                        SourceLocation::of(file, item.ident.span()),
                    );
                }
                Item::Impl(item) if !is_cfg_test(&item.attrs) => {
                    if let Some((self_type, methods)) = parse_inherent_impl(item) {
                        index.insert_methods(self_type, methods);
                    }
                }
                Item::Mod(module) if !is_cfg_test(&module.attrs) => {
                    index.insert_module(module.ident.unraw().to_string());
                    if let Some((_, ref items)) = module.content {
                        self.visit_items(items, file, index);
                    }
                }
                _ => {}
            }
        }
    }
}

/// Module names implied by a file's relative path: `src/models/todo.rs`
/// declares `models` and `todo`.
fn module_names(relative_path: &Path) -> Vec<String> {
    let stem = relative_path.with_extension("");
    stem.components()
        .filter_map(|component| component.as_os_str().to_str())
        .filter(|name| !matches!(*name, "src" | "lib" | "main" | "mod" | "." | ".."))
        .map(str::to_string)
        .collect()
}

fn parse_fields(fields: &syn::Fields) -> Vec<FieldDef> {
    fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let serde_attrs = SerdeAttrs::from_attrs(&field.attrs);
            let declared = field
                .ident
                .as_ref()
                .map(|ident| ident.unraw().to_string())
                .unwrap_or_else(|| format!("field{}", i));
            FieldDef {
                name: serde_attrs.rename.unwrap_or(declared),
                ty: field.ty.clone(),
                is_public: matches!(field.vis, Visibility::Public(_)),
                skipped: serde_attrs.skip || is_doc_hidden(&field.attrs),
            }
        })
        .collect()
}

/// Methods of an inherent impl, keyed by the implementing type name.
///
/// Trait impls are ignored: their methods are not part of the type's own
/// command surface.
fn parse_inherent_impl(item: &ItemImpl) -> Option<(String, Vec<MethodDef>)> {
    if item.trait_.is_some() {
        return None;
    }

    let syn::Type::Path(self_ty) = item.self_ty.as_ref() else {
        return None;
    };
    let self_type = self_ty.path.segments.last()?.ident.unraw().to_string();

    let methods = item
        .items
        .iter()
        .filter_map(|impl_item| match impl_item {
            syn::ImplItem::Fn(method) => Some(parse_method(method)),
            _ => None,
        })
        .collect();

    Some((self_type, methods))
}

fn parse_method(method: &syn::ImplItemFn) -> MethodDef {
    let sig = &method.sig;
    let mut has_receiver = false;
    let mut params = Vec::new();

    for (i, input) in sig.inputs.iter().enumerate() {
        match input {
            FnArg::Receiver(_) => has_receiver = true,
            FnArg::Typed(typed) => {
                let name = match typed.pat.as_ref() {
                    Pat::Ident(pat) => pat.ident.unraw().to_string(),
                    _ => format!("arg{}", i),
                };
                params.push((name, typed.ty.as_ref().clone()));
            }
        }
    }

    MethodDef {
        name: sig.ident.unraw().to_string(),
        is_public: matches!(method.vis, Visibility::Public(_)),
        is_async: sig.asyncness.is_some(),
        hidden: is_doc_hidden(&method.attrs) || is_cfg_test(&method.attrs),
        has_receiver,
        params,
        output: sig.output.clone(),
    }
}

/// The subset of `#[serde(...)]` that changes what is serialized.
#[derive(Debug, Default)]
struct SerdeAttrs {
    skip: bool,
    rename: Option<String>,
}

impl SerdeAttrs {
    fn from_attrs(attrs: &[Attribute]) -> Self {
        let mut parsed = Self::default();

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
            // Unknown serde keys are consumed and ignored.
            let result = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                    parsed.skip = true;
                } else if meta.path.is_ident("rename") && meta.input.peek(Token![=]) {
                    let name: LitStr = meta.value()?.parse()?;
                    parsed.rename = Some(name.value());
                    return Ok(());
                }

                if meta.input.peek(Token![=]) {
                    meta.value()?.parse::<syn::Expr>()?;
                } else if meta.input.peek(syn::token::Paren) {
                    let _nested;
                    syn::parenthesized!(_nested in meta.input);
                }
                Ok(())
            });

            if let Err(e) = result {
                tracing::debug!(error = %e, "ignoring malformed serde attribute");
            }
        }

        parsed
    }
}

fn is_cfg_test(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path().is_ident("cfg")
            && matches!(&attr.meta, Meta::List(list) if list.tokens.to_string() == "test")
    })
}

fn is_doc_hidden(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path().is_ident("doc")
            && matches!(&attr.meta, Meta::List(list) if list.tokens.to_string() == "hidden")
    })
}
