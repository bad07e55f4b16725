//! Index of the types declared in the scanned sources.
//!
//! The index is the introspection side of generation: it answers
//! [`MemberLookup`] queries for nested composites and builds the
//! [`ObjectModel`] of the root struct.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use protomodel::{
    naming, CommandDescriptor, MemberDescriptor, MemberLookup, ObjectModel, TypeClassifier,
    TypeDescriptor,
};

use crate::error::ModelError;
use crate::type_parser::TypeParser;

/// Suffix of structs picked as root when no name is configured.
pub const ROOT_SUFFIX: &str = "ViewModel";

/// Where a type was declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn of(file: &Path, span: proc_macro2::Span) -> Self {
        let start = span.start();
        Self {
            file: file.to_path_buf(),
            line: start.line,
            column: start.column + 1,
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructKind {
    Named,
    Tuple,
    Unit,
}

impl StructKind {
    pub fn of(fields: &syn::Fields) -> Self {
        match fields {
            syn::Fields::Named(_) => Self::Named,
            syn::Fields::Unnamed(_) => Self::Tuple,
            syn::Fields::Unit => Self::Unit,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StructDef {
    pub name: String,
    /// Type parameter names in declaration order.
    pub generics: Vec<String>,
    pub kind: StructKind,
    pub fields: Vec<FieldDef>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Serialized name: the `#[serde(rename)]` value when present.
    pub name: String,
    pub ty: syn::Type,
    pub is_public: bool,
    pub skipped: bool,
}

#[derive(Debug, Clone)]
pub struct MethodDef {
    pub name: String,
    pub is_public: bool,
    pub is_async: bool,
    pub hidden: bool,
    pub has_receiver: bool,
    pub params: Vec<(String, syn::Type)>,
    pub output: syn::ReturnType,
}

impl MethodDef {
    /// Public, visible, and called on an instance.
    pub fn is_command(&self) -> bool {
        self.is_public && self.has_receiver && !self.hidden
    }
}

/// Structs, enums and inherent methods found across all sources.
///
/// The first declaration of a name wins; later ones are logged and ignored.
#[derive(Debug, Default)]
pub struct TypeIndex {
    structs: Vec<StructDef>,
    positions: HashMap<String, usize>,
    enums: BTreeMap<String, SourceLocation>,
    methods: HashMap<String, Vec<MethodDef>>,
    modules: BTreeSet<String>,
}

impl TypeIndex {
    pub fn insert_struct(&mut self, def: StructDef) {
        if let Some(&existing) = self.positions.get(&def.name) {
            tracing::warn!(
                name = %def.name,
                kept = %self.structs[existing].location,
                ignored = %def.location,
                "duplicate struct name"
            );
            return;
        }
        self.positions.insert(def.name.clone(), self.structs.len());
        self.structs.push(def);
    }

    pub fn insert_enum(&mut self, name: String, location: SourceLocation) {
        if let Some(kept) = self.enums.get(&name) {
            tracing::warn!(name = %name, kept = %kept, ignored = %location, "duplicate enum name");
            return;
        }
        self.enums.insert(name, location);
    }

    /// Methods from several impl blocks accumulate in source order.
    pub fn insert_methods(&mut self, self_type: String, methods: Vec<MethodDef>) {
        self.methods.entry(self_type).or_default().extend(methods);
    }

    /// Record a module name of the scanned sources, from a `mod` item or a
    /// file path.
    pub fn insert_module(&mut self, name: impl Into<String>) {
        self.modules.insert(name.into());
    }

    pub fn is_module(&self, name: &str) -> bool {
        self.modules.contains(name)
    }

    pub fn contains_struct(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn is_enum(&self, name: &str) -> bool {
        self.enums.contains_key(name)
    }

    pub fn struct_def(&self, name: &str) -> Option<&StructDef> {
        self.positions.get(name).map(|&i| &self.structs[i])
    }

    pub fn structs(&self) -> impl Iterator<Item = &StructDef> {
        self.structs.iter()
    }

    pub fn methods(&self, type_name: &str) -> &[MethodDef] {
        self.methods.get(type_name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of structs and enums indexed.
    pub fn len(&self) -> usize {
        self.structs.len() + self.enums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The single struct with named fields whose name ends in `ViewModel`.
    pub fn detect_root(&self) -> Result<String, ModelError> {
        let mut candidates: Vec<String> = self
            .structs
            .iter()
            .filter(|def| def.kind == StructKind::Named && def.name.ends_with(ROOT_SUFFIX))
            .map(|def| def.name.clone())
            .collect();

        if candidates.len() > 1 {
            candidates.sort();
            return Err(ModelError::AmbiguousRoot { candidates });
        }
        candidates.pop().ok_or(ModelError::NoRootDetected)
    }

    /// Build the object model rooted at struct `name`.
    ///
    /// Properties are the `pub` fields not skipped by serde, in declaration
    /// order. Commands are the public instance methods of the struct's
    /// inherent impls.
    pub fn object_model(&self, name: &str) -> Result<ObjectModel, ModelError> {
        let def = self.struct_def(name).ok_or_else(|| {
            if self.is_enum(name) {
                ModelError::NotAStruct {
                    name: name.to_string(),
                }
            } else {
                ModelError::RootNotFound {
                    name: name.to_string(),
                }
            }
        })?;

        if def.kind != StructKind::Named {
            return Err(ModelError::NotAStruct {
                name: name.to_string(),
            });
        }

        let parser = TypeParser::new(self).with_self_type(name);
        let mut model = ObjectModel::new(name);

        for field in def.fields.iter().filter(|f| f.is_public && !f.skipped) {
            model = model.with_property(field.name.clone(), parser.parse(&field.ty));
        }

        for method in self.methods(name).iter().filter(|m| m.is_command()) {
            let returns = parser.parse_return(&method.output);
            let mut command = CommandDescriptor::new(naming::to_pascal_case(&method.name));
            if method.is_async || TypeClassifier::is_async_wrapper(&returns) {
                command = command.asynchronous();
            }
            for (param, ty) in &method.params {
                command = command.with_parameter(param.clone(), parser.parse(ty));
            }
            model = model.with_command(command);
        }

        tracing::debug!(
            model = %name,
            properties = model.properties.len(),
            commands = model.commands.len(),
            "extracted object model"
        );
        Ok(model)
    }
}

impl MemberLookup for TypeIndex {
    /// All serialized fields of a scanned struct, with the descriptor's
    /// generic arguments substituted for the struct's parameters.
    ///
    /// Types from other crates have no members.
    fn members(&self, ty: &TypeDescriptor) -> Vec<MemberDescriptor> {
        if !ty.namespace.is_empty() {
            if self.contains_struct(&ty.name) {
                tracing::warn!(
                    type_name = %ty.canonical_id(),
                    "path does not reach a scanned module; local struct of the same name ignored"
                );
            }
            return Vec::new();
        }
        let Some(def) = self.struct_def(&ty.name) else {
            tracing::debug!(type_name = %ty.canonical_id(), "no declaration found; empty message");
            return Vec::new();
        };

        let mut parser = TypeParser::new(self).with_self_type(def.name.clone());
        for (param, arg) in def.generics.iter().zip(&ty.args) {
            parser = parser.with_binding(param.clone(), arg.clone());
        }

        def.fields
            .iter()
            .filter(|f| !f.skipped && !is_phantom(&f.ty))
            .map(|f| MemberDescriptor::new(f.name.clone(), parser.parse(&f.ty)))
            .collect()
    }
}

/// Marker fields carry no data.
fn is_phantom(ty: &syn::Type) -> bool {
    matches!(ty, syn::Type::Path(path)
        if path.path.segments.last().is_some_and(|s| s.ident == "PhantomData"))
}
