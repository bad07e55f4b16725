//! Conversion of `syn::Type` into [`TypeDescriptor`].
//!
//! Wrappers that do not change what goes over the wire (references, smart
//! pointers, interior mutability) are peeled off. Generic parameters of the
//! struct being expanded are substituted with their bound arguments. Names
//! declared in the scanned sources resolve to local composites or enums when
//! reached bare, through `crate`/`self`/`super`, or through a module of the
//! scanned sources (`models::TodoItem`).

use std::collections::HashMap;

use protomodel::TypeDescriptor;
use syn::{GenericArgument, PathArguments, ReturnType, Type, TypeParamBound};

use crate::index::TypeIndex;

/// Types that only wrap their first argument.
const TRANSPARENT_WRAPPERS: &[&str] = &[
    "Box", "Arc", "Rc", "Cell", "RefCell", "Mutex", "RwLock", "Cow", "Pin",
];

/// Leading path segments that refer to the current crate.
const LOCAL_PATH_ROOTS: &[&str] = &["crate", "self", "super"];

/// Converts syntax types into descriptors against a [`TypeIndex`].
pub struct TypeParser<'a> {
    index: &'a TypeIndex,
    bindings: HashMap<String, TypeDescriptor>,
    self_type: Option<String>,
}

impl<'a> TypeParser<'a> {
    pub fn new(index: &'a TypeIndex) -> Self {
        Self {
            index,
            bindings: HashMap::new(),
            self_type: None,
        }
    }

    /// Substitute `param` with `ty` wherever it appears as a bare path.
    pub fn with_binding(mut self, param: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.bindings.insert(param.into(), ty);
        self
    }

    /// Resolve `Self` to the named type.
    pub fn with_self_type(mut self, name: impl Into<String>) -> Self {
        self.self_type = Some(name.into());
        self
    }

    // =========================================================================
    // Types
    // =========================================================================

    pub fn parse(&self, ty: &Type) -> TypeDescriptor {
        match ty {
            Type::Path(type_path) if type_path.qself.is_none() => self.parse_path(&type_path.path),
            Type::Reference(reference) => self.parse(&reference.elem),
            Type::Paren(paren) => self.parse(&paren.elem),
            Type::Group(group) => self.parse(&group.elem),
            Type::Ptr(ptr) => self.parse(&ptr.elem),
            Type::Array(array) => self.parse_array(&array.elem),
            Type::Slice(slice) => TypeDescriptor::array(self.parse(&slice.elem), 1),
            Type::Tuple(tuple) => {
                TypeDescriptor::tuple(tuple.elems.iter().map(|t| self.parse(t)).collect())
            }
            Type::ImplTrait(impl_trait) => self.parse_bounds(impl_trait.bounds.iter(), "impl"),
            Type::TraitObject(object) => self.parse_bounds(object.bounds.iter(), "dyn"),
            Type::BareFn(_) => TypeDescriptor::opaque("fn"),
            Type::Never(_) => TypeDescriptor::opaque("!"),
            _ => TypeDescriptor::opaque("_"),
        }
    }

    /// Return type of a function; `-> ()` and no return both yield unit.
    pub fn parse_return(&self, output: &ReturnType) -> TypeDescriptor {
        match output {
            ReturnType::Default => TypeDescriptor::tuple(Vec::new()),
            ReturnType::Type(_, ty) => self.parse(ty),
        }
    }

    fn parse_path(&self, path: &syn::Path) -> TypeDescriptor {
        let segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
        let Some(last) = path.segments.last() else {
            return TypeDescriptor::opaque("_");
        };
        let name = last.ident.to_string();
        let args = self.parse_generics(&last.arguments);

        if segments.len() == 1 && args.is_empty() {
            if let Some(bound) = self.bindings.get(&name) {
                return bound.clone();
            }
            if name == "Self" {
                if let Some(ref self_type) = self.self_type {
                    return TypeDescriptor::named(self_type.clone());
                }
            }
        }

        if TRANSPARENT_WRAPPERS.contains(&name.as_str()) {
            if let Some(inner) = args.into_iter().next() {
                return inner;
            }
            return TypeDescriptor::named(name);
        }

        let namespace = &segments[..segments.len() - 1];
        let is_local = namespace.first().map_or(true, |root| {
            LOCAL_PATH_ROOTS.contains(&root.as_str()) || self.index.is_module(root)
        });

        if is_local && self.index.is_enum(&name) {
            return TypeDescriptor::enumeration(name);
        }
        if is_local && self.index.contains_struct(&name) {
            return TypeDescriptor::generic(name, args);
        }

        let namespace: Vec<&str> = namespace
            .iter()
            .map(String::as_str)
            .filter(|segment| !LOCAL_PATH_ROOTS.contains(segment))
            .collect();
        TypeDescriptor::generic(name, args).with_namespace(namespace)
    }

    /// `[[T; N]; M]` is one array of rank 2, not an array of arrays.
    fn parse_array(&self, elem: &Type) -> TypeDescriptor {
        let mut rank = 1;
        let mut element = elem;
        while let Type::Array(inner) = strip_parens(element) {
            rank += 1;
            element = &inner.elem;
        }
        TypeDescriptor::array(self.parse(element), rank)
    }

    // =========================================================================
    // Generics and bounds
    // =========================================================================

    /// Type arguments only; lifetimes and const arguments carry no data.
    ///
    /// `Trait<Output = T>` contributes `T` so that future-like bounds keep
    /// their result type.
    fn parse_generics(&self, arguments: &PathArguments) -> Vec<TypeDescriptor> {
        let PathArguments::AngleBracketed(generics) = arguments else {
            return Vec::new();
        };

        generics
            .args
            .iter()
            .filter_map(|arg| match arg {
                GenericArgument::Type(ty) => Some(self.parse(ty)),
                GenericArgument::AssocType(assoc) if assoc.ident == "Output" => {
                    Some(self.parse(&assoc.ty))
                }
                _ => None,
            })
            .collect()
    }

    /// The first trait bound names the type; auto traits and lifetimes are
    /// skipped.
    fn parse_bounds<'b>(
        &self,
        bounds: impl Iterator<Item = &'b TypeParamBound>,
        keyword: &str,
    ) -> TypeDescriptor {
        for bound in bounds {
            let TypeParamBound::Trait(trait_bound) = bound else {
                continue;
            };
            let Some(last) = trait_bound.path.segments.last() else {
                continue;
            };
            let name = last.ident.to_string();
            if matches!(name.as_str(), "Send" | "Sync" | "Unpin") {
                continue;
            }
            return TypeDescriptor::generic(name, self.parse_generics(&last.arguments));
        }
        TypeDescriptor::opaque(keyword)
    }
}

fn strip_parens(ty: &Type) -> &Type {
    match ty {
        Type::Paren(paren) => strip_parens(&paren.elem),
        Type::Group(group) => strip_parens(&group.elem),
        _ => ty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::RustParser;
    use crate::scanner::SourceFile;
    use protomodel::TypeShape;

    fn index() -> TypeIndex {
        let source = r#"
            pub struct TodoItem { pub title: String }
            pub struct Page<T> { pub items: Vec<T> }
            pub enum Priority { Low, High }
        "#;
        let (index, errors) =
            RustParser::new().parse_files(&[SourceFile::in_memory("lib.rs", source)]);
        assert!(errors.is_empty());
        index
    }

    fn parse(index: &TypeIndex, source: &str) -> TypeDescriptor {
        let ty: Type = syn::parse_str(source).unwrap();
        TypeParser::new(index).parse(&ty)
    }

    #[test]
    fn test_primitive_and_generic() {
        let index = index();
        assert_eq!(parse(&index, "i32"), TypeDescriptor::named("i32"));
        assert_eq!(
            parse(&index, "Vec<String>"),
            TypeDescriptor::generic("Vec", vec![TypeDescriptor::named("String")])
        );
    }

    #[test]
    fn test_qualified_foreign_type_keeps_namespace() {
        let index = index();
        let ty = parse(&index, "std::collections::HashMap<String, i32>");
        assert_eq!(ty.name, "HashMap");
        assert_eq!(ty.namespace, vec!["std", "collections"]);
        assert_eq!(ty.args.len(), 2);

        let ty = parse(&index, "chrono::DateTime<chrono::Utc>");
        assert_eq!(ty.canonical_id(), "chrono::DateTime<chrono::Utc>");
    }

    #[test]
    fn test_local_types_resolve_through_paths() {
        let index = index();
        assert_eq!(
            parse(&index, "crate::models::TodoItem"),
            TypeDescriptor::named("TodoItem")
        );
        assert_eq!(
            parse(&index, "super::Priority"),
            TypeDescriptor::enumeration("Priority")
        );
    }

    #[test]
    fn test_module_paths_resolve_to_local_types() {
        let source = "pub mod models { pub struct TodoItem { pub title: String } }";
        let (index, _) =
            RustParser::new().parse_files(&[SourceFile::in_memory("lib.rs", source)]);

        assert_eq!(parse(&index, "models::TodoItem"), TypeDescriptor::named("TodoItem"));

        let foreign = parse(&index, "other::TodoItem");
        assert_eq!(foreign.namespace, vec!["other"]);
    }

    #[test]
    fn test_smart_pointers_and_references_unwrap() {
        let index = index();
        for source in [
            "Box<TodoItem>",
            "Arc<Mutex<TodoItem>>",
            "&'a TodoItem",
            "Rc<RefCell<TodoItem>>",
            "std::sync::Arc<TodoItem>",
        ] {
            assert_eq!(parse(&index, source), TypeDescriptor::named("TodoItem"), "{}", source);
        }

        assert_eq!(parse(&index, "Cow<'static, str>"), TypeDescriptor::named("str"));
    }

    #[test]
    fn test_arrays_and_slices() {
        let index = index();

        let bytes = parse(&index, "[u8; 16]");
        assert_eq!(bytes.shape, TypeShape::Array { rank: 1 });
        assert_eq!(bytes.args, vec![TypeDescriptor::named("u8")]);

        let grid = parse(&index, "[[i32; 3]; 3]");
        assert_eq!(grid.shape, TypeShape::Array { rank: 2 });
        assert_eq!(grid.args, vec![TypeDescriptor::named("i32")]);

        let slice = parse(&index, "&[TodoItem]");
        assert_eq!(slice.shape, TypeShape::Array { rank: 1 });
    }

    #[test]
    fn test_tuples_and_unit() {
        let index = index();
        assert!(parse(&index, "()").is_unit());
        assert_eq!(parse(&index, "(i32, String)").shape, TypeShape::Tuple);
    }

    #[test]
    fn test_future_bounds() {
        let index = index();
        let expected = TypeDescriptor::generic("Future", vec![TypeDescriptor::named("i32")]);

        assert_eq!(parse(&index, "impl Future<Output = i32> + Send"), expected);
        assert_eq!(
            parse(&index, "Pin<Box<dyn Future<Output = i32> + Send + 'static>>"),
            expected
        );
        assert_eq!(
            parse(&index, "BoxFuture<'static, i32>"),
            TypeDescriptor::generic("BoxFuture", vec![TypeDescriptor::named("i32")])
        );
    }

    #[test]
    fn test_bindings_and_self() {
        let index = index();
        let parser = TypeParser::new(&index)
            .with_binding("T", TypeDescriptor::named("TodoItem"))
            .with_self_type("TodoItem");

        let ty: Type = syn::parse_str("Vec<T>").unwrap();
        assert_eq!(
            parser.parse(&ty),
            TypeDescriptor::generic("Vec", vec![TypeDescriptor::named("TodoItem")])
        );

        let ty: Type = syn::parse_str("Option<Self>").unwrap();
        assert_eq!(
            parser.parse(&ty),
            TypeDescriptor::generic("Option", vec![TypeDescriptor::named("TodoItem")])
        );
    }

    #[test]
    fn test_opaque_shapes() {
        let index = index();
        assert_eq!(parse(&index, "fn(i32) -> i32").shape, TypeShape::Opaque);
        assert_eq!(parse(&index, "<T as Trait>::Assoc").shape, TypeShape::Opaque);
    }
}
