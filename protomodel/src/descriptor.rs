//! Input model definitions.
//!
//! These types describe the object model handed over by an introspection
//! collaborator: root properties, commands with parameters, and the type
//! descriptors that appear in them. They are plain values; nothing here
//! knows about the wire schema.

use serde::{Deserialize, Serialize};

/// Structural shape of a type descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeShape {
    /// A nominal type, possibly generic (`String`, `Vec<T>`, `Node`).
    Named,
    /// A nominal enumeration type.
    Enum,
    /// A built-in array with the given number of dimensions.
    Array { rank: usize },
    /// An anonymous tuple.
    Tuple,
    /// Something with no nominal identity (function pointers, trait objects).
    Opaque,
}

/// Description of a type as seen by the introspection collaborator.
///
/// For [`TypeShape::Array`] the single entry of `args` is the element type.
/// For [`TypeShape::Tuple`] `args` holds the tuple elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Unqualified type name (`HashMap`, `i32`, `Node`).
    pub name: String,

    /// Namespace segments, outermost first (`["std", "collections"]`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespace: Vec<String>,

    /// Generic arguments, array element or tuple elements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<TypeDescriptor>,

    pub shape: TypeShape,
}

impl TypeDescriptor {
    /// Create a non-generic named type.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Vec::new(),
            args: Vec::new(),
            shape: TypeShape::Named,
        }
    }

    /// Create a generic named type.
    pub fn generic(name: impl Into<String>, args: Vec<TypeDescriptor>) -> Self {
        Self::named(name).with_args(args)
    }

    /// Create an enumeration type.
    pub fn enumeration(name: impl Into<String>) -> Self {
        Self {
            shape: TypeShape::Enum,
            ..Self::named(name)
        }
    }

    /// Create an array of `element` with `rank` dimensions.
    pub fn array(element: TypeDescriptor, rank: usize) -> Self {
        Self {
            name: "Array".to_string(),
            namespace: Vec::new(),
            args: vec![element],
            shape: TypeShape::Array { rank },
        }
    }

    /// Create a tuple of the given elements.
    pub fn tuple(elements: Vec<TypeDescriptor>) -> Self {
        Self {
            name: "Tuple".to_string(),
            namespace: Vec::new(),
            args: elements,
            shape: TypeShape::Tuple,
        }
    }

    /// Create an opaque type with a descriptive name.
    pub fn opaque(name: impl Into<String>) -> Self {
        Self {
            shape: TypeShape::Opaque,
            ..Self::named(name)
        }
    }

    /// Set the namespace segments.
    pub fn with_namespace<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespace = segments.into_iter().map(Into::into).collect();
        self
    }

    /// Set the generic arguments.
    pub fn with_args(mut self, args: Vec<TypeDescriptor>) -> Self {
        self.args = args;
        self
    }

    /// First type argument, if any.
    pub fn first_arg(&self) -> Option<&TypeDescriptor> {
        self.args.first()
    }

    /// Whether the descriptor is the unit tuple `()`.
    pub fn is_unit(&self) -> bool {
        self.shape == TypeShape::Tuple && self.args.is_empty()
    }

    /// Whether the outermost namespace segment equals `root`.
    pub fn is_in_namespace(&self, root: &str) -> bool {
        self.namespace.first().is_some_and(|segment| segment == root)
    }

    /// Stable identity of the type.
    ///
    /// Two descriptors with the same canonical id denote the same type.
    /// Used as the nominal-id of composites and as the dictionary dedup key.
    pub fn canonical_id(&self) -> String {
        match self.shape {
            TypeShape::Named | TypeShape::Enum | TypeShape::Opaque => {
                let mut id = String::new();
                for segment in &self.namespace {
                    id.push_str(segment);
                    id.push_str("::");
                }
                id.push_str(&self.name);
                if !self.args.is_empty() {
                    let args: Vec<String> = self.args.iter().map(Self::canonical_id).collect();
                    id.push('<');
                    id.push_str(&args.join(","));
                    id.push('>');
                }
                id
            }
            TypeShape::Array { rank } => {
                let element = self
                    .first_arg()
                    .map(Self::canonical_id)
                    .unwrap_or_else(|| "?".to_string());
                format!("{}[{}]", element, ",".repeat(rank.saturating_sub(1)))
            }
            TypeShape::Tuple => {
                let elements: Vec<String> = self.args.iter().map(Self::canonical_id).collect();
                format!("({})", elements.join(","))
            }
        }
    }

    /// Human-readable name without namespace (`Page<Item>`).
    pub fn display_name(&self) -> String {
        match self.shape {
            TypeShape::Named | TypeShape::Enum | TypeShape::Opaque => {
                if self.args.is_empty() {
                    self.name.clone()
                } else {
                    let args: Vec<String> = self.args.iter().map(Self::display_name).collect();
                    format!("{}<{}>", self.name, args.join(", "))
                }
            }
            TypeShape::Array { rank } => {
                let element = self
                    .first_arg()
                    .map(Self::display_name)
                    .unwrap_or_else(|| "?".to_string());
                format!("{}[{}]", element, ",".repeat(rank.saturating_sub(1)))
            }
            TypeShape::Tuple => {
                let elements: Vec<String> = self.args.iter().map(Self::display_name).collect();
                format!("({})", elements.join(", "))
            }
        }
    }
}

/// A field-like member of a composite type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDescriptor {
    pub name: String,
    pub ty: TypeDescriptor,
}

impl MemberDescriptor {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A root property of the object model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    pub ty: TypeDescriptor,
    /// Zero-based declaration position.
    pub ordinal: usize,
}

/// A parameter of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandParameterDescriptor {
    pub name: String,
    pub ty: TypeDescriptor,
    /// Zero-based declaration position.
    pub ordinal: usize,
}

/// A command exposed by the object model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    pub name: String,
    pub is_async: bool,
    #[serde(default)]
    pub parameters: Vec<CommandParameterDescriptor>,
}

impl CommandDescriptor {
    /// Create a synchronous command without parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_async: false,
            parameters: Vec::new(),
        }
    }

    /// Mark the command as asynchronous.
    pub fn asynchronous(mut self) -> Self {
        self.is_async = true;
        self
    }

    /// Append a parameter; its ordinal is its position.
    pub fn with_parameter(mut self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        let ordinal = self.parameters.len();
        self.parameters.push(CommandParameterDescriptor {
            name: name.into(),
            ty,
            ordinal,
        });
        self
    }
}

/// The complete object model of one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObjectModel {
    /// Name of the root type (`CounterViewModel`).
    pub name: String,
    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,
    #[serde(default)]
    pub commands: Vec<CommandDescriptor>,
}

impl ObjectModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append a root property; its ordinal is its position.
    pub fn with_property(mut self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        let ordinal = self.properties.len();
        self.properties.push(PropertyDescriptor {
            name: name.into(),
            ty,
            ordinal,
        });
        self
    }

    /// Append a command.
    pub fn with_command(mut self, command: CommandDescriptor) -> Self {
        self.commands.push(command);
        self
    }
}

/// Collaborator that lists the field-like members of a composite type.
///
/// Members must come back in a stable declared order; field numbers of the
/// generated message follow that order.
pub trait MemberLookup {
    fn members(&self, ty: &TypeDescriptor) -> Vec<MemberDescriptor>;
}

impl<F> MemberLookup for F
where
    F: Fn(&TypeDescriptor) -> Vec<MemberDescriptor>,
{
    fn members(&self, ty: &TypeDescriptor) -> Vec<MemberDescriptor> {
        self(ty)
    }
}
