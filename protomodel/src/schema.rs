//! Generated schema model and its text rendering.
//!
//! A [`Schema`] is an ordered list of messages, enums and one service. The
//! emitter builds it; [`Schema::render`] turns it into proto3 source.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

const INDENT: &str = "  ";

/// How a field is laid out on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "label", rename_all = "snake_case")]
pub enum FieldEncoding {
    Singular { type_name: String },
    Repeated { type_name: String },
    Map { key: String, value: String },
}

impl FieldEncoding {
    pub fn singular(type_name: impl Into<String>) -> Self {
        Self::Singular {
            type_name: type_name.into(),
        }
    }

    pub fn repeated(type_name: impl Into<String>) -> Self {
        Self::Repeated {
            type_name: type_name.into(),
        }
    }

    pub fn map(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Map {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Every type name this encoding refers to.
    pub fn type_names(&self) -> Vec<&str> {
        match self {
            Self::Singular { type_name } | Self::Repeated { type_name } => vec![type_name.as_str()],
            Self::Map { key, value } => vec![key.as_str(), value.as_str()],
        }
    }
}

impl fmt::Display for FieldEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Singular { type_name } => write!(f, "{}", type_name),
            Self::Repeated { type_name } => write!(f, "repeated {}", type_name),
            Self::Map { key, value } => write!(f, "map<{}, {}>", key, value),
        }
    }
}

/// One numbered field of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub number: u32,
    pub encoding: FieldEncoding,
    /// Rendered with the `optional` keyword.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, number: u32, encoding: FieldEncoding) -> Self {
        Self {
            name: name.into(),
            number,
            encoding,
            optional: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional {
            write!(f, "optional ")?;
        }
        write!(f, "{} {} = {};", self.encoding, self.name, self.number)
    }
}

/// Where a message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    RootState,
    NestedComposite,
    SynthesizedEntry,
    ControlMessage,
    CommandRequest,
    CommandResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
    pub provenance: Provenance,
}

impl MessageDescriptor {
    pub fn new(name: impl Into<String>, provenance: Provenance) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            provenance,
        }
    }

    pub fn with_fields(mut self, fields: Vec<FieldDescriptor>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn render(&self, out: &mut String) {
        if self.fields.is_empty() {
            out.push_str(&format!("message {} {{}}\n", self.name));
            return;
        }

        out.push_str(&format!("message {} {{\n", self.name));
        for field in &self.fields {
            out.push_str(&format!("{}{}\n", INDENT, field));
        }
        out.push_str("}\n");
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumValue {
    pub name: String,
    pub number: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumDescriptor {
    pub name: String,
    pub values: Vec<EnumValue>,
}

impl EnumDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    pub fn with_value(mut self, name: impl Into<String>, number: i32) -> Self {
        self.values.push(EnumValue {
            name: name.into(),
            number,
        });
        self
    }

    fn render(&self, out: &mut String) {
        out.push_str(&format!("enum {} {{\n", self.name));
        for value in &self.values {
            out.push_str(&format!("{}{} = {};\n", INDENT, value.name, value.number));
        }
        out.push_str("}\n");
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RpcDescriptor {
    pub name: String,
    pub request: String,
    pub response: String,
    /// The response is a server stream.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub server_streaming: bool,
}

impl RpcDescriptor {
    pub fn unary(
        name: impl Into<String>,
        request: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            request: request.into(),
            response: response.into(),
            server_streaming: false,
        }
    }

    pub fn server_streaming(
        name: impl Into<String>,
        request: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Self {
            server_streaming: true,
            ..Self::unary(name, request, response)
        }
    }
}

impl fmt::Display for RpcDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stream = if self.server_streaming { "stream " } else { "" };
        write!(
            f,
            "rpc {}({}) returns ({}{});",
            self.name, self.request, stream, self.response
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDescriptor {
    pub name: String,
    pub rpcs: Vec<RpcDescriptor>,
}

impl ServiceDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rpcs: Vec::new(),
        }
    }

    pub fn with_rpc(mut self, rpc: RpcDescriptor) -> Self {
        self.rpcs.push(rpc);
        self
    }

    /// Look up an RPC by name.
    pub fn rpc(&self, name: &str) -> Option<&RpcDescriptor> {
        self.rpcs.iter().find(|r| r.name == name)
    }

    fn render(&self, out: &mut String) {
        out.push_str(&format!("service {} {{\n", self.name));
        for rpc in &self.rpcs {
            out.push_str(&format!("{}{}\n", INDENT, rpc));
        }
        out.push_str("}\n");
    }
}

/// Optional well-known imports, derived from the types the schema uses.
///
/// `any.proto` and `empty.proto` are always imported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportFlags {
    pub timestamp: bool,
    pub duration: bool,
    pub wrappers: bool,
}

impl ImportFlags {
    /// Scan every field type of `messages`.
    pub fn scan(messages: &[MessageDescriptor]) -> Self {
        let mut flags = Self::default();
        let type_names = messages
            .iter()
            .flat_map(|m| m.fields.iter())
            .flat_map(|f| f.encoding.type_names());

        for type_name in type_names {
            match type_name {
                "google.protobuf.Timestamp" => flags.timestamp = true,
                "google.protobuf.Duration" => flags.duration = true,
                name if name.starts_with("google.protobuf.") && name.ends_with("Value") => {
                    flags.wrappers = true
                }
                _ => {}
            }
        }

        flags
    }

    /// Import paths in render order.
    pub fn paths(&self) -> Vec<&'static str> {
        let mut paths = vec!["google/protobuf/any.proto", "google/protobuf/empty.proto"];
        if self.timestamp {
            paths.push("google/protobuf/timestamp.proto");
        }
        if self.duration {
            paths.push("google/protobuf/duration.proto");
        }
        if self.wrappers {
            paths.push("google/protobuf/wrappers.proto");
        }
        paths
    }
}

/// A complete generated schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    /// Name of the object model the schema was generated from.
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
    pub imports: ImportFlags,
    pub messages: Vec<MessageDescriptor>,
    pub enums: Vec<EnumDescriptor>,
    pub service: ServiceDescriptor,
}

impl Schema {
    /// Assemble a schema; imports are derived from the messages.
    pub fn new(
        source: impl Into<String>,
        messages: Vec<MessageDescriptor>,
        enums: Vec<EnumDescriptor>,
        service: ServiceDescriptor,
    ) -> Self {
        let imports = ImportFlags::scan(&messages);
        Self {
            source: source.into(),
            package: None,
            options: BTreeMap::new(),
            imports,
            messages,
            enums,
            service,
        }
    }

    pub fn with_package(mut self, package: Option<String>) -> Self {
        self.package = package;
        self
    }

    pub fn with_options(mut self, options: BTreeMap<String, String>) -> Self {
        self.options = options;
        self
    }

    /// Look up a message by name.
    pub fn message(&self, name: &str) -> Option<&MessageDescriptor> {
        self.messages.iter().find(|m| m.name == name)
    }

    /// Render proto3 source text.
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("// Code generated by protomodel. DO NOT EDIT.\n");
        out.push_str(&format!("// Source: {}\n", self.source));
        out.push('\n');
        out.push_str("syntax = \"proto3\";\n");

        if let Some(package) = &self.package {
            out.push('\n');
            out.push_str(&format!("package {};\n", package));
        }

        if !self.options.is_empty() {
            out.push('\n');
            for (name, value) in &self.options {
                out.push_str(&format!("option {} = {};\n", name, option_literal(value)));
            }
        }

        out.push('\n');
        for path in self.imports.paths() {
            out.push_str(&format!("import \"{}\";\n", path));
        }

        for message in &self.messages {
            out.push('\n');
            message.render(&mut out);
        }

        for descriptor in &self.enums {
            out.push('\n');
            descriptor.render(&mut out);
        }

        out.push('\n');
        self.service.render(&mut out);

        out
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Booleans, numbers and upper-case constants stay bare; everything else is
/// a quoted string.
fn option_literal(value: &str) -> String {
    let is_bare = value == "true"
        || value == "false"
        || value.parse::<f64>().is_ok()
        || (!value.is_empty()
            && value
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'));

    if is_bare {
        value.to_string()
    } else {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    }
}
