//! Top-level schema assembly.
//!
//! [`SchemaEmitter::emit`] runs one generation over an [`ObjectModel`]:
//!
//! 1. map the root properties into `{Model}State`
//! 2. map every command's parameters into `{Command}Request`
//! 3. drain the worklist of nested composites
//! 4. append the fixed control messages, enum and service
//!
//! Output order is deterministic for a given model and member lookup.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::classifier::{TypeClassifier, DEFAULT_DISALLOWED_NAMESPACES, DEFAULT_MESSAGE_SUFFIX};
use crate::descriptor::{CommandDescriptor, MemberLookup, ObjectModel};
use crate::encoding::FieldMapper;
use crate::error::{Diagnostic, DiagnosticKind, Diagnostics, GenerateError, GenerateResult};
use crate::naming;
use crate::registry::Registry;
use crate::schema::{
    EnumDescriptor, FieldDescriptor, FieldEncoding, MessageDescriptor, Provenance, RpcDescriptor,
    Schema, ServiceDescriptor,
};

const ANY: &str = "google.protobuf.Any";
const EMPTY: &str = "google.protobuf.Empty";

pub const UPDATE_REQUEST: &str = "UpdatePropertyValueRequest";
pub const UPDATE_RESPONSE: &str = "UpdatePropertyValueResponse";
pub const CHANGE_NOTIFICATION: &str = "PropertyChangeNotification";
pub const SUBSCRIBE_REQUEST: &str = "SubscribeRequest";
pub const CONNECTION_STATUS: &str = "ConnectionStatus";
pub const CONNECTION_STATUS_RESPONSE: &str = "ConnectionStatusResponse";

/// Settings for one emitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitterConfig {
    /// Proto package; omitted from the output when `None`.
    pub package: Option<String>,
    /// Suffix of the root and composite message names.
    pub message_suffix: String,
    /// Service name; defaults to `{Model}Service`.
    pub service_name: Option<String>,
    /// File-level options, rendered sorted by name.
    pub options: BTreeMap<String, String>,
    /// Extra namespaces whose types are never expanded.
    pub disallowed_namespaces: Vec<String>,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            package: None,
            message_suffix: DEFAULT_MESSAGE_SUFFIX.to_string(),
            service_name: None,
            options: BTreeMap::new(),
            disallowed_namespaces: DEFAULT_DISALLOWED_NAMESPACES
                .iter()
                .map(|ns| ns.to_string())
                .collect(),
        }
    }
}

impl EmitterConfig {
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn with_message_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.message_suffix = suffix.into();
        self
    }

    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    pub fn with_disallowed_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.disallowed_namespaces.push(namespace.into());
        self
    }
}

/// Result of a successful generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationOutput {
    pub schema: Schema,
    pub diagnostics: Vec<Diagnostic>,
}

impl GenerationOutput {
    /// Rendered proto3 text.
    pub fn text(&self) -> String {
        self.schema.render()
    }
}

/// Builds a [`Schema`] from an [`ObjectModel`].
#[derive(Debug, Clone, Default)]
pub struct SchemaEmitter {
    config: EmitterConfig,
}

impl SchemaEmitter {
    pub fn new(config: EmitterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    /// Generate the schema for `model`.
    ///
    /// Fails on the first unrepresentable shape; no partial schema is
    /// returned then.
    pub fn emit(
        &self,
        model: &ObjectModel,
        lookup: &dyn MemberLookup,
    ) -> GenerateResult<GenerationOutput> {
        let model_name = naming::sanitize_type_name(model.name.trim());
        if model.name.trim().is_empty() {
            return Err(GenerateError::EmptyModelName);
        }

        let _span = tracing::info_span!("emit", model = %model.name).entered();

        let classifier = TypeClassifier::new()
            .with_disallowed_namespaces(self.config.disallowed_namespaces.iter().cloned())
            .with_message_suffix(self.config.message_suffix.clone());
        let mapper = FieldMapper::new(classifier);
        let mut registry = Registry::new();
        let mut diagnostics = Diagnostics::new();

        let root_name = format!("{}{}", model_name, self.config.message_suffix);
        let root = self.root_message(model, &root_name, &mapper, &mut registry, &mut diagnostics)?;

        let mut command_messages = Vec::with_capacity(model.commands.len() * 2);
        let mut command_rpcs = Vec::with_capacity(model.commands.len());
        for command in &model.commands {
            let (request, response) =
                self.command_messages(model, command, &mapper, &mut registry, &mut diagnostics)?;
            command_rpcs.push(RpcDescriptor::unary(
                naming::command_base_name(&command.name),
                request.name.clone(),
                response.name.clone(),
            ));
            command_messages.push(request);
            command_messages.push(response);
        }

        let expanded = registry.drain(lookup, &mapper, &mut diagnostics)?;
        tracing::debug!(expanded, "worklist drained");

        let mut messages = vec![root];
        messages.extend(registry.into_messages());
        messages.extend(control_messages());
        messages.extend(command_messages);
        messages.push(
            MessageDescriptor::new(CONNECTION_STATUS_RESPONSE, Provenance::ControlMessage)
                .with_field(FieldDescriptor::new(
                    "status",
                    1,
                    FieldEncoding::singular(CONNECTION_STATUS),
                )),
        );

        report_duplicate_names(&messages, &mut diagnostics);

        let service_name = self
            .config
            .service_name
            .clone()
            .unwrap_or_else(|| format!("{}Service", model_name));
        let service = service(service_name, &root_name, command_rpcs);

        let schema = Schema::new(model.name.trim(), messages, vec![connection_status()], service)
            .with_package(self.config.package.clone())
            .with_options(self.config.options.clone());

        tracing::info!(
            messages = schema.messages.len(),
            rpcs = schema.service.rpcs.len(),
            diagnostics = diagnostics.len(),
            "schema generated"
        );

        Ok(GenerationOutput {
            schema,
            diagnostics: diagnostics.into_vec(),
        })
    }

    fn root_message(
        &self,
        model: &ObjectModel,
        root_name: &str,
        mapper: &FieldMapper,
        registry: &mut Registry,
        diagnostics: &mut Diagnostics,
    ) -> GenerateResult<MessageDescriptor> {
        let mut root = MessageDescriptor::new(root_name, Provenance::RootState);

        for (property, number) in model.properties.iter().zip(1u32..) {
            let path = format!("{}.{}", model.name, property.name);
            let encoding = mapper.map_type(&property.ty, &path, registry, diagnostics)?;
            root.fields.push(FieldDescriptor::new(
                naming::field_name(&property.name),
                number,
                encoding,
            ));
        }

        Ok(root)
    }

    fn command_messages(
        &self,
        model: &ObjectModel,
        command: &CommandDescriptor,
        mapper: &FieldMapper,
        registry: &mut Registry,
        diagnostics: &mut Diagnostics,
    ) -> GenerateResult<(MessageDescriptor, MessageDescriptor)> {
        let base = naming::command_base_name(&command.name);
        let mut request =
            MessageDescriptor::new(format!("{}Request", base), Provenance::CommandRequest);

        for (parameter, number) in command.parameters.iter().zip(1u32..) {
            let path = format!("{}.{}({})", model.name, command.name, parameter.name);
            let encoding = mapper.map_type(&parameter.ty, &path, registry, diagnostics)?;
            request.fields.push(FieldDescriptor::new(
                naming::field_name(&parameter.name),
                number,
                encoding,
            ));
        }

        let response =
            MessageDescriptor::new(format!("{}Response", base), Provenance::CommandResponse);
        Ok((request, response))
    }
}

/// The fixed messages of the property-sync protocol.
fn control_messages() -> Vec<MessageDescriptor> {
    let string = || FieldEncoding::singular("string");
    let any = || FieldEncoding::singular(ANY);

    vec![
        MessageDescriptor::new(UPDATE_REQUEST, Provenance::ControlMessage).with_fields(vec![
            FieldDescriptor::new("property_name", 1, string()),
            FieldDescriptor::new("new_value", 2, any()),
            FieldDescriptor::new("property_path", 3, string()).optional(),
            FieldDescriptor::new("collection_key", 4, string()).optional(),
            FieldDescriptor::new("array_index", 5, FieldEncoding::singular("int32")).optional(),
            FieldDescriptor::new("operation_type", 6, string()).optional(),
            FieldDescriptor::new("client_id", 7, string()).optional(),
        ]),
        MessageDescriptor::new(UPDATE_RESPONSE, Provenance::ControlMessage).with_fields(vec![
            FieldDescriptor::new("success", 1, FieldEncoding::singular("bool")),
            FieldDescriptor::new("error_message", 2, string()),
            FieldDescriptor::new("old_value", 3, any()),
        ]),
        MessageDescriptor::new(CHANGE_NOTIFICATION, Provenance::ControlMessage).with_fields(vec![
            FieldDescriptor::new("property_name", 1, string()),
            FieldDescriptor::new("new_value", 2, any()),
            FieldDescriptor::new("property_path", 3, string()).optional(),
            FieldDescriptor::new("change_type", 4, string()),
            FieldDescriptor::new("old_value", 5, any()),
        ]),
        MessageDescriptor::new(SUBSCRIBE_REQUEST, Provenance::ControlMessage)
            .with_field(FieldDescriptor::new("client_id", 1, string())),
    ]
}

fn connection_status() -> EnumDescriptor {
    EnumDescriptor::new(CONNECTION_STATUS)
        .with_value("UNKNOWN", 0)
        .with_value("CONNECTED", 1)
        .with_value("DISCONNECTED", 2)
}

fn service(name: String, root_name: &str, command_rpcs: Vec<RpcDescriptor>) -> ServiceDescriptor {
    let mut service = ServiceDescriptor::new(name)
        .with_rpc(RpcDescriptor::unary("GetState", EMPTY, root_name))
        .with_rpc(RpcDescriptor::unary(
            "UpdatePropertyValue",
            UPDATE_REQUEST,
            UPDATE_RESPONSE,
        ))
        .with_rpc(RpcDescriptor::server_streaming(
            "SubscribeToPropertyChanges",
            SUBSCRIBE_REQUEST,
            CHANGE_NOTIFICATION,
        ));

    for rpc in command_rpcs {
        service = service.with_rpc(rpc);
    }

    service.with_rpc(RpcDescriptor::unary("Ping", EMPTY, CONNECTION_STATUS_RESPONSE))
}

/// Names are kept as generated; duplicates are surfaced, not renamed.
fn report_duplicate_names(messages: &[MessageDescriptor], diagnostics: &mut Diagnostics) {
    let mut seen = HashSet::new();
    for message in messages {
        if !seen.insert(message.name.as_str()) {
            diagnostics.push(
                DiagnosticKind::NamingCollision,
                message.name.clone(),
                format!("schema.{}", message.name),
                format!("message '{}' is defined more than once", message.name),
            );
        }
    }
}
