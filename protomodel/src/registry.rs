//! Worklist of composite types and the messages produced from them.
//!
//! The registry enforces the central termination property of generation:
//! every composite is expanded at most once, no matter how many properties
//! reference it or whether it references itself.

use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use crate::descriptor::{MemberLookup, TypeDescriptor};
use crate::encoding::FieldMapper;
use crate::error::{Diagnostics, GenerateResult};
use crate::schema::{MessageDescriptor, Provenance};

/// Canonical identity of a composite type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NominalId(String);

impl NominalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NominalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A composite waiting to be expanded into a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMessage {
    pub id: NominalId,
    pub descriptor: TypeDescriptor,
    pub message_name: String,
}

/// Result of claiming a synthesized message name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameClaim {
    /// The name was free and is now owned by the caller's identity.
    Claimed,
    /// The name already belongs to a different structural identity.
    Taken { owner: String },
}

/// Processed set, FIFO queue and emitted messages of one generation run.
#[derive(Debug, Default)]
pub struct Registry {
    /// Ids that have been enqueued; membership is checked before enqueue.
    processed: HashSet<NominalId>,
    queue: VecDeque<PendingMessage>,
    /// Messages in emission order.
    messages: Vec<MessageDescriptor>,
    /// Structural identity to synthesized message name.
    synthesized: HashMap<String, String>,
    /// Synthesized message name to the identity that first claimed it.
    owners: HashMap<String, String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a composite for expansion.
    ///
    /// Returns `false` when the id was already seen; nothing changes then.
    pub fn enqueue(
        &mut self,
        id: NominalId,
        descriptor: TypeDescriptor,
        message_name: impl Into<String>,
    ) -> bool {
        if self.processed.contains(&id) {
            return false;
        }

        let message_name = message_name.into();
        tracing::trace!(id = %id, name = %message_name, "enqueued composite");

        self.processed.insert(id.clone());
        self.queue.push_back(PendingMessage {
            id,
            descriptor,
            message_name,
        });
        true
    }

    pub fn is_processed(&self, id: &NominalId) -> bool {
        self.processed.contains(id)
    }

    /// Number of composites waiting in the queue.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn pop(&mut self) -> Option<PendingMessage> {
        self.queue.pop_front()
    }

    /// Append a finished message.
    pub fn emit(&mut self, message: MessageDescriptor) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[MessageDescriptor] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<MessageDescriptor> {
        self.messages
    }

    /// Name already synthesized for a structural identity.
    pub fn synthesized_name(&self, identity: &str) -> Option<&str> {
        self.synthesized.get(identity).map(String::as_str)
    }

    /// Bind `identity` to `name`.
    ///
    /// The identity is always bound, so later lookups resolve to `name`
    /// even when the name turned out to be owned by another identity.
    pub fn claim_name(&mut self, identity: &str, name: &str) -> NameClaim {
        self.synthesized
            .insert(identity.to_string(), name.to_string());

        match self.owners.get(name) {
            Some(owner) if owner != identity => NameClaim::Taken {
                owner: owner.clone(),
            },
            Some(_) => NameClaim::Claimed,
            None => {
                self.owners.insert(name.to_string(), identity.to_string());
                NameClaim::Claimed
            }
        }
    }

    /// Expand every queued composite until the queue is empty.
    ///
    /// Expanding a composite can enqueue further composites; they are
    /// processed in FIFO order. Returns the number of composites expanded.
    pub fn drain(
        &mut self,
        lookup: &dyn MemberLookup,
        mapper: &FieldMapper,
        diagnostics: &mut Diagnostics,
    ) -> GenerateResult<usize> {
        let mut expanded = 0;

        while let Some(pending) = self.pop() {
            let members = lookup.members(&pending.descriptor);
            tracing::debug!(
                id = %pending.id,
                members = members.len(),
                "expanding composite"
            );

            let owner = pending.descriptor.display_name();
            let fields = mapper.map_members(&owner, &members, self, diagnostics)?;
            self.emit(
                MessageDescriptor::new(pending.message_name, Provenance::NestedComposite)
                    .with_fields(fields),
            );
            expanded += 1;
        }

        Ok(expanded)
    }
}
