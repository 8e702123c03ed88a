//! Messages processed by pipelines
//!
//! A message is a bag of fields plus the set of streams it is currently
//! routed to. Rule actions mutate it in place.

use crate::error::{CoreError, Result};
use crate::types::Value;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

/// Field that accumulates evaluation errors raised while processing a message
pub const PROCESSING_ERROR_FIELD: &str = "processing_error";

/// A log message flowing through the pipeline processor
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    id: String,
    fields: HashMap<String, Value>,
    streams: BTreeSet<String>,
    filter_out: bool,
    journal_offset: Option<u64>,
}

impl Message {
    /// Create an empty message with a fresh random id
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    /// Create an empty message with the given id
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: HashMap::new(),
            streams: BTreeSet::new(),
            filter_out: false,
            journal_offset: None,
        }
    }

    /// Builder method to add a field
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Builder method to route the message to a stream
    pub fn with_stream(mut self, stream_id: impl Into<String>) -> Self {
        self.streams.insert(stream_id.into());
        self
    }

    /// Builder method to attach the journal offset the message was read from
    pub fn with_journal_offset(mut self, offset: u64) -> Self {
        self.journal_offset = Some(offset);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    /// Set a field named by rule input, rejecting blank names
    pub fn try_set_field(&mut self, name: impl Into<String>, value: Value) -> Result<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::InvalidFieldName(name));
        }
        self.fields.insert(name, value);
        Ok(())
    }

    pub fn remove_field(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    pub fn streams(&self) -> &BTreeSet<String> {
        &self.streams
    }

    /// Route the message to a stream. Returns false if it was already there.
    pub fn add_stream(&mut self, stream_id: impl Into<String>) -> bool {
        self.streams.insert(stream_id.into())
    }

    /// Route the message to a stream named by rule input, rejecting blank ids
    pub fn try_add_stream(&mut self, stream_id: impl Into<String>) -> Result<bool> {
        let stream_id = stream_id.into();
        if stream_id.trim().is_empty() {
            return Err(CoreError::InvalidStreamId(stream_id));
        }
        Ok(self.streams.insert(stream_id))
    }

    pub fn remove_stream(&mut self, stream_id: &str) -> bool {
        self.streams.remove(stream_id)
    }

    pub fn filter_out(&self) -> bool {
        self.filter_out
    }

    pub fn set_filter_out(&mut self, filter_out: bool) {
        self.filter_out = filter_out;
    }

    pub fn journal_offset(&self) -> Option<u64> {
        self.journal_offset
    }

    /// Record a processing error on the message. Errors accumulate as a
    /// comma-separated list in [`PROCESSING_ERROR_FIELD`].
    pub fn append_processing_error(&mut self, error: impl AsRef<str>) {
        let error = error.as_ref();
        let combined = match self.fields.get(PROCESSING_ERROR_FIELD) {
            Some(Value::String(existing)) => format!("{},{}", existing, error),
            _ => error.to_string(),
        };
        self.fields
            .insert(PROCESSING_ERROR_FIELD.to_string(), Value::String(combined));
    }

    /// The accumulated processing errors, if any
    pub fn processing_error(&self) -> Option<&str> {
        self.fields.get(PROCESSING_ERROR_FIELD).and_then(Value::as_str)
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::new()
    }
}
