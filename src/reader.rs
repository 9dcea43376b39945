//! Decoders for stored policy content.
//!
//! A stored record carries a content-type tag and opaque bytes; the first
//! registered reader accepting the content type decodes it into a
//! descriptor.

use std::sync::Arc;

use thiserror::Error;

use crate::descriptor::TlsPolicyDescriptor;
use crate::record::TlsPolicyRecord;

/// Media type of JSON-encoded descriptors.
pub const APPLICATION_JSON: &str = "application/json";

/// Failures while decoding stored policy content.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Content is not a valid descriptor document.
    #[error("Malformed policy content: {0}")]
    Json(#[from] serde_json::Error),

    /// Record has no content.
    #[error("Policy content is empty")]
    EmptyContent,

    /// No registered reader handles the content type.
    #[error("No reader for content type '{content_type}'")]
    UnsupportedContentType {
        /// The record's content type.
        content_type: String,
    },
}

/// Decodes policy content of the media types it accepts.
pub trait TlsPolicyReader: Send + Sync {
    /// Returns true when this reader handles `content_type`.
    fn accepts(&self, content_type: &str) -> bool;

    /// Decodes `content` into a descriptor.
    fn read(&self, content: &[u8]) -> Result<TlsPolicyDescriptor, DecodeError>;
}

/// Reads `application/json` and any `+json` structured-syntax media type.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonTlsPolicyReader;

impl TlsPolicyReader for JsonTlsPolicyReader {
    fn accepts(&self, content_type: &str) -> bool {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        essence == APPLICATION_JSON
            || (essence.starts_with("application/") && essence.ends_with("+json"))
    }

    fn read(&self, content: &[u8]) -> Result<TlsPolicyDescriptor, DecodeError> {
        if content.iter().all(u8::is_ascii_whitespace) {
            return Err(DecodeError::EmptyContent);
        }
        Ok(serde_json::from_slice(content)?)
    }
}

/// Ordered list of content readers.
#[derive(Clone, Default)]
pub struct PolicyReaders {
    readers: Vec<Arc<dyn TlsPolicyReader>>,
}

impl PolicyReaders {
    /// An empty list.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in readers (JSON).
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut readers = Self::empty();
        readers.register(Arc::new(JsonTlsPolicyReader));
        readers
    }

    /// Appends a reader; earlier registrations win.
    pub fn register(&mut self, reader: Arc<dyn TlsPolicyReader>) {
        self.readers.push(reader);
    }

    /// Finds the first reader accepting `content_type`.
    #[must_use]
    pub fn reader_for(&self, content_type: &str) -> Option<&dyn TlsPolicyReader> {
        self.readers
            .iter()
            .find(|r| r.accepts(content_type))
            .map(|r| &**r)
    }

    /// Decodes a stored record.
    pub fn decode(&self, record: &TlsPolicyRecord) -> Result<TlsPolicyDescriptor, DecodeError> {
        let reader =
            self.reader_for(&record.content_type)
                .ok_or_else(|| DecodeError::UnsupportedContentType {
                    content_type: record.content_type.clone(),
                })?;
        if record.content.is_empty() {
            return Err(DecodeError::EmptyContent);
        }
        reader.read(&record.content)
    }
}

impl std::fmt::Debug for PolicyReaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyReaders")
            .field("readers", &self.readers.len())
            .finish()
    }
}
