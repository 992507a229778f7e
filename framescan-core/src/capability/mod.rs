// ============================================================================
// framescan-core/src/capability/mod.rs
// ============================================================================
//
// ANALYSIS CAPABILITY: Abstraction Over the Vision Model
//
// The pipeline asks an external vision model one question per unique frame:
// "given this image and this instruction, what do you see?". This module
// defines the seam for that call so the worker pool never depends on a
// particular model server.
//
// KEY COMPONENTS:
// - AnalysisCapability: Trait implemented by model clients
// - Classification: Typed response carrying the model's text
// - CapabilityError: Per-call failure, classified as transient or permanent
// - OllamaClient: Implementation backed by an Ollama server's chat API
//
// AI-ASSISTANT-INFO: Analysis capability abstraction and model clients

// ---- External crate imports ----
use thiserror::Error;

// ============================================================================
// SUBMODULES
// ============================================================================

/// Ollama chat API client
pub mod ollama;

pub use ollama::OllamaClient;

// ============================================================================
// TYPES
// ============================================================================

/// The capability's answer for one frame.
///
/// Only the classification text is kept; how the model server wraps it on
/// the wire is the client's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub text: String,
}

impl Classification {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Failure of a single capability call.
#[derive(Error, Debug)]
pub enum CapabilityError {
    /// The request never produced an HTTP response (connect, timeout, I/O).
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response could not be decoded into a classification.
    #[error("invalid response: {0}")]
    Decode(String),

    /// Any other failure reported by a capability implementation.
    #[error("{0}")]
    Other(String),
}

impl CapabilityError {
    /// Whether retrying the same call may succeed: transport failures, rate
    /// limiting (429) and server-side errors (5xx).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            CapabilityError::Transport(_) => true,
            CapabilityError::Status { status, .. } => *status == 429 || *status >= 500,
            CapabilityError::Decode(_) | CapabilityError::Other(_) => false,
        }
    }
}

// ============================================================================
// CAPABILITY TRAIT
// ============================================================================

/// A blocking, possibly slow, possibly failing image classifier.
///
/// Implementations are shared between worker threads, so they must be
/// `Send + Sync`. Each call is independent; the pool never calls `infer`
/// twice for the same frame unless a retry policy asks for it.
pub trait AnalysisCapability: Send + Sync {
    /// Classifies `content` (the raw bytes of an image file) according to
    /// `instruction`.
    fn infer(&self, content: &[u8], instruction: &str) -> Result<Classification, CapabilityError>;
}

impl<T: AnalysisCapability + ?Sized> AnalysisCapability for std::sync::Arc<T> {
    fn infer(&self, content: &[u8], instruction: &str) -> Result<Classification, CapabilityError> {
        (**self).infer(content, instruction)
    }
}
