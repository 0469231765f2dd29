/*! Error types for scenescope operations. */

use super::{NodeId, Uid, WindowId};

/// Errors that can occur while observing a scene.
///
/// None of these escape the connector's public operations: they are logged,
/// or converted into an `Exception` event on the bus.
#[derive(Debug, thiserror::Error)]
pub enum ScopeError {
  #[error("Window not found: {0}")]
  WindowNotFound(WindowId),

  #[error("Node not found: {0}")]
  NodeNotFound(NodeId),

  #[error("Element not found: {0}")]
  ElementNotFound(Uid),

  #[error("Element {0} is not a node")]
  NotANode(Uid),

  #[error("Accessor '{accessor}' is not accessible: {reason}")]
  AccessDenied { accessor: String, reason: String },

  #[error("Failed to instrument node {node}: {reason}")]
  Instrumentation { node: NodeId, reason: String },

  #[error("Geometry error: {0}")]
  Geometry(String),

  #[error("Resource '{0}' is not referenced by any live stylesheet")]
  ResourceNotReferenced(String),

  #[error("Failed to read resource '{uri}'")]
  Resource {
    uri: String,
    #[source]
    source: std::io::Error,
  },

  #[error("Operation not supported: {0}")]
  NotSupported(String),
}

impl ScopeError {
  /// Variant name, used as the class name of exception events.
  pub const fn kind(&self) -> &'static str {
    match self {
      Self::WindowNotFound(_) => "WindowNotFound",
      Self::NodeNotFound(_) => "NodeNotFound",
      Self::ElementNotFound(_) => "ElementNotFound",
      Self::NotANode(_) => "NotANode",
      Self::AccessDenied { .. } => "AccessDenied",
      Self::Instrumentation { .. } => "Instrumentation",
      Self::Geometry(_) => "Geometry",
      Self::ResourceNotReferenced(_) => "ResourceNotReferenced",
      Self::Resource { .. } => "Resource",
      Self::NotSupported(_) => "NotSupported",
    }
  }

  /// The error and each of its causes, one per line.
  pub fn trace(&self) -> String {
    let mut lines = vec![self.to_string()];
    let mut source = std::error::Error::source(self);
    while let Some(cause) = source {
      lines.push(format!("caused by: {cause}"));
      source = cause.source();
    }
    lines.join("\n")
  }
}

/// Result type for scenescope operations.
pub type ScopeResult<T> = Result<T, ScopeError>;
