// SPDX-License-Identifier: MIT OR Apache-2.0
//! Compile errors.

use crate::dialect::Backend;
use crate::shader::ShaderStage;
use ordoplay_shader_graph::{Node, NodeId, ValueType};
use std::fmt;
use thiserror::Error;

/// Identity of a node, carried by node-scoped errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdent {
    /// Node instance ID
    pub id: NodeId,
    /// Kind tag
    pub kind: String,
    /// Instance display name
    pub name: String,
}

impl NodeIdent {
    /// Identity of `node`
    pub fn of(node: &Node) -> Self {
        Self {
            id: node.id,
            kind: node.type_name().to_string(),
            name: node.name.clone(),
        }
    }
}

impl fmt::Display for NodeIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name == self.kind {
            write!(f, "{} ({})", self.kind, self.id.0)
        } else {
            write!(f, "{} '{}' ({})", self.kind, self.name, self.id.0)
        }
    }
}

/// Error produced by a compile. A failed compile yields no artifact.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Required input pin is unconnected and has no default
    #[error("{node}: input '{pin}' is not connected")]
    MissingInput {
        /// Offending node
        node: NodeIdent,
        /// Input pin name
        pin: String,
    },

    /// Operand types cannot be combined or converted
    #[error("{node}: type mismatch, {reason}")]
    TypeMismatch {
        /// Offending node
        node: NodeIdent,
        /// What could not be combined
        reason: String,
    },

    /// Node kind has no emitter in this compiler
    #[error("{node}: unknown node kind")]
    UnknownNodeKind {
        /// Offending node
        node: NodeIdent,
    },

    /// Node is not available in the stage being emitted
    #[error("{node}: not available in the {stage} stage")]
    StageViolation {
        /// Offending node
        node: NodeIdent,
        /// Stage the cursor was in
        stage: ShaderStage,
    },

    /// Target backend cannot express the node or feature
    #[error("{node}: {feature} is not supported by {backend}")]
    Unsupported {
        /// Offending node
        node: NodeIdent,
        /// Target backend
        backend: Backend,
        /// Missing feature
        feature: String,
    },

    /// Producer did not bind the requested output pin
    #[error("{node}: output '{pin}' was not produced")]
    MissingOutput {
        /// Producing node
        node: NodeIdent,
        /// Output pin name
        pin: String,
    },

    /// Dependency cycle that is not routed through a loop node
    #[error("{node}: dependency cycle")]
    Cycle {
        /// A node on the cycle
        node: NodeIdent,
    },

    /// Graph is structurally broken
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// Graph has no pixel output node
    #[error("graph has no PixelOutput node")]
    MissingTerminal,
}

impl CompileError {
    pub(crate) fn type_mismatch(node: &Node, reason: impl Into<String>) -> Self {
        Self::TypeMismatch {
            node: NodeIdent::of(node),
            reason: reason.into(),
        }
    }

    pub(crate) fn expected(node: &Node, pin: &str, expected: &str, found: ValueType) -> Self {
        Self::type_mismatch(node, format!("'{pin}' must be {expected}, found {found}"))
    }

    pub(crate) fn unsupported(node: &Node, backend: Backend, feature: impl Into<String>) -> Self {
        Self::Unsupported {
            node: NodeIdent::of(node),
            backend,
            feature: feature.into(),
        }
    }

    /// Node the error is attributed to, if any
    pub fn node(&self) -> Option<&NodeIdent> {
        match self {
            Self::MissingInput { node, .. }
            | Self::TypeMismatch { node, .. }
            | Self::UnknownNodeKind { node }
            | Self::StageViolation { node, .. }
            | Self::Unsupported { node, .. }
            | Self::MissingOutput { node, .. }
            | Self::Cycle { node } => Some(node),
            Self::InvalidGraph(_) | Self::MissingTerminal => None,
        }
    }
}

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, CompileError>;
