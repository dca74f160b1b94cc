// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shader graph model for `OrdoPlay`.
//!
//! A shader graph is a dataflow graph of shading operations: math
//! operators, texture samples, branches and loops, and stage inputs and
//! outputs. The graph is authored in the editor, persisted as RON, and
//! compiled to target shading languages by `ordoplay_shader_compiler`.
//!
//! ## Architecture
//!
//! - [`NodeKind`] is the closed catalog of node kinds with their configuration
//! - [`Node`] owns named input and output [`Port`]s built from its kind
//! - [`Graph`] holds nodes and single-driver [`Connection`]s
//! - [`RenderState`] and [`SamplerState`] carry fixed-function settings

pub mod connection;
pub mod graph;
pub mod kind;
pub mod node;
pub mod port;
pub mod state;
pub mod value;

pub use connection::{Connection, ConnectionId};
pub use graph::{ConnectionError, CycleError, Graph, GraphError, GraphIoError};
pub use kind::{
    switch_case_pin, BranchHint, ConditionalOperator, DataUsage, DerivativeAxis, LogBase,
    NodeCategory, NodeKind, ScriptPin,
};
pub use node::{Node, NodeId};
pub use port::{Port, PortDirection, PortId};
pub use state::{
    Address, BlendFactor, BlendOperation, ColorWriteMask, CompareFunction, CullMode, Filter,
    RenderState, SamplerState, StencilOperation,
};
pub use value::{PortValue, ValueType};
