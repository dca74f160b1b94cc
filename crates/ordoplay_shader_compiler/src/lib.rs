// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shader graph compiler for `OrdoPlay`.
//!
//! Translates an [`ordoplay_shader_graph::Graph`] into vertex and pixel
//! shader source for GLSL, GLSL ES or HLSL, together with the reflection
//! data a renderer needs to bind the program.
//!
//! ## Architecture
//!
//! - [`ShaderCompiler`] validates the graph and drives a compile
//! - [`EmitContext`] owns all mutable state of one compile: both stage
//!   shaders, the stage cursor, the scoped variable cache and the
//!   declaration registries
//! - Emission is demand driven: starting from the output nodes, each input
//!   is pulled from its producer, which is emitted at most once per scope
//! - [`Dialect`] is the backend capability table; emitters read syntax from
//!   it and never branch on the backend
//! - [`ProgramArtifact`] is the result: source per stage, uniforms,
//!   samplers, interpolator count, render state and capability requirements
//!
//! ## Example
//!
//! ```no_run
//! use ordoplay_shader_compiler::{Backend, CompilerSettings, ShaderCompiler};
//! use ordoplay_shader_graph::Graph;
//!
//! let graph = Graph::from_ron(&std::fs::read_to_string("unlit.ron").unwrap()).unwrap();
//! let compiler = ShaderCompiler::new(CompilerSettings::for_backend(Backend::Hlsl));
//! let artifact = compiler.compile(&graph).unwrap();
//! println!("{}", artifact.pixel_source);
//! ```

pub mod artifact;
mod assemble;
pub mod code;
pub mod compiler;
pub mod context;
pub mod dialect;
mod driver;
mod emit;
pub mod error;
pub mod settings;
pub mod shader;
pub mod types;
pub mod variable;

pub use artifact::{ProgramArtifact, Requirements, SamplerDecl, UniformDecl};
pub use code::CodeBuffer;
pub use compiler::ShaderCompiler;
pub use context::EmitContext;
pub use dialect::{Backend, Dialect, UnknownBackend};
pub use driver::OutputRef;
pub use error::{CompileError, NodeIdent, Result};
pub use settings::{CompilerSettings, Precision, SettingsError};
pub use shader::{Block, ShaderStage, StageShader};
pub use types::{common_type, common_type_of, TypeError};
pub use variable::Variable;
