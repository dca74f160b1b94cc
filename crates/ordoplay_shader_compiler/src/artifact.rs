// SPDX-License-Identifier: MIT OR Apache-2.0
//! Compiled program handed to a graphics backend.

use crate::dialect::Backend;
use crate::shader::ShaderStage;
use ordoplay_shader_graph::{RenderState, SamplerState, ValueType};
use serde::{Deserialize, Serialize};

/// Declared uniform (or texture) parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniformDecl {
    /// Parameter name
    pub name: String,
    /// Declared type
    pub ty: ValueType,
    /// Array length of indexed uniforms
    pub length: Option<u32>,
    /// Stages that read the uniform
    pub stages: Vec<ShaderStage>,
}

/// Declared sampler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerDecl {
    /// Sampler identifier in the emitted source
    pub name: String,
    /// Texture parameter it samples
    pub texture: String,
    /// Texture type
    pub texture_type: ValueType,
    /// Filter, address and compare configuration
    pub state: SamplerState,
    /// Stages that sample through it
    pub stages: Vec<ShaderStage>,
}

/// Built-in features the program relies on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirements {
    /// Screen-space derivatives
    pub derivatives: bool,
    /// Matrix transpose
    pub transpose: bool,
    /// Front face flag
    pub front_face: bool,
    /// Fragment position
    pub fragment_position: bool,
    /// Instance index
    pub instance_id: bool,
    /// Render target size uniform
    pub target_size: bool,
}

/// Output of a successful compile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramArtifact {
    /// Target language
    pub backend: Backend,
    /// Vertex stage source
    pub vertex_source: String,
    /// Pixel stage source
    pub pixel_source: String,
    /// Uniform table in first-use order
    pub uniforms: Vec<UniformDecl>,
    /// Sampler table in first-use order
    pub samplers: Vec<SamplerDecl>,
    /// Number of interpolator slots
    pub interpolator_count: u32,
    /// Fixed-function state from the pixel output node
    pub render_state: RenderState,
    /// Built-in features used
    pub requirements: Requirements,
}

impl ProgramArtifact {
    /// Uniform by name
    pub fn uniform(&self, name: &str) -> Option<&UniformDecl> {
        self.uniforms.iter().find(|u| u.name == name)
    }

    /// Sampler by name
    pub fn sampler(&self, name: &str) -> Option<&SamplerDecl> {
        self.samplers.iter().find(|s| s.name == name)
    }

    /// Source of a stage
    pub fn source(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex => &self.vertex_source,
            ShaderStage::Pixel => &self.pixel_source,
        }
    }
}
