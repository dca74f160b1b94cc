// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-stage output buffers and the scoped variable cache.

use crate::code::CodeBuffer;
use crate::variable::Variable;
use ordoplay_shader_graph::{PortId, ValueType};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShaderStage {
    /// Per-vertex stage
    Vertex,
    /// Per-pixel (fragment) stage
    Pixel,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::Pixel => "pixel",
        })
    }
}

/// Logical section of a stage's source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    /// Uniform and texture declarations
    Uniform,
    /// Sampler declarations
    Sampler,
    /// Stage input declarations
    Input,
    /// Stage output declarations
    Output,
    /// Subroutine definitions
    Script,
}

/// Output of one stage while it is being emitted.
///
/// The body is a stack so branch and loop emitters can redirect writes into
/// a fresh buffer and take the captured text back. Variables live in a flat
/// list with scope marks; popping a scope drops everything bound after the
/// matching push.
#[derive(Debug)]
pub struct StageShader {
    stage: ShaderStage,
    uniforms: CodeBuffer,
    samplers: CodeBuffer,
    inputs: CodeBuffer,
    outputs: CodeBuffer,
    scripts: CodeBuffer,
    body: Vec<CodeBuffer>,
    variables: Vec<(PortId, Variable)>,
    scopes: Vec<usize>,
    outer: Vec<(PortId, Variable)>,
    declared: HashSet<String>,
    attributes: HashMap<String, Variable>,
    script_signatures: HashMap<String, String>,
}

impl StageShader {
    /// Create an empty stage
    pub fn new(stage: ShaderStage) -> Self {
        Self {
            stage,
            uniforms: CodeBuffer::new(),
            samplers: CodeBuffer::new(),
            inputs: CodeBuffer::new(),
            outputs: CodeBuffer::new(),
            scripts: CodeBuffer::new(),
            body: vec![CodeBuffer::new()],
            variables: Vec::new(),
            scopes: Vec::new(),
            outer: Vec::new(),
            declared: HashSet::new(),
            attributes: HashMap::new(),
            script_signatures: HashMap::new(),
        }
    }

    /// Stage this shader belongs to
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Declaration block
    pub fn block(&mut self, block: Block) -> &mut CodeBuffer {
        match block {
            Block::Uniform => &mut self.uniforms,
            Block::Sampler => &mut self.samplers,
            Block::Input => &mut self.inputs,
            Block::Output => &mut self.outputs,
            Block::Script => &mut self.scripts,
        }
    }

    /// Read-only declaration block
    pub fn block_text(&self, block: Block) -> &str {
        match block {
            Block::Uniform => self.uniforms.as_str(),
            Block::Sampler => self.samplers.as_str(),
            Block::Input => self.inputs.as_str(),
            Block::Output => self.outputs.as_str(),
            Block::Script => self.scripts.as_str(),
        }
    }

    /// Active body buffer
    pub fn body(&mut self) -> &mut CodeBuffer {
        if self.body.is_empty() {
            self.body.push(CodeBuffer::new());
        }
        let last = self.body.len() - 1;
        &mut self.body[last]
    }

    /// Redirect body writes into a fresh buffer
    pub fn push_body(&mut self) {
        self.body.push(CodeBuffer::new());
    }

    /// Stop redirecting and return the captured text
    pub fn pop_body(&mut self) -> String {
        if self.body.len() > 1 {
            self.body.pop().map(CodeBuffer::into_string).unwrap_or_default()
        } else {
            String::new()
        }
    }

    /// Text of the outermost body
    pub fn main_body(&self) -> &str {
        self.body.first().map(CodeBuffer::as_str).unwrap_or_default()
    }

    /// Open a variable scope
    pub fn push_scope(&mut self) {
        self.scopes.push(self.variables.len());
    }

    /// Drop every variable bound since the matching push
    pub fn pop_scope(&mut self) {
        if let Some(mark) = self.scopes.pop() {
            self.variables.truncate(mark);
        }
    }

    /// Current scope depth
    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    /// Bind `port` in the current scope
    pub fn bind(&mut self, port: PortId, variable: Variable) {
        self.variables.push((port, variable));
    }

    /// Bind `port` outside of the scope chain; never popped
    pub fn bind_outer(&mut self, port: PortId, variable: Variable) {
        self.outer.push((port, variable));
    }

    /// Variable bound to `port`, innermost scope first
    pub fn variable(&self, port: PortId) -> Option<&Variable> {
        self.variables
            .iter()
            .rev()
            .chain(self.outer.iter())
            .find(|(p, _)| *p == port)
            .map(|(_, v)| v)
    }

    /// Change the type of the innermost binding of `port`
    pub fn set_variable_type(&mut self, port: PortId, ty: ValueType) {
        if let Some((_, v)) = self.variables.iter_mut().rev().find(|(p, _)| *p == port) {
            v.ty = ty;
        }
    }

    /// Record a declaration name; returns `false` if already declared
    pub fn declare(&mut self, name: &str) -> bool {
        self.declared.insert(name.to_string())
    }

    /// Vertex attribute already read under `name`
    pub fn attribute(&self, name: &str) -> Option<&Variable> {
        self.attributes.get(name)
    }

    /// Remember the variable a vertex attribute was read into
    pub fn add_attribute(&mut self, name: &str, variable: Variable) {
        self.attributes.insert(name.to_string(), variable);
    }

    /// Signature recorded for a subroutine
    pub fn script_signature(&self, name: &str) -> Option<&str> {
        self.script_signatures.get(name).map(String::as_str)
    }

    /// Record a subroutine as defined
    pub fn define_script(&mut self, name: &str, signature: String) {
        self.script_signatures.insert(name.to_string(), signature);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_shadowing() {
        let mut shader = StageShader::new(ShaderStage::Pixel);
        let a = PortId::new();
        let b = PortId::new();
        shader.bind(a, Variable::new("v0", ValueType::Scalar));

        shader.push_scope();
        shader.bind(b, Variable::new("v1", ValueType::Vec2));
        shader.bind(a, Variable::new("v2", ValueType::Scalar));
        assert_eq!(shader.variable(a).unwrap().name, "v2");
        assert_eq!(shader.variable(b).unwrap().name, "v1");
        shader.pop_scope();

        assert_eq!(shader.variable(a).unwrap().name, "v0");
        assert!(shader.variable(b).is_none());
    }

    #[test]
    fn test_outer_variables_survive_scopes() {
        let mut shader = StageShader::new(ShaderStage::Pixel);
        let a = PortId::new();
        shader.push_scope();
        shader.bind_outer(a, Variable::new("Attr0", ValueType::Vec3));
        shader.pop_scope();
        assert_eq!(shader.variable(a).unwrap().name, "Attr0");
    }

    #[test]
    fn test_body_capture() {
        let mut shader = StageShader::new(ShaderStage::Vertex);
        shader.body().line("float v0 = 1.0;");
        shader.push_body();
        shader.body().line("float v1 = 2.0;");
        let captured = shader.pop_body();
        assert_eq!(captured, "float v1 = 2.0;\n");
        assert_eq!(shader.main_body(), "float v0 = 1.0;\n");
    }

    #[test]
    fn test_declare_once() {
        let mut shader = StageShader::new(ShaderStage::Vertex);
        assert!(shader.declare("Color"));
        assert!(!shader.declare("Color"));
    }
}
