// SPDX-License-Identifier: MIT OR Apache-2.0
//! Emission context: all mutable state of one compile.

use crate::artifact::{Requirements, SamplerDecl, UniformDecl};
use crate::code::CodeBuffer;
use crate::dialect::{Backend, Dialect};
use crate::error::{CompileError, NodeIdent, Result};
use crate::settings::CompilerSettings;
use crate::shader::{Block, ShaderStage, StageShader};
use crate::types::common_type_of;
use crate::variable::Variable;
use indexmap::IndexMap;
use ordoplay_shader_graph::{
    BranchHint, Graph, Node, NodeId, PortId, RenderState, SamplerState, ValueType,
};
use std::collections::HashSet;

/// Mutable state of a single compile.
///
/// Owns both stage shaders, the stage cursor, the declaration registries
/// and the interpolator allocator. Nothing here is shared between compiles.
pub struct EmitContext<'g> {
    pub(crate) graph: &'g Graph,
    pub(crate) dialect: &'static Dialect,
    pub(crate) settings: &'g CompilerSettings,
    stage: ShaderStage,
    pub(crate) vertex: StageShader,
    pub(crate) pixel: StageShader,
    next_variable: u32,
    pub(crate) uniforms: IndexMap<String, UniformDecl>,
    pub(crate) samplers: IndexMap<String, SamplerDecl>,
    pub(crate) interpolators: u32,
    pub(crate) render_state: Option<RenderState>,
    pub(crate) requirements: Requirements,
    pub(crate) in_progress: HashSet<NodeId>,
}

impl<'g> EmitContext<'g> {
    /// Create a context for compiling `graph`
    pub fn new(graph: &'g Graph, settings: &'g CompilerSettings) -> Self {
        Self {
            graph,
            dialect: settings.backend.dialect(),
            settings,
            stage: ShaderStage::Pixel,
            vertex: StageShader::new(ShaderStage::Vertex),
            pixel: StageShader::new(ShaderStage::Pixel),
            next_variable: 0,
            uniforms: IndexMap::new(),
            samplers: IndexMap::new(),
            interpolators: 0,
            render_state: None,
            requirements: Requirements::default(),
            in_progress: HashSet::new(),
        }
    }

    /// Target backend
    pub fn backend(&self) -> Backend {
        self.dialect.backend
    }

    /// Stage the cursor is in
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Whether emitting for the vertex stage
    pub fn in_vertex(&self) -> bool {
        self.stage == ShaderStage::Vertex
    }

    /// Whether emitting for the pixel stage
    pub fn in_pixel(&self) -> bool {
        self.stage == ShaderStage::Pixel
    }

    /// Direct subsequent writes to the vertex stage
    pub fn enter_vertex(&mut self) {
        self.stage = ShaderStage::Vertex;
    }

    /// Direct subsequent writes to the pixel stage
    pub fn enter_pixel(&mut self) {
        self.stage = ShaderStage::Pixel;
    }

    /// Shader of the current stage
    pub fn shader(&mut self) -> &mut StageShader {
        self.shader_for(self.stage)
    }

    /// Shader of `stage`
    pub fn shader_for(&mut self, stage: ShaderStage) -> &mut StageShader {
        match stage {
            ShaderStage::Vertex => &mut self.vertex,
            ShaderStage::Pixel => &mut self.pixel,
        }
    }

    /// Variable bound to `port` in the current stage
    pub fn variable(&self, port: PortId) -> Option<&Variable> {
        match self.stage {
            ShaderStage::Vertex => self.vertex.variable(port),
            ShaderStage::Pixel => self.pixel.variable(port),
        }
    }

    /// Active body buffer of the current stage
    pub fn body(&mut self) -> &mut CodeBuffer {
        self.shader().body()
    }

    /// Fresh temporary name; names are never reused within a compile
    pub fn new_name(&mut self) -> String {
        let name = format!("v{}", self.next_variable);
        self.next_variable += 1;
        name
    }

    /// Bind a new temporary of type `ty` to output `pin` of `node`
    pub fn emit_output(&mut self, node: &Node, pin: &str, ty: ValueType) -> Result<Variable> {
        let variable = Variable::new(self.new_name(), ty);
        self.bind_output(node, pin, variable)
    }

    /// Bind an existing variable to output `pin` of `node`
    pub fn bind_output(&mut self, node: &Node, pin: &str, variable: Variable) -> Result<Variable> {
        let port = output_pin(node, pin)?;
        self.shader().bind(port, variable.clone());
        Ok(variable)
    }

    /// Bind a variable to output `pin` of `node` in `stage`, outside any scope
    pub fn bind_outer(&mut self, stage: ShaderStage, node: &Node, pin: &str, variable: Variable) -> Result<()> {
        let port = output_pin(node, pin)?;
        self.shader_for(stage).bind_outer(port, variable);
        Ok(())
    }

    /// Retype the binding of output `pin` of `node`
    pub fn set_output_type(&mut self, node: &Node, pin: &str, ty: ValueType) -> Result<()> {
        let port = output_pin(node, pin)?;
        self.shader().set_variable_type(port, ty);
        Ok(())
    }

    /// Name of `ty` in the target language
    pub fn type_name(&self, node: &Node, ty: ValueType) -> Result<&'static str> {
        self.dialect
            .type_name(ty)
            .ok_or_else(|| CompileError::type_mismatch(node, "value has no type"))
    }

    /// Write `type name = expr;`
    pub fn assign(&mut self, node: &Node, variable: &Variable, expr: impl AsRef<str>) -> Result<()> {
        let type_name = self.type_name(node, variable.ty)?;
        let line = format!("{type_name} {} = {};", variable.name, expr.as_ref());
        self.body().line(line);
        Ok(())
    }

    /// Conversion of `variable` to `ty`
    pub fn cast(&self, node: &Node, variable: &Variable, ty: ValueType) -> Result<String> {
        variable
            .cast(ty, self.dialect)
            .map_err(|e| CompileError::type_mismatch(node, e.to_string()))
    }

    /// Common type of the operands of `node`
    pub fn common_type(&self, node: &Node, operands: &[&Variable]) -> Result<ValueType> {
        let types: Vec<_> = operands.iter().map(|v| v.ty).collect();
        common_type_of(&types).map_err(|e| CompileError::type_mismatch(node, e.to_string()))
    }

    /// Run `f` with body writes redirected and a fresh variable scope.
    ///
    /// Returns the closure result and the captured text. The scope and the
    /// redirection are undone even when `f` fails.
    pub fn capture<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<(T, String)> {
        let stage = self.stage;
        {
            let shader = self.shader_for(stage);
            shader.push_body();
            shader.push_scope();
            tracing::trace!(%stage, depth = shader.scope_depth(), "push scope");
        }
        let result = f(self);
        self.stage = stage;
        let shader = self.shader_for(stage);
        shader.pop_scope();
        let text = shader.pop_body();
        tracing::trace!(%stage, depth = shader.scope_depth(), "pop scope");
        result.map(|value| (value, text))
    }

    /// Register a uniform and declare it once in the current stage
    pub fn declare_uniform(&mut self, node: &Node, name: &str, ty: ValueType, length: Option<u32>) -> Result<()> {
        let stage = self.stage;
        match self.uniforms.get_mut(name) {
            Some(existing) if existing.ty != ty || existing.length != length => {
                return Err(CompileError::type_mismatch(
                    node,
                    format!("uniform '{name}' is declared as {} elsewhere", existing.ty),
                ));
            }
            Some(existing) => {
                if !existing.stages.contains(&stage) {
                    existing.stages.push(stage);
                    existing.stages.sort();
                }
            }
            None => {
                self.uniforms.insert(
                    name.to_string(),
                    UniformDecl {
                        name: name.to_string(),
                        ty,
                        length,
                        stages: vec![stage],
                    },
                );
            }
        }

        let declaration = self.dialect.uniform_decl(ty, name, length);
        let shader = self.shader();
        if shader.declare(name) {
            if let Some(declaration) = declaration {
                shader.block(Block::Uniform).line(declaration);
            }
        }
        Ok(())
    }

    /// Register a sampler for `texture` with `state`, returning its name.
    ///
    /// One sampler exists per (texture, state) pair; a texture sampled with
    /// different states gets numbered samplers.
    pub fn declare_sampler(
        &mut self,
        texture: &Variable,
        state: &SamplerState,
        sampler_type: &str,
    ) -> String {
        let stage = self.stage;
        let existing = self
            .samplers
            .values_mut()
            .find(|s| s.texture == texture.name && s.state == *state);

        let name = match existing {
            Some(decl) => {
                if !decl.stages.contains(&stage) {
                    decl.stages.push(stage);
                    decl.stages.sort();
                }
                decl.name.clone()
            }
            None => {
                let base = format!("{}sampler_{}", self.dialect.reserved_prefix, texture.name);
                let mut name = base.clone();
                let mut suffix = 1;
                while self.samplers.contains_key(&name) {
                    name = format!("{base}_{suffix}");
                    suffix += 1;
                }
                self.samplers.insert(
                    name.clone(),
                    SamplerDecl {
                        name: name.clone(),
                        texture: texture.name.clone(),
                        texture_type: texture.ty,
                        state: state.clone(),
                        stages: vec![stage],
                    },
                );
                name
            }
        };

        let declaration = self.dialect.sampler_decl(sampler_type, &name);
        let shader = self.shader();
        if shader.declare(&name) {
            shader.block(Block::Sampler).line(declaration);
        }
        name
    }

    /// Allocate the next interpolator slot
    pub fn allocate_interpolator(&mut self) -> u32 {
        let slot = self.interpolators;
        self.interpolators += 1;
        slot
    }

    /// Record the render state of the pixel output
    pub fn set_render_state(&mut self, state: &RenderState) -> Result<()> {
        if self.render_state.is_some() {
            return Err(CompileError::InvalidGraph(
                "render state written more than once".to_string(),
            ));
        }
        self.render_state = Some(state.clone());
        Ok(())
    }

    /// Loop unroll attribute for the current stage, if any
    pub fn unroll_attribute(&self) -> Option<&'static str> {
        match self.settings.unroll_loops {
            Some(false) => None,
            Some(true) => self.dialect.unroll_attribute,
            None if self.in_pixel() => self.dialect.unroll_attribute,
            None => None,
        }
    }

    /// Branch attribute for a hint, if the backend has one
    pub fn branch_attribute(&self, hint: BranchHint) -> Option<&'static str> {
        match hint {
            BranchHint::Auto => None,
            BranchHint::Static => self.dialect.flatten_attribute,
            BranchHint::Dynamic => self.dialect.branch_attribute,
        }
    }

    /// Fail unless the cursor is in the pixel stage
    pub fn require_pixel(&self, node: &Node) -> Result<()> {
        if self.in_pixel() {
            Ok(())
        } else {
            Err(CompileError::StageViolation {
                node: NodeIdent::of(node),
                stage: self.stage,
            })
        }
    }

    /// Fail unless the cursor is in the vertex stage
    pub fn require_vertex(&self, node: &Node) -> Result<()> {
        if self.in_vertex() {
            Ok(())
        } else {
            Err(CompileError::StageViolation {
                node: NodeIdent::of(node),
                stage: self.stage,
            })
        }
    }
}

fn output_pin(node: &Node, pin: &str) -> Result<PortId> {
    node.output(pin).map(|p| p.id).ok_or_else(|| {
        CompileError::InvalidGraph(format!("{} has no output pin '{pin}'", NodeIdent::of(node)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordoplay_shader_graph::NodeKind;

    #[test]
    fn test_names_are_monotonic_across_scopes() {
        let (graph, settings) = (Graph::default(), CompilerSettings::default());
        let mut cx = EmitContext::new(&graph, &settings);
        let node = Node::new(NodeKind::Add);
        let a = cx.emit_output(&node, "Output", ValueType::Scalar).unwrap();
        let (b, _) = cx
            .capture(|cx| cx.emit_output(&node, "Output", ValueType::Scalar))
            .unwrap();
        let c = cx.emit_output(&node, "Output", ValueType::Scalar).unwrap();
        assert_eq!([a.name, b.name, c.name], ["v0", "v1", "v2"]);
    }

    #[test]
    fn test_capture_isolates_scope_and_text() {
        let (graph, settings) = (Graph::default(), CompilerSettings::default());
        let mut cx = EmitContext::new(&graph, &settings);
        let node = Node::new(NodeKind::Scalar { value: 1.0 });
        let port = node.outputs[0].id;

        let (inner, text) = cx
            .capture(|cx| {
                let v = cx.emit_output(&node, "Output", ValueType::Scalar)?;
                cx.assign(&node, &v, "1.0")?;
                Ok(v)
            })
            .unwrap();
        assert_eq!(text, format!("float {} = 1.0;\n", inner.name));
        assert!(cx.variable(port).is_none());
        assert!(cx.shader().main_body().is_empty());
    }

    #[test]
    fn test_uniform_registry_dedups() {
        let (graph, settings) = (Graph::default(), CompilerSettings::default());
        let mut cx = EmitContext::new(&graph, &settings);
        let node = Node::new(NodeKind::Add);
        cx.declare_uniform(&node, "Color", ValueType::Vec4, None).unwrap();
        cx.declare_uniform(&node, "Color", ValueType::Vec4, None).unwrap();
        cx.enter_vertex();
        cx.declare_uniform(&node, "Color", ValueType::Vec4, None).unwrap();

        assert_eq!(cx.uniforms.len(), 1);
        assert_eq!(cx.uniforms["Color"].stages, [ShaderStage::Vertex, ShaderStage::Pixel]);
        assert_eq!(cx.pixel.block_text(Block::Uniform), "uniform vec4 Color;\n");
        assert_eq!(cx.vertex.block_text(Block::Uniform), "uniform vec4 Color;\n");

        let conflict = cx.declare_uniform(&node, "Color", ValueType::Scalar, None);
        assert!(matches!(conflict, Err(CompileError::TypeMismatch { .. })));
    }

    #[test]
    fn test_sampler_per_state() {
        let (graph, settings) = (Graph::default(), CompilerSettings::default());
        let mut cx = EmitContext::new(&graph, &settings);
        let texture = Variable::new("Albedo", ValueType::Texture2D);
        let linear = SamplerState::default();
        let point = SamplerState {
            min_filter: ordoplay_shader_graph::Filter::Point,
            ..SamplerState::default()
        };

        let a = cx.declare_sampler(&texture, &linear, "sampler2D");
        let b = cx.declare_sampler(&texture, &linear, "sampler2D");
        let c = cx.declare_sampler(&texture, &point, "sampler2D");
        assert_eq!(a, "_gl_sampler_Albedo");
        assert_eq!(a, b);
        assert_eq!(c, "_gl_sampler_Albedo_1");
        assert_eq!(cx.samplers.len(), 2);
    }

    #[test]
    fn test_unroll_attribute_follows_settings() {
        let hlsl = CompilerSettings::for_backend(Backend::Hlsl);
        let graph = Graph::default();
        let mut cx = EmitContext::new(&graph, &hlsl);
        assert_eq!(cx.unroll_attribute(), Some("[unroll]"));
        cx.enter_vertex();
        assert_eq!(cx.unroll_attribute(), None);

        let forced = CompilerSettings {
            unroll_loops: Some(true),
            ..hlsl.clone()
        };
        let mut cx = EmitContext::new(&graph, &forced);
        cx.enter_vertex();
        assert_eq!(cx.unroll_attribute(), Some("[unroll]"));
    }
}
