// SPDX-License-Identifier: MIT OR Apache-2.0
//! Compiler entry point.

use crate::artifact::ProgramArtifact;
use crate::assemble::assemble;
use crate::context::EmitContext;
use crate::error::{CompileError, NodeIdent, Result};
use crate::settings::CompilerSettings;
use ordoplay_shader_graph::{Graph, GraphError, Node, NodeKind};

/// Compiles shader graphs into vertex and pixel source for one backend.
///
/// The compiler holds only its settings; every call to [`compile`](Self::compile)
/// builds a fresh emission context, so one compiler can be shared across
/// threads and compile several graphs concurrently.
#[derive(Debug, Clone, Default)]
pub struct ShaderCompiler {
    settings: CompilerSettings,
}

impl ShaderCompiler {
    /// Create a compiler with the given settings
    pub fn new(settings: CompilerSettings) -> Self {
        Self { settings }
    }

    /// Settings in use
    pub fn settings(&self) -> &CompilerSettings {
        &self.settings
    }

    /// Compile `graph` into a program artifact
    pub fn compile(&self, graph: &Graph) -> Result<ProgramArtifact> {
        tracing::debug!(
            graph = %graph.name,
            backend = %self.settings.backend,
            nodes = graph.node_count(),
            "Compiling shader graph"
        );
        match self.compile_graph(graph) {
            Ok(artifact) => {
                tracing::debug!(
                    graph = %graph.name,
                    interpolators = artifact.interpolator_count,
                    uniforms = artifact.uniforms.len(),
                    samplers = artifact.samplers.len(),
                    "Compiled shader graph"
                );
                Ok(artifact)
            }
            Err(e) => {
                tracing::error!(graph = %graph.name, "Shader compile failed: {}", e);
                Err(e)
            }
        }
    }

    fn compile_graph(&self, graph: &Graph) -> Result<ProgramArtifact> {
        validate(graph)?;

        let mut outputs = graph
            .nodes()
            .filter(|node| matches!(node.kind, NodeKind::PixelOutput { .. }));
        let pixel_output = outputs.next().ok_or(CompileError::MissingTerminal)?;
        if let Some(extra) = outputs.next() {
            return Err(CompileError::InvalidGraph(format!(
                "{} is a second PixelOutput node",
                NodeIdent::of(extra)
            )));
        }

        let mut cx = EmitContext::new(graph, &self.settings);
        cx.enter_pixel();
        cx.emit_node(pixel_output)?;

        let vertex_outputs: Vec<&Node> = graph
            .nodes()
            .filter(|node| matches!(node.kind, NodeKind::VertexOutput))
            .collect();
        if vertex_outputs.is_empty() {
            tracing::warn!(graph = %graph.name, "No VertexOutput node, vertex stage leaves the position unwritten");
        }
        cx.enter_vertex();
        for node in vertex_outputs {
            cx.emit_node(node)?;
        }
        cx.enter_pixel();

        Ok(assemble(cx))
    }
}

fn validate(graph: &Graph) -> Result<()> {
    match graph.validate() {
        Ok(()) => Ok(()),
        Err(GraphError::DanglingConnection(id)) => Err(CompileError::InvalidGraph(format!(
            "connection {:?} does not join an output to an input",
            id
        ))),
        Err(GraphError::Cycle(cycle)) => Err(match graph.node(cycle.node) {
            Some(node) => CompileError::Cycle {
                node: NodeIdent::of(node),
            },
            None => CompileError::InvalidGraph(format!("cycle through missing node {:?}", cycle.node)),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Backend;
    use ordoplay_shader_graph::{RenderState, ValueType};

    fn pixel_output() -> Node {
        Node::new(NodeKind::PixelOutput {
            state: RenderState::default(),
        })
    }

    #[test]
    fn test_missing_terminal() {
        let graph = Graph::default();
        let compiler = ShaderCompiler::default();
        assert!(matches!(
            compiler.compile(&graph),
            Err(CompileError::MissingTerminal)
        ));
    }

    #[test]
    fn test_second_pixel_output_rejected() {
        let mut graph = Graph::default();
        graph.add_node(pixel_output());
        graph.add_node(pixel_output());
        let compiler = ShaderCompiler::default();
        assert!(matches!(
            compiler.compile(&graph),
            Err(CompileError::InvalidGraph(_))
        ));
    }

    #[test]
    fn test_uniform_color() {
        let mut graph = Graph::default();
        let color = graph.add_node(Node::new(NodeKind::Uniform {
            parameter: "Color".to_string(),
            ty: ValueType::Vec4,
        }));
        let output = graph.add_node(pixel_output());
        graph.connect_by_name(color, "Output", output, "Input").unwrap();

        let compiler = ShaderCompiler::new(CompilerSettings::for_backend(Backend::Glsl));
        let artifact = compiler.compile(&graph).unwrap();
        assert!(artifact
            .pixel_source
            .contains("void main()\n{\n\t_gl_FragData_0 = Color;\n}\n"));
        assert_eq!(artifact.uniforms.len(), 1);
        assert_eq!(artifact.interpolator_count, 0);
    }
}
