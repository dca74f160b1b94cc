// SPDX-License-Identifier: MIT OR Apache-2.0
//! Demand-driven evaluation of pins.
//!
//! A pin is emitted the first time something asks for it; its variable is
//! cached in the innermost scope of the current stage and reused from then
//! on. Branch and loop emitters use [`EmitContext::find_common_outputs`] and
//! [`EmitContext::find_non_dependent_outputs`] to hoist shared work out of
//! their scopes before capturing them.

use crate::context::EmitContext;
use crate::emit;
use crate::error::{CompileError, NodeIdent, Result};
use crate::variable::Variable;
use ordoplay_shader_graph::{Node, NodeId, NodeKind, PortId};
use std::collections::{HashMap, HashSet};

/// Output pin of a node
pub type OutputRef = (NodeId, PortId);

impl<'g> EmitContext<'g> {
    /// Variable holding output `port` of `node_id`, emitting the producer if needed
    pub fn emit(&mut self, node_id: NodeId, port: PortId) -> Result<Variable> {
        if let Some(variable) = self.variable(port) {
            return Ok(variable.clone());
        }

        let graph = self.graph;
        let node = graph
            .node(node_id)
            .ok_or_else(|| CompileError::InvalidGraph(format!("unknown node {}", node_id.0)))?;

        if self.in_progress.contains(&node_id) {
            return Err(CompileError::Cycle {
                node: NodeIdent::of(node),
            });
        }

        // A producer binds all of its outputs at once; a sibling already
        // being bound means this one was skipped.
        let sibling_bound = node
            .outputs
            .iter()
            .any(|p| p.id != port && self.variable(p.id).is_some());
        if !sibling_bound {
            self.emit_node(node)?;
            if let Some(variable) = self.variable(port) {
                return Ok(variable.clone());
            }
        }

        Err(CompileError::MissingOutput {
            node: NodeIdent::of(node),
            pin: node
                .port(&port)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| port.0.to_string()),
        })
    }

    /// Run the emitter of `node` once
    pub(crate) fn emit_node(&mut self, node: &'g Node) -> Result<()> {
        tracing::trace!(node = %NodeIdent::of(node), stage = %self.stage(), "emit");
        self.in_progress.insert(node.id);
        let result = emit::emit_node(self, node);
        self.in_progress.remove(&node.id);
        result
    }

    /// Value of input `pin` of `node`.
    ///
    /// Resolution order: the connected producer, the pin's default literal,
    /// `None` for optional pins, otherwise [`CompileError::MissingInput`].
    pub fn emit_input(&mut self, node: &Node, pin: &str) -> Result<Option<Variable>> {
        let port = node.input(pin).ok_or_else(|| {
            CompileError::InvalidGraph(format!("{} has no input pin '{pin}'", NodeIdent::of(node)))
        })?;

        if let Some(edge) = self.graph.find_edge(port.id) {
            return self.emit(edge.from_node, edge.from_port).map(Some);
        }
        if let Some(default) = port.default_value {
            let literal = self.dialect.vector_literal(default.components());
            return Ok(Some(Variable::new(literal, default.value_type())));
        }
        if port.optional {
            return Ok(None);
        }
        Err(CompileError::MissingInput {
            node: NodeIdent::of(node),
            pin: pin.to_string(),
        })
    }

    /// Value of an input that must resolve
    pub fn require_input(&mut self, node: &Node, pin: &str) -> Result<Variable> {
        self.emit_input(node, pin)?.ok_or_else(|| CompileError::MissingInput {
            node: NodeIdent::of(node),
            pin: pin.to_string(),
        })
    }

    /// Whether input `pin` of `node` has an incoming connection
    pub fn is_connected(&self, node: &Node, pin: &str) -> bool {
        node.input(pin)
            .is_some_and(|p| self.graph.find_edge(p.id).is_some())
    }

    /// Output pins reachable upstream from every pin in `pins`.
    ///
    /// Traversal does not enter loop bodies or cross interpolators, so
    /// everything returned can be evaluated in the current scope. Order is
    /// the discovery order from the first pin.
    pub fn find_common_outputs(&self, node: &Node, pins: &[&str]) -> Vec<OutputRef> {
        let mut sets = pins.iter().map(|pin| self.upstream_outputs(node, pin));
        let Some(first) = sets.next() else {
            return Vec::new();
        };
        let rest: Vec<HashSet<OutputRef>> = sets.map(|s| s.into_iter().collect()).collect();
        first
            .into_iter()
            .filter(|output| rest.iter().all(|set| set.contains(output)))
            .collect()
    }

    fn upstream_outputs(&self, node: &Node, pin: &str) -> Vec<OutputRef> {
        let mut found = Vec::new();
        let mut seen = HashSet::new();
        let mut stack: Vec<PortId> = node.input(pin).map(|p| p.id).into_iter().collect();

        while let Some(input) = stack.pop() {
            let Some(edge) = self.graph.find_edge(input) else {
                continue;
            };
            if !seen.insert((edge.from_node, edge.from_port)) {
                continue;
            }
            found.push((edge.from_node, edge.from_port));

            let Some(producer) = self.graph.node(edge.from_node) else {
                continue;
            };
            if is_barrier(&producer.kind) {
                continue;
            }
            stack.extend(producer.inputs.iter().rev().map(|p| p.id));
        }
        found
    }

    /// Upstream outputs of `pins` on `loop_node` that do not depend on the
    /// loop's own outputs.
    ///
    /// Returns the frontier: the first independent pins met while walking
    /// up from the loop inputs. Evaluating them before the loop keeps
    /// invariant work out of the body.
    pub fn find_non_dependent_outputs(&self, loop_node: &Node, pins: &[&str]) -> Vec<OutputRef> {
        let mut memo = HashMap::new();
        let mut visiting = HashSet::new();
        let mut frontier = Vec::new();
        let mut seen = HashSet::new();

        let mut stack: Vec<PortId> = pins
            .iter()
            .rev()
            .filter_map(|pin| loop_node.input(pin).map(|p| p.id))
            .collect();

        while let Some(input) = stack.pop() {
            let Some(edge) = self.graph.find_edge(input) else {
                continue;
            };
            let output = (edge.from_node, edge.from_port);
            if !seen.insert(output) {
                continue;
            }
            if edge.from_node == loop_node.id {
                continue;
            }
            if !self.depends_on(edge.from_node, loop_node.id, &mut memo, &mut visiting) {
                frontier.push(output);
                continue;
            }
            if let Some(producer) = self.graph.node(edge.from_node) {
                stack.extend(producer.inputs.iter().rev().map(|p| p.id));
            }
        }
        frontier
    }

    fn depends_on(
        &self,
        node_id: NodeId,
        loop_id: NodeId,
        memo: &mut HashMap<NodeId, bool>,
        visiting: &mut HashSet<NodeId>,
    ) -> bool {
        if node_id == loop_id {
            return true;
        }
        if let Some(known) = memo.get(&node_id) {
            return *known;
        }
        if !visiting.insert(node_id) {
            return false;
        }

        let dependent = self.graph.node(node_id).is_some_and(|node| {
            !matches!(node.kind, NodeKind::Interpolator)
                && node.inputs.iter().any(|input| {
                    self.graph
                        .find_edge(input.id)
                        .is_some_and(|edge| self.depends_on(edge.from_node, loop_id, memo, visiting))
                })
        });

        visiting.remove(&node_id);
        memo.insert(node_id, dependent);
        dependent
    }

    /// Emit each output in order, binding them in the current scope
    pub fn hoist(&mut self, outputs: &[OutputRef]) -> Result<()> {
        for (node_id, port) in outputs {
            self.emit(*node_id, *port)?;
        }
        Ok(())
    }
}

/// Producers whose inputs are evaluated somewhere other than the current scope
fn is_barrier(kind: &NodeKind) -> bool {
    kind.is_loop() || matches!(kind, NodeKind::Interpolator)
}

#[cfg(test)]
mod tests {
    use crate::context::EmitContext;
    use crate::settings::CompilerSettings;
    use ordoplay_shader_graph::{ConditionalOperator, BranchHint, Graph, Node, NodeKind};

    #[test]
    fn test_common_outputs_of_branches() {
        let mut graph = Graph::default();
        let shared = graph.add_node(Node::new(NodeKind::Scalar { value: 2.0 }));
        let left = graph.add_node(Node::new(NodeKind::Sin));
        let right = graph.add_node(Node::new(NodeKind::Cos));
        let branch = graph.add_node(Node::new(NodeKind::Conditional {
            operator: ConditionalOperator::Less,
            branch: BranchHint::Auto,
        }));
        graph.connect_by_name(shared, "Output", left, "Theta").unwrap();
        graph.connect_by_name(shared, "Output", right, "Theta").unwrap();
        graph.connect_by_name(left, "Output", branch, "CaseTrue").unwrap();
        graph.connect_by_name(right, "Output", branch, "CaseFalse").unwrap();

        let settings = CompilerSettings::default();
        let cx = EmitContext::new(&graph, &settings);
        let node = graph.node(branch).unwrap();
        let common = cx.find_common_outputs(node, &["CaseTrue", "CaseFalse"]);
        assert_eq!(common.len(), 1);
        assert_eq!(common[0].0, shared);
    }

    #[test]
    fn test_non_dependent_outputs_of_loop() {
        let mut graph = Graph::default();
        let invariant = graph.add_node(Node::new(NodeKind::Scalar { value: 3.0 }));
        let body = graph.add_node(Node::new(NodeKind::Mul));
        let looped = graph.add_node(Node::new(NodeKind::Iterate { from: 0, to: 3 }));
        graph.connect_by_name(invariant, "Output", body, "Input1").unwrap();
        graph.connect_by_name(looped, "N", body, "Input2").unwrap();
        graph.connect_by_name(body, "Output", looped, "Input").unwrap();

        let settings = CompilerSettings::default();
        let cx = EmitContext::new(&graph, &settings);
        let node = graph.node(looped).unwrap();
        let frontier = cx.find_non_dependent_outputs(node, &["Input", "Condition"]);
        assert_eq!(frontier.len(), 1);
        assert_eq!(frontier[0].0, invariant);
    }

    #[test]
    fn test_missing_input_reports_pin() {
        let mut graph = Graph::default();
        let add = graph.add_node(Node::new(NodeKind::Add));
        let settings = CompilerSettings::default();
        let mut cx = EmitContext::new(&graph, &settings);
        let node = graph.node(add).unwrap();
        let err = cx.require_input(node, "Input1").unwrap_err();
        assert_eq!(err.to_string(), format!("Add ({}): input 'Input1' is not connected", add.0));
    }
}
