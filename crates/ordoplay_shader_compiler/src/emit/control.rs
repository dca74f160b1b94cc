// SPDX-License-Identifier: MIT OR Apache-2.0
//! Branches, discard and loops.
//!
//! Branch and loop bodies are emitted into captured buffers inside a fresh
//! variable scope, then spliced into the control-flow text once the result
//! type is known. Work shared between branches, or independent of the loop
//! counter, is hoisted in front of the construct first.

use super::scalar_operand;
use crate::context::EmitContext;
use crate::dialect::format_float;
use crate::error::{CompileError, NodeIdent, Result};
use crate::variable::Variable;
use ordoplay_shader_graph::{switch_case_pin, BranchHint, ConditionalOperator, Node, ValueType};
use std::collections::HashSet;

/// One captured branch: its value and the text that computes it
struct Branch {
    value: Variable,
    text: String,
}

fn capture_branch(cx: &mut EmitContext<'_>, node: &Node, pin: &str) -> Result<Branch> {
    let (value, text) = cx.capture(|cx| cx.require_input(node, pin))?;
    Ok(Branch { value, text })
}

/// Declare the shared output of a set of branches, typed to their common type
fn branch_output(cx: &mut EmitContext<'_>, node: &Node, branches: &[&Branch]) -> Result<Variable> {
    let values: Vec<&Variable> = branches.iter().map(|b| &b.value).collect();
    let ty = cx.common_type(node, &values)?;
    let output = cx.emit_output(node, "Output", ty)?;
    let type_name = cx.type_name(node, ty)?;
    cx.body().line(format!("{type_name} {};", output.name));
    Ok(output)
}

/// Write `{ body; output = value; }`
fn write_branch(cx: &mut EmitContext<'_>, node: &Node, branch: &Branch, output: &Variable) -> Result<()> {
    let value = cx.cast(node, &branch.value, output.ty)?;
    let body = cx.body();
    body.open();
    body.splice(&branch.text);
    body.line(format!("{} = {value};", output.name));
    body.close();
    Ok(())
}

pub(super) fn conditional(
    cx: &mut EmitContext<'_>,
    node: &Node,
    operator: ConditionalOperator,
    hint: BranchHint,
) -> Result<()> {
    let shared = cx.find_common_outputs(node, &["CaseTrue", "CaseFalse"]);
    cx.hoist(&shared)?;

    let input = scalar_operand(cx, node, "Input")?;
    let reference = scalar_operand(cx, node, "Reference")?;

    let when_true = capture_branch(cx, node, "CaseTrue")?;
    let when_false = capture_branch(cx, node, "CaseFalse")?;
    let output = branch_output(cx, node, &[&when_true, &when_false])?;

    if let Some(attribute) = cx.branch_attribute(hint) {
        cx.body().line(attribute);
    }
    cx.body()
        .line(format!("if ({input} {} {reference})", operator.token()));
    write_branch(cx, node, &when_true, &output)?;
    cx.body().line("else");
    write_branch(cx, node, &when_false, &output)
}

pub(super) fn switch(cx: &mut EmitContext<'_>, node: &Node, cases: &[i32], hint: BranchHint) -> Result<()> {
    let mut seen = HashSet::new();
    if let Some(duplicate) = cases.iter().find(|case| !seen.insert(**case)) {
        return Err(CompileError::InvalidGraph(format!(
            "{}: case {duplicate} appears more than once",
            NodeIdent::of(node)
        )));
    }

    let pins: Vec<String> = cases.iter().map(|case| switch_case_pin(*case)).collect();
    let mut all_pins: Vec<&str> = pins.iter().map(String::as_str).collect();
    all_pins.push("Default");
    let shared = cx.find_common_outputs(node, &all_pins);
    cx.hoist(&shared)?;

    let select = scalar_operand(cx, node, "Select")?;

    let mut branches = Vec::with_capacity(cases.len());
    for pin in &pins {
        branches.push(capture_branch(cx, node, pin)?);
    }
    let default = capture_branch(cx, node, "Default")?;

    let mut all: Vec<&Branch> = branches.iter().collect();
    all.push(&default);
    let output = branch_output(cx, node, &all)?;

    if let Some(attribute) = cx.branch_attribute(hint) {
        cx.body().line(attribute);
    }
    for (i, (case, branch)) in cases.iter().zip(&branches).enumerate() {
        let keyword = if i == 0 { "if" } else { "else if" };
        cx.body().line(format!("{keyword} (int({select}) == {case})"));
        write_branch(cx, node, branch, &output)?;
    }
    if !branches.is_empty() {
        cx.body().line("else");
    }
    write_branch(cx, node, &default, &output)
}

/// Keep the pixel when `Input <operator> Reference` holds, pass `Pass` through
pub(super) fn discard(cx: &mut EmitContext<'_>, node: &Node, operator: ConditionalOperator) -> Result<()> {
    cx.require_pixel(node)?;
    let input = scalar_operand(cx, node, "Input")?;
    let reference = scalar_operand(cx, node, "Reference")?;
    cx.body().line(format!(
        "if (!({input} {} {reference})) discard;",
        operator.token()
    ));
    let pass = cx.require_input(node, "Pass")?;
    cx.bind_output(node, "Output", pass)?;
    Ok(())
}

/// Counter name and inclusive bounds
type Counter<'a> = (&'a str, i32, i32);

/// Iterate, Iterate2d and Sum: counted loops, outermost counter first
pub(super) fn iterate(cx: &mut EmitContext<'_>, node: &Node, counters: &[Counter<'_>], accumulate: bool) -> Result<()> {
    let headers: Vec<(&str, String)> = counters
        .iter()
        .map(|(pin, from, to)| {
            let (from, to) = (format_float(*from as f32), format_float(*to as f32));
            (*pin, format!("{{counter}} = {from}; {{counter}} <= {to}; ++{{counter}}"))
        })
        .collect();
    emit_loop(cx, node, &headers, accumulate, false)
}

/// Unbounded loop left only through its `Condition`
pub(super) fn repeat(cx: &mut EmitContext<'_>, node: &Node) -> Result<()> {
    if !cx.dialect.unbounded_loops {
        return Err(CompileError::unsupported(node, cx.backend(), "unbounded loops"));
    }
    let headers = [("N", "{counter} = 0.0;; ++{counter}".to_string())];
    emit_loop(cx, node, &headers, false, true)
}

fn emit_loop(
    cx: &mut EmitContext<'_>,
    node: &Node,
    headers: &[(&str, String)],
    accumulate: bool,
    condition_required: bool,
) -> Result<()> {
    let invariant = cx.find_non_dependent_outputs(node, &["Input", "Condition"]);
    cx.hoist(&invariant)?;

    let initial = match node.input("Initial") {
        Some(_) => cx.emit_input(node, "Initial")?,
        None => None,
    };
    if let Some(initial) = &initial {
        if !initial.ty.is_vector() && initial.ty != ValueType::Matrix4 {
            return Err(CompileError::expected(node, "Initial", "a vector or matrix", initial.ty));
        }
    }

    // The output type is unknown until the body is emitted unless the
    // initial value fixes it; until then body reads see it as `Void`.
    let declared = initial.as_ref().map_or(ValueType::Void, |v| v.ty);
    let output = cx.emit_output(node, "Output", declared)?;

    let counters: Vec<(String, &String)> = headers
        .iter()
        .map(|(_, header)| (cx.new_name(), header))
        .collect();

    let ((value, condition), body) = cx.capture(|cx| {
        for ((pin, _), (name, _)) in headers.iter().zip(&counters) {
            cx.bind_output(node, pin, Variable::new(name.clone(), ValueType::Scalar))?;
        }
        let condition = if condition_required {
            Some(scalar_operand(cx, node, "Condition")?)
        } else if node.input("Condition").is_some() {
            match cx.emit_input(node, "Condition")? {
                Some(condition) => Some(cx.cast(node, &condition, ValueType::Scalar)?),
                None => None,
            }
        } else {
            None
        };
        let value = cx.require_input(node, "Input")?;
        Ok((value, condition))
    })?;

    let ty = if declared == ValueType::Void { value.ty } else { declared };
    if !ty.is_vector() && ty != ValueType::Matrix4 {
        return Err(CompileError::expected(node, "Input", "a vector or matrix", value.ty));
    }
    cx.set_output_type(node, "Output", ty)?;
    let output = Variable::new(output.name, ty);
    let value = cx.cast(node, &value, ty)?;

    let start = match &initial {
        Some(initial) if !accumulate => cx.cast(node, initial, ty)?,
        _ => cx.dialect.scalar_literal(ty, 0.0),
    };
    cx.assign(node, &output, start)?;

    if let Some(attribute) = cx.unroll_attribute() {
        cx.body().line(attribute);
    }
    let scalar = cx.type_name(node, ValueType::Scalar)?;
    let body_buffer = cx.body();
    for (name, header) in &counters {
        body_buffer.line(format!("for ({scalar} {})", header.replace("{counter}", name)));
        body_buffer.open();
    }
    body_buffer.splice(&body);
    if let Some(condition) = &condition {
        body_buffer.line(format!("if ({condition} == 0.0) break;"));
    }
    let operator = if accumulate { "+=" } else { "=" };
    body_buffer.line(format!("{} {operator} {value};", output.name));
    for _ in &counters {
        body_buffer.close();
    }
    Ok(())
}
