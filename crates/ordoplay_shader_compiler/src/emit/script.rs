// SPDX-License-Identifier: MIT OR Apache-2.0
//! User script subroutines.

use crate::context::EmitContext;
use crate::error::{CompileError, NodeIdent, Result};
use crate::shader::Block;
use ordoplay_shader_graph::{Node, ScriptPin};

fn pin_type(cx: &EmitContext<'_>, node: &Node, pin: &ScriptPin) -> Result<&'static str> {
    if pin.ty.is_texture() {
        return Err(CompileError::unsupported(
            node,
            cx.backend(),
            format!("texture script pin '{}'", pin.name),
        ));
    }
    cx.type_name(node, pin.ty)
}

/// Defines `name` once per stage and calls it
pub(super) fn script(
    cx: &mut EmitContext<'_>,
    node: &Node,
    name: &str,
    body: &str,
    inputs: &[ScriptPin],
    outputs: &[ScriptPin],
) -> Result<()> {
    let mut parameters = Vec::with_capacity(inputs.len() + outputs.len());
    for pin in inputs {
        parameters.push(format!("{} {}", pin_type(cx, node, pin)?, pin.name));
    }
    for pin in outputs {
        parameters.push(format!("out {} {}", pin_type(cx, node, pin)?, pin.name));
    }
    let signature = format!("void {name}({})", parameters.join(", "));

    let shader = cx.shader();
    match shader.script_signature(name).map(str::to_string) {
        Some(existing) if existing != signature => {
            return Err(CompileError::InvalidGraph(format!(
                "{}: script '{name}' is already defined as '{existing}'",
                NodeIdent::of(node)
            )));
        }
        Some(_) => {}
        None => {
            let block = shader.block(Block::Script);
            if !block.is_empty() {
                block.line("");
            }
            block.line(&signature);
            block.open();
            block.splice(body.trim_matches('\n'));
            block.close();
            shader.define_script(name, signature);
        }
    }

    let mut arguments = Vec::with_capacity(inputs.len() + outputs.len());
    for pin in inputs {
        let value = cx.require_input(node, &pin.name)?;
        arguments.push(cx.cast(node, &value, pin.ty)?);
    }
    for pin in outputs {
        let output = cx.emit_output(node, &pin.name, pin.ty)?;
        let type_name = cx.type_name(node, pin.ty)?;
        cx.body().line(format!("{type_name} {};", output.name));
        arguments.push(output.name);
    }
    cx.body().line(format!("{name}({});", arguments.join(", ")));
    Ok(())
}
