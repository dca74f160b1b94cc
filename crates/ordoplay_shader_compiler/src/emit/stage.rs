// SPDX-License-Identifier: MIT OR Apache-2.0
//! Stage inputs, outputs and built-ins.

use super::vector_input;
use crate::context::EmitContext;
use crate::error::{CompileError, Result};
use crate::shader::{Block, ShaderStage};
use crate::variable::Variable;
use ordoplay_shader_graph::{DataUsage, Node, RenderState, ValueType};

const TARGET_PINS: [&str; 4] = ["Input", "Input1", "Input2", "Input3"];

/// Vertex attribute, declared once per attribute name
pub(super) fn vertex_input(
    cx: &mut EmitContext<'_>,
    node: &Node,
    name: &str,
    usage: DataUsage,
    ty: ValueType,
    index: u32,
) -> Result<()> {
    cx.require_vertex(node)?;
    if !ty.is_vector() {
        return Err(CompileError::type_mismatch(
            node,
            format!("vertex attribute '{name}' cannot be {ty}"),
        ));
    }

    let dialect = cx.dialect;
    let existing = cx.shader().attribute(name).cloned();
    let source = match existing {
        Some(existing) => existing,
        None => {
            let (identifier, semantic) = dialect.vertex_attribute(usage, index);
            let declaration = dialect.attribute_decl(ty, &identifier, &semantic);
            let variable = Variable::new(dialect.input_ref(&identifier), ty);
            let shader = cx.shader();
            shader.block(Block::Input).line(declaration);
            shader.add_attribute(name, variable.clone());
            variable
        }
    };

    let w = match usage {
        DataUsage::Position => "1.0",
        DataUsage::Normal => "0.0",
        _ => {
            cx.bind_output(node, "Output", source)?;
            return Ok(());
        }
    };
    let width = source.ty.components().unwrap_or(4);
    if width == 4 {
        cx.bind_output(node, "Output", source)?;
        return Ok(());
    }

    let mut components = vec![source.name.clone()];
    components.extend((width..3).map(|_| "0.0".to_string()));
    components.push(w.to_string());
    let expr = dialect.construct(ValueType::Vec4, &components);
    let output = cx.emit_output(node, "Output", ValueType::Vec4)?;
    cx.assign(node, &output, expr)
}

/// Clip-space position
pub(super) fn vertex_output(cx: &mut EmitContext<'_>, node: &Node) -> Result<()> {
    cx.require_vertex(node)?;
    let input = vector_input(cx, node, "Input")?;
    let position = match input.ty {
        ValueType::Scalar => format!("{}, 0.0, 0.0, 1.0", input.name),
        ValueType::Vec2 => format!("{}, 0.0, 1.0", input.name),
        ValueType::Vec3 => format!("{}, 1.0", input.name),
        _ => input.name.clone(),
    };
    let expr = if input.ty == ValueType::Vec4 {
        position
    } else {
        cx.dialect.construct(ValueType::Vec4, &[position])
    };
    let target = cx.dialect.position_output();
    cx.body().line(format!("{target} = {expr};"));
    Ok(())
}

/// Render targets and the render state
pub(super) fn pixel_output(cx: &mut EmitContext<'_>, node: &Node, state: &RenderState) -> Result<()> {
    cx.require_pixel(node)?;
    cx.set_render_state(state)?;

    let mut gap = None;
    for (index, pin) in (0u32..).zip(TARGET_PINS) {
        let Some(value) = cx.emit_input(node, pin)? else {
            gap.get_or_insert(pin);
            continue;
        };
        if let Some(missing) = gap {
            tracing::warn!(pin, missing, "render target written after an unconnected one");
        }
        if index >= cx.dialect.max_render_targets {
            return Err(CompileError::unsupported(
                node,
                cx.backend(),
                format!("render target {index}"),
            ));
        }
        if !value.ty.is_vector() {
            return Err(CompileError::expected(node, pin, "a scalar or vector", value.ty));
        }

        let color = cx.cast(node, &value, ValueType::Vec4)?;
        let (declaration, target) = cx.dialect.fragment_output(index);
        let shader = cx.shader();
        if let Some(declaration) = declaration {
            if shader.declare(&target) {
                shader.block(Block::Output).line(declaration);
            }
        }
        shader.body().line(format!("{target} = {color};"));
    }
    Ok(())
}

/// Carries a vertex value into the pixel stage through an interpolator slot
pub(super) fn interpolator(cx: &mut EmitContext<'_>, node: &Node) -> Result<()> {
    if cx.in_vertex() {
        let input = cx.require_input(node, "Input")?;
        cx.bind_output(node, "Output", input)?;
        return Ok(());
    }

    cx.enter_vertex();
    let value = cx.require_input(node, "Input");
    cx.enter_pixel();
    let value = value?;
    if !value.ty.is_vector() {
        return Err(CompileError::type_mismatch(
            node,
            format!("{} cannot be interpolated", value.ty),
        ));
    }

    let slot = cx.allocate_interpolator();
    let name = format!("Attr{slot}");
    let dialect = cx.dialect;
    let (vertex_decl, pixel_decl) = dialect.interpolator_decls(value.ty, &name, slot);

    let vertex = cx.shader_for(ShaderStage::Vertex);
    vertex.block(Block::Output).line(vertex_decl);
    vertex
        .body()
        .line(format!("{} = {};", dialect.output_ref(&name), value.name));
    cx.shader_for(ShaderStage::Pixel)
        .block(Block::Input)
        .line(pixel_decl);

    tracing::trace!(slot, ty = %value.ty, "interpolator");
    cx.bind_outer(
        ShaderStage::Pixel,
        node,
        "Output",
        Variable::new(dialect.input_ref(&name), value.ty),
    )
}

pub(super) fn fragment_position(cx: &mut EmitContext<'_>, node: &Node) -> Result<()> {
    cx.require_pixel(node)?;
    cx.requirements.fragment_position = true;
    let expr = cx.dialect.frag_coord;
    let output = cx.emit_output(node, "Output", ValueType::Vec2)?;
    cx.assign(node, &output, expr)
}

pub(super) fn front_face(cx: &mut EmitContext<'_>, node: &Node) -> Result<()> {
    cx.require_pixel(node)?;
    cx.requirements.front_face = true;
    let expr = format!("{} ? 1.0 : 0.0", cx.dialect.front_facing);
    let output = cx.emit_output(node, "Output", ValueType::Scalar)?;
    cx.assign(node, &output, expr)
}

pub(super) fn instance(cx: &mut EmitContext<'_>, node: &Node) -> Result<()> {
    cx.require_vertex(node)?;
    let Some(expr) = cx.dialect.instance_id else {
        return Err(CompileError::unsupported(node, cx.backend(), "instancing"));
    };
    cx.requirements.instance_id = true;
    let output = cx.emit_output(node, "Output", ValueType::Scalar)?;
    cx.assign(node, &output, expr)
}

pub(super) fn target_size(cx: &mut EmitContext<'_>, node: &Node) -> Result<()> {
    let name = format!("{}targetSize", cx.dialect.reserved_prefix);
    cx.declare_uniform(node, &name, ValueType::Vec2, None)?;
    cx.requirements.target_size = true;
    cx.bind_output(node, "Output", Variable::new(name, ValueType::Vec2))?;
    Ok(())
}
