// SPDX-License-Identifier: MIT OR Apache-2.0
//! Uniforms, textures and samplers.

use crate::context::EmitContext;
use crate::dialect::{fill, format_float};
use crate::error::{CompileError, NodeIdent, Result};
use crate::variable::Variable;
use ordoplay_shader_graph::{CompareFunction, Node, NodeKind, SamplerState, ValueType};

/// Named parameter; the variable is the parameter itself
pub(super) fn uniform(cx: &mut EmitContext<'_>, node: &Node, parameter: &str, ty: ValueType) -> Result<()> {
    if ty == ValueType::Void {
        return Err(CompileError::type_mismatch(node, format!("uniform '{parameter}' has no type")));
    }
    cx.declare_uniform(node, parameter, ty, None)?;
    cx.bind_output(node, "Output", Variable::new(parameter, ty))?;
    Ok(())
}

/// Element of a uniform array; constant indices fold into the subscript
pub(super) fn indexed_uniform(
    cx: &mut EmitContext<'_>,
    node: &Node,
    parameter: &str,
    ty: ValueType,
    length: u32,
) -> Result<()> {
    if !ty.is_vector() && ty != ValueType::Matrix4 {
        return Err(CompileError::type_mismatch(
            node,
            format!("uniform array '{parameter}' cannot hold {ty}"),
        ));
    }
    if length == 0 {
        return Err(CompileError::InvalidGraph(format!(
            "{}: uniform array '{parameter}' has zero length",
            NodeIdent::of(node)
        )));
    }
    cx.declare_uniform(node, parameter, ty, Some(length))?;

    let subscript = match constant_index(cx, node) {
        Some(index) if index >= 0.0 && (index as u32) < length => (index as u32).to_string(),
        Some(index) => {
            return Err(CompileError::InvalidGraph(format!(
                "{}: index {index} is outside '{parameter}[{length}]'",
                NodeIdent::of(node)
            )))
        }
        None => {
            let index = cx.require_input(node, "Index")?;
            format!("int({})", cx.cast(node, &index, ValueType::Scalar)?)
        }
    };
    let output = cx.emit_output(node, "Output", ty)?;
    cx.assign(node, &output, format!("{parameter}[{subscript}]"))
}

/// Value of a `Scalar` node wired straight into `Index`
fn constant_index(cx: &EmitContext<'_>, node: &Node) -> Option<f32> {
    let port = node.input("Index")?;
    let edge = cx.graph.find_edge(port.id)?;
    match cx.graph.node(edge.from_node)?.kind {
        NodeKind::Scalar { value } => Some(value),
        _ => None,
    }
}

/// Texture lookup through a sampler built from the node's state
pub(super) fn sampler(cx: &mut EmitContext<'_>, node: &Node, state: &SamplerState) -> Result<()> {
    let texture = cx.require_input(node, "Texture")?;
    if !texture.ty.is_texture() {
        return Err(CompileError::expected(node, "Texture", "a texture", texture.ty));
    }
    let backend = cx.backend();
    let templates = cx
        .dialect
        .sample_templates(texture.ty)
        .ok_or_else(|| CompileError::unsupported(node, backend, format!("{} sampling", texture.ty)))?;

    let (sampler_type, template, coord_type, result) = if state.compare != CompareFunction::None {
        let (sampler_type, template, coord_type) = templates
            .sample_compare
            .ok_or_else(|| CompileError::unsupported(node, backend, "depth compare sampling"))?;
        (sampler_type, template, coord_type, ValueType::Scalar)
    } else {
        let template = if cx.in_vertex() || state.ignore_mips {
            templates.sample_lod
        } else if state.mip_bias != 0.0 {
            templates.sample_bias
        } else {
            Some(templates.sample)
        };
        let template =
            template.ok_or_else(|| CompileError::unsupported(node, backend, "explicit lod sampling"))?;
        (templates.sampler_type, template, templates.coord, ValueType::Vec4)
    };

    let coord = cx.require_input(node, "TexCoord")?;
    let coord = cx.cast(node, &coord, coord_type)?;
    let name = cx.declare_sampler(&texture, state, sampler_type);
    let expr = fill(
        template,
        &[
            ("texture", &texture.name),
            ("sampler", &name),
            ("coord", &coord),
            ("bias", &format_float(state.mip_bias)),
        ],
    );
    let output = cx.emit_output(node, "Output", result)?;
    cx.assign(node, &output, expr)
}

/// Size of a texture, supplied by the backend as a `vec4` uniform
pub(super) fn texture_size(cx: &mut EmitContext<'_>, node: &Node) -> Result<()> {
    let texture = cx.require_input(node, "Input")?;
    if !texture.ty.is_texture() {
        return Err(CompileError::expected(node, "Input", "a texture", texture.ty));
    }
    let name = format!("{}textureSize_{}", cx.dialect.reserved_prefix, texture.name);
    cx.declare_uniform(node, &name, ValueType::Vec4, None)?;
    cx.bind_output(node, "Output", Variable::new(name, ValueType::Vec4))?;
    Ok(())
}
