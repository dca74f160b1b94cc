// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node emitters.
//!
//! One routine per node kind, selected by an exhaustive match so a new kind
//! cannot be added to the graph crate without the compiler noticing.

mod control;
mod math;
mod resource;
mod script;
mod stage;

use crate::context::EmitContext;
use crate::error::{CompileError, NodeIdent, Result};
use crate::variable::Variable;
use ordoplay_shader_graph::{Node, NodeKind, ValueType};

/// Emit `node` into the current stage, binding its outputs
pub(crate) fn emit_node(cx: &mut EmitContext<'_>, node: &Node) -> Result<()> {
    let dialect = cx.dialect;
    match &node.kind {
        NodeKind::Abs => math::intrinsic(cx, node, "abs"),
        NodeKind::Exp => math::intrinsic(cx, node, "exp"),
        NodeKind::Fraction => math::intrinsic(cx, node, dialect.fract),
        NodeKind::Normalize => math::intrinsic(cx, node, "normalize"),
        NodeKind::RecipSqrt => math::intrinsic(cx, node, dialect.rsqrt),
        NodeKind::Sign => math::intrinsic(cx, node, "sign"),
        NodeKind::Sqrt => math::intrinsic(cx, node, "sqrt"),
        NodeKind::Neg => math::negate(cx, node),
        NodeKind::Round => math::round(cx, node),
        NodeKind::Truncate => math::truncate(cx, node),
        NodeKind::Log { base } => math::log(cx, node, *base),
        NodeKind::Length => math::length(cx, node),
        NodeKind::Clamp { min, max } => math::clamp(cx, node, *min, *max),
        NodeKind::Derivative { axis } => math::derivative(cx, node, *axis),

        NodeKind::Sin => math::trig(cx, node, "sin"),
        NodeKind::Cos => math::trig(cx, node, "cos"),
        NodeKind::Tan => math::trig(cx, node, "tan"),
        NodeKind::ArcusCos => math::trig(cx, node, "acos"),
        NodeKind::ArcusTan => math::arcus_tan(cx, node),

        NodeKind::Add => math::arithmetic(cx, node, "+"),
        NodeKind::Sub => math::arithmetic(cx, node, "-"),
        NodeKind::Mul => math::arithmetic(cx, node, "*"),
        NodeKind::Div => math::arithmetic(cx, node, "/"),
        NodeKind::Min => math::binary_function(cx, node, "min", ["Input1", "Input2"]),
        NodeKind::Max => math::binary_function(cx, node, "max", ["Input1", "Input2"]),
        NodeKind::Step => math::binary_function(cx, node, "step", ["X", "Y"]),
        NodeKind::MulAdd => math::mul_add(cx, node),
        NodeKind::Lerp => math::lerp(cx, node),
        NodeKind::Pow => math::pow(cx, node),
        NodeKind::Polynomial => math::polynomial(cx, node),

        NodeKind::Dot => math::dot(cx, node),
        NodeKind::Cross => math::cross(cx, node),
        NodeKind::Reflect => math::reflect(cx, node),
        NodeKind::Swizzle { pattern } => math::swizzle(cx, node, pattern),
        NodeKind::MixIn => math::mix_in(cx, node),
        NodeKind::MixOut => math::mix_out(cx, node),
        NodeKind::MatrixIn => math::matrix_in(cx, node),
        NodeKind::MatrixOut => math::matrix_out(cx, node),
        NodeKind::Transform => math::transform(cx, node),
        NodeKind::Transpose => math::transpose(cx, node),

        NodeKind::Scalar { value } => math::constant(cx, node, &[*value]),
        NodeKind::Vector { value } => math::constant(cx, node, value),
        NodeKind::Color { rgba } => math::constant(cx, node, rgba),

        NodeKind::Conditional { operator, branch } => control::conditional(cx, node, *operator, *branch),
        NodeKind::Switch { cases, branch } => control::switch(cx, node, cases, *branch),
        NodeKind::Discard { operator } => control::discard(cx, node, *operator),
        NodeKind::Iterate { from, to } => control::iterate(cx, node, &[("N", *from, *to)], false),
        NodeKind::Iterate2d {
            from_x,
            to_x,
            from_y,
            to_y,
        } => control::iterate(cx, node, &[("X", *from_x, *to_x), ("Y", *from_y, *to_y)], false),
        NodeKind::Sum { from, to } => control::iterate(cx, node, &[("N", *from, *to)], true),
        NodeKind::Repeat => control::repeat(cx, node),

        NodeKind::VertexInput {
            name,
            usage,
            ty,
            index,
        } => stage::vertex_input(cx, node, name, *usage, *ty, *index),
        NodeKind::VertexOutput => stage::vertex_output(cx, node),
        NodeKind::PixelOutput { state } => stage::pixel_output(cx, node, state),
        NodeKind::Interpolator => stage::interpolator(cx, node),
        NodeKind::FragmentPosition => stage::fragment_position(cx, node),
        NodeKind::FrontFace => stage::front_face(cx, node),
        NodeKind::Instance => stage::instance(cx, node),
        NodeKind::TargetSize => stage::target_size(cx, node),

        NodeKind::Uniform { parameter, ty } => resource::uniform(cx, node, parameter, *ty),
        NodeKind::IndexedUniform { parameter, ty, length } => {
            resource::indexed_uniform(cx, node, parameter, *ty, *length)
        }
        NodeKind::Sampler { state } => resource::sampler(cx, node, state),
        NodeKind::TextureSize => resource::texture_size(cx, node),

        NodeKind::Script {
            name,
            body,
            inputs,
            outputs,
        } => script::script(cx, node, name, body, inputs, outputs),

        NodeKind::External { .. } => Err(CompileError::UnknownNodeKind {
            node: NodeIdent::of(node),
        }),
    }
}

/// Input that must be a scalar or vector
fn vector_input(cx: &mut EmitContext<'_>, node: &Node, pin: &str) -> Result<Variable> {
    let input = cx.require_input(node, pin)?;
    if input.ty.is_vector() {
        Ok(input)
    } else {
        Err(CompileError::expected(node, pin, "a scalar or vector", input.ty))
    }
}

/// Input that must be a scalar
fn scalar_input(cx: &mut EmitContext<'_>, node: &Node, pin: &str) -> Result<Variable> {
    let input = cx.require_input(node, pin)?;
    if input.ty == ValueType::Scalar {
        Ok(input)
    } else {
        Err(CompileError::expected(node, pin, "a scalar", input.ty))
    }
}

/// Input converted to a scalar expression, for comparisons and selectors
fn scalar_operand(cx: &mut EmitContext<'_>, node: &Node, pin: &str) -> Result<String> {
    let input = cx.require_input(node, pin)?;
    cx.cast(node, &input, ValueType::Scalar)
}
