// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pure expression nodes: arithmetic, intrinsics, vector and matrix algebra,
//! constants.

use super::{scalar_input, vector_input};
use crate::context::EmitContext;
use crate::dialect::{fill, format_float};
use crate::error::{CompileError, NodeIdent, Result};
use crate::variable::Variable;
use ordoplay_shader_graph::{DerivativeAxis, LogBase, Node, ValueType};

const LOG10_2: &str = "0.30103";
const COMPONENTS: [&str; 4] = ["X", "Y", "Z", "W"];
const AXES: [&str; 4] = ["XAxis", "YAxis", "ZAxis", "Translate"];

pub(super) fn intrinsic(cx: &mut EmitContext<'_>, node: &Node, function: &str) -> Result<()> {
    let input = vector_input(cx, node, "Input")?;
    let output = cx.emit_output(node, "Output", input.ty)?;
    cx.assign(node, &output, format!("{function}({})", input.name))
}

pub(super) fn negate(cx: &mut EmitContext<'_>, node: &Node) -> Result<()> {
    let input = cx.require_input(node, "Input")?;
    if !input.ty.is_vector() && input.ty != ValueType::Matrix4 {
        return Err(CompileError::expected(node, "Input", "a vector or matrix", input.ty));
    }
    let output = cx.emit_output(node, "Output", input.ty)?;
    cx.assign(node, &output, format!("-{}", input.name))
}

pub(super) fn round(cx: &mut EmitContext<'_>, node: &Node) -> Result<()> {
    let input = vector_input(cx, node, "Input")?;
    let expr = match cx.dialect.round {
        Some(function) => format!("{function}({})", input.name),
        None => {
            let half = cx.dialect.scalar_literal(input.ty, 0.5);
            format!("floor({} + {half})", input.name)
        }
    };
    let output = cx.emit_output(node, "Output", input.ty)?;
    cx.assign(node, &output, expr)
}

pub(super) fn truncate(cx: &mut EmitContext<'_>, node: &Node) -> Result<()> {
    let input = vector_input(cx, node, "Input")?;
    let expr = match cx.dialect.trunc {
        Some(function) => format!("{function}({})", input.name),
        None => format!("sign({0}) * floor(abs({0}))", input.name),
    };
    let output = cx.emit_output(node, "Output", input.ty)?;
    cx.assign(node, &output, expr)
}

pub(super) fn log(cx: &mut EmitContext<'_>, node: &Node, base: LogBase) -> Result<()> {
    let input = vector_input(cx, node, "Input")?;
    let expr = match (base, cx.dialect.log10) {
        (LogBase::Two, _) => format!("log2({})", input.name),
        (LogBase::Natural, _) => format!("log({})", input.name),
        (LogBase::Ten, Some(function)) => format!("{function}({})", input.name),
        (LogBase::Ten, None) => format!("log2({}) * {LOG10_2}", input.name),
    };
    let output = cx.emit_output(node, "Output", input.ty)?;
    cx.assign(node, &output, expr)
}

pub(super) fn length(cx: &mut EmitContext<'_>, node: &Node) -> Result<()> {
    let input = vector_input(cx, node, "Input")?;
    let output = cx.emit_output(node, "Output", ValueType::Scalar)?;
    cx.assign(node, &output, format!("length({})", input.name))
}

pub(super) fn clamp(cx: &mut EmitContext<'_>, node: &Node, min: f32, max: f32) -> Result<()> {
    let input = vector_input(cx, node, "Input")?;
    let output = cx.emit_output(node, "Output", input.ty)?;
    cx.assign(
        node,
        &output,
        format!("clamp({}, {}, {})", input.name, format_float(min), format_float(max)),
    )
}

pub(super) fn derivative(cx: &mut EmitContext<'_>, node: &Node, axis: DerivativeAxis) -> Result<()> {
    cx.require_pixel(node)?;
    let input = vector_input(cx, node, "Input")?;
    cx.requirements.derivatives = true;
    let function = match axis {
        DerivativeAxis::X => cx.dialect.ddx,
        DerivativeAxis::Y => cx.dialect.ddy,
    };
    let output = cx.emit_output(node, "Output", input.ty)?;
    cx.assign(node, &output, format!("{function}({})", input.name))
}

pub(super) fn trig(cx: &mut EmitContext<'_>, node: &Node, function: &str) -> Result<()> {
    let theta = scalar_input(cx, node, "Theta")?;
    let output = cx.emit_output(node, "Output", ValueType::Scalar)?;
    cx.assign(node, &output, format!("{function}({})", theta.name))
}

pub(super) fn arcus_tan(cx: &mut EmitContext<'_>, node: &Node) -> Result<()> {
    let xy = cx.require_input(node, "XY")?;
    if xy.ty != ValueType::Vec2 {
        return Err(CompileError::expected(node, "XY", "a vec2", xy.ty));
    }
    let atan2 = cx.dialect.atan2;
    let output = cx.emit_output(node, "Output", ValueType::Scalar)?;
    cx.assign(node, &output, format!("{atan2}({0}.x, {0}.y)", xy.name))
}

pub(super) fn arithmetic(cx: &mut EmitContext<'_>, node: &Node, operator: &str) -> Result<()> {
    let lhs = cx.require_input(node, "Input1")?;
    let rhs = cx.require_input(node, "Input2")?;
    let ty = cx.common_type(node, &[&lhs, &rhs])?;
    let left = cx.cast(node, &lhs, ty)?;
    let right = cx.cast(node, &rhs, ty)?;

    let expr = if operator == "*" && ty == ValueType::Matrix4 {
        fill(cx.dialect.matrix_multiply, &[("left", &left), ("right", &right)])
    } else {
        format!("{left} {operator} {right}")
    };
    let output = cx.emit_output(node, "Output", ty)?;
    cx.assign(node, &output, expr)
}

pub(super) fn binary_function(
    cx: &mut EmitContext<'_>,
    node: &Node,
    function: &str,
    pins: [&str; 2],
) -> Result<()> {
    let a = vector_input(cx, node, pins[0])?;
    let b = vector_input(cx, node, pins[1])?;
    let ty = cx.common_type(node, &[&a, &b])?;
    let expr = format!("{function}({}, {})", cx.cast(node, &a, ty)?, cx.cast(node, &b, ty)?);
    let output = cx.emit_output(node, "Output", ty)?;
    cx.assign(node, &output, expr)
}

pub(super) fn mul_add(cx: &mut EmitContext<'_>, node: &Node) -> Result<()> {
    let a = vector_input(cx, node, "Input1")?;
    let b = vector_input(cx, node, "Input2")?;
    let c = vector_input(cx, node, "Input3")?;
    let ty = cx.common_type(node, &[&a, &b, &c])?;
    let expr = format!(
        "{} * {} + {}",
        cx.cast(node, &a, ty)?,
        cx.cast(node, &b, ty)?,
        cx.cast(node, &c, ty)?
    );
    let output = cx.emit_output(node, "Output", ty)?;
    cx.assign(node, &output, expr)
}

pub(super) fn lerp(cx: &mut EmitContext<'_>, node: &Node) -> Result<()> {
    let a = vector_input(cx, node, "Input1")?;
    let b = vector_input(cx, node, "Input2")?;
    let blend = vector_input(cx, node, "Blend")?;
    let ty = cx.common_type(node, &[&a, &b])?;
    let weight = if blend.ty == ValueType::Scalar {
        blend.name.clone()
    } else {
        cx.cast(node, &blend, ty)?
    };
    let expr = format!(
        "{}({}, {}, {weight})",
        cx.dialect.lerp,
        cx.cast(node, &a, ty)?,
        cx.cast(node, &b, ty)?
    );
    let output = cx.emit_output(node, "Output", ty)?;
    cx.assign(node, &output, expr)
}

pub(super) fn pow(cx: &mut EmitContext<'_>, node: &Node) -> Result<()> {
    let exponent = vector_input(cx, node, "Exponent")?;
    let input = vector_input(cx, node, "Input")?;
    let ty = cx.common_type(node, &[&exponent, &input])?;
    let zero = cx.dialect.scalar_literal(ty, 0.0);
    let expr = format!(
        "pow(max({}, {zero}), {})",
        cx.cast(node, &input, ty)?,
        cx.cast(node, &exponent, ty)?
    );
    let output = cx.emit_output(node, "Output", ty)?;
    cx.assign(node, &output, expr)
}

/// Horner form `c.x + x * (c.y + x * (...))` over the coefficient components
pub(super) fn polynomial(cx: &mut EmitContext<'_>, node: &Node) -> Result<()> {
    let x = vector_input(cx, node, "X")?;
    let coefficients = vector_input(cx, node, "Coefficients")?;
    let terms: Vec<String> = match coefficients.ty.components() {
        Some(1) => vec![coefficients.name.clone()],
        Some(n) => ["x", "y", "z", "w"][..n]
            .iter()
            .map(|c| format!("{}.{c}", coefficients.name))
            .collect(),
        None => return Err(CompileError::expected(node, "Coefficients", "a vector", coefficients.ty)),
    };

    let mut expr = String::new();
    for (i, term) in terms.iter().enumerate().rev() {
        expr = if i + 1 == terms.len() {
            term.clone()
        } else {
            format!("{term} + {} * ({expr})", x.name)
        };
    }
    if terms.len() == 1 && x.ty != ValueType::Scalar {
        expr = cx.dialect.splat(x.ty, &expr);
    }

    let output = cx.emit_output(node, "Output", x.ty)?;
    cx.assign(node, &output, expr)
}

pub(super) fn dot(cx: &mut EmitContext<'_>, node: &Node) -> Result<()> {
    let a = vector_input(cx, node, "Input1")?;
    let b = vector_input(cx, node, "Input2")?;
    let ty = cx.common_type(node, &[&a, &b])?;
    let expr = format!("dot({}, {})", cx.cast(node, &a, ty)?, cx.cast(node, &b, ty)?);
    let output = cx.emit_output(node, "Output", ValueType::Scalar)?;
    cx.assign(node, &output, expr)
}

pub(super) fn cross(cx: &mut EmitContext<'_>, node: &Node) -> Result<()> {
    let a = vector_input(cx, node, "Input1")?;
    let b = vector_input(cx, node, "Input2")?;
    let expr = format!(
        "cross({}, {})",
        cx.cast(node, &a, ValueType::Vec3)?,
        cx.cast(node, &b, ValueType::Vec3)?
    );
    let output = cx.emit_output(node, "Output", ValueType::Vec3)?;
    cx.assign(node, &output, expr)
}

pub(super) fn reflect(cx: &mut EmitContext<'_>, node: &Node) -> Result<()> {
    let normal = vector_input(cx, node, "Normal")?;
    let direction = vector_input(cx, node, "Direction")?;
    let expr = format!(
        "reflect({}, {})",
        direction.name,
        cx.cast(node, &normal, direction.ty)?
    );
    let output = cx.emit_output(node, "Output", direction.ty)?;
    cx.assign(node, &output, expr)
}

/// Component selection with `x`, `y`, `z`, `w`, `0` and `1`
pub(super) fn swizzle(cx: &mut EmitContext<'_>, node: &Node, pattern: &str) -> Result<()> {
    let input = vector_input(cx, node, "Input")?;
    let pattern = pattern.to_ascii_lowercase();
    let ty = ValueType::with_components(pattern.len()).ok_or_else(|| {
        CompileError::type_mismatch(node, format!("swizzle '{pattern}' must have 1 to 4 components"))
    })?;
    let width = input.ty.components().unwrap_or(1);

    let mut components = Vec::with_capacity(pattern.len());
    let mut constant = false;
    for c in pattern.chars() {
        let component = match c {
            '0' | '1' => {
                constant = true;
                format!("{c}.0")
            }
            'x' | 'y' | 'z' | 'w' => {
                let index = "xyzw".find(c).unwrap_or(0);
                if index >= width {
                    return Err(CompileError::type_mismatch(
                        node,
                        format!("swizzle '{pattern}' reads '{c}' from a {}", input.ty),
                    ));
                }
                if input.ty == ValueType::Scalar {
                    input.name.clone()
                } else {
                    format!("{}.{c}", input.name)
                }
            }
            _ => {
                return Err(CompileError::type_mismatch(
                    node,
                    format!("swizzle '{pattern}' has invalid component '{c}'"),
                ))
            }
        };
        components.push(component);
    }

    if ty == input.ty && "xyzw".starts_with(pattern.as_str()) {
        cx.bind_output(node, "Output", input)?;
        return Ok(());
    }

    let expr = if constant || input.ty == ValueType::Scalar {
        if ty == ValueType::Scalar {
            components.remove(0)
        } else {
            cx.dialect.construct(ty, &components)
        }
    } else {
        format!("{}.{pattern}", input.name)
    };
    let output = cx.emit_output(node, "Output", ty)?;
    cx.assign(node, &output, expr)
}

/// Vector built from scalar pins; width follows the highest connected pin
pub(super) fn mix_in(cx: &mut EmitContext<'_>, node: &Node) -> Result<()> {
    let mut values = Vec::with_capacity(COMPONENTS.len());
    for pin in COMPONENTS {
        values.push(cx.emit_input(node, pin)?);
    }
    let Some(width) = values.iter().rposition(Option::is_some).map(|i| i + 1) else {
        return Err(CompileError::MissingInput {
            node: NodeIdent::of(node),
            pin: COMPONENTS[0].to_string(),
        });
    };

    let mut components = Vec::with_capacity(width);
    for (pin, value) in COMPONENTS.iter().zip(&values).take(width) {
        components.push(match value {
            Some(value) if value.ty.is_vector() => cx.cast(node, value, ValueType::Scalar)?,
            Some(value) => return Err(CompileError::expected(node, pin, "a scalar", value.ty)),
            None => "0.0".to_string(),
        });
    }

    let ty = ValueType::with_components(width).unwrap_or(ValueType::Scalar);
    let expr = if width == 1 {
        components.remove(0)
    } else {
        cx.dialect.construct(ty, &components)
    };
    let output = cx.emit_output(node, "Output", ty)?;
    cx.assign(node, &output, expr)
}

/// Binds one scalar output per component of the input
pub(super) fn mix_out(cx: &mut EmitContext<'_>, node: &Node) -> Result<()> {
    let input = vector_input(cx, node, "Input")?;
    let width = input.ty.components().unwrap_or(1);
    if width == 1 {
        cx.bind_output(node, "X", input)?;
        return Ok(());
    }
    for (pin, c) in COMPONENTS.iter().zip(["x", "y", "z", "w"]).take(width) {
        let component = Variable::new(format!("{}.{c}", input.name), ValueType::Scalar);
        cx.bind_output(node, pin, component)?;
    }
    Ok(())
}

pub(super) fn matrix_in(cx: &mut EmitContext<'_>, node: &Node) -> Result<()> {
    let mut columns = Vec::with_capacity(AXES.len());
    for pin in AXES {
        let axis = vector_input(cx, node, pin)?;
        columns.push(cx.cast(node, &axis, ValueType::Vec4)?);
    }
    let expr = cx.dialect.construct(ValueType::Matrix4, &columns);
    let output = cx.emit_output(node, "Output", ValueType::Matrix4)?;
    cx.assign(node, &output, expr)
}

pub(super) fn matrix_out(cx: &mut EmitContext<'_>, node: &Node) -> Result<()> {
    let input = cx.require_input(node, "Input")?;
    if input.ty != ValueType::Matrix4 {
        return Err(CompileError::expected(node, "Input", "a matrix", input.ty));
    }
    for (i, pin) in AXES.iter().enumerate() {
        let output = cx.emit_output(node, pin, ValueType::Vec4)?;
        cx.assign(node, &output, format!("{}[{i}]", input.name))?;
    }
    Ok(())
}

pub(super) fn transform(cx: &mut EmitContext<'_>, node: &Node) -> Result<()> {
    let input = vector_input(cx, node, "Input")?;
    let matrix = cx.require_input(node, "Transform")?;
    if matrix.ty != ValueType::Matrix4 {
        return Err(CompileError::expected(node, "Transform", "a matrix", matrix.ty));
    }
    let vector = cx.cast(node, &input, ValueType::Vec4)?;
    let expr = fill(cx.dialect.transform, &[("matrix", &matrix.name), ("vector", &vector)]);
    let output = cx.emit_output(node, "Output", ValueType::Vec4)?;
    cx.assign(node, &output, expr)
}

pub(super) fn transpose(cx: &mut EmitContext<'_>, node: &Node) -> Result<()> {
    let Some(function) = cx.dialect.transpose else {
        return Err(CompileError::unsupported(node, cx.backend(), "matrix transpose"));
    };
    let input = cx.require_input(node, "Input")?;
    if input.ty != ValueType::Matrix4 {
        return Err(CompileError::expected(node, "Input", "a matrix", input.ty));
    }
    cx.requirements.transpose = true;
    let output = cx.emit_output(node, "Output", ValueType::Matrix4)?;
    cx.assign(node, &output, format!("{function}({})", input.name))
}

/// Scalar, vector and color literals, declared `const`
pub(super) fn constant(cx: &mut EmitContext<'_>, node: &Node, components: &[f32]) -> Result<()> {
    let ty = ValueType::with_components(components.len()).unwrap_or(ValueType::Scalar);
    let literal = cx.dialect.vector_literal(components);
    let output = cx.emit_output(node, "Output", ty)?;
    let type_name = cx.type_name(node, ty)?;
    cx.body().line(format!("const {type_name} {} = {literal};", output.name));
    Ok(())
}
