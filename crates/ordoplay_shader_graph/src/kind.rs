// SPDX-License-Identifier: MIT OR Apache-2.0
//! Catalog of shader node kinds.
//!
//! Every kind owns a fixed pin layout (except `Switch` and `Script`, whose
//! pins follow their configuration). The layout is built once when the node
//! is created; the compiler finds pins by name.

use crate::port::Port;
use crate::state::{RenderState, SamplerState};
use crate::value::{PortValue, ValueType};
use serde::{Deserialize, Serialize};

/// Node kind category, mirrors the grouping shown in the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Constants and parameters
    Input,
    /// Stage outputs
    Output,
    /// Scalar math
    Math,
    /// Vector and matrix algebra
    Vector,
    /// Texture access
    Texture,
    /// Branches and loops
    Logic,
    /// Stage inputs and built-ins
    Stage,
    /// User script
    Custom,
}

/// Comparison operator of conditional and discard nodes
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionalOperator {
    Less,
    LessEqual,
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
}

impl ConditionalOperator {
    /// Operator token
    pub fn token(self) -> &'static str {
        match self {
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
        }
    }
}

/// Hint on how a branch should be compiled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BranchHint {
    /// Let the target compiler decide
    #[default]
    Auto,
    /// Evaluate both sides and select (flatten)
    Static,
    /// Real dynamic branch
    Dynamic,
}

/// Screen-space derivative axis
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DerivativeAxis {
    X,
    Y,
}

/// Logarithm base
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogBase {
    Two,
    Ten,
    Natural,
}

/// Semantic of a vertex attribute
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataUsage {
    Position,
    Normal,
    Tangent,
    Binormal,
    Color,
    Custom,
}

impl DataUsage {
    /// Attribute base name
    pub fn attribute_name(self) -> &'static str {
        match self {
            Self::Position => "Position",
            Self::Normal => "Normal",
            Self::Tangent => "Tangent",
            Self::Binormal => "Binormal",
            Self::Color => "Color",
            Self::Custom => "Custom",
        }
    }
}

/// Typed pin of a script node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptPin {
    /// Pin (and parameter) name
    pub name: String,
    /// Declared type
    pub ty: ValueType,
}

impl ScriptPin {
    /// Create a new script pin
    pub fn new(name: impl Into<String>, ty: ValueType) -> Self {
        Self { name: name.into(), ty }
    }
}

/// A node kind together with its configuration.
///
/// Variant names are the persisted kind tags; pins are listed by
/// [`NodeKind::pin_layout`].
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Abs,
    Add,
    ArcusCos,
    ArcusTan,
    Clamp { min: f32, max: f32 },
    Color { rgba: [f32; 4] },
    Conditional { operator: ConditionalOperator, branch: BranchHint },
    Cos,
    Cross,
    Derivative { axis: DerivativeAxis },
    Discard { operator: ConditionalOperator },
    Div,
    Dot,
    Exp,
    Fraction,
    FragmentPosition,
    FrontFace,
    IndexedUniform { parameter: String, ty: ValueType, length: u32 },
    Instance,
    Interpolator,
    Iterate { from: i32, to: i32 },
    Iterate2d { from_x: i32, to_x: i32, from_y: i32, to_y: i32 },
    Length,
    Lerp,
    Log { base: LogBase },
    MatrixIn,
    MatrixOut,
    Max,
    Min,
    MixIn,
    MixOut,
    Mul,
    MulAdd,
    Neg,
    Normalize,
    PixelOutput { state: RenderState },
    Polynomial,
    Pow,
    Reflect,
    RecipSqrt,
    Repeat,
    Round,
    Sampler { state: SamplerState },
    Scalar { value: f32 },
    Script { name: String, body: String, inputs: Vec<ScriptPin>, outputs: Vec<ScriptPin> },
    Sign,
    Sin,
    Sqrt,
    Step,
    Sub,
    Sum { from: i32, to: i32 },
    Swizzle { pattern: String },
    Switch { cases: Vec<i32>, branch: BranchHint },
    Tan,
    TargetSize,
    TextureSize,
    Transform,
    Transpose,
    Truncate,
    Uniform { parameter: String, ty: ValueType },
    Vector { value: [f32; 4] },
    VertexInput { name: String, usage: DataUsage, ty: ValueType, index: u32 },
    VertexOutput,
    /// A kind authored by a newer editor that this version does not know
    External { type_name: String },
}

const UNARY: &[&str] = &["Input"];
const BINARY: &[&str] = &["Input1", "Input2"];
const THETA: &[&str] = &["Theta"];
const OUTPUT: &[&str] = &["Output"];

fn inputs(names: &[&str]) -> Vec<Port> {
    names.iter().map(|name| Port::input(*name)).collect()
}

fn outputs(names: &[&str]) -> Vec<Port> {
    names.iter().map(|name| Port::output(*name)).collect()
}

impl NodeKind {
    /// Stable tag used in diagnostics and persisted graphs
    pub fn type_name(&self) -> &str {
        match self {
            Self::Abs => "Abs",
            Self::Add => "Add",
            Self::ArcusCos => "ArcusCos",
            Self::ArcusTan => "ArcusTan",
            Self::Clamp { .. } => "Clamp",
            Self::Color { .. } => "Color",
            Self::Conditional { .. } => "Conditional",
            Self::Cos => "Cos",
            Self::Cross => "Cross",
            Self::Derivative { .. } => "Derivative",
            Self::Discard { .. } => "Discard",
            Self::Div => "Div",
            Self::Dot => "Dot",
            Self::Exp => "Exp",
            Self::Fraction => "Fraction",
            Self::FragmentPosition => "FragmentPosition",
            Self::FrontFace => "FrontFace",
            Self::IndexedUniform { .. } => "IndexedUniform",
            Self::Instance => "Instance",
            Self::Interpolator => "Interpolator",
            Self::Iterate { .. } => "Iterate",
            Self::Iterate2d { .. } => "Iterate2d",
            Self::Length => "Length",
            Self::Lerp => "Lerp",
            Self::Log { .. } => "Log",
            Self::MatrixIn => "MatrixIn",
            Self::MatrixOut => "MatrixOut",
            Self::Max => "Max",
            Self::Min => "Min",
            Self::MixIn => "MixIn",
            Self::MixOut => "MixOut",
            Self::Mul => "Mul",
            Self::MulAdd => "MulAdd",
            Self::Neg => "Neg",
            Self::Normalize => "Normalize",
            Self::PixelOutput { .. } => "PixelOutput",
            Self::Polynomial => "Polynomial",
            Self::Pow => "Pow",
            Self::Reflect => "Reflect",
            Self::RecipSqrt => "RecipSqrt",
            Self::Repeat => "Repeat",
            Self::Round => "Round",
            Self::Sampler { .. } => "Sampler",
            Self::Scalar { .. } => "Scalar",
            Self::Script { .. } => "Script",
            Self::Sign => "Sign",
            Self::Sin => "Sin",
            Self::Sqrt => "Sqrt",
            Self::Step => "Step",
            Self::Sub => "Sub",
            Self::Sum { .. } => "Sum",
            Self::Swizzle { .. } => "Swizzle",
            Self::Switch { .. } => "Switch",
            Self::Tan => "Tan",
            Self::TargetSize => "TargetSize",
            Self::TextureSize => "TextureSize",
            Self::Transform => "Transform",
            Self::Transpose => "Transpose",
            Self::Truncate => "Truncate",
            Self::Uniform { .. } => "Uniform",
            Self::Vector { .. } => "Vector",
            Self::VertexInput { .. } => "VertexInput",
            Self::VertexOutput => "VertexOutput",
            Self::External { type_name } => type_name,
        }
    }

    /// Category shown in the editor
    pub fn category(&self) -> NodeCategory {
        match self {
            Self::Color { .. }
            | Self::Scalar { .. }
            | Self::Vector { .. }
            | Self::Uniform { .. }
            | Self::IndexedUniform { .. } => NodeCategory::Input,
            Self::PixelOutput { .. } | Self::VertexOutput => NodeCategory::Output,
            Self::Cross
            | Self::Dot
            | Self::Length
            | Self::Normalize
            | Self::Reflect
            | Self::MatrixIn
            | Self::MatrixOut
            | Self::MixIn
            | Self::MixOut
            | Self::Swizzle { .. }
            | Self::Transform
            | Self::Transpose => NodeCategory::Vector,
            Self::Sampler { .. } | Self::TextureSize => NodeCategory::Texture,
            Self::Conditional { .. }
            | Self::Switch { .. }
            | Self::Discard { .. }
            | Self::Iterate { .. }
            | Self::Iterate2d { .. }
            | Self::Repeat
            | Self::Sum { .. } => NodeCategory::Logic,
            Self::VertexInput { .. }
            | Self::Interpolator
            | Self::FragmentPosition
            | Self::FrontFace
            | Self::Instance
            | Self::TargetSize => NodeCategory::Stage,
            Self::Script { .. } | Self::External { .. } => NodeCategory::Custom,
            _ => NodeCategory::Math,
        }
    }

    /// Whether the kind evaluates its `Input` subgraph inside a generated loop
    pub fn is_loop(&self) -> bool {
        matches!(
            self,
            Self::Iterate { .. } | Self::Iterate2d { .. } | Self::Repeat | Self::Sum { .. }
        )
    }

    /// Build the input and output pins for this kind
    pub fn pin_layout(&self) -> (Vec<Port>, Vec<Port>) {
        match self {
            Self::Abs
            | Self::Exp
            | Self::Fraction
            | Self::Length
            | Self::Neg
            | Self::Normalize
            | Self::RecipSqrt
            | Self::Round
            | Self::Sign
            | Self::Sqrt
            | Self::Transpose
            | Self::Truncate
            | Self::Clamp { .. }
            | Self::Derivative { .. }
            | Self::Log { .. }
            | Self::Swizzle { .. }
            | Self::Interpolator
            | Self::TextureSize => (inputs(UNARY), outputs(OUTPUT)),
            Self::Add
            | Self::Sub
            | Self::Mul
            | Self::Div
            | Self::Min
            | Self::Max
            | Self::Dot
            | Self::Cross => (inputs(BINARY), outputs(OUTPUT)),
            Self::ArcusCos | Self::Cos | Self::Sin | Self::Tan => (inputs(THETA), outputs(OUTPUT)),
            Self::ArcusTan => (inputs(&["XY"]), outputs(OUTPUT)),
            Self::Color { .. }
            | Self::Scalar { .. }
            | Self::Vector { .. }
            | Self::Uniform { .. }
            | Self::FragmentPosition
            | Self::FrontFace
            | Self::Instance
            | Self::TargetSize
            | Self::VertexInput { .. } => (Vec::new(), outputs(OUTPUT)),
            Self::Conditional { .. } => (
                inputs(&["Input", "Reference", "CaseTrue", "CaseFalse"]),
                outputs(OUTPUT),
            ),
            Self::Discard { .. } => (inputs(&["Input", "Reference", "Pass"]), outputs(OUTPUT)),
            Self::IndexedUniform { .. } => (inputs(&["Index"]), outputs(OUTPUT)),
            Self::Iterate { .. } => (loop_inputs(false), outputs(&["N", "Output"])),
            Self::Iterate2d { .. } => (loop_inputs(false), outputs(&["X", "Y", "Output"])),
            Self::Repeat => (loop_inputs(true), outputs(&["N", "Output"])),
            Self::Sum { .. } => (inputs(UNARY), outputs(&["N", "Output"])),
            Self::Lerp => (inputs(&["Input1", "Input2", "Blend"]), outputs(OUTPUT)),
            Self::MatrixIn => (
                vec![
                    Port::input("XAxis").with_default(PortValue::Vector4([1.0, 0.0, 0.0, 0.0])),
                    Port::input("YAxis").with_default(PortValue::Vector4([0.0, 1.0, 0.0, 0.0])),
                    Port::input("ZAxis").with_default(PortValue::Vector4([0.0, 0.0, 1.0, 0.0])),
                    Port::input("Translate").with_default(PortValue::Vector4([0.0, 0.0, 0.0, 1.0])),
                ],
                outputs(OUTPUT),
            ),
            Self::MatrixOut => (inputs(UNARY), outputs(&["XAxis", "YAxis", "ZAxis", "Translate"])),
            Self::MixIn => (
                ["X", "Y", "Z", "W"].iter().map(|n| Port::input(*n).optional()).collect(),
                outputs(OUTPUT),
            ),
            Self::MixOut => (inputs(UNARY), outputs(&["X", "Y", "Z", "W"])),
            Self::MulAdd => (inputs(&["Input1", "Input2", "Input3"]), outputs(OUTPUT)),
            Self::PixelOutput { .. } => (
                vec![
                    Port::input("Input"),
                    Port::input("Input1").optional(),
                    Port::input("Input2").optional(),
                    Port::input("Input3").optional(),
                ],
                Vec::new(),
            ),
            Self::Polynomial => (inputs(&["X", "Coefficients"]), outputs(OUTPUT)),
            Self::Pow => (inputs(&["Exponent", "Input"]), outputs(OUTPUT)),
            Self::Reflect => (inputs(&["Normal", "Direction"]), outputs(OUTPUT)),
            Self::Sampler { .. } => (inputs(&["Texture", "TexCoord"]), outputs(OUTPUT)),
            Self::Script { inputs: ins, outputs: outs, .. } => (
                ins.iter().map(|p| Port::input(p.name.clone())).collect(),
                outs.iter().map(|p| Port::output(p.name.clone())).collect(),
            ),
            Self::Step => (inputs(&["X", "Y"]), outputs(OUTPUT)),
            Self::Switch { cases, .. } => {
                let mut ins = inputs(&["Select", "Default"]);
                ins.extend(cases.iter().map(|value| Port::input(switch_case_pin(*value))));
                (ins, outputs(OUTPUT))
            }
            Self::Transform => (inputs(&["Input", "Transform"]), outputs(OUTPUT)),
            Self::VertexOutput => (inputs(UNARY), Vec::new()),
            Self::External { .. } => (Vec::new(), Vec::new()),
        }
    }
}

/// Name of the switch input pin selected by `value`
pub fn switch_case_pin(value: i32) -> String {
    format!("Case {value}")
}

fn loop_inputs(condition_required: bool) -> Vec<Port> {
    let condition = if condition_required {
        Port::input("Condition")
    } else {
        Port::input("Condition").optional()
    };
    vec![
        Port::input("Input"),
        Port::input("Initial").optional(),
        condition,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_names_unique() {
        let kinds = [
            NodeKind::Conditional { operator: ConditionalOperator::Less, branch: BranchHint::Auto },
            NodeKind::Iterate2d { from_x: 0, to_x: 1, from_y: 0, to_y: 1 },
            NodeKind::Switch { cases: vec![0, 1, 2], branch: BranchHint::Auto },
            NodeKind::MatrixOut,
            NodeKind::PixelOutput { state: RenderState::default() },
        ];
        for kind in kinds {
            let (ins, outs) = kind.pin_layout();
            for pins in [ins, outs] {
                let mut names: Vec<_> = pins.iter().map(|p| p.name.clone()).collect();
                let total = names.len();
                names.sort();
                names.dedup();
                assert_eq!(names.len(), total, "{}", kind.type_name());
            }
        }
    }

    #[test]
    fn test_switch_pins_follow_cases() {
        let (ins, _) = NodeKind::Switch { cases: vec![3, 7], branch: BranchHint::Auto }.pin_layout();
        let names: Vec<_> = ins.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Select", "Default", "Case 3", "Case 7"]);
    }

    #[test]
    fn test_operator_tokens() {
        assert_eq!(ConditionalOperator::GreaterEqual.token(), ">=");
        assert_eq!(ConditionalOperator::NotEqual.token(), "!=");
    }

    #[test]
    fn test_external_type_name() {
        let kind = NodeKind::External { type_name: "Ballot".to_string() };
        assert_eq!(kind.type_name(), "Ballot");
        assert_eq!(kind.category(), NodeCategory::Custom);
    }
}
