// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fixed-function state carried by output and sampler nodes.
//!
//! These records are not expressible as shader text; the compiler copies
//! them into the program artifact for the graphics backend.

use serde::{Deserialize, Serialize};

/// Face culling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CullMode {
    /// No culling
    Never,
    /// Cull clockwise faces
    ClockWise,
    /// Cull counter-clockwise faces
    #[default]
    CounterClockWise,
}

/// Blend equation
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BlendOperation {
    #[default]
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

/// Blend factor
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendFactor {
    One,
    Zero,
    SourceColor,
    OneMinusSourceColor,
    DestinationColor,
    OneMinusDestinationColor,
    SourceAlpha,
    OneMinusSourceAlpha,
    DestinationAlpha,
    OneMinusDestinationAlpha,
}

/// Comparison used by depth, stencil, alpha test and shadow samplers
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareFunction {
    Always,
    Never,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
    /// No comparison (regular sampling)
    None,
}

/// Stencil buffer operation
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StencilOperation {
    #[default]
    Keep,
    Zero,
    Replace,
    IncrementSaturate,
    DecrementSaturate,
    Invert,
    Increment,
    Decrement,
}

/// Texture filter
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Filter {
    Point,
    #[default]
    Linear,
}

/// Texture addressing
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Address {
    #[default]
    Wrap,
    Mirror,
    Clamp,
    Border,
}

/// Color channel write mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorWriteMask(pub u8);

#[allow(missing_docs)]
impl ColorWriteMask {
    pub const RED: Self = Self(1);
    pub const GREEN: Self = Self(2);
    pub const BLUE: Self = Self(4);
    pub const ALPHA: Self = Self(8);
    pub const RGB: Self = Self(1 | 2 | 4);
    pub const RGBA: Self = Self(1 | 2 | 4 | 8);

    /// Whether every channel in `other` is enabled
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for ColorWriteMask {
    fn default() -> Self {
        Self::RGBA
    }
}

/// Render state written by the pixel output node
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderState {
    pub cull_mode: CullMode,
    pub blend_enable: bool,
    pub blend_operation: BlendOperation,
    pub blend_source: BlendFactor,
    pub blend_destination: BlendFactor,
    pub color_write_mask: ColorWriteMask,
    pub depth_enable: bool,
    pub depth_write_enable: bool,
    pub depth_function: CompareFunction,
    pub alpha_test_enable: bool,
    pub alpha_test_function: CompareFunction,
    /// Alpha reference in 0..=255
    pub alpha_test_reference: u8,
    pub stencil_enable: bool,
    pub stencil_fail: StencilOperation,
    pub stencil_z_fail: StencilOperation,
    pub stencil_pass: StencilOperation,
    pub stencil_function: CompareFunction,
    pub stencil_reference: u32,
    pub stencil_mask: u32,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            cull_mode: CullMode::CounterClockWise,
            blend_enable: false,
            blend_operation: BlendOperation::Add,
            blend_source: BlendFactor::One,
            blend_destination: BlendFactor::Zero,
            color_write_mask: ColorWriteMask::RGBA,
            depth_enable: true,
            depth_write_enable: true,
            depth_function: CompareFunction::LessEqual,
            alpha_test_enable: false,
            alpha_test_function: CompareFunction::Less,
            alpha_test_reference: 128,
            stencil_enable: false,
            stencil_fail: StencilOperation::Keep,
            stencil_z_fail: StencilOperation::Keep,
            stencil_pass: StencilOperation::Keep,
            stencil_function: CompareFunction::Always,
            stencil_reference: 0,
            stencil_mask: 0xffff_ffff,
        }
    }
}

/// Sampler state attached to a sampler node
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerState {
    pub min_filter: Filter,
    pub mip_filter: Filter,
    pub mag_filter: Filter,
    pub address_u: Address,
    pub address_v: Address,
    pub address_w: Address,
    pub compare: CompareFunction,
    pub mip_bias: f32,
    pub ignore_mips: bool,
}

impl Default for SamplerState {
    fn default() -> Self {
        Self {
            min_filter: Filter::Linear,
            mip_filter: Filter::Linear,
            mag_filter: Filter::Linear,
            address_u: Address::Wrap,
            address_v: Address::Wrap,
            address_w: Address::Wrap,
            compare: CompareFunction::None,
            mip_bias: 0.0,
            ignore_mips: false,
        }
    }
}
