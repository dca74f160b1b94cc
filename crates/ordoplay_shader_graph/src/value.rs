// SPDX-License-Identifier: MIT OR Apache-2.0
//! Value types flowing through shader graph pins.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of a value produced by an output pin.
///
/// Variants are declared in promotion order: `Scalar < Vec2 < Vec3 < Vec4`.
/// Matrices and texture handles sit above the vector types but never
/// take part in promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// No value yet (loop outputs before their body is known)
    Void,
    /// Single float
    Scalar,
    /// Two component vector
    Vec2,
    /// Three component vector
    Vec3,
    /// Four component vector
    Vec4,
    /// 4x4 matrix
    Matrix4,
    /// 2D texture handle
    Texture2D,
    /// 3D texture handle
    Texture3D,
    /// Cube texture handle
    TextureCube,
}

impl ValueType {
    /// Scalar or vector type with `n` components (1..=4).
    pub fn with_components(n: usize) -> Option<Self> {
        match n {
            1 => Some(Self::Scalar),
            2 => Some(Self::Vec2),
            3 => Some(Self::Vec3),
            4 => Some(Self::Vec4),
            _ => None,
        }
    }

    /// Number of float components, `None` for void and textures.
    pub fn components(self) -> Option<usize> {
        match self {
            Self::Scalar => Some(1),
            Self::Vec2 => Some(2),
            Self::Vec3 => Some(3),
            Self::Vec4 => Some(4),
            Self::Matrix4 => Some(16),
            Self::Void | Self::Texture2D | Self::Texture3D | Self::TextureCube => None,
        }
    }

    /// Whether this is a scalar or a vector (the promotable types).
    pub fn is_vector(self) -> bool {
        matches!(self, Self::Scalar | Self::Vec2 | Self::Vec3 | Self::Vec4)
    }

    /// Whether this is a texture handle.
    pub fn is_texture(self) -> bool {
        matches!(self, Self::Texture2D | Self::Texture3D | Self::TextureCube)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Void => "void",
            Self::Scalar => "scalar",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
            Self::Matrix4 => "matrix4",
            Self::Texture2D => "texture2D",
            Self::Texture3D => "texture3D",
            Self::TextureCube => "textureCube",
        };
        f.write_str(name)
    }
}

/// Literal value stored on a port as its unconnected default
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PortValue {
    /// Float
    Scalar(f32),
    /// 2D vector
    Vector2([f32; 2]),
    /// 3D vector
    Vector3([f32; 3]),
    /// 4D vector
    Vector4([f32; 4]),
}

impl PortValue {
    /// Get the value type for this literal
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Scalar(_) => ValueType::Scalar,
            Self::Vector2(_) => ValueType::Vec2,
            Self::Vector3(_) => ValueType::Vec3,
            Self::Vector4(_) => ValueType::Vec4,
        }
    }

    /// Components of the literal in x, y, z, w order
    pub fn components(&self) -> &[f32] {
        match self {
            Self::Scalar(v) => std::slice::from_ref(v),
            Self::Vector2(v) => v,
            Self::Vector3(v) => v,
            Self::Vector4(v) => v,
        }
    }
}
