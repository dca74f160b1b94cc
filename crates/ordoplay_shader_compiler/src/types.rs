// SPDX-License-Identifier: MIT OR Apache-2.0
//! Type lattice.
//!
//! Scalars and vectors promote upwards (`Scalar < Vec2 < Vec3 < Vec4`);
//! matrices only combine with matrices and textures never combine.
//! `Void` marks a loop output whose type is not fixed yet; it takes the
//! type of whatever it is combined with.

use ordoplay_shader_graph::ValueType;
use thiserror::Error;

/// Failure to combine or convert types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TypeError {
    /// No common type exists
    #[error("{0} and {1} have no common type")]
    Incompatible(ValueType, ValueType),

    /// No conversion from the first type to the second
    #[error("{0} cannot be converted to {1}")]
    NoConversion(ValueType, ValueType),
}

/// Common operand type of `a` and `b`
pub fn common_type(a: ValueType, b: ValueType) -> Result<ValueType, TypeError> {
    match (a, b) {
        (ValueType::Void, other) | (other, ValueType::Void)
            if other.is_vector() || other == ValueType::Matrix4 =>
        {
            return Ok(other)
        }
        _ => {}
    }
    if a.is_vector() && b.is_vector() {
        Ok(a.max(b))
    } else if a == ValueType::Matrix4 && b == ValueType::Matrix4 {
        Ok(a)
    } else {
        Err(TypeError::Incompatible(a, b))
    }
}

/// Common type of several operands
pub fn common_type_of(types: &[ValueType]) -> Result<ValueType, TypeError> {
    let mut iter = types.iter().copied();
    let first = iter.next().ok_or(TypeError::Incompatible(ValueType::Void, ValueType::Void))?;
    iter.try_fold(first, common_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ValueType::*;

    #[test]
    fn test_promotion() {
        assert_eq!(common_type(Vec2, Vec4), Ok(Vec4));
        assert_eq!(common_type(Scalar, Vec3), Ok(Vec3));
        assert_eq!(common_type(Vec3, Scalar), Ok(Vec3));
        assert_eq!(common_type(Scalar, Scalar), Ok(Scalar));
        assert_eq!(common_type(Matrix4, Matrix4), Ok(Matrix4));
    }

    #[test]
    fn test_incompatible() {
        assert_eq!(
            common_type(Texture2D, Scalar),
            Err(TypeError::Incompatible(Texture2D, Scalar))
        );
        assert!(common_type(Texture2D, Texture2D).is_err());
        assert!(common_type(Matrix4, Vec4).is_err());
        assert!(common_type(Void, Void).is_err());
        assert!(common_type(Void, Texture2D).is_err());
    }

    #[test]
    fn test_undetermined_adopts_other() {
        assert_eq!(common_type(Void, Vec4), Ok(Vec4));
        assert_eq!(common_type(Scalar, Void), Ok(Scalar));
        assert_eq!(common_type(Void, Matrix4), Ok(Matrix4));
        assert_eq!(common_type_of(&[Void, Vec2, Vec3]), Ok(Vec3));
    }

    #[test]
    fn test_common_type_of() {
        assert_eq!(common_type_of(&[Scalar, Vec2, Vec3]), Ok(Vec3));
        assert!(common_type_of(&[]).is_err());
        assert!(common_type_of(&[Vec2, TextureCube]).is_err());
    }
}
