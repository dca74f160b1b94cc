// SPDX-License-Identifier: MIT OR Apache-2.0
//! Emitted variables and conversions between them.

use crate::dialect::Dialect;
use crate::types::TypeError;
use ordoplay_shader_graph::ValueType;

const SWIZZLE: &str = "xyzw";

/// Identifier (or inline expression) standing in for an evaluated pin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    /// Identifier or expression text
    pub name: String,
    /// Value type
    pub ty: ValueType,
}

impl Variable {
    /// Create a new variable
    pub fn new(name: impl Into<String>, ty: ValueType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Expression converting this variable to `target`.
    ///
    /// Scalars broadcast, wider vectors truncate with a swizzle and narrower
    /// vectors are padded with zeros. Matrices and textures only convert to
    /// themselves. A `Void` variable is a loop output read before its type
    /// is fixed and is used as is wherever a vector or matrix is expected.
    pub fn cast(&self, target: ValueType, dialect: &Dialect) -> Result<String, TypeError> {
        let undetermined =
            self.ty == ValueType::Void && (target.is_vector() || target == ValueType::Matrix4);
        if self.ty == target || undetermined {
            return Ok(self.name.clone());
        }
        let (Some(from), Some(to)) = (self.ty.components(), target.components()) else {
            return Err(TypeError::NoConversion(self.ty, target));
        };
        if !self.ty.is_vector() || !target.is_vector() {
            return Err(TypeError::NoConversion(self.ty, target));
        }

        Ok(if from == 1 {
            dialect.splat(target, &self.name)
        } else if to < from {
            format!("{}.{}", self.name, &SWIZZLE[..to])
        } else {
            let mut args = vec![self.name.clone()];
            args.extend((from..to).map(|_| "0.0".to_string()));
            dialect.construct(target, &args)
        })
    }
}
