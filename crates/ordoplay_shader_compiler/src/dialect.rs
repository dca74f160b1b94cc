// SPDX-License-Identifier: MIT OR Apache-2.0
//! Backend capability tables.
//!
//! Every difference between target languages lives here as data: type and
//! intrinsic names, optional features, sampling templates and declaration
//! syntax. Emitters never branch on the backend directly; they ask the
//! [`Dialect`] and report [`CompileError::Unsupported`](crate::CompileError)
//! when a capability is absent.

use ordoplay_shader_graph::{DataUsage, ValueType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Target shading language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Backend {
    /// Desktop GLSL (3.30 and later)
    #[default]
    Glsl,
    /// GLSL ES 1.00
    GlslEs,
    /// HLSL shader model 4 and later
    Hlsl,
}

impl Backend {
    /// All backends
    pub const ALL: [Backend; 3] = [Backend::Glsl, Backend::GlslEs, Backend::Hlsl];

    /// Capability table of this backend
    pub fn dialect(self) -> &'static Dialect {
        match self {
            Self::Glsl => &GLSL,
            Self::GlslEs => &GLSL_ES,
            Self::Hlsl => &HLSL,
        }
    }

    /// Command line name
    pub fn name(self) -> &'static str {
        match self {
            Self::Glsl => "glsl",
            Self::GlslEs => "glsl-es",
            Self::Hlsl => "hlsl",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unrecognized backend name
#[derive(Debug, Error)]
#[error("Unknown backend '{0}' (expected glsl, glsl-es or hlsl)")]
pub struct UnknownBackend(pub String);

impl FromStr for Backend {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownBackend(s.to_string()))
    }
}

/// How the stage entry point and its inputs and outputs are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLayout {
    /// Global `in`/`out` (or `attribute`/`varying`) declarations and `void main()`
    Glsl {
        /// Keyword for vertex attributes
        attribute: &'static str,
        /// Keyword for vertex outputs
        varying_out: &'static str,
        /// Keyword for pixel inputs
        varying_in: &'static str,
    },
    /// Input and output structs passed through the entry point
    HlslStructs,
}

/// Scalar to vector conversion syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplatSyntax {
    /// `vec3(x)`
    Constructor,
    /// `(float3)x`
    Cast,
}

/// Names of the value types
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy)]
pub struct TypeNames {
    pub scalar: &'static str,
    pub vec2: &'static str,
    pub vec3: &'static str,
    pub vec4: &'static str,
    pub matrix4: &'static str,
    pub texture_2d: &'static str,
    pub texture_3d: &'static str,
    pub texture_cube: &'static str,
}

/// Sampling syntax for one texture type.
///
/// Templates substitute `{sampler}`, `{texture}`, `{coord}` and `{bias}`.
#[derive(Debug, Clone, Copy)]
pub struct SampleTemplates {
    /// Coordinate type
    pub coord: ValueType,
    /// Sampler declaration type
    pub sampler_type: &'static str,
    /// Implicit lod sampling
    pub sample: &'static str,
    /// Implicit lod with bias
    pub sample_bias: Option<&'static str>,
    /// Explicit lod 0
    pub sample_lod: Option<&'static str>,
    /// Depth compare sampling, with its sampler type and coordinate type
    pub sample_compare: Option<(&'static str, &'static str, ValueType)>,
}

/// Capability table of one target language
#[allow(missing_docs)]
#[derive(Debug)]
pub struct Dialect {
    pub backend: Backend,
    pub layout: SourceLayout,
    pub types: TypeNames,
    pub splat: SplatSyntax,
    pub fract: &'static str,
    pub lerp: &'static str,
    pub rsqrt: &'static str,
    pub atan2: &'static str,
    pub ddx: &'static str,
    pub ddy: &'static str,
    /// `None` is emulated with `log2`
    pub log10: Option<&'static str>,
    /// `None` is emulated with `floor`
    pub round: Option<&'static str>,
    /// `None` is emulated with `sign`/`floor`
    pub trunc: Option<&'static str>,
    /// `None` is unsupported
    pub transpose: Option<&'static str>,
    /// Instance index as a float expression, `None` is unsupported
    pub instance_id: Option<&'static str>,
    /// Fragment position (`vec2`)
    pub frag_coord: &'static str,
    /// Front facing test (`bool`)
    pub front_facing: &'static str,
    /// Matrix times vector, substitutes `{matrix}` and `{vector}`
    pub transform: &'static str,
    /// Matrix times matrix, substitutes `{left}` and `{right}`
    pub matrix_multiply: &'static str,
    pub unroll_attribute: Option<&'static str>,
    pub branch_attribute: Option<&'static str>,
    pub flatten_attribute: Option<&'static str>,
    /// Whether `for (;;)` loops without a bound compile
    pub unbounded_loops: bool,
    pub max_render_targets: u32,
    pub texture_2d: Option<SampleTemplates>,
    pub texture_3d: Option<SampleTemplates>,
    pub texture_cube: Option<SampleTemplates>,
    /// Prefix of compiler generated identifiers
    pub reserved_prefix: &'static str,
    /// Extension enabling derivatives in the pixel stage
    pub derivative_extension: Option<&'static str>,
}

const GLSL_TYPES: TypeNames = TypeNames {
    scalar: "float",
    vec2: "vec2",
    vec3: "vec3",
    vec4: "vec4",
    matrix4: "mat4",
    texture_2d: "sampler2D",
    texture_3d: "sampler3D",
    texture_cube: "samplerCube",
};

/// Desktop GLSL
pub static GLSL: Dialect = Dialect {
    backend: Backend::Glsl,
    layout: SourceLayout::Glsl {
        attribute: "in",
        varying_out: "out",
        varying_in: "in",
    },
    types: GLSL_TYPES,
    splat: SplatSyntax::Constructor,
    fract: "fract",
    lerp: "mix",
    rsqrt: "inversesqrt",
    atan2: "atan",
    ddx: "dFdx",
    ddy: "dFdy",
    log10: None,
    round: Some("round"),
    trunc: Some("trunc"),
    transpose: Some("transpose"),
    instance_id: Some("float(gl_InstanceID)"),
    frag_coord: "gl_FragCoord.xy",
    front_facing: "gl_FrontFacing",
    transform: "{matrix} * {vector}",
    matrix_multiply: "{left} * {right}",
    unroll_attribute: None,
    branch_attribute: None,
    flatten_attribute: None,
    unbounded_loops: true,
    max_render_targets: 4,
    texture_2d: Some(SampleTemplates {
        coord: ValueType::Vec2,
        sampler_type: "sampler2D",
        sample: "texture({sampler}, {coord})",
        sample_bias: Some("texture({sampler}, {coord}, {bias})"),
        sample_lod: Some("textureLod({sampler}, {coord}, 0.0)"),
        sample_compare: Some(("sampler2DShadow", "texture({sampler}, {coord})", ValueType::Vec3)),
    }),
    texture_3d: Some(SampleTemplates {
        coord: ValueType::Vec3,
        sampler_type: "sampler3D",
        sample: "texture({sampler}, {coord})",
        sample_bias: Some("texture({sampler}, {coord}, {bias})"),
        sample_lod: Some("textureLod({sampler}, {coord}, 0.0)"),
        sample_compare: None,
    }),
    texture_cube: Some(SampleTemplates {
        coord: ValueType::Vec3,
        sampler_type: "samplerCube",
        sample: "texture({sampler}, {coord})",
        sample_bias: Some("texture({sampler}, {coord}, {bias})"),
        sample_lod: Some("textureLod({sampler}, {coord}, 0.0)"),
        sample_compare: Some(("samplerCubeShadow", "texture({sampler}, {coord})", ValueType::Vec4)),
    }),
    reserved_prefix: "_gl_",
    derivative_extension: None,
};

/// GLSL ES 1.00
pub static GLSL_ES: Dialect = Dialect {
    backend: Backend::GlslEs,
    layout: SourceLayout::Glsl {
        attribute: "attribute",
        varying_out: "varying",
        varying_in: "varying",
    },
    types: GLSL_TYPES,
    splat: SplatSyntax::Constructor,
    fract: "fract",
    lerp: "mix",
    rsqrt: "inversesqrt",
    atan2: "atan",
    ddx: "dFdx",
    ddy: "dFdy",
    log10: None,
    round: None,
    trunc: None,
    transpose: None,
    instance_id: None,
    frag_coord: "gl_FragCoord.xy",
    front_facing: "gl_FrontFacing",
    transform: "{matrix} * {vector}",
    matrix_multiply: "{left} * {right}",
    unroll_attribute: None,
    branch_attribute: None,
    flatten_attribute: None,
    unbounded_loops: false,
    max_render_targets: 1,
    texture_2d: Some(SampleTemplates {
        coord: ValueType::Vec2,
        sampler_type: "sampler2D",
        sample: "texture2D({sampler}, {coord})",
        sample_bias: Some("texture2D({sampler}, {coord}, {bias})"),
        sample_lod: Some("texture2DLod({sampler}, {coord}, 0.0)"),
        sample_compare: None,
    }),
    texture_3d: None,
    texture_cube: Some(SampleTemplates {
        coord: ValueType::Vec3,
        sampler_type: "samplerCube",
        sample: "textureCube({sampler}, {coord})",
        sample_bias: Some("textureCube({sampler}, {coord}, {bias})"),
        sample_lod: Some("textureCubeLod({sampler}, {coord}, 0.0)"),
        sample_compare: None,
    }),
    reserved_prefix: "_gl_",
    derivative_extension: Some("GL_OES_standard_derivatives"),
};

/// HLSL
pub static HLSL: Dialect = Dialect {
    backend: Backend::Hlsl,
    layout: SourceLayout::HlslStructs,
    types: TypeNames {
        scalar: "float",
        vec2: "float2",
        vec3: "float3",
        vec4: "float4",
        matrix4: "float4x4",
        texture_2d: "Texture2D",
        texture_3d: "Texture3D",
        texture_cube: "TextureCube",
    },
    splat: SplatSyntax::Cast,
    fract: "frac",
    lerp: "lerp",
    rsqrt: "rsqrt",
    atan2: "atan2",
    ddx: "ddx",
    ddy: "ddy",
    log10: Some("log10"),
    round: Some("round"),
    trunc: Some("trunc"),
    transpose: Some("transpose"),
    instance_id: Some("float(i.InstanceId)"),
    frag_coord: "i.Position.xy",
    front_facing: "i.FrontFace",
    transform: "mul({vector}, {matrix})",
    matrix_multiply: "mul({left}, {right})",
    unroll_attribute: Some("[unroll]"),
    branch_attribute: Some("[branch]"),
    flatten_attribute: Some("[flatten]"),
    unbounded_loops: true,
    max_render_targets: 4,
    texture_2d: Some(SampleTemplates {
        coord: ValueType::Vec2,
        sampler_type: "SamplerState",
        sample: "{texture}.Sample({sampler}, {coord})",
        sample_bias: Some("{texture}.SampleBias({sampler}, {coord}, {bias})"),
        sample_lod: Some("{texture}.SampleLevel({sampler}, {coord}, 0.0)"),
        sample_compare: Some((
            "SamplerComparisonState",
            "{texture}.SampleCmpLevelZero({sampler}, {coord}.xy, {coord}.z)",
            ValueType::Vec3,
        )),
    }),
    texture_3d: Some(SampleTemplates {
        coord: ValueType::Vec3,
        sampler_type: "SamplerState",
        sample: "{texture}.Sample({sampler}, {coord})",
        sample_bias: Some("{texture}.SampleBias({sampler}, {coord}, {bias})"),
        sample_lod: Some("{texture}.SampleLevel({sampler}, {coord}, 0.0)"),
        sample_compare: None,
    }),
    texture_cube: Some(SampleTemplates {
        coord: ValueType::Vec3,
        sampler_type: "SamplerState",
        sample: "{texture}.Sample({sampler}, {coord})",
        sample_bias: Some("{texture}.SampleBias({sampler}, {coord}, {bias})"),
        sample_lod: Some("{texture}.SampleLevel({sampler}, {coord}, 0.0)"),
        sample_compare: Some((
            "SamplerComparisonState",
            "{texture}.SampleCmpLevelZero({sampler}, {coord}.xyz, {coord}.w)",
            ValueType::Vec4,
        )),
    }),
    reserved_prefix: "_dx_",
    derivative_extension: None,
};

/// Substitute `{key}` placeholders in a template
pub(crate) fn fill(template: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(template.to_string(), |text, (key, value)| {
        text.replace(&format!("{{{key}}}"), value)
    })
}

/// Float literal that always carries a decimal point
pub fn format_float(v: f32) -> String {
    let s = format!("{v}");
    if s.contains('.') || s.contains("inf") || s.contains("NaN") {
        s
    } else {
        format!("{s}.0")
    }
}

impl Dialect {
    /// Name of `ty`, `None` for void
    pub fn type_name(&self, ty: ValueType) -> Option<&'static str> {
        let names = &self.types;
        Some(match ty {
            ValueType::Void => return None,
            ValueType::Scalar => names.scalar,
            ValueType::Vec2 => names.vec2,
            ValueType::Vec3 => names.vec3,
            ValueType::Vec4 => names.vec4,
            ValueType::Matrix4 => names.matrix4,
            ValueType::Texture2D => names.texture_2d,
            ValueType::Texture3D => names.texture_3d,
            ValueType::TextureCube => names.texture_cube,
        })
    }

    /// `type(args...)`
    pub fn construct(&self, ty: ValueType, args: &[String]) -> String {
        format!("{}({})", self.type_name(ty).unwrap_or("void"), args.join(", "))
    }

    /// Broadcast a scalar expression to `ty`
    pub fn splat(&self, ty: ValueType, expr: &str) -> String {
        let name = self.type_name(ty).unwrap_or("void");
        match self.splat {
            SplatSyntax::Constructor => format!("{name}({expr})"),
            SplatSyntax::Cast => format!("({name}){expr}"),
        }
    }

    /// Constant of type `ty` with every component equal to `v`
    pub fn scalar_literal(&self, ty: ValueType, v: f32) -> String {
        let value = format_float(v);
        if ty == ValueType::Scalar {
            value
        } else {
            self.splat(ty, &value)
        }
    }

    /// Vector constant from its components
    pub fn vector_literal(&self, components: &[f32]) -> String {
        match ValueType::with_components(components.len()) {
            Some(ValueType::Scalar) | None => {
                format_float(components.first().copied().unwrap_or(0.0))
            }
            Some(ty) => {
                let args: Vec<_> = components.iter().map(|c| format_float(*c)).collect();
                self.construct(ty, &args)
            }
        }
    }

    /// Sampling templates of a texture type
    pub fn sample_templates(&self, ty: ValueType) -> Option<&SampleTemplates> {
        match ty {
            ValueType::Texture2D => self.texture_2d.as_ref(),
            ValueType::Texture3D => self.texture_3d.as_ref(),
            ValueType::TextureCube => self.texture_cube.as_ref(),
            _ => None,
        }
    }

    /// Uniform declaration; textures have none in GLSL (the sampler binds them)
    pub fn uniform_decl(&self, ty: ValueType, name: &str, length: Option<u32>) -> Option<String> {
        let type_name = self.type_name(ty)?;
        let array = length.map(|n| format!("[{n}]")).unwrap_or_default();
        match self.layout {
            SourceLayout::Glsl { .. } if ty.is_texture() => None,
            SourceLayout::HlslStructs if ty.is_texture() => Some(format!("{type_name} {name};")),
            _ => Some(format!("uniform {type_name} {name}{array};")),
        }
    }

    /// Sampler declaration
    pub fn sampler_decl(&self, sampler_type: &str, name: &str) -> String {
        match self.layout {
            SourceLayout::Glsl { .. } => format!("uniform {sampler_type} {name};"),
            SourceLayout::HlslStructs => format!("{sampler_type} {name};"),
        }
    }

    /// Identifier and semantic of a vertex attribute
    pub fn vertex_attribute(&self, usage: DataUsage, index: u32) -> (String, String) {
        let base = usage.attribute_name();
        let semantic = match usage {
            DataUsage::Custom => format!("TEXCOORD{index}"),
            _ => format!("{}{index}", base.to_uppercase()),
        };
        match self.layout {
            SourceLayout::Glsl { .. } => (format!("in_{base}{index}"), semantic),
            SourceLayout::HlslStructs => (format!("{base}{index}"), semantic),
        }
    }

    /// Vertex attribute declaration
    pub fn attribute_decl(&self, ty: ValueType, name: &str, semantic: &str) -> String {
        let type_name = self.type_name(ty).unwrap_or("void");
        match self.layout {
            SourceLayout::Glsl { attribute, .. } => format!("{attribute} {type_name} {name};"),
            SourceLayout::HlslStructs => format!("{type_name} {name} : {semantic};"),
        }
    }

    /// Reference to a stage input member
    pub fn input_ref(&self, name: &str) -> String {
        match self.layout {
            SourceLayout::Glsl { .. } => name.to_string(),
            SourceLayout::HlslStructs => format!("i.{name}"),
        }
    }

    /// Reference to a stage output member
    pub fn output_ref(&self, name: &str) -> String {
        match self.layout {
            SourceLayout::Glsl { .. } => name.to_string(),
            SourceLayout::HlslStructs => format!("o.{name}"),
        }
    }

    /// Interpolator slot declarations: (vertex output, pixel input)
    pub fn interpolator_decls(&self, ty: ValueType, name: &str, slot: u32) -> (String, String) {
        let type_name = self.type_name(ty).unwrap_or("void");
        match self.layout {
            SourceLayout::Glsl {
                varying_out,
                varying_in,
                ..
            } => (
                format!("{varying_out} {type_name} {name};"),
                format!("{varying_in} {type_name} {name};"),
            ),
            SourceLayout::HlslStructs => {
                let member = format!("{type_name} {name} : TEXCOORD{slot};");
                (member.clone(), member)
            }
        }
    }

    /// Clip position written by the vertex stage
    pub fn position_output(&self) -> String {
        match self.layout {
            SourceLayout::Glsl { .. } => "gl_Position".to_string(),
            SourceLayout::HlslStructs => "o.Position".to_string(),
        }
    }

    /// Declaration and reference of render target `index`
    pub fn fragment_output(&self, index: u32) -> (Option<String>, String) {
        match (self.layout, self.backend) {
            (SourceLayout::Glsl { .. }, Backend::GlslEs) => (None, "gl_FragColor".to_string()),
            (SourceLayout::Glsl { .. }, _) => {
                let name = format!("{}FragData_{index}", self.reserved_prefix);
                (
                    Some(format!("layout(location = {index}) out vec4 {name};")),
                    name,
                )
            }
            (SourceLayout::HlslStructs, _) => (
                Some(format!("float4 Color{index} : SV_Target{index};")),
                format!("o.Color{index}"),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("glsl".parse::<Backend>().unwrap(), Backend::Glsl);
        assert_eq!("GLSL-ES".parse::<Backend>().unwrap(), Backend::GlslEs);
        assert_eq!("hlsl".parse::<Backend>().unwrap(), Backend::Hlsl);
        assert!("metal".parse::<Backend>().is_err());
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(0.25), "0.25");
        assert_eq!(format_float(-3.0), "-3.0");
    }

    #[test]
    fn test_splat_syntax() {
        assert_eq!(GLSL.splat(ValueType::Vec3, "v0"), "vec3(v0)");
        assert_eq!(HLSL.splat(ValueType::Vec3, "v0"), "(float3)v0");
        assert_eq!(GLSL.scalar_literal(ValueType::Scalar, 0.0), "0.0");
        assert_eq!(GLSL.vector_literal(&[1.0, 0.5]), "vec2(1.0, 0.5)");
    }

    #[test]
    fn test_fill() {
        let text = fill(
            "{texture}.Sample({sampler}, {coord})",
            &[("texture", "Albedo"), ("sampler", "s"), ("coord", "uv")],
        );
        assert_eq!(text, "Albedo.Sample(s, uv)");
    }

    #[test]
    fn test_declarations() {
        assert_eq!(
            GLSL.uniform_decl(ValueType::Vec4, "Color", None).as_deref(),
            Some("uniform vec4 Color;")
        );
        assert_eq!(GLSL.uniform_decl(ValueType::Texture2D, "Albedo", None), None);
        assert_eq!(
            HLSL.uniform_decl(ValueType::Texture2D, "Albedo", None).as_deref(),
            Some("Texture2D Albedo;")
        );
        assert_eq!(
            HLSL.uniform_decl(ValueType::Matrix4, "Bones", Some(8)).as_deref(),
            Some("uniform float4x4 Bones[8];")
        );
        assert_eq!(
            GLSL_ES.interpolator_decls(ValueType::Vec2, "Attr0", 0).1,
            "varying vec2 Attr0;"
        );
        assert_eq!(GLSL_ES.fragment_output(0), (None, "gl_FragColor".to_string()));
    }

    #[test]
    fn test_capabilities_differ() {
        assert!(GLSL_ES.round.is_none());
        assert!(GLSL_ES.texture_3d.is_none());
        assert!(!GLSL_ES.unbounded_loops);
        assert_eq!(HLSL.unroll_attribute, Some("[unroll]"));
        assert_eq!(
            GLSL.vertex_attribute(DataUsage::Position, 0),
            ("in_Position0".to_string(), "POSITION0".to_string())
        );
    }
}
