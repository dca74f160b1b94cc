// SPDX-License-Identifier: MIT OR Apache-2.0
//! Final source assembly.
//!
//! Sections are written in a fixed order: header, uniforms, samplers, stage
//! inputs, stage outputs, subroutines, entry point.

use crate::artifact::{ProgramArtifact, Requirements};
use crate::code::CodeBuffer;
use crate::context::EmitContext;
use crate::dialect::{Backend, Dialect, SourceLayout};
use crate::settings::CompilerSettings;
use crate::shader::{Block, ShaderStage, StageShader};

/// Turn a finished context into the program artifact
pub(crate) fn assemble(cx: EmitContext<'_>) -> ProgramArtifact {
    let dialect = cx.dialect;
    let settings = cx.settings;
    let requirements = cx.requirements;

    let vertex_source = stage_source(dialect, settings, &requirements, &cx.vertex);
    let pixel_source = stage_source(dialect, settings, &requirements, &cx.pixel);

    ProgramArtifact {
        backend: dialect.backend,
        vertex_source,
        pixel_source,
        uniforms: cx.uniforms.into_values().collect(),
        samplers: cx.samplers.into_values().collect(),
        interpolator_count: cx.interpolators,
        render_state: cx.render_state.unwrap_or_default(),
        requirements,
    }
}

fn stage_source(
    dialect: &Dialect,
    settings: &CompilerSettings,
    requirements: &Requirements,
    shader: &StageShader,
) -> String {
    let stage = shader.stage();
    let mut out = CodeBuffer::new();
    write_header(&mut out, dialect, settings, requirements, stage);

    let mut section = |title: &str, text: &str| {
        if text.is_empty() {
            return;
        }
        if !out.is_empty() {
            out.line("");
        }
        if settings.emit_comments {
            out.line(format!("// {title}"));
        }
        out.splice(text);
    };

    section("Uniforms", shader.block_text(Block::Uniform));
    section("Samplers", shader.block_text(Block::Sampler));
    match dialect.layout {
        SourceLayout::Glsl { .. } => {
            section("Inputs", shader.block_text(Block::Input));
            section("Outputs", shader.block_text(Block::Output));
        }
        SourceLayout::HlslStructs => {
            let (input, output) = hlsl_structs(shader, requirements);
            section("Inputs", input.as_str());
            section("Outputs", output.as_str());
        }
    }
    section("Subroutines", shader.block_text(Block::Script));

    if !out.is_empty() {
        out.line("");
    }
    match dialect.layout {
        SourceLayout::Glsl { .. } => {
            out.line("void main()");
            out.open();
            out.splice(shader.main_body());
            out.close();
        }
        SourceLayout::HlslStructs => {
            let (input, output) = hlsl_struct_names(stage);
            if hlsl_has_input(shader, requirements) {
                out.line(format!("{output} main({input} i)"));
            } else {
                out.line(format!("{output} main()"));
            }
            out.open();
            out.line(format!("{output} o = ({output})0;"));
            out.splice(shader.main_body());
            out.line("return o;");
            out.close();
        }
    }
    out.into_string()
}

fn write_header(
    out: &mut CodeBuffer,
    dialect: &Dialect,
    settings: &CompilerSettings,
    requirements: &Requirements,
    stage: ShaderStage,
) {
    match dialect.backend {
        Backend::Glsl => out.line(format!("#version {}", settings.glsl_version)),
        Backend::GlslEs => {
            out.line("#version 100");
            if let (ShaderStage::Pixel, true, Some(extension)) =
                (stage, requirements.derivatives, dialect.derivative_extension)
            {
                out.line(format!("#extension {extension} : enable"));
            }
            out.line(format!("precision {} float;", settings.precision.qualifier()));
        }
        Backend::Hlsl => {}
    }
}

fn hlsl_struct_names(stage: ShaderStage) -> (&'static str, &'static str) {
    match stage {
        ShaderStage::Vertex => ("VertexInput", "VertexOutput"),
        ShaderStage::Pixel => ("PixelInput", "PixelOutput"),
    }
}

fn hlsl_has_input(shader: &StageShader, requirements: &Requirements) -> bool {
    match shader.stage() {
        ShaderStage::Vertex => {
            !shader.block_text(Block::Input).is_empty() || requirements.instance_id
        }
        ShaderStage::Pixel => true,
    }
}

/// Input and output struct definitions of an HLSL stage
fn hlsl_structs(shader: &StageShader, requirements: &Requirements) -> (CodeBuffer, CodeBuffer) {
    let stage = shader.stage();
    let (input_name, output_name) = hlsl_struct_names(stage);

    let mut input = CodeBuffer::new();
    if hlsl_has_input(shader, requirements) {
        input.line(format!("struct {input_name}"));
        input.open();
        if stage == ShaderStage::Pixel {
            input.line("float4 Position : SV_Position;");
        }
        input.splice(shader.block_text(Block::Input));
        match stage {
            ShaderStage::Vertex if requirements.instance_id => {
                input.line("uint InstanceId : SV_InstanceID;");
            }
            ShaderStage::Pixel if requirements.front_face => {
                input.line("bool FrontFace : SV_IsFrontFace;");
            }
            _ => {}
        }
        input.dedent();
        input.line("};");
    }

    let mut output = CodeBuffer::new();
    output.line(format!("struct {output_name}"));
    output.open();
    if stage == ShaderStage::Vertex {
        output.line("float4 Position : SV_Position;");
    }
    output.splice(shader.block_text(Block::Output));
    output.dedent();
    output.line("};");

    (input, output)
}
