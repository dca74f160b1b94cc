// SPDX-License-Identifier: MIT OR Apache-2.0
//! Writing compile results.

use crate::args::ArtifactFormat;
use crate::error::CliError;
use ordoplay_shader_compiler::{Backend, ProgramArtifact, ShaderStage};
use std::path::{Path, PathBuf};

/// File name suffix of a stage source
pub fn stage_extension(backend: Backend, stage: ShaderStage) -> &'static str {
    match (backend, stage) {
        (Backend::Hlsl, ShaderStage::Vertex) => "vs.hlsl",
        (Backend::Hlsl, ShaderStage::Pixel) => "ps.hlsl",
        (_, ShaderStage::Vertex) => "vert",
        (_, ShaderStage::Pixel) => "frag",
    }
}

/// Encode the artifact in `format`
pub fn encode(artifact: &ProgramArtifact, format: ArtifactFormat) -> Result<Vec<u8>, CliError> {
    Ok(match format {
        ArtifactFormat::Ron => {
            let config = ron::ser::PrettyConfig::default().struct_names(true);
            ron::ser::to_string_pretty(artifact, config)?.into_bytes()
        }
        ArtifactFormat::Json => serde_json::to_vec_pretty(artifact)?,
        ArtifactFormat::Bin => bincode::serialize(artifact)?,
    })
}

/// Write both stage sources and the artifact into `dir`; returns the written paths
pub fn write_outputs(
    dir: &Path,
    stem: &str,
    artifact: &ProgramArtifact,
    format: ArtifactFormat,
) -> Result<Vec<PathBuf>, CliError> {
    std::fs::create_dir_all(dir).map_err(|source| CliError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::with_capacity(3);
    for stage in [ShaderStage::Vertex, ShaderStage::Pixel] {
        let path = dir.join(format!("{stem}.{}", stage_extension(artifact.backend, stage)));
        write(&path, artifact.source(stage).as_bytes())?;
        files.push(path);
    }

    let path = dir.join(format!("{stem}.program.{}", format.extension()));
    write(&path, &encode(artifact, format)?)?;
    files.push(path);
    Ok(files)
}

fn write(path: &Path, contents: &[u8]) -> Result<(), CliError> {
    std::fs::write(path, contents).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

/// Both stages as one listing for stdout
pub fn listing(artifact: &ProgramArtifact) -> String {
    format!(
        "// {} vertex stage\n{}\n// {} pixel stage\n{}",
        artifact.backend, artifact.vertex_source, artifact.backend, artifact.pixel_source
    )
}
