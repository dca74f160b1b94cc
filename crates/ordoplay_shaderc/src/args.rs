// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command line parsing.

use crate::error::CliError;
use ordoplay_shader_compiler::Backend;
use std::path::PathBuf;
use std::str::FromStr;

/// Usage text
pub const USAGE: &str = "\
Usage: ordoplay_shaderc <graph.ron> [options]

Options:
  --backend <glsl|glsl-es|hlsl>  Target language (overrides the settings file)
  --settings <FILE>              Compiler settings in RON
  --out-dir <DIR>                Write stage sources and the program artifact here
  --format <ron|json|bin>        Program artifact format [default: ron]
  -v, --verbose                  Debug logging
  -h, --help                     Print this help";

/// Encoding of the program artifact file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArtifactFormat {
    /// Pretty RON
    #[default]
    Ron,
    /// Pretty JSON
    Json,
    /// bincode
    Bin,
}

impl ArtifactFormat {
    /// File extension
    pub fn extension(self) -> &'static str {
        match self {
            Self::Ron => "ron",
            Self::Json => "json",
            Self::Bin => "bin",
        }
    }
}

impl FromStr for ArtifactFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ron" => Ok(Self::Ron),
            "json" => Ok(Self::Json),
            "bin" | "bincode" => Ok(Self::Bin),
            other => Err(CliError::Usage(format!("Unknown format '{other}'"))),
        }
    }
}

/// Parsed command line
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Args {
    /// Graph file
    pub graph: PathBuf,
    /// Backend override
    pub backend: Option<Backend>,
    /// Settings file
    pub settings: Option<PathBuf>,
    /// Output directory; stdout when absent
    pub out_dir: Option<PathBuf>,
    /// Artifact encoding
    pub format: ArtifactFormat,
    /// Debug logging
    pub verbose: bool,
}

impl Args {
    /// Parse arguments (without the program name). `Ok(None)` means help was requested.
    pub fn parse<I>(args: I) -> Result<Option<Self>, CliError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let mut parsed = Self::default();
        let mut graph = None;

        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next()
                    .ok_or_else(|| CliError::Usage(format!("{flag} needs a value")))
            };
            match arg.as_str() {
                "-h" | "--help" => return Ok(None),
                "-v" | "--verbose" => parsed.verbose = true,
                "--backend" => parsed.backend = Some(value("--backend")?.parse()?),
                "--settings" => parsed.settings = Some(PathBuf::from(value("--settings")?)),
                "--out-dir" => parsed.out_dir = Some(PathBuf::from(value("--out-dir")?)),
                "--format" => parsed.format = value("--format")?.parse()?,
                flag if flag.starts_with('-') => {
                    return Err(CliError::Usage(format!("Unknown option '{flag}'")))
                }
                path => {
                    if graph.replace(PathBuf::from(path)).is_some() {
                        return Err(CliError::Usage("Only one graph file may be given".to_string()));
                    }
                }
            }
        }

        parsed.graph = graph.ok_or_else(|| CliError::Usage("Missing graph file".to_string()))?;
        Ok(Some(parsed))
    }
}
