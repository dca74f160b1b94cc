// SPDX-License-Identifier: MIT OR Apache-2.0
//! Compiler settings.

use crate::dialect::Backend;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default float precision of GLSL ES shaders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Precision {
    /// `lowp`
    Low,
    /// `mediump`
    Medium,
    /// `highp`
    #[default]
    High,
}

impl Precision {
    /// Qualifier keyword
    pub fn qualifier(self) -> &'static str {
        match self {
            Self::Low => "lowp",
            Self::Medium => "mediump",
            Self::High => "highp",
        }
    }
}

/// Settings controlling a compile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerSettings {
    /// Target language
    pub backend: Backend,
    /// `#version` written for desktop GLSL
    pub glsl_version: u32,
    /// Default float precision for GLSL ES
    pub precision: Precision,
    /// Force (`Some(true)`) or suppress (`Some(false)`) loop unroll hints
    pub unroll_loops: Option<bool>,
    /// Write section comments into assembled source
    pub emit_comments: bool,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            backend: Backend::Glsl,
            glsl_version: 330,
            precision: Precision::High,
            unroll_loops: None,
            emit_comments: true,
        }
    }
}

/// Error loading or saving settings
#[derive(Debug, Error)]
pub enum SettingsError {
    /// File could not be read or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// RON decoding failed
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// RON encoding failed
    #[error("Failed to encode settings: {0}")]
    Encode(#[from] ron::Error),
}

impl CompilerSettings {
    /// Settings targeting `backend` with everything else default
    pub fn for_backend(backend: Backend) -> Self {
        Self {
            backend,
            ..Self::default()
        }
    }

    /// Parse settings from RON; missing fields take their defaults
    pub fn from_ron(source: &str) -> Result<Self, SettingsError> {
        Ok(ron::from_str(source)?)
    }

    /// Encode settings as pretty RON
    pub fn to_ron(&self) -> Result<String, SettingsError> {
        let config = ron::ser::PrettyConfig::default().struct_names(true);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Load settings from a RON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Save settings to a RON file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}
