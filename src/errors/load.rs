// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::ConfigurationErrors;
use thiserror::Error;

/// Failures reading a rule file.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read rule file '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML rule file")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid TOML rule file")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported rule file extension '{extension}' (expected yaml, yml or toml)")]
    UnsupportedFormat { extension: String },

    #[error(transparent)]
    Configuration(#[from] ConfigurationErrors),
}
