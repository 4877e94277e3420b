//! Build configuration threaded explicitly through the pipeline.

use std::path::PathBuf;

use serde::Deserialize;

use crate::bindings::InstantiationMode;

/// Debug or release build. Selects compiler flags and whether the size
/// optimization pass runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Profile {
    #[default]
    Debug,
    Release,
}

impl Profile {
    /// Directory name cargo uses under the target triple.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Profile::Debug => "debug",
            Profile::Release => "release",
        }
    }
}

/// Which artifacts the core produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputConfig {
    /// `None` writes the post-processed binary as-is.
    pub wrapper: Option<InstantiationMode>,
    /// Only meaningful together with a wrapper.
    pub declarations: bool,
}

impl OutputConfig {
    pub fn binary() -> Self {
        OutputConfig::default()
    }

    pub fn wrapper(mode: InstantiationMode) -> Self {
        OutputConfig {
            wrapper: Some(mode),
            declarations: false,
        }
    }

    pub fn with_declarations(self) -> Self {
        OutputConfig {
            declarations: true,
            ..self
        }
    }
}

/// Executable names of the external tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolNames {
    pub cargo: String,
    pub rustc: String,
    pub wasm_gc: String,
    pub wasm_opt: String,
}

impl Default for ToolNames {
    fn default() -> Self {
        ToolNames {
            cargo: "cargo".to_string(),
            rustc: "rustc".to_string(),
            wasm_gc: "wasm-gc".to_string(),
            wasm_opt: "wasm-opt".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuildConfig {
    pub profile: Profile,
    /// Compile a single source file with rustc instead of the cargo package
    /// in the input directory.
    pub entry: Option<PathBuf>,
    pub output: OutputConfig,
    pub tools: ToolNames,
}

/// The part of `Cargo.toml` the pipeline reads.
#[derive(Debug, Deserialize)]
pub struct Manifest {
    pub package: Package,
}

#[derive(Debug, Deserialize)]
pub struct Package {
    pub name: String,
}

impl Manifest {
    pub fn parse(source: &str) -> Result<Manifest, toml::de::Error> {
        toml::from_str(source)
    }
}
