//! External tools: the Rust compiler that produces the binary and the
//! post-processing passes run over it.
//!
//! Passes exchange binaries through scratch files in a temporary directory.
//! A tool that cannot be found on `PATH` is reported as
//! [`ToolError::Unavailable`], which lets callers tell a missing optional
//! tool apart from one that ran and failed.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, warn};

use crate::config::{Manifest, Profile};
use crate::error::Error;

pub const WASM_TARGET: &str = "wasm32-unknown-unknown";

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("{tool} was not found on PATH")]
    Unavailable { tool: String },

    #[error("{tool} failed ({status}): {stderr}")]
    Failed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("{tool} did not produce {}", .path.display())]
    MissingOutput { tool: String, path: PathBuf },

    #[error("{tool}: {source}")]
    Io { tool: String, source: io::Error },
}

impl ToolError {
    fn io(tool: &str) -> impl FnOnce(io::Error) -> ToolError + '_ {
        move |source| ToolError::Io {
            tool: tool.to_string(),
            source,
        }
    }
}

/// A transformation of a binary by an external tool.
pub trait Pass {
    fn name(&self) -> &str;
    fn run(&self, wasm: &[u8]) -> Result<Vec<u8>, ToolError>;
}

/// Runs `pass`, passing `wasm` through unchanged if the tool is not
/// installed. Any other failure is returned.
pub fn run_optional(pass: &dyn Pass, wasm: Vec<u8>) -> Result<Vec<u8>, ToolError> {
    match pass.run(&wasm) {
        Ok(output) => Ok(output),
        Err(ToolError::Unavailable { tool }) => {
            warn!("{} not found, skipping {} pass", tool, pass.name());
            Ok(wasm)
        }
        Err(err) => Err(err),
    }
}

/// Dead-code elimination: `wasm-gc <input> <output>`.
#[derive(Debug, Clone)]
pub struct WasmGc {
    pub program: String,
}

impl Pass for WasmGc {
    fn name(&self) -> &str {
        "wasm-gc"
    }

    fn run(&self, wasm: &[u8]) -> Result<Vec<u8>, ToolError> {
        run_file_pass(&self.program, wasm, |input, output| {
            vec![input.into(), output.into()]
        })
    }
}

/// Size optimization: `wasm-opt -Os <input> -o <output>`.
#[derive(Debug, Clone)]
pub struct WasmOpt {
    pub program: String,
}

impl Pass for WasmOpt {
    fn name(&self) -> &str {
        "wasm-opt"
    }

    fn run(&self, wasm: &[u8]) -> Result<Vec<u8>, ToolError> {
        run_file_pass(&self.program, wasm, |input, output| {
            vec!["-Os".into(), input.into(), "-o".into(), output.into()]
        })
    }
}

fn run_file_pass<F>(program: &str, wasm: &[u8], args: F) -> Result<Vec<u8>, ToolError>
where
    F: FnOnce(&Path, &Path) -> Vec<OsString>,
{
    let executable = locate(program)?;
    let scratch = tempfile::tempdir().map_err(ToolError::io(program))?;
    let input = scratch.path().join("input.wasm");
    let output = scratch.path().join("output.wasm");
    fs::write(&input, wasm).map_err(ToolError::io(program))?;

    let mut command = Command::new(executable);
    command.args(args(&input, &output));
    run(program, &mut command)?;

    read_output(program, &output)
}

fn locate(program: &str) -> Result<PathBuf, ToolError> {
    which::which(program).map_err(|_| ToolError::Unavailable {
        tool: program.to_string(),
    })
}

fn run(tool: &str, command: &mut Command) -> Result<(), ToolError> {
    debug!("running {:?}", command);
    let output = command.output().map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ToolError::Unavailable {
                tool: tool.to_string(),
            }
        } else {
            ToolError::Io {
                tool: tool.to_string(),
                source,
            }
        }
    })?;

    if !output.status.success() {
        return Err(ToolError::Failed {
            tool: tool.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

fn read_output(tool: &str, path: &Path) -> Result<Vec<u8>, ToolError> {
    fs::read(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ToolError::MissingOutput {
                tool: tool.to_string(),
                path: path.to_path_buf(),
            }
        } else {
            ToolError::Io {
                tool: tool.to_string(),
                source,
            }
        }
    })
}

/// A compiled binary and the artifact name derived from its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiled {
    pub name: String,
    pub wasm: Vec<u8>,
}

pub trait Compiler {
    fn compile(&self, input_dir: &Path, cache_dir: &Path, profile: Profile) -> Result<Compiled, Error>;
}

/// Builds the cargo package in the input directory for the wasm target.
#[derive(Debug, Clone)]
pub struct Cargo {
    pub program: String,
}

impl Cargo {
    pub fn crate_name(input_dir: &Path) -> Result<String, Error> {
        let path = input_dir.join("Cargo.toml");
        let source = fs::read_to_string(&path).map_err(|source| Error::io(&path, source))?;
        let manifest = Manifest::parse(&source).map_err(|source| Error::Manifest { path, source })?;
        Ok(manifest.package.name)
    }

    pub fn args(profile: Profile) -> Vec<&'static str> {
        let mut args = vec!["build", "--target", WASM_TARGET];
        if profile == Profile::Release {
            args.push("--release");
        }
        args
    }
}

impl Compiler for Cargo {
    fn compile(&self, input_dir: &Path, cache_dir: &Path, profile: Profile) -> Result<Compiled, Error> {
        let name = Cargo::crate_name(input_dir)?;

        let mut command = Command::new(&self.program);
        command
            .args(Cargo::args(profile))
            .current_dir(input_dir)
            .env("CARGO_TARGET_DIR", cache_dir);
        run(&self.program, &mut command)?;

        // cargo names the artifact after the lib target, which swaps '-' for '_'
        let output = cache_dir
            .join(WASM_TARGET)
            .join(profile.dir_name())
            .join(format!("{}.wasm", name.replace('-', "_")));
        let wasm = read_output(&self.program, &output)?;
        Ok(Compiled { name, wasm })
    }
}

/// Compiles a single entry file with rustc as a cdylib.
#[derive(Debug, Clone)]
pub struct Rustc {
    pub program: String,
    pub entry: PathBuf,
}

impl Rustc {
    pub fn name(&self) -> String {
        self.entry
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "module".to_string())
    }

    pub fn args(&self, profile: Profile, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            self.entry.clone().into(),
            "--target".into(),
            WASM_TARGET.into(),
            "--crate-type".into(),
            "cdylib".into(),
        ];
        match profile {
            // opt-level 0 output is unreliable on this target
            Profile::Debug => args.extend(["-C", "debuginfo=2", "-C", "opt-level=1"].map(OsString::from)),
            Profile::Release => args.extend(["-C", "opt-level=3"].map(OsString::from)),
        }
        args.push("-o".into());
        args.push(output.into());
        args
    }
}

impl Compiler for Rustc {
    fn compile(&self, input_dir: &Path, cache_dir: &Path, profile: Profile) -> Result<Compiled, Error> {
        let name = self.name();
        let output = cache_dir.join(format!("{}.wasm", name));

        let mut command = Command::new(&self.program);
        command.args(self.args(profile, &output)).current_dir(input_dir);
        run(&self.program, &mut command)?;

        let wasm = read_output(&self.program, &output)?;
        Ok(Compiled { name, wasm })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Missing;

    impl Pass for Missing {
        fn name(&self) -> &str {
            "missing"
        }

        fn run(&self, _: &[u8]) -> Result<Vec<u8>, ToolError> {
            Err(ToolError::Unavailable {
                tool: "missing".to_string(),
            })
        }
    }

    struct Broken;

    impl Pass for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn run(&self, _: &[u8]) -> Result<Vec<u8>, ToolError> {
            Err(ToolError::Failed {
                tool: "broken".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "bad input".to_string(),
            })
        }
    }

    #[test]
    fn optional_pass_passes_through_when_unavailable() {
        let wasm = vec![0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00];
        assert_eq!(run_optional(&Missing, wasm.clone()).unwrap(), wasm);
    }

    #[test]
    fn optional_pass_propagates_other_failures() {
        let err = run_optional(&Broken, vec![]).unwrap_err();
        assert!(matches!(err, ToolError::Failed { .. }));
        assert_eq!(err.to_string(), "broken failed (exit status: 1): bad input");
    }

    #[test]
    fn missing_executable_is_unavailable() {
        let pass = WasmOpt {
            program: "wasmwrap-no-such-tool".to_string(),
        };
        assert!(matches!(pass.run(b"\0asm"), Err(ToolError::Unavailable { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn failing_executable_is_a_failure() {
        let pass = WasmGc {
            program: "false".to_string(),
        };
        assert!(matches!(pass.run(b"\0asm"), Err(ToolError::Failed { .. })));
    }

    #[test]
    fn cargo_args_follow_profile() {
        assert_eq!(Cargo::args(Profile::Debug), vec!["build", "--target", WASM_TARGET]);
        assert_eq!(
            Cargo::args(Profile::Release),
            vec!["build", "--target", WASM_TARGET, "--release"]
        );
    }

    #[test]
    fn rustc_args_follow_profile() {
        let rustc = Rustc {
            program: "rustc".to_string(),
            entry: PathBuf::from("lib.rs"),
        };
        assert_eq!(rustc.name(), "lib");
        let output = Path::new("/cache/lib.wasm");
        let debug: Vec<OsString> = rustc.args(Profile::Debug, output);
        assert!(debug.contains(&OsString::from("debuginfo=2")));
        assert!(debug.contains(&OsString::from("opt-level=1")));
        let release = rustc.args(Profile::Release, output);
        assert!(release.contains(&OsString::from("opt-level=3")));
        assert!(!release.contains(&OsString::from("debuginfo=2")));
        assert_eq!(release.last(), Some(&OsString::from("/cache/lib.wasm")));
    }

    #[test]
    fn crate_name_comes_from_the_manifest() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Cargo.toml"),
            "[package]\nname = \"hello-lib\"\nversion = \"0.1.0\"\n",
        )
        .unwrap();
        assert_eq!(Cargo::crate_name(dir.path()).unwrap(), "hello-lib");
    }

    #[test]
    fn missing_manifest_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(Cargo::crate_name(dir.path()), Err(Error::Io { .. })));
    }
}
