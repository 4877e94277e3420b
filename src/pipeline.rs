//! The build pipeline: compile, post-process, generate, write.
//!
//! Each stage is fail-fast. Artifacts are generated in memory before anything
//! is written, so a failed generation leaves the output directory untouched,
//! and a failed write removes the files written before it.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::bindings::{self, Artifacts};
use crate::config::{BuildConfig, Profile};
use crate::error::Error;
use crate::toolchain::{self, Cargo, Compiler, Pass, Rustc, WasmGc, WasmOpt};

/// Runs the post-processing passes over a compiled binary.
///
/// Dead-code elimination always runs and must succeed. The size pass only
/// runs for release builds and is skipped if the tool is not installed.
pub fn post_process(wasm: Vec<u8>, profile: Profile, gc: &dyn Pass, opt: &dyn Pass) -> Result<Vec<u8>, Error> {
    let before = wasm.len();
    let mut wasm = gc.run(&wasm)?;
    info!("{}: {} -> {} bytes", gc.name(), before, wasm.len());

    if profile == Profile::Release {
        let before = wasm.len();
        wasm = toolchain::run_optional(opt, wasm)?;
        info!("{}: {} -> {} bytes", opt.name(), before, wasm.len());
    }
    Ok(wasm)
}

/// The external tools a build runs.
pub struct Toolchain {
    pub compiler: Box<dyn Compiler>,
    pub gc: Box<dyn Pass>,
    pub opt: Box<dyn Pass>,
}

impl Toolchain {
    /// rustc when an entry file is configured, cargo otherwise.
    pub fn from_config(config: &BuildConfig) -> Toolchain {
        let compiler: Box<dyn Compiler> = match &config.entry {
            Some(entry) => Box::new(Rustc {
                program: config.tools.rustc.clone(),
                entry: entry.clone(),
            }),
            None => Box::new(Cargo {
                program: config.tools.cargo.clone(),
            }),
        };
        Toolchain {
            compiler,
            gc: Box::new(WasmGc {
                program: config.tools.wasm_gc.clone(),
            }),
            opt: Box::new(WasmOpt {
                program: config.tools.wasm_opt.clone(),
            }),
        }
    }
}

/// Directories a build reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub input_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub out_dir: PathBuf,
}

/// Builds the source in `paths.input_dir` and writes the artifacts selected
/// by `config.output` to `paths.out_dir`. Returns the written files.
pub fn build(config: &BuildConfig, toolchain: &Toolchain, paths: &Paths) -> Result<Vec<PathBuf>, Error> {
    info!(
        "compiling {} ({} profile)",
        paths.input_dir.display(),
        config.profile.dir_name()
    );
    fs::create_dir_all(&paths.cache_dir).map_err(|source| Error::io(&paths.cache_dir, source))?;
    let compiled = toolchain
        .compiler
        .compile(&paths.input_dir, &paths.cache_dir, config.profile)?;
    info!("compiled {} ({} bytes)", compiled.name, compiled.wasm.len());

    let wasm = post_process(
        compiled.wasm,
        config.profile,
        toolchain.gc.as_ref(),
        toolchain.opt.as_ref(),
    )?;

    let artifacts = bindings::generate(&wasm, &config.output)?;
    write_artifacts(&compiled.name, &artifacts, &paths.out_dir)
}

/// Writes `<name>.wasm`, or `<name>.js` and an optional `<name>.d.ts`.
///
/// Either every file is written or none is left behind.
pub fn write_artifacts(name: &str, artifacts: &Artifacts, out_dir: &Path) -> Result<Vec<PathBuf>, Error> {
    fs::create_dir_all(out_dir).map_err(|source| Error::io(out_dir, source))?;

    let mut files: Vec<(PathBuf, &[u8])> = Vec::new();
    match artifacts {
        Artifacts::Binary(wasm) => files.push((out_dir.join(format!("{}.wasm", name)), wasm.as_slice())),
        Artifacts::Bindings { wrapper, declarations } => {
            files.push((out_dir.join(format!("{}.js", name)), wrapper.source.as_bytes()));
            if let Some(declarations) = declarations {
                files.push((out_dir.join(format!("{}.d.ts", name)), declarations.as_bytes()));
            }
        }
    }

    let mut written = Vec::with_capacity(files.len());
    for (path, contents) in files {
        if let Err(source) = fs::write(&path, contents) {
            remove_written(&written);
            return Err(Error::io(&path, source));
        }
        info!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

fn remove_written(written: &[PathBuf]) {
    for path in written {
        match fs::remove_file(path) {
            Ok(()) => info!("removed {}", path.display()),
            Err(err) => warn!("could not remove {}: {}", path.display(), err),
        }
    }
}
