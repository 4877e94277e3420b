use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use env_logger::Env;

use wasmwrap::bindings::{self, InstantiationMode};
use wasmwrap::config::{BuildConfig, OutputConfig, Profile};
use wasmwrap::pipeline::{self, Paths, Toolchain};
use wasmwrap::{parser, Error};

#[derive(Parser)]
#[command(name = "wasmwrap")]
#[command(about = "Package Rust-compiled WebAssembly for JavaScript hosts", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log pipeline details
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a crate or source file and write its artifacts
    Build {
        /// Directory holding the crate (or the entry file)
        #[arg(default_value = ".")]
        input: PathBuf,

        /// Compile this single file with rustc instead of the crate with cargo
        #[arg(long)]
        entry: Option<PathBuf>,

        /// Build profile
        #[arg(long, value_enum, env = "WASMWRAP_PROFILE", default_value = "debug")]
        profile: Profile,

        /// Shorthand for --profile release
        #[arg(long)]
        release: bool,

        /// Emit a JavaScript wrapper instead of the raw binary (implied by --async)
        #[arg(long)]
        wrapper: bool,

        #[command(flatten)]
        bindings: BindingArgs,

        /// Directory for compiler output
        #[arg(long, default_value = "target/wasmwrap")]
        cache_dir: PathBuf,

        /// Directory the artifacts are written to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Generate a wrapper for an existing binary, without running any tools
    Bindings {
        module: PathBuf,

        #[command(flatten)]
        bindings: BindingArgs,

        /// Directory the artifacts are written to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Print the imports, exports and signatures of a binary
    Describe {
        module: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct BindingArgs {
    /// Instantiate asynchronously; the entry point returns a promise
    #[arg(long = "async")]
    asynchronous: bool,

    /// Also emit TypeScript declarations
    #[arg(long)]
    declarations: bool,
}

impl BindingArgs {
    fn mode(&self) -> InstantiationMode {
        if self.asynchronous {
            InstantiationMode::Async
        } else {
            InstantiationMode::Sync
        }
    }

    fn output(&self, wrapper: bool) -> OutputConfig {
        OutputConfig {
            wrapper: (wrapper || self.asynchronous).then(|| self.mode()),
            declarations: self.declarations,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    if let Err(e) = run(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Build {
            input,
            entry,
            profile,
            release,
            wrapper,
            bindings,
            cache_dir,
            out_dir,
        } => {
            let config = BuildConfig {
                profile: if release { Profile::Release } else { profile },
                entry,
                output: bindings.output(wrapper),
                ..BuildConfig::default()
            };
            let toolchain = Toolchain::from_config(&config);
            let paths = Paths {
                input_dir: input,
                cache_dir,
                out_dir,
            };
            pipeline::build(&config, &toolchain, &paths)?;
        }
        Command::Bindings {
            module,
            bindings: args,
            out_dir,
        } => {
            let binary = read(&module)?;
            let artifacts = bindings::generate(&binary, &args.output(true))?;
            pipeline::write_artifacts(&stem(&module), &artifacts, &out_dir)?;
        }
        Command::Describe { module, json } => {
            let descriptor = parser::parse(&read(&module)?)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&descriptor)?);
            } else {
                print!("{}", descriptor);
            }
        }
    }
    Ok(())
}

fn read(path: &Path) -> Result<Vec<u8>, Error> {
    fs::read(path).map_err(|source| Error::io(path, source))
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "module".to_string())
}
