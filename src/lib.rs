//! Packages Rust-compiled WebAssembly for JavaScript hosts.
//!
//! wasmwrap compiles a crate (or a single source file) to
//! `wasm32-unknown-unknown`, runs the post-processing passes, and emits one
//! of two artifacts:
//!
//! - the raw `.wasm` binary, or
//! - an ECMAScript module that embeds the binary and exposes a single
//!   `instantiate` factory, optionally with TypeScript declarations derived
//!   from the module's imports and exports.
//!
//! # Modules
//!
//! - [`parser`] -- Structural decoder. Reads just enough of a binary to build a
//!   [`parser::module::ModuleDescriptor`].
//! - [`bindings`] -- Type mapping, wrapper emission and declaration emission.
//! - [`toolchain`] -- The compiler and post-processing tools.
//! - [`pipeline`] -- Compile, post-process, generate and write.
//! - [`config`] -- Build and output configuration.
//!
//! # Example
//!
//! Generate a synchronous wrapper and its declarations for a binary:
//!
//! ```
//! use wasmwrap::bindings::{Artifacts, InstantiationMode};
//! use wasmwrap::config::OutputConfig;
//! use wasmwrap::parser::encoding::{self, write_name, write_section, write_vu32};
//!
//! // (func (export "answer") (result i32) i32.const 42)
//! let mut binary = encoding::MAGIC.to_vec();
//! binary.extend_from_slice(&encoding::VERSION.to_le_bytes());
//! write_section(&mut binary, encoding::SECTION_TYPE, &[0x01, 0x60, 0x00, 0x01, 0x7f]);
//! write_section(&mut binary, encoding::SECTION_FUNCTION, &[0x01, 0x00]);
//! let mut exports = Vec::new();
//! write_vu32(&mut exports, 1);
//! write_name(&mut exports, "answer");
//! exports.extend_from_slice(&[0x00, 0x00]);
//! write_section(&mut binary, encoding::SECTION_EXPORT, &exports);
//! write_section(&mut binary, encoding::SECTION_CODE, &[0x01, 0x04, 0x00, 0x41, 0x2a, 0x0b]);
//!
//! let output = OutputConfig::wrapper(InstantiationMode::Sync).with_declarations();
//! match wasmwrap::generate(&binary, &output).unwrap() {
//!     Artifacts::Bindings { wrapper, declarations } => {
//!         assert_eq!(wrapper.entry_point, "instantiate");
//!         assert!(declarations.unwrap().contains("answer(): number;"));
//!     }
//!     Artifacts::Binary(_) => unreachable!(),
//! }
//! ```

pub mod bindings;
pub mod config;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod toolchain;

pub use bindings::generate;
pub use error::Error;
