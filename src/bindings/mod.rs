//! Binding generation: the instantiation wrapper and its declarations.

pub mod declarations;
pub mod types;
pub mod wrapper;

use log::debug;

use crate::config::OutputConfig;
use crate::error::Error;
use crate::parser;
pub use declarations::{emit_declarations, DeclarationError};
pub use wrapper::{emit_wrapper, Wrapper};

/// How the generated entry point instantiates the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstantiationMode {
    /// Compiles once at load time and instantiates synchronously.
    Sync,
    /// Compiles and instantiates on every call, returning a promise.
    Async,
}

/// What [`generate`] produced for a binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifacts {
    /// No wrapper requested; the binary is passed on unchanged.
    Binary(Vec<u8>),
    Bindings {
        wrapper: Wrapper,
        declarations: Option<String>,
    },
}

/// Turns a post-processed binary into the requested artifacts.
///
/// When a wrapper is requested the binary is parsed first, so a malformed
/// module never yields a wrapper, and any unmappable type yields neither a
/// wrapper nor declarations.
///
/// ```
/// use wasmwrap::bindings::{generate, Artifacts, InstantiationMode};
/// use wasmwrap::config::OutputConfig;
///
/// let binary = b"\0asm\x01\0\0\0";
/// let output = OutputConfig::wrapper(InstantiationMode::Sync).with_declarations();
/// match generate(binary, &output).unwrap() {
///     Artifacts::Bindings { wrapper, declarations } => {
///         assert!(wrapper.source.ends_with("export default instantiate;\n"));
///         assert!(declarations.unwrap().contains("export interface Exports {}"));
///     }
///     Artifacts::Binary(_) => unreachable!(),
/// }
/// ```
pub fn generate(binary: &[u8], output: &OutputConfig) -> Result<Artifacts, Error> {
    let mode = match output.wrapper {
        Some(mode) => mode,
        None if output.declarations => return Err(Error::DeclarationsWithoutWrapper),
        None => return Ok(Artifacts::Binary(binary.to_vec())),
    };

    let module = parser::parse(binary)?;
    debug!(
        "parsed module: {} type(s), {} import(s), {} function(s), {} export(s)",
        module.types.len(),
        module.imports.len(),
        module.functions.len(),
        module.exports.len()
    );

    let declarations = if output.declarations {
        Some(emit_declarations(&module, mode)?)
    } else {
        None
    };

    Ok(Artifacts::Bindings {
        wrapper: emit_wrapper(binary, mode),
        declarations,
    })
}
