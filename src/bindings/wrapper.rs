//! Instantiation wrapper: an ECMAScript module that carries the binary as
//! base64 and exposes a single factory function.

use base64::{engine::general_purpose, Engine as _};

use super::InstantiationMode;

/// Name of the factory function; the wrapper's default export is bound to it.
pub const ENTRY_POINT: &str = "instantiate";

/// Decodes base64 with Node's `Buffer` when present and `atob` otherwise.
const TO_BUFFER: &str = "const toBuffer = typeof Buffer === 'undefined'
  ? (str) => Uint8Array.from(atob(str), (c) => c.charCodeAt(0))
  : (str) => Buffer.from(str, 'base64');";

/// A generated wrapper module and the one callable it exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wrapper {
    pub source: String,
    pub entry_point: &'static str,
}

pub fn emit_wrapper(binary: &[u8], mode: InstantiationMode) -> Wrapper {
    let encoded = general_purpose::STANDARD.encode(binary);
    let mut source = String::with_capacity(encoded.len() + 512);

    source.push_str(TO_BUFFER);
    source.push('\n');
    source.push_str(&format!("const wasm = \"{}\";\n", encoded));
    match mode {
        InstantiationMode::Sync => {
            source.push_str("const mod = new WebAssembly.Module(toBuffer(wasm));\n");
            source.push_str(&format!(
                "function {}(imports) {{\n  return new WebAssembly.Instance(mod, imports).exports;\n}}\n",
                ENTRY_POINT
            ));
        }
        InstantiationMode::Async => {
            source.push_str(&format!(
                "async function {}(imports) {{\n  const mod = await WebAssembly.compile(toBuffer(wasm));\n  \
                 return (await WebAssembly.instantiate(mod, imports)).exports;\n}}\n",
                ENTRY_POINT
            ));
        }
    }
    source.push_str(&format!("export default {};\n", ENTRY_POINT));

    Wrapper {
        source,
        entry_point: ENTRY_POINT,
    }
}
