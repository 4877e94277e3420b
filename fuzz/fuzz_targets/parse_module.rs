#![no_main]

use libfuzzer_sys::fuzz_target;

use wasmwrap::bindings::{emit_declarations, DeclarationError, InstantiationMode};
use wasmwrap::parser;

fuzz_target!(|data: &[u8]| {
    // Any input must either parse or fail cleanly, and every index in a parsed
    // module must resolve when declarations are emitted from it.
    if let Ok(module) = parser::parse(data) {
        if let Err(DeclarationError::Unresolved(err)) = emit_declarations(&module, InstantiationMode::Sync) {
            panic!("parsed module does not resolve: {}", err);
        }
    }
});
