//! Common test utilities shared between integration tests
#![allow(dead_code)]

use wasmwrap::parser::encoding::{self, write_name, write_section, write_vu32};

/// Assembles a module from `(id, payload)` pairs, in the order given.
pub fn module(sections: &[(u8, Vec<u8>)]) -> Vec<u8> {
    let mut binary = encoding::MAGIC.to_vec();
    binary.extend_from_slice(&encoding::VERSION.to_le_bytes());
    for (id, payload) in sections {
        write_section(&mut binary, *id, payload);
    }
    binary
}

/// A vector of already-encoded items.
pub fn vec_of(items: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = Vec::new();
    write_vu32(&mut buf, items.len() as u32);
    for item in items {
        buf.extend_from_slice(item);
    }
    buf
}

pub fn func_type(parameters: &[u8], results: &[u8]) -> Vec<u8> {
    let mut buf = vec![encoding::TYPE_FUNC];
    write_vu32(&mut buf, parameters.len() as u32);
    buf.extend_from_slice(parameters);
    write_vu32(&mut buf, results.len() as u32);
    buf.extend_from_slice(results);
    buf
}

pub fn import(module: &str, name: &str, kind: u8, desc: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    write_name(&mut buf, module);
    write_name(&mut buf, name);
    buf.push(kind);
    buf.extend_from_slice(desc);
    buf
}

pub fn export(name: &str, kind: u8, index: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    write_name(&mut buf, name);
    buf.push(kind);
    write_vu32(&mut buf, index);
    buf
}

/// A function body with no locals.
pub fn body(instructions: &[u8]) -> Vec<u8> {
    let mut contents = vec![0x00];
    contents.extend_from_slice(instructions);
    let mut buf = Vec::new();
    write_vu32(&mut buf, contents.len() as u32);
    buf.extend_from_slice(&contents);
    buf
}

/// `fibonacci(n: f64) -> f64`, recursive, with `fibonacci(0) == 0`.
pub fn fibonacci() -> Vec<u8> {
    let f64_const = |v: f64| {
        let mut buf = vec![0x44];
        buf.extend_from_slice(&v.to_le_bytes());
        buf
    };

    let mut code = vec![0x20, 0x00];
    code.extend(f64_const(2.0));
    code.extend([0x63, 0x04, 0x7c, 0x20, 0x00, 0x05]); // f64.lt, if (result f64), local.get 0, else
    code.extend([0x20, 0x00]);
    code.extend(f64_const(1.0));
    code.extend([0xa1, 0x10, 0x00]); // f64.sub, call 0
    code.extend([0x20, 0x00]);
    code.extend(f64_const(2.0));
    code.extend([0xa1, 0x10, 0x00, 0xa0, 0x0b, 0x0b]); // f64.sub, call 0, f64.add, end, end

    module(&[
        (
            encoding::SECTION_TYPE,
            vec_of(&[func_type(&[encoding::VALTYPE_F64], &[encoding::VALTYPE_F64])]),
        ),
        (encoding::SECTION_FUNCTION, vec_of(&[vec![0x00]])),
        (
            encoding::SECTION_EXPORT,
            vec_of(&[export("fibonacci", encoding::DESC_FUNC, 0)]),
        ),
        (encoding::SECTION_CODE, vec_of(&[body(&code)])),
    ])
}

/// Imports `env.log(i32)` and exports `run() -> i32`, which calls it.
pub fn env_import_module() -> Vec<u8> {
    module(&[
        (
            encoding::SECTION_TYPE,
            vec_of(&[
                func_type(&[encoding::VALTYPE_I32], &[]),
                func_type(&[], &[encoding::VALTYPE_I32]),
            ]),
        ),
        (
            encoding::SECTION_IMPORT,
            vec_of(&[import("env", "log", encoding::DESC_FUNC, &[0x00])]),
        ),
        (encoding::SECTION_FUNCTION, vec_of(&[vec![0x01]])),
        (encoding::SECTION_EXPORT, vec_of(&[export("run", encoding::DESC_FUNC, 1)])),
        (
            encoding::SECTION_CODE,
            vec_of(&[body(&[0x41, 0x07, 0x10, 0x00, 0x41, 0x01, 0x0b])]),
        ),
    ])
}

/// Exports `splat(v128)`, which has no host mapping.
pub fn v128_module() -> Vec<u8> {
    module(&[
        (encoding::SECTION_TYPE, vec_of(&[func_type(&[0x7b], &[])])),
        (encoding::SECTION_FUNCTION, vec_of(&[vec![0x00]])),
        (encoding::SECTION_EXPORT, vec_of(&[export("splat", encoding::DESC_FUNC, 0)])),
        (encoding::SECTION_CODE, vec_of(&[body(&[0x0b])])),
    ])
}
