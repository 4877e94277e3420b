//! TypeScript declarations for a wrapper: the `Imports` a caller must supply,
//! the `Exports` it gets back, and the typed factory.

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{HostSignature, TypeError};
use super::wrapper::ENTRY_POINT;
use super::InstantiationMode;
use crate::parser::module::{ExportIndex, ExternalKind, FunctionType, Import, IndexSpace, ModuleDescriptor};
use crate::parser::ParseError;

/// Import module whose functions the caller supplies.
pub const ENV_MODULE: &str = "env";

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeclarationError {
    #[error(transparent)]
    Type(#[from] TypeError),

    /// The descriptor references a signature or function it does not hold.
    #[error(transparent)]
    Unresolved(#[from] ParseError),
}

/// Emits the declaration file for `module`.
///
/// Fails without output if any signature in the generated surface uses a
/// type that has no host mapping, or if an env import or exported function
/// does not resolve to a signature.
pub fn emit_declarations(module: &ModuleDescriptor, mode: InstantiationMode) -> Result<String, DeclarationError> {
    let mut env_members = Vec::new();
    let mut omitted = Vec::new();
    for import in &module.imports {
        match import.external_kind {
            ExternalKind::Function(type_index) if import.module == ENV_MODULE => {
                let context = || format!("import {}.{}", import.module, import.name);
                let function_type = signature(module, type_index, context)?;
                env_members.push(method(&import.name, function_type)?);
            }
            _ => omitted.push(import),
        }
    }

    let mut export_members = Vec::new();
    for export in &module.exports {
        match export.index {
            ExportIndex::Function(idx) => {
                let type_index = module
                    .function_type_index(idx)
                    .ok_or_else(|| ParseError::UnknownExportIndex {
                        name: export.name.clone(),
                        space: IndexSpace::Function.name(),
                        index: idx,
                        count: module.index_space_len(IndexSpace::Function),
                    })?;
                let function_type = signature(module, type_index, || format!("function {}", idx))?;
                export_members.push(method(&export.name, function_type)?);
            }
            ExportIndex::Memory(_) => {
                export_members.push(format!("{}: WebAssembly.Memory;", member_name(&export.name)));
            }
            ExportIndex::Table(_) | ExportIndex::Global(_) => {}
        }
    }

    let mut result = String::new();

    if !omitted.is_empty() {
        result.push_str("/**\n * Imports resolved by the host runtime rather than the caller:\n");
        for import in omitted {
            warn!(
                "import {}.{} ({}) is left out of the generated Imports interface",
                import.module,
                import.name,
                kind_name(import)
            );
            result.push_str(&format!(" * - {}.{} ({})\n", import.module, import.name, kind_name(import)));
        }
        result.push_str(" */\n");
    }

    if env_members.is_empty() {
        result.push_str("export interface Imports {}\n");
    } else {
        result.push_str("export interface Imports {\n");
        result.push_str(&format!("  {}: {{\n", ENV_MODULE));
        for member in &env_members {
            result.push_str(&format!("    {}\n", member));
        }
        result.push_str("  };\n}\n");
    }
    result.push('\n');

    if export_members.is_empty() {
        result.push_str("export interface Exports {}\n");
    } else {
        result.push_str("export interface Exports {\n");
        for member in &export_members {
            result.push_str(&format!("  {}\n", member));
        }
        result.push_str("}\n");
    }
    result.push('\n');

    let returned = match mode {
        InstantiationMode::Sync => "Exports",
        InstantiationMode::Async => "Promise<Exports>",
    };
    result.push_str(&format!(
        "declare const {}: (imports: Imports) => {};\n",
        ENTRY_POINT, returned
    ));
    result.push_str(&format!("export default {};\n", ENTRY_POINT));

    Ok(result)
}

fn signature<F>(module: &ModuleDescriptor, type_index: u32, context: F) -> Result<&FunctionType, ParseError>
where
    F: FnOnce() -> String,
{
    module
        .types
        .get(type_index as usize)
        .ok_or_else(|| ParseError::UnknownType {
            context: context(),
            index: type_index,
            count: module.types.len(),
        })
}

fn method(name: &str, function_type: &FunctionType) -> Result<String, TypeError> {
    let signature = HostSignature::from_function_type(function_type)?;
    let parameters = signature
        .parameters
        .iter()
        .enumerate()
        .map(|(i, host_type)| format!("arg{}: {}", i, host_type))
        .collect::<Vec<String>>()
        .join(", ");
    Ok(format!("{}({}): {};", member_name(name), parameters, signature.result))
}

/// Plain identifiers are used as-is; anything else becomes a string-literal
/// member name.
fn member_name(name: &str) -> String {
    if IDENTIFIER.is_match(name) {
        name.to_string()
    } else {
        serde_json::Value::from(name).to_string()
    }
}

fn kind_name(import: &Import) -> &'static str {
    import.external_kind.space().name()
}
