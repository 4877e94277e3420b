//! Mapping from WebAssembly value types to the host (TypeScript) types used
//! in generated declarations.

use std::fmt;

use thiserror::Error;

use crate::parser::module::{FunctionType, ValueType};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("unsupported value type 0x{tag:02x}")]
    UnsupportedType { tag: u8 },

    #[error("unsupported multi-value return of {count} results")]
    MultiValueReturn { count: usize },
}

/// Every number crosses the boundary as a JS number, whatever its width or
/// int/float-ness; `Void` only appears in return position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostType {
    Number,
    Void,
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HostType::Number => write!(f, "number"),
            HostType::Void => write!(f, "void"),
        }
    }
}

pub fn host_type(value_type: ValueType) -> Result<HostType, TypeError> {
    match value_type {
        ValueType::I32 | ValueType::I64 | ValueType::F32 | ValueType::F64 => Ok(HostType::Number),
        ValueType::Unsupported(tag) => Err(TypeError::UnsupportedType { tag }),
    }
}

pub fn return_type(return_types: &[ValueType]) -> Result<HostType, TypeError> {
    match return_types {
        [] => Ok(HostType::Void),
        [value_type] => host_type(*value_type),
        _ => Err(TypeError::MultiValueReturn {
            count: return_types.len(),
        }),
    }
}

/// A signature with every type mapped, or the first type that has no mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSignature {
    pub parameters: Vec<HostType>,
    pub result: HostType,
}

impl HostSignature {
    pub fn from_function_type(function_type: &FunctionType) -> Result<HostSignature, TypeError> {
        let parameters = function_type
            .parameters
            .iter()
            .map(|value_type| host_type(*value_type))
            .collect::<Result<Vec<_>, _>>()?;
        let result = return_type(&function_type.return_types)?;
        Ok(HostSignature { parameters, result })
    }
}
