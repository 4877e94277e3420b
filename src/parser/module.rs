use std::fmt;

use serde::Serialize;

use crate::parser::encoding::{VALTYPE_F32, VALTYPE_F64, VALTYPE_I32, VALTYPE_I64};

/// The interface shape of a decoded module: signatures, imports, local
/// definitions and exports, each in binary declaration order.
///
/// Produced by [`crate::parser::parse`], which guarantees that every
/// function refers to an existing signature and every export index resolves
/// within its index space.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ModuleDescriptor {
    pub types: Vec<FunctionType>,
    pub imports: Vec<Import>,
    pub functions: Vec<Function>,
    pub tables: Vec<TableType>,
    pub memories: Vec<Memory>,
    /// Only the count is decoded; initializer expressions are skipped.
    pub global_count: u32,
    pub exports: Vec<Export>,
}

/// One of the four per-kind index spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSpace {
    Function,
    Table,
    Memory,
    Global,
}

impl IndexSpace {
    pub fn name(&self) -> &'static str {
        match self {
            IndexSpace::Function => "function",
            IndexSpace::Table => "table",
            IndexSpace::Memory => "memory",
            IndexSpace::Global => "global",
        }
    }
}

impl ModuleDescriptor {
    /// Number of imports of the given kind; these occupy the low indices of
    /// that kind's index space.
    pub fn imported_count(&self, space: IndexSpace) -> usize {
        self.imports
            .iter()
            .filter(|import| import.external_kind.space() == space)
            .count()
    }

    pub fn imported_function_count(&self) -> usize {
        self.imported_count(IndexSpace::Function)
    }

    /// Imported entities of the kind followed by local definitions.
    pub fn index_space_len(&self, space: IndexSpace) -> usize {
        let local = match space {
            IndexSpace::Function => self.functions.len(),
            IndexSpace::Table => self.tables.len(),
            IndexSpace::Memory => self.memories.len(),
            IndexSpace::Global => self.global_count as usize,
        };
        self.imported_count(space) + local
    }

    /// Signature index of a function in the joint (imports, then locals)
    /// function index space.
    pub fn function_type_index(&self, func_index: u32) -> Option<u32> {
        let func_index = func_index as usize;
        let imported = self.imports.iter().filter_map(|import| match import.external_kind {
            ExternalKind::Function(type_index) => Some(type_index),
            _ => None,
        });
        let local = self.functions.iter().map(|function| function.ftype_index);
        imported.chain(local).nth(func_index)
    }

    pub fn function_type(&self, func_index: u32) -> Option<&FunctionType> {
        self.function_type_index(func_index)
            .and_then(|type_index| self.types.get(type_index as usize))
    }

    /// Function-kind exports paired with their resolved signatures.
    pub fn exported_functions(&self) -> impl Iterator<Item = (&Export, &FunctionType)> + '_ {
        self.exports.iter().filter_map(move |export| match export.index {
            ExportIndex::Function(idx) => self.function_type(idx).map(|ftype| (export, ftype)),
            _ => None,
        })
    }

    pub fn exported_memories(&self) -> impl Iterator<Item = &Export> + '_ {
        self.exports
            .iter()
            .filter(|export| matches!(export.index, ExportIndex::Memory(_)))
    }

    /// Function-kind imports paired with their signatures.
    pub fn imported_functions(&self) -> impl Iterator<Item = (&Import, &FunctionType)> + '_ {
        self.imports.iter().filter_map(move |import| match import.external_kind {
            ExternalKind::Function(type_index) => self
                .types
                .get(type_index as usize)
                .map(|ftype| (import, ftype)),
            _ => None,
        })
    }
}

impl fmt::Display for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Type[{}]:", self.types.len())?;
        for (i, function_type) in self.types.iter().enumerate() {
            writeln!(f, " - type[{}] {}", i, function_type)?;
        }
        writeln!(f, "Import[{}]:", self.imports.len())?;
        for (i, import) in self.imports.iter().enumerate() {
            writeln!(f, " - import[{}] {}", i, import)?;
        }
        let imported = self.imported_function_count();
        writeln!(f, "Function[{}]:", self.functions.len())?;
        for (i, function) in self.functions.iter().enumerate() {
            writeln!(f, " - func[{}] sig={}", i + imported, function.ftype_index)?;
        }
        writeln!(f, "Table[{}]:", self.tables.len())?;
        for (i, table) in self.tables.iter().enumerate() {
            writeln!(f, " - table[{}] {}", i, table)?;
        }
        writeln!(f, "Memory[{}]:", self.memories.len())?;
        for (i, memory) in self.memories.iter().enumerate() {
            writeln!(f, " - memory[{}] pages: {}", i, memory.limits)?;
        }
        writeln!(f, "Global[{}]", self.global_count)?;
        writeln!(f, "Export[{}]:", self.exports.len())?;
        for export in &self.exports {
            writeln!(f, " - {} -> \"{}\"", export.index, export.name)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionType {
    pub parameters: Vec<ValueType>,
    pub return_types: Vec<ValueType>,
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let join = |types: &[ValueType]| {
            types
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<String>>()
                .join(", ")
        };
        write!(
            f,
            "({}) -> {}",
            join(&self.parameters),
            match self.return_types.len() {
                0 => "nil".to_string(),
                1 => join(&self.return_types),
                _ => format!("({})", join(&self.return_types)),
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Import {
    pub module: String,
    pub name: String,
    pub external_kind: ExternalKind,
}

impl fmt::Display for Import {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} <- {}.{}", self.external_kind, self.module, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExternalKind {
    Function(u32), // typeidx
    Table(TableType),
    Memory(Limits),
    Global(GlobalType),
}

impl ExternalKind {
    pub fn space(&self) -> IndexSpace {
        match self {
            ExternalKind::Function(_) => IndexSpace::Function,
            ExternalKind::Table(_) => IndexSpace::Table,
            ExternalKind::Memory(_) => IndexSpace::Memory,
            ExternalKind::Global(_) => IndexSpace::Global,
        }
    }
}

impl fmt::Display for ExternalKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExternalKind::Function(typeidx) => write!(f, "func sig={}", typeidx),
            ExternalKind::Table(table_type) => write!(f, "table {}", table_type),
            ExternalKind::Memory(limits) => write!(f, "memory pages: {}", limits),
            ExternalKind::Global(global_type) => write!(f, "global {}", global_type),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Function {
    pub ftype_index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Limits {
    pub min: u64,
    pub max: Option<u64>,
}

impl fmt::Display for Limits {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "initial={}", self.min)?;
        if let Some(max) = self.max {
            write!(f, " max={}", max)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableType {
    /// Raw reference type tag (0x70 funcref, 0x6f externref).
    pub element_type: u8,
    pub limits: Limits,
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "type=0x{:02x} {}", self.element_type, self.limits)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Memory {
    pub limits: Limits,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalType {
    pub value_type: ValueType,
    pub mutable: bool,
}

impl fmt::Display for GlobalType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} mutable={}", self.value_type, self.mutable)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExportIndex {
    Function(u32),
    Table(u32),
    Memory(u32),
    Global(u32),
}

impl ExportIndex {
    pub fn space(&self) -> IndexSpace {
        match self {
            ExportIndex::Function(_) => IndexSpace::Function,
            ExportIndex::Table(_) => IndexSpace::Table,
            ExportIndex::Memory(_) => IndexSpace::Memory,
            ExportIndex::Global(_) => IndexSpace::Global,
        }
    }

    pub fn index(&self) -> u32 {
        match *self {
            ExportIndex::Function(idx)
            | ExportIndex::Table(idx)
            | ExportIndex::Memory(idx)
            | ExportIndex::Global(idx) => idx,
        }
    }
}

impl fmt::Display for ExportIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}[{}]", self.space().name(), self.index())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Export {
    pub name: String,
    pub index: ExportIndex,
}

/// A value type as it appears in a signature. Only the four number types
/// are understood; any other tag is carried verbatim so that type mapping
/// can report it.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Serialize)]
pub enum ValueType {
    I32,
    I64,
    F32,
    F64,
    Unsupported(u8),
}

impl ValueType {
    pub fn decode(byte: u8) -> Self {
        match byte {
            VALTYPE_I32 => ValueType::I32,
            VALTYPE_I64 => ValueType::I64,
            VALTYPE_F32 => ValueType::F32,
            VALTYPE_F64 => ValueType::F64,
            other => ValueType::Unsupported(other),
        }
    }

    pub fn tag(&self) -> u8 {
        match *self {
            ValueType::I32 => VALTYPE_I32,
            ValueType::I64 => VALTYPE_I64,
            ValueType::F32 => VALTYPE_F32,
            ValueType::F64 => VALTYPE_F64,
            ValueType::Unsupported(tag) => tag,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValueType::I32 => write!(f, "i32"),
            ValueType::I64 => write!(f, "i64"),
            ValueType::F32 => write!(f, "f32"),
            ValueType::F64 => write!(f, "f64"),
            ValueType::Unsupported(tag) => write!(f, "<0x{:02x}>", tag),
        }
    }
}
