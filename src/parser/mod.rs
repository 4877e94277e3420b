//! Binary format decoder. Reads `.wasm` bytes into a [`module::ModuleDescriptor`].
//!
//! Only the sections that shape a module's interface are decoded (type,
//! import, function, table, memory, export) together with the counts needed
//! to check index spaces (global, code). Everything else is skipped by its
//! declared size.

pub mod cursor;
pub mod encoding;
pub mod error;
pub mod module;

use log::debug;

use cursor::{Cursor, Decoded};
use encoding::*;
pub use error::ParseError;
use module::{
    Export, ExportIndex, ExternalKind, Function, FunctionType, GlobalType, Import, Limits, Memory,
    ModuleDescriptor, TableType, ValueType,
};

/// Decodes a binary module into its descriptor.
///
/// Fails on malformed framing, lengths that run past the buffer, sections
/// that are duplicated or out of order, and any index that does not resolve
/// within its index space.
pub fn parse(binary: &[u8]) -> Result<ModuleDescriptor, ParseError> {
    let mut cursor = read_header(Cursor::new(binary))?;

    let mut module = ModuleDescriptor::default();
    let mut code_count = None;
    let mut last_order = 0;

    while !cursor.is_empty() {
        let offset = cursor.pos();
        let (id, next) = cursor.read_u8()?;
        let (size, next) = next.read_vu32()?;
        let (payload, next) = next.split(size as usize)?;
        cursor = next;

        debug!(
            "section #{} '{}' at 0x{:08x}, len = {}",
            id,
            section_name(id),
            offset,
            size
        );

        if id != SECTION_CUSTOM {
            let order = section_order(id).ok_or(ParseError::UnknownSection { id, offset })?;
            if order <= last_order {
                return Err(ParseError::SectionOutOfOrder { id, offset });
            }
            last_order = order;
        }

        let rest = match id {
            SECTION_CUSTOM => {
                let (name, rest) = payload.read_name()?;
                debug!("custom section '{}'", name);
                rest.skip(rest.remaining())?
            }
            SECTION_TYPE => read_into(payload, read_type_section, &mut module.types)?,
            SECTION_IMPORT => read_into(payload, read_import_section, &mut module.imports)?,
            SECTION_FUNCTION => read_into(payload, read_function_section, &mut module.functions)?,
            SECTION_TABLE => read_into(payload, read_table_section, &mut module.tables)?,
            SECTION_MEMORY => read_into(payload, read_memory_section, &mut module.memories)?,
            SECTION_GLOBAL => {
                let (count, rest) = payload.read_vu32()?;
                module.global_count = count;
                rest.skip(rest.remaining())?
            }
            SECTION_EXPORT => read_into(payload, read_export_section, &mut module.exports)?,
            SECTION_CODE => {
                let (count, rest) = payload.read_vu32()?;
                code_count = Some(count as usize);
                rest.skip(rest.remaining())?
            }
            _ => payload.skip(payload.remaining())?,
        };

        if !rest.is_empty() {
            return Err(ParseError::SectionSizeMismatch {
                id,
                declared: size as usize,
                consumed: size as usize - rest.remaining(),
            });
        }
    }

    resolve(&module, code_count.unwrap_or(0))?;
    Ok(module)
}

fn read_into<'a, T>(
    payload: Cursor<'a>,
    read: fn(Cursor<'a>) -> Decoded<'a, Vec<T>>,
    target: &mut Vec<T>,
) -> Result<Cursor<'a>, ParseError> {
    let (items, rest) = read(payload)?;
    *target = items;
    Ok(rest)
}

fn read_header(cursor: Cursor) -> Result<Cursor, ParseError> {
    let (magic, cursor) = cursor.read_bytes(4)?;
    if magic != MAGIC {
        return Err(ParseError::BadMagic(hex::encode(magic)));
    }
    let (version, cursor) = cursor.read_u32()?;
    if version != VERSION {
        return Err(ParseError::UnknownVersion(version));
    }
    Ok(cursor)
}

/* SECTION READERS ************************************************/

pub fn read_type_section(cursor: Cursor) -> Decoded<Vec<FunctionType>> {
    cursor.read_vec(read_function_type)
}

fn read_function_type(cursor: Cursor) -> Decoded<FunctionType> {
    let offset = cursor.pos();
    let (form, cursor) = cursor.read_u8()?;
    if form != TYPE_FUNC {
        return Err(ParseError::BadTypeForm { form, offset });
    }
    let (parameters, cursor) = cursor.read_vec(read_value_type)?;
    let (return_types, cursor) = cursor.read_vec(read_value_type)?;
    Ok((
        FunctionType {
            parameters,
            return_types,
        },
        cursor,
    ))
}

fn read_value_type(cursor: Cursor) -> Decoded<ValueType> {
    let (byte, cursor) = cursor.read_u8()?;
    Ok((ValueType::decode(byte), cursor))
}

pub fn read_import_section(cursor: Cursor) -> Decoded<Vec<Import>> {
    cursor.read_vec(read_import)
}

fn read_import(cursor: Cursor) -> Decoded<Import> {
    let (module, cursor) = cursor.read_name()?;
    let (name, cursor) = cursor.read_name()?;
    let offset = cursor.pos();
    let (tag, cursor) = cursor.read_u8()?;
    let (external_kind, cursor) = match tag {
        DESC_FUNC => {
            let (type_index, cursor) = cursor.read_vu32()?;
            (ExternalKind::Function(type_index), cursor)
        }
        DESC_TABLE => {
            let (table_type, cursor) = read_table_type(cursor)?;
            (ExternalKind::Table(table_type), cursor)
        }
        DESC_MEMORY => {
            let (limits, cursor) = read_limits(cursor)?;
            (ExternalKind::Memory(limits), cursor)
        }
        DESC_GLOBAL => {
            let (global_type, cursor) = read_global_type(cursor)?;
            (ExternalKind::Global(global_type), cursor)
        }
        _ => {
            return Err(ParseError::BadKind {
                context: "import",
                tag,
                offset,
            })
        }
    };

    debug!("import {}.{} kind = {}", module, name, external_kind);

    Ok((
        Import {
            module,
            name,
            external_kind,
        },
        cursor,
    ))
}

fn read_global_type(cursor: Cursor) -> Decoded<GlobalType> {
    let (value_type, cursor) = read_value_type(cursor)?;
    let offset = cursor.pos();
    let (mutability, cursor) = cursor.read_u8()?;
    let mutable = match mutability {
        0x00 => false,
        0x01 => true,
        tag => {
            return Err(ParseError::BadKind {
                context: "global mutability",
                tag,
                offset,
            })
        }
    };
    Ok((GlobalType { value_type, mutable }, cursor))
}

fn read_limits<'a>(cursor: Cursor<'a>) -> Decoded<'a, Limits> {
    let offset = cursor.pos();
    let (flags, cursor) = cursor.read_u8()?;
    if flags > LIMITS_MAX_FLAGS {
        return Err(ParseError::BadLimits { flags, offset });
    }
    // bounds are u32 unless the 64-bit flag is set
    let read_bound = |cursor: Cursor<'a>| {
        if flags & LIMITS_64 != 0 {
            cursor.read_vu64()
        } else {
            cursor.read_vu32().map(|(v, next)| (v as u64, next))
        }
    };
    let (min, cursor) = read_bound(cursor)?;
    if flags & LIMITS_HAS_MAX == 0 {
        return Ok((Limits { min, max: None }, cursor));
    }
    let (max, cursor) = read_bound(cursor)?;
    Ok((Limits { min, max: Some(max) }, cursor))
}

fn read_table_type(cursor: Cursor) -> Decoded<TableType> {
    let (element_type, cursor) = cursor.read_u8()?;
    let (limits, cursor) = read_limits(cursor)?;
    Ok((TableType { element_type, limits }, cursor))
}

pub fn read_function_section(cursor: Cursor) -> Decoded<Vec<Function>> {
    cursor.read_vec(|cursor| {
        let (ftype_index, cursor) = cursor.read_vu32()?;
        Ok((Function { ftype_index }, cursor))
    })
}

pub fn read_table_section(cursor: Cursor) -> Decoded<Vec<TableType>> {
    cursor.read_vec(read_table_type)
}

pub fn read_memory_section(cursor: Cursor) -> Decoded<Vec<Memory>> {
    cursor.read_vec(|cursor| {
        let (limits, cursor) = read_limits(cursor)?;
        Ok((Memory { limits }, cursor))
    })
}

pub fn read_export_section(cursor: Cursor) -> Decoded<Vec<Export>> {
    cursor.read_vec(|cursor| {
        let (name, cursor) = cursor.read_name()?;
        let offset = cursor.pos();
        let (tag, cursor) = cursor.read_u8()?;
        let (idx, cursor) = cursor.read_vu32()?;
        let index = match tag {
            DESC_FUNC => ExportIndex::Function(idx),
            DESC_TABLE => ExportIndex::Table(idx),
            DESC_MEMORY => ExportIndex::Memory(idx),
            DESC_GLOBAL => ExportIndex::Global(idx),
            _ => {
                return Err(ParseError::BadKind {
                    context: "export",
                    tag,
                    offset,
                })
            }
        };
        Ok((Export { name, index }, cursor))
    })
}

/* INDEX RESOLUTION ***********************************************/

fn resolve(module: &ModuleDescriptor, code_count: usize) -> Result<(), ParseError> {
    let type_count = module.types.len();

    for import in &module.imports {
        if let ExternalKind::Function(index) = import.external_kind {
            if index as usize >= type_count {
                return Err(ParseError::UnknownType {
                    context: format!("import {}.{}", import.module, import.name),
                    index,
                    count: type_count,
                });
            }
        }
    }

    let imported = module.imported_function_count();
    for (i, function) in module.functions.iter().enumerate() {
        if function.ftype_index as usize >= type_count {
            return Err(ParseError::UnknownType {
                context: format!("function {}", i + imported),
                index: function.ftype_index,
                count: type_count,
            });
        }
    }

    if code_count != module.functions.len() {
        return Err(ParseError::FunctionCodeMismatch {
            functions: module.functions.len(),
            bodies: code_count,
        });
    }

    for export in &module.exports {
        let space = export.index.space();
        let count = module.index_space_len(space);
        if export.index.index() as usize >= count {
            return Err(ParseError::UnknownExportIndex {
                name: export.name.clone(),
                space: space.name(),
                index: export.index.index(),
                count,
            });
        }
    }

    Ok(())
}
