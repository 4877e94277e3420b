//! WebAssembly binary format constants and the small set of encoding
//! primitives needed to assemble modules by hand.
//!
//! Writers append directly into a caller-provided `&mut Vec<u8>` buffer.

// ---------------------------------------------------------------------------
// Preamble (§5.5.16)
// ---------------------------------------------------------------------------

pub const MAGIC: [u8; 4] = *b"\0asm";
pub const VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Section IDs (§5.5.2)
// ---------------------------------------------------------------------------

pub const SECTION_CUSTOM: u8 = 0;
pub const SECTION_TYPE: u8 = 1;
pub const SECTION_IMPORT: u8 = 2;
pub const SECTION_FUNCTION: u8 = 3;
pub const SECTION_TABLE: u8 = 4;
pub const SECTION_MEMORY: u8 = 5;
pub const SECTION_GLOBAL: u8 = 6;
pub const SECTION_EXPORT: u8 = 7;
pub const SECTION_START: u8 = 8;
pub const SECTION_ELEMENT: u8 = 9;
pub const SECTION_CODE: u8 = 10;
pub const SECTION_DATA: u8 = 11;
pub const SECTION_DATA_COUNT: u8 = 12;

/// Position of a non-custom section in the mandated order. The data count
/// section sits between element and code despite its higher id.
pub fn section_order(id: u8) -> Option<u8> {
    match id {
        SECTION_TYPE..=SECTION_ELEMENT => Some(id),
        SECTION_DATA_COUNT => Some(10),
        SECTION_CODE => Some(11),
        SECTION_DATA => Some(12),
        _ => None,
    }
}

pub fn section_name(id: u8) -> &'static str {
    match id {
        SECTION_CUSTOM => "custom",
        SECTION_TYPE => "type",
        SECTION_IMPORT => "import",
        SECTION_FUNCTION => "function",
        SECTION_TABLE => "table",
        SECTION_MEMORY => "memory",
        SECTION_GLOBAL => "global",
        SECTION_EXPORT => "export",
        SECTION_START => "start",
        SECTION_ELEMENT => "element",
        SECTION_CODE => "code",
        SECTION_DATA => "data",
        SECTION_DATA_COUNT => "datacount",
        _ => "unknown",
    }
}

// Type constructors (§5.3.6)
pub const TYPE_FUNC: u8 = 0x60;

// Number types (§5.3.1)
pub const VALTYPE_I32: u8 = 0x7f;
pub const VALTYPE_I64: u8 = 0x7e;
pub const VALTYPE_F32: u8 = 0x7d;
pub const VALTYPE_F64: u8 = 0x7c;

// Import/export descriptor kinds (§5.5.5, §5.5.10)
pub const DESC_FUNC: u8 = 0x00;
pub const DESC_TABLE: u8 = 0x01;
pub const DESC_MEMORY: u8 = 0x02;
pub const DESC_GLOBAL: u8 = 0x03;

// Limits flags (§5.3.7, plus the threads and memory64 proposals)
pub const LIMITS_HAS_MAX: u8 = 0x01;
pub const LIMITS_SHARED: u8 = 0x02;
pub const LIMITS_64: u8 = 0x04;
pub const LIMITS_MAX_FLAGS: u8 = 0x07;

// ---------------------------------------------------------------------------
// Unsigned LEB128
// ---------------------------------------------------------------------------

/// Appends the unsigned LEB128 encoding of a u64 value to `buf`.
fn write_vu(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            break;
        }
        byte |= 0x80;
        buf.push(byte);
    }
}

/// Appends the unsigned LEB128 encoding of a u32 value to `buf`.
pub fn write_vu32(buf: &mut Vec<u8>, v: u32) {
    write_vu(buf, v as u64);
}

/// Appends the unsigned LEB128 encoding of a u64 value to `buf`.
pub fn write_vu64(buf: &mut Vec<u8>, v: u64) {
    write_vu(buf, v);
}

/// Appends a length-prefixed UTF-8 name to `buf`.
pub fn write_name(buf: &mut Vec<u8>, name: &str) {
    write_vu32(buf, name.len() as u32);
    buf.extend_from_slice(name.as_bytes());
}

/// Appends a framed section (id, vu32 size, contents) to `buf`.
pub fn write_section(buf: &mut Vec<u8>, id: u8, contents: &[u8]) {
    buf.push(id);
    write_vu32(buf, contents.len() as u32);
    buf.extend_from_slice(contents);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_vu32(v: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        write_vu32(&mut buf, v);
        buf
    }

    #[test]
    fn test_write_vu32() {
        assert_eq!(encode_vu32(0), vec![0]);
        assert_eq!(encode_vu32(127), vec![0x7f]);
        assert_eq!(encode_vu32(16256), vec![0x80, 0x7f]);
        assert_eq!(encode_vu32(624485), vec![0b11100101, 0b10001110, 0b00100110]);
        assert_eq!(encode_vu32(0xffffffff), vec![0xff, 0xff, 0xff, 0xff, 0xf]);
    }

    #[test]
    fn code_and_data_count_are_reordered() {
        assert!(section_order(SECTION_ELEMENT) < section_order(SECTION_DATA_COUNT));
        assert!(section_order(SECTION_DATA_COUNT) < section_order(SECTION_CODE));
        assert!(section_order(SECTION_CODE) < section_order(SECTION_DATA));
        assert_eq!(section_order(SECTION_CUSTOM), None);
        assert_eq!(section_order(13), None);
    }

    #[test]
    fn write_section_frames_contents() {
        let mut buf = Vec::new();
        write_section(&mut buf, SECTION_TYPE, &[0x01, 0x60, 0x00, 0x00]);
        assert_eq!(buf, vec![0x01, 0x04, 0x01, 0x60, 0x00, 0x00]);
    }
}
