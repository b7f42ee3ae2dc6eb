use crate::error::ScanError;

const MAGIC: u32 = 0xCAFE_BABE;
// 45 = JDK 1.1, 69 = Java 25. Anything outside is either not a class file
// or newer than the constant-pool layout implemented here.
const MIN_MAJOR_VERSION: u16 = 45;
const MAX_MAJOR_VERSION: u16 = 69;

/// One symbolic member reference as written in the constant pool. The owner
/// is the literal type named at the site, which may be an ancestor of the
/// runtime owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRef {
    pub owner: String,
    pub name: String,
    pub descriptor: String,
}

#[derive(Debug, Clone)]
pub struct DeclaredMember {
    pub name: String,
    pub descriptor: String,
    pub deprecated: bool,
}

/// Everything downstream analysis needs from one class file. `super_name`
/// is `None` only for the platform root type; the ref vectors hold every
/// invoke / field-access site found in method bytecode, in code order.
#[derive(Debug, Clone)]
pub struct ClassSummary {
    pub name: String,
    pub super_name: Option<String>,
    pub interfaces: Vec<String>,
    pub method_refs: Vec<MemberRef>,
    pub field_refs: Vec<MemberRef>,
    pub deprecated: bool,
    pub declared_methods: Vec<DeclaredMember>,
    pub declared_fields: Vec<DeclaredMember>,
}

/// Decode one class file.
pub fn decode(bytes: &[u8]) -> Result<ClassSummary, ScanError> {
    let mut r = Cursor::new(bytes);

    if r.u32()? != MAGIC {
        return Err(ScanError::malformed("bad magic number"));
    }
    let _minor = r.u16()?;
    let major = r.u16()?;
    if !(MIN_MAJOR_VERSION..=MAX_MAJOR_VERSION).contains(&major) {
        return Err(ScanError::malformed(format!(
            "unsupported major version {major}"
        )));
    }

    let pool = ConstantPool::read(&mut r)?;

    let _access_flags = r.u16()?;
    let name = pool.class_name(r.u16()?)?.to_string();
    let super_index = r.u16()?;
    let super_name = if super_index == 0 {
        None
    } else {
        Some(pool.class_name(super_index)?.to_string())
    };

    let interface_count = r.u16()?;
    let mut interfaces = Vec::with_capacity(interface_count as usize);
    for _ in 0..interface_count {
        interfaces.push(pool.class_name(r.u16()?)?.to_string());
    }

    let mut method_refs = Vec::new();
    let mut field_refs = Vec::new();

    let field_count = r.u16()?;
    let mut declared_fields = Vec::with_capacity(field_count as usize);
    for _ in 0..field_count {
        let _access = r.u16()?;
        let member_name = pool.utf8(r.u16()?)?.to_string();
        let descriptor = pool.utf8(r.u16()?)?.to_string();
        let mut deprecated = false;
        read_attributes(&mut r, &pool, |attr_name, _| {
            if attr_name == "Deprecated" {
                deprecated = true;
            }
            Ok(())
        })?;
        declared_fields.push(DeclaredMember {
            name: member_name,
            descriptor,
            deprecated,
        });
    }

    let method_count = r.u16()?;
    let mut declared_methods = Vec::with_capacity(method_count as usize);
    for _ in 0..method_count {
        let _access = r.u16()?;
        let member_name = pool.utf8(r.u16()?)?.to_string();
        let descriptor = pool.utf8(r.u16()?)?.to_string();
        let mut deprecated = false;
        read_attributes(&mut r, &pool, |attr_name, attr_bytes| {
            match attr_name {
                "Deprecated" => deprecated = true,
                "Code" => {
                    scan_code_attribute(&pool, attr_bytes, &mut method_refs, &mut field_refs)?
                }
                _ => {}
            }
            Ok(())
        })?;
        declared_methods.push(DeclaredMember {
            name: member_name,
            descriptor,
            deprecated,
        });
    }

    let mut deprecated = false;
    read_attributes(&mut r, &pool, |attr_name, _| {
        if attr_name == "Deprecated" {
            deprecated = true;
        }
        Ok(())
    })?;

    Ok(ClassSummary {
        name,
        super_name,
        interfaces,
        method_refs,
        field_refs,
        deprecated,
        declared_methods,
        declared_fields,
    })
}

enum CpEntry {
    Utf8(String),
    Class { name_index: u16 },
    FieldRef { class_index: u16, nat_index: u16 },
    MethodRef { class_index: u16, nat_index: u16 },
    NameAndType { name_index: u16, descriptor_index: u16 },
    // String/Integer/Float/Long/Double/MethodHandle/MethodType/Dynamic/
    // InvokeDynamic/Module/Package carry nothing we resolve, and the second
    // slot of a Long/Double entry is not addressable at all.
    Other,
}

struct ConstantPool {
    entries: Vec<CpEntry>,
}

impl ConstantPool {
    fn read(r: &mut Cursor<'_>) -> Result<Self, ScanError> {
        let count = r.u16()?;
        if count == 0 {
            return Err(ScanError::malformed("constant pool count of zero"));
        }
        // Index 0 is unused by the format; keep a placeholder so entries can
        // be addressed directly by pool index.
        let mut entries = Vec::with_capacity(count as usize);
        entries.push(CpEntry::Other);

        while entries.len() < count as usize {
            let tag = r.u8()?;
            let entry = match tag {
                1 => {
                    let len = r.u16()? as usize;
                    let raw = r.take(len)?;
                    CpEntry::Utf8(String::from_utf8_lossy(raw).into_owned())
                }
                7 => CpEntry::Class { name_index: r.u16()? },
                9 => CpEntry::FieldRef {
                    class_index: r.u16()?,
                    nat_index: r.u16()?,
                },
                // Methodref and InterfaceMethodref resolve identically.
                10 | 11 => CpEntry::MethodRef {
                    class_index: r.u16()?,
                    nat_index: r.u16()?,
                },
                12 => CpEntry::NameAndType {
                    name_index: r.u16()?,
                    descriptor_index: r.u16()?,
                },
                8 | 16 | 19 | 20 => {
                    r.skip(2)?;
                    CpEntry::Other
                }
                3 | 4 => {
                    r.skip(4)?;
                    CpEntry::Other
                }
                15 => {
                    r.skip(3)?;
                    CpEntry::Other
                }
                17 | 18 => {
                    r.skip(4)?;
                    CpEntry::Other
                }
                5 | 6 => {
                    r.skip(8)?;
                    entries.push(CpEntry::Other);
                    CpEntry::Other
                }
                other => {
                    return Err(ScanError::malformed(format!(
                        "unknown constant pool tag {other}"
                    )));
                }
            };
            entries.push(entry);
        }

        Ok(Self { entries })
    }

    fn get(&self, index: u16) -> Result<&CpEntry, ScanError> {
        self.entries
            .get(index as usize)
            .filter(|_| index != 0)
            .ok_or_else(|| {
                ScanError::malformed(format!("constant pool index {index} out of range"))
            })
    }

    fn utf8(&self, index: u16) -> Result<&str, ScanError> {
        match self.get(index)? {
            CpEntry::Utf8(s) => Ok(s),
            _ => Err(ScanError::malformed(format!(
                "constant pool index {index} is not a Utf8 entry"
            ))),
        }
    }

    fn class_name(&self, index: u16) -> Result<&str, ScanError> {
        match self.get(index)? {
            CpEntry::Class { name_index } => self.utf8(*name_index),
            _ => Err(ScanError::malformed(format!(
                "constant pool index {index} is not a Class entry"
            ))),
        }
    }

    fn name_and_type(&self, index: u16) -> Result<(&str, &str), ScanError> {
        match self.get(index)? {
            CpEntry::NameAndType {
                name_index,
                descriptor_index,
            } => Ok((self.utf8(*name_index)?, self.utf8(*descriptor_index)?)),
            _ => Err(ScanError::malformed(format!(
                "constant pool index {index} is not a NameAndType entry"
            ))),
        }
    }

    fn method_ref(&self, index: u16) -> Result<MemberRef, ScanError> {
        match self.get(index)? {
            CpEntry::MethodRef {
                class_index,
                nat_index,
            } => self.member_ref(*class_index, *nat_index),
            _ => Err(ScanError::malformed(format!(
                "constant pool index {index} is not a method reference"
            ))),
        }
    }

    fn field_ref(&self, index: u16) -> Result<MemberRef, ScanError> {
        match self.get(index)? {
            CpEntry::FieldRef {
                class_index,
                nat_index,
            } => self.member_ref(*class_index, *nat_index),
            _ => Err(ScanError::malformed(format!(
                "constant pool index {index} is not a field reference"
            ))),
        }
    }

    fn member_ref(&self, class_index: u16, nat_index: u16) -> Result<MemberRef, ScanError> {
        let owner = self.class_name(class_index)?;
        let (name, descriptor) = self.name_and_type(nat_index)?;
        Ok(MemberRef {
            owner: owner.to_string(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        })
    }
}

fn read_attributes(
    r: &mut Cursor<'_>,
    pool: &ConstantPool,
    mut on_attr: impl FnMut(&str, &[u8]) -> Result<(), ScanError>,
) -> Result<(), ScanError> {
    let count = r.u16()?;
    for _ in 0..count {
        let name = pool.utf8(r.u16()?)?;
        let len = r.u32()? as usize;
        let bytes = r.take(len)?;
        on_attr(name, bytes)?;
    }
    Ok(())
}

fn scan_code_attribute(
    pool: &ConstantPool,
    attr_bytes: &[u8],
    method_refs: &mut Vec<MemberRef>,
    field_refs: &mut Vec<MemberRef>,
) -> Result<(), ScanError> {
    let mut r = Cursor::new(attr_bytes);
    r.skip(4)?; // max_stack, max_locals
    let code_len = r.u32()? as usize;
    let code = r.take(code_len)?;
    // Exception table and nested attributes (LineNumberTable, StackMapTable,
    // LocalVariableTable) are ignored.
    scan_code(pool, code, method_refs, field_refs)
}

// Only opcode operand widths matter here; no semantics are interpreted.
fn scan_code(
    pool: &ConstantPool,
    code: &[u8],
    method_refs: &mut Vec<MemberRef>,
    field_refs: &mut Vec<MemberRef>,
) -> Result<(), ScanError> {
    let mut r = Cursor::new(code);
    while !r.at_end() {
        let op = r.u8()?;
        match op {
            // getstatic, putstatic, getfield, putfield
            0xb2..=0xb5 => field_refs.push(pool.field_ref(r.u16()?)?),
            // invokevirtual, invokespecial, invokestatic
            0xb6..=0xb8 => method_refs.push(pool.method_ref(r.u16()?)?),
            // invokeinterface: index, count, zero byte
            0xb9 => {
                method_refs.push(pool.method_ref(r.u16()?)?);
                r.skip(2)?;
            }
            // invokedynamic sites have no literal owner class; skipped on
            // purpose, same as the reference scanner this replaces.
            0xba => r.skip(4)?,
            // tableswitch: 0-3 pad bytes to a 4-byte boundary, then
            // default/low/high and (high - low + 1) jump offsets
            0xaa => {
                r.skip((4 - r.pos() % 4) % 4)?;
                r.skip(4)?;
                let low = r.i32()?;
                let high = r.i32()?;
                if low > high {
                    return Err(ScanError::malformed("tableswitch with low > high"));
                }
                let entries = (i64::from(high) - i64::from(low) + 1) as usize;
                r.skip(entries * 4)?;
            }
            // lookupswitch: pad, default, npairs, then npairs match/offset pairs
            0xab => {
                r.skip((4 - r.pos() % 4) % 4)?;
                r.skip(4)?;
                let npairs = r.i32()?;
                if npairs < 0 {
                    return Err(ScanError::malformed("lookupswitch with negative npairs"));
                }
                r.skip(npairs as usize * 8)?;
            }
            // wide: widened form of a load/store/ret, or of iinc
            0xc4 => {
                let widened = r.u8()?;
                r.skip(if widened == 0x84 { 4 } else { 2 })?;
            }
            other => r.skip(plain_operand_width(other)?)?,
        }
    }
    Ok(())
}

/// Operand byte count for every fixed-width opcode not handled explicitly in
/// `scan_code`.
fn plain_operand_width(op: u8) -> Result<usize, ScanError> {
    Ok(match op {
        // nop, consts, array loads/stores, stack ops, arithmetic,
        // conversions, comparisons, returns, arraylength, athrow, monitors
        0x00..=0x0f
        | 0x1a..=0x35
        | 0x3b..=0x83
        | 0x85..=0x98
        | 0xac..=0xb1
        | 0xbe
        | 0xbf
        | 0xc2
        | 0xc3 => 0,
        // bipush, ldc, local loads/stores, newarray, ret
        0x10 | 0x12 | 0x15..=0x19 | 0x36..=0x3a | 0xa9 | 0xbc => 1,
        // sipush, ldc_w, ldc2_w, iinc, branches, new, anewarray,
        // checkcast, instanceof, ifnull, ifnonnull
        0x11 | 0x13 | 0x14 | 0x84 | 0x99..=0xa8 | 0xbb | 0xbd | 0xc0 | 0xc1 | 0xc6 | 0xc7 => 2,
        // multianewarray
        0xc5 => 3,
        // goto_w, jsr_w
        0xc8 | 0xc9 => 4,
        other => {
            return Err(ScanError::malformed(format!(
                "unknown opcode 0x{other:02x}"
            )));
        }
    })
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn pos(&self) -> usize {
        self.pos
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ScanError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| ScanError::malformed("unexpected end of class file"))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn skip(&mut self, n: usize) -> Result<(), ScanError> {
        self.take(n).map(|_| ())
    }

    fn u8(&mut self) -> Result<u8, ScanError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, ScanError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, ScanError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn i32(&mut self) -> Result<i32, ScanError> {
        Ok(self.u32()? as i32)
    }
}
