//! # Constant Pool
//! Entries in the constant pool start at 1, and indices into the pool are
//! likewise 1-based. Each entry is comprised of a 1-byte tag, followed by a
//! variable length of bytes decided by the type of constant.
//!
//! ### Oddities
//! Utf8 constants aren't actually UTF-8, but a slightly modified UTF-8 as
//! described in §4.4.7
//!
//! Long and Double entries take up two slots in the constant pool, but the
//! upper entry is never directly referenced.
//! ```txt
//! Constant::Utf8 // tag = 1
//! {
//!     tag:    u8
//!     length: u16
//!     data:   [u8; length]
//! }
//!
//! Constant::Integer // tag = 3
//! Constant::Float // tag = 4
//! {
//!     tag:  u8
//!     data: u32
//! }
//!
//! Constant::Long // tag = 5
//! Constant::Double // tag = 6
//! {
//!     tag:  u8
//!     data: u64
//! }
//!
//! Constant::Class // tag = 7
//! Constant::String // tag = 8
//! Constant::MethodType // tag = 16
//! Constant::Module // tag = 19
//! Constant::Package // tag = 20
//! {
//!     tag:   u8
//!     index: u16
//! }
//!
//! Constant::FieldRef // tag = 9
//! Constant::MethodRef // tag = 10
//! Constant::InterfaceMethodRef // tag = 11
//! {
//!     tag:       u8
//!     class:     u16 // index of class
//!     name_type: u16 // index of name and type
//! }
//!
//! Constant::NameAndType // tag = 12
//! {
//!     tag:        u8
//!     name:       u16 // index of utf8
//!     descriptor: u16 // index of utf8
//! }
//!
//! Constant::MethodHandle // tag = 15
//! {
//!     tag:   u8
//!     kind:  u8
//!     index: u16 // index of whatever `kind` requires
//! }
//!
//! Constant::Dynamic // tag = 17
//! Constant::InvokeDynamic // tag = 18
//! {
//!     tag:       u8
//!     bootstrap: u16 // 0-based index into the bootstrap method table
//!     name_type: u16 // index of name and type
//! }
//! ```

use log::trace;

use crate::{
    mutf8::JavaString,
    parse::ByteParser,
    write::{ByteWriter, Encode},
    ClassError, ClassResult,
};

pub type PoolIndex = u16;

#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ConstantTag {
    Utf8 = 1,
    Integer = 3,
    Float = 4,
    Long = 5,
    Double = 6,
    Class = 7,
    String = 8,
    FieldRef = 9,
    MethodRef = 10,
    InterfaceMethodRef = 11,
    NameAndType = 12,
    MethodHandle = 15,
    MethodType = 16,
    Dynamic = 17,
    InvokeDynamic = 18,
    Module = 19,
    Package = 20,
}

impl ConstantTag {
    pub fn from_u8(tag: u8) -> Option<ConstantTag> {
        Some(match tag {
            1 => ConstantTag::Utf8,
            3 => ConstantTag::Integer,
            4 => ConstantTag::Float,
            5 => ConstantTag::Long,
            6 => ConstantTag::Double,
            7 => ConstantTag::Class,
            8 => ConstantTag::String,
            9 => ConstantTag::FieldRef,
            10 => ConstantTag::MethodRef,
            11 => ConstantTag::InterfaceMethodRef,
            12 => ConstantTag::NameAndType,
            15 => ConstantTag::MethodHandle,
            16 => ConstantTag::MethodType,
            17 => ConstantTag::Dynamic,
            18 => ConstantTag::InvokeDynamic,
            19 => ConstantTag::Module,
            20 => ConstantTag::Package,
            _ => return None,
        })
    }
}

// Symbolic references by an instruction sequence to fields or methods are
// indicated by C.x:T, where x and T are the name and descriptor (§4.3.2,
// §4.3.3) of the field or method, and C is the class or interface in which the
// field or method is to be found.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MethodHandleKind {
    /// getfield C.f:T
    GetField = 1,
    /// getstatic C.f:T
    GetStatic = 2,
    /// putfield C.f:T
    PutField = 3,
    /// putstatic C.f:T
    PutStatic = 4,
    /// invokevirtual C.m:(A*)T
    InvokeVirtual = 5,
    /// invokestatic C.m:(A*)T
    InvokeStatic = 6,
    /// invokespecial C.m:(A*)T
    InvokeSpecial = 7,
    /// new C; dup; invokespecial C.<init>:(A*)void
    NewInvokeSpecial = 8,
    /// invokeinterface C.m:(A*)T
    InvokeInterface = 9,
}

impl MethodHandleKind {
    pub fn from(ty: u8) -> ClassResult<MethodHandleKind> {
        Ok(match ty {
            1 => MethodHandleKind::GetField,
            2 => MethodHandleKind::GetStatic,
            3 => MethodHandleKind::PutField,
            4 => MethodHandleKind::PutStatic,
            5 => MethodHandleKind::InvokeVirtual,
            6 => MethodHandleKind::InvokeStatic,
            7 => MethodHandleKind::InvokeSpecial,
            8 => MethodHandleKind::NewInvokeSpecial,
            9 => MethodHandleKind::InvokeInterface,
            other => return Err(ClassError::UnknownMethodHandleKind(other)),
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            MethodHandleKind::GetField => "REF_getField",
            MethodHandleKind::GetStatic => "REF_getStatic",
            MethodHandleKind::PutField => "REF_putField",
            MethodHandleKind::PutStatic => "REF_putStatic",
            MethodHandleKind::InvokeVirtual => "REF_invokeVirtual",
            MethodHandleKind::InvokeStatic => "REF_invokeStatic",
            MethodHandleKind::InvokeSpecial => "REF_invokeSpecial",
            MethodHandleKind::NewInvokeSpecial => "REF_newInvokeSpecial",
            MethodHandleKind::InvokeInterface => "REF_invokeInterface",
        }
    }
}

/// The shared shape of field, method and interface method references.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct MemberRef {
    pub class: PoolIndex,
    pub name_and_type: PoolIndex,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NameAndType {
    pub name: PoolIndex,
    pub descriptor: PoolIndex,
}

/// The shared shape of `Dynamic` and `InvokeDynamic`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct DynamicInfo {
    /// Index into the `BootstrapMethods` attribute, not into the pool.
    pub bootstrap_method_attr: u16,
    pub name_and_type: PoolIndex,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Constant {
    Utf8(JavaString),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),

    Class { name: PoolIndex },
    String { string: PoolIndex },
    MethodType { descriptor: PoolIndex },
    Module { name: PoolIndex },
    Package { name: PoolIndex },

    FieldRef(MemberRef),
    MethodRef(MemberRef),
    InterfaceMethodRef(MemberRef),
    NameAndType(NameAndType),

    MethodHandle {
        kind: MethodHandleKind,
        reference: PoolIndex,
    },

    Dynamic(DynamicInfo),
    InvokeDynamic(DynamicInfo),
}

impl Constant {
    pub fn tag(&self) -> ConstantTag {
        match self {
            Constant::Utf8(_) => ConstantTag::Utf8,
            Constant::Integer(_) => ConstantTag::Integer,
            Constant::Float(_) => ConstantTag::Float,
            Constant::Long(_) => ConstantTag::Long,
            Constant::Double(_) => ConstantTag::Double,
            Constant::Class { .. } => ConstantTag::Class,
            Constant::String { .. } => ConstantTag::String,
            Constant::MethodType { .. } => ConstantTag::MethodType,
            Constant::Module { .. } => ConstantTag::Module,
            Constant::Package { .. } => ConstantTag::Package,
            Constant::FieldRef(_) => ConstantTag::FieldRef,
            Constant::MethodRef(_) => ConstantTag::MethodRef,
            Constant::InterfaceMethodRef(_) => ConstantTag::InterfaceMethodRef,
            Constant::NameAndType(_) => ConstantTag::NameAndType,
            Constant::MethodHandle { .. } => ConstantTag::MethodHandle,
            Constant::Dynamic(_) => ConstantTag::Dynamic,
            Constant::InvokeDynamic(_) => ConstantTag::InvokeDynamic,
        }
    }

    /// Long and Double constants occupy two pool slots.
    pub fn is_wide(&self) -> bool {
        matches!(self, Constant::Long(_) | Constant::Double(_))
    }

    pub fn slots(&self) -> usize {
        if self.is_wide() {
            2
        } else {
            1
        }
    }

    pub fn as_utf8(&self) -> Option<&str> {
        match self {
            Constant::Utf8(data) => data.as_str(),
            _ => None,
        }
    }
}

impl Encode for Constant {
    fn encoded_len(&self) -> usize {
        1 + match self {
            Constant::Utf8(data) => 2 + data.mutf8_len(),
            Constant::Integer(_) | Constant::Float(_) => 4,
            Constant::Long(_) | Constant::Double(_) => 8,
            Constant::Class { .. }
            | Constant::String { .. }
            | Constant::MethodType { .. }
            | Constant::Module { .. }
            | Constant::Package { .. } => 2,
            Constant::MethodHandle { .. } => 3,
            Constant::FieldRef(_)
            | Constant::MethodRef(_)
            | Constant::InterfaceMethodRef(_)
            | Constant::NameAndType(_)
            | Constant::Dynamic(_)
            | Constant::InvokeDynamic(_) => 4,
        }
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        out.write_u8(self.tag() as u8);
        match self {
            Constant::Utf8(data) => {
                let bytes = data.to_mutf8();
                out.write_len_u16("utf8 constant", bytes.len())?;
                out.write_bytes(&bytes);
            }
            Constant::Integer(val) => out.write_i32(*val),
            Constant::Float(val) => out.write_f32(*val),
            Constant::Long(val) => out.write_i64(*val),
            Constant::Double(val) => out.write_f64(*val),

            Constant::Class { name: index }
            | Constant::String { string: index }
            | Constant::MethodType { descriptor: index }
            | Constant::Module { name: index }
            | Constant::Package { name: index } => out.write_u16(*index),

            Constant::FieldRef(info)
            | Constant::MethodRef(info)
            | Constant::InterfaceMethodRef(info) => {
                out.write_u16(info.class);
                out.write_u16(info.name_and_type);
            }
            Constant::NameAndType(info) => {
                out.write_u16(info.name);
                out.write_u16(info.descriptor);
            }
            Constant::MethodHandle { kind, reference } => {
                out.write_u8(*kind as u8);
                out.write_u16(*reference);
            }
            Constant::Dynamic(info) | Constant::InvokeDynamic(info) => {
                out.write_u16(info.bootstrap_method_attr);
                out.write_u16(info.name_and_type);
            }
        }
        Ok(())
    }
}

fn parse_member_ref(input: &mut ByteParser<'_>) -> ClassResult<MemberRef> {
    Ok(MemberRef {
        class: input.parse_u16()?,
        name_and_type: input.parse_u16()?,
    })
}

fn parse_dynamic(input: &mut ByteParser<'_>) -> ClassResult<DynamicInfo> {
    Ok(DynamicInfo {
        bootstrap_method_attr: input.parse_u16()?,
        name_and_type: input.parse_u16()?,
    })
}

/// Parses the entry that will land at `index`, which is only used for error
/// reporting.
pub fn parse_constant(input: &mut ByteParser<'_>, index: PoolIndex) -> ClassResult<Constant> {
    let tag = input.parse_u8()?;
    let tag = ConstantTag::from_u8(tag).ok_or(ClassError::UnknownConstantTag { index, tag })?;

    Ok(match tag {
        ConstantTag::Utf8 => Constant::Utf8(input.parse_mutf8_string()?),
        ConstantTag::Integer => Constant::Integer(input.parse_i32()?),
        ConstantTag::Float => Constant::Float(input.parse_f32()?),
        ConstantTag::Long => Constant::Long(input.parse_i64()?),
        ConstantTag::Double => Constant::Double(input.parse_f64()?),

        ConstantTag::Class => Constant::Class {
            name: input.parse_u16()?,
        },
        ConstantTag::String => Constant::String {
            string: input.parse_u16()?,
        },
        ConstantTag::MethodType => Constant::MethodType {
            descriptor: input.parse_u16()?,
        },
        ConstantTag::Module => Constant::Module {
            name: input.parse_u16()?,
        },
        ConstantTag::Package => Constant::Package {
            name: input.parse_u16()?,
        },

        ConstantTag::FieldRef => Constant::FieldRef(parse_member_ref(input)?),
        ConstantTag::MethodRef => Constant::MethodRef(parse_member_ref(input)?),
        ConstantTag::InterfaceMethodRef => Constant::InterfaceMethodRef(parse_member_ref(input)?),
        ConstantTag::NameAndType => Constant::NameAndType(NameAndType {
            name: input.parse_u16()?,
            descriptor: input.parse_u16()?,
        }),

        ConstantTag::MethodHandle => Constant::MethodHandle {
            kind: MethodHandleKind::from(input.parse_u8()?)?,
            reference: input.parse_u16()?,
        },

        ConstantTag::Dynamic => Constant::Dynamic(parse_dynamic(input)?),
        ConstantTag::InvokeDynamic => Constant::InvokeDynamic(parse_dynamic(input)?),
    })
}

/// Resolves `$index` and destructures it with `$pat`, or reports which tag
/// was actually found there.
macro_rules! expect_constant {
    ($pool:expr, $index:expr, $tag:ident, $pat:pat => $out:expr) => {{
        let index = $index;
        match $pool.get(index)? {
            $pat => Ok($out),
            other => Err(ClassError::UnexpectedConstant {
                index,
                expected: ConstantTag::$tag,
                found: other.tag(),
            }),
        }
    }};
}

/// The constant pool of a class.
///
/// Slot 0 and the upper slot of every Long and Double are empty, and looking
/// them up is an error like any other bad index.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstantPool {
    slots: Vec<Option<Constant>>,
}

impl Default for ConstantPool {
    fn default() -> Self {
        ConstantPool { slots: vec![None] }
    }
}

impl ConstantPool {
    pub fn new() -> Self {
        ConstantPool::default()
    }

    /// The `constant_pool_count` value: one more than the highest index.
    pub fn count(&self) -> usize {
        self.slots.len()
    }

    /// Number of real entries, not counting empty slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: PoolIndex) -> ClassResult<&Constant> {
        self.slots
            .get(index as usize)
            .and_then(Option::as_ref)
            .ok_or(ClassError::InvalidPoolIndex(index))
    }

    pub fn get_tagged(&self, index: PoolIndex, expected: ConstantTag) -> ClassResult<&Constant> {
        let constant = self.get(index)?;
        if constant.tag() == expected {
            Ok(constant)
        } else {
            Err(ClassError::UnexpectedConstant {
                index,
                expected,
                found: constant.tag(),
            })
        }
    }

    /// Walks every entry in index order, skipping the empty slots.
    pub fn iter(&self) -> impl Iterator<Item = (PoolIndex, &Constant)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|c| (index as PoolIndex, c)))
    }

    /// Fails for entries holding an unpaired surrogate, see `java_string`.
    pub fn utf8(&self, index: PoolIndex) -> ClassResult<&str> {
        self.java_string(index)?
            .as_str()
            .ok_or(ClassError::UnpairedSurrogate(index))
    }

    pub fn java_string(&self, index: PoolIndex) -> ClassResult<&JavaString> {
        expect_constant!(self, index, Utf8, Constant::Utf8(data) => data)
    }

    /// The index of the `Utf8` entry naming the class at `index`.
    pub fn class_info(&self, index: PoolIndex) -> ClassResult<PoolIndex> {
        expect_constant!(self, index, Class, Constant::Class { name } => *name)
    }

    /// The internal name of the class at `index`, like `java/lang/Object`.
    pub fn class_name(&self, index: PoolIndex) -> ClassResult<&str> {
        self.utf8(self.class_info(index)?)
    }

    pub fn name_and_type(&self, index: PoolIndex) -> ClassResult<&NameAndType> {
        expect_constant!(self, index, NameAndType, Constant::NameAndType(info) => info)
    }

    /// Any of the three member reference kinds.
    pub fn member_ref(&self, index: PoolIndex) -> ClassResult<&MemberRef> {
        expect_constant!(
            self,
            index,
            MethodRef,
            Constant::FieldRef(info) | Constant::MethodRef(info) | Constant::InterfaceMethodRef(info) => info
        )
    }

    pub fn string(&self, index: PoolIndex) -> ClassResult<&str> {
        let string = expect_constant!(self, index, String, Constant::String { string } => *string)?;
        self.utf8(string)
    }

    pub fn module_name(&self, index: PoolIndex) -> ClassResult<&str> {
        let name = expect_constant!(self, index, Module, Constant::Module { name } => *name)?;
        self.utf8(name)
    }

    pub fn package_name(&self, index: PoolIndex) -> ClassResult<&str> {
        let name = expect_constant!(self, index, Package, Constant::Package { name } => *name)?;
        self.utf8(name)
    }

    /// Reverse lookup of a `Utf8` entry by value. Not finding one is an
    /// ordinary outcome for callers that are about to add it.
    pub fn find_utf8(&self, value: &str) -> Option<PoolIndex> {
        self.iter()
            .find(|(_, constant)| constant.as_utf8() == Some(value))
            .map(|(index, _)| index)
    }

    /// Appends an entry, returning its index.
    pub fn push(&mut self, constant: Constant) -> ClassResult<PoolIndex> {
        let index = self.slots.len();
        let slots = constant.slots();
        if index + slots > u16::MAX as usize {
            return Err(ClassError::TooLarge {
                what: "constant pool",
                len: index + slots,
            });
        }

        self.slots.push(Some(constant));
        if slots == 2 {
            self.slots.push(None);
        }
        Ok(index as PoolIndex)
    }

    pub fn utf8_or_insert(&mut self, value: &str) -> ClassResult<PoolIndex> {
        match self.find_utf8(value) {
            Some(index) => Ok(index),
            None => self.push(Constant::Utf8(value.into())),
        }
    }
}

impl Encode for ConstantPool {
    fn encoded_len(&self) -> usize {
        2 + self.iter().map(|(_, c)| c.encoded_len()).sum::<usize>()
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        out.write_len_u16("constant pool", self.count())?;
        self.iter().try_for_each(|(_, constant)| constant.encode(out))
    }
}

pub fn parse_constant_pool(input: &mut ByteParser<'_>) -> ClassResult<ConstantPool> {
    let count = match input.parse_u16()? as usize {
        0 => return Err(ClassError::ConstantPoolTooSmall),
        num => num,
    };

    let mut pool = ConstantPool::new();
    while pool.count() < count {
        let index = pool.count() as PoolIndex;
        let constant = parse_constant(input, index)?;
        trace!("constant #{}: {:?}", index, constant);

        // A wide entry in the last slot would run past the declared count.
        if pool.count() + constant.slots() > count {
            return Err(ClassError::InvalidPoolIndex(count as PoolIndex));
        }
        pool.push(constant)?;
    }

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pool_bytes() -> Vec<u8> {
        let mut bytes = vec![0, 7];
        // #1 Utf8 "Foo"
        bytes.extend_from_slice(&[1, 0, 3, b'F', b'o', b'o']);
        // #2 Class #1
        bytes.extend_from_slice(&[7, 0, 1]);
        // #3 Double 1.0, #4 unusable
        bytes.extend_from_slice(&[6, 0x3f, 0xf0, 0, 0, 0, 0, 0, 0]);
        // #5 Integer 42
        bytes.extend_from_slice(&[3, 0, 0, 0, 42]);
        // #6 String #1
        bytes.extend_from_slice(&[8, 0, 1]);
        bytes
    }

    #[test]
    fn test_double_occupies_two_slots() {
        let bytes = pool_bytes();
        let pool = parse_constant_pool(&mut ByteParser::new(&bytes)).unwrap();

        assert_eq!(pool.get(3), Ok(&Constant::Double(1.0)));
        assert_eq!(pool.get(4), Err(ClassError::InvalidPoolIndex(4)));
        assert_eq!(pool.get(5), Ok(&Constant::Integer(42)));
        assert_eq!(pool.count(), 7);
        assert_eq!(pool.len(), 5);
    }

    #[test]
    fn test_index_zero_and_out_of_range() {
        let bytes = pool_bytes();
        let pool = parse_constant_pool(&mut ByteParser::new(&bytes)).unwrap();

        assert_eq!(pool.get(0), Err(ClassError::InvalidPoolIndex(0)));
        assert_eq!(pool.get(7), Err(ClassError::InvalidPoolIndex(7)));
    }

    #[test]
    fn test_tag_mismatch() {
        let bytes = pool_bytes();
        let pool = parse_constant_pool(&mut ByteParser::new(&bytes)).unwrap();

        assert_eq!(
            pool.get_tagged(5, ConstantTag::Utf8),
            Err(ClassError::UnexpectedConstant {
                index: 5,
                expected: ConstantTag::Utf8,
                found: ConstantTag::Integer,
            })
        );
        assert_eq!(pool.class_name(2), Ok("Foo"));
        assert_eq!(pool.string(6), Ok("Foo"));
        assert!(pool.class_name(6).is_err());
    }

    #[test]
    fn test_pool_round_trip_and_length() {
        let bytes = pool_bytes();
        let pool = parse_constant_pool(&mut ByteParser::new(&bytes)).unwrap();

        assert_eq!(pool.encoded_len(), bytes.len());
        assert_eq!(pool.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_lone_surrogate_round_trips() {
        // #1 Utf8 "\ud800"
        let bytes = [0, 2, 1, 0, 3, 0xed, 0xa0, 0x80];
        let pool = parse_constant_pool(&mut ByteParser::new(&bytes)).unwrap();

        assert_eq!(
            pool.java_string(1),
            Ok(&JavaString::Units(vec![0xd800]))
        );
        assert_eq!(pool.utf8(1), Err(ClassError::UnpairedSurrogate(1)));
        assert_eq!(pool.find_utf8("\u{fffd}"), None);
        assert_eq!(pool.encoded_len(), bytes.len());
        assert_eq!(pool.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_unknown_tag_is_fatal() {
        let bytes = [0, 2, 2, 0, 0];
        assert_eq!(
            parse_constant_pool(&mut ByteParser::new(&bytes)),
            Err(ClassError::UnknownConstantTag { index: 1, tag: 2 })
        );
    }

    #[test]
    fn test_find_and_insert_utf8() {
        let mut pool = ConstantPool::new();
        assert_eq!(pool.find_utf8("Code"), None);
        assert_eq!(pool.push(Constant::Long(7)), Ok(1));
        assert_eq!(pool.utf8_or_insert("Code"), Ok(3));
        assert_eq!(pool.utf8_or_insert("Code"), Ok(3));
        assert_eq!(pool.find_utf8("Code"), Some(3));
        assert_eq!(pool.count(), 4);
    }
}
