//! # Class file binary format
//!
//! All numbers in this format are big-endian
//!
//! ```txt
//! Class {
//!     // 0xCAFEBABE
//!     magic: u32,
//!     minor_version: u16,
//!     major_version: u16,
//!
//!     constant_pool_count: u16,
//!     constant_pool: [Constant; constant_pool_count - 1],
//!
//!     access_flags: u16,
//!     this_class: u16,
//!     super_class: u16,
//!
//!     interfaces_count: u16,
//!     interfaces: [u16; interfaces_count],
//!
//!     fields_count: u16,
//!     fields: [Field; fields_count],
//!
//!     methods_count: u16,
//!     methods: [Method; methods_count],
//!
//!     attributes_count: u16,
//!     attributes: [Attribute; attributes_count],
//! }
//! ```

use log::debug;

use crate::{
    access::AccessFlags,
    attribute::{parse_attributes, Attribute, AttributeKind, Attributes},
    constant::{parse_constant_pool, ConstantPool, PoolIndex},
    field::{parse_field, Field},
    method::{parse_method, Method},
    parse::{ByteParser, ParseResult},
    signature::Signature,
    write::{ByteWriter, Encode},
    ClassError, ClassResult,
};

/// The class file magic: `0xCAFEBABE`
pub const CLASS_MAGIC: u32 = 0xCAFE_BABE;

pub fn parse_version(input: &mut ByteParser<'_>) -> ParseResult<Version> {
    let minor = input.parse_u16()?;
    let major = input.parse_u16()?;
    Ok(Version { major, minor })
}

pub fn parse_class(input: &mut ByteParser<'_>) -> ClassResult<Class> {
    let magic = input.parse_u32()?;
    if magic != CLASS_MAGIC {
        return Err(ClassError::WrongMagic(magic));
    }

    let version = parse_version(input)?;
    let pool = parse_constant_pool(input)?;
    debug!(
        "class version {}.{}, {} pool slots",
        version.major,
        version.minor,
        pool.count()
    );

    let access_flags = AccessFlags(input.parse_u16()?);
    let this_class = input.parse_u16()?;
    let super_class = input.parse_u16()?;

    let interfaces_len = input.parse_u16()? as usize;
    let interfaces = input.seq(interfaces_len, |input| input.parse_u16())?;

    let fields_len = input.parse_u16()? as usize;
    let fields = input.seq(fields_len, |input| parse_field(input, &pool))?;

    let methods_len = input.parse_u16()? as usize;
    let methods = input.seq(methods_len, |input| parse_method(input, &pool))?;

    let attributes = parse_attributes(input, &pool)?;
    debug!(
        "decoded {} interfaces, {} fields, {} methods, {} attributes",
        interfaces.len(),
        fields.len(),
        methods.len(),
        attributes.len()
    );

    if !input.is_empty() {
        return Err(ClassError::TrailingBytes {
            offset: input.offset,
            remaining: input.remaining(),
        });
    }

    Ok(Class {
        version,
        pool,
        access_flags,
        this_class,
        super_class,
        interfaces,
        fields,
        methods,
        attributes,
    })
}

/// Version of the class file.
///
/// Versions are denoted as `M.m` where `M` is the
/// major version and `m` is the minor version. The version can be ordered
/// lexicographically. JVM implementations can choose a range of compatible
/// versions by selecting a minimum major version `Mi`, maximum major version
/// `Mj`, and a maximum minor version `m`. With these, the JVM can support
/// versions on the range `Mi.0 <= v <= Mj.m` for some arbitrary `v`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Class {
    pub version: Version,
    pub pool: ConstantPool,
    pub access_flags: AccessFlags,

    /// A `Class` constant naming this class.
    pub this_class: PoolIndex,
    /// A `Class` constant, or 0 for `java/lang/Object` and modules.
    pub super_class: PoolIndex,

    /// `Class` constants of the direct superinterfaces, in source order.
    pub interfaces: Vec<PoolIndex>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
    pub attributes: Attributes,
}

impl Class {
    pub fn parse<T: AsRef<[u8]>>(src: T) -> Result<Class, ClassError> {
        parse_class(&mut ByteParser::new(src.as_ref()))
    }

    /// Internal name of this class, like `java/util/Map$Entry`.
    pub fn class_name(&self) -> ClassResult<&str> {
        self.pool.class_name(self.this_class)
    }

    pub fn super_class_name(&self) -> ClassResult<Option<&str>> {
        match self.super_class {
            0 => Ok(None),
            index => self.pool.class_name(index).map(Some),
        }
    }

    pub fn interface_names(&self) -> ClassResult<Vec<&str>> {
        self.interfaces
            .iter()
            .map(|&index| self.pool.class_name(index))
            .collect()
    }

    pub fn signature(&self) -> Option<Signature> {
        match self.attributes.get(AttributeKind::Signature) {
            Some(Attribute::Signature(sig)) => Some(*sig),
            _ => None,
        }
    }

    pub fn source_file(&self) -> ClassResult<Option<&str>> {
        match self.attributes.get(AttributeKind::SourceFile) {
            Some(Attribute::SourceFile(index)) => self.pool.utf8(*index).map(Some),
            _ => Ok(None),
        }
    }

    pub fn find_field(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|field| field.name(&self.pool).map_or(false, |found| found == name))
    }

    /// The first method with the given name. Overloads are not told apart.
    pub fn find_method(&self, name: &str) -> Option<&Method> {
        self.methods
            .iter()
            .find(|method| method.name(&self.pool).map_or(false, |found| found == name))
    }
}

impl Encode for Class {
    fn encoded_len(&self) -> usize {
        4 + 4
            + self.pool.encoded_len()
            + 6
            + 2
            + 2 * self.interfaces.len()
            + 2
            + self.fields.encoded_len()
            + 2
            + self.methods.encoded_len()
            + self.attributes.encoded_len()
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        out.write_u32(CLASS_MAGIC);
        out.write_u16(self.version.minor);
        out.write_u16(self.version.major);
        self.pool.encode(out)?;
        self.access_flags.encode(out)?;
        out.write_u16(self.this_class);
        out.write_u16(self.super_class);
        out.write_u16_table("interfaces", &self.interfaces)?;
        out.write_seq_u16("fields", &self.fields)?;
        out.write_seq_u16("methods", &self.methods)?;
        self.attributes.encode(out)?;

        debug!("encoded class into {} bytes", out.position());
        Ok(())
    }
}
