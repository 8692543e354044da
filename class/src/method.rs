//! ```txt
//! Method {
//!     access_flags: u16,
//!     name_index: u16,
//!     descriptor_index: u16,
//!     attributes_count: u16,
//!     attributes: [AttributeInfo; attributes_count],
//! }
//! ```

use crate::{
    access::AccessFlags,
    attribute::{code::Code, parse_attributes, Attribute, AttributeKind, Attributes},
    constant::{ConstantPool, PoolIndex},
    descriptor::Descriptor,
    parse::ByteParser,
    signature::Signature,
    write::{ByteWriter, Encode},
    ClassResult,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Method {
    pub access_flags: AccessFlags,
    /// Index into the constant pool, pointing to a `Utf8` constant that
    /// denotes the name of the method.
    pub name: PoolIndex,
    /// Index into the constant pool, pointing to a `Utf8` constant that
    /// denotes the erased method signature.
    pub descriptor: Descriptor,
    pub attributes: Attributes,
}

impl Method {
    pub fn name<'p>(&self, pool: &'p ConstantPool) -> ClassResult<&'p str> {
        pool.utf8(self.name)
    }

    /// The body of the method. `None` for `native` and `abstract` methods, or
    /// if the `Code` attribute could not be decoded.
    pub fn code(&self) -> Option<&Code> {
        match self.attributes.get(AttributeKind::Code) {
            Some(Attribute::Code(code)) => Some(code),
            _ => None,
        }
    }

    pub fn signature(&self) -> Option<Signature> {
        match self.attributes.get(AttributeKind::Signature) {
            Some(Attribute::Signature(sig)) => Some(*sig),
            _ => None,
        }
    }

    /// `Class` constants of the checked exceptions this method declares.
    pub fn exceptions(&self) -> &[PoolIndex] {
        match self.attributes.get(AttributeKind::Exceptions) {
            Some(Attribute::Exceptions(table)) => table,
            _ => &[],
        }
    }

    /// Readable parameter types, generic if a `Signature` attribute is
    /// present.
    pub fn parameter_types(&self, pool: &ConstantPool) -> ClassResult<Vec<String>> {
        match self.signature() {
            Some(sig) => sig.parameter_types(pool),
            None => self.descriptor.parameter_types(pool),
        }
    }

    pub fn return_type(&self, pool: &ConstantPool) -> ClassResult<String> {
        match self.signature() {
            Some(sig) => sig.return_type(pool),
            None => self.descriptor.return_type(pool),
        }
    }

    /// The whole method type, like `(int, java.lang.String) void`.
    pub fn get_type(&self, pool: &ConstantPool) -> ClassResult<String> {
        match self.signature() {
            Some(sig) => sig.field_type(pool),
            None => Ok(format!(
                "({}) {}",
                self.descriptor.parameter_types(pool)?.join(", "),
                self.descriptor.return_type(pool)?
            )),
        }
    }
}

impl Encode for Method {
    fn encoded_len(&self) -> usize {
        6 + self.attributes.encoded_len()
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        self.access_flags.encode(out)?;
        out.write_u16(self.name);
        self.descriptor.encode(out)?;
        self.attributes.encode(out)
    }
}

pub fn parse_method(input: &mut ByteParser<'_>, pool: &ConstantPool) -> ClassResult<Method> {
    Ok(Method {
        access_flags: AccessFlags(input.parse_u16()?),
        name: input.parse_u16()?,
        descriptor: Descriptor::new(input.parse_u16()?),
        attributes: parse_attributes(input, pool)?,
    })
}
