//! ```txt
//! Field {
//!     access:           u16
//!     name:             u16
//!     descriptor:       u16
//!     attributes_count: u16
//!     attributes:       [Attribute; attributes_count]
//! }
//! ```

use crate::{
    access::AccessFlags,
    attribute::{parse_attributes, Attribute, AttributeKind, Attributes},
    constant::{ConstantPool, PoolIndex},
    descriptor::Descriptor,
    parse::ByteParser,
    signature::Signature,
    write::{ByteWriter, Encode},
    ClassResult,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub access_flags: AccessFlags,
    /// Index into the constant pool, pointing to a `Utf8` constant that
    /// denotes the name of this field
    pub name: PoolIndex,
    /// The erased type of this field
    pub descriptor: Descriptor,

    pub attributes: Attributes,
}

impl Field {
    pub fn name<'p>(&self, pool: &'p ConstantPool) -> ClassResult<&'p str> {
        pool.utf8(self.name)
    }

    pub fn signature(&self) -> Option<Signature> {
        match self.attributes.get(AttributeKind::Signature) {
            Some(Attribute::Signature(sig)) => Some(*sig),
            _ => None,
        }
    }

    /// Readable type of the field, generic if a `Signature` attribute is
    /// present.
    pub fn get_type(&self, pool: &ConstantPool) -> ClassResult<String> {
        match self.signature() {
            Some(sig) => sig.field_type(pool),
            None => self.descriptor.field_type(pool),
        }
    }

    /// Index of the `ConstantValue` of a static final field.
    pub fn constant_value(&self) -> Option<PoolIndex> {
        match self.attributes.get(AttributeKind::ConstantValue) {
            Some(Attribute::ConstantValue(index)) => Some(*index),
            _ => None,
        }
    }
}

impl Encode for Field {
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

pub fn parse_field(input: &mut ByteParser<'_>, pool: &ConstantPool) -> ClassResult<Field> {
    Ok(Field {
        access_flags: AccessFlags(input.parse_u16()?),
        name: input.parse_u16()?,
        descriptor: Descriptor::new(input.parse_u16()?),
        attributes: parse_attributes(input, pool)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{access::AccessKind, constant::Constant};
    use pretty_assertions::assert_eq;

    fn pool(values: &[&str]) -> ConstantPool {
        let mut pool = ConstantPool::new();
        for value in values {
            pool.push(Constant::Utf8((*value).into())).unwrap();
        }
        pool
    }

    #[test]
    fn test_erased_type() {
        let pool = pool(&["names", "[Ljava/lang/String;"]);
        let bytes = [0, 0x1a, 0, 1, 0, 2, 0, 0];
        let field = parse_field(&mut ByteParser::new(&bytes), &pool).unwrap();

        assert_eq!(field.name(&pool).unwrap(), "names");
        assert_eq!(field.get_type(&pool).unwrap(), "java.lang.String[]");
        assert_eq!(
            field.access_flags.modifiers(AccessKind::Field),
            vec!["private", "static", "final"]
        );
        assert_eq!(field.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_signature_wins() {
        let pool = pool(&[
            "names",
            "Ljava/util/List;",
            "Signature",
            "Ljava/util/List<Ljava/lang/String;>;",
        ]);
        let bytes = [0, 0x02, 0, 1, 0, 2, 0, 1, 0, 3, 0, 0, 0, 2, 0, 4];
        let field = parse_field(&mut ByteParser::new(&bytes), &pool).unwrap();

        assert_eq!(field.signature(), Some(Signature::new(4)));
        assert_eq!(field.get_type(&pool).unwrap(), "java.util.List<java.lang.String>");
        assert_eq!(field.encoded_len(), bytes.len());
        assert_eq!(field.to_bytes().unwrap(), bytes);
    }
}
