//! Plain field and method descriptors (§4.3).
//!
//! ```txt
//! field_descriptor  := <field_type> ;
//! method_descriptor := "(" <field_type>* ")" <return_type> ;
//! field_type        := <base_type> | "L" <internal_name> ";" | "[" <field_type> ;
//! return_type       := <field_type> | "V" ;
//! ```
//!
//! Unlike signatures, descriptors are only ever rendered as readable strings,
//! like `int`, `java.lang.String[]`, or `void`.

use crate::{
    constant::{ConstantPool, PoolIndex},
    parse::ByteParser,
    write::{ByteWriter, Encode},
    ClassError, ClassResult,
};

/// A field or method descriptor, stored as the index of its `Utf8` entry.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Descriptor {
    pub index: PoolIndex,
}

impl Descriptor {
    pub fn new(index: PoolIndex) -> Self {
        Descriptor { index }
    }

    pub fn value<'p>(&self, pool: &'p ConstantPool) -> ClassResult<&'p str> {
        pool.utf8(self.index)
    }

    /// The readable type of a field descriptor.
    pub fn field_type(&self, pool: &ConstantPool) -> ClassResult<String> {
        let desc = self.value(pool)?;
        let mut input = ByteParser::new(desc.as_bytes());
        let ty = parse_field_type(desc, &mut input)?;
        expect_end(desc, &input)?;
        Ok(ty)
    }

    pub fn parameter_types(&self, pool: &ConstantPool) -> ClassResult<Vec<String>> {
        parse_method_descriptor(self.value(pool)?).map(|(params, _)| params)
    }

    pub fn parameter_count(&self, pool: &ConstantPool) -> ClassResult<usize> {
        self.parameter_types(pool).map(|params| params.len())
    }

    pub fn return_type(&self, pool: &ConstantPool) -> ClassResult<String> {
        parse_method_descriptor(self.value(pool)?).map(|(_, ret)| ret)
    }
}

impl Encode for Descriptor {
    fn encoded_len(&self) -> usize {
        2
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        out.write_u16(self.index);
        Ok(())
    }
}

pub(crate) fn invalid(desc: &str, position: usize) -> ClassError {
    ClassError::InvalidDescriptor {
        descriptor: desc.into(),
        position,
    }
}

fn expect_end(desc: &str, input: &ByteParser<'_>) -> ClassResult<()> {
    if input.is_empty() {
        Ok(())
    } else {
        Err(invalid(desc, input.offset))
    }
}

/// The most dimensions an array type may have.
pub const MAX_ARRAY_DIMENSIONS: usize = 255;

/// Consumes a run of `[`, failing at the first one past the dimension limit.
pub(crate) fn array_dimensions(desc: &str, input: &mut ByteParser<'_>) -> ClassResult<usize> {
    let start = input.offset;
    let dimensions = input.peeking_take_while(|ch| ch == b'[').len();
    if dimensions > MAX_ARRAY_DIMENSIONS {
        return Err(invalid(desc, start + MAX_ARRAY_DIMENSIONS));
    }
    Ok(dimensions)
}

/// Readable names of the single-letter base types, `V` included.
pub(crate) fn base_type_name(ch: u8) -> Option<&'static str> {
    Some(match ch {
        b'B' => "byte",
        b'C' => "char",
        b'D' => "double",
        b'F' => "float",
        b'I' => "int",
        b'J' => "long",
        b'S' => "short",
        b'Z' => "boolean",
        b'V' => "void",
        _ => return None,
    })
}

fn parse_field_type(desc: &str, input: &mut ByteParser<'_>) -> ClassResult<String> {
    let dimensions = array_dimensions(desc, input)?;

    let tag_pos = input.offset;
    let mut ty = match input.parse_u8().map_err(|_| invalid(desc, tag_pos))? {
        b'V' => return Err(invalid(desc, tag_pos)),
        b'L' => {
            let name = input.peeking_take_while(|ch| ch != b';');
            if name.is_empty() || input.parse_u8().is_err() {
                return Err(invalid(desc, input.offset));
            }
            // The name sits between two ASCII delimiters of a `str`.
            std::str::from_utf8(name)
                .map_err(|_| invalid(desc, tag_pos + 1))?
                .replace('/', ".")
        }
        other => base_type_name(other)
            .ok_or_else(|| invalid(desc, tag_pos))?
            .to_string(),
    };

    for _ in 0..dimensions {
        ty.push_str("[]");
    }
    Ok(ty)
}

fn parse_method_descriptor(desc: &str) -> ClassResult<(Vec<String>, String)> {
    let mut input = ByteParser::new(desc.as_bytes());
    input.expect(b"(").map_err(|_| invalid(desc, 0))?;

    let mut params = Vec::new();
    loop {
        match input.peek_u8() {
            Some(b')') => break,
            Some(_) => params.push(parse_field_type(desc, &mut input)?),
            None => return Err(invalid(desc, input.offset)),
        }
    }
    input.expect(b")").map_err(|_| invalid(desc, input.offset))?;

    let ret = if input.peek_u8() == Some(b'V') {
        input.offset += 1;
        "void".to_string()
    } else {
        parse_field_type(desc, &mut input)?
    };

    expect_end(desc, &input)?;
    Ok((params, ret))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::Constant;
    use pretty_assertions::assert_eq;

    fn descriptor(value: &str) -> (ConstantPool, Descriptor) {
        let mut pool = ConstantPool::new();
        let index = pool.push(Constant::Utf8(value.into())).unwrap();
        (pool, Descriptor::new(index))
    }

    #[test]
    fn test_field_types() {
        let (pool, desc) = descriptor("[[Ljava/lang/String;");
        assert_eq!(desc.field_type(&pool).unwrap(), "java.lang.String[][]");

        let (pool, desc) = descriptor("B");
        assert_eq!(desc.field_type(&pool).unwrap(), "byte");
    }

    #[test]
    fn test_method_types() {
        let (pool, desc) = descriptor("(IJ[DLjava/util/List;)V");
        assert_eq!(
            desc.parameter_types(&pool).unwrap(),
            vec!["int", "long", "double[]", "java.util.List"]
        );
        assert_eq!(desc.parameter_count(&pool).unwrap(), 4);
        assert_eq!(desc.return_type(&pool).unwrap(), "void");

        let (pool, desc) = descriptor("()[Z");
        assert_eq!(desc.parameter_count(&pool).unwrap(), 0);
        assert_eq!(desc.return_type(&pool).unwrap(), "boolean[]");
    }

    #[test]
    fn test_errors_carry_position() {
        let (pool, desc) = descriptor("(IQ)V");
        assert_eq!(
            desc.parameter_types(&pool),
            Err(ClassError::InvalidDescriptor {
                descriptor: "(IQ)V".into(),
                position: 2,
            })
        );

        let (pool, desc) = descriptor("II");
        assert_eq!(
            desc.field_type(&pool),
            Err(ClassError::InvalidDescriptor {
                descriptor: "II".into(),
                position: 1,
            })
        );

        let (pool, desc) = descriptor("Ljava/lang/String");
        assert!(desc.field_type(&pool).is_err());
    }

    #[test]
    fn test_dimension_limit() {
        let max = "[".repeat(MAX_ARRAY_DIMENSIONS) + "I";
        let (pool, desc) = descriptor(&max);
        let ty = desc.field_type(&pool).unwrap();
        assert_eq!(ty.len(), "int".len() + 2 * MAX_ARRAY_DIMENSIONS);

        let over = "[".repeat(MAX_ARRAY_DIMENSIONS + 1) + "I";
        let (pool, desc) = descriptor(&over);
        assert_eq!(
            desc.field_type(&pool),
            Err(ClassError::InvalidDescriptor {
                descriptor: over.clone(),
                position: MAX_ARRAY_DIMENSIONS,
            })
        );

        let method = format!("({})V", over);
        let (pool, desc) = descriptor(&method);
        assert_eq!(
            desc.parameter_types(&pool),
            Err(ClassError::InvalidDescriptor {
                descriptor: method.clone(),
                position: MAX_ARRAY_DIMENSIONS + 1,
            })
        );
    }
}
