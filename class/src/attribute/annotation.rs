//! # Annotations
//!
//! ```txt
//! Annotation {
//!     type_index: u16,
//!     num_element_value_pairs: u16,
//!     element_value_pairs: [ElementValuePair; num_element_value_pairs],
//! }
//!
//! ElementValuePair {
//!     element_name_index: u16,
//!     value: ElementValue,
//! }
//!
//! ElementValue {
//!     tag: u8,
//!     value: match tag {
//!         'B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z' | 's' => const_value_index: u16,
//!         'e' => { type_name_index: u16, const_name_index: u16 },
//!         'c' => class_info_index: u16,
//!         '@' => Annotation,
//!         '[' => { num_values: u16, values: [ElementValue; num_values] },
//!     },
//! }
//! ```

use crate::{
    constant::PoolIndex,
    parse::ByteParser,
    write::{ByteWriter, Encode},
    ClassError, ClassResult,
};

/// The type of a constant element value, by its tag character.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ConstKind {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
    String,
}

impl ConstKind {
    pub fn from_tag(tag: u8) -> Option<ConstKind> {
        Some(match tag {
            b'B' => ConstKind::Byte,
            b'C' => ConstKind::Char,
            b'D' => ConstKind::Double,
            b'F' => ConstKind::Float,
            b'I' => ConstKind::Int,
            b'J' => ConstKind::Long,
            b'S' => ConstKind::Short,
            b'Z' => ConstKind::Boolean,
            b's' => ConstKind::String,
            _ => return None,
        })
    }

    pub fn tag(self) -> u8 {
        match self {
            ConstKind::Byte => b'B',
            ConstKind::Char => b'C',
            ConstKind::Double => b'D',
            ConstKind::Float => b'F',
            ConstKind::Int => b'I',
            ConstKind::Long => b'J',
            ConstKind::Short => b'S',
            ConstKind::Boolean => b'Z',
            ConstKind::String => b's',
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum ElementValue {
    /// A constant pool literal; a `Utf8` entry for strings.
    Const { kind: ConstKind, index: PoolIndex },
    Enum {
        type_name: PoolIndex,
        const_name: PoolIndex,
    },
    /// A `Utf8` return descriptor, like `Ljava/lang/Object;` or `V`.
    Class(PoolIndex),
    Annotation(Box<Annotation>),
    Array(Vec<ElementValue>),
}

impl ElementValue {
    pub fn tag(&self) -> u8 {
        match self {
            ElementValue::Const { kind, .. } => kind.tag(),
            ElementValue::Enum { .. } => b'e',
            ElementValue::Class(_) => b'c',
            ElementValue::Annotation(_) => b'@',
            ElementValue::Array(_) => b'[',
        }
    }
}

impl Encode for ElementValue {
    fn encoded_len(&self) -> usize {
        1 + match self {
            ElementValue::Const { .. } | ElementValue::Class(_) => 2,
            ElementValue::Enum { .. } => 4,
            ElementValue::Annotation(annotation) => annotation.encoded_len(),
            ElementValue::Array(values) => 2 + values.encoded_len(),
        }
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        out.write_u8(self.tag());
        match self {
            ElementValue::Const { index, .. } | ElementValue::Class(index) => {
                out.write_u16(*index);
                Ok(())
            }
            ElementValue::Enum {
                type_name,
                const_name,
            } => {
                out.write_u16(*type_name);
                out.write_u16(*const_name);
                Ok(())
            }
            ElementValue::Annotation(annotation) => annotation.encode(out),
            ElementValue::Array(values) => out.write_seq_u16("element value array", values),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ElementValuePair {
    pub name: PoolIndex,
    pub value: ElementValue,
}

impl Encode for ElementValuePair {
    fn encoded_len(&self) -> usize {
        2 + self.value.encoded_len()
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        out.write_u16(self.name);
        self.value.encode(out)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Annotation {
    /// A `Utf8` field descriptor naming the annotation interface.
    pub type_index: PoolIndex,
    pub elements: Vec<ElementValuePair>,
}

impl Encode for Annotation {
    fn encoded_len(&self) -> usize {
        4 + self.elements.encoded_len()
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        out.write_u16(self.type_index);
        out.write_seq_u16("element value pairs", &self.elements)
    }
}

/// How deep arrays and nested annotations may go inside one element value.
pub const MAX_ELEMENT_DEPTH: usize = 64;

pub fn parse_element_value(input: &mut ByteParser<'_>) -> ClassResult<ElementValue> {
    parse_element_value_at(input, 0)
}

fn parse_element_value_at(input: &mut ByteParser<'_>, depth: usize) -> ClassResult<ElementValue> {
    if depth > MAX_ELEMENT_DEPTH {
        return Err(ClassError::ElementValueTooDeep(MAX_ELEMENT_DEPTH));
    }

    Ok(match input.parse_u8()? {
        b'e' => ElementValue::Enum {
            type_name: input.parse_u16()?,
            const_name: input.parse_u16()?,
        },
        b'c' => ElementValue::Class(input.parse_u16()?),
        b'@' => ElementValue::Annotation(Box::new(parse_annotation_at(input, depth + 1)?)),
        b'[' => ElementValue::Array({
            let len = input.parse_u16()? as usize;
            input.seq(len, |input| parse_element_value_at(input, depth + 1))?
        }),

        tag => ElementValue::Const {
            kind: ConstKind::from_tag(tag).ok_or(ClassError::UnknownElementValueTag(tag as char))?,
            index: input.parse_u16()?,
        },
    })
}

pub fn parse_element_value_pair(input: &mut ByteParser<'_>) -> ClassResult<ElementValuePair> {
    parse_element_value_pair_at(input, 0)
}

fn parse_element_value_pair_at(
    input: &mut ByteParser<'_>,
    depth: usize,
) -> ClassResult<ElementValuePair> {
    Ok(ElementValuePair {
        name: input.parse_u16()?,
        value: parse_element_value_at(input, depth)?,
    })
}

pub fn parse_annotation(input: &mut ByteParser<'_>) -> ClassResult<Annotation> {
    parse_annotation_at(input, 0)
}

fn parse_annotation_at(input: &mut ByteParser<'_>, depth: usize) -> ClassResult<Annotation> {
    Ok(Annotation {
        type_index: input.parse_u16()?,
        elements: {
            let len = input.parse_u16()? as usize;
            input.seq(len, |input| parse_element_value_pair_at(input, depth))?
        },
    })
}

// Attribute::RuntimeVisibleAnnotations,
// Attribute::RuntimeInvisibleAnnotations {
//     num_annotations: u16,
//     annotations: [Annotation; num_annotations],
// }
pub fn parse_annotations(input: &mut ByteParser<'_>) -> ClassResult<Vec<Annotation>> {
    let num = input.parse_u16()? as usize;
    input.seq(num, parse_annotation)
}

// Attribute::RuntimeVisibleParameterAnnotations,
// Attribute::RuntimeInvisibleParameterAnnotations {
//     num_parameters: u8,
//     parameter_annotations: [Annotations; num_parameters],
// }
pub fn parse_parameter_annotations(input: &mut ByteParser<'_>) -> ClassResult<Vec<Vec<Annotation>>> {
    let num = input.parse_u8()? as usize;
    input.seq(num, parse_annotations)
}

pub(crate) fn parameter_annotations_len(params: &[Vec<Annotation>]) -> usize {
    1 + params
        .iter()
        .map(|annotations| 2 + annotations.encoded_len())
        .sum::<usize>()
}

pub(crate) fn encode_parameter_annotations(
    params: &[Vec<Annotation>],
    out: &mut ByteWriter,
) -> ClassResult<()> {
    out.write_len_u8("annotated parameters", params.len())?;
    params
        .iter()
        .try_for_each(|annotations| out.write_seq_u16("annotations", annotations))
}
