//! # Type annotations
//!
//! ```txt
//! TypeAnnotation {
//!     target_type: u8,
//!     target_info: match target_type { .. },
//!     type_path_length: u8,
//!     type_path: [(type_path_kind: u8, type_argument_index: u8); type_path_length],
//!     annotation: Annotation without its leading tag,
//! }
//! ```
//!
//! Every `target_type` has exactly one `target_info` layout. [`Target`] pairs
//! the two, so decoding and encoding are both a single match.

use super::annotation::{parse_annotation, Annotation};
use crate::{
    parse::ByteParser,
    write::{ByteWriter, Encode},
    ClassError, ClassResult,
};

/// One live range of an annotated local variable.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct LocalVarTarget {
    pub start_pc: u16,
    pub length: u16,
    /// Local variable slot.
    pub index: u16,
}

impl Encode for LocalVarTarget {
    fn encoded_len(&self) -> usize {
        6
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        out.write_u16(self.start_pc);
        out.write_u16(self.length);
        out.write_u16(self.index);
        Ok(())
    }
}

fn parse_local_var_target(input: &mut ByteParser<'_>) -> ClassResult<LocalVarTarget> {
    Ok(LocalVarTarget {
        start_pc: input.parse_u16()?,
        length: input.parse_u16()?,
        index: input.parse_u16()?,
    })
}

/// What a type annotation is attached to, with the operands its kind needs.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Target {
    /// 0x00
    ClassTypeParameter { index: u8 },
    /// 0x01
    MethodTypeParameter { index: u8 },
    /// 0x10: `index` is into `interfaces`, or 65535 for the superclass.
    ClassExtends { index: u16 },
    /// 0x11
    ClassTypeParameterBound { param: u8, bound: u8 },
    /// 0x12
    MethodTypeParameterBound { param: u8, bound: u8 },
    /// 0x13
    Field,
    /// 0x14
    MethodReturn,
    /// 0x15
    MethodReceiver,
    /// 0x16
    MethodFormalParameter { index: u8 },
    /// 0x17: `index` is into the `Exceptions` attribute.
    Throws { index: u16 },
    /// 0x40
    LocalVariable(Vec<LocalVarTarget>),
    /// 0x41
    ResourceVariable(Vec<LocalVarTarget>),
    /// 0x42: `index` is into the exception table of the `Code` attribute.
    ExceptionParameter { index: u16 },
    /// 0x43
    InstanceOf { offset: u16 },
    /// 0x44
    New { offset: u16 },
    /// 0x45
    ConstructorReference { offset: u16 },
    /// 0x46
    MethodReference { offset: u16 },
    /// 0x47
    Cast { offset: u16, index: u8 },
    /// 0x48
    ConstructorInvocationTypeArgument { offset: u16, index: u8 },
    /// 0x49
    MethodInvocationTypeArgument { offset: u16, index: u8 },
    /// 0x4A
    ConstructorReferenceTypeArgument { offset: u16, index: u8 },
    /// 0x4B
    MethodReferenceTypeArgument { offset: u16, index: u8 },
}

impl Target {
    pub fn target_type(&self) -> u8 {
        match self {
            Target::ClassTypeParameter { .. } => 0x00,
            Target::MethodTypeParameter { .. } => 0x01,
            Target::ClassExtends { .. } => 0x10,
            Target::ClassTypeParameterBound { .. } => 0x11,
            Target::MethodTypeParameterBound { .. } => 0x12,
            Target::Field => 0x13,
            Target::MethodReturn => 0x14,
            Target::MethodReceiver => 0x15,
            Target::MethodFormalParameter { .. } => 0x16,
            Target::Throws { .. } => 0x17,
            Target::LocalVariable(_) => 0x40,
            Target::ResourceVariable(_) => 0x41,
            Target::ExceptionParameter { .. } => 0x42,
            Target::InstanceOf { .. } => 0x43,
            Target::New { .. } => 0x44,
            Target::ConstructorReference { .. } => 0x45,
            Target::MethodReference { .. } => 0x46,
            Target::Cast { .. } => 0x47,
            Target::ConstructorInvocationTypeArgument { .. } => 0x48,
            Target::MethodInvocationTypeArgument { .. } => 0x49,
            Target::ConstructorReferenceTypeArgument { .. } => 0x4A,
            Target::MethodReferenceTypeArgument { .. } => 0x4B,
        }
    }

    /// The bytecode offset this target refers to, for targets inside code.
    pub fn offset(&self) -> Option<u16> {
        match self {
            Target::InstanceOf { offset }
            | Target::New { offset }
            | Target::ConstructorReference { offset }
            | Target::MethodReference { offset }
            | Target::Cast { offset, .. }
            | Target::ConstructorInvocationTypeArgument { offset, .. }
            | Target::MethodInvocationTypeArgument { offset, .. }
            | Target::ConstructorReferenceTypeArgument { offset, .. }
            | Target::MethodReferenceTypeArgument { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

impl Encode for Target {
    fn encoded_len(&self) -> usize {
        1 + match self {
            Target::Field | Target::MethodReturn | Target::MethodReceiver => 0,
            Target::ClassTypeParameter { .. }
            | Target::MethodTypeParameter { .. }
            | Target::MethodFormalParameter { .. } => 1,
            Target::ClassTypeParameterBound { .. }
            | Target::MethodTypeParameterBound { .. }
            | Target::ClassExtends { .. }
            | Target::Throws { .. }
            | Target::ExceptionParameter { .. }
            | Target::InstanceOf { .. }
            | Target::New { .. }
            | Target::ConstructorReference { .. }
            | Target::MethodReference { .. } => 2,
            Target::Cast { .. }
            | Target::ConstructorInvocationTypeArgument { .. }
            | Target::MethodInvocationTypeArgument { .. }
            | Target::ConstructorReferenceTypeArgument { .. }
            | Target::MethodReferenceTypeArgument { .. } => 3,
            Target::LocalVariable(table) | Target::ResourceVariable(table) => {
                2 + table.encoded_len()
            }
        }
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        out.write_u8(self.target_type());
        match self {
            Target::Field | Target::MethodReturn | Target::MethodReceiver => {}
            Target::ClassTypeParameter { index }
            | Target::MethodTypeParameter { index }
            | Target::MethodFormalParameter { index } => out.write_u8(*index),
            Target::ClassTypeParameterBound { param, bound }
            | Target::MethodTypeParameterBound { param, bound } => {
                out.write_u8(*param);
                out.write_u8(*bound);
            }
            Target::ClassExtends { index }
            | Target::Throws { index }
            | Target::ExceptionParameter { index } => out.write_u16(*index),
            Target::InstanceOf { offset }
            | Target::New { offset }
            | Target::ConstructorReference { offset }
            | Target::MethodReference { offset } => out.write_u16(*offset),
            Target::Cast { offset, index }
            | Target::ConstructorInvocationTypeArgument { offset, index }
            | Target::MethodInvocationTypeArgument { offset, index }
            | Target::ConstructorReferenceTypeArgument { offset, index }
            | Target::MethodReferenceTypeArgument { offset, index } => {
                out.write_u16(*offset);
                out.write_u8(*index);
            }
            Target::LocalVariable(table) | Target::ResourceVariable(table) => {
                out.write_seq_u16("local variable targets", table)?;
            }
        }
        Ok(())
    }
}

pub fn parse_target(input: &mut ByteParser<'_>) -> ClassResult<Target> {
    Ok(match input.parse_u8()? {
        0x00 => Target::ClassTypeParameter {
            index: input.parse_u8()?,
        },
        0x01 => Target::MethodTypeParameter {
            index: input.parse_u8()?,
        },
        0x10 => Target::ClassExtends {
            index: input.parse_u16()?,
        },
        0x11 => Target::ClassTypeParameterBound {
            param: input.parse_u8()?,
            bound: input.parse_u8()?,
        },
        0x12 => Target::MethodTypeParameterBound {
            param: input.parse_u8()?,
            bound: input.parse_u8()?,
        },
        0x13 => Target::Field,
        0x14 => Target::MethodReturn,
        0x15 => Target::MethodReceiver,
        0x16 => Target::MethodFormalParameter {
            index: input.parse_u8()?,
        },
        0x17 => Target::Throws {
            index: input.parse_u16()?,
        },
        kind @ (0x40 | 0x41) => {
            let len = input.parse_u16()? as usize;
            let table = input.seq(len, parse_local_var_target)?;
            if kind == 0x40 {
                Target::LocalVariable(table)
            } else {
                Target::ResourceVariable(table)
            }
        }
        0x42 => Target::ExceptionParameter {
            index: input.parse_u16()?,
        },
        0x43 => Target::InstanceOf {
            offset: input.parse_u16()?,
        },
        0x44 => Target::New {
            offset: input.parse_u16()?,
        },
        0x45 => Target::ConstructorReference {
            offset: input.parse_u16()?,
        },
        0x46 => Target::MethodReference {
            offset: input.parse_u16()?,
        },
        kind @ 0x47..=0x4B => {
            let offset = input.parse_u16()?;
            let index = input.parse_u8()?;
            match kind {
                0x47 => Target::Cast { offset, index },
                0x48 => Target::ConstructorInvocationTypeArgument { offset, index },
                0x49 => Target::MethodInvocationTypeArgument { offset, index },
                0x4A => Target::ConstructorReferenceTypeArgument { offset, index },
                _ => Target::MethodReferenceTypeArgument { offset, index },
            }
        }

        other => return Err(ClassError::UnknownTargetType(other)),
    })
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TypePathKind {
    /// Deeper in an array type.
    Array,
    /// Deeper in a nested type.
    InnerType,
    /// On the bound of a wildcard type argument.
    Wildcard,
    /// On a type argument, whose position is the entry's `argument`.
    TypeArgument,
}

impl TypePathKind {
    pub fn from_u8(kind: u8) -> ClassResult<TypePathKind> {
        Ok(match kind {
            0 => TypePathKind::Array,
            1 => TypePathKind::InnerType,
            2 => TypePathKind::Wildcard,
            3 => TypePathKind::TypeArgument,
            other => return Err(ClassError::UnknownTypePathKind(other)),
        })
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TypePathEntry {
    pub kind: TypePathKind,
    /// Zero unless `kind` is `TypeArgument`.
    pub argument: u8,
}

impl Encode for TypePathEntry {
    fn encoded_len(&self) -> usize {
        2
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        out.write_u8(self.kind as u8);
        out.write_u8(self.argument);
        Ok(())
    }
}

pub fn parse_type_path(input: &mut ByteParser<'_>) -> ClassResult<Vec<TypePathEntry>> {
    let len = input.parse_u8()? as usize;
    input.seq(len, |input| {
        Ok(TypePathEntry {
            kind: TypePathKind::from_u8(input.parse_u8()?)?,
            argument: input.parse_u8()?,
        })
    })
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TypeAnnotation {
    pub target: Target,
    pub type_path: Vec<TypePathEntry>,
    pub annotation: Annotation,
}

impl Encode for TypeAnnotation {
    fn encoded_len(&self) -> usize {
        self.target.encoded_len() + 1 + self.type_path.encoded_len() + self.annotation.encoded_len()
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        self.target.encode(out)?;
        out.write_len_u8("type path", self.type_path.len())?;
        self.type_path.encode(out)?;
        self.annotation.encode(out)
    }
}

pub fn parse_type_annotation(input: &mut ByteParser<'_>) -> ClassResult<TypeAnnotation> {
    Ok(TypeAnnotation {
        target: parse_target(input)?,
        type_path: parse_type_path(input)?,
        annotation: parse_annotation(input)?,
    })
}

pub fn parse_type_annotations(input: &mut ByteParser<'_>) -> ClassResult<Vec<TypeAnnotation>> {
    let num = input.parse_u16()? as usize;
    input.seq(num, parse_type_annotation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn round_trip(bytes: &[u8]) -> TypeAnnotation {
        let mut input = ByteParser::new(bytes);
        let annotation = parse_type_annotation(&mut input).unwrap();
        assert!(input.is_empty());
        assert_eq!(annotation.encoded_len(), bytes.len());
        assert_eq!(annotation.to_bytes().unwrap(), bytes);
        annotation
    }

    #[test]
    fn test_local_variable_table() {
        #[rustfmt::skip]
        let bytes = [
            0x40, 0, 2,
                0, 0, 0, 10, 0, 1,
                0, 12, 0, 4, 0, 1,
            0, // empty type path
            0, 9, 0, 0, // annotation
        ];
        let annotation = round_trip(&bytes);
        assert_eq!(
            annotation.target,
            Target::LocalVariable(vec![
                LocalVarTarget {
                    start_pc: 0,
                    length: 10,
                    index: 1,
                },
                LocalVarTarget {
                    start_pc: 12,
                    length: 4,
                    index: 1,
                },
            ])
        );
    }

    #[test]
    fn test_every_target_kind() {
        let targets: &[&[u8]] = &[
            &[0x00, 1],
            &[0x01, 2],
            &[0x10, 0xff, 0xff],
            &[0x11, 0, 1],
            &[0x12, 1, 0],
            &[0x13],
            &[0x14],
            &[0x15],
            &[0x16, 3],
            &[0x17, 0, 1],
            &[0x40, 0, 0],
            &[0x41, 0, 1, 0, 2, 0, 3, 0, 4],
            &[0x42, 0, 5],
            &[0x43, 0, 6],
            &[0x44, 0, 7],
            &[0x45, 0, 8],
            &[0x46, 0, 9],
            &[0x47, 0, 10, 0],
            &[0x48, 0, 11, 1],
            &[0x49, 0, 12, 2],
            &[0x4A, 0, 13, 3],
            &[0x4B, 0, 14, 4],
        ];

        for target in targets {
            let mut bytes = target.to_vec();
            bytes.extend_from_slice(&[2, 0, 0, 3, 1, 0, 9, 0, 0]);
            let annotation = round_trip(&bytes);
            assert_eq!(annotation.target.target_type(), target[0]);
            assert_eq!(annotation.type_path.len(), 2);
        }
    }

    #[test]
    fn test_unknown_target_type() {
        for kind in [0x02, 0x18, 0x3f, 0x4c] {
            assert_eq!(
                parse_target(&mut ByteParser::new(&[kind, 0, 0, 0])),
                Err(ClassError::UnknownTargetType(kind))
            );
        }
    }

    #[test]
    fn test_unknown_type_path_kind() {
        assert_eq!(
            parse_type_path(&mut ByteParser::new(&[1, 4, 0])),
            Err(ClassError::UnknownTypePathKind(4))
        );
    }
}
