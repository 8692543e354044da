//! Structural codec for the JVM class file format.
//!
//! [`Class::parse`] turns a byte slice into an object graph mirroring the
//! sections of the format, and [`Class::to_bytes`] writes that graph back out.
//! For well-formed input the two are exact inverses.

pub mod access;
pub mod attribute;
pub mod class;
pub mod constant;
pub mod descriptor;
pub mod field;
pub mod instruction;
pub mod method;
mod mutf8;
pub mod parse;
pub mod signature;
pub mod write;

pub use crate::access::{AccessFlags, AccessKind};
pub use crate::attribute::{
    code::Code, Attribute, AttributeInfo, AttributeKind, Attributes, DefaultAttribute,
};
pub use crate::class::{Class, Version};
pub use crate::constant::{Constant, ConstantPool, ConstantTag, PoolIndex};
pub use crate::descriptor::Descriptor;
pub use crate::field::Field;
pub use crate::instruction::{decode_at, Instruction, InstructionError, Instructions, Operands};
pub use crate::method::Method;
pub use crate::mutf8::*;
pub use crate::parse::{ByteParser, ParseError};
pub use crate::signature::{Signature, Type};
pub use crate::write::{ByteWriter, Encode};

use thiserror::Error;

pub type ClassResult<T> = Result<T, ClassError>;

#[derive(Clone, Debug, Eq, PartialEq, Hash, Error)]
pub enum ClassError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Instruction(#[from] InstructionError),

    // Constant pool errors
    #[error("unknown constant pool tag {tag} at index {index}")]
    UnknownConstantTag { index: PoolIndex, tag: u8 },
    #[error("unknown method handle kind {0}")]
    UnknownMethodHandleKind(u8),
    #[error("constant pool must have at least one slot")]
    ConstantPoolTooSmall,
    #[error("invalid constant pool index {0}")]
    InvalidPoolIndex(PoolIndex),
    #[error("constant pool index {index}: expected {expected:?}, found {found:?}")]
    UnexpectedConstant {
        index: PoolIndex,
        expected: ConstantTag,
        found: ConstantTag,
    },
    #[error("invalid modified UTF-8 byte {1:#04x} at offset {0}")]
    InvalidModifiedUtf8Byte(usize, u8),
    #[error("utf8 constant {0} holds an unpaired surrogate")]
    UnpairedSurrogate(PoolIndex),

    // Class errors
    #[error("wrong magic: got {0:#010x}, expected 0xcafebabe")]
    WrongMagic(u32),
    #[error("{remaining} bytes left over after the class at offset {offset}")]
    TrailingBytes { offset: usize, remaining: usize },

    // Descriptor and signature errors
    #[error("invalid descriptor {descriptor:?}: unexpected input at position {position}")]
    InvalidDescriptor { descriptor: String, position: usize },

    // Attribute errors
    #[error("unknown verification type {0}")]
    UnknownVerificationType(u8),
    #[error("stack map frame type {0} is reserved")]
    ReservedStackMapFrameType(u8),
    #[error("unknown type annotation target type {0:#04x}")]
    UnknownTargetType(u8),
    #[error("unknown type path kind {0}")]
    UnknownTypePathKind(u8),
    #[error("unknown element value tag {0:?}")]
    UnknownElementValueTag(char),
    #[error("element values nest deeper than {0} levels")]
    ElementValueTooDeep(usize),
    #[error("attribute declared {declared} bytes but its body used {consumed}")]
    AttributeLengthMismatch { declared: usize, consumed: usize },
    #[error("declared length {declared} exceeds the {remaining} bytes remaining")]
    OversizedLength { declared: usize, remaining: usize },

    // Encode errors
    #[error("{what} has {len} items, which does not fit its length field")]
    TooLarge { what: &'static str, len: usize },
}
