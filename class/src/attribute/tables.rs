//! Small fixed-layout records shared by several attributes.

use super::{parse_attributes, Attributes};
use crate::{
    access::AccessFlags,
    constant::{ConstantPool, PoolIndex},
    descriptor::Descriptor,
    parse::ByteParser,
    write::{ByteWriter, Encode},
    ClassResult,
};

/// Implements `Encode` for a struct of `u16`/`u32` fields written in
/// declaration order, and generates its parser.
macro_rules! fixed_record {
    ($parse:ident => $name:ident { $($field:ident: $ty:ident),* $(,)? }) => {
        impl Encode for $name {
            fn encoded_len(&self) -> usize {
                0 $(+ fixed_record!(@width $ty))*
            }

            fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
                $(fixed_record!(@write out, self.$field, $ty);)*
                Ok(())
            }
        }

        pub fn $parse(input: &mut ByteParser<'_>) -> ClassResult<$name> {
            Ok($name {
                $($field: fixed_record!(@read input, $ty),)*
            })
        }
    };

    (@width u16) => { 2 };
    (@width u32) => { 4 };
    (@write $out:ident, $val:expr, u16) => { $out.write_u16($val) };
    (@write $out:ident, $val:expr, u32) => { $out.write_u32($val) };
    (@read $input:ident, u16) => { $input.parse_u16()? };
    (@read $input:ident, u32) => { $input.parse_u32()? };
}

// ExceptionHandler {
//     start_pc: u16,
//     end_pc: u16,
//     handler_pc: u16,
//     catch_type: u16,
// }
/// Represents an exception handler, active between pc values of
/// `[start_pc, end_pc)`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ExceptionHandler {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    /// A `Class` constant, or 0 to catch everything.
    pub catch_type: PoolIndex,
}

fixed_record!(parse_exception_handler => ExceptionHandler {
    start_pc: u16,
    end_pc: u16,
    handler_pc: u16,
    catch_type: u16,
});

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct LineNumber {
    pub start_pc: u16,
    pub line_number: u16,
}

fixed_record!(parse_line_number => LineNumber {
    start_pc: u16,
    line_number: u16,
});

/// An entry of `LocalVariableTable` or `LocalVariableTypeTable`; `descriptor`
/// is a signature in the latter.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct LocalVariable {
    pub start_pc: u16,
    pub length: u16,
    pub name: PoolIndex,
    pub descriptor: PoolIndex,
    /// The local variable slot.
    pub index: u16,
}

fixed_record!(parse_local_variable => LocalVariable {
    start_pc: u16,
    length: u16,
    name: u16,
    descriptor: u16,
    index: u16,
});

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct CharacterRange {
    pub start_pc: u16,
    pub end_pc: u16,
    /// Line and column packed as `line << 10 | column`.
    pub character_range_start: u32,
    pub character_range_end: u32,
    pub flags: u16,
}

fixed_record!(parse_character_range => CharacterRange {
    start_pc: u16,
    end_pc: u16,
    character_range_start: u32,
    character_range_end: u32,
    flags: u16,
});

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct EnclosingMethod {
    /// A `Class` constant.
    pub class: PoolIndex,
    /// A `NameAndType` constant, or 0 outside of a method.
    pub method: PoolIndex,
}

fixed_record!(parse_enclosing_method => EnclosingMethod {
    class: u16,
    method: u16,
});

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct InnerClass {
    pub inner_class: PoolIndex,
    /// 0 for local and anonymous classes.
    pub outer_class: PoolIndex,
    /// 0 for anonymous classes.
    pub inner_name: PoolIndex,
    pub flags: AccessFlags,
}

impl Encode for InnerClass {
    fn encoded_len(&self) -> usize {
        8
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        out.write_u16(self.inner_class);
        out.write_u16(self.outer_class);
        out.write_u16(self.inner_name);
        out.write_u16(self.flags.0);
        Ok(())
    }
}

pub fn parse_inner_class(input: &mut ByteParser<'_>) -> ClassResult<InnerClass> {
    Ok(InnerClass {
        inner_class: input.parse_u16()?,
        outer_class: input.parse_u16()?,
        inner_name: input.parse_u16()?,
        flags: AccessFlags(input.parse_u16()?),
    })
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct MethodParameter {
    /// A `Utf8` constant, or 0 for a nameless parameter.
    pub name: PoolIndex,
    pub flags: AccessFlags,
}

impl Encode for MethodParameter {
    fn encoded_len(&self) -> usize {
        4
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        out.write_u16(self.name);
        out.write_u16(self.flags.0);
        Ok(())
    }
}

pub fn parse_method_parameter(input: &mut ByteParser<'_>) -> ClassResult<MethodParameter> {
    Ok(MethodParameter {
        name: input.parse_u16()?,
        flags: AccessFlags(input.parse_u16()?),
    })
}

// BootstrapMethod {
//     bootstrap_method_ref: u16,
//     num_bootstrap_arguments: u16,
//     bootstrap_arguments: [u16; num_bootstrap_arguments],
// }
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct BootstrapMethod {
    /// A `MethodHandle` constant.
    pub method_ref: PoolIndex,
    /// Loadable constants passed as static arguments.
    pub arguments: Vec<PoolIndex>,
}

impl Encode for BootstrapMethod {
    fn encoded_len(&self) -> usize {
        4 + 2 * self.arguments.len()
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        out.write_u16(self.method_ref);
        out.write_u16_table("bootstrap arguments", &self.arguments)
    }
}

pub fn parse_bootstrap_method(input: &mut ByteParser<'_>) -> ClassResult<BootstrapMethod> {
    let method_ref = input.parse_u16()?;
    let len = input.parse_u16()? as usize;
    Ok(BootstrapMethod {
        method_ref,
        arguments: input.seq(len, |input| input.parse_u16())?,
    })
}

// RecordComponent {
//     name_index: u16,
//     descriptor_index: u16,
//     attributes_count: u16,
//     attributes: [AttributeInfo; attributes_count],
// }
#[derive(Clone, Debug, PartialEq)]
pub struct RecordComponent {
    pub name: PoolIndex,
    pub descriptor: Descriptor,
    pub attributes: Attributes,
}

impl Encode for RecordComponent {
    fn encoded_len(&self) -> usize {
        4 + self.attributes.encoded_len()
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        out.write_u16(self.name);
        self.descriptor.encode(out)?;
        self.attributes.encode(out)
    }
}

pub fn parse_record_component(
    input: &mut ByteParser<'_>,
    pool: &ConstantPool,
) -> ClassResult<RecordComponent> {
    Ok(RecordComponent {
        name: input.parse_u16()?,
        descriptor: Descriptor::new(input.parse_u16()?),
        attributes: parse_attributes(input, pool)?,
    })
}
