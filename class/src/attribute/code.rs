// Attribute::Code {
//     max_stack: u16,
//     max_locals: u16,
//     // Must be greater than 0
//     code_length: u32,
//     code: [u8; code_length],
//     exceptions_length: u16,
//     exceptions: [ExceptionHandler; exception_table_length],
//     attributes_count: u16,
//     attributes: [AttributeInfo; attributes_count],
// }

use super::{
    parse_attributes,
    tables::{parse_exception_handler, ExceptionHandler},
    Attributes,
};
use crate::{
    constant::ConstantPool,
    instruction::Instructions,
    parse::ByteParser,
    write::{ByteWriter, Encode},
    ClassResult,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Code {
    /// The maximum amount of items on the operand stack
    pub max_stack: u16,
    /// The maximum amount of local variables, including method paramaters. The
    /// greatest local variable index is `max_locals - 1` for all types except
    /// `long` or `double`.
    pub max_locals: u16,

    /// The actual JVM bytecode for this method
    pub code: Vec<u8>,
    /// A list of exception handlers for this method.
    pub exception_table: Vec<ExceptionHandler>,
    /// Usually `LineNumberTable`, `LocalVariableTable`,
    /// `LocalVariableTypeTable`, and `StackMapTable`.
    pub attributes: Attributes,
}

impl Code {
    /// Decodes the bytecode lazily, starting from offset 0 every time.
    pub fn instructions(&self) -> Instructions<'_> {
        Instructions::new(&self.code)
    }
}

impl Encode for Code {
    fn encoded_len(&self) -> usize {
        8 + self.code.len()
            + 2
            + self.exception_table.encoded_len()
            + self.attributes.encoded_len()
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        out.write_u16(self.max_stack);
        out.write_u16(self.max_locals);
        out.write_len_u32("code", self.code.len())?;
        out.write_bytes(&self.code);
        out.write_seq_u16("exception table", &self.exception_table)?;
        self.attributes.encode(out)
    }
}

pub fn parse_code(input: &mut ByteParser<'_>, pool: &ConstantPool) -> ClassResult<Code> {
    let max_stack = input.parse_u16()?;
    let max_locals = input.parse_u16()?;
    let code_length = input.parse_u32()? as usize;
    let code = input.take_declared(code_length)?;

    let exceptions_len = input.parse_u16()? as usize;
    let exception_table = input.seq(exceptions_len, parse_exception_handler)?;

    let attributes = parse_attributes(input, pool)?;

    Ok(Code {
        max_stack,
        max_locals,
        code: code.into(),
        exception_table,
        attributes,
    })
}
