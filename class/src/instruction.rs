//! Lazy decoding of method bytecode.
//!
//! Instructions are never materialized up front. [`decode_at`] looks at the
//! opcode at a given pc, works out how long the instruction is, and hands back
//! a borrowed [`Instruction`] along with the pc of the next one. Operands are
//! only decoded when asked for with [`Instruction::operands`].

use thiserror::Error;

use crate::{
    constant::PoolIndex,
    parse::{ByteParser, ParseError},
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Error)]
pub enum InstructionError {
    #[error("pc {pc} is outside the code array")]
    PcOutOfRange { pc: usize },
    #[error("unknown opcode {opcode:#04x} at pc {pc}")]
    UnknownOpcode { pc: usize, opcode: u8 },
    #[error("opcode {opcode:#04x} cannot be widened (pc {pc})")]
    InvalidWide { pc: usize, opcode: u8 },
    #[error("operands of {opcode:#04x} at pc {pc} run past the end of the code")]
    Truncated { pc: usize, opcode: u8 },
    #[error("tableswitch at pc {pc} has low {low} greater than high {high}")]
    InvalidSwitchRange { pc: usize, low: i32, high: i32 },
    #[error("lookupswitch at pc {pc} has a negative pair count {npairs}")]
    NegativePairCount { pc: usize, npairs: i32 },
}

pub type InstructionResult<T> = Result<T, InstructionError>;

/// The layout of the bytes following an opcode.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Shape {
    None,
    /// `newarray`'s primitive type tag.
    ArrayType,
    Branch,
    BranchWide,
    /// `bipush`
    Byte,
    /// `sipush`
    Short,
    /// `ldc`, with a one byte pool index.
    ConstantByte,
    Constant,
    /// Pool index, argument count, and a zero byte.
    InvokeInterface,
    /// Pool index followed by two zero bytes.
    InvokeDynamic,
    /// Pool index and dimension count.
    MultiNewArray,
    Local,
    /// Local index and signed increment.
    Iinc,
    TableSwitch,
    LookupSwitch,
    Wide,
}

impl Shape {
    /// Operand bytes for shapes that have a fixed width.
    fn fixed_len(self) -> Option<usize> {
        Some(match self {
            Shape::None => 0,
            Shape::ArrayType | Shape::Byte | Shape::ConstantByte | Shape::Local => 1,
            Shape::Branch | Shape::Short | Shape::Constant | Shape::Iinc => 2,
            Shape::MultiNewArray => 3,
            Shape::BranchWide | Shape::InvokeInterface | Shape::InvokeDynamic => 4,
            Shape::TableSwitch | Shape::LookupSwitch | Shape::Wide => return None,
        })
    }
}

macro_rules! opcodes {
    ($($opcode:expr => $name:ident, $display:expr, $shape:ident;)*) => {
        $(pub const $name: u8 = $opcode;)*

        /// Mnemonic of an opcode, or `None` if the opcode is unassigned.
        pub fn opcode_name(opcode: u8) -> Option<&'static str> {
            match opcode {
                $($name => Some($display),)*
                _ => None,
            }
        }

        /// Operand layout of an opcode, or `None` if the opcode is unassigned.
        pub fn opcode_shape(opcode: u8) -> Option<Shape> {
            match opcode {
                $($name => Some(Shape::$shape),)*
                _ => None,
            }
        }
    };
}

opcodes! {
    0x00 => NOP, "nop", None;
    0x01 => ACONST_NULL, "aconst_null", None;
    0x02 => ICONST_M1, "iconst_m1", None;
    0x03 => ICONST_0, "iconst_0", None;
    0x04 => ICONST_1, "iconst_1", None;
    0x05 => ICONST_2, "iconst_2", None;
    0x06 => ICONST_3, "iconst_3", None;
    0x07 => ICONST_4, "iconst_4", None;
    0x08 => ICONST_5, "iconst_5", None;
    0x09 => LCONST_0, "lconst_0", None;
    0x0a => LCONST_1, "lconst_1", None;
    0x0b => FCONST_0, "fconst_0", None;
    0x0c => FCONST_1, "fconst_1", None;
    0x0d => FCONST_2, "fconst_2", None;
    0x0e => DCONST_0, "dconst_0", None;
    0x0f => DCONST_1, "dconst_1", None;
    0x10 => BIPUSH, "bipush", Byte;
    0x11 => SIPUSH, "sipush", Short;
    0x12 => LDC, "ldc", ConstantByte;
    0x13 => LDC_W, "ldc_w", Constant;
    0x14 => LDC2_W, "ldc2_w", Constant;
    0x15 => ILOAD, "iload", Local;
    0x16 => LLOAD, "lload", Local;
    0x17 => FLOAD, "fload", Local;
    0x18 => DLOAD, "dload", Local;
    0x19 => ALOAD, "aload", Local;
    0x1a => ILOAD_0, "iload_0", None;
    0x1b => ILOAD_1, "iload_1", None;
    0x1c => ILOAD_2, "iload_2", None;
    0x1d => ILOAD_3, "iload_3", None;
    0x1e => LLOAD_0, "lload_0", None;
    0x1f => LLOAD_1, "lload_1", None;
    0x20 => LLOAD_2, "lload_2", None;
    0x21 => LLOAD_3, "lload_3", None;
    0x22 => FLOAD_0, "fload_0", None;
    0x23 => FLOAD_1, "fload_1", None;
    0x24 => FLOAD_2, "fload_2", None;
    0x25 => FLOAD_3, "fload_3", None;
    0x26 => DLOAD_0, "dload_0", None;
    0x27 => DLOAD_1, "dload_1", None;
    0x28 => DLOAD_2, "dload_2", None;
    0x29 => DLOAD_3, "dload_3", None;
    0x2a => ALOAD_0, "aload_0", None;
    0x2b => ALOAD_1, "aload_1", None;
    0x2c => ALOAD_2, "aload_2", None;
    0x2d => ALOAD_3, "aload_3", None;
    0x2e => IALOAD, "iaload", None;
    0x2f => LALOAD, "laload", None;
    0x30 => FALOAD, "faload", None;
    0x31 => DALOAD, "daload", None;
    0x32 => AALOAD, "aaload", None;
    0x33 => BALOAD, "baload", None;
    0x34 => CALOAD, "caload", None;
    0x35 => SALOAD, "saload", None;
    0x36 => ISTORE, "istore", Local;
    0x37 => LSTORE, "lstore", Local;
    0x38 => FSTORE, "fstore", Local;
    0x39 => DSTORE, "dstore", Local;
    0x3a => ASTORE, "astore", Local;
    0x3b => ISTORE_0, "istore_0", None;
    0x3c => ISTORE_1, "istore_1", None;
    0x3d => ISTORE_2, "istore_2", None;
    0x3e => ISTORE_3, "istore_3", None;
    0x3f => LSTORE_0, "lstore_0", None;
    0x40 => LSTORE_1, "lstore_1", None;
    0x41 => LSTORE_2, "lstore_2", None;
    0x42 => LSTORE_3, "lstore_3", None;
    0x43 => FSTORE_0, "fstore_0", None;
    0x44 => FSTORE_1, "fstore_1", None;
    0x45 => FSTORE_2, "fstore_2", None;
    0x46 => FSTORE_3, "fstore_3", None;
    0x47 => DSTORE_0, "dstore_0", None;
    0x48 => DSTORE_1, "dstore_1", None;
    0x49 => DSTORE_2, "dstore_2", None;
    0x4a => DSTORE_3, "dstore_3", None;
    0x4b => ASTORE_0, "astore_0", None;
    0x4c => ASTORE_1, "astore_1", None;
    0x4d => ASTORE_2, "astore_2", None;
    0x4e => ASTORE_3, "astore_3", None;
    0x4f => IASTORE, "iastore", None;
    0x50 => LASTORE, "lastore", None;
    0x51 => FASTORE, "fastore", None;
    0x52 => DASTORE, "dastore", None;
    0x53 => AASTORE, "aastore", None;
    0x54 => BASTORE, "bastore", None;
    0x55 => CASTORE, "castore", None;
    0x56 => SASTORE, "sastore", None;
    0x57 => POP, "pop", None;
    0x58 => POP2, "pop2", None;
    0x59 => DUP, "dup", None;
    0x5a => DUP_X1, "dup_x1", None;
    0x5b => DUP_X2, "dup_x2", None;
    0x5c => DUP2, "dup2", None;
    0x5d => DUP2_X1, "dup2_x1", None;
    0x5e => DUP2_X2, "dup2_x2", None;
    0x5f => SWAP, "swap", None;
    0x60 => IADD, "iadd", None;
    0x61 => LADD, "ladd", None;
    0x62 => FADD, "fadd", None;
    0x63 => DADD, "dadd", None;
    0x64 => ISUB, "isub", None;
    0x65 => LSUB, "lsub", None;
    0x66 => FSUB, "fsub", None;
    0x67 => DSUB, "dsub", None;
    0x68 => IMUL, "imul", None;
    0x69 => LMUL, "lmul", None;
    0x6a => FMUL, "fmul", None;
    0x6b => DMUL, "dmul", None;
    0x6c => IDIV, "idiv", None;
    0x6d => LDIV, "ldiv", None;
    0x6e => FDIV, "fdiv", None;
    0x6f => DDIV, "ddiv", None;
    0x70 => IREM, "irem", None;
    0x71 => LREM, "lrem", None;
    0x72 => FREM, "frem", None;
    0x73 => DREM, "drem", None;
    0x74 => INEG, "ineg", None;
    0x75 => LNEG, "lneg", None;
    0x76 => FNEG, "fneg", None;
    0x77 => DNEG, "dneg", None;
    0x78 => ISHL, "ishl", None;
    0x79 => LSHL, "lshl", None;
    0x7a => ISHR, "ishr", None;
    0x7b => LSHR, "lshr", None;
    0x7c => IUSHR, "iushr", None;
    0x7d => LUSHR, "lushr", None;
    0x7e => IAND, "iand", None;
    0x7f => LAND, "land", None;
    0x80 => IOR, "ior", None;
    0x81 => LOR, "lor", None;
    0x82 => IXOR, "ixor", None;
    0x83 => LXOR, "lxor", None;
    0x84 => IINC, "iinc", Iinc;
    0x85 => I2L, "i2l", None;
    0x86 => I2F, "i2f", None;
    0x87 => I2D, "i2d", None;
    0x88 => L2I, "l2i", None;
    0x89 => L2F, "l2f", None;
    0x8a => L2D, "l2d", None;
    0x8b => F2I, "f2i", None;
    0x8c => F2L, "f2l", None;
    0x8d => F2D, "f2d", None;
    0x8e => D2I, "d2i", None;
    0x8f => D2L, "d2l", None;
    0x90 => D2F, "d2f", None;
    0x91 => I2B, "i2b", None;
    0x92 => I2C, "i2c", None;
    0x93 => I2S, "i2s", None;
    0x94 => LCMP, "lcmp", None;
    0x95 => FCMPL, "fcmpl", None;
    0x96 => FCMPG, "fcmpg", None;
    0x97 => DCMPL, "dcmpl", None;
    0x98 => DCMPG, "dcmpg", None;
    0x99 => IFEQ, "ifeq", Branch;
    0x9a => IFNE, "ifne", Branch;
    0x9b => IFLT, "iflt", Branch;
    0x9c => IFGE, "ifge", Branch;
    0x9d => IFGT, "ifgt", Branch;
    0x9e => IFLE, "ifle", Branch;
    0x9f => IF_ICMPEQ, "if_icmpeq", Branch;
    0xa0 => IF_ICMPNE, "if_icmpne", Branch;
    0xa1 => IF_ICMPLT, "if_icmplt", Branch;
    0xa2 => IF_ICMPGE, "if_icmpge", Branch;
    0xa3 => IF_ICMPGT, "if_icmpgt", Branch;
    0xa4 => IF_ICMPLE, "if_icmple", Branch;
    0xa5 => IF_ACMPEQ, "if_acmpeq", Branch;
    0xa6 => IF_ACMPNE, "if_acmpne", Branch;
    0xa7 => GOTO, "goto", Branch;
    0xa8 => JSR, "jsr", Branch;
    0xa9 => RET, "ret", Local;
    0xaa => TABLESWITCH, "tableswitch", TableSwitch;
    0xab => LOOKUPSWITCH, "lookupswitch", LookupSwitch;
    0xac => IRETURN, "ireturn", None;
    0xad => LRETURN, "lreturn", None;
    0xae => FRETURN, "freturn", None;
    0xaf => DRETURN, "dreturn", None;
    0xb0 => ARETURN, "areturn", None;
    0xb1 => RETURN, "return", None;
    0xb2 => GETSTATIC, "getstatic", Constant;
    0xb3 => PUTSTATIC, "putstatic", Constant;
    0xb4 => GETFIELD, "getfield", Constant;
    0xb5 => PUTFIELD, "putfield", Constant;
    0xb6 => INVOKEVIRTUAL, "invokevirtual", Constant;
    0xb7 => INVOKESPECIAL, "invokespecial", Constant;
    0xb8 => INVOKESTATIC, "invokestatic", Constant;
    0xb9 => INVOKEINTERFACE, "invokeinterface", InvokeInterface;
    0xba => INVOKEDYNAMIC, "invokedynamic", InvokeDynamic;
    0xbb => NEW, "new", Constant;
    0xbc => NEWARRAY, "newarray", ArrayType;
    0xbd => ANEWARRAY, "anewarray", Constant;
    0xbe => ARRAYLENGTH, "arraylength", None;
    0xbf => ATHROW, "athrow", None;
    0xc0 => CHECKCAST, "checkcast", Constant;
    0xc1 => INSTANCEOF, "instanceof", Constant;
    0xc2 => MONITORENTER, "monitorenter", None;
    0xc3 => MONITOREXIT, "monitorexit", None;
    0xc4 => WIDE, "wide", Wide;
    0xc5 => MULTIANEWARRAY, "multianewarray", MultiNewArray;
    0xc6 => IFNULL, "ifnull", Branch;
    0xc7 => IFNONNULL, "ifnonnull", Branch;
    0xc8 => GOTO_W, "goto_w", BranchWide;
    0xc9 => JSR_W, "jsr_w", BranchWide;
    0xca => BREAKPOINT, "breakpoint", None;
    0xfe => IMPDEP1, "impdep1", None;
    0xff => IMPDEP2, "impdep2", None;
}

/// Operand layout of an opcode following a `wide` prefix, where operands are
/// twice as wide as usual.
fn wide_shape(opcode: u8) -> Option<Shape> {
    match opcode {
        ILOAD | LLOAD | FLOAD | DLOAD | ALOAD | ISTORE | LSTORE | FSTORE | DSTORE | ASTORE
        | RET => Some(Shape::Local),
        IINC => Some(Shape::Iinc),
        _ => None,
    }
}

/// Number of padding bytes after a switch opcode at `pc`, so that its first
/// operand starts on a multiple of four from the start of the code.
pub fn switch_padding(pc: usize) -> usize {
    (4 - (pc + 1) % 4) % 4
}

/// Primitive element type of a `newarray`.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ArrayType {
    Boolean = 4,
    Char = 5,
    Float = 6,
    Double = 7,
    Byte = 8,
    Short = 9,
    Int = 10,
    Long = 11,
}

impl ArrayType {
    pub fn from_u8(tag: u8) -> Option<ArrayType> {
        Some(match tag {
            4 => ArrayType::Boolean,
            5 => ArrayType::Char,
            6 => ArrayType::Float,
            7 => ArrayType::Double,
            8 => ArrayType::Byte,
            9 => ArrayType::Short,
            10 => ArrayType::Int,
            11 => ArrayType::Long,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            ArrayType::Boolean => "boolean",
            ArrayType::Char => "char",
            ArrayType::Float => "float",
            ArrayType::Double => "double",
            ArrayType::Byte => "byte",
            ArrayType::Short => "short",
            ArrayType::Int => "int",
            ArrayType::Long => "long",
        }
    }
}

/// Decoded operands of a single instruction. Branch offsets are relative to
/// the pc of the instruction they belong to.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Operands {
    None,
    /// `newarray`'s element type tag, kept raw since the verifier and not the
    /// format decides which tags are legal.
    ArrayType(u8),
    Branch(i32),
    /// `bipush` or `sipush`.
    Immediate(i32),
    Constant(PoolIndex),
    InvokeInterface {
        index: PoolIndex,
        count: u8,
    },
    MultiNewArray {
        index: PoolIndex,
        dimensions: u8,
    },
    Local(u16),
    Iinc {
        index: u16,
        value: i16,
    },
    TableSwitch {
        default: i32,
        low: i32,
        high: i32,
        offsets: Vec<i32>,
    },
    LookupSwitch {
        default: i32,
        /// `(match, offset)` pairs, sorted by match in well-formed code.
        pairs: Vec<(i32, i32)>,
    },
}

impl Operands {
    /// Every relative branch offset this instruction can jump by.
    pub fn branch_offsets(&self) -> Vec<i32> {
        match self {
            Operands::Branch(offset) => vec![*offset],
            Operands::TableSwitch {
                default, offsets, ..
            } => std::iter::once(*default)
                .chain(offsets.iter().copied())
                .collect(),
            Operands::LookupSwitch { default, pairs } => std::iter::once(*default)
                .chain(pairs.iter().map(|&(_, offset)| offset))
                .collect(),
            _ => vec![],
        }
    }
}

/// A borrowed view of one instruction inside a code array.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Instruction<'code> {
    pc: usize,
    /// For widened instructions, the opcode after the `wide` prefix.
    opcode: u8,
    wide: bool,
    /// All bytes of the instruction, including the opcode.
    bytes: &'code [u8],
}

impl<'code> Instruction<'code> {
    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn opcode(&self) -> u8 {
        self.opcode
    }

    pub fn is_wide(&self) -> bool {
        self.wide
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn bytes(&self) -> &'code [u8] {
        self.bytes
    }

    pub fn name(&self) -> &'static str {
        opcode_name(self.opcode).unwrap_or("<unknown>")
    }

    pub fn operands(&self) -> InstructionResult<Operands> {
        let truncated = |_| InstructionError::Truncated {
            pc: self.pc,
            opcode: self.opcode,
        };
        let mut input = ByteParser::new(self.bytes);

        if self.wide {
            input.offset = 2;
            let index = input.parse_u16().map_err(truncated)?;
            return Ok(if self.opcode == IINC {
                let value = input.parse_i16().map_err(truncated)?;
                Operands::Iinc { index, value }
            } else {
                Operands::Local(index)
            });
        }

        input.offset = 1;
        let shape = opcode_shape(self.opcode).ok_or(InstructionError::UnknownOpcode {
            pc: self.pc,
            opcode: self.opcode,
        })?;

        Ok(match shape {
            Shape::None | Shape::Wide => Operands::None,
            Shape::ArrayType => Operands::ArrayType(input.parse_u8().map_err(truncated)?),
            Shape::Branch => Operands::Branch(input.parse_i16().map_err(truncated)? as i32),
            Shape::BranchWide => Operands::Branch(input.parse_i32().map_err(truncated)?),
            Shape::Byte => Operands::Immediate(input.parse_i8().map_err(truncated)? as i32),
            Shape::Short => Operands::Immediate(input.parse_i16().map_err(truncated)? as i32),
            Shape::ConstantByte => Operands::Constant(input.parse_u8().map_err(truncated)? as u16),
            Shape::Constant | Shape::InvokeDynamic => {
                Operands::Constant(input.parse_u16().map_err(truncated)?)
            }
            Shape::InvokeInterface => Operands::InvokeInterface {
                index: input.parse_u16().map_err(truncated)?,
                count: input.parse_u8().map_err(truncated)?,
            },
            Shape::MultiNewArray => Operands::MultiNewArray {
                index: input.parse_u16().map_err(truncated)?,
                dimensions: input.parse_u8().map_err(truncated)?,
            },
            Shape::Local => Operands::Local(input.parse_u8().map_err(truncated)? as u16),
            Shape::Iinc => Operands::Iinc {
                index: input.parse_u8().map_err(truncated)? as u16,
                value: input.parse_i8().map_err(truncated)? as i16,
            },
            Shape::TableSwitch => {
                input.offset += switch_padding(self.pc);
                let default = input.parse_i32().map_err(truncated)?;
                let low = input.parse_i32().map_err(truncated)?;
                let high = input.parse_i32().map_err(truncated)?;
                let count = (high as i64 - low as i64 + 1) as usize;
                let offsets = input
                    .seq(count, |input| input.parse_i32())
                    .map_err(truncated)?;
                Operands::TableSwitch {
                    default,
                    low,
                    high,
                    offsets,
                }
            }
            Shape::LookupSwitch => {
                input.offset += switch_padding(self.pc);
                let default = input.parse_i32().map_err(truncated)?;
                let npairs = input.parse_i32().map_err(truncated)? as usize;
                let pairs = input
                    .seq(npairs, |input| -> Result<_, ParseError> {
                        Ok((input.parse_i32()?, input.parse_i32()?))
                    })
                    .map_err(truncated)?;
                Operands::LookupSwitch { default, pairs }
            }
        })
    }
}

/// Length of the switch at `pc`, checked against the code array before any
/// table is read.
fn switch_len(code: &[u8], pc: usize, opcode: u8) -> InstructionResult<usize> {
    let truncated = InstructionError::Truncated { pc, opcode };
    let header = 1 + switch_padding(pc);
    let mut input = ByteParser::new(code.get(pc + header..).ok_or(truncated)?);

    let _default = input.parse_i32().map_err(|_| truncated)?;
    let (fixed, entries) = if opcode == TABLESWITCH {
        let low = input.parse_i32().map_err(|_| truncated)?;
        let high = input.parse_i32().map_err(|_| truncated)?;
        if low > high {
            return Err(InstructionError::InvalidSwitchRange { pc, low, high });
        }
        (12, (high as i64 - low as i64 + 1) as u64 * 4)
    } else {
        let npairs = input.parse_i32().map_err(|_| truncated)?;
        if npairs < 0 {
            return Err(InstructionError::NegativePairCount { pc, npairs });
        }
        (8, npairs as u64 * 8)
    };

    if entries > input.remaining() as u64 {
        return Err(truncated);
    }
    Ok(header + fixed + entries as usize)
}

/// Decodes the instruction starting at `pc`, returning it along with the pc
/// of the instruction after it.
pub fn decode_at(code: &[u8], pc: usize) -> InstructionResult<(Instruction<'_>, usize)> {
    let opcode = *code.get(pc).ok_or(InstructionError::PcOutOfRange { pc })?;
    let shape = opcode_shape(opcode).ok_or(InstructionError::UnknownOpcode { pc, opcode })?;

    let (opcode, wide, len) = match shape {
        Shape::Wide => {
            let widened = *code
                .get(pc + 1)
                .ok_or(InstructionError::Truncated { pc, opcode })?;
            let len = match wide_shape(widened) {
                Some(Shape::Iinc) => 6,
                Some(_) => 4,
                None => return Err(InstructionError::InvalidWide { pc, opcode: widened }),
            };
            (widened, true, len)
        }
        Shape::TableSwitch | Shape::LookupSwitch => (opcode, false, switch_len(code, pc, opcode)?),
        _ => (opcode, false, 1 + shape.fixed_len().unwrap_or(0)),
    };

    let bytes = code
        .get(pc..pc + len)
        .ok_or(InstructionError::Truncated { pc, opcode })?;
    let instruction = Instruction {
        pc,
        opcode,
        wide,
        bytes,
    };
    Ok((instruction, pc + len))
}

/// Forward-only iterator over the instructions of a code array. Iteration
/// stops after the first error.
#[derive(Clone, Debug)]
pub struct Instructions<'code> {
    code: &'code [u8],
    pc: usize,
    failed: bool,
}

impl<'code> Instructions<'code> {
    pub fn new(code: &'code [u8]) -> Self {
        Instructions {
            code,
            pc: 0,
            failed: false,
        }
    }
}

impl<'code> Iterator for Instructions<'code> {
    type Item = InstructionResult<Instruction<'code>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pc >= self.code.len() {
            return None;
        }

        match decode_at(self.code, self.pc) {
            Ok((instruction, next)) => {
                self.pc = next;
                Some(Ok(instruction))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}
