//! # Stack map frames
//!
//! The frame kind is decided entirely by the leading `frame_type` byte.
//!
//! ```txt
//! StackMapFrame {
//!     frame_type: u8,
//!     frame: match frame_type {
//!         0..=63 => Same {}
//!         64..=127 => SameLocals1StackItem {
//!             stack: VerificationType
//!         }
//!         128..=246 => reserved
//!         247 => SameLocals1StackItemExtended {
//!             offset_delta: u16
//!             stack: VerificationType
//!         }
//!         248..=250 => Chop {
//!             offset_delta: u16
//!         }
//!         251 => SameExtended {
//!             offset_delta: u16
//!         }
//!         252..=254 => Append {
//!             offset_delta: u16
//!             locals: [VerificationType; frame_type - 251]
//!         }
//!         255 => Full {
//!             offset_delta: u16
//!             locals_count: u16
//!             locals: [VerificationType; locals_count]
//!             stack_count: u16
//!             stack: [VerificationType; stack_count]
//!         }
//!     },
//! }
//! ```
//!
//! The older `StackMap` attribute stores only full frames, without the
//! `frame_type` byte.

use crate::{
    constant::PoolIndex,
    parse::ByteParser,
    write::{ByteWriter, Encode},
    ClassError, ClassResult,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum VerificationType {
    Top,
    Integer,
    Float,
    Double,
    Long,
    Null,
    UninitializedThis,
    /// A `Class` constant.
    Object(PoolIndex),
    /// Code offset of the `new` instruction that created the object.
    Uninitialized(u16),
}

impl VerificationType {
    pub fn tag(&self) -> u8 {
        match self {
            VerificationType::Top => 0,
            VerificationType::Integer => 1,
            VerificationType::Float => 2,
            VerificationType::Double => 3,
            VerificationType::Long => 4,
            VerificationType::Null => 5,
            VerificationType::UninitializedThis => 6,
            VerificationType::Object(_) => 7,
            VerificationType::Uninitialized(_) => 8,
        }
    }
}

impl Encode for VerificationType {
    fn encoded_len(&self) -> usize {
        match self {
            VerificationType::Object(_) | VerificationType::Uninitialized(_) => 3,
            _ => 1,
        }
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        out.write_u8(self.tag());
        match self {
            VerificationType::Object(index) | VerificationType::Uninitialized(index) => {
                out.write_u16(*index)
            }
            _ => {}
        }
        Ok(())
    }
}

pub fn parse_verification_type(input: &mut ByteParser<'_>) -> ClassResult<VerificationType> {
    Ok(match input.parse_u8()? {
        0 => VerificationType::Top,
        1 => VerificationType::Integer,
        2 => VerificationType::Float,
        3 => VerificationType::Double,
        4 => VerificationType::Long,
        5 => VerificationType::Null,
        6 => VerificationType::UninitializedThis,
        7 => VerificationType::Object(input.parse_u16()?),
        8 => VerificationType::Uninitialized(input.parse_u16()?),

        other => return Err(ClassError::UnknownVerificationType(other)),
    })
}

fn parse_verification_types(
    input: &mut ByteParser<'_>,
    len: usize,
) -> ClassResult<Vec<VerificationType>> {
    input.seq(len, parse_verification_type)
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum StackMapFrame {
    /// `offset_delta` is stored in the frame type itself, so it is at most 63.
    Same { offset_delta: u8 },
    /// `offset_delta` is stored in the frame type itself, so it is at most 63.
    SameLocals1StackItem {
        offset_delta: u8,
        stack: VerificationType,
    },
    SameLocals1StackItemExtended {
        offset_delta: u16,
        stack: VerificationType,
    },
    /// The last `chopped` locals (1 to 3) are absent.
    Chop { chopped: u8, offset_delta: u16 },
    SameExtended { offset_delta: u16 },
    /// One to three additional locals.
    Append {
        offset_delta: u16,
        locals: Vec<VerificationType>,
    },
    Full {
        offset_delta: u16,
        locals: Vec<VerificationType>,
        stack: Vec<VerificationType>,
    },
}

impl StackMapFrame {
    pub fn frame_type(&self) -> ClassResult<u8> {
        Ok(match self {
            StackMapFrame::Same { offset_delta } if *offset_delta <= 63 => *offset_delta,
            StackMapFrame::SameLocals1StackItem { offset_delta, .. } if *offset_delta <= 63 => {
                64 + offset_delta
            }
            StackMapFrame::Same { offset_delta }
            | StackMapFrame::SameLocals1StackItem { offset_delta, .. } => {
                return Err(ClassError::TooLarge {
                    what: "stack map frame offset delta",
                    len: *offset_delta as usize,
                })
            }
            StackMapFrame::SameLocals1StackItemExtended { .. } => 247,
            StackMapFrame::Chop { chopped, .. } if (1..=3).contains(chopped) => 251 - chopped,
            StackMapFrame::Chop { chopped, .. } => {
                return Err(ClassError::TooLarge {
                    what: "chopped locals",
                    len: *chopped as usize,
                })
            }
            StackMapFrame::SameExtended { .. } => 251,
            StackMapFrame::Append { locals, .. } if (1..=3).contains(&locals.len()) => {
                251 + locals.len() as u8
            }
            StackMapFrame::Append { locals, .. } => {
                return Err(ClassError::TooLarge {
                    what: "appended locals",
                    len: locals.len(),
                })
            }
            StackMapFrame::Full { .. } => 255,
        })
    }

    /// The bytecode offset increment from the previous frame.
    pub fn offset_delta(&self) -> u16 {
        match self {
            StackMapFrame::Same { offset_delta }
            | StackMapFrame::SameLocals1StackItem { offset_delta, .. } => *offset_delta as u16,
            StackMapFrame::SameLocals1StackItemExtended { offset_delta, .. }
            | StackMapFrame::Chop { offset_delta, .. }
            | StackMapFrame::SameExtended { offset_delta }
            | StackMapFrame::Append { offset_delta, .. }
            | StackMapFrame::Full { offset_delta, .. } => *offset_delta,
        }
    }
}

impl Encode for StackMapFrame {
    fn encoded_len(&self) -> usize {
        1 + match self {
            StackMapFrame::Same { .. } => 0,
            StackMapFrame::SameLocals1StackItem { stack, .. } => stack.encoded_len(),
            StackMapFrame::SameLocals1StackItemExtended { stack, .. } => 2 + stack.encoded_len(),
            StackMapFrame::Chop { .. } | StackMapFrame::SameExtended { .. } => 2,
            StackMapFrame::Append { locals, .. } => 2 + locals.encoded_len(),
            StackMapFrame::Full { locals, stack, .. } => {
                6 + locals.encoded_len() + stack.encoded_len()
            }
        }
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        out.write_u8(self.frame_type()?);
        match self {
            StackMapFrame::Same { .. } => Ok(()),
            StackMapFrame::SameLocals1StackItem { stack, .. } => stack.encode(out),
            StackMapFrame::SameLocals1StackItemExtended {
                offset_delta,
                stack,
            } => {
                out.write_u16(*offset_delta);
                stack.encode(out)
            }
            StackMapFrame::Chop { offset_delta, .. }
            | StackMapFrame::SameExtended { offset_delta } => {
                out.write_u16(*offset_delta);
                Ok(())
            }
            StackMapFrame::Append {
                offset_delta,
                locals,
            } => {
                out.write_u16(*offset_delta);
                locals.encode(out)
            }
            StackMapFrame::Full {
                offset_delta,
                locals,
                stack,
            } => {
                out.write_u16(*offset_delta);
                out.write_seq_u16("full frame locals", locals)?;
                out.write_seq_u16("full frame stack", stack)
            }
        }
    }
}

pub fn parse_stack_map_frame(input: &mut ByteParser<'_>) -> ClassResult<StackMapFrame> {
    let frame_type = input.parse_u8()?;

    Ok(match frame_type {
        0..=63 => StackMapFrame::Same {
            offset_delta: frame_type,
        },
        64..=127 => StackMapFrame::SameLocals1StackItem {
            offset_delta: frame_type - 64,
            stack: parse_verification_type(input)?,
        },
        247 => {
            let offset_delta = input.parse_u16()?;
            let stack = parse_verification_type(input)?;
            StackMapFrame::SameLocals1StackItemExtended {
                offset_delta,
                stack,
            }
        }
        248..=250 => StackMapFrame::Chop {
            chopped: 251 - frame_type,
            offset_delta: input.parse_u16()?,
        },
        251 => StackMapFrame::SameExtended {
            offset_delta: input.parse_u16()?,
        },
        252..=254 => {
            let offset_delta = input.parse_u16()?;
            let locals = parse_verification_types(input, frame_type as usize - 251)?;
            StackMapFrame::Append {
                offset_delta,
                locals,
            }
        }
        255 => {
            let offset_delta = input.parse_u16()?;
            let locals_len = input.parse_u16()? as usize;
            let locals = parse_verification_types(input, locals_len)?;
            let stack_len = input.parse_u16()? as usize;
            let stack = parse_verification_types(input, stack_len)?;
            StackMapFrame::Full {
                offset_delta,
                locals,
                stack,
            }
        }
        reserved => return Err(ClassError::ReservedStackMapFrameType(reserved)),
    })
}

pub fn parse_stack_map_table(input: &mut ByteParser<'_>) -> ClassResult<Vec<StackMapFrame>> {
    let len = input.parse_u16()? as usize;
    input.seq(len, parse_stack_map_frame)
}

/// An entry of the legacy `StackMap` attribute: a full frame with no
/// `frame_type` byte.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct StackMapEntry {
    pub offset: u16,
    pub locals: Vec<VerificationType>,
    pub stack: Vec<VerificationType>,
}

impl Encode for StackMapEntry {
    fn encoded_len(&self) -> usize {
        6 + self.locals.encoded_len() + self.stack.encoded_len()
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        out.write_u16(self.offset);
        out.write_seq_u16("stack map locals", &self.locals)?;
        out.write_seq_u16("stack map stack", &self.stack)
    }
}

pub fn parse_stack_map_entry(input: &mut ByteParser<'_>) -> ClassResult<StackMapEntry> {
    let offset = input.parse_u16()?;
    let locals_len = input.parse_u16()? as usize;
    let locals = parse_verification_types(input, locals_len)?;
    let stack_len = input.parse_u16()? as usize;
    let stack = parse_verification_types(input, stack_len)?;
    Ok(StackMapEntry {
        offset,
        locals,
        stack,
    })
}

pub fn parse_stack_map(input: &mut ByteParser<'_>) -> ClassResult<Vec<StackMapEntry>> {
    let len = input.parse_u16()? as usize;
    input.seq(len, parse_stack_map_entry)
}
