//! # Attribute Formats
//!
//! ## General Form
//! The general form of an attribute is listed below. It is comprised of an
//! index into the constant pool, representing the name of the attribute,
//! followed by the byte length of the *rest* of the attribute, not including
//! the first six bytes, followed by attribute-specific information, whose
//! length is decided by the attribute type.
//!
//! ```txt
//! AttributeInfo {
//!     name_index: u16,
//!     length: u32,
//!     info: [u8; length],
//! }
//! ```
//!
//! ## Decoding
//! A known attribute is decoded from a parser scoped to exactly `length`
//! bytes, and must consume all of them. If the name does not resolve, is not
//! known, or the body does not decode, the attribute is kept as a
//! [`DefaultAttribute`] holding the raw bytes, so one bad attribute never
//! fails the whole class.

pub mod annotation;
pub mod code;
pub mod module;
pub mod stack_map;
pub mod tables;
pub mod type_annotation;

use log::warn;

use self::{
    annotation::{
        encode_parameter_annotations, parameter_annotations_len, parse_annotations,
        parse_element_value, parse_parameter_annotations, Annotation, ElementValue,
    },
    code::{parse_code, Code},
    module::{parse_module, parse_module_hashes, Module, ModuleHashes},
    stack_map::{parse_stack_map, parse_stack_map_table, StackMapEntry, StackMapFrame},
    tables::*,
    type_annotation::{parse_type_annotations, TypeAnnotation},
};
use crate::{
    constant::{ConstantPool, PoolIndex},
    mutf8::{self, JavaString},
    parse::ByteParser,
    signature::Signature,
    write::{ByteWriter, Encode},
    ClassError, ClassResult,
};

/// Every attribute this crate knows the layout of.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AttributeKind {
    AnnotationDefault,
    BootstrapMethods,
    CharacterRangeTable,
    Code,
    CompilationId,
    ConstantValue,
    Deprecated,
    EnclosingMethod,
    Exceptions,
    InnerClasses,
    LineNumberTable,
    LocalVariableTable,
    LocalVariableTypeTable,
    MethodParameters,
    Module,
    ModuleHashes,
    ModuleMainClass,
    ModulePackages,
    ModuleResolution,
    ModuleTarget,
    NestHost,
    NestMembers,
    PermittedSubclasses,
    Record,
    RuntimeInvisibleAnnotations,
    RuntimeInvisibleParameterAnnotations,
    RuntimeInvisibleTypeAnnotations,
    RuntimeVisibleAnnotations,
    RuntimeVisibleParameterAnnotations,
    RuntimeVisibleTypeAnnotations,
    Signature,
    SourceDebugExtension,
    SourceFile,
    SourceId,
    StackMap,
    StackMapTable,
    Synthetic,
}

const NAMES: &[(&str, AttributeKind)] = &[
    ("AnnotationDefault", AttributeKind::AnnotationDefault),
    ("BootstrapMethods", AttributeKind::BootstrapMethods),
    ("CharacterRangeTable", AttributeKind::CharacterRangeTable),
    ("Code", AttributeKind::Code),
    ("CompilationID", AttributeKind::CompilationId),
    ("ConstantValue", AttributeKind::ConstantValue),
    ("Deprecated", AttributeKind::Deprecated),
    ("EnclosingMethod", AttributeKind::EnclosingMethod),
    ("Exceptions", AttributeKind::Exceptions),
    ("InnerClasses", AttributeKind::InnerClasses),
    ("LineNumberTable", AttributeKind::LineNumberTable),
    ("LocalVariableTable", AttributeKind::LocalVariableTable),
    ("LocalVariableTypeTable", AttributeKind::LocalVariableTypeTable),
    ("MethodParameters", AttributeKind::MethodParameters),
    ("Module", AttributeKind::Module),
    ("ModuleHashes", AttributeKind::ModuleHashes),
    ("ModuleMainClass", AttributeKind::ModuleMainClass),
    ("ModulePackages", AttributeKind::ModulePackages),
    ("ModuleResolution", AttributeKind::ModuleResolution),
    ("ModuleTarget", AttributeKind::ModuleTarget),
    ("NestHost", AttributeKind::NestHost),
    ("NestMembers", AttributeKind::NestMembers),
    ("PermittedSubclasses", AttributeKind::PermittedSubclasses),
    ("Record", AttributeKind::Record),
    ("RuntimeInvisibleAnnotations", AttributeKind::RuntimeInvisibleAnnotations),
    ("RuntimeInvisibleParameterAnnotations", AttributeKind::RuntimeInvisibleParameterAnnotations),
    ("RuntimeInvisibleTypeAnnotations", AttributeKind::RuntimeInvisibleTypeAnnotations),
    ("RuntimeVisibleAnnotations", AttributeKind::RuntimeVisibleAnnotations),
    ("RuntimeVisibleParameterAnnotations", AttributeKind::RuntimeVisibleParameterAnnotations),
    ("RuntimeVisibleTypeAnnotations", AttributeKind::RuntimeVisibleTypeAnnotations),
    ("Signature", AttributeKind::Signature),
    ("SourceDebugExtension", AttributeKind::SourceDebugExtension),
    ("SourceFile", AttributeKind::SourceFile),
    ("SourceID", AttributeKind::SourceId),
    ("StackMap", AttributeKind::StackMap),
    ("StackMapTable", AttributeKind::StackMapTable),
    ("Synthetic", AttributeKind::Synthetic),
];

impl AttributeKind {
    pub fn from_name(name: &str) -> Option<AttributeKind> {
        NAMES
            .iter()
            .find(|(known, _)| *known == name)
            .map(|&(_, kind)| kind)
    }

    pub fn name(self) -> &'static str {
        NAMES
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|&(name, _)| name)
            .unwrap_or("")
    }
}

/// An attribute kept as raw bytes.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DefaultAttribute {
    pub info: Vec<u8>,
    /// Why the attribute was not decoded.
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Attribute {
    /// Attribute that was unrecognized or malformed. It round trips exactly,
    /// but has no structure.
    Default(DefaultAttribute),

    AnnotationDefault(ElementValue),
    BootstrapMethods(Vec<BootstrapMethod>),
    CharacterRangeTable(Vec<CharacterRange>),

    /// Contains JVM bytecode for a single method, along with additional
    /// information. This information includes the size of the code and
    /// stack, as well as exception handlers and other attributes. Every method
    /// not marked as `native` or `abstract` must have this attribute, otherwise
    /// it must *not* have this atribute.
    Code(Code),

    /// A `Utf8` constant.
    CompilationId(PoolIndex),

    /// Represents the value of a constant field. Below is a table describing
    /// what constant pool entry type is associated with each field type.
    ///
    /// | Field type                      | Constant pool entry type |
    /// |:-------------------------------:|:------------------------:|
    /// | long                            | Long                     |
    /// | float                           | Float                    |
    /// | double                          | Double                   |
    /// | int, short, char, byte, boolean | Integer                  |
    /// | String                          | String                   |
    ConstantValue(PoolIndex),

    /// A marker that means this item is deprecated and should not be used in
    /// the future. This should not have any effect on semantics.
    Deprecated,

    EnclosingMethod(EnclosingMethod),

    /// Represents which checked exceptions a method can throw. Each item is an
    /// index to a `Class` constant that represents a class that can be thrown.
    Exceptions(Vec<PoolIndex>),

    InnerClasses(Vec<InnerClass>),

    /// Maps the start of an instruction to the source line it was generated
    /// from. Entries are kept in file order, which need not be sorted.
    LineNumberTable(Vec<LineNumber>),

    /// Type-erased local variable table.
    LocalVariableTable(Vec<LocalVariable>),
    /// Fully elaborated local variable table.
    LocalVariableTypeTable(Vec<LocalVariable>),

    MethodParameters(Vec<MethodParameter>),

    Module(Module),
    ModuleHashes(ModuleHashes),
    /// A `Class` constant.
    ModuleMainClass(PoolIndex),
    /// `Package` constants.
    ModulePackages(Vec<PoolIndex>),
    ModuleResolution(u16),
    /// A `Utf8` constant naming the target platform.
    ModuleTarget(PoolIndex),

    /// A `Class` constant.
    NestHost(PoolIndex),
    /// `Class` constants.
    NestMembers(Vec<PoolIndex>),
    /// `Class` constants.
    PermittedSubclasses(Vec<PoolIndex>),

    Record(Vec<RecordComponent>),

    RuntimeInvisibleAnnotations(Vec<Annotation>),
    RuntimeInvisibleParameterAnnotations(Vec<Vec<Annotation>>),
    RuntimeInvisibleTypeAnnotations(Vec<TypeAnnotation>),
    RuntimeVisibleAnnotations(Vec<Annotation>),
    RuntimeVisibleParameterAnnotations(Vec<Vec<Annotation>>),
    RuntimeVisibleTypeAnnotations(Vec<TypeAnnotation>),

    /// Contains either a class, method, or field signature, depending on what
    /// the attribute was declared on.
    Signature(Signature),

    /// Arbitrary extended debugging data. Should have no effect on the JVM.
    SourceDebugExtension(JavaString),

    /// Points to a `Utf8` entry in the constant pool representing the
    /// file name of the class this is declared on.
    SourceFile(PoolIndex),
    /// A `Utf8` constant.
    SourceId(PoolIndex),

    StackMap(Vec<StackMapEntry>),

    /// Contains information pertinent to the bytecode verifier, so that it can
    /// do a one-pass analysis of the bytecode.
    StackMapTable(Vec<StackMapFrame>),

    /// A marker that means this item does not appear anywhere in source code.
    Synthetic,
}

impl Attribute {
    /// `None` for attributes that were kept as raw bytes.
    pub fn kind(&self) -> Option<AttributeKind> {
        Some(match self {
            Attribute::Default(_) => return None,
            Attribute::AnnotationDefault(_) => AttributeKind::AnnotationDefault,
            Attribute::BootstrapMethods(_) => AttributeKind::BootstrapMethods,
            Attribute::CharacterRangeTable(_) => AttributeKind::CharacterRangeTable,
            Attribute::Code(_) => AttributeKind::Code,
            Attribute::CompilationId(_) => AttributeKind::CompilationId,
            Attribute::ConstantValue(_) => AttributeKind::ConstantValue,
            Attribute::Deprecated => AttributeKind::Deprecated,
            Attribute::EnclosingMethod(_) => AttributeKind::EnclosingMethod,
            Attribute::Exceptions(_) => AttributeKind::Exceptions,
            Attribute::InnerClasses(_) => AttributeKind::InnerClasses,
            Attribute::LineNumberTable(_) => AttributeKind::LineNumberTable,
            Attribute::LocalVariableTable(_) => AttributeKind::LocalVariableTable,
            Attribute::LocalVariableTypeTable(_) => AttributeKind::LocalVariableTypeTable,
            Attribute::MethodParameters(_) => AttributeKind::MethodParameters,
            Attribute::Module(_) => AttributeKind::Module,
            Attribute::ModuleHashes(_) => AttributeKind::ModuleHashes,
            Attribute::ModuleMainClass(_) => AttributeKind::ModuleMainClass,
            Attribute::ModulePackages(_) => AttributeKind::ModulePackages,
            Attribute::ModuleResolution(_) => AttributeKind::ModuleResolution,
            Attribute::ModuleTarget(_) => AttributeKind::ModuleTarget,
            Attribute::NestHost(_) => AttributeKind::NestHost,
            Attribute::NestMembers(_) => AttributeKind::NestMembers,
            Attribute::PermittedSubclasses(_) => AttributeKind::PermittedSubclasses,
            Attribute::Record(_) => AttributeKind::Record,
            Attribute::RuntimeInvisibleAnnotations(_) => AttributeKind::RuntimeInvisibleAnnotations,
            Attribute::RuntimeInvisibleParameterAnnotations(_) => {
                AttributeKind::RuntimeInvisibleParameterAnnotations
            }
            Attribute::RuntimeInvisibleTypeAnnotations(_) => {
                AttributeKind::RuntimeInvisibleTypeAnnotations
            }
            Attribute::RuntimeVisibleAnnotations(_) => AttributeKind::RuntimeVisibleAnnotations,
            Attribute::RuntimeVisibleParameterAnnotations(_) => {
                AttributeKind::RuntimeVisibleParameterAnnotations
            }
            Attribute::RuntimeVisibleTypeAnnotations(_) => {
                AttributeKind::RuntimeVisibleTypeAnnotations
            }
            Attribute::Signature(_) => AttributeKind::Signature,
            Attribute::SourceDebugExtension(_) => AttributeKind::SourceDebugExtension,
            Attribute::SourceFile(_) => AttributeKind::SourceFile,
            Attribute::SourceId(_) => AttributeKind::SourceId,
            Attribute::StackMap(_) => AttributeKind::StackMap,
            Attribute::StackMapTable(_) => AttributeKind::StackMapTable,
            Attribute::Synthetic => AttributeKind::Synthetic,
        })
    }
}

fn u16_table_len(table: &[u16]) -> usize {
    2 + 2 * table.len()
}

/// Encoding of the attribute body, without the name and length.
impl Encode for Attribute {
    fn encoded_len(&self) -> usize {
        match self {
            Attribute::Default(attr) => attr.info.len(),
            Attribute::Deprecated | Attribute::Synthetic => 0,

            Attribute::CompilationId(_)
            | Attribute::ConstantValue(_)
            | Attribute::ModuleMainClass(_)
            | Attribute::ModuleResolution(_)
            | Attribute::ModuleTarget(_)
            | Attribute::NestHost(_)
            | Attribute::SourceFile(_)
            | Attribute::SourceId(_) => 2,
            Attribute::Signature(sig) => sig.encoded_len(),
            Attribute::EnclosingMethod(method) => method.encoded_len(),

            Attribute::Exceptions(table)
            | Attribute::ModulePackages(table)
            | Attribute::NestMembers(table)
            | Attribute::PermittedSubclasses(table) => u16_table_len(table),

            Attribute::AnnotationDefault(value) => value.encoded_len(),
            Attribute::BootstrapMethods(methods) => 2 + methods.encoded_len(),
            Attribute::CharacterRangeTable(ranges) => 2 + ranges.encoded_len(),
            Attribute::Code(code) => code.encoded_len(),
            Attribute::InnerClasses(classes) => 2 + classes.encoded_len(),
            Attribute::LineNumberTable(lines) => 2 + lines.encoded_len(),
            Attribute::LocalVariableTable(vars) | Attribute::LocalVariableTypeTable(vars) => {
                2 + vars.encoded_len()
            }
            Attribute::MethodParameters(params) => 1 + params.encoded_len(),
            Attribute::Module(module) => module.encoded_len(),
            Attribute::ModuleHashes(hashes) => hashes.encoded_len(),
            Attribute::Record(components) => 2 + components.encoded_len(),

            Attribute::RuntimeInvisibleAnnotations(annotations)
            | Attribute::RuntimeVisibleAnnotations(annotations) => 2 + annotations.encoded_len(),
            Attribute::RuntimeInvisibleParameterAnnotations(params)
            | Attribute::RuntimeVisibleParameterAnnotations(params) => {
                parameter_annotations_len(params)
            }
            Attribute::RuntimeInvisibleTypeAnnotations(annotations)
            | Attribute::RuntimeVisibleTypeAnnotations(annotations) => {
                2 + annotations.encoded_len()
            }

            Attribute::SourceDebugExtension(data) => data.mutf8_len(),
            Attribute::StackMap(entries) => 2 + entries.encoded_len(),
            Attribute::StackMapTable(frames) => 2 + frames.encoded_len(),
        }
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        match self {
            Attribute::Default(attr) => out.write_bytes(&attr.info),
            Attribute::Deprecated | Attribute::Synthetic => {}

            Attribute::CompilationId(index)
            | Attribute::ConstantValue(index)
            | Attribute::ModuleMainClass(index)
            | Attribute::ModuleResolution(index)
            | Attribute::ModuleTarget(index)
            | Attribute::NestHost(index)
            | Attribute::SourceFile(index)
            | Attribute::SourceId(index) => out.write_u16(*index),
            Attribute::Signature(sig) => sig.encode(out)?,
            Attribute::EnclosingMethod(method) => method.encode(out)?,

            Attribute::Exceptions(table) => out.write_u16_table("exceptions", table)?,
            Attribute::ModulePackages(table) => out.write_u16_table("module packages", table)?,
            Attribute::NestMembers(table) => out.write_u16_table("nest members", table)?,
            Attribute::PermittedSubclasses(table) => {
                out.write_u16_table("permitted subclasses", table)?
            }

            Attribute::AnnotationDefault(value) => value.encode(out)?,
            Attribute::BootstrapMethods(methods) => {
                out.write_seq_u16("bootstrap methods", methods)?
            }
            Attribute::CharacterRangeTable(ranges) => {
                out.write_seq_u16("character ranges", ranges)?
            }
            Attribute::Code(code) => code.encode(out)?,
            Attribute::InnerClasses(classes) => out.write_seq_u16("inner classes", classes)?,
            Attribute::LineNumberTable(lines) => out.write_seq_u16("line numbers", lines)?,
            Attribute::LocalVariableTable(vars) | Attribute::LocalVariableTypeTable(vars) => {
                out.write_seq_u16("local variables", vars)?
            }
            Attribute::MethodParameters(params) => {
                out.write_len_u8("method parameters", params.len())?;
                params.encode(out)?;
            }
            Attribute::Module(module) => module.encode(out)?,
            Attribute::ModuleHashes(hashes) => hashes.encode(out)?,
            Attribute::Record(components) => out.write_seq_u16("record components", components)?,

            Attribute::RuntimeInvisibleAnnotations(annotations)
            | Attribute::RuntimeVisibleAnnotations(annotations) => {
                out.write_seq_u16("annotations", annotations)?
            }
            Attribute::RuntimeInvisibleParameterAnnotations(params)
            | Attribute::RuntimeVisibleParameterAnnotations(params) => {
                encode_parameter_annotations(params, out)?
            }
            Attribute::RuntimeInvisibleTypeAnnotations(annotations)
            | Attribute::RuntimeVisibleTypeAnnotations(annotations) => {
                out.write_seq_u16("type annotations", annotations)?
            }

            Attribute::SourceDebugExtension(data) => out.write_bytes(&data.to_mutf8()),
            Attribute::StackMap(entries) => out.write_seq_u16("stack map", entries)?,
            Attribute::StackMapTable(frames) => out.write_seq_u16("stack map frames", frames)?,
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AttributeInfo {
    /// Index into the constant pool, pointing to a `Utf8` constant that
    /// denotes the name of the attribute.
    pub name: PoolIndex,
    pub attr: Attribute,
}

impl AttributeInfo {
    pub fn name<'p>(&self, pool: &'p ConstantPool) -> ClassResult<&'p str> {
        pool.utf8(self.name)
    }
}

impl Encode for AttributeInfo {
    fn encoded_len(&self) -> usize {
        6 + self.attr.encoded_len()
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        out.write_u16(self.name);
        let len_pos = out.reserve_u32();
        let start = out.position();
        self.attr.encode(out)?;

        let len = out.position() - start;
        let len = u32::try_from(len).map_err(|_| ClassError::TooLarge {
            what: "attribute",
            len,
        })?;
        out.patch_u32(len_pos, len);
        Ok(())
    }
}

/// The attribute table of a class, field, method, code body or record
/// component, in file order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attributes {
    attrs: Vec<AttributeInfo>,
}

impl Attributes {
    pub fn new(attrs: Vec<AttributeInfo>) -> Self {
        Attributes { attrs }
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AttributeInfo> {
        self.attrs.iter()
    }

    pub fn push(&mut self, attr: AttributeInfo) {
        self.attrs.push(attr);
    }

    /// The first decoded attribute of the given kind.
    pub fn get(&self, kind: AttributeKind) -> Option<&Attribute> {
        self.iter()
            .map(|info| &info.attr)
            .find(|attr| attr.kind() == Some(kind))
    }

    /// The first attribute with the given name, whether or not it decoded.
    pub fn find_by_name(&self, name: &str, pool: &ConstantPool) -> Option<&AttributeInfo> {
        self.iter()
            .find(|info| info.name(pool).map_or(false, |found| found == name))
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a AttributeInfo;
    type IntoIter = std::slice::Iter<'a, AttributeInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl From<Vec<AttributeInfo>> for Attributes {
    fn from(attrs: Vec<AttributeInfo>) -> Self {
        Attributes::new(attrs)
    }
}

impl Encode for Attributes {
    fn encoded_len(&self) -> usize {
        2 + self.attrs.encoded_len()
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        out.write_seq_u16("attributes", &self.attrs)
    }
}

fn parse_u16_table(input: &mut ByteParser<'_>) -> ClassResult<Vec<u16>> {
    let len = input.parse_u16()? as usize;
    Ok(input.seq(len, |input| input.parse_u16())?)
}

fn parse_seq<'src, T, F>(input: &mut ByteParser<'src>, func: F) -> ClassResult<Vec<T>>
where
    F: FnMut(&mut ByteParser<'src>) -> ClassResult<T>,
{
    let len = input.parse_u16()? as usize;
    input.seq(len, func)
}

fn parse_body(
    kind: AttributeKind,
    input: &mut ByteParser<'_>,
    pool: &ConstantPool,
) -> ClassResult<Attribute> {
    Ok(match kind {
        AttributeKind::AnnotationDefault => Attribute::AnnotationDefault(parse_element_value(input)?),
        AttributeKind::BootstrapMethods => {
            Attribute::BootstrapMethods(parse_seq(input, parse_bootstrap_method)?)
        }
        AttributeKind::CharacterRangeTable => {
            Attribute::CharacterRangeTable(parse_seq(input, parse_character_range)?)
        }
        AttributeKind::Code => Attribute::Code(parse_code(input, pool)?),
        AttributeKind::CompilationId => Attribute::CompilationId(input.parse_u16()?),
        AttributeKind::ConstantValue => Attribute::ConstantValue(input.parse_u16()?),
        AttributeKind::Deprecated => Attribute::Deprecated,
        AttributeKind::EnclosingMethod => Attribute::EnclosingMethod(parse_enclosing_method(input)?),
        AttributeKind::Exceptions => Attribute::Exceptions(parse_u16_table(input)?),
        AttributeKind::InnerClasses => Attribute::InnerClasses(parse_seq(input, parse_inner_class)?),
        AttributeKind::LineNumberTable => {
            Attribute::LineNumberTable(parse_seq(input, parse_line_number)?)
        }
        AttributeKind::LocalVariableTable => {
            Attribute::LocalVariableTable(parse_seq(input, parse_local_variable)?)
        }
        AttributeKind::LocalVariableTypeTable => {
            Attribute::LocalVariableTypeTable(parse_seq(input, parse_local_variable)?)
        }
        AttributeKind::MethodParameters => {
            let len = input.parse_u8()? as usize;
            Attribute::MethodParameters(input.seq(len, parse_method_parameter)?)
        }
        AttributeKind::Module => Attribute::Module(parse_module(input)?),
        AttributeKind::ModuleHashes => Attribute::ModuleHashes(parse_module_hashes(input)?),
        AttributeKind::ModuleMainClass => Attribute::ModuleMainClass(input.parse_u16()?),
        AttributeKind::ModulePackages => Attribute::ModulePackages(parse_u16_table(input)?),
        AttributeKind::ModuleResolution => Attribute::ModuleResolution(input.parse_u16()?),
        AttributeKind::ModuleTarget => Attribute::ModuleTarget(input.parse_u16()?),
        AttributeKind::NestHost => Attribute::NestHost(input.parse_u16()?),
        AttributeKind::NestMembers => Attribute::NestMembers(parse_u16_table(input)?),
        AttributeKind::PermittedSubclasses => {
            Attribute::PermittedSubclasses(parse_u16_table(input)?)
        }
        AttributeKind::Record => {
            Attribute::Record(parse_seq(input, |input| parse_record_component(input, pool))?)
        }
        AttributeKind::RuntimeInvisibleAnnotations => {
            Attribute::RuntimeInvisibleAnnotations(parse_annotations(input)?)
        }
        AttributeKind::RuntimeInvisibleParameterAnnotations => {
            Attribute::RuntimeInvisibleParameterAnnotations(parse_parameter_annotations(input)?)
        }
        AttributeKind::RuntimeInvisibleTypeAnnotations => {
            Attribute::RuntimeInvisibleTypeAnnotations(parse_type_annotations(input)?)
        }
        AttributeKind::RuntimeVisibleAnnotations => {
            Attribute::RuntimeVisibleAnnotations(parse_annotations(input)?)
        }
        AttributeKind::RuntimeVisibleParameterAnnotations => {
            Attribute::RuntimeVisibleParameterAnnotations(parse_parameter_annotations(input)?)
        }
        AttributeKind::RuntimeVisibleTypeAnnotations => {
            Attribute::RuntimeVisibleTypeAnnotations(parse_type_annotations(input)?)
        }
        AttributeKind::Signature => Attribute::Signature(Signature::new(input.parse_u16()?)),
        AttributeKind::SourceDebugExtension => {
            let data = input.take(input.remaining())?;
            Attribute::SourceDebugExtension(mutf8::parse_mutf8(data)?)
        }
        AttributeKind::SourceFile => Attribute::SourceFile(input.parse_u16()?),
        AttributeKind::SourceId => Attribute::SourceId(input.parse_u16()?),
        AttributeKind::StackMap => Attribute::StackMap(parse_stack_map(input)?),
        AttributeKind::StackMapTable => Attribute::StackMapTable(parse_stack_map_table(input)?),
        AttributeKind::Synthetic => Attribute::Synthetic,
    })
}

/// Decodes a known attribute from exactly its declared bytes.
fn parse_known(kind: AttributeKind, info: &[u8], pool: &ConstantPool) -> ClassResult<Attribute> {
    let mut input = ByteParser::new(info);
    let attr = parse_body(kind, &mut input, pool)?;
    if !input.is_empty() {
        return Err(ClassError::AttributeLengthMismatch {
            declared: info.len(),
            consumed: input.offset,
        });
    }
    Ok(attr)
}

/// Decodes an attribute body given its name index, falling back to
/// [`Attribute::Default`] instead of failing.
pub fn create_attribute(name: PoolIndex, info: &[u8], pool: &ConstantPool) -> Attribute {
    let fallback = |reason: String| {
        Attribute::Default(DefaultAttribute {
            info: info.into(),
            reason,
        })
    };

    let attr_name = match pool.utf8(name) {
        Ok(attr_name) => attr_name,
        Err(err) => {
            warn!("attribute name #{} does not resolve: {}", name, err);
            return fallback(format!("name does not resolve: {}", err));
        }
    };

    let kind = match AttributeKind::from_name(attr_name) {
        Some(kind) => kind,
        None => return fallback(format!("unknown attribute {}", attr_name)),
    };

    match parse_known(kind, info, pool) {
        Ok(attr) => attr,
        Err(err) => {
            warn!("keeping malformed {} attribute as raw bytes: {}", attr_name, err);
            fallback(err.to_string())
        }
    }
}

pub fn parse_attribute(
    input: &mut ByteParser<'_>,
    pool: &ConstantPool,
) -> ClassResult<AttributeInfo> {
    let name = input.parse_u16()?;
    let len = input.parse_u32()? as usize;
    let info = input.take_declared(len)?;

    Ok(AttributeInfo {
        name,
        attr: create_attribute(name, info, pool),
    })
}

pub fn parse_attributes(input: &mut ByteParser<'_>, pool: &ConstantPool) -> ClassResult<Attributes> {
    let len = input.parse_u16()? as usize;
    input
        .seq(len, |input| parse_attribute(input, pool))
        .map(Attributes::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::Constant;
    use pretty_assertions::assert_eq;

    fn pool(names: &[&str]) -> ConstantPool {
        let mut pool = ConstantPool::new();
        for name in names {
            pool.push(Constant::Utf8((*name).into())).unwrap();
        }
        pool
    }

    fn round_trip(bytes: &[u8], pool: &ConstantPool) -> AttributeInfo {
        let mut input = ByteParser::new(bytes);
        let info = parse_attribute(&mut input, pool).unwrap();
        assert!(input.is_empty());
        assert_eq!(info.encoded_len(), bytes.len());
        assert_eq!(info.to_bytes().unwrap(), bytes);
        info
    }

    #[test]
    fn test_names_table_is_consistent() {
        for &(name, kind) in NAMES {
            assert_eq!(AttributeKind::from_name(name), Some(kind));
            assert_eq!(kind.name(), name);
        }
        assert_eq!(NAMES.len(), 37);
    }

    #[test]
    fn test_line_number_table_keeps_order() {
        let pool = pool(&["LineNumberTable"]);
        let bytes = [0, 1, 0, 0, 0, 10, 0, 2, 0, 5, 0, 20, 0, 0, 0, 10];
        let info = round_trip(&bytes, &pool);
        assert_eq!(
            info.attr,
            Attribute::LineNumberTable(vec![
                LineNumber {
                    start_pc: 5,
                    line_number: 20,
                },
                LineNumber {
                    start_pc: 0,
                    line_number: 10,
                },
            ])
        );
    }

    #[test]
    fn test_unknown_name_falls_back() {
        let pool = pool(&["Kotlin"]);
        let bytes = [0, 1, 0, 0, 0, 3, 1, 2, 3];
        let info = round_trip(&bytes, &pool);
        match info.attr {
            Attribute::Default(attr) => assert_eq!(attr.info, vec![1, 2, 3]),
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn test_unresolvable_name_falls_back() {
        let pool = pool(&[]);
        let bytes = [0, 7, 0, 0, 0, 1, 0xff];
        let info = round_trip(&bytes, &pool);
        assert!(info.attr.kind().is_none());
    }

    #[test]
    fn test_under_consumption_falls_back() {
        // SourceFile is two bytes, but three are declared
        let pool = pool(&["SourceFile"]);
        let bytes = [0, 1, 0, 0, 0, 3, 0, 1, 9];
        let info = round_trip(&bytes, &pool);
        match info.attr {
            Attribute::Default(attr) => {
                assert_eq!(attr.info, vec![0, 1, 9]);
                assert_eq!(
                    attr.reason,
                    ClassError::AttributeLengthMismatch {
                        declared: 3,
                        consumed: 2,
                    }
                    .to_string()
                );
            }
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn test_over_consumption_falls_back() {
        // An exceptions table claiming two entries in four bytes
        let pool = pool(&["Exceptions"]);
        let bytes = [0, 1, 0, 0, 0, 4, 0, 2, 0, 3];
        let info = round_trip(&bytes, &pool);
        assert!(matches!(info.attr, Attribute::Default(_)));
    }

    #[test]
    fn test_corrupt_stack_map_table_falls_back() {
        let pool = pool(&["StackMapTable"]);
        let bytes = [0, 1, 0, 0, 0, 3, 0, 1, 200];
        let info = round_trip(&bytes, &pool);
        match info.attr {
            Attribute::Default(attr) => {
                assert_eq!(attr.reason, ClassError::ReservedStackMapFrameType(200).to_string())
            }
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn test_oversized_length_is_fatal() {
        let pool = pool(&["Synthetic"]);
        let bytes = [0, 1, 0xff, 0xff, 0xff, 0xff];
        assert_eq!(
            parse_attribute(&mut ByteParser::new(&bytes), &pool),
            Err(ClassError::OversizedLength {
                declared: 0xffff_ffff,
                remaining: 0,
            })
        );
    }

    #[test]
    fn test_lookup() {
        let pool = pool(&["Deprecated", "Custom", "SourceFile"]);
        #[rustfmt::skip]
        let bytes = [
            0, 3,
            0, 1, 0, 0, 0, 0,
            0, 2, 0, 0, 0, 1, 7,
            0, 3, 0, 0, 0, 2, 0, 2,
        ];
        let attrs = parse_attributes(&mut ByteParser::new(&bytes), &pool).unwrap();
        assert_eq!(attrs.len(), 3);
        assert_eq!(attrs.get(AttributeKind::Deprecated), Some(&Attribute::Deprecated));
        assert_eq!(attrs.get(AttributeKind::SourceFile), Some(&Attribute::SourceFile(2)));
        assert_eq!(attrs.get(AttributeKind::Synthetic), None);
        assert_eq!(attrs.find_by_name("Custom", &pool).map(|info| info.name), Some(2));
        assert_eq!(attrs.to_bytes().unwrap(), bytes);
    }
}
