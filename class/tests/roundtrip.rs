use std::collections::{HashMap, HashSet};

use classfile::{
    attribute::{
        annotation::MAX_ELEMENT_DEPTH,
        stack_map::{StackMapFrame, VerificationType},
        type_annotation::{LocalVarTarget, Target},
    },
    descriptor::MAX_ARRAY_DIMENSIONS,
    instruction::{self, Operands},
    Attribute, AttributeKind, Attributes, Class, ClassError, ConstantTag, Encode, JavaString,
};
use pretty_assertions::assert_eq;

fn u2(val: u16) -> [u8; 2] {
    val.to_be_bytes()
}

/// A `u2` count followed by the items.
fn table(items: &[Vec<u8>]) -> Vec<u8> {
    let mut out = u2(items.len() as u16).to_vec();
    items.iter().for_each(|item| out.extend_from_slice(item));
    out
}

fn concat(parts: &[&[u8]]) -> Vec<u8> {
    parts.concat()
}

/// Assembles class files by hand, handing out pool indices as entries are
/// added.
struct ClassBuilder {
    pool: Vec<u8>,
    next: u16,
    utf8s: HashMap<String, u16>,
}

impl ClassBuilder {
    fn new() -> Self {
        ClassBuilder {
            pool: vec![],
            next: 1,
            utf8s: HashMap::new(),
        }
    }

    fn raw(&mut self, bytes: &[u8]) -> u16 {
        let index = self.next;
        self.pool.extend_from_slice(bytes);
        self.next += match bytes[0] {
            5 | 6 => 2,
            _ => 1,
        };
        index
    }

    fn utf8(&mut self, value: &str) -> u16 {
        if let Some(&index) = self.utf8s.get(value) {
            return index;
        }
        let bytes = concat(&[&[1], &u2(value.len() as u16), value.as_bytes()]);
        let index = self.raw(&bytes);
        self.utf8s.insert(value.into(), index);
        index
    }

    fn class(&mut self, name: &str) -> u16 {
        let name = self.utf8(name);
        self.raw(&concat(&[&[7], &u2(name)]))
    }

    fn attr(&mut self, name: &str, body: &[u8]) -> Vec<u8> {
        let name = self.utf8(name);
        concat(&[&u2(name), &(body.len() as u32).to_be_bytes(), body])
    }

    fn code(&mut self, max_stack: u16, max_locals: u16, code: &[u8], attrs: &[Vec<u8>]) -> Vec<u8> {
        let body = concat(&[
            &u2(max_stack),
            &u2(max_locals),
            &(code.len() as u32).to_be_bytes(),
            code,
            &u2(0),
            &table(attrs),
        ]);
        self.attr("Code", &body)
    }

    fn member(&mut self, flags: u16, name: &str, descriptor: &str, attrs: &[Vec<u8>]) -> Vec<u8> {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        concat(&[&u2(flags), &u2(name), &u2(descriptor), &table(attrs)])
    }

    fn build(mut self, fields: &[Vec<u8>], methods: &[Vec<u8>], attrs: &[Vec<u8>]) -> Vec<u8> {
        let this_class = self.class("Test");
        let super_class = self.class("java/lang/Object");
        concat(&[
            &[0xca, 0xfe, 0xba, 0xbe, 0, 0, 0, 52],
            &u2(self.next),
            &self.pool,
            &u2(0x0021),
            &u2(this_class),
            &u2(super_class),
            &u2(0),
            &table(fields),
            &table(methods),
            &table(attrs),
        ])
    }
}

fn round_trip(bytes: &[u8]) -> Class {
    let class = Class::parse(bytes).unwrap();
    assert_eq!(class.encoded_len(), bytes.len());
    assert_eq!(class.to_bytes().unwrap(), bytes);
    class
}

fn collect_kinds(attrs: &Attributes, kinds: &mut HashSet<AttributeKind>) {
    for info in attrs {
        let kind = info
            .attr
            .kind()
            .unwrap_or_else(|| panic!("fell back: {:?}", info.attr));
        kinds.insert(kind);

        match &info.attr {
            Attribute::Code(code) => collect_kinds(&code.attributes, kinds),
            Attribute::Record(components) => components
                .iter()
                .for_each(|component| collect_kinds(&component.attributes, kinds)),
            _ => {}
        }
    }
}

fn method_attr<'c>(class: &'c Class, kind: AttributeKind) -> &'c Attribute {
    class.methods[0].attributes.get(kind).unwrap()
}

#[test]
fn minimal_return_method() {
    let mut builder = ClassBuilder::new();
    let code = builder.code(2, 1, &[instruction::RETURN], &[]);
    let method = builder.member(0x0001, "run", "()V", &[code]);
    let bytes = builder.build(&[], &[method], &[]);

    let class = round_trip(&bytes);
    assert_eq!(class.class_name().unwrap(), "Test");
    assert_eq!(class.super_class_name().unwrap(), Some("java/lang/Object"));

    let method = class.find_method("run").unwrap();
    let code = method.code().unwrap();
    assert_eq!((code.max_stack, code.max_locals), (2, 1));

    let insns: Vec<_> = code.instructions().collect::<Result<_, _>>().unwrap();
    assert_eq!(insns.len(), 1);
    assert_eq!(insns[0].opcode(), instruction::RETURN);
    assert_eq!(insns[0].len(), 1);
}

#[test]
fn double_takes_two_slots() {
    let mut builder = ClassBuilder::new();
    builder.utf8("a");
    builder.utf8("b");
    let double = builder.raw(&[6, 0x40, 0x09, 0x21, 0xfb, 0x54, 0x44, 0x2d, 0x18]);
    let after = builder.utf8("c");
    assert_eq!((double, after), (3, 5));

    let class = round_trip(&builder.build(&[], &[], &[]));
    assert_eq!(class.pool.get(3).map(|c| c.tag()), Ok(ConstantTag::Double));
    assert_eq!(class.pool.get(4), Err(ClassError::InvalidPoolIndex(4)));
    assert_eq!(class.pool.utf8(5), Ok("c"));
}

#[test]
fn every_pool_tag() {
    let mut builder = ClassBuilder::new();
    let class = builder.class("pkg/Thing");
    let name = builder.utf8("thing");
    let desc = builder.utf8("()V");
    let nat = builder.raw(&concat(&[&[12], &u2(name), &u2(desc)]));

    builder.raw(&[3, 0xff, 0xff, 0xff, 0xfe]);
    builder.raw(&[4, 0x7f, 0xc0, 0, 0]);
    builder.raw(&[5, 0x80, 0, 0, 0, 0, 0, 0, 0]);
    builder.raw(&[6, 0x7f, 0xf8, 0, 0, 0, 0, 0, 1]);
    builder.raw(&concat(&[&[8], &u2(name)]));
    builder.raw(&concat(&[&[9], &u2(class), &u2(nat)]));
    let method_ref = builder.raw(&concat(&[&[10], &u2(class), &u2(nat)]));
    builder.raw(&concat(&[&[11], &u2(class), &u2(nat)]));
    builder.raw(&concat(&[&[15, 6], &u2(method_ref)]));
    builder.raw(&concat(&[&[16], &u2(desc)]));
    builder.raw(&concat(&[&[17], &u2(0), &u2(nat)]));
    builder.raw(&concat(&[&[18], &u2(0), &u2(nat)]));
    builder.raw(&concat(&[&[19], &u2(name)]));
    builder.raw(&concat(&[&[20], &u2(name)]));

    let class = round_trip(&builder.build(&[], &[], &[]));
    let tags: HashSet<ConstantTag> = class.pool.iter().map(|(_, c)| c.tag()).collect();
    assert_eq!(tags.len(), 17);
    assert_eq!(class.pool.name_and_type(nat).unwrap().name, name);
    assert_eq!(class.pool.member_ref(method_ref).unwrap().name_and_type, nat);
}

#[test]
fn every_attribute_kind() {
    let mut b = ClassBuilder::new();
    let this = b.class("Test");
    let text = b.utf8("Test.java");
    let int = b.raw(&[3, 0, 0, 0, 7]);
    let module = b.raw(&concat(&[&[19], &u2(text)]));
    let package = b.raw(&concat(&[&[20], &u2(text)]));
    let anno = b.utf8("LAnno;");

    let annotation = concat(&[&u2(anno), &u2(0)]);
    let signature = b.attr("Signature", &u2(text));
    let component = concat(&[&u2(text), &u2(text), &table(&[signature.clone()])]);

    #[rustfmt::skip]
    let class_attrs = vec![
        b.attr("SourceFile", &u2(text)),
        b.attr("SourceDebugExtension", b"SMAP\nTest.kt\n"),
        b.attr("InnerClasses", &concat(&[&u2(1), &u2(this), &u2(this), &u2(text), &u2(0x0009)])),
        b.attr("EnclosingMethod", &concat(&[&u2(this), &u2(0)])),
        b.attr("NestHost", &u2(this)),
        b.attr("NestMembers", &concat(&[&u2(1), &u2(this)])),
        b.attr("PermittedSubclasses", &concat(&[&u2(2), &u2(this), &u2(this)])),
        b.attr("Record", &table(&[component])),
        b.attr("BootstrapMethods", &concat(&[&u2(1), &u2(this), &u2(2), &u2(int), &u2(text)])),
        b.attr("Module", &concat(&[
            &u2(module), &u2(0x0020), &u2(0),
            &u2(1), &u2(module), &u2(0x8000), &u2(text),
            &u2(1), &u2(package), &u2(0), &u2(1), &u2(module),
            &u2(1), &u2(package), &u2(0), &u2(0),
            &u2(1), &u2(this),
            &u2(1), &u2(this), &u2(1), &u2(this),
        ])),
        b.attr("ModuleHashes", &concat(&[&u2(text), &u2(1), &u2(module), &u2(3), &[1, 2, 3]])),
        b.attr("ModuleMainClass", &u2(this)),
        b.attr("ModulePackages", &concat(&[&u2(1), &u2(package)])),
        b.attr("ModuleResolution", &u2(0x0001)),
        b.attr("ModuleTarget", &u2(text)),
        signature.clone(),
        b.attr("Deprecated", &[]),
        b.attr("Synthetic", &[]),
        b.attr("RuntimeVisibleAnnotations", &concat(&[
            &u2(1), &u2(anno), &u2(1),
            &u2(text), b"[", &u2(4),
                b"e", &u2(anno), &u2(text),
                b"c", &u2(anno),
                b"@", &annotation,
                b"I", &u2(int),
        ])),
        b.attr("RuntimeInvisibleAnnotations", &table(&[annotation.clone()])),
        b.attr("RuntimeVisibleTypeAnnotations", &concat(&[&u2(1), &[0x10, 0xff, 0xff, 0], &annotation])),
        b.attr("RuntimeInvisibleTypeAnnotations", &concat(&[&u2(1), &[0x00, 0, 1, 3, 0], &annotation])),
        b.attr("SourceID", &u2(text)),
        b.attr("CompilationID", &u2(text)),
    ];

    let constant = b.attr("ConstantValue", &u2(int));
    let field = b.member(0x0019, "VALUE", "I", &[constant]);

    #[rustfmt::skip]
    let code_attrs = vec![
        b.attr("LineNumberTable", &concat(&[&u2(1), &u2(0), &u2(7)])),
        b.attr("LocalVariableTable", &concat(&[&u2(1), &u2(0), &u2(1), &u2(text), &u2(text), &u2(0)])),
        b.attr("LocalVariableTypeTable", &concat(&[&u2(1), &u2(0), &u2(1), &u2(text), &u2(text), &u2(0)])),
        b.attr("StackMapTable", &[0, 1, 0]),
        b.attr("StackMap", &concat(&[&u2(1), &u2(0), &u2(1), &[7], &u2(this), &u2(0)])),
        b.attr("CharacterRangeTable", &concat(&[
            &u2(1), &u2(0), &u2(1), &[0, 0, 0x0c, 0x05], &[0, 0, 0x0c, 0x0a], &u2(1),
        ])),
    ];
    let code = b.code(0, 1, &[instruction::RETURN], &code_attrs);

    #[rustfmt::skip]
    let method_attrs = vec![
        code,
        b.attr("Exceptions", &concat(&[&u2(1), &u2(this)])),
        b.attr("MethodParameters", &concat(&[&[1], &u2(text), &u2(0x0010)])),
        b.attr("AnnotationDefault", &concat(&[b"Z", &u2(int)])),
        b.attr("RuntimeVisibleParameterAnnotations", &concat(&[&[1], &table(&[annotation.clone()])])),
        b.attr("RuntimeInvisibleParameterAnnotations", &[2, 0, 0, 0, 0]),
    ];
    let method = b.member(0x0001, "run", "()V", &method_attrs);

    let bytes = b.build(&[field], &[method], &class_attrs);
    let class = round_trip(&bytes);

    let mut kinds = HashSet::new();
    collect_kinds(&class.attributes, &mut kinds);
    class
        .fields
        .iter()
        .for_each(|field| collect_kinds(&field.attributes, &mut kinds));
    class
        .methods
        .iter()
        .for_each(|method| collect_kinds(&method.attributes, &mut kinds));
    assert_eq!(kinds.len(), 37);

    assert_eq!(class.source_file().unwrap(), Some("Test.java"));
    assert_eq!(class.fields[0].constant_value(), Some(int));
    assert_eq!(
        method_attr(&class, AttributeKind::RuntimeInvisibleParameterAnnotations),
        &Attribute::RuntimeInvisibleParameterAnnotations(vec![vec![], vec![]])
    );
}

#[test]
fn every_frame_kind() {
    let mut b = ClassBuilder::new();
    let object = b.class("java/lang/String");

    #[rustfmt::skip]
    let frames = concat(&[
        &u2(7),
        &[10],
        &[64 + 5, 1],
        &[247, 0, 100, 7], &u2(object),
        &[249, 0, 3],
        &[251, 1, 0],
        &[253, 0, 4, 2, 8, 0, 0],
        &[255, 0, 5, 0, 3, 0, 3, 4, 0, 2, 5, 6],
    ]);
    let table_attr = b.attr("StackMapTable", &frames);
    let code = b.code(1, 4, &[instruction::RETURN], &[table_attr]);
    let method = b.member(0x0009, "run", "()V", &[code]);
    let class = round_trip(&b.build(&[], &[method], &[]));

    let code = class.methods[0].code().unwrap();
    match code.attributes.get(AttributeKind::StackMapTable) {
        Some(Attribute::StackMapTable(frames)) => assert_eq!(
            frames,
            &vec![
                StackMapFrame::Same { offset_delta: 10 },
                StackMapFrame::SameLocals1StackItem {
                    offset_delta: 5,
                    stack: VerificationType::Integer,
                },
                StackMapFrame::SameLocals1StackItemExtended {
                    offset_delta: 100,
                    stack: VerificationType::Object(object),
                },
                StackMapFrame::Chop {
                    chopped: 2,
                    offset_delta: 3,
                },
                StackMapFrame::SameExtended { offset_delta: 256 },
                StackMapFrame::Append {
                    offset_delta: 4,
                    locals: vec![VerificationType::Float, VerificationType::Uninitialized(0)],
                },
                StackMapFrame::Full {
                    offset_delta: 5,
                    locals: vec![
                        VerificationType::Top,
                        VerificationType::Double,
                        VerificationType::Long,
                    ],
                    stack: vec![VerificationType::Null, VerificationType::UninitializedThis],
                },
            ]
        ),
        other => panic!("{:?}", other),
    }
}

#[test]
fn every_target_kind() {
    #[rustfmt::skip]
    let cases: Vec<(Vec<u8>, Target)> = vec![
        (vec![0x00, 1], Target::ClassTypeParameter { index: 1 }),
        (vec![0x01, 2], Target::MethodTypeParameter { index: 2 }),
        (vec![0x10, 0xff, 0xff], Target::ClassExtends { index: 0xffff }),
        (vec![0x11, 0, 1], Target::ClassTypeParameterBound { param: 0, bound: 1 }),
        (vec![0x12, 1, 0], Target::MethodTypeParameterBound { param: 1, bound: 0 }),
        (vec![0x13], Target::Field),
        (vec![0x14], Target::MethodReturn),
        (vec![0x15], Target::MethodReceiver),
        (vec![0x16, 3], Target::MethodFormalParameter { index: 3 }),
        (vec![0x17, 0, 1], Target::Throws { index: 1 }),
        (
            vec![0x40, 0, 2, 0, 0, 0, 5, 0, 1, 0, 5, 0, 3, 0, 1],
            Target::LocalVariable(vec![
                LocalVarTarget { start_pc: 0, length: 5, index: 1 },
                LocalVarTarget { start_pc: 5, length: 3, index: 1 },
            ]),
        ),
        (
            vec![0x41, 0, 1, 0, 2, 0, 4, 0, 3],
            Target::ResourceVariable(vec![LocalVarTarget { start_pc: 2, length: 4, index: 3 }]),
        ),
        (vec![0x42, 0, 0], Target::ExceptionParameter { index: 0 }),
        (vec![0x43, 0, 1], Target::InstanceOf { offset: 1 }),
        (vec![0x44, 0, 2], Target::New { offset: 2 }),
        (vec![0x45, 0, 3], Target::ConstructorReference { offset: 3 }),
        (vec![0x46, 0, 4], Target::MethodReference { offset: 4 }),
        (vec![0x47, 0, 5, 0], Target::Cast { offset: 5, index: 0 }),
        (vec![0x48, 0, 6, 1], Target::ConstructorInvocationTypeArgument { offset: 6, index: 1 }),
        (vec![0x49, 0, 7, 2], Target::MethodInvocationTypeArgument { offset: 7, index: 2 }),
        (vec![0x4a, 0, 8, 3], Target::ConstructorReferenceTypeArgument { offset: 8, index: 3 }),
        (vec![0x4b, 0, 9, 4], Target::MethodReferenceTypeArgument { offset: 9, index: 4 }),
    ];

    let mut b = ClassBuilder::new();
    let anno = b.utf8("LNonNull;");
    let annotations: Vec<Vec<u8>> = cases
        .iter()
        .map(|(target, _)| {
            // Type path: array element, then the first type argument
            concat(&[target, &[2, 0, 0, 3, 0], &u2(anno), &u2(0)])
        })
        .collect();
    let attr = b.attr("RuntimeVisibleTypeAnnotations", &table(&annotations));
    let method = b.member(0x0001, "run", "()V", &[attr]);
    let class = round_trip(&b.build(&[], &[method], &[]));

    match method_attr(&class, AttributeKind::RuntimeVisibleTypeAnnotations) {
        Attribute::RuntimeVisibleTypeAnnotations(decoded) => {
            assert_eq!(decoded.len(), 22);
            for (annotation, (bytes, target)) in decoded.iter().zip(&cases) {
                assert_eq!(&annotation.target, target);
                assert_eq!(annotation.target.target_type(), bytes[0]);
                assert_eq!(annotation.type_path.len(), 2);
            }
        }
        other => panic!("{:?}", other),
    }
}

#[test]
fn switches_with_zero_one_and_many_cases() {
    #[rustfmt::skip]
    let code: Vec<u8> = concat(&[
        // pc 0
        &[instruction::ICONST_0],
        // pc 1, two bytes of padding
        &[instruction::LOOKUPSWITCH, 0, 0],
        &59i32.to_be_bytes(), &0i32.to_be_bytes(),
        // pc 12
        &[instruction::ICONST_1],
        // pc 13, two bytes of padding
        &[instruction::LOOKUPSWITCH, 0, 0],
        &47i32.to_be_bytes(), &1i32.to_be_bytes(),
        &7i32.to_be_bytes(), &47i32.to_be_bytes(),
        // pc 32
        &[instruction::ICONST_2],
        // pc 33, two bytes of padding
        &[instruction::TABLESWITCH, 0, 0],
        &27i32.to_be_bytes(), &0i32.to_be_bytes(), &2i32.to_be_bytes(),
        &27i32.to_be_bytes(), &27i32.to_be_bytes(), &27i32.to_be_bytes(),
        // pc 60
        &[instruction::RETURN],
    ]);

    let mut b = ClassBuilder::new();
    let code_attr = b.code(1, 1, &code, &[]);
    let method = b.member(0x0009, "run", "()V", &[code_attr]);
    let class = round_trip(&b.build(&[], &[method], &[]));

    let code = class.methods[0].code().unwrap();
    let insns: Vec<_> = code.instructions().collect::<Result<_, _>>().unwrap();
    let pcs: Vec<usize> = insns.iter().map(|insn| insn.pc()).collect();
    assert_eq!(pcs, vec![0, 1, 12, 13, 32, 33, 60]);

    assert_eq!(
        insns[1].operands().unwrap(),
        Operands::LookupSwitch {
            default: 59,
            pairs: vec![],
        }
    );
    assert_eq!(
        insns[3].operands().unwrap(),
        Operands::LookupSwitch {
            default: 47,
            pairs: vec![(7, 47)],
        }
    );
    assert_eq!(
        insns[5].operands().unwrap(),
        Operands::TableSwitch {
            default: 27,
            low: 0,
            high: 2,
            offsets: vec![27, 27, 27],
        }
    );
    for insn in &insns {
        for offset in insn.operands().unwrap().branch_offsets() {
            assert_eq!(insn.pc() as i32 + offset, 60);
        }
    }
}

#[test]
fn corrupt_nested_attribute_keeps_its_bytes() {
    let mut b = ClassBuilder::new();
    let frames = b.attr("StackMapTable", &[0, 1, 200]);
    let code = b.code(0, 0, &[instruction::RETURN], &[frames]);
    let method = b.member(0x0001, "run", "()V", &[code]);
    let unknown = b.attr("kotlin.Metadata", &[1, 2, 3, 4]);
    let class = round_trip(&b.build(&[], &[method], &[unknown]));

    let code = class.methods[0].code().unwrap();
    match &code.attributes.iter().next().unwrap().attr {
        Attribute::Default(attr) => assert_eq!(attr.info, vec![0, 1, 200]),
        other => panic!("{:?}", other),
    }

    let unknown = class
        .attributes
        .find_by_name("kotlin.Metadata", &class.pool)
        .unwrap();
    assert!(unknown.attr.kind().is_none());
}

#[test]
fn oversized_attribute_length_is_fatal() {
    let b = ClassBuilder::new();
    let mut bytes = b.build(&[], &[], &[]);
    // Replace the empty attribute table with one attribute claiming 4GiB.
    bytes.truncate(bytes.len() - 2);
    bytes.extend_from_slice(&[0, 1, 0, 1, 0xff, 0xff, 0xff, 0xf0]);

    assert_eq!(
        Class::parse(&bytes),
        Err(ClassError::OversizedLength {
            declared: 0xffff_fff0,
            remaining: 0,
        })
    );
}

#[test]
fn generic_member_types() {
    let mut b = ClassBuilder::new();
    let sig = b.utf8("<T::Ljava/lang/Comparable<TT;>;>([TT;)TT;");
    let signature = b.attr("Signature", &u2(sig));
    let method = b.member(0x0009, "max", "([Ljava/lang/Comparable;)Ljava/lang/Comparable;", &[
        signature,
    ]);
    let class = round_trip(&b.build(&[], &[method], &[]));

    let method = &class.methods[0];
    assert_eq!(method.parameter_types(&class.pool).unwrap(), vec!["T[]"]);
    assert_eq!(method.return_type(&class.pool).unwrap(), "T");
    assert_eq!(
        method.get_type(&class.pool).unwrap(),
        "<T extends java.lang.Comparable<T>>(T[]) T"
    );
    assert_eq!(
        method.descriptor.parameter_types(&class.pool).unwrap(),
        vec!["java.lang.Comparable[]"]
    );
}

#[test]
fn lone_surrogate_constant_round_trips() {
    let mut b = ClassBuilder::new();
    let surrogate = b.raw(&[1, 0, 3, 0xed, 0xa0, 0x80]);
    let string = b.raw(&concat(&[&[8], &u2(surrogate)]));
    let class = round_trip(&b.build(&[], &[], &[]));

    assert_eq!(
        class.pool.utf8(surrogate),
        Err(ClassError::UnpairedSurrogate(surrogate))
    );
    let value = class.pool.java_string(surrogate).unwrap();
    assert_eq!(value, &JavaString::Units(vec![0xd800]));
    assert_eq!(value.to_string_lossy(), "\u{fffd}");
    assert_eq!(class.pool.get(string).unwrap().tag(), ConstantTag::String);
}

#[test]
fn deeply_nested_annotation_keeps_its_bytes() {
    let mut b = ClassBuilder::new();
    let ty = b.utf8("LDeep;");
    let name = b.utf8("value");

    let mut body = concat(&[&u2(1), &u2(ty), &u2(1), &u2(name)]);
    for _ in 0..200_000 {
        body.extend_from_slice(&[b'[', 0, 1]);
    }
    body.extend_from_slice(&[b'Z', 0, 1]);

    let annotations = b.attr("RuntimeVisibleAnnotations", &body);
    let class = round_trip(&b.build(&[], &[], &[annotations]));

    let info = class
        .attributes
        .find_by_name("RuntimeVisibleAnnotations", &class.pool)
        .unwrap();
    match &info.attr {
        Attribute::Default(attr) => {
            assert_eq!(attr.info, body);
            assert_eq!(
                attr.reason,
                ClassError::ElementValueTooDeep(MAX_ELEMENT_DEPTH).to_string()
            );
        }
        other => panic!("{:?}", other),
    }
}

#[test]
fn oversized_array_signature_is_rejected() {
    let mut b = ClassBuilder::new();
    let value = format!("({}I)V", "[".repeat(60_000));
    let sig = b.utf8(&value);
    let signature = b.attr("Signature", &u2(sig));
    let method = b.member(0x0009, "run", "([I)V", &[signature]);
    let class = round_trip(&b.build(&[], &[method], &[]));

    assert_eq!(
        class.methods[0].parameter_types(&class.pool),
        Err(ClassError::InvalidDescriptor {
            descriptor: value.clone(),
            position: 1 + MAX_ARRAY_DIMENSIONS,
        })
    );
}

#[test]
fn trailing_bytes_are_rejected() {
    let mut bytes = ClassBuilder::new().build(&[], &[], &[]);
    let len = bytes.len();
    assert!(Class::parse(&bytes).is_ok());

    bytes.extend_from_slice(&[0xde, 0xad]);
    assert_eq!(
        Class::parse(&bytes),
        Err(ClassError::TrailingBytes {
            offset: len,
            remaining: 2,
        })
    );
}
