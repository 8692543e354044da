mod code;
mod constant;
mod pool;
mod style;

use classfile::{
    access::{ACC_ANNOTATION, ACC_ENUM, ACC_INTERFACE, ACC_MODULE},
    attribute::tables::ExceptionHandler,
    instruction::ArrayType,
    AccessFlags, AccessKind, Attribute, AttributeInfo, Attributes, Class, Code, ConstantPool,
    Encode, Instruction, Operands,
};
use log::{error, info, warn};
use petgraph::visit::EdgeRef;
use std::{error::Error, fs, path::PathBuf, process};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "pretty-class", about = "Pretty-prints a JVM class file")]
struct Opt {
    /// The class file to read
    #[structopt(parse(from_os_str))]
    file: PathBuf,

    /// Print the constant pool before the class body
    #[structopt(short = "c", long = "constant-pool")]
    constant_pool: bool,

    /// Disassemble method bodies into basic blocks
    #[structopt(short = "d", long = "disassemble")]
    disassemble: bool,

    /// Re-encode the class and compare it against the input instead of
    /// printing it
    #[structopt(long = "verify")]
    verify: bool,

    #[structopt(long = "no-color")]
    no_color: bool,
}

fn main() {
    pretty_env_logger::init();
    let opt = Opt::from_args();
    style::set_enabled(!opt.no_color);

    match run(&opt) {
        Ok(true) => (),
        Ok(false) => process::exit(1),
        Err(err) => {
            error!("{}: {}", opt.file.display(), err);
            process::exit(1);
        }
    }
}

fn run(opt: &Opt) -> Result<bool, Box<dyn Error>> {
    let bytes = fs::read(&opt.file)?;
    let class = Class::parse(&bytes)?;
    info!("parsed {} ({} bytes)", opt.file.display(), bytes.len());

    if opt.verify {
        return verify(&class, &bytes);
    }

    if opt.constant_pool {
        constant::print_pool(&class.pool);
        println!();
    }
    print_class(&class, opt.disassemble);
    Ok(true)
}

/// Checks that encoding the parsed class reproduces the input exactly.
fn verify(class: &Class, original: &[u8]) -> Result<bool, Box<dyn Error>> {
    let encoded = class.to_bytes()?;
    if encoded == original {
        println!("round trip ok ({} bytes)", encoded.len());
        return Ok(true);
    }

    let offset = original
        .iter()
        .zip(&encoded)
        .position(|(a, b)| a != b)
        .unwrap_or_else(|| original.len().min(encoded.len()));
    warn!(
        "re-encoded class differs at offset {:#x} (read {} bytes, wrote {})",
        offset,
        original.len(),
        encoded.len()
    );
    println!(
        "{}",
        style::paint("error", format!("round trip mismatch at offset {:#x}", offset))
    );
    Ok(false)
}

fn pad(depth: usize) -> String {
    "    ".repeat(depth)
}

fn modifiers(flags: AccessFlags, kind: AccessKind) -> String {
    let mut out = String::new();
    for modifier in flags.modifiers(kind) {
        out.push_str(&style::paint("access", modifier));
        out.push(' ');
    }
    out
}

fn unknown_bits(flags: AccessFlags, kind: AccessKind, depth: usize) {
    let bits = flags.unknown_bits(kind);
    if bits != 0 {
        println!(
            "{}{}",
            pad(depth),
            style::paint("access.unknown", format!("// unknown access bits {:#06x}", bits))
        );
    }
}

fn class_keyword(flags: AccessFlags) -> &'static str {
    if flags.is(ACC_MODULE) {
        "module"
    } else if flags.is(ACC_ANNOTATION) {
        "@interface"
    } else if flags.is(ACC_INTERFACE) {
        "interface"
    } else if flags.is(ACC_ENUM) {
        "enum"
    } else {
        "class"
    }
}

fn print_class(class: &Class, disassemble: bool) {
    let pool = &class.pool;

    println!(
        "{}",
        style::paint(
            "comment",
            format!("// class version {}.{}", class.version.major, class.version.minor)
        )
    );
    if let Ok(Some(source)) = class.source_file() {
        println!("{}", style::paint("comment", format!("// compiled from {}", source)));
    }
    unknown_bits(class.access_flags, AccessKind::Class, 0);

    let name = pool::get_class_name(pool, class.this_class).replace('/', ".");
    let mut decl = format!(
        "{}{} {}",
        modifiers(class.access_flags, AccessKind::Class),
        style::paint("keyword", class_keyword(class.access_flags)),
        style::paint("type", &name),
    );

    let signature = match class.signature().map(|sig| sig.field_type(pool)) {
        Some(Ok(sig)) => Some(sig),
        Some(Err(err)) => {
            warn!("ignoring class signature: {}", err);
            None
        }
        None => None,
    };

    match signature {
        Some(sig) if sig.starts_with('<') => decl.push_str(&style::paint("type", sig)),
        Some(sig) => {
            decl.push(' ');
            decl.push_str(&style::paint("type", sig));
        }
        None => {
            if let Ok(Some(super_name)) = class.super_class_name() {
                decl.push_str(&format!(
                    " {} {}",
                    style::paint("keyword", "extends"),
                    style::paint("type", super_name.replace('/', "."))
                ));
            }
            let interfaces = class.interface_names().unwrap_or_default();
            if !interfaces.is_empty() {
                let names = interfaces
                    .iter()
                    .map(|name| style::paint("type", name.replace('/', ".")))
                    .collect::<Vec<_>>();
                decl.push_str(&format!(
                    " {} {}",
                    style::paint("keyword", "implements"),
                    names.join(", ")
                ));
            }
        }
    }
    println!("{} {{", decl);

    for field in &class.fields {
        unknown_bits(field.access_flags, AccessKind::Field, 1);
        let ty = field
            .get_type(pool)
            .unwrap_or_else(|_| pool::WRONG_TYPE_MESSAGE.into());
        let mut line = format!(
            "{}{}{} {}",
            pad(1),
            modifiers(field.access_flags, AccessKind::Field),
            style::paint("type", ty),
            style::paint("type.member", pool::get_str(pool, field.name)),
        );
        if let Some(value) = field.constant_value() {
            line.push_str(&format!(" = {}", pool::describe(pool, value)));
        }
        println!("{};", line);
        print_attributes(&field.attributes, pool, 2);
    }

    if !class.fields.is_empty() && !class.methods.is_empty() {
        println!();
    }

    for (idx, method) in class.methods.iter().enumerate() {
        if idx > 0 {
            println!();
        }
        unknown_bits(method.access_flags, AccessKind::Method, 1);
        let ty = method
            .get_type(pool)
            .unwrap_or_else(|_| pool::WRONG_TYPE_MESSAGE.into());
        println!(
            "{}{}{}: {}",
            pad(1),
            modifiers(method.access_flags, AccessKind::Method),
            style::paint("type.member", pool::get_str(pool, method.name)),
            style::paint("type", ty),
        );
        print_attributes(&method.attributes, pool, 2);

        if disassemble {
            if let Some(code) = method.code() {
                print_code(code, pool, 2);
            }
        }
    }

    println!("}}");
    print_attributes(&class.attributes, pool, 0);
}

fn print_attributes(attributes: &Attributes, pool: &ConstantPool, depth: usize) {
    for info in attributes {
        print_attribute(info, pool, depth);
    }
}

fn print_attribute(info: &AttributeInfo, pool: &ConstantPool, depth: usize) {
    let name = info.name(pool).unwrap_or(pool::WRONG_TYPE_MESSAGE);
    let summary = summarize(&info.attr, pool);
    let style_key = match info.attr {
        Attribute::Default(_) => "attribute.raw",
        _ => "attribute",
    };

    if summary.is_empty() {
        println!("{}{}", pad(depth), style::paint(style_key, format!("// {}", name)));
    } else {
        println!(
            "{}{} {}",
            pad(depth),
            style::paint(style_key, format!("// {}:", name)),
            summary
        );
    }

    if let Attribute::Code(code) = &info.attr {
        print_attributes(&code.attributes, pool, depth + 1);
    }
}

fn entries<T>(items: &[T]) -> String {
    match items.len() {
        1 => "1 entry".into(),
        n => format!("{} entries", n),
    }
}

fn class_list(pool: &ConstantPool, indices: &[u16]) -> String {
    indices
        .iter()
        .map(|&idx| pool::get_class_name(pool, idx).replace('/', "."))
        .collect::<Vec<_>>()
        .join(", ")
}

fn summarize(attr: &Attribute, pool: &ConstantPool) -> String {
    match attr {
        Attribute::Default(raw) => format!(
            "{} raw bytes {}",
            raw.info.len(),
            style::paint("comment.reason", format!("({})", raw.reason))
        ),

        Attribute::Code(code) => format!(
            "max_stack={}, max_locals={}, {} bytes, {} handlers",
            code.max_stack,
            code.max_locals,
            code.code.len(),
            code.exception_table.len()
        ),

        Attribute::ConstantValue(idx)
        | Attribute::CompilationId(idx)
        | Attribute::SourceId(idx)
        | Attribute::ModuleTarget(idx) => pool::describe(pool, *idx),
        Attribute::SourceFile(idx) => pool::get_str(pool, *idx).into(),
        Attribute::Signature(sig) => sig.value(pool).unwrap_or(pool::WRONG_TYPE_MESSAGE).into(),
        Attribute::SourceDebugExtension(text) => format!("{:?}", text.to_string_lossy()),

        Attribute::NestHost(idx) | Attribute::ModuleMainClass(idx) => {
            pool::get_class_name(pool, *idx).replace('/', ".")
        }
        Attribute::Exceptions(classes)
        | Attribute::NestMembers(classes)
        | Attribute::PermittedSubclasses(classes) => class_list(pool, classes),
        Attribute::ModulePackages(packages) => entries(packages),
        Attribute::ModuleResolution(flags) => format!("{:#06x}", flags),

        Attribute::EnclosingMethod(method) => {
            let class = pool::get_class_name(pool, method.class).replace('/', ".");
            match method.method {
                0 => class,
                idx => format!("{}.{}", class, pool::name_and_type(pool, idx)),
            }
        }
        Attribute::Module(module) => pool::describe(pool, module.name),

        Attribute::BootstrapMethods(items) => entries(items),
        Attribute::CharacterRangeTable(items) => entries(items),
        Attribute::InnerClasses(items) => entries(items),
        Attribute::LineNumberTable(items) => entries(items),
        Attribute::LocalVariableTable(items) | Attribute::LocalVariableTypeTable(items) => {
            entries(items)
        }
        Attribute::MethodParameters(items) => entries(items),
        Attribute::Record(items) => entries(items),
        Attribute::RuntimeVisibleAnnotations(items)
        | Attribute::RuntimeInvisibleAnnotations(items) => entries(items),
        Attribute::RuntimeVisibleParameterAnnotations(items)
        | Attribute::RuntimeInvisibleParameterAnnotations(items) => entries(items),
        Attribute::RuntimeVisibleTypeAnnotations(items)
        | Attribute::RuntimeInvisibleTypeAnnotations(items) => entries(items),
        Attribute::StackMap(items) => entries(items),
        Attribute::StackMapTable(items) => entries(items),
        Attribute::ModuleHashes(hashes) => entries(&hashes.hashes),

        Attribute::AnnotationDefault(_) | Attribute::Deprecated | Attribute::Synthetic => {
            String::new()
        }
    }
}

fn print_code(code: &Code, pool: &ConstantPool, depth: usize) {
    let mut instructions = Vec::new();
    for result in code.instructions() {
        match result {
            Ok(instruction) => instructions.push(instruction),
            Err(err) => {
                warn!("stopped disassembling: {}", err);
                println!("{}{}", pad(depth), style::paint("error", format!("// {}", err)));
                break;
            }
        }
    }

    let graph = code::create_control_flow_graph(&instructions);
    for node in graph.node_indices() {
        let block = &graph[node];
        let mut successors = graph
            .edges(node)
            .map(|edge| format!("B{}", edge.target().index()))
            .collect::<Vec<_>>();
        successors.reverse();
        let successors = match successors.is_empty() {
            true => "exit".to_string(),
            false => successors.join(", "),
        };

        println!(
            "{}{} {}",
            pad(depth),
            style::paint("flow.block", format!("B{}:", node.index())),
            style::paint("comment", format!("// -> {}", successors))
        );
        for instruction in &instructions[block.range.start..=block.range.end] {
            print_instruction(instruction, pool, depth + 1);
        }
    }

    for handler in &code.exception_table {
        print_handler(handler, pool, depth);
    }
}

fn print_handler(handler: &ExceptionHandler, pool: &ConstantPool, depth: usize) {
    let catch = match handler.catch_type {
        0 => "any".to_string(),
        idx => pool::get_class_name(pool, idx).replace('/', "."),
    };
    println!(
        "{}{}",
        pad(depth),
        style::paint(
            "comment",
            format!(
                "// catch {} in [{}, {}) -> {}",
                catch, handler.start_pc, handler.end_pc, handler.handler_pc
            )
        )
    );
}

fn branch_target(pc: usize, offset: i32) -> String {
    let target = pc as i64 + offset as i64;
    let key = match offset < 0 {
        true => "flow.branch.backward",
        false => "flow.branch.forward",
    };
    style::paint(key, target)
}

fn with_comment(operand: String, comment: String) -> String {
    format!("{:<10} {}", operand, style::paint("comment", format!("// {}", comment)))
}

fn format_operands(instruction: &Instruction<'_>, pool: &ConstantPool) -> String {
    let pc = instruction.pc();
    let operands = match instruction.operands() {
        Ok(operands) => operands,
        Err(err) => return style::paint("error", err),
    };

    match operands {
        Operands::None => String::new(),
        Operands::ArrayType(tag) => match ArrayType::from_u8(tag) {
            Some(ty) => style::paint("type", ty.name()),
            None => style::paint("error", format!("<bad array type {}>", tag)),
        },
        Operands::Branch(offset) => branch_target(pc, offset),
        Operands::Immediate(value) => style::paint("opcode.immediate", value),
        Operands::Local(index) => style::paint("opcode.immediate", index),
        Operands::Iinc { index, value } => style::paint(
            "opcode.immediate",
            format!("{}, {}", index, value),
        ),

        Operands::Constant(index) => with_comment(
            style::paint("pool.index", format!("#{}", index)),
            pool::describe(pool, index),
        ),
        Operands::InvokeInterface { index, count } => with_comment(
            format!("{}, {}", style::paint("pool.index", format!("#{}", index)), count),
            pool::describe(pool, index),
        ),
        Operands::MultiNewArray { index, dimensions } => with_comment(
            format!("{}, {}", style::paint("pool.index", format!("#{}", index)), dimensions),
            pool::describe(pool, index),
        ),

        Operands::TableSwitch {
            default,
            low,
            offsets,
            ..
        } => {
            let mut cases = offsets
                .iter()
                .zip(low as i64..)
                .map(|(&offset, key)| format!("{}: {}", key, branch_target(pc, offset)))
                .collect::<Vec<_>>();
            cases.push(format!("default: {}", branch_target(pc, default)));
            format!("{{ {} }}", cases.join(", "))
        }
        Operands::LookupSwitch { default, pairs } => {
            let mut cases = pairs
                .iter()
                .map(|&(key, offset)| format!("{}: {}", key, branch_target(pc, offset)))
                .collect::<Vec<_>>();
            cases.push(format!("default: {}", branch_target(pc, default)));
            format!("{{ {} }}", cases.join(", "))
        }
    }
}

fn print_instruction(instruction: &Instruction<'_>, pool: &ConstantPool, depth: usize) {
    let category = code::get_category(instruction.opcode());
    let name = match instruction.is_wide() {
        true => format!("wide {}", instruction.name()),
        false => instruction.name().to_string(),
    };

    println!(
        "{}{} {} {}",
        pad(depth),
        style::paint("flow.pc", format!("{:>5}:", instruction.pc())),
        style::paint(category.style_key(), format!("{:<16}", name)),
        format_operands(instruction, pool)
    );
}
