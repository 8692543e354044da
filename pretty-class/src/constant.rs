use crate::{pool, style};
use classfile::{Constant, ConstantPool, PoolIndex};

fn tag_name(constant: &Constant) -> &'static str {
    match constant {
        Constant::Utf8(_) => "Utf8",
        Constant::Integer(_) => "Integer",
        Constant::Float(_) => "Float",
        Constant::Long(_) => "Long",
        Constant::Double(_) => "Double",
        Constant::Class { .. } => "Class",
        Constant::String { .. } => "String",
        Constant::MethodType { .. } => "MethodType",
        Constant::Module { .. } => "Module",
        Constant::Package { .. } => "Package",
        Constant::FieldRef(_) => "FieldRef",
        Constant::MethodRef(_) => "MethodRef",
        Constant::InterfaceMethodRef(_) => "InterfaceMethodRef",
        Constant::NameAndType(_) => "NameAndType",
        Constant::MethodHandle { .. } => "MethodHandle",
        Constant::Dynamic(_) => "Dynamic",
        Constant::InvokeDynamic(_) => "InvokeDynamic",
    }
}

/// The raw operands of an entry; indices for references, the value itself
/// for literals.
fn operands(constant: &Constant) -> String {
    match constant {
        Constant::Utf8(value) => format!("{:?}", value.to_string_lossy()),
        Constant::Integer(_) | Constant::Float(_) | Constant::Long(_) | Constant::Double(_) => {
            String::new()
        }

        Constant::Class { name }
        | Constant::Module { name }
        | Constant::Package { name }
        | Constant::String { string: name }
        | Constant::MethodType { descriptor: name } => format!("#{}", name),

        Constant::FieldRef(member)
        | Constant::MethodRef(member)
        | Constant::InterfaceMethodRef(member) => {
            format!("#{}.#{}", member.class, member.name_and_type)
        }
        Constant::NameAndType(nat) => format!("#{}:#{}", nat.name, nat.descriptor),
        Constant::MethodHandle { kind, reference } => format!("{}:#{}", *kind as u8, reference),
        Constant::Dynamic(info) | Constant::InvokeDynamic(info) => {
            format!("{}:#{}", info.bootstrap_method_attr, info.name_and_type)
        }
    }
}

fn value_style(constant: &Constant) -> &'static str {
    match constant {
        Constant::Utf8(_) => "pool.val.string",
        Constant::Integer(_) | Constant::Float(_) | Constant::Long(_) | Constant::Double(_) => {
            "pool.val.number"
        }
        Constant::Class { .. } => "pool.ref.class",
        Constant::FieldRef(_) | Constant::MethodRef(_) | Constant::InterfaceMethodRef(_) => {
            "pool.ref.member"
        }
        _ => "pool.ref.other",
    }
}

pub fn print_constant(pool: &ConstantPool, index: PoolIndex, constant: &Constant) {
    let width = pool.count().to_string().len() + 1;
    let index_text = format!("{:>width$}", format!("#{}", index), width = width);

    // The padding is applied before painting so escape codes don't skew it.
    let tag = format!("{:<18}", tag_name(constant));
    let operands = format!("{:<14}", operands(constant));

    match constant {
        Constant::Utf8(_) => println!(
            "{} = {} {}",
            style::paint("pool.index", index_text),
            style::paint("pool.tag", tag),
            style::paint(value_style(constant), operands.trim_end()),
        ),
        _ => println!(
            "{} = {} {} {}",
            style::paint("pool.index", index_text),
            style::paint("pool.tag", tag),
            style::paint(value_style(constant), operands),
            style::paint("comment", format!("// {}", pool::describe(pool, index))),
        ),
    }
}

pub fn print_pool(pool: &ConstantPool) {
    println!("{}", style::paint("header", "Constant pool:"));
    for (index, constant) in pool.iter() {
        print_constant(pool, index, constant);
    }
}
