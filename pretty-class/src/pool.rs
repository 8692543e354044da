//! Utilities for grabbing strings, or formatting data from a class constant
//! pool. Nothing here fails; broken references are rendered inline.

use classfile::{constant::MemberRef, Constant, ConstantPool, PoolIndex};

pub const WRONG_TYPE_MESSAGE: &str = "<wrong type>";

pub fn get_str(pool: &ConstantPool, index: PoolIndex) -> &str {
    pool.utf8(index).unwrap_or(WRONG_TYPE_MESSAGE)
}

pub fn get_class_name(pool: &ConstantPool, index: PoolIndex) -> &str {
    pool.class_name(index).unwrap_or(WRONG_TYPE_MESSAGE)
}

/// `name:descriptor` of a `NameAndType` constant.
pub fn name_and_type(pool: &ConstantPool, index: PoolIndex) -> String {
    match pool.name_and_type(index) {
        Ok(nat) => format!(
            "{}:{}",
            get_str(pool, nat.name),
            get_str(pool, nat.descriptor)
        ),
        Err(_) => WRONG_TYPE_MESSAGE.into(),
    }
}

fn member(pool: &ConstantPool, member: &MemberRef) -> String {
    format!(
        "{}.{}",
        get_class_name(pool, member.class),
        name_and_type(pool, member.name_and_type)
    )
}

/// A one-line rendering of what a constant refers to, following references
/// down to their strings.
pub fn describe(pool: &ConstantPool, index: PoolIndex) -> String {
    let constant = match pool.get(index) {
        Ok(constant) => constant,
        Err(_) => return format!("<invalid #{}>", index),
    };

    match constant {
        Constant::Utf8(value) => value.to_string(),
        Constant::Integer(val) => val.to_string(),
        Constant::Float(val) => format!("{}f", val),
        Constant::Long(val) => format!("{}l", val),
        Constant::Double(val) => format!("{}d", val),

        Constant::Class { name } => get_str(pool, *name).into(),
        Constant::String { string } => match pool.java_string(*string) {
            Ok(text) => format!("{:?}", text.to_string_lossy()),
            Err(_) => WRONG_TYPE_MESSAGE.into(),
        },
        Constant::MethodType { descriptor } => get_str(pool, *descriptor).into(),
        Constant::Module { name } | Constant::Package { name } => get_str(pool, *name).into(),

        Constant::FieldRef(member_ref)
        | Constant::MethodRef(member_ref)
        | Constant::InterfaceMethodRef(member_ref) => member(pool, member_ref),
        Constant::NameAndType(nat) => format!(
            "{}:{}",
            get_str(pool, nat.name),
            get_str(pool, nat.descriptor)
        ),

        Constant::MethodHandle { kind, reference } => match pool.member_ref(*reference) {
            Ok(member_ref) => format!("{} {}", kind.name(), member(pool, member_ref)),
            Err(_) => format!("{} {}", kind.name(), WRONG_TYPE_MESSAGE),
        },

        Constant::Dynamic(info) | Constant::InvokeDynamic(info) => format!(
            "#{}:{}",
            info.bootstrap_method_attr,
            name_and_type(pool, info.name_and_type)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classfile::constant::NameAndType;

    #[test]
    fn describes_references() {
        let mut pool = ConstantPool::new();
        let owner = pool.push(Constant::Utf8("java/io/PrintStream".into())).unwrap();
        let class = pool.push(Constant::Class { name: owner }).unwrap();
        let name = pool.push(Constant::Utf8("println".into())).unwrap();
        let desc = pool.push(Constant::Utf8("(I)V".into())).unwrap();
        let nat = pool
            .push(Constant::NameAndType(NameAndType {
                name,
                descriptor: desc,
            }))
            .unwrap();
        let method = pool
            .push(Constant::MethodRef(MemberRef {
                class,
                name_and_type: nat,
            }))
            .unwrap();
        let string = pool.push(Constant::String { string: name }).unwrap();

        assert_eq!(describe(&pool, method), "java/io/PrintStream.println:(I)V");
        assert_eq!(describe(&pool, string), "\"println\"");
        assert_eq!(get_class_name(&pool, name), WRONG_TYPE_MESSAGE);
        assert_eq!(describe(&pool, 99), "<invalid #99>");
    }
}
