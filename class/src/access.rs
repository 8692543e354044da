use std::ops::*;

use crate::{
    write::{ByteWriter, Encode},
    ClassResult,
};

/// A raw `access_flags` word.
///
/// Several bits mean different things depending on what they are attached to
/// (`0x0020` is `ACC_SUPER` on a class but `ACC_SYNCHRONIZED` on a method), so
/// naming them always goes through an [`AccessKind`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct AccessFlags(pub u16);

impl BitOr for AccessFlags {
    type Output = AccessFlags;

    fn bitor(self, other: Self) -> Self {
        AccessFlags(self.0 | other.0)
    }
}

impl BitAnd for AccessFlags {
    type Output = AccessFlags;

    fn bitand(self, other: Self) -> Self {
        AccessFlags(self.0 & other.0)
    }
}

impl BitXor for AccessFlags {
    type Output = AccessFlags;

    fn bitxor(self, other: Self) -> Self {
        AccessFlags(self.0 ^ other.0)
    }
}

/// What an access flags word is attached to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AccessKind {
    Class,
    InnerClass,
    Field,
    Method,
    Parameter,
    Module,
    ModuleRequires,
    /// Also used for `opens` entries.
    ModuleExports,
}

struct FlagDef {
    mask: u16,
    name: &'static str,
    modifier: Option<&'static str>,
}

const fn def(mask: u16, name: &'static str, modifier: Option<&'static str>) -> FlagDef {
    FlagDef {
        mask,
        name,
        modifier,
    }
}

const CLASS_FLAGS: &[FlagDef] = &[
    def(ACC_PUBLIC, "ACC_PUBLIC", Some("public")),
    def(ACC_FINAL, "ACC_FINAL", Some("final")),
    def(ACC_SUPER, "ACC_SUPER", None),
    def(ACC_INTERFACE, "ACC_INTERFACE", None),
    def(ACC_ABSTRACT, "ACC_ABSTRACT", Some("abstract")),
    def(ACC_SYNTHETIC, "ACC_SYNTHETIC", None),
    def(ACC_ANNOTATION, "ACC_ANNOTATION", None),
    def(ACC_ENUM, "ACC_ENUM", None),
    def(ACC_MODULE, "ACC_MODULE", None),
];

const INNER_CLASS_FLAGS: &[FlagDef] = &[
    def(ACC_PUBLIC, "ACC_PUBLIC", Some("public")),
    def(ACC_PRIVATE, "ACC_PRIVATE", Some("private")),
    def(ACC_PROTECTED, "ACC_PROTECTED", Some("protected")),
    def(ACC_STATIC, "ACC_STATIC", Some("static")),
    def(ACC_FINAL, "ACC_FINAL", Some("final")),
    def(ACC_INTERFACE, "ACC_INTERFACE", None),
    def(ACC_ABSTRACT, "ACC_ABSTRACT", Some("abstract")),
    def(ACC_SYNTHETIC, "ACC_SYNTHETIC", None),
    def(ACC_ANNOTATION, "ACC_ANNOTATION", None),
    def(ACC_ENUM, "ACC_ENUM", None),
];

const FIELD_FLAGS: &[FlagDef] = &[
    def(ACC_PUBLIC, "ACC_PUBLIC", Some("public")),
    def(ACC_PRIVATE, "ACC_PRIVATE", Some("private")),
    def(ACC_PROTECTED, "ACC_PROTECTED", Some("protected")),
    def(ACC_STATIC, "ACC_STATIC", Some("static")),
    def(ACC_FINAL, "ACC_FINAL", Some("final")),
    def(ACC_VOLATILE, "ACC_VOLATILE", Some("volatile")),
    def(ACC_TRANSIENT, "ACC_TRANSIENT", Some("transient")),
    def(ACC_SYNTHETIC, "ACC_SYNTHETIC", None),
    def(ACC_ENUM, "ACC_ENUM", None),
];

const METHOD_FLAGS: &[FlagDef] = &[
    def(ACC_PUBLIC, "ACC_PUBLIC", Some("public")),
    def(ACC_PRIVATE, "ACC_PRIVATE", Some("private")),
    def(ACC_PROTECTED, "ACC_PROTECTED", Some("protected")),
    def(ACC_STATIC, "ACC_STATIC", Some("static")),
    def(ACC_FINAL, "ACC_FINAL", Some("final")),
    def(ACC_SYNCHRONIZED, "ACC_SYNCHRONIZED", Some("synchronized")),
    def(ACC_BRIDGE, "ACC_BRIDGE", None),
    def(ACC_VARARGS, "ACC_VARARGS", None),
    def(ACC_NATIVE, "ACC_NATIVE", Some("native")),
    def(ACC_ABSTRACT, "ACC_ABSTRACT", Some("abstract")),
    def(ACC_STRICT, "ACC_STRICT", Some("strictfp")),
    def(ACC_SYNTHETIC, "ACC_SYNTHETIC", None),
];

const PARAMETER_FLAGS: &[FlagDef] = &[
    def(ACC_FINAL, "ACC_FINAL", Some("final")),
    def(ACC_SYNTHETIC, "ACC_SYNTHETIC", None),
    def(ACC_MANDATED, "ACC_MANDATED", None),
];

const MODULE_FLAGS: &[FlagDef] = &[
    def(ACC_OPEN, "ACC_OPEN", Some("open")),
    def(ACC_SYNTHETIC, "ACC_SYNTHETIC", None),
    def(ACC_MANDATED, "ACC_MANDATED", None),
];

const REQUIRES_FLAGS: &[FlagDef] = &[
    def(ACC_TRANSITIVE, "ACC_TRANSITIVE", Some("transitive")),
    def(ACC_STATIC_PHASE, "ACC_STATIC_PHASE", Some("static")),
    def(ACC_SYNTHETIC, "ACC_SYNTHETIC", None),
    def(ACC_MANDATED, "ACC_MANDATED", None),
];

const EXPORTS_FLAGS: &[FlagDef] = &[
    def(ACC_SYNTHETIC, "ACC_SYNTHETIC", None),
    def(ACC_MANDATED, "ACC_MANDATED", None),
];

impl AccessKind {
    fn flags(self) -> &'static [FlagDef] {
        match self {
            AccessKind::Class => CLASS_FLAGS,
            AccessKind::InnerClass => INNER_CLASS_FLAGS,
            AccessKind::Field => FIELD_FLAGS,
            AccessKind::Method => METHOD_FLAGS,
            AccessKind::Parameter => PARAMETER_FLAGS,
            AccessKind::Module => MODULE_FLAGS,
            AccessKind::ModuleRequires => REQUIRES_FLAGS,
            AccessKind::ModuleExports => EXPORTS_FLAGS,
        }
    }
}

impl AccessFlags {
    pub fn is(self, mask: u16) -> bool {
        self.0 & mask != 0
    }

    pub fn into_raw(self) -> u16 {
        self.0
    }

    /// The `ACC_*` names of every set bit that means something for `kind`.
    pub fn flag_names(self, kind: AccessKind) -> Vec<&'static str> {
        kind.flags()
            .iter()
            .filter(|flag| self.is(flag.mask))
            .map(|flag| flag.name)
            .collect()
    }

    /// Source-level keywords, in the order they are conventionally written.
    ///
    /// Interfaces are implicitly abstract, so `abstract` is left off of them.
    pub fn modifiers(self, kind: AccessKind) -> Vec<&'static str> {
        let interface = matches!(kind, AccessKind::Class | AccessKind::InnerClass)
            && self.is(ACC_INTERFACE);
        kind.flags()
            .iter()
            .filter(|flag| self.is(flag.mask))
            .filter(|flag| !(interface && flag.mask == ACC_ABSTRACT))
            .filter_map(|flag| flag.modifier)
            .collect()
    }

    /// Set bits that have no meaning for `kind`.
    pub fn unknown_bits(self, kind: AccessKind) -> u16 {
        let known = kind.flags().iter().fold(0, |acc, flag| acc | flag.mask);
        self.0 & !known
    }
}

impl Encode for AccessFlags {
    fn encoded_len(&self) -> usize {
        2
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        out.write_u16(self.0);
        Ok(())
    }
}

/// Marked or implicitly public in source.
pub const ACC_PUBLIC: u16 = 0x0001;
/// Marked private in source.
pub const ACC_PRIVATE: u16 = 0x0002;
/// Marked protected in source.
pub const ACC_PROTECTED: u16 = 0x0004;
/// Is an interface, not a class.
pub const ACC_INTERFACE: u16 = 0x0200;
/// Declared as an annotation type.
pub const ACC_ANNOTATION: u16 = 0x2000;
/// Declared as an enum type.
pub const ACC_ENUM: u16 = 0x4000;
/// Is a module, not a class or interface.
pub const ACC_MODULE: u16 = 0x8000;
/// Declared static.
pub const ACC_STATIC: u16 = 0x0008;
/// Declared final; must not be overridden (§5.4.5).
pub const ACC_FINAL: u16 = 0x0010;
/// Declared abstract; no implementation is provided.
pub const ACC_ABSTRACT: u16 = 0x0400;
/// Declared volatile; cannot be cached.
pub const ACC_VOLATILE: u16 = 0x0040;
/// Declared transient; not written or read by a persistent object manager.
pub const ACC_TRANSIENT: u16 = 0x0080;
/// Treat superclass methods specially when invoked by the invokespecial
/// instruction.
pub const ACC_SUPER: u16 = 0x0020;
/// Declared synchronized; invocation is wrapped by a monitor use.
pub const ACC_SYNCHRONIZED: u16 = 0x0020;
/// Declared with variable number of arguments.
pub const ACC_VARARGS: u16 = 0x0080;
/// Declared native; implemented in a language other than Java.
pub const ACC_NATIVE: u16 = 0x0100;
/// Declared strictfp; floating-point mode is FP-strict.
pub const ACC_STRICT: u16 = 0x0800;
/// A bridge method, generated by the compiler.
pub const ACC_BRIDGE: u16 = 0x0040;
/// Declared synthetic; not present in the source code.
pub const ACC_SYNTHETIC: u16 = 0x1000;
/// Implicitly declared in source, like the parameter of a compact constructor.
pub const ACC_MANDATED: u16 = 0x8000;
/// An open module.
pub const ACC_OPEN: u16 = 0x0020;
/// `requires transitive`.
pub const ACC_TRANSITIVE: u16 = 0x0020;
/// `requires static`.
pub const ACC_STATIC_PHASE: u16 = 0x0040;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_overlapping_bits_named_by_kind() {
        let flags = AccessFlags(ACC_PUBLIC | 0x0020);
        assert_eq!(flags.flag_names(AccessKind::Class), vec!["ACC_PUBLIC", "ACC_SUPER"]);
        assert_eq!(
            flags.flag_names(AccessKind::Method),
            vec!["ACC_PUBLIC", "ACC_SYNCHRONIZED"]
        );
        assert_eq!(
            AccessFlags(0x0020).flag_names(AccessKind::ModuleRequires),
            vec!["ACC_TRANSITIVE"]
        );
    }

    #[test]
    fn test_modifiers() {
        let flags = AccessFlags(ACC_PUBLIC | ACC_STATIC | ACC_FINAL | ACC_VOLATILE);
        assert_eq!(
            flags.modifiers(AccessKind::Field),
            vec!["public", "static", "final", "volatile"]
        );

        let iface = AccessFlags(ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT);
        assert_eq!(iface.modifiers(AccessKind::Class), vec!["public"]);
    }

    #[test]
    fn test_unknown_bits() {
        let flags = AccessFlags(ACC_PUBLIC | 0x0100);
        assert_eq!(flags.unknown_bits(AccessKind::Field), 0x0100);
        assert_eq!(flags.unknown_bits(AccessKind::Method), 0);
    }
}
