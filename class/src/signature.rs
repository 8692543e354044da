//! Generic signatures (§4.7.9.1), parsed into a [`Type`] tree.
//!
//! ```txt
//! signature        := <type_params>? ( <method_sig> | <field_sig> <class_ty_sig>* ) ;
//! method_sig       := "(" <type_sig>* ")" <type_sig> ( "^" <reference_type> )* ;
//! type_params      := "<" <type_param>+ ">" ;
//! type_param       := <ident> ":" <reference_type>? ( ":" <reference_type> )* ;
//! type_sig         := <base_type> | "V" | <reference_type> ;
//! reference_type   := <class_ty_sig> | "[" <type_sig> | "T" <ident> ";" ;
//! class_ty_sig     := "L" <simple_class> ( "." <simple_class> )* ";" ;
//! simple_class     := <ident> <type_args>? ;
//! type_args        := "<" <type_arg>+ ">" ;
//! type_arg         := "*" | ( "+" | "-" )? <reference_type> ;
//! ```

use std::fmt;

use crate::{
    constant::{ConstantPool, PoolIndex},
    descriptor::{array_dimensions, base_type_name, invalid},
    parse::ByteParser,
    write::{ByteWriter, Encode},
    ClassError, ClassResult,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum WildcardKind {
    /// `?`
    Unbounded,
    /// `? extends B`
    Extends,
    /// `? super B`
    Super,
}

/// A possibly parameterized class, like `java/util/Map<TK;TV;>.Entry`.
///
/// Member classes keep the class they were named through as `outer`, so
/// `Outer<T>.Inner` has `name == "Inner"` and an outer `ClassType` named
/// `Outer`. Only the outermost name carries the package.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ClassType {
    pub outer: Option<Box<ClassType>>,
    pub name: String,
    pub args: Vec<Type>,
}

impl ClassType {
    /// The binary name of this class, like `java.util.Map$Entry`.
    pub fn binary_name(&self) -> String {
        match &self.outer {
            Some(outer) => format!("{}${}", outer.binary_name(), self.name),
            None => self.name.replace('/', "."),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Type {
    /// Base types by their source name, and type variables by their name.
    Simple(String),
    Array(Box<Type>),
    Method {
        type_params: Vec<Type>,
        params: Vec<Type>,
        ret: Box<Type>,
        throws: Vec<Type>,
    },
    ClassSig {
        type_params: Vec<Type>,
        superclass: Box<Type>,
        interfaces: Vec<Type>,
    },
    Class(ClassType),
    TypeParam {
        name: String,
        class_bound: Option<Box<Type>>,
        interface_bounds: Vec<Type>,
    },
    Wildcard {
        kind: WildcardKind,
        bound: Option<Box<Type>>,
    },
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Type], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

fn write_type_params(f: &mut fmt::Formatter<'_>, params: &[Type]) -> fmt::Result {
    if !params.is_empty() {
        f.write_str("<")?;
        write_list(f, params, ", ")?;
        f.write_str(">")?;
    }
    Ok(())
}

impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outer {
            Some(outer) => write!(f, "{}.{}", outer, self.name)?,
            None => f.write_str(&self.name.replace('/', "."))?,
        }
        write_type_params(f, &self.args)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Simple(name) => f.write_str(name),
            Type::Array(elem) => write!(f, "{}[]", elem),
            Type::Class(class) => write!(f, "{}", class),

            Type::Method {
                type_params,
                params,
                ret,
                throws,
            } => {
                write_type_params(f, type_params)?;
                f.write_str("(")?;
                write_list(f, params, ", ")?;
                write!(f, ") {}", ret)?;
                if !throws.is_empty() {
                    f.write_str(" throws ")?;
                    write_list(f, throws, ", ")?;
                }
                Ok(())
            }

            Type::ClassSig {
                type_params,
                superclass,
                interfaces,
            } => {
                if !type_params.is_empty() {
                    write_type_params(f, type_params)?;
                    f.write_str(" ")?;
                }
                write!(f, "extends {}", superclass)?;
                if !interfaces.is_empty() {
                    f.write_str(" implements ")?;
                    write_list(f, interfaces, ", ")?;
                }
                Ok(())
            }

            Type::TypeParam {
                name,
                class_bound,
                interface_bounds,
            } => {
                f.write_str(name)?;
                let mut bounds = class_bound.iter().map(|b| &**b).chain(interface_bounds);
                if let Some(first) = bounds.next() {
                    write!(f, " extends {}", first)?;
                    for bound in bounds {
                        write!(f, " & {}", bound)?;
                    }
                }
                Ok(())
            }

            Type::Wildcard { kind, bound } => match (kind, bound) {
                (WildcardKind::Extends, Some(bound)) => write!(f, "? extends {}", bound),
                (WildcardKind::Super, Some(bound)) => write!(f, "? super {}", bound),
                _ => f.write_str("?"),
            },
        }
    }
}

/// How deeply type arguments may nest, and how many member classes one
/// class type may name.
pub const MAX_SIGNATURE_DEPTH: usize = 64;

/// Explicit cursor over a signature string. Every error reports the offset
/// the cursor was at when it hit something unexpected.
struct SignatureParser<'a> {
    sig: &'a str,
    input: ByteParser<'a>,
    /// Type argument lists currently open.
    depth: usize,
}

impl<'a> SignatureParser<'a> {
    fn new(sig: &'a str) -> Self {
        SignatureParser {
            sig,
            input: ByteParser::new(sig.as_bytes()),
            depth: 0,
        }
    }

    fn error(&self) -> ClassError {
        invalid(self.sig, self.input.offset)
    }

    fn peek(&self) -> Option<u8> {
        self.input.peek_u8()
    }

    fn next(&mut self) -> ClassResult<u8> {
        let pos = self.input.offset;
        self.input.parse_u8().map_err(|_| invalid(self.sig, pos))
    }

    fn expect(&mut self, ch: u8) -> ClassResult<()> {
        if self.peek() == Some(ch) {
            self.input.offset += 1;
            Ok(())
        } else {
            Err(self.error())
        }
    }

    fn eat(&mut self, ch: u8) -> bool {
        self.expect(ch).is_ok()
    }

    /// Takes a non-empty run of bytes up to the next byte in `stop`.
    fn ident(&mut self, stop: &[u8]) -> ClassResult<String> {
        let start = self.input.offset;
        let ident = self.input.peeking_take_while(|ch| !stop.contains(&ch));
        if ident.is_empty() {
            return Err(self.error());
        }
        std::str::from_utf8(ident)
            .map(String::from)
            .map_err(|_| invalid(self.sig, start))
    }

    fn parse(&mut self) -> ClassResult<Type> {
        let type_params = if self.peek() == Some(b'<') {
            self.type_params()?
        } else {
            Vec::new()
        };

        if self.peek() == Some(b'(') {
            return self.method(type_params);
        }

        let first = self.type_sig()?;
        if type_params.is_empty() && self.input.is_empty() {
            return Ok(first);
        }

        let mut interfaces = Vec::new();
        while !self.input.is_empty() {
            interfaces.push(self.class_type()?);
        }
        Ok(Type::ClassSig {
            type_params,
            superclass: Box::new(first),
            interfaces,
        })
    }

    fn method(&mut self, type_params: Vec<Type>) -> ClassResult<Type> {
        self.expect(b'(')?;
        let mut params = Vec::new();
        while self.peek() != Some(b')') {
            params.push(self.type_sig()?);
        }
        self.expect(b')')?;

        let ret = self.return_type()?;

        let mut throws = Vec::new();
        while self.eat(b'^') {
            throws.push(self.reference_type()?);
        }

        if !self.input.is_empty() {
            return Err(self.error());
        }

        Ok(Type::Method {
            type_params,
            params,
            ret: Box::new(ret),
            throws,
        })
    }

    fn return_type(&mut self) -> ClassResult<Type> {
        if self.eat(b'V') {
            Ok(Type::Simple("void".into()))
        } else {
            self.type_sig()
        }
    }

    fn type_params(&mut self) -> ClassResult<Vec<Type>> {
        self.expect(b'<')?;
        let mut params = Vec::new();
        while self.peek() != Some(b'>') {
            params.push(self.type_param()?);
        }
        if params.is_empty() {
            return Err(self.error());
        }
        self.expect(b'>')?;
        Ok(params)
    }

    fn type_param(&mut self) -> ClassResult<Type> {
        let name = self.ident(b":>;")?;
        self.expect(b':')?;

        let class_bound = match self.peek() {
            Some(b'L') | Some(b'[') | Some(b'T') => Some(Box::new(self.reference_type()?)),
            _ => None,
        };

        let mut interface_bounds = Vec::new();
        while self.eat(b':') {
            interface_bounds.push(self.reference_type()?);
        }

        Ok(Type::TypeParam {
            name,
            class_bound,
            interface_bounds,
        })
    }

    fn type_sig(&mut self) -> ClassResult<Type> {
        match self.peek() {
            Some(b'L') | Some(b'[') | Some(b'T') => self.reference_type(),
            Some(b'V') => Err(self.error()),
            Some(ch) => match base_type_name(ch) {
                Some(name) => {
                    self.input.offset += 1;
                    Ok(Type::Simple(name.into()))
                }
                None => Err(self.error()),
            },
            None => Err(self.error()),
        }
    }

    fn reference_type(&mut self) -> ClassResult<Type> {
        match self.peek() {
            Some(b'L') => self.class_type(),
            Some(b'[') => {
                let dimensions = array_dimensions(self.sig, &mut self.input)?;
                let mut ty = self.type_sig()?;
                for _ in 0..dimensions {
                    ty = Type::Array(Box::new(ty));
                }
                Ok(ty)
            }
            Some(b'T') => {
                self.input.offset += 1;
                let name = self.ident(b";")?;
                self.expect(b';')?;
                Ok(Type::Simple(name))
            }
            _ => Err(self.error()),
        }
    }

    fn class_type(&mut self) -> ClassResult<Type> {
        self.expect(b'L')?;

        let mut class = self.simple_class(None)?;
        let mut members = 0;
        while self.eat(b'.') {
            members += 1;
            if members > MAX_SIGNATURE_DEPTH {
                return Err(self.error());
            }
            class = self.simple_class(Some(Box::new(class)))?;
        }
        self.expect(b';')?;

        Ok(Type::Class(class))
    }

    fn simple_class(&mut self, outer: Option<Box<ClassType>>) -> ClassResult<ClassType> {
        let name = self.ident(b"<.;")?;
        let args = if self.peek() == Some(b'<') {
            self.type_args()?
        } else {
            Vec::new()
        };
        Ok(ClassType { outer, name, args })
    }

    fn type_args(&mut self) -> ClassResult<Vec<Type>> {
        if self.depth == MAX_SIGNATURE_DEPTH {
            return Err(self.error());
        }
        self.expect(b'<')?;
        self.depth += 1;
        let mut args = Vec::new();
        while self.peek() != Some(b'>') {
            args.push(self.type_arg()?);
        }
        if args.is_empty() {
            return Err(self.error());
        }
        self.expect(b'>')?;
        self.depth -= 1;
        Ok(args)
    }

    fn type_arg(&mut self) -> ClassResult<Type> {
        let (kind, bound) = match self.next()? {
            b'*' => (WildcardKind::Unbounded, None),
            b'+' => (WildcardKind::Extends, Some(Box::new(self.reference_type()?))),
            b'-' => (WildcardKind::Super, Some(Box::new(self.reference_type()?))),
            _ => {
                self.input.offset -= 1;
                return self.reference_type();
            }
        };
        Ok(Type::Wildcard { kind, bound })
    }
}

/// Parses any kind of signature: field, method or class.
pub fn parse_signature(sig: &str) -> ClassResult<Type> {
    SignatureParser::new(sig).parse()
}

/// A `Signature` attribute body: the index of its `Utf8` entry.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Signature {
    pub index: PoolIndex,
}

impl Signature {
    pub fn new(index: PoolIndex) -> Self {
        Signature { index }
    }

    pub fn value<'p>(&self, pool: &'p ConstantPool) -> ClassResult<&'p str> {
        pool.utf8(self.index)
    }

    pub fn parse(&self, pool: &ConstantPool) -> ClassResult<Type> {
        parse_signature(self.value(pool)?)
    }

    /// The whole signature rendered as source.
    pub fn field_type(&self, pool: &ConstantPool) -> ClassResult<String> {
        self.parse(pool).map(|ty| ty.to_string())
    }

    pub fn parameter_types(&self, pool: &ConstantPool) -> ClassResult<Vec<String>> {
        match self.parse(pool)? {
            Type::Method { params, .. } => Ok(params.iter().map(ToString::to_string).collect()),
            _ => Err(invalid(self.value(pool)?, 0)),
        }
    }

    pub fn return_type(&self, pool: &ConstantPool) -> ClassResult<String> {
        match self.parse(pool)? {
            Type::Method { ret, .. } => Ok(ret.to_string()),
            _ => Err(invalid(self.value(pool)?, 0)),
        }
    }
}

impl Encode for Signature {
    fn encoded_len(&self) -> usize {
        2
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        out.write_u16(self.index);
        Ok(())
    }
}
