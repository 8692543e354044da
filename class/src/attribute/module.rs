//! # Module attributes
//!
//! ```txt
//! Attribute::Module {
//!     module_name_index: u16,
//!     module_flags: u16,
//!     module_version_index: u16,
//!     requires: [(requires_index: u16, requires_flags: u16, requires_version_index: u16); u16],
//!     exports: [(exports_index: u16, exports_flags: u16, exports_to: [u16; u16]); u16],
//!     opens: [(opens_index: u16, opens_flags: u16, opens_to: [u16; u16]); u16],
//!     uses: [u16; u16],
//!     provides: [(provides_index: u16, provides_with: [u16; u16]); u16],
//! }
//!
//! Attribute::ModuleHashes {
//!     algorithm_index: u16,
//!     hashes: [(module_name_index: u16, hash: [u8; u16]); u16],
//! }
//! ```

use super::parse_u16_table;
use crate::{
    access::AccessFlags,
    constant::PoolIndex,
    parse::ByteParser,
    write::{ByteWriter, Encode},
    ClassResult,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Requires {
    /// A `Module` constant.
    pub module: PoolIndex,
    pub flags: AccessFlags,
    /// A `Utf8` constant, or 0 if there is no version.
    pub version: PoolIndex,
}

impl Encode for Requires {
    fn encoded_len(&self) -> usize {
        6
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        out.write_u16(self.module);
        out.write_u16(self.flags.0);
        out.write_u16(self.version);
        Ok(())
    }
}

/// An `exports` or `opens` directive.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Exports {
    /// A `Package` constant.
    pub package: PoolIndex,
    pub flags: AccessFlags,
    /// `Module` constants; empty for an unqualified export.
    pub to: Vec<PoolIndex>,
}

impl Encode for Exports {
    fn encoded_len(&self) -> usize {
        6 + 2 * self.to.len()
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        out.write_u16(self.package);
        out.write_u16(self.flags.0);
        out.write_u16_table("exports to", &self.to)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Provides {
    /// A `Class` constant naming the service interface.
    pub service: PoolIndex,
    /// `Class` constants naming the implementations.
    pub with: Vec<PoolIndex>,
}

impl Encode for Provides {
    fn encoded_len(&self) -> usize {
        4 + 2 * self.with.len()
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        out.write_u16(self.service);
        out.write_u16_table("provides with", &self.with)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Module {
    /// A `Module` constant.
    pub name: PoolIndex,
    pub flags: AccessFlags,
    /// A `Utf8` constant, or 0 if there is no version.
    pub version: PoolIndex,
    pub requires: Vec<Requires>,
    pub exports: Vec<Exports>,
    pub opens: Vec<Exports>,
    /// `Class` constants.
    pub uses: Vec<PoolIndex>,
    pub provides: Vec<Provides>,
}

impl Encode for Module {
    fn encoded_len(&self) -> usize {
        6 + 2
            + self.requires.encoded_len()
            + 2
            + self.exports.encoded_len()
            + 2
            + self.opens.encoded_len()
            + 2
            + 2 * self.uses.len()
            + 2
            + self.provides.encoded_len()
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        out.write_u16(self.name);
        out.write_u16(self.flags.0);
        out.write_u16(self.version);
        out.write_seq_u16("requires", &self.requires)?;
        out.write_seq_u16("exports", &self.exports)?;
        out.write_seq_u16("opens", &self.opens)?;
        out.write_u16_table("uses", &self.uses)?;
        out.write_seq_u16("provides", &self.provides)
    }
}

fn parse_exports(input: &mut ByteParser<'_>) -> ClassResult<Exports> {
    Ok(Exports {
        package: input.parse_u16()?,
        flags: AccessFlags(input.parse_u16()?),
        to: parse_u16_table(input)?,
    })
}

pub fn parse_module(input: &mut ByteParser<'_>) -> ClassResult<Module> {
    let name = input.parse_u16()?;
    let flags = AccessFlags(input.parse_u16()?);
    let version = input.parse_u16()?;

    let len = input.parse_u16()? as usize;
    let requires = input.seq(len, |input| -> ClassResult<Requires> {
        Ok(Requires {
            module: input.parse_u16()?,
            flags: AccessFlags(input.parse_u16()?),
            version: input.parse_u16()?,
        })
    })?;

    let len = input.parse_u16()? as usize;
    let exports = input.seq(len, parse_exports)?;

    let len = input.parse_u16()? as usize;
    let opens = input.seq(len, parse_exports)?;

    let uses = parse_u16_table(input)?;

    let len = input.parse_u16()? as usize;
    let provides = input.seq(len, |input| -> ClassResult<Provides> {
        Ok(Provides {
            service: input.parse_u16()?,
            with: parse_u16_table(input)?,
        })
    })?;

    Ok(Module {
        name,
        flags,
        version,
        requires,
        exports,
        opens,
        uses,
        provides,
    })
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ModuleHash {
    /// A `Module` constant.
    pub module: PoolIndex,
    pub hash: Vec<u8>,
}

impl Encode for ModuleHash {
    fn encoded_len(&self) -> usize {
        4 + self.hash.len()
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        out.write_u16(self.module);
        out.write_len_u16("module hash", self.hash.len())?;
        out.write_bytes(&self.hash);
        Ok(())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ModuleHashes {
    /// A `Utf8` constant, like `SHA-256`.
    pub algorithm: PoolIndex,
    pub hashes: Vec<ModuleHash>,
}

impl Encode for ModuleHashes {
    fn encoded_len(&self) -> usize {
        4 + self.hashes.encoded_len()
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        out.write_u16(self.algorithm);
        out.write_seq_u16("module hashes", &self.hashes)
    }
}

pub fn parse_module_hashes(input: &mut ByteParser<'_>) -> ClassResult<ModuleHashes> {
    let algorithm = input.parse_u16()?;
    let len = input.parse_u16()? as usize;
    let hashes = input.seq(len, |input| -> ClassResult<ModuleHash> {
        let module = input.parse_u16()?;
        let hash_len = input.parse_u16()? as usize;
        Ok(ModuleHash {
            module,
            hash: input.take_declared(hash_len)?.into(),
        })
    })?;
    Ok(ModuleHashes { algorithm, hashes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClassError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_module_round_trip() {
        #[rustfmt::skip]
        let bytes = [
            0, 1, 0x00, 0x20, 0, 0, // name, open, no version
            0, 1, 0, 2, 0x80, 0x00, 0, 3, // requires java.base, mandated
            0, 1, 0, 4, 0, 0, 0, 2, 0, 5, 0, 6, // exports p to m1, m2
            0, 0, // opens
            0, 1, 0, 7, // uses
            0, 1, 0, 7, 0, 1, 0, 8, // provides
        ];
        let mut input = ByteParser::new(&bytes);
        let module = parse_module(&mut input).unwrap();
        assert!(input.is_empty());

        assert_eq!(module.exports[0].to, vec![5, 6]);
        assert_eq!(module.provides[0].with, vec![8]);
        assert_eq!(module.encoded_len(), bytes.len());
        assert_eq!(module.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_truncated_target_table() {
        #[rustfmt::skip]
        let bytes = [
            0, 1, 0, 0, 0, 0,
            0, 0, // requires
            0, 1, 0, 4, 0, 0, 0, 3, 0, 5, // exports p to three modules, one present
        ];
        assert!(matches!(
            parse_module(&mut ByteParser::new(&bytes)),
            Err(ClassError::Parse(_))
        ));
    }

    #[test]
    fn test_module_hashes_round_trip() {
        let bytes = [0, 1, 0, 1, 0, 2, 0, 3, 0xde, 0xad, 0xbe];
        let mut input = ByteParser::new(&bytes);
        let hashes = parse_module_hashes(&mut input).unwrap();
        assert_eq!(hashes.hashes[0].hash, vec![0xde, 0xad, 0xbe]);
        assert_eq!(hashes.to_bytes().unwrap(), bytes);
    }
}
