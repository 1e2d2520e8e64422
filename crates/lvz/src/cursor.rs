//! Sequential little-endian helpers shared by the container and object table codecs.
//!
//! Fixed width integers come straight from [`byteorder`]; this module adds the
//! null-terminated strings and raw slices the LVZ format is built from.

use std::io::{Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Result};

/// Reading helpers layered on top of [`ReadBytesExt`]
pub trait ReadCursorExt: Read {
    /// Read bytes up to (and consuming) a null terminator.
    ///
    /// Names are decoded lossily, the same way archive entry names are elsewhere.
    fn read_null_string(&mut self) -> Result<String> {
        let mut raw = Vec::new();
        loop {
            let char = self.read_u8()?;
            if char == b'\0' {
                break;
            }
            raw.push(char);
        }
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }

    /// Read exactly four bytes, used for format tags
    fn read_tag(&mut self) -> Result<[u8; 4]> {
        let mut tag = [0u8; 4];
        self.read_exact(&mut tag)?;
        Ok(tag)
    }
}

impl<R: Read + ?Sized> ReadCursorExt for R {}

/// Writing helpers layered on top of [`WriteBytesExt`]
pub trait WriteCursorExt: Write {
    /// Write `value` followed by a null terminator.
    fn write_null_string(&mut self, value: &str) -> Result<()> {
        check_name(value)?;
        self.write_all(value.as_bytes())?;
        self.write_u8(0)?;
        Ok(())
    }
}

impl<W: Write + ?Sized> WriteCursorExt for W {}

/// Reject names that cannot survive a null-terminated encoding
pub(crate) fn check_name(value: &str) -> Result<()> {
    if value.as_bytes().contains(&0) {
        return Err(Error::InvalidName(value.to_owned()));
    }
    Ok(())
}
