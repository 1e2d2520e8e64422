//! Types for reading LVZ section containers
//!

use binrw::BinRead;
use std::io::{Cursor, Read, Seek};
use tracing::{debug, instrument, warn};

use crate::{
    error::{Error, Result},
    types::{ContainerHeader, SectionRecord},
};

/// One compressed entry of an LVZ container.
///
/// The stored compressed size always equals the payload length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompressedSection {
    decompressed_size: u32,
    file_time: u32,
    file_name: String,
    payload: Vec<u8>,
}

impl CompressedSection {
    /// Create a section from an already compressed payload
    pub fn new(
        file_name: impl Into<String>,
        file_time: u32,
        decompressed_size: u32,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            decompressed_size,
            file_time,
            file_name: file_name.into(),
            payload,
        }
    }

    /// Get the name of the embedded file, empty for the object table
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Get the modification time of the embedded file in seconds
    pub fn file_time(&self) -> u32 {
        self.file_time
    }

    /// Get the size of the payload, in bytes, once inflated
    pub fn decompressed_size(&self) -> u32 {
        self.decompressed_size
    }

    /// Get the size of the payload, in bytes, as stored
    pub fn compressed_size(&self) -> usize {
        self.payload.len()
    }

    /// Get the raw deflate stream
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

impl From<SectionRecord> for CompressedSection {
    fn from(record: SectionRecord) -> Self {
        Self {
            decompressed_size: record.decompressed_size,
            file_time: record.file_time,
            file_name: String::from_utf8_lossy(&record.file_name).into_owned(),
            payload: record.payload,
        }
    }
}

/// An LVZ file in its compressed, on-disk form
///
/// ```no_run
/// fn list_sections(bytes: &[u8]) -> lvz::error::Result<()> {
///     let package = lvz::read(bytes)?;
///
///     for section in package.sections() {
///         println!("{:?}: {} bytes", section.file_name(), section.decompressed_size());
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompressedPackage {
    name: String,
    sections: Vec<CompressedSection>,
}

impl CompressedPackage {
    /// Assemble a package from sections in on-disk order
    pub fn new(name: impl Into<String>, sections: Vec<CompressedSection>) -> Self {
        Self {
            name: name.into(),
            sections,
        }
    }

    /// Replace the name of the package
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    /// Get the name of the package
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of sections contained in this package.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether this package contains no sections
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the sections in on-disk order
    pub fn sections(&self) -> &[CompressedSection] {
        &self.sections
    }

    /// Search for a section by file name
    pub fn section_by_name(&self, name: &str) -> Option<&CompressedSection> {
        self.sections.iter().find(|s| s.file_name == name)
    }

    /// Consume the package, returning its sections
    pub fn into_sections(self) -> Vec<CompressedSection> {
        self.sections
    }

    /// Read an LVZ container collecting the sections it contains.
    ///
    /// A bad container tag rejects the whole input. Records carrying a bad tag are skipped,
    /// and a record cut short by the end of the input ends parsing with what was read so far.
    #[instrument(skip(reader), err)]
    pub fn read<R: Read + Seek>(mut reader: R) -> Result<CompressedPackage> {
        let Ok(header) = ContainerHeader::read(&mut reader) else {
            return Err(Error::InvalidPackage);
        };
        debug!(sections = header.sections, "reading container");

        let mut sections = Vec::new();
        for index in 0..header.sections {
            match SectionRecord::read(&mut reader) {
                Ok(record) if record.has_valid_tag() => {
                    debug!(
                        index,
                        name = %record.file_name,
                        size = record.compressed_size,
                        "read section"
                    );
                    sections.push(record.into());
                }
                Ok(record) => {
                    warn!(index, tag = ?record.tag, "skipping section with unexpected tag");
                }
                Err(error) => {
                    warn!(index, %error, "container ends before its last section");
                    break;
                }
            }
        }

        Ok(CompressedPackage {
            name: String::new(),
            sections,
        })
    }

    /// Read an LVZ container held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<CompressedPackage> {
        Self::read(Cursor::new(bytes))
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use crate::error::{Error, Result};
    use crate::read::CompressedPackage;

    #[test]
    fn read_invalid_tag() {
        #[rustfmt::skip]
        let input = [
            0x43, 0x4F, 0x4E, 0x58,
            0x00, 0x00, 0x00, 0x00,
        ];

        assert!(matches!(
            CompressedPackage::from_bytes(&input),
            Err(Error::InvalidPackage)
        ));
    }

    #[test]
    fn read_short_input() {
        assert!(matches!(
            CompressedPackage::from_bytes(b"CON"),
            Err(Error::InvalidPackage)
        ));
        assert!(matches!(
            CompressedPackage::from_bytes(&[]),
            Err(Error::InvalidPackage)
        ));
    }

    #[test]
    fn read_empty_container() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            0x43, 0x4F, 0x4E, 0x54,
            0x00, 0x00, 0x00, 0x00,
        ];

        let package = CompressedPackage::from_bytes(&input)?;
        assert!(package.is_empty());

        Ok(())
    }

    #[test]
    fn read_container_with_entries() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            // Header
            0x43, 0x4F, 0x4E, 0x54, 0x02, 0x00, 0x00, 0x00,
            // Section 0
            0x43, 0x4F, 0x4E, 0x54,
            0x0B, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
            0x00,
            0x03, 0x00,
            // Section 1
            0x43, 0x4F, 0x4E, 0x54,
            0x01, 0x00, 0x00, 0x00,
            0x2A, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
            0x61, 0x2E, 0x70, 0x6E, 0x67, 0x00,
            0xFF,
        ];

        let package = CompressedPackage::from_bytes(&input)?;
        assert_eq!(package.len(), 2);

        let first = &package.sections()[0];
        assert_eq!(first.file_name(), "");
        assert_eq!(first.decompressed_size(), 11);
        assert_eq!(first.payload(), &[0x03, 0x00]);

        let second = package.section_by_name("a.png").expect("section should exist");
        assert_eq!(second.file_time(), 42);
        assert_eq!(second.compressed_size(), 1);
        assert_eq!(second.payload(), &[0xFF]);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn read_skips_section_with_bad_tag() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            0x43, 0x4F, 0x4E, 0x54, 0x02, 0x00, 0x00, 0x00,
            // Section 0, foreign tag
            0x4A, 0x55, 0x4E, 0x4B,
            0x01, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
            0x78, 0x00,
            0xAA,
            // Section 1
            0x43, 0x4F, 0x4E, 0x54,
            0x01, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
            0x79, 0x00,
            0xBB,
        ];

        let package = CompressedPackage::from_bytes(&input)?;
        assert_eq!(package.len(), 1);
        assert_eq!(package.sections()[0].file_name(), "y");
        assert_eq!(package.sections()[0].payload(), &[0xBB]);
        assert!(logs_contain("skipping section with unexpected tag"));

        Ok(())
    }

    #[traced_test]
    #[test]
    fn read_keeps_sections_before_truncation() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            0x43, 0x4F, 0x4E, 0x54, 0x03, 0x00, 0x00, 0x00,
            0x43, 0x4F, 0x4E, 0x54,
            0x01, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
            0x78, 0x00,
            0xAA,
            // Section 1 claims 16 bytes but only has 2
            0x43, 0x4F, 0x4E, 0x54,
            0x10, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x10, 0x00, 0x00, 0x00,
            0x79, 0x00,
            0xBB, 0xCC,
        ];

        let package = CompressedPackage::from_bytes(&input)?;
        assert_eq!(package.len(), 1);
        assert_eq!(package.sections()[0].file_name(), "x");
        assert!(logs_contain("container ends before its last section"));

        Ok(())
    }
}
