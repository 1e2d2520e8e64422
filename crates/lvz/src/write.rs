//! Types for writing LVZ section containers
//!

use binrw::BinWrite;
use std::io::{Cursor, Seek, Write};
use tracing::instrument;

use crate::cursor::check_name;
use crate::error::{Error, Result};
use crate::read::{CompressedPackage, CompressedSection};
use crate::types::{ContainerHeader, SectionRecord, SECTION_TAG};

impl CompressedSection {
    fn to_record(&self) -> Result<SectionRecord> {
        check_name(self.file_name())?;
        let compressed_size =
            u32::try_from(self.payload().len()).map_err(|_| Error::SectionTooLarge {
                name: self.file_name().to_owned(),
                size: self.payload().len(),
            })?;

        Ok(SectionRecord {
            tag: SECTION_TAG,
            decompressed_size: self.decompressed_size(),
            file_time: self.file_time(),
            compressed_size,
            file_name: self.file_name().into(),
            payload: self.payload().to_vec(),
        })
    }
}

impl CompressedPackage {
    /// Write the container to `writer`.
    ///
    /// The section count and every compressed size are derived from the sections
    /// themselves.
    #[instrument(skip_all, fields(package = %self.name(), sections = self.len()), err)]
    pub fn write<W: Write + Seek>(&self, mut writer: W) -> Result<W> {
        let header = ContainerHeader {
            sections: u32::try_from(self.len()).map_err(|_| Error::SectionTooLarge {
                name: self.name().to_owned(),
                size: self.len(),
            })?,
        };
        header.write(&mut writer)?;

        for section in self.sections() {
            section.to_record()?.write(&mut writer)?;
        }

        Ok(writer)
    }

    /// Write the container into a new buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let size = 8 + self
            .sections()
            .iter()
            .map(|s| 17 + s.file_name().len() + s.compressed_size())
            .sum::<usize>();

        Ok(self.write(Cursor::new(Vec::with_capacity(size)))?.into_inner())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use crate::error::{Error, Result};
    use crate::read::{CompressedPackage, CompressedSection};

    #[traced_test]
    #[test]
    fn write_empty_container() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            0x43, 0x4F, 0x4E, 0x54,
            0x00, 0x00, 0x00, 0x00,
        ];

        let actual = CompressedPackage::new("x", Vec::new()).to_bytes()?;
        assert_eq!(actual, expected);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn write_container_with_entries() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
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

        let package = CompressedPackage::new(
            "x",
            vec![
                CompressedSection::new("", 0, 11, vec![0x03, 0x00]),
                CompressedSection::new("a.png", 42, 1, vec![0xFF]),
            ],
        );

        assert_eq!(package.to_bytes()?, expected);
        assert_eq!(CompressedPackage::from_bytes(&expected)?, package.with_name(""));

        Ok(())
    }

    #[test]
    fn write_rejects_name_with_null() {
        let package = CompressedPackage::new(
            "x",
            vec![CompressedSection::new("a\0.png", 0, 0, Vec::new())],
        );

        assert!(matches!(package.to_bytes(), Err(Error::InvalidName(_))));
    }
}
