//! Base types for structure of the LVZ section container.

use binrw::{BinRead, BinWrite, NullString};

/// Tag that opens the container and every section record
pub const SECTION_TAG: [u8; 4] = *b"CONT";

/// LVZ container header
///
/// Always starts with "CONT" followed by the number of section records that follow.
/// All data is stored in little endian format
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(magic = b"CONT", little)]
pub struct ContainerHeader {
    /// The number of section records stored in the file
    pub sections: u32,
}

/// LVZ section record
///
/// The tag is kept as a plain field rather than a magic so a record carrying a foreign
/// tag can still be consumed and skipped.
#[derive(BinRead, BinWrite, Debug, Clone, PartialEq)]
#[brw(little)]
pub struct SectionRecord {
    /// Expected to be [`SECTION_TAG`]
    pub tag: [u8; 4],

    /// The size of the payload after inflating it
    pub decompressed_size: u32,

    /// Modification time of the embedded file in seconds, may be zero
    pub file_time: u32,

    /// The size of the payload as stored
    pub compressed_size: u32,

    /// Name of the embedded file, empty for the object table
    pub file_name: NullString,

    /// Raw deflate stream
    #[br(count = compressed_size)]
    pub payload: Vec<u8>,
}

impl SectionRecord {
    /// Whether this record carries the expected section tag
    pub fn has_valid_tag(&self) -> bool {
        self.tag == SECTION_TAG
    }
}
