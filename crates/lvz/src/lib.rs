//! This library handles reading from and creating **LVZ** map resource packages.
//!
//! # LVZ Package Format Documentation
//!
//! An LVZ file bundles the auxiliary resources of a map: embedded files (mostly images)
//! and a compact object table describing the map objects and screen objects drawn on top
//! of the game view, along with the image definitions they reference.
//!
//! ## File Structure
//!
//! An LVZ file is a container header followed by a list of section records.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: "CONT"                                            |
//! | 0x0004         | Section Count          | 4 bytes: Number of section records that follow             |
//!
//! ### Section Record
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: "CONT"                                         |
//! | 0x0004         | Decompressed Size      | 4 bytes: Size of the payload once inflated              |
//! | 0x0008         | File Time              | 4 bytes: Modification time in seconds, may be zero      |
//! | 0x000C         | Compressed Size        | 4 bytes: Size of the payload as stored                  |
//! | 0x0010         | File Name              | Null-terminated, empty for the object table             |
//! | ...            | Payload                | (Compressed Size) bytes: deflate stream                 |
//!
//! A container with the wrong magic number is rejected. A record with the wrong magic
//! number is skipped and reading carries on with the next record.
//!
//! ### Object Table
//!
//! Once inflated, a section whose first four bytes are "CLV1" or "CLV2" is the object
//! table; anything else is an embedded file. The table starts with the tag, a 4 byte
//! object count (map and screen objects combined) and a 4 byte image count, followed by
//! the object records and then the image records.
//!
//! Every object record is 10 bytes:
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Kind / Id              | 2 bytes: bit 0 set for map objects, bits 1..15 id       |
//! | 0x0002         | X                      | 2 bytes: see below                                      |
//! | 0x0004         | Y                      | 2 bytes: see below                                      |
//! | 0x0006         | Image                  | 1 byte: index into the image records                    |
//! | 0x0007         | Layer                  | 1 byte: render layer                                    |
//! | 0x0008         | Display                | 2 bytes: bits 0..11 display time, bits 12..15 mode      |
//!
//! Map objects, and screen objects in "CLV1" tables, store signed 16 bit coordinates.
//! Screen objects in "CLV2" tables store the anchor type in bits 0..3 and a signed 12 bit
//! offset in bits 4..15.
//!
//! Image records hold a 2 byte column count, 2 byte row count, 2 byte animation time in
//! hundredths of a second, and a null-terminated file name. Objects refer to images by
//! their position in this list.
//!
//! Only "CLV2" tables are written.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.lvz`
//! - **Endianness**: Little-endian for all multi-byte integers
//! - **Compression**: every section is deflated on its own
//!
//! ```
//! # fn doit() -> lvz::error::Result<()>
//! # {
//! use lvz::{ImageDefinition, MapObject, Package};
//!
//! let mut package = Package::new("zone.lvz");
//! package.images.push(ImageDefinition::builder().file_name("bg01.bmp").build());
//! package.map_objects.push(MapObject::builder().id(42).x(100).y(-50).build());
//!
//! let bytes = lvz::write(&lvz::compress(&package)?)?;
//! let restored = lvz::inflate(&lvz::read(&bytes)?.with_name("zone.lvz"));
//!
//! assert_eq!(restored, package);
//! # Ok(())
//! # }
//! # doit().unwrap();
//! ```

pub mod codec;
pub mod compression;
pub mod cursor;
pub mod error;
pub mod object_table;
pub mod package;
pub mod read;
pub mod types;
pub mod validation;
pub mod write;

pub use codec::{
    compress, compress_with, inflate, inflate_with_report, read, write, CompressOptions,
    InflateReport,
};
pub use package::{
    AnchorType, DisplayMode, ImageDefinition, MapObject, Package, RenderLayer, Resource,
    ScreenObject,
};
pub use read::{CompressedPackage, CompressedSection};
pub use validation::{
    validate_image, validate_map_object, validate_resource, validate_screen_object, Status,
};
