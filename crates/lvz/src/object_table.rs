//! Reading and writing the object table section.
//!
//! The object table holds every map object, screen object and image definition of a
//! package. It is told apart from embedded files only by its leading tag.

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use tracing::{debug, instrument, warn};

use crate::cursor::{ReadCursorExt, WriteCursorExt};
use crate::error::{Error, Result};
use crate::package::{ImageDefinition, MapObject, Package, ScreenObject};

const MAP_OBJECT_FLAG: u16 = 0x0001;
const ID_SHIFT: u16 = 1;
const ID_MAX: u16 = 0x7FFF;

const DISPLAY_TIME_MASK: u16 = 0x0FFF;
const DISPLAY_MODE_SHIFT: u16 = 12;
const DISPLAY_MODE_MASK: u16 = 0x000F;

const ANCHOR_MASK: u16 = 0x000F;
const COORDINATE_SHIFT: u16 = 4;

/// Size of one object record, for either object kind and either version
const OBJECT_RECORD_SIZE: usize = 10;

/// The wire variants of the object table
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TableVersion {
    /// "CLV1": screen objects share the map object layout and carry no anchors
    Legacy,

    /// "CLV2": screen objects pack an anchor type next to each coordinate
    Current,
}

impl TableVersion {
    /// Identify the table version from the leading four bytes of a section
    pub fn sniff(data: &[u8]) -> Option<Self> {
        match data.get(..4)? {
            b"CLV1" => Some(TableVersion::Legacy),
            b"CLV2" => Some(TableVersion::Current),
            _ => None,
        }
    }

    /// Tag written at the start of the table
    pub fn tag(self) -> &'static [u8; 4] {
        match self {
            TableVersion::Legacy => b"CLV1",
            TableVersion::Current => b"CLV2",
        }
    }
}

/// Parse an inflated object table section, appending its contents to `package`.
///
/// The package is only touched once the whole table has parsed, so a truncated table
/// leaves it as it was.
#[instrument(skip_all, fields(size = data.len()), err)]
pub fn decode(data: &[u8], package: &mut Package) -> Result<()> {
    let mut reader = Cursor::new(data);
    let tag = reader.read_tag()?;
    let version = TableVersion::sniff(&tag).ok_or(Error::UnknownObjectTable(tag))?;

    let objects = reader.read_u32::<LittleEndian>()?;
    let images = reader.read_u32::<LittleEndian>()?;
    debug!(?version, objects, images, "reading object table");

    let capacity = (objects as usize).min(data.len() / OBJECT_RECORD_SIZE);
    let mut map_objects = Vec::with_capacity(capacity);
    let mut screen_objects = Vec::new();
    for _ in 0..objects {
        let kind = reader.read_u16::<LittleEndian>()?;
        let id = kind >> ID_SHIFT;
        if kind & MAP_OBJECT_FLAG != 0 {
            map_objects.push(read_map_object(&mut reader, id)?);
        } else {
            screen_objects.push(read_screen_object(&mut reader, id, version)?);
        }
    }

    let mut image_definitions = Vec::with_capacity((images as usize).min(data.len()));
    for _ in 0..images {
        image_definitions.push(read_image(&mut reader)?);
    }

    let trailing = data.len() as u64 - reader.position();
    if trailing > 0 {
        debug!(trailing, "ignoring bytes after the object table");
    }

    package.map_objects.extend(map_objects);
    package.screen_objects.extend(screen_objects);
    package.images.extend(image_definitions);

    Ok(())
}

fn read_map_object<R: Read>(reader: &mut R, id: u16) -> Result<MapObject> {
    let x = reader.read_i16::<LittleEndian>()?;
    let y = reader.read_i16::<LittleEndian>()?;
    let image_index = reader.read_u8()?;
    let layer = reader.read_u8()?;
    let (display_time, display_mode) = unpack_display(reader.read_u16::<LittleEndian>()?);

    Ok(MapObject {
        id,
        x,
        y,
        image_index,
        layer,
        display_time,
        display_mode,
    })
}

fn read_screen_object<R: Read>(
    reader: &mut R,
    id: u16,
    version: TableVersion,
) -> Result<ScreenObject> {
    let (x, x_anchor, y, y_anchor) = match version {
        TableVersion::Legacy => (
            reader.read_i16::<LittleEndian>()?,
            0,
            reader.read_i16::<LittleEndian>()?,
            0,
        ),
        TableVersion::Current => {
            let (x, x_anchor) = unpack_coordinate(reader.read_u16::<LittleEndian>()?);
            let (y, y_anchor) = unpack_coordinate(reader.read_u16::<LittleEndian>()?);
            (x, x_anchor, y, y_anchor)
        }
    };
    let image_index = reader.read_u8()?;
    let layer = reader.read_u8()?;
    let (display_time, display_mode) = unpack_display(reader.read_u16::<LittleEndian>()?);

    Ok(ScreenObject {
        id,
        x,
        y,
        x_anchor,
        y_anchor,
        image_index,
        layer,
        display_time,
        display_mode,
    })
}

fn read_image<R: Read>(reader: &mut R) -> Result<ImageDefinition> {
    let frame_columns = reader.read_i16::<LittleEndian>()?;
    let frame_rows = reader.read_i16::<LittleEndian>()?;
    let animation_time = reader.read_i16::<LittleEndian>()?;
    let file_name = reader.read_null_string()?;

    Ok(ImageDefinition {
        file_name,
        animation_time,
        frame_columns,
        frame_rows,
    })
}

/// Serialize the objects and images of `package` as a "CLV2" table.
///
/// Map objects are written first, then screen objects, then images. There is no
/// writer for the legacy layout.
#[instrument(skip_all, fields(package = %package.name), err)]
pub fn encode(package: &Package) -> Result<Vec<u8>> {
    let objects = package.map_objects.len() + package.screen_objects.len();
    let mut writer = Vec::with_capacity(12 + objects * OBJECT_RECORD_SIZE);

    writer.extend_from_slice(TableVersion::Current.tag());
    writer.write_u32::<LittleEndian>(count(objects)?)?;
    writer.write_u32::<LittleEndian>(count(package.images.len())?)?;

    for object in &package.map_objects {
        writer.write_u16::<LittleEndian>(pack_kind(object.id, true))?;
        writer.write_i16::<LittleEndian>(object.x)?;
        writer.write_i16::<LittleEndian>(object.y)?;
        writer.write_u8(object.image_index)?;
        writer.write_u8(object.layer)?;
        writer.write_u16::<LittleEndian>(pack_display(
            object.display_time,
            object.display_mode,
        ))?;
    }

    for object in &package.screen_objects {
        writer.write_u16::<LittleEndian>(pack_kind(object.id, false))?;
        writer.write_u16::<LittleEndian>(pack_coordinate(object.x, object.x_anchor))?;
        writer.write_u16::<LittleEndian>(pack_coordinate(object.y, object.y_anchor))?;
        writer.write_u8(object.image_index)?;
        writer.write_u8(object.layer)?;
        writer.write_u16::<LittleEndian>(pack_display(
            object.display_time,
            object.display_mode,
        ))?;
    }

    for image in &package.images {
        writer.write_i16::<LittleEndian>(image.frame_columns)?;
        writer.write_i16::<LittleEndian>(image.frame_rows)?;
        writer.write_i16::<LittleEndian>(image.animation_time)?;
        writer.write_null_string(&image.file_name)?;
    }

    Ok(writer)
}

fn count(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::SectionTooLarge {
        name: String::new(),
        size: len,
    })
}

fn pack_kind(id: u16, map_object: bool) -> u16 {
    if id > ID_MAX {
        warn!(id, "object id does not fit in 15 bits, truncating");
    }
    let flag = if map_object { MAP_OBJECT_FLAG } else { 0 };
    ((id & ID_MAX) << ID_SHIFT) | flag
}

fn unpack_display(packed: u16) -> (u16, u8) {
    let display_time = packed & DISPLAY_TIME_MASK;
    let display_mode = (packed >> DISPLAY_MODE_SHIFT) & DISPLAY_MODE_MASK;
    (display_time, display_mode as u8)
}

fn pack_display(display_time: u16, display_mode: u8) -> u16 {
    if display_time > DISPLAY_TIME_MASK {
        warn!(display_time, "display time does not fit in 12 bits, truncating");
    }
    if u16::from(display_mode) > DISPLAY_MODE_MASK {
        warn!(display_mode, "display mode does not fit in 4 bits, truncating");
    }
    (display_time & DISPLAY_TIME_MASK)
        | ((u16::from(display_mode) & DISPLAY_MODE_MASK) << DISPLAY_MODE_SHIFT)
}

/// Split a screen coordinate word into a signed 12 bit offset and its anchor type
fn unpack_coordinate(packed: u16) -> (i16, u8) {
    let offset = (packed as i16) >> COORDINATE_SHIFT;
    let anchor = (packed & ANCHOR_MASK) as u8;
    (offset, anchor)
}

fn pack_coordinate(offset: i16, anchor: u8) -> u16 {
    if !(-2048..=2047).contains(&offset) {
        warn!(offset, "screen coordinate does not fit in 12 bits, wrapping");
    }
    if u16::from(anchor) > ANCHOR_MASK {
        warn!(anchor, "anchor type does not fit in 4 bits, truncating");
    }
    ((offset as u16) << COORDINATE_SHIFT) | (u16::from(anchor) & ANCHOR_MASK)
}
