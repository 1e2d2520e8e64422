//! Decompressed domain form of an LVZ package.
//!
//! Objects refer to images purely by position in [`Package::images`], so the order of that
//! list must be preserved whenever a package is copied or re-encoded.

use bon::Builder;

/// An arbitrary file embedded in a package, usually an image
#[derive(Builder, Debug, Clone, Default, PartialEq, Eq)]
pub struct Resource {
    /// Name the file is stored under
    #[builder(into)]
    pub file_name: String,

    /// Modification time in seconds, zero when unknown
    #[builder(default)]
    pub file_time: u32,

    /// File contents
    pub data: Vec<u8>,
}

impl Resource {
    /// Key used to match image definitions against this resource.
    ///
    /// Lookups are case-insensitive and ignore the file extension.
    pub fn lookup_key(&self) -> String {
        lookup_key(&self.file_name)
    }

    /// Guess the media type of the resource from its extension
    pub fn mime_type(&self) -> Option<&'static str> {
        let (_, extension) = self.file_name.rsplit_once('.')?;
        match extension.to_ascii_lowercase().as_str() {
            "bmp" => Some("image/bmp"),
            "png" => Some("image/png"),
            "gif" => Some("image/gif"),
            "jpg" | "jpeg" => Some("image/jpeg"),
            "wav" => Some("audio/wav"),
            "txt" => Some("text/plain"),
            _ => None,
        }
    }
}

fn lookup_key(file_name: &str) -> String {
    let stem = match file_name.rfind('.') {
        Some(dot) if !file_name[dot..].contains(['/', '\\']) => &file_name[..dot],
        _ => file_name,
    };
    stem.to_lowercase()
}

/// Describes how a resource is cut into animation frames
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
pub struct ImageDefinition {
    /// Name of the resource holding the pixels
    #[builder(into)]
    pub file_name: String,

    /// Time for one full animation cycle, in hundredths of a second
    #[builder(default)]
    pub animation_time: i16,

    /// Number of frames across
    #[builder(default = 1)]
    pub frame_columns: i16,

    /// Number of frames down
    #[builder(default = 1)]
    pub frame_rows: i16,
}

impl ImageDefinition {
    /// Total number of animation frames
    pub fn frame_count(&self) -> i32 {
        i32::from(self.frame_columns) * i32::from(self.frame_rows)
    }
}

/// An overlay positioned in world coordinates
#[derive(Builder, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapObject {
    /// Object id, 15 bits
    #[builder(default)]
    pub id: u16,
    #[builder(default)]
    pub x: i16,
    #[builder(default)]
    pub y: i16,
    /// Position of the image in [`Package::images`]
    #[builder(default)]
    pub image_index: u8,
    /// See [`RenderLayer`]
    #[builder(default)]
    pub layer: u8,
    /// Tenths of a second, 12 bits on the wire
    #[builder(default)]
    pub display_time: u16,
    /// See [`DisplayMode`]
    #[builder(default)]
    pub display_mode: u8,
}

/// An overlay positioned relative to an edge or corner of the screen
#[derive(Builder, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreenObject {
    /// Object id, 15 bits
    #[builder(default)]
    pub id: u16,
    /// Offset from the horizontal anchor
    #[builder(default)]
    pub x: i16,
    /// Offset from the vertical anchor
    #[builder(default)]
    pub y: i16,
    /// See [`AnchorType`]
    #[builder(default)]
    pub x_anchor: u8,
    /// See [`AnchorType`]
    #[builder(default)]
    pub y_anchor: u8,
    /// Position of the image in [`Package::images`]
    #[builder(default)]
    pub image_index: u8,
    /// See [`RenderLayer`]
    #[builder(default)]
    pub layer: u8,
    /// Tenths of a second, 12 bits on the wire
    #[builder(default)]
    pub display_time: u16,
    /// See [`DisplayMode`]
    #[builder(default)]
    pub display_mode: u8,
}

/// The decompressed contents of an LVZ file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Package {
    /// Usually the file name the package was loaded from
    pub name: String,
    pub resources: Vec<Resource>,
    pub images: Vec<ImageDefinition>,
    pub map_objects: Vec<MapObject>,
    pub screen_objects: Vec<ScreenObject>,
}

impl Package {
    /// Create an empty package
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Whether the package holds nothing at all
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
            && self.images.is_empty()
            && self.map_objects.is_empty()
            && self.screen_objects.is_empty()
    }

    /// Find the resource an image definition draws its pixels from
    pub fn resource_for_image(&self, image: &ImageDefinition) -> Option<&Resource> {
        let key = lookup_key(&image.file_name);
        self.resources.iter().find(|r| r.lookup_key() == key)
    }

    /// Look up the image definition an object refers to
    pub fn image(&self, index: u8) -> Option<&ImageDefinition> {
        self.images.get(usize::from(index))
    }
}

macro_rules! u8_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($(#[$vmeta:meta])* $variant:ident = $value:literal,)+ }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value,)+
        }

        impl TryFrom<u8> for $name {
            type Error = u8;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $($value => Ok($name::$variant),)+
                    other => Err(other),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value as u8
            }
        }
    };
}

u8_enum! {
    /// Screen position a screen object's coordinate is relative to
    pub enum AnchorType {
        /// Top left corner
        Normal = 0,
        /// Screen center
        Center = 1,
        /// Bottom right corner
        BottomRight = 2,
        /// Stats box, lower right
        StatsBox = 3,
        /// Top right specials
        SpecialsTop = 4,
        /// Bottom right specials
        SpecialsBottom = 5,
        /// Below the energy bar
        EnergyBar = 6,
        /// Top left chat
        Chat = 7,
        /// Top left radar
        Radar = 8,
        /// Radar text
        RadarText = 9,
        /// Top left weapons
        WeaponsTop = 10,
        /// Bottom left weapons
        WeaponsBottom = 11,
    }
}

u8_enum! {
    /// When an object becomes visible
    pub enum DisplayMode {
        ShowAlways = 0,
        EnterZone = 1,
        EnterArena = 2,
        Kill = 3,
        Death = 4,
        ServerControlled = 5,
    }
}

u8_enum! {
    /// Drawing order relative to the rest of the game view
    pub enum RenderLayer {
        BelowAll = 0,
        AfterBackground = 1,
        AfterTiles = 2,
        AfterWeapons = 3,
        AfterShips = 4,
        AfterGauges = 5,
        AfterChat = 6,
        TopMost = 7,
    }
}
