//! Range checks for package entities.
//!
//! Every check returns a [`Status`] instead of an error: decoding never rejects an
//! out-of-range entity, it is up to the caller what to do with one.
//!
//! There are two ways in. The `validate_*` functions take the plain structs produced by
//! decoding, while the `validate_live_*` functions take anything exposing the `*View`
//! accessor traits, such as an object that is being edited. The plain structs implement
//! those traits too, so both paths run the same checks against the same [`BOUNDS`].

use crate::package::{ImageDefinition, MapObject, Package, Resource, ScreenObject};

/// Outcome of a validation check
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Status {
    /// The entity passed every check
    Success,
    /// No entity was supplied
    ObjectNull,
    /// The object has no image assigned
    ImageNotDefined,
    /// The image index points past the package's image list
    ImageIndexOutOfRange,
    /// The id does not fit in 15 bits
    ObjectIdOutOfRange,
    /// The x coordinate is outside the range for the object kind
    XCoordinateOutOfRange,
    /// The y coordinate is outside the range for the object kind
    YCoordinateOutOfRange,
    /// The horizontal anchor is not an [`AnchorType`](crate::AnchorType)
    XAnchorTypeOutOfRange,
    /// The vertical anchor is not an [`AnchorType`](crate::AnchorType)
    YAnchorTypeOutOfRange,
    /// The display mode is not a [`DisplayMode`](crate::DisplayMode)
    DisplayModeOutOfRange,
    /// The layer is not a [`RenderLayer`](crate::RenderLayer)
    RenderLayerOutOfRange,
    /// The display time is negative or too long
    DisplayTimeOutOfRange,
    /// The animation time is negative or too long
    AnimationTimeOutOfRange,
    /// A frame column or row count is below 1 or too large
    FrameCountOutOfRange,
    /// The resource has no contents loaded
    ResourceDataNull,
    /// The resource has no file name set
    ResourceNameNull,
    /// The resource file name is empty
    ResourceNameEmpty,
    /// The resource modification time is negative
    ResourceTimeNegative,
    /// The image has no file name set
    ImageFilenameNull,
    /// The image file name is empty
    ImageFilenameEmpty,
}

impl Status {
    /// Whether the check passed
    pub fn is_success(self) -> bool {
        self == Status::Success
    }
}

/// An inclusive range of accepted values
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Bounds {
    /// Smallest accepted value
    pub min: i64,
    /// Largest accepted value
    pub max: i64,
}

impl Bounds {
    /// Accept `min..=max`
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies within the bounds
    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Accepted ranges for every validated field
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BoundTable {
    /// Object ids, shared by both object kinds
    pub object_id: Bounds,
    /// Map object coordinates
    pub map_coordinate: Bounds,
    /// Screen object offsets from their anchor
    pub screen_coordinate: Bounds,
    /// Screen object anchors
    pub anchor_type: Bounds,
    /// Display modes
    pub display_mode: Bounds,
    /// Render layers
    pub render_layer: Bounds,
    /// Tenths of a second
    pub display_time: Bounds,
    /// Hundredths of a second
    pub animation_time: Bounds,
    /// Frame columns and rows
    pub frame_count: Bounds,
}

/// The single source of truth for validation ranges
pub const BOUNDS: BoundTable = BoundTable {
    object_id: Bounds::new(0, 32_767),
    map_coordinate: Bounds::new(-32_767, 32_767),
    screen_coordinate: Bounds::new(-2_048, 2_047),
    anchor_type: Bounds::new(0, 11),
    display_mode: Bounds::new(0, 5),
    render_layer: Bounds::new(0, 7),
    display_time: Bounds::new(0, 100_000_000),
    animation_time: Bounds::new(0, 100_000_000),
    frame_count: Bounds::new(1, 32_767),
};

/// Accessors shared by map and screen objects
pub trait ObjectView {
    fn id(&self) -> i64;
    fn x(&self) -> i64;
    fn y(&self) -> i64;
    /// `None` when no image has been assigned
    fn image_index(&self) -> Option<i64>;
    fn layer(&self) -> i64;
    fn display_time(&self) -> i64;
    fn display_mode(&self) -> i64;
}

/// Accessors for screen objects
pub trait ScreenObjectView: ObjectView {
    fn x_anchor(&self) -> i64;
    fn y_anchor(&self) -> i64;
}

/// Accessors for image definitions
pub trait ImageView {
    /// `None` when no file name has been set
    fn file_name(&self) -> Option<&str>;
    fn animation_time(&self) -> i64;
    fn frame_columns(&self) -> i64;
    fn frame_rows(&self) -> i64;
}

/// Accessors for embedded files
pub trait ResourceView {
    /// `None` when no file name has been set
    fn file_name(&self) -> Option<&str>;
    fn file_time(&self) -> i64;
    /// `None` when no contents have been loaded
    fn data(&self) -> Option<&[u8]>;
}

/// Check a decoded map object against a package holding `image_count` images
pub fn validate_map_object(object: &MapObject, image_count: usize) -> Status {
    validate_live_map_object(Some(object), image_count)
}

/// Check a decoded screen object against a package holding `image_count` images
pub fn validate_screen_object(object: &ScreenObject, image_count: usize) -> Status {
    validate_live_screen_object(Some(object), image_count)
}

/// Check a decoded image definition
pub fn validate_image(image: &ImageDefinition) -> Status {
    validate_live_image(Some(image))
}

/// Check a decoded resource
pub fn validate_resource(resource: &Resource) -> Status {
    validate_live_resource(Some(resource))
}

/// Check a map object exposed through accessors
pub fn validate_live_map_object<O: ObjectView + ?Sized>(
    object: Option<&O>,
    image_count: usize,
) -> Status {
    let Some(object) = object else {
        return Status::ObjectNull;
    };
    check_object(object, BOUNDS.map_coordinate, image_count)
        .or_else(|| check_display(object))
        .unwrap_or(Status::Success)
}

/// Check a screen object exposed through accessors
pub fn validate_live_screen_object<O: ScreenObjectView + ?Sized>(
    object: Option<&O>,
    image_count: usize,
) -> Status {
    let Some(object) = object else {
        return Status::ObjectNull;
    };
    check_object(object, BOUNDS.screen_coordinate, image_count)
        .or_else(|| check_anchors(object))
        .or_else(|| check_display(object))
        .unwrap_or(Status::Success)
}

/// Check an image definition exposed through accessors.
///
/// The file name is checked before the animation time and frame counts, so an image
/// with several problems reports its name first.
pub fn validate_live_image<I: ImageView + ?Sized>(image: Option<&I>) -> Status {
    let Some(image) = image else {
        return Status::ObjectNull;
    };

    match image.file_name() {
        None => return Status::ImageFilenameNull,
        Some("") => return Status::ImageFilenameEmpty,
        Some(_) => {}
    }
    if !BOUNDS.animation_time.contains(image.animation_time()) {
        return Status::AnimationTimeOutOfRange;
    }
    if !BOUNDS.frame_count.contains(image.frame_columns())
        || !BOUNDS.frame_count.contains(image.frame_rows())
    {
        return Status::FrameCountOutOfRange;
    }

    Status::Success
}

/// Check a resource exposed through accessors.
///
/// The file name is checked first, then the contents, then the modification time.
pub fn validate_live_resource<R: ResourceView + ?Sized>(resource: Option<&R>) -> Status {
    let Some(resource) = resource else {
        return Status::ObjectNull;
    };

    match resource.file_name() {
        None => return Status::ResourceNameNull,
        Some("") => return Status::ResourceNameEmpty,
        Some(_) => {}
    }
    if resource.data().is_none() {
        return Status::ResourceDataNull;
    }
    if resource.file_time() < 0 {
        return Status::ResourceTimeNegative;
    }

    Status::Success
}

fn check_object<O: ObjectView + ?Sized>(
    object: &O,
    coordinate: Bounds,
    image_count: usize,
) -> Option<Status> {
    let Some(image_index) = object.image_index() else {
        return Some(Status::ImageNotDefined);
    };
    let image_count = i64::try_from(image_count).unwrap_or(i64::MAX);
    if image_index < 0 || image_index >= image_count {
        return Some(Status::ImageIndexOutOfRange);
    }
    if !BOUNDS.object_id.contains(object.id()) {
        return Some(Status::ObjectIdOutOfRange);
    }
    if !coordinate.contains(object.x()) {
        return Some(Status::XCoordinateOutOfRange);
    }
    if !coordinate.contains(object.y()) {
        return Some(Status::YCoordinateOutOfRange);
    }
    None
}

fn check_anchors<O: ScreenObjectView + ?Sized>(object: &O) -> Option<Status> {
    if !BOUNDS.anchor_type.contains(object.x_anchor()) {
        return Some(Status::XAnchorTypeOutOfRange);
    }
    if !BOUNDS.anchor_type.contains(object.y_anchor()) {
        return Some(Status::YAnchorTypeOutOfRange);
    }
    None
}

fn check_display<O: ObjectView + ?Sized>(object: &O) -> Option<Status> {
    if !BOUNDS.display_mode.contains(object.display_mode()) {
        return Some(Status::DisplayModeOutOfRange);
    }
    if !BOUNDS.render_layer.contains(object.layer()) {
        return Some(Status::RenderLayerOutOfRange);
    }
    if !BOUNDS.display_time.contains(object.display_time()) {
        return Some(Status::DisplayTimeOutOfRange);
    }
    None
}

impl ObjectView for MapObject {
    fn id(&self) -> i64 {
        self.id.into()
    }
    fn x(&self) -> i64 {
        self.x.into()
    }
    fn y(&self) -> i64 {
        self.y.into()
    }
    fn image_index(&self) -> Option<i64> {
        Some(self.image_index.into())
    }
    fn layer(&self) -> i64 {
        self.layer.into()
    }
    fn display_time(&self) -> i64 {
        self.display_time.into()
    }
    fn display_mode(&self) -> i64 {
        self.display_mode.into()
    }
}

impl ObjectView for ScreenObject {
    fn id(&self) -> i64 {
        self.id.into()
    }
    fn x(&self) -> i64 {
        self.x.into()
    }
    fn y(&self) -> i64 {
        self.y.into()
    }
    fn image_index(&self) -> Option<i64> {
        Some(self.image_index.into())
    }
    fn layer(&self) -> i64 {
        self.layer.into()
    }
    fn display_time(&self) -> i64 {
        self.display_time.into()
    }
    fn display_mode(&self) -> i64 {
        self.display_mode.into()
    }
}

impl ScreenObjectView for ScreenObject {
    fn x_anchor(&self) -> i64 {
        self.x_anchor.into()
    }
    fn y_anchor(&self) -> i64 {
        self.y_anchor.into()
    }
}

impl ImageView for ImageDefinition {
    fn file_name(&self) -> Option<&str> {
        Some(self.file_name.as_str())
    }
    fn animation_time(&self) -> i64 {
        self.animation_time.into()
    }
    fn frame_columns(&self) -> i64 {
        self.frame_columns.into()
    }
    fn frame_rows(&self) -> i64 {
        self.frame_rows.into()
    }
}

impl ResourceView for Resource {
    fn file_name(&self) -> Option<&str> {
        Some(self.file_name.as_str())
    }
    fn file_time(&self) -> i64 {
        self.file_time.into()
    }
    fn data(&self) -> Option<&[u8]> {
        Some(self.data.as_slice())
    }
}

/// Which list of a [`Package`] a [`ValidationIssue`] refers to
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Resource,
    Image,
    MapObject,
    ScreenObject,
}

/// A failed check found by [`Package::validate`]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub kind: EntityKind,
    /// Position in the corresponding list of the package
    pub index: usize,
    pub status: Status,
}

impl Package {
    /// Run every entity of the package through its validator, collecting the failures
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let image_count = self.images.len();

        failures(EntityKind::Resource, self.resources.iter().map(validate_resource))
            .chain(failures(
                EntityKind::Image,
                self.images.iter().map(validate_image),
            ))
            .chain(failures(
                EntityKind::MapObject,
                self.map_objects
                    .iter()
                    .map(|o| validate_map_object(o, image_count)),
            ))
            .chain(failures(
                EntityKind::ScreenObject,
                self.screen_objects
                    .iter()
                    .map(|o| validate_screen_object(o, image_count)),
            ))
            .collect()
    }
}

fn failures(
    kind: EntityKind,
    statuses: impl Iterator<Item = Status>,
) -> impl Iterator<Item = ValidationIssue> {
    statuses
        .enumerate()
        .filter(|(_, status)| !status.is_success())
        .map(move |(index, status)| ValidationIssue {
            kind,
            index,
            status,
        })
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn map_object() -> MapObject {
        MapObject {
            id: 42,
            x: 100,
            y: -50,
            image_index: 0,
            layer: 3,
            display_time: 150,
            display_mode: 2,
        }
    }

    fn screen_object() -> ScreenObject {
        ScreenObject {
            id: 5,
            x: -100,
            y: 2000,
            x_anchor: 2,
            y_anchor: 9,
            ..Default::default()
        }
    }

    /// An object as an editor would hold it, with wide fields that may be unset
    #[derive(Default)]
    struct Editing {
        id: i64,
        x: i64,
        y: i64,
        image: Option<i64>,
        layer: i64,
        display_time: i64,
        display_mode: i64,
        x_anchor: i64,
        y_anchor: i64,
    }

    impl ObjectView for Editing {
        fn id(&self) -> i64 {
            self.id
        }
        fn x(&self) -> i64 {
            self.x
        }
        fn y(&self) -> i64 {
            self.y
        }
        fn image_index(&self) -> Option<i64> {
            self.image
        }
        fn layer(&self) -> i64 {
            self.layer
        }
        fn display_time(&self) -> i64 {
            self.display_time
        }
        fn display_mode(&self) -> i64 {
            self.display_mode
        }
    }

    impl ScreenObjectView for Editing {
        fn x_anchor(&self) -> i64 {
            self.x_anchor
        }
        fn y_anchor(&self) -> i64 {
            self.y_anchor
        }
    }

    struct EditingResource {
        name: Option<String>,
        time: i64,
        data: Option<Vec<u8>>,
    }

    impl ResourceView for EditingResource {
        fn file_name(&self) -> Option<&str> {
            self.name.as_deref()
        }
        fn file_time(&self) -> i64 {
            self.time
        }
        fn data(&self) -> Option<&[u8]> {
            self.data.as_deref()
        }
    }

    #[test]
    fn valid_objects() {
        assert_eq!(validate_map_object(&map_object(), 1), Status::Success);
        assert_eq!(validate_screen_object(&screen_object(), 1), Status::Success);
    }

    #[test]
    fn screen_coordinate_boundary() {
        let mut object = screen_object();

        object.y = 2047;
        assert_eq!(validate_screen_object(&object, 1), Status::Success);

        object.y = 2048;
        assert_eq!(validate_screen_object(&object, 1), Status::YCoordinateOutOfRange);

        object.y = 0;
        object.x = -2048;
        assert_eq!(validate_screen_object(&object, 1), Status::Success);

        object.x = -2049;
        assert_eq!(validate_screen_object(&object, 1), Status::XCoordinateOutOfRange);
    }

    #[test]
    fn image_index_one_past_the_end() {
        let mut object = map_object();
        object.image_index = 3;

        assert_eq!(validate_map_object(&object, 3), Status::ImageIndexOutOfRange);
        assert_eq!(validate_map_object(&object, 4), Status::Success);
        assert_eq!(validate_map_object(&object, 0), Status::ImageIndexOutOfRange);
    }

    #[test]
    fn map_coordinate_boundary() {
        let mut object = map_object();

        object.x = -32_767;
        assert_eq!(validate_map_object(&object, 1), Status::Success);

        object.x = i16::MIN;
        assert_eq!(validate_map_object(&object, 1), Status::XCoordinateOutOfRange);
    }

    #[test]
    fn first_failure_wins() {
        let mut object = map_object();
        object.id = 40_000;
        object.layer = 8;
        object.display_mode = 6;

        assert_eq!(validate_map_object(&object, 1), Status::ObjectIdOutOfRange);

        object.id = 1;
        assert_eq!(validate_map_object(&object, 1), Status::DisplayModeOutOfRange);

        object.display_mode = 0;
        assert_eq!(validate_map_object(&object, 1), Status::RenderLayerOutOfRange);
    }

    #[test]
    fn screen_anchor_checked_before_display_fields() {
        let mut object = screen_object();
        object.x_anchor = 12;
        object.layer = 9;

        assert_eq!(validate_screen_object(&object, 1), Status::XAnchorTypeOutOfRange);

        object.x_anchor = 11;
        object.y_anchor = 12;
        assert_eq!(validate_screen_object(&object, 1), Status::YAnchorTypeOutOfRange);

        object.y_anchor = 0;
        assert_eq!(validate_screen_object(&object, 1), Status::RenderLayerOutOfRange);
    }

    #[test]
    fn live_objects_share_bounds() {
        assert_eq!(
            validate_live_map_object::<Editing>(None, 1),
            Status::ObjectNull
        );

        let mut object = Editing {
            image: None,
            ..Default::default()
        };
        assert_eq!(
            validate_live_map_object(Some(&object), 1),
            Status::ImageNotDefined
        );

        object.image = Some(-1);
        assert_eq!(
            validate_live_map_object(Some(&object), 1),
            Status::ImageIndexOutOfRange
        );

        object.image = Some(0);
        object.display_time = 100_000_000;
        assert_eq!(validate_live_map_object(Some(&object), 1), Status::Success);

        object.display_time = 100_000_001;
        assert_eq!(
            validate_live_map_object(Some(&object), 1),
            Status::DisplayTimeOutOfRange
        );

        object.display_time = 0;
        object.y = 2048;
        assert_eq!(validate_live_map_object(Some(&object), 1), Status::Success);
        assert_eq!(
            validate_live_screen_object(Some(&object), 1),
            Status::YCoordinateOutOfRange
        );
    }

    #[test]
    fn image_checks() {
        let mut image = ImageDefinition::builder().file_name("bg01.bmp").build();
        assert_eq!(validate_image(&image), Status::Success);

        image.frame_rows = 0;
        assert_eq!(validate_image(&image), Status::FrameCountOutOfRange);

        image.frame_rows = 1;
        image.animation_time = -1;
        assert_eq!(validate_image(&image), Status::AnimationTimeOutOfRange);

        image.file_name.clear();
        assert_eq!(validate_image(&image), Status::ImageFilenameEmpty);

        assert_eq!(validate_live_image::<ImageDefinition>(None), Status::ObjectNull);
    }

    #[test]
    fn resource_checks() {
        let resource = Resource::builder().file_name("a.png").data(vec![]).build();
        assert_eq!(validate_resource(&resource), Status::Success);

        let nameless = Resource::builder().file_name("").data(vec![1]).build();
        assert_eq!(validate_resource(&nameless), Status::ResourceNameEmpty);

        let mut editing = EditingResource {
            name: None,
            time: -1,
            data: None,
        };
        assert_eq!(
            validate_live_resource(Some(&editing)),
            Status::ResourceNameNull
        );

        editing.name = Some("a.png".into());
        assert_eq!(
            validate_live_resource(Some(&editing)),
            Status::ResourceDataNull
        );

        editing.data = Some(vec![1, 2]);
        assert_eq!(
            validate_live_resource(Some(&editing)),
            Status::ResourceTimeNegative
        );

        editing.time = 0;
        assert_eq!(validate_live_resource(Some(&editing)), Status::Success);
    }

    #[test]
    fn names_are_checked_before_other_fields() {
        let image = ImageDefinition {
            file_name: String::new(),
            animation_time: -1,
            frame_columns: 0,
            frame_rows: 0,
        };
        assert_eq!(validate_image(&image), Status::ImageFilenameEmpty);

        let editing = EditingResource {
            name: Some(String::new()),
            time: -1,
            data: None,
        };
        assert_eq!(
            validate_live_resource(Some(&editing)),
            Status::ResourceNameEmpty
        );
    }

    #[test]
    fn package_validation_reports_positions() {
        let mut package = Package::new("x");
        package
            .images
            .push(ImageDefinition::builder().file_name("bg01.bmp").build());
        package.map_objects.push(map_object());
        package.map_objects.push(MapObject {
            image_index: 1,
            ..map_object()
        });
        package.screen_objects.push(ScreenObject {
            y: 2048,
            ..screen_object()
        });

        assert_eq!(
            package.validate(),
            vec![
                ValidationIssue {
                    kind: EntityKind::MapObject,
                    index: 1,
                    status: Status::ImageIndexOutOfRange,
                },
                ValidationIssue {
                    kind: EntityKind::ScreenObject,
                    index: 0,
                    status: Status::YCoordinateOutOfRange,
                },
            ]
        );
    }
}
