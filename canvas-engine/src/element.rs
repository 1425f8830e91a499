//! Canvas elements - the building blocks of scenes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{Bounds, Point};
use crate::store::current_timestamp_ms;

/// Unique identifier for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse from the hyphenated string form.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`uuid::Error`] if `s` is not a valid UUID.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position, size and rotation of an element in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// X position of the top-left corner.
    pub x: f64,
    /// Y position of the top-left corner.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// Rotation in degrees, clockwise.
    pub rotation: f64,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
            rotation: 0.0,
        }
    }
}

impl Frame {
    /// Unrotated frame from origin and size.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: 0.0,
        }
    }

    /// Unrotated frame covering `bounds`.
    #[must_use]
    pub const fn from_bounds(bounds: Bounds) -> Self {
        Self::new(bounds.x, bounds.y, bounds.width, bounds.height)
    }

    /// The frame rectangle, ignoring rotation.
    #[must_use]
    pub const fn rect(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }
}

/// Extra scale applied around a normalized pivot of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtraTransform {
    /// Horizontal scale (1.0 = 100%).
    pub scale_x: f64,
    /// Vertical scale (1.0 = 100%).
    pub scale_y: f64,
    /// Pivot X in `[0, 1]`, relative to the frame width.
    pub pivot_x: f64,
    /// Pivot Y in `[0, 1]`, relative to the frame height.
    pub pivot_y: f64,
}

impl Default for ExtraTransform {
    fn default() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            pivot_x: 0.5,
            pivot_y: 0.5,
        }
    }
}

impl ExtraTransform {
    /// Whether this transform leaves the frame unchanged.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_identity(&self) -> bool {
        self.scale_x == 1.0 && self.scale_y == 1.0
    }
}

/// Whether the renderer should draw an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Drawn normally.
    #[default]
    Visible,
    /// Kept in the scene but not drawn or hit.
    Hidden,
}

/// Fill and stroke shared by every element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementStyle {
    /// Fill color as hex or CSS color.
    pub fill: String,
    /// Fill opacity in `[0, 1]`.
    pub fill_opacity: f64,
    /// Stroke color.
    pub stroke: String,
    /// Stroke width in world units.
    pub stroke_width: f64,
    /// Stroke opacity in `[0, 1]`.
    pub stroke_opacity: f64,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            fill: "#D9D9D9".to_string(),
            fill_opacity: 1.0,
            stroke: "#000000".to_string(),
            stroke_width: 0.0,
            stroke_opacity: 1.0,
        }
    }
}

/// Font weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    /// Regular weight.
    #[default]
    Normal,
    /// Bold.
    Bold,
}

/// Font style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    /// Upright.
    #[default]
    Normal,
    /// Italic.
    Italic,
}

/// Text decoration line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextDecoration {
    /// No decoration.
    #[default]
    None,
    /// Underline.
    Underline,
    /// Strike-through.
    LineThrough,
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Left aligned.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Right aligned.
    Right,
}

/// Full text style record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font family name.
    pub font_family: String,
    /// Font size in world units.
    pub font_size: f64,
    /// Weight.
    pub font_weight: FontWeight,
    /// Style.
    pub font_style: FontStyle,
    /// Decoration.
    pub text_decoration: TextDecoration,
    /// Alignment.
    pub text_align: TextAlign,
    /// Line height multiplier.
    pub line_height: f64,
    /// Text color.
    pub color: String,
    /// Optional highlight color behind the glyphs.
    pub background_color: Option<String>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Inter".to_string(),
            font_size: 16.0,
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            text_decoration: TextDecoration::None,
            text_align: TextAlign::Left,
            line_height: 1.2,
            color: "#000000".to_string(),
            background_color: None,
        }
    }
}

/// Partial [`TextStyle`] used by rich-text spans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)] // Mirrors TextStyle field-for-field
pub struct TextStyleOverride {
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub font_weight: Option<FontWeight>,
    pub font_style: Option<FontStyle>,
    pub text_decoration: Option<TextDecoration>,
    pub text_align: Option<TextAlign>,
    pub line_height: Option<f64>,
    pub color: Option<String>,
    pub background_color: Option<String>,
}

impl TextStyleOverride {
    /// `base` with every set field of this override applied.
    #[must_use]
    pub fn resolve(&self, base: &TextStyle) -> TextStyle {
        TextStyle {
            font_family: self
                .font_family
                .clone()
                .unwrap_or_else(|| base.font_family.clone()),
            font_size: self.font_size.unwrap_or(base.font_size),
            font_weight: self.font_weight.unwrap_or(base.font_weight),
            font_style: self.font_style.unwrap_or(base.font_style),
            text_decoration: self.text_decoration.unwrap_or(base.text_decoration),
            text_align: self.text_align.unwrap_or(base.text_align),
            line_height: self.line_height.unwrap_or(base.line_height),
            color: self.color.clone().unwrap_or_else(|| base.color.clone()),
            background_color: self
                .background_color
                .clone()
                .or_else(|| base.background_color.clone()),
        }
    }
}

/// Half-open character range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRange {
    /// First index.
    pub start: usize,
    /// One past the last index.
    pub end: usize,
}

impl TextRange {
    /// Whether `index` falls inside the range.
    #[must_use]
    pub const fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }
}

/// A styled run of rich text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextSpan {
    /// Characters covered by this span.
    pub range: TextRange,
    /// Style overrides for the covered characters.
    pub style: TextStyleOverride,
}

/// Payload of a text element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    /// The text.
    pub content: String,
    /// Base style.
    pub style: TextStyle,
    /// Rich-text overrides, later spans win.
    #[serde(default)]
    pub spans: Vec<RichTextSpan>,
    /// Active editing selection, if any.
    #[serde(default)]
    pub selection: Option<TextRange>,
}

impl TextContent {
    /// Plain text with the default style.
    #[must_use]
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Effective style of the character at `index`.
    #[must_use]
    pub fn style_at(&self, index: usize) -> TextStyle {
        self.spans
            .iter()
            .filter(|span| span.range.contains(index))
            .fold(self.style.clone(), |acc, span| span.style.resolve(&acc))
    }
}

/// Image filter kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFilterKind {
    /// Desaturate.
    Grayscale,
    /// Warm brown tint.
    Sepia,
    /// Gaussian blur.
    Blur,
}

/// A single image filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageFilter {
    /// Filter kind.
    pub kind: ImageFilterKind,
    /// Filter intensity.
    pub value: f64,
}

/// Payload of an image element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageContent {
    /// Image source URI or data URL.
    pub src: String,
    /// Intrinsic pixel width.
    pub natural_width: f64,
    /// Intrinsic pixel height.
    pub natural_height: f64,
    /// Optional filter.
    #[serde(default)]
    pub filter: Option<ImageFilter>,
}

/// The type of content an element contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ElementKind {
    /// A rectangle.
    Rect {
        /// Optional corner radius in world units.
        #[serde(default)]
        corner_radius: Option<f64>,
    },
    /// An ellipse inscribed in the frame.
    Circle,
    /// An isosceles triangle inscribed in the frame.
    Triangle,
    /// A text box.
    Text(TextContent),
    /// A raster or vector image.
    Image(ImageContent),
    /// A container group for other elements.
    Group {
        /// Child element IDs, in paint order.
        children: Vec<ElementId>,
    },
}

impl ElementKind {
    /// Short lowercase tag for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Rect { .. } => "rect",
            Self::Circle => "circle",
            Self::Triangle => "triangle",
            Self::Text(_) => "text",
            Self::Image(_) => "image",
            Self::Group { .. } => "group",
        }
    }
}

/// A canvas element with content, geometry and bookkeeping metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier.
    pub id: ElementId,
    /// Element content type.
    pub kind: ElementKind,
    /// Position, size and rotation.
    pub frame: Frame,
    /// Extra scale around a pivot.
    #[serde(default)]
    pub transform: ExtraTransform,
    /// Fill and stroke.
    #[serde(default)]
    pub style: ElementStyle,
    /// Overall opacity in `[0, 1]`.
    pub opacity: f64,
    /// Optimistic-concurrency version, bumped on every applied patch.
    pub version: u64,
    /// Creation time, ms since epoch.
    pub created_at: u64,
    /// Last update time, ms since epoch.
    pub updated_at: u64,
    /// Visibility flag.
    #[serde(default)]
    pub visibility: Visibility,
    /// Renderer cache key.
    #[serde(default)]
    pub cache_key: Option<String>,
    /// When the renderer last drew this element, ms since epoch.
    #[serde(default)]
    pub last_rendered_at: Option<u64>,
}

impl Element {
    /// Create a new element with the given kind and a default frame.
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        let now = current_timestamp_ms();
        Self {
            id: ElementId::new(),
            kind,
            frame: Frame::default(),
            transform: ExtraTransform::default(),
            style: ElementStyle::default(),
            opacity: 1.0,
            version: 1,
            created_at: now,
            updated_at: now,
            visibility: Visibility::Visible,
            cache_key: None,
            last_rendered_at: None,
        }
    }

    /// A plain rectangle.
    #[must_use]
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(ElementKind::Rect {
            corner_radius: None,
        })
        .with_frame(Frame::new(x, y, width, height))
    }

    /// A group over `children`. Its frame is left at the default until the
    /// caller sets one.
    #[must_use]
    pub fn group(children: Vec<ElementId>) -> Self {
        Self::new(ElementKind::Group { children })
    }

    /// Set the id.
    #[must_use]
    pub fn with_id(mut self, id: ElementId) -> Self {
        self.id = id;
        self
    }

    /// Set the frame.
    #[must_use]
    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frame = frame;
        self
    }

    /// Set the extra transform.
    #[must_use]
    pub fn with_transform(mut self, transform: ExtraTransform) -> Self {
        self.transform = transform;
        self
    }

    /// Set the style.
    #[must_use]
    pub fn with_style(mut self, style: ElementStyle) -> Self {
        self.style = style;
        self
    }

    /// Whether the element is drawn.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    /// Child ids for groups, `None` otherwise.
    #[must_use]
    pub fn children(&self) -> Option<&[ElementId]> {
        match &self.kind {
            ElementKind::Group { children } => Some(children),
            _ => None,
        }
    }

    /// World-space pivot used for scale and rotation.
    #[must_use]
    pub fn pivot(&self) -> Point {
        Point::new(
            self.frame.x + self.transform.pivot_x * self.frame.width,
            self.frame.y + self.transform.pivot_y * self.frame.height,
        )
    }

    /// Frame after the extra scale, before rotation.
    fn scaled_rect(&self) -> Bounds {
        if self.transform.is_identity() {
            return self.frame.rect();
        }
        let pivot = self.pivot();
        let width = self.frame.width * self.transform.scale_x;
        let height = self.frame.height * self.transform.scale_y;
        Bounds::from_corners(
            Point::new(
                pivot.x - self.transform.pivot_x * width,
                pivot.y - self.transform.pivot_y * height,
            ),
            Point::new(
                pivot.x + (1.0 - self.transform.pivot_x) * width,
                pivot.y + (1.0 - self.transform.pivot_y) * height,
            ),
        )
    }

    /// Axis-aligned world bounds, accounting for scale and rotation.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn bounds(&self) -> Bounds {
        let rect = self.scaled_rect();
        if self.frame.rotation % 360.0 == 0.0 {
            return rect;
        }
        let pivot = self.pivot();
        let corners = [
            Point::new(rect.x, rect.y),
            Point::new(rect.right(), rect.y),
            Point::new(rect.right(), rect.bottom()),
            Point::new(rect.x, rect.bottom()),
        ]
        .map(|c| rotate_about(c, pivot, self.frame.rotation));
        Bounds::from_points(&corners).unwrap_or(rect)
    }

    /// Check if a world point is within this element's rotated frame.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn contains_point(&self, p: Point) -> bool {
        let local = if self.frame.rotation % 360.0 == 0.0 {
            p
        } else {
            rotate_about(p, self.pivot(), -self.frame.rotation)
        };
        self.scaled_rect().contains(local)
    }
}

/// Rotate `p` around `center` by `degrees` (clockwise in screen space).
fn rotate_about(p: Point, center: Point, degrees: f64) -> Point {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let d = p.sub(center);
    Point::new(
        center.x + d.x * cos - d.y * sin,
        center.y + d.x * sin + d.y * cos,
    )
}

/// Partial update merged into an existing element by the store.
///
/// `None` leaves a field untouched. The nested options on `cache_key` and
/// `last_rendered_at` distinguish "leave alone" (`None`) from "clear"
/// (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementPatch {
    /// New X position.
    pub x: Option<f64>,
    /// New Y position.
    pub y: Option<f64>,
    /// New width.
    pub width: Option<f64>,
    /// New height.
    pub height: Option<f64>,
    /// New rotation in degrees.
    pub rotation: Option<f64>,
    /// New extra transform.
    pub transform: Option<ExtraTransform>,
    /// New style.
    pub style: Option<ElementStyle>,
    /// New opacity.
    pub opacity: Option<f64>,
    /// New visibility.
    pub visibility: Option<Visibility>,
    /// New or cleared cache key.
    pub cache_key: Option<Option<String>>,
    /// New or cleared render timestamp.
    pub last_rendered_at: Option<Option<u64>>,
    /// Replacement variant payload.
    pub kind: Option<ElementKind>,
}

impl ElementPatch {
    /// Patch that moves the frame origin.
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Patch that replaces the whole frame.
    #[must_use]
    pub fn frame(frame: Frame) -> Self {
        Self {
            x: Some(frame.x),
            y: Some(frame.y),
            width: Some(frame.width),
            height: Some(frame.height),
            rotation: Some(frame.rotation),
            ..Self::default()
        }
    }

    /// Patch that only changes opacity.
    #[must_use]
    pub fn opacity(opacity: f64) -> Self {
        Self {
            opacity: Some(opacity),
            ..Self::default()
        }
    }

    /// Patch that replaces the variant payload.
    #[must_use]
    pub fn kind(kind: ElementKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Merge into `element`, bump its version and stamp `updated_at`.
    ///
    /// No geometric validation happens here.
    pub fn apply(self, element: &mut Element, now: u64) {
        let frame = &mut element.frame;
        if let Some(x) = self.x {
            frame.x = x;
        }
        if let Some(y) = self.y {
            frame.y = y;
        }
        if let Some(width) = self.width {
            frame.width = width;
        }
        if let Some(height) = self.height {
            frame.height = height;
        }
        if let Some(rotation) = self.rotation {
            frame.rotation = rotation;
        }
        if let Some(transform) = self.transform {
            element.transform = transform;
        }
        if let Some(style) = self.style {
            element.style = style;
        }
        if let Some(opacity) = self.opacity {
            element.opacity = opacity;
        }
        if let Some(visibility) = self.visibility {
            element.visibility = visibility;
        }
        if let Some(cache_key) = self.cache_key {
            element.cache_key = cache_key;
        }
        if let Some(last_rendered_at) = self.last_rendered_at {
            element.last_rendered_at = last_rendered_at;
        }
        if let Some(kind) = self.kind {
            element.kind = kind;
        }
        element.version += 1;
        element.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_bounds_identity_is_frame() {
        let el = Element::rect(10.0, 20.0, 30.0, 40.0);
        assert_eq!(el.bounds(), Bounds::new(10.0, 20.0, 30.0, 40.0));
    }

    #[test]
    fn test_bounds_with_scale_around_center() {
        let el = Element::rect(0.0, 0.0, 100.0, 50.0).with_transform(ExtraTransform {
            scale_x: 2.0,
            scale_y: 0.5,
            ..ExtraTransform::default()
        });
        let b = el.bounds();
        assert!(approx(b.x, -50.0));
        assert!(approx(b.y, 12.5));
        assert!(approx(b.width, 200.0));
        assert!(approx(b.height, 25.0));
    }

    #[test]
    fn test_bounds_rotated_quarter_turn() {
        let mut el = Element::rect(0.0, 0.0, 100.0, 50.0);
        el.frame.rotation = 90.0;
        let b = el.bounds();
        // Rotating around the center (50, 25) swaps width and height.
        assert!(approx(b.x, 25.0));
        assert!(approx(b.y, -25.0));
        assert!(approx(b.width, 50.0));
        assert!(approx(b.height, 100.0));
    }

    #[test]
    fn test_contains_point_respects_rotation() {
        let mut el = Element::rect(0.0, 0.0, 100.0, 20.0);
        assert!(el.contains_point(Point::new(90.0, 10.0)));
        el.frame.rotation = 90.0;
        // Now a vertical bar centered on (50, 10).
        assert!(!el.contains_point(Point::new(90.0, 10.0)));
        assert!(el.contains_point(Point::new(50.0, 50.0)));
    }

    #[test]
    fn test_patch_merges_and_bumps_version() {
        let mut el = Element::rect(0.0, 0.0, 10.0, 10.0);
        let v = el.version;
        ElementPatch::position(5.0, 6.0).apply(&mut el, 42);
        assert_eq!(el.frame, Frame::new(5.0, 6.0, 10.0, 10.0));
        assert_eq!(el.version, v + 1);
        assert_eq!(el.updated_at, 42);
    }

    #[test]
    fn test_patch_clears_cache_key() {
        let mut el = Element::rect(0.0, 0.0, 10.0, 10.0);
        el.cache_key = Some("k".into());
        ElementPatch::default().apply(&mut el, 0);
        assert_eq!(el.cache_key.as_deref(), Some("k"));
        ElementPatch {
            cache_key: Some(None),
            ..ElementPatch::default()
        }
        .apply(&mut el, 0);
        assert!(el.cache_key.is_none());
    }

    #[test]
    fn test_rich_text_later_span_wins() {
        let mut text = TextContent::plain("hello world");
        text.spans.push(RichTextSpan {
            range: TextRange { start: 0, end: 5 },
            style: TextStyleOverride {
                font_weight: Some(FontWeight::Bold),
                color: Some("#FF0000".into()),
                ..TextStyleOverride::default()
            },
        });
        text.spans.push(RichTextSpan {
            range: TextRange { start: 3, end: 8 },
            style: TextStyleOverride {
                color: Some("#00FF00".into()),
                ..TextStyleOverride::default()
            },
        });
        let s0 = text.style_at(0);
        assert_eq!(s0.font_weight, FontWeight::Bold);
        assert_eq!(s0.color, "#FF0000");
        let s4 = text.style_at(4);
        assert_eq!(s4.font_weight, FontWeight::Bold);
        assert_eq!(s4.color, "#00FF00");
        let s5 = text.style_at(5);
        assert_eq!(s5.font_weight, FontWeight::Normal);
        assert_eq!(text.style_at(9).color, "#000000");
    }

    #[test]
    fn test_kind_serde_tagging() {
        let el = Element::new(ElementKind::Circle);
        let json = serde_json::to_value(&el).expect("serialize");
        assert_eq!(json["kind"]["type"], "circle");
        let back: Element = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, el);
    }

    #[test]
    fn test_element_id_parse_display() {
        let id = ElementId::new();
        let parsed = ElementId::parse(&id.to_string()).expect("valid uuid");
        assert_eq!(id, parsed);
        assert!(ElementId::parse("not-a-uuid").is_err());
    }
}
