//! Serializable render settings, text layer and profile.
//!
//! A [`MockupProfile`] captures everything an external UI can set in a
//! format that round-trips through JSON.
//!
//! # Example
//!
//! ```
//! use mockup_renderer::{AspectRatio, BackgroundSpec, HexColor, MockupProfile, RenderSettings};
//!
//! let settings = RenderSettings {
//!     padding: 60.0,
//!     aspect_ratio: AspectRatio::Square,
//!     background: BackgroundSpec::Solid { color: HexColor::WHITE },
//!     ..RenderSettings::default()
//! };
//! let profile = MockupProfile::new(settings);
//!
//! let json = profile.to_json().unwrap();
//! let restored = MockupProfile::from_json(&json).unwrap();
//! assert_eq!(restored.settings.aspect_ratio, AspectRatio::Square);
//! ```

use std::fmt;
use std::str::FromStr;

use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::error::MockupError;
use crate::font::FontFamily;

// ============================================================================
// HexColor
// ============================================================================

/// An opaque sRGB colour, written as `#rrggbb` in profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const BLACK: Self = Self::rgb(0x000000);
    pub const WHITE: Self = Self::rgb(0xffffff);

    /// Builds a colour from a packed `0xRRGGBB` value.
    pub const fn rgb(packed: u32) -> Self {
        Self {
            r: (packed >> 16) as u8,
            g: (packed >> 8) as u8,
            b: packed as u8,
        }
    }

    /// Parses `#rgb`, `#rrggbb`, or the same without the leading `#`.
    pub fn parse(value: &str) -> Result<Self, MockupError> {
        let parsed: Srgb<u8> = value
            .trim()
            .parse()
            .map_err(|_| MockupError::InvalidColor {
                value: value.to_string(),
            })?;
        Ok(Self {
            r: parsed.red,
            g: parsed.green,
            b: parsed.blue,
        })
    }

    /// Converts to a tiny-skia colour with the given alpha (0.0-1.0).
    pub fn to_skia(self, alpha: f32) -> resvg::tiny_skia::Color {
        resvg::tiny_skia::Color::from_rgba8(
            self.r,
            self.g,
            self.b,
            (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
        )
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for HexColor {
    type Err = MockupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for HexColor {
    type Error = MockupError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

// ============================================================================
// BackgroundSpec
// ============================================================================

/// How the canvas behind the object is filled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BackgroundSpec {
    /// A flat colour.
    Solid { color: HexColor },

    /// A two-stop gradient from the top-left to the bottom-right corner.
    Gradient { from: HexColor, to: HexColor },

    /// A colour picked by the user, optionally extended into a gradient.
    #[serde(rename_all = "camelCase")]
    Custom {
        color: HexColor,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        second: Option<HexColor>,
        #[serde(default)]
        is_gradient: bool,
    },
}

/// The fill a [`BackgroundSpec`] resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedFill {
    Solid(HexColor),
    Gradient(HexColor, HexColor),
}

impl BackgroundSpec {
    /// Collapses the variants into the fill that actually gets painted.
    ///
    /// A custom background only becomes a gradient when the toggle is on
    /// and a second colour was picked.
    pub fn resolve(&self) -> ResolvedFill {
        match *self {
            Self::Solid { color } => ResolvedFill::Solid(color),
            Self::Gradient { from, to } => ResolvedFill::Gradient(from, to),
            Self::Custom {
                color,
                second: Some(second),
                is_gradient: true,
            } => ResolvedFill::Gradient(color, second),
            Self::Custom { color, .. } => ResolvedFill::Solid(color),
        }
    }
}

impl Default for BackgroundSpec {
    fn default() -> Self {
        BACKGROUND_PRESETS[0].spec
    }
}

/// A named entry of the background palette.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundPreset {
    pub name: &'static str,
    pub spec: BackgroundSpec,
}

const fn gradient(name: &'static str, from: u32, to: u32) -> BackgroundPreset {
    BackgroundPreset {
        name,
        spec: BackgroundSpec::Gradient {
            from: HexColor::rgb(from),
            to: HexColor::rgb(to),
        },
    }
}

const fn solid(name: &'static str, color: u32) -> BackgroundPreset {
    BackgroundPreset {
        name,
        spec: BackgroundSpec::Solid {
            color: HexColor::rgb(color),
        },
    }
}

/// The fixed palette offered next to the custom colour picker.
pub const BACKGROUND_PRESETS: [BackgroundPreset; 24] = [
    gradient("sunset", 0xff7e5f, 0xfeb47b),
    gradient("ocean", 0x2e3192, 0x1bffff),
    gradient("grape", 0x8e2de2, 0x4a00e0),
    gradient("peach", 0xffecd2, 0xfcb69f),
    gradient("mint", 0x43e97b, 0x38f9d7),
    gradient("flamingo", 0xf093fb, 0xf5576c),
    gradient("sky", 0x4facfe, 0x00f2fe),
    gradient("lavender", 0xa18cd1, 0xfbc2eb),
    gradient("midnight", 0x232526, 0x414345),
    gradient("candy", 0xff9a9e, 0xfecfef),
    gradient("forest", 0x134e5e, 0x71b280),
    gradient("ember", 0xf12711, 0xf5af19),
    gradient("aurora", 0x00c9ff, 0x92fe9d),
    gradient("dusk", 0x2c3e50, 0xfd746c),
    gradient("citrus", 0xf7971e, 0xffd200),
    gradient("royal", 0x141e30, 0x243b55),
    solid("white", 0xffffff),
    solid("snow", 0xf5f5f7),
    solid("slate", 0x64748b),
    solid("charcoal", 0x1f2937),
    solid("black", 0x000000),
    solid("cream", 0xfdf6e3),
    solid("coral", 0xff6f61),
    solid("navy", 0x1e3a8a),
];

/// Returns the background palette.
pub fn background_presets() -> &'static [BackgroundPreset] {
    &BACKGROUND_PRESETS
}

// ============================================================================
// AspectRatio
// ============================================================================

/// Output canvas aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    /// Canvas hugs the padded object.
    #[default]
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:5")]
    Portrait4x5,
    #[serde(rename = "16:9")]
    Widescreen,
    #[serde(rename = "1.91:1")]
    Landscape191,
    #[serde(rename = "3:2")]
    Photo3x2,
    #[serde(rename = "4:3")]
    Classic4x3,
    #[serde(rename = "9:16")]
    Story,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 8] = [
        Self::Auto,
        Self::Square,
        Self::Portrait4x5,
        Self::Widescreen,
        Self::Landscape191,
        Self::Photo3x2,
        Self::Classic4x3,
        Self::Story,
    ];

    /// Width divided by height, or `None` for [`AspectRatio::Auto`].
    pub fn target(self) -> Option<f32> {
        match self {
            Self::Auto => None,
            Self::Square => Some(1.0),
            Self::Portrait4x5 => Some(0.8),
            Self::Widescreen => Some(16.0 / 9.0),
            Self::Landscape191 => Some(1.91),
            Self::Photo3x2 => Some(1.5),
            Self::Classic4x3 => Some(4.0 / 3.0),
            Self::Story => Some(9.0 / 16.0),
        }
    }
}

// ============================================================================
// RenderSettings
// ============================================================================

/// Every knob that shapes the rendered mockup.
///
/// Sizes are in reference pixels: units defined against an 800px-wide image
/// and scaled to the actual image width at layout time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderSettings {
    /// Space around the object (0-120).
    pub padding: f32,

    /// Corner radius of the object (0-60).
    pub inner_roundness: f32,

    /// Corner radius of the canvas itself (0-60).
    pub outer_roundness: f32,

    /// Drop shadow strength (0-100).
    pub shadow_intensity: f32,

    pub shadow_color: HexColor,

    /// Mirrored reflection strength (0-100).
    pub reflection_intensity: f32,

    /// Draw a title bar with traffic-light buttons above the image.
    pub window_chrome_enabled: bool,

    pub glass_enabled: bool,

    /// How far the glass halo extends past the object (0-200).
    pub glass_spread: f32,

    pub background: BackgroundSpec,

    pub aspect_ratio: AspectRatio,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            padding: 40.0,
            inner_roundness: 12.0,
            outer_roundness: 0.0,
            shadow_intensity: 40.0,
            shadow_color: HexColor::BLACK,
            reflection_intensity: 0.0,
            window_chrome_enabled: false,
            glass_enabled: false,
            glass_spread: 40.0,
            background: BackgroundSpec::default(),
            aspect_ratio: AspectRatio::Auto,
        }
    }
}

fn clamp_range(value: f32, max: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, max) }
}

impl RenderSettings {
    /// Returns a copy with every numeric field forced into its UI range.
    pub fn clamped(&self) -> Self {
        Self {
            padding: clamp_range(self.padding, 120.0),
            inner_roundness: clamp_range(self.inner_roundness, 60.0),
            outer_roundness: clamp_range(self.outer_roundness, 60.0),
            shadow_intensity: clamp_range(self.shadow_intensity, 100.0),
            reflection_intensity: clamp_range(self.reflection_intensity, 100.0),
            glass_spread: clamp_range(self.glass_spread, 200.0),
            ..self.clone()
        }
    }
}

// ============================================================================
// TextLayer
// ============================================================================

/// A single line of text positioned in canvas percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextLayer {
    pub text: String,
    pub color: HexColor,
    /// Font size in 1000px-reference units (20-400).
    pub font_size: f32,
    /// Horizontal centre, 0-100% of canvas width.
    pub x_percent: f32,
    /// Vertical centre, 0-100% of canvas height.
    pub y_percent: f32,
    pub font_family: FontFamily,
}

impl Default for TextLayer {
    fn default() -> Self {
        Self {
            text: String::new(),
            color: HexColor::WHITE,
            font_size: 80.0,
            x_percent: 50.0,
            y_percent: 10.0,
            font_family: FontFamily::default(),
        }
    }
}

impl TextLayer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Returns true if there is something to draw.
    pub fn is_visible(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Moves the text centre, clamping both axes to 0-100%.
    pub fn set_position(&mut self, x_percent: f32, y_percent: f32) {
        self.x_percent = clamp_range(x_percent, 100.0);
        self.y_percent = clamp_range(y_percent, 100.0);
    }

    /// Returns a copy with position and font size in their valid ranges.
    pub fn clamped(&self) -> Self {
        let mut out = self.clone();
        out.set_position(self.x_percent, self.y_percent);
        out.font_size = if self.font_size.is_nan() {
            20.0
        } else {
            self.font_size.clamp(20.0, 400.0)
        };
        out
    }
}

/// Tracks a pointer drag of the interactive text overlay.
///
/// Pointer deltas are converted to percentages of the on-screen container
/// and added to the position captured when the drag started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextDrag {
    start_x: f32,
    start_y: f32,
}

impl TextDrag {
    pub fn begin(layer: &TextLayer) -> Self {
        Self {
            start_x: layer.x_percent,
            start_y: layer.y_percent,
        }
    }

    /// Returns the clamped `(x%, y%)` for a pointer delta in container pixels.
    pub fn position(&self, dx: f32, dy: f32, container_width: f32, container_height: f32) -> (f32, f32) {
        let to_percent = |delta: f32, extent: f32| {
            if extent > 0.0 { delta / extent * 100.0 } else { 0.0 }
        };
        (
            clamp_range(self.start_x + to_percent(dx, container_width), 100.0),
            clamp_range(self.start_y + to_percent(dy, container_height), 100.0),
        )
    }

    /// Applies the drag delta to the layer.
    pub fn apply(&self, layer: &mut TextLayer, dx: f32, dy: f32, container_width: f32, container_height: f32) {
        let (x, y) = self.position(dx, dy, container_width, container_height);
        layer.set_position(x, y);
    }
}

// ============================================================================
// MockupProfile
// ============================================================================

/// All user-facing state in one JSON-friendly document.
///
/// # JSON Format
///
/// ```json
/// {
///   "settings": {
///     "padding": 60.0,
///     "innerRoundness": 12.0,
///     "background": { "type": "gradient", "from": "#ff7e5f", "to": "#feb47b" },
///     "aspectRatio": "16:9"
///   },
///   "text": { "text": "Launch day", "color": "#ffffff", "xPercent": 50.0 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MockupProfile {
    pub settings: RenderSettings,

    /// Text overlay. `None` means no text layer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextLayer>,
}

impl MockupProfile {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            text: None,
        }
    }

    pub fn with_text(mut self, text: TextLayer) -> Self {
        self.text = Some(text);
        self
    }

    /// Serializes the profile to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the profile to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes a profile from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ============================================================================
// Tests
// ============================================================================
