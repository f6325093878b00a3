//! Font presets and lookup for the text overlay.
//!
//! Fonts are resolved in this order:
//! 1. Faces registered on the [`FontBook`] by the caller
//! 2. The installed system fonts, queried through `fontdb` by family name
//! 3. Common faces of the family's class (sans, serif, mono), then the
//!    generic family
//!
//! Bold faces are preferred. When only a regular face resolves, the text
//! stage double-strikes the glyphs instead.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use ab_glyph::{FontArc, FontVec};
use resvg::usvg::fontdb::{self, Database, Family, Query, Weight};
use serde::{Deserialize, Serialize};

use crate::error::{MockupError, MockupResult};

/// Font family presets offered for the text layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    #[default]
    Inter,
    Roboto,
    OpenSans,
    Montserrat,
    Poppins,
    Lato,
    Oswald,
    Raleway,
    PlayfairDisplay,
    Merriweather,
    RobotoMono,
    Georgia,
    Arial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FontClass {
    Sans,
    Serif,
    Mono,
}

impl FontFamily {
    pub const ALL: [FontFamily; 13] = [
        Self::Inter,
        Self::Roboto,
        Self::OpenSans,
        Self::Montserrat,
        Self::Poppins,
        Self::Lato,
        Self::Oswald,
        Self::Raleway,
        Self::PlayfairDisplay,
        Self::Merriweather,
        Self::RobotoMono,
        Self::Georgia,
        Self::Arial,
    ];

    /// Human-readable family name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Inter => "Inter",
            Self::Roboto => "Roboto",
            Self::OpenSans => "Open Sans",
            Self::Montserrat => "Montserrat",
            Self::Poppins => "Poppins",
            Self::Lato => "Lato",
            Self::Oswald => "Oswald",
            Self::Raleway => "Raleway",
            Self::PlayfairDisplay => "Playfair Display",
            Self::Merriweather => "Merriweather",
            Self::RobotoMono => "Roboto Mono",
            Self::Georgia => "Georgia",
            Self::Arial => "Arial",
        }
    }

    fn class(self) -> FontClass {
        match self {
            Self::PlayfairDisplay | Self::Merriweather | Self::Georgia => FontClass::Serif,
            Self::RobotoMono => FontClass::Mono,
            _ => FontClass::Sans,
        }
    }
}

impl FontClass {
    /// Widely installed faces tried after the preset itself.
    fn fallbacks(self) -> &'static [&'static str] {
        match self {
            Self::Sans => &["DejaVu Sans", "Liberation Sans", "Noto Sans", "Helvetica", "Arial"],
            Self::Serif => &["DejaVu Serif", "Liberation Serif", "Noto Serif", "Times New Roman", "Times"],
            Self::Mono => &["DejaVu Sans Mono", "Liberation Mono", "Noto Sans Mono", "Menlo", "Courier New"],
        }
    }

    fn generic(self) -> Family<'static> {
        match self {
            Self::Sans => Family::SansSerif,
            Self::Serif => Family::Serif,
            Self::Mono => Family::Monospace,
        }
    }
}

/// A parsed font face together with its weight.
#[derive(Clone, Debug)]
pub struct LoadedFont {
    pub font: FontArc,
    /// `false` when the face is a regular weight standing in for bold.
    pub bold: bool,
}

/// Registry of font faces available to the text overlay.
#[derive(Default)]
pub struct FontBook {
    registered: HashMap<FontFamily, LoadedFont>,
    use_system: bool,
    resolved: Mutex<HashMap<FontFamily, Option<LoadedFont>>>,
}

impl FontBook {
    /// Creates a font book that falls back to the installed system fonts.
    pub fn new() -> Self {
        Self {
            use_system: true,
            ..Self::default()
        }
    }

    /// Creates a font book that only knows about registered faces.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registers a TrueType/OpenType face for a family preset.
    pub fn register(&mut self, family: FontFamily, bytes: Vec<u8>, bold: bool) -> MockupResult<()> {
        let font = FontArc::try_from_vec(bytes).map_err(|e| {
            MockupError::font(format!("invalid font data for {}: {e}", family.display_name()))
        })?;
        self.registered.insert(family, LoadedFont { font, bold });
        if let Ok(mut cache) = self.resolved.lock() {
            cache.remove(&family);
        }
        Ok(())
    }

    /// Resolves a face for the family, or `None` when nothing usable exists.
    pub fn resolve(&self, family: FontFamily) -> Option<LoadedFont> {
        if let Some(font) = self.registered.get(&family) {
            return Some(font.clone());
        }
        if !self.use_system {
            return None;
        }

        let mut cache = self.resolved.lock().ok()?;
        cache
            .entry(family)
            .or_insert_with(|| load_system_font(family))
            .clone()
    }
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("registered", &self.registered.keys().collect::<Vec<_>>())
            .field("use_system", &self.use_system)
            .finish()
    }
}

/// Family names queried for a preset, most specific first.
fn family_names(family: FontFamily) -> Vec<&'static str> {
    let mut names = vec![family.display_name()];
    names.extend_from_slice(family.class().fallbacks());
    names
}

fn load_system_font(family: FontFamily) -> Option<LoadedFont> {
    let db = system_fonts();
    let mut families: Vec<Family<'_>> = family_names(family).into_iter().map(Family::Name).collect();
    families.push(family.class().generic());

    let query = Query {
        families: &families,
        weight: Weight::BOLD,
        stretch: fontdb::Stretch::Normal,
        style: fontdb::Style::Normal,
    };
    let Some(id) = db.query(&query) else {
        tracing::warn!(family = family.display_name(), "no font face found");
        return None;
    };
    let loaded = load_face(db, id);
    if loaded.is_none() {
        tracing::warn!(family = family.display_name(), "matched font face could not be parsed");
    }
    loaded
}

/// Parses a face from the database, collections included.
fn load_face(db: &Database, id: fontdb::ID) -> Option<LoadedFont> {
    let info = db.face(id)?;
    let bold = info.weight >= Weight::SEMIBOLD;
    let font = db
        .with_face_data(id, |data, index| {
            FontVec::try_from_vec_and_index(data.to_vec(), index).ok()
        })
        .flatten()?;

    tracing::debug!(
        family = info.families.first().map(|(name, _)| name.as_str()).unwrap_or_default(),
        index = info.index,
        bold,
        "resolved font"
    );
    Some(LoadedFont {
        font: FontArc::new(font),
        bold,
    })
}

/// Process-wide index of the installed system fonts, built on first use.
fn system_fonts() -> &'static Database {
    static FONTS: OnceLock<Database> = OnceLock::new();
    FONTS.get_or_init(|| {
        let mut db = Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "indexed system fonts");
        db
    })
}
