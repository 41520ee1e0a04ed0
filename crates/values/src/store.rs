//! The Resource Value Store.
//!
//! One store lives for one conversion run. Every table is write-once per
//! value: the first caller fixes the name, later callers with the same value
//! get the same name back, and a different value that slugs to a taken name
//! gets the next free `_N` suffix.

use crate::ValueError;
use crate::drawable::Drawable;
use crate::palette::Palette;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use weft_types::{Color, ResourceName};

/// Names that cannot start a generated resource identifier.
const RESERVED: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "false", "final",
    "finally", "float", "for", "goto", "if", "implements", "import", "instanceof", "int",
    "interface", "long", "native", "new", "null", "package", "private", "protected", "public",
    "return", "short", "static", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "true", "try", "void", "volatile", "while",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValueConfig {
    /// Words kept from a slugged string value.
    pub max_slug_words: usize,
    /// Prepended to names that would start with a digit or a keyword.
    pub reserved_prefix: String,
}

impl Default for ValueConfig {
    fn default() -> Self {
        Self {
            max_slug_words: 4,
            reserved_prefix: "s_".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimenUnit {
    Dp,
    Sp,
    Px,
}

impl DimenUnit {
    pub fn suffix(&self) -> &'static str {
        match self {
            DimenUnit::Dp => "dp",
            DimenUnit::Sp => "sp",
            DimenUnit::Px => "px",
        }
    }
}

/// Integral values print without a fraction, others with at most two
/// decimals.
pub fn format_number(value: f32) -> String {
    let rounded = value.round();
    if (value - rounded).abs() < 0.005 {
        let int = rounded as i64;
        return int.to_string();
    }
    let text = format!("{:.2}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn claim_free(base: &str, suffixed: bool, taken: impl Fn(&str) -> bool) -> String {
    if !suffixed && !taken(base) {
        return base.to_string();
    }
    let mut n = 1usize;
    loop {
        let candidate = format!("{}_{}", base, n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[derive(Debug, Clone)]
struct Table<V> {
    by_key: HashMap<String, ResourceName>,
    taken: HashSet<String>,
    entries: Vec<(ResourceName, V)>,
}

impl<V> Default for Table<V> {
    fn default() -> Self {
        Self {
            by_key: HashMap::new(),
            taken: HashSet::new(),
            entries: Vec::new(),
        }
    }
}

impl<V> Table<V> {
    fn get(&self, key: &str) -> Option<ResourceName> {
        self.by_key.get(key).cloned()
    }

    /// `base` itself when free (unless `suffixed`), else `base_1`, `base_2`...
    fn claim(&self, base: &str, suffixed: bool) -> String {
        claim_free(base, suffixed, |name| self.taken.contains(name))
    }

    fn insert(&mut self, key: String, name: String, value: V) -> ResourceName {
        let name = ResourceName::new(name);
        self.taken.insert(name.as_str().to_string());
        self.by_key.insert(key, name.clone());
        self.entries.push((name.clone(), value));
        name
    }

    fn clear(&mut self) {
        self.by_key.clear();
        self.taken.clear();
        self.entries.clear();
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValueStore {
    config: ValueConfig,
    palette: Palette,
    strings: Table<String>,
    arrays: Table<Vec<String>>,
    colors: Table<Color>,
    fonts: Table<String>,
    dimensions: Table<String>,
    drawables: Table<Drawable>,
}

impl ValueStore {
    pub fn new(config: ValueConfig, palette: Palette) -> Self {
        Self {
            config,
            palette,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &ValueConfig {
        &self.config
    }

    /// Drops every interned value. Only called between independent runs.
    pub fn reset(&mut self) {
        self.strings.clear();
        self.arrays.clear();
        self.colors.clear();
        self.fonts.clear();
        self.dimensions.clear();
        self.drawables.clear();
    }

    fn slug_name(&self, text: &str, fallback: &str) -> String {
        let slug = slug::slugify(text);
        let mut name = slug
            .split('-')
            .filter(|w| !w.is_empty())
            .take(self.config.max_slug_words.max(1))
            .collect::<Vec<_>>()
            .join("_");
        if name.is_empty() {
            name = fallback.to_string();
        }
        if name.starts_with(|c: char| c.is_ascii_digit()) || RESERVED.contains(&name.as_str()) {
            name = format!("{}{}", self.config.reserved_prefix, name);
        }
        name
    }

    /// Font families are emitted as `<string>` resources too, so both tables
    /// draw from one name space.
    fn claim_string_name(&self, base: &str) -> String {
        claim_free(base, false, |name| {
            self.strings.taken.contains(name) || self.fonts.taken.contains(name)
        })
    }

    pub fn string(&mut self, value: &str) -> ResourceName {
        if let Some(name) = self.strings.get(value) {
            return name;
        }
        let base = self.slug_name(value, "string");
        let name = self.claim_string_name(&base);
        self.strings.insert(value.to_string(), name, value.to_string())
    }

    /// Interns an ordered list such as the options of a `select`.
    pub fn string_array(&mut self, hint: &str, items: &[String]) -> ResourceName {
        let key = items.join("\u{1f}");
        if let Some(name) = self.arrays.get(&key) {
            return name;
        }
        let base = self.slug_name(&format!("{} entries", hint), "array");
        let name = self.arrays.claim(&base, false);
        self.arrays.insert(key, name, items.to_vec())
    }

    /// Names a color after its nearest palette entry. Only an exact match
    /// (channels and alpha) reuses the palette name itself.
    pub fn color(&mut self, color: Color) -> ResourceName {
        let key = color.to_hex();
        if let Some(name) = self.colors.get(&key) {
            return name;
        }
        let name = match self.palette.nearest(&color) {
            Some((palette_name, reference)) => {
                let base = self.slug_name(palette_name, "color");
                self.colors.claim(&base, reference != color)
            }
            None => self.colors.claim("color", true),
        };
        debug!("Interned color {} as {}", key, name);
        self.colors.insert(key, name, color)
    }

    pub fn font(&mut self, family: &str) -> ResourceName {
        let family = family.trim();
        let key = family.to_lowercase();
        if let Some(name) = self.fonts.get(&key) {
            return name;
        }
        let base = self.slug_name(&format!("font {}", family), "font");
        let name = self.claim_string_name(&base);
        self.fonts.insert(key, name, family.to_string())
    }

    pub fn dimension(&mut self, value: f32, unit: DimenUnit) -> ResourceName {
        let text = format!("{}{}", format_number(value), unit.suffix());
        if let Some(name) = self.dimensions.get(&text) {
            return name;
        }
        let base = format!("dimen_{}", text.replace('-', "neg_").replace('.', "_"));
        let name = self.dimensions.claim(&base, false);
        self.dimensions.insert(text.clone(), name, text)
    }

    pub fn drawable(&mut self, drawable: Drawable) -> Result<ResourceName, ValueError> {
        let key = drawable.key()?;
        if let Some(name) = self.drawables.get(&key) {
            return Ok(name);
        }
        let base = self.slug_name(&drawable.name_hint(), "drawable");
        let name = self.drawables.claim(&base, false);
        Ok(self.drawables.insert(key, name, drawable))
    }

    pub fn strings(&self) -> &[(ResourceName, String)] {
        &self.strings.entries
    }

    pub fn arrays(&self) -> &[(ResourceName, Vec<String>)] {
        &self.arrays.entries
    }

    pub fn colors(&self) -> &[(ResourceName, Color)] {
        &self.colors.entries
    }

    pub fn fonts(&self) -> &[(ResourceName, String)] {
        &self.fonts.entries
    }

    pub fn dimensions(&self) -> &[(ResourceName, String)] {
        &self.dimensions.entries
    }

    pub fn drawables(&self) -> &[(ResourceName, Drawable)] {
        &self.drawables.entries
    }

    /// The stored drawable behind a name.
    pub fn drawable_named(&self, name: &str) -> Option<&Drawable> {
        self.drawables
            .entries
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, d)| d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strings_slug_and_cap_words() {
        let mut store = ValueStore::default();
        assert_eq!(store.string("Hello, World!").as_str(), "hello_world");
        assert_eq!(
            store.string("The quick brown fox jumps").as_str(),
            "the_quick_brown_fox"
        );
        assert_eq!(store.string("!!!").as_str(), "string");
    }

    #[test]
    fn test_strings_escape_digits_and_keywords() {
        let mut store = ValueStore::default();
        assert_eq!(store.string("3 items").as_str(), "s_3_items");
        assert_eq!(store.string("Class").as_str(), "s_class");
    }

    #[test]
    fn test_fonts_and_strings_never_share_a_name() {
        let mut store = ValueStore::default();
        let text = store.string("Font Roboto");
        let font = store.font("Roboto");
        assert_eq!(text.as_str(), "font_roboto");
        assert_eq!(font.as_str(), "font_roboto_1");

        let mut store = ValueStore::default();
        let font = store.font("Roboto");
        let text = store.string("Font Roboto");
        assert_ne!(font, text);
        assert_eq!(store.font("roboto"), font);
    }

    #[test]
    fn test_string_collisions_get_suffixes() {
        let mut store = ValueStore::default();
        let first = store.string("hello world");
        let second = store.string("Hello-World");
        let again = store.string("hello world");
        assert_eq!(first.as_str(), "hello_world");
        assert_eq!(second.as_str(), "hello_world_1");
        assert_eq!(again, first);
        assert_eq!(store.strings().len(), 2);
    }

    #[test]
    fn test_repeated_color_is_interned_once() {
        let mut store = ValueStore::default();
        let names: Vec<_> = (0..10)
            .map(|_| store.color(Color::parse("#FF0000").unwrap()))
            .collect();
        assert!(names.iter().all(|n| n.as_str() == "red"));
        assert_eq!(store.colors().len(), 1);
    }

    #[test]
    fn test_near_colors_derive_from_palette_name() {
        let mut store = ValueStore::default();
        assert_eq!(store.color(Color::rgb(254, 0, 0)).as_str(), "red_1");
        assert_eq!(store.color(Color::rgb(253, 0, 0)).as_str(), "red_2");
        assert_eq!(store.color(Color::rgba(255, 0, 0, 0.5)).as_str(), "red_3");
        assert_eq!(store.color(Color::rgb(255, 0, 0)).as_str(), "red");
    }

    #[test]
    fn test_dimensions_and_fonts() {
        let mut store = ValueStore::default();
        assert_eq!(store.dimension(16.0, DimenUnit::Dp).as_str(), "dimen_16dp");
        assert_eq!(store.dimension(12.5, DimenUnit::Sp).as_str(), "dimen_12_5sp");
        assert_eq!(store.dimension(-4.0, DimenUnit::Dp).as_str(), "dimen_neg_4dp");
        assert_eq!(store.font("Open Sans").as_str(), "font_open_sans");
        assert_eq!(store.font("open sans"), store.font("Open Sans"));
    }

    #[test]
    fn test_reset_forgets_everything() {
        let mut store = ValueStore::default();
        store.string("hello");
        store.color(Color::rgb(1, 2, 3));
        store.reset();
        assert!(store.strings().is_empty());
        assert!(store.colors().is_empty());
        assert_eq!(store.string("hello").as_str(), "hello");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(16.0), "16");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(format_number(0.333), "0.33");
    }
}
