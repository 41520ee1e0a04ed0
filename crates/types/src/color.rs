use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

fn default_one() -> f32 {
    1.0
}

fn is_one(num: &f32) -> bool {
    *num == 1.0
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(skip_serializing_if = "is_one", default = "default_one")]
    pub a: f32,
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.r.hash(state);
        self.g.hash(state);
        self.b.hash(state);
        self.a.to_bits().hash(state);
    }
}

impl Default for Color {
    fn default() -> Self {
        Self { r: 0, g: 0, b: 0, a: 1.0 }
    }
}

/// Keywords a computed style can still report instead of a numeric color.
const NAMED: &[(&str, (u8, u8, u8))] = &[
    ("black", (0, 0, 0)),
    ("white", (255, 255, 255)),
    ("red", (255, 0, 0)),
    ("green", (0, 128, 0)),
    ("blue", (0, 0, 255)),
    ("gray", (128, 128, 128)),
    ("grey", (128, 128, 128)),
    ("silver", (192, 192, 192)),
    ("maroon", (128, 0, 0)),
    ("yellow", (255, 255, 0)),
    ("olive", (128, 128, 0)),
    ("lime", (0, 255, 0)),
    ("aqua", (0, 255, 255)),
    ("teal", (0, 128, 128)),
    ("navy", (0, 0, 128)),
    ("fuchsia", (255, 0, 255)),
    ("purple", (128, 0, 128)),
    ("orange", (255, 165, 0)),
];

impl Color {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r,
            g,
            b,
            a: a.clamp(0.0, 1.0),
        }
    }

    pub fn gray(value: u8) -> Self {
        Self { r: value, g: value, b: value, a: 1.0 }
    }

    pub fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0.0 }
    }

    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }

    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }

    /// Alpha channel as a byte (0 = fully transparent).
    pub fn alpha_byte(&self) -> u8 {
        (self.a.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    /// Uppercase `#RRGGBB`, dropping alpha.
    pub fn to_rgb_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Uppercase `#RRGGBB` for opaque colors, `#AARRGGBB` once opacity drops below 1.
    pub fn to_hex(&self) -> String {
        if self.is_opaque() {
            self.to_rgb_hex()
        } else {
            format!(
                "#{:02X}{:02X}{:02X}{:02X}",
                self.alpha_byte(),
                self.r,
                self.g,
                self.b
            )
        }
    }

    /// Folds an extra opacity factor into the alpha channel.
    pub fn with_opacity(self, opacity: f32) -> Self {
        Self {
            a: (self.a * opacity).clamp(0.0, 1.0),
            ..self
        }
    }

    /// Squared euclidean distance in RGB space, alpha ignored.
    pub fn distance_sq(&self, other: &Color) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }

    /// Parses a resolved color value: `#RGB`, `#RRGGBB`, `#RRGGBBAA`,
    /// `rgb(r, g, b)`, `rgba(r, g, b, a)`, `transparent` or a basic keyword.
    pub fn parse(s: &str) -> Result<Color, String> {
        let s = s.trim();
        if s.starts_with('#') {
            return Self::parse_hex(s);
        }
        let lower = s.to_ascii_lowercase();
        if lower == "transparent" {
            return Ok(Color::transparent());
        }
        if let Some(body) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
        {
            return Self::parse_functional(body);
        }
        NAMED
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, (r, g, b))| Color::rgb(*r, *g, *b))
            .ok_or_else(|| format!("Unrecognised color value: {}", s))
    }

    fn parse_functional(body: &str) -> Result<Color, String> {
        let body = body
            .strip_suffix(')')
            .ok_or_else(|| format!("Unterminated color function: {}", body))?;
        let parts: Vec<&str> = body
            .split([',', '/', ' '])
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if parts.len() != 3 && parts.len() != 4 {
            return Err(format!(
                "Invalid color function: expected 3 or 4 components, got {}",
                parts.len()
            ));
        }
        let channel = |p: &str| -> Result<u8, String> {
            let v = p
                .parse::<f32>()
                .map_err(|e| format!("Invalid color component '{}': {}", p, e))?;
            Ok(v.round().clamp(0.0, 255.0) as u8)
        };
        let a = match parts.get(3) {
            Some(p) => match p.strip_suffix('%') {
                Some(pct) => pct
                    .parse::<f32>()
                    .map(|v| v / 100.0)
                    .map_err(|e| format!("Invalid alpha '{}': {}", p, e))?,
                None => p
                    .parse::<f32>()
                    .map_err(|e| format!("Invalid alpha '{}': {}", p, e))?,
            },
            None => 1.0,
        };
        Ok(Color::rgba(
            channel(parts[0])?,
            channel(parts[1])?,
            channel(parts[2])?,
            a,
        ))
    }

    /// Parse a hex color string (#RGB, #RRGGBB or #RRGGBBAA format)
    fn parse_hex(s: &str) -> Result<Color, String> {
        let s = s.trim();
        if !s.starts_with('#') {
            return Err(format!("Color must start with #, got: {}", s));
        }
        let hex = &s[1..];
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("Invalid hex color: {}", s));
        }
        let component = |range: &str| {
            u8::from_str_radix(range, 16).map_err(|e| format!("Invalid hex component: {}", e))
        };

        match hex.len() {
            3 => {
                // #RGB format - expand each digit
                let r = component(&hex[0..1].repeat(2))?;
                let g = component(&hex[1..2].repeat(2))?;
                let b = component(&hex[2..3].repeat(2))?;
                Ok(Color::rgb(r, g, b))
            }
            6 => Ok(Color::rgb(
                component(&hex[0..2])?,
                component(&hex[2..4])?,
                component(&hex[4..6])?,
            )),
            8 => {
                // CSS order: alpha comes last
                let a = component(&hex[6..8])? as f32 / 255.0;
                Ok(Color::rgba(
                    component(&hex[0..2])?,
                    component(&hex[2..4])?,
                    component(&hex[4..6])?,
                    a,
                ))
            }
            _ => Err(format!(
                "Invalid hex color length: expected 3, 6 or 8, got {}",
                hex.len()
            )),
        }
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum ColorDef {
            Str(String),
            Map { r: u8, g: u8, b: u8, #[serde(default = "default_one")] a: f32 },
        }

        match ColorDef::deserialize(deserializer)? {
            ColorDef::Str(s) => Self::parse(&s).map_err(de::Error::custom),
            ColorDef::Map { r, g, b, a } => Ok(Color { r, g, b, a }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(Color::parse("#f00").unwrap(), Color::rgb(255, 0, 0));
        assert_eq!(Color::parse("#00FF00").unwrap(), Color::rgb(0, 255, 0));
        let translucent = Color::parse("#0000FF80").unwrap();
        assert_eq!(translucent.alpha_byte(), 0x80);
        assert!(Color::parse("#12345").is_err());
        assert!(Color::parse("#GG0000").is_err());
    }

    #[test]
    fn test_parse_functional_forms() {
        assert_eq!(
            Color::parse("rgb(255, 0, 0)").unwrap(),
            Color::rgb(255, 0, 0)
        );
        let c = Color::parse("rgba(0, 0, 0, 0.5)").unwrap();
        assert_eq!(c.alpha_byte(), 128);
        assert!(Color::parse("rgb(1, 2)").is_err());
    }

    #[test]
    fn test_named_and_transparent() {
        assert_eq!(Color::parse("Navy").unwrap(), Color::rgb(0, 0, 128));
        assert!(Color::parse("transparent").unwrap().is_transparent());
        assert!(Color::parse("chartreuse-ish").is_err());
    }

    #[test]
    fn test_hex_output_folds_alpha() {
        assert_eq!(Color::rgb(255, 0, 0).to_hex(), "#FF0000");
        assert_eq!(Color::rgb(255, 0, 0).with_opacity(0.5).to_hex(), "#80FF0000");
        assert_eq!(Color::rgb(255, 0, 0).with_opacity(0.5).to_rgb_hex(), "#FF0000");
    }

    #[test]
    fn test_deserialize_from_string_and_map() {
        let c: Color = serde_json::from_str(r##""#102030""##).unwrap();
        assert_eq!(c, Color::rgb(0x10, 0x20, 0x30));
        let c: Color = serde_json::from_str(r#"{"r": 1, "g": 2, "b": 3}"#).unwrap();
        assert_eq!(c, Color::rgb(1, 2, 3));
    }
}
