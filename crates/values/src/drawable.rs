//! Background descriptors that need a drawable resource.

use crate::ValueError;
use crate::store::format_number;
use crate::xml::{ANDROID_NS, XmlDoc};
use serde::{Deserialize, Serialize};
use weft_style::Gradient;
use weft_types::Color;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub width_dp: f32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Drawable {
    /// A rectangle with optional fill, border and rounded corners.
    Bordered {
        fill: Option<Color>,
        stroke: Option<Stroke>,
        radius_dp: f32,
    },
    Gradient(Gradient),
    /// A raster image referenced by its source path.
    Image(String),
}

impl Drawable {
    /// Interning key: the shape XML, or the image source.
    pub(crate) fn key(&self) -> Result<String, ValueError> {
        match self {
            Drawable::Image(src) => Ok(format!("image:{}", src)),
            _ => Ok(self.to_xml()?.unwrap_or_default()),
        }
    }

    pub(crate) fn name_hint(&self) -> String {
        match self {
            Drawable::Bordered { .. } => "shape".to_string(),
            Drawable::Gradient(_) => "gradient".to_string(),
            Drawable::Image(src) => {
                let file = src.rsplit('/').next().unwrap_or(src);
                let stem = file.split('.').next().unwrap_or(file);
                format!("img {}", stem)
            }
        }
    }

    /// Shape drawables serialise to their own XML file. Images are copied
    /// assets and have none.
    pub fn to_xml(&self) -> Result<Option<String>, ValueError> {
        let mut doc = XmlDoc::new()?;
        match self {
            Drawable::Image(_) => return Ok(None),
            Drawable::Bordered {
                fill,
                stroke,
                radius_dp,
            } => {
                doc.open(
                    "shape",
                    &[("xmlns:android", ANDROID_NS), ("android:shape", "rectangle")],
                )?;
                if let Some(fill) = fill {
                    doc.empty("solid", &[("android:color", fill.to_hex().as_str())])?;
                }
                if let Some(stroke) = stroke {
                    let width = format!("{}dp", format_number(stroke.width_dp));
                    let color = stroke.color.to_hex();
                    doc.empty(
                        "stroke",
                        &[("android:width", width.as_str()), ("android:color", color.as_str())],
                    )?;
                }
                if *radius_dp > 0.0 {
                    let radius = format!("{}dp", format_number(*radius_dp));
                    doc.empty("corners", &[("android:radius", radius.as_str())])?;
                }
            }
            Drawable::Gradient(gradient) => {
                doc.open(
                    "shape",
                    &[("xmlns:android", ANDROID_NS), ("android:shape", "rectangle")],
                )?;
                let angle = platform_angle(gradient.angle).to_string();
                let start = gradient.start.to_hex();
                let end = gradient.end.to_hex();
                let center = gradient.center.map(|c| c.to_hex());
                let mut attrs = vec![
                    ("android:type", "linear"),
                    ("android:angle", angle.as_str()),
                    ("android:startColor", start.as_str()),
                ];
                if let Some(center) = &center {
                    attrs.push(("android:centerColor", center.as_str()));
                }
                attrs.push(("android:endColor", end.as_str()));
                doc.empty("gradient", &attrs)?;
            }
        }
        doc.close("shape")?;
        Ok(Some(doc.finish()?))
    }
}

/// CSS measures clockwise from "to top"; the platform measures
/// counter-clockwise from "to right" in steps of 45 degrees.
fn platform_angle(css: f32) -> i32 {
    let raw = (90.0 - css).rem_euclid(360.0);
    ((raw / 45.0).round() as i32 * 45) % 360
}
