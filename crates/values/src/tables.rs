//! Deterministic resource tables and their XML form.

use crate::ValueError;
use crate::dedup::StyleEntry;
use crate::drawable::Drawable;
use crate::store::ValueStore;
use crate::xml::XmlDoc;

/// Every named resource of a run, each table sorted case-insensitively by
/// name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceTables {
    pub strings: Vec<(String, String)>,
    pub arrays: Vec<(String, Vec<String>)>,
    pub colors: Vec<(String, String)>,
    pub dimens: Vec<(String, String)>,
    pub fonts: Vec<(String, String)>,
    pub styles: Vec<StyleEntry>,
    pub drawables: Vec<(String, Drawable)>,
}

fn sorted<V: Clone>(entries: impl Iterator<Item = (String, V)>) -> Vec<(String, V)> {
    let mut out: Vec<(String, V)> = entries.collect();
    out.sort_by(|a, b| {
        a.0.to_lowercase()
            .cmp(&b.0.to_lowercase())
            .then_with(|| a.0.cmp(&b.0))
    });
    out
}

/// Backslash-escapes what the platform string parser treats specially.
fn escape_string_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for (i, c) in value.chars().enumerate() {
        match c {
            '\\' | '\'' | '"' => {
                out.push('\\');
                out.push(c);
            }
            '@' | '?' if i == 0 => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

impl ResourceTables {
    pub fn collect(store: &ValueStore, styles: &[StyleEntry]) -> Self {
        let own = |name: &weft_types::ResourceName| name.as_str().to_string();
        let mut styles = styles.to_vec();
        styles.sort_by(|a, b| {
            a.name
                .as_str()
                .to_lowercase()
                .cmp(&b.name.as_str().to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });
        Self {
            strings: sorted(store.strings().iter().map(|(n, v)| (own(n), v.clone()))),
            arrays: sorted(store.arrays().iter().map(|(n, v)| (own(n), v.clone()))),
            colors: sorted(store.colors().iter().map(|(n, c)| (own(n), c.to_hex()))),
            dimens: sorted(store.dimensions().iter().map(|(n, v)| (own(n), v.clone()))),
            fonts: sorted(store.fonts().iter().map(|(n, v)| (own(n), v.clone()))),
            styles,
            drawables: sorted(store.drawables().iter().map(|(n, d)| (own(n), d.clone()))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
            && self.arrays.is_empty()
            && self.colors.is_empty()
            && self.dimens.is_empty()
            && self.fonts.is_empty()
            && self.styles.is_empty()
            && self.drawables.is_empty()
    }

    /// `(filename, content)` for every non-empty values table.
    pub fn value_files(&self) -> Result<Vec<(&'static str, String)>, ValueError> {
        let mut files = Vec::new();
        if !self.strings.is_empty() {
            files.push(("strings.xml", self.strings_xml()?));
        }
        if !self.arrays.is_empty() {
            files.push(("arrays.xml", self.arrays_xml()?));
        }
        if !self.colors.is_empty() {
            files.push(("colors.xml", simple_table("color", &self.colors, false)?));
        }
        if !self.dimens.is_empty() {
            files.push(("dimens.xml", simple_table("dimen", &self.dimens, false)?));
        }
        if !self.fonts.is_empty() {
            files.push(("fonts.xml", simple_table("string", &self.fonts, true)?));
        }
        if !self.styles.is_empty() {
            files.push(("styles.xml", self.styles_xml()?));
        }
        Ok(files)
    }

    /// `(filename, content)` for every shape drawable.
    pub fn drawable_files(&self) -> Result<Vec<(String, String)>, ValueError> {
        let mut files = Vec::new();
        for (name, drawable) in &self.drawables {
            if let Some(xml) = drawable.to_xml()? {
                files.push((format!("{}.xml", name), xml));
            }
        }
        Ok(files)
    }

    fn strings_xml(&self) -> Result<String, ValueError> {
        let mut doc = XmlDoc::new()?;
        doc.open("resources", &[])?;
        for (name, value) in &self.strings {
            doc.text_element("string", &[("name", name.as_str())], &escape_string_value(value))?;
        }
        doc.close("resources")?;
        doc.finish()
    }

    fn arrays_xml(&self) -> Result<String, ValueError> {
        let mut doc = XmlDoc::new()?;
        doc.open("resources", &[])?;
        for (name, items) in &self.arrays {
            doc.open("string-array", &[("name", name.as_str())])?;
            for item in items {
                doc.text_element("item", &[], &escape_string_value(item))?;
            }
            doc.close("string-array")?;
        }
        doc.close("resources")?;
        doc.finish()
    }

    fn styles_xml(&self) -> Result<String, ValueError> {
        let mut doc = XmlDoc::new()?;
        doc.open("resources", &[])?;
        for style in &self.styles {
            let mut attrs = vec![("name", style.name.as_str())];
            if let Some(parent) = &style.parent {
                attrs.push(("parent", parent.as_str()));
            }
            doc.open("style", &attrs)?;
            for (key, value) in &style.attributes {
                doc.text_element("item", &[("name", key.as_str())], value)?;
            }
            doc.close("style")?;
        }
        doc.close("resources")?;
        doc.finish()
    }
}

fn simple_table(element: &str, entries: &[(String, String)], untranslatable: bool) -> Result<String, ValueError> {
    let mut doc = XmlDoc::new()?;
    doc.open("resources", &[])?;
    for (name, value) in entries {
        if untranslatable {
            doc.text_element(element, &[("name", name.as_str()), ("translatable", "false")], value)?;
        } else {
            doc.text_element(element, &[("name", name.as_str())], value)?;
        }
    }
    doc.close("resources")?;
    doc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DimenUnit;
    use weft_types::{Color, ResourceName};

    #[test]
    fn test_tables_sort_case_insensitively() {
        let mut store = ValueStore::default();
        store.string("banana");
        store.string("Apple pie");
        store.string("cherry");
        let tables = ResourceTables::collect(&store, &[]);
        let names: Vec<&str> = tables.strings.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["apple_pie", "banana", "cherry"]);
    }

    #[test]
    fn test_only_non_empty_tables_are_written() {
        let mut store = ValueStore::default();
        store.color(Color::rgb(255, 0, 0));
        store.dimension(8.0, DimenUnit::Dp);
        let files = ResourceTables::collect(&store, &[]).value_files().unwrap();
        let names: Vec<&str> = files.iter().map(|(f, _)| *f).collect();
        assert_eq!(names, vec!["colors.xml", "dimens.xml"]);
        assert!(files[0].1.contains(r#"<color name="red">#FF0000</color>"#));
    }

    #[test]
    fn test_strings_are_escaped() {
        let mut store = ValueStore::default();
        store.string("Tom's <b>");
        let files = ResourceTables::collect(&store, &[]).value_files().unwrap();
        assert!(files[0].1.contains(r"Tom\&apos;s &lt;b&gt;") || files[0].1.contains(r"Tom\'s &lt;b&gt;"));
    }

    #[test]
    fn test_styles_carry_parent() {
        let styles = vec![
            StyleEntry {
                name: ResourceName::new("Button_1"),
                parent: Some(ResourceName::new("Button")),
                attributes: vec![("android:textColor".into(), "@color/red".into())],
            },
            StyleEntry {
                name: ResourceName::new("Button"),
                parent: None,
                attributes: vec![("android:textSize".into(), "@dimen/dimen_14sp".into())],
            },
        ];
        let tables = ResourceTables::collect(&ValueStore::default(), &styles);
        assert_eq!(tables.styles[0].name.as_str(), "Button");
        let files = tables.value_files().unwrap();
        assert_eq!(files[0].0, "styles.xml");
        assert!(files[0].1.contains(r#"<style name="Button_1" parent="Button">"#));
        assert!(files[0].1.contains(r#"<item name="android:textColor">@color/red</item>"#));
    }
}
