use crate::ValueError;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

pub(crate) const ANDROID_NS: &str = "http://schemas.android.com/apk/res/android";

/// An indented XML document under construction.
pub(crate) struct XmlDoc {
    writer: Writer<Vec<u8>>,
}

fn xml_err(e: impl std::fmt::Display) -> ValueError {
    ValueError::Xml(e.to_string())
}

impl XmlDoc {
    pub fn new() -> Result<Self, ValueError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(xml_err)?;
        Ok(Self { writer })
    }

    pub fn open(&mut self, tag: &str, attrs: &[(&str, &str)]) -> Result<(), ValueError> {
        let start = BytesStart::new(tag).with_attributes(attrs.iter().copied());
        self.writer.write_event(Event::Start(start)).map_err(xml_err)
    }

    pub fn empty(&mut self, tag: &str, attrs: &[(&str, &str)]) -> Result<(), ValueError> {
        let start = BytesStart::new(tag).with_attributes(attrs.iter().copied());
        self.writer.write_event(Event::Empty(start)).map_err(xml_err)
    }

    pub fn text_element(&mut self, tag: &str, attrs: &[(&str, &str)], text: &str) -> Result<(), ValueError> {
        let start = BytesStart::new(tag).with_attributes(attrs.iter().copied());
        self.writer.write_event(Event::Start(start)).map_err(xml_err)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_err)?;
        self.writer
            .write_event(Event::End(BytesEnd::new(tag)))
            .map_err(xml_err)
    }

    pub fn close(&mut self, tag: &str) -> Result<(), ValueError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(tag)))
            .map_err(xml_err)
    }

    pub fn finish(self) -> Result<String, ValueError> {
        let mut out = String::from_utf8(self.writer.into_inner()).map_err(xml_err)?;
        out.push('\n');
        Ok(out)
    }
}
