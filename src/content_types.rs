use crate::constants::{CONTENT_TYPES_NAMESPACE, CT_PRESENTATION_MAIN, PRESENTATION_PART_NAME};
use crate::xmlwrite::escape_xml;
use crate::Result;
use roxmltree::Document;

/// Parsed model of `[Content_Types].xml`.
///
/// Keeps the `Default` (by extension) and `Override` (by part name) tables in
/// document order so that serialization is deterministic: parsing a manifest
/// and writing it back without mutation reproduces the same element sequence.
#[derive(Debug, Clone)]
pub struct ContentTypes {
    defaults: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    /// Parses a content types manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is not valid UTF-8 or not well-formed XML.
    pub fn parse(xml_data: &[u8]) -> Result<Self> {
        let xml_str = std::str::from_utf8(xml_data)?;
        let doc = Document::parse(xml_str)?;
        let root = doc.root_element();

        let mut defaults = Vec::new();
        let mut overrides = Vec::new();

        for node in root.children().filter(|n| n.is_element()) {
            match node.tag_name().name() {
                "Default" => {
                    if let (Some(ext), Some(ct)) =
                        (node.attribute("Extension"), node.attribute("ContentType"))
                    {
                        defaults.push((ext.to_string(), ct.to_string()));
                    }
                }
                "Override" => {
                    if let (Some(part), Some(ct)) =
                        (node.attribute("PartName"), node.attribute("ContentType"))
                    {
                        overrides.push((part.to_string(), ct.to_string()));
                    }
                }
                _ => {}
            }
        }

        Ok(Self { defaults, overrides })
    }

    pub fn default_for(&self, extension: &str) -> Option<&str> {
        self.defaults
            .iter()
            .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
            .map(|(_, ct)| ct.as_str())
    }

    pub fn override_for(&self, part_name: &str) -> Option<&str> {
        self.overrides
            .iter()
            .find(|(part, _)| part == part_name)
            .map(|(_, ct)| ct.as_str())
    }

    /// Adds an extension default if the extension is not mapped yet.
    pub fn ensure_default(&mut self, extension: &str, content_type: &str) {
        if self.default_for(extension).is_none() {
            self.defaults
                .push((extension.to_string(), content_type.to_string()));
        }
    }

    /// Sets an override, replacing an existing entry for the same part name
    /// in place so element order stays stable.
    pub fn set_override(&mut self, part_name: &str, content_type: &str) {
        match self.overrides.iter_mut().find(|(part, _)| part == part_name) {
            Some((_, ct)) => *ct = content_type.to_string(),
            None => self
                .overrides
                .push((part_name.to_string(), content_type.to_string())),
        }
    }

    pub fn remove_override(&mut self, part_name: &str) {
        self.overrides.retain(|(part, _)| part != part_name);
    }

    /// Drops every override whose part name starts with `prefix`; used when
    /// clearing slide instances out of a template.
    pub fn remove_overrides_with_prefix(&mut self, prefix: &str) {
        self.overrides.retain(|(part, _)| !part.starts_with(prefix));
    }

    /// Points the main presentation part at the regular-presentation content
    /// type. Saving a deck opened from a `.potx` otherwise leaves the
    /// template identifier in place, which consumers refuse to open.
    pub fn mark_main_part_as_presentation(&mut self) {
        self.set_override(PRESENTATION_PART_NAME, CT_PRESENTATION_MAIN);
    }

    /// Serializes the manifest. Output is fully determined by table order,
    /// so repeated parse/serialize cycles are byte-stable.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(2048);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<Types xmlns="{}">"#, CONTENT_TYPES_NAMESPACE));

        for (ext, ct) in &self.defaults {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(ext),
                escape_xml(ct)
            ));
        }
        for (part, ct) in &self.overrides {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape_xml(part),
                escape_xml(ct)
            ));
        }

        xml.push_str("</Types>");
        xml
    }
}
