use crate::constants::RELS_NAMESPACE;
use crate::xmlwrite::escape_xml;
use crate::Result;
use roxmltree::Document;

/// A single relationship entry of a `.rels` part.
#[derive(Debug, Clone)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
}

/// Parsed model of a relationships (`.rels`) part.
///
/// Relationship parts are small, so unlike `presentation.xml` they are fully
/// re-serialized from this model after mutation.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    rels: Vec<Relationship>,
}

impl Relationships {
    /// Parses relationship XML data.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is not valid UTF-8 or not well-formed XML.
    pub fn parse(xml_data: &[u8]) -> Result<Self> {
        let xml_str = std::str::from_utf8(xml_data)?;
        let doc = Document::parse(xml_str)?;
        let root = doc.root_element();

        let mut rels = Vec::new();
        for rel in root
            .children()
            .filter(|n| n.is_element() && n.tag_name().name() == "Relationship")
        {
            if let (Some(id), Some(rel_type), Some(target)) = (
                rel.attribute("Id"),
                rel.attribute("Type"),
                rel.attribute("Target"),
            ) {
                rels.push(Relationship {
                    id: id.to_string(),
                    rel_type: rel_type.to_string(),
                    target: target.to_string(),
                });
            }
        }

        Ok(Self { rels })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.iter()
    }

    pub fn target_of(&self, id: &str) -> Option<&str> {
        self.rels
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.target.as_str())
    }

    /// First relationship of the given type, in document order.
    pub fn first_of_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.rels.iter().find(|r| r.rel_type == rel_type)
    }

    /// Adds a relationship under the next free `rId` and returns that id.
    pub fn add(&mut self, rel_type: &str, target: &str) -> String {
        let id = self.next_id();
        self.rels.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
        });
        id
    }

    /// Removes a relationship by id. Returns whether an entry was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.rels.len();
        self.rels.retain(|r| r.id != id);
        self.rels.len() != before
    }

    /// Smallest `rId<n>` not currently in use.
    fn next_id(&self) -> String {
        let mut n = 1;
        loop {
            let candidate = format!("rId{n}");
            if self.rels.iter().all(|r| r.id != candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(512);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<Relationships xmlns="{}">"#, RELS_NAMESPACE));

        for rel in &self.rels {
            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
                escape_xml(&rel.id),
                escape_xml(&rel.rel_type),
                escape_xml(&rel.target)
            ));
        }

        xml.push_str("</Relationships>");
        xml
    }
}

/// Constructs the path of the relationships part for a package part.
///
/// For `ppt/slides/slide1.xml` this is `ppt/slides/_rels/slide1.xml.rels`.
pub fn rels_path_for(part_path: &str) -> String {
    let mut rels_path = part_path.to_string();
    if let Some(pos) = rels_path.rfind('/') {
        rels_path.insert_str(pos + 1, "_rels/");
    } else {
        rels_path.insert_str(0, "_rels/");
    }
    rels_path.push_str(".rels");
    rels_path
}

/// Resolves a relationship target against the directory of the part that
/// declares it, collapsing leading `../` segments.
///
/// For base dir `ppt/slideMasters` and target `../slideLayouts/slideLayout1.xml`
/// this is `ppt/slideLayouts/slideLayout1.xml`.
pub fn resolve_target(base_dir: &str, target: &str) -> String {
    let mut dir: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    let mut rest = target;
    while let Some(stripped) = rest.strip_prefix("../") {
        dir.pop();
        rest = stripped;
    }
    if dir.is_empty() {
        rest.to_string()
    } else {
        format!("{}/{}", dir.join("/"), rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{REL_TYPE_SLIDE, REL_TYPE_SLIDE_MASTER};

    const RELS: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>"#,
        r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>"#,
        r#"</Relationships>"#
    );

    #[test]
    fn parses_relationship_entries() {
        let rels = Relationships::parse(RELS.as_bytes()).unwrap();
        assert_eq!(rels.iter().count(), 2);
        assert_eq!(rels.target_of("rId2"), Some("slides/slide1.xml"));
        assert_eq!(
            rels.first_of_type(REL_TYPE_SLIDE_MASTER).unwrap().target,
            "slideMasters/slideMaster1.xml"
        );
    }

    #[test]
    fn add_allocates_the_next_free_id() {
        let mut rels = Relationships::parse(RELS.as_bytes()).unwrap();
        let id = rels.add(REL_TYPE_SLIDE, "slides/slide2.xml");
        assert_eq!(id, "rId3");

        rels.remove("rId2");
        let id = rels.add(REL_TYPE_SLIDE, "slides/slide3.xml");
        assert_eq!(id, "rId2");
    }

    #[test]
    fn round_trips_through_to_xml() {
        let rels = Relationships::parse(RELS.as_bytes()).unwrap();
        let reparsed = Relationships::parse(rels.to_xml().as_bytes()).unwrap();
        assert_eq!(reparsed.iter().count(), 2);
        assert_eq!(
            reparsed.target_of("rId1"),
            Some("slideMasters/slideMaster1.xml")
        );
    }

    #[test]
    fn builds_rels_paths_and_resolves_targets() {
        assert_eq!(
            rels_path_for("ppt/slides/slide1.xml"),
            "ppt/slides/_rels/slide1.xml.rels"
        );
        assert_eq!(
            rels_path_for("ppt/presentation.xml"),
            "ppt/_rels/presentation.xml.rels"
        );
        assert_eq!(
            resolve_target("ppt/slideMasters", "../slideLayouts/slideLayout2.xml"),
            "ppt/slideLayouts/slideLayout2.xml"
        );
        assert_eq!(
            resolve_target("ppt", "slides/slide1.xml"),
            "ppt/slides/slide1.xml"
        );
    }
}
