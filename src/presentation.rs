use crate::constants::{P_NAMESPACE, R_NAMESPACE};
use crate::{Error, Result};
use roxmltree::Document;

/// Slide dimensions in EMU, taken from `p:sldSz`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideSize {
    pub cx: i64,
    pub cy: i64,
}

impl Default for SlideSize {
    // 10 x 7.5 inch, the PowerPoint default when a template omits p:sldSz.
    fn default() -> Self {
        Self {
            cx: 9_144_000,
            cy: 6_858_000,
        }
    }
}

/// The pieces of `ppt/presentation.xml` the generator needs: slide geometry,
/// the first master and the current slide instances.
#[derive(Debug)]
pub struct PresentationInfo {
    pub slide_size: SlideSize,
    /// `r:id` of the first entry in `p:sldMasterIdLst`.
    pub master_rel_id: Option<String>,
    /// `r:id`s of `p:sldIdLst` entries, in slide order.
    pub slide_rel_ids: Vec<String>,
}

/// Parses `ppt/presentation.xml`.
///
/// # Errors
///
/// Returns an error if the data is not valid UTF-8 or not well-formed XML.
pub fn parse(xml_data: &[u8]) -> Result<PresentationInfo> {
    let xml_str = std::str::from_utf8(xml_data)?;
    let doc = Document::parse(xml_str)?;
    let root = doc.root_element();

    let mut slide_size = SlideSize::default();
    if let Some(sld_sz) = root
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "sldSz")
    {
        if let (Some(cx), Some(cy)) = (sld_sz.attribute("cx"), sld_sz.attribute("cy")) {
            if let (Ok(cx), Ok(cy)) = (cx.parse(), cy.parse()) {
                slide_size = SlideSize { cx, cy };
            }
        }
    }

    let master_rel_id = root
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "sldMasterIdLst")
        .and_then(|lst| {
            lst.children()
                .find(|n| n.is_element() && n.tag_name().name() == "sldMasterId")
        })
        .and_then(|id| id.attribute((R_NAMESPACE, "id")))
        .map(|id| id.to_string());

    let slide_rel_ids = root
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "sldIdLst")
        .map(|lst| {
            lst.children()
                .filter(|n| n.is_element() && n.tag_name().name() == "sldId")
                .filter_map(|n| n.attribute((R_NAMESPACE, "id")))
                .map(|id| id.to_string())
                .collect()
        })
        .unwrap_or_default();

    Ok(PresentationInfo {
        slide_size,
        master_rel_id,
        slide_rel_ids,
    })
}

/// Replaces the `p:sldIdLst` element of `presentation.xml` with a list built
/// from `entries` (`(slide id, relationship id)` pairs), touching nothing
/// else in the part.
///
/// The element's source byte range is located with the parser, so theme
/// references, `p:sldSz`, text defaults and whatever else the template
/// carries survive byte-for-byte. An absent slide list is inserted right
/// after `p:sldMasterIdLst`.
pub fn replace_slide_list(xml_data: &[u8], entries: &[(u32, String)]) -> Result<String> {
    let xml_str = std::str::from_utf8(xml_data)?;
    let doc = Document::parse(xml_str)?;
    let root = doc.root_element();

    if root.tag_name().name() != "presentation" {
        return Err(Error::ParseError("not a presentation part"));
    }

    let prefix = root.lookup_prefix(P_NAMESPACE).unwrap_or("p");
    let block = slide_list_xml(prefix, entries);

    if let Some(lst) = root
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "sldIdLst")
    {
        let range = lst.range();
        let mut out = String::with_capacity(xml_str.len() + block.len());
        out.push_str(&xml_str[..range.start]);
        out.push_str(&block);
        out.push_str(&xml_str[range.end..]);
        return Ok(out);
    }

    let master_lst = root
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "sldMasterIdLst")
        .ok_or(Error::ParseError("presentation part has no slide master list"))?;

    let at = master_lst.range().end;
    let mut out = String::with_capacity(xml_str.len() + block.len());
    out.push_str(&xml_str[..at]);
    out.push_str(&block);
    out.push_str(&xml_str[at..]);
    Ok(out)
}

fn slide_list_xml(prefix: &str, entries: &[(u32, String)]) -> String {
    if entries.is_empty() {
        return format!("<{prefix}:sldIdLst/>");
    }

    let mut xml = format!("<{prefix}:sldIdLst>");
    for (id, rel_id) in entries {
        xml.push_str(&format!(r#"<{prefix}:sldId id="{id}" r:id="{rel_id}"/>"#));
    }
    xml.push_str(&format!("</{prefix}:sldIdLst>"));
    xml
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRESENTATION: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main""#,
        r#" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#,
        r#" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
        r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#,
        r#"<p:sldIdLst><p:sldId id="256" r:id="rId2"/><p:sldId id="257" r:id="rId3"/></p:sldIdLst>"#,
        r#"<p:sldSz cx="12192000" cy="6858000"/>"#,
        r#"<p:notesSz cx="6858000" cy="9144000"/>"#,
        r#"</p:presentation>"#
    );

    #[test]
    fn parses_size_master_and_slides() {
        let info = parse(PRESENTATION.as_bytes()).unwrap();
        assert_eq!(
            info.slide_size,
            SlideSize {
                cx: 12_192_000,
                cy: 6_858_000
            }
        );
        assert_eq!(info.master_rel_id.as_deref(), Some("rId1"));
        assert_eq!(info.slide_rel_ids, vec!["rId2", "rId3"]);
    }

    #[test]
    fn replace_clears_and_rebuilds_the_slide_list() {
        let cleared = replace_slide_list(PRESENTATION.as_bytes(), &[]).unwrap();
        assert!(cleared.contains("<p:sldIdLst/>"));
        assert!(!cleared.contains("rId3"));
        // surroundings untouched
        assert!(cleared.contains(r#"<p:sldSz cx="12192000" cy="6858000"/>"#));
        assert!(cleared.contains("sldMasterIdLst"));

        let rebuilt = replace_slide_list(
            cleared.as_bytes(),
            &[(256, "rId4".to_string()), (257, "rId5".to_string())],
        )
        .unwrap();
        let info = parse(rebuilt.as_bytes()).unwrap();
        assert_eq!(info.slide_rel_ids, vec!["rId4", "rId5"]);
    }

    #[test]
    fn inserts_list_after_masters_when_absent() {
        let without = PRESENTATION.replace(
            r#"<p:sldIdLst><p:sldId id="256" r:id="rId2"/><p:sldId id="257" r:id="rId3"/></p:sldIdLst>"#,
            "",
        );
        let rebuilt =
            replace_slide_list(without.as_bytes(), &[(256, "rId9".to_string())]).unwrap();
        let info = parse(rebuilt.as_bytes()).unwrap();
        assert_eq!(info.slide_rel_ids, vec!["rId9"]);

        let master_pos = rebuilt.find("sldMasterIdLst").unwrap();
        let list_pos = rebuilt.find("sldIdLst>").unwrap();
        assert!(list_pos > master_pos);
    }

    #[test]
    fn missing_sld_sz_falls_back_to_default() {
        let without = PRESENTATION.replace(r#"<p:sldSz cx="12192000" cy="6858000"/>"#, "");
        let info = parse(without.as_bytes()).unwrap();
        assert_eq!(info.slide_size, SlideSize::default());
    }
}
