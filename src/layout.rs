use crate::constants::{A_NAMESPACE, P_NAMESPACE, REL_TYPE_SLIDE_MASTER};
use crate::container::PptxPackage;
use crate::rels::{rels_path_for, resolve_target, Relationships};
use crate::{Error, Result};
use roxmltree::{Document, Node};

/// Role a layout assigns to a placeholder frame, from the `type` attribute
/// of `p:ph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRole {
    Title,
    CenteredTitle,
    Body,
    Subtitle,
    /// Generic content placeholder (`obj`, or `p:ph` without a `type`).
    Content,
    DateTime,
    Footer,
    SlideNumber,
    Other,
}

impl FrameRole {
    fn from_ph_type(ph_type: Option<&str>) -> Self {
        match ph_type {
            None | Some("obj") => FrameRole::Content,
            Some("title") => FrameRole::Title,
            Some("ctrTitle") => FrameRole::CenteredTitle,
            Some("body") => FrameRole::Body,
            Some("subTitle") => FrameRole::Subtitle,
            Some("dt") => FrameRole::DateTime,
            Some("ftr") => FrameRole::Footer,
            Some("sldNum") => FrameRole::SlideNumber,
            Some(_) => FrameRole::Other,
        }
    }

    /// The serialized `type` attribute value, `None` for the untyped content
    /// placeholder.
    pub fn ph_type_attr(self) -> Option<&'static str> {
        match self {
            FrameRole::Title => Some("title"),
            FrameRole::CenteredTitle => Some("ctrTitle"),
            FrameRole::Body => Some("body"),
            FrameRole::Subtitle => Some("subTitle"),
            FrameRole::DateTime => Some("dt"),
            FrameRole::Footer => Some("ftr"),
            FrameRole::SlideNumber => Some("sldNum"),
            FrameRole::Content | FrameRole::Other => None,
        }
    }

    pub fn is_title(self) -> bool {
        matches!(self, FrameRole::Title | FrameRole::CenteredTitle)
    }

    /// Frames that hold slide text and therefore participate in body
    /// resolution and z-order reconciliation.
    pub fn is_text_capable(self) -> bool {
        matches!(
            self,
            FrameRole::Title
                | FrameRole::CenteredTitle
                | FrameRole::Body
                | FrameRole::Subtitle
                | FrameRole::Content
        )
    }

    /// Chrome placeholders that new slides do not inherit from their layout.
    pub fn is_slide_chrome(self) -> bool {
        matches!(
            self,
            FrameRole::DateTime | FrameRole::Footer | FrameRole::SlideNumber
        )
    }
}

/// Position and extent in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

/// A layout-defined content region a new slide inherits empty.
#[derive(Debug, Clone)]
pub struct PlaceholderFrame {
    pub role: FrameRole,
    /// The `idx` attribute of `p:ph`; distinguishes multiple frames of the
    /// same role.
    pub index: u32,
    pub name: String,
    /// Pinned geometry, if the layout carries one. Frames without an
    /// `a:xfrm` inherit geometry from the master and resolve to `None`.
    pub frame: Option<Rect>,
}

/// One slide layout of the template: its package path and placeholder set.
#[derive(Debug, Clone)]
pub struct Layout {
    pub path: String,
    pub placeholders: Vec<PlaceholderFrame>,
}

/// Collects the layouts of the presentation's first slide master, in the
/// order the master declares them.
///
/// Position is the contract: layout 0 is the opening layout, layout 1 the
/// content layout. Layouts are never searched by name.
pub fn layouts_of_first_master(
    package: &PptxPackage,
    master_rel_id: Option<&str>,
) -> Result<Vec<Layout>> {
    let pres_rels = Relationships::parse(
        package.part_required(&rels_path_for(crate::constants::PRESENTATION_PART))?,
    )?;

    let master_target = master_rel_id
        .and_then(|id| pres_rels.target_of(id))
        .or_else(|| {
            pres_rels
                .first_of_type(REL_TYPE_SLIDE_MASTER)
                .map(|r| r.target.as_str())
        })
        .ok_or(Error::ParseError("presentation has no slide master"))?;

    let master_path = resolve_target("ppt", master_target);
    let master_dir = master_path
        .rsplit_once('/')
        .map(|(dir, _)| dir)
        .unwrap_or("");

    let master_rels = Relationships::parse(package.part_required(&rels_path_for(&master_path))?)?;
    let layout_rel_ids = layout_ids_of_master(package.part_required(&master_path)?)?;

    let mut layouts = Vec::with_capacity(layout_rel_ids.len());
    for rel_id in &layout_rel_ids {
        let target = master_rels
            .target_of(rel_id)
            .ok_or(Error::ParseError("master references an undeclared layout"))?;
        let path = resolve_target(master_dir, target);
        let placeholders = parse_layout_placeholders(package.part_required(&path)?)?;
        layouts.push(Layout { path, placeholders });
    }

    Ok(layouts)
}

/// Reads the `r:id`s of `p:sldLayoutIdLst` in declaration order.
fn layout_ids_of_master(xml_data: &[u8]) -> Result<Vec<String>> {
    let xml_str = std::str::from_utf8(xml_data)?;
    let doc = Document::parse(xml_str)?;

    let ids = doc
        .root_element()
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "sldLayoutIdLst")
        .map(|lst| {
            lst.children()
                .filter(|n| n.is_element() && n.tag_name().name() == "sldLayoutId")
                .filter_map(|n| n.attribute((crate::constants::R_NAMESPACE, "id")))
                .map(|id| id.to_string())
                .collect()
        })
        .unwrap_or_default();

    Ok(ids)
}

/// Extracts the placeholder frames of a slide layout part.
///
/// Walks `p:cSld/p:spTree` and keeps every `p:sp` that carries a `p:ph`
/// element; plain shapes without a placeholder marker are not content
/// regions and are skipped.
pub fn parse_layout_placeholders(xml_data: &[u8]) -> Result<Vec<PlaceholderFrame>> {
    let xml_str = std::str::from_utf8(xml_data)?;
    let doc = Document::parse(xml_str)?;
    let root = doc.root_element();

    let c_sld = root
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "cSld")
        .ok_or(Error::ParseError("layout part has no <p:cSld>"))?;

    let sp_tree = c_sld
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "spTree")
        .ok_or(Error::ParseError("layout part has no <p:spTree>"))?;

    let mut frames = Vec::new();
    for sp_node in sp_tree.children().filter(|n| {
        n.is_element()
            && n.tag_name().name() == "sp"
            && n.tag_name().namespace() == Some(P_NAMESPACE)
    }) {
        if let Some(frame) = parse_placeholder(&sp_node) {
            frames.push(frame);
        }
    }

    Ok(frames)
}

fn parse_placeholder(sp_node: &Node) -> Option<PlaceholderFrame> {
    let nv_sp_pr = find_child(sp_node, "nvSpPr", P_NAMESPACE)?;
    let nv_pr = find_child(&nv_sp_pr, "nvPr", P_NAMESPACE)?;
    let ph = find_child(&nv_pr, "ph", P_NAMESPACE)?;

    let role = FrameRole::from_ph_type(ph.attribute("type"));
    let index = ph
        .attribute("idx")
        .and_then(|idx| idx.parse::<u32>().ok())
        .unwrap_or(0);

    let name = find_child(&nv_sp_pr, "cNvPr", P_NAMESPACE)
        .and_then(|c| c.attribute("name").map(str::to_string))
        .unwrap_or_default();

    let frame = find_child(sp_node, "spPr", P_NAMESPACE)
        .and_then(|sp_pr| find_child(&sp_pr, "xfrm", A_NAMESPACE))
        .and_then(|xfrm| parse_xfrm(&xfrm));

    Some(PlaceholderFrame {
        role,
        index,
        name,
        frame,
    })
}

fn parse_xfrm(xfrm: &Node) -> Option<Rect> {
    let off = find_child(xfrm, "off", A_NAMESPACE)?;
    let ext = find_child(xfrm, "ext", A_NAMESPACE)?;

    Some(Rect {
        x: off.attribute("x")?.parse().ok()?,
        y: off.attribute("y")?.parse().ok()?,
        cx: ext.attribute("cx")?.parse().ok()?,
        cy: ext.attribute("cy")?.parse().ok()?,
    })
}

fn find_child<'a, 'input>(
    node: &Node<'a, 'input>,
    name: &str,
    namespace: &str,
) -> Option<Node<'a, 'input>> {
    node.children().find(|n| {
        n.is_element() && n.tag_name().name() == name && n.tag_name().namespace() == Some(namespace)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_xml(body: &str) -> String {
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                r#"<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main""#,
                r#" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#,
                r#" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
                r#"<p:cSld><p:spTree>"#,
                r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
                r#"<p:grpSpPr/>"#,
                "{}",
                r#"</p:spTree></p:cSld>"#,
                r#"</p:sldLayout>"#
            ),
            body
        )
    }

    fn placeholder_sp(ph_attrs: &str, name: &str, xfrm: Option<(i64, i64, i64, i64)>) -> String {
        let sp_pr = match xfrm {
            Some((x, y, cx, cy)) => format!(
                r#"<p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm></p:spPr>"#
            ),
            None => "<p:spPr/>".to_string(),
        };
        format!(
            concat!(
                r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="{}"/><p:cNvSpPr/>"#,
                r#"<p:nvPr><p:ph {}/></p:nvPr></p:nvSpPr>{}"#,
                r#"<p:txBody><a:bodyPr/><a:lstStyle/><a:p/></p:txBody></p:sp>"#
            ),
            name, ph_attrs, sp_pr
        )
    }

    #[test]
    fn extracts_roles_indices_and_geometry() {
        let xml = layout_xml(&format!(
            "{}{}",
            placeholder_sp(r#"type="ctrTitle""#, "Title 1", Some((100, 200, 300, 400))),
            placeholder_sp(r#"type="subTitle" idx="1""#, "Subtitle 2", None),
        ));

        let frames = parse_layout_placeholders(xml.as_bytes()).unwrap();
        assert_eq!(frames.len(), 2);

        assert_eq!(frames[0].role, FrameRole::CenteredTitle);
        assert!(frames[0].role.is_title());
        assert_eq!(frames[0].name, "Title 1");
        assert_eq!(
            frames[0].frame,
            Some(Rect {
                x: 100,
                y: 200,
                cx: 300,
                cy: 400
            })
        );

        assert_eq!(frames[1].role, FrameRole::Subtitle);
        assert_eq!(frames[1].index, 1);
        assert_eq!(frames[1].frame, None);
    }

    #[test]
    fn untyped_placeholder_is_generic_content() {
        let xml = layout_xml(&placeholder_sp(r#"idx="1""#, "Content 1", None));
        let frames = parse_layout_placeholders(xml.as_bytes()).unwrap();
        assert_eq!(frames[0].role, FrameRole::Content);
        assert!(frames[0].role.is_text_capable());
        assert!(!frames[0].role.is_title());
    }

    #[test]
    fn shapes_without_ph_marker_are_skipped() {
        let xml = layout_xml(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="5" name="Decoration"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/></p:sp>"#,
        );
        let frames = parse_layout_placeholders(xml.as_bytes()).unwrap();
        assert!(frames.is_empty());
    }

    #[test]
    fn chrome_roles_are_flagged() {
        let xml = layout_xml(&format!(
            "{}{}",
            placeholder_sp(r#"type="ftr" idx="11""#, "Footer 3", None),
            placeholder_sp(r#"type="sldNum" idx="12""#, "Number 4", None),
        ));
        let frames = parse_layout_placeholders(xml.as_bytes()).unwrap();
        assert!(frames.iter().all(|f| f.role.is_slide_chrome()));
        assert!(frames.iter().all(|f| !f.role.is_text_capable()));
    }
}
