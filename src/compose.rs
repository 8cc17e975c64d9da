use crate::constants::{A_NAMESPACE, EMU_PER_INCH, P_NAMESPACE, R_NAMESPACE};
use crate::layout::{Layout, PlaceholderFrame, Rect};
use crate::presentation::SlideSize;
use crate::xmlwrite::escape_xml;

/// Font size applied to every bullet run, in hundredths of a point.
///
/// Inherited placeholder styles differ between the primary line and added
/// paragraphs; pinning one size keeps mixed bullets visually consistent.
pub const BULLET_FONT_SIZE: u32 = 1800;

/// Gap kept between an inserted image and the slide's right edge, and used
/// as the initial top offset: 0.3 inch.
const IMAGE_MARGIN: i64 = EMU_PER_INCH * 3 / 10;

/// Fraction of the slide width granted to the image region: 40 %.
const IMAGE_WIDTH_NUM: i64 = 2;
const IMAGE_WIDTH_DEN: i64 = 5;

#[derive(Debug)]
enum Shape {
    Text(TextFrame),
    Picture(Picture),
}

#[derive(Debug)]
struct TextFrame {
    id: u32,
    placeholder: PlaceholderFrame,
    /// `None` until a population step touches the frame; the serialized
    /// text body is then the empty one the layout prompt shows through.
    body: Option<Vec<Paragraph>>,
}

#[derive(Debug)]
struct Paragraph {
    text: String,
    level: Option<u32>,
    /// Run font size in hundredths of a point; absent inherits the
    /// placeholder style.
    font_size: Option<u32>,
}

#[derive(Debug)]
struct Picture {
    id: u32,
    rel_id: String,
    rect: Rect,
}

/// Builds one slide part as an explicit draw-order list of shapes.
///
/// Shapes are serialized in list order, and later elements draw on top of
/// earlier ones, so z-order problems reduce to list reordering — see
/// [`SlideBuilder::move_text_to_front`].
pub struct SlideBuilder {
    shapes: Vec<Shape>,
    next_id: u32,
}

impl SlideBuilder {
    /// Starts a slide from a layout, inheriting its placeholder frames as
    /// empty text shapes. Date, footer and slide-number placeholders are
    /// not carried over.
    pub fn from_layout(layout: &Layout) -> Self {
        let mut builder = Self {
            shapes: Vec::new(),
            // id 1 belongs to the group shape at the top of the tree
            next_id: 2,
        };

        for placeholder in &layout.placeholders {
            if placeholder.role.is_slide_chrome() {
                continue;
            }
            let id = builder.take_id();
            builder.shapes.push(Shape::Text(TextFrame {
                id,
                placeholder: placeholder.clone(),
                body: None,
            }));
        }

        builder
    }

    fn take_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// The slide's placeholder frames in draw order, for the resolver.
    /// Indices into this list are the frame indices the population methods
    /// accept.
    pub fn frames(&self) -> Vec<PlaceholderFrame> {
        self.text_frames().map(|t| t.placeholder.clone()).collect()
    }

    fn text_frames(&self) -> impl Iterator<Item = &TextFrame> {
        self.shapes.iter().filter_map(|s| match s {
            Shape::Text(t) => Some(t),
            Shape::Picture(_) => None,
        })
    }

    fn text_frame_mut(&mut self, frame_index: usize) -> Option<&mut TextFrame> {
        self.shapes
            .iter_mut()
            .filter_map(|s| match s {
                Shape::Text(t) => Some(t),
                Shape::Picture(_) => None,
            })
            .nth(frame_index)
    }

    /// Replaces the frame's text with a single title line. Only the text
    /// content changes; the frame keeps its inherited formatting.
    pub fn set_title(&mut self, frame_index: usize, text: &str) {
        if let Some(frame) = self.text_frame_mut(frame_index) {
            frame.body = Some(vec![Paragraph {
                text: text.to_string(),
                level: None,
                font_size: None,
            }]);
        }
    }

    /// Clears the frame and fills it with bullet paragraphs: the first
    /// bullet is the primary line, the rest are level-0 paragraphs, and
    /// every run is pinned to [`BULLET_FONT_SIZE`]. An empty list leaves
    /// the frame cleared.
    pub fn set_bullets(&mut self, frame_index: usize, bullets: &[String]) {
        if let Some(frame) = self.text_frame_mut(frame_index) {
            frame.body = Some(
                bullets
                    .iter()
                    .enumerate()
                    .map(|(i, bullet)| Paragraph {
                        text: bullet.clone(),
                        level: if i == 0 { None } else { Some(0) },
                        font_size: Some(BULLET_FONT_SIZE),
                    })
                    .collect(),
            );
        }
    }

    /// Appends a picture shape at the given geometry, referencing an image
    /// relationship of the slide part.
    pub fn add_picture(&mut self, rel_id: &str, rect: Rect) {
        let id = self.take_id();
        self.shapes.push(Shape::Picture(Picture {
            id,
            rel_id: rel_id.to_string(),
            rect,
        }));
    }

    /// Z-order reconciliation: moves every text-capable frame except the
    /// title to the end of the draw order, preserving their relative order,
    /// so inserted imagery never occludes text. Runs once per slide, after
    /// image placement and text population.
    pub fn move_text_to_front(&mut self, title_index: Option<usize>) {
        let mut front = Vec::with_capacity(self.shapes.len());
        let mut tail = Vec::new();
        let mut frame_index = 0;

        for shape in self.shapes.drain(..) {
            let movable = match &shape {
                Shape::Text(t) => {
                    let index = frame_index;
                    frame_index += 1;
                    t.placeholder.role.is_text_capable() && Some(index) != title_index
                }
                Shape::Picture(_) => false,
            };
            if movable {
                tail.push(shape);
            } else {
                front.push(shape);
            }
        }

        front.append(&mut tail);
        self.shapes = front;
    }

    /// Serializes the slide part.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(2048);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(
            r#"<p:sld xmlns:a="{A_NAMESPACE}" xmlns:r="{R_NAMESPACE}" xmlns:p="{P_NAMESPACE}">"#
        ));
        xml.push_str("<p:cSld><p:spTree>");
        xml.push_str(
            r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
        );
        xml.push_str(concat!(
            "<p:grpSpPr><a:xfrm>",
            r#"<a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
            r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/>"#,
            "</a:xfrm></p:grpSpPr>"
        ));

        for shape in &self.shapes {
            match shape {
                Shape::Text(t) => write_text_shape(&mut xml, t),
                Shape::Picture(p) => write_picture_shape(&mut xml, p),
            }
        }

        xml.push_str("</p:spTree></p:cSld>");
        xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
        xml.push_str("</p:sld>");
        xml
    }
}

/// Computes the image region for a slide: right-aligned at the margin,
/// 40 % of the slide width wide, vertically centered, height derived from
/// the source's intrinsic aspect ratio.
///
/// A source tall enough to overflow the slide is shrunk (aspect preserved,
/// still right-aligned) until it fits, so the rendered height never exceeds
/// the slide height.
pub fn picture_rect(slide: SlideSize, image_width: u32, image_height: u32) -> Rect {
    let mut cx = slide.cx * IMAGE_WIDTH_NUM / IMAGE_WIDTH_DEN - IMAGE_MARGIN;
    let mut cy = cx * i64::from(image_height) / i64::from(image_width);

    if cy > slide.cy {
        cy = slide.cy;
        cx = cy * i64::from(image_width) / i64::from(image_height);
    }

    Rect {
        x: slide.cx - cx - IMAGE_MARGIN,
        y: (slide.cy - cy) / 2,
        cx,
        cy,
    }
}

fn write_text_shape(xml: &mut String, frame: &TextFrame) {
    let ph = &frame.placeholder;

    let mut ph_attrs = String::new();
    if let Some(ph_type) = ph.role.ph_type_attr() {
        ph_attrs.push_str(&format!(r#" type="{ph_type}""#));
    }
    if ph.index != 0 {
        ph_attrs.push_str(&format!(r#" idx="{}""#, ph.index));
    }

    xml.push_str("<p:sp><p:nvSpPr>");
    xml.push_str(&format!(
        r#"<p:cNvPr id="{}" name="{}"/>"#,
        frame.id,
        escape_xml(&ph.name)
    ));
    xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#);
    xml.push_str(&format!("<p:nvPr><p:ph{ph_attrs}/></p:nvPr></p:nvSpPr>"));
    xml.push_str("<p:spPr/>");

    xml.push_str("<p:txBody><a:bodyPr/><a:lstStyle/>");
    match frame.body.as_deref() {
        None | Some([]) => xml.push_str("<a:p/>"),
        Some(paragraphs) => {
            for paragraph in paragraphs {
                write_paragraph(xml, paragraph);
            }
        }
    }
    xml.push_str("</p:txBody></p:sp>");
}

fn write_paragraph(xml: &mut String, paragraph: &Paragraph) {
    xml.push_str("<a:p>");
    if let Some(level) = paragraph.level {
        xml.push_str(&format!(r#"<a:pPr lvl="{level}"/>"#));
    }

    let mut run_props = String::from(r#" lang="en-US""#);
    if let Some(size) = paragraph.font_size {
        run_props.push_str(&format!(r#" sz="{size}""#));
    }
    run_props.push_str(r#" dirty="0""#);

    xml.push_str(&format!(
        "<a:r><a:rPr{}/><a:t>{}</a:t></a:r>",
        run_props,
        escape_xml(&paragraph.text)
    ));
    xml.push_str("</a:p>");
}

fn write_picture_shape(xml: &mut String, picture: &Picture) {
    xml.push_str("<p:pic><p:nvPicPr>");
    xml.push_str(&format!(
        r#"<p:cNvPr id="{}" name="Picture {}"/>"#,
        picture.id, picture.id
    ));
    xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr>"#);
    xml.push_str("<p:nvPr/></p:nvPicPr>");
    xml.push_str(&format!(
        r#"<p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
        escape_xml(&picture.rel_id)
    ));
    xml.push_str(&format!(
        concat!(
            "<p:spPr><a:xfrm>",
            r#"<a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/>"#,
            "</a:xfrm>",
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#,
            "</p:spPr></p:pic>"
        ),
        picture.rect.x, picture.rect.y, picture.rect.cx, picture.rect.cy
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::FrameRole;

    fn layout_with(frames: Vec<PlaceholderFrame>) -> Layout {
        Layout {
            path: "ppt/slideLayouts/slideLayout2.xml".to_string(),
            placeholders: frames,
        }
    }

    fn ph(role: FrameRole, index: u32, name: &str) -> PlaceholderFrame {
        PlaceholderFrame {
            role,
            index,
            name: name.to_string(),
            frame: None,
        }
    }

    #[test]
    fn inherits_layout_placeholders_without_chrome() {
        let layout = layout_with(vec![
            ph(FrameRole::Title, 0, "Title 1"),
            ph(FrameRole::Body, 1, "Body 2"),
            ph(FrameRole::Footer, 11, "Footer 3"),
        ]);
        let builder = SlideBuilder::from_layout(&layout);
        let frames = builder.frames();
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|f| !f.role.is_slide_chrome()));
    }

    #[test]
    fn title_and_bullets_serialize_in_order() {
        let layout = layout_with(vec![
            ph(FrameRole::Title, 0, "Title 1"),
            ph(FrameRole::Body, 1, "Body 2"),
        ]);
        let mut builder = SlideBuilder::from_layout(&layout);
        builder.set_title(0, "Quarterly <Review>");
        builder.set_bullets(1, &["first".to_string(), "second".to_string()]);

        let xml = builder.to_xml();
        assert!(xml.contains("<a:t>Quarterly &lt;Review&gt;</a:t>"));

        let first = xml.find("<a:t>first</a:t>").unwrap();
        let second = xml.find("<a:t>second</a:t>").unwrap();
        assert!(first < second);

        // primary line has no explicit level, later bullets are level 0
        assert_eq!(xml.matches(r#"<a:pPr lvl="0"/>"#).count(), 1);
        // every bullet run is pinned to 18pt, the title run is not
        assert_eq!(xml.matches(r#" sz="1800""#).count(), 2);
    }

    #[test]
    fn empty_bullets_clear_the_frame() {
        let layout = layout_with(vec![ph(FrameRole::Body, 1, "Body 2")]);
        let mut builder = SlideBuilder::from_layout(&layout);
        builder.set_bullets(0, &[]);
        let xml = builder.to_xml();
        assert!(xml.contains("<a:bodyPr/><a:lstStyle/><a:p/></p:txBody>"));
    }

    #[test]
    fn untouched_frame_keeps_an_empty_body() {
        let layout = layout_with(vec![ph(FrameRole::Body, 1, "Body 2")]);
        let builder = SlideBuilder::from_layout(&layout);
        assert!(builder.to_xml().contains("<a:p/>"));
    }

    #[test]
    fn text_moves_in_front_of_pictures() {
        let layout = layout_with(vec![
            ph(FrameRole::Title, 0, "Title 1"),
            ph(FrameRole::Body, 1, "Body 2"),
            ph(FrameRole::Content, 2, "Content 3"),
        ]);
        let mut builder = SlideBuilder::from_layout(&layout);
        builder.add_picture("rId2", Rect::default());
        builder.move_text_to_front(Some(0));

        let xml = builder.to_xml();
        let title = xml.find("Title 1").unwrap();
        let pic = xml.find("<p:pic>").unwrap();
        let body = xml.find("Body 2").unwrap();
        let content = xml.find("Content 3").unwrap();

        // title stays ahead of the picture, moved text follows it in
        // original relative order
        assert!(title < pic);
        assert!(pic < body);
        assert!(body < content);
    }

    #[test]
    fn landscape_picture_is_right_aligned_and_centered() {
        let slide = SlideSize {
            cx: 12_192_000,
            cy: 6_858_000,
        };
        let rect = picture_rect(slide, 1600, 900);

        let margin = EMU_PER_INCH * 3 / 10;
        assert_eq!(rect.cx, slide.cx * 2 / 5 - margin);
        assert_eq!(rect.x + rect.cx + margin, slide.cx);
        assert_eq!(rect.cy, rect.cx * 900 / 1600);
        assert_eq!(rect.y, (slide.cy - rect.cy) / 2);
        assert!(rect.cy <= slide.cy);
    }

    #[test]
    fn tall_picture_is_clamped_to_the_slide_height() {
        let slide = SlideSize {
            cx: 12_192_000,
            cy: 6_858_000,
        };
        let rect = picture_rect(slide, 500, 3000);

        assert_eq!(rect.cy, slide.cy);
        assert_eq!(rect.y, 0);
        assert_eq!(rect.cx, slide.cy * 500 / 3000);
        // still right-aligned at the margin
        let margin = EMU_PER_INCH * 3 / 10;
        assert_eq!(rect.x + rect.cx + margin, slide.cx);
    }
}
