//! Namespace URIs, relationship types and content type identifiers used
//! across the OOXML presentation package.

/// DrawingML namespace (`a:` prefix).
pub const A_NAMESPACE: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

/// PresentationML namespace (`p:` prefix).
pub const P_NAMESPACE: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

/// Officedocument relationships namespace (`r:` prefix).
pub const R_NAMESPACE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Namespace of the `Relationships` part itself.
pub const RELS_NAMESPACE: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Namespace of the `[Content_Types].xml` part.
pub const CONTENT_TYPES_NAMESPACE: &str =
    "http://schemas.openxmlformats.org/package/2006/content-types";

pub const REL_TYPE_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub const REL_TYPE_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
pub const REL_TYPE_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
pub const REL_TYPE_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

/// Content type of the main part of a regular presentation.
pub const CT_PRESENTATION_MAIN: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";

/// Content type of the main part of a presentation template (.potx).
pub const CT_TEMPLATE_MAIN: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.template.main+xml";

/// Content type of an individual slide part.
pub const CT_SLIDE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";

/// Package path of the content types manifest.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Package path of the presentation main part.
pub const PRESENTATION_PART: &str = "ppt/presentation.xml";

/// Manifest part name of the presentation main part (leading slash included).
pub const PRESENTATION_PART_NAME: &str = "/ppt/presentation.xml";

/// English Metric Units per inch, the coordinate unit of DrawingML geometry.
pub const EMU_PER_INCH: i64 = 914_400;

/// First slide id PowerPoint hands out for new decks.
pub const FIRST_SLIDE_ID: u32 = 256;
