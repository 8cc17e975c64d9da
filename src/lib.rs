mod compose;
mod constants;
mod container;
mod content_types;
mod fetch;
mod generate;
mod layout;
mod outline;
mod presentation;
mod rels;
mod repair;
mod resolve;
mod xmlwrite;

pub use compose::{picture_rect, SlideBuilder};
pub use container::{OpenOptions, PptxPackage};
pub use content_types::ContentTypes;
pub use fetch::{image_source_from_key, FetchOutcome, ImageSource, KeyedSearch, RedirectFetch};
pub use generate::generate;
pub use layout::{FrameRole, Layout, PlaceholderFrame, Rect};
pub use outline::{normalize, Outline, SlideContent, SlideEntry};
pub use presentation::SlideSize;
pub use rels::{Relationship, Relationships};
pub use repair::repair_package;
pub use resolve::{resolve_frames, ResolvedFrames};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Package part not found: {0}")]
    PartNotFound(String),

    #[error("Unsupported main part content type: {0}")]
    UnsupportedPackage(String),

    #[error("Template does not provide slide layout {0}")]
    LayoutMissing(usize),

    #[error("Parse error: {0}")]
    ParseError(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
