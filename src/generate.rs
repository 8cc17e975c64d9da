use crate::compose::{picture_rect, SlideBuilder};
use crate::constants::{
    CONTENT_TYPES_PART, CT_SLIDE, FIRST_SLIDE_ID, PRESENTATION_PART, REL_TYPE_IMAGE,
    REL_TYPE_SLIDE, REL_TYPE_SLIDE_LAYOUT,
};
use crate::container::PptxPackage;
use crate::content_types::ContentTypes;
use crate::fetch::{FetchOutcome, ImageSource};
use crate::layout;
use crate::outline::{self, Outline};
use crate::presentation;
use crate::rels::{rels_path_for, Relationships};
use crate::resolve::resolve_frames;
use crate::{repair, Error, Result};
use image::ImageFormat;
use log::{debug, warn};
use std::path::Path;
use std::thread;
use std::time::Duration;
use tempfile::TempPath;

const FETCH_ATTEMPTS: u32 = 3;
const FETCH_BACKOFF_STEP: Duration = Duration::from_millis(500);

/// Assembles a deck from `outline` by populating the template at
/// `template_path` and writes the finished package to `output_path`.
///
/// The run is strictly sequential: entries compose in outline order, the
/// package is saved exactly once, the saved file is repaired, and every
/// temporary image asset is removed at the end regardless of how its slide
/// fared. Per-slide anomalies (no image found, corrupt image bytes, missing
/// placeholder) degrade that slide and continue; template, output and
/// repair failures abort.
pub fn generate(
    template_path: &Path,
    output_path: &Path,
    outline: &Outline,
    images: &dyn ImageSource,
) -> Result<()> {
    let slides = outline::normalize(outline);

    let mut package = PptxPackage::open(template_path)?;
    let info = presentation::parse(package.part_required(PRESENTATION_PART)?)?;
    let layouts = layout::layouts_of_first_master(&package, info.master_rel_id.as_deref())?;

    let mut content_types = ContentTypes::parse(package.part_required(CONTENT_TYPES_PART)?)?;
    let pres_rels_path = rels_path_for(PRESENTATION_PART);
    let mut pres_rels = Relationships::parse(package.part_required(&pres_rels_path)?)?;

    clear_slides(&mut package, &mut pres_rels, &mut content_types, &info);

    let mut temp_assets: Vec<TempPath> = Vec::new();
    let mut slide_entries: Vec<(u32, String)> = Vec::new();
    let mut media_seq = next_media_number(&package);

    for (i, slide) in slides.iter().enumerate() {
        let layout_index = usize::from(i != 0);
        let slide_layout = layouts
            .get(layout_index)
            .ok_or(Error::LayoutMissing(layout_index))?;

        let slide_path = format!("ppt/slides/slide{}.xml", i + 1);
        let mut slide_rels = Relationships::default();
        slide_rels.add(REL_TYPE_SLIDE_LAYOUT, &layout_target(&slide_layout.path));

        let mut builder = SlideBuilder::from_layout(slide_layout);
        let resolved = resolve_frames(&builder.frames(), i);

        // The opening slide never receives an image; neither does a slide
        // whose normalized query came up empty.
        if i > 0 && !slide.query.is_empty() {
            if let Some(asset) = fetch_with_retries(images, &slide.query, i) {
                let placed = place_image(
                    &mut package,
                    &mut content_types,
                    &mut slide_rels,
                    &mut builder,
                    info.slide_size,
                    &asset,
                    &mut media_seq,
                );
                if let Err(e) = placed {
                    warn!("slide {i}: image placement failed, continuing without image: {e}");
                }
                temp_assets.push(asset);
            }
        }

        if let Some(title_index) = resolved.title {
            if !slide.title.is_empty() {
                builder.set_title(title_index, &slide.title);
            }
        }
        if let (Some(body_index), Some(bullets)) = (resolved.body, slide.bullets.as_ref()) {
            builder.set_bullets(body_index, bullets);
        }

        // Single z-order pass after image placement and text population.
        builder.move_text_to_front(resolved.title);

        package.set_part(&slide_path, builder.to_xml().into_bytes());
        package.set_part(&rels_path_for(&slide_path), slide_rels.to_xml().into_bytes());
        content_types.set_override(&format!("/{slide_path}"), CT_SLIDE);

        let rel_id = pres_rels.add(REL_TYPE_SLIDE, &format!("slides/slide{}.xml", i + 1));
        slide_entries.push((FIRST_SLIDE_ID + i as u32, rel_id));
        debug!("composed slide {} of {}", i + 1, slides.len());
    }

    let pres_xml = presentation::replace_slide_list(
        package.part_required(PRESENTATION_PART)?,
        &slide_entries,
    )?;
    package.set_part(PRESENTATION_PART, pres_xml.into_bytes());
    package.set_part(&pres_rels_path, pres_rels.to_xml().into_bytes());
    package.set_part(CONTENT_TYPES_PART, content_types.to_xml().into_bytes());

    package.save(output_path)?;
    repair::repair_package(output_path)?;

    for asset in temp_assets {
        if let Err(e) = asset.close() {
            debug!("could not remove image temp file: {e}");
        }
    }

    Ok(())
}

/// Drops every pre-existing slide instance: the parts and their rels, the
/// manifest overrides, and the presentation-level relationships. Layout,
/// master and theme definitions stay.
fn clear_slides(
    package: &mut PptxPackage,
    pres_rels: &mut Relationships,
    content_types: &mut ContentTypes,
    info: &presentation::PresentationInfo,
) {
    for rel_id in &info.slide_rel_ids {
        pres_rels.remove(rel_id);
    }
    content_types.remove_overrides_with_prefix("/ppt/slides/");
    package.remove_parts_where(|name| name.starts_with("ppt/slides/"));
}

/// Relationship target of a layout part from inside `ppt/slides/`.
fn layout_target(layout_path: &str) -> String {
    format!(
        "../{}",
        layout_path.strip_prefix("ppt/").unwrap_or(layout_path)
    )
}

/// Streams an image for `query` into a fresh temp file, retrying with
/// linearly increasing backoff. Each attempt gets its own file so a partial
/// body from a failed attempt is never mistaken for a result.
fn fetch_with_retries(
    images: &dyn ImageSource,
    query: &str,
    slide_index: usize,
) -> Option<TempPath> {
    for attempt in 1..=FETCH_ATTEMPTS {
        let file = match tempfile::Builder::new().prefix("outline-pptx-").tempfile() {
            Ok(file) => file,
            Err(e) => {
                warn!("slide {slide_index}: could not create image temp file: {e}");
                return None;
            }
        };
        let (mut file, path) = file.into_parts();

        match images.fetch(query, &mut file) {
            FetchOutcome::Fetched => return Some(path),
            FetchOutcome::NotFound => {
                drop(file);
                if let Err(e) = path.close() {
                    debug!("could not remove image temp file: {e}");
                }
                if attempt < FETCH_ATTEMPTS {
                    let backoff = FETCH_BACKOFF_STEP * attempt;
                    debug!(
                        "slide {slide_index}: image fetch attempt {attempt} failed, retrying in {:?}",
                        backoff
                    );
                    thread::sleep(backoff);
                }
            }
        }
    }

    warn!("slide {slide_index}: no image found for '{query}', composing without one");
    None
}

/// Embeds the fetched asset as a media part and a picture shape. Errors
/// here (unreadable file, unrecognized or unsupported format) are soft: the
/// caller logs and the slide continues without an image.
fn place_image(
    package: &mut PptxPackage,
    content_types: &mut ContentTypes,
    slide_rels: &mut Relationships,
    builder: &mut SlideBuilder,
    slide_size: presentation::SlideSize,
    asset: &TempPath,
    media_seq: &mut u32,
) -> Result<()> {
    let reader = image::io::Reader::open(asset)?.with_guessed_format()?;
    let format = reader
        .format()
        .ok_or(Error::ParseError("unrecognized image format"))?;
    let (ext, mime) = match format {
        ImageFormat::Jpeg => ("jpg", "image/jpeg"),
        ImageFormat::Png => ("png", "image/png"),
        ImageFormat::Gif => ("gif", "image/gif"),
        ImageFormat::Bmp => ("bmp", "image/bmp"),
        _ => return Err(Error::ParseError("unsupported image format")),
    };
    let (width, height) = reader.into_dimensions()?;
    if width == 0 || height == 0 {
        return Err(Error::ParseError("image has a zero dimension"));
    }

    let number = *media_seq;
    *media_seq += 1;

    package.set_part(
        &format!("ppt/media/image{number}.{ext}"),
        std::fs::read(asset)?,
    );
    content_types.ensure_default(ext, mime);

    let rel_id = slide_rels.add(REL_TYPE_IMAGE, &format!("../media/image{number}.{ext}"));
    builder.add_picture(&rel_id, picture_rect(slide_size, width, height));
    Ok(())
}

/// First free `imageN` number under `ppt/media/`.
fn next_media_number(package: &PptxPackage) -> u32 {
    package
        .part_names()
        .filter_map(|name| name.strip_prefix("ppt/media/image"))
        .filter_map(|rest| rest.split('.').next())
        .filter_map(|digits| digits.parse::<u32>().ok())
        .max()
        .map_or(1, |n| n + 1)
}
