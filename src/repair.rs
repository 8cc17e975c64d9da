use crate::constants::CONTENT_TYPES_PART;
use crate::content_types::ContentTypes;
use crate::Result;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;

/// Fixes the content type declared for the main part of a saved package.
///
/// A deck assembled from a `.potx` still carries the template identifier in
/// its manifest; consumers refuse to open such a file as a presentation.
/// The manifest entry is rewritten, every other archive entry is copied
/// raw so its bytes (and compression) are untouched, and the result
/// replaces the original via a side file and a rename — a failed repair
/// never leaves a half-written package where a valid one used to be.
///
/// Running the repair on an already repaired package reproduces the same
/// manifest, byte for byte.
pub fn repair_package(path: &Path) -> Result<()> {
    let side_path = side_path_for(path);

    if let Err(e) = rewrite(path, &side_path) {
        let _ = fs::remove_file(&side_path);
        return Err(e);
    }

    fs::rename(&side_path, path)?;
    Ok(())
}

fn side_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".repair");
    path.with_file_name(name)
}

fn rewrite(path: &Path, side_path: &Path) -> Result<()> {
    let file = fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    let out = fs::File::create(side_path)?;
    let mut writer = zip::ZipWriter::new(out);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for i in 0..archive.len() {
        let is_manifest = {
            let entry = archive.by_index_raw(i)?;
            entry.name() == CONTENT_TYPES_PART
        };

        if is_manifest {
            let mut xml = Vec::new();
            archive.by_index(i)?.read_to_end(&mut xml)?;

            let mut content_types = ContentTypes::parse(&xml)?;
            content_types.mark_main_part_as_presentation();

            writer.start_file(CONTENT_TYPES_PART, options)?;
            writer.write_all(content_types.to_xml().as_bytes())?;
        } else {
            let entry = archive.by_index_raw(i)?;
            writer.raw_copy_file(entry)?;
        }
    }

    writer.finish()?;
    Ok(())
}
