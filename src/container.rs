use crate::constants::{
    CONTENT_TYPES_PART, CT_PRESENTATION_MAIN, CT_TEMPLATE_MAIN, PRESENTATION_PART_NAME,
};
use crate::content_types::ContentTypes;
use crate::{Error, Result};
use std::io::{Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;

/// Content type identifiers a package is allowed to carry on its main part.
///
/// The generator opens both finished presentations (`.pptx`) and design
/// templates (`.potx`); anything else is rejected at open time. Callers that
/// only want one of the two can pass their own list.
#[derive(Debug, Clone)]
pub struct OpenOptions {
    pub accepted_main_types: Vec<String>,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            accepted_main_types: vec![
                CT_PRESENTATION_MAIN.to_string(),
                CT_TEMPLATE_MAIN.to_string(),
            ],
        }
    }
}

/// Holds the internal representation of a loaded PowerPoint package.
///
/// `PptxPackage` keeps every archive entry in memory, in archive order, so
/// parts can be read, replaced, added and removed freely before the package
/// is written back out. Entry order is preserved across a load/save cycle.
pub struct PptxPackage {
    entries: Vec<PackageEntry>,
}

#[derive(Debug)]
struct PackageEntry {
    name: String,
    data: Vec<u8>,
}

impl PptxPackage {
    /// A package with no entries; parts are added with [`Self::set_part`].
    pub(crate) fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Opens a package, accepting both presentation and template main parts.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with(path, &OpenOptions::default())
    }

    /// Opens a package and validates its main part content type against
    /// `options.accepted_main_types`.
    ///
    /// # Errors
    ///
    /// Returns an error on file access problems, failures during the
    /// unzipping process, a missing `[Content_Types].xml`, or a main part
    /// declared with a content type outside the accepted set.
    pub fn open_with(path: &Path, options: &OpenOptions) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let mut archive = zip::ZipArchive::new(file)?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            entries.push(PackageEntry { name, data });
        }

        let package = Self { entries };
        package.validate_main_type(options)?;
        Ok(package)
    }

    fn validate_main_type(&self, options: &OpenOptions) -> Result<()> {
        let manifest = self.part_required(CONTENT_TYPES_PART)?;
        let content_types = ContentTypes::parse(manifest)?;
        let main_type = content_types
            .override_for(PRESENTATION_PART_NAME)
            .ok_or(Error::ParseError("no content type declared for the main part"))?;

        if options.accepted_main_types.iter().any(|t| t == main_type) {
            Ok(())
        } else {
            Err(Error::UnsupportedPackage(main_type.to_string()))
        }
    }

    /// Returns the raw bytes of a part, or `None` if the package has no
    /// entry under that name.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.data.as_slice())
    }

    /// Returns the raw bytes of a part that must exist.
    pub fn part_required(&self, name: &str) -> Result<&[u8]> {
        self.part(name)
            .ok_or_else(|| Error::PartNotFound(name.to_string()))
    }

    /// Replaces a part's content, or appends a new entry if the name is not
    /// present yet.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.data = data,
            None => self.entries.push(PackageEntry {
                name: name.to_string(),
                data,
            }),
        }
    }

    /// Removes a part by name. Returns whether an entry was removed.
    pub fn remove_part(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.name != name);
        self.entries.len() != before
    }

    /// Removes every part whose name matches the predicate.
    pub fn remove_parts_where<F: Fn(&str) -> bool>(&mut self, predicate: F) {
        self.entries.retain(|e| !predicate(&e.name));
    }

    /// All part names, in archive order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Writes the package to `path` as a Deflate-compressed ZIP archive,
    /// entries in their current order.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let mut writer = zip::ZipWriter::new(file);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        for entry in &self.entries {
            writer.start_file(entry.name.as_str(), options)?;
            writer.write_all(&entry.data)?;
        }
        writer.finish()?;
        Ok(())
    }
}
