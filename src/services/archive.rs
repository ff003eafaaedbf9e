use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, thiserror::Error)]
pub(crate) enum ArchiveError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}

/// Appends " (2)", " (3)", ... before the extension until `name` is not taken yet.
fn unique_entry_name(taken: &mut HashSet<String>, name: &str) -> String {
    let (stem, extension) = match name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => (stem, Some(extension)),
        _ => (name, None),
    };

    let mut candidate = name.to_string();
    let mut counter = 1;

    while taken.contains(&candidate) {
        counter += 1;
        candidate = match extension {
            Some(extension) => format!("{} ({}).{}", stem, counter, extension),
            None => format!("{} ({})", stem, counter),
        };
    }

    taken.insert(candidate.clone());
    candidate
}

/// Packs `(source, entry name)` pairs into a new zip archive at `archive_path`,
/// in the given order. Audio is already compressed, so entries are stored as is.
/// Repeated entry names get a numeric suffix.
pub(crate) fn pack_files(
    files: &[(PathBuf, String)],
    archive_path: &Path,
) -> Result<(), ArchiveError> {
    let mut writer = ZipWriter::new(File::create(archive_path)?);
    let options = FileOptions::default().compression_method(CompressionMethod::Stored);
    let mut taken = HashSet::with_capacity(files.len());

    for (source, name) in files {
        writer.start_file(unique_entry_name(&mut taken, name), options)?;
        std::io::copy(&mut File::open(source)?, &mut writer)?;
    }

    writer.finish()?;

    Ok(())
}
