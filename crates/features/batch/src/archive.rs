use crate::error::BatchError;
use crate::generator::GeneratedDocument;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Packs generated documents into one flat, deflate-compressed zip.
///
/// # Errors
/// [`BatchError::Zip`] or [`BatchError::Io`] if writing an entry fails.
pub fn build_archive(documents: &[GeneratedDocument]) -> Result<Vec<u8>, BatchError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for document in documents {
        zip.start_file(document.file_name.as_str(), options)?;
        zip.write_all(&document.bytes)?;
    }

    Ok(zip.finish()?.into_inner())
}
