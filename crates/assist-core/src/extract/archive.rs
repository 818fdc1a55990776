use super::ExtractError;
use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Member paths of a ZIP archive in central-directory order.
pub(super) fn list_zip(path: &Path) -> Result<String, ExtractError> {
    let file = File::open(path).map_err(archive_err)?;
    let mut archive = zip::ZipArchive::new(file).map_err(archive_err)?;

    let mut names = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive.by_index_raw(index).map_err(archive_err)?;
        names.push(entry.name().to_string());
    }

    Ok(format!("Archive Type: ZIP\nContents:\n{}", names.join("\n")))
}

/// Member paths of a TAR archive, plain or gzip/bzip2 compressed.
pub(super) fn list_tar(path: &Path) -> Result<String, ExtractError> {
    let mut file = File::open(path).map_err(archive_err)?;
    let compression = sniff_compression(&mut file).map_err(archive_err)?;
    let reader: Box<dyn Read> = match compression {
        Compression::Gzip => Box::new(GzDecoder::new(file)),
        Compression::Bzip2 => Box::new(BzDecoder::new(file)),
        Compression::None => Box::new(file),
    };

    let mut archive = tar::Archive::new(reader);
    let mut names = Vec::new();
    for entry in archive.entries().map_err(archive_err)? {
        let entry = entry.map_err(archive_err)?;
        let name = entry.path().map_err(archive_err)?;
        names.push(name.to_string_lossy().trim_end_matches('/').to_string());
    }

    Ok(format!("Archive Type: TAR\nContents:\n{}", names.join("\n")))
}

#[derive(Debug, PartialEq, Eq)]
enum Compression {
    None,
    Gzip,
    Bzip2,
}

/// Detect compression from magic bytes, leaving the file rewound.
fn sniff_compression(file: &mut File) -> std::io::Result<Compression> {
    let mut magic = [0u8; 3];
    let mut read = 0;
    while read < magic.len() {
        let n = file.read(&mut magic[read..])?;
        if n == 0 {
            break;
        }
        read += n;
    }
    file.seek(SeekFrom::Start(0))?;

    Ok(match &magic[..read] {
        [0x1f, 0x8b, ..] => Compression::Gzip,
        [b'B', b'Z', b'h'] => Compression::Bzip2,
        _ => Compression::None,
    })
}

fn archive_err(e: impl std::fmt::Display) -> ExtractError {
    ExtractError::Archive(e.to_string())
}
