//! Hashing utilities for release archive checksums.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Compute SHA256 hash of a reader.
pub fn sha256_reader<R: Read>(mut reader: R) -> std::io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Compute SHA256 hash of a file on disk.
pub fn sha256_file(path: &Path) -> std::io::Result<String> {
    sha256_reader(File::open(path)?)
}

/// Write `<archive>.sha256` next to `archive` in `sha256sum` format.
///
/// Returns the path of the checksum file.
pub fn write_checksum_file(archive: &Path) -> std::io::Result<std::path::PathBuf> {
    let digest = sha256_file(archive)?;
    let file_name = archive
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut sum_name = archive.as_os_str().to_owned();
    sum_name.push(".sha256");
    let sum_path = std::path::PathBuf::from(sum_name);

    std::fs::write(&sum_path, format!("{}  {}\n", digest, file_name))?;
    Ok(sum_path)
}
