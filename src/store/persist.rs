//! Durable table image
//!
//! The image is a single file:
//!
//! ```text
//! crc32:xxxxxxxx
//! {"universes":{...},"families":{...},"people":{...},"next_ids":{...}}
//! ```
//!
//! The checksum covers the JSON body exactly as written. Writes go to a
//! sibling temp file which is fsynced and then renamed over the image, so a
//! reader sees either the previous image or the new one.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::checksum::{compute_checksum, format_checksum, parse_checksum};
use super::errors::{StoreError, StoreResult};
use super::tables::Tables;

/// File name of the image inside the data directory
pub const IMAGE_FILE: &str = "tables.json";

const TEMP_SUFFIX: &str = ".tmp";

/// Path of the image inside `data_dir`
pub fn image_path(data_dir: &Path) -> PathBuf {
    data_dir.join(IMAGE_FILE)
}

/// Encode tables into the on-disk image format
pub fn encode_image(tables: &Tables) -> StoreResult<String> {
    let body = serde_json::to_string(tables)?;
    let checksum = compute_checksum(body.as_bytes());
    Ok(format!("{}\n{}", format_checksum(checksum), body))
}

/// Decode and verify an image
pub fn decode_image(content: &str) -> StoreResult<Tables> {
    let (header, body) = content
        .split_once('\n')
        .ok_or_else(|| StoreError::Corrupted("missing checksum header".to_string()))?;

    let expected = parse_checksum(header.trim_end())
        .ok_or_else(|| StoreError::Corrupted(format!("malformed checksum header '{}'", header)))?;
    let actual = compute_checksum(body.as_bytes());
    if expected != actual {
        return Err(StoreError::Corrupted(format!(
            "checksum mismatch: expected {}, found {}",
            format_checksum(expected),
            format_checksum(actual)
        )));
    }

    Ok(serde_json::from_str(body)?)
}

/// Write the image atomically (temp file, fsync, rename).
pub fn write_image(path: &Path, tables: &Tables) -> StoreResult<()> {
    let encoded = encode_image(tables)?;

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(TEMP_SUFFIX);
    let temp_path = PathBuf::from(temp_name);

    let mut file = File::create(&temp_path).map_err(|e| StoreError::io_at(&temp_path, e))?;
    file.write_all(encoded.as_bytes())
        .map_err(|e| StoreError::io_at(&temp_path, e))?;
    file.sync_all().map_err(|e| StoreError::io_at(&temp_path, e))?;
    drop(file);

    fs::rename(&temp_path, path).map_err(|e| StoreError::io_at(path, e))?;

    if let Some(dir) = path.parent() {
        // Directory fsync is best effort; not every platform allows opening a directory.
        if let Ok(dir_handle) = File::open(dir) {
            let _ = dir_handle.sync_all();
        }
    }

    Ok(())
}

/// Read the image, or `None` if the file does not exist yet.
pub fn read_image(path: &Path) -> StoreResult<Option<Tables>> {
    match fs::read_to_string(path) {
        Ok(content) => decode_image(&content).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::io_at(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_tables() -> Tables {
        let mut tables = Tables::new();
        let universe = tables.insert_universe("Alpha");
        tables.insert_family(7, 10, Some(universe.id)).unwrap();
        tables
    }

    #[test]
    fn test_missing_image_reads_as_none() {
        let dir = TempDir::new().unwrap();
        assert!(read_image(&image_path(dir.path())).unwrap().is_none());
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = image_path(dir.path());
        let tables = sample_tables();

        write_image(&path, &tables).unwrap();

        assert_eq!(read_image(&path).unwrap(), Some(tables));
        assert!(!dir.path().join("tables.json.tmp").exists());
    }

    #[test]
    fn test_corrupted_body_detected() {
        let dir = TempDir::new().unwrap();
        let path = image_path(dir.path());
        write_image(&path, &sample_tables()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        fs::write(&path, content.replace("\"fam_power\":10", "\"fam_power\":99")).unwrap();

        let err = read_image(&path).unwrap_err();
        assert!(matches!(err, StoreError::Corrupted(_)));
        assert!(err.to_string().contains("checksum"));
    }

    #[test]
    fn test_missing_header_detected() {
        let err = decode_image("{}").unwrap_err();
        assert!(matches!(err, StoreError::Corrupted(_)));
    }
}
