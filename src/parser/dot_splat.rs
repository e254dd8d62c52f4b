use std::fs;
use std::path::Path;

use crate::error::{SortError, SortResult};
use crate::record::RECORD_SIZE;

/// Reads a `.splat` file as raw records. The file must hold at least one
/// whole record and nothing else.
pub fn load_splat_file(path: &Path) -> SortResult<Vec<u8>> {
    let data = fs::read(path)?;
    if data.len() % RECORD_SIZE != 0 {
        return Err(SortError::misaligned_splat_file(data.len()));
    }
    if data.len() < RECORD_SIZE {
        return Err(SortError::InvalidSplatFile(format!(
            "'{}' is too small",
            path.display()
        )));
    }

    log::debug!(
        "read {} splats from {}",
        data.len() / RECORD_SIZE,
        path.display()
    );
    Ok(data)
}

pub fn write_splat_file(path: &Path, records: &[u8]) -> SortResult<()> {
    if records.len() % RECORD_SIZE != 0 {
        return Err(SortError::misaligned_splat_file(records.len()));
    }
    fs::write(path, records)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::generate_demo_records;

    #[test]
    fn written_scene_loads_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scene.splat");
        let records = generate_demo_records(64, 3);

        write_splat_file(&path, &records).expect("write");
        assert_eq!(load_splat_file(&path).expect("load"), records);
    }

    #[test]
    fn partial_and_empty_files_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");

        let partial = dir.path().join("partial.splat");
        fs::write(&partial, vec![0u8; RECORD_SIZE + 7]).expect("write");
        assert!(matches!(
            load_splat_file(&partial),
            Err(SortError::InvalidSplatFile(_))
        ));

        let empty = dir.path().join("empty.splat");
        fs::write(&empty, b"").expect("write");
        assert!(matches!(
            load_splat_file(&empty),
            Err(SortError::InvalidSplatFile(_))
        ));

        assert!(matches!(
            load_splat_file(&dir.path().join("missing.splat")),
            Err(SortError::Io(_))
        ));
    }

    #[test]
    fn misaligned_records_are_not_written() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.splat");
        assert!(write_splat_file(&path, &[0u8; 5]).is_err());
        assert!(!path.exists());
    }
}
