use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::geojson::FeatureCollection;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    /// Present but unparsable. Never treated as empty, or prior geocodes would be lost.
    #[error("{path} is not a valid feature collection: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to encode feature collection: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Reads the collection at `path`. Absent, zero-byte and whitespace-only files
/// are an empty collection.
pub fn load(path: &Path) -> Result<FeatureCollection, StoreError> {
    let contents = match fs::read_to_string(path) {
        Ok(x) => x,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("{} does not exist, starting empty", path.display());
            return Ok(FeatureCollection::new());
        }
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if contents.trim().is_empty() {
        debug!("{} is empty, starting empty", path.display());
        return Ok(FeatureCollection::new());
    }

    serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Replaces the file at `path` in one step: a reader sees either the old
/// collection or the new one.
pub fn save(path: &Path, collection: &FeatureCollection) -> Result<(), StoreError> {
    let mut output = serde_json::to_string_pretty(collection)?;
    output.push('\n');

    let write_err = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(x) if !x.as_os_str().is_empty() => x,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir).map_err(write_err)?;
    file.write_all(output.as_bytes()).map_err(write_err)?;
    file.persist(path).map_err(|e| write_err(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use geo::Point;

    use super::*;
    use crate::{
        address::normalize,
        geojson::{Feature, Properties},
    };

    #[test]
    fn absent_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load(&dir.path().join("missing.json")).unwrap();
        assert_eq!(
            serde_json::to_string(&loaded).unwrap(),
            r#"{"type":"FeatureCollection","features":[]}"#
        );
    }

    #[test]
    fn empty_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "").unwrap();
        assert!(load(&path).unwrap().is_empty());
        fs::write(&path, "\n  \n").unwrap();
        assert!(load(&path).unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{\"type\": \"FeatureCollection\", \"features\": [").unwrap();
        assert!(matches!(load(&path), Err(StoreError::Corrupt { .. })));
        // untouched
        assert!(fs::read_to_string(&path).unwrap().ends_with('['));
    }

    #[test]
    fn loads_legacy_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed_geo_data.json");
        fs::write(
            &path,
            r#"{"type": "FeatureCollection", "features": [{"type": "Feature", "geometry": {"type": "Point", "coordinates": [-80.08, 42.12]}, "properties": {"id": 3, "Name": "joe's bar", "address": "100 oak st, erie, pa 16501", "customerType": "On Premise"}}]}"#,
        )
        .unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.features[0].id, 3);
        assert_eq!(loaded.features[0].properties.address, "100 oak st, erie, pa 16501");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "old contents").unwrap();

        let mut collection = FeatureCollection::new();
        collection.features.push(Feature::new(
            0,
            Point::new(-80.1, 42.1),
            Properties::new("a", &normalize("1 Main St"), "Retail"),
        ));
        save(&path, &collection).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.ends_with("}\n"));
        assert_eq!(load(&path).unwrap(), collection);
    }
}
