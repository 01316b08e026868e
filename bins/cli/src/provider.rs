//! Entity data read from a directory of JSON files.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use consolidator_core::entity::{EntityData, EntityDataProvider, FetchError};
use consolidator_shared::types::EntityId;
use tracing::debug;

/// Reads `<dir>/<entity id>.json` for each entity.
#[derive(Debug, Clone)]
pub struct FileEntityProvider {
    dir: PathBuf,
}

impl FileEntityProvider {
    /// Creates a provider over a data directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File holding an entity's data.
    pub fn path_for(&self, entity_id: EntityId) -> PathBuf {
        self.dir.join(format!("{entity_id}.json"))
    }
}

#[async_trait]
impl EntityDataProvider for FileEntityProvider {
    async fn fetch(&self, entity_id: EntityId) -> Result<EntityData, FetchError> {
        let path = self.path_for(entity_id);
        debug!(path = %path.display(), "Reading entity data");

        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(FetchError::NotFound(entity_id)),
            Err(e) => {
                return Err(FetchError::unavailable(
                    entity_id,
                    format!("failed to read '{}': {e}", path.display()),
                ));
            }
        };

        serde_json::from_str(&contents).map_err(|e| {
            FetchError::unavailable(
                entity_id,
                format!("failed to parse '{}': {e}", path.display()),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("consolidator-cli-{}", EntityId::new()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_reads_entity_file() {
        let dir = scratch_dir();
        let id = EntityId::new();
        let json = format!(
            r#"{{
                "entity": {{ "id": "{id}", "name": "Parent Ltd" }},
                "lines": [
                    {{ "grouping_code": "A.120.01", "closing_cy": "100", "closing_py": "80", "is_mapped": true }}
                ],
                "classifier": {{
                    "A.120.01": {{
                        "grouping_name": "Cash",
                        "minor_head_code": "A.120",
                        "minor_head_name": "Cash and Cash Equivalents",
                        "major_head_code": "A",
                        "major_head_name": "Assets"
                    }}
                }}
            }}"#
        );
        std::fs::write(dir.join(format!("{id}.json")), json).unwrap();

        let data = FileEntityProvider::new(&dir).fetch(id).await.unwrap();

        assert_eq!(data.entity.name, "Parent Ltd");
        assert_eq!(data.lines.len(), 1);
        assert!(data.classifier.get("A.120.01").is_some());
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = scratch_dir();
        let id = EntityId::new();

        let err = FileEntityProvider::new(&dir).fetch(id).await.unwrap_err();

        assert_eq!(err, FetchError::NotFound(id));
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_malformed_file_is_unavailable() {
        let dir = scratch_dir();
        let id = EntityId::new();
        std::fs::write(dir.join(format!("{id}.json")), "{ not json").unwrap();

        let err = FileEntityProvider::new(&dir).fetch(id).await.unwrap_err();

        assert!(matches!(err, FetchError::Unavailable { entity_id, .. } if entity_id == id));
        std::fs::remove_dir_all(dir).ok();
    }
}
