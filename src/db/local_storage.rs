// src/db/local_storage.rs

use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use async_trait::async_trait;

use crate::{
    common::error::AppError,
    db::store::{Snapshot, STORAGE_KEY},
};

// Onde o documento completo do estado é gravado.
#[async_trait]
pub trait StateStorage: Send + Sync {
    async fn load(&self) -> Result<Option<Snapshot>, AppError>;
    async fn save(&self, snapshot: &Snapshot) -> Result<(), AppError>;
}

// ---
// Arquivo JSON em disco: <DATA_DIR>/pls-obras-data.json
// ---
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(format!("{STORAGE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StateStorage for JsonFileStorage {
    async fn load(&self) -> Result<Option<Snapshot>, AppError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), AppError> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        let bytes = serde_json::to_vec(snapshot)?;

        // Escreve num temporário e renomeia: o arquivo nunca fica pela metade.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::debug!("💾 Estado gravado em {} ({} bytes)", self.path.display(), bytes.len());
        Ok(())
    }
}

// Armazenamento em memória (testes e execução sem disco)
#[derive(Default)]
pub struct MemoryStorage {
    saved: Mutex<Option<Snapshot>>,
}

#[async_trait]
impl StateStorage for MemoryStorage {
    async fn load(&self) -> Result<Option<Snapshot>, AppError> {
        let saved = self
            .saved
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock do armazenamento envenenado: {}", e))?;
        Ok(saved.clone())
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), AppError> {
        let mut saved = self
            .saved
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock do armazenamento envenenado: {}", e))?;
        *saved = Some(snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::Project;
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[tokio::test]
    async fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path());
        assert!(storage.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn saved_snapshot_is_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("dados"));

        let mut snapshot = Snapshot::default();
        snapshot.projects.insert(Project {
            id: Uuid::new_v4(),
            name: "Obra Centro".into(),
            city: None,
            active: true,
            created_at: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        });
        storage.save(&snapshot).await.unwrap();

        assert!(storage.path().ends_with("pls-obras-data.json"));
        assert!(!storage.path().with_extension("json.tmp").exists());
        assert_eq!(storage.load().await.unwrap(), Some(snapshot));
    }

    #[tokio::test]
    async fn decimals_survive_the_file_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path());

        let mut snapshot = Snapshot::default();
        snapshot.config.default_markup = "0.123456789012345678".parse().unwrap();
        storage.save(&snapshot).await.unwrap();

        let loaded = storage.load().await.unwrap().unwrap();
        assert_eq!(loaded.config.default_markup.to_string(), "0.123456789012345678");
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path());
        tokio::fs::write(storage.path(), b"{ nope").await.unwrap();
        assert!(storage.load().await.is_err());
    }
}
