// src/db/store.rs

use std::{
    ops::{Deref, DerefMut},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use tokio::sync::{watch, OwnedRwLockWriteGuard, RwLock, RwLockReadGuard};

use crate::{
    common::error::AppError,
    db::{local_storage::StateStorage, table::Table},
    models::{
        catalog::{Product, Supplier},
        markup::MarkupRule,
        project::Project,
        purchase::ExternalPurchase,
        settings::Settings,
        stock::{ReturnRecord, StockAdjustment},
        voucher::Voucher,
    },
};

/// Chave única sob a qual todo o estado é persistido.
pub const STORAGE_KEY: &str = "pls-obras-data";

// O conjunto completo de coleções. É o mesmo documento usado no armazenamento
// local e no backup (exportar/importar).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub projects: Table<Project>,
    #[serde(default)]
    pub products: Table<Product>,
    #[serde(default)]
    pub suppliers: Table<Supplier>,
    #[serde(default)]
    pub vouchers: Table<Voucher>,
    #[serde(default)]
    pub purchases: Table<ExternalPurchase>,
    #[serde(default)]
    pub returns: Table<ReturnRecord>,
    #[serde(default)]
    pub markup_rules: Table<MarkupRule>,
    #[serde(default)]
    pub stock_adjustments: Table<StockAdjustment>,
    #[serde(default)]
    pub config: Settings,
}

/// Documento de importação: só as chaves presentes substituem o estado atual.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SnapshotImport {
    pub projects: Option<Table<Project>>,
    pub products: Option<Table<Product>>,
    pub suppliers: Option<Table<Supplier>>,
    pub vouchers: Option<Table<Voucher>>,
    pub purchases: Option<Table<ExternalPurchase>>,
    pub returns: Option<Table<ReturnRecord>>,
    pub markup_rules: Option<Table<MarkupRule>>,
    pub stock_adjustments: Option<Table<StockAdjustment>>,
    pub config: Option<Settings>,
}

impl SnapshotImport {
    /// Merge raso sobre o estado atual.
    pub fn merge_into(self, target: &mut Snapshot) {
        if let Some(v) = self.projects {
            target.projects = v;
        }
        if let Some(v) = self.products {
            target.products = v;
        }
        if let Some(v) = self.suppliers {
            target.suppliers = v;
        }
        if let Some(v) = self.vouchers {
            target.vouchers = v;
        }
        if let Some(v) = self.purchases {
            target.purchases = v;
        }
        if let Some(v) = self.returns {
            target.returns = v;
        }
        if let Some(v) = self.markup_rules {
            target.markup_rules = v;
        }
        if let Some(v) = self.stock_adjustments {
            target.stock_adjustments = v;
        }
        if let Some(v) = self.config {
            target.config = v;
        }
    }
}

// ---
// Store: o estado em memória + o armazenamento onde ele é gravado.
// ---
#[derive(Clone)]
pub struct Store {
    state: Arc<RwLock<Snapshot>>,
    storage: Arc<dyn StateStorage>,
    // Contador de versões; o SyncWorker observa este canal.
    changes: watch::Sender<u64>,
}

impl Store {
    /// Carrega o estado gravado ou começa com `initial` quando não há nada salvo.
    pub async fn open(storage: Arc<dyn StateStorage>, initial: Snapshot) -> Result<Self, AppError> {
        let state = match storage.load().await? {
            Some(snapshot) => {
                tracing::info!(
                    "📦 Estado local carregado: {} obras, {} produtos, {} talões",
                    snapshot.projects.len(),
                    snapshot.products.len(),
                    snapshot.vouchers.len()
                );
                snapshot
            }
            None => {
                tracing::info!("📦 Nenhum estado local encontrado, iniciando vazio.");
                initial
            }
        };

        let (changes, _) = watch::channel(0);
        Ok(Self {
            state: Arc::new(RwLock::new(state)),
            storage,
            changes,
        })
    }

    /// Leitura compartilhada (várias ao mesmo tempo).
    pub async fn read(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.state.read().await
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.state.read().await.clone()
    }

    /// Abre uma "transação": trava a escrita e trabalha sobre um rascunho.
    /// Se o `StoreTx` for descartado sem `commit`, nada muda.
    pub async fn begin(&self) -> StoreTx {
        let guard = self.state.clone().write_owned().await;
        let draft = guard.clone();
        StoreTx {
            guard,
            draft,
            storage: self.storage.clone(),
            changes: self.changes.clone(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }
}

pub struct StoreTx {
    guard: OwnedRwLockWriteGuard<Snapshot>,
    draft: Snapshot,
    storage: Arc<dyn StateStorage>,
    changes: watch::Sender<u64>,
}

impl StoreTx {
    /// Grava o rascunho no armazenamento local, publica e avisa o sincronizador.
    pub async fn commit(self) -> Result<(), AppError> {
        let changes = self.changes.clone();
        self.persist().await?;
        changes.send_modify(|version| *version += 1);
        Ok(())
    }

    /// Como `commit`, mas sem disparar um push remoto
    /// (usado pelo próprio sincronizador para não entrar em laço).
    pub async fn commit_local(self) -> Result<(), AppError> {
        self.persist().await
    }

    async fn persist(self) -> Result<(), AppError> {
        let StoreTx {
            mut guard,
            draft,
            storage,
            ..
        } = self;
        // Grava primeiro: se o disco falhar, o estado em memória fica intacto.
        storage.save(&draft).await?;
        *guard = draft;
        Ok(())
    }
}

impl Deref for StoreTx {
    type Target = Snapshot;

    fn deref(&self) -> &Self::Target {
        &self.draft
    }
}

impl DerefMut for StoreTx {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.draft
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::local_storage::MemoryStorage;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn project(name: &str) -> Project {
        Project {
            id: Uuid::new_v4(),
            name: name.into(),
            city: None,
            active: true,
            created_at: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn dropped_transaction_leaves_state_untouched() {
        let store = Store::open(Arc::new(MemoryStorage::default()), Snapshot::default())
            .await
            .unwrap();

        {
            let mut tx = store.begin().await;
            tx.projects.insert(project("Rascunho"));
            // sem commit
        }

        assert!(store.read().await.projects.is_empty());
    }

    #[tokio::test]
    async fn commit_persists_and_bumps_version() {
        let storage = Arc::new(MemoryStorage::default());
        let store = Store::open(storage.clone(), Snapshot::default()).await.unwrap();
        let mut changes = store.subscribe();

        let mut tx = store.begin().await;
        tx.projects.insert(project("Obra Norte"));
        tx.commit().await.unwrap();

        assert_eq!(store.read().await.projects.len(), 1);
        assert!(changes.has_changed().unwrap());
        assert_eq!(*changes.borrow_and_update(), 1);

        let saved = storage.load().await.unwrap().unwrap();
        assert_eq!(saved.projects.len(), 1);
    }

    #[tokio::test]
    async fn commit_local_does_not_notify() {
        let store = Store::open(Arc::new(MemoryStorage::default()), Snapshot::default())
            .await
            .unwrap();
        let changes = store.subscribe();

        let mut tx = store.begin().await;
        tx.config.sync.enabled = true;
        tx.commit_local().await.unwrap();

        assert!(store.read().await.config.sync.enabled);
        assert!(!changes.has_changed().unwrap());
    }

    #[test]
    fn import_merges_only_present_keys() {
        let mut current = Snapshot::default();
        current.projects.insert(project("Mantida"));

        let doc: SnapshotImport = serde_json::from_str(r#"{ "suppliers": [] }"#).unwrap();
        doc.merge_into(&mut current);

        assert_eq!(current.projects.len(), 1);
    }
}
