// src/services/sync_worker.rs
//
// Tarefa em segundo plano que envia o estado ao espelho remoto depois de
// cada alteração, com debounce.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{oneshot, watch, Notify},
    task::JoinHandle,
    time::Instant,
};

use crate::{models::sync::SyncStatus, services::sync_service::SyncService};

pub struct SyncWorker {
    service: SyncService,
    changes: watch::Receiver<u64>,
    debounce: Duration,
    status: watch::Sender<SyncStatus>,
    trigger: Arc<Notify>,
}

/// Controle do worker em execução.
pub struct SyncHandle {
    status: watch::Receiver<SyncStatus>,
    trigger: Arc<Notify>,
    shutdown: Option<oneshot::Sender<()>>,
    join: JoinHandle<SyncStatus>,
}

impl SyncWorker {
    pub fn start(service: SyncService, changes: watch::Receiver<u64>, debounce: Duration) -> SyncHandle {
        let (status_tx, status_rx) = watch::channel(SyncStatus {
            running: true,
            ..SyncStatus::default()
        });
        let trigger = Arc::new(Notify::new());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let worker = SyncWorker {
            service,
            changes,
            debounce,
            status: status_tx,
            trigger: trigger.clone(),
        };
        let join = tokio::spawn(worker.run(shutdown_rx));

        tracing::info!("🔄 Sincronizador iniciado (debounce de {} ms)", debounce.as_millis());
        SyncHandle {
            status: status_rx,
            trigger,
            shutdown: Some(shutdown_tx),
            join,
        }
    }

    async fn run(mut self, mut shutdown: oneshot::Receiver<()>) -> SyncStatus {
        let mut pending = false;
        let mut deadline = Instant::now();

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    // Não perde a última alteração.
                    if pending || self.changes.has_changed().unwrap_or(false) {
                        self.push_once().await;
                    }
                    break;
                }
                changed = self.changes.changed() => match changed {
                    Ok(()) => {
                        pending = true;
                        deadline = Instant::now() + self.debounce;
                    }
                    // O Store foi descartado: nada mais vai mudar.
                    Err(_) => {
                        if pending {
                            self.push_once().await;
                        }
                        break;
                    }
                },
                _ = self.trigger.notified() => {
                    pending = false;
                    self.push_once().await;
                }
                _ = tokio::time::sleep_until(deadline), if pending => {
                    pending = false;
                    self.push_once().await;
                }
            }
        }

        self.status.send_modify(|s| s.running = false);
        tracing::info!("🔄 Sincronizador encerrado");
        self.status.borrow().clone()
    }

    async fn push_once(&self) {
        let enabled = self.service.is_enabled().await;
        self.status.send_modify(|s| s.enabled = enabled);
        if !enabled {
            tracing::debug!("Sincronização desligada; push ignorado");
            return;
        }

        match self.service.push().await {
            Ok(report) => self.status.send_modify(|s| {
                s.pushes += 1;
                s.last_success = Some(report.finished_at);
                s.last_error = None;
            }),
            Err(e) => {
                tracing::error!("☁️ Falha no push automático: {}", e);
                self.status.send_modify(|s| {
                    s.failures += 1;
                    s.last_error = Some(e.to_string());
                });
            }
        }
    }
}

impl SyncHandle {
    pub fn status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    /// Receptor para quem precisa acompanhar o status (ex.: `AppState`).
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status.clone()
    }

    /// Força um push imediato, ignorando o debounce.
    pub fn sync_now(&self) {
        self.trigger.notify_one();
    }

    /// Encerra o worker (enviando alterações pendentes) e devolve o status final.
    pub async fn stop(mut self) -> SyncStatus {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        match self.join.await {
            Ok(status) => status,
            Err(e) => {
                tracing::error!("Sincronizador terminou com erro: {}", e);
                self.status.borrow().clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryMirror, MemoryStorage, RemoteMirror, RemoteTable, Snapshot, Store};
    use crate::models::project::Project;
    use chrono::NaiveDate;
    use uuid::Uuid;

    async fn setup() -> (Store, Arc<MemoryMirror>, SyncService) {
        let mut initial = Snapshot::default();
        initial.config.sync.enabled = true;
        let store = Store::open(Arc::new(MemoryStorage::default()), initial)
            .await
            .unwrap();
        let mirror = Arc::new(MemoryMirror::default());
        let service = SyncService::new(store.clone(), Some(mirror.clone() as Arc<dyn RemoteMirror>));
        (store, mirror, service)
    }

    async fn add_project(store: &Store, name: &str) {
        let mut tx = store.begin().await;
        tx.projects.insert(Project {
            id: Uuid::new_v4(),
            name: name.into(),
            city: None,
            active: true,
            created_at: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        });
        tx.commit().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_changes_is_pushed_once_after_debounce() {
        let (store, mirror, service) = setup().await;
        let handle = SyncWorker::start(service, store.subscribe(), Duration::from_millis(2000));

        add_project(&store, "A").await;
        add_project(&store, "B").await;
        add_project(&store, "C").await;

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(mirror.rows(RemoteTable::Projects).is_empty());

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(mirror.rows(RemoteTable::Projects).len(), 3);

        let status = handle.stop().await;
        assert_eq!(status.pushes, 1);
        assert!(!status.running);
        assert!(store.read().await.config.sync.last_sync.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_flushes_pending_change() {
        let (store, mirror, service) = setup().await;
        let handle = SyncWorker::start(service, store.subscribe(), Duration::from_secs(60));

        add_project(&store, "A").await;
        tokio::task::yield_now().await;

        let status = handle.stop().await;
        assert_eq!(status.pushes, 1);
        assert_eq!(mirror.rows(RemoteTable::Projects).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sync_now_skips_the_debounce() {
        let (store, mirror, service) = setup().await;
        let handle = SyncWorker::start(service, store.subscribe(), Duration::from_secs(60));

        add_project(&store, "A").await;
        handle.sync_now();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(mirror.rows(RemoteTable::Projects).len(), 1);
        assert_eq!(handle.status().pushes, 1);
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_sync_does_not_push() {
        let (store, mirror, service) = setup().await;
        {
            let mut tx = store.begin().await;
            tx.config.sync.enabled = false;
            tx.commit_local().await.unwrap();
        }
        let handle = SyncWorker::start(service, store.subscribe(), Duration::from_millis(100));

        add_project(&store, "A").await;
        tokio::time::sleep(Duration::from_millis(500)).await;

        let status = handle.stop().await;
        assert_eq!(status.pushes, 0);
        assert!(!status.enabled);
        assert!(mirror.batches().is_empty());
    }
}
