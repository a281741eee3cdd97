// src/db/project_repo.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{Snapshot, Store},
    models::{project::Project, voucher::Voucher},
};

#[derive(Clone)]
pub struct ProjectRepository {
    store: Store,
}

impl ProjectRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    // ---
    // Leitura (lock compartilhado)
    // ---

    pub async fn list(&self, only_active: bool) -> Vec<Project> {
        let state = self.store.read().await;
        let mut projects = state.projects.filter(|p| !only_active || p.active);
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        projects
    }

    pub async fn find(&self, id: Uuid) -> Result<Project, AppError> {
        self.store
            .read()
            .await
            .projects
            .get(id)
            .cloned()
            .ok_or(AppError::not_found("Obra", id))
    }

    // ---
    // Escrita (sempre dentro de uma transação do Store)
    // ---

    pub fn insert(&self, tx: &mut Snapshot, project: Project) -> Project {
        tx.projects.insert(project)
    }

    pub fn update<F>(&self, tx: &mut Snapshot, id: Uuid, f: F) -> Result<Project, AppError>
    where
        F: FnOnce(&mut Project),
    {
        tx.projects.update(id, f).ok_or(AppError::not_found("Obra", id))
    }

    pub fn delete(&self, tx: &mut Snapshot, id: Uuid) -> Result<Project, AppError> {
        tx.projects.remove(id).ok_or(AppError::not_found("Obra", id))
    }

    /// Talões que apontam para a obra (continuam existindo após a exclusão).
    pub fn vouchers_of(&self, tx: &Snapshot, id: Uuid) -> Vec<Voucher> {
        tx.vouchers.filter(|v| v.project_id == id)
    }
}
