// src/services/project_service.rs

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ProjectRepository, Store},
    models::project::{CreateProjectPayload, Project, UpdateProjectPayload},
};

#[derive(Clone)]
pub struct ProjectService {
    store: Store,
    repo: ProjectRepository,
}

impl ProjectService {
    pub fn new(store: Store, repo: ProjectRepository) -> Self {
        Self { store, repo }
    }

    pub async fn list(&self, only_active: bool) -> Vec<Project> {
        self.repo.list(only_active).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Project, AppError> {
        self.repo.find(id).await
    }

    pub async fn create(&self, payload: CreateProjectPayload) -> Result<Project, AppError> {
        let mut tx = self.store.begin().await;

        let project = self.repo.insert(
            &mut tx,
            Project {
                id: Uuid::new_v4(),
                name: payload.name,
                city: payload.city,
                active: payload.active,
                created_at: Utc::now().date_naive(),
            },
        );

        tx.commit().await?;
        tracing::info!("🏗️ Obra criada: {}", project.name);
        Ok(project)
    }

    pub async fn update(&self, id: Uuid, payload: UpdateProjectPayload) -> Result<Project, AppError> {
        let mut tx = self.store.begin().await;
        let project = self.repo.update(&mut tx, id, |p| payload.apply_to(p))?;
        tx.commit().await?;
        Ok(project)
    }

    /// Remove a obra. Os talões dela permanecem (sem exclusão em cascata).
    pub async fn delete(&self, id: Uuid) -> Result<Project, AppError> {
        let mut tx = self.store.begin().await;

        let project = self.repo.delete(&mut tx, id)?;
        let orphans = self.repo.vouchers_of(&tx, id).len();

        tx.commit().await?;

        if orphans > 0 {
            tracing::warn!(
                "🗑️ Obra '{}' excluída; {} talão(ões) continuam apontando para ela",
                project.name,
                orphans
            );
        }
        Ok(project)
    }
}
