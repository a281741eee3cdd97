// src/db/settings_repo.rs
//
// Configurações (chave `config`) e regras de markup: tudo que define
// como o custo vira preço para a obra.

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{Snapshot, Store},
    models::{markup::MarkupRule, settings::Settings},
};

#[derive(Clone)]
pub struct SettingsRepository {
    store: Store,
}

impl SettingsRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn get_settings(&self) -> Settings {
        self.store.read().await.config.clone()
    }

    pub fn update_settings<F>(&self, tx: &mut Snapshot, f: F) -> Settings
    where
        F: FnOnce(&mut Settings),
    {
        f(&mut tx.config);
        tx.config.clone()
    }

    // ---
    // Regras de markup
    // ---

    pub async fn list_rules(&self) -> Vec<MarkupRule> {
        self.store.read().await.markup_rules.to_vec()
    }

    pub async fn find_rule(&self, id: Uuid) -> Result<MarkupRule, AppError> {
        self.store
            .read()
            .await
            .markup_rules
            .get(id)
            .cloned()
            .ok_or(AppError::not_found("Regra de markup", id))
    }

    pub fn insert_rule(&self, tx: &mut Snapshot, rule: MarkupRule) -> MarkupRule {
        tx.markup_rules.insert(rule)
    }

    pub fn update_rule<F>(&self, tx: &mut Snapshot, id: Uuid, f: F) -> Result<MarkupRule, AppError>
    where
        F: FnOnce(&mut MarkupRule),
    {
        tx.markup_rules
            .update(id, f)
            .ok_or(AppError::not_found("Regra de markup", id))
    }

    pub fn delete_rule(&self, tx: &mut Snapshot, id: Uuid) -> Result<MarkupRule, AppError> {
        tx.markup_rules
            .remove(id)
            .ok_or(AppError::not_found("Regra de markup", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::MemoryStorage, models::settings::UpdateSettingsRequest};
    use rust_decimal::Decimal;
    use std::sync::Arc;

    #[tokio::test]
    async fn update_changes_only_given_fields() {
        let store = Store::open(Arc::new(MemoryStorage::default()), Snapshot::default())
            .await
            .unwrap();
        let repo = SettingsRepository::new(store.clone());

        let mut tx = store.begin().await;
        let request = UpdateSettingsRequest {
            default_markup: Some(Decimal::new(25, 2)),
            ..UpdateSettingsRequest::default()
        };
        repo.update_settings(&mut tx, |s| request.apply_to(s));
        tx.commit().await.unwrap();

        let settings = repo.get_settings().await;
        assert_eq!(settings.default_markup, Decimal::new(25, 2));
        assert_eq!(settings, Settings {
            default_markup: Decimal::new(25, 2),
            ..Settings::default()
        });
    }
}
