// src/db/purchase_repo.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{Snapshot, Store},
    models::purchase::ExternalPurchase,
};

#[derive(Clone)]
pub struct PurchaseRepository {
    store: Store,
}

impl PurchaseRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn list(
        &self,
        supplier_id: Option<Uuid>,
        project_id: Option<Uuid>,
    ) -> Vec<ExternalPurchase> {
        let state = self.store.read().await;
        let mut purchases = state.purchases.filter(|p| {
            supplier_id.is_none_or(|id| p.supplier_id == id)
                && project_id.is_none_or(|id| p.project_id == Some(id))
        });
        purchases.sort_by(|a, b| b.date.cmp(&a.date));
        purchases
    }

    pub async fn find(&self, id: Uuid) -> Result<ExternalPurchase, AppError> {
        self.store
            .read()
            .await
            .purchases
            .get(id)
            .cloned()
            .ok_or(AppError::not_found("Compra externa", id))
    }

    /// Localiza a compra que contém o item.
    pub fn find_by_item<'a>(
        &self,
        tx: &'a Snapshot,
        purchase_item_id: Uuid,
    ) -> Result<&'a ExternalPurchase, AppError> {
        tx.purchases
            .iter()
            .find(|p| p.item(purchase_item_id).is_some())
            .ok_or(AppError::not_found("Item de compra", purchase_item_id))
    }

    pub fn insert(&self, tx: &mut Snapshot, purchase: ExternalPurchase) -> ExternalPurchase {
        tx.purchases.insert(purchase)
    }

    pub fn update<F>(&self, tx: &mut Snapshot, id: Uuid, f: F) -> Result<ExternalPurchase, AppError>
    where
        F: FnOnce(&mut ExternalPurchase),
    {
        tx.purchases
            .update(id, f)
            .ok_or(AppError::not_found("Compra externa", id))
    }

    pub fn delete(&self, tx: &mut Snapshot, id: Uuid) -> Result<ExternalPurchase, AppError> {
        tx.purchases
            .remove(id)
            .ok_or(AppError::not_found("Compra externa", id))
    }
}
