// src/db/catalog_repo.rs

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{Snapshot, Store},
    models::{
        catalog::{Product, Supplier},
        stock::StockAdjustment,
    },
};

#[derive(Clone)]
pub struct CatalogRepository {
    store: Store,
}

impl CatalogRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    // ---
    // Produtos
    // ---

    pub async fn list_products(&self, category: Option<&str>) -> Vec<Product> {
        let state = self.store.read().await;
        let mut products =
            state.products.filter(|p| category.is_none_or(|c| p.category.as_deref() == Some(c)));
        products.sort_by(|a, b| a.name.cmp(&b.name));
        products
    }

    pub async fn find_product(&self, id: Uuid) -> Result<Product, AppError> {
        self.store
            .read()
            .await
            .products
            .get(id)
            .cloned()
            .ok_or(AppError::not_found("Produto", id))
    }

    pub fn insert_product(&self, tx: &mut Snapshot, product: Product) -> Product {
        tx.products.insert(product)
    }

    pub fn update_product<F>(&self, tx: &mut Snapshot, id: Uuid, f: F) -> Result<Product, AppError>
    where
        F: FnOnce(&mut Product),
    {
        tx.products.update(id, f).ok_or(AppError::not_found("Produto", id))
    }

    pub fn delete_product(&self, tx: &mut Snapshot, id: Uuid) -> Result<Product, AppError> {
        tx.products.remove(id).ok_or(AppError::not_found("Produto", id))
    }

    /// Soma `delta` ao saldo do produto e registra o ajuste no livro-razão.
    /// Saldo negativo é permitido (o material já saiu fisicamente).
    pub fn apply_stock_delta(
        &self,
        tx: &mut Snapshot,
        product_id: Uuid,
        delta: Decimal,
        reason: String,
    ) -> Result<StockAdjustment, AppError> {
        let product = tx
            .products
            .update(product_id, |p| p.stock = p.stock.saturating_add(delta))
            .ok_or(AppError::not_found("Produto", product_id))?;

        if product.stock < Decimal::ZERO {
            tracing::warn!(
                "⚠️ Estoque negativo para '{}': {} {}",
                product.name,
                product.stock,
                product.unit
            );
        }

        let adjustment = StockAdjustment {
            id: Uuid::new_v4(),
            product_id,
            delta,
            reason,
            created_at: Utc::now(),
        };
        Ok(tx.stock_adjustments.insert(adjustment))
    }

    pub async fn list_adjustments(&self, product_id: Option<Uuid>) -> Vec<StockAdjustment> {
        let state = self.store.read().await;
        let mut adjustments = state
            .stock_adjustments
            .filter(|a| product_id.is_none_or(|id| a.product_id == id));
        adjustments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        adjustments
    }

    // ---
    // Fornecedores
    // ---

    pub async fn list_suppliers(&self) -> Vec<Supplier> {
        let state = self.store.read().await;
        let mut suppliers = state.suppliers.to_vec();
        suppliers.sort_by(|a, b| a.name.cmp(&b.name));
        suppliers
    }

    pub async fn find_supplier(&self, id: Uuid) -> Result<Supplier, AppError> {
        self.store
            .read()
            .await
            .suppliers
            .get(id)
            .cloned()
            .ok_or(AppError::not_found("Fornecedor", id))
    }

    pub fn insert_supplier(&self, tx: &mut Snapshot, supplier: Supplier) -> Supplier {
        tx.suppliers.insert(supplier)
    }

    pub fn update_supplier<F>(&self, tx: &mut Snapshot, id: Uuid, f: F) -> Result<Supplier, AppError>
    where
        F: FnOnce(&mut Supplier),
    {
        tx.suppliers.update(id, f).ok_or(AppError::not_found("Fornecedor", id))
    }

    pub fn delete_supplier(&self, tx: &mut Snapshot, id: Uuid) -> Result<Supplier, AppError> {
        tx.suppliers.remove(id).ok_or(AppError::not_found("Fornecedor", id))
    }
}
