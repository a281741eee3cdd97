// src/services/catalog_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, Store},
    models::{
        catalog::{
            CreateProductPayload, CreateSupplierPayload, Product, Supplier, UpdateProductPayload,
            UpdateSupplierPayload,
        },
        stock::{StockAdjustment, StockAdjustmentPayload},
    },
};

#[derive(Clone)]
pub struct CatalogService {
    store: Store,
    repo: CatalogRepository,
}

impl CatalogService {
    pub fn new(store: Store, repo: CatalogRepository) -> Self {
        Self { store, repo }
    }

    // ---
    // Produtos
    // ---

    pub async fn list_products(&self, category: Option<&str>) -> Vec<Product> {
        self.repo.list_products(category).await
    }

    pub async fn get_product(&self, id: Uuid) -> Result<Product, AppError> {
        self.repo.find_product(id).await
    }

    pub async fn create_product(&self, payload: CreateProductPayload) -> Result<Product, AppError> {
        let mut tx = self.store.begin().await;
        let product = self.repo.insert_product(
            &mut tx,
            Product {
                id: Uuid::new_v4(),
                name: payload.name,
                category: payload.category,
                unit: payload.unit,
                sku: payload.sku,
                price: payload.price,
                stock: payload.stock,
                active: payload.active,
                kind: payload.kind,
            },
        );
        tx.commit().await?;
        Ok(product)
    }

    pub async fn update_product(
        &self,
        id: Uuid,
        payload: UpdateProductPayload,
    ) -> Result<Product, AppError> {
        let mut tx = self.store.begin().await;
        let product = self.repo.update_product(&mut tx, id, |p| payload.apply_to(p))?;
        tx.commit().await?;
        Ok(product)
    }

    pub async fn delete_product(&self, id: Uuid) -> Result<Product, AppError> {
        let mut tx = self.store.begin().await;
        let product = self.repo.delete_product(&mut tx, id)?;
        tx.commit().await?;
        Ok(product)
    }

    /// Ajuste manual de estoque (entrada ou saída), com motivo obrigatório.
    pub async fn adjust_stock(
        &self,
        product_id: Uuid,
        payload: StockAdjustmentPayload,
    ) -> Result<StockAdjustment, AppError> {
        let mut tx = self.store.begin().await;
        let adjustment =
            self.repo
                .apply_stock_delta(&mut tx, product_id, payload.delta, payload.reason)?;
        tx.commit().await?;

        tracing::info!("📦 Ajuste de estoque: produto {} ({})", product_id, adjustment.delta);
        Ok(adjustment)
    }

    pub async fn list_adjustments(&self, product_id: Option<Uuid>) -> Vec<StockAdjustment> {
        self.repo.list_adjustments(product_id).await
    }

    // ---
    // Fornecedores
    // ---

    pub async fn list_suppliers(&self) -> Vec<Supplier> {
        self.repo.list_suppliers().await
    }

    pub async fn get_supplier(&self, id: Uuid) -> Result<Supplier, AppError> {
        self.repo.find_supplier(id).await
    }

    pub async fn create_supplier(&self, payload: CreateSupplierPayload) -> Result<Supplier, AppError> {
        let mut tx = self.store.begin().await;
        let supplier = self.repo.insert_supplier(
            &mut tx,
            Supplier {
                id: Uuid::new_v4(),
                name: payload.name,
                tax_id: payload.tax_id,
                contact: payload.contact,
                active: payload.active,
            },
        );
        tx.commit().await?;
        Ok(supplier)
    }

    pub async fn update_supplier(
        &self,
        id: Uuid,
        payload: UpdateSupplierPayload,
    ) -> Result<Supplier, AppError> {
        let mut tx = self.store.begin().await;
        let supplier = self.repo.update_supplier(&mut tx, id, |s| payload.apply_to(s))?;
        tx.commit().await?;
        Ok(supplier)
    }

    pub async fn delete_supplier(&self, id: Uuid) -> Result<Supplier, AppError> {
        let mut tx = self.store.begin().await;
        let supplier = self.repo.delete_supplier(&mut tx, id)?;
        tx.commit().await?;
        Ok(supplier)
    }
}
