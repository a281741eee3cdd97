// src/services/seed.rs
//
// Dados de demonstração, criados apenas quando o estado está vazio.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{Snapshot, Store},
    models::{
        catalog::{Product, ProductKind, Supplier},
        project::Project,
        purchase::{ExternalPurchase, PurchaseItem},
        stock::ReturnRecord,
        voucher::{ItemSource, Signature, Voucher, VoucherItem, VoucherStatus},
    },
};

/// Grava os dados de demonstração se não houver nenhuma obra.
/// Retorna `true` quando algo foi criado.
pub async fn seed_if_empty(store: &Store) -> Result<bool, AppError> {
    let mut tx = store.begin().await;
    if !tx.projects.is_empty() {
        return Ok(false);
    }

    fill_demo_data(&mut tx, Utc::now());
    tx.commit().await?;

    tracing::info!("🌱 Dados de demonstração criados");
    Ok(true)
}

fn project(name: &str, city: &str, now: DateTime<Utc>) -> Project {
    Project {
        id: Uuid::new_v4(),
        name: name.into(),
        city: Some(city.into()),
        active: true,
        created_at: now.date_naive(),
    }
}

fn product(name: &str, category: &str, unit: &str, sku: &str, price: Decimal, stock: i64) -> Product {
    Product {
        id: Uuid::new_v4(),
        name: name.into(),
        category: Some(category.into()),
        unit: unit.into(),
        sku: Some(sku.into()),
        price: Some(price),
        stock: Decimal::from(stock),
        active: true,
        kind: ProductKind::Resale,
    }
}

fn supplier(name: &str, tax_id: &str, contact: &str) -> Supplier {
    Supplier {
        id: Uuid::new_v4(),
        name: name.into(),
        tax_id: Some(tax_id.into()),
        contact: Some(contact.into()),
        active: true,
    }
}

pub(crate) fn fill_demo_data(state: &mut Snapshot, now: DateTime<Utc>) {
    let center = state.projects.insert(project("Obra Residencial Centro", "São Paulo", now));
    state.projects.insert(project("Obra Comercial Norte", "Rio de Janeiro", now));

    let cement = state.products.insert(product(
        "Cimento CP II-E-32",
        "Materiais Básicos",
        "SC",
        "CIM001",
        Decimal::new(2550, 2),
        100,
    ));
    let sand = state.products.insert(product(
        "Areia Média",
        "Materiais Básicos",
        "M³",
        "ARE001",
        Decimal::new(45, 0),
        50,
    ));
    state.products.insert(product("Brita 1", "Materiais Básicos", "M³", "BRI001", Decimal::new(48, 0), 30));
    state.products.insert(product("Tijolo 6 furos", "Alvenaria", "UN", "TIJ001", Decimal::new(85, 2), 5000));
    state.products.insert(product("Vergalhão CA-50 8mm", "Estrutura", "KG", "VER001", Decimal::new(650, 2), 200));

    let abc = state
        .suppliers
        .insert(supplier("Construtora ABC Ltda", "12.345.678/0001-90", "(11) 98765-4321"));
    state
        .suppliers
        .insert(supplier("Materiais XYZ", "98.765.432/0001-10", "(21) 91234-5678"));

    // Talão entregue com devolução parcial (10 entregues, 3 devolvidos)
    let item_id = Uuid::new_v4();
    let voucher = state.vouchers.insert(Voucher {
        id: Uuid::new_v4(),
        number: "TAL-000001".into(),
        project_id: center.id,
        requester: "João Silva".into(),
        status: VoucherStatus::PartiallyReturned,
        items: vec![VoucherItem {
            id: item_id,
            product_id: Some(cement.id),
            description: Some(cement.name.clone()),
            quantity: Decimal::TEN,
            unit: cement.unit.clone(),
            source: ItemSource::Stock,
            unit_price: cement.price,
            delivered_quantity: Decimal::TEN,
            returned_quantity: Decimal::new(3, 0),
            purchase_links: Vec::new(),
        }],
        signature: Some(Signature {
            receiver_name: "Maria Santos".into(),
            tax_id: Some("123.456.789-00".into()),
            signed_at: now,
            image_data_url: None,
        }),
        created_at: now.date_naive(),
    });
    state.returns.insert(ReturnRecord {
        id: Uuid::new_v4(),
        voucher_id: voucher.id,
        voucher_item_id: item_id,
        quantity: Decimal::new(3, 0),
        reason: Some("Material com defeito".into()),
        created_at: now,
    });

    // Compra externa: custo 35,00 com markup padrão de 20%
    state.purchases.insert(ExternalPurchase {
        id: Uuid::new_v4(),
        supplier_id: abc.id,
        project_id: None,
        invoice_number: Some("NF-12345".into()),
        date: now.date_naive(),
        attachments: Vec::new(),
        items: vec![PurchaseItem {
            id: Uuid::new_v4(),
            product_id: Some(sand.id),
            description: sand.name.clone(),
            quantity: Decimal::new(5, 0),
            unit: sand.unit.clone(),
            unit_cost: Decimal::new(35, 0),
            applied_markup: Decimal::new(20, 2),
            project_unit_price: Decimal::new(42, 0),
        }],
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStorage;
    use std::sync::Arc;

    #[tokio::test]
    async fn seeds_only_an_empty_store() {
        let store = Store::open(Arc::new(MemoryStorage::default()), Snapshot::default())
            .await
            .unwrap();

        assert!(seed_if_empty(&store).await.unwrap());
        assert!(!seed_if_empty(&store).await.unwrap());

        let state = store.read().await;
        assert_eq!(state.projects.len(), 2);
        assert_eq!(state.products.len(), 5);
        assert_eq!(state.suppliers.len(), 2);

        let voucher = state.vouchers.iter().next().unwrap();
        assert_eq!(voucher.status, voucher.status_after_return());
    }
}
