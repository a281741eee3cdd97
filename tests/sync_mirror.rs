mod common;

use chrono::NaiveDate;
use common::{d, harness, signature};
use pls_obras::{
    common::error::AppError,
    db::{MemoryStorage, RemoteTable, Snapshot, Store},
    models::{
        project::Project,
        sync::SyncDirection,
        voucher::{CreateVoucherPayload, ItemDelivery, RecordDeliveryPayload},
    },
    services::{sync_service::CHUNK_SIZE, SyncService},
};
use std::sync::Arc;
use uuid::Uuid;

fn project(i: usize) -> Project {
    Project {
        id: Uuid::new_v4(),
        name: format!("Obra {i:04}"),
        city: None,
        active: true,
        created_at: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
    }
}

#[tokio::test]
async fn push_splits_large_tables_into_chunks() {
    let h = harness().await;
    {
        let mut tx = h.store.begin().await;
        for i in 0..(2 * CHUNK_SIZE + 201) {
            tx.projects.insert(project(i));
        }
        tx.commit_local().await.unwrap();
    }

    let report = h.sync.push().await.unwrap();
    assert_eq!(report.direction, SyncDirection::Push);
    assert_eq!(report.total_rows(), 2 * CHUNK_SIZE + 201);

    let project_batches: Vec<usize> = h
        .mirror
        .batches()
        .into_iter()
        .filter(|(table, _)| *table == RemoteTable::Projects)
        .map(|(_, size)| size)
        .collect();
    assert_eq!(project_batches, vec![CHUNK_SIZE, CHUNK_SIZE, 201]);
    assert_eq!(h.mirror.rows(RemoteTable::Projects).len(), 2 * CHUNK_SIZE + 201);
    assert!(h.store.read().await.config.sync.last_sync.is_some());
}

#[tokio::test]
async fn failing_table_aborts_push_and_keeps_what_was_sent() {
    let h = harness().await;
    let project = h.project("Obra Centro").await;
    let cement = h.product("Cimento", "Materiais Básicos", "25.50", "100").await;
    h.voucher(&project, &cement, "10").await;

    h.mirror.fail_on(RemoteTable::Vouchers);
    let result = h.sync.push().await;
    assert!(matches!(result, Err(AppError::SyncFailed { table: "vouchers", .. })));

    // Tabelas anteriores já estão no remoto; as seguintes não foram enviadas.
    assert_eq!(h.mirror.rows(RemoteTable::Projects).len(), 1);
    assert_eq!(h.mirror.rows(RemoteTable::Products).len(), 1);
    assert!(h.mirror.rows(RemoteTable::VoucherItems).is_empty());
    assert!(h.store.read().await.config.sync.last_sync.is_none());
}

#[tokio::test]
async fn pull_rebuilds_nested_items_in_order() {
    let h = harness().await;
    let project = h.project("Obra Centro").await;
    let cement = h.product("Cimento", "Materiais Básicos", "25.50", "100").await;
    let sand = h.product("Areia", "Materiais Básicos", "45", "50").await;

    let voucher = h
        .vouchers
        .create(CreateVoucherPayload {
            project_id: project.id,
            requester: "Carlos".into(),
            items: vec![common::stock_item(&cement, "10"), common::stock_item(&sand, "2")],
        })
        .await
        .unwrap();
    let voucher = h
        .vouchers
        .record_delivery(
            voucher.id,
            RecordDeliveryPayload {
                items: voucher
                    .items
                    .iter()
                    .map(|i| ItemDelivery {
                        item_id: i.id,
                        delivered_quantity: i.quantity,
                    })
                    .collect(),
                signature: Some(signature()),
            },
        )
        .await
        .unwrap();

    h.sync.push().await.unwrap();
    assert_eq!(h.mirror.rows(RemoteTable::VoucherItems).len(), 2);

    // O remoto não garante ordem: inverte os itens
    let mut items = h.mirror.rows(RemoteTable::VoucherItems);
    items.reverse();
    h.mirror.seed(RemoteTable::VoucherItems, items);

    // Estado local apagado antes do pull
    let adjustments_before = h.store.read().await.stock_adjustments.len();
    {
        let mut tx = h.store.begin().await;
        tx.vouchers.replace_all(vec![]);
        tx.projects.replace_all(vec![]);
        tx.commit_local().await.unwrap();
    }

    let report = h.sync.pull().await.unwrap();
    assert_eq!(report.direction, SyncDirection::Pull);

    let pulled = h.vouchers.get(voucher.id).await.unwrap();
    assert_eq!(pulled, voucher);
    assert_eq!(pulled.items[0].product_id, Some(cement.id));
    assert_eq!(pulled.items[1].quantity, d("2"));
    assert_eq!(h.projects.get(project.id).await.unwrap(), project);

    // Ajustes de estoque não são espelhados
    assert_eq!(h.store.read().await.stock_adjustments.len(), adjustments_before);
}

#[tokio::test]
async fn pull_ignores_items_without_parent() {
    let h = harness().await;
    let project = h.project("Obra Centro").await;
    let cement = h.product("Cimento", "Materiais Básicos", "25.50", "100").await;
    let voucher = h.voucher(&project, &cement, "10").await;
    h.sync.push().await.unwrap();

    // Some o talão remoto, mas o item continua lá
    h.mirror.seed(RemoteTable::Vouchers, vec![]);
    h.sync.pull().await.unwrap();

    assert!(h.vouchers.get(voucher.id).await.is_err());
}

#[tokio::test]
async fn sync_without_mirror_is_disabled() {
    let store = Store::open(Arc::new(MemoryStorage::default()), Snapshot::default())
        .await
        .unwrap();
    let sync = SyncService::new(store, None);

    assert!(!sync.is_configured());
    assert!(!sync.is_enabled().await);
    assert!(matches!(sync.push().await, Err(AppError::SyncDisabled)));
    assert!(matches!(sync.pull().await, Err(AppError::SyncDisabled)));
}
