mod common;

use common::{d, harness, harness_with, signature, stock_item, Harness};
use pls_obras::{
    common::error::AppError,
    db::Snapshot,
    models::{
        catalog::Product,
        project::Project,
        purchase::{CreatePurchasePayload, ExternalPurchase, NewPurchaseItem, PurchaseItem},
        report::ReportFilter,
        voucher::{
            CreateVoucherPayload, ItemDelivery, ItemSource, NewVoucherItem, RecordDeliveryPayload,
            RegisterReturnPayload, Voucher, VoucherStatus,
        },
    },
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use uuid::Uuid;

async fn deliver(h: &Harness, voucher: &Voucher) -> Voucher {
    h.vouchers
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
        .unwrap()
}

struct Scenario {
    center: Project,
    north: Project,
    sand: Product,
}

// Centro: talão entregue (10 cimentos, 3 devolvidos) e outro pendente.
// Norte: talão com areia e uma locação avulsa, entregue por completo.
async fn scenario(h: &Harness) -> Scenario {
    let center = h.project("Obra Centro").await;
    let north = h.project("Obra Norte").await;
    let cement = h.product("Cimento", "Materiais Básicos", "25.50", "100").await;
    let sand = h.product("Areia", "Materiais Básicos", "45", "8").await;

    let first = h.voucher(&center, &cement, "10").await;
    let first = deliver(h, &first).await;
    h.vouchers
        .register_return(
            first.id,
            RegisterReturnPayload {
                item_id: first.items[0].id,
                quantity: d("3"),
                reason: None,
            },
        )
        .await
        .unwrap();

    h.voucher(&center, &cement, "4").await;

    let third = h
        .vouchers
        .create(CreateVoucherPayload {
            project_id: north.id,
            requester: "Ana".into(),
            items: vec![
                stock_item(&sand, "2"),
                NewVoucherItem {
                    product_id: None,
                    description: Some("Locação de betoneira".into()),
                    quantity: d("1"),
                    unit: "UN".into(),
                    source: ItemSource::ExternalPurchase,
                    unit_price: Some(d("350")),
                },
            ],
        })
        .await
        .unwrap();
    deliver(h, &third).await;

    let supplier = h.supplier("Materiais XYZ").await;
    h.purchases
        .create(CreatePurchasePayload {
            supplier_id: supplier.id,
            project_id: None,
            invoice_number: Some("NF-1".into()),
            date: common::date(2025, 3, 12),
            attachments: vec![],
            items: vec![NewPurchaseItem {
                product_id: None,
                description: "Areia lavada".into(),
                quantity: d("5"),
                unit: "M³".into(),
                unit_cost: d("35"),
            }],
        })
        .await
        .unwrap();

    Scenario { center, north, sand }
}

#[tokio::test]
async fn summary_counts_only_delivered_vouchers() {
    let h = harness().await;
    let s = scenario(&h).await;

    let summary = h.reports.summary(ReportFilter::default()).await;
    assert_eq!(summary.per_project.len(), 2);
    assert_eq!(summary.vouchers.len(), 2);

    let center = summary
        .per_project
        .iter()
        .find(|p| p.project_id == s.center.id)
        .unwrap();
    assert_eq!(center.totals.voucher_count, 1);
    assert_eq!(center.totals.stock_value, d("178.50"));
    assert_eq!(center.totals.returned_value, d("76.50"));

    let north = summary
        .per_project
        .iter()
        .find(|p| p.project_id == s.north.id)
        .unwrap();
    assert_eq!(north.totals.stock_value, d("90"));
    assert_eq!(north.totals.external_value, d("350"));
    assert_eq!(north.totals.total_value, d("440"));

    assert_eq!(summary.totals.voucher_count, 2);
    assert_eq!(summary.totals.total_value, d("618.50"));
    assert_eq!(summary.returns.len(), 1);
    assert_eq!(summary.returns[0].value, d("76.50"));
    assert_eq!(summary.returns[0].item_description.as_deref(), Some("Cimento"));
}

#[tokio::test]
async fn summary_filters_by_project() {
    let h = harness().await;
    let s = scenario(&h).await;

    let summary = h
        .reports
        .summary(ReportFilter {
            project_id: Some(s.north.id),
            ..ReportFilter::default()
        })
        .await;
    assert_eq!(summary.per_project.len(), 1);
    assert_eq!(summary.vouchers.len(), 1);
    assert_eq!(summary.vouchers[0].status, VoucherStatus::Completed);
    assert!(summary.returns.is_empty());
}

#[tokio::test]
async fn dashboard_reflects_current_state() {
    let h = harness().await;
    let s = scenario(&h).await;

    let dashboard = h.reports.dashboard().await;
    // Devolvido parcial ainda conta como aberto, junto do pendente
    assert_eq!(dashboard.open_vouchers, 2);
    assert_eq!(dashboard.returns_today, 1);
    assert_eq!(dashboard.active_projects, 2);
    assert_eq!(dashboard.purchase_cost, d("175"));
    assert_eq!(dashboard.purchase_billed, d("210"));
    assert_eq!(dashboard.low_stock_products.len(), 1);
    assert_eq!(dashboard.low_stock_products[0].id, s.sand.id);
    assert_eq!(dashboard.low_stock_products[0].stock, d("6"));
}

#[tokio::test]
async fn export_then_import_restores_the_same_state() {
    let source = harness().await;
    scenario(&source).await;
    let exported = source.backup.export_json().await.unwrap();

    let target = harness().await;
    target.project("Obra que será substituída").await;
    let imported = target.backup.import_json(&exported).await.unwrap();

    assert_eq!(imported, source.backup.export().await);
    assert_eq!(target.store.snapshot().await, imported);
}

#[tokio::test]
async fn partial_import_replaces_only_present_collections() {
    let h = harness().await;
    let s = scenario(&h).await;
    let before = h.store.snapshot().await;

    h.backup.import_json(r#"{ "projects": [] }"#).await.unwrap();

    let after = h.store.snapshot().await;
    assert!(after.projects.is_empty());
    assert_eq!(after.products, before.products);
    assert_eq!(after.vouchers, before.vouchers);
    assert_eq!(after.config, before.config);

    // Talões continuam, mesmo sem a obra
    assert!(after.vouchers.iter().any(|v| v.project_id == s.center.id));
}

#[tokio::test]
async fn invalid_backup_is_rejected_without_changes() {
    let h = harness().await;
    scenario(&h).await;
    let before = h.store.snapshot().await;

    for raw in [r#"{ "obras": [] }"#, "{ nope", r#"{ "projects": 3 }"#] {
        let result = h.backup.import_json(raw).await;
        assert!(matches!(result, Err(AppError::InvalidImport(_))), "{raw}");
    }
    assert_eq!(h.store.snapshot().await, before);
}

#[tokio::test]
async fn backup_keeps_every_decimal_digit() {
    let source = harness().await;
    let precise = source
        .product("Aditivo", "Químicos", "123456789.123456789012", "0.1234567890123456789")
        .await;
    let exported = source.backup.export_json().await.unwrap();
    assert!(exported.contains("\"123456789.123456789012\""), "{exported}");

    let target = harness().await;
    target.backup.import_json(&exported).await.unwrap();

    let restored = target.catalog.get_product(precise.id).await.unwrap();
    assert_eq!(restored.price.unwrap().to_string(), "123456789.123456789012");
    assert_eq!(restored.stock.to_string(), "0.1234567890123456789");
    assert_eq!(target.store.snapshot().await, source.store.snapshot().await);
}

#[tokio::test]
async fn backups_with_plain_numbers_are_still_accepted() {
    let h = harness().await;
    let id = Uuid::new_v4();
    let raw = json!({
        "products": [{
            "id": id,
            "name": "Cimento",
            "category": null,
            "unit": "SC",
            "sku": null,
            "price": 25.5,
            "stock": 100,
            "active": true,
            "kind": "resale"
        }]
    });

    h.backup.import_json(&raw.to_string()).await.unwrap();
    let product = h.catalog.get_product(id).await.unwrap();
    assert_eq!(product.price, Some(d("25.5")));
    assert_eq!(product.stock, d("100"));
}

#[tokio::test]
async fn import_breaking_business_rules_is_rejected_without_changes() {
    let h = harness().await;
    scenario(&h).await;
    let before = h.store.snapshot().await;
    let exported: Value = serde_json::from_str(&h.backup.export_json().await.unwrap()).unwrap();

    let mut over_returned = exported.clone();
    over_returned["vouchers"][0]["items"][0]["deliveredQuantity"] = json!("2");
    over_returned["vouchers"][0]["items"][0]["returnedQuantity"] = json!("9");

    let mut negative = exported.clone();
    negative["purchases"][0]["items"][0]["quantity"] = json!("-5");

    let mut bad_markup = exported.clone();
    bad_markup["config"]["defaultMarkup"] = json!("-0.2");

    for doc in [over_returned, negative, bad_markup] {
        let result = h.backup.import_json(&doc.to_string()).await;
        assert!(matches!(result, Err(AppError::InvalidImport(_))), "{result:?}");
    }
    assert_eq!(h.store.snapshot().await, before);

    // O documento original continua válido
    h.backup.import_json(&exported.to_string()).await.unwrap();
    assert_eq!(h.store.snapshot().await, before);
}

#[tokio::test]
async fn huge_purchases_do_not_break_reports() {
    let huge = d("1000000000000000");
    let mut state = Snapshot::default();
    for _ in 0..2 {
        state.purchases.insert(ExternalPurchase {
            id: Uuid::new_v4(),
            supplier_id: Uuid::new_v4(),
            project_id: None,
            invoice_number: None,
            date: common::date(2025, 3, 12),
            attachments: vec![],
            items: vec![PurchaseItem {
                id: Uuid::new_v4(),
                product_id: None,
                description: "Importado de planilha antiga".into(),
                quantity: huge,
                unit: "UN".into(),
                unit_cost: huge,
                applied_markup: d("0.20"),
                project_unit_price: huge,
            }],
        });
    }
    let h = harness_with(state).await;

    let dashboard = h.reports.dashboard().await;
    assert_eq!(dashboard.purchase_cost, Decimal::MAX);
    assert_eq!(dashboard.purchase_billed, Decimal::MAX);

    let summary = h.reports.summary(ReportFilter::default()).await;
    assert!(summary.vouchers.is_empty());
}
