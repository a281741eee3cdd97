// Montagem dos serviços sobre armazenamento em memória.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use pls_obras::{
    db::{
        CatalogRepository, MemoryMirror, MemoryStorage, ProjectRepository, PurchaseRepository,
        RemoteMirror, SettingsRepository, Snapshot, Store, VoucherRepository,
    },
    models::{
        catalog::{CreateProductPayload, CreateSupplierPayload, Product, ProductKind, Supplier},
        project::{CreateProjectPayload, Project},
        voucher::{CreateVoucherPayload, ItemSource, NewVoucherItem, SignaturePayload, Voucher},
    },
    services::{
        BackupService, CatalogService, MarkupService, ProjectService, PurchaseService,
        ReportService, SyncService, VoucherService,
    },
};

pub struct Harness {
    pub store: Store,
    pub mirror: Arc<MemoryMirror>,
    pub projects: ProjectService,
    pub catalog: CatalogService,
    pub vouchers: VoucherService,
    pub purchases: PurchaseService,
    pub markup: MarkupService,
    pub backup: BackupService,
    pub reports: ReportService,
    pub sync: SyncService,
}

pub async fn harness() -> Harness {
    harness_with(Snapshot::default()).await
}

pub async fn harness_with(initial: Snapshot) -> Harness {
    let store = Store::open(Arc::new(MemoryStorage::default()), initial)
        .await
        .unwrap();
    let mirror = Arc::new(MemoryMirror::default());

    let catalog_repo = CatalogRepository::new(store.clone());
    let voucher_repo = VoucherRepository::new(store.clone());

    Harness {
        projects: ProjectService::new(store.clone(), ProjectRepository::new(store.clone())),
        catalog: CatalogService::new(store.clone(), catalog_repo.clone()),
        vouchers: VoucherService::new(store.clone(), voucher_repo.clone(), catalog_repo.clone()),
        purchases: PurchaseService::new(
            store.clone(),
            PurchaseRepository::new(store.clone()),
            voucher_repo,
        ),
        markup: MarkupService::new(store.clone(), SettingsRepository::new(store.clone()), catalog_repo),
        backup: BackupService::new(store.clone()),
        reports: ReportService::new(store.clone()),
        sync: SyncService::new(store.clone(), Some(mirror.clone() as Arc<dyn RemoteMirror>)),
        mirror,
        store,
    }
}

pub fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub fn date(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

impl Harness {
    pub async fn project(&self, name: &str) -> Project {
        self.projects
            .create(CreateProjectPayload {
                name: name.into(),
                city: Some("São Paulo".into()),
                active: true,
            })
            .await
            .unwrap()
    }

    pub async fn product(&self, name: &str, category: &str, price: &str, stock: &str) -> Product {
        self.product_of_kind(name, category, price, stock, ProductKind::Resale).await
    }

    pub async fn product_of_kind(
        &self,
        name: &str,
        category: &str,
        price: &str,
        stock: &str,
        kind: ProductKind,
    ) -> Product {
        self.catalog
            .create_product(CreateProductPayload {
                name: name.into(),
                category: Some(category.into()),
                unit: "SC".into(),
                sku: None,
                price: Some(d(price)),
                stock: d(stock),
                active: true,
                kind,
            })
            .await
            .unwrap()
    }

    pub async fn supplier(&self, name: &str) -> Supplier {
        self.catalog
            .create_supplier(CreateSupplierPayload {
                name: name.into(),
                tax_id: None,
                contact: None,
                active: true,
            })
            .await
            .unwrap()
    }

    /// Talão com um único item de estoque.
    pub async fn voucher(&self, project: &Project, product: &Product, qty: &str) -> Voucher {
        self.vouchers
            .create(CreateVoucherPayload {
                project_id: project.id,
                requester: "Carlos".into(),
                items: vec![stock_item(product, qty)],
            })
            .await
            .unwrap()
    }

    pub async fn product_stock(&self, id: Uuid) -> Decimal {
        self.catalog.get_product(id).await.unwrap().stock
    }
}

pub fn stock_item(product: &Product, qty: &str) -> NewVoucherItem {
    NewVoucherItem {
        product_id: Some(product.id),
        description: None,
        quantity: d(qty),
        unit: product.unit.clone(),
        source: ItemSource::Stock,
        unit_price: None,
    }
}

pub fn signature() -> SignaturePayload {
    SignaturePayload {
        receiver_name: "Maria Santos".into(),
        tax_id: Some("123.456.789-00".into()),
        image_data_url: None,
    }
}
