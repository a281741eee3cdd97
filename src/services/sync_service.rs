// src/services/sync_service.rs
//
// Sincronização em lote com o espelho remoto: push (upsert por id, em blocos)
// e pull (leitura completa, substitui o estado local). Sem resolução de
// conflitos, sem deltas.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{RemoteMirror, RemoteTable, Snapshot, Store},
    models::{
        remote::{
            MarkupRuleRow, ProductRow, ProjectRow, PurchaseItemRow, PurchaseRow, ReturnRow,
            SupplierRow, VoucherItemRow, VoucherRow,
        },
        sync::{SyncDirection, SyncReport, TableCount},
    },
};

/// Tamanho máximo de cada lote de upsert.
pub const CHUNK_SIZE: usize = 500;

#[derive(Clone)]
pub struct SyncService {
    store: Store,
    mirror: Option<Arc<dyn RemoteMirror>>,
}

impl SyncService {
    pub fn new(store: Store, mirror: Option<Arc<dyn RemoteMirror>>) -> Self {
        Self { store, mirror }
    }

    pub fn is_configured(&self) -> bool {
        self.mirror.is_some()
    }

    /// Espelho configurado e sincronização ligada nas configurações.
    pub async fn is_enabled(&self) -> bool {
        self.is_configured() && self.store.read().await.config.sync.enabled
    }

    fn mirror(&self) -> Result<&Arc<dyn RemoteMirror>, AppError> {
        self.mirror.as_ref().ok_or(AppError::SyncDisabled)
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        self.mirror()?.ping().await
    }

    /// Envia todas as coleções, tabela por tabela (pais antes dos filhos).
    /// Uma falha interrompe o push; o que já foi enviado fica no remoto.
    pub async fn push(&self) -> Result<SyncReport, AppError> {
        let mirror = self.mirror()?;
        let snapshot = self.store.snapshot().await;
        let mut rows = remote_rows(&snapshot)?;

        let mut tables = Vec::with_capacity(RemoteTable::PUSH_ORDER.len());
        for table in RemoteTable::PUSH_ORDER {
            let table_rows = rows.remove(&table).unwrap_or_default();
            let count = table_rows.len();

            for chunk in table_rows.chunks(CHUNK_SIZE) {
                mirror.upsert(table, chunk.to_vec()).await?;
            }

            tracing::debug!("⬆️ {}: {} linhas", table.name(), count);
            tables.push(TableCount {
                table: table.name().to_string(),
                rows: count,
            });
        }

        let finished_at = self.stamp_last_sync().await?;
        let report = SyncReport {
            direction: SyncDirection::Push,
            tables,
            finished_at,
        };
        tracing::info!("☁️ Push concluído: {} linhas", report.total_rows());
        Ok(report)
    }

    /// Lê todas as tabelas remotas e substitui as coleções espelhadas.
    /// Ajustes de estoque e configurações continuam locais.
    pub async fn pull(&self) -> Result<SyncReport, AppError> {
        let mirror = self.mirror()?;

        let (
            projects,
            products,
            suppliers,
            vouchers,
            voucher_items,
            purchases,
            purchase_items,
            returns,
            markup_rules,
        ) = tokio::try_join!(
            fetch::<ProjectRow>(mirror.as_ref(), RemoteTable::Projects),
            fetch::<ProductRow>(mirror.as_ref(), RemoteTable::Products),
            fetch::<SupplierRow>(mirror.as_ref(), RemoteTable::Suppliers),
            fetch::<VoucherRow>(mirror.as_ref(), RemoteTable::Vouchers),
            fetch::<VoucherItemRow>(mirror.as_ref(), RemoteTable::VoucherItems),
            fetch::<PurchaseRow>(mirror.as_ref(), RemoteTable::Purchases),
            fetch::<PurchaseItemRow>(mirror.as_ref(), RemoteTable::PurchaseItems),
            fetch::<ReturnRow>(mirror.as_ref(), RemoteTable::Returns),
            fetch::<MarkupRuleRow>(mirror.as_ref(), RemoteTable::MarkupRules),
        )?;

        let counts = vec![
            count(RemoteTable::Projects, projects.len()),
            count(RemoteTable::Products, products.len()),
            count(RemoteTable::Suppliers, suppliers.len()),
            count(RemoteTable::Vouchers, vouchers.len()),
            count(RemoteTable::VoucherItems, voucher_items.len()),
            count(RemoteTable::Purchases, purchases.len()),
            count(RemoteTable::PurchaseItems, purchase_items.len()),
            count(RemoteTable::Returns, returns.len()),
            count(RemoteTable::MarkupRules, markup_rules.len()),
        ];

        // Reagrupa os filhos sob os pais, na ordem original.
        let mut items_by_voucher = group_by(voucher_items, |r| (r.voucher_id, r.position));
        let mut items_by_purchase = group_by(purchase_items, |r| (r.purchase_id, r.position));

        let vouchers = vouchers
            .into_iter()
            .map(|v| {
                let items = items_by_voucher.remove(&v.id).unwrap_or_default();
                v.into_voucher(items.into_iter().map(Into::into).collect())
            })
            .collect();
        let purchases = purchases
            .into_iter()
            .map(|p| {
                let items = items_by_purchase.remove(&p.id).unwrap_or_default();
                p.into_purchase(items.into_iter().map(Into::into).collect())
            })
            .collect();

        let orphans = items_by_voucher.values().map(Vec::len).sum::<usize>()
            + items_by_purchase.values().map(Vec::len).sum::<usize>();
        if orphans > 0 {
            tracing::warn!("⚠️ Pull: {} itens remotos sem registro pai foram ignorados", orphans);
        }

        let finished_at = Utc::now();
        let mut tx = self.store.begin().await;
        tx.projects.replace_all(projects.into_iter().map(Into::into).collect());
        tx.products.replace_all(products.into_iter().map(Into::into).collect());
        tx.suppliers.replace_all(suppliers.into_iter().map(Into::into).collect());
        tx.vouchers.replace_all(vouchers);
        tx.purchases.replace_all(purchases);
        tx.returns.replace_all(returns.into_iter().map(Into::into).collect());
        tx.markup_rules.replace_all(markup_rules.into_iter().map(Into::into).collect());
        tx.config.sync.last_sync = Some(finished_at);
        // Sem notificar o sincronizador: o estado veio do remoto.
        tx.commit_local().await?;

        let report = SyncReport {
            direction: SyncDirection::Pull,
            tables: counts,
            finished_at,
        };
        tracing::info!("☁️ Pull concluído: {} linhas", report.total_rows());
        Ok(report)
    }

    async fn stamp_last_sync(&self) -> Result<DateTime<Utc>, AppError> {
        let at = Utc::now();
        let mut tx = self.store.begin().await;
        tx.config.sync.last_sync = Some(at);
        tx.commit_local().await?;
        Ok(at)
    }
}

fn count(table: RemoteTable, rows: usize) -> TableCount {
    TableCount {
        table: table.name().to_string(),
        rows,
    }
}

fn to_rows<T: Serialize>(rows: impl IntoIterator<Item = T>) -> Result<Vec<JsonValue>, AppError> {
    rows.into_iter()
        .map(|r| serde_json::to_value(r).map_err(AppError::from))
        .collect()
}

/// Achata o estado local em linhas snake_case, por tabela remota.
pub fn remote_rows(snapshot: &Snapshot) -> Result<HashMap<RemoteTable, Vec<JsonValue>>, AppError> {
    let mut rows = HashMap::new();

    rows.insert(RemoteTable::Projects, to_rows(snapshot.projects.iter().map(ProjectRow::from))?);
    rows.insert(RemoteTable::Products, to_rows(snapshot.products.iter().map(ProductRow::from))?);
    rows.insert(RemoteTable::Suppliers, to_rows(snapshot.suppliers.iter().map(SupplierRow::from))?);
    rows.insert(RemoteTable::Vouchers, to_rows(snapshot.vouchers.iter().map(VoucherRow::from))?);
    rows.insert(
        RemoteTable::VoucherItems,
        to_rows(snapshot.vouchers.iter().flat_map(VoucherItemRow::flatten))?,
    );
    rows.insert(RemoteTable::Purchases, to_rows(snapshot.purchases.iter().map(PurchaseRow::from))?);
    rows.insert(
        RemoteTable::PurchaseItems,
        to_rows(snapshot.purchases.iter().flat_map(PurchaseItemRow::flatten))?,
    );
    rows.insert(RemoteTable::Returns, to_rows(snapshot.returns.iter().map(ReturnRow::from))?);
    rows.insert(
        RemoteTable::MarkupRules,
        to_rows(snapshot.markup_rules.iter().map(MarkupRuleRow::from))?,
    );

    Ok(rows)
}

async fn fetch<T: DeserializeOwned>(mirror: &dyn RemoteMirror, table: RemoteTable) -> Result<Vec<T>, AppError> {
    mirror
        .fetch_all(table)
        .await?
        .into_iter()
        .map(|row| {
            serde_json::from_value(row).map_err(|e| AppError::SyncFailed {
                table: table.name(),
                message: e.to_string(),
            })
        })
        .collect()
}

// Agrupa as linhas filhas pela chave do pai, ordenadas por posição.
fn group_by<T, F>(rows: Vec<T>, key: F) -> HashMap<Uuid, Vec<T>>
where
    F: Fn(&T) -> (Uuid, i32),
{
    let mut groups: HashMap<Uuid, Vec<T>> = HashMap::new();
    for row in rows {
        groups.entry(key(&row).0).or_default().push(row);
    }
    for rows in groups.values_mut() {
        rows.sort_by_key(|r| key(r).1);
    }
    groups
}
