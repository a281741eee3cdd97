// src/db/remote_mirror.rs
//
// Espelho remoto (Postgres). Cada coleção vira uma tabela; o upsert é em lote
// e por id, sem transação entre tabelas.

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::{types::Json, PgPool};

use crate::common::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteTable {
    Projects,
    Products,
    Suppliers,
    Vouchers,
    VoucherItems,
    Purchases,
    PurchaseItems,
    Returns,
    MarkupRules,
}

impl RemoteTable {
    // Ordem do push: pais antes dos filhos.
    pub const PUSH_ORDER: [RemoteTable; 9] = [
        RemoteTable::Projects,
        RemoteTable::Products,
        RemoteTable::Suppliers,
        RemoteTable::Vouchers,
        RemoteTable::Purchases,
        RemoteTable::Returns,
        RemoteTable::MarkupRules,
        RemoteTable::VoucherItems,
        RemoteTable::PurchaseItems,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RemoteTable::Projects => "projects",
            RemoteTable::Products => "products",
            RemoteTable::Suppliers => "suppliers",
            RemoteTable::Vouchers => "vouchers",
            RemoteTable::VoucherItems => "voucher_items",
            RemoteTable::Purchases => "purchases",
            RemoteTable::PurchaseItems => "purchase_items",
            RemoteTable::Returns => "returns",
            RemoteTable::MarkupRules => "markup_rules",
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            RemoteTable::Projects => &["id", "name", "city", "active", "created_at"],
            RemoteTable::Products => &[
                "id", "name", "category", "unit", "sku", "price", "stock", "active", "kind",
            ],
            RemoteTable::Suppliers => &["id", "name", "tax_id", "contact", "active"],
            RemoteTable::Vouchers => &[
                "id", "number", "project_id", "requester", "status", "signature", "created_at",
            ],
            RemoteTable::VoucherItems => &[
                "id",
                "voucher_id",
                "position",
                "product_id",
                "description",
                "quantity",
                "unit",
                "source",
                "unit_price",
                "delivered_quantity",
                "returned_quantity",
                "purchase_links",
            ],
            RemoteTable::Purchases => &[
                "id", "supplier_id", "project_id", "invoice_number", "date", "attachments",
            ],
            RemoteTable::PurchaseItems => &[
                "id",
                "purchase_id",
                "position",
                "product_id",
                "description",
                "quantity",
                "unit",
                "unit_cost",
                "applied_markup",
                "project_unit_price",
            ],
            RemoteTable::Returns => &[
                "id", "voucher_id", "voucher_item_id", "quantity", "reason", "created_at",
            ],
            RemoteTable::MarkupRules => &["id", "target", "reference", "percentage"],
        }
    }

    /// `INSERT ... SELECT FROM jsonb_populate_recordset ... ON CONFLICT (id) DO UPDATE`
    pub fn upsert_sql(&self) -> String {
        let table = self.name();
        let columns = self.columns().join(", ");
        let updates = self
            .columns()
            .iter()
            .filter(|c| **c != "id")
            .map(|c| format!("{c} = EXCLUDED.{c}"))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "INSERT INTO {table} ({columns}) \
             SELECT {columns} FROM jsonb_populate_recordset(NULL::{table}, $1) \
             ON CONFLICT (id) DO UPDATE SET {updates}"
        )
    }

    /// Colunas NUMERIC: lidas como texto para não passar por f64.
    pub fn decimal_columns(&self) -> &'static [&'static str] {
        match self {
            RemoteTable::Products => &["price", "stock"],
            RemoteTable::VoucherItems => &[
                "quantity",
                "unit_price",
                "delivered_quantity",
                "returned_quantity",
            ],
            RemoteTable::PurchaseItems => &["quantity", "unit_cost", "applied_markup", "project_unit_price"],
            RemoteTable::Returns => &["quantity"],
            RemoteTable::MarkupRules => &["percentage"],
            RemoteTable::Projects
            | RemoteTable::Suppliers
            | RemoteTable::Vouchers
            | RemoteTable::Purchases => &[],
        }
    }

    pub fn select_sql(&self) -> String {
        let decimals = self.decimal_columns();
        if decimals.is_empty() {
            return format!("SELECT to_jsonb(t) FROM {} t", self.name());
        }

        let as_text = decimals
            .iter()
            .map(|c| format!("'{c}', t.{c}::text"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "SELECT to_jsonb(t) || jsonb_build_object({as_text}) FROM {} t",
            self.name()
        )
    }
}

#[async_trait]
pub trait RemoteMirror: Send + Sync {
    async fn ping(&self) -> Result<(), AppError>;
    /// Upsert de um lote de linhas (já em snake_case).
    async fn upsert(&self, table: RemoteTable, rows: Vec<JsonValue>) -> Result<(), AppError>;
    async fn fetch_all(&self, table: RemoteTable) -> Result<Vec<JsonValue>, AppError>;
}

// ---
// Postgres
// ---
#[derive(Clone)]
pub struct PgMirror {
    pool: PgPool,
}

impl PgMirror {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!().run(&self.pool).await?;
        tracing::info!("✅ Migrações do espelho remoto executadas com sucesso!");
        Ok(())
    }
}

#[async_trait]
impl RemoteMirror for PgMirror {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn upsert(&self, table: RemoteTable, rows: Vec<JsonValue>) -> Result<(), AppError> {
        if rows.is_empty() {
            return Ok(());
        }

        let result = sqlx::query(&table.upsert_sql())
            .bind(Json(JsonValue::Array(rows)))
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::SyncFailed {
                table: table.name(),
                message: e.to_string(),
            })?;

        tracing::debug!("⬆️ {}: {} linhas gravadas", table.name(), result.rows_affected());
        Ok(())
    }

    async fn fetch_all(&self, table: RemoteTable) -> Result<Vec<JsonValue>, AppError> {
        let rows = sqlx::query_scalar::<_, JsonValue>(&table.select_sql())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::SyncFailed {
                table: table.name(),
                message: e.to_string(),
            })?;
        Ok(rows)
    }
}

// ---
// Espelho em memória (testes)
// ---
#[derive(Default)]
pub struct MemoryMirror {
    tables: Mutex<HashMap<RemoteTable, Vec<JsonValue>>>,
    batches: Mutex<Vec<(RemoteTable, usize)>>,
    fail_on: Mutex<HashSet<RemoteTable>>,
}

impl MemoryMirror {
    /// Faz o upsert desta tabela falhar a partir de agora.
    pub fn fail_on(&self, table: RemoteTable) {
        if let Ok(mut fail_on) = self.fail_on.lock() {
            fail_on.insert(table);
        }
    }

    /// Lotes enviados até agora: (tabela, tamanho).
    pub fn batches(&self) -> Vec<(RemoteTable, usize)> {
        self.batches.lock().map(|b| b.clone()).unwrap_or_default()
    }

    pub fn rows(&self, table: RemoteTable) -> Vec<JsonValue> {
        self.tables
            .lock()
            .map(|t| t.get(&table).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    pub fn seed(&self, table: RemoteTable, rows: Vec<JsonValue>) {
        if let Ok(mut tables) = self.tables.lock() {
            tables.insert(table, rows);
        }
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> AppError {
    AppError::InternalServerError(anyhow::anyhow!("Lock do espelho envenenado: {}", e))
}

#[async_trait]
impl RemoteMirror for MemoryMirror {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn upsert(&self, table: RemoteTable, rows: Vec<JsonValue>) -> Result<(), AppError> {
        if self.fail_on.lock().map_err(poisoned)?.contains(&table) {
            return Err(AppError::SyncFailed {
                table: table.name(),
                message: "falha simulada".into(),
            });
        }

        self.batches.lock().map_err(poisoned)?.push((table, rows.len()));

        let mut tables = self.tables.lock().map_err(poisoned)?;
        let stored = tables.entry(table).or_default();
        for row in rows {
            let id = row.get("id").cloned();
            match stored.iter_mut().find(|r| r.get("id") == id.as_ref()) {
                Some(existing) => *existing = row,
                None => stored.push(row),
            }
        }
        Ok(())
    }

    async fn fetch_all(&self, table: RemoteTable) -> Result<Vec<JsonValue>, AppError> {
        Ok(self.rows(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn upsert_sql_updates_every_column_but_id() {
        let sql = RemoteTable::MarkupRules.upsert_sql();
        assert!(sql.starts_with("INSERT INTO markup_rules (id, target, reference, percentage)"));
        assert!(sql.contains("jsonb_populate_recordset(NULL::markup_rules, $1)"));
        assert!(sql.contains("ON CONFLICT (id) DO UPDATE SET target = EXCLUDED.target"));
        assert!(!sql.contains("id = EXCLUDED.id"));
    }

    #[test]
    fn select_reads_numeric_columns_as_text() {
        assert_eq!(RemoteTable::Projects.select_sql(), "SELECT to_jsonb(t) FROM projects t");
        assert_eq!(
            RemoteTable::Products.select_sql(),
            "SELECT to_jsonb(t) || jsonb_build_object('price', t.price::text, 'stock', t.stock::text) FROM products t"
        );
        for table in RemoteTable::PUSH_ORDER {
            for column in table.decimal_columns() {
                assert!(table.columns().contains(column), "{}.{}", table.name(), column);
            }
        }
    }

    #[test]
    fn children_are_pushed_after_parents() {
        let pos = |t| RemoteTable::PUSH_ORDER.iter().position(|x| *x == t).unwrap();
        assert!(pos(RemoteTable::Vouchers) < pos(RemoteTable::VoucherItems));
        assert!(pos(RemoteTable::Purchases) < pos(RemoteTable::PurchaseItems));
    }

    #[tokio::test]
    async fn memory_mirror_upserts_by_id() {
        let mirror = MemoryMirror::default();
        mirror
            .upsert(RemoteTable::Projects, vec![json!({"id": "a", "name": "Obra A"})])
            .await
            .unwrap();
        mirror
            .upsert(
                RemoteTable::Projects,
                vec![json!({"id": "a", "name": "Obra A2"}), json!({"id": "b", "name": "Obra B"})],
            )
            .await
            .unwrap();

        let rows = mirror.fetch_all(RemoteTable::Projects).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["name"], "Obra A2");
        assert_eq!(mirror.batches(), vec![(RemoteTable::Projects, 1), (RemoteTable::Projects, 2)]);
    }
}
