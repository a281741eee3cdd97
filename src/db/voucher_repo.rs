// src/db/voucher_repo.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{Snapshot, Store},
    models::{
        stock::ReturnRecord,
        voucher::{Voucher, VoucherListQuery},
    },
};

#[derive(Clone)]
pub struct VoucherRepository {
    store: Store,
}

impl VoucherRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Lista com filtros opcionais, mais recentes primeiro.
    pub async fn list(&self, query: &VoucherListQuery) -> Vec<Voucher> {
        let search = query.search.as_deref().map(str::to_lowercase);
        let state = self.store.read().await;

        let mut vouchers = state.vouchers.filter(|v| {
            query.project_id.is_none_or(|id| v.project_id == id)
                && query.status.is_none_or(|s| v.status == s)
                && search.as_deref().is_none_or(|s| {
                    v.number.to_lowercase().contains(s) || v.requester.to_lowercase().contains(s)
                })
        });
        vouchers.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.number.cmp(&a.number)));
        vouchers
    }

    pub async fn find(&self, id: Uuid) -> Result<Voucher, AppError> {
        self.store
            .read()
            .await
            .vouchers
            .get(id)
            .cloned()
            .ok_or(AppError::not_found("Talão", id))
    }

    pub fn get<'a>(&self, tx: &'a Snapshot, id: Uuid) -> Result<&'a Voucher, AppError> {
        tx.vouchers.get(id).ok_or(AppError::not_found("Talão", id))
    }

    pub fn number_exists(&self, tx: &Snapshot, number: &str) -> bool {
        tx.vouchers.iter().any(|v| v.number == number)
    }

    pub fn insert(&self, tx: &mut Snapshot, voucher: Voucher) -> Voucher {
        tx.vouchers.insert(voucher)
    }

    pub fn replace(&self, tx: &mut Snapshot, voucher: Voucher) -> Result<Voucher, AppError> {
        let id = voucher.id;
        tx.vouchers
            .update(id, |v| *v = voucher)
            .ok_or(AppError::not_found("Talão", id))
    }

    pub fn delete(&self, tx: &mut Snapshot, id: Uuid) -> Result<Voucher, AppError> {
        tx.vouchers.remove(id).ok_or(AppError::not_found("Talão", id))
    }

    // ---
    // Devoluções (somente inclusão)
    // ---

    pub fn insert_return(&self, tx: &mut Snapshot, record: ReturnRecord) -> ReturnRecord {
        tx.returns.insert(record)
    }

    pub async fn list_returns(&self, voucher_id: Option<Uuid>) -> Vec<ReturnRecord> {
        let state = self.store.read().await;
        let mut returns = state
            .returns
            .filter(|r| voucher_id.is_none_or(|id| r.voucher_id == id));
        returns.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        returns
    }
}
