// src/services/purchase_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{PurchaseRepository, Snapshot, Store, VoucherRepository},
    models::{
        markup::MarkupContext,
        purchase::{CreatePurchasePayload, ExternalPurchase, NewPurchaseItem, PurchaseItem, UpdatePurchasePayload},
        voucher::{LinkPurchasePayload, PurchaseLink, Voucher},
    },
    services::markup::{apply_markup, resolve_percentage},
};

#[derive(Clone)]
pub struct PurchaseService {
    store: Store,
    repo: PurchaseRepository,
    voucher_repo: VoucherRepository,
}

impl PurchaseService {
    pub fn new(
        store: Store,
        repo: PurchaseRepository,
        voucher_repo: VoucherRepository,
    ) -> Self {
        Self {
            store,
            repo,
            voucher_repo,
        }
    }

    pub async fn list(&self, supplier_id: Option<Uuid>, project_id: Option<Uuid>) -> Vec<ExternalPurchase> {
        self.repo.list(supplier_id, project_id).await
    }

    pub async fn get(&self, id: Uuid) -> Result<ExternalPurchase, AppError> {
        self.repo.find(id).await
    }

    pub async fn create(&self, payload: CreatePurchasePayload) -> Result<ExternalPurchase, AppError> {
        let mut tx = self.store.begin().await;

        ensure_references(&tx, payload.supplier_id, payload.project_id)?;
        let items = price_items(&tx, payload.project_id, payload.items)?;

        let purchase = self.repo.insert(
            &mut tx,
            ExternalPurchase {
                id: Uuid::new_v4(),
                supplier_id: payload.supplier_id,
                project_id: payload.project_id,
                invoice_number: payload.invoice_number,
                date: payload.date,
                attachments: payload.attachments,
                items,
            },
        );

        tx.commit().await?;
        tracing::info!(
            "🧾 Compra externa registrada: custo {} / repasse {}",
            purchase.total_cost(),
            purchase.total_billed()
        );
        Ok(purchase)
    }

    /// Atualiza a compra. Se a obra mudar ou novos itens forem enviados,
    /// os preços são recalculados com as regras atuais.
    pub async fn update(
        &self,
        id: Uuid,
        payload: UpdatePurchasePayload,
    ) -> Result<ExternalPurchase, AppError> {
        let mut tx = self.store.begin().await;

        let current = tx
            .purchases
            .get(id)
            .cloned()
            .ok_or(AppError::not_found("Compra externa", id))?;

        let supplier_id = payload.supplier_id.unwrap_or(current.supplier_id);
        let project_id = payload.project_id.unwrap_or(current.project_id);
        ensure_references(&tx, supplier_id, project_id)?;

        let items = match payload.items {
            Some(items) => Some(price_items(&tx, project_id, items)?),
            None if project_id != current.project_id => Some(reprice_items(&tx, project_id, &current.items)),
            None => None,
        };

        let purchase = self.repo.update(&mut tx, id, |p| {
            p.supplier_id = supplier_id;
            p.project_id = project_id;
            if let Some(invoice) = payload.invoice_number {
                p.invoice_number = Some(invoice);
            }
            if let Some(date) = payload.date {
                p.date = date;
            }
            if let Some(attachments) = payload.attachments {
                p.attachments = attachments;
            }
            if let Some(items) = items {
                p.items = items;
            }
        })?;

        tx.commit().await?;
        Ok(purchase)
    }

    pub async fn delete(&self, id: Uuid) -> Result<ExternalPurchase, AppError> {
        let mut tx = self.store.begin().await;
        let purchase = self.repo.delete(&mut tx, id)?;
        tx.commit().await?;
        Ok(purchase)
    }

    /// Vincula parte de um item de compra a um item de talão.
    pub async fn link_purchase(&self, voucher_id: Uuid, payload: LinkPurchasePayload) -> Result<Voucher, AppError> {
        let mut tx = self.store.begin().await;

        self.repo.find_by_item(&tx, payload.purchase_item_id)?;

        let mut voucher = self.voucher_repo.get(&tx, voucher_id)?.clone();
        let item = voucher
            .item_mut(payload.voucher_item_id)
            .ok_or(AppError::not_found("Item do talão", payload.voucher_item_id))?;
        item.purchase_links.push(PurchaseLink {
            purchase_item_id: payload.purchase_item_id,
            quantity: payload.quantity,
        });

        let voucher = self.voucher_repo.replace(&mut tx, voucher)?;
        tx.commit().await?;
        Ok(voucher)
    }
}

fn ensure_references(tx: &Snapshot, supplier_id: Uuid, project_id: Option<Uuid>) -> Result<(), AppError> {
    if !tx.suppliers.contains(supplier_id) {
        return Err(AppError::not_found("Fornecedor", supplier_id));
    }
    if let Some(project_id) = project_id {
        if !tx.projects.contains(project_id) {
            return Err(AppError::not_found("Obra", project_id));
        }
    }
    Ok(())
}

fn price_item(
    tx: &Snapshot,
    project_id: Option<Uuid>,
    id: Uuid,
    new: NewPurchaseItem,
) -> Result<PurchaseItem, AppError> {
    let product = match new.product_id {
        Some(product_id) => Some(
            tx.products
                .get(product_id)
                .ok_or(AppError::not_found("Produto", product_id))?,
        ),
        None => None,
    };

    let ctx = MarkupContext {
        project_id,
        category: product.and_then(|p| p.category.as_deref()),
        internal_product: product.is_some_and(|p| p.is_internal()),
    };
    let percentage = resolve_percentage(tx.markup_rules.as_slice(), tx.config.default_markup, &ctx);

    Ok(PurchaseItem {
        id,
        product_id: new.product_id,
        description: new.description,
        quantity: new.quantity,
        unit: new.unit,
        unit_cost: new.unit_cost,
        applied_markup: percentage,
        project_unit_price: apply_markup(new.unit_cost, percentage),
    })
}

fn price_items(
    tx: &Snapshot,
    project_id: Option<Uuid>,
    items: Vec<NewPurchaseItem>,
) -> Result<Vec<PurchaseItem>, AppError> {
    items
        .into_iter()
        .map(|new| price_item(tx, project_id, Uuid::new_v4(), new))
        .collect()
}

// Reprecifica mantendo os ids (os vínculos com talões continuam válidos).
fn reprice_items(tx: &Snapshot, project_id: Option<Uuid>, items: &[PurchaseItem]) -> Vec<PurchaseItem> {
    items
        .iter()
        .map(|item| {
            let new = NewPurchaseItem {
                product_id: item.product_id,
                description: item.description.clone(),
                quantity: item.quantity,
                unit: item.unit.clone(),
                unit_cost: item.unit_cost,
            };
            // Produto removido do catálogo: mantém o preço anterior.
            price_item(tx, project_id, item.id, new).unwrap_or_else(|_| item.clone())
        })
        .collect()
}
