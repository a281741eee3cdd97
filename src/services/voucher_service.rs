// src/services/voucher_service.rs

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, Snapshot, Store, VoucherRepository},
    models::{
        stock::ReturnRecord,
        voucher::{
            CreateVoucherPayload, ItemSource, NewVoucherItem, RecordDeliveryPayload,
            RegisterReturnPayload, UpdateVoucherPayload, Voucher, VoucherItem, VoucherListQuery,
            VoucherStatus,
        },
    },
};

#[derive(Clone)]
pub struct VoucherService {
    store: Store,
    repo: VoucherRepository,
    catalog_repo: CatalogRepository,
}

impl VoucherService {
    pub fn new(store: Store, repo: VoucherRepository, catalog_repo: CatalogRepository) -> Self {
        Self {
            store,
            repo,
            catalog_repo,
        }
    }

    pub async fn list(&self, query: &VoucherListQuery) -> Vec<Voucher> {
        self.repo.list(query).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Voucher, AppError> {
        self.repo.find(id).await
    }

    pub async fn list_returns(&self, voucher_id: Option<Uuid>) -> Vec<ReturnRecord> {
        self.repo.list_returns(voucher_id).await
    }

    pub async fn create(&self, payload: CreateVoucherPayload) -> Result<Voucher, AppError> {
        let mut tx = self.store.begin().await;

        if !tx.projects.contains(payload.project_id) {
            return Err(AppError::not_found("Obra", payload.project_id));
        }
        let items = build_items(&tx, payload.items)?;
        let number = self.next_number(&tx);

        let voucher = self.repo.insert(
            &mut tx,
            Voucher {
                id: Uuid::new_v4(),
                number,
                project_id: payload.project_id,
                requester: payload.requester,
                status: VoucherStatus::PendingPick,
                items,
                signature: None,
                created_at: Utc::now().date_naive(),
            },
        );

        tx.commit().await?;
        tracing::info!("📝 Talão {} criado ({} itens)", voucher.number, voucher.items.len());
        Ok(voucher)
    }

    pub async fn update(&self, id: Uuid, payload: UpdateVoucherPayload) -> Result<Voucher, AppError> {
        let mut tx = self.store.begin().await;
        let mut voucher = self.repo.get(&tx, id)?.clone();

        if let Some(project_id) = payload.project_id {
            if !tx.projects.contains(project_id) {
                return Err(AppError::not_found("Obra", project_id));
            }
            voucher.project_id = project_id;
        }
        if let Some(requester) = payload.requester {
            voucher.requester = requester;
        }
        if let Some(items) = payload.items {
            if voucher.status != VoucherStatus::PendingPick {
                return Err(AppError::InvalidVoucherTransition {
                    status: voucher.status,
                    action: "alterar itens",
                });
            }
            voucher.items = build_items(&tx, items)?;
        }

        let voucher = self.repo.replace(&mut tx, voucher)?;
        tx.commit().await?;
        Ok(voucher)
    }

    pub async fn delete(&self, id: Uuid) -> Result<Voucher, AppError> {
        let mut tx = self.store.begin().await;
        let voucher = self.repo.delete(&mut tx, id)?;
        tx.commit().await?;
        Ok(voucher)
    }

    /// A separar -> Em entrega
    pub async fn dispatch(&self, id: Uuid) -> Result<Voucher, AppError> {
        let mut tx = self.store.begin().await;
        let mut voucher = self.repo.get(&tx, id)?.clone();

        if voucher.status != VoucherStatus::PendingPick {
            return Err(AppError::InvalidVoucherTransition {
                status: voucher.status,
                action: "enviar para entrega",
            });
        }
        voucher.status = VoucherStatus::InDelivery;

        let voucher = self.repo.replace(&mut tx, voucher)?;
        tx.commit().await?;
        Ok(voucher)
    }

    /// Registra as quantidades entregues (valores absolutos por item).
    ///
    /// Tudo entregue + assinatura -> concluído. Tudo entregue sem assinatura
    /// é rejeitado. Entrega parcial deixa o talão em entrega.
    pub async fn record_delivery(
        &self,
        id: Uuid,
        payload: RecordDeliveryPayload,
    ) -> Result<Voucher, AppError> {
        let mut tx = self.store.begin().await;
        let mut voucher = self.repo.get(&tx, id)?.clone();

        if !voucher.status.accepts_delivery() {
            return Err(AppError::InvalidVoucherTransition {
                status: voucher.status,
                action: "registrar entrega",
            });
        }

        // (produto, quantidade que saiu agora)
        let mut stock_moves: Vec<(Uuid, Decimal)> = Vec::new();

        for delivery in &payload.items {
            let item = voucher
                .item_mut(delivery.item_id)
                .ok_or(AppError::not_found("Item do talão", delivery.item_id))?;

            if delivery.delivered_quantity < item.returned_quantity {
                return Err(AppError::DeliveryBelowReturned {
                    delivered: delivery.delivered_quantity,
                    returned: item.returned_quantity,
                });
            }

            let delta = delivery.delivered_quantity - item.delivered_quantity;
            item.delivered_quantity = delivery.delivered_quantity;

            if let (ItemSource::Stock, Some(product_id)) = (item.source, item.product_id) {
                if !delta.is_zero() {
                    stock_moves.push((product_id, delta));
                }
            }
        }

        if voucher.all_delivered() {
            let signature = payload.signature.ok_or(AppError::SignatureRequired)?;
            voucher.signature = Some(signature.sign(Utc::now()));
            voucher.status = VoucherStatus::Completed;
        } else {
            voucher.status = VoucherStatus::InDelivery;
        }

        let reason = format!("Entrega do talão {}", voucher.number);
        for (product_id, delta) in stock_moves {
            self.move_stock(&mut tx, product_id, -delta, &reason)?;
        }

        let voucher = self.repo.replace(&mut tx, voucher)?;
        tx.commit().await?;

        tracing::info!("🚚 Talão {}: entrega registrada ({})", voucher.number, voucher.status);
        Ok(voucher)
    }

    /// Devolução de material. Nunca pode passar do saldo líquido do item.
    pub async fn register_return(
        &self,
        id: Uuid,
        payload: RegisterReturnPayload,
    ) -> Result<Voucher, AppError> {
        let mut tx = self.store.begin().await;
        let mut voucher = self.repo.get(&tx, id)?.clone();

        let item = voucher
            .item_mut(payload.item_id)
            .ok_or(AppError::not_found("Item do talão", payload.item_id))?;

        let available = item.net_quantity();
        if payload.quantity <= Decimal::ZERO || payload.quantity > available {
            return Err(AppError::ReturnExceedsAvailable {
                requested: payload.quantity,
                available,
            });
        }
        item.returned_quantity += payload.quantity;

        let restock = match (item.source, item.product_id) {
            (ItemSource::Stock, Some(product_id)) => Some(product_id),
            _ => None,
        };

        voucher.status = voucher.status_after_return();

        if let Some(product_id) = restock {
            let reason = format!("Devolução do talão {}", voucher.number);
            self.move_stock(&mut tx, product_id, payload.quantity, &reason)?;
        }

        self.repo.insert_return(
            &mut tx,
            ReturnRecord {
                id: Uuid::new_v4(),
                voucher_id: voucher.id,
                voucher_item_id: payload.item_id,
                quantity: payload.quantity,
                reason: payload.reason,
                created_at: Utc::now(),
            },
        );

        let voucher = self.repo.replace(&mut tx, voucher)?;
        tx.commit().await?;

        tracing::info!("↩️ Talão {}: devolução registrada ({})", voucher.number, voucher.status);
        Ok(voucher)
    }

    // Produto excluído do catálogo: o talão segue, só não há saldo a mexer.
    fn move_stock(
        &self,
        tx: &mut Snapshot,
        product_id: Uuid,
        delta: Decimal,
        reason: &str,
    ) -> Result<(), AppError> {
        if !tx.products.contains(product_id) {
            tracing::warn!("Produto {} não existe mais; estoque não ajustado", product_id);
            return Ok(());
        }
        self.catalog_repo
            .apply_stock_delta(tx, product_id, delta, reason.to_string())?;
        Ok(())
    }

    /// "TAL-" + últimos 6 dígitos do relógio em ms, incrementado até ficar único.
    fn next_number(&self, tx: &Snapshot) -> String {
        let mut seed = Utc::now().timestamp_millis().rem_euclid(1_000_000);
        loop {
            let number = format!("TAL-{:06}", seed);
            if !self.repo.number_exists(tx, &number) {
                return number;
            }
            seed = (seed + 1) % 1_000_000;
        }
    }
}

// Valida as referências ao catálogo e completa o preço pelo cadastro do produto.
fn build_items(tx: &Snapshot, items: Vec<NewVoucherItem>) -> Result<Vec<VoucherItem>, AppError> {
    items
        .into_iter()
        .map(|new| {
            let mut unit_price = new.unit_price;
            if let Some(product_id) = new.product_id {
                let product = tx
                    .products
                    .get(product_id)
                    .ok_or(AppError::not_found("Produto", product_id))?;
                unit_price = unit_price.or(product.price);
            }
            let mut item = new.into_item();
            item.unit_price = unit_price;
            Ok(item)
        })
        .collect()
}
