// src/services/backup_service.rs

use std::fmt::Display;

use validator::ValidationError;

use crate::{
    common::{
        error::AppError,
        validation::{
            validate_max_amount, validate_not_negative, validate_percentage, validate_positive,
        },
    },
    db::{store::SnapshotImport, Snapshot, Store},
    models::markup::check_rule_reference,
};

#[derive(Clone)]
pub struct BackupService {
    store: Store,
}

impl BackupService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn export(&self) -> Snapshot {
        self.store.snapshot().await
    }

    /// Documento JSON formatado, pronto para download.
    pub async fn export_json(&self) -> Result<String, AppError> {
        let snapshot = self.store.snapshot().await;
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    /// Importa um backup. Só as coleções presentes no documento substituem as atuais.
    pub async fn import_json(&self, raw: &str) -> Result<Snapshot, AppError> {
        let doc: SnapshotImport =
            serde_json::from_str(raw).map_err(|e| AppError::InvalidImport(e.to_string()))?;
        check_import(&doc).map_err(AppError::InvalidImport)?;

        let mut tx = self.store.begin().await;
        doc.merge_into(&mut tx);
        let snapshot = Snapshot::clone(&tx);
        tx.commit().await?;

        tracing::info!(
            "📥 Backup importado: {} obras, {} produtos, {} talões, {} compras",
            snapshot.projects.len(),
            snapshot.products.len(),
            snapshot.vouchers.len(),
            snapshot.purchases.len()
        );
        Ok(snapshot)
    }
}

fn field(
    place: impl Display,
    name: &str,
    result: Result<(), ValidationError>,
) -> Result<(), String> {
    result.map_err(|e| {
        let reason = e.message.unwrap_or(e.code);
        format!("{place}, {name}: {reason}")
    })
}

// Regras de negócio que o formato JSON sozinho não garante.
fn check_import(doc: &SnapshotImport) -> Result<(), String> {
    if let Some(products) = &doc.products {
        for p in products.iter() {
            let place = format!("produto {}", p.id);
            if let Some(price) = &p.price {
                field(&place, "price", validate_not_negative(price))?;
            }
            field(&place, "stock", validate_max_amount(&p.stock))?;
        }
    }

    if let Some(vouchers) = &doc.vouchers {
        for v in vouchers.iter() {
            for item in &v.items {
                let place = format!("talão {}, item {}", v.number, item.id);
                field(&place, "quantity", validate_positive(&item.quantity))?;
                if let Some(price) = &item.unit_price {
                    field(&place, "unitPrice", validate_not_negative(price))?;
                }
                field(&place, "deliveredQuantity", validate_not_negative(&item.delivered_quantity))?;
                field(&place, "returnedQuantity", validate_not_negative(&item.returned_quantity))?;
                if item.returned_quantity > item.delivered_quantity {
                    return Err(format!(
                        "{place}: devolvido ({}) maior que o entregue ({})",
                        item.returned_quantity, item.delivered_quantity
                    ));
                }
                for link in &item.purchase_links {
                    field(&place, "purchaseLinks.quantity", validate_positive(&link.quantity))?;
                }
            }
        }
    }

    if let Some(purchases) = &doc.purchases {
        for purchase in purchases.iter() {
            for item in &purchase.items {
                let place = format!("compra {}, item {}", purchase.id, item.id);
                field(&place, "quantity", validate_positive(&item.quantity))?;
                field(&place, "unitCost", validate_not_negative(&item.unit_cost))?;
                field(&place, "appliedMarkup", validate_percentage(&item.applied_markup))?;
                field(&place, "projectUnitPrice", validate_not_negative(&item.project_unit_price))?;
            }
        }
    }

    if let Some(returns) = &doc.returns {
        for r in returns.iter() {
            field(format!("devolução {}", r.id), "quantity", validate_positive(&r.quantity))?;
        }
    }

    if let Some(rules) = &doc.markup_rules {
        for rule in rules.iter() {
            let place = format!("regra de markup {}", rule.id);
            field(&place, "percentage", validate_percentage(&rule.percentage))?;
            field(&place, "reference", check_rule_reference(rule.target, rule.reference.as_deref()))?;
        }
    }

    if let Some(adjustments) = &doc.stock_adjustments {
        for a in adjustments.iter() {
            field(format!("ajuste {}", a.id), "delta", validate_max_amount(&a.delta))?;
        }
    }

    if let Some(config) = &doc.config {
        field("config", "defaultMarkup", validate_percentage(&config.default_markup))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::voucher::{ItemSource, Voucher, VoucherItem, VoucherStatus};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn item(delivered: Decimal, returned: Decimal) -> VoucherItem {
        VoucherItem {
            id: Uuid::new_v4(),
            product_id: None,
            description: Some("Brita".into()),
            quantity: Decimal::TEN,
            unit: "m³".into(),
            source: ItemSource::ExternalPurchase,
            unit_price: None,
            delivered_quantity: delivered,
            returned_quantity: returned,
            purchase_links: Vec::new(),
        }
    }

    fn doc_with(item: VoucherItem) -> SnapshotImport {
        let mut vouchers = crate::db::table::Table::default();
        vouchers.insert(Voucher {
            id: Uuid::new_v4(),
            number: "TAL-0001".into(),
            project_id: Uuid::new_v4(),
            requester: "Mestre João".into(),
            status: VoucherStatus::Completed,
            items: vec![item],
            signature: None,
            created_at: chrono::NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        });
        SnapshotImport {
            vouchers: Some(vouchers),
            ..Default::default()
        }
    }

    #[test]
    fn returned_above_delivered_is_refused() {
        let err = check_import(&doc_with(item(Decimal::TWO, Decimal::from(9)))).unwrap_err();
        assert!(err.contains("TAL-0001"), "{err}");
        assert!(err.contains("devolvido (9) maior que o entregue (2)"), "{err}");

        assert!(check_import(&doc_with(item(Decimal::TWO, Decimal::TWO))).is_ok());
    }

    #[test]
    fn negative_quantities_are_refused() {
        let err = check_import(&doc_with(item(Decimal::NEGATIVE_ONE, Decimal::ZERO))).unwrap_err();
        assert!(err.contains("deliveredQuantity"), "{err}");
    }
}
