mod common;

use common::{d, date, harness};
use pls_obras::{
    common::error::AppError,
    models::{
        catalog::ProductKind,
        markup::{
            CreateMarkupRulePayload, MarkupQuotePayload, MarkupTarget, UpdateMarkupRulePayload,
        },
        purchase::{CreatePurchasePayload, NewPurchaseItem, UpdatePurchasePayload},
        voucher::LinkPurchasePayload,
    },
};
use uuid::Uuid;
use validator::Validate;

fn item(product_id: Option<Uuid>, cost: &str) -> NewPurchaseItem {
    NewPurchaseItem {
        product_id,
        description: "Areia média".into(),
        quantity: d("5"),
        unit: "M3".into(),
        unit_cost: d(cost),
    }
}

fn purchase(supplier_id: Uuid, project_id: Option<Uuid>, items: Vec<NewPurchaseItem>) -> CreatePurchasePayload {
    CreatePurchasePayload {
        supplier_id,
        project_id,
        invoice_number: Some("NF-12345".into()),
        date: date(2025, 3, 12),
        attachments: vec![],
        items,
    }
}

fn rule(target: MarkupTarget, reference: Option<String>, pct: &str) -> CreateMarkupRulePayload {
    CreateMarkupRulePayload {
        target,
        reference,
        percentage: d(pct),
    }
}

#[tokio::test]
async fn default_markup_turns_35_into_42() {
    let h = harness().await;
    let supplier = h.supplier("Materiais XYZ").await;

    let created = h
        .purchases
        .create(purchase(supplier.id, None, vec![item(None, "35.00")]))
        .await
        .unwrap();

    let line = &created.items[0];
    assert_eq!(line.applied_markup, d("0.20"));
    assert_eq!(line.project_unit_price, d("42.00"));
    assert_eq!(created.total_cost(), d("175"));
    assert_eq!(created.total_billed(), d("210"));
}

#[tokio::test]
async fn project_rule_beats_category_beats_global() {
    let h = harness().await;
    let supplier = h.supplier("Materiais XYZ").await;
    let project = h.project("Obra Norte").await;
    let other = h.project("Obra Sul").await;
    let sand = h.product("Areia", "Materiais Básicos", "45", "0").await;

    h.markup.create_rule(rule(MarkupTarget::Global, None, "0.10")).await.unwrap();
    h.markup
        .create_rule(rule(MarkupTarget::Category, Some("Materiais Básicos".into()), "0.15"))
        .await
        .unwrap();
    h.markup
        .create_rule(rule(MarkupTarget::Project, Some(project.id.to_string()), "0.30"))
        .await
        .unwrap();

    let on_project = h
        .purchases
        .create(purchase(supplier.id, Some(project.id), vec![item(Some(sand.id), "100")]))
        .await
        .unwrap();
    assert_eq!(on_project.items[0].applied_markup, d("0.30"));
    assert_eq!(on_project.items[0].project_unit_price, d("130.00"));

    let by_category = h
        .purchases
        .create(purchase(supplier.id, Some(other.id), vec![item(Some(sand.id), "100")]))
        .await
        .unwrap();
    assert_eq!(by_category.items[0].applied_markup, d("0.15"));

    let global = h
        .purchases
        .create(purchase(supplier.id, Some(other.id), vec![item(None, "100")]))
        .await
        .unwrap();
    assert_eq!(global.items[0].applied_markup, d("0.10"));
}

#[tokio::test]
async fn internal_products_are_never_marked_up() {
    let h = harness().await;
    let supplier = h.supplier("Materiais XYZ").await;
    let block = h
        .product_of_kind("Bloco próprio", "Alvenaria", "3", "0", ProductKind::Internal)
        .await;
    h.markup
        .create_rule(rule(MarkupTarget::Category, Some("Alvenaria".into()), "0.50"))
        .await
        .unwrap();

    let created = h
        .purchases
        .create(purchase(supplier.id, None, vec![item(Some(block.id), "2.50")]))
        .await
        .unwrap();
    assert_eq!(created.items[0].applied_markup, d("0"));
    assert_eq!(created.items[0].project_unit_price, d("2.50"));
}

#[tokio::test]
async fn moving_purchase_to_another_project_reprices_items() {
    let h = harness().await;
    let supplier = h.supplier("Materiais XYZ").await;
    let project = h.project("Obra Norte").await;
    h.markup
        .create_rule(rule(MarkupTarget::Project, Some(project.id.to_string()), "0.50"))
        .await
        .unwrap();

    let created = h
        .purchases
        .create(purchase(supplier.id, None, vec![item(None, "10")]))
        .await
        .unwrap();
    assert_eq!(created.items[0].project_unit_price, d("12.00"));

    let moved = h
        .purchases
        .update(
            created.id,
            UpdatePurchasePayload {
                project_id: Some(Some(project.id)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.items[0].id, created.items[0].id);
    assert_eq!(moved.items[0].project_unit_price, d("15.00"));

    // Campo ausente mantém a obra atual
    let untouched = h
        .purchases
        .update(
            created.id,
            UpdatePurchasePayload {
                invoice_number: Some("NF-2".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(untouched.project_id, Some(project.id));
    assert_eq!(untouched.items[0].project_unit_price, d("15.00"));

    // Sem obra de novo: volta ao markup padrão
    let cleared = h
        .purchases
        .update(
            created.id,
            UpdatePurchasePayload {
                project_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.project_id, None);
    assert_eq!(cleared.items[0].project_unit_price, d("12.00"));
}

#[tokio::test]
async fn purchase_requires_known_supplier() {
    let h = harness().await;
    let result = h
        .purchases
        .create(purchase(Uuid::new_v4(), None, vec![item(None, "10")]))
        .await;
    assert!(matches!(result, Err(AppError::NotFound { entity: "Fornecedor", .. })));
    assert!(h.purchases.list(None, None).await.is_empty());
}

#[tokio::test]
async fn quote_matches_what_a_purchase_would_charge() {
    let h = harness().await;
    let quote = h
        .markup
        .quote(MarkupQuotePayload {
            unit_cost: d("35.00"),
            project_id: None,
            product_id: None,
            category: None,
        })
        .await
        .unwrap();
    assert_eq!(quote.percentage, d("0.20"));
    assert_eq!(quote.project_unit_price, d("42.00"));
}

#[tokio::test]
async fn voucher_item_can_be_linked_to_a_purchase_item() {
    let h = harness().await;
    let supplier = h.supplier("Materiais XYZ").await;
    let project = h.project("Obra Norte").await;
    let sand = h.product("Areia", "Materiais Básicos", "45", "0").await;

    let bought = h
        .purchases
        .create(purchase(supplier.id, Some(project.id), vec![item(Some(sand.id), "35")]))
        .await
        .unwrap();
    let voucher = h.voucher(&project, &sand, "5").await;

    let linked = h
        .purchases
        .link_purchase(
            voucher.id,
            LinkPurchasePayload {
                purchase_item_id: bought.items[0].id,
                voucher_item_id: voucher.items[0].id,
                quantity: d("5"),
            },
        )
        .await
        .unwrap();
    assert_eq!(linked.items[0].purchase_links.len(), 1);
    assert_eq!(linked.items[0].purchase_links[0].purchase_item_id, bought.items[0].id);

    let unknown = h
        .purchases
        .link_purchase(
            voucher.id,
            LinkPurchasePayload {
                purchase_item_id: Uuid::new_v4(),
                voucher_item_id: voucher.items[0].id,
                quantity: d("1"),
            },
        )
        .await;
    assert!(matches!(unknown, Err(AppError::NotFound { .. })));
}

#[tokio::test]
async fn oversized_purchase_values_fail_validation() {
    let mut huge = item(None, "1000000000000000");
    huge.quantity = d("1000000000000000");
    let payload = purchase(Uuid::new_v4(), None, vec![huge]);
    assert!(payload.validate().is_err());

    let quote = MarkupQuotePayload {
        unit_cost: d("79228162514264337593543950335"),
        project_id: None,
        product_id: None,
        category: None,
    };
    assert!(quote.validate().is_err());

    // No limite ainda é aceito
    let limit = purchase(Uuid::new_v4(), None, vec![item(None, "1000000000000")]);
    assert!(limit.validate().is_ok());
}

#[tokio::test]
async fn rule_update_keeps_the_reference_consistent() {
    let h = harness().await;
    let global = h.markup.create_rule(rule(MarkupTarget::Global, None, "0.10")).await.unwrap();

    // Global -> categoria sem referência: recusado e nada muda
    let err = h
        .markup
        .update_rule(
            global.id,
            UpdateMarkupRulePayload {
                target: Some(MarkupTarget::Category),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    let rules = h.markup.list_rules().await;
    assert_eq!(rules[0].target, MarkupTarget::Global);
    assert_eq!(rules[0].reference, None);

    // Referência em branco também não serve
    let err = h
        .markup
        .update_rule(
            global.id,
            UpdateMarkupRulePayload {
                target: Some(MarkupTarget::Project),
                reference: Some("   ".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let category = h
        .markup
        .update_rule(
            global.id,
            UpdateMarkupRulePayload {
                target: Some(MarkupTarget::Category),
                reference: Some(" Alvenaria ".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(category.reference.as_deref(), Some("Alvenaria"));

    // Voltar para global descarta a referência antiga
    let back = h
        .markup
        .update_rule(
            global.id,
            UpdateMarkupRulePayload {
                target: Some(MarkupTarget::Global),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(back.target, MarkupTarget::Global);
    assert_eq!(back.reference, None);
    assert_eq!(h.markup.list_rules().await[0].reference, None);
}
