// src/services/markup.rs
//
// Resolução do markup aplicado a um custo (funções puras) e o cadastro de regras.

use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;
use validator::ValidationErrors;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, SettingsRepository, Store},
    models::markup::{
        check_rule_reference, CreateMarkupRulePayload, MarkupContext, MarkupQuote,
        MarkupQuotePayload, MarkupRule, MarkupTarget, UpdateMarkupRulePayload,
    },
};

/// Percentual (fração) que vale para o contexto.
///
/// Precedência: produto interno (0) > regra da obra > regra da categoria >
/// regra global > padrão das configurações.
pub fn resolve_percentage(rules: &[MarkupRule], default: Decimal, ctx: &MarkupContext<'_>) -> Decimal {
    if ctx.internal_product {
        return Decimal::ZERO;
    }

    let project_ref = ctx.project_id.map(|id| id.to_string());

    project_ref
        .as_deref()
        .and_then(|id| find_rule(rules, MarkupTarget::Project, Some(id)))
        .or_else(|| ctx.category.and_then(|c| find_rule(rules, MarkupTarget::Category, Some(c))))
        .or_else(|| find_rule(rules, MarkupTarget::Global, None))
        .unwrap_or(default)
}

// A regra global casa com qualquer referência.
fn find_rule(rules: &[MarkupRule], target: MarkupTarget, reference: Option<&str>) -> Option<Decimal> {
    rules
        .iter()
        .find(|r| {
            r.target == target
                && (target == MarkupTarget::Global || r.reference.as_deref() == reference)
        })
        .map(|r| r.percentage)
}

/// custo x (1 + percentual), em centavos, meio para longe do zero.
pub fn apply_markup(unit_cost: Decimal, percentage: Decimal) -> Decimal {
    unit_cost
        .saturating_mul(Decimal::ONE.saturating_add(percentage))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Clone)]
pub struct MarkupService {
    store: Store,
    settings_repo: SettingsRepository,
    catalog_repo: CatalogRepository,
}

impl MarkupService {
    pub fn new(store: Store, settings_repo: SettingsRepository, catalog_repo: CatalogRepository) -> Self {
        Self {
            store,
            settings_repo,
            catalog_repo,
        }
    }

    pub async fn list_rules(&self) -> Vec<MarkupRule> {
        self.settings_repo.list_rules().await
    }

    pub async fn create_rule(&self, payload: CreateMarkupRulePayload) -> Result<MarkupRule, AppError> {
        let mut tx = self.store.begin().await;
        let rule = self.settings_repo.insert_rule(
            &mut tx,
            MarkupRule {
                id: Uuid::new_v4(),
                target: payload.target,
                // Regra global não tem referência.
                reference: match payload.target {
                    MarkupTarget::Global => None,
                    _ => payload.reference.map(|r| r.trim().to_string()),
                },
                percentage: payload.percentage,
            },
        );
        tx.commit().await?;
        Ok(rule)
    }

    pub async fn update_rule(
        &self,
        id: Uuid,
        payload: UpdateMarkupRulePayload,
    ) -> Result<MarkupRule, AppError> {
        let mut tx = self.store.begin().await;
        let rule = self.settings_repo.update_rule(&mut tx, id, |r| payload.apply_to(r))?;
        // A regra resultante precisa continuar válida; senão o rascunho é descartado.
        if let Err(err) = check_rule_reference(rule.target, rule.reference.as_deref()) {
            let mut errors = ValidationErrors::new();
            errors.add("reference", err);
            return Err(AppError::ValidationError(errors));
        }
        tx.commit().await?;
        Ok(rule)
    }

    pub async fn delete_rule(&self, id: Uuid) -> Result<MarkupRule, AppError> {
        let mut tx = self.store.begin().await;
        let rule = self.settings_repo.delete_rule(&mut tx, id)?;
        tx.commit().await?;
        Ok(rule)
    }

    /// Simula o preço para a obra sem gravar nada.
    pub async fn quote(&self, payload: MarkupQuotePayload) -> Result<MarkupQuote, AppError> {
        let product = match payload.product_id {
            Some(id) => Some(self.catalog_repo.find_product(id).await?),
            None => None,
        };

        let state = self.store.read().await;
        let ctx = MarkupContext {
            project_id: payload.project_id,
            category: product
                .as_ref()
                .and_then(|p| p.category.as_deref())
                .or(payload.category.as_deref()),
            internal_product: product.as_ref().is_some_and(|p| p.is_internal()),
        };
        let percentage = resolve_percentage(
            state.markup_rules.as_slice(),
            state.config.default_markup,
            &ctx,
        );

        Ok(MarkupQuote {
            unit_cost: payload.unit_cost,
            percentage,
            project_unit_price: apply_markup(payload.unit_cost, percentage),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn rule(target: MarkupTarget, reference: Option<&str>, percentage: &str) -> MarkupRule {
        MarkupRule {
            id: Uuid::new_v4(),
            target,
            reference: reference.map(String::from),
            percentage: d(percentage),
        }
    }

    #[test]
    fn no_rule_uses_default() {
        let ctx = MarkupContext::default();
        let pct = resolve_percentage(&[], d("0.20"), &ctx);
        assert_eq!(pct, d("0.20"));
        assert_eq!(apply_markup(d("35.00"), pct), d("42.00"));
    }

    #[test]
    fn project_beats_category_beats_global() {
        let project_id = Uuid::new_v4();
        let rules = vec![
            rule(MarkupTarget::Global, None, "0.10"),
            rule(MarkupTarget::Category, Some("Elétrica"), "0.15"),
            rule(MarkupTarget::Project, Some(&project_id.to_string()), "0.30"),
        ];

        let full = MarkupContext {
            project_id: Some(project_id),
            category: Some("Elétrica"),
            internal_product: false,
        };
        assert_eq!(resolve_percentage(&rules, d("0.20"), &full), d("0.30"));

        let other_project = MarkupContext {
            project_id: Some(Uuid::new_v4()),
            ..full.clone()
        };
        assert_eq!(resolve_percentage(&rules, d("0.20"), &other_project), d("0.15"));

        let other_category = MarkupContext {
            category: Some("Hidráulica"),
            ..other_project.clone()
        };
        assert_eq!(resolve_percentage(&rules, d("0.20"), &other_category), d("0.10"));
    }

    #[test]
    fn internal_product_is_never_marked_up() {
        let rules = vec![rule(MarkupTarget::Global, None, "0.50")];
        let ctx = MarkupContext {
            internal_product: true,
            ..Default::default()
        };
        let pct = resolve_percentage(&rules, d("0.20"), &ctx);
        assert_eq!(apply_markup(d("35.00"), pct), d("35.00"));
    }

    #[test]
    fn explicit_zero_global_rule_is_honored() {
        let rules = vec![rule(MarkupTarget::Global, None, "0")];
        let pct = resolve_percentage(&rules, d("0.20"), &MarkupContext::default());
        assert_eq!(pct, Decimal::ZERO);
    }

    #[test]
    fn huge_cost_saturates_instead_of_panicking() {
        assert_eq!(apply_markup(Decimal::MAX, d("0.20")), Decimal::MAX);
    }

    #[test]
    fn rounds_half_cents_away_from_zero() {
        // 10.05 x 1.10 = 11.055
        assert_eq!(apply_markup(d("10.05"), d("0.10")), d("11.06"));
    }
}
