// src/lib.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::{config::AppState, docs::ApiDoc, middleware::auth::auth_guard};

/// Monta todas as rotas da API. As rotas fora de `/api/auth/login` e
/// `/api/health` exigem token.
pub fn build_router(app_state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/auth/me", get(handlers::auth::get_me))
        // --- Obras ---
        .route(
            "/projects",
            get(handlers::projects::list_projects).post(handlers::projects::create_project),
        )
        .route(
            "/projects/{id}",
            get(handlers::projects::get_project)
                .patch(handlers::projects::update_project)
                .delete(handlers::projects::delete_project),
        )
        .route("/projects/{id}/vouchers", get(handlers::projects::list_project_vouchers))
        // --- Produtos e estoque ---
        .route(
            "/products",
            get(handlers::catalog::list_products).post(handlers::catalog::create_product),
        )
        .route(
            "/products/{id}",
            get(handlers::catalog::get_product)
                .patch(handlers::catalog::update_product)
                .delete(handlers::catalog::delete_product),
        )
        .route(
            "/products/{id}/stock-adjustments",
            get(handlers::catalog::list_product_adjustments).post(handlers::catalog::adjust_stock),
        )
        .route("/stock-adjustments", get(handlers::catalog::list_adjustments))
        // --- Fornecedores ---
        .route(
            "/suppliers",
            get(handlers::catalog::list_suppliers).post(handlers::catalog::create_supplier),
        )
        .route(
            "/suppliers/{id}",
            get(handlers::catalog::get_supplier)
                .patch(handlers::catalog::update_supplier)
                .delete(handlers::catalog::delete_supplier),
        )
        // --- Talões ---
        .route(
            "/vouchers",
            get(handlers::vouchers::list_vouchers).post(handlers::vouchers::create_voucher),
        )
        .route(
            "/vouchers/{id}",
            get(handlers::vouchers::get_voucher)
                .patch(handlers::vouchers::update_voucher)
                .delete(handlers::vouchers::delete_voucher),
        )
        .route("/vouchers/{id}/dispatch", post(handlers::vouchers::dispatch_voucher))
        .route("/vouchers/{id}/deliveries", post(handlers::vouchers::record_delivery))
        .route("/vouchers/{id}/returns", post(handlers::vouchers::register_return))
        .route("/vouchers/{id}/links", post(handlers::vouchers::link_purchase))
        .route("/vouchers/{id}/pdf", get(handlers::documents::voucher_pdf))
        .route("/returns", get(handlers::vouchers::list_returns))
        // --- Compras externas ---
        .route(
            "/purchases",
            get(handlers::purchases::list_purchases).post(handlers::purchases::create_purchase),
        )
        .route(
            "/purchases/{id}",
            get(handlers::purchases::get_purchase)
                .patch(handlers::purchases::update_purchase)
                .delete(handlers::purchases::delete_purchase),
        )
        // --- Markup ---
        .route(
            "/markup-rules",
            get(handlers::markup::list_rules).post(handlers::markup::create_rule),
        )
        .route(
            "/markup-rules/{id}",
            axum::routing::patch(handlers::markup::update_rule).delete(handlers::markup::delete_rule),
        )
        .route("/markup/quote", post(handlers::markup::quote))
        // --- Configurações, backup e sincronização ---
        .route(
            "/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        .route("/backup/export", get(handlers::backup::export_backup))
        .route("/backup/import", post(handlers::backup::import_backup))
        .route("/sync/push", post(handlers::sync::push))
        .route("/sync/pull", post(handlers::sync::pull))
        .route("/sync/status", get(handlers::sync::status))
        .route("/sync/test", get(handlers::sync::test_connection))
        // --- Relatórios e painel ---
        .route("/reports/summary", get(handlers::dashboard::get_report_summary))
        .route("/reports/pdf", get(handlers::documents::report_pdf))
        .route("/reports/xlsx", get(handlers::documents::report_xlsx))
        .route("/dashboard", get(handlers::dashboard::get_dashboard))
        // Aplica o middleware de Auth em tudo
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        // Rotas públicas
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/auth/login", post(handlers::auth::login))
        .nest("/api", protected_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
