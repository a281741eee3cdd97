// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Projects ---
        handlers::projects::list_projects,
        handlers::projects::create_project,
        handlers::projects::get_project,
        handlers::projects::update_project,
        handlers::projects::delete_project,
        handlers::projects::list_project_vouchers,

        // --- Products / Stock ---
        handlers::catalog::list_products,
        handlers::catalog::create_product,
        handlers::catalog::get_product,
        handlers::catalog::update_product,
        handlers::catalog::delete_product,
        handlers::catalog::adjust_stock,
        handlers::catalog::list_product_adjustments,
        handlers::catalog::list_adjustments,

        // --- Suppliers ---
        handlers::catalog::list_suppliers,
        handlers::catalog::create_supplier,
        handlers::catalog::get_supplier,
        handlers::catalog::update_supplier,
        handlers::catalog::delete_supplier,

        // --- Vouchers ---
        handlers::vouchers::list_vouchers,
        handlers::vouchers::create_voucher,
        handlers::vouchers::get_voucher,
        handlers::vouchers::update_voucher,
        handlers::vouchers::delete_voucher,
        handlers::vouchers::dispatch_voucher,
        handlers::vouchers::record_delivery,
        handlers::vouchers::register_return,
        handlers::vouchers::link_purchase,
        handlers::vouchers::list_returns,
        handlers::documents::voucher_pdf,

        // --- Purchases ---
        handlers::purchases::list_purchases,
        handlers::purchases::create_purchase,
        handlers::purchases::get_purchase,
        handlers::purchases::update_purchase,
        handlers::purchases::delete_purchase,

        // --- Markup ---
        handlers::markup::list_rules,
        handlers::markup::create_rule,
        handlers::markup::update_rule,
        handlers::markup::delete_rule,
        handlers::markup::quote,

        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,

        // --- Backup ---
        handlers::backup::export_backup,
        handlers::backup::import_backup,

        // --- Sync ---
        handlers::sync::push,
        handlers::sync::pull,
        handlers::sync::status,
        handlers::sync::test_connection,

        // --- Reports / Dashboard ---
        handlers::dashboard::get_dashboard,
        handlers::dashboard::get_report_summary,
        handlers::documents::report_pdf,
        handlers::documents::report_xlsx,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Operator,
            models::auth::LoginPayload,
            models::auth::AuthResponse,

            // --- Projects ---
            models::project::Project,
            models::project::CreateProjectPayload,
            models::project::UpdateProjectPayload,

            // --- Catalog ---
            models::catalog::ProductKind,
            models::catalog::Product,
            models::catalog::CreateProductPayload,
            models::catalog::UpdateProductPayload,
            models::catalog::Supplier,
            models::catalog::CreateSupplierPayload,
            models::catalog::UpdateSupplierPayload,
            models::stock::StockAdjustment,
            models::stock::StockAdjustmentPayload,
            models::stock::ReturnRecord,

            // --- Vouchers ---
            models::voucher::VoucherStatus,
            models::voucher::ItemSource,
            models::voucher::PurchaseLink,
            models::voucher::VoucherItem,
            models::voucher::Signature,
            models::voucher::Voucher,
            models::voucher::NewVoucherItem,
            models::voucher::CreateVoucherPayload,
            models::voucher::UpdateVoucherPayload,
            models::voucher::ItemDelivery,
            models::voucher::RecordDeliveryPayload,
            models::voucher::SignaturePayload,
            models::voucher::RegisterReturnPayload,
            models::voucher::LinkPurchasePayload,

            // --- Purchases ---
            models::purchase::Attachment,
            models::purchase::PurchaseItem,
            models::purchase::ExternalPurchase,
            models::purchase::NewPurchaseItem,
            models::purchase::CreatePurchasePayload,
            models::purchase::UpdatePurchasePayload,

            // --- Markup ---
            models::markup::MarkupTarget,
            models::markup::MarkupRule,
            models::markup::CreateMarkupRulePayload,
            models::markup::UpdateMarkupRulePayload,
            models::markup::MarkupQuotePayload,
            models::markup::MarkupQuote,

            // --- Settings ---
            models::settings::Theme,
            models::settings::SyncSettings,
            models::settings::Settings,
            models::settings::UpdateSettingsRequest,

            // --- Sync / Backup ---
            models::sync::SyncDirection,
            models::sync::TableCount,
            models::sync::SyncReport,
            models::sync::SyncStatus,
            handlers::backup::ImportSummary,

            // --- Reports ---
            models::report::ReportFilter,
            models::report::ReportTotals,
            models::report::ProjectTotals,
            models::report::VoucherReportLine,
            models::report::ReturnReportLine,
            models::report::ReportSummary,
            models::report::DashboardSummary,
        )
    ),
    tags(
        (name = "Auth", description = "Login do operador"),
        (name = "Projects", description = "Obras"),
        (name = "Products", description = "Catálogo de produtos e ajustes de estoque"),
        (name = "Suppliers", description = "Fornecedores"),
        (name = "Vouchers", description = "Talões: separação, entrega, devolução e impressão"),
        (name = "Purchases", description = "Compras externas com markup"),
        (name = "Markup", description = "Regras de markup e simulação de preço"),
        (name = "Settings", description = "Configurações gerais"),
        (name = "Backup", description = "Exportação e importação do estado"),
        (name = "Sync", description = "Sincronização com o banco remoto"),
        (name = "Reports", description = "Relatórios por obra (JSON, PDF e planilha)"),
        (name = "Dashboard", description = "Indicadores do dia")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
