pub mod auth;
pub mod backup_service;
pub mod catalog_service;
pub mod document_service;
pub mod markup;
pub mod project_service;
pub mod purchase_service;
pub mod report_service;
pub mod seed;
pub mod sync_service;
pub mod sync_worker;
pub mod voucher_service;

pub use auth::AuthService;
pub use backup_service::BackupService;
pub use catalog_service::CatalogService;
pub use document_service::DocumentService;
pub use markup::MarkupService;
pub use project_service::ProjectService;
pub use purchase_service::PurchaseService;
pub use report_service::ReportService;
pub use sync_service::SyncService;
pub use sync_worker::{SyncHandle, SyncWorker};
pub use voucher_service::VoucherService;
