pub mod table;
pub mod store;
pub mod local_storage;
pub use local_storage::{JsonFileStorage, MemoryStorage, StateStorage};
pub mod remote_mirror;
pub use remote_mirror::{MemoryMirror, PgMirror, RemoteMirror, RemoteTable};
pub use store::{Snapshot, Store, StoreTx};

pub mod project_repo;
pub use project_repo::ProjectRepository;
pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod voucher_repo;
pub use voucher_repo::VoucherRepository;
pub mod purchase_repo;
pub use purchase_repo::PurchaseRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
