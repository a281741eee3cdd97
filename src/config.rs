// src/config.rs

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::watch;

use crate::{
    db::{
        CatalogRepository, JsonFileStorage, PgMirror, ProjectRepository, PurchaseRepository,
        RemoteMirror, SettingsRepository, Snapshot, Store, VoucherRepository,
    },
    models::sync::SyncStatus,
    services::{
        seed, AuthService, BackupService, CatalogService, DocumentService, MarkupService,
        ProjectService, PurchaseService, ReportService, SyncHandle, SyncService, SyncWorker,
        VoucherService,
    },
};

// Variáveis de ambiente (com `.env` opcional)
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub data_dir: PathBuf,
    pub database_url: Option<String>,
    pub sync_debounce: Duration,
    pub jwt_secret: String,
    pub admin_email: String,
    pub admin_password_hash: String,
    pub default_markup: Decimal,
    pub fonts_dir: PathBuf,
    pub seed_demo_data: bool,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        let admin_password_hash =
            env::var("ADMIN_PASSWORD_HASH").context("ADMIN_PASSWORD_HASH deve ser definido")?;

        let sync_debounce_ms: u64 = var_or("SYNC_DEBOUNCE_MS", "2000")
            .parse()
            .context("SYNC_DEBOUNCE_MS deve ser um número de milissegundos")?;
        let default_markup: Decimal = var_or("DEFAULT_MARKUP", "0.20")
            .parse()
            .context("DEFAULT_MARKUP deve ser decimal (ex.: 0.20)")?;

        Ok(Self {
            bind_addr: var_or("BIND_ADDR", "0.0.0.0:3000"),
            data_dir: PathBuf::from(var_or("DATA_DIR", "./data")),
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            sync_debounce: Duration::from_millis(sync_debounce_ms),
            jwt_secret,
            admin_email: var_or("ADMIN_EMAIL", "admin@pls.com"),
            admin_password_hash,
            default_markup,
            fonts_dir: PathBuf::from(var_or("FONTS_DIR", "./fonts")),
            seed_demo_data: matches!(
                var_or("SEED_DEMO_DATA", "false").to_lowercase().as_str(),
                "1" | "true" | "yes"
            ),
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub settings_repo: SettingsRepository,
    pub auth_service: AuthService,
    pub project_service: ProjectService,
    pub catalog_service: CatalogService,
    pub voucher_service: VoucherService,
    pub purchase_service: PurchaseService,
    pub markup_service: MarkupService,
    pub backup_service: BackupService,
    pub sync_service: SyncService,
    pub report_service: ReportService,
    pub document_service: DocumentService,
    // Presente depois de `start_sync_worker`
    pub sync_status: Option<watch::Receiver<SyncStatus>>,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let storage = Arc::new(JsonFileStorage::new(&config.data_dir));
        tracing::info!("💾 Estado local em {}", storage.path().display());

        let mut initial = Snapshot::default();
        initial.config.default_markup = config.default_markup;
        let store = Store::open(storage, initial).await?;

        if config.seed_demo_data {
            seed::seed_if_empty(&store).await?;
        }

        let mirror: Option<Arc<dyn RemoteMirror>> = match &config.database_url {
            Some(database_url) => {
                let pool = PgPoolOptions::new()
                    .max_connections(5)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await
                    .context("Falha ao conectar ao banco de dados remoto")?;
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                let mirror = PgMirror::new(pool);
                mirror.migrate().await?;
                Some(Arc::new(mirror))
            }
            None => {
                tracing::info!("☁️ DATABASE_URL ausente: sincronização remota desativada");
                None
            }
        };

        // --- Monta o gráfico de dependências ---
        let project_repo = ProjectRepository::new(store.clone());
        let catalog_repo = CatalogRepository::new(store.clone());
        let voucher_repo = VoucherRepository::new(store.clone());
        let purchase_repo = PurchaseRepository::new(store.clone());
        let settings_repo = SettingsRepository::new(store.clone());

        Ok(Self {
            auth_service: AuthService::new(
                config.admin_email.clone(),
                config.admin_password_hash.clone(),
                config.jwt_secret.clone(),
            ),
            project_service: ProjectService::new(store.clone(), project_repo),
            catalog_service: CatalogService::new(store.clone(), catalog_repo.clone()),
            voucher_service: VoucherService::new(store.clone(), voucher_repo.clone(), catalog_repo.clone()),
            purchase_service: PurchaseService::new(store.clone(), purchase_repo, voucher_repo.clone()),
            markup_service: MarkupService::new(store.clone(), settings_repo.clone(), catalog_repo),
            backup_service: BackupService::new(store.clone()),
            sync_service: SyncService::new(store.clone(), mirror),
            report_service: ReportService::new(store.clone()),
            document_service: DocumentService::new(store.clone(), voucher_repo, config.fonts_dir.clone()),
            settings_repo,
            store,
            sync_status: None,
        })
    }

    /// Sobe o sincronizador quando há espelho remoto configurado.
    pub fn start_sync_worker(&mut self, debounce: Duration) -> Option<SyncHandle> {
        if !self.sync_service.is_configured() {
            return None;
        }
        let handle = SyncWorker::start(self.sync_service.clone(), self.store.subscribe(), debounce);
        self.sync_status = Some(handle.subscribe());
        Some(handle)
    }
}
