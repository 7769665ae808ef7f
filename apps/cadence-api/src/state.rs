use std::sync::Arc;

use color_eyre::eyre;

use cadence_config::{Config, StorageBackend};
use cadence_service::{CadenceService, LearningStore, MemoryStore, PgStore};
use cadence_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<CadenceService>,
}
impl AppState {
	pub async fn new(config: &Config) -> color_eyre::Result<Self> {
		let store: Arc<dyn LearningStore> = match config.storage.backend {
			StorageBackend::Memory => {
				tracing::warn!("Using in-memory learning store. Learned data is lost on restart.");

				Arc::new(MemoryStore::new())
			},
			StorageBackend::Postgres => {
				let postgres = config.storage.postgres.as_ref().ok_or_else(|| {
					eyre::eyre!("storage.postgres is required when storage.backend is postgres.")
				})?;
				let db = Db::connect(postgres).await?;

				db.ensure_schema().await?;

				Arc::new(PgStore::new(db))
			},
		};
		let service = CadenceService::new(config, store)?;

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: CadenceService) -> Self {
		Self { service: Arc::new(service) }
	}
}
