use std::sync::Arc;

use cadence_config::{
	Config, Interpreter, Learning, Security, Service, Storage, StorageBackend,
};
use cadence_service::{CadenceService, MemoryStore, Resolution};

pub fn test_config() -> Config {
	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			admin_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
		},
		storage: Storage { backend: StorageBackend::Memory, postgres: None },
		interpreter: Interpreter::default(),
		learning: Learning::default(),
		security: Security::default(),
	}
}

pub fn memory_service() -> (CadenceService, Arc<MemoryStore>) {
	let store = Arc::new(MemoryStore::new());
	let service = CadenceService::new(&test_config(), store.clone())
		.expect("Failed to build service.");

	(service, store)
}

pub fn schedule_resolution(person: &str, time: &str) -> Resolution {
	Resolution {
		kind: "schedule".to_string(),
		person: Some(person.to_string()),
		time: Some(time.to_string()),
		agenda: None,
	}
}
