//! in memory [ConfigSource] for the unit tests, keeps documents in a map and
//! records every write. Failures can be injected to exercise the error paths
//! of the form and the table.

use std::{
	collections::HashMap,
	sync::{
		atomic::{AtomicBool, Ordering},
		Mutex,
	},
};

use async_trait::async_trait;

use super::{ClientError, ConfigSource};
use crate::amconfig::AlertManagerCortexConfig;

#[derive(Debug, Default)]
pub struct MemoryConfigSource {
	/// current document per source name
	documents: Mutex<HashMap<String, AlertManagerCortexConfig>>,
	/// every successful write, oldest first
	updates: Mutex<Vec<(String, AlertManagerCortexConfig)>>,
	fail_fetch: AtomicBool,
	fail_update: AtomicBool,
}

impl MemoryConfigSource {
	/// source holding a single document
	pub fn new(source: impl Into<String>, config: AlertManagerCortexConfig) -> Self {
		let this = Self::default();
		this.insert(source, config);
		this
	}

	/// store a document without recording it as an update
	pub fn insert(&self, source: impl Into<String>, config: AlertManagerCortexConfig) {
		self.documents.lock().unwrap_or_else(|e| e.into_inner()).insert(source.into(), config);
	}

	/// all writes so far
	pub fn updates(&self) -> Vec<(String, AlertManagerCortexConfig)> {
		self.updates.lock().unwrap_or_else(|e| e.into_inner()).clone()
	}

	/// make every following fetch fail until reset
	pub fn fail_fetch(&self, fail: bool) {
		self.fail_fetch.store(fail, Ordering::SeqCst);
	}

	/// make every following update fail until reset
	pub fn fail_update(&self, fail: bool) {
		self.fail_update.store(fail, Ordering::SeqCst);
	}

	fn injected_failure() -> ClientError {
		ClientError::Status {
			status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
			body: String::from("injected failure"),
		}
	}
}

#[async_trait]
impl ConfigSource for MemoryConfigSource {
	async fn fetch_config(&self, source: &str) -> Result<AlertManagerCortexConfig, ClientError> {
		if self.fail_fetch.load(Ordering::SeqCst) {
			return Err(Self::injected_failure());
		}

		self.documents
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.get(source)
			.cloned()
			.ok_or_else(|| ClientError::UnknownSource(source.to_owned()))
	}

	async fn update_config(
		&self,
		source: &str,
		config: &AlertManagerCortexConfig,
	) -> Result<(), ClientError> {
		if self.fail_update.load(Ordering::SeqCst) {
			return Err(Self::injected_failure());
		}

		self.insert(source, config.clone());
		self.updates
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.push((source.to_owned(), config.clone()));

		Ok(())
	}
}
