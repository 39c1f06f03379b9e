//! Access to the remote alertmanager configuration document.
//!
//! The document is only ever read and written as a whole. There is no
//! partial update, so two editors writing one after another will overwrite
//! each other; [fetch_unchanged] is what the form and the table use to
//! notice that before writing.

use async_trait::async_trait;
use thiserror::Error;

use crate::amconfig::AlertManagerCortexConfig;

mod http;
#[cfg(test)]
mod memory;
pub mod settings;

#[cfg(test)]
pub(crate) use self::memory::MemoryConfigSource;
pub use self::{http::HttpConfigSource, settings::AlertmanagerSettings};

/// Errors of a [ConfigSource]
#[derive(Error, Debug)]
pub enum ClientError {
	/// the request never got a response (connect, timeout, ...)
	#[error("request to alertmanager failed")]
	Request(#[source] reqwest::Error),
	/// the alertmanager answered with a non success status code
	#[error("alertmanager returned {status}: {body}")]
	Status { status: reqwest::StatusCode, body: String },
	/// the response body wasn't a valid configuration document
	#[error("failed to decode alertmanager configuration")]
	Decode(#[source] reqwest::Error),
	/// the configured base url can't have path segments appended
	#[error("invalid alertmanager base url {0}")]
	InvalidBaseUrl(url::Url),
	/// no document is stored under this source name
	#[error("no alertmanager configuration for source {0:?}")]
	UnknownSource(String),
}

#[async_trait]
/// Something that stores alertmanager configuration documents by source
/// name (`grafana` for the built in alertmanager, a datasource uid
/// otherwise).
pub trait ConfigSource: Send + Sync {
	/// read the full document
	async fn fetch_config(&self, source: &str) -> Result<AlertManagerCortexConfig, ClientError>;

	/// replace the full document
	async fn update_config(
		&self,
		source: &str,
		config: &AlertManagerCortexConfig,
	) -> Result<(), ClientError>;
}

/// Outcome of [fetch_unchanged]
#[derive(Debug)]
pub enum Freshness {
	/// the remote document still equals the one the caller loaded
	Unchanged,
	/// somebody else wrote the document in between
	Changed(Box<AlertManagerCortexConfig>),
}

/// Re-reads the document and compares it with the copy the caller based its
/// modification on.
pub async fn fetch_unchanged<S: ConfigSource + ?Sized>(
	source: &S,
	source_name: &str,
	loaded: &AlertManagerCortexConfig,
) -> Result<Freshness, ClientError> {
	let latest = source.fetch_config(source_name).await?;

	if &latest == loaded {
		Ok(Freshness::Unchanged)
	} else {
		tracing::debug!("alertmanager configuration of {source_name} changed since it was loaded");
		Ok(Freshness::Changed(Box::new(latest)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::amconfig::tests::{default_config, default_mute};

	#[tokio::test]
	async fn detects_concurrent_writes() {
		let source = MemoryConfigSource::new("grafana", default_config());
		let loaded = source.fetch_config("grafana").await.unwrap();

		assert!(matches!(
			fetch_unchanged(&source, "grafana", &loaded).await.unwrap(),
			Freshness::Unchanged
		));

		let mut renamed = default_mute();
		renamed.name = "renamed".to_owned();
		source
			.update_config("grafana", &loaded.with_mute_time_intervals(vec![renamed]).unwrap())
			.await
			.unwrap();

		match fetch_unchanged(&source, "grafana", &loaded).await.unwrap() {
			Freshness::Changed(latest) => {
				assert_eq!(latest.mute_time_intervals()[0].name, "renamed")
			}
			Freshness::Unchanged => panic!("write went unnoticed"),
		}
	}
}
