//! config file options for the alertmanager connection

use std::time::Duration;

use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use url::Url;

use crate::settings::Settings;

#[serde_as]
#[derive(Debug, Deserialize, Clone)]
/// where and how to reach the alertmanager configuration api
pub struct AlertmanagerSettings {
	/// base url of grafana (or any server exposing the same api)
	pub url: Url,
	/// alertmanager source name, `grafana` for the built in alertmanager
	#[serde(default = "default_source")]
	pub source: String,
	/// optional bearer token (service account or api key)
	#[serde(default)]
	pub token: Option<String>,
	/// request timeout
	#[serde_as(as = "DurationSeconds<f64>")]
	#[serde(default = "default_timeout")]
	pub timeout: Duration,
}

impl AlertmanagerSettings {
	pub fn global() -> &'static Self {
		&Settings::global().alertmanager
	}
}

fn default_source() -> String {
	String::from("grafana")
}

fn default_timeout() -> Duration {
	Duration::from_secs(10)
}
