use anyhow::{Context, Result};
use clap::ArgMatches;
use config::{Config, Environment, File};
use once_cell::sync::OnceCell;
use serde::Deserialize;

use crate::{client::AlertmanagerSettings, log::LogSettings};

static SETTINGS: OnceCell<Settings> = OnceCell::new();

/// prefix of environment variables overriding the config file, nested keys
/// are separated by `__` (`MUTE_TIMINGS__ALERTMANAGER__TOKEN`)
const ENV_PREFIX: &str = "MUTE_TIMINGS";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
	pub alertmanager: AlertmanagerSettings,
	pub log: LogSettings,
}

impl Settings {
	/// Panics if [Settings::init] wasn't called yet.
	pub fn global() -> &'static Self {
		#[allow(clippy::expect_used)]
		SETTINGS.get().expect("settings accessed before they were loaded")
	}

	/// load the settings once, later calls return the already loaded ones
	pub fn init(opts: &ArgMatches) -> Result<&'static Self> {
		SETTINGS.get_or_try_init(|| Self::load(opts))
	}

	/// Layers the config file, the environment and the global command line
	/// options (in increasing priority).
	fn load(opts: &ArgMatches) -> Result<Self> {
		let config_path = opts.value_of("config").unwrap_or("./config.yaml");

		let mut builder = Config::builder()
			.set_default("log.level", "info")?
			.add_source(File::with_name(config_path).required(false))
			.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

		if let Some(level) = opts.value_of("level") {
			builder = builder.set_override("log.level", level)?;
		}

		if let Some(url) = opts.value_of("url") {
			builder = builder.set_override("alertmanager.url", url)?;
		}

		if let Some(source) = opts.value_of("source") {
			builder = builder.set_override("alertmanager.source", source)?;
		}

		builder
			.build()
			.context("can't load config")?
			.try_deserialize()
			.context("can't load config")
	}
}
