//! command line client for alertmanager mute timings
//!
//! Subcommands:
//! - `list` prints the mute timings with a summary of their schedule
//! - `show` prints the form fields of one mute timing
//! - `create` / `edit` submit the mute timing form
//! - `delete` removes a mute timing after confirmation

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use mute_timings::{
	cli::{self, IntervalInput},
	client::{AlertmanagerSettings, ConfigSource, HttpConfigSource},
	form::MuteTimingForm,
	log,
	settings::Settings,
	table::MuteTimingsTable,
};
use tokio::io::{AsyncBufReadExt, BufReader};

/// exit the complete program if one thread panics
fn setup_panic_handler() {
	let default_panic = std::panic::take_hook();
	std::panic::set_hook(Box::new(move |info| {
		default_panic(info);
		std::process::exit(1);
	}));
}

/// the entry point of the program
#[tokio::main]
pub async fn main() -> Result<()> {
	setup_panic_handler();

	let matches = cli::command().get_matches();

	Settings::init(&matches).context("failed to load config and command line arguments")?;
	log::setup_logging().context("could not setup logging")?;

	let settings = AlertmanagerSettings::global();
	let source: Arc<dyn ConfigSource> = Arc::new(
		HttpConfigSource::new(settings).context("failed to construct alertmanager client")?,
	);
	let source_name = settings.source.as_str();

	match matches.subcommand() {
		Some(("list", opts)) => list(source, source_name, opts).await,
		Some(("show", opts)) => show(source, source_name, opts).await,
		Some(("create", opts)) => {
			submit(source, source_name, None, opts.value_of("name"), opts).await
		}
		Some(("edit", opts)) => {
			let mute_name = opts.value_of("mute-name").map(str::to_owned);
			submit(source, source_name, mute_name, opts.value_of("rename"), opts).await
		}
		Some(("delete", opts)) => delete(source, source_name, opts).await,
		Some((name, _)) => bail!("unknown subcommand {name}"),
		None => bail!("no subcommand given"),
	}
}

async fn list(source: Arc<dyn ConfigSource>, source_name: &str, opts: &ArgMatches) -> Result<()> {
	let filter = opts.values_of("name").map(|names| names.map(str::to_owned).collect());

	let table = MuteTimingsTable::load(source, source_name, filter, opts.is_present("hide-actions"))
		.await
		.context("failed to load mute timings")?;

	print!("{}", table.render(|name| format!("{} edit {name:?}", clap::crate_name!())));

	Ok(())
}

async fn show(source: Arc<dyn ConfigSource>, source_name: &str, opts: &ArgMatches) -> Result<()> {
	let mute_name = opts.value_of("mute-name").map(str::to_owned);

	let form = MuteTimingForm::open(source, source_name, mute_name)
		.await
		.context("failed to load mute timing")?;

	print!("{}", form.fields());

	Ok(())
}

/// Fills and submits the mute timing form, `mute_name` selects edit mode and
/// `new_name` replaces the (prefilled) name.
async fn submit(
	source: Arc<dyn ConfigSource>,
	source_name: &str,
	mute_name: Option<String>,
	new_name: Option<&str>,
	opts: &ArgMatches,
) -> Result<()> {
	let intervals = opts
		.values_of("interval")
		.into_iter()
		.flatten()
		.map(str::parse::<IntervalInput>)
		.collect::<Result<Vec<_>, _>>()
		.context("invalid --interval")?;

	let mut form = MuteTimingForm::open(source, source_name, mute_name)
		.await
		.context("failed to load mute timing form")?;

	let fields = form.fields_mut();

	if let Some(name) = new_name {
		fields.name = name.to_owned();
	}

	if !intervals.is_empty() {
		fields.clear_intervals();

		for input in intervals.iter() {
			let id = fields.add_interval();
			if let Some(interval) = fields.position(id).and_then(|index| fields.interval_mut(index)) {
				input.apply(interval);
			}
		}
	}

	form.submit().await.context("failed to save mute timing")?;

	println!("saved mute timing {:?}", form.fields().name.trim());

	Ok(())
}

async fn delete(source: Arc<dyn ConfigSource>, source_name: &str, opts: &ArgMatches) -> Result<()> {
	let mute_name = opts.value_of("mute-name").context("missing mute timing name")?;

	let mut table = MuteTimingsTable::load(source, source_name, None, false)
		.await
		.context("failed to load mute timings")?;

	let prompt = table.request_delete(mute_name)?;

	if !opts.is_present("yes") {
		println!("{}\n{}? [y/N]", prompt.title(), prompt.body());

		let answer = BufReader::new(tokio::io::stdin())
			.lines()
			.next_line()
			.await
			.context("failed to read confirmation")?
			.unwrap_or_default();

		if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
			table.dismiss();
			println!("not deleted");
			return Ok(());
		}
	}

	table.confirm_delete().await.context("failed to delete mute timing")?;

	println!("deleted mute timing {mute_name:?}");

	Ok(())
}
