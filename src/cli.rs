//! command line surface
//!
//! Intervals are given on the command line as `key=value` pairs separated by
//! `;`, for example
//! `times=22:00-24:00 06:00-07:00;weekdays=monday:friday;months=january, july`.
//! The values of the list keys are the same comma joined text the form edits.

use std::str::FromStr;

use clap::{Arg, Command};
use thiserror::Error;

use crate::form::IntervalFields;

/// the clap command of the binary
pub fn command() -> Command<'static> {
	Command::new(clap::crate_name!())
		.version(clap::crate_version!())
		.about(clap::crate_description!())
		.author(clap::crate_authors!())
		.subcommand_required(true)
		.arg_required_else_help(true)
		.args(&[
			Arg::new("config")
				.help("path of config file")
				.takes_value(true)
				.short('c')
				.long("config")
				.global(true)
				.default_value("./config.yaml"),
			Arg::new("level")
				.help("log level")
				.possible_values(["Error", "Warn", "Info", "Debug", "Trace"])
				.ignore_case(true)
				.takes_value(true)
				.global(true)
				.long("log"),
			Arg::new("url")
				.help("grafana base url, overrides alertmanager.url")
				.takes_value(true)
				.global(true)
				.long("url"),
			Arg::new("source")
				.help("alertmanager source name, overrides alertmanager.source")
				.takes_value(true)
				.global(true)
				.long("source"),
		])
		.subcommand(
			Command::new("list").about("list mute timings").args(&[
				Arg::new("name")
					.help("only list mute timings with this name")
					.takes_value(true)
					.multiple_occurrences(true)
					.long("name"),
				Arg::new("hide-actions")
					.help("only print the table, without heading and actions")
					.long("hide-actions"),
			]),
		)
		.subcommand(
			Command::new("show")
				.about("print the form fields of a mute timing")
				.arg(Arg::new("mute-name").required(true)),
		)
		.subcommand(
			Command::new("create").about("create a new mute timing").args(&[
				Arg::new("name").help("name of the mute timing").takes_value(true).required(true).long("name"),
				interval_arg(),
			]),
		)
		.subcommand(
			Command::new("edit").about("edit an existing mute timing").args(&[
				Arg::new("mute-name").required(true),
				Arg::new("rename").help("new name of the mute timing").takes_value(true).long("rename"),
				interval_arg(),
			]),
		)
		.subcommand(
			Command::new("delete").about("delete a mute timing").args(&[
				Arg::new("mute-name").required(true),
				Arg::new("yes").help("don't ask for confirmation").short('y').long("yes"),
			]),
		)
}

fn interval_arg() -> Arg<'static> {
	Arg::new("interval")
		.help(
			"time interval as `times=HH:MM-HH:MM ...;weekdays=..;days_of_month=..;months=..;years=..`, \
			 replaces all intervals, may be repeated",
		)
		.takes_value(true)
		.multiple_occurrences(true)
		.short('i')
		.long("interval")
}

/// Error parsing an [IntervalInput]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntervalSpecError {
	#[error("expected `key=value`, got {0:?}")]
	MissingValue(String),
	#[error("unknown interval key {0:?}")]
	UnknownKey(String),
	#[error("expected a time range like `HH:MM-HH:MM`, got {0:?}")]
	TimeRange(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// one interval as given on the command line
pub struct IntervalInput {
	pub times: Vec<(String, String)>,
	pub weekdays: String,
	pub days_of_month: String,
	pub months: String,
	pub years: String,
}

impl FromStr for IntervalInput {
	type Err = IntervalSpecError;

	fn from_str(spec: &str) -> Result<Self, Self::Err> {
		let mut input = Self::default();

		for pair in spec.split(';').map(str::trim).filter(|pair| !pair.is_empty()) {
			let (key, value) =
				pair.split_once('=').ok_or_else(|| IntervalSpecError::MissingValue(pair.to_owned()))?;
			let value = value.trim().to_owned();

			match key.trim() {
				"times" => {
					for range in value.split_whitespace() {
						let (start, end) = range
							.split_once('-')
							.ok_or_else(|| IntervalSpecError::TimeRange(range.to_owned()))?;
						input.times.push((start.to_owned(), end.to_owned()));
					}
				}
				"weekdays" => input.weekdays = value,
				"days" | "days_of_month" => input.days_of_month = value,
				"months" => input.months = value,
				"years" => input.years = value,
				key => return Err(IntervalSpecError::UnknownKey(key.to_owned())),
			}
		}

		Ok(input)
	}
}

impl IntervalInput {
	/// type the input into the fields of an interval, like a user would
	pub fn apply(&self, interval: &mut IntervalFields) {
		if !self.times.is_empty() {
			interval.times = Default::default();
			for (start, end) in self.times.iter() {
				interval.times.append_range(start.clone(), end.clone());
			}
		}

		interval.weekdays = self.weekdays.clone();
		interval.days_of_month = self.days_of_month.clone();
		interval.months = self.months.clone();
		interval.years = self.years.clone();
	}
}
