//! Listing and deleting mute timings.
//!
//! The table shows every mute timing of a document (or the ones named in a
//! filter) with a readable summary of its schedule, and deletes entries
//! after an explicit confirmation.

use std::sync::Arc;

use thiserror::Error;

use crate::{
	amconfig::{AlertManagerCortexConfig, TimeInterval},
	client::{fetch_unchanged, ClientError, ConfigSource, Freshness},
};

/// Errors of [MuteTimingsTable]
#[derive(Error, Debug)]
pub enum TableError {
	#[error("failed to load alertmanager configuration")]
	Fetch(#[source] ClientError),
	#[error("mute timing {0:?} not found")]
	NotFound(String),
	#[error("no delete is waiting for confirmation")]
	NoPendingDelete,
	#[error(
		"alertmanager configuration has been updated since it was loaded, reload it to make sure \
		 recent changes are not overwritten"
	)]
	Conflict,
	#[error("failed to delete mute timing")]
	Update(#[source] ClientError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// one displayed mute timing
pub struct TableRow {
	pub name: String,
	/// two lines per time interval, see [format_time_intervals]
	pub summary: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// the confirmation prompt of a delete
pub struct PendingDelete {
	pub name: String,
}

impl PendingDelete {
	pub fn title(&self) -> &'static str {
		"Delete mute timing"
	}

	pub fn body(&self) -> String {
		format!("Are you sure you would like to delete \"{}\"", self.name)
	}
}

/// the mute timings list
pub struct MuteTimingsTable {
	source: Arc<dyn ConfigSource>,
	source_name: String,
	/// only show these names
	filter: Option<Vec<String>>,
	/// hide heading and actions column, for embedding in other views
	hide_actions: bool,
	config: AlertManagerCortexConfig,
	pending_delete: Option<PendingDelete>,
}

impl MuteTimingsTable {
	/// fetch the document and build the table
	pub async fn load(
		source: Arc<dyn ConfigSource>,
		source_name: impl Into<String>,
		filter: Option<Vec<String>>,
		hide_actions: bool,
	) -> Result<Self, TableError> {
		let source_name = source_name.into();
		let config = source.fetch_config(&source_name).await.map_err(TableError::Fetch)?;

		Ok(Self { source, source_name, filter, hide_actions, config, pending_delete: None })
	}

	/// the document the table currently shows
	pub fn config(&self) -> &AlertManagerCortexConfig {
		&self.config
	}

	/// rows in document order, restricted to the filter if there is one
	pub fn rows(&self) -> Vec<TableRow> {
		self.config
			.mute_time_intervals()
			.iter()
			.filter(|mute| match &self.filter {
				Some(names) => names.contains(&mute.name),
				None => true,
			})
			.map(|mute| TableRow {
				name: mute.name.clone(),
				summary: format_time_intervals(mute.intervals()),
			})
			.collect()
	}

	/// Renders the table as text. `edit_hint` produces the text of the
	/// actions column for a mute timing name.
	pub fn render(&self, edit_hint: impl Fn(&str) -> String) -> String {
		let rows = self.rows();
		let mut out = String::new();

		if !self.hide_actions {
			out.push_str("Mute timings\n\n");
		}

		if rows.is_empty() {
			out.push_str("No mute timings configured\n");
			return out;
		}

		let name_width =
			rows.iter().map(|row| row.name.chars().count()).chain(["Name".len()]).max().unwrap_or(0);
		let summary_width = rows
			.iter()
			.flat_map(|row| row.summary.iter())
			.map(|line| line.chars().count())
			.chain(["Time range".len()])
			.max()
			.unwrap_or(0);

		let mut header = format!("{:<name_width$}  {:<summary_width$}", "Name", "Time range");
		if !self.hide_actions {
			header.push_str("  Actions");
		}
		out.push_str(header.trim_end());
		out.push('\n');

		for row in rows.iter() {
			let summary = if row.summary.is_empty() { vec![String::new()] } else { row.summary.clone() };

			for (index, line) in summary.iter().enumerate() {
				let name = if index == 0 { row.name.as_str() } else { "" };
				let mut text = format!("{name:<name_width$}  {line:<summary_width$}");

				if index == 0 && !self.hide_actions {
					text.push_str("  ");
					text.push_str(&edit_hint(&row.name));
				}

				out.push_str(text.trim_end());
				out.push('\n');
			}
		}

		out
	}

	/// Opens the confirmation prompt for deleting `name`.
	pub fn request_delete(&mut self, name: impl Into<String>) -> Result<&PendingDelete, TableError> {
		let name = name.into();

		if self.config.mute_time_interval(&name).is_none() {
			return Err(TableError::NotFound(name));
		}

		Ok(self.pending_delete.insert(PendingDelete { name }))
	}

	pub fn pending_delete(&self) -> Option<&PendingDelete> {
		self.pending_delete.as_ref()
	}

	/// close the prompt without deleting
	pub fn dismiss(&mut self) {
		self.pending_delete = None;
	}

	/// Deletes the mute timing of the open prompt and writes the document.
	/// On success the table shows the written document.
	pub async fn confirm_delete(&mut self) -> Result<AlertManagerCortexConfig, TableError> {
		let pending = self.pending_delete.take().ok_or(TableError::NoPendingDelete)?;
		let name = pending.name;

		if let Some(route) = &self.config.alertmanager_config().route {
			if route.referenced_mute_timings().contains(&name.as_str()) {
				tracing::warn!(
					"mute timing {name:?} is still referenced by a route, the reference is kept"
				);
			}
		}

		let updated = self.config.without_mute_time_interval(&name);

		match fetch_unchanged(self.source.as_ref(), &self.source_name, &self.config)
			.await
			.map_err(TableError::Update)?
		{
			Freshness::Unchanged => {}
			Freshness::Changed(_) => return Err(TableError::Conflict),
		}

		self.source.update_config(&self.source_name, &updated).await.map_err(TableError::Update)?;

		tracing::info!("deleted mute timing {name:?} from {}", self.source_name);

		self.config = updated.clone();

		Ok(updated)
	}

	/// re-read the document, e.g. after a conflict
	pub async fn reload(&mut self) -> Result<(), TableError> {
		self.config =
			self.source.fetch_config(&self.source_name).await.map_err(TableError::Fetch)?;

		Ok(())
	}
}

/// `monday` → `Mon`
fn abbreviate_weekday(day: &str) -> String {
	let mut chars = day.trim().chars().take(3);

	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

/// Summary of one interval as two lines: times and weekdays, then days of
/// month, months and years.
pub fn format_time_interval(interval: &TimeInterval) -> [String; 2] {
	let times = match &interval.times {
		Some(times) => times
			.iter()
			.map(|range| format!("{} - {}", range.start_time, range.end_time))
			.collect::<Vec<_>>()
			.join(" and "),
		None => String::from("All hours"),
	};

	let weekdays = match &interval.weekdays {
		Some(weekdays) => weekdays
			.iter()
			.map(|day| day.split(':').map(abbreviate_weekday).collect::<Vec<_>>().join("-"))
			.collect::<Vec<_>>()
			.join(", "),
		None => String::from("Every day"),
	};

	let list = |list: &Option<Vec<String>>| match list {
		Some(list) => list.join(", "),
		None => String::from("All"),
	};

	[
		format!("{times} {weekdays}"),
		format!(
			"Days of the month: {} | Months: {} | Years: {}",
			list(&interval.days_of_month),
			list(&interval.months),
			list(&interval.years)
		),
	]
}

/// human readable summary of a mute timing schedule, two lines per interval
pub fn format_time_intervals(intervals: &[TimeInterval]) -> Vec<String> {
	intervals.iter().flat_map(format_time_interval).collect()
}
