//! the editable record behind the form: a name plus a list of intervals
//! whose list valued dimensions are edited as comma joined text

use std::fmt;

use serde_json::{Map, Value};

use super::time_range::TimeRangeFields;
use crate::{
	amconfig::{MuteTimeInterval, TimeInterval},
	validation::{
		join_list, split_list, validate_days_of_month, validate_months, validate_weekdays,
		validate_years, FieldPath, InvalidField, ValidationError,
	},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// index independent identifier of an interval
pub struct IntervalId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
/// the fields of one time interval
pub struct IntervalFields {
	pub id: IntervalId,
	pub times: TimeRangeFields,
	/// comma joined weekdays or weekday ranges (`monday:friday, sunday`)
	pub weekdays: String,
	/// comma joined days of the month (`1:5, -1`)
	pub days_of_month: String,
	/// comma joined months (`january, july`)
	pub months: String,
	/// comma joined years (`2022:2025`)
	pub years: String,
	/// keys the form doesn't edit (`location`), written back as loaded
	pub extra: Map<String, Value>,
}

/// `None` for empty lists so the key is left out of the document
fn non_empty(text: &str) -> Option<Vec<String>> {
	let list = split_list(text);
	(!list.is_empty()).then_some(list)
}

fn joined(list: &Option<Vec<String>>) -> String {
	list.as_deref().map(join_list).unwrap_or_default()
}

impl IntervalFields {
	fn blank(id: IntervalId) -> Self {
		Self {
			id,
			times: TimeRangeFields::with_blank_row(),
			weekdays: String::new(),
			days_of_month: String::new(),
			months: String::new(),
			years: String::new(),
			extra: Map::new(),
		}
	}

	fn prefilled(id: IntervalId, interval: &TimeInterval) -> Self {
		let times = match interval.times.as_deref() {
			Some(times) if !times.is_empty() => TimeRangeFields::from_ranges(times),
			_ => TimeRangeFields::with_blank_row(),
		};

		Self {
			id,
			times,
			weekdays: joined(&interval.weekdays),
			days_of_month: joined(&interval.days_of_month),
			months: joined(&interval.months),
			years: joined(&interval.years),
			extra: interval.extra.clone(),
		}
	}

	/// all problems of this interval, `index` is its position in the form
	pub fn errors(&self, index: usize) -> Vec<ValidationError> {
		let mut errors = self.times.errors(index);

		let checks: [(fn(&str) -> Result<(), InvalidField>, &str, FieldPath); 4] = [
			(validate_weekdays, self.weekdays.as_str(), FieldPath::Weekdays { interval: index }),
			(validate_days_of_month, self.days_of_month.as_str(), FieldPath::DaysOfMonth { interval: index }),
			(validate_months, self.months.as_str(), FieldPath::Months { interval: index }),
			(validate_years, self.years.as_str(), FieldPath::Years { interval: index }),
		];

		for (validate, text, field) in checks {
			if let Err(reason) = validate(text) {
				errors.push(ValidationError::new(field, reason));
			}
		}

		errors
	}

	pub fn to_time_interval(&self) -> TimeInterval {
		let times = self.times.to_time_ranges();

		TimeInterval {
			times: (!times.is_empty()).then_some(times),
			weekdays: non_empty(&self.weekdays),
			days_of_month: non_empty(&self.days_of_month),
			months: non_empty(&self.months),
			years: non_empty(&self.years),
			extra: self.extra.clone(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// everything the form edits
pub struct MuteTimingFields {
	pub name: String,
	time_intervals: Vec<IntervalFields>,
	/// keys of the mute timing the form doesn't edit
	extra: Map<String, Value>,
	/// id handed out to the next interval
	next_interval_id: u64,
}

impl Default for MuteTimingFields {
	fn default() -> Self {
		Self::blank()
	}
}

impl From<&MuteTimeInterval> for MuteTimingFields {
	/// prefill from an existing mute timing
	fn from(mute: &MuteTimeInterval) -> Self {
		let mut fields = Self {
			name: mute.name.clone(),
			time_intervals: Vec::new(),
			extra: mute.extra.clone(),
			next_interval_id: 0,
		};

		for interval in mute.intervals() {
			let id = fields.next_id();
			fields.time_intervals.push(IntervalFields::prefilled(id, interval));
		}

		fields
	}
}

impl MuteTimingFields {
	/// empty name and a single blank interval
	pub fn blank() -> Self {
		let mut fields = Self {
			name: String::new(),
			time_intervals: Vec::new(),
			extra: Map::new(),
			next_interval_id: 0,
		};
		fields.add_interval();
		fields
	}

	fn next_id(&mut self) -> IntervalId {
		let id = IntervalId(self.next_interval_id);
		self.next_interval_id += 1;
		id
	}

	pub fn intervals(&self) -> &[IntervalFields] {
		&self.time_intervals
	}

	pub fn interval_mut(&mut self, index: usize) -> Option<&mut IntervalFields> {
		self.time_intervals.get_mut(index)
	}

	/// current index of the interval with `id`
	pub fn position(&self, id: IntervalId) -> Option<usize> {
		self.time_intervals.iter().position(|interval| interval.id == id)
	}

	/// append a blank interval
	pub fn add_interval(&mut self) -> IntervalId {
		let id = self.next_id();
		self.time_intervals.push(IntervalFields::blank(id));
		id
	}

	/// Removes the interval at `index`. Out of range indices are ignored.
	pub fn remove_interval(&mut self, index: usize) -> Option<IntervalFields> {
		(index < self.time_intervals.len()).then(|| self.time_intervals.remove(index))
	}

	/// drop all intervals, used when the intervals are replaced wholesale
	pub fn clear_intervals(&mut self) {
		self.time_intervals.clear();
	}

	/// every field error of the form, in field order
	pub fn errors(&self) -> Vec<ValidationError> {
		let mut errors = Vec::new();

		if self.name.trim().is_empty() {
			errors.push(ValidationError::new(FieldPath::Name, InvalidField::MissingName));
		}

		for (index, interval) in self.time_intervals.iter().enumerate() {
			errors.extend(interval.errors(index));
		}

		errors
	}

	pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
		let errors = self.errors();

		if errors.is_empty() {
			Ok(())
		} else {
			Err(errors)
		}
	}

	/// The mute timing the fields describe. Without intervals the
	/// `time_intervals` key is left out.
	pub fn to_mute_time_interval(&self) -> MuteTimeInterval {
		MuteTimeInterval {
			name: self.name.trim().to_owned(),
			time_intervals: (!self.time_intervals.is_empty())
				.then(|| self.time_intervals.iter().map(IntervalFields::to_time_interval).collect()),
			extra: self.extra.clone(),
		}
	}
}

impl fmt::Display for MuteTimingFields {
	/// the fields as the form shows them, one interval after the other
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "Name: {}", self.name)?;

		for (index, interval) in self.time_intervals.iter().enumerate() {
			writeln!(f, "Time interval {}", index + 1)?;

			for row in interval.times.rows() {
				writeln!(f, "  Time range: {} - {}", row.start_time, row.end_time)?;
			}

			writeln!(f, "  Days of the week: {}", interval.weekdays)?;
			writeln!(f, "  Days of the month: {}", interval.days_of_month)?;
			writeln!(f, "  Months: {}", interval.months)?;
			writeln!(f, "  Years: {}", interval.years)?;
		}

		Ok(())
	}
}
