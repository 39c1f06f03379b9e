//! The repeatable start/end rows of one time interval.
//!
//! Rows carry an id that stays the same when other rows are removed, so a
//! caller holding an id can always find its row again with
//! [TimeRangeFields::position].

use crate::{
	amconfig::TimeRange,
	validation::{is_valid_time, FieldPath, InvalidField, ValidationError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// index independent identifier of a row
pub struct RowId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
/// one start/end pair as typed by the user
pub struct TimeRangeRow {
	pub id: RowId,
	pub start_time: String,
	pub end_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// ordered list of [TimeRangeRow]s
pub struct TimeRangeFields {
	rows: Vec<TimeRangeRow>,
	/// id handed out to the next appended row
	next_id: u64,
}

impl TimeRangeFields {
	/// no rows at all
	pub fn new() -> Self {
		Self::default()
	}

	/// a single empty row, what a new interval starts with
	pub fn with_blank_row() -> Self {
		let mut fields = Self::new();
		fields.append();
		fields
	}

	/// rows holding the given ranges
	pub fn from_ranges(ranges: &[TimeRange]) -> Self {
		let mut fields = Self::new();
		for range in ranges {
			fields.append_range(range.start_time.clone(), range.end_time.clone());
		}
		fields
	}

	pub fn rows(&self) -> &[TimeRangeRow] {
		&self.rows
	}

	pub fn len(&self) -> usize {
		self.rows.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	/// append a row with empty start and end
	pub fn append(&mut self) -> RowId {
		self.append_range(String::new(), String::new())
	}

	/// append a prefilled row
	pub fn append_range(&mut self, start_time: String, end_time: String) -> RowId {
		let id = RowId(self.next_id);
		self.next_id += 1;

		self.rows.push(TimeRangeRow { id, start_time, end_time });

		id
	}

	/// Removes the row at `index`. Out of range indices are ignored.
	pub fn remove(&mut self, index: usize) -> Option<TimeRangeRow> {
		(index < self.rows.len()).then(|| self.rows.remove(index))
	}

	/// current index of the row with `id`
	pub fn position(&self, id: RowId) -> Option<usize> {
		self.rows.iter().position(|row| row.id == id)
	}

	/// Sets the start time of the row at `index`, returns false if there is
	/// no such row.
	pub fn set_start(&mut self, index: usize, start_time: impl Into<String>) -> bool {
		match self.rows.get_mut(index) {
			Some(row) => {
				row.start_time = start_time.into();
				true
			}
			None => false,
		}
	}

	/// Sets the end time of the row at `index`, returns false if there is
	/// no such row.
	pub fn set_end(&mut self, index: usize, end_time: impl Into<String>) -> bool {
		match self.rows.get_mut(index) {
			Some(row) => {
				row.end_time = end_time.into();
				true
			}
			None => false,
		}
	}

	/// Per field errors of the rows, `interval` is the index of the owning
	/// interval. Empty fields are not errors, those rows are skipped when
	/// serializing.
	pub fn errors(&self, interval: usize) -> Vec<ValidationError> {
		let mut errors = Vec::new();

		for (row, range) in self.rows.iter().enumerate() {
			if !range.start_time.is_empty() && !is_valid_time(&range.start_time) {
				errors.push(ValidationError::new(
					FieldPath::StartTime { interval, row },
					InvalidField::StartTime,
				));
			}

			if !range.end_time.is_empty() && !is_valid_time(&range.end_time) {
				errors.push(ValidationError::new(
					FieldPath::EndTime { interval, row },
					InvalidField::EndTime,
				));
			}
		}

		errors
	}

	/// the rows with both start and end filled in
	pub fn to_time_ranges(&self) -> Vec<TimeRange> {
		self.rows
			.iter()
			.filter(|row| !row.start_time.is_empty() && !row.end_time.is_empty())
			.map(|row| TimeRange::new(row.start_time.as_str(), row.end_time.as_str()))
			.collect()
	}
}
