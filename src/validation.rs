//! validators and list helpers shared by the form and the command line
//! parser.
//!
//! List valued fields are edited as comma joined text. [split_list] and
//! [join_list] are the two directions of that contract.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// `HH:MM`, hours are checked separately because alertmanager allows `24:00`
static TIME_PATTERN: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"^([0-2][0-9]):([0-5][0-9])$").expect("valid time regex"));

static YEAR_PATTERN: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"^[0-9]{4}$").expect("valid year regex"));

/// weekday names alertmanager accepts (case insensitive)
pub const WEEKDAYS: [&str; 7] =
	["sunday", "monday", "tuesday", "wednesday", "thursday", "friday", "saturday"];

/// month names alertmanager accepts (case insensitive)
pub const MONTHS: [&str; 12] = [
	"january",
	"february",
	"march",
	"april",
	"may",
	"june",
	"july",
	"august",
	"september",
	"october",
	"november",
	"december",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Address of a single form field, displayed the way the fields are named in
/// the serialized document (`time_intervals.0.times.1.start_time`).
pub enum FieldPath {
	Name,
	StartTime { interval: usize, row: usize },
	EndTime { interval: usize, row: usize },
	Weekdays { interval: usize },
	DaysOfMonth { interval: usize },
	Months { interval: usize },
	Years { interval: usize },
}

impl fmt::Display for FieldPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			FieldPath::Name => write!(f, "name"),
			FieldPath::StartTime { interval, row } => {
				write!(f, "time_intervals.{interval}.times.{row}.start_time")
			}
			FieldPath::EndTime { interval, row } => {
				write!(f, "time_intervals.{interval}.times.{row}.end_time")
			}
			FieldPath::Weekdays { interval } => write!(f, "time_intervals.{interval}.weekdays"),
			FieldPath::DaysOfMonth { interval } => {
				write!(f, "time_intervals.{interval}.days_of_month")
			}
			FieldPath::Months { interval } => write!(f, "time_intervals.{interval}.months"),
			FieldPath::Years { interval } => write!(f, "time_intervals.{interval}.years"),
		}
	}
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
/// why a field was rejected
pub enum InvalidField {
	#[error("A name is required")]
	MissingName,
	#[error("Invalid start time")]
	StartTime,
	#[error("Invalid end time")]
	EndTime,
	#[error("Invalid day")]
	Weekday,
	#[error("Invalid day of month")]
	DayOfMonth,
	#[error("Invalid month")]
	Month,
	#[error("Invalid year")]
	Year,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{field}: {reason}")]
/// a rejected field together with the reason
pub struct ValidationError {
	pub field: FieldPath,
	pub reason: InvalidField,
}

impl ValidationError {
	pub fn new(field: FieldPath, reason: InvalidField) -> Self {
		Self { field, reason }
	}
}

/// Returns true for `HH:MM` between `00:00` and `24:00`.
pub fn is_valid_time(time: &str) -> bool {
	let captures = match TIME_PATTERN.captures(time) {
		Some(captures) => captures,
		None => return false,
	};

	let hours: u32 = captures[1].parse().unwrap_or(u32::MAX);
	let minutes: u32 = captures[2].parse().unwrap_or(u32::MAX);

	hours < 24 || (hours == 24 && minutes == 0)
}

/// splits comma joined text into trimmed, non empty tokens
pub fn split_list(text: &str) -> Vec<String> {
	text.split(',').map(str::trim).filter(|token| !token.is_empty()).map(str::to_owned).collect()
}

/// inverse of [split_list]
pub fn join_list(list: &[String]) -> String {
	list.join(", ")
}

/// checks every token and every side of `a:b` ranges with `valid`
fn validate_ranges(text: &str, valid: impl Fn(&str) -> bool) -> bool {
	split_list(text).iter().all(|token| match token.split_once(':') {
		Some((start, end)) => valid(start.trim()) && valid(end.trim()),
		None => valid(token),
	})
}

fn is_weekday(day: &str) -> bool {
	WEEKDAYS.iter().any(|name| name.eq_ignore_ascii_case(day))
}

fn is_day_of_month(day: &str) -> bool {
	matches!(day.parse::<i32>(), Ok(day) if (-31..=31).contains(&day) && day != 0)
}

fn is_month(month: &str) -> bool {
	MONTHS.iter().any(|name| name.eq_ignore_ascii_case(month))
		|| matches!(month.parse::<u32>(), Ok(month) if (1..=12).contains(&month))
}

fn is_year(year: &str) -> bool {
	YEAR_PATTERN.is_match(year)
}

pub fn validate_weekdays(text: &str) -> Result<(), InvalidField> {
	validate_ranges(text, is_weekday).then_some(()).ok_or(InvalidField::Weekday)
}

pub fn validate_days_of_month(text: &str) -> Result<(), InvalidField> {
	validate_ranges(text, is_day_of_month).then_some(()).ok_or(InvalidField::DayOfMonth)
}

pub fn validate_months(text: &str) -> Result<(), InvalidField> {
	validate_ranges(text, is_month).then_some(()).ok_or(InvalidField::Month)
}

pub fn validate_years(text: &str) -> Result<(), InvalidField> {
	validate_ranges(text, is_year).then_some(()).ok_or(InvalidField::Year)
}
