//! data structures for (de)serializing the alertmanager configuration
//! document.
//!
//! The document is kept as received, key order included. Only the parts we
//! read are decoded into typed views, and the mute timing list is the only
//! slot that is ever written back, so a fetch/modify/update cycle leaves
//! everything else as it was.

use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

#[derive(Clone, Debug, Default, PartialEq)]
/// the full configuration document exchanged with the remote alertmanager
pub struct AlertManagerCortexConfig {
	/// the document as received, with the mute timing list kept in sync
	document: Map<String, Value>,
	/// decoded `alertmanager_config`
	alertmanager_config: AlertmanagerConfig,
}

impl AlertManagerCortexConfig {
	/// Wraps a raw document. Fails if `alertmanager_config` is missing or
	/// doesn't decode.
	pub fn from_document(document: Map<String, Value>) -> Result<Self, serde_json::Error> {
		let alertmanager_config = match document.get("alertmanager_config") {
			Some(value) => AlertmanagerConfig::deserialize(value)?,
			None => return Err(serde_json::Error::missing_field("alertmanager_config")),
		};

		Ok(Self { document, alertmanager_config })
	}

	/// the raw document as it will be written
	pub fn document(&self) -> &Map<String, Value> {
		&self.document
	}

	pub fn alertmanager_config(&self) -> &AlertmanagerConfig {
		&self.alertmanager_config
	}

	/// all mute timings of the document, in document order
	pub fn mute_time_intervals(&self) -> &[MuteTimeInterval] {
		self.alertmanager_config.mute_time_intervals.as_deref().unwrap_or_default()
	}

	/// look up a mute timing by its exact name
	pub fn mute_time_interval(&self, name: &str) -> Option<&MuteTimeInterval> {
		self.mute_time_intervals().iter().find(|mute| mute.name == name)
	}

	/// raw entries of the mute timing list, same order as [Self::mute_time_intervals]
	fn raw_mute_time_intervals(&self) -> &[Value] {
		self.document
			.get("alertmanager_config")
			.and_then(|config| config.get("mute_time_intervals"))
			.and_then(Value::as_array)
			.map(Vec::as_slice)
			.unwrap_or_default()
	}

	/// Returns a copy of this document where the mute timing list is replaced
	/// by `mute_time_intervals`. Entries equal to an existing one are written
	/// back exactly as they were received, new or changed entries are encoded.
	pub fn with_mute_time_intervals(
		&self,
		mute_time_intervals: Vec<MuteTimeInterval>,
	) -> Result<Self, serde_json::Error> {
		let mut unused: Vec<Option<&Value>> = self.raw_mute_time_intervals().iter().map(Some).collect();

		let entries = mute_time_intervals
			.into_iter()
			.map(|mute| {
				let kept = self
					.mute_time_intervals()
					.iter()
					.zip(unused.iter_mut())
					.find(|(existing, raw)| raw.is_some() && **existing == mute)
					.and_then(|(_, raw)| raw.take());

				let raw = match kept {
					Some(raw) => raw.clone(),
					None => serde_json::to_value(&mute)?,
				};

				Ok::<_, serde_json::Error>((mute, raw))
			})
			.collect::<Result<Vec<_>, _>>()?;

		Ok(self.replace_mute_time_intervals(entries))
	}

	/// Returns a copy of this document without the mute timings named `name`.
	/// The remaining entries are written back exactly as they were received.
	pub fn without_mute_time_interval(&self, name: &str) -> Self {
		let entries = self
			.mute_time_intervals()
			.iter()
			.zip(self.raw_mute_time_intervals())
			.filter(|(mute, _)| mute.name != name)
			.map(|(mute, raw)| (mute.clone(), raw.clone()))
			.collect();

		self.replace_mute_time_intervals(entries)
	}

	fn replace_mute_time_intervals(&self, entries: Vec<(MuteTimeInterval, Value)>) -> Self {
		let (mute_time_intervals, raw): (Vec<_>, Vec<_>) = entries.into_iter().unzip();
		let mut config = self.clone();

		// inserting an existing key keeps its position
		let slot = config
			.document
			.entry("alertmanager_config")
			.or_insert_with(|| Value::Object(Map::new()));
		if let Value::Object(alertmanager_config) = slot {
			alertmanager_config.insert("mute_time_intervals".to_owned(), Value::Array(raw));
		}

		config.alertmanager_config.mute_time_intervals = Some(mute_time_intervals);
		config
	}
}

impl<'de> Deserialize<'de> for AlertManagerCortexConfig {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let document = Map::<String, Value>::deserialize(deserializer)?;
		Self::from_document(document).map_err(D::Error::custom)
	}
}

impl Serialize for AlertManagerCortexConfig {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		self.document.serialize(serializer)
	}
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
/// the parts of the alertmanager configuration we read
pub struct AlertmanagerConfig {
	#[serde(default)]
	pub route: Option<Route>,
	#[serde(default)]
	pub receivers: Option<Vec<Receiver>>,
	#[serde(default)]
	pub templates: Option<Vec<String>>,
	#[serde(default)]
	pub mute_time_intervals: Option<Vec<MuteTimeInterval>>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
/// a node of the routing tree
pub struct Route {
	#[serde(default)]
	pub receiver: Option<String>,
	#[serde(default)]
	pub group_by: Option<Vec<String>>,
	#[serde(default)]
	pub matchers: Option<Vec<String>>,
	/// names of mute timings muting this route
	#[serde(default)]
	pub mute_time_intervals: Option<Vec<String>>,
	/// child routes
	#[serde(default)]
	pub routes: Option<Vec<Route>>,
}

impl Route {
	/// Collects the mute timing names referenced anywhere in this route tree.
	/// Names appear once, in depth first order.
	pub fn referenced_mute_timings(&self) -> Vec<&str> {
		let mut names = Vec::new();
		self.collect_mute_timings(&mut names);
		names
	}

	fn collect_mute_timings<'a>(&'a self, names: &mut Vec<&'a str>) {
		for name in self.mute_time_intervals.iter().flatten() {
			if !names.contains(&name.as_str()) {
				names.push(name.as_str());
			}
		}

		for route in self.routes.iter().flatten() {
			route.collect_mute_timings(names);
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
/// a notification receiver, we only care about its name
pub struct Receiver {
	#[serde(default)]
	pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
/// a named schedule during which matching alerts are not notified
pub struct MuteTimeInterval {
	/// unique within the document
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub time_intervals: Option<Vec<TimeInterval>>,
	/// unmodelled keys
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl MuteTimeInterval {
	/// the schedules, empty if the key is missing
	pub fn intervals(&self) -> &[TimeInterval] {
		self.time_intervals.as_deref().unwrap_or_default()
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
/// One schedule of a mute timing. A missing dimension is unrestricted.
pub struct TimeInterval {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub times: Option<Vec<TimeRange>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub weekdays: Option<Vec<String>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub days_of_month: Option<Vec<String>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub months: Option<Vec<String>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub years: Option<Vec<String>>,
	/// unmodelled keys (`location`, ...)
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
/// `HH:MM` start (inclusive) and end (exclusive) in UTC
pub struct TimeRange {
	pub start_time: String,
	pub end_time: String,
}

impl TimeRange {
	pub fn new(start_time: impl Into<String>, end_time: impl Into<String>) -> Self {
		Self { start_time: start_time.into(), end_time: end_time.into() }
	}
}
