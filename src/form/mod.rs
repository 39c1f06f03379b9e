//! Creating and editing a single mute timing.
//!
//! [MuteTimingForm] loads the configuration document once, lets the caller
//! edit [MuteTimingFields] and on submit writes the whole document back with
//! the mute timing list updated. Everything else in the document is passed
//! through untouched.

use std::{fmt, sync::Arc};

use thiserror::Error;

pub use self::{
	fields::{IntervalFields, IntervalId, MuteTimingFields},
	time_range::{RowId, TimeRangeFields, TimeRangeRow},
};
use crate::{
	amconfig::AlertManagerCortexConfig,
	client::{fetch_unchanged, ClientError, ConfigSource, Freshness},
	validation::ValidationError,
};

mod fields;
mod time_range;

#[derive(Debug, Clone, PartialEq, Eq)]
/// whether the form creates a new mute timing or edits an existing one
pub enum Mode {
	Create,
	/// `original_name` is the name the mute timing had when it was loaded
	Edit { original_name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// lifecycle of a [MuteTimingForm]
pub enum FormState {
	Idle,
	Loading,
	Ready,
	/// loading failed, the form can't be used
	FetchError,
	Submitting,
	Done,
	/// the last submit failed, fields are kept for another try
	SubmitError,
}

impl fmt::Display for FormState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = match self {
			FormState::Idle => "idle",
			FormState::Loading => "loading",
			FormState::Ready => "ready",
			FormState::FetchError => "failed to load",
			FormState::Submitting => "submitting",
			FormState::Done => "done",
			FormState::SubmitError => "failed to submit",
		};

		f.write_str(state)
	}
}

/// Errors of [MuteTimingForm]
#[derive(Error, Debug)]
pub enum FormError {
	#[error("failed to load alertmanager configuration")]
	Fetch(#[source] ClientError),
	#[error("mute timing {0:?} not found")]
	NotFound(String),
	#[error("invalid mute timing: {}", display_errors(.0))]
	Validation(Vec<ValidationError>),
	#[error("mute timing form is {0}")]
	NotReady(FormState),
	#[error(
		"alertmanager configuration has been updated since it was loaded, reload it to make sure \
		 recent changes are not overwritten"
	)]
	Conflict,
	#[error("failed to encode mute timing")]
	Encode(#[source] serde_json::Error),
	#[error("failed to save mute timing")]
	Submit(#[source] ClientError),
}

fn display_errors(errors: &[ValidationError]) -> String {
	errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// the mute timing create/edit form
pub struct MuteTimingForm {
	/// where the document is read from and written to
	source: Arc<dyn ConfigSource>,
	/// alertmanager source name
	source_name: String,
	/// name of the mute timing to edit, none for a new one
	mute_name: Option<String>,
	state: FormState,
	mode: Mode,
	fields: MuteTimingFields,
	/// the document as loaded, base of the read-modify-write
	config: Option<AlertManagerCortexConfig>,
}

impl MuteTimingForm {
	/// Constructs an unloaded form. With `mute_name` the form edits the mute
	/// timing of that name, otherwise it creates a new one.
	pub fn new(
		source: Arc<dyn ConfigSource>,
		source_name: impl Into<String>,
		mute_name: Option<String>,
	) -> Self {
		let mode = match &mute_name {
			Some(name) => Mode::Edit { original_name: name.clone() },
			None => Mode::Create,
		};

		Self {
			source,
			source_name: source_name.into(),
			mute_name,
			state: FormState::Idle,
			mode,
			fields: MuteTimingFields::blank(),
			config: None,
		}
	}

	/// [MuteTimingForm::new] followed by [MuteTimingForm::load]
	pub async fn open(
		source: Arc<dyn ConfigSource>,
		source_name: impl Into<String>,
		mute_name: Option<String>,
	) -> Result<Self, FormError> {
		let mut form = Self::new(source, source_name, mute_name);
		form.load().await?;
		Ok(form)
	}

	pub fn state(&self) -> FormState {
		self.state
	}

	pub fn mode(&self) -> &Mode {
		&self.mode
	}

	pub fn fields(&self) -> &MuteTimingFields {
		&self.fields
	}

	pub fn fields_mut(&mut self) -> &mut MuteTimingFields {
		&mut self.fields
	}

	/// the document the form is based on, none until loaded
	pub fn config(&self) -> Option<&AlertManagerCortexConfig> {
		self.config.as_ref()
	}

	/// Fetches the document and prefills the fields when editing.
	pub async fn load(&mut self) -> Result<(), FormError> {
		if self.state != FormState::Idle {
			return Err(FormError::NotReady(self.state));
		}

		self.state = FormState::Loading;

		let config = match self.source.fetch_config(&self.source_name).await {
			Ok(config) => config,
			Err(err) => {
				self.state = FormState::FetchError;
				return Err(FormError::Fetch(err));
			}
		};

		if let Some(name) = &self.mute_name {
			match config.mute_time_interval(name) {
				Some(mute) => self.fields = MuteTimingFields::from(mute),
				None => {
					self.state = FormState::FetchError;
					return Err(FormError::NotFound(name.clone()));
				}
			}
		}

		tracing::debug!("loaded mute timing form for {:?}", self.mode);

		self.config = Some(config);
		self.state = FormState::Ready;

		Ok(())
	}

	/// Re-reads the document after a conflict. The fields are kept as they
	/// are, so edits made in the meantime aren't lost.
	pub async fn reload(&mut self) -> Result<(), FormError> {
		if !matches!(self.state, FormState::Ready | FormState::SubmitError) {
			return Err(FormError::NotReady(self.state));
		}

		let config =
			self.source.fetch_config(&self.source_name).await.map_err(FormError::Fetch)?;

		self.config = Some(config);
		self.state = FormState::Ready;

		Ok(())
	}

	/// Returns `config` with the mute timing of this form merged in. When
	/// editing, the entry with the original name is replaced where it is,
	/// otherwise the entry is appended.
	pub fn merge_into(
		&self,
		config: &AlertManagerCortexConfig,
	) -> Result<AlertManagerCortexConfig, FormError> {
		let mute = self.fields.to_mute_time_interval();
		let mut mute_time_intervals = config.mute_time_intervals().to_vec();

		let duplicate = mute_time_intervals.iter().any(|existing| {
			existing.name == mute.name
				&& !matches!(&self.mode, Mode::Edit { original_name } if original_name == &existing.name)
		});
		if duplicate {
			tracing::warn!("a mute timing named {:?} already exists", mute.name);
		}

		match &self.mode {
			Mode::Edit { original_name } => {
				match mute_time_intervals.iter_mut().find(|existing| &existing.name == original_name) {
					Some(existing) => *existing = mute,
					None => {
						tracing::warn!("mute timing {original_name:?} disappeared, adding it again");
						mute_time_intervals.push(mute);
					}
				}
			}
			Mode::Create => mute_time_intervals.push(mute),
		}

		config.with_mute_time_intervals(mute_time_intervals).map_err(FormError::Encode)
	}

	/// Validates the fields and writes the updated document. Returns the
	/// written document.
	pub async fn submit(&mut self) -> Result<AlertManagerCortexConfig, FormError> {
		if !matches!(self.state, FormState::Ready | FormState::SubmitError) {
			return Err(FormError::NotReady(self.state));
		}

		self.fields.validate().map_err(FormError::Validation)?;

		let loaded = match self.config.take() {
			Some(config) => config,
			None => return Err(FormError::NotReady(self.state)),
		};
		let updated = match self.merge_into(&loaded) {
			Ok(updated) => updated,
			Err(err) => {
				self.config = Some(loaded);
				return Err(err);
			}
		};

		self.state = FormState::Submitting;
		let result = self.write(&loaded, &updated).await;
		self.config = Some(loaded);

		match result {
			Ok(()) => {
				tracing::info!("saved mute timing {:?} to {}", self.fields.name.trim(), self.source_name);
				self.state = FormState::Done;
				Ok(updated)
			}
			Err(err) => {
				tracing::warn!("failed to save mute timing: {err}");
				self.state = FormState::SubmitError;
				Err(err)
			}
		}
	}

	async fn write(
		&self,
		loaded: &AlertManagerCortexConfig,
		updated: &AlertManagerCortexConfig,
	) -> Result<(), FormError> {
		match fetch_unchanged(self.source.as_ref(), &self.source_name, loaded)
			.await
			.map_err(FormError::Submit)?
		{
			Freshness::Unchanged => {}
			Freshness::Changed(_) => return Err(FormError::Conflict),
		}

		self.source.update_config(&self.source_name, updated).await.map_err(FormError::Submit)
	}
}
