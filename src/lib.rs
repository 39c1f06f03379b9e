//! list, create, edit and delete alertmanager mute timings
//!
//! Mute timings live in the alertmanager configuration document of a
//! grafana instance. Every change is a read-modify-write of the whole
//! document:
//! - [form::MuteTimingForm] creates or edits one mute timing
//! - [table::MuteTimingsTable] lists mute timings and deletes them
//! - [client::ConfigSource] reads and writes the document

pub mod amconfig;
pub mod cli;
pub mod client;
pub mod form;
pub mod log;
pub mod settings;
pub mod table;
pub mod validation;
