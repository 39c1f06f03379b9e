use std::{sync::Arc, time::Duration};

use mute_timings::{
	client::{AlertmanagerSettings, ConfigSource, HttpConfigSource},
	form::{FormError, MuteTimingForm},
	table::MuteTimingsTable,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use url::Url;
use wiremock::{
	matchers::{method, path},
	Mock, MockServer, ResponseTemplate,
};

const CONFIG_PATH: &str = "/api/alertmanager/grafana/config/api/v1/alerts";

fn default_mute() -> Value {
	json!({
		"name": "default-mute",
		"time_intervals": [{
			"times": [{ "start_time": "12:00", "end_time": "24:00" }],
			"days_of_month": ["15", "-1"],
			"months": ["august:december", "march"]
		}]
	})
}

fn default_config() -> Value {
	json!({
		"alertmanager_config": {
			"receivers": [{ "name": "default" }, { "name": "critical" }],
			"route": {
				"receiver": "default",
				"group_by": ["alertname"],
				"routes": [{
					"matchers": ["env=prod", "region!=EU"],
					"mute_time_intervals": ["default-mute"]
				}]
			},
			"templates": [],
			"mute_time_intervals": [default_mute()]
		},
		"template_files": {}
	})
}

async fn mock_alertmanager(config: Value) -> MockServer {
	let server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path(CONFIG_PATH))
		.respond_with(ResponseTemplate::new(200).set_body_json(config))
		.mount(&server)
		.await;

	Mock::given(method("POST"))
		.and(path(CONFIG_PATH))
		.respond_with(
			ResponseTemplate::new(202)
				.set_body_json(json!({ "message": "configuration created" })),
		)
		.mount(&server)
		.await;

	server
}

fn make_source(server: &MockServer) -> Arc<dyn ConfigSource> {
	let settings = AlertmanagerSettings {
		url: Url::parse(&server.uri()).unwrap(),
		source: "grafana".to_owned(),
		token: None,
		timeout: Duration::from_secs(5),
	};

	Arc::new(HttpConfigSource::new(&settings).unwrap())
}

/// bodies of all configuration updates the server received
async fn posted_documents(server: &MockServer) -> Vec<Value> {
	server
		.received_requests()
		.await
		.unwrap()
		.into_iter()
		.filter(|request| request.method.as_str() == "POST")
		.map(|request| request.body_json::<Value>().unwrap())
		.collect()
}

#[tokio::test]
async fn creates_a_new_mute_timing() {
	let server = mock_alertmanager(default_config()).await;
	let mut form = MuteTimingForm::open(make_source(&server), "grafana", None).await.unwrap();

	let fields = form.fields_mut();
	fields.name = "maintenance period".to_owned();
	let interval = fields.interval_mut(0).unwrap();
	interval.times.set_start(0, "22:00");
	interval.times.set_end(0, "24:00");
	interval.days_of_month = "-1".to_owned();
	interval.months = "january, july".to_owned();

	form.submit().await.unwrap();

	let mut expected = default_config();
	expected["alertmanager_config"]["mute_time_intervals"] = json!([
		default_mute(),
		{
			"name": "maintenance period",
			"time_intervals": [{
				"days_of_month": ["-1"],
				"months": ["january", "july"],
				"times": [{ "start_time": "22:00", "end_time": "24:00" }]
			}]
		}
	]);

	assert_eq!(posted_documents(&server).await, vec![expected]);
}

#[tokio::test]
async fn prepopulates_the_form_when_editing() {
	let server = mock_alertmanager(default_config()).await;
	let form = MuteTimingForm::open(make_source(&server), "grafana", Some("default-mute".to_owned()))
		.await
		.unwrap();

	assert_eq!(form.fields().name, "default-mute");
	assert_eq!(form.fields().intervals()[0].months, "august:december, march");
	assert_eq!(form.fields().intervals()[0].days_of_month, "15, -1");
	assert_eq!(form.fields().intervals()[0].times.rows()[0].start_time, "12:00");
	assert_eq!(form.fields().intervals()[0].times.rows()[0].end_time, "24:00");
}

#[tokio::test]
async fn fetch_failure_blocks_the_form() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.respond_with(ResponseTemplate::new(502))
		.mount(&server)
		.await;

	let result = MuteTimingForm::open(make_source(&server), "grafana", None).await;

	assert!(matches!(result, Err(FormError::Fetch(_))));
}

#[tokio::test]
async fn deletes_a_mute_timing() {
	let server = mock_alertmanager(default_config()).await;
	let mut table =
		MuteTimingsTable::load(make_source(&server), "grafana", None, false).await.unwrap();

	assert_eq!(table.rows().len(), 1);

	table.request_delete("default-mute").unwrap();
	table.confirm_delete().await.unwrap();

	// the route still references the deleted mute timing
	let mut expected = default_config();
	expected["alertmanager_config"]["mute_time_intervals"] = json!([]);

	assert_eq!(posted_documents(&server).await, vec![expected]);
	assert!(table.rows().is_empty());
}

#[tokio::test]
async fn delete_leaves_the_rest_of_the_document_byte_identical() {
	let server = MockServer::start().await;
	let document = r#"{"alertmanager_config":{"global":{"resolve_timeout":"5m"},"mute_time_intervals":[{"name":"a","time_intervals":[{"weekdays":["monday"],"location":"Europe/Berlin"}]},{"name":"b"},{"name":"gone","time_intervals":[{"months":["may"]}]}],"receivers":[{"name":"default"}],"route":{"receiver":"default","mute_time_intervals":["a"]}}}"#;

	Mock::given(method("GET"))
		.and(path(CONFIG_PATH))
		.respond_with(ResponseTemplate::new(200).set_body_raw(document, "application/json"))
		.mount(&server)
		.await;
	Mock::given(method("POST"))
		.and(path(CONFIG_PATH))
		.respond_with(ResponseTemplate::new(202))
		.mount(&server)
		.await;

	let mut table =
		MuteTimingsTable::load(make_source(&server), "grafana", None, false).await.unwrap();
	table.request_delete("gone").unwrap();
	table.confirm_delete().await.unwrap();

	let posted: Vec<String> = server
		.received_requests()
		.await
		.unwrap()
		.into_iter()
		.filter(|request| request.method.as_str() == "POST")
		.map(|request| String::from_utf8(request.body).unwrap())
		.collect();

	assert_eq!(
		posted,
		vec![document.replace(r#",{"name":"gone","time_intervals":[{"months":["may"]}]}"#, "")]
	);
}
