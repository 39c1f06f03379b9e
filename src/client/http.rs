//! [ConfigSource] talking to the alertmanager configuration api of grafana
//! (`/api/alertmanager/{source}/config/api/v1/alerts`).

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use url::Url;

use super::{AlertmanagerSettings, ClientError, ConfigSource};
use crate::amconfig::AlertManagerCortexConfig;

#[derive(Debug, Clone)]
/// http client for one grafana instance
pub struct HttpConfigSource {
	/// http client
	client: reqwest::Client,
	/// grafana base url, may contain a sub path
	base_url: Url,
	/// bearer token sent with every request
	token: Option<String>,
}

impl HttpConfigSource {
	/// construct http client
	pub fn new(settings: &AlertmanagerSettings) -> Result<Self, ClientError> {
		if settings.url.cannot_be_a_base() {
			return Err(ClientError::InvalidBaseUrl(settings.url.clone()));
		}

		let client = reqwest::Client::builder()
			.timeout(settings.timeout)
			.build()
			.map_err(ClientError::Request)?;

		Ok(Self { client, base_url: settings.url.clone(), token: settings.token.clone() })
	}

	/// url of the configuration document of `source`
	fn config_url(&self, source: &str) -> Result<Url, ClientError> {
		let mut url = self.base_url.clone();

		url.path_segments_mut()
			.map_err(|_| ClientError::InvalidBaseUrl(self.base_url.clone()))?
			.pop_if_empty()
			.extend(["api", "alertmanager", source, "config", "api", "v1", "alerts"]);

		Ok(url)
	}

	fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
		match &self.token {
			Some(token) => request.bearer_auth(token),
			None => request,
		}
	}

	/// turn non success responses into [ClientError::Status]
	async fn check_status(response: Response) -> Result<Response, ClientError> {
		let status = response.status();

		if status.is_success() {
			return Ok(response);
		}

		let body = response.text().await.unwrap_or_default();
		tracing::warn!("alertmanager configuration request failed with {status}");

		Err(ClientError::Status { status, body })
	}
}

#[async_trait]
impl ConfigSource for HttpConfigSource {
	async fn fetch_config(&self, source: &str) -> Result<AlertManagerCortexConfig, ClientError> {
		let url = self.config_url(source)?;
		tracing::debug!("fetching alertmanager configuration from {url}");

		let response =
			self.authorize(self.client.get(url)).send().await.map_err(ClientError::Request)?;

		Self::check_status(response).await?.json().await.map_err(ClientError::Decode)
	}

	async fn update_config(
		&self,
		source: &str,
		config: &AlertManagerCortexConfig,
	) -> Result<(), ClientError> {
		let url = self.config_url(source)?;
		tracing::debug!("writing alertmanager configuration to {url}");

		let response = self
			.authorize(self.client.post(url))
			.json(config)
			.send()
			.await
			.map_err(ClientError::Request)?;

		Self::check_status(response).await?;

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use pretty_assertions::assert_eq;
	use wiremock::{
		matchers::{body_json, header, method, path},
		Mock, MockServer, ResponseTemplate,
	};

	use super::*;
	use crate::amconfig::tests::{default_config, default_config_json};

	fn make_settings(url: &str, token: Option<&str>) -> AlertmanagerSettings {
		AlertmanagerSettings {
			url: Url::parse(url).unwrap(),
			source: "grafana".to_owned(),
			token: token.map(str::to_owned),
			timeout: Duration::from_secs(5),
		}
	}

	#[test]
	fn config_url_keeps_sub_path() {
		let client = HttpConfigSource::new(&make_settings("http://localhost:3000/grafana/", None))
			.unwrap();

		assert_eq!(
			client.config_url("grafana").unwrap().as_str(),
			"http://localhost:3000/grafana/api/alertmanager/grafana/config/api/v1/alerts"
		);
	}

	#[test]
	fn config_url_escapes_source() {
		let client = HttpConfigSource::new(&make_settings("http://localhost:3000", None)).unwrap();

		assert_eq!(
			client.config_url("my am").unwrap().as_str(),
			"http://localhost:3000/api/alertmanager/my%20am/config/api/v1/alerts"
		);
	}

	#[test]
	fn rejects_non_base_url() {
		let result = HttpConfigSource::new(&make_settings("mailto:ops@example.com", None));

		assert!(matches!(result, Err(ClientError::InvalidBaseUrl(_))));
	}

	#[tokio::test]
	async fn fetch_config() {
		let server = MockServer::start().await;

		Mock::given(method("GET"))
			.and(path("/api/alertmanager/grafana/config/api/v1/alerts"))
			.and(header("authorization", "Bearer secret"))
			.respond_with(ResponseTemplate::new(200).set_body_json(default_config_json()))
			.mount(&server)
			.await;

		let client = HttpConfigSource::new(&make_settings(&server.uri(), Some("secret"))).unwrap();
		let config = client.fetch_config("grafana").await.unwrap();

		assert_eq!(config, default_config());
	}

	#[tokio::test]
	async fn fetch_config_error_status() {
		let server = MockServer::start().await;

		Mock::given(method("GET"))
			.respond_with(ResponseTemplate::new(500).set_body_string("boom"))
			.mount(&server)
			.await;

		let client = HttpConfigSource::new(&make_settings(&server.uri(), None)).unwrap();

		match client.fetch_config("grafana").await {
			Err(ClientError::Status { status, body }) => {
				assert_eq!(status.as_u16(), 500);
				assert_eq!(body, "boom");
			}
			other => panic!("unexpected result {other:?}"),
		}
	}

	#[tokio::test]
	async fn fetch_config_invalid_body() {
		let server = MockServer::start().await;

		Mock::given(method("GET"))
			.respond_with(ResponseTemplate::new(200).set_body_string("not json"))
			.mount(&server)
			.await;

		let client = HttpConfigSource::new(&make_settings(&server.uri(), None)).unwrap();

		assert!(matches!(client.fetch_config("grafana").await, Err(ClientError::Decode(_))));
	}

	#[tokio::test]
	async fn update_config_posts_full_document() {
		let server = MockServer::start().await;

		Mock::given(method("POST"))
			.and(path("/api/alertmanager/grafana/config/api/v1/alerts"))
			.and(body_json(default_config_json()))
			.respond_with(
				ResponseTemplate::new(202)
					.set_body_json(serde_json::json!({ "message": "configuration created" })),
			)
			.expect(1)
			.mount(&server)
			.await;

		let client = HttpConfigSource::new(&make_settings(&server.uri(), None)).unwrap();

		client.update_config("grafana", &default_config()).await.unwrap();
	}
}
