//! Demonstrates signing in against a mock backend, recovering from an expired access token, and
//! observing the session lifecycle.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::{Value, json};
// self
use portfolio_client::{
	client::ApiClient,
	config::ClientConfig,
	store::{MemoryStore, SessionStore},
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let login = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/auth/login");
			then.status(200).json_body(json!({
				"access_token": "expired-access",
				"refresh_token": "demo-refresh",
				"token_type": "bearer",
			}));
		})
		.await;
	let expired = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/v1/projects/")
				.header("authorization", "Bearer expired-access");
			then.status(401).json_body(json!({ "detail": "Could not validate credentials" }));
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/auth/refresh");
			then.status(200).json_body(json!({
				"access_token": "fresh-access",
				"token_type": "bearer",
			}));
		})
		.await;
	let projects = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/v1/projects/")
				.header("authorization", "Bearer fresh-access");
			then.status(200).json_body(json!({ "projects": [{ "id": 1, "title": "Orbit" }] }));
		})
		.await;
	let config = ClientConfig::builder().base_url(Url::parse(&server.url("/api/v1"))?).build()?;
	let store: Arc<dyn SessionStore> = Arc::new(MemoryStore::default());
	let client = ApiClient::new(config, store)?;

	client.session().subscribe(|event| println!("Session event: {event:?}."));
	client.login("owner@example.com", "hunter2").await?;

	let listing: Vec<Value> = client.projects().list().await?;

	println!("Loaded {} project(s) after one refresh.", listing.len());

	login.assert_async().await;
	expired.assert_async().await;
	refresh.assert_async().await;
	projects.assert_async().await;

	Ok(())
}
