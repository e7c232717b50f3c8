//! Scripted in-process transport for deterministic refresh tests.

#![allow(dead_code)]

// std
use std::{
	io,
	sync::{
		Arc,
		atomic::{AtomicBool, AtomicUsize, Ordering},
	},
};
// crates.io
use futures::channel::oneshot;
use parking_lot::Mutex;
use serde_json::json;
// self
use portfolio_client::{
	client::ApiClient,
	config::ClientConfig,
	http::{ApiHttpClient, ApiRequest, ApiResponse, RequestBody, TransportFuture},
	session::SessionEvent,
	store::{MemoryStore, SessionStore},
	url::Url,
};

pub type ScriptedClient = ApiClient<ScriptedTransport>;

/// How the fake backend answers `POST /auth/refresh`.
#[derive(Clone, Debug)]
pub enum RefreshReply {
	Issue { access: &'static str, refresh: Option<&'static str> },
	Reject(u16),
	Malformed,
	NetworkDown,
}

/// One request as the fake backend received it.
#[derive(Clone, Debug)]
pub struct Seen {
	pub path: String,
	pub authorization: Option<String>,
	pub body: String,
}

/// Backend double: protected paths accept only the currently valid bearer token.
pub struct ScriptedTransport {
	valid: Mutex<Option<String>>,
	reject_all: AtomicBool,
	reply: Mutex<RefreshReply>,
	gate: Mutex<Option<oneshot::Receiver<()>>>,
	refresh_calls: AtomicUsize,
	log: Mutex<Vec<Seen>>,
}
impl ScriptedTransport {
	pub fn new(reply: RefreshReply) -> Self {
		Self {
			valid: Mutex::new(None),
			reject_all: AtomicBool::new(false),
			reply: Mutex::new(reply),
			gate: Mutex::new(None),
			refresh_calls: AtomicUsize::new(0),
			log: Mutex::new(Vec::new()),
		}
	}

	/// Holds the next refresh response until the returned sender fires (or is dropped).
	pub fn gate(&self) -> oneshot::Sender<()> {
		let (open, gate) = oneshot::channel();

		*self.gate.lock() = Some(gate);

		open
	}

	/// Makes every protected path answer 401, even for freshly issued tokens.
	pub fn reject_all(&self) {
		self.reject_all.store(true, Ordering::SeqCst);
	}

	pub fn refresh_calls(&self) -> usize {
		self.refresh_calls.load(Ordering::SeqCst)
	}

	pub fn log(&self) -> Vec<Seen> {
		self.log.lock().clone()
	}

	/// Requests other than the refresh call, in dispatch order.
	pub fn api_calls(&self) -> Vec<Seen> {
		self.log().into_iter().filter(|seen| !seen.path.ends_with("/auth/refresh")).collect()
	}

	async fn refresh(&self) -> io::Result<ApiResponse> {
		self.refresh_calls.fetch_add(1, Ordering::SeqCst);

		let gate = self.gate.lock().take();

		if let Some(gate) = gate {
			let _ = gate.await;
		}

		let reply = self.reply.lock().clone();

		match reply {
			RefreshReply::Issue { access, refresh } => {
				*self.valid.lock() = Some(access.to_owned());

				let body = match refresh {
					Some(refresh) => json!({
						"access_token": access,
						"refresh_token": refresh,
						"token_type": "bearer",
					}),
					None => json!({ "access_token": access, "token_type": "bearer" }),
				};

				Ok(ApiResponse::json(200, &body))
			},
			RefreshReply::Reject(status) =>
				Ok(ApiResponse::json(status, &json!({ "detail": "Invalid refresh token" }))),
			RefreshReply::Malformed =>
				Ok(ApiResponse::new(200, Vec::new(), b"<html>maintenance</html>".to_vec())),
			RefreshReply::NetworkDown =>
				Err(io::Error::new(io::ErrorKind::ConnectionRefused, "backend unreachable")),
		}
	}
}
impl ApiHttpClient for ScriptedTransport {
	type TransportError = io::Error;

	fn execute<'a>(&'a self, request: &'a ApiRequest) -> TransportFuture<'a, Self::TransportError> {
		Box::pin(async move {
			let path = request.url().path().to_owned();
			let authorization = request.header("authorization").map(str::to_owned);
			let body = match request.body() {
				RequestBody::Bytes { data, .. } => String::from_utf8_lossy(data).into_owned(),
				_ => String::new(),
			};

			self.log.lock().push(Seen {
				path: path.clone(),
				authorization: authorization.clone(),
				body,
			});

			if path.ends_with("/auth/refresh") {
				return self.refresh().await;
			}
			if path.ends_with("/public") {
				return Ok(ApiResponse::json(200, &json!({ "public": true })));
			}

			let expected = self.valid.lock().as_ref().map(|token| format!("Bearer {token}"));
			let accepted = !self.reject_all.load(Ordering::SeqCst)
				&& authorization.is_some()
				&& authorization == expected;

			if accepted {
				Ok(ApiResponse::json(200, &json!({ "path": path })))
			} else {
				Ok(ApiResponse::json(401, &json!({ "detail": "Could not validate credentials" })))
			}
		})
	}
}

pub fn config() -> ClientConfig {
	ClientConfig::builder()
		.base_url(Url::parse("http://api.test/api/v1").expect("Test base URL should parse."))
		.build()
		.expect("Test configuration should build.")
}

/// Builds a client over a memory store seeded with `entries`.
pub async fn scripted_client(
	config: ClientConfig,
	reply: RefreshReply,
	entries: &[(&str, &str)],
) -> (ScriptedClient, Arc<ScriptedTransport>, MemoryStore) {
	let store = MemoryStore::default();
	let entries =
		entries.iter().map(|(key, value)| ((*key).to_owned(), (*value).to_owned())).collect();

	store.set_many(entries).await.expect("Seeding the memory store should succeed.");

	let transport = Arc::new(ScriptedTransport::new(reply));
	let client: ScriptedClient =
		ApiClient::with_http_client(config, Arc::new(store.clone()), transport.clone());

	(client, transport, store)
}

/// Collects every session event emitted by `client`.
pub fn record_events(client: &ScriptedClient) -> Arc<Mutex<Vec<SessionEvent>>> {
	let events = Arc::new(Mutex::new(Vec::new()));
	let sink = events.clone();

	client.session().subscribe(move |event| sink.lock().push(event.clone()));

	events
}
