mod common;

// crates.io
use serde_json::{Value, json};
use tokio::task::{self, JoinHandle};
// self
use common::*;
use portfolio_client::{
	config::WipePolicy,
	error::{Error, RefreshFailure},
	http::Method,
	session::SessionEvent,
	store::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY},
};

const SEEDED: &[(&str, &str)] =
	&[(ACCESS_TOKEN_KEY, "stale"), (REFRESH_TOKEN_KEY, "r1"), ("theme", "dark")];

fn spawn_get(client: &ScriptedClient, path: &'static str) -> JoinHandle<Result<Value, Error>> {
	let client = client.clone();

	tokio::spawn(async move { client.send_json(client.request(Method::Get, path)?).await })
}

async fn wait_for_waiters(client: &ScriptedClient, waiters: usize) {
	while !(client.session().is_refreshing() && client.session().queued() == waiters) {
		task::yield_now().await;
	}
}

fn issue(access: &'static str, refresh: Option<&'static str>) -> RefreshReply {
	RefreshReply::Issue { access, refresh }
}

#[tokio::test]
async fn expiry_burst_refreshes_once_and_replays_waiters_in_order() {
	let (client, transport, store) =
		scripted_client(config(), issue("fresh", Some("r2")), SEEDED).await;
	let events = record_events(&client);
	let open = transport.gate();
	let tasks = ["projects/", "skills/", "experience/", "education/"]
		.map(|path| spawn_get(&client, path));

	wait_for_waiters(&client, 3).await;
	open.send(()).expect("Refresh gate should still be held.");

	for task in tasks {
		let body = task
			.await
			.expect("Request task should not panic.")
			.expect("Request should succeed after the refresh.");

		assert!(body["path"].is_string());
	}

	assert_eq!(transport.refresh_calls(), 1);

	let replays = transport
		.api_calls()
		.into_iter()
		.filter(|seen| seen.authorization.as_deref() == Some("Bearer fresh"))
		.map(|seen| seen.path)
		.collect::<Vec<_>>();

	assert_eq!(replays.len(), 4);
	assert_eq!(
		replays.iter().filter(|path| !path.ends_with("/projects/")).collect::<Vec<_>>(),
		["/api/v1/skills/", "/api/v1/experience/", "/api/v1/education/"]
	);

	let refresh = transport
		.log()
		.into_iter()
		.find(|seen| seen.path.ends_with("/auth/refresh"))
		.expect("Refresh call should be logged.");

	assert_eq!(refresh.authorization, None);
	assert_eq!(refresh.body, r#"{"refresh_token":"r1"}"#);

	let stored = store.snapshot();

	assert_eq!(stored.get(ACCESS_TOKEN_KEY).map(String::as_str), Some("fresh"));
	assert_eq!(stored.get(REFRESH_TOKEN_KEY).map(String::as_str), Some("r2"));
	assert_eq!(events.lock().as_slice(), &[SessionEvent::Refreshed]);

	let metrics = client.session().metrics();

	assert_eq!((metrics.attempts(), metrics.successes(), metrics.queued()), (1, 1, 3));
}

#[tokio::test]
async fn rejected_refresh_clears_tokens_and_rejects_every_waiter() {
	let (client, transport, store) =
		scripted_client(config(), RefreshReply::Reject(401), SEEDED).await;
	let events = record_events(&client);
	let open = transport.gate();
	let tasks = ["projects/", "skills/", "contact/"].map(|path| spawn_get(&client, path));

	wait_for_waiters(&client, 2).await;
	open.send(()).expect("Refresh gate should still be held.");

	for task in tasks {
		let err = task
			.await
			.expect("Request task should not panic.")
			.expect_err("Request should fail with the refresh error.");

		assert!(
			matches!(
				&err,
				Error::SessionExpired(RefreshFailure::Rejected {
					status: 401,
					detail: Some(detail),
				}) if detail == "Invalid refresh token"
			),
			"Unexpected error: {err:?}"
		);
	}

	assert_eq!(transport.refresh_calls(), 1);
	assert!(client.session().credentials().await.expect("Credentials should load.").is_empty());

	let stored = store.snapshot();

	assert_eq!(stored.get(ACCESS_TOKEN_KEY), None);
	assert_eq!(stored.get(REFRESH_TOKEN_KEY), None);
	assert_eq!(stored.get("theme").map(String::as_str), Some("dark"));
	assert_eq!(events.lock().as_slice(), &[SessionEvent::Expired {
		reason: RefreshFailure::Rejected {
			status: 401,
			detail: Some("Invalid refresh token".into()),
		},
		redirect_to: "/login".into(),
	}]);
	assert!(!client.is_authenticated().await.expect("Authentication check should succeed."));
}

#[tokio::test]
async fn wipe_everything_policy_clears_unrelated_entries() {
	let config = portfolio_client::config::ClientConfig::builder()
		.base_url(config().base_url)
		.wipe_policy(WipePolicy::Everything)
		.redirect_to("/admin/login")
		.build()
		.expect("Configuration should build.");
	let (client, _, store) = scripted_client(config, RefreshReply::Malformed, SEEDED).await;
	let events = record_events(&client);
	let err = spawn_get(&client, "projects/")
		.await
		.expect("Request task should not panic.")
		.expect_err("Malformed refresh responses should end the session.");

	assert!(matches!(err, Error::SessionExpired(RefreshFailure::MalformedResponse { .. })));
	assert!(store.is_empty());
	assert!(matches!(
		events.lock().as_slice(),
		[SessionEvent::Expired { redirect_to, .. }] if redirect_to == "/admin/login"
	));
}

#[tokio::test]
async fn missing_refresh_token_expires_without_refresh_call() {
	let (client, transport, store) =
		scripted_client(config(), issue("fresh", None), &[(ACCESS_TOKEN_KEY, "stale")]).await;
	let events = record_events(&client);
	let err = spawn_get(&client, "profile/me")
		.await
		.expect("Request task should not panic.")
		.expect_err("Request without a refresh token should fail.");

	assert!(matches!(err, Error::SessionExpired(RefreshFailure::MissingRefreshToken)));
	assert_eq!(transport.refresh_calls(), 0);
	assert!(store.is_empty());
	assert_eq!(events.lock().as_slice(), &[SessionEvent::Expired {
		reason: RefreshFailure::MissingRefreshToken,
		redirect_to: "/login".into(),
	}]);
}

#[tokio::test]
async fn replayed_request_rejected_again_is_not_refreshed_twice() {
	let (client, transport, _) = scripted_client(config(), issue("fresh", None), SEEDED).await;

	transport.reject_all();

	let err = spawn_get(&client, "skills/")
		.await
		.expect("Request task should not panic.")
		.expect_err("A replay rejected with 401 should fail.");

	assert!(matches!(&err, Error::Api(api) if api.status == 401), "Unexpected error: {err:?}");
	assert_eq!(transport.refresh_calls(), 1);

	let calls = transport.api_calls();

	assert_eq!(calls.len(), 2);
	assert_eq!(calls[0].authorization.as_deref(), Some("Bearer stale"));
	assert_eq!(calls[1].authorization.as_deref(), Some("Bearer fresh"));
}

#[tokio::test]
async fn anonymous_requests_carry_no_authorization() {
	let (client, transport, _) = scripted_client(config(), issue("fresh", None), &[]).await;
	let body = spawn_get(&client, "public")
		.await
		.expect("Request task should not panic.")
		.expect("Public request should succeed.");

	assert_eq!(body["public"], Value::Bool(true));
	assert_eq!(transport.log()[0].authorization, None);
	assert_eq!(transport.refresh_calls(), 0);
}

#[tokio::test]
async fn unchanged_refresh_token_is_kept_after_rotation() {
	let (client, transport, store) = scripted_client(config(), issue("fresh", None), SEEDED).await;

	spawn_get(&client, "education/")
		.await
		.expect("Request task should not panic.")
		.expect("Request should succeed after the refresh.");

	let stored = store.snapshot();

	assert_eq!(transport.refresh_calls(), 1);
	assert_eq!(stored.get(ACCESS_TOKEN_KEY).map(String::as_str), Some("fresh"));
	assert_eq!(stored.get(REFRESH_TOKEN_KEY).map(String::as_str), Some("r1"));
}

#[tokio::test]
async fn refresh_transport_failure_is_terminal() {
	let (client, transport, store) =
		scripted_client(config(), RefreshReply::NetworkDown, SEEDED).await;
	let err = spawn_get(&client, "projects/")
		.await
		.expect("Request task should not panic.")
		.expect_err("Unreachable refresh endpoint should end the session.");

	assert!(matches!(err, Error::SessionExpired(RefreshFailure::Transport { .. })));
	assert_eq!(transport.refresh_calls(), 1);
	assert_eq!(store.snapshot().get(ACCESS_TOKEN_KEY), None);
}

#[tokio::test]
async fn dropped_refresh_leader_releases_waiters() {
	let (client, transport, store) =
		scripted_client(config(), issue("fresh", None), SEEDED).await;
	let _open = transport.gate();
	let leader = spawn_get(&client, "projects/");

	wait_for_waiters(&client, 0).await;

	let waiter = spawn_get(&client, "skills/");

	wait_for_waiters(&client, 1).await;
	leader.abort();

	let err = waiter
		.await
		.expect("Waiter task should not panic.")
		.expect_err("Waiter should be released with an error.");

	assert!(matches!(err, Error::SessionExpired(RefreshFailure::Abandoned)));
	assert!(!err.to_string().is_empty());
	assert!(!client.session().is_refreshing());
	assert_eq!(store.snapshot().get(REFRESH_TOKEN_KEY).map(String::as_str), Some("r1"));
}

#[tokio::test]
async fn logout_during_refresh_discards_the_new_token() {
	let (client, transport, store) =
		scripted_client(config(), issue("fresh", Some("r2")), SEEDED).await;
	let events = record_events(&client);
	let open = transport.gate();
	let leader = spawn_get(&client, "projects/");
	let waiter = spawn_get(&client, "skills/");

	wait_for_waiters(&client, 1).await;
	client.logout().await.expect("Logout should succeed.");
	open.send(()).expect("Refresh gate should still be held.");

	for task in [leader, waiter] {
		let err = task
			.await
			.expect("Request task should not panic.")
			.expect_err("Requests should not survive the logout.");

		assert!(matches!(err, Error::SessionExpired(RefreshFailure::SessionEnded)));
	}

	assert_eq!(store.snapshot().get(ACCESS_TOKEN_KEY), None);
	assert_eq!(store.snapshot().get(REFRESH_TOKEN_KEY), None);
	assert!(client.session().credentials().await.expect("Credentials should load.").is_empty());
	assert_eq!(events.lock().as_slice(), &[SessionEvent::LoggedOut]);
}

#[tokio::test]
async fn manual_refresh_returns_new_token() {
	let (client, transport, _) =
		scripted_client(config(), issue("fresh", Some("r2")), SEEDED).await;
	let token = client.refresh().await.expect("Manual refresh should succeed.");

	assert_eq!(token.expose(), "fresh");
	assert_eq!(transport.refresh_calls(), 1);
	assert!(transport.api_calls().is_empty());
}

#[tokio::test]
async fn replayed_post_keeps_its_body() {
	let (client, transport, _) = scripted_client(config(), issue("fresh", None), SEEDED).await;
	let message = json!({ "name": "Ada", "email": "ada@example.com", "message": "Hello" });
	let request = client
		.request(Method::Post, "contact/")
		.and_then(|request| request.with_json(&message))
		.expect("Contact request should build.");
	let body: Value = client.send_json(request).await.expect("Replayed post should succeed.");

	assert_eq!(body["path"], "/api/v1/contact/");
	assert_eq!(transport.refresh_calls(), 1);

	let calls = transport.api_calls();
	let sent = message.to_string();

	assert_eq!(calls.len(), 2);
	assert_eq!(calls[0].authorization.as_deref(), Some("Bearer stale"));
	assert_eq!(calls[1].authorization.as_deref(), Some("Bearer fresh"));
	assert!(calls.iter().all(|seen| seen.body == sent));
}
