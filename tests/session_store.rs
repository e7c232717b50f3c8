mod common;

// std
use std::{
	env, fs,
	path::{Path, PathBuf},
	process,
	sync::Arc,
};
// self
use common::*;
use portfolio_client::{
	auth::Credentials,
	client::ApiClient,
	config::WipePolicy,
	store::{ACCESS_TOKEN_KEY, FileStore, MemoryStore, REFRESH_TOKEN_KEY, SessionStore},
};

fn temp_store_path(label: &str) -> PathBuf {
	env::temp_dir().join(format!("portfolio_client_{label}_{}.json", process::id()))
}

#[tokio::test]
async fn memory_store_clones_share_entries() {
	let store = MemoryStore::default();
	let view = store.clone();

	store
		.set_many(vec![(ACCESS_TOKEN_KEY.into(), "a1".into()), ("theme".into(), "light".into())])
		.await
		.expect("Writing entries should succeed.");

	assert_eq!(
		view.get(ACCESS_TOKEN_KEY).await.expect("Read should succeed.").as_deref(),
		Some("a1")
	);

	view.remove_many(&[ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY])
		.await
		.expect("Remove should succeed.");

	assert_eq!(store.snapshot().len(), 1);

	store.clear().await.expect("Clear should succeed.");

	assert!(view.is_empty());
}

fn file_client(path: &Path) -> ScriptedClient {
	let store = FileStore::open(path).expect("File store should open.");
	let transport = Arc::new(ScriptedTransport::new(RefreshReply::Reject(401)));

	ApiClient::with_http_client(config(), Arc::new(store), transport)
}

#[tokio::test]
async fn session_survives_restart_with_file_store() {
	let path = temp_store_path("restart");
	let _ = fs::remove_file(&path);

	file_client(&path)
		.session()
		.establish(Credentials::new("a1", "r1"))
		.await
		.expect("Establishing credentials should persist them.");

	let client = file_client(&path);

	assert!(client.is_authenticated().await.expect("Hydration should succeed."));

	client.logout().await.expect("Logout should succeed.");

	let wiped = FileStore::open(&path).expect("File store should reopen after logout.");

	assert_eq!(wiped.get(REFRESH_TOKEN_KEY).await.expect("Read should succeed."), None);

	fs::remove_file(&path).expect("Temporary store file should be removable.");
}

#[tokio::test]
async fn logout_keeps_unrelated_entries_even_with_full_wipe_policy() {
	let config = portfolio_client::config::ClientConfig::builder()
		.base_url(config().base_url)
		.wipe_policy(WipePolicy::Everything)
		.build()
		.expect("Configuration should build.");
	let (client, _, store) = scripted_client(
		config,
		RefreshReply::Reject(401),
		&[(ACCESS_TOKEN_KEY, "a1"), (REFRESH_TOKEN_KEY, "r1"), ("theme", "dark")],
	)
	.await;
	let events = record_events(&client);

	client.logout().await.expect("Logout should succeed.");

	assert_eq!(store.snapshot().into_iter().collect::<Vec<_>>(), [(
		"theme".to_owned(),
		"dark".to_owned()
	)]);
	assert_eq!(events.lock().len(), 1);
	assert!(!client.is_authenticated().await.expect("Check should succeed."));
}
