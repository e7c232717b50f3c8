//! Process-wide session state and the single-flight refresh coordinator.
//!
//! [`AuthSession`] mirrors the stored credential pair in memory and owns the
//! refresh-in-flight flag together with the queue of requests suspended behind it. The first
//! request that detects an expired access token becomes the refresh leader; every later one
//! enqueues a one-shot continuation and resumes, in arrival order, with whatever the leader
//! settled on. Each credential replacement bumps a generation counter so a 401 earned by an
//! already superseded token is answered with the current token instead of a second refresh.

mod events;
mod metrics;

pub use events::*;
pub use metrics::RefreshMetrics;

// std
use std::mem;
// crates.io
use futures::channel::oneshot;
// self
use crate::{
	_prelude::*,
	auth::{Credentials, TokenPair, TokenSecret},
	config::{ClientConfig, WipePolicy},
	error::RefreshFailure,
	obs,
	store::{AUTH_KEYS, SessionStore},
};

type Waiter = oneshot::Sender<Result<TokenSecret, RefreshFailure>>;

#[derive(Default)]
struct SessionState {
	credentials: Credentials,
	generation: u64,
	refreshing: bool,
	pending: VecDeque<Waiter>,
}

/// Credential observed when a request was dispatched.
#[derive(Clone, Debug, Default)]
pub(crate) struct Snapshot {
	pub(crate) access_token: Option<TokenSecret>,
	pub(crate) generation: u64,
}

enum Entry {
	Current(TokenSecret),
	Ended,
	Wait(oneshot::Receiver<Result<TokenSecret, RefreshFailure>>),
	Lead { refresh_token: Option<TokenSecret>, generation: u64 },
}

/// Shared authentication state for every clone of an [`ApiClient`](crate::client::ApiClient).
pub struct AuthSession {
	store: Arc<dyn SessionStore>,
	state: Mutex<SessionState>,
	hydrated: AsyncOnceCell<()>,
	writes: AsyncMutex<()>,
	observers: RwLock<Vec<SessionObserver>>,
	metrics: RefreshMetrics,
	wipe_policy: WipePolicy,
	redirect_to: String,
}
impl AuthSession {
	/// Creates a session over `store`; credentials are loaded lazily on first use.
	pub fn new(store: Arc<dyn SessionStore>, config: &ClientConfig) -> Self {
		Self {
			store,
			state: Mutex::new(SessionState::default()),
			hydrated: AsyncOnceCell::new(),
			writes: AsyncMutex::new(()),
			observers: RwLock::new(Vec::new()),
			metrics: RefreshMetrics::default(),
			wipe_policy: config.wipe_policy,
			redirect_to: config.redirect_to.clone(),
		}
	}

	/// Backing credential store.
	pub fn store(&self) -> &Arc<dyn SessionStore> {
		&self.store
	}

	/// Refresh counters.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.metrics
	}

	/// Registers `observer` for every subsequent [`SessionEvent`].
	///
	/// Observers run synchronously on the task that changed the session and must not block.
	pub fn subscribe(&self, observer: impl Fn(&SessionEvent) + Send + Sync + 'static) {
		self.observers.write().push(Arc::new(observer));
	}

	/// Returns `true` while a refresh call is outstanding.
	pub fn is_refreshing(&self) -> bool {
		self.state.lock().refreshing
	}

	/// Number of requests currently waiting on the in-flight refresh.
	pub fn queued(&self) -> usize {
		self.state.lock().pending.len()
	}

	/// Returns the current credentials, loading them from the store on first use.
	pub async fn credentials(&self) -> Result<Credentials> {
		self.hydrate().await?;

		Ok(self.state.lock().credentials.clone())
	}

	/// Persists `credentials` and makes them the active pair.
	pub async fn establish(&self, credentials: Credentials) -> Result<()> {
		self.hydrate().await?;

		{
			let _writes = self.writes.lock().await;

			<dyn SessionStore>::save_credentials(self.store.as_ref(), &credentials).await?;
			self.replace(credentials);
		}

		self.emit(&SessionEvent::LoggedIn);

		Ok(())
	}

	/// Removes the stored tokens and clears the in-memory pair.
	///
	/// The mirror is cleared even when the store fails; the store error is returned afterwards.
	pub async fn logout(&self) -> Result<()> {
		self.hydrate().await?;

		let removed = {
			let _writes = self.writes.lock().await;
			let removed = self.store.remove_many(&AUTH_KEYS).await;

			self.replace(Credentials::default());

			removed
		};

		self.emit(&SessionEvent::LoggedOut);

		removed.map_err(Error::from)
	}

	pub(crate) async fn snapshot(&self) -> Result<Snapshot> {
		self.hydrate().await?;

		let state = self.state.lock();

		Ok(Snapshot {
			access_token: state.credentials.access_token.clone(),
			generation: state.generation,
		})
	}

	/// Obtains a usable access token after a request sent at generation `seen` was rejected.
	///
	/// Exactly one caller per expiry episode runs `refresh`; the rest wait for its outcome.
	pub(crate) async fn recover<F, Fut>(
		&self,
		seen: u64,
		refresh: F,
	) -> Result<TokenSecret, RefreshFailure>
	where
		F: FnOnce(TokenSecret) -> Fut,
		Fut: Future<Output = Result<TokenPair, RefreshFailure>>,
	{
		let entry = {
			let mut state = self.state.lock();

			// Any 401 during a refresh waits for it, even one earned by an older token.
			if state.refreshing {
				let (waiter, continuation) = oneshot::channel();

				state.pending.push_back(waiter);
				self.metrics.record_queued();

				Entry::Wait(continuation)
			} else if state.generation != seen {
				match state.credentials.access_token.clone() {
					Some(token) => Entry::Current(token),
					None => Entry::Ended,
				}
			} else {
				state.refreshing = true;

				Entry::Lead {
					refresh_token: state.credentials.refresh_token.clone(),
					generation: state.generation,
				}
			}
		};

		match entry {
			Entry::Current(token) => Ok(token),
			Entry::Ended => Err(RefreshFailure::SessionEnded),
			Entry::Wait(continuation) =>
				continuation.await.unwrap_or(Err(RefreshFailure::Abandoned)),
			Entry::Lead { refresh_token, generation } =>
				self.lead(generation, refresh_token, refresh).await,
		}
	}

	async fn lead<F, Fut>(
		&self,
		generation: u64,
		refresh_token: Option<TokenSecret>,
		refresh: F,
	) -> Result<TokenSecret, RefreshFailure>
	where
		F: FnOnce(TokenSecret) -> Fut,
		Fut: Future<Output = Result<TokenPair, RefreshFailure>>,
	{
		let guard = RefreshGuard::arm(self);
		let issued = match refresh_token {
			Some(token) => {
				self.metrics.record_attempt();

				refresh(token).await
			},
			None => Err(RefreshFailure::MissingRefreshToken),
		};
		let _writes = self.writes.lock().await;

		// A login or logout replaced the pair while the call was running.
		if self.state.lock().generation != generation {
			return self.settle_superseded(guard);
		}

		let stored = match issued {
			Ok(pair) => {
				let token = pair.access_token.clone();
				let rotated = self.state.lock().credentials.rotate(pair);

				<dyn SessionStore>::save_credentials(self.store.as_ref(), &rotated)
					.await
					.map(|()| (token, rotated))
					.map_err(|e| RefreshFailure::Storage { message: e.to_string() })
			},
			Err(failure) => Err(failure),
		};

		match stored {
			Ok((token, rotated)) => Ok(self.settle_success(guard, token, rotated)),
			Err(failure) => {
				let wiped = <dyn SessionStore>::wipe(self.store.as_ref(), self.wipe_policy).await;

				if let Err(e) = wiped {
					obs::warn_wipe_failed(&e);
				}

				Err(self.settle_failure(guard, failure))
			},
		}
	}

	fn settle_success(
		&self,
		guard: RefreshGuard<'_>,
		token: TokenSecret,
		rotated: Credentials,
	) -> TokenSecret {
		let waiters = {
			let mut state = self.state.lock();

			state.credentials = rotated;
			state.generation += 1;
			state.refreshing = false;

			mem::take(&mut state.pending)
		};

		guard.disarm();

		for waiter in waiters {
			let _ = waiter.send(Ok(token.clone()));
		}

		self.metrics.record_success();
		self.emit(&SessionEvent::Refreshed);

		token
	}

	fn settle_failure(&self, guard: RefreshGuard<'_>, failure: RefreshFailure) -> RefreshFailure {
		let waiters = {
			let mut state = self.state.lock();

			state.credentials = Credentials::default();
			state.generation += 1;
			state.refreshing = false;

			mem::take(&mut state.pending)
		};

		guard.disarm();

		for waiter in waiters {
			let _ = waiter.send(Err(failure.clone()));
		}

		self.metrics.record_failure();
		obs::warn_session_expired(&failure, &self.redirect_to);
		self.emit(&SessionEvent::Expired {
			reason: failure.clone(),
			redirect_to: self.redirect_to.clone(),
		});

		failure
	}

	fn settle_superseded(&self, guard: RefreshGuard<'_>) -> Result<TokenSecret, RefreshFailure> {
		let (waiters, current) = {
			let mut state = self.state.lock();

			state.refreshing = false;

			(mem::take(&mut state.pending), state.credentials.access_token.clone())
		};

		guard.disarm();

		let outcome = current.ok_or(RefreshFailure::SessionEnded);

		for waiter in waiters {
			let _ = waiter.send(outcome.clone());
		}

		outcome
	}

	async fn hydrate(&self) -> Result<()> {
		self.hydrated
			.get_or_try_init(|| async {
				let credentials =
					<dyn SessionStore>::load_credentials(self.store.as_ref()).await?;
				let mut state = self.state.lock();

				// Never overwrite a pair established before hydration finished.
				if state.generation == 0 {
					state.credentials = credentials;
				}

				Ok::<_, Error>(())
			})
			.await?;

		Ok(())
	}

	fn replace(&self, credentials: Credentials) {
		let mut state = self.state.lock();

		state.credentials = credentials;
		state.generation += 1;
	}

	fn emit(&self, event: &SessionEvent) {
		let observers = self.observers.read().clone();

		for observer in observers {
			observer(event);
		}
	}
}
impl Debug for AuthSession {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = self.state.lock();

		f.debug_struct("AuthSession")
			.field("credentials", &state.credentials)
			.field("generation", &state.generation)
			.field("refreshing", &state.refreshing)
			.field("queued", &state.pending.len())
			.field("wipe_policy", &self.wipe_policy)
			.field("redirect_to", &self.redirect_to)
			.finish()
	}
}

// Releases waiters when the leading future is dropped before it settles.
struct RefreshGuard<'a> {
	session: &'a AuthSession,
	armed: bool,
}
impl<'a> RefreshGuard<'a> {
	fn arm(session: &'a AuthSession) -> Self {
		Self { session, armed: true }
	}

	fn disarm(mut self) {
		self.armed = false;
	}
}
impl Drop for RefreshGuard<'_> {
	fn drop(&mut self) {
		if !self.armed {
			return;
		}

		let waiters = {
			let mut state = self.session.state.lock();

			state.refreshing = false;

			mem::take(&mut state.pending)
		};

		obs::warn_refresh_abandoned(waiters.len());

		for waiter in waiters {
			let _ = waiter.send(Err(RefreshFailure::Abandoned));
		}

		self.session.metrics.record_failure();
	}
}
