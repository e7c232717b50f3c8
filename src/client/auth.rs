//! Account and session operations backed by the `/auth` endpoints.

// self
use crate::{
	_prelude::*,
	auth::{AccessClaims, Credentials, CurrentUser, TokenPair, TokenSecret},
	client::ApiClient,
	http::{ApiHttpClient, Method},
	obs::{self, Operation, OperationSpan, Outcome},
};

impl<C> ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Signs in with the password form and stores the issued token pair.
	///
	/// A rejected login surfaces as [`Error::Api`]; it never starts a refresh.
	pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair> {
		const OPERATION: Operation = Operation::Login;

		let span = OperationSpan::new(OPERATION, "login");

		obs::record_outcome(OPERATION, Outcome::Attempt);

		let result = span
			.instrument(async move {
				let request = self
					.request(Method::Post, "auth/login")?
					.with_form([("username", username), ("password", password)]);
				let pair = self.send_anonymous(request).await?.json_body::<TokenPair>()?;

				self.session().establish(Credentials::from(pair.clone())).await?;

				Ok::<_, Error>(pair)
			})
			.await;

		obs::record_result(OPERATION, result)
	}

	/// Creates an account; `body` follows the backend's registration schema.
	pub async fn register<B>(&self, body: &B) -> Result<CurrentUser>
	where
		B: ?Sized + Serialize,
	{
		let request = self.request(Method::Post, "auth/register")?.with_json(body)?;

		self.send_json(request).await
	}

	/// Fetches the signed-in account.
	pub async fn current_user(&self) -> Result<CurrentUser> {
		self.send_json(self.request(Method::Get, "auth/me")?).await
	}

	/// Asks the backend to validate the current access token.
	pub async fn test_token(&self) -> Result<CurrentUser> {
		self.send_json(self.request(Method::Post, "auth/test-token")?).await
	}

	/// Refreshes the access token now, joining a refresh that is already running.
	pub async fn refresh(&self) -> Result<TokenSecret> {
		let generation = self.session().snapshot().await?.generation;
		let token = self
			.session()
			.recover(generation, |refresh_token| self.call_refresh(refresh_token))
			.await?;

		Ok(token)
	}

	/// Ends the session and removes the stored tokens.
	pub async fn logout(&self) -> Result<()> {
		const OPERATION: Operation = Operation::Logout;

		let span = OperationSpan::new(OPERATION, "logout");

		obs::record_outcome(OPERATION, Outcome::Attempt);

		let result = span.instrument(self.session().logout()).await;

		obs::record_result(OPERATION, result)
	}

	/// Returns `true` when an access token is stored.
	pub async fn is_authenticated(&self) -> Result<bool> {
		Ok(self.session().snapshot().await?.access_token.is_some())
	}

	/// Expiry of the stored access token, read from its payload without verification.
	///
	/// Returns `None` when no token is stored or the token carries no readable expiry.
	pub async fn access_expires_at(&self) -> Result<Option<OffsetDateTime>> {
		let snapshot = self.session().snapshot().await?;

		Ok(snapshot
			.access_token
			.and_then(|token| AccessClaims::peek(&token).ok())
			.and_then(|claims| claims.expires_at()))
	}

	/// Confirms the stored session against `/auth/me`.
	///
	/// Returns `Ok(None)` for anonymous sessions. When the API rejects the session the client
	/// logs out and also returns `Ok(None)`; transport failures are returned unchanged so an
	/// unreachable backend does not end the session.
	pub async fn check_auth(&self) -> Result<Option<CurrentUser>> {
		if !self.is_authenticated().await? {
			return Ok(None);
		}

		match self.current_user().await {
			Ok(user) => Ok(Some(user)),
			Err(Error::Api(_) | Error::Decode(_) | Error::SessionExpired(_)) => {
				self.logout().await?;

				Ok(None)
			},
			Err(e) => Err(e),
		}
	}
}
