//! The reauthentication policy: one bounded login-and-retry cycle per call.

use std::future::Future;

use crate::api::credentials::{bearer_token_from_env, CredentialSource};
use crate::api::dispatch::ProtocolDispatcher;
use crate::api::error::ApiError;
use crate::api::session::SessionManager;
use crate::api::types::Session;
use crate::config::{Config, SessionRecord, SessionStore};

/// Everything an operation needs to talk to the service while
/// authenticated. Owned clones, so the operation future borrows nothing
/// from the client and can be retried after a re-login swapped the session.
pub struct AuthedContext {
    pub dispatcher: ProtocolDispatcher,
    pub session: Session,
}

/// Client facade: wires the dispatcher, session manager, session store and
/// credential source together and enforces the retry policy.
pub struct ApiClient {
    dispatcher: ProtocolDispatcher,
    session: SessionManager,
    store: SessionStore,
    credentials: Box<dyn CredentialSource>,
}

impl ApiClient {
    /// Build a client, restoring any session an external collaborator left
    /// behind: the `TROLLEY_TOKEN` environment override wins, then the
    /// persisted record. A restored session is not validated against the
    /// backend; validation is deferred to first use.
    pub fn new(
        config: &Config,
        store: SessionStore,
        credentials: Box<dyn CredentialSource>,
    ) -> Self {
        let dispatcher = ProtocolDispatcher::new(config.endpoints.clone(), &config.client);
        let mut session = SessionManager::new(config.client.client_id.clone());

        if let Some(token) = bearer_token_from_env() {
            tracing::debug!("using bearer token from environment");
            session.restore(Session::from_bearer_token(token));
        } else {
            match store.load() {
                Ok(Some(record)) => {
                    if let Some(restored) = record.into_session() {
                        tracing::debug!("restored persisted session");
                        session.restore(restored);
                    }
                }
                Ok(None) => {}
                Err(err) => tracing::warn!(%err, "failed to load persisted session"),
            }
        }

        Self {
            dispatcher,
            session,
            store,
            credentials,
        }
    }

    /// Run `op` with a valid session, re-authenticating at most once.
    ///
    /// - Unauthenticated: resolve credentials and log in first; no
    ///   credentials anywhere is a terminal `NotAuthenticated`.
    /// - An auth-shaped failure (401 transport, unauthenticated protocol
    ///   error) on the first attempt triggers exactly one fresh login and
    ///   one retry; the retry's failure is terminal, wrapped in
    ///   `ReauthenticationFailed`.
    /// - Any other failure surfaces unmodified with zero retries.
    pub async fn run_with_auth<T, F, Fut>(&mut self, op: F) -> Result<T, ApiError>
    where
        F: Fn(AuthedContext) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        if !self.session.is_authenticated() {
            self.login_with_resolved_credentials().await?;
        }

        match op(self.authed_context()?).await {
            Ok(value) => Ok(value),
            Err(err) if err.is_auth_failure() => {
                tracing::info!(%err, "authentication failure, logging in again");
                self.login_with_resolved_credentials()
                    .await
                    .map_err(|login_err| ApiError::ReauthenticationFailed {
                        source: Box::new(login_err),
                    })?;
                op(self.authed_context()?)
                    .await
                    .map_err(|retry_err| ApiError::ReauthenticationFailed {
                        source: Box::new(retry_err),
                    })
            }
            Err(err) => Err(err),
        }
    }

    /// Explicit login for the `login` command. Resolves credentials, logs
    /// in, persists the session, and returns a copy.
    pub async fn login(&mut self) -> Result<Session, ApiError> {
        self.login_with_resolved_credentials().await?;
        self.authed_context().map(|ctx| ctx.session)
    }

    /// Best-effort server-side invalidation, then clear local and persisted
    /// state unconditionally.
    pub async fn logout(&mut self) {
        self.session.logout(&self.dispatcher).await;
        if let Err(err) = self.store.clear() {
            tracing::warn!(%err, "failed to clear persisted session");
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn current_session(&self) -> Option<&Session> {
        self.session.current()
    }

    /// Dispatcher handle for calls that may run anonymously (search/browse
    /// without a session) and therefore bypass the policy.
    pub fn dispatcher(&self) -> &ProtocolDispatcher {
        &self.dispatcher
    }

    async fn login_with_resolved_credentials(&mut self) -> Result<(), ApiError> {
        let creds = self
            .credentials
            .resolve()
            .ok_or(ApiError::NotAuthenticated)?;
        let session = self
            .session
            .login(&self.dispatcher, &creds.username, creds.password.expose())
            .await?;
        // Persistence is the store's concern; its failure never fails a login.
        if let Err(err) = self
            .store
            .save(&SessionRecord::from_session(&session, &creds.username))
        {
            tracing::warn!(%err, "failed to persist session");
        }
        Ok(())
    }

    fn authed_context(&self) -> Result<AuthedContext, ApiError> {
        let session = self.session.current().ok_or(ApiError::NotAuthenticated)?;
        Ok(AuthedContext {
            dispatcher: self.dispatcher.clone(),
            session: session.clone(),
        })
    }
}
