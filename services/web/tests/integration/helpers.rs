use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::Utc;
use uuid::Uuid;

use paddock_auth_types::cookie::DEFAULT_SESSION_COOKIE;
use paddock_auth_types::token::SessionJwtVerifier;
use paddock_domain::id::{ExternalId, FarmId, HorseId, UserId};
use paddock_web::domain::provider::{
    CredentialKind, MagicLinkProvider, ProviderError, ProviderSession,
};
use paddock_web::domain::repository::{FarmRepository, HorseRepository, Store, UserRepository};
use paddock_web::domain::types::{Farm, Horse, User};
use paddock_web::error::WebError;
use paddock_web::router::build_router;
use paddock_web::state::{AppState, SessionSettings};

pub const TEST_JWT_SECRET: &str = "test-session-jwt-secret";

// ── MockStore ────────────────────────────────────────────────────────────────

/// In-memory store. Clones share the same tables.
#[derive(Clone, Default)]
pub struct MockStore {
    pub users: Arc<Mutex<Vec<User>>>,
    pub farms: Arc<Mutex<Vec<Farm>>>,
    pub horses: Arc<Mutex<Vec<Horse>>>,
    /// Every upsert fails with an internal error while set.
    pub fail_upsert: Arc<AtomicBool>,
    /// Every user lookup fails with an internal error while set.
    pub fail_user_lookup: Arc<AtomicBool>,
}

impl MockStore {
    pub fn with_users(users: Vec<User>) -> Self {
        let store = Self::default();
        *store.users.lock().unwrap() = users;
        store
    }

    pub fn user(&self, external_id: &str) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.external_id.as_str() == external_id)
            .cloned()
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn farm_count(&self) -> usize {
        self.farms.lock().unwrap().len()
    }

    /// Insert a farm owned by `user_id` and point the user at it.
    pub fn seed_farm(&self, user_id: UserId, name: &str) -> Farm {
        let farm = Farm {
            id: FarmId(Uuid::new_v4()),
            name: name.to_owned(),
            owner_id: user_id,
            created_at: Utc::now(),
        };
        self.farms.lock().unwrap().push(farm.clone());
        if let Some(u) = self
            .users
            .lock()
            .unwrap()
            .iter_mut()
            .find(|u| u.id == user_id)
        {
            u.farm_id = Some(farm.id);
        }
        farm
    }
}

impl Store for MockStore {
    type Users = MockUserRepo;
    type Farms = MockFarmRepo;
    type Horses = MockHorseRepo;

    fn user_repo(&self) -> MockUserRepo {
        MockUserRepo {
            store: self.clone(),
        }
    }

    fn farm_repo(&self) -> MockFarmRepo {
        MockFarmRepo {
            store: self.clone(),
        }
    }

    fn horse_repo(&self) -> MockHorseRepo {
        MockHorseRepo {
            store: self.clone(),
        }
    }

    async fn ping(&self) -> Result<(), WebError> {
        Ok(())
    }
}

// ── MockUserRepo ─────────────────────────────────────────────────────────────

pub struct MockUserRepo {
    pub store: MockStore,
}

impl MockUserRepo {
    fn check_lookup(&self) -> Result<(), WebError> {
        if self.store.fail_user_lookup.load(Ordering::SeqCst) {
            return Err(WebError::Internal(anyhow::anyhow!("connection refused")));
        }
        Ok(())
    }
}

impl UserRepository for MockUserRepo {
    async fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<User>, WebError> {
        self.check_lookup()?;
        Ok(self.store.user(external_id.as_str()))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, WebError> {
        self.check_lookup()?;
        Ok(self
            .store
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn upsert(
        &self,
        external_id: &ExternalId,
        name: &str,
        email: &str,
    ) -> Result<User, WebError> {
        if self.store.fail_upsert.load(Ordering::SeqCst) {
            return Err(WebError::Internal(anyhow::anyhow!("upsert user: db down")));
        }
        let now = Utc::now();
        let mut users = self.store.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| &u.external_id == external_id) {
            user.name = name.to_owned();
            user.email = email.to_owned();
            user.updated_at = now;
            return Ok(user.clone());
        }
        let user = User {
            id: UserId(Uuid::new_v4()),
            external_id: external_id.clone(),
            name: name.to_owned(),
            email: email.to_owned(),
            farm_id: None,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn update_profile(
        &self,
        id: UserId,
        name: &str,
        email: &str,
    ) -> Result<Option<User>, WebError> {
        let mut users = self.store.users.lock().unwrap();
        Ok(users.iter_mut().find(|u| u.id == id).map(|user| {
            user.name = name.to_owned();
            user.email = email.to_owned();
            user.updated_at = Utc::now();
            user.clone()
        }))
    }
}

// ── MockFarmRepo ─────────────────────────────────────────────────────────────

pub struct MockFarmRepo {
    pub store: MockStore,
}

impl FarmRepository for MockFarmRepo {
    async fn find_by_id(&self, id: FarmId) -> Result<Option<Farm>, WebError> {
        Ok(self
            .store
            .farms
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.id == id)
            .cloned())
    }

    async fn create_or_attach(&self, name: &str, user_id: UserId) -> Result<Farm, WebError> {
        // Both tables locked for the whole operation, like the transaction.
        let mut users = self.store.users.lock().unwrap();
        let mut farms = self.store.farms.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(WebError::UserNotFound)?;
        if let Some(farm) = user
            .farm_id
            .and_then(|id| farms.iter().find(|f| f.id == id))
        {
            return Ok(farm.clone());
        }
        let farm = Farm {
            id: FarmId(Uuid::new_v4()),
            name: name.to_owned(),
            owner_id: user_id,
            created_at: Utc::now(),
        };
        farms.push(farm.clone());
        user.farm_id = Some(farm.id);
        Ok(farm)
    }
}

// ── MockHorseRepo ────────────────────────────────────────────────────────────

pub struct MockHorseRepo {
    pub store: MockStore,
}

impl HorseRepository for MockHorseRepo {
    async fn list_by_farm(&self, farm_id: FarmId) -> Result<Vec<Horse>, WebError> {
        let mut horses: Vec<Horse> = self
            .store
            .horses
            .lock()
            .unwrap()
            .iter()
            .filter(|h| h.farm_id == farm_id)
            .cloned()
            .collect();
        horses.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(horses)
    }

    async fn find(&self, farm_id: FarmId, id: HorseId) -> Result<Option<Horse>, WebError> {
        Ok(self
            .store
            .horses
            .lock()
            .unwrap()
            .iter()
            .find(|h| h.farm_id == farm_id && h.id == id)
            .cloned())
    }

    async fn create(&self, horse: &Horse) -> Result<(), WebError> {
        self.store.horses.lock().unwrap().push(horse.clone());
        Ok(())
    }

    async fn delete(&self, farm_id: FarmId, id: HorseId) -> Result<bool, WebError> {
        let mut horses = self.store.horses.lock().unwrap();
        let before = horses.len();
        horses.retain(|h| !(h.farm_id == farm_id && h.id == id));
        Ok(horses.len() < before)
    }
}

// ── FakeProvider ─────────────────────────────────────────────────────────────

/// Scripted magic-link provider.
///
/// - `send_login_link` maps emails to external ids (`ext-<n>` for new emails)
/// - callback tokens registered with `add_callback_token` exchange once
/// - sessions validate while known; each validation issues a rotated credential
#[derive(Default)]
pub struct FakeProvider {
    pub identities: Mutex<HashMap<String, ExternalId>>,
    pub callback_tokens: Mutex<HashMap<String, ExternalId>>,
    pub sessions: Mutex<HashMap<String, ExternalId>>,
    pub sent: Mutex<Vec<(String, Option<String>)>>,
    pub revoked: Mutex<Vec<String>>,
    pub validations: AtomicUsize,
    pub rotations: AtomicUsize,
    pub fail_send: AtomicBool,
    pub fail_validate: AtomicBool,
    pub fail_revoke: AtomicBool,
    /// Validation never completes while set.
    pub hang_validate: AtomicBool,
}

impl FakeProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_identity(&self, email: &str, external_id: &str) {
        self.identities
            .lock()
            .unwrap()
            .insert(email.to_owned(), ExternalId::from(external_id));
    }

    pub fn add_callback_token(&self, token: &str, external_id: &str) {
        self.callback_tokens
            .lock()
            .unwrap()
            .insert(token.to_owned(), ExternalId::from(external_id));
    }

    pub fn add_session(&self, credential: &str, external_id: &str) {
        self.sessions
            .lock()
            .unwrap()
            .insert(credential.to_owned(), ExternalId::from(external_id));
    }

    pub fn is_session(&self, credential: &str) -> bool {
        self.sessions.lock().unwrap().contains_key(credential)
    }

    fn mint_session(&self, external_id: ExternalId) -> ProviderSession {
        let n = self.rotations.fetch_add(1, Ordering::SeqCst);
        let token = format!("session-{}-{n}", external_id.as_str());
        self.sessions
            .lock()
            .unwrap()
            .insert(token.clone(), external_id.clone());
        ProviderSession {
            external_id,
            session_token: token,
            session_jwt: String::new(),
        }
    }
}

#[async_trait]
impl MagicLinkProvider for FakeProvider {
    async fn send_login_link(
        &self,
        email: &str,
        next: Option<&str>,
    ) -> Result<ExternalId, ProviderError> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(ProviderError::Upstream { status: 503 });
        }
        self.sent
            .lock()
            .unwrap()
            .push((email.to_owned(), next.map(str::to_owned)));
        let mut identities = self.identities.lock().unwrap();
        let next_id = format!("ext-{}", identities.len() + 1);
        Ok(identities
            .entry(email.to_owned())
            .or_insert_with(|| ExternalId::from(next_id))
            .clone())
    }

    async fn exchange_callback_token(&self, token: &str) -> Result<ProviderSession, ProviderError> {
        let external_id = self
            .callback_tokens
            .lock()
            .unwrap()
            .remove(token)
            .ok_or(ProviderError::Rejected)?;
        Ok(self.mint_session(external_id))
    }

    async fn validate_session(&self, credential: &str) -> Result<ProviderSession, ProviderError> {
        self.validations.fetch_add(1, Ordering::SeqCst);
        if self.hang_validate.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail_validate.load(Ordering::SeqCst) {
            return Err(ProviderError::Transport("connection reset".to_owned()));
        }
        let external_id = self
            .sessions
            .lock()
            .unwrap()
            .get(credential)
            .cloned()
            .ok_or(ProviderError::Rejected)?;
        Ok(self.mint_session(external_id))
    }

    async fn revoke_session(&self, credential: &str) -> Result<(), ProviderError> {
        self.revoked.lock().unwrap().push(credential.to_owned());
        if self.fail_revoke.load(Ordering::SeqCst) {
            return Err(ProviderError::Timeout);
        }
        self.sessions.lock().unwrap().remove(credential);
        Ok(())
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn test_user(external_id: &str) -> User {
    let now = Utc::now();
    User {
        id: UserId(Uuid::new_v4()),
        external_id: ExternalId::from(external_id),
        name: "Ana".to_owned(),
        email: "ana@example.com".to_owned(),
        farm_id: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn session_settings(verifier: Option<SessionJwtVerifier>) -> SessionSettings {
    SessionSettings {
        cookie_name: DEFAULT_SESSION_COOKIE.to_owned(),
        credential_kind: CredentialKind::Token,
        trust_forwarded_proto: true,
        verifier,
    }
}

pub fn test_state(store: MockStore, provider: Arc<FakeProvider>) -> AppState<MockStore> {
    AppState {
        store,
        provider,
        session: Arc::new(session_settings(None)),
    }
}

pub fn test_server(store: MockStore, provider: Arc<FakeProvider>) -> TestServer {
    test_server_with_timeout(store, provider, Duration::from_secs(10))
}

pub fn test_server_with_timeout(
    store: MockStore,
    provider: Arc<FakeProvider>,
    request_timeout: Duration,
) -> TestServer {
    let router = build_router(test_state(store, provider), request_timeout);
    TestServer::new(router).unwrap()
}
