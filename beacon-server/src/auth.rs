use async_trait::async_trait;
use beacon_core::model::UserId;
use dashmap::DashMap;
use uuid::Uuid;

/// Seam between the HTTP layer and whatever issues identities.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Mint a new identity and the bearer token that proves it.
    async fn create_session(&self, display_name: String) -> (UserId, String);

    /// Resolve a bearer token to its user, `None` when unknown.
    async fn resolve(&self, token: &str) -> Option<UserId>;

    async fn display_name(&self, user: &UserId) -> Option<String>;
}

/// Token registry kept in memory. Tokens are opaque random strings with
/// no expiry; a restart forgets every session.
pub struct TokenAuth {
    tokens: DashMap<String, UserId>,
    names: DashMap<UserId, String>,
}

impl TokenAuth {
    pub fn new() -> Self {
        Self {
            tokens: DashMap::new(),
            names: DashMap::new(),
        }
    }
}

impl Default for TokenAuth {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthProvider for TokenAuth {
    async fn create_session(&self, display_name: String) -> (UserId, String) {
        let user = UserId::new();
        let token = Uuid::new_v4().simple().to_string();

        self.tokens.insert(token.clone(), user.clone());
        self.names.insert(user.clone(), display_name);

        (user, token)
    }

    async fn resolve(&self, token: &str) -> Option<UserId> {
        self.tokens.get(token).map(|u| u.clone())
    }

    async fn display_name(&self, user: &UserId) -> Option<String> {
        self.names.get(user).map(|n| n.clone())
    }
}
