//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{CommentRepository, PostRepository, TokenService, UserRepository};
use quill_core::services::{CommentService, PostService, UserService};
use quill_infra::InMemoryStore;

#[cfg(feature = "postgres")]
use quill_infra::DatabaseConnections;
#[cfg(feature = "postgres")]
use quill_infra::database::{
    PostgresCommentRepository, PostgresPostRepository, PostgresUserRepository,
};

use crate::config::{AppConfig, AuthMode};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub users: Arc<UserService>,
    pub auth_mode: AuthMode,
    /// Present when the server verifies session tokens.
    pub tokens: Option<Arc<dyn TokenService>>,
    #[cfg(feature = "postgres")]
    pub db: Option<Arc<DatabaseConnections>>,
}

/// The three repository ports, backed by one store.
struct Stores {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    users: Arc<dyn UserRepository>,
}

impl Stores {
    fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            posts: store.clone(),
            comments: store.clone(),
            users: store,
        }
    }
}

impl AppState {
    /// Open the configured store and wire the services around it.
    pub async fn build(config: &AppConfig) -> anyhow::Result<Self> {
        let tokens = session_tokens(config.auth_mode)?;

        #[cfg(feature = "postgres")]
        if let Some(db_config) = &config.database {
            let connections = DatabaseConnections::init(db_config).await?;
            let stores = Stores {
                posts: Arc::new(PostgresPostRepository::new(connections.main.clone())),
                comments: Arc::new(PostgresCommentRepository::new(connections.main.clone())),
                users: Arc::new(PostgresUserRepository::new(connections.main.clone())),
            };
            let mut state = Self::from_stores(stores, config.auth_mode, tokens);
            state.db = Some(Arc::new(connections));
            tracing::info!("Application state initialized (postgres)");
            return Ok(state);
        }

        #[cfg(not(feature = "postgres"))]
        if config.database.is_some() {
            anyhow::bail!("DATABASE_URL is set but the server was built without the postgres feature");
        }

        tracing::warn!("DATABASE_URL not set. Running with the in-memory store; data is lost on restart.");
        Ok(Self::from_stores(Stores::in_memory(), config.auth_mode, tokens))
    }

    /// State over a fresh in-memory store.
    #[cfg(test)]
    pub fn in_memory(auth_mode: AuthMode, tokens: Option<Arc<dyn TokenService>>) -> Self {
        Self::from_stores(Stores::in_memory(), auth_mode, tokens)
    }

    fn from_stores(
        stores: Stores,
        auth_mode: AuthMode,
        tokens: Option<Arc<dyn TokenService>>,
    ) -> Self {
        Self {
            posts: Arc::new(PostService::new(stores.posts.clone(), stores.comments.clone())),
            comments: Arc::new(CommentService::new(
                stores.comments.clone(),
                stores.posts.clone(),
            )),
            users: Arc::new(UserService::new(stores.users, stores.posts, stores.comments)),
            auth_mode,
            tokens,
            #[cfg(feature = "postgres")]
            db: None,
        }
    }

    /// Name of the backing store, for the health check.
    pub fn store_name(&self) -> &'static str {
        #[cfg(feature = "postgres")]
        if self.db.is_some() {
            return "postgres";
        }
        "memory"
    }

    /// Check that the store is reachable.
    pub async fn ping_store(&self) -> Result<(), String> {
        #[cfg(feature = "postgres")]
        if let Some(db) = &self.db {
            return db.ping().await.map_err(|e| e.to_string());
        }
        Ok(())
    }

    /// Release the store handle. Called once after the HTTP server stops.
    pub async fn close(self) {
        #[cfg(feature = "postgres")]
        if let Some(db) = &self.db {
            if let Err(e) = db.close().await {
                tracing::error!("Failed to close database connection: {}", e);
            }
        }
        tracing::info!("Store closed");
    }
}

#[cfg(feature = "auth")]
fn session_tokens(mode: AuthMode) -> anyhow::Result<Option<Arc<dyn TokenService>>> {
    use quill_infra::{JwtConfig, JwtTokenService};

    Ok(match mode {
        AuthMode::Client => None,
        AuthMode::Session => {
            let service: Arc<dyn TokenService> =
                Arc::new(JwtTokenService::new(JwtConfig::from_env()));
            Some(service)
        }
    })
}

#[cfg(not(feature = "auth"))]
fn session_tokens(mode: AuthMode) -> anyhow::Result<Option<Arc<dyn TokenService>>> {
    match mode {
        AuthMode::Client => Ok(None),
        AuthMode::Session => {
            anyhow::bail!("AUTH_MODE=session requires the server to be built with the auth feature")
        }
    }
}
