//! Store and guard wiring shared by every handler.

use std::sync::Arc;

use chrono::Duration;

use fixit_auth::{GuardChain, IdentityStore, JwtIssuer, JwtVerifier, SigningConfig, TokenVerifier};
use fixit_core::StoreError;
use fixit_infra::config::MediaConfig;
use fixit_infra::{
    db, AppConfig, FsMediaStore, InMemoryIssueStore, InMemoryMediaStore, InMemoryUserStore, IssueStore,
    MediaStore, PostgresIssueStore, PostgresUserStore, UserStore,
};

pub struct AppServices {
    pub users: Arc<dyn UserStore>,
    pub issues: Arc<dyn IssueStore>,
    pub media: Arc<dyn MediaStore>,
    pub guard: GuardChain,
    pub issuer: JwtIssuer,
}

impl AppServices {
    /// Wire the guard chain over `users`; the same store backs registration
    /// and login.
    pub fn new<U>(
        signing: &SigningConfig,
        token_ttl: Duration,
        users: Arc<U>,
        issues: Arc<dyn IssueStore>,
        media: Arc<dyn MediaStore>,
    ) -> Self
    where
        U: UserStore + 'static,
    {
        let verifier: Arc<dyn TokenVerifier> = Arc::new(JwtVerifier::new(signing));
        let identities: Arc<dyn IdentityStore> = users.clone();

        Self {
            users,
            issues,
            media,
            guard: GuardChain::new(verifier, identities),
            issuer: JwtIssuer::new(signing, token_ttl),
        }
    }

    /// Fully in-memory wiring (dev and tests).
    pub fn in_memory(signing: &SigningConfig, token_ttl: Duration) -> Self {
        Self::new(
            signing,
            token_ttl,
            Arc::new(InMemoryUserStore::new()),
            Arc::new(InMemoryIssueStore::new()),
            Arc::new(InMemoryMediaStore::new()),
        )
    }
}

/// Build services from configuration: Postgres when `DATABASE_URL` is set,
/// in-memory stores otherwise.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, StoreError> {
    let media: Arc<dyn MediaStore> = match &config.media {
        MediaConfig::InMemory => Arc::new(InMemoryMediaStore::new()),
        MediaConfig::Filesystem { root, base_url } => {
            Arc::new(FsMediaStore::new(root.clone(), base_url.clone()))
        }
    };

    match &config.database_url {
        Some(url) => {
            let pool = db::connect(url).await?;
            db::ensure_schema(&pool).await?;
            tracing::info!("using postgres stores");

            Ok(AppServices::new(
                &config.signing,
                config.token_ttl,
                Arc::new(PostgresUserStore::new(pool.clone())),
                Arc::new(PostgresIssueStore::new(pool)),
                media,
            ))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory stores");

            Ok(AppServices::new(
                &config.signing,
                config.token_ttl,
                Arc::new(InMemoryUserStore::new()),
                Arc::new(InMemoryIssueStore::new()),
                media,
            ))
        }
    }
}
