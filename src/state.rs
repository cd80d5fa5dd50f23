use std::sync::Arc;

use crate::auth::services::AuthCore;
use crate::auth::store::PostgresCredentialStore;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthCore,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let store = PostgresCredentialStore::connect(&config.db).await?;

        // Schema creation is idempotent, so rerunning on every boot is safe.
        if let Err(e) = sqlx::migrate!("./migrations").run(store.pool()).await {
            tracing::warn!(error = %e, "migration failed; continuing");
        }

        Ok(Self {
            auth: AuthCore::new(Arc::new(store)),
            config,
        })
    }

    pub fn fake() -> Self {
        use crate::auth::store::MemoryCredentialStore;
        use crate::config::{DbConfig, SessionConfig};

        let config = Arc::new(AppConfig {
            db: DbConfig {
                host: "localhost".into(),
                port: 5432,
                database: "vault".into(),
                user: "vault".into(),
                password: "vault".into(),
            },
            session: SessionConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
            },
        });

        Self {
            auth: AuthCore::new(Arc::new(MemoryCredentialStore::default())),
            config,
        }
    }
}
