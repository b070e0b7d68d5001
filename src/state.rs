use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    ActivityLedger, ActivityService, AuthService, ChecklistService, ColumnService, CommentService,
    SeaOrmActivityService, SeaOrmAuthService, SeaOrmChecklistService, SeaOrmColumnService,
    SeaOrmCommentService, SeaOrmSettingsService, SeaOrmTaskService, SeaOrmUserService,
    SettingsService, TaskService, TokenIssuer, UserService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub tokens: TokenIssuer,

    pub ledger: ActivityLedger,

    pub task_service: Arc<dyn TaskService>,

    pub column_service: Arc<dyn ColumnService>,

    pub comment_service: Arc<dyn CommentService>,

    pub checklist_service: Arc<dyn ChecklistService>,

    pub activity_service: Arc<dyn ActivityService>,

    pub settings_service: Arc<dyn SettingsService>,

    pub auth_service: Arc<dyn AuthService>,

    pub user_service: Arc<dyn UserService>,
}

impl SharedState {
    /// Opens (and migrates) the configured database, then wires every service.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let ledger = ActivityLedger::for_store(store.clone());
        Ok(Self::with_store(config, store, ledger))
    }

    /// Wires services over an already opened store and a caller-supplied ledger.
    #[must_use]
    pub fn with_store(config: Config, store: Store, ledger: ActivityLedger) -> Self {
        let tokens = TokenIssuer::from_config(&config.security);

        let task_service =
            Arc::new(SeaOrmTaskService::new(store.clone(), ledger.clone())) as Arc<dyn TaskService>;

        let column_service = Arc::new(SeaOrmColumnService::new(store.clone(), ledger.clone()))
            as Arc<dyn ColumnService>;

        let comment_service = Arc::new(SeaOrmCommentService::new(store.clone(), ledger.clone()))
            as Arc<dyn CommentService>;

        let checklist_service =
            Arc::new(SeaOrmChecklistService::new(store.clone())) as Arc<dyn ChecklistService>;

        let activity_service =
            Arc::new(SeaOrmActivityService::new(store.clone())) as Arc<dyn ActivityService>;

        let settings_service =
            Arc::new(SeaOrmSettingsService::new(store.clone())) as Arc<dyn SettingsService>;

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            tokens.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService>;

        let user_service = Arc::new(SeaOrmUserService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn UserService>;

        Self {
            config: Arc::new(config),
            store,
            tokens,
            ledger,
            task_service,
            column_service,
            comment_service,
            checklist_service,
            activity_service,
            settings_service,
            auth_service,
            user_service,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}
