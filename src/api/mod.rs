use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::SharedState;

mod activities;
pub mod auth;
mod checklists;
mod columns;
mod comments;
mod error;
mod health;
mod settings;
mod setup;
mod tasks;
mod types;
mod users;
mod validation;

pub use auth::RootActor;
pub use error::ApiError;
pub use types::*;

use crate::services::{
    ActivityService, AuthService, ChecklistService, ColumnService, CommentService,
    SettingsService, TaskService, UserService,
};

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        self.shared.config()
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn task_service(&self) -> &Arc<dyn TaskService> {
        &self.shared.task_service
    }

    #[must_use]
    pub fn column_service(&self) -> &Arc<dyn ColumnService> {
        &self.shared.column_service
    }

    #[must_use]
    pub fn comment_service(&self) -> &Arc<dyn CommentService> {
        &self.shared.comment_service
    }

    #[must_use]
    pub fn checklist_service(&self) -> &Arc<dyn ChecklistService> {
        &self.shared.checklist_service
    }

    #[must_use]
    pub fn activity_service(&self) -> &Arc<dyn ActivityService> {
        &self.shared.activity_service
    }

    #[must_use]
    pub fn settings_service(&self) -> &Arc<dyn SettingsService> {
        &self.shared.settings_service
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn user_service(&self) -> &Arc<dyn UserService> {
        &self.shared.user_service
    }
}

#[must_use]
pub fn create_app_state(shared: Arc<SharedState>) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
    })
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();
    let frontend_path = state.config().server.frontend_path.clone();

    let protected_routes = create_protected_router(state.clone());

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/health", get(health::health))
        .route("/setup/status", get(setup::status))
        .route("/setup/root-user", post(setup::create_root_user))
        .route("/setup/settings", get(setup::public_settings))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    let app = Router::new().nest("/api", api_router);

    let app = match frontend_path {
        Some(path) => {
            let index = Path::new(&path).join("index.html");
            app.fallback_service(ServeDir::new(&path).fallback(ServeFile::new(index)))
        }
        None => app.fallback(health::not_found),
    };

    app.layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/verify", get(auth::verify))
        .route(
            "/user/profile",
            get(auth::get_profile).put(auth::update_profile),
        )
        .route("/user/change-password", post(auth::change_password))
        .route("/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/tasks/{id}",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/tasks/{id}/move", post(tasks::move_task))
        .route(
            "/tasks/{id}/checklists",
            get(checklists::list_checklist).post(checklists::create_checklist_item),
        )
        .route(
            "/checklists/{id}",
            put(checklists::rename_checklist_item).delete(checklists::delete_checklist_item),
        )
        .route("/checklists/{id}/toggle", post(checklists::toggle_checklist_item))
        .route("/comments", post(comments::create_comment))
        .route("/comments/task/{task_id}", get(comments::list_comments))
        .route(
            "/comments/{id}",
            get(comments::get_comment)
                .put(comments::update_comment)
                .delete(comments::delete_comment),
        )
        .route("/activities", get(activities::recent_activities))
        .route("/activities/task/{task_id}", get(activities::task_activities))
        .route("/activities/{id}", get(activities::get_activity))
        .route(
            "/columns",
            get(columns::list_columns).post(columns::create_column),
        )
        .route("/columns/reorder", post(columns::reorder_columns))
        .route(
            "/columns/{id}",
            get(columns::get_column)
                .put(columns::update_column)
                .delete(columns::delete_column),
        )
        .route("/columns/{id}/archive", post(columns::archive_column))
        .route("/columns/{id}/unarchive", post(columns::unarchive_column))
        .route("/columns/{id}/move-tasks", post(columns::move_all_tasks))
        .route(
            "/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route("/users/search", get(users::search_users))
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/{id}", get(users::get_user).put(users::update_user))
        .route("/users/{id}/archive", post(users::archive_user))
        .route("/users/{id}/unarchive", post(users::unarchive_user))
        .route("/users/{id}/password", put(users::set_password))
        .route("/admin/tasks/{id}/force-update", put(tasks::force_update_task))
        .route("/admin/tasks/{id}", delete(tasks::force_delete_task))
        .route("/admin/activities/prune", post(activities::prune_activities))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
