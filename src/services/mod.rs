pub mod activity_ledger;
pub use activity_ledger::{ActivityLedger, ActivityRecorder, SeaOrmActivityRecorder};

pub mod board_error;
pub use board_error::BoardError;

pub mod token;
pub use token::{TokenIssuer, TokenKind};

pub mod scheduler;
pub use scheduler::Scheduler;

pub mod task_service;
pub mod task_service_impl;
pub use task_service::{CreateTaskInput, TaskService};
pub use task_service_impl::SeaOrmTaskService;

pub mod column_service;
pub mod column_service_impl;
pub use column_service::{ColumnOrder, ColumnService};
pub use column_service_impl::SeaOrmColumnService;

pub mod comment_service;
pub mod comment_service_impl;
pub use comment_service::CommentService;
pub use comment_service_impl::SeaOrmCommentService;

pub mod checklist_service;
pub mod checklist_service_impl;
pub use checklist_service::ChecklistService;
pub use checklist_service_impl::SeaOrmChecklistService;

pub mod activity_service;
pub mod activity_service_impl;
pub use activity_service::ActivityService;
pub use activity_service_impl::SeaOrmActivityService;

pub mod settings_service;
pub mod settings_service_impl;
pub use settings_service::SettingsService;
pub use settings_service_impl::SeaOrmSettingsService;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, RootUserInput, Session, TokenPair};
pub use auth_service_impl::SeaOrmAuthService;

pub mod user_service;
pub mod user_service_impl;
pub use user_service::UserService;
pub use user_service_impl::SeaOrmUserService;
