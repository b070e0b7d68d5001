pub use super::activities::Entity as Activities;
pub use super::app_settings::Entity as AppSettings;
pub use super::checklists::Entity as Checklists;
pub use super::columns::Entity as Columns;
pub use super::comments::Entity as Comments;
pub use super::refresh_tokens::Entity as RefreshTokens;
pub use super::tasks::Entity as Tasks;
pub use super::users::Entity as Users;
