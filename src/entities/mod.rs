pub mod prelude;

pub mod activities;
pub mod app_settings;
pub mod checklists;
pub mod columns;
pub mod comments;
pub mod refresh_tokens;
pub mod tasks;
pub mod users;
