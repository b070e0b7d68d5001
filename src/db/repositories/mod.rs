pub mod activity;
pub mod checklist;
pub mod column;
pub mod comment;
pub mod refresh_token;
pub mod settings;
pub mod task;
pub mod user;
