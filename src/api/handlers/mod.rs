pub mod admin;
pub mod announcements;
pub mod auth;
pub mod directory;
pub mod messages;
pub mod payments;
pub mod root;
pub mod users;
