pub mod ai;
pub mod attendance;
pub mod auth;
pub mod classes;
pub mod coaches;
pub mod health;
pub mod management;
pub mod marks;
pub mod students;
pub mod upload;
pub mod users;
