pub mod attendance;
pub mod class;
pub mod coach;
pub mod management;
pub mod marks;
pub mod session;
pub mod student;
pub mod user;
