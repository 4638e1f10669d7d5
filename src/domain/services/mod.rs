pub mod attendance_engine;
pub mod attendance_validation;
pub mod authorization;
pub mod calendar;
pub mod registration;
pub mod session_codec;
