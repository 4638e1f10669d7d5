pub mod sqlite_management_repo;
pub mod sqlite_user_repo;
pub mod sqlite_coach_repo;
pub mod sqlite_class_repo;
pub mod sqlite_student_repo;
pub mod sqlite_attendance_repo;
pub mod sqlite_marks_repo;

pub mod postgres_management_repo;
pub mod postgres_user_repo;
pub mod postgres_coach_repo;
pub mod postgres_class_repo;
pub mod postgres_student_repo;
pub mod postgres_attendance_repo;
pub mod postgres_marks_repo;
