use std::sync::Arc;
use crate::config::Config;
use crate::domain::ports::{
    AiBackend, AttendanceRepository, ClassRepository, CoachRepository, ManagementRepository,
    MarksRepository, ObjectStorage, StudentRepository, UserRepository,
};
use crate::domain::services::{attendance_engine::AttendanceEngine, registration::RegistrationService};

/// Storage-side ports for one backend.
#[derive(Clone)]
pub struct Repositories {
    pub management_repo: Arc<dyn ManagementRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub coach_repo: Arc<dyn CoachRepository>,
    pub class_repo: Arc<dyn ClassRepository>,
    pub student_repo: Arc<dyn StudentRepository>,
    pub attendance_repo: Arc<dyn AttendanceRepository>,
    pub marks_repo: Arc<dyn MarksRepository>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub management_repo: Arc<dyn ManagementRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub coach_repo: Arc<dyn CoachRepository>,
    pub class_repo: Arc<dyn ClassRepository>,
    pub student_repo: Arc<dyn StudentRepository>,
    pub attendance_repo: Arc<dyn AttendanceRepository>,
    pub marks_repo: Arc<dyn MarksRepository>,
    pub attendance_engine: Arc<AttendanceEngine>,
    pub registration: Arc<RegistrationService>,
    pub ai_backend: Arc<dyn AiBackend>,
    pub object_storage: Arc<dyn ObjectStorage>,
}

impl AppState {
    pub fn assemble(
        config: Config,
        repos: Repositories,
        ai_backend: Arc<dyn AiBackend>,
        object_storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        let attendance_engine = Arc::new(AttendanceEngine::new(
            repos.attendance_repo.clone(),
            repos.student_repo.clone(),
        ));
        let registration = Arc::new(RegistrationService::new(
            repos.management_repo.clone(),
            repos.user_repo.clone(),
            repos.coach_repo.clone(),
        ));

        Self {
            config,
            management_repo: repos.management_repo,
            user_repo: repos.user_repo,
            coach_repo: repos.coach_repo,
            class_repo: repos.class_repo,
            student_repo: repos.student_repo,
            attendance_repo: repos.attendance_repo,
            marks_repo: repos.marks_repo,
            attendance_engine,
            registration,
            ai_backend,
            object_storage,
        }
    }
}
