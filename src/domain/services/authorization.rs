use crate::domain::models::{class::ClassRecord, coach::Coach, session::Session, user::Role};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NoSession,
    OtherManagement,
    ClassHasNoCoach,
    NotAssignedCoach,
}

impl DenyReason {
    pub fn message(&self) -> &'static str {
        match self {
            DenyReason::NoSession => "Unauthorized",
            DenyReason::OtherManagement => "Class belongs to a different management.",
            DenyReason::ClassHasNoCoach => "Only admins can update attendance for classes without assigned coaches.",
            DenyReason::NotAssignedCoach => "You are not the assigned coach for this class.",
        }
    }
}

impl From<DenyReason> for AppError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::NoSession => AppError::Unauthorized,
            other => AppError::Forbidden(other.message().to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceDecision {
    Allow,
    Deny(DenyReason),
}

impl AttendanceDecision {
    pub fn into_result(self) -> Result<(), AppError> {
        match self {
            AttendanceDecision::Allow => Ok(()),
            AttendanceDecision::Deny(reason) => Err(reason.into()),
        }
    }
}

/// Decides whether the caller may write attendance for `class`.
///
/// `caller_coach` is the coach record whose email matches the session, looked up within the
/// session's management by the caller. Only coach-role sessions may use it.
pub fn can_write_attendance(
    session: Option<&Session>,
    class: &ClassRecord,
    caller_coach: Option<&Coach>,
) -> AttendanceDecision {
    let Some(session) = session else {
        return AttendanceDecision::Deny(DenyReason::NoSession);
    };

    if session.management_id != class.management_id {
        return AttendanceDecision::Deny(DenyReason::OtherManagement);
    }

    if session.role == Role::Admin {
        return AttendanceDecision::Allow;
    }

    let Some(class_coach_id) = class.coach_id.as_deref().filter(|id| !id.is_empty()) else {
        return AttendanceDecision::Deny(DenyReason::ClassHasNoCoach);
    };

    match caller_coach {
        Some(coach)
            if session.role == Role::Coach
                && coach.email.eq_ignore_ascii_case(&session.email)
                && coach.management_id == session.management_id
                && coach.coach_id == class_coach_id =>
        {
            AttendanceDecision::Allow
        }
        _ => AttendanceDecision::Deny(DenyReason::NotAssignedCoach),
    }
}

/// Read access to a class's students, marks and attendance: admins see everything in their
/// management, coaches only the classes assigned to them.
pub fn can_view_class(session: &Session, class: &ClassRecord, caller_coach: Option<&Coach>) -> bool {
    if session.management_id != class.management_id {
        return false;
    }
    match session.role {
        Role::Admin => true,
        Role::Coach => match (caller_coach, class.coach_id.as_deref()) {
            (Some(coach), Some(class_coach)) => coach.coach_id == class_coach,
            _ => false,
        },
        Role::Student => false,
    }
}

pub fn require_session(session: Option<Session>) -> Result<Session, AppError> {
    session.ok_or(AppError::Unauthorized)
}

pub fn require_admin(session: &Session) -> Result<(), AppError> {
    if session.role == Role::Admin {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin access required".into()))
    }
}

pub fn require_staff(session: &Session) -> Result<(), AppError> {
    match session.role {
        Role::Admin | Role::Coach => Ok(()),
        Role::Student => Err(AppError::Forbidden("Admin or coach access required".into())),
    }
}
