use std::sync::Arc;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::{info, warn};
use crate::domain::models::{management::Management, user::{Role, User}};
use crate::domain::ports::{CoachRepository, ManagementRepository, UserRepository};
use crate::error::{is_unique_violation, AppError};

pub const MIN_PASSWORD_LEN: usize = 8;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::InternalWithMsg(format!("Password hashing failed: {}", e)))
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<(), AppError> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::InternalWithMsg("Stored password hash is malformed".into()))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized)
}

pub fn check_password_strength(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Lowercases and checks the shape `local@domain.tld`.
pub fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(email)
    } else {
        Err(AppError::Validation("A valid email address is required".into()))
    }
}

pub fn email_domain(email: &str) -> Option<&str> {
    email.split_once('@').map(|(_, domain)| domain)
}

#[derive(Debug)]
pub struct Registered {
    pub user: User,
    pub management: Management,
    pub role: Role,
}

/// Domain-based tenancy: the first user of an email domain creates its management and
/// becomes admin; later users join it as coach or student.
pub struct RegistrationService {
    managements: Arc<dyn ManagementRepository>,
    users: Arc<dyn UserRepository>,
    coaches: Arc<dyn CoachRepository>,
}

impl RegistrationService {
    pub fn new(
        managements: Arc<dyn ManagementRepository>,
        users: Arc<dyn UserRepository>,
        coaches: Arc<dyn CoachRepository>,
    ) -> Self {
        Self { managements, users, coaches }
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<Registered, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Name is required".into()));
        }
        let email = normalize_email(email)?;
        check_password_strength(password)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".into()));
        }

        let domain = email_domain(&email)
            .ok_or_else(|| AppError::Validation("A valid email address is required".into()))?
            .to_string();
        let password_hash = hash_password(password)?;

        if let Some(existing) = self.managements.find_by_domain(&domain).await? {
            return self.join(existing, email, name.to_string(), password_hash).await;
        }

        let management = Management::new(domain.clone());
        let admin = User::new(management.management_id.clone(), email.clone(), name.to_string(), password_hash.clone(), Role::Admin);

        match self.managements.create_with_admin(&management, &admin).await {
            Ok((management, user)) => {
                info!("Management {} created for domain {} with admin {}", management.management_id, domain, user.id);
                Ok(Registered { user, management, role: Role::Admin })
            }
            // A concurrent registration took the domain or the email first; nothing was written.
            Err(AppError::Database(e)) if is_unique_violation(&e) => match self.managements.find_by_domain(&domain).await? {
                Some(existing) => {
                    warn!("Lost management creation race for domain {}, joining instead", domain);
                    self.join(existing, email, name.to_string(), password_hash).await
                }
                None => Err(AppError::Conflict("Email already registered".into())),
            },
            Err(e) => Err(e),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Registered, AppError> {
        let email = email.trim().to_lowercase();
        let user = self.users.find_by_email(&email).await?.ok_or(AppError::Unauthorized)?;

        verify_password(password, &user.password_hash)?;

        let role = user
            .role()
            .ok_or_else(|| AppError::InternalWithMsg(format!("User {} has unknown role '{}'", user.id, user.role)))?;

        let management = self
            .managements
            .find_by_id(&user.management_id)
            .await?
            .ok_or_else(|| AppError::InternalWithMsg(format!("User {} references a missing management", user.id)))?;

        info!("User logged in: {}", user.id);
        Ok(Registered { user, management, role })
    }

    /// Adds a coach or student to an existing management.
    async fn join(&self, management: Management, email: String, name: String, password_hash: String) -> Result<Registered, AppError> {
        let role = if self.coaches.find_by_email(&management.management_id, &email).await?.is_some() {
            Role::Coach
        } else {
            Role::Student
        };

        let user = User::new(management.management_id.clone(), email, name, password_hash, role);
        let user = self.users.create(&user).await.map_err(|e| match e {
            AppError::Database(db) if is_unique_violation(&db) => AppError::Conflict("Email already registered".into()),
            other => other,
        })?;

        info!("Registered {} user {} in management {}", role, user.id, management.management_id);
        Ok(Registered { user, management, role })
    }
}
