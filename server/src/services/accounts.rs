use serde::Deserialize;

use crate::auth::{hash_password, verify_password, SessionKeys};
use crate::models::{NewUser, Role, User, UserProfile};
use crate::store::Store;
use crate::utils::{AppError, FieldError};

const MAX_NAME_LEN: usize = 100;
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: String,
    pub role: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// `local@domain.tld`, no whitespace. Deliverability is not our concern.
fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !email.chars().any(char::is_whitespace)
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

fn validate_signup(req: &SignupRequest) -> Result<(NewUserFields, Role), AppError> {
    let mut errors = Vec::new();

    let name = req.name.trim();
    if name.is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    } else if name.chars().count() > MAX_NAME_LEN {
        errors.push(FieldError::new("name", "Name must be at most 100 characters"));
    }

    let email = normalize_email(&req.email);
    if !looks_like_email(&email) {
        errors.push(FieldError::new("email", "Email must be a valid email address"));
    }

    if req.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password",
            "Password must be at least 8 characters",
        ));
    }
    if req.password != req.confirm_password {
        errors.push(FieldError::new("confirmPassword", "Passwords do not match"));
    }

    let role = Role::parse(&req.role);
    if role.is_none() {
        errors.push(FieldError::new(
            "role",
            "Role must be 'organizer' or 'attendee'",
        ));
    }

    match role {
        Some(role) if errors.is_empty() => Ok((
            NewUserFields {
                name: name.to_string(),
                email,
            },
            role,
        )),
        _ => Err(AppError::InvalidFields(errors)),
    }
}

struct NewUserFields {
    name: String,
    email: String,
}

pub async fn signup(store: &dyn Store, req: SignupRequest) -> Result<UserProfile, AppError> {
    let (fields, role) = validate_signup(&req)?;
    let password_hash = hash_password(&req.password)?;

    let user = store
        .create_user(NewUser {
            name: fields.name,
            email: fields.email,
            password_hash,
            role,
        })
        .await?;

    tracing::info!(user_id = %user.id, role = ?user.role, "User signed up");
    Ok(user.into())
}

/// Returns the user and a freshly signed session token.
pub async fn login(
    store: &dyn Store,
    sessions: &SessionKeys,
    req: LoginRequest,
) -> Result<(User, String), AppError> {
    let email = normalize_email(&req.email);
    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::ValidationError(
            "Email and password are required".to_string(),
        ));
    }

    let user = store
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::AuthError("Invalid credentials".to_string()));
    }

    let token = sessions.issue(&user)?;
    tracing::info!(user_id = %user.id, "User logged in");
    Ok((user, token))
}

pub async fn profile(store: &dyn Store, user_id: uuid::Uuid) -> Result<UserProfile, AppError> {
    store
        .find_user(user_id)
        .await?
        .map(UserProfile::from)
        .ok_or_else(|| AppError::AuthError("Session user no longer exists".to_string()))
}
