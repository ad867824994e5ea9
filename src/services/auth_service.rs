//! Servicio de autenticación
//!
//! Verifica credenciales contra la tabla users y emite el JWT de sesión.
//! bcrypt es costoso en CPU, así que corre en el pool bloqueante de tokio.

use bcrypt::{hash, verify, DEFAULT_COST};
use sqlx::PgPool;

use crate::dto::auth_dto::{LoginRequest, LoginResponse};
use crate::models::user::{User, UserRole};
use crate::repositories::UserRepository;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::jwt::{generate_token, JwtConfig};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Hashear una contraseña
pub async fn hash_password(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || hash(password, DEFAULT_COST))
        .await
        .map_err(|e| AppError::Internal(format!("Hash task failed: {}", e)))?
        .map_err(|e| AppError::Hash(e.to_string()))
}

/// Verificar una contraseña contra su hash
pub async fn verify_password(password: String, password_hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || verify(password, &password_hash))
        .await
        .map_err(|e| AppError::Internal(format!("Hash task failed: {}", e)))?
        .map_err(|e| AppError::Hash(e.to_string()))
}

/// Crear el administrador inicial si todavía no existe una cuenta con ese email
pub async fn ensure_bootstrap_admin(pool: &PgPool, email: &str, password: &str) -> AppResult<bool> {
    let users = UserRepository::new(pool.clone());
    if users.email_exists(email).await? {
        return Ok(false);
    }

    let password_hash = hash_password(password.to_string()).await?;
    users
        .create(email, "System Administrator", &password_hash, UserRole::Admin)
        .await?;
    log::info!("👤 Administrador inicial creado: {}", email);
    Ok(true)
}

pub struct AuthService {
    users: UserRepository,
    jwt: JwtConfig,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt: JwtConfig) -> Self {
        Self {
            users: UserRepository::new(pool),
            jwt,
        }
    }

    /// Autenticar por email y contraseña.
    ///
    /// Email inexistente, contraseña incorrecta y usuario inactivo devuelven
    /// el mismo error para no revelar qué cuentas existen.
    pub async fn login(&self, request: &LoginRequest) -> AppResult<(User, LoginResponse)> {
        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        let valid = verify_password(request.password.clone(), user.password_hash.clone()).await?;
        if !valid || !user.is_active {
            log::warn!("🔒 Login rechazado para {}", user.email);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let token = generate_token(user.id, &user.email, user.role, &self.jwt)?;
        log::info!("✅ Login exitoso: {} ({})", user.email, user.role);

        let response = LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.expiration,
            user: user.clone().into(),
        };
        Ok((user, response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify_password() {
        let hashed = hash_password("s3cure-pass".to_string()).await.unwrap();
        assert_ne!(hashed, "s3cure-pass");
        assert!(verify_password("s3cure-pass".to_string(), hashed.clone()).await.unwrap());
        assert!(!verify_password("wrong".to_string(), hashed).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_against_malformed_hash() {
        let result = verify_password("anything".to_string(), "not-a-hash".to_string()).await;
        assert!(matches!(result, Err(AppError::Hash(_))));
    }
}
