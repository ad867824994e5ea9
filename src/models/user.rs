//! Modelo de User
//!
//! Usuarios del sistema y sus roles. Los roles determinan qué rutas de la API
//! pueden usar.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;
use validator::Validate;

/// Rol del usuario - mapea al ENUM user_role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    EmissionOfficer,
    Viewer,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::EmissionOfficer => "emission_officer",
            UserRole::Viewer => "viewer",
        }
    }

    /// Puede crear, editar y eliminar vehículos, pruebas y calendarios
    pub fn can_manage_records(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::EmissionOfficer)
    }

    pub fn is_admin(&self) -> bool {
        *self == UserRole::Admin
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User - mapea exactamente a la tabla users
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request para crear un nuevo usuario
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 2, max = 150))]
    pub full_name: String,

    #[validate(length(min = 8, max = 100))]
    pub password: String,

    pub role: UserRole,
}

/// Request para actualizar un usuario existente
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(min = 2, max = 150))]
    pub full_name: Option<String>,

    #[validate(length(min = 8, max = 100))]
    pub password: Option<String>,

    pub role: Option<UserRole>,

    pub is_active: Option<bool>,
}

/// Response de usuario para la API (sin password)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filtros para búsqueda de usuarios
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilters {
    pub search: Option<String>,
    pub role: Option<UserRole>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_permissions() {
        assert!(UserRole::Admin.can_manage_records());
        assert!(UserRole::EmissionOfficer.can_manage_records());
        assert!(!UserRole::Viewer.can_manage_records());
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::EmissionOfficer.is_admin());
    }

    #[test]
    fn test_role_serde_names() {
        let json = serde_json::to_string(&UserRole::EmissionOfficer).unwrap();
        assert_eq!(json, "\"emission_officer\"");
        let role: UserRole = serde_json::from_str("\"viewer\"").unwrap();
        assert_eq!(role, UserRole::Viewer);
        assert_eq!(UserRole::Admin.to_string(), "admin");
    }
}
