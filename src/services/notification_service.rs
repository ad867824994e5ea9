//! Notificaciones al operador
//!
//! Los errores que terminan una petición se registran y se empujan a un
//! `NotificationService`. En producción solo se escriben al log; en tests se
//! guardan en memoria para poder inspeccionarlos.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::utils::errors::AppError;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

pub trait NotificationService: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Notificar un error que terminó una petición.
///
/// Los errores de cliente (4xx) se notifican como advertencia y los del
/// servidor como error.
pub fn report_error(notifier: &dyn NotificationService, title: &str, error: &AppError) {
    let level = if error.status_code().is_server_error() {
        NotificationLevel::Error
    } else {
        NotificationLevel::Warning
    };
    notifier.notify(Notification {
        level,
        title: title.to_string(),
        message: error.to_string(),
        created_at: Utc::now(),
    });
}

pub fn report_info(notifier: &dyn NotificationService, title: &str, message: impl Into<String>) {
    notifier.notify(Notification {
        level: NotificationLevel::Info,
        title: title.to_string(),
        message: message.into(),
        created_at: Utc::now(),
    });
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotificationService;

impl NotificationService for LogNotificationService {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Info => tracing::info!("🔔 {}: {}", notification.title, notification.message),
            NotificationLevel::Warning => tracing::warn!("⚠️ {}: {}", notification.title, notification.message),
            NotificationLevel::Error => tracing::error!("❌ {}: {}", notification.title, notification.message),
        }
    }
}

/// Guarda las notificaciones en memoria
#[derive(Debug, Default, Clone)]
pub struct MemoryNotificationService {
    notifications: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotificationService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        match self.notifications.lock() {
            Ok(list) => list.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl NotificationService for MemoryNotificationService {
    fn notify(&self, notification: Notification) {
        match self.notifications.lock() {
            Ok(mut list) => list.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}
