// Mon Jan 19 2026 - Alex

use super::Notification;
use nix::unistd::Pid;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignalError {
    #[error("Failed to register {notification} handler: {source}")]
    Registration {
        notification: Notification,
        #[source]
        source: io::Error,
    },
    #[error("Failed to change signal mask: {0}")]
    Mask(#[source] io::Error),
    #[error("Failed to wait for a notification: {0}")]
    Wait(#[source] io::Error),
    #[error("Failed to send {notification} to {pid}: {source}")]
    Send {
        pid: Pid,
        notification: Notification,
        #[source]
        source: io::Error,
    },
}

impl SignalError {
    pub fn exit_code(&self) -> i32 {
        match self {
            SignalError::Registration { notification, .. } => notification.registration_exit_code(),
            _ => 1,
        }
    }
}
