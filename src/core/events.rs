//! System event logging
//!
//! Structured lifecycle events emitted through `tracing` with a consistent
//! `event_type` field, so the process timeline can be reconstructed from
//! JSON logs.

use std::fmt;

use tracing::info;

/// System event types for structured logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemEventType {
    TaskStarted,
    TaskStopped,
    TaskShutdown,
    BotStarted,
    BotShutdown,
}

impl fmt::Display for SystemEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemEventType::TaskStarted => write!(f, "TASK_STARTED"),
            SystemEventType::TaskStopped => write!(f, "TASK_STOPPED"),
            SystemEventType::TaskShutdown => write!(f, "TASK_SHUTDOWN"),
            SystemEventType::BotStarted => write!(f, "BOT_STARTED"),
            SystemEventType::BotShutdown => write!(f, "BOT_SHUTDOWN"),
        }
    }
}

/// A single system lifecycle event
#[derive(Debug, Clone)]
pub struct SystemEvent {
    pub event_type: SystemEventType,
    pub task: &'static str,
    pub reason: Option<&'static str>,
}

impl SystemEvent {
    pub fn task_started(task: &'static str) -> Self {
        Self {
            event_type: SystemEventType::TaskStarted,
            task,
            reason: None,
        }
    }

    pub fn task_stopped(task: &'static str) -> Self {
        Self {
            event_type: SystemEventType::TaskStopped,
            task,
            reason: None,
        }
    }

    pub fn task_shutdown(task: &'static str, reason: &'static str) -> Self {
        Self {
            event_type: SystemEventType::TaskShutdown,
            task,
            reason: Some(reason),
        }
    }

    pub fn bot_started() -> Self {
        Self {
            event_type: SystemEventType::BotStarted,
            task: "main",
            reason: None,
        }
    }

    pub fn bot_shutdown() -> Self {
        Self {
            event_type: SystemEventType::BotShutdown,
            task: "main",
            reason: None,
        }
    }
}

/// Emit a system event at info level
pub fn log_system_event(event: &SystemEvent) {
    match event.reason {
        Some(reason) => info!(
            event_type = %event.event_type,
            task = event.task,
            reason = reason,
            "System event"
        ),
        None => info!(
            event_type = %event.event_type,
            task = event.task,
            "System event"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_display() {
        assert_eq!(SystemEventType::TaskStarted.to_string(), "TASK_STARTED");
        assert_eq!(SystemEventType::BotShutdown.to_string(), "BOT_SHUTDOWN");
    }

    #[test]
    fn test_constructors() {
        let e = SystemEvent::task_shutdown("supervisor", "shutdown_signal");
        assert_eq!(e.event_type, SystemEventType::TaskShutdown);
        assert_eq!(e.task, "supervisor");
        assert_eq!(e.reason, Some("shutdown_signal"));

        let e = SystemEvent::bot_started();
        assert_eq!(e.task, "main");
        assert!(e.reason.is_none());
    }

    #[test]
    fn test_log_system_event_does_not_panic() {
        // No subscriber installed in unit tests; emitting must still be safe
        log_system_event(&SystemEvent::task_started("worker"));
        log_system_event(&SystemEvent::task_shutdown("worker", "test"));
    }
}
