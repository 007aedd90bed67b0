//! # Notices
//!
//! User-facing feedback emitted by the registration and listing flows.
//!
//! Flows only emit; whoever owns the display (an HTTP response, a log, a UI)
//! decides how long a notice lives.
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Placeholder shown by every "contact via admin" action.
    pub fn contact_admin() -> Self {
        Self::info(
            "Liên hệ Admin",
            "Chức năng liên hệ qua Admin đang được phát triển",
        )
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Collects notices in emission order.
#[derive(Debug, Default)]
pub struct NoticeLog {
    notices: Mutex<Vec<Notice>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(mut notices) => std::mem::take(&mut *notices),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn len(&self) -> usize {
        self.notices.lock().map(|notices| notices.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for NoticeLog {
    fn notify(&self, notice: Notice) {
        match self.notices.lock() {
            Ok(mut notices) => notices.push(notice),
            Err(poisoned) => poisoned.into_inner().push(notice),
        }
    }
}

/// Logs each notice before handing it to `inner`.
pub struct Traced<'a, N: ?Sized> {
    inner: &'a N,
}

impl<'a, N: Notifier + ?Sized> Traced<'a, N> {
    pub fn new(inner: &'a N) -> Self {
        Self { inner }
    }
}

impl<N: Notifier + ?Sized> Notifier for Traced<'_, N> {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Error => warn!("{}: {}", notice.title, notice.message),
            NoticeKind::Success | NoticeKind::Info => info!("{}: {}", notice.title, notice.message),
        }

        self.inner.notify(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::{Notice, NoticeKind, NoticeLog, Notifier, Traced};

    #[test]
    fn test_log_keeps_order() {
        let log = NoticeLog::new();
        log.notify(Notice::success("a", "1"));
        log.notify(Notice::error("b", "2"));

        assert_eq!(log.len(), 2);

        let notices = log.take();
        assert_eq!(notices[0].kind, NoticeKind::Success);
        assert_eq!(notices[1].title, "b");
        assert!(log.is_empty());
    }

    #[test]
    fn test_traced_forwards() {
        let log = NoticeLog::new();
        Traced::new(&log).notify(Notice::contact_admin());

        assert_eq!(log.take(), vec![Notice::contact_admin()]);
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_value(Notice::info("t", "m")).unwrap();
        assert_eq!(json["kind"], "info");
    }
}
