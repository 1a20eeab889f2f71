#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// A user-visible message produced by a registry operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub text: String,
}

impl Notice {
    pub fn success(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, title, text)
    }

    pub fn warning(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, title, text)
    }

    pub fn error(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, title, text)
    }

    fn new(level: NoticeLevel, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            text: text.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => tracing::info!(title = %notice.title, "{}", notice.text),
            NoticeLevel::Warning => tracing::warn!(title = %notice.title, "{}", notice.text),
            NoticeLevel::Error => tracing::error!(title = %notice.title, "{}", notice.text),
        }
    }
}
