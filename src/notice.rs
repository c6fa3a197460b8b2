use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Failure,
}

/// A status line message. Without a time to live it stays until replaced.
#[derive(Debug, Clone)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
    shown_at: Instant,
    ttl: Option<Duration>,
}

impl Notice {
    pub fn transient(message: impl Into<String>, kind: NoticeKind, ttl: Duration) -> Self {
        Notice {
            message: message.into(),
            kind,
            shown_at: Instant::now(),
            ttl: Some(ttl),
        }
    }

    pub fn persistent(message: impl Into<String>, kind: NoticeKind) -> Self {
        Notice {
            message: message.into(),
            kind,
            shown_at: Instant::now(),
            ttl: None,
        }
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        match self.ttl {
            Some(ttl) => now.saturating_duration_since(self.shown_at) < ttl,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_notice_expires() {
        let notice = Notice::transient("hi", NoticeKind::Info, Duration::from_millis(1500));
        assert!(notice.is_visible_at(notice.shown_at));
        assert!(notice.is_visible_at(notice.shown_at + Duration::from_millis(1499)));
        assert!(!notice.is_visible_at(notice.shown_at + Duration::from_millis(1500)));
    }

    #[test]
    fn persistent_notice_stays() {
        let notice = Notice::persistent("load failed", NoticeKind::Failure);
        assert!(notice.is_visible_at(notice.shown_at + Duration::from_secs(3600)));
    }
}
