use std::sync::Mutex;

/// 一条瞬时通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Error(String),
}

/// 通知出口；`TaskBoard` 只通过它向用户反馈结果
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// 默认实现：写进 tracing 日志
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!(target: "taskboard::notify", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::warn!(target: "taskboard::notify", "{message}");
    }
}

/// 把通知记在内存里，测试用
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取出并清空已记录的通知
    pub fn take(&self) -> Vec<Notification> {
        match self.events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    fn push(&self, notification: Notification) {
        match self.events.lock() {
            Ok(mut events) => events.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.push(Notification::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.push(Notification::Error(message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_notifier_drains() {
        let notifier = RecordingNotifier::new();
        notifier.success("saved");
        notifier.error("failed");
        assert_eq!(
            notifier.take(),
            vec![
                Notification::Success("saved".into()),
                Notification::Error("failed".into())
            ]
        );
        assert!(notifier.take().is_empty());
    }
}
