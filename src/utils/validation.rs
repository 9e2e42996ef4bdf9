//! 通用验证函数
//!
//! 提供集中的验证逻辑，避免在命令层重复验证代码。
//! 单个字段的检查返回 `FieldError`，由 `FieldErrors` 收集后一次性报告。

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::db::{TaskPriority, TaskStatus};
use crate::error::{AppError, AppResult, FieldError};

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// 字段错误收集器
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录错误并丢弃结果；成功时返回值
    pub fn check<T>(&mut self, result: Result<T, FieldError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.errors.push(err);
                None
            }
        }
    }

    /// 没有错误时返回 `value`，否则返回 `AppError::Validation`
    pub fn finish<T>(self, value: T) -> AppResult<T> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

/// 验证标题：trim 后非空，且不超过 100 个字符
pub fn validate_title(title: &str) -> Result<String, FieldError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new("title", "Task title is required"));
    }
    if trimmed.chars().count() > TITLE_MAX_CHARS {
        return Err(FieldError::new(
            "title",
            format!("Task title cannot exceed {} characters", TITLE_MAX_CHARS),
        ));
    }
    Ok(trimmed.to_string())
}

/// 验证描述：trim 后不超过 500 个字符，空串视为没有描述
pub fn validate_description(description: &str) -> Result<Option<String>, FieldError> {
    let trimmed = description.trim();
    if trimmed.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(FieldError::new(
            "description",
            format!(
                "Task description cannot exceed {} characters",
                DESCRIPTION_MAX_CHARS
            ),
        ));
    }
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

/// 解析任务状态
pub fn parse_status(raw: &str) -> Result<TaskStatus, FieldError> {
    TaskStatus::parse(raw).ok_or_else(|| FieldError::new("status", "Invalid status"))
}

/// 解析优先级
pub fn parse_priority(raw: &str) -> Result<TaskPriority, FieldError> {
    TaskPriority::parse(raw).ok_or_else(|| FieldError::new("priority", "Invalid priority level"))
}

/// 解析截止时间
///
/// 接受 RFC 3339（带时区）、不带时区的日期时间（按 UTC）以及纯日期（当天 00:00 UTC）。
pub fn parse_due_date(raw: &str) -> Result<DateTime<Utc>, FieldError> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| FieldError::new("dueDate", "Invalid date format"))
}

/// 每个标签 trim，丢掉空标签，保持原有顺序
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// 解析正整数查询参数，缺失、非数字或非正数时回退到默认值
pub fn positive_or_default(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

/// 验证限制值范围
pub fn validate_limit(limit: Option<&str>, default: i64, max: i64) -> i64 {
    positive_or_default(limit, default).min(max)
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn test_validate_title() {
        assert!(validate_title("  ").is_err());
        assert!(validate_title("").is_err());
        assert_eq!(validate_title("  hello  ").unwrap(), "hello");
        assert_eq!(validate_title(&"a".repeat(100)).unwrap().len(), 100);

        let err = validate_title(&"a".repeat(101)).unwrap_err();
        assert_eq!(err.field, "title");
        assert_eq!(err.message, "Task title cannot exceed 100 characters");
    }

    #[test]
    fn title_length_counts_characters_not_bytes() {
        // 100 个三字节字符仍然合法
        assert!(validate_title(&"任".repeat(100)).is_ok());
        assert!(validate_title(&"任".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_description() {
        assert_eq!(validate_description("   ").unwrap(), None);
        assert_eq!(validate_description(" notes ").unwrap().as_deref(), Some("notes"));
        assert!(validate_description(&"d".repeat(500)).is_ok());
        assert_eq!(
            validate_description(&"d".repeat(501)).unwrap_err().field,
            "description"
        );
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!(parse_status("in-progress").unwrap(), TaskStatus::InProgress);
        assert_eq!(parse_status("done").unwrap_err().message, "Invalid status");
        assert_eq!(parse_priority("high").unwrap(), TaskPriority::High);
        assert_eq!(
            parse_priority("critical").unwrap_err().message,
            "Invalid priority level"
        );
    }

    #[test]
    fn test_parse_due_date() {
        let full = parse_due_date("2025-03-01T12:30:00+02:00").unwrap();
        assert_eq!(full.hour(), 10);

        let date_only = parse_due_date("2025-03-01").unwrap();
        assert_eq!((date_only.year(), date_only.month(), date_only.day()), (2025, 3, 1));
        assert_eq!(date_only.hour(), 0);

        assert!(parse_due_date("2025-03-01T08:15").is_ok());
        assert!(parse_due_date("2025-03-01T08:15:00.250").is_ok());

        let err = parse_due_date("next tuesday").unwrap_err();
        assert_eq!(err.field, "dueDate");
        assert!(parse_due_date("2025-02-30").is_err());
    }

    #[test]
    fn test_normalize_tags() {
        let tags = vec![" work ".to_string(), "".to_string(), "home".to_string()];
        assert_eq!(normalize_tags(tags), vec!["work", "home"]);
    }

    #[test]
    fn test_validate_limit() {
        assert_eq!(validate_limit(None, 10, 100), 10);
        assert_eq!(validate_limit(Some("50"), 10, 100), 50);
        assert_eq!(validate_limit(Some("0"), 10, 100), 10);
        assert_eq!(validate_limit(Some("-3"), 10, 100), 10);
        assert_eq!(validate_limit(Some("abc"), 10, 100), 10);
        assert_eq!(validate_limit(Some("200"), 10, 100), 100);
        assert_eq!(positive_or_default(Some("2"), 1), 2);
    }

    #[test]
    fn field_errors_collects_all() {
        let mut errors = FieldErrors::new();
        assert_eq!(errors.check(validate_title("ok")), Some("ok".to_string()));
        assert_eq!(errors.check(parse_priority("nope")), None);
        assert_eq!(errors.check(parse_status("nope")), None);

        match errors.finish(()) {
            Err(AppError::Validation(list)) => {
                let fields: Vec<_> = list.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["priority", "status"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
