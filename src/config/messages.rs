//! Localized response messages
//!
//! The probe text and error envelope messages come from a per-locale table,
//! optionally patched by individual overrides from the config file.

use serde::Deserialize;

/// Response language
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Zh,
}

/// Optional replacements for single entries of the locale table
#[derive(Debug, Deserialize, Clone, Default)]
pub struct MessageOverrides {
    #[serde(default)]
    pub server_running: Option<String>,
    #[serde(default)]
    pub file_not_found: Option<String>,
    #[serde(default)]
    pub invalid_range: Option<String>,
    #[serde(default)]
    pub range_not_satisfiable: Option<String>,
    /// May contain `{method}`, replaced by the request method
    #[serde(default)]
    pub unsupported_method: Option<String>,
    #[serde(default)]
    pub unknown_error: Option<String>,
}

/// Resolved message table used when building responses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Messages {
    pub server_running: String,
    pub file_not_found: String,
    pub invalid_range: String,
    pub range_not_satisfiable: String,
    unsupported_method: String,
    pub unknown_error: String,
}

impl Messages {
    pub fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::En => Self {
                server_running: "Debug server is running".to_string(),
                file_not_found: "File not found".to_string(),
                invalid_range: "Invalid Range header".to_string(),
                range_not_satisfiable: "Requested range not satisfiable".to_string(),
                unsupported_method: "Unsupported method ('{method}')".to_string(),
                unknown_error: "Unknown error".to_string(),
            },
            Locale::Zh => Self {
                server_running: "调试服务器正在运行".to_string(),
                file_not_found: "文件未找到".to_string(),
                invalid_range: "无效的 Range 头".to_string(),
                range_not_satisfiable: "请求的范围无法满足".to_string(),
                unsupported_method: "不支持的请求方法 ('{method}')".to_string(),
                unknown_error: "未知错误".to_string(),
            },
        }
    }

    /// Build the table for `locale`, then apply any non-empty overrides
    pub fn resolve(locale: Locale, overrides: &MessageOverrides) -> Self {
        let mut messages = Self::for_locale(locale);
        let slots = [
            (&mut messages.server_running, &overrides.server_running),
            (&mut messages.file_not_found, &overrides.file_not_found),
            (&mut messages.invalid_range, &overrides.invalid_range),
            (
                &mut messages.range_not_satisfiable,
                &overrides.range_not_satisfiable,
            ),
            (
                &mut messages.unsupported_method,
                &overrides.unsupported_method,
            ),
            (&mut messages.unknown_error, &overrides.unknown_error),
        ];
        for (slot, replacement) in slots {
            if let Some(text) = replacement.as_deref().filter(|t| !t.is_empty()) {
                *slot = text.to_string();
            }
        }
        messages
    }

    pub fn unsupported_method(&self, method: &str) -> String {
        self.unsupported_method.replace("{method}", method)
    }
}
