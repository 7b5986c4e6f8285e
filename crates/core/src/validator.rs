//! HTML content validation and sanitization.
//!
//! Validation is advisory: callers log and surface the report, but a failing
//! report never blocks storing content.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// CDNs allowed as external script/resource hosts.
const TRUSTED_CDN_HOSTS: [&str; 6] = [
    "cdn.jsdelivr.net",
    "unpkg.com",
    "cdnjs.cloudflare.com",
    "fonts.googleapis.com",
    "fonts.gstatic.com",
    "code.jquery.com",
];

static DANGEROUS_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<\s*(iframe|object|embed)\b").unwrap());

static SCRIPT_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b[^>]*>(.*?)</script>").unwrap());

static SCRIPT_SRC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<script\b[^>]*\bsrc\s*=\s*["']([^"']+)["']"#).unwrap());

// regex-lite has no backreferences, so paired and self-closing forms are
// spelled out per tag.
static STRIP_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)<iframe\b[^>]*>.*?</iframe>|<object\b[^>]*>.*?</object>|<embed\b[^>]*>.*?</embed>|<(?:iframe|object|embed)\b[^>]*/?>",
    )
    .unwrap()
});

/// Patterns inside inline `<script>` bodies that are never acceptable in
/// generated teaching content.
static DANGEROUS_JS_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("eval(", r"(?i)\beval\s*\("),
        ("document.write", r"(?i)\bdocument\s*\.\s*write\b"),
        ("window.open", r"(?i)\bwindow\s*\.\s*open\b"),
        ("fetch(", r"(?i)\bfetch\s*\("),
        ("XMLHttpRequest", r"(?i)\bXMLHttpRequest\b"),
        ("localStorage", r"(?i)\blocalStorage\b"),
        ("sessionStorage", r"(?i)\bsessionStorage\b"),
        ("indexedDB", r"(?i)\bindexedDB\b"),
        ("postMessage", r"(?i)\bpostMessage\b"),
        ("importScripts", r"(?i)\bimportScripts\b"),
        ("Function(", r"(?i)\bFunction\s*\("),
        ("constructor(", r"(?i)\bconstructor\s*\("),
        ("__proto__", r"(?i)__proto__"),
        ("prototype", r"(?i)\bprototype\b"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).unwrap()))
    .collect()
});

/// Outcome of a validation pass. `errors` make the content invalid;
/// `warnings` are informational only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Review text from an LLM validation pass, when one was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_feedback: Option<String>,
}

impl ValidationReport {
    pub fn with_llm_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.llm_feedback = Some(feedback.into());
        self
    }
}

/// Validates generated HTML against structural and script-safety rules.
#[derive(Debug, Clone)]
pub struct ContentValidator {
    max_content_length: usize,
}

impl ContentValidator {
    pub fn new(max_content_length: usize) -> Self {
        Self { max_content_length }
    }

    pub fn validate(&self, content: &str) -> ValidationReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if content.trim().is_empty() {
            errors.push("Content is empty".to_string());
            return ValidationReport {
                is_valid: false,
                errors,
                warnings,
                llm_feedback: None,
            };
        }

        if content.len() > self.max_content_length {
            errors.push(format!(
                "Content exceeds maximum length of {} characters",
                self.max_content_length
            ));
        }

        for captures in DANGEROUS_TAG_RE.captures_iter(content) {
            if let Some(tag) = captures.get(1) {
                let message = format!(
                    "Dangerous tag not allowed: <{}>",
                    tag.as_str().to_lowercase()
                );
                if !errors.contains(&message) {
                    errors.push(message);
                }
            }
        }

        for captures in SCRIPT_BLOCK_RE.captures_iter(content) {
            let body = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
            for (name, pattern) in DANGEROUS_JS_PATTERNS.iter() {
                if pattern.is_match(body) {
                    let message = format!("Dangerous script pattern: {}", name);
                    if !errors.contains(&message) {
                        errors.push(message);
                    }
                }
            }
        }

        let lower = content.to_lowercase();
        for tag in ["html", "head", "body"] {
            if !lower.contains(&format!("<{}", tag)) {
                warnings.push(format!("Missing <{}> tag", tag));
            }
        }

        for captures in SCRIPT_SRC_RE.captures_iter(content) {
            if let Some(src) = captures.get(1) {
                let src = src.as_str();
                if !is_trusted_resource(src) {
                    warnings.push(format!("External script from untrusted host: {}", src));
                }
            }
        }

        ValidationReport {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            llm_feedback: None,
        }
    }

    /// Remove the tags that `validate` reports as errors. Script-safety
    /// findings are left for a regeneration cycle to fix.
    pub fn sanitize(&self, content: &str) -> String {
        STRIP_TAG_RE.replace_all(content, "").into_owned()
    }
}

/// Relative, anchor and root-relative sources are fine; absolute URLs must
/// point at a trusted CDN host.
fn is_trusted_resource(src: &str) -> bool {
    let trimmed = src.trim();

    let host_part = if let Some(rest) = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .or_else(|| trimmed.strip_prefix("//"))
    {
        rest
    } else {
        // Not an absolute URL: relative paths stay local to the content
        return true;
    };

    let host = host_part
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default()
        .to_lowercase();

    TRUSTED_CDN_HOSTS.iter().any(|cdn| host == *cdn)
}
