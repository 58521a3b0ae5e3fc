//! Risk Summary Engine
//!
//! Heuristic, read-only view over the board, the log stream and the
//! transcript. Nothing is cached: every call recomputes from the snapshots it
//! is given.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::board::BoardSnapshot;
use crate::models::{ConversationMessage, LogEntry, Sender, StageStatus};

pub const NO_ANOMALIES_TAG: &str = "No anomalies detected";
pub const DEFAULT_INTENT: &str = "General inquiry";
pub const DEFAULT_RECOMMENDATION: &str = "No action required; continue monitoring";

/// Lowest reported risk, even for a fully clean board.
const RISK_FLOOR: u32 = 5;
const ERROR_WEIGHT: u32 = 70;
const PENDING_WEIGHT: u32 = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub risk_percent: u8,
    pub behavior_tags: BTreeSet<String>,
    pub likely_intent: String,
    pub recommendations: Vec<String>,
    pub summary: String,
}

// ============================================================================
// Rule tables
// ============================================================================

/// Log keyword families, matched case-insensitively as substrings.
const BEHAVIOR_RULES: &[(&[&str], &str)] = &[
    (&["jailbreak"], "Possible jailbreak patterns"),
    (&["leak"], "Potential data leakage"),
    (&["entropy"], "High entropy content"),
    (&["sanitiz", "rewrite"], "Sanitization applied"),
];

const INTENT_INSTRUCTION_OVERRIDE: &str = "Instruction override";
const INTENT_PROMPT_EXTRACTION: &str = "System prompt extraction";
const INTENT_SECRET_HARVESTING: &str = "Secret harvesting";
const INTENT_JAILBREAK: &str = "Jailbreak attempt";
const INTENT_HARMFUL_CONTENT: &str = "Harmful content request";
const INTENT_ROLE_PLAY_HACKING: &str = "Role-play hacking";

struct IntentRule {
    intent: &'static str,
    pattern: Regex,
}

/// Ordered; first match wins.
fn intent_rules() -> &'static [IntentRule] {
    static RULES: OnceLock<Vec<IntentRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        let table: &[(&'static str, &'static str)] = &[
            (
                INTENT_INSTRUCTION_OVERRIDE,
                r"(?i)(ignore|forget|disregard).*(previous|prior|above|all).*(instruction|rule|prompt)|override.*rules|disregard.*safety",
            ),
            (
                INTENT_PROMPT_EXTRACTION,
                r"(?i)system.*prompt|(reveal|show|print|repeat).*(your|hidden).*(instruction|prompt)",
            ),
            (
                INTENT_SECRET_HARVESTING,
                r"(?i)password|api[\s_-]?key|secret|\btoken\b|credential|private[\s_-]?key",
            ),
            (
                INTENT_JAILBREAK,
                r"(?i)jailbreak|bypass.*(security|safety|filter)|developer\s+mode|no\s+restrictions",
            ),
            (
                INTENT_HARMFUL_CONTENT,
                r"(?i)dangerous.*content|illegal.*activit|weapon|explosive|malware",
            ),
            (
                INTENT_ROLE_PLAY_HACKING,
                r"(?i)act.*as.*hacker|pretend.*(hacker|attacker)|how.*to.*hack",
            ),
        ];
        table
            .iter()
            .filter_map(|(intent, pattern)| {
                Regex::new(pattern).ok().map(|pattern| IntentRule {
                    intent: *intent,
                    pattern,
                })
            })
            .collect()
    })
}

/// Recommendation per intent.
const INTENT_RECOMMENDATIONS: &[(&str, &str)] = &[
    (
        INTENT_INSTRUCTION_OVERRIDE,
        "Reinforce system instructions and reject override attempts",
    ),
    (
        INTENT_PROMPT_EXTRACTION,
        "Keep the system prompt confidential and review output filtering",
    ),
    (
        INTENT_SECRET_HARVESTING,
        "Redact sensitive output and halt the session",
    ),
    (
        INTENT_JAILBREAK,
        "Escalate to the jailbreak playbook and monitor the user",
    ),
    (
        INTENT_HARMFUL_CONTENT,
        "Refuse the request and flag it for human review",
    ),
    (
        INTENT_ROLE_PLAY_HACKING,
        "Decline role-play that provides intrusion guidance",
    ),
];

/// Recommendation per behavior tag.
const TAG_RECOMMENDATIONS: &[(&str, &str)] = &[
    (
        "Possible jailbreak patterns",
        "Escalate to the jailbreak playbook and monitor the user",
    ),
    ("Potential data leakage", "Audit recent responses for leaked data"),
    ("High entropy content", "Inspect encoded or obfuscated payloads"),
];

// ============================================================================
// Engine
// ============================================================================

pub struct RiskSummaryEngine;

impl RiskSummaryEngine {
    pub fn summarize(
        board: &BoardSnapshot,
        logs: &[LogEntry],
        messages: &[ConversationMessage],
    ) -> RiskSummary {
        let behavior_tags = Self::behavior_tags(logs);
        let likely_intent = Self::likely_intent(messages);
        let recommendations = Self::recommendations(&likely_intent, &behavior_tags);
        let summary = format!(
            "PromptGuard processed the input and applied {} automated protections.",
            behavior_tags.len()
        );
        RiskSummary {
            risk_percent: Self::risk_percent(board),
            behavior_tags,
            likely_intent,
            recommendations,
            summary,
        }
    }

    /// `errors * 70 + (N - done) * 12`, clamped to `5..=100`.
    pub fn risk_percent(board: &BoardSnapshot) -> u8 {
        let errors = board.count(StageStatus::Error) as u32;
        let done = board.count(StageStatus::Done) as u32;
        let pending = (board.len() as u32).saturating_sub(done);
        let raw = errors
            .saturating_mul(ERROR_WEIGHT)
            .saturating_add(pending.saturating_mul(PENDING_WEIGHT));
        raw.clamp(RISK_FLOOR, 100) as u8
    }

    pub fn behavior_tags(logs: &[LogEntry]) -> BTreeSet<String> {
        let text = logs
            .iter()
            .map(|e| e.message.to_lowercase())
            .collect::<Vec<_>>()
            .join("\n");
        let mut tags: BTreeSet<String> = BEHAVIOR_RULES
            .iter()
            .filter(|(keywords, _)| keywords.iter().any(|k| text.contains(k)))
            .map(|(_, tag)| tag.to_string())
            .collect();
        if tags.is_empty() {
            tags.insert(NO_ANOMALIES_TAG.to_string());
        }
        tags
    }

    /// Classify the most recent user message.
    pub fn likely_intent(messages: &[ConversationMessage]) -> String {
        let Some(last) = messages.iter().rev().find(|m| m.sender == Sender::User) else {
            return DEFAULT_INTENT.to_string();
        };
        intent_rules()
            .iter()
            .find(|rule| rule.pattern.is_match(&last.text))
            .map(|rule| rule.intent.to_string())
            .unwrap_or_else(|| DEFAULT_INTENT.to_string())
    }

    pub fn recommendations(intent: &str, tags: &BTreeSet<String>) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let mut add = |text: &str| {
            if !out.iter().any(|r| r == text) {
                out.push(text.to_string());
            }
        };
        for (rule_intent, text) in INTENT_RECOMMENDATIONS {
            if *rule_intent == intent {
                add(*text);
            }
        }
        for (tag, text) in TAG_RECOMMENDATIONS {
            if tags.contains(*tag) {
                add(*text);
            }
        }
        if out.is_empty() {
            out.push(DEFAULT_RECOMMENDATION.to_string());
        }
        out
    }
}
