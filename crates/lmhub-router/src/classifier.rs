// SPDX-FileCopyrightText: 2026 Lmhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword-based task classification.
//!
//! Classifies a request message into one of the [`TaskType`] categories
//! using substring triggers. No LLM pre-call, no network, no latency.
//! Triggers cover English and Chinese phrasings.

use lmhub_core::TaskType;

/// Ordered trigger table. The first category whose trigger list matches
/// wins, so the table order is part of the classification contract:
/// `code_gen` outranks `code_review` outranks `architecture`, and so on.
///
/// Matching is case-insensitive substring containment. The Chinese triggers
/// need no lowercasing but ride through `to_lowercase` unchanged.
const TASK_TRIGGERS: &[(TaskType, &[&str])] = &[
    (
        TaskType::CodeGen,
        &["code", "write function", "implement", "snippet", "代码", "编写", "实现"],
    ),
    (
        TaskType::CodeReview,
        &["review", "debug", "fix bug", "refactor", "lint", "审查", "调试", "重构"],
    ),
    (
        TaskType::Architecture,
        &["architecture", "design pattern", "system design", "diagram", "架构", "设计"],
    ),
    (
        TaskType::Documentation,
        &["document", "comment", "readme", "explain", "注释", "文档"],
    ),
    (
        TaskType::Translation,
        &["translate", "translation", "localize", "翻译", "本地化"],
    ),
    (
        TaskType::UiDesign,
        &["ui", "frontend", "css", "component", "layout", "前端", "组件", "样式"],
    ),
    (
        TaskType::LongContext,
        &["summarize", "long document", "file content", "长文本", "总结"],
    ),
    (
        TaskType::MathReasoning,
        &["math", "equation", "calculate", "proof", "algorithm", "数学", "计算", "推理"],
    ),
    (
        TaskType::ToolCalling,
        &["function call", "api integration", "tool use"],
    ),
    (
        TaskType::Creative,
        &["write story", "essay", "creative", "创意", "写作"],
    ),
    (
        TaskType::Agentic,
        &["agent", "automate", "autonomous task", "自动化"],
    ),
];

/// Result of classifying a request message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationResult {
    /// The classified task category.
    pub task: TaskType,
    /// The trigger that matched, or `None` when the default applied.
    pub trigger: Option<&'static str>,
}

/// Classify a message into a task category.
///
/// Scans the trigger table in order and returns the first category with a
/// matching trigger. A message with no trigger at all falls back to
/// [`TaskType::DEFAULT`]; classification never fails.
pub fn classify(message: &str) -> ClassificationResult {
    let lower = message.to_lowercase();

    for (task, triggers) in TASK_TRIGGERS {
        if let Some(trigger) = triggers.iter().copied().find(|t| lower.contains(t)) {
            return ClassificationResult {
                task: *task,
                trigger: Some(trigger),
            };
        }
    }

    ClassificationResult {
        task: TaskType::DEFAULT,
        trigger: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_code_gen() {
        assert_eq!(classify("write function to parse dates").task, TaskType::CodeGen);
        assert_eq!(classify("give me a snippet for this").task, TaskType::CodeGen);
    }

    #[test]
    fn classify_is_case_insensitive() {
        assert_eq!(classify("REVIEW this PR please").task, TaskType::CodeReview);
        assert_eq!(classify("Translate this to German").task, TaskType::Translation);
    }

    #[test]
    fn classify_chinese_triggers() {
        assert_eq!(classify("帮我审查这段逻辑").task, TaskType::CodeReview);
        assert_eq!(classify("把这段话翻译成英文").task, TaskType::Translation);
        assert_eq!(classify("设计一个缓存方案").task, TaskType::Architecture);
    }

    #[test]
    fn table_order_breaks_ties() {
        // "review" (code_review) and "architecture" both appear, but
        // code_review sits earlier in the table.
        assert_eq!(
            classify("review the architecture proposal").task,
            TaskType::CodeReview
        );
        // "code" (code_gen) outranks everything that follows.
        assert_eq!(
            classify("debug this code").task,
            TaskType::CodeGen
        );
    }

    #[test]
    fn no_trigger_falls_back_to_default() {
        let result = classify("hello there");
        assert_eq!(result.task, TaskType::DEFAULT);
        assert!(result.trigger.is_none());
    }

    #[test]
    fn empty_message_falls_back_to_default() {
        assert_eq!(classify("").task, TaskType::DEFAULT);
    }

    #[test]
    fn matched_trigger_is_reported() {
        let result = classify("please refactor the session module");
        assert_eq!(result.task, TaskType::CodeReview);
        assert_eq!(result.trigger, Some("refactor"));
    }

    #[test]
    fn classification_is_deterministic() {
        let message = "summarize this long document for me";
        let first = classify(message);
        for _ in 0..10 {
            assert_eq!(classify(message), first);
        }
    }
}
