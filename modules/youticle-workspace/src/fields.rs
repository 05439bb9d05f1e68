//! Signal field normalization.
//!
//! The backend's signal schema has drifted across versions: the same logical
//! field can arrive as an array of strings, an array of objects, a multiline
//! string, or nested under a different parent. Every function here is total —
//! missing or malformed data degrades to an empty list, `None`, or the
//! literal "-", never an error. Each logical field is resolved through an
//! explicit ordered list of candidate locations, first present wins.

use std::collections::HashSet;

use serde_json::Value;
use strategy_client::Signal;

/// Keys of `content_plan` objects that get a fixed position and a spaced label.
const CONTENT_PLAN_KEYS: [&str; 3] = ["short_term", "mid_term", "long_term"];

/// Render-ready projection of one signal.
#[derive(Debug, Clone)]
pub struct SignalFields {
    pub demand_statement: String,
    pub observations: Vec<String>,
    pub supporting_comments: Vec<SupportingComment>,
    pub source_videos: Vec<SourceVideo>,
    pub excluded_examples: Vec<Value>,
    pub aggregate: EvidenceAggregate,
    pub inference_steps: Vec<String>,
    pub root_cause_hypothesis: String,
    pub key_tradeoffs: Vec<String>,
    pub misconceptions_to_correct: Vec<String>,
    pub explanation: String,
    pub actionables: Vec<String>,
    pub content_plan: Vec<String>,
    pub core_question: String,
    pub hook: String,
    pub outline: Vec<String>,
    pub framework_name: String,
    pub framework_steps: Vec<String>,
    pub why_now: String,
    pub confidence_score: Option<f64>,
}

/// Numeric evidence scores. Missing stays `None` — never coerced to 0, so the
/// display layer can distinguish "no data" from a zero score.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvidenceAggregate {
    pub evidence_strength: Option<f64>,
    pub coverage_videos: Option<f64>,
    pub recurrence_score: Option<f64>,
    pub top_like_count: Option<f64>,
}

/// One supporting comment, read defensively out of an opaque object.
#[derive(Debug, Clone, Default)]
pub struct SupportingComment {
    pub text: Option<String>,
    pub author: Option<String>,
    pub like_count: i64,
    pub video_id: Option<String>,
    pub video_title: Option<String>,
    pub thumbnail_url: Option<String>,
    pub video_published_at: Option<String>,
}

/// One evidence video, either taken from `source_videos` directly or derived
/// from the supporting comments. `video_id` can be absent on the direct path
/// — explicit entries are shown as the backend sent them.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceVideo {
    pub video_id: Option<String>,
    pub video_title: Option<String>,
    pub thumbnail_url: Option<String>,
    pub video_published_at: Option<String>,
}

impl SignalFields {
    pub fn from_signal(signal: &Signal) -> Self {
        let supporting_comments = supporting_comments(signal);
        let source_videos = source_videos(signal, &supporting_comments);

        Self {
            demand_statement: demand_statement(signal),
            observations: text_list(either(signal, &["observations"], &["causal_model", "observations"])),
            supporting_comments,
            source_videos,
            excluded_examples: value_array(signal, &["evidence", "excluded_examples"], &["excluded_examples"]),
            aggregate: EvidenceAggregate::from_signal(signal),
            inference_steps: text_list(either(
                signal,
                &["inference_steps"],
                &["causal_model", "inference_steps"],
            )),
            root_cause_hypothesis: string_or_dash(&[
                signal.field(&["insight", "root_cause_hypothesis"]),
                signal.field(&["root_cause_hypothesis"]),
                signal.field(&["causal_model", "root_cause_hypothesis"]),
            ]),
            key_tradeoffs: tradeoff_list(signal.field(&["insight", "key_tradeoffs"])),
            misconceptions_to_correct: text_list(signal.field(&["insight", "misconceptions_to_correct"])),
            explanation: string_or_dash(&[
                signal.field(&["explanation"]),
                signal.field(&["confidence", "explanation"]),
            ]),
            actionables: text_list(signal.field(&["actionables"])),
            content_plan: content_plan_list(signal.field(&["content_plan"])),
            core_question: string_or_dash(&[signal.field(&["core_question"])]),
            hook: string_or_dash(&[signal.field(&["content_blueprint", "hook"])]),
            outline: text_list(signal.field(&["content_blueprint", "outline"])),
            framework_name: string_or_dash(&[signal.field(&[
                "content_blueprint",
                "framework_or_tool",
                "name",
            ])]),
            framework_steps: text_list(signal.field(&[
                "content_blueprint",
                "framework_or_tool",
                "steps",
            ])),
            why_now: string_or_dash(&[signal.field(&["why_now"])]),
            confidence_score: signal.confidence_score(),
        }
    }
}

impl EvidenceAggregate {
    pub fn from_signal(signal: &Signal) -> Self {
        let number =
            |key: &str| signal.field(&["evidence", "aggregate", key]).and_then(Value::as_f64);
        Self {
            evidence_strength: number("evidence_strength"),
            coverage_videos: number("coverage_videos"),
            recurrence_score: number("recurrence_score"),
            top_like_count: number("top_like_count"),
        }
    }
}

/// Viewer demand in one line: `demand_statement`, else `demand.one_liner`,
/// else `demand` when it is itself a string, else "-".
pub fn demand_statement(signal: &Signal) -> String {
    string_or_dash(&[
        signal.field(&["demand_statement"]),
        signal.field(&["demand", "one_liner"]),
        signal.field(&["demand"]),
    ])
}

/// First candidate holding a non-empty string, else "-".
fn string_or_dash(candidates: &[Option<&Value>]) -> String {
    candidates
        .iter()
        .flatten()
        .filter_map(|value| value.as_str())
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "-".to_string())
}

/// A value counts as present unless it is missing, null, or an empty string.
fn present<'a>(value: Option<&'a Value>) -> Option<&'a Value> {
    value.filter(|v| !v.is_null() && v.as_str().is_none_or(|s| !s.trim().is_empty()))
}

fn either<'a>(signal: &'a Signal, primary: &[&str], fallback: &[&str]) -> Option<&'a Value> {
    present(signal.field(primary)).or_else(|| present(signal.field(fallback)))
}

/// First of the two locations holding an array, else empty.
fn value_array(signal: &Signal, primary: &[&str], fallback: &[&str]) -> Vec<Value> {
    for path in [primary, fallback] {
        if let Some(Value::Array(items)) = signal.field(path) {
            return items.clone();
        }
    }
    Vec::new()
}

/// Normalize a loosely-typed list-ish value into trimmed non-empty strings.
/// Arrays may mix strings and `{text: ...}` objects; a bare string is split
/// into lines or sentences.
pub fn text_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| {
                let text = match item {
                    Value::String(text) => text.trim(),
                    Value::Object(obj) => obj
                        .get("text")
                        .and_then(Value::as_str)
                        .map(str::trim)
                        .unwrap_or(""),
                    _ => "",
                };
                (!text.is_empty()).then(|| text.to_string())
            })
            .collect(),
        Some(Value::String(text)) => split_sentences(text),
        _ => Vec::new(),
    }
}

/// Split a block of prose into display lines: on newlines when any are
/// present, otherwise after sentence-ending punctuation followed by
/// whitespace.
pub fn split_sentences(text: &str) -> Vec<String> {
    let normalized = text.trim();
    if normalized.is_empty() {
        return Vec::new();
    }

    if normalized.contains('\n') {
        return normalized
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
    }

    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = normalized.chars().peekable();
    while let Some(ch) = chars.next() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?') && chars.peek().is_some_and(|next| next.is_whitespace()) {
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
        }
    }
    let tail = current.trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

/// Normalize a content plan. Objects get the recognized horizon keys first in
/// fixed order with spaced labels, then every remaining string-valued key in
/// the object's own order.
pub fn content_plan_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(_)) | Some(Value::String(_)) => text_list(value),
        Some(Value::Object(plan)) => {
            let mut entries = Vec::new();
            for key in CONTENT_PLAN_KEYS {
                if let Some(text) = plan.get(key).and_then(Value::as_str) {
                    let text = text.trim();
                    if !text.is_empty() {
                        entries.push(format!("{}: {}", key.replace('_', " "), text));
                    }
                }
            }
            for (key, raw) in plan {
                if CONTENT_PLAN_KEYS.contains(&key.as_str()) {
                    continue;
                }
                let Some(text) = raw.as_str() else { continue };
                let text = text.trim();
                if !text.is_empty() {
                    entries.push(format!("{key}: {text}"));
                }
            }
            entries
        }
        _ => Vec::new(),
    }
}

/// Normalize tradeoffs: strings pass through, objects become
/// `"<left> vs <right>[ - <note>]"` when both sides are present, else the
/// note alone, else dropped.
pub fn tradeoff_list(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(text) if !text.is_empty() => Some(text.clone()),
            Value::Object(obj) => {
                let left = first_scalar(obj, &["left", "a", "option_a"]);
                let right = first_scalar(obj, &["right", "b", "option_b"]);
                let note = first_scalar(obj, &["note", "description"]);
                match (left, right) {
                    (Some(left), Some(right)) => Some(match note {
                        Some(note) => format!("{left} vs {right} - {note}"),
                        None => format!("{left} vs {right}"),
                    }),
                    _ => note,
                }
            }
            _ => None,
        })
        .collect()
}

/// First key holding a truthy scalar: a non-empty string, a non-zero number,
/// or `true`. Non-strings render through their JSON display.
fn first_scalar(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(scalar_token)
}

fn scalar_token(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(number) if number.as_f64() != Some(0.0) => Some(number.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// Supporting comments from `evidence.supporting_comments`, falling back to
/// the legacy top-level location.
pub fn supporting_comments(signal: &Signal) -> Vec<SupportingComment> {
    value_array(signal, &["evidence", "supporting_comments"], &["supporting_comments"])
        .iter()
        .map(SupportingComment::from_value)
        .collect()
}

impl SupportingComment {
    pub fn from_value(value: &Value) -> Self {
        Self {
            text: str_field(value, "text").or_else(|| str_field(value, "comment_text")),
            author: str_field(value, "author"),
            like_count: value.get("like_count").and_then(Value::as_i64).unwrap_or(0),
            video_id: str_field(value, "video_id"),
            video_title: str_field(value, "video_title"),
            thumbnail_url: str_field(value, "thumbnail_url"),
            video_published_at: str_field(value, "video_published_at"),
        }
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Evidence videos: a non-empty `source_videos` array on the signal is used
/// as-is; only the derived path (from supporting comments) drops entries
/// without a `video_id` and deduplicates keeping the first occurrence per
/// video.
pub fn source_videos(signal: &Signal, comments: &[SupportingComment]) -> Vec<SourceVideo> {
    if let Some(Value::Array(items)) = signal.field(&["source_videos"]) {
        if !items.is_empty() {
            return items.iter().map(SourceVideo::from_value).collect();
        }
    }

    let mut seen = HashSet::new();
    comments
        .iter()
        .filter_map(|comment| {
            let video_id = comment.video_id.clone()?;
            seen.insert(video_id.clone()).then(|| SourceVideo {
                video_id: Some(video_id),
                video_title: comment.video_title.clone(),
                thumbnail_url: comment.thumbnail_url.clone(),
                video_published_at: comment.video_published_at.clone(),
            })
        })
        .collect()
}

impl SourceVideo {
    pub fn from_value(value: &Value) -> Self {
        Self {
            video_id: str_field(value, "video_id"),
            video_title: str_field(value, "video_title"),
            thumbnail_url: str_field(value, "thumbnail_url"),
            video_published_at: str_field(value, "video_published_at"),
        }
    }
}

/// Display label for an optional score: integral values print without a
/// decimal point, missing prints "-".
pub fn num_or_dash(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 && v.is_finite() => format!("{}", v as i64),
        Some(v) => format!("{v}"),
        None => "-".to_string(),
    }
}
