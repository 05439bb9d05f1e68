use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Language sent with generation requests. The backend prompts are Korean.
pub const DEFAULT_LANGUAGE: &str = "ko";

/// Fixed parameters for script generation.
pub const SCRIPT_TARGET_LENGTH_SEC: u32 = 180;
pub const SCRIPT_STYLE: &str = "informative";

// --- Comment collection (stage 1) ---

/// Request for `/api/v1/strategy/youtube/comments`.
#[derive(Debug, Clone, Serialize)]
pub struct CommentCollectionRequest {
    pub channel_handle: String,
    pub max_videos: u32,
    pub max_comments_per_video: u32,
}

/// One collected comment. Only `text` is guaranteed by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectedComment {
    #[serde(default)]
    pub comment_id: Option<String>,
    #[serde(default)]
    pub parent_comment_id: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    pub text: String,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

/// Comments grouped under one video in the collection response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoComments {
    pub video_id: String,
    #[serde(default)]
    pub video_title: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub comment_count: i64,
    #[serde(default)]
    pub comments: Vec<CollectedComment>,
}

impl VideoComments {
    /// Convert to the stage-2 request shape: `video_title` becomes `title`,
    /// comments are stripped to the four fields the signal extractor reads.
    /// `comment_error` stays empty — collection either fully succeeds or the
    /// whole request fails.
    pub fn to_signal_video(&self) -> SignalVideo {
        SignalVideo {
            video_id: self.video_id.clone(),
            title: self.video_title.clone(),
            thumbnail_url: self.thumbnail_url.clone(),
            published_at: self.published_at,
            comments: self
                .comments
                .iter()
                .map(|comment| SignalComment {
                    author: comment.author.clone(),
                    text: comment.text.clone(),
                    published_at: comment.published_at,
                    like_count: comment.like_count,
                })
                .collect(),
            comment_error: None,
        }
    }
}

/// Response from `/api/v1/strategy/youtube/comments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentCollectionResult {
    pub channel_handle: String,
    pub channel_id: String,
    #[serde(default)]
    pub channel_name: Option<String>,
    #[serde(default)]
    pub channel_thumbnail_url: Option<String>,
    #[serde(default)]
    pub subscriber_count: Option<i64>,
    #[serde(default)]
    pub video_count: i64,
    #[serde(default)]
    pub videos: Vec<VideoComments>,
}

impl CommentCollectionResult {
    /// Map the whole collection into the stage-2 request's video list.
    pub fn to_signal_videos(&self) -> Vec<SignalVideo> {
        self.videos.iter().map(VideoComments::to_signal_video).collect()
    }
}

// --- Signal extraction (stage 2) ---

/// One comment in the stage-2 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalComment {
    pub author: Option<String>,
    pub text: String,
    pub published_at: Option<DateTime<Utc>>,
    pub like_count: i64,
}

/// One video in the stage-2 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalVideo {
    pub video_id: String,
    pub title: Option<String>,
    pub thumbnail_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub comments: Vec<SignalComment>,
    pub comment_error: Option<String>,
}

/// Comment filters applied by the signal extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalFilters {
    pub min_like: i64,
    pub topk_per_video: u32,
    pub exclude_meme: bool,
    pub exclude_thumbnail_meta: bool,
    pub exclude_pure_praise: bool,
    pub dedupe: String,
}

impl Default for SignalFilters {
    fn default() -> Self {
        Self {
            min_like: 0,
            topk_per_video: 50,
            exclude_meme: true,
            exclude_thumbnail_meta: true,
            exclude_pure_praise: true,
            dedupe: "semantic".to_string(),
        }
    }
}

/// Request for `/api/v1/strategy/signals/from-comments`.
#[derive(Debug, Clone, Serialize)]
pub struct SignalRequest {
    pub language: String,
    pub videos: Vec<SignalVideo>,
    pub filters: SignalFilters,
}

impl SignalRequest {
    pub fn new(videos: Vec<SignalVideo>) -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            videos,
            filters: SignalFilters::default(),
        }
    }
}

/// A backend-produced signal. Only `signal_id` is a stable contract; every
/// other field varies across backend versions, so the rest of the payload is
/// kept as an opaque map and read through defensive accessors. The flatten
/// round-trips on serialize, so stage 3 receives the signal unmodified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub signal_id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Signal {
    /// Walk a nested path through the opaque fields.
    pub fn field(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.fields.get(*first)?;
        for key in rest {
            current = current.get(*key)?;
        }
        Some(current)
    }

    pub fn title(&self) -> Option<&str> {
        self.fields.get("title").and_then(Value::as_str)
    }

    pub fn confidence_score(&self) -> Option<f64> {
        self.field(&["confidence", "score"]).and_then(Value::as_f64)
    }
}

/// Response from `/api/v1/strategy/signals/from-comments`. Extras (`meta`,
/// `quality_checks`, `model`) are carried but not interpreted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalOutput {
    #[serde(default)]
    pub signals: Vec<Signal>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// --- Script generation (stage 3) ---

/// Request for `/api/v1/strategy/scripts/from-signal`. The whole selected
/// signal goes back to the backend alongside its id.
#[derive(Debug, Clone, Serialize)]
pub struct ScriptRequest {
    pub signal: Signal,
    pub signal_id: String,
    pub language: String,
    pub target_length_sec: u32,
    pub style: String,
}

impl ScriptRequest {
    pub fn for_signal(signal: &Signal) -> Self {
        Self {
            signal: signal.clone(),
            signal_id: signal.signal_id.clone(),
            language: DEFAULT_LANGUAGE.to_string(),
            target_length_sec: SCRIPT_TARGET_LENGTH_SEC,
            style: SCRIPT_STYLE.to_string(),
        }
    }
}

/// One timed unit of a generated script. The backend emits either a bare
/// string or an object; decoded as a union rather than duck-typed at the
/// call sites.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Segment {
    Text(String),
    Structured(StructuredSegment),
    /// Anything else (null included). Renders as "-".
    Other(Value),
}

/// Fields are kept as raw `Value`s: one wrong-typed field must not knock a
/// whole segment down to the `Other` catch-all. The accessors below apply
/// the type checks instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredSegment {
    #[serde(default)]
    pub dialogue: Option<Value>,
    #[serde(default)]
    pub text: Option<Value>,
    #[serde(default)]
    pub time_range: Option<Value>,
    #[serde(default)]
    pub start_time_seconds: Option<Value>,
    #[serde(default)]
    pub end_time_seconds: Option<Value>,
}

impl StructuredSegment {
    fn string_field(field: &Option<Value>) -> Option<&str> {
        non_empty(field.as_ref().and_then(Value::as_str))
    }

    fn number_field(field: &Option<Value>) -> Option<f64> {
        field.as_ref().and_then(Value::as_f64)
    }
}

impl Segment {
    /// Spoken text of the segment: the string itself, else `dialogue`, else
    /// `text`, else "-".
    pub fn display_text(&self) -> String {
        match self {
            Segment::Text(text) => text.clone(),
            Segment::Structured(seg) => {
                if let Some(dialogue) = StructuredSegment::string_field(&seg.dialogue) {
                    dialogue.to_string()
                } else if let Some(text) = StructuredSegment::string_field(&seg.text) {
                    text.to_string()
                } else {
                    "-".to_string()
                }
            }
            Segment::Other(_) => "-".to_string(),
        }
    }

    /// Timing window label: an explicit `time_range` wins, else composed from
    /// whichever of start/end seconds are present as numbers.
    pub fn time_label(&self) -> String {
        let Segment::Structured(seg) = self else {
            return "-".to_string();
        };
        if let Some(range) = StructuredSegment::string_field(&seg.time_range) {
            return range.to_string();
        }
        let start = StructuredSegment::number_field(&seg.start_time_seconds);
        let end = StructuredSegment::number_field(&seg.end_time_seconds);
        match (start, end) {
            (Some(start), Some(end)) => format!("{}-{}s", fmt_seconds(start), fmt_seconds(end)),
            (Some(start), None) => format!("{}s-", fmt_seconds(start)),
            (None, Some(end)) => format!("-{}s", fmt_seconds(end)),
            (None, None) => "-".to_string(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

fn fmt_seconds(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// The script body of a stage-3 response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub hook_0_15s: Option<Segment>,
    #[serde(default)]
    pub body_15_150s: Vec<Segment>,
    #[serde(default)]
    pub closing_150_180s: Option<Segment>,
}

/// Response from `/api/v1/strategy/scripts/from-signal`. Extras
/// (`rationale_block`, `assets`, `model`) are carried but not interpreted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptOutput {
    #[serde(default)]
    pub script: Option<Script>,
    #[serde(default)]
    pub meta: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ScriptOutput {
    /// Script title, falling back to `meta.title` for older backend shapes.
    pub fn title(&self) -> Option<&str> {
        if let Some(title) = self
            .script
            .as_ref()
            .and_then(|s| non_empty(s.title.as_deref()))
        {
            return Some(title);
        }
        self.meta.as_ref()?.get("title")?.as_str()
    }
}
