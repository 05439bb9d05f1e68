use anyhow::{bail, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use strategy_client::StrategyClient;
use youticle_workspace::{
    fields::{num_or_dash, SignalFields},
    handle, ChannelQuery, Config, Workspace, WorkspaceResult,
};

const DEFAULT_MAX_VIDEOS: u32 = 2;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("youticle=info".parse()?))
        .init();

    let mut want_script = false;
    let mut positional = Vec::new();
    for arg in std::env::args().skip(1) {
        if arg == "--script" {
            want_script = true;
        } else {
            positional.push(arg);
        }
    }

    let Some(raw_input) = positional.first() else {
        bail!("usage: youticle <handle-or-url> [max_videos] [--script]");
    };
    let max_videos = match positional.get(1) {
        Some(value) => value
            .parse()
            .map_err(|_| anyhow::anyhow!("max_videos must be a number, got '{value}'"))?,
        None => DEFAULT_MAX_VIDEOS,
    };

    let Some(channel_handle) = handle::parse_channel_handle(raw_input) else {
        bail!("could not read a channel handle from '{raw_input}'");
    };
    if !handle::is_valid_handle(&channel_handle) {
        bail!(
            "'{channel_handle}' is not a valid handle (expected @ followed by 3-30 of letters, digits, '.', '_', '-')"
        );
    }

    let config = Config::from_env();
    info!(
        strategy_api_url = %config.strategy_api_url,
        channel_handle = %channel_handle,
        max_videos,
        "Starting strategy workspace"
    );

    let mut workspace = Workspace::new(StrategyClient::new(config.strategy_api_url));
    workspace
        .submit(ChannelQuery::new(channel_handle, max_videos))
        .await;
    if let Some(message) = workspace.error_message() {
        bail!("{message}");
    }

    let result = workspace
        .result()
        .expect("submission succeeded without a result");
    print_channel(result);
    print_signal_list(result);

    if let Some(signal) = result.selected_signal.as_ref() {
        print_signal_detail(&SignalFields::from_signal(signal));
    }

    if want_script {
        workspace.generate_script().await;
        if let Some(message) = workspace.error_message() {
            bail!("{message}");
        }
        if let Some(script_output) = workspace
            .result()
            .and_then(|result| result.script_output.as_ref())
        {
            print_script(script_output);
        }
    }

    Ok(())
}

fn print_channel(result: &WorkspaceResult) {
    println!("Channel      {}", result.channel_handle);
    println!("Name         {}", result.channel_name.as_deref().unwrap_or("-"));
    println!("Channel ID   {}", result.channel_id);
    println!(
        "Subscribers  {}",
        result
            .subscriber_count
            .map(|count| count.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    println!("Videos       {}", result.video_count);
    println!();
}

fn print_signal_list(result: &WorkspaceResult) {
    println!("Signals ({})", result.signal_output.signals.len());
    for signal in &result.signal_output.signals {
        let marker = if result
            .selected_signal
            .as_ref()
            .is_some_and(|selected| selected.signal_id == signal.signal_id)
        {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {}  {}  (confidence: {})",
            signal.signal_id,
            signal.title().unwrap_or("Untitled Signal"),
            num_or_dash(signal.confidence_score())
        );
    }
    println!();
}

fn print_signal_detail(fields: &SignalFields) {
    println!("== Decision ==");
    println!("Q. {}", fields.core_question);
    println!("Viewer demand: {}", fields.demand_statement);
    print_list("Actionables", &fields.actionables);
    print_list("Content plan", &fields.content_plan);

    println!("== Evidence ==");
    println!(
        "evidence_strength: {}  coverage_videos: {}  recurrence_score: {}  top_like_count: {}",
        num_or_dash(fields.aggregate.evidence_strength),
        num_or_dash(fields.aggregate.coverage_videos),
        num_or_dash(fields.aggregate.recurrence_score),
        num_or_dash(fields.aggregate.top_like_count),
    );
    for video in &fields.source_videos {
        println!(
            "  video {}  {}  {}",
            video.video_id.as_deref().unwrap_or("-"),
            video.video_title.as_deref().unwrap_or("(untitled)"),
            video.video_published_at.as_deref().unwrap_or("")
        );
    }
    print_list("Observations", &fields.observations);
    for comment in &fields.supporting_comments {
        println!(
            "  \"{}\" — {} (likes: {}, video: {})",
            comment.text.as_deref().unwrap_or("-"),
            comment.author.as_deref().unwrap_or("unknown"),
            comment.like_count,
            comment.video_id.as_deref().unwrap_or("-"),
        );
    }
    if !fields.excluded_examples.is_empty() {
        println!("Excluded comments:");
        for example in &fields.excluded_examples {
            let text = example
                .get("text")
                .or_else(|| example.get("comment_text"))
                .and_then(|value| value.as_str())
                .unwrap_or("-");
            match example.get("reason").and_then(|value| value.as_str()) {
                Some(reason) => println!("  x \"{text}\" ({reason})"),
                None => println!("  x \"{text}\""),
            }
        }
    }

    println!("== Interpretation ==");
    print_list("Inference steps", &fields.inference_steps);
    println!("Root cause: {}", fields.root_cause_hypothesis);
    println!("Explanation: {}", fields.explanation);
    print_list("Key tradeoffs", &fields.key_tradeoffs);
    print_list("Misconceptions to correct", &fields.misconceptions_to_correct);
    println!("Why now: {}", fields.why_now);
    println!();
}

fn print_list(label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("{label}:");
    for item in items {
        println!("  - {item}");
    }
}

fn print_script(script_output: &strategy_client::ScriptOutput) {
    println!("== Script ==");
    println!("Title: {}", script_output.title().unwrap_or("-"));
    let Some(script) = script_output.script.as_ref() else {
        return;
    };
    if let Some(hook) = script.hook_0_15s.as_ref() {
        println!("Hook: {}", hook.display_text());
    }
    for segment in &script.body_15_150s {
        println!("[{}] {}", segment.time_label(), segment.display_text());
    }
    if let Some(closing) = script.closing_150_180s.as_ref() {
        println!("Closing: {}", closing.display_text());
    }
}
