// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Subcommand implementations.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use fzindex::{Cancellable, Completion, FuzzyIndex, IndexBuilder, QueryOptions, Value};

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};

use super::display::{self, *};

/// One line of `build` input.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InputEntry {
    key: String,
    #[serde(default)]
    document: serde_json::Value,
    #[serde(default)]
    priority: u8,
}

// ============================================================================
// PROGRESS
// ============================================================================

#[cfg(feature = "progress")]
fn create_progress_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.cyan} {prefix:<12} [{bar:40.cyan/dim}] {pos}/{len} {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("━━╸")
}

/// Progress bar that compiles away without the `progress` feature.
struct Progress {
    #[cfg(feature = "progress")]
    bar: ProgressBar,
}

impl Progress {
    #[allow(unused_variables)]
    fn new(len: u64, prefix: &'static str) -> Self {
        #[cfg(feature = "progress")]
        {
            let bar = if atty::is(atty::Stream::Stderr) {
                ProgressBar::new(len)
            } else {
                ProgressBar::hidden()
            };
            bar.set_style(create_progress_style());
            bar.set_prefix(prefix);
            Self { bar }
        }
        #[cfg(not(feature = "progress"))]
        {
            Self {}
        }
    }

    fn inc(&self) {
        #[cfg(feature = "progress")]
        self.bar.inc(1);
    }

    #[allow(unused_variables)]
    fn finish(&self, message: String) {
        #[cfg(feature = "progress")]
        self.bar.finish_with_message(message);
    }
}

// ============================================================================
// BUILD
// ============================================================================

pub fn run_build(input: &str, output: &str, case_sensitive: bool, meta: &[String]) -> Result<()> {
    let started = Instant::now();
    let text = fs::read_to_string(input).with_context(|| format!("failed to read {}", input))?;
    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .collect();

    let mut builder = IndexBuilder::new(case_sensitive);
    for entry in meta {
        let (key, value) = parse_meta(entry)?;
        builder.set_metadata(key, value)?;
    }

    let progress = Progress::new(lines.len() as u64, "Reading");
    for (number, line) in &lines {
        let entry: InputEntry = serde_json::from_str(line)
            .with_context(|| format!("{}:{}: invalid entry", input, number + 1))?;
        builder
            .insert(&entry.key, &Value::from_json(&entry.document), entry.priority)
            .with_context(|| format!("{}:{}: cannot insert {:?}", input, number + 1, entry.key))?;
        progress.inc();
    }
    progress.finish(format!("read {} entries", lines.len()));

    if builder.is_empty() {
        eprintln!("⚠️  {} has no entries; writing an empty index", input);
    }

    let (keys, documents, entries) = (builder.key_count(), builder.document_count(), builder.len());
    match builder.write(output, &Cancellable::new())? {
        Completion::Done(()) => {}
        Completion::Cancelled => bail!("build of {} was cancelled", output),
    }
    let size = fs::metadata(output)
        .with_context(|| format!("failed to stat {}", output))?
        .len() as usize;

    println!();
    section_top("BUILD");
    field("output", &strong(output));
    field("size", &format_size(size));
    field("keys", &keys.to_string());
    field("documents", &documents.to_string());
    field("insertions", &entries.to_string());
    field(
        "case",
        if case_sensitive { "sensitive" } else { "folded" },
    );
    field(
        "time",
        &timing_ms(started.elapsed().as_secs_f64() * 1000.0),
    );
    section_bot();
    Ok(())
}

/// Split `key=value`, storing the value typed when it is valid JSON.
fn parse_meta(entry: &str) -> Result<(&str, Value)> {
    let Some((key, raw)) = entry.split_once('=') else {
        bail!("metadata must be key=value, got {:?}", entry);
    };
    if key.is_empty() {
        bail!("metadata key is empty in {:?}", entry);
    }
    let value = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json) => Value::from_json(&json),
        Err(_) => Value::from(raw),
    };
    Ok((key, value))
}

// ============================================================================
// INSPECT
// ============================================================================

pub fn run_inspect(file: &str) -> Result<()> {
    let index = FuzzyIndex::load(file).with_context(|| format!("failed to load {}", file))?;
    let stats = index.stats();
    let name = Path::new(file)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string());

    println!();
    double_header();
    title(&format!("FZINDEX  {}", name));
    double_footer();

    section_top("OVERVIEW");
    field("file size", &format_size(stats.file_size));
    field("format", &format!("v{}", fzindex::binary::FORMAT_VERSION));
    field(
        "case",
        if stats.case_sensitive { "sensitive" } else { "folded" },
    );
    field("keys", &stats.keys.to_string());
    field("documents", &stats.documents.to_string());
    field("insertions", &stats.lookaside.to_string());
    field("characters", &stats.characters.to_string());
    field("table entries", &stats.table_entries.to_string());

    section_mid("SECTIONS");
    let sections = [
        ("metadata", stats.sections.metadata),
        ("keys", stats.sections.keys),
        ("lookaside", stats.sections.lookaside),
        ("tables", stats.sections.tables),
        ("documents", stats.sections.documents),
    ];
    for (label, size) in sections {
        row(&format!(
            " {}{}  {}",
            pad_right(label, 16),
            pad_left(&format_size(size), 12),
            percent(size, stats.file_size)
        ));
    }

    section_mid("CHARACTERS");
    let characters: String = index.characters().into_iter().collect();
    for chunk in characters.chars().collect::<Vec<_>>().chunks(BOX_WIDTH - 4) {
        row(&format!(" {}", chunk.iter().collect::<String>()));
    }

    section_mid("METADATA");
    for (key, value) in index.metadata() {
        field(key, &display::truncate(&value.to_json().to_string(), BOX_WIDTH - 20));
    }
    section_bot();
    Ok(())
}

// ============================================================================
// QUERY
// ============================================================================

pub fn run_query(file: &str, text: &str, limit: usize, case_sensitive: bool) -> Result<()> {
    let index = Arc::new(FuzzyIndex::load(file).with_context(|| format!("failed to load {}", file))?);

    let mut options = QueryOptions::new().with_max_matches(limit);
    if case_sensitive {
        options = options.with_case_sensitive(true);
    }

    let started = Instant::now();
    let matches = match index.query(text, options, &Cancellable::new())? {
        Completion::Done(matches) => matches,
        Completion::Cancelled => bail!("query was cancelled"),
    };
    let elapsed = started.elapsed().as_secs_f64() * 1000.0;

    println!();
    section_top(&format!("QUERY \"{}\"", text));
    if matches.is_empty() {
        row(&format!(" {}", dim("no matches")));
    }
    for (rank, m) in matches.iter().enumerate() {
        let document = display::truncate(&m.document.to_json().to_string(), 30);
        row(&format!(
            " {} {} {} {}  {}",
            pad_left(&format!("{}.", rank + 1), 4),
            score_value(m.score),
            priority_badge(m.priority),
            pad_right(&strong(&display::truncate(m.key, 28)), 28),
            dim(&document)
        ));
    }
    section_mid("SUMMARY");
    field("matches", &matches.len().to_string());
    field("time", &timing_ms(elapsed));
    section_bot();
    Ok(())
}
