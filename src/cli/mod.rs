// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the fzindex command-line interface.
//!
//! Three subcommands: `build` turns a JSON-lines file into an index,
//! `inspect` shows how an index file is laid out, and `query` runs a fuzzy
//! query against one.

pub mod commands;
pub mod display;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "fzindex",
    about = "Build and query fuzzy subsequence search indexes",
    version
)]
pub struct Cli {
    /// Log more (-v for debug, -vv for trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build an index from a JSON-lines file
    ///
    /// Each line is an object `{"key": "...", "document": <any JSON>,
    /// "priority": 0-255}`. Priority is optional and defaults to 0, the most
    /// important.
    Build {
        /// Input .jsonl file
        #[arg(short, long)]
        input: String,

        /// Output index file
        #[arg(short, long)]
        output: String,

        /// Match keys exactly instead of folding case
        #[arg(long)]
        case_sensitive: bool,

        /// Extra metadata entry, as key=value (repeatable)
        ///
        /// Values that parse as JSON are stored typed; anything else is
        /// stored as a string.
        #[arg(long = "meta", value_name = "KEY=VALUE")]
        meta: Vec<String>,
    },

    /// Inspect an index file
    Inspect {
        /// Path to index file
        file: String,
    },

    /// Query an index file and display ranked matches
    Query {
        /// Path to index file
        file: String,

        /// Query text
        text: String,

        /// Maximum number of results to show (0 shows all)
        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// Match the query exactly, even against a case-folded index
        #[arg(long)]
        case_sensitive: bool,
    },
}
