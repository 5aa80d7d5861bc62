// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use morphwood::config::MorphBuilder;
use morphwood::engine::Morph;
use morphwood::events::{Event, StreamReceiver};
use std::env;
use std::fs;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Prints output events as an indented tree.
#[derive(Default)]
struct PrintingReceiver {
    depth: usize,
}

impl PrintingReceiver {
    fn indent(&self) -> String {
        "  ".repeat(self.depth)
    }
}

impl StreamReceiver for PrintingReceiver {
    fn start_record(&mut self, id: &str) {
        println!("📄 record '{}'", id);
        self.depth = 1;
    }

    fn end_record(&mut self) {
        self.depth = 0;
        println!();
    }

    fn start_entity(&mut self, name: &str) {
        println!("{}📁 {}", self.indent(), name);
        self.depth += 1;
    }

    fn end_entity(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn literal(&mut self, name: &str, value: &str) {
        println!("{}{} = {:?}", self.indent(), name, value);
    }

    fn reset_stream(&mut self) {
        println!("🔄 stream reset");
    }

    fn close_stream(&mut self) {
        println!("🔒 stream closed");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <rules.yaml|rules.toml> [rules ...] <events.json>", args[0]);
        eprintln!("Example: {} configs/title-author.yaml configs/events/sample-record.json", args[0]);
        eprintln!("Example: {} configs/title-author.yaml configs/subjects.toml configs/events/sample-record.json", args[0]);
        std::process::exit(1);
    }

    // The last argument is the event script, everything before it is a rule file
    let events_file = &args[args.len() - 1];
    let rule_files = &args[1..args.len() - 1];

    let script = fs::read_to_string(events_file)
        .with_context(|| format!("Failed to read event script {}", events_file))?;
    let events: Vec<Event> = serde_json::from_str(&script)
        .with_context(|| format!("Failed to parse event script {}", events_file))?;

    println!("🚀 Morphwood");
    println!("═══════════════════════════════════");
    println!("Events: {} ({} events)", events_file, events.len());
    println!("Rule files: {:?}", rule_files);

    let builder = MorphBuilder::new();
    for rule_file in rule_files {
        println!("\n{}", "─".repeat(80));
        if let Err(e) = run_rules(&builder, rule_file, &events) {
            eprintln!("❌ Failed to run {}: {:#}", rule_file, e);
        }
    }

    println!("\n🎉 Done!");
    Ok(())
}

fn run_rules(builder: &MorphBuilder, rule_file: &str, events: &[Event]) -> Result<()> {
    let compiled = builder
        .load(rule_file)
        .with_context(|| format!("Failed to build rules from {}", rule_file))?;

    println!("📋 Rules: {}", rule_file);
    println!(
        "🔧 {} nodes, {} patterns, {} collectors",
        compiled.node_count(),
        compiled.pattern_count(),
        compiled.collector_count()
    );
    println!();

    let start = Instant::now();
    let mut morph = Morph::new(Arc::new(compiled), PrintingReceiver::default());
    let mut failures = 0;
    for event in events {
        if let Err(e) = morph.process(event) {
            failures += 1;
            eprintln!("⚠️  {}", e);
        }
    }
    morph.close_stream();

    println!("\n📊 Results:");
    println!("⏱️  Processing Time: {:?}", start.elapsed());
    println!("🔢 Records: {}", morph.record_count());
    println!("❗ Errors: {}", failures);
    Ok(())
}
