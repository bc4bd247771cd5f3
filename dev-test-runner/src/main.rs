//! Property harness: order independence and idempotence over fixture corpora.
use colored::Colorize;
use serde_json::json;
use shape_infer::{infer, synth, InferenceConfig, Value};

struct Fixture {
    name: &'static str,
    docs: Vec<serde_json::Value>,
    config: InferenceConfig,
}

/// Proto-like payloads: position-based tuples padded with nulls.
fn tuple_samples() -> Vec<serde_json::Value> {
    vec![
        json!(["0ahUKEa1ZQ", "Acme Widgets", [null, [37.4219, -122.0840], null], "https://example.com/a", 4.3, true, ["hardware", "store"], null]),
        json!(["0ahUKEa2ZQ", "Acme Widgets - East", [null, [37.4200, -122.0830], null], null, 4.5, null, ["hardware"], null]),
        json!(["0ahUKEa3ZQ", null, [null, [37.4225, -122.0855], null], "https://example.com/c", null, false, [], null]),
        json!(["0ahUKEa4ZQ", "ACME", null, null, 4, null, ["store", "tools"], null]),
        json!(["0ahUKEa6ZQ", "Acme Central", [null, null, null], null, null, null, ["tools"], null]),
    ]
}

fn match_events() -> Vec<serde_json::Value> {
    let mut docs = Vec::new();
    for i in 0..40 {
        let doc = match i % 3 {
            0 => json!({"type": "goal", "minute": i, "scorer": format!("player {i}"), "assist": if i % 2 == 0 { json!(null) } else { json!("x") }}),
            1 => json!({"type": "card", "minute": i, "color": if i % 2 == 0 { "red" } else { "yellow" }, "player": format!("player {i}")}),
            _ => json!({"type": "substitution", "minute": i, "in": format!("p{i}"), "out": format!("q{i}")}),
        };
        docs.push(doc);
    }
    docs
}

fn log_lines() -> Vec<serde_json::Value> {
    let levels = ["debug", "info", "warn", "error"];
    (0..80)
        .map(|i| {
            json!({
                "at": format!("2024-03-{:02}T10:{:02}:00Z", i % 28 + 1, i % 60),
                "level": levels[i % levels.len()],
                "message": format!("event number {i}"),
                "context": {"host": format!("node-{i}"), "pid": 1000 + i},
            })
        })
        .collect()
}

fn fixtures() -> Vec<Fixture> {
    vec![
        Fixture { name: "tuples", docs: tuple_samples(), config: InferenceConfig::default() },
        Fixture { name: "match events", docs: match_events(), config: InferenceConfig::default() },
        Fixture {
            name: "log lines with enums",
            docs: log_lines(),
            config: InferenceConfig::builder().infer_enums(true).build(),
        },
    ]
}

fn check(fixture: &Fixture) -> anyhow::Result<Vec<String>> {
    let docs: Vec<Value> = fixture.docs.iter().cloned().map(Value::from).collect();
    let base = infer(&docs, &fixture.config)?;
    let mut problems = Vec::new();

    let mut reversed = docs.clone();
    reversed.reverse();
    let mut rotated = docs.clone();
    rotated.rotate_left(docs.len() / 3);
    for (label, permuted) in [("reversed", reversed), ("rotated", rotated)] {
        if infer(&permuted, &fixture.config)?.canonical() != base.canonical() {
            problems.push(format!("{label} corpus infers a different type"));
        }
    }

    let again = infer(&synth::exemplars(&base), &fixture.config)?;
    if again != base {
        problems.push("exemplars re-infer to a different type".to_string());
    }
    Ok(problems)
}

fn main() -> anyhow::Result<()> {
    let mut failed = 0;
    for fixture in fixtures() {
        let problems = check(&fixture)?;
        if problems.is_empty() {
            println!("{} {}", "ok".green().bold(), fixture.name);
        } else {
            failed += 1;
            println!("{} {}", "FAILED".red().bold(), fixture.name);
            for p in problems {
                println!("    {p}");
            }
        }
    }
    if failed > 0 {
        anyhow::bail!("{failed} fixture(s) failed");
    }
    Ok(())
}
