//! CLI: infer → (ir | tree | sample)
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;

use crate::adapter::{self, InputFormat, Parsed, Selection};
use crate::config::{InferenceConfig, SampleStrategy};
use crate::ir::InferredType;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// infer a structural schema from JSON/NDJSON/XML documents
#[derive(Parser, Debug)]
#[command(name = "shape-infer", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// infer and print the type as JSON
    Infer(Target),
    /// infer and print a readable type tree
    Tree(Target),
    /// infer and print a synthetic NDJSON corpus of that type
    Sample(Target),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false, conflicts_with = "xml")]
    ndjson: bool,

    /// treat input as XML
    #[arg(long, default_value_t = false)]
    xml: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document.
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct InferenceSettings {
    /// maximum number of documents to sample (0 = all)
    #[arg(long, default_value_t = 0)]
    sample_size: usize,

    /// sample evenly across the corpus instead of taking the first documents
    #[arg(long, default_value_t = false)]
    stride: bool,

    /// never infer discriminated unions
    #[arg(long, default_value_t = false)]
    no_choices: bool,

    /// nesting levels at which discriminated unions are looked for
    #[arg(long, default_value_t = 1)]
    choice_depth: usize,

    /// promote low-cardinality string fields to enums
    #[arg(long, default_value_t = false)]
    enums: bool,

    /// name of the root record type
    #[arg(long, default_value = "Root")]
    root_name: String,
}

#[derive(Args, Debug)]
struct Target {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    inference_settings: InferenceSettings,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn selection(&self) -> Selection {
        Selection {
            json_pointer: self.json_pointer.clone(),
            jq_expr: self.jq_expr.clone(),
        }
    }

    fn format_for(&self, path: &Path) -> InputFormat {
        if self.ndjson {
            InputFormat::Ndjson
        } else if self.xml {
            InputFormat::Xml
        } else {
            InputFormat::from_path(path).unwrap_or_default()
        }
    }

    /// Parse every input in parallel; documents keep input order.
    fn load(&self) -> Result<Parsed> {
        let source_paths = resolve_file_path_patterns(&self.input).context("failed to resolve input file paths")?;
        let selection = self.selection();
        let per_file: Vec<Parsed> = source_paths
            .par_iter()
            .map(|path| adapter::load_file(path, self.format_for(path), &selection))
            .collect();
        let mut parsed = Parsed::default();
        for p in per_file {
            parsed.extend(p);
        }
        tracing::info!(
            files = source_paths.len(),
            documents = parsed.documents.len(),
            failures = parsed.failures.len(),
            "loaded inputs"
        );
        Ok(parsed)
    }
}

impl InferenceSettings {
    fn config(&self) -> InferenceConfig {
        InferenceConfig::builder()
            .sample_size(self.sample_size)
            .sample_strategy(if self.stride { SampleStrategy::Stride } else { SampleStrategy::Prefix })
            .infer_choices(!self.no_choices)
            .choice_depth(self.choice_depth)
            .infer_enums(self.enums)
            .root_name(self.root_name.clone())
            .build()
    }
}

impl Target {
    fn solve(&self) -> Result<InferredType> {
        let parsed = self.input_settings.load()?;
        for failure in &parsed.failures {
            eprintln!("{} {failure}", "skipped:".yellow().bold());
        }
        if parsed.documents.is_empty() && !parsed.failures.is_empty() {
            bail!("no input document could be parsed ({} failures)", parsed.failures.len());
        }
        let config = self.inference_settings.config();
        let ty = crate::inference::infer(&parsed.documents, &config).context("schema inference failed")?;
        Ok(ty)
    }

    fn write(&self, src: &str) -> Result<()> {
        match self.out.as_ref() {
            Some(out) => {
                if let Some(parent) = out.parent() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("failed to create {}", parent.display()))?;
                }
                std::fs::write(out, src).with_context(|| format!("failed to write {}", out.display()))?;
            }
            None => print!("{src}"),
        }
        Ok(())
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Infer(target) => {
                let ty = target.solve()?;
                let mut src = serde_json::to_string_pretty(&ty)?;
                src.push('\n');
                target.write(&src)
            }
            Command::Tree(target) => {
                let ty = target.solve()?;
                let color = target.out.is_none() && std::io::stdout().is_terminal();
                target.write(&crate::render::render_tree(&ty, color))
            }
            Command::Sample(target) => {
                let ty = target.solve()?;
                let mut src = String::new();
                for doc in crate::synth::exemplars(&ty) {
                    src.push_str(&serde_json::to_string(&serde_json::Value::from(&doc))?);
                    src.push('\n');
                }
                target.write(&src)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_into_config() {
        let cli = CommandLineInterface::try_parse_from([
            "shape-infer", "tree", "-i", "a.json", "--stride", "--sample-size", "10",
            "--no-choices", "--enums", "--root-name", "Event",
        ])
        .unwrap();
        let Command::Tree(target) = cli.cmd else { panic!("expected tree") };
        let config = target.inference_settings.config();
        assert_eq!(config.sample_size, 10);
        assert_eq!(config.sample_strategy, SampleStrategy::Stride);
        assert!(!config.infer_choices);
        assert!(config.infer_enums);
        assert_eq!(config.root_name, "Event");
    }

    #[test]
    fn format_flags_override_extensions() {
        let cli = CommandLineInterface::try_parse_from(["shape-infer", "infer", "-i", "a.json", "--ndjson"]).unwrap();
        let Command::Infer(target) = cli.cmd else { panic!("expected infer") };
        assert_eq!(target.input_settings.format_for(Path::new("a.json")), InputFormat::Ndjson);

        let cli = CommandLineInterface::try_parse_from(["shape-infer", "infer", "-i", "a.xml"]).unwrap();
        let Command::Infer(target) = cli.cmd else { panic!("expected infer") };
        assert_eq!(target.input_settings.format_for(Path::new("a.xml")), InputFormat::Xml);
        assert_eq!(target.input_settings.format_for(Path::new("a.txt")), InputFormat::Json);

        assert!(CommandLineInterface::try_parse_from(["shape-infer", "infer", "-i", "a", "--ndjson", "--xml"]).is_err());
    }

    #[test]
    fn literal_paths_pass_through_and_empty_globs_fail() {
        let paths = resolve_file_path_patterns(["some/file.json"]).unwrap();
        assert_eq!(paths, vec![PathBuf::from("some/file.json")]);
        assert!(resolve_file_path_patterns(["/definitely/not/here/*.json"]).is_err());
    }
}
