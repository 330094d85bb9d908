//! CLI: catalog(s) → Rust binding, plus a normalizer debug view.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use serde_json::Value;

use openrpc_bindgen::naming::{to_field_identifier, to_type_identifier};
use openrpc_bindgen::{Document, NamingContext, Options, ShapePolicy, compile, document, jq_exec, scaffold};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// compile OpenRPC-style method catalogs into a typed async Rust client
#[derive(Parser, Debug)]
#[command(version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// compile one or more catalogs into Rust source
    Generate(GenerateOut),
    /// print the field and type identifier for raw names
    Ident(IdentOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON Pointer selecting the catalog inside each input (e.g. /api)
    #[arg(long)]
    json_pointer: Option<String>,

    /// jq filter applied to each input; must yield exactly one catalog
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct NamingSettings {
    /// JSON options file (kebab-case keys)
    #[arg(long)]
    config: Option<PathBuf>,

    /// directory of hand-written Rust to harvest words and renames from (repeatable)
    #[arg(long)]
    reference_corpus: Vec<PathBuf>,

    /// extra dictionary word for splitting fused names (repeatable)
    #[arg(long)]
    word: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct GenerateOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    naming: NamingSettings,

    /// fail on shapes that would otherwise degrade to `Value`
    #[arg(long)]
    strict: bool,

    /// output .rs file (stdout if omitted); single input only
    #[arg(short, long, conflicts_with = "out_dir")]
    out: Option<PathBuf>,

    /// output directory, one `<input stem>.rs` per input
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// crate directory to write Cargo.toml and src/lib.rs into when they are missing
    #[arg(long)]
    scaffold: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct IdentOut {
    /// raw names to normalize
    #[arg(required = true)]
    names: Vec<String>,

    #[command(flatten)]
    naming: NamingSettings,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_document(&self, path: &Path) -> Result<Document> {
        if self.json_pointer.is_none() && self.jq_expr.is_none() {
            return Ok(Document::load(path)?);
        }

        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog {}", path.display()))?;
        let mut value: Value = document::from_str_with_path(&source)?;
        if let Some(pointer) = self.json_pointer.as_deref() {
            value = value
                .pointer(pointer)
                .cloned()
                .with_context(|| format!("JSON pointer {pointer} selects nothing in {}", path.display()))?;
        }
        if let Some(jq_expr) = self.jq_expr.as_deref() {
            let outputs = jq_exec::run_jaq(jq_expr, &value)
                .with_context(|| format!("failed to apply jq expression to {}", path.display()))?;
            value = jq_exec::single_document(outputs)?;
        }
        Ok(Document::from_value(value)?)
    }
}

impl NamingSettings {
    fn options(&self) -> Result<Options> {
        let mut options = match self.config.as_deref() {
            Some(path) => Options::load(path)?,
            None => Options::default(),
        };
        options.reference_corpus.extend(self.reference_corpus.iter().cloned());
        options.extra_words.extend(self.word.iter().cloned());
        Ok(options)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Generate(target) => target.run(),
            Command::Ident(target) => target.run(),
        }
    }
}

impl GenerateOut {
    fn run(&self) -> Result<()> {
        // debug path
        if self.no_op {
            eprintln!("{self:#?}");
            return Ok(());
        }

        let mut options = self.naming.options()?;
        if self.strict {
            options.policy = ShapePolicy::Strict;
        }
        let naming = options.naming_context()?;

        let source_paths = resolve_file_path_patterns(&self.input_settings.input)?;
        if source_paths.len() > 1 && self.out_dir.is_none() {
            bail!("{} inputs need --out-dir", source_paths.len());
        }

        // one private registry per input; `naming` is shared read-only
        let compiled = source_paths
            .par_iter()
            .map(|path| -> Result<(PathBuf, String)> {
                let document = self.input_settings.load_document(path)?;
                let source = compile(&document, &naming, &options)
                    .with_context(|| format!("failed to compile {}", path.display()))?;
                tracing::info!(input = %path.display(), methods = document.methods.len(), "compiled");
                Ok((path.clone(), source))
            })
            .collect::<Result<Vec<_>>>()?;

        if let Some(dir) = self.scaffold.as_deref() {
            for written in scaffold::write_if_absent(dir, &options)? {
                eprintln!("{} {}", "scaffolded".cyan().bold(), written.display());
            }
        }

        for (path, source) in &compiled {
            match self.output_path(path) {
                Some(out) => {
                    write_output(&out, source)?;
                    eprintln!("{} {}", "wrote".green().bold(), out.display());
                }
                None => print!("{source}"),
            }
        }
        Ok(())
    }

    fn output_path(&self, input: &Path) -> Option<PathBuf> {
        if let Some(out) = &self.out {
            return Some(out.clone());
        }
        if let Some(dir) = &self.out_dir {
            let stem = input.file_stem().map(|stem| stem.to_string_lossy()).unwrap_or_default();
            return Some(dir.join(format!("{stem}.rs")));
        }
        self.scaffold
            .as_ref()
            .map(|dir| dir.join("src").join(scaffold::GENERATED_FILE))
    }
}

impl IdentOut {
    fn run(&self) -> Result<()> {
        let naming: NamingContext = self.naming.options()?.naming_context()?;
        for raw in &self.names {
            println!(
                "{raw:?} {} {} {} {}",
                "field".dimmed(),
                to_field_identifier(raw, &naming).bold(),
                "type".dimmed(),
                to_type_identifier(raw, &naming).bold(),
            );
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_output(out: &Path, source: &str) -> Result<()> {
    if let Some(parent) = out.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(out, source).with_context(|| format!("failed to write {}", out.display()))
}

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
            let mut matched = glob::glob(pattern)
                .with_context(|| format!("bad glob pattern {pattern}"))?
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("failed to expand {pattern}"))?;
            if matched.is_empty() {
                bail!("glob pattern matched no files: {pattern}");
            }
            // glob order is platform dependent
            matched.sort();
            out.extend(matched);
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
