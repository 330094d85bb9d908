//! Compiles every fixture catalog twice with fresh registries and checks the
//! two emissions are byte-identical. Also reports what the strict policy thinks.
use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use openrpc_bindgen::{Document, NamingContext, Options, ShapePolicy, compile};

fn fixture_paths() -> Result<Vec<PathBuf>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let patterns = if args.is_empty() {
        vec![concat!(env!("CARGO_MANIFEST_DIR"), "/../fixtures/*.json").to_string()]
    } else {
        args
    };
    let mut paths = Vec::new();
    for pattern in &patterns {
        for entry in glob::glob(pattern).with_context(|| format!("bad pattern {pattern}"))? {
            paths.push(entry?);
        }
    }
    paths.sort();
    Ok(paths)
}

fn main() -> Result<()> {
    let naming = NamingContext::builtin();
    let permissive = Options::default();
    let strict = Options {
        policy: ShapePolicy::Strict,
        ..Options::default()
    };

    let mut failures = 0;
    for path in fixture_paths()? {
        let document = Document::load(&path)?;
        let first = compile(&document, &naming, &permissive)?;
        let second = compile(&document, &naming, &permissive)?;
        let label = path.display().to_string();

        if first == second {
            eprintln!("{} {label} ({} bytes)", "✅ stable".green(), first.len());
        } else {
            failures += 1;
            let line = first
                .lines()
                .zip(second.lines())
                .position(|(a, b)| a != b)
                .map(|index| index + 1)
                .unwrap_or_else(|| first.lines().count().min(second.lines().count()) + 1);
            eprintln!("{} {label}: emissions differ from line {line}", "❌ unstable".red());
        }

        match compile(&document, &naming, &strict) {
            Ok(_) => eprintln!("   {} strict policy accepts it", "·".dimmed()),
            Err(error) => eprintln!("   {} strict policy: {error}", "·".dimmed()),
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} fixture(s) produced unstable output");
    }
    Ok(())
}
