use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

/// Words every run gets, so fused RPC method names split sensibly without a corpus.
pub const BUILTIN_WORDS: &[&str] = &[
    "add", "address", "addr", "all", "balance", "balances", "block", "blocks",
    "chain", "client", "count", "create", "decode", "descriptor", "dump", "encode", "estimate", "fee",
    "feerate", "get", "hash", "height", "import", "info", "key", "keys",
    "list", "load", "lock", "mempool", "min", "max", "network", "node",
    "peer", "psbt", "raw", "receive", "remove", "rescan", "scan", "send",
    "set", "sign", "submit", "sync", "tx", "txid", "utxo", "verify", "wallet",
];

// `#[serde(rename = "raw")]` (plus any further attributes) directly above `pub ident:`
static RENAMED_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"#\[serde\(rename = "([^"]+)"\)\]\s*(?:#\[[^\]]+\]\s*)*pub\s+([A-Za-z0-9_]+)\s*:"#).unwrap()
});
static PUB_FIELD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bpub\s+([A-Za-z0-9_]+)\s*:").unwrap());
static PUB_FN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bpub\s+fn\s+([A-Za-z0-9_]+)\s*\(").unwrap());

/// Word dictionary and exact-name overrides used by the normalizer.
///
/// Built once before compilation and only read afterwards, so one context can
/// back any number of concurrent compilations.
#[derive(Debug, Clone, Default)]
pub struct NamingContext {
    words: HashSet<String>,
    longest_word: usize,
    renames: IndexMap<String, String>,
}

impl NamingContext {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        Self::with_words(BUILTIN_WORDS.iter().copied())
    }

    pub fn with_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ctx = Self::empty();
        for word in words {
            ctx.add_word(word.as_ref());
        }
        ctx
    }

    pub fn add_word(&mut self, word: &str) {
        let word = word.trim().to_ascii_lowercase();
        if word.is_empty() {
            return;
        }
        self.longest_word = self.longest_word.max(word.len());
        self.words.insert(word);
    }

    /// Later overrides for the same raw name replace earlier ones.
    pub fn add_rename(&mut self, raw: impl Into<String>, ident: impl Into<String>) {
        self.renames.insert(raw.into(), ident.into());
    }

    pub fn contains_word(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn longest_word(&self) -> usize {
        self.longest_word
    }

    pub fn rename_for(&self, raw: &str) -> Option<&str> {
        self.renames.get(raw).map(String::as_str)
    }

    pub fn rename_count(&self) -> usize {
        self.renames.len()
    }

    /// Learn from one Rust source file of an existing, hand-written client.
    pub fn harvest_source(&mut self, source: &str) {
        for caps in RENAMED_FIELD.captures_iter(source) {
            self.add_rename(&caps[1], &caps[2]);
            self.add_ident_tokens(&caps[2]);
        }
        for caps in PUB_FIELD.captures_iter(source).chain(PUB_FN.captures_iter(source)) {
            self.add_ident_tokens(&caps[1]);
        }
    }

    /// Harvest every `*.rs` file below `root`, in path order. Returns the file count.
    pub fn harvest_dir(&mut self, root: &Path) -> Result<usize> {
        let root_pattern = glob::Pattern::escape(&root.to_string_lossy());
        let pattern = Path::new(&root_pattern).join("**").join("*.rs");
        let pattern = pattern.to_string_lossy();
        let mut files: Vec<PathBuf> = glob::glob(&pattern)
            .with_context(|| format!("bad corpus pattern {pattern}"))?
            .collect::<Result<_, _>>()
            .with_context(|| format!("failed to walk corpus {}", root.display()))?;
        files.sort();

        for file in &files {
            let source = std::fs::read_to_string(file)
                .with_context(|| format!("failed to read corpus file {}", file.display()))?;
            self.harvest_source(&source);
        }
        tracing::debug!(
            root = %root.display(),
            files = files.len(),
            words = self.words.len(),
            renames = self.renames.len(),
            "harvested naming corpus"
        );
        Ok(files.len())
    }

    fn add_ident_tokens(&mut self, ident: &str) {
        let clean = ident.strip_prefix("r#").unwrap_or(ident);
        let mut any = false;
        for token in clean.split('_').filter(|token| !token.is_empty()) {
            self.add_word(token);
            any = true;
        }
        if !any {
            self.add_word(clean);
        }
    }
}
