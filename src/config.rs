//! Run options: an optional kebab-case JSON file, then CLI overrides on top.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::naming::NamingContext;

pub const DEFAULT_CLIENT_TYPE: &str = "crate::RpcClient";
pub const DEFAULT_RESULT_ALIAS: &str = "crate::RpcResult";
pub const DEFAULT_CRATE_NAME: &str = "bitcoin-cli-rpc";
pub const DEFAULT_EDITION: &str = "2021";

/// What resolution does with a shape it cannot type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapePolicy {
    /// Degrade to the opaque type and keep going.
    #[default]
    Permissive,
    /// Fail the run with `DocumentError::UnsupportedShape`.
    Strict,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Options {
    pub policy: ShapePolicy,
    /// Replaces the generated-file notice. May span several lines.
    pub header: Option<String>,
    pub client_type: String,
    pub result_alias: String,
    pub crate_name: String,
    pub edition: String,
    pub extra_words: Vec<String>,
    pub renames: IndexMap<String, String>,
    pub reference_corpus: Vec<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            policy: ShapePolicy::default(),
            header: None,
            client_type: DEFAULT_CLIENT_TYPE.to_string(),
            result_alias: DEFAULT_RESULT_ALIAS.to_string(),
            crate_name: DEFAULT_CRATE_NAME.to_string(),
            edition: DEFAULT_EDITION.to_string(),
            extra_words: Vec::new(),
            renames: IndexMap::new(),
            reference_corpus: Vec::new(),
        }
    }
}

impl Options {
    pub fn from_json_str(src: &str) -> Result<Self> {
        let de = &mut serde_json::Deserializer::from_str(src);
        serde_path_to_error::deserialize(de).map_err(|err| {
            let path = err.path().to_string();
            anyhow::anyhow!("invalid option at {path}: {}", err.into_inner())
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let src = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json_str(&src).with_context(|| format!("in config {}", path.display()))
    }

    /// Built-in words, then every reference corpus, then extra words, then explicit renames.
    pub fn naming_context(&self) -> Result<NamingContext> {
        let mut ctx = NamingContext::builtin();
        for root in &self.reference_corpus {
            ctx.harvest_dir(root)?;
        }
        for word in &self.extra_words {
            ctx.add_word(word);
        }
        for (raw, ident) in &self.renames {
            ctx.add_rename(raw.as_str(), ident.as_str());
        }
        tracing::debug!(
            words = ctx.word_count(),
            renames = ctx.rename_count(),
            "naming context ready"
        );
        Ok(ctx)
    }
}
