//! Identifier normalization.
//!
//! Raw catalog names (`getblockchaininfo`, `scriptPubKey`, `fee-rate`, `type`)
//! become either a snake_case field/function identifier or an UpperCamelCase
//! type identifier. Both functions are pure in `(raw, context)`, which is what
//! keeps whole emissions byte-stable.
//!
//! Field identifiers go through five stages:
//! 1. exact override from the context's rename table (returned as-is)
//! 2. separator folding and case-boundary splitting, lowercased
//! 3. dictionary segmentation of a single fused run (see [`segment`])
//! 4. fixed token re-merges (`pub_key` → `pubkey`, `tx_id` → `txid`, ...)
//! 5. leading-digit and reserved-word escaping
pub mod context;
mod segment;

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

pub use context::NamingContext;

const SEPARATOR: char = '_';
const FIELD_PLACEHOLDER: &str = "field";
const TYPE_PLACEHOLDER: &str = "Type";

/// Rust 2024 strict and reserved keywords.
pub const RESERVED_WORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match",
    "mod", "move", "mut", "pub", "ref", "return", "self", "Self", "static",
    "struct", "super", "trait", "true", "type", "unsafe", "use", "where",
    "while", "async", "await", "dyn", "abstract", "become", "box", "do",
    "final", "macro", "override", "priv", "try", "typeof", "unsized",
    "virtual", "yield", "gen",
];

/// Adjacent tokens that read as one word.
const MERGED_PAIRS: &[(&str, &[&str])] = &[
    ("pub", &["key", "keys"]),
    ("tx", &["id", "ids"]),
    ("wtx", &["id", "ids"]),
];

static RESERVED: Lazy<HashSet<&'static str>> = Lazy::new(|| RESERVED_WORDS.iter().copied().collect());
static NON_ALNUM_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9A-Za-z]+").unwrap());
static CASE_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap());

pub fn is_reserved(ident: &str) -> bool {
    RESERVED.contains(ident)
}

pub fn to_field_identifier(raw: &str, ctx: &NamingContext) -> String {
    if let Some(renamed) = ctx.rename_for(raw) {
        return renamed.to_string();
    }

    let folded = NON_ALNUM_RUN.replace_all(raw, "_");
    let split = CASE_BOUNDARY.replace_all(&folded, "${1}_${2}");
    let mut out = split.trim_matches(SEPARATOR).to_ascii_lowercase();
    if out.is_empty() {
        out = FIELD_PLACEHOLDER.to_string();
    }

    if !out.contains(SEPARATOR) {
        if let Some(tokens) = segment::segment(&out, ctx) {
            if tokens.len() > 1 {
                out = tokens.join("_");
            }
        }
    }

    out = merge_tokens(&out);

    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, SEPARATOR);
    }
    if is_reserved(&out) {
        out.push(SEPARATOR);
    }
    out
}

pub fn to_type_identifier(raw: &str, ctx: &NamingContext) -> String {
    if ctx.rename_for(raw).is_none() && !raw.chars().any(|c| c.is_ascii_alphanumeric()) {
        return TYPE_PLACEHOLDER.to_string();
    }
    let field = to_field_identifier(raw, ctx);
    let mut out: String = field
        .split(SEPARATOR)
        .filter(|token| !token.is_empty())
        .map(capitalize)
        .collect();
    if out.is_empty() {
        out = TYPE_PLACEHOLDER.to_string();
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, 'T');
    }
    out
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn merge_tokens(ident: &str) -> String {
    let tokens: Vec<&str> = ident.split(SEPARATOR).filter(|token| !token.is_empty()).collect();
    let mut merged: Vec<String> = Vec::with_capacity(tokens.len());
    let mut index = 0;
    while index < tokens.len() {
        let token = tokens[index];
        let next = tokens.get(index + 1).copied();
        let fuses = next.is_some_and(|next| {
            MERGED_PAIRS
                .iter()
                .any(|(head, tails)| *head == token && tails.contains(&next))
        });
        match next {
            Some(next) if fuses => {
                merged.push(format!("{token}{next}"));
                index += 2;
            }
            _ => {
                merged.push(token.to_string());
                index += 1;
            }
        }
    }
    merged.join("_")
}
