//! Side artifacts for a crate that hosts a generated binding.
//!
//! Both files are written only when absent; an existing manifest or entry
//! point is never touched.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::Options;

pub const GENERATED_FILE: &str = "generated.rs";

/// Inherent methods of the scaffolded `RpcClient`; generated stubs must not reuse them.
pub const CLIENT_METHODS: &[&str] = &["new", "with_auth", "call"];

const LIB_RS: &str = r#"use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("rpc error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<Value>,
    },
    #[error("missing result for rpc call {method}")]
    MissingResult { method: String },
}

pub type RpcResult<T> = Result<T, RpcError>;

#[derive(Debug)]
pub struct RpcClient {
    url: String,
    auth: Option<(String, String)>,
    client: reqwest::Client,
    id: AtomicU64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl RpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth: None,
            client: reqwest::Client::new(),
            id: AtomicU64::new(0),
        }
    }

    pub fn with_auth(url: impl Into<String>, user: impl Into<String>, pass: impl Into<String>) -> Self {
        Self {
            auth: Some((user.into(), pass.into())),
            ..Self::new(url)
        }
    }

    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Vec<Value>) -> RpcResult<T> {
        let id = self.id.fetch_add(1, Ordering::Relaxed);
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let mut builder = self.client.post(&self.url).json(&request);
        if let Some((user, pass)) = &self.auth {
            builder = builder.basic_auth(user, Some(pass));
        }

        let response: RpcResponse = builder.send().await?.error_for_status()?.json().await?;
        if let Some(err) = response.error {
            return Err(RpcError::Rpc {
                code: err.code,
                message: err.message,
                data: err.data,
            });
        }

        match response.result {
            Some(result) => Ok(serde_json::from_value(result)?),
            // a null result is only acceptable for methods that return nothing
            None => serde_json::from_value(Value::Null).map_err(|_| RpcError::MissingResult {
                method: method.to_string(),
            }),
        }
    }
}

mod generated;
pub use generated::*;
"#;

pub fn render_cargo_toml(options: &Options) -> String {
    format!(
        r#"[package]
name = "{name}"
version = "0.1.0"
edition = "{edition}"
license = "MIT OR Apache-2.0"

[features]
serde-deny-unknown-fields = []

[dependencies]
reqwest = {{ version = "0.12", default-features = false, features = ["json", "rustls-tls"] }}
serde = {{ version = "1", features = ["derive"] }}
serde_json = "1"
thiserror = "2"
rust_decimal = {{ version = "1", features = ["serde"] }}
"#,
        name = options.crate_name,
        edition = options.edition,
    )
}

pub fn render_lib_rs() -> &'static str {
    LIB_RS
}

/// Write `Cargo.toml` and `src/lib.rs` under `root` where missing. Returns what was written.
pub fn write_if_absent(root: &Path, options: &Options) -> Result<Vec<PathBuf>> {
    let artifacts = [
        (root.join("Cargo.toml"), render_cargo_toml(options)),
        (root.join("src").join("lib.rs"), render_lib_rs().to_string()),
    ];

    let mut written = Vec::new();
    for (path, contents) in artifacts {
        if path.exists() {
            tracing::debug!(path = %path.display(), "scaffold file exists, leaving it alone");
            continue;
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}
