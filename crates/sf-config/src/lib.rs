//! Layered storefront configuration.
//!
//! Resolution order, later wins:
//! 1. Built-in defaults ([`StorefrontConfig::default`])
//! 2. YAML documents, deep-merged in the order given
//! 3. `SF_*` environment overrides
//!
//! The resolved config is serialized to canonical JSON and hashed (SHA-256)
//! so a running daemon can report exactly which configuration it booted with.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use sf_core::Seed;
use std::fs;

pub const ENV_CONFIG_PATHS: &str = "SF_CONFIG";
pub const ENV_BIND_ADDR: &str = "SF_BIND_ADDR";
pub const ENV_PURCHASE_MODE: &str = "SF_PURCHASE_MODE";
pub const ENV_PURCHASE_ENDPOINT: &str = "SF_PURCHASE_ENDPOINT";
pub const ENV_PURCHASE_TIMEOUT_MS: &str = "SF_PURCHASE_TIMEOUT_MS";
pub const ENV_SEED_WEBSITE_INVENTORY: &str = "SF_SEED_WEBSITE_INVENTORY";

pub const DEFAULT_FUNCTION_ID: &str =
    "arn:aws:lambda:us-east-1:000000000000:function:demo_purchase_function";

/// Literal values that look like credentials. Config must reference secrets
/// indirectly, never inline them.
const SECRET_PREFIXES: &[&str] = &[
    "sk-",        // Stripe / OpenAI style
    "sk_live",    // Stripe live
    "sk_test",    // Stripe test
    "AKIA",       // AWS access key ID
    "-----BEGIN", // PEM private keys
    "ghp_",       // GitHub PAT
    "xoxb-",      // Slack bot token
];

// ---------------------------------------------------------------------------
// Typed config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorefrontConfig {
    pub server: ServerConfig,
    pub seed: SeedConfig,
    pub purchase: PurchaseConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Origins allowed by CORS. Front-end dev servers live on localhost.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            cors_origins: vec![
                "http://localhost".to_string(),
                "http://127.0.0.1".to_string(),
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
                "http://localhost:8080".to_string(),
                "http://127.0.0.1:8080".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedConfig {
    pub website_inventory: u32,
    pub warehouse_inventory: i64,
    pub customer_bank: i64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        let s = Seed::default();
        Self {
            website_inventory: s.website_inventory,
            warehouse_inventory: s.warehouse_inventory,
            customer_bank: s.customer_bank,
        }
    }
}

impl From<&SeedConfig> for Seed {
    fn from(c: &SeedConfig) -> Self {
        Seed {
            website_inventory: c.website_inventory,
            warehouse_inventory: c.warehouse_inventory,
            customer_bank: c.customer_bank,
        }
    }
}

/// Which purchase-confirmation collaborator the daemon talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmMode {
    /// In-process confirmer; every purchase is confirmed.
    Local,
    /// Remote confirmer reached over HTTP.
    Http,
}

impl ConfirmMode {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(ConfirmMode::Local),
            "http" => Ok(ConfirmMode::Http),
            other => bail!("invalid purchase mode '{}'. expected one of: local | http", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PurchaseConfig {
    pub mode: ConfirmMode,
    /// Required when `mode = http`.
    pub endpoint: Option<String>,
    /// Remote function identifier sent with each confirmation request.
    pub function_id: String,
    pub timeout_ms: u64,
}

impl Default for PurchaseConfig {
    fn default() -> Self {
        Self {
            mode: ConfirmMode::Local,
            endpoint: None,
            function_id: DEFAULT_FUNCTION_ID.to_string(),
            timeout_ms: 5_000,
        }
    }
}

impl StorefrontConfig {
    /// Apply `SF_*` overrides. `lookup` is `std::env::var(..).ok()` in
    /// production and a map in tests.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_BIND_ADDR) {
            self.server.bind_addr = v;
        }
        if let Some(v) = lookup(ENV_PURCHASE_MODE) {
            self.purchase.mode = ConfirmMode::parse(&v)?;
        }
        if let Some(v) = lookup(ENV_PURCHASE_ENDPOINT) {
            self.purchase.endpoint = Some(v);
        }
        if let Some(v) = lookup(ENV_PURCHASE_TIMEOUT_MS) {
            self.purchase.timeout_ms = v
                .trim()
                .parse()
                .with_context(|| format!("{ENV_PURCHASE_TIMEOUT_MS} must be an integer: {v}"))?;
        }
        if let Some(v) = lookup(ENV_SEED_WEBSITE_INVENTORY) {
            self.seed.website_inventory = v.trim().parse().with_context(|| {
                format!("{ENV_SEED_WEBSITE_INVENTORY} must be a non-negative integer: {v}")
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.purchase.timeout_ms == 0 {
            bail!("CONFIG_INVALID purchase.timeout_ms must be > 0");
        }
        if self.purchase.mode == ConfirmMode::Http {
            match self.purchase.endpoint.as_deref().map(str::trim) {
                Some(e) if !e.is_empty() => {}
                _ => bail!("CONFIG_INVALID purchase.endpoint is required when purchase.mode=http"),
            }
        }
        if self.purchase.function_id.trim().is_empty() {
            bail!("CONFIG_INVALID purchase.function_id must not be empty");
        }
        Ok(())
    }

    pub fn seed(&self) -> Seed {
        Seed::from(&self.seed)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: StorefrontConfig,
    pub config_hash: String,
    pub canonical_json: String,
}

impl LoadedConfig {
    /// Validate and hash an already-resolved config.
    pub fn resolve(config: StorefrontConfig) -> Result<Self> {
        config.validate()?;
        let v = serde_json::to_value(&config).context("config serialize failed")?;
        enforce_no_secret_literals(&v)?;
        let canonical_json = canonicalize_json(&v)?;
        let config_hash = sha256_hex(canonical_json.as_bytes());
        Ok(Self {
            config,
            config_hash,
            canonical_json,
        })
    }
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let config = merge_yaml_docs(yaml_docs)?;
    LoadedConfig::resolve(config)
}

/// Full boot-time resolution: YAML paths from `SF_CONFIG` (comma-separated,
/// may be empty), then environment overrides.
pub fn load_from_env() -> Result<LoadedConfig> {
    let paths_raw = std::env::var(ENV_CONFIG_PATHS).unwrap_or_default();
    let paths = split_paths(&paths_raw);

    let mut docs: Vec<String> = Vec::new();
    for p in &paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }
    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();

    let mut config = merge_yaml_docs(&doc_refs)?;
    config.apply_env_overrides(|k| std::env::var(k).ok())?;
    LoadedConfig::resolve(config)
}

pub fn split_paths(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn merge_yaml_docs(yaml_docs: &[&str]) -> Result<StorefrontConfig> {
    let mut merged =
        serde_json::to_value(StorefrontConfig::default()).context("default config serialize")?;
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        if v_yaml.is_null() {
            // Empty document.
            continue;
        }
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }
    serde_json::from_value(merged).context("config does not match the storefront schema")
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

fn canonicalize_json(v: &Value) -> Result<String> {
    // Serialized from the typed config, so field order is fixed by the struct.
    serde_json::to_string(v).context("canonical json serialize failed")
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn enforce_no_secret_literals(v: &Value) -> Result<()> {
    let mut leaves = Vec::new();
    collect_leaf_strings(v, "", &mut leaves);
    for (ptr, s) in leaves {
        if looks_like_secret(s) {
            bail!("CONFIG_SECRET_DETECTED leaf={} value=REDACTED", ptr);
        }
    }
    Ok(())
}

fn collect_leaf_strings<'a>(v: &'a Value, prefix: &str, out: &mut Vec<(String, &'a str)>) {
    match v {
        Value::Object(map) => {
            for (k, vv) in map.iter() {
                collect_leaf_strings(vv, &format!("{prefix}/{k}"), out);
            }
        }
        Value::Array(arr) => {
            for (i, vv) in arr.iter().enumerate() {
                collect_leaf_strings(vv, &format!("{prefix}/{i}"), out);
            }
        }
        Value::String(s) => out.push((prefix.to_string(), s.as_str())),
        _ => {}
    }
}

fn looks_like_secret(s: &str) -> bool {
    let t = s.trim();
    if t.len() < 8 {
        return false;
    }
    SECRET_PREFIXES.iter().any(|p| t.starts_with(p))
}
