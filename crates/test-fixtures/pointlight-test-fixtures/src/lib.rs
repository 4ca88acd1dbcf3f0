use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    sessions: HashMap<String, SessionEntry>,
    #[serde(default)]
    rejected: HashMap<String, RejectedEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SessionEntry {
    Path(String),
    Detailed { path: String },
}

impl SessionEntry {
    fn as_path(&self) -> &str {
        match self {
            SessionEntry::Path(path) => path,
            SessionEntry::Detailed { path } => path,
        }
    }
}

/// A session config that must fail validation, with the config field it is expected to blame.
#[derive(Debug, Deserialize)]
struct RejectedEntry {
    path: String,
    field: String,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

pub mod sessions {
    use super::*;

    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST.sessions.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.sessions, "session", name)?;
        read_to_string(entry.as_path())
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let entry = lookup(&MANIFEST.sessions, "session", name)?;
        super::load_json(entry.as_path())
    }
}

pub mod rejected {
    use super::*;

    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST.rejected.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.rejected, "rejected session", name)?;
        read_to_string(&entry.path)
    }

    /// Config field the fixture is expected to be rejected for.
    pub fn expected_field(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.rejected, "rejected session", name)?;
        Ok(entry.field.clone())
    }
}
