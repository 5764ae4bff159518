use std::{fs, path::Path};

use alloy::{hex, json_abi::JsonAbi, primitives::Bytes};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Compiled contract: its interface plus creation bytecode.
#[derive(Clone, Debug)]
pub struct Artifact {
    /// Contract name, when the artifact records one.
    pub name: Option<String>,
    /// Interface descriptor.
    pub abi: JsonAbi,
    /// Creation (init) code, constructor arguments not included.
    pub bytecode: Bytes,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    contract_name: Option<String>,
    abi: JsonAbi,
    bytecode: Option<RawBytecode>,
    #[serde(alias = "unlinked_binary")]
    unlinked_binary: Option<String>,
}

/// Truffle and hardhat store the bytecode as a string, forge as an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    Hex(String),
    Object { object: String },
}

impl Artifact {
    /// Parse a JSON artifact.
    ///
    /// # Errors
    ///
    /// May fail if the JSON is malformed, has no bytecode, or still contains
    /// unlinked library references.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawArtifact = serde_json::from_str(json)
            .map_err(|e| Error::Artifact(e.to_string()))?;

        let code = match raw.bytecode {
            Some(RawBytecode::Hex(code) | RawBytecode::Object { object: code }) => {
                Some(code)
            }
            None => None,
        }
        .filter(|code| !is_empty_code(code))
        .or(raw.unlinked_binary)
        .filter(|code| !is_empty_code(code))
        .ok_or_else(|| {
            Error::Artifact(format!(
                "{} has no bytecode, is it an interface or abstract contract?",
                display_name(raw.contract_name.as_deref())
            ))
        })?;

        let bytecode = decode_bytecode(&code).map_err(|reason| {
            Error::Artifact(format!(
                "{}: {reason}",
                display_name(raw.contract_name.as_deref())
            ))
        })?;

        Ok(Self { name: raw.contract_name, abi: raw.abi, bytecode })
    }

    /// Read and parse the JSON artifact at `path`.
    ///
    /// # Errors
    ///
    /// See [`Artifact::from_json`]; also fails if `path` cannot be read.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            Error::Artifact(format!("failed to read {}: {e}", path.display()))
        })?;
        let mut artifact = Self::from_json(&json)?;
        if artifact.name.is_none() {
            artifact.name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned());
        }
        Ok(artifact)
    }

    /// Name used in logs and errors.
    #[must_use]
    pub fn display_name(&self) -> &str {
        display_name(self.name.as_deref())
    }
}

fn display_name(name: Option<&str>) -> &str {
    name.unwrap_or("<unnamed>")
}

fn is_empty_code(code: &str) -> bool {
    let code = code.trim();
    code.is_empty() || code == "0x"
}

fn decode_bytecode(code: &str) -> std::result::Result<Bytes, String> {
    // Library placeholders are 40 characters wide: `__Name___...` (truffle,
    // old solc) or `__$<34 hex chars>$__` (solc >= 0.5).
    static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"__[$A-Za-z0-9_.:/]{36}__")
            .expect("placeholder regex should be valid")
    });

    let code = code.trim();
    let unlinked: Vec<&str> =
        PLACEHOLDER.find_iter(code).map(|m| m.as_str()).collect();
    if !unlinked.is_empty() {
        return Err(format!(
            "bytecode has unlinked library references: {}",
            unlinked.join(", ")
        ));
    }

    hex::decode(code)
        .map(Bytes::from)
        .map_err(|e| format!("bytecode is not valid hex: {e}"))
}
