//! Deployment manifest synthesized for packages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ManifestError;
use crate::consts::{ASSETS_DIR, DFX_MANIFEST_VERSION, IC_NETWORK_PROVIDER, LOCAL_NETWORK_BIND};

/// The `dfx.json` written into every staged environment.
///
/// The same value is used for all environments; only where it is written
/// changes.
///
/// # Example
///
/// ```json
/// {
///   "defaults": { "build": { "args": "", "packtool": "" } },
///   "networks": {
///     "ic": { "type": "persistent", "providers": ["https://ic0.app"] },
///     "local": { "type": "ephemeral", "bind": "127.0.0.1:8000" }
///   },
///   "version": 1,
///   "canisters": {
///     "ledger": { "candid": "assets/ledger.did", "wasm": "assets/ledger.wasm", "build": [], "type": "custom" }
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployManifest {
  pub defaults: Defaults,
  pub networks: BTreeMap<String, Network>,
  pub version: u32,
  pub canisters: BTreeMap<String, PackagedCanister>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defaults {
  pub build: BuildDefaults,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildDefaults {
  pub args: String,
  pub packtool: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Network {
  /// A throwaway replica bound to a local address.
  Ephemeral { bind: String },
  /// A long-lived network reached through its providers.
  Persistent { providers: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanisterKind {
  /// Prebuilt wasm + candid, nothing for dfx to compile.
  Custom,
}

/// A canister entry pointing at packaged assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagedCanister {
  pub candid: String,
  pub wasm: String,
  pub build: Vec<String>,
  #[serde(rename = "type")]
  pub kind: CanisterKind,
}

impl PackagedCanister {
  pub fn new(name: &str) -> Self {
    Self {
      candid: format!("{ASSETS_DIR}/{name}.did"),
      wasm: format!("{ASSETS_DIR}/{name}.wasm"),
      build: Vec::new(),
      kind: CanisterKind::Custom,
    }
  }
}

impl DeployManifest {
  /// Builds the deployment manifest for the given canister names.
  pub fn for_canisters<I, S>(names: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let canisters = names
      .into_iter()
      .map(|name| {
        let name = name.as_ref();
        (name.to_string(), PackagedCanister::new(name))
      })
      .collect();

    Self {
      defaults: Defaults::default(),
      networks: default_networks(),
      version: DFX_MANIFEST_VERSION,
      canisters,
    }
  }

  /// Pretty-printed JSON with two-space indentation.
  pub fn to_json_pretty(&self) -> Result<String, ManifestError> {
    serde_json::to_string_pretty(self).map_err(ManifestError::Serialize)
  }
}

fn default_networks() -> BTreeMap<String, Network> {
  BTreeMap::from([
    (
      "local".to_string(),
      Network::Ephemeral {
        bind: LOCAL_NETWORK_BIND.to_string(),
      },
    ),
    (
      "ic".to_string(),
      Network::Persistent {
        providers: vec![IC_NETWORK_PROVIDER.to_string()],
      },
    ),
  ])
}
