//! `dfx.json` manifests.
//!
//! Two shapes live here: the project manifest written by developers, of which
//! only the canister declarations matter, and the deployment manifest that
//! every package ships with, where each canister is a prebuilt `custom`
//! target pointing into `assets/`.

mod deploy;
mod project;

pub use deploy::*;
pub use project::*;
