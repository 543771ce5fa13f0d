//! canpack-lib: packaging pipeline for dfx canister projects
//!
//! This crate turns the release artifacts of a dfx project into one
//! self-contained package per deployment environment:
//! - `environment`: discovers environments from the `canister_ids/` directory
//! - `build`: runs the external build command
//! - `manifest`: reads the project `dfx.json` and synthesizes the packaged one
//! - `validate`: substitutes optimized binaries and enforces the size limit
//! - `stage`: lays out `package/<env>/` trees
//! - `archive`: zips each staged environment
//! - `package`: the pipeline tying the stages together

pub mod archive;
pub mod build;
pub mod config;
pub mod consts;
pub mod environment;
pub mod fs;
pub mod manifest;
pub mod package;
pub mod stage;
pub mod util;
pub mod validate;
