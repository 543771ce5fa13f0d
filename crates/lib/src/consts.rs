/// Project manifest read from the project root, and written into every package.
pub const DFX_JSON: &str = "dfx.json";

/// Directory holding one canister id file per deployment environment.
pub const CANISTER_IDS_DIR: &str = "canister_ids";

/// Output root for staged environments and their archives.
pub const PACKAGE_DIR: &str = "package";

/// Where `dfx build` leaves the compiled canister binaries.
pub const RELEASE_DIR: &str = "target/wasm32-unknown-unknown/release";

/// Name of the identity file inside a staged environment.
pub const STAGED_CANISTER_IDS: &str = "canister_ids.json";

/// Sub-directory of a staged environment holding binaries and interfaces.
pub const ASSETS_DIR: &str = "assets";

/// Build command run when nothing else is configured.
pub const DEFAULT_BUILD_COMMAND: &str = "dfx build";

/// Environment variable overriding the build command.
pub const BUILD_COMMAND_ENV: &str = "CANPACK_BUILD_COMMAND";

/// Largest canister binary the network accepts (2 MiB).
pub const MAX_WASM_SIZE: u64 = 2 * 1024 * 1024;

/// Suffix of the optimized binary variant (`<name>_opt.wasm`).
pub const OPT_WASM_SUFFIX: &str = "_opt";

/// Bind address of the local replica in the packaged manifest.
pub const LOCAL_NETWORK_BIND: &str = "127.0.0.1:8000";

/// Boundary node URL of the `ic` network in the packaged manifest.
pub const IC_NETWORK_PROVIDER: &str = "https://ic0.app";

/// `dfx.json` format version written into packages.
pub const DFX_MANIFEST_VERSION: u32 = 1;
