// src/constants.rs

/// The name of the directory, under the system config root, holding all repodeck state.
pub const APP_DIR_NAME: &str = "repodeck";

/// The name of the line-oriented file mapping repo paths to names (inside the config dir).
pub const REPO_PATH_FILENAME: &str = "repo_path";

/// The name of the TOML file holding repo groups (inside the config dir).
pub const GROUPS_FILENAME: &str = "groups.toml";

/// The name of the user's command-definition file (inside the config dir).
pub const CMDS_FILENAME: &str = "cmds.yml";

/// The extension of the file whose stem names the active context.
pub const CONTEXT_EXTENSION: &str = "context";

/// The context name that clears the active context.
pub const CONTEXT_NONE: &str = "none";

/// Width the status label (head plus markers) is padded to.
pub const LABEL_WIDTH: usize = 10;
