// src/core/cmd_loader.rs

use crate::models::{CmdDefinition, CmdMap};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Command definitions shipped with the binary.
const DEFAULT_CMDS_YAML: &str = include_str!("cmds.yml");

#[derive(Error, Debug)]
pub enum CmdError {
    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse command definitions in '{source_name}': {source}")]
    YamlParse {
        source_name: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Command template for '{0}' could not be split into arguments.")]
    BadTemplate(String),
}

/// Parses a YAML mapping `name: { cmd, help }` into definitions.
pub fn parse_cmds(yaml: &str, source_name: &str) -> Result<CmdMap, CmdError> {
    if yaml.trim().is_empty() {
        return Ok(CmdMap::new());
    }
    serde_yaml::from_str(yaml).map_err(|e| CmdError::YamlParse {
        source_name: source_name.to_string(),
        source: e,
    })
}

/// The built-in definitions alone.
pub fn default_cmds() -> Result<CmdMap, CmdError> {
    parse_cmds(DEFAULT_CMDS_YAML, "built-in cmds.yml")
}

/// Loads the built-in definitions overlaid with the user's file.
///
/// A missing or empty user file leaves the built-ins untouched; a user entry
/// replaces the built-in of the same name.
pub fn get_cmds_from_files(user_file: &Path) -> Result<CmdMap, CmdError> {
    let mut cmds = default_cmds()?;
    if user_file.is_file() && fs::metadata(user_file)?.len() > 0 {
        let content = fs::read_to_string(user_file)?;
        let custom = parse_cmds(&content, &user_file.display().to_string())?;
        log::debug!(
            "Loaded {} custom command(s) from '{}'.",
            custom.len(),
            user_file.display()
        );
        cmds.extend(custom);
    }
    Ok(cmds)
}

impl CmdDefinition {
    /// The argv this definition runs, with `extra` arguments appended.
    ///
    /// Shell definitions become `sh -c "<cmd> <extra...>"`; the others are
    /// split shell-style into words.
    pub fn to_argv(&self, name: &str, extra: &[String]) -> Result<Vec<String>, CmdError> {
        if self.shell {
            let mut line = self.cmd.clone();
            for arg in extra {
                line.push(' ');
                let quoted =
                    shlex::try_quote(arg).map_err(|_| CmdError::BadTemplate(name.to_string()))?;
                line.push_str(&quoted);
            }
            return Ok(vec!["sh".to_string(), "-c".to_string(), line]);
        }
        let mut argv =
            shlex::split(&self.cmd).ok_or_else(|| CmdError::BadTemplate(name.to_string()))?;
        if argv.is_empty() {
            return Err(CmdError::BadTemplate(name.to_string()));
        }
        argv.extend(extra.iter().cloned());
        Ok(argv)
    }
}
