use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::matcher::MatcherGroup;
use crate::registry::Associations;

/// On-disk association rules. Loading and saving this file is the
/// application's job; the registry itself never touches storage.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Program (opener) rules, applied in file order.
    #[serde(rename = "program")]
    pub programs: Vec<ProgramRule>,
    /// Viewer (preview) rules, applied in file order.
    #[serde(rename = "viewer")]
    pub viewers: Vec<ViewerRule>,
}

/// One `[[program]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramRule {
    /// Comma-separated pattern list, e.g. `"{*.txt,*.md}"`.
    pub patterns: String,
    /// Comma-separated command list; `{description}` prefixes are allowed
    /// and `,,` escapes a literal comma.
    pub commands: String,
    /// Only bind this rule when running in a graphical environment.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub graphical: bool,
}

/// One `[[viewer]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerRule {
    /// Comma-separated pattern list.
    pub patterns: String,
    /// Comma-separated command list; no `{description}` syntax here.
    pub commands: String,
}

impl Config {
    /// `~/.config/openwith/config.toml`
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("openwith").join("config.toml"))
    }

    /// Load from the default path; a missing file yields the default
    /// (empty) configuration.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load and parse a configuration file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        Ok(config)
    }

    /// Write to the default path, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }

    /// A starting configuration for `config init`.
    pub fn sample() -> Self {
        Self {
            programs: vec![
                ProgramRule {
                    patterns: "{*.txt,*.md}".to_string(),
                    commands: "{Edit}nvim,vim,nano".to_string(),
                    graphical: false,
                },
                ProgramRule {
                    patterns: "{*.png,*.jpg,*.gif}".to_string(),
                    commands: "{View image}imv,feh".to_string(),
                    graphical: true,
                },
            ],
            viewers: vec![ViewerRule {
                patterns: "{*.tar.gz,*.tgz}".to_string(),
                commands: "tar -tzf %f".to_string(),
            }],
        }
    }

    /// Reset `assocs` and replay every rule into it. `graphical` states
    /// whether the current environment is graphical; it selects both which
    /// graphical-only rules become active and how the builtin default is
    /// registered.
    ///
    /// Fails on the first rule with an invalid pattern list; `assocs` keeps
    /// the rules applied up to that point.
    pub fn apply(&self, assocs: &mut Associations, graphical: bool) -> Result<()> {
        assocs.reset(graphical);

        for rule in &self.programs {
            let matchers = MatcherGroup::parse(&rule.patterns)
                .with_context(|| format!("Invalid pattern list {:?}", rule.patterns))?;
            assocs.set_programs(matchers, &rule.commands, rule.graphical, graphical);
        }

        for rule in &self.viewers {
            let matchers = MatcherGroup::parse(&rule.patterns)
                .with_context(|| format!("Invalid pattern list {:?}", rule.patterns))?;
            assocs.set_viewers(matchers, &rule.commands);
        }

        Ok(())
    }
}
