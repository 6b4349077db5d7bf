//! # Configuration
//!
//! This module reads and writes `gee.toml`, the file that lists the
//! repositories a workspace manages.
//!
//! ## Format
//!
//! ```toml
//! [[repos]]
//! name = "gee"
//! path = "/home/me/src"
//! remote = "git@github.com:stcrestrada/gee.git"
//! branch = "main"
//! ```
//!
//! `remote` and `branch` are optional. `path` is either the directory that
//! contains the repository or the repository directory itself: when its
//! last component equals `name` it is used as is, otherwise `name` is
//! appended. Relative paths are resolved against the directory holding
//! `gee.toml`.
//!
//! ## Discovery
//!
//! [`Workspace::discover`] looks for `gee.toml` in the start directory and
//! then in each parent up to the filesystem root, so commands work from
//! anywhere inside a workspace.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::defaults::CONFIG_FILE_NAME;
use crate::error::{Error, Result};

/// One `[[repos]]` entry as written in `gee.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoEntry {
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// The whole `gee.toml` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub repos: Vec<RepoEntry>,
}

/// A repository ready to operate on, with its working tree resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repo {
    pub name: String,
    pub local_path: PathBuf,
    pub remote: Option<String>,
    pub branch: Option<String>,
}

impl Config {
    /// Parse and validate `gee.toml` contents.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (i, repo) in self.repos.iter().enumerate() {
            if repo.name.trim().is_empty() {
                return Err(Error::ConfigParse {
                    message: format!("repo #{} has an empty name", i + 1),
                    hint: Some("Add 'name = \"...\"' to the [[repos]] entry".to_string()),
                });
            }
            if repo.path.trim().is_empty() {
                return Err(Error::ConfigParse {
                    message: format!("repo {} has an empty path", repo.name),
                    hint: Some(
                        "Set 'path' to the directory containing the repository".to_string(),
                    ),
                });
            }
        }
        Ok(())
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Where the repository of `name` lives given its configured `path`.
pub fn local_path(path: &Path, name: &str) -> PathBuf {
    if path.file_name().is_some_and(|last| last == name) {
        path.to_path_buf()
    } else {
        path.join(name)
    }
}

/// A loaded `gee.toml` and the directory it was found in.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub config_file: PathBuf,
    pub config_dir: PathBuf,
    pub config: Config,
}

impl Workspace {
    /// Find and load `gee.toml`, starting at `start` and walking upward.
    pub fn discover(start: &Path) -> Result<Self> {
        let config_file = find_config(start).ok_or_else(|| Error::NotInitialized {
            start: start.to_path_buf(),
        })?;
        Self::load(&config_file)
    }

    /// Load a specific `gee.toml`.
    pub fn load(config_file: &Path) -> Result<Self> {
        let content = fs::read_to_string(config_file)?;
        let config = Config::parse(&content)?;
        let config_dir = config_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        debug!(
            "loaded {} repositories from {}",
            config.repos.len(),
            config_file.display()
        );
        Ok(Self {
            config_file: config_file.to_path_buf(),
            config_dir,
            config,
        })
    }

    /// Create `gee.toml` in `dir`, seeded with one sample entry.
    pub fn init(dir: &Path) -> Result<Self> {
        let config_file = dir.join(CONFIG_FILE_NAME);
        if config_file.exists() {
            return Err(Error::AlreadyInitialized { path: config_file });
        }
        let workspace = Self {
            config_file,
            config_dir: dir.to_path_buf(),
            config: Config {
                repos: vec![RepoEntry {
                    name: "gee".to_string(),
                    path: dir.to_string_lossy().into_owned(),
                    remote: Some("git@github.com:stcrestrada/gee.git".to_string()),
                    branch: None,
                }],
            },
        };
        workspace.save()?;
        Ok(workspace)
    }

    /// Rewrite `gee.toml` with the current entries.
    pub fn save(&self) -> Result<()> {
        fs::write(&self.config_file, self.config.to_toml()?)?;
        debug!("wrote {}", self.config_file.display());
        Ok(())
    }

    /// The configured repositories, in file order, with paths resolved.
    pub fn repos(&self) -> Vec<Repo> {
        self.config
            .repos
            .iter()
            .map(|entry| {
                let configured = Path::new(&entry.path);
                let base = if configured.is_relative() {
                    self.config_dir.join(configured)
                } else {
                    configured.to_path_buf()
                };
                Repo {
                    name: entry.name.clone(),
                    local_path: local_path(&base, &entry.name),
                    remote: entry.remote.clone(),
                    branch: entry.branch.clone(),
                }
            })
            .collect()
    }

    /// Register the repository at `repo_dir`.
    ///
    /// The directory name becomes the entry's `name` and its parent the
    /// `path`.
    pub fn add(&mut self, repo_dir: &Path, remote: Option<String>) -> Result<&RepoEntry> {
        let name = repo_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::ConfigParse {
                message: format!("{} has no directory name", repo_dir.display()),
                hint: None,
            })?;
        let parent = repo_dir.parent().unwrap_or(repo_dir);

        let existing = self.repos();
        if existing
            .iter()
            .any(|repo| repo.name == name && repo.local_path == repo_dir)
        {
            return Err(Error::RepoExists {
                name,
                path: repo_dir.to_path_buf(),
            });
        }

        self.config.repos.push(RepoEntry {
            name,
            path: parent.to_string_lossy().into_owned(),
            remote,
            branch: None,
        });
        Ok(&self.config.repos[self.config.repos.len() - 1])
    }

    /// Drop the entry called `name`.
    pub fn remove(&mut self, name: &str) -> Result<RepoEntry> {
        let index = self
            .config
            .repos
            .iter()
            .position(|repo| repo.name == name)
            .ok_or_else(|| Error::RepoNotFound {
                name: name.to_string(),
            })?;
        Ok(self.config.repos.remove(index))
    }
}

fn find_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}
