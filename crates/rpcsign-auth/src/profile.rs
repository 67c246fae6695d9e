//! Credentials-file provider.
//!
//! Reads an INI file, by default `~/.alibabacloud/credentials`:
//!
//! ```text
//! [default]
//! type = access_key
//! access_key_id = foo
//! access_key_secret = bar
//! ```
//!
//! The section is chosen by `ALIBABA_CLOUD_PROFILE`, falling back to the
//! client name being resolved.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use tracing::debug;

use crate::credentials::{Credential, CredentialProvider, EnvLookup, process_env};
use crate::error::CredentialError;

/// Environment variable overriding the credentials file location.
pub const ENV_CREDENTIALS_FILE: &str = "ALIBABA_CLOUD_CREDENTIALS_FILE";
/// Environment variable selecting the profile section.
pub const ENV_PROFILE: &str = "ALIBABA_CLOUD_PROFILE";

const PROVIDER: &str = "profile";

/// Provider reading access keys from a credentials file.
///
/// A missing default file, or a file without the requested section, means
/// "not configured". A file named explicitly through
/// `ALIBABA_CLOUD_CREDENTIALS_FILE` must exist.
pub struct ProfileCredentialProvider {
    lookup: EnvLookup,
}

impl ProfileCredentialProvider {
    /// Create a provider reading the process environment.
    #[must_use]
    pub fn new() -> Self {
        Self::with_lookup(process_env())
    }

    /// Create a provider reading its settings from `lookup`.
    #[must_use]
    pub fn with_lookup(lookup: EnvLookup) -> Self {
        Self { lookup }
    }

    /// Resolve the credentials file path and whether it was set explicitly.
    fn file_path(&self) -> Option<(PathBuf, bool)> {
        if let Some(path) = (self.lookup)(ENV_CREDENTIALS_FILE).filter(|p| !p.is_empty()) {
            return Some((PathBuf::from(path), true));
        }
        let home = (self.lookup)("HOME").or_else(|| (self.lookup)("USERPROFILE"))?;
        Some((
            PathBuf::from(home).join(".alibabacloud").join("credentials"),
            false,
        ))
    }
}

impl Default for ProfileCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ProfileCredentialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileCredentialProvider")
            .field("file", &self.file_path().map(|(p, _)| p))
            .finish()
    }
}

impl CredentialProvider for ProfileCredentialProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn provide(&self, client_name: &str) -> Result<Credential, CredentialError> {
        let Some((path, explicit)) = self.file_path() else {
            return Err(CredentialError::NotConfigured { provider: PROVIDER });
        };

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if !explicit && e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CredentialError::NotConfigured { provider: PROVIDER });
            }
            Err(source) => {
                return Err(CredentialError::Io {
                    provider: PROVIDER,
                    path,
                    source,
                });
            }
        };

        let profile = (self.lookup)(ENV_PROFILE)
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| client_name.to_owned());

        debug!(path = %path.display(), profile = %profile, "Reading credentials file");

        let sections = parse_ini(&contents);
        let Some(section) = sections.get(&profile) else {
            return Err(CredentialError::NotConfigured { provider: PROVIDER });
        };

        credential_from_section(&profile, section)
    }
}

fn credential_from_section(
    profile: &str,
    section: &HashMap<String, String>,
) -> Result<Credential, CredentialError> {
    let kind = section.get("type").map_or("access_key", String::as_str);
    if kind != "access_key" {
        return Err(CredentialError::invalid(
            PROVIDER,
            format!("profile {profile}: unsupported credential type {kind}"),
        ));
    }

    let field = |key: &str| {
        section
            .get(key)
            .filter(|v| !v.is_empty())
            .cloned()
            .ok_or_else(|| {
                CredentialError::invalid(PROVIDER, format!("profile {profile}: missing {key}"))
            })
    };

    Ok(Credential::new(
        field("access_key_id")?,
        field("access_key_secret")?,
    ))
}

/// Parse INI text into `section -> key -> value`.
///
/// Lines starting with `#` or `;` are comments. Values may be wrapped in
/// double quotes. Keys outside any section are ignored.
fn parse_ini(contents: &str) -> HashMap<String, HashMap<String, String>> {
    let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
    let mut current: Option<String> = None;

    for line in contents.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = name.trim().to_owned();
            sections.entry(name.clone()).or_default();
            current = Some(name);
            continue;
        }
        let (Some(section), Some((key, value))) = (current.as_ref(), line.split_once('=')) else {
            continue;
        };
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);
        sections
            .entry(section.clone())
            .or_default()
            .insert(key.trim().to_owned(), value.to_owned());
    }

    sections
}
