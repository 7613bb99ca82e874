//! Locale negotiation and client build detection.
//!
//! Candidates are tried in client enumeration order; the first locale whose
//! data opens *and* yields a valid build number wins. A locale that fails to
//! open, or whose version descriptor is simply not installed, is skipped. A
//! descriptor that is present but unparseable is treated as fatal
//! misconfiguration: the archive opened, so the installation is there, and a
//! broken version file means nothing downstream can be trusted.

use thiserror::Error;

use crate::locale::Locale;
use crate::storage::{GameData, StorageError, StorageOpener};

const VERSION_MARKER: &str = "version=\"";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("invalid version descriptor {name} for locale {locale}")]
    InvalidVersionFile { locale: Locale, name: String },

    #[error("no locale candidate yielded an open storage and a valid build number")]
    NoLocaleFound,
}

/// An open client session: the negotiated locale, its build number, and the
/// data handle every downstream component reads through.
pub struct Session {
    pub locale: Locale,
    pub build: u32,
    pub data: Box<dyn GameData>,
}

/// Per-candidate outcome of reading the version descriptor.
enum BuildStatus {
    Found(u32),
    NotInstalled,
}

/// Version descriptor file name for a locale.
fn component_file(locale: Locale) -> String {
    format!("component.wow-{}.txt", locale.name())
}

/// Locate the `version="..."` marker and parse the quoted digits.
///
/// Returns `None` for a missing marker, an unterminated quote, or a
/// non-positive value.
pub fn parse_build(contents: &[u8]) -> Option<u32> {
    let text = String::from_utf8_lossy(contents);
    let start = text.find(VERSION_MARKER)? + VERSION_MARKER.len();
    let end = start + text[start..].find('"')?;
    let build: u32 = text[start..end].parse().ok()?;
    if build == 0 {
        return None;
    }
    Some(build)
}

fn read_build(data: &dyn GameData, locale: Locale) -> Result<BuildStatus, SessionError> {
    let name = component_file(locale);
    let contents = match data.read_file(&name) {
        Ok(contents) => contents,
        Err(StorageError::NotFound(_)) => return Ok(BuildStatus::NotInstalled),
        Err(_) => {
            return Err(SessionError::InvalidVersionFile { locale, name });
        }
    };

    match parse_build(&contents) {
        Some(build) => Ok(BuildStatus::Found(build)),
        None => Err(SessionError::InvalidVersionFile { locale, name }),
    }
}

/// Try every locale candidate in enumeration order, skipping the reserved
/// slot, until one opens and reports a valid build.
pub fn negotiate(opener: &dyn StorageOpener) -> Result<Session, SessionError> {
    for locale in Locale::ALL {
        if locale.is_reserved() {
            continue;
        }

        let Some(data) = opener.open(locale) else {
            continue;
        };

        match read_build(data.as_ref(), locale)? {
            BuildStatus::Found(build) => {
                return Ok(Session {
                    locale,
                    build,
                    data,
                })
            }
            BuildStatus::NotInstalled => {
                eprintln!("Locale {locale} not installed.");
                // Handle dropped here; next candidate gets a fresh open.
            }
        }
    }

    Err(SessionError::NoLocaleFound)
}
