use serde::Serialize;

/// Metadata for a single catalog entry: identifier, display name,
/// reference URLs, and whether the id is deprecated.
///
/// Equality is structural and reference *order* is significant, which is
/// what [`crate::catalog::Catalog::get_by_info`] relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LicenseInfo {
    pub id: String,
    pub name: String,
    pub references: Vec<String>,
    pub is_deprecated: bool,
}

/// The stored body of a license.
///
/// `content` holds the bytes exactly as stored; `raw_content` is the same
/// bytes with every `\r?\n` collapsed to a single space, the form used for
/// distance comparison and substring search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LicenseContent {
    pub id: String,
    pub content: Vec<u8>,
    pub raw_content: Vec<u8>,
}

/// A catalog entry joined with its loaded body. Only ever constructed
/// whole, by [`crate::catalog::Catalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct License {
    pub info: LicenseInfo,
    pub content: LicenseContent,
}

/// How a probed URL's host is treated during discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    /// A GitHub-style host whose web UI does not serve plain text; probe
    /// URLs are rewritten to the raw-content host.
    GitHub,
    /// Anything else; probed verbatim.
    Other,
}

/// Outcome of probing one input URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryResult {
    /// Display name derived from the input URL (`owner/repo` for GitHub
    /// hosts, the URL itself otherwise).
    pub source: String,
    /// Detected license name, or [`crate::probe::CHECK_FAILED`].
    pub license_name: String,
    /// The candidate URL that answered 200; empty when none did.
    pub matched_url: String,
}
