//! Resolution of iRIC project inputs.
//!
//! An iRIC result can arrive in three shapes:
//!
//! - a single container (`Case1.cgn`) holding every step, bare, inside a
//!   project directory, or inside a `.ipro` archive;
//! - a per-step container series (`Solution1.cgn`, `Solution2.cgn`, ...)
//!   inside a directory or archive;
//! - an exported flat-table series (`Result_1.csv`, ...) in a directory.
//!
//! This crate tells them apart and unpacks archive members into a
//! session-scoped [`ScratchDir`].

pub mod archive;
pub mod classify;
pub mod error;
pub mod flat;
pub mod scratch;
pub mod series;
pub mod tree;

pub use archive::{is_archive, list_archive_members, pick_case_member, ArchiveMember};
pub use classify::{classify_input, InputKind};
pub use error::{ProjectError, Result};
pub use flat::{list_flat_tables, parse_result_step, FlatTableFile};
pub use scratch::ScratchDir;
pub use series::{discover_series, parse_solution_step, SeriesMember, UNNUMBERED_STEP};
pub use tree::{find_case_in_dir, list_containers_in_dir};

/// Case file looked up when the caller does not name one.
pub const DEFAULT_CASE_NAME: &str = "Case1.cgn";

/// Extension of container files, without the dot.
pub const CONTAINER_EXT: &str = "cgn";

/// Final component of a `/`- or `\`-separated member name.
pub fn file_name(member: &str) -> &str {
    member.rsplit(['/', '\\']).next().unwrap_or(member)
}

/// Case-insensitive check of a name's extension.
pub fn has_extension(name: &str, ext: &str) -> bool {
    let name = file_name(name);
    match name.rsplit_once('.') {
        Some((stem, e)) => !stem.is_empty() && e.eq_ignore_ascii_case(ext),
        None => false,
    }
}
