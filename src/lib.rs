//! Resolve which external program should open or preview a file, from
//! pattern-to-command associations.
//!
//! Associations bind a [`MatcherGroup`] (OR-combined file-name patterns) to
//! an ordered list of candidate commands. The [`Associations`] registry
//! keeps separate lists for plain-mode and graphical-mode openers plus
//! viewers, merges the program lists into the active set consulted by
//! lookups, and filters candidates through an injected
//! command-availability predicate. The library never executes commands or
//! touches files; [`Config`] and the `openwith` binary provide the
//! storage and process layers around it.

pub mod assoc;
pub mod config;
pub mod matcher;
pub mod record;
pub mod registry;
pub mod viewer;

pub use assoc::{Assoc, AssocList};
pub use config::Config;
pub use matcher::{Matcher, MatcherGroup, PatternError};
pub use record::{ProgramRecord, RecordList, RecordOrigin};
pub use registry::{Associations, ENTER_DIRECTORY_COMMAND};
pub use viewer::{viewer_kind, ViewerKind};
