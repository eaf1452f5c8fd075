use crate::assoc::{resolve, resolve_all, Assoc, AssocList};
use crate::matcher::MatcherGroup;
use crate::record::{parse_command_list, RecordList, RecordOrigin};

/// Pseudo-command bound to directories by default. The application handles
/// it itself (by entering the directory) instead of spawning a process.
pub const ENTER_DIRECTORY_COMMAND: &str = "<enter-directory>";

/// Pattern of the builtin default association.
const DIRECTORY_PATTERN: &str = "{*/}";

/// Which program list an active entry points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProgramSource {
    Plain,
    Graphical,
}

/// Predicate deciding whether the executable behind a command is available.
pub type ExistenceCheck = dyn Fn(&str) -> bool;

/// Registry of all file associations: plain-mode and graphical-mode program
/// bindings, viewer bindings, and the merged active list that opener lookups
/// actually consult.
///
/// The active list stores handles into the two program lists rather than
/// copies, so entries can never dangle. It is rebuilt through `reset` plus
/// re-registration, never mutated directly.
pub struct Associations {
    programs: AssocList,
    graphical_programs: AssocList,
    viewers: AssocList,
    active: Vec<(ProgramSource, usize)>,
    exists_check: Option<Box<ExistenceCheck>>,
}

impl Default for Associations {
    fn default() -> Self {
        Self::new()
    }
}

impl Associations {
    /// Create a registry with all lists empty and no existence predicate.
    pub fn new() -> Self {
        Self {
            programs: AssocList::new(),
            graphical_programs: AssocList::new(),
            viewers: AssocList::new(),
            active: Vec::new(),
            exists_check: None,
        }
    }

    /// Inject the predicate used to decide whether an executable is
    /// available. Without one every command is treated as existing, which
    /// keeps the registry usable without a process environment.
    pub fn set_exists_check(&mut self, check: impl Fn(&str) -> bool + 'static) {
        self.exists_check = Some(Box::new(check));
    }

    /// Whether the executable behind a command template is available: the
    /// template's first shell word, with backslashes normalized to forward
    /// slashes, is handed to the injected predicate.
    pub fn command_exists(&self, template: &str) -> bool {
        match &self.exists_check {
            Some(check) => {
                let name = extract_command_name(template).replace('\\', "/");
                check(&name)
            }
            None => true,
        }
    }

    /// Clear all four lists and register the single builtin association:
    /// any directory opens via `ENTER_DIRECTORY_COMMAND`.
    pub fn reset(&mut self, graphical: bool) {
        self.programs.clear();
        self.graphical_programs.clear();
        self.viewers.clear();
        self.active.clear();

        let matchers = MatcherGroup::parse(DIRECTORY_PATTERN)
            .expect("builtin directory pattern must compile");
        self.set_programs_as(
            matchers,
            &format!("{{Enter directory}}{ENTER_DIRECTORY_COMMAND}"),
            false,
            graphical,
            RecordOrigin::Builtin,
        );
    }

    /// Register a program association. `for_graphical` targets the
    /// graphical-mode list; `in_graphical` states whether the current
    /// environment is graphical, which decides whether the association also
    /// becomes active. The command list is parsed with descriptions enabled.
    pub fn set_programs(
        &mut self,
        matchers: MatcherGroup,
        commands: &str,
        for_graphical: bool,
        in_graphical: bool,
    ) {
        self.set_programs_as(
            matchers,
            commands,
            for_graphical,
            in_graphical,
            RecordOrigin::Custom,
        );
    }

    fn set_programs_as(
        &mut self,
        matchers: MatcherGroup,
        commands: &str,
        for_graphical: bool,
        in_graphical: bool,
        origin: RecordOrigin,
    ) {
        let assoc = Assoc {
            matchers,
            records: parse_command_list(commands, true, origin),
        };

        let (list, source) = if for_graphical {
            (&mut self.graphical_programs, ProgramSource::Graphical)
        } else {
            (&mut self.programs, ProgramSource::Plain)
        };

        if list.add(assoc) && (!for_graphical || in_graphical) {
            self.active.push((source, list.len() - 1));
        }
    }

    /// Register a viewer association. The command list is parsed without
    /// descriptions.
    pub fn set_viewers(&mut self, matchers: MatcherGroup, commands: &str) {
        let assoc = Assoc {
            matchers,
            records: parse_command_list(commands, false, RecordOrigin::Custom),
        };
        self.viewers.add(assoc);
    }

    /// The command that opens `name`, or `None` when no active association
    /// matches or the first matching one has no available command.
    pub fn program_for(&self, name: &str) -> Option<&str> {
        resolve(self.active_assocs(), name, &|cmd| self.command_exists(cmd))
            .map(|r| r.command.as_str())
    }

    /// The command that previews `name`, resolved the same way against the
    /// viewer list.
    pub fn viewer_for(&self, name: &str) -> Option<&str> {
        resolve(self.viewers.iter(), name, &|cmd| self.command_exists(cmd))
            .map(|r| r.command.as_str())
    }

    /// Every existing, distinct viewer command across all matching viewer
    /// associations, in first-seen order. Suitable for a choice menu.
    pub fn viewers_for(&self, name: &str) -> Vec<String> {
        let mut viewers: Vec<String> = Vec::new();
        for assoc in &self.viewers {
            if !assoc.matchers.matches(name) {
                continue;
            }
            for record in &assoc.records {
                if !viewers.iter().any(|v| v == &record.command)
                    && self.command_exists(&record.command)
                {
                    viewers.push(record.command.clone());
                }
            }
        }
        viewers
    }

    /// All program records configured for `name`, regardless of
    /// availability, deduplicated, in first-seen order.
    pub fn all_programs(&self, name: &str) -> RecordList {
        resolve_all(self.active_assocs(), name)
    }

    /// All viewer records configured for `name`, regardless of availability.
    pub fn all_viewers(&self, name: &str) -> RecordList {
        resolve_all(self.viewers.iter(), name)
    }

    /// Plain-mode program associations.
    pub fn programs(&self) -> &AssocList {
        &self.programs
    }

    /// Graphical-mode-only program associations.
    pub fn graphical_programs(&self) -> &AssocList {
        &self.graphical_programs
    }

    /// Viewer associations.
    pub fn viewers(&self) -> &AssocList {
        &self.viewers
    }

    /// Number of entries in the active (merged) list.
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    fn active_assocs(&self) -> impl Iterator<Item = &Assoc> {
        self.active.iter().map(|&(source, index)| {
            let list = match source {
                ProgramSource::Plain => &self.programs,
                ProgramSource::Graphical => &self.graphical_programs,
            };
            list.get(index)
                .expect("active list handles stay within their source lists")
        })
    }
}

/// First shell word of a command template: a leading double-quoted span, or
/// everything up to the first whitespace.
fn extract_command_name(template: &str) -> &str {
    let template = template.trim_start();
    if let Some(rest) = template.strip_prefix('"') {
        return match rest.find('"') {
            Some(end) => &rest[..end],
            None => rest,
        };
    }
    template
        .split_whitespace()
        .next()
        .unwrap_or("")
}
