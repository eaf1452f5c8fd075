use crate::matcher::MatcherGroup;
use crate::record::{undouble_commas, ProgramRecord, RecordList};

/// A pattern group bound to an ordered list of candidate commands.
#[derive(Debug, Clone)]
pub struct Assoc {
    /// Patterns that select files this association applies to.
    pub matchers: MatcherGroup,
    /// Candidate commands, tried in order at resolution time.
    pub records: RecordList,
}

/// Ordered list of associations with duplicate suppression on insert.
#[derive(Debug, Clone, Default)]
pub struct AssocList {
    assocs: Vec<Assoc>,
}

impl AssocList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `assoc`, consuming it. Returns `false` (dropping the
    /// association) when an equal one is already present.
    pub fn add(&mut self, assoc: Assoc) -> bool {
        if self.assocs.iter().any(|a| is_same_registration(a, &assoc)) {
            return false;
        }
        self.assocs.push(assoc);
        true
    }

    /// Number of associations.
    pub fn len(&self) -> usize {
        self.assocs.len()
    }

    /// True when no associations are registered.
    pub fn is_empty(&self) -> bool {
        self.assocs.is_empty()
    }

    /// Iterate associations in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Assoc> {
        self.assocs.iter()
    }

    /// Association at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Assoc> {
        self.assocs.get(index)
    }

    /// Drop all associations.
    pub fn clear(&mut self) {
        self.assocs.clear();
    }

    /// Check whether a raw configuration line already names a command under
    /// the given pattern list: `raw_command` has its optional `{description}`
    /// stripped and its commas undoubled, then the pattern list string and
    /// the normalized command are compared against registered entries.
    /// Supports idempotent reloading of configuration text.
    pub fn contains_command(&self, patterns: &str, raw_command: &str) -> bool {
        let mut command = raw_command;
        if let Some(rest) = raw_command.strip_prefix('{') {
            if let Some(end) = rest.find('}') {
                command = rest[end + 1..].trim_start();
            }
        }
        let command = undouble_commas(command);

        self.assocs.iter().any(|a| {
            a.matchers.to_string() == patterns
                && a.records.iter().any(|r| r.command == command)
        })
    }
}

impl<'a> IntoIterator for &'a AssocList {
    type Item = &'a Assoc;
    type IntoIter = std::slice::Iter<'a, Assoc>;

    fn into_iter(self) -> Self::IntoIter {
        self.assocs.iter()
    }
}

/// Deliberately loose, position-sensitive equality used only to suppress
/// literally repeated configuration lines: counts, pairwise matcher
/// expressions, and pairwise record commands. Descriptions and origins are
/// not compared.
fn is_same_registration(a: &Assoc, b: &Assoc) -> bool {
    if a.records.len() != b.records.len() || a.matchers.len() != b.matchers.len() {
        return false;
    }

    if !a.matchers.exprs().eq(b.matchers.exprs()) {
        return false;
    }

    a.records
        .iter()
        .zip(b.records.iter())
        .all(|(ra, rb)| ra.command == rb.command)
}

/// Find the first record whose command is available, from the first
/// association whose patterns match `name`.
///
/// Only the first matching association's records are tried: when none of its
/// commands pass the existence check the whole lookup fails rather than
/// falling through to a later matching association. First registered wins
/// outright.
pub fn resolve<'a, I>(
    assocs: I,
    name: &str,
    exists: &dyn Fn(&str) -> bool,
) -> Option<&'a ProgramRecord>
where
    I: IntoIterator<Item = &'a Assoc>,
{
    for assoc in assocs {
        if assoc.matchers.matches(name) {
            return assoc.records.iter().find(|r| exists(&r.command));
        }
    }
    None
}

/// Union of the records of every association matching `name`, deduplicated,
/// in first-seen order. Availability is not checked.
pub fn resolve_all<'a, I>(assocs: I, name: &str) -> RecordList
where
    I: IntoIterator<Item = &'a Assoc>,
{
    let mut result = RecordList::new();
    for assoc in assocs {
        if assoc.matchers.matches(name) {
            result.add_all(&assoc.records);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{parse_command_list, RecordOrigin};

    fn assoc(patterns: &str, commands: &str) -> Assoc {
        Assoc {
            matchers: MatcherGroup::parse(patterns).unwrap(),
            records: parse_command_list(commands, true, RecordOrigin::Custom),
        }
    }

    #[test]
    fn test_duplicate_registration_is_dropped() {
        let mut list = AssocList::new();
        assert!(list.add(assoc("*.txt", "vim,nano")));
        assert!(!list.add(assoc("*.txt", "vim,nano")));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_equality_ignores_descriptions() {
        let mut list = AssocList::new();
        assert!(list.add(assoc("*.txt", "{Edit}vim")));
        assert!(!list.add(assoc("*.txt", "{Modify}vim")));
    }

    #[test]
    fn test_equality_is_position_sensitive() {
        let mut list = AssocList::new();
        assert!(list.add(assoc("*.txt", "vim,nano")));
        assert!(list.add(assoc("*.txt", "nano,vim")));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_first_matching_association_wins() {
        let mut list = AssocList::new();
        list.add(assoc("*.txt", "edit"));
        list.add(assoc("*.txt", "view"));

        let record = resolve(&list, "a.txt", &|_| true).unwrap();
        assert_eq!(record.command, "edit");
    }

    #[test]
    fn test_no_fall_through_when_first_match_unavailable() {
        // The first matching association's commands are all unavailable;
        // resolution must fail rather than fall through to the second
        // matching association.
        let mut list = AssocList::new();
        list.add(assoc("*.txt", "edit"));
        list.add(assoc("*.txt", "view"));

        assert!(resolve(&list, "a.txt", &|cmd| cmd != "edit").is_none());
    }

    #[test]
    fn test_resolve_skips_unavailable_within_winner() {
        let mut list = AssocList::new();
        list.add(assoc("*.txt", "edit,view"));

        let record = resolve(&list, "a.txt", &|cmd| cmd == "view").unwrap();
        assert_eq!(record.command, "view");
    }

    #[test]
    fn test_resolve_miss_on_no_matching_pattern() {
        let mut list = AssocList::new();
        list.add(assoc("*.txt", "vim"));
        assert!(resolve(&list, "a.png", &|_| true).is_none());
    }

    #[test]
    fn test_resolve_all_unions_every_match() {
        let mut list = AssocList::new();
        list.add(assoc("*.txt", "edit,common"));
        list.add(assoc("*", "common,view"));

        let all = resolve_all(&list, "a.txt");
        let commands: Vec<&str> = all.iter().map(|r| r.command.as_str()).collect();
        assert_eq!(commands, ["edit", "common", "view"]);
    }

    #[test]
    fn test_contains_command_normalizes_input() {
        let mut list = AssocList::new();
        list.add(assoc("*.txt", "{Edit}a,,b"));

        assert!(list.contains_command("*.txt", "{Anything}a,,b"));
        assert!(list.contains_command("*.txt", "a,,b"));
        assert!(!list.contains_command("*.txt", "a"));
        assert!(!list.contains_command("*.md", "a,,b"));
    }
}
