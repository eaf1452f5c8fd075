/// Where an association record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOrigin {
    /// Registered by `Associations::reset` itself.
    Builtin,
    /// Registered from user configuration.
    Custom,
}

/// One candidate command for opening or previewing a file.
///
/// `command` is a shell-command template that may contain `%`-macro
/// placeholders; `description` is the optional human-readable label parsed
/// from a `{...}` prefix in the configuration.
#[derive(Debug, Clone)]
pub struct ProgramRecord {
    /// Shell-command template.
    pub command: String,
    /// Human-readable label, possibly empty.
    pub description: String,
    /// Builtin or user-configured.
    pub origin: RecordOrigin,
}

/// Two records are the same entry when command and description match;
/// origin does not participate.
impl PartialEq for ProgramRecord {
    fn eq(&self, other: &Self) -> bool {
        self.command == other.command && self.description == other.description
    }
}

impl Eq for ProgramRecord {}

/// Ordered, append-only list of records that silently drops duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordList {
    records: Vec<ProgramRecord>,
}

impl RecordList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record unless an equal (command, description) pair is
    /// already present.
    pub fn add(&mut self, command: &str, description: &str, origin: RecordOrigin) {
        if self.contains(command, description) {
            return;
        }
        self.records.push(ProgramRecord {
            command: command.to_string(),
            description: description.to_string(),
            origin,
        });
    }

    /// Append every record of `other` that is not already present,
    /// preserving `other`'s order and each record's own origin.
    pub fn add_all(&mut self, other: &RecordList) {
        for record in &other.records {
            if !self.contains(&record.command, &record.description) {
                self.records.push(record.clone());
            }
        }
    }

    /// Whether the list holds the given (command, description) pair.
    pub fn contains(&self, command: &str, description: &str) -> bool {
        self.records
            .iter()
            .any(|r| r.command == command && r.description == description)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the list holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, ProgramRecord> {
        self.records.iter()
    }

    /// Record at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&ProgramRecord> {
        self.records.get(index)
    }
}

impl<'a> IntoIterator for &'a RecordList {
    type Item = &'a ProgramRecord;
    type IntoIter = std::slice::Iter<'a, ProgramRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Parse a comma-separated command list into a record list.
///
/// A doubled comma (`,,`) inside a command stands for a literal comma. When
/// `with_descriptions` is set, a leading `{description}` on a command is
/// stripped and stored separately; a `{` with no matching `}` is ordinary
/// text. Commands that end up empty are dropped.
pub fn parse_command_list(
    commands: &str,
    with_descriptions: bool,
    origin: RecordOrigin,
) -> RecordList {
    let mut records = RecordList::new();

    for part in split_commands(commands) {
        let mut command = part.trim_start();
        let mut description = "";

        if with_descriptions && command.starts_with('{') {
            if let Some(end) = command.find('}') {
                description = &command[1..end];
                command = command[end + 1..].trim_start();
            }
        }

        if !command.is_empty() {
            records.add(command, description, origin);
        }
    }

    records
}

/// Split on single commas, collapsing doubled commas into literal ones.
fn split_commands(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == ',' {
            if chars.peek() == Some(&',') {
                chars.next();
                current.push(',');
            } else {
                parts.push(std::mem::take(&mut current));
            }
        } else {
            current.push(c);
        }
    }
    parts.push(current);
    parts
}

/// Squash doubled commas into single ones, the inverse of command-list
/// escaping for a single command.
pub fn undouble_commas(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ',' && chars.peek() == Some(&',') {
            chars.next();
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_dedups_on_command_and_description() {
        let mut list = RecordList::new();
        list.add("vim", "Edit", RecordOrigin::Custom);
        list.add("vim", "Edit", RecordOrigin::Custom);
        assert_eq!(list.len(), 1);

        // Same command under a different description is a distinct entry.
        list.add("vim", "Editor", RecordOrigin::Custom);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_dedup_ignores_origin() {
        let mut list = RecordList::new();
        list.add("vim", "", RecordOrigin::Builtin);
        list.add("vim", "", RecordOrigin::Custom);
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(0).unwrap().origin, RecordOrigin::Builtin);
    }

    #[test]
    fn test_add_all_preserves_order_and_origin() {
        let mut a = RecordList::new();
        a.add("vim", "", RecordOrigin::Custom);

        let mut b = RecordList::new();
        b.add("emacs", "", RecordOrigin::Builtin);
        b.add("vim", "", RecordOrigin::Custom);
        b.add("nano", "", RecordOrigin::Custom);

        a.add_all(&b);
        let commands: Vec<&str> = a.iter().map(|r| r.command.as_str()).collect();
        assert_eq!(commands, ["vim", "emacs", "nano"]);
        assert_eq!(a.get(1).unwrap().origin, RecordOrigin::Builtin);
    }

    #[test]
    fn test_add_all_empty_source_is_a_noop() {
        let mut a = RecordList::new();
        a.add("vim", "", RecordOrigin::Custom);
        a.add_all(&RecordList::new());
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn test_parse_escaped_commas() {
        let list = parse_command_list("a,,b,c", false, RecordOrigin::Custom);
        let commands: Vec<&str> = list.iter().map(|r| r.command.as_str()).collect();
        assert_eq!(commands, ["a,b", "c"]);
    }

    #[test]
    fn test_parse_description() {
        let list = parse_command_list("{Open with Editor}vim {}", true, RecordOrigin::Custom);
        assert_eq!(list.len(), 1);
        let record = list.get(0).unwrap();
        assert_eq!(record.description, "Open with Editor");
        assert_eq!(record.command, "vim {}");
    }

    #[test]
    fn test_parse_descriptions_disabled() {
        let list = parse_command_list("{Open}vim", false, RecordOrigin::Custom);
        let record = list.get(0).unwrap();
        assert_eq!(record.command, "{Open}vim");
        assert_eq!(record.description, "");
    }

    #[test]
    fn test_unmatched_brace_is_plain_text() {
        let list = parse_command_list("{broken vim", true, RecordOrigin::Custom);
        let record = list.get(0).unwrap();
        assert_eq!(record.command, "{broken vim");
        assert_eq!(record.description, "");
    }

    #[test]
    fn test_empty_commands_are_dropped() {
        let list = parse_command_list("vim,,{Nothing},  ,", true, RecordOrigin::Custom);
        // "vim,{Nothing}" survives as one command with a literal comma;
        // the description-only and whitespace-only entries are dropped.
        let commands: Vec<&str> = list.iter().map(|r| r.command.as_str()).collect();
        assert_eq!(commands, ["vim,{Nothing}"]);
    }

    #[test]
    fn test_parse_dedups() {
        let list = parse_command_list("vim,vim", true, RecordOrigin::Custom);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_undouble_commas() {
        assert_eq!(undouble_commas("a,,b"), "a,b");
        assert_eq!(undouble_commas("a,,,,b"), "a,,b");
        assert_eq!(undouble_commas("plain"), "plain");
    }
}
