use std::fmt;

use globset::{GlobBuilder, GlobMatcher};
use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// A single pattern expression failed to compile.
///
/// Carries the offending expression verbatim along with the message from the
/// underlying glob/regex engine.
#[derive(Debug, Clone, Error)]
#[error("wrong pattern ({expr}): {message}")]
pub struct PatternError {
    /// The expression that failed to compile.
    pub expr: String,
    /// Diagnostic from the underlying pattern engine.
    pub message: String,
}

impl PatternError {
    fn new(expr: &str, message: impl Into<String>) -> Self {
        Self {
            expr: expr.to_string(),
            message: message.into(),
        }
    }
}

/// One glob alternative within a pattern expression.
#[derive(Debug, Clone)]
struct GlobPattern {
    glob: GlobMatcher,
    dirs_only: bool,
}

/// Compiled form of a single pattern expression.
#[derive(Debug, Clone)]
enum Compiled {
    Globs(Vec<GlobPattern>),
    Regex(Regex),
}

/// A compiled file-name pattern that remembers its original expression.
///
/// Three syntaxes are accepted:
/// - `{glob,glob,...}` — comma-separated globs, any of which may match; a
///   trailing `/` on a glob restricts it to directories (names ending
///   with `/`).
/// - `/regex/` — a regular expression, searched (not anchored) within the
///   name; optional trailing flags `i` (force case-insensitive) and `I`
///   (force case-sensitive).
/// - anything else — compiled as a bare glob.
///
/// Both syntaxes are case-insensitive unless the expression requests
/// otherwise.
#[derive(Debug, Clone)]
pub struct Matcher {
    expr: String,
    compiled: Compiled,
}

impl Matcher {
    /// Compile a single pattern expression.
    pub fn parse(expr: &str) -> Result<Self, PatternError> {
        let compiled = if let Some(inner) = expr
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
        {
            compile_glob(expr, inner)?
        } else if expr.len() >= 2 && expr.starts_with('/') && expr[1..].contains('/') {
            compile_regex(expr)?
        } else {
            compile_glob(expr, expr)?
        };

        Ok(Self {
            expr: expr.to_string(),
            compiled,
        })
    }

    /// The original expression this matcher was compiled from.
    pub fn expr(&self) -> &str {
        &self.expr
    }

    /// Check `name` against this pattern. A trailing `/` marks `name` as a
    /// directory; it is stripped before glob/regex matching.
    pub fn matches(&self, name: &str) -> bool {
        let is_dir = name.ends_with('/');
        let stem = if is_dir { &name[..name.len() - 1] } else { name };

        match &self.compiled {
            Compiled::Globs(globs) => globs.iter().any(|g| {
                if g.dirs_only && !is_dir {
                    return false;
                }
                g.glob.is_match(stem)
            }),
            Compiled::Regex(re) => re.is_match(stem),
        }
    }
}

/// Compile `body` as a comma-separated list of glob alternatives.
fn compile_glob(expr: &str, body: &str) -> Result<Compiled, PatternError> {
    let mut globs = Vec::new();

    for piece in body.split(',') {
        let (glob_src, dirs_only) = match piece.strip_suffix('/') {
            Some(stripped) => (stripped, true),
            None => (piece, false),
        };

        if glob_src.is_empty() {
            return Err(PatternError::new(expr, "empty pattern"));
        }

        let glob = GlobBuilder::new(glob_src)
            .case_insensitive(true)
            .literal_separator(false)
            .build()
            .map_err(|e| PatternError::new(expr, e.to_string()))?
            .compile_matcher();

        globs.push(GlobPattern { glob, dirs_only });
    }

    Ok(Compiled::Globs(globs))
}

fn compile_regex(expr: &str) -> Result<Compiled, PatternError> {
    // expr starts with '/' and has at least one more '/'; everything after
    // the last '/' is flag characters.
    let close = expr.rfind('/').unwrap_or(0);
    let body = &expr[1..close];
    let flags = &expr[close + 1..];

    let mut case_insensitive = true;
    for flag in flags.chars() {
        match flag {
            'i' => case_insensitive = true,
            'I' => case_insensitive = false,
            _ => {
                return Err(PatternError::new(expr, format!("unknown flag `{flag}`")));
            }
        }
    }

    // An empty body (`//`) matches everything, same as an empty regex.
    let re = RegexBuilder::new(body)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| PatternError::new(expr, e.to_string()))?;

    Ok(Compiled::Regex(re))
}

/// An ordered, OR-combined group of matchers parsed from a comma-separated
/// pattern list. Serializes back to the original expressions in order.
#[derive(Debug, Clone, Default)]
pub struct MatcherGroup {
    matchers: Vec<Matcher>,
}

impl MatcherGroup {
    /// Parse a comma-separated pattern list, e.g. `{*.png,*.jpg},/\.tiff?$/`.
    ///
    /// Commas inside `{...}` braces or `/.../ ` regex spans do not split.
    /// Fails atomically: if any expression is invalid no group is returned.
    pub fn parse(list: &str) -> Result<Self, PatternError> {
        let mut matchers = Vec::new();
        for expr in split_expressions(list) {
            if expr.is_empty() {
                continue;
            }
            matchers.push(Matcher::parse(expr)?);
        }
        Ok(Self { matchers })
    }

    /// True iff any member matches. An empty group never matches.
    pub fn matches(&self, name: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(name))
    }

    /// Number of matchers in the group.
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    /// True when the group has no matchers.
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Original expressions, in order.
    pub fn exprs(&self) -> impl Iterator<Item = &str> {
        self.matchers.iter().map(Matcher::expr)
    }
}

impl fmt::Display for MatcherGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, m) in self.matchers.iter().enumerate() {
            if i != 0 {
                f.write_str(",")?;
            }
            f.write_str(m.expr())?;
        }
        Ok(())
    }
}

/// Split a pattern list on commas that sit outside `{...}` and `/.../` spans.
fn split_expressions(list: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut in_regex = false;
    let mut escaped = false;
    let mut at_piece_start = true;

    for (i, c) in list.char_indices() {
        if in_regex {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '/' {
                in_regex = false;
            }
            at_piece_start = false;
            continue;
        }

        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            // Only a '/' opening a piece starts a regex span.
            '/' if at_piece_start => in_regex = true,
            ',' if depth == 0 => {
                pieces.push(&list[start..i]);
                start = i + 1;
                at_piece_start = true;
                continue;
            }
            _ => {}
        }
        at_piece_start = false;
    }
    pieces.push(&list[start..]);
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_matches_case_insensitively() {
        let m = Matcher::parse("*.txt").unwrap();
        assert!(m.matches("notes.txt"));
        assert!(m.matches("NOTES.TXT"));
        assert!(!m.matches("notes.md"));
    }

    #[test]
    fn test_braced_glob() {
        let m = Matcher::parse("{*.tar.gz}").unwrap();
        assert!(m.matches("a.tar.gz"));
        assert!(!m.matches("a.tar"));
    }

    #[test]
    fn test_directory_only_pattern() {
        let m = Matcher::parse("{*/}").unwrap();
        assert!(m.matches("somedir/"));
        assert!(!m.matches("somefile"));
    }

    #[test]
    fn test_plain_glob_matches_directories_too() {
        let m = Matcher::parse("*.d").unwrap();
        assert!(m.matches("init.d/"));
        assert!(m.matches("init.d"));
    }

    #[test]
    fn test_regex_pattern() {
        let m = Matcher::parse(r"/\.tiff?$/").unwrap();
        assert!(m.matches("img.tif"));
        assert!(m.matches("img.TIFF"));
        assert!(!m.matches("img.png"));
    }

    #[test]
    fn test_regex_case_sensitive_flag() {
        let m = Matcher::parse(r"/\.gz$/I").unwrap();
        assert!(m.matches("a.gz"));
        assert!(!m.matches("a.GZ"));
    }

    #[test]
    fn test_regex_unknown_flag_is_an_error() {
        let err = Matcher::parse("/abc/x").unwrap_err();
        assert_eq!(err.expr, "/abc/x");
        assert!(err.message.contains('x'));
    }

    #[test]
    fn test_empty_regex_matches_everything() {
        let m = Matcher::parse("//").unwrap();
        assert!(m.matches("anything"));
        assert!(m.matches(""));
    }

    #[test]
    fn test_empty_braced_glob_is_an_error() {
        assert!(Matcher::parse("{}").is_err());
    }

    #[test]
    fn test_group_or_semantics() {
        let g = MatcherGroup::parse("*.txt,*.md").unwrap();
        assert!(g.matches("a.txt"));
        assert!(g.matches("a.md"));
        assert!(!g.matches("a.rs"));
    }

    #[test]
    fn test_empty_group_never_matches() {
        let g = MatcherGroup::parse("").unwrap();
        assert!(g.is_empty());
        assert!(!g.matches("a.txt"));
        assert!(!g.matches(""));
    }

    #[test]
    fn test_group_round_trip() {
        let src = "{*.png,*.jpg},/\\.tiff?$/,*.bmp";
        let g = MatcherGroup::parse(src).unwrap();
        assert_eq!(g.len(), 3);
        assert_eq!(g.to_string(), src);
    }

    #[test]
    fn test_commas_inside_braces_do_not_split() {
        let g = MatcherGroup::parse("{*.png,*.jpg}").unwrap();
        assert_eq!(g.len(), 1);
        assert!(g.matches("a.jpg"));
        assert!(g.matches("a.png"));
    }

    #[test]
    fn test_commas_inside_regex_do_not_split() {
        let g = MatcherGroup::parse("/^a{1,3}$/,*.txt").unwrap();
        assert_eq!(g.len(), 2);
        assert!(g.matches("aa"));
        assert!(g.matches("b.txt"));
    }

    #[test]
    fn test_group_parse_fails_atomically() {
        // Second expression is invalid; no partial group comes back.
        let err = MatcherGroup::parse("*.txt,/[/").unwrap_err();
        assert_eq!(err.expr, "/[/");
        assert!(!err.message.is_empty());
    }

    #[test]
    fn test_empty_pieces_are_skipped() {
        let g = MatcherGroup::parse("a.txt,,b.txt").unwrap();
        assert_eq!(g.len(), 2);
        assert_eq!(g.to_string(), "a.txt,b.txt");
    }
}
