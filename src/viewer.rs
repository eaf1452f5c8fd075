//! Classification of viewer commands by output kind.
//!
//! Viewer command templates may carry `%`-macros that the process layer
//! expands before execution: `%px`/`%py` (preview area position),
//! `%pw`/`%ph` (preview area size) and `%pd` (pass terminal graphics
//! through unmodified). The macros present decide how preview output must
//! be rendered.

/// How a viewer's output should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerKind {
    /// Output is plain text.
    Textual,
    /// Output draws graphics at a position on screen.
    Graphical,
    /// Output contains terminal escape sequences to forward unmodified.
    PassThrough,
}

/// Classify a viewer command template. An empty template means "no viewer",
/// i.e. plain text display.
pub fn viewer_kind(viewer: &str) -> ViewerKind {
    if viewer.is_empty() {
        return ViewerKind::Textual;
    }

    // Pass-through has priority: %px/%py may be present as well, but the
    // rendering path is different.
    if has_macro(viewer, "pd") {
        return ViewerKind::PassThrough;
    }

    // %pw and %ph are useful for text output too, but %px and %py only make
    // sense for graphics and only together.
    if has_macro(viewer, "px") && has_macro(viewer, "py") {
        return ViewerKind::Graphical;
    }

    ViewerKind::Textual
}

/// Whether `cmd` contains the `%`-macro with the given name. `%%` escapes a
/// literal percent sign and never starts a macro.
fn has_macro(cmd: &str, name: &str) -> bool {
    let bytes = cmd.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if bytes.get(i + 1) == Some(&b'%') {
                i += 2;
                continue;
            }
            if cmd[i + 1..].starts_with(name) {
                return true;
            }
        }
        i += 1;
    }
    false
}
