//! Display-side cleanup applied after reconciliation.

use regex::Regex;
use std::sync::LazyLock;

use crate::templates::NO_DATA_CELL;

static SPACE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" {2,}").expect("space run regex is valid"));

/// Collapse runs of spaces and fill table cells the model left empty.
///
/// Idempotent. Commutes with the reconciler's own bracket cleanup.
pub fn finalize_for_display(text: &str) -> String {
    let collapsed = SPACE_RUN_RE.replace_all(text, " ");
    fill_empty_cells(&collapsed)
}

fn fill_empty_cells(text: &str) -> String {
    let filled = format!("| {} |", NO_DATA_CELL);
    let mut out = text.to_string();
    // "| | |" holds two empty cells that share a pipe, so one pass is not enough.
    while out.contains("| |") {
        out = out.replace("| |", &filled);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collapses_space_runs() {
        assert_eq!(finalize_for_display("a    b  c d"), "a b c d");
    }

    #[test]
    fn test_fills_empty_cell() {
        assert_eq!(
            finalize_for_display("| Age limit | 0-65 |   |"),
            "| Age limit | 0-65 | No relevant data found |"
        );
    }

    #[test]
    fn test_fills_adjacent_empty_cells() {
        assert_eq!(
            finalize_for_display("| Item | | |"),
            "| Item | No relevant data found | No relevant data found |"
        );
    }

    #[test]
    fn test_leaves_table_separator_alone() {
        let text = "| A | B |\n|---|---|\n| 1 | 2 |";
        assert_eq!(finalize_for_display(text), text);
    }

    #[test]
    fn test_idempotent() {
        let text = "| x |    | y |  [ :2]";
        let once = finalize_for_display(text);
        assert_eq!(finalize_for_display(&once), once);
    }
}
