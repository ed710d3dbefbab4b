//! Cross-file dependency solver (spec §4.8).
//!
//! **Open Question resolved**: spec.md's prose literally reads "moving `j`
//! to just after `i`" for the pair where `j` defines a symbol `i`
//! references. Taken at face value that produces `i` before `j`, which
//! contradicts both the module's own stated goal ("every file defining a
//! type appears before every file that uses that type", §2) and concrete
//! scenario 5 (`A` defines `Widget`, `B` references `Widget*`, and "after
//! the solver, `A` precedes `B`"). This implementation follows the
//! invariant and the scenario: the *referencing* file is moved to sit
//! just after its *defining* file. Recorded in DESIGN.md.

use au_translate::source_file::SourceFile;
use au_translate::types::SymbolFlags;

fn defines_symbol_referenced(definer: &SourceFile, user: &SourceFile) -> bool {
    definer.symbol_flags.iter().any(|(name, dflags)| {
        dflags.contains(SymbolFlags::DEFINED_HERE)
            && user
                .symbol_flags
                .get(name)
                .is_some_and(|uflags| uflags.contains(SymbolFlags::REFERENCED))
    })
}

/// Reorders `files` in place so that, as far as the move bound allows,
/// every file defining a symbol another file references precedes that
/// file. Returns warning messages naming files whose rearrangement counter
/// met or exceeded `n` when the bound was exhausted.
pub fn solve(files: &mut Vec<SourceFile>) -> Vec<String> {
    let n = files.len();
    if n < 2 {
        return Vec::new();
    }
    let bound = n.saturating_mul(n).saturating_mul(100);
    let mut moves = 0usize;

    'restart: loop {
        for definer_idx in 0..files.len() {
            for user_idx in 0..definer_idx {
                if defines_symbol_referenced(&files[definer_idx], &files[user_idx]) {
                    let user = files.remove(user_idx);
                    let new_definer_idx = definer_idx - 1;
                    let insert_at = new_definer_idx + 1;
                    files.insert(insert_at, user);
                    files[insert_at].rearrangement_count += 1;
                    moves += 1;
                    if moves >= bound {
                        break 'restart;
                    }
                    continue 'restart;
                }
            }
        }
        break;
    }

    if moves < bound {
        return Vec::new();
    }
    files
        .iter()
        .filter(|f| f.rearrangement_count as usize >= n)
        .map(|f| {
            format!(
                "dependency solver exhausted its move bound; ordering for {} is unresolved",
                f.path.display()
            )
        })
        .collect()
}

/// Populates `exports_to`/`imports_from` edges: for every `(j, i)` with `j`
/// defining a symbol `i` references, adds `j.exports_to += i` and
/// `i.imports_from += j`.
pub fn build_export_graph(files: &mut [SourceFile]) {
    let n = files.len();
    let mut edges = Vec::new();
    for j in 0..n {
        for i in 0..n {
            if i != j && defines_symbol_referenced(&files[j], &files[i]) {
                edges.push((j, i));
            }
        }
    }
    for (j, i) in edges {
        if !files[j].exports_to.contains(&i) {
            files[j].exports_to.push(i);
        }
        if !files[i].imports_from.contains(&j) {
            files[i].imports_from.push(j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn file_with_flag(name: &str, symbol: &str, flags: SymbolFlags) -> SourceFile {
        let mut f = SourceFile::new(PathBuf::from(name), Vec::new());
        f.symbol_flags.insert(symbol.to_string(), flags);
        f
    }

    #[test]
    fn definer_ends_up_before_user() {
        let b = file_with_flag("B.au", "Widget", SymbolFlags::REFERENCED);
        let a = file_with_flag("A.au", "Widget", SymbolFlags::DEFINED_HERE);
        let mut files = vec![b, a];
        let warnings = solve(&mut files);
        assert!(warnings.is_empty());
        assert_eq!(files[0].path, PathBuf::from("A.au"));
        assert_eq!(files[1].path, PathBuf::from("B.au"));
    }

    #[test]
    fn already_correct_order_is_left_alone() {
        let a = file_with_flag("A.au", "Widget", SymbolFlags::DEFINED_HERE);
        let b = file_with_flag("B.au", "Widget", SymbolFlags::REFERENCED);
        let mut files = vec![a, b];
        let warnings = solve(&mut files);
        assert!(warnings.is_empty());
        assert_eq!(files[0].path, PathBuf::from("A.au"));
        assert_eq!(files[1].path, PathBuf::from("B.au"));
    }

    #[test]
    fn export_graph_links_definer_to_user() {
        let a = file_with_flag("A.au", "Widget", SymbolFlags::DEFINED_HERE);
        let b = file_with_flag("B.au", "Widget", SymbolFlags::REFERENCED);
        let mut files = vec![a, b];
        build_export_graph(&mut files);
        assert_eq!(files[0].exports_to, vec![1]);
        assert_eq!(files[1].imports_from, vec![0]);
    }
}
