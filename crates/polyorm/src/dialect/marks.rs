//! Placeholder rewriting.
//!
//! Statements are generated with canonical `?` marks. Each dialect maps them
//! to its native parameter syntax in one forward scan.

use std::fmt::Write;

/// Number of canonical `?` marks in `query`.
pub fn count_marks(query: &str) -> usize {
    query.bytes().filter(|&b| b == b'?').count()
}

/// Replace every `?` with `prefix` followed by its 1-based position.
///
/// `:` gives `:1, :2`, `$` gives `$1, $2`, `@p` gives `@p1, @p2`. A query
/// without marks is left untouched and nothing is allocated.
pub fn rewrite_numbered(query: &mut String, prefix: &str) {
    let num = count_marks(query);
    if num == 0 {
        return;
    }

    let mut out = String::with_capacity(query.len() + num * (prefix.len() + 3));
    let mut idx: usize = 0;
    for c in query.chars() {
        if c == '?' {
            idx += 1;
            out.push_str(prefix);
            let _ = write!(&mut out, "{idx}");
        } else {
            out.push(c);
        }
    }
    *query = out;
}
