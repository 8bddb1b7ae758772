//! Dialect lookup by name.
//!
//! Dialects register themselves with `inventory::submit!`; adding one never
//! touches this file.
//!
//! ```ignore
//! fn build() -> Arc<dyn DbBaser> {
//!     Arc::new(MyDialect)
//! }
//!
//! inventory::submit! {
//!     DialectRegistration { name: "mydb", aliases: &[], build }
//! }
//! ```

use super::DbBaser;
use crate::error::{OrmError, OrmResult};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

/// Registration entry for a dialect.
pub struct DialectRegistration {
    /// Canonical name, matched case-insensitively.
    pub name: &'static str,
    /// Alternative names (driver names, abbreviations).
    pub aliases: &'static [&'static str],
    /// Constructor, called once per process.
    pub build: fn() -> Arc<dyn DbBaser>,
}

inventory::collect!(DialectRegistration);

struct Registry {
    by_name: HashMap<String, Arc<dyn DbBaser>>,
    names: Vec<&'static str>,
}

static REGISTRY: LazyLock<Registry> = LazyLock::new(|| {
    let mut by_name = HashMap::new();
    let mut names = Vec::new();
    for reg in inventory::iter::<DialectRegistration> {
        let dialect = (reg.build)();
        for alias in reg.aliases {
            by_name.insert(alias.to_ascii_lowercase(), dialect.clone());
        }
        by_name.insert(reg.name.to_ascii_lowercase(), dialect);
        names.push(reg.name);
    }
    names.sort_unstable();
    Registry { by_name, names }
});

/// The shared instance registered under `name` (or one of its aliases).
pub fn dialect(name: &str) -> OrmResult<Arc<dyn DbBaser>> {
    REGISTRY
        .by_name
        .get(&name.to_ascii_lowercase())
        .cloned()
        .ok_or_else(|| OrmError::UnknownDialect(name.to_string()))
}

/// Canonical names of every registered dialect, sorted.
pub fn dialect_names() -> &'static [&'static str] {
    &REGISTRY.names
}
