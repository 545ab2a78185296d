//! Name sanitizing for function paths, objectives and tags.

use hashbrown::HashSet;

/// Lowercase name restricted to characters allowed in resource paths (`[a-z0-9_.-]`).
///
/// The result is always a single ordinary path segment: a leading `.` becomes `_`, so `.`
/// and `..` can never climb out of the directory the name is joined onto.
pub fn path_safe(name: &str) -> String {
    let mut out = sanitize(name, |c| {
        c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | '-')
    });
    let dots = out.len() - out.trim_start_matches('.').len();
    out.replace_range(..dots, &"_".repeat(dots));
    out
}

/// Lowercase name restricted to `[a-z0-9_]`, usable inside objective names and tags.
pub fn storage_safe(name: &str) -> String {
    sanitize(name, |c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn sanitize(name: &str, keep: impl Fn(char) -> bool) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.trim().chars().flat_map(char::to_lowercase) {
        if keep(c) {
            out.push(c);
        } else {
            out.push('_');
        }
    }
    if out.is_empty() {
        out.push_str("unnamed");
    }
    out
}

/// Hands out sanitized names, suffixing `_2`, `_3`, … when two inputs collide.
#[derive(Debug, Default)]
pub struct NameAllocator {
    taken: HashSet<String>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the allocated name and whether it had to be renamed.
    pub fn allocate(&mut self, base: String) -> (String, bool) {
        if self.taken.insert(base.clone()) {
            return (base, false);
        }
        let mut n = 2u32;
        loop {
            let candidate = format!("{base}_{n}");
            if self.taken.insert(candidate.clone()) {
                return (candidate, true);
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_safe_keeps_dots_and_dashes() {
        assert_eq!(path_safe("Walk Cycle.v2-final"), "walk_cycle.v2-final");
    }

    #[test]
    fn path_safe_never_yields_relative_segments() {
        assert_eq!(path_safe("."), "_");
        assert_eq!(path_safe(".."), "__");
        assert_eq!(path_safe("../tick"), "___tick");
        assert_eq!(path_safe(".hidden.v2"), "_hidden.v2");
    }

    #[test]
    fn storage_safe_replaces_everything_else() {
        assert_eq!(storage_safe("Walk Cycle.v2-final"), "walk_cycle_v2_final");
        assert_eq!(storage_safe("   "), "unnamed");
    }

    #[test]
    fn allocator_suffixes_collisions() {
        let mut alloc = NameAllocator::new();
        assert_eq!(alloc.allocate("arm".into()), ("arm".to_string(), false));
        assert_eq!(alloc.allocate("arm".into()), ("arm_2".to_string(), true));
        assert_eq!(alloc.allocate("arm".into()), ("arm_3".to_string(), true));
    }
}
