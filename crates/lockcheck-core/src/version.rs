//! Version range satisfaction

/// Whether `version` satisfies the npm-style `range`.
///
/// Uses node-semver semantics (`^`, `~`, `x`, hyphen ranges, `||`). A
/// version or range that cannot be parsed (tags, git or file specifiers)
/// never satisfies. An empty range means any version, as npm treats it.
pub fn satisfies(version: &str, range: &str) -> bool {
    let range = match range.trim() {
        "" => "*",
        trimmed => trimmed,
    };
    let Ok(range) = node_semver::Range::parse(range) else {
        return false;
    };
    let Ok(version) = node_semver::Version::parse(version) else {
        return false;
    };
    range.satisfies(&version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caret_ranges() {
        assert!(satisfies("1.0.0", "^1.0.0"));
        assert!(satisfies("1.2.3", "^1.0.0"));
        assert!(!satisfies("2.0.0", "^1.0.0"));
        assert!(!satisfies("0.9.0", "^1.0.0"));
    }

    #[test]
    fn test_other_ranges() {
        assert!(satisfies("1.0.5", "~1.0.0"));
        assert!(!satisfies("1.1.0", "~1.0.0"));
        assert!(satisfies("3.4.5", "*"));
        assert!(satisfies("2.5.0", "1.x || >=2.5.0"));
        assert!(satisfies("1.2.3", "1.2.3"));
        assert!(satisfies("1.2.3", ""));
        assert!(satisfies("0.0.1", "  "));
    }

    #[test]
    fn test_unparseable_inputs() {
        assert!(!satisfies("not-a-version", "^1.0.0"));
        assert!(!satisfies("1.0.0", "github:user/repo"));
    }
}
