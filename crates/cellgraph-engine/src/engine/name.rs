//! Cell and variable name syntax.
//!
//! A name is a letter or underscore followed by zero or more letters,
//! underscores or digits (ASCII only). The same rule applies to formula
//! variables and spreadsheet cell names; anything stricter is left to an
//! injected validator.
//!
//! # Examples
//!
//! ```
//! use cellgraph_engine::engine::is_valid_name;
//!
//! assert!(is_valid_name("A1"));
//! assert!(is_valid_name("y_15"));
//! assert!(is_valid_name("___"));
//! assert!(!is_valid_name("25"));
//! assert!(!is_valid_name("2x"));
//! ```

use regex::Regex;
use std::sync::{Arc, OnceLock};

/// Maps a name to its canonical form before storage or lookup.
pub type Normalizer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Extra restriction applied to an already-normalized name.
pub type Validator = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Normalizer that leaves names untouched.
pub fn identity_normalizer() -> Normalizer {
    Arc::new(|name: &str| name.to_string())
}

/// Validator that accepts every syntactically valid name.
pub fn accept_all() -> Validator {
    Arc::new(|_: &str| true)
}

/// Check the base syntactic rule for names.
pub fn is_valid_name(name: &str) -> bool {
    name_re().is_match(name)
}

fn name_re() -> &'static Regex {
    static NAME_RE: OnceLock<Regex> = OnceLock::new();
    NAME_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("cell name regex must compile")
    })
}

/// Validator for fixed grids of one column letter and a row from 1 to 99
/// (`A1` through `Z99`).
pub fn grid_validator() -> Validator {
    static GRID_RE: OnceLock<Regex> = OnceLock::new();
    let re = GRID_RE.get_or_init(|| {
        Regex::new(r"^[A-Z][1-9][0-9]?$").expect("grid name regex must compile")
    });
    Arc::new(move |name: &str| re.is_match(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["x", "_", "x2", "y_15", "___", "A1", "abc_DEF_123"] {
            assert!(is_valid_name(name), "{name} should be valid");
        }
    }

    #[test]
    fn test_invalid_names() {
        for name in ["", "25", "2x", "&", "A 1", "a-b", "A1 ", "é1"] {
            assert!(!is_valid_name(name), "{name:?} should be invalid");
        }
    }

    #[test]
    fn test_grid_validator() {
        let valid = grid_validator();
        assert!(valid("A1"));
        assert!(valid("Z99"));
        assert!(valid("B10"));
        assert!(!valid("A0"));
        assert!(!valid("A100"));
        assert!(!valid("AA1"));
        assert!(!valid("a1"));
    }

    #[test]
    fn test_identity_and_accept_all() {
        let normalize = identity_normalizer();
        let valid = accept_all();
        assert_eq!(normalize("xY"), "xY");
        assert!(valid("anything"));
    }
}
