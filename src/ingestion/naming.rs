//! Pool identifiers derived from the `Pool_<id>_<type>[_<variant>].pol` naming convention.

use serde::Serialize;

/// Identifiers parsed from a pool file name.
///
/// Fields are `None` when the file name does not carry them; the report assembler rejects
/// missing `pool_id` / `pool_type`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolIdentifiers {
    pub pool_id: Option<String>,
    pub pool_type: Option<String>,
    pub pool_variant: Option<String>,
}

/// Tagging derived from the pool type code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolClassification {
    pub tags: Vec<&'static str>,
    pub is_flat: bool,
    pub max_multiplier: Option<String>,
}

impl PoolIdentifiers {
    /// Split a file name (extension optional) on `_`.
    ///
    /// Segment 0 is the prefix and ignored, segment 1 is the pool id, segment 2 the pool type, and
    /// anything after is joined back with `_` as the variant.
    pub fn from_file_name(file_name: &str) -> Self {
        let stem = file_name
            .rsplit_once('.')
            .map_or(file_name, |(stem, _ext)| stem);
        let mut parts = stem.split('_').skip(1);
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

        let pool_id = parts.next().and_then(non_empty);
        let pool_type = parts.next().and_then(non_empty);
        let rest: Vec<&str> = parts.collect();
        let pool_variant = non_empty(&rest.join("_"));

        Self {
            pool_id,
            pool_type,
            pool_variant,
        }
    }

    /// Classify the pool by its type code. `None` when the type is unknown.
    pub fn classification(&self) -> Option<PoolClassification> {
        self.pool_type.as_deref().map(classify_pool_type)
    }
}

/// Tag rules: `395` is a GAB+PFB pool, long codes starting with `5` are PFB, everything else
/// is REG. Long codes starting with `4` are flat pools whose last four characters are the max
/// multiplier.
pub fn classify_pool_type(pool_type: &str) -> PoolClassification {
    let long = pool_type.chars().count() > 4;
    let tags = if pool_type == "395" {
        vec!["GAB", "PFB"]
    } else if long && pool_type.starts_with('5') {
        vec!["PFB"]
    } else {
        vec!["REG"]
    };

    let is_flat = long && pool_type.starts_with('4');
    let max_multiplier = is_flat.then(|| {
        let chars: Vec<char> = pool_type.chars().collect();
        chars[chars.len() - 4..].iter().collect()
    });

    PoolClassification {
        tags,
        is_flat,
        max_multiplier,
    }
}

#[cfg(test)]
mod tests {
    use super::{classify_pool_type, PoolIdentifiers};

    #[test]
    fn parses_id_and_type() {
        let ids = PoolIdentifiers::from_file_name("Pool_0201_395.pol");
        assert_eq!(ids.pool_id.as_deref(), Some("0201"));
        assert_eq!(ids.pool_type.as_deref(), Some("395"));
        assert_eq!(ids.pool_variant, None);
    }

    #[test]
    fn trailing_segments_form_the_variant() {
        let ids = PoolIdentifiers::from_file_name("Pool_7_50001234_hi_lo.pol");
        assert_eq!(ids.pool_type.as_deref(), Some("50001234"));
        assert_eq!(ids.pool_variant.as_deref(), Some("hi_lo"));
    }

    #[test]
    fn missing_segments_are_none() {
        let ids = PoolIdentifiers::from_file_name("weird.pol");
        assert_eq!(ids, PoolIdentifiers::default());

        let ids = PoolIdentifiers::from_file_name("Pool__395.pol");
        assert_eq!(ids.pool_id, None);
        assert_eq!(ids.pool_type.as_deref(), Some("395"));
    }

    #[test]
    fn classification_rules() {
        assert_eq!(classify_pool_type("395").tags, vec!["GAB", "PFB"]);
        assert_eq!(classify_pool_type("50001234").tags, vec!["PFB"]);
        assert_eq!(classify_pool_type("5000").tags, vec!["REG"]);

        let flat = classify_pool_type("40002500");
        assert_eq!(flat.tags, vec!["REG"]);
        assert!(flat.is_flat);
        assert_eq!(flat.max_multiplier.as_deref(), Some("2500"));

        assert!(!classify_pool_type("4000").is_flat);
    }
}
