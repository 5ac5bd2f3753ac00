//! Extraction rules: which field is pulled out of markup with which pattern
//!
//! Each rule pairs a [`Field`] with a regular expression and a cardinality.
//! The value of a match is its first participating capture group, or the
//! whole match when the pattern has no groups.

use crate::PatternError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// A named field extracted from a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Title,
    Description,
    Price,
    Date,
    Keywords,
    Author,
    Links,
    Images,
    Headings,
    Logo,
}

/// How many matches a rule keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// First match only
    Single,
    /// All non-overlapping matches in document order
    Multi,
}

impl Field {
    /// Every field, in extraction order
    pub const ALL: [Field; 10] = [
        Field::Title,
        Field::Description,
        Field::Price,
        Field::Date,
        Field::Keywords,
        Field::Author,
        Field::Links,
        Field::Images,
        Field::Headings,
        Field::Logo,
    ];

    /// The field's configuration name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Price => "price",
            Self::Date => "date",
            Self::Keywords => "keywords",
            Self::Author => "author",
            Self::Links => "links",
            Self::Images => "images",
            Self::Headings => "headings",
            Self::Logo => "logo",
        }
    }

    pub fn cardinality(&self) -> Cardinality {
        match self {
            Self::Links | Self::Images | Self::Headings => Cardinality::Multi,
            _ => Cardinality::Single,
        }
    }

    /// Returns true for fields only collected in extended mode
    pub fn is_extended(&self) -> bool {
        !matches!(
            self,
            Self::Title | Self::Description | Self::Price | Self::Date
        )
    }

    /// Returns true for free-text fields that may carry embedded tags
    pub fn strips_markup(&self) -> bool {
        matches!(self, Self::Title | Self::Description | Self::Headings)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.name() == name)
            .ok_or_else(|| PatternError::UnknownField(s.to_string()))
    }
}

/// A field paired with the pattern used to scan markup for it
#[derive(Debug, Clone)]
pub struct ExtractionRule {
    pub field: Field,
    pub pattern: Regex,
    pub cardinality: Cardinality,
}

impl ExtractionRule {
    /// Compiles `pattern` into a rule for `field`
    pub fn new(field: Field, pattern: &str) -> Result<Self, PatternError> {
        Ok(Self {
            field,
            pattern: compile_pattern(field, pattern)?,
            cardinality: field.cardinality(),
        })
    }
}

/// Compiles a pattern, attributing failures to the field it was meant for
pub fn compile_pattern(field: Field, pattern: &str) -> Result<Regex, PatternError> {
    Regex::new(pattern).map_err(|source| PatternError::Invalid {
        field: field.name().to_string(),
        source,
    })
}

/// Returns the built-in pattern source for a field
pub fn default_pattern(field: Field) -> &'static str {
    match field {
        Field::Title => r"(?is)<title[^>]*>(.*?)</title>",
        Field::Description => r#"(?i)<meta\s+name="description"\s+content="([^"]+)""#,
        Field::Price => r"(?i)\$\s*([0-9,]+\.?[0-9]*)|([0-9,]+\.?[0-9]*)\s*\$",
        Field::Date => r"(\d{4}-\d{2}-\d{2}|\d{2}/\d{2}/\d{4})",
        Field::Keywords => r#"(?i)<meta\s+name="keywords"\s+content="([^"]+)""#,
        Field::Author => r#"(?i)<meta\s+name="author"\s+content="([^"]+)""#,
        Field::Links => r#"(?i)<a\s+[^>]*href="([^"]*)"[^>]*>"#,
        Field::Images => r#"(?i)<img\s+[^>]*src="([^"]+)"[^>]*>"#,
        Field::Headings => r"(?is)<h[1-6][^>]*>(.*?)</h[1-6]>",
        Field::Logo => {
            r#"(?i)<link\s+[^>]*rel="icon"[^>]*href="([^"]+)"[^>]*>|<link\s+[^>]*rel="shortcut icon"[^>]*href="([^"]+)"[^>]*>"#
        }
    }
}

static DEFAULT_RULES: Lazy<Vec<ExtractionRule>> = Lazy::new(|| {
    Field::ALL
        .iter()
        .map(|&field| {
            ExtractionRule::new(field, default_pattern(field))
                .unwrap_or_else(|e| panic!("built-in pattern for {} is invalid: {}", field, e))
        })
        .collect()
});

/// Returns the process-wide default rule set, one rule per field
pub fn default_rules() -> Vec<ExtractionRule> {
    DEFAULT_RULES.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_cover_every_field() {
        let rules = default_rules();
        assert_eq!(rules.len(), Field::ALL.len());
        for (rule, field) in rules.iter().zip(Field::ALL) {
            assert_eq!(rule.field, field);
            assert_eq!(rule.cardinality, field.cardinality());
        }
    }

    #[test]
    fn test_field_from_str() {
        assert_eq!("title".parse::<Field>().unwrap(), Field::Title);
        assert_eq!("Headings".parse::<Field>().unwrap(), Field::Headings);
        assert!(matches!(
            "colour".parse::<Field>(),
            Err(PatternError::UnknownField(_))
        ));
    }

    #[test]
    fn test_cardinality() {
        assert_eq!(Field::Links.cardinality(), Cardinality::Multi);
        assert_eq!(Field::Headings.cardinality(), Cardinality::Multi);
        assert_eq!(Field::Logo.cardinality(), Cardinality::Single);
    }

    #[test]
    fn test_extended_fields() {
        assert!(!Field::Title.is_extended());
        assert!(!Field::Date.is_extended());
        assert!(Field::Keywords.is_extended());
        assert!(Field::Logo.is_extended());
    }

    #[test]
    fn test_invalid_pattern() {
        let result = ExtractionRule::new(Field::Price, "([0-9]+");
        assert!(matches!(result, Err(PatternError::Invalid { .. })));
    }

    #[test]
    fn test_price_pattern_both_sides() {
        let rule = ExtractionRule::new(Field::Price, default_pattern(Field::Price)).unwrap();
        assert!(rule.pattern.is_match("Only $ 19.99 today"));
        assert!(rule.pattern.is_match("Only 19.99$ today"));
    }
}
