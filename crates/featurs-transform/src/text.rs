//! Text transformers: pairwise similarity, extraction and pattern counts.

use polars::prelude::{
    DataType, Expr, Field, Float64Chunked, IntoColumn, IntoSeries, as_struct, col, lit,
};
use rapidfuzz::distance::damerau_levenshtein;

use featurs_model::{ColumnSpecification, ColumnType, ColumnTypeSet};

use crate::error::{Result, TransformError};
use crate::kind::{TextExtraction, TextSimilarity, TransformerKind};
use crate::transformer::LeafTransformer;

const EMAIL_DOMAIN_PATTERN: &str = r"@(.+)$";

/// Normalized similarity between two text columns, `1.0` for equal strings.
#[derive(Debug, Clone)]
pub struct TextSimilarityTransformer {
    left: ColumnSpecification,
    right: ColumnSpecification,
    similarity: TextSimilarity,
}

impl TextSimilarityTransformer {
    pub fn new(
        left: ColumnSpecification,
        right: ColumnSpecification,
        similarity: TextSimilarity,
    ) -> Self {
        Self {
            left,
            right,
            similarity,
        }
    }
}

impl LeafTransformer for TextSimilarityTransformer {
    fn kind(&self) -> TransformerKind {
        TransformerKind::TextSimilarity(self.similarity)
    }

    fn input_type(&self) -> Vec<ColumnTypeSet> {
        vec![ColumnType::Text.into(), ColumnType::Text.into()]
    }

    fn return_type(&self) -> ColumnType {
        ColumnType::Numeric
    }

    fn name(&self) -> String {
        format!(
            "{}_{}_text_similarity_{}",
            self.left.name,
            self.similarity.as_str(),
            self.right.name
        )
    }

    fn expression(&self) -> Expr {
        let pair = as_struct(vec![
            col(self.left.name.as_str()),
            col(self.right.name.as_str()),
        ]);
        match self.similarity {
            TextSimilarity::DamerauLevenshtein => pair.map(
                |column| {
                    let fields = column.struct_()?.fields_as_series();
                    let left = fields[0].str()?;
                    let right = fields[1].str()?;
                    let similarity: Float64Chunked = left
                        .into_iter()
                        .zip(right)
                        .map(|(l, r)| match (l, r) {
                            (Some(l), Some(r)) => Some(damerau_levenshtein::normalized_similarity(
                                l.chars(),
                                r.chars(),
                            )),
                            _ => None,
                        })
                        .collect();
                    Ok(similarity
                        .with_name(column.name().clone())
                        .into_series()
                        .into_column())
                },
                |_, field| Ok(Field::new(field.name().clone(), DataType::Float64)),
            ),
        }
    }
}

/// Extracts a value from a single text column.
#[derive(Debug, Clone)]
pub struct TextExtractionTransformer {
    column: ColumnSpecification,
    extraction: TextExtraction,
}

impl TextExtractionTransformer {
    pub fn new(column: ColumnSpecification, extraction: TextExtraction) -> Self {
        Self { column, extraction }
    }
}

impl LeafTransformer for TextExtractionTransformer {
    fn kind(&self) -> TransformerKind {
        TransformerKind::TextExtraction(self.extraction)
    }

    fn input_type(&self) -> Vec<ColumnTypeSet> {
        vec![ColumnType::Text.into()]
    }

    fn return_type(&self) -> ColumnType {
        match self.extraction {
            TextExtraction::Length => ColumnType::Numeric,
            TextExtraction::EmailDomain => ColumnType::Nominal,
        }
    }

    fn name(&self) -> String {
        format!("{}_{}", self.column.name, self.extraction.as_str())
    }

    fn expression(&self) -> Expr {
        let text = col(self.column.name.as_str()).str();
        match self.extraction {
            TextExtraction::Length => text.len_chars(),
            TextExtraction::EmailDomain => text.extract(lit(EMAIL_DOMAIN_PATTERN), 1),
        }
    }
}

/// Frequently counted character classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommonPattern {
    Digits,
    Letter,
    Uppercase,
    Lowercase,
    NonAlphanumeric,
    Whitespace,
    ConsecutiveDigits,
    ConsecutiveLetters,
    SpecialSymbols,
    Punctuation,
    Dot,
    Slash,
    AtSign,
    Hyphen,
    Underscore,
    NonAscii,
    ZeroWidth,
}

impl CommonPattern {
    pub const ALL: [CommonPattern; 17] = [
        CommonPattern::Digits,
        CommonPattern::Letter,
        CommonPattern::Uppercase,
        CommonPattern::Lowercase,
        CommonPattern::NonAlphanumeric,
        CommonPattern::Whitespace,
        CommonPattern::ConsecutiveDigits,
        CommonPattern::ConsecutiveLetters,
        CommonPattern::SpecialSymbols,
        CommonPattern::Punctuation,
        CommonPattern::Dot,
        CommonPattern::Slash,
        CommonPattern::AtSign,
        CommonPattern::Hyphen,
        CommonPattern::Underscore,
        CommonPattern::NonAscii,
        CommonPattern::ZeroWidth,
    ];

    pub fn regex(&self) -> &'static str {
        match self {
            CommonPattern::Digits => r"\d",
            CommonPattern::Letter => r"[A-Za-z]",
            CommonPattern::Uppercase => r"[A-Z]",
            CommonPattern::Lowercase => r"[a-z]",
            CommonPattern::NonAlphanumeric => r"[^A-Za-z0-9]",
            CommonPattern::Whitespace => r"\s",
            CommonPattern::ConsecutiveDigits => r"\d{3,}",
            CommonPattern::ConsecutiveLetters => r"[A-Za-z]{5,}",
            CommonPattern::SpecialSymbols => r"[!@#$%^&*_=+|~<>]",
            CommonPattern::Punctuation => r"[.,;:!?]",
            CommonPattern::Dot => r"\.",
            CommonPattern::Slash => r"/",
            CommonPattern::AtSign => r"@",
            CommonPattern::Hyphen => r"-",
            CommonPattern::Underscore => r"_",
            CommonPattern::NonAscii => r"[^\x00-\x7F]",
            CommonPattern::ZeroWidth => r"[\u{200B}-\u{200D}\u{FEFF}]",
        }
    }

    /// Label used in column names.
    pub fn label(&self) -> &'static str {
        match self {
            CommonPattern::Digits => "digits",
            CommonPattern::Letter => "letter",
            CommonPattern::Uppercase => "uppercase",
            CommonPattern::Lowercase => "lowercase",
            CommonPattern::NonAlphanumeric => "non_alphanumeric",
            CommonPattern::Whitespace => "whitespace",
            CommonPattern::ConsecutiveDigits => "consecutive_digits",
            CommonPattern::ConsecutiveLetters => "consecutive_letters",
            CommonPattern::SpecialSymbols => "special_symbols",
            CommonPattern::Punctuation => "punctuation",
            CommonPattern::Dot => "dot",
            CommonPattern::Slash => "slash",
            CommonPattern::AtSign => "at_sign",
            CommonPattern::Hyphen => "hyphen",
            CommonPattern::Underscore => "underscore",
            CommonPattern::NonAscii => "non_ascii",
            CommonPattern::ZeroWidth => "zero_width",
        }
    }
}

/// A regex together with the label it gets in column names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextPattern {
    pub regex: String,
    pub label: String,
}

impl TextPattern {
    pub fn new(regex: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            regex: regex.into(),
            label: label.into(),
        }
    }
}

impl From<CommonPattern> for TextPattern {
    fn from(pattern: CommonPattern) -> Self {
        Self::new(pattern.regex(), pattern.label())
    }
}

/// A raw regex is labelled by itself unless it spells a common pattern.
impl From<&str> for TextPattern {
    fn from(regex: &str) -> Self {
        CommonPattern::ALL
            .iter()
            .find(|common| common.regex() == regex)
            .map(|common| TextPattern::from(*common))
            .unwrap_or_else(|| TextPattern::new(regex, regex))
    }
}

impl From<(&str, &str)> for TextPattern {
    fn from((regex, label): (&str, &str)) -> Self {
        Self::new(regex, label)
    }
}

/// Counts regex matches in a text column: `<c>_count_<label>`.
#[derive(Debug, Clone)]
pub struct TextCountMatchesTransformer {
    column: ColumnSpecification,
    pattern: TextPattern,
}

impl TextCountMatchesTransformer {
    /// # Errors
    ///
    /// Fails when the pattern is not a valid regex.
    pub fn new(column: ColumnSpecification, pattern: impl Into<TextPattern>) -> Result<Self> {
        let pattern = pattern.into();
        regex::Regex::new(&pattern.regex).map_err(|e| TransformError::Construction {
            transformer: format!("{}_count_{}", column.name, pattern.label),
            message: e.to_string(),
        })?;
        Ok(Self { column, pattern })
    }
}

impl LeafTransformer for TextCountMatchesTransformer {
    fn kind(&self) -> TransformerKind {
        TransformerKind::TextCountMatches
    }

    fn input_type(&self) -> Vec<ColumnTypeSet> {
        vec![ColumnType::Text.into()]
    }

    fn return_type(&self) -> ColumnType {
        ColumnType::Numeric
    }

    fn name(&self) -> String {
        format!("{}_count_{}", self.column.name, self.pattern.label)
    }

    fn expression(&self) -> Expr {
        col(self.column.name.as_str())
            .str()
            .count_matches(lit(self.pattern.regex.as_str()), false)
    }
}
