//! Band tables used to grade a deal's financial profile.
//!
//! Each factor is an ordered list of bands; the first band whose bound admits the
//! metric wins. Keeping the thresholds as data lets every boundary be tested on
//! its own and tuned without touching the scoring loop.

use serde::Serialize;
use std::fmt::Display;

/// Maximum asking price that still fits under an SBA 7(a) loan.
pub const SBA_MAX_LOAN: f64 = 5_000_000.0;

/// Tone of a rationale note, rendered as a marker in the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Caution,
    Negative,
}

impl Tone {
    pub fn marker(&self) -> &'static str {
        match self {
            Tone::Positive => "✅",
            Tone::Caution => "⚠️",
            Tone::Negative => "🔴",
        }
    }
}

/// Lower or upper bound a metric must satisfy to land in a band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    AtMost(f64),
    AtLeast(f64),
    Any,
}

impl Bound {
    fn admits(&self, value: f64) -> bool {
        match *self {
            Bound::AtMost(limit) => value <= limit,
            Bound::AtLeast(limit) => value >= limit,
            Bound::Any => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub bound: Bound,
    pub points: u32,
    pub tone: Tone,
    pub note: &'static str,
}

const fn band(bound: Bound, points: u32, tone: Tone, note: &'static str) -> Band {
    Band {
        bound,
        points,
        tone,
        note,
    }
}

pub const MULTIPLE_BANDS: &[Band] = &[
    band(Bound::AtMost(3.0), 25, Tone::Positive, "Attractive multiple (≤3x)"),
    band(Bound::AtMost(4.0), 15, Tone::Caution, "Moderate multiple (3-4x)"),
    band(Bound::Any, 5, Tone::Negative, "High multiple (>4x)"),
];

pub const MARGIN_BANDS: &[Band] = &[
    band(Bound::AtLeast(0.20), 25, Tone::Positive, "Strong margins (≥20%)"),
    band(Bound::AtLeast(0.10), 15, Tone::Caution, "Moderate margins (10-20%)"),
    band(Bound::Any, 5, Tone::Negative, "Thin margins (<10%)"),
];

pub const DSCR_BANDS: &[Band] = &[
    band(Bound::AtLeast(1.5), 25, Tone::Positive, "Strong DSCR (≥1.5x)"),
    band(Bound::AtLeast(1.25), 15, Tone::Caution, "Adequate DSCR (1.25-1.5x)"),
    band(Bound::Any, 5, Tone::Negative, "Weak DSCR (<1.25x)"),
];

pub const CASH_ON_CASH_BANDS: &[Band] = &[
    band(Bound::AtLeast(0.5), 10, Tone::Positive, "Strong cash-on-cash (≥50%)"),
    band(Bound::AtLeast(0.25), 5, Tone::Caution, "Moderate cash-on-cash (25-50%)"),
    band(Bound::Any, 0, Tone::Negative, "Low cash-on-cash (<25%)"),
];

/// Graded on the asking price.
pub const LOAN_BANDS: &[Band] = &[
    band(Bound::AtMost(SBA_MAX_LOAN), 15, Tone::Positive, "SBA eligible (≤$5M)"),
    band(Bound::Any, 0, Tone::Negative, "Exceeds SBA limit"),
];

/// The five graded aspects of a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    Multiple,
    EbitdaMargin,
    Dscr,
    LoanEligibility,
    CashOnCash,
}

impl Factor {
    /// Most points the factor can contribute to the score.
    pub fn weight(&self) -> u32 {
        match self {
            Factor::Multiple | Factor::EbitdaMargin | Factor::Dscr => 25,
            Factor::LoanEligibility => 15,
            Factor::CashOnCash => 10,
        }
    }

    /// Factors that are only graded once their metric is positive.
    pub fn requires_positive(&self) -> bool {
        match self {
            Factor::Multiple | Factor::EbitdaMargin | Factor::Dscr => true,
            Factor::LoanEligibility | Factor::CashOnCash => false,
        }
    }

    pub fn bands(&self) -> &'static [Band] {
        match self {
            Factor::Multiple => MULTIPLE_BANDS,
            Factor::EbitdaMargin => MARGIN_BANDS,
            Factor::Dscr => DSCR_BANDS,
            Factor::CashOnCash => CASH_ON_CASH_BANDS,
            Factor::LoanEligibility => LOAN_BANDS,
        }
    }
}

/// A single line of scoring rationale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreNote {
    pub factor: Factor,
    pub points: u32,
    pub tone: Tone,
    pub text: String,
}

impl Display for ScoreNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.tone.marker(), self.text)
    }
}

impl From<(Factor, &Band)> for ScoreNote {
    fn from((factor, band): (Factor, &Band)) -> Self {
        ScoreNote {
            factor,
            points: band.points,
            tone: band.tone,
            text: band.note.to_string(),
        }
    }
}

/// Picks the band for `value` from an ordered table.
pub fn lookup(bands: &'static [Band], value: f64) -> Option<&'static Band> {
    bands.iter().find(|b| b.bound.admits(value))
}

/// Grades one metric: the ratio for most factors, the asking price for loan
/// eligibility. Returns `None` when the factor is skipped because its metric is
/// not positive.
pub fn grade(factor: Factor, value: f64) -> Option<ScoreNote> {
    if factor.requires_positive() && value <= 0.0 {
        return None;
    }
    lookup(factor.bands(), value).map(|band| ScoreNote::from((factor, band)))
}

/// Qualitative label for a 0-100 deal score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DealRating {
    Strong,
    Moderate,
    Weak,
}

impl DealRating {
    pub fn from_score(score: u32) -> Self {
        match score {
            70.. => DealRating::Strong,
            45..=69 => DealRating::Moderate,
            _ => DealRating::Weak,
        }
    }
}

impl Display for DealRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                DealRating::Strong => "STRONG",
                DealRating::Moderate => "MODERATE",
                DealRating::Weak => "WEAK",
            }
        )
    }
}
