//! Deal structuring: debt sizing, coverage and the overall attractiveness score.
use crate::core::scoring::{self, DealRating, Factor, SBA_MAX_LOAN, ScoreNote};
use rust_decimal::prelude::*;
use rust_finprim::tvm::pmt;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Financials and financing structure of a prospective acquisition.
///
/// Percentages are expressed as whole numbers (`10.0` is ten percent). Whatever
/// is left of the asking price after equity and seller financing is funded by
/// the SBA-style senior loan.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DealFinancialInputs {
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub ebitda: f64,
    #[serde(default)]
    pub asking_price: f64,
    #[serde(default)]
    pub down_payment_pct: f64,
    #[serde(default)]
    pub seller_note_pct: f64,
    #[serde(default)]
    pub sba_rate_annual_pct: f64,
    #[serde(default)]
    pub sba_term_years: f64,
    #[serde(default)]
    pub seller_note_rate_annual_pct: f64,
    #[serde(default)]
    pub seller_note_term_years: f64,
}

impl DealFinancialInputs {
    /// Replaces NaN and infinities with zero so every downstream figure stays finite.
    fn sanitized(&self) -> Self {
        let clean = |v: f64| if v.is_finite() { v } else { 0.0 };
        DealFinancialInputs {
            revenue: clean(self.revenue),
            ebitda: clean(self.ebitda),
            asking_price: clean(self.asking_price),
            down_payment_pct: clean(self.down_payment_pct),
            seller_note_pct: clean(self.seller_note_pct),
            sba_rate_annual_pct: clean(self.sba_rate_annual_pct),
            sba_term_years: clean(self.sba_term_years),
            seller_note_rate_annual_pct: clean(self.seller_note_rate_annual_pct),
            seller_note_term_years: clean(self.seller_note_term_years),
        }
    }

    /// True once any of revenue, EBITDA or asking price has been entered.
    pub fn has_data(&self) -> bool {
        self.revenue > 0.0 || self.ebitda > 0.0 || self.asking_price > 0.0
    }
}

/// Everything derived from a [`DealFinancialInputs`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DealAnalysis {
    pub has_data: bool,
    pub ebitda_margin: f64,
    pub multiple: f64,
    pub equity_injection: f64,
    pub seller_note: f64,
    pub loan_amount: f64,
    pub loan_monthly_payment: f64,
    pub seller_note_monthly_payment: f64,
    pub total_monthly_payment: f64,
    pub annual_debt_service: f64,
    pub dscr: f64,
    pub free_cash_flow: f64,
    pub cash_on_cash_return: f64,
    pub loan_eligible: bool,
    pub score: u32,
    pub rating: DealRating,
    pub notes: Vec<ScoreNote>,
    /// Set when equity and seller note together exceed the asking price.
    pub structure_warning: Option<String>,
}

/// Fixed monthly installment that fully repays `principal` over `term_years`.
///
/// Returns 0 when either the rate or the term is not positive, or when the
/// growth factor overflows `Decimal` on absurdly long terms.
pub fn amortized_payment(principal: f64, annual_rate_pct: f64, term_years: f64) -> f64 {
    let r = annual_rate_pct / 100.0 / 12.0;
    let n = term_years * 12.0;
    if !(r > 0.0 && n > 0.0) {
        return 0.0;
    }
    decimal_payment(principal, r, n)
        .and_then(|payment| payment.to_f64())
        .filter(|payment| payment.is_finite())
        .unwrap_or(0.0)
}

fn decimal_payment(principal: f64, rate: f64, periods: f64) -> Option<Decimal> {
    let principal = Decimal::from_f64(principal)?;
    let rate = Decimal::from_f64(rate)?;
    let periods = Decimal::from_f64(periods)?;

    // `pmt` panics on overflow, so its intermediates are checked first.
    let growth = (Decimal::ONE + rate).checked_powd(periods)?;
    if growth <= Decimal::ONE {
        return None;
    }
    principal.checked_mul(growth)?.checked_mul(rate)?;

    // A loan is money received, so `pmt` reports the installment as an outflow.
    Some(-pmt(rate, periods, principal, None, None))
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Analyzes a deal. Never fails: inconsistent structures simply yield unusual numbers.
pub fn analyze(inputs: &DealFinancialInputs) -> DealAnalysis {
    let inputs = inputs.sanitized();

    let ebitda_margin = ratio(inputs.ebitda, inputs.revenue);
    let multiple = ratio(inputs.asking_price, inputs.ebitda);

    let equity_injection = inputs.asking_price * inputs.down_payment_pct / 100.0;
    let seller_note = inputs.asking_price * inputs.seller_note_pct / 100.0;
    let loan_amount = inputs.asking_price - equity_injection - seller_note;

    let structure_warning = if inputs.down_payment_pct + inputs.seller_note_pct > 100.0 {
        let message = format!(
            "Down payment ({}%) and seller note ({}%) exceed 100% of the asking price",
            inputs.down_payment_pct, inputs.seller_note_pct
        );
        warn!("{message}");
        Some(message)
    } else {
        None
    };

    let loan_monthly_payment = amortized_payment(
        loan_amount,
        inputs.sba_rate_annual_pct,
        inputs.sba_term_years,
    );
    let seller_note_monthly_payment = amortized_payment(
        seller_note,
        inputs.seller_note_rate_annual_pct,
        inputs.seller_note_term_years,
    );
    let total_monthly_payment = loan_monthly_payment + seller_note_monthly_payment;
    let annual_debt_service = total_monthly_payment * 12.0;

    let dscr = ratio(inputs.ebitda, annual_debt_service);
    let free_cash_flow = inputs.ebitda - annual_debt_service;
    let cash_on_cash_return = ratio(free_cash_flow, equity_injection);
    let loan_eligible = inputs.asking_price <= SBA_MAX_LOAN;

    debug!(
        ebitda_margin,
        multiple,
        loan_amount,
        annual_debt_service,
        dscr,
        cash_on_cash_return,
        "Derived deal metrics"
    );

    let has_data = inputs.has_data();
    let notes: Vec<ScoreNote> = if has_data {
        [
            scoring::grade(Factor::Multiple, multiple),
            scoring::grade(Factor::EbitdaMargin, ebitda_margin),
            scoring::grade(Factor::Dscr, dscr),
            scoring::grade(Factor::LoanEligibility, inputs.asking_price),
            scoring::grade(Factor::CashOnCash, cash_on_cash_return),
        ]
        .into_iter()
        .flatten()
        .collect()
    } else {
        Vec::new()
    };
    let score: u32 = notes.iter().map(|n| n.points).sum();

    DealAnalysis {
        has_data,
        ebitda_margin,
        multiple,
        equity_injection,
        seller_note,
        loan_amount,
        loan_monthly_payment,
        seller_note_monthly_payment,
        total_monthly_payment,
        annual_debt_service,
        dscr,
        free_cash_flow,
        cash_on_cash_return,
        loan_eligible,
        score,
        rating: DealRating::from_score(score),
        notes,
        structure_warning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scoring::Tone;

    const EPS: f64 = 1e-6;

    fn sample_inputs() -> DealFinancialInputs {
        DealFinancialInputs {
            revenue: 5_000_000.0,
            ebitda: 1_000_000.0,
            asking_price: 3_500_000.0,
            down_payment_pct: 10.0,
            seller_note_pct: 10.0,
            sba_rate_annual_pct: 10.5,
            sba_term_years: 10.0,
            seller_note_rate_annual_pct: 6.0,
            seller_note_term_years: 5.0,
        }
    }

    #[test]
    fn test_amortized_payment_known_value() {
        // 100k at 6% over 30 years is the textbook $599.55 mortgage payment.
        let payment = amortized_payment(100_000.0, 6.0, 30.0);
        assert!((payment - 599.55).abs() < 0.01, "payment was {payment}");
    }

    #[test]
    fn test_amortized_payment_repays_at_least_principal() {
        for (principal, rate, years) in [
            (1_000.0, 0.5, 1.0),
            (250_000.0, 7.25, 10.0),
            (2_800_000.0, 10.5, 10.0),
            (50_000.0, 24.0, 3.5),
        ] {
            let payment = amortized_payment(principal, rate, years);
            assert!(payment * years * 12.0 >= principal);
        }
        assert_eq!(amortized_payment(0.0, 10.5, 10.0), 0.0);
    }

    #[test]
    fn test_amortized_payment_zero_rate_or_term() {
        assert_eq!(amortized_payment(100_000.0, 0.0, 10.0), 0.0);
        assert_eq!(amortized_payment(100_000.0, 5.0, 0.0), 0.0);
        assert_eq!(amortized_payment(100_000.0, -5.0, 10.0), 0.0);
        assert_eq!(amortized_payment(100_000.0, 5.0, -1.0), 0.0);
    }

    #[test]
    fn test_amortized_payment_reference_loan() {
        let payment = amortized_payment(2_800_000.0, 10.5, 10.0);
        assert!((payment - 37_781.799_097).abs() < 1e-3, "payment was {payment}");
    }

    #[test]
    fn test_amortized_payment_long_terms() {
        // 40 years still fits comfortably and approaches the interest-only payment.
        let payment = amortized_payment(100_000.0, 12.0, 40.0);
        assert!(payment > 1_000.0 && payment < 1_010.0, "payment was {payment}");

        for years in [1.0e4, 1.0e9, f64::MAX] {
            let payment = amortized_payment(100_000.0, 12.0, years);
            assert_eq!(payment, 0.0, "term of {years} years");
        }
    }

    #[test]
    fn test_amortized_payment_negative_principal_keeps_sign() {
        let payment = amortized_payment(-100_000.0, 6.0, 30.0);
        assert!((payment + 599.55).abs() < 0.01, "payment was {payment}");
    }

    #[test]
    fn test_analyze_reference_deal() {
        let analysis = analyze(&sample_inputs());

        assert!((analysis.ebitda_margin - 0.20).abs() < EPS);
        assert!((analysis.multiple - 3.5).abs() < EPS);
        assert!((analysis.equity_injection - 350_000.0).abs() < EPS);
        assert!((analysis.seller_note - 350_000.0).abs() < EPS);
        assert!((analysis.loan_amount - 2_800_000.0).abs() < EPS);
        assert!(analysis.loan_eligible);
        assert!(analysis.dscr > 0.0);
        assert!(
            analysis
                .notes
                .iter()
                .any(|n| n.text == "Moderate multiple (3-4x)")
        );
        assert!(analysis.structure_warning.is_none());
    }

    #[test]
    fn test_analyze_reference_deal_score() {
        let analysis = analyze(&sample_inputs());

        // SBA payment ~37,782/mo, seller note ~6,766/mo -> ~534.6k debt service.
        assert!((analysis.annual_debt_service - 534_579.36).abs() < 0.01);
        assert!((analysis.dscr - 1.8707).abs() < 0.001);
        assert!((analysis.cash_on_cash_return - 1.3298).abs() < 0.001);

        // 15 (multiple) + 25 (margin) + 25 (dscr) + 15 (sba) + 10 (coc)
        assert_eq!(analysis.score, 90);
        assert_eq!(analysis.rating, DealRating::Strong);
        assert_eq!(analysis.notes.len(), 5);
        let factors: Vec<Factor> = analysis.notes.iter().map(|n| n.factor).collect();
        assert_eq!(
            factors,
            vec![
                Factor::Multiple,
                Factor::EbitdaMargin,
                Factor::Dscr,
                Factor::LoanEligibility,
                Factor::CashOnCash
            ]
        );
    }

    #[test]
    fn test_analyze_is_idempotent() {
        let inputs = sample_inputs();
        assert_eq!(analyze(&inputs), analyze(&inputs));
    }

    #[test]
    fn test_analyze_empty_inputs_has_no_score() {
        let analysis = analyze(&DealFinancialInputs::default());
        assert!(!analysis.has_data);
        assert_eq!(analysis.score, 0);
        assert!(analysis.notes.is_empty());
        assert_eq!(analysis.dscr, 0.0);
        assert_eq!(analysis.multiple, 0.0);
    }

    #[test]
    fn test_analyze_non_positive_metrics_skip_their_factor() {
        let inputs = DealFinancialInputs {
            revenue: 1_000_000.0,
            ebitda: -50_000.0,
            asking_price: 6_000_000.0,
            ..sample_inputs()
        };
        let analysis = analyze(&inputs);

        assert_eq!(analysis.multiple, 0.0);
        assert!(!analysis.loan_eligible);
        let factors: Vec<Factor> = analysis.notes.iter().map(|n| n.factor).collect();
        assert_eq!(factors, vec![Factor::LoanEligibility, Factor::CashOnCash]);
        assert_eq!(analysis.score, 0);
        assert!(analysis.notes.iter().all(|n| n.tone == Tone::Negative));
    }

    #[test]
    fn test_analyze_overfunded_structure_is_reported_not_rejected() {
        let inputs = DealFinancialInputs {
            down_payment_pct: 80.0,
            seller_note_pct: 40.0,
            ..sample_inputs()
        };
        let analysis = analyze(&inputs);

        assert!((analysis.loan_amount - (-700_000.0)).abs() < EPS);
        assert!(analysis.loan_monthly_payment < 0.0);
        assert!(analysis.structure_warning.is_some());
        assert!(analysis.score <= 100);
    }

    #[test]
    fn test_analyze_coerces_non_finite_inputs() {
        let inputs = DealFinancialInputs {
            revenue: f64::NAN,
            ebitda: f64::INFINITY,
            asking_price: 1_000_000.0,
            ..sample_inputs()
        };
        let analysis = analyze(&inputs);

        assert_eq!(analysis.ebitda_margin, 0.0);
        assert_eq!(analysis.multiple, 0.0);
        assert!(analysis.annual_debt_service.is_finite());
        assert!(analysis.score <= 100);
    }

    #[test]
    fn test_score_stays_within_bounds() {
        let prices = [0.0, 1.0, 500_000.0, 4_999_999.0, 5_000_000.0, 9_000_000.0];
        let ebitdas = [-100_000.0, 0.0, 10.0, 250_000.0, 2_000_000.0];
        for &asking_price in &prices {
            for &ebitda in &ebitdas {
                let analysis = analyze(&DealFinancialInputs {
                    revenue: 3_000_000.0,
                    ebitda,
                    asking_price,
                    ..sample_inputs()
                });
                assert!(analysis.score <= 100);
            }
        }
    }
}
