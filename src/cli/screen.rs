use super::ui;
use crate::core::config::ScreeningDefaults;
use crate::core::journal::Journal;
use crate::core::records::DealTerms;
use crate::core::scoring::DealRating;
use crate::core::structuring::{DealAnalysis, DealFinancialInputs, analyze};
use anyhow::{Result, bail};
use comfy_table::{Cell, Color};
use tracing::{debug, info};

/// What the `screen` command was asked to analyze.
#[derive(Debug, Clone, Default)]
pub struct ScreenOptions {
    /// Deal id or company name from the journal.
    pub deal: Option<String>,
    /// Values given on the command line; these win over journal values.
    pub terms: DealTerms,
    pub json: bool,
}

fn rating_style(rating: DealRating) -> ui::StyleType {
    match rating {
        DealRating::Strong => ui::StyleType::Good,
        DealRating::Moderate => ui::StyleType::Caution,
        DealRating::Weak => ui::StyleType::Error,
    }
}

fn rating_color(rating: DealRating) -> Color {
    match rating {
        DealRating::Strong => Color::Green,
        DealRating::Moderate => Color::Yellow,
        DealRating::Weak => Color::Red,
    }
}

impl DealAnalysis {
    pub fn display_as_report(&self, name: &str, inputs: &DealFinancialInputs) -> String {
        let mut output = format!("Deal: {}\n\n", ui::style_text(name, ui::StyleType::Title));

        if self.has_data {
            let score = format!("{} {}", self.score, self.rating);
            output.push_str(&format!(
                "Score: {}\n",
                ui::style_text(&score, rating_style(self.rating))
            ));
            for note in &self.notes {
                output.push_str(&format!(
                    "  {note} {}\n",
                    ui::style_text(
                        &format!("({}/{})", note.points, note.factor.weight()),
                        ui::StyleType::Subtle
                    )
                ));
            }
        } else {
            output.push_str(&ui::style_text(
                "Enter revenue, EBITDA or asking price to score this deal.",
                ui::StyleType::Subtle,
            ));
            output.push('\n');
        }
        if let Some(warning) = &self.structure_warning {
            output.push_str(&format!(
                "\n{}\n",
                ui::style_text(&format!("⚠️ {warning}"), ui::StyleType::Caution)
            ));
        }

        output.push('\n');
        output.push_str(&self.metrics_table().to_string());

        if self.has_data {
            output.push_str("\n\n");
            output.push_str(&self.sources_and_uses_table(inputs).to_string());
            let badge = if self.loan_eligible {
                ui::style_text(
                    "✅ SBA 7(a) ELIGIBLE (loan amount within $5M limit)",
                    ui::StyleType::Good,
                )
            } else {
                ui::style_text(
                    "❌ EXCEEDS SBA 7(a) LIMIT (loan would exceed $5M)",
                    ui::StyleType::Error,
                )
            };
            output.push_str(&format!("\n\n{badge}"));
        }

        output
    }

    fn metrics_table(&self) -> comfy_table::Table {
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Key Metric"), ui::header_cell("Value")]);

        let margin = if self.ebitda_margin > 0.0 {
            ui::colored_value_cell(
                ui::percent(self.ebitda_margin),
                ui::tier_color(self.ebitda_margin, 0.2, 0.1),
            )
        } else {
            ui::empty_cell()
        };
        let multiple = if self.multiple > 0.0 {
            // Lower is better, so flip the sign to reuse the tiering.
            ui::colored_value_cell(
                format!("{:.1}x", self.multiple),
                ui::tier_color(-self.multiple, -3.0, -4.0),
            )
        } else {
            ui::empty_cell()
        };
        let dscr = if self.dscr > 0.0 {
            ui::colored_value_cell(
                format!("{:.2}x", self.dscr),
                ui::tier_color(self.dscr, 1.5, 1.25),
            )
        } else {
            ui::empty_cell()
        };
        let debt_service = if self.annual_debt_service > 0.0 {
            ui::value_cell(ui::money(self.annual_debt_service))
        } else {
            ui::empty_cell()
        };
        let free_cash_flow = if self.has_data {
            let color = if self.free_cash_flow > 0.0 {
                Color::Green
            } else {
                Color::Red
            };
            ui::colored_value_cell(ui::money(self.free_cash_flow), color)
        } else {
            ui::empty_cell()
        };
        let cash_on_cash = if self.cash_on_cash_return > 0.0 {
            ui::colored_value_cell(
                ui::percent(self.cash_on_cash_return),
                ui::tier_color(self.cash_on_cash_return, 0.5, 0.25),
            )
        } else {
            ui::empty_cell()
        };

        for (label, cell) in [
            ("EBITDA Margin", margin),
            ("Multiple", multiple),
            ("DSCR", dscr),
            ("Annual Debt Service", debt_service),
            ("Free Cash Flow", free_cash_flow),
            ("Cash-on-Cash Return", cash_on_cash),
        ] {
            table.add_row(vec![Cell::new(label), cell]);
        }
        table
    }

    fn sources_and_uses_table(&self, inputs: &DealFinancialInputs) -> comfy_table::Table {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Sources"),
            ui::header_cell("Amount"),
            ui::header_cell("Monthly Payment"),
        ]);
        table.add_row(vec![
            Cell::new(format!("Equity ({}% down)", inputs.down_payment_pct)),
            ui::value_cell(ui::money(self.equity_injection)),
            ui::empty_cell(),
        ]);
        table.add_row(vec![
            Cell::new(format!(
                "SBA Loan ({}%, {} yrs)",
                inputs.sba_rate_annual_pct, inputs.sba_term_years
            )),
            ui::value_cell(ui::money(self.loan_amount)),
            ui::value_cell(ui::money(self.loan_monthly_payment)),
        ]);
        table.add_row(vec![
            Cell::new(format!(
                "Seller Note ({}%, {} yrs)",
                inputs.seller_note_rate_annual_pct, inputs.seller_note_term_years
            )),
            ui::value_cell(ui::money(self.seller_note)),
            ui::value_cell(ui::money(self.seller_note_monthly_payment)),
        ]);
        table.add_row(vec![
            Cell::new(ui::style_text("Total", ui::StyleType::TotalLabel)),
            ui::value_cell(ui::money(inputs.asking_price)),
            ui::value_cell(ui::money(self.total_monthly_payment)),
        ]);
        table
    }
}

fn is_single(options: &ScreenOptions) -> bool {
    options.deal.is_some() || options.terms != DealTerms::default()
}

/// Screens one deal, or every deal in the journal that carries financials.
pub fn run(
    journal: &Journal,
    defaults: &ScreeningDefaults,
    options: &ScreenOptions,
) -> Result<()> {
    if options.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&render_json(journal, defaults, options)?)?
        );
        Ok(())
    } else if is_single(options) {
        run_single(journal, defaults, options)
    } else {
        run_pipeline(journal, defaults)
    }
}

/// JSON output of `screen`: one analysis, or the ranked pipeline as an array
/// of `{ company, analysis }` entries.
pub fn render_json(
    journal: &Journal,
    defaults: &ScreeningDefaults,
    options: &ScreenOptions,
) -> Result<serde_json::Value> {
    if is_single(options) {
        let (name, inputs) = resolve_inputs(journal, defaults, options)?;
        info!("Screening {name}");
        return Ok(serde_json::to_value(analyze(&inputs))?);
    }
    let entries = screen_pipeline(journal, defaults)
        .into_iter()
        .map(|(company, analysis)| serde_json::json!({ "company": company, "analysis": analysis }))
        .collect();
    Ok(serde_json::Value::Array(entries))
}

/// Resolves the inputs for a single screening: config defaults, then the
/// journal deal, then command-line values.
pub fn resolve_inputs(
    journal: &Journal,
    defaults: &ScreeningDefaults,
    options: &ScreenOptions,
) -> Result<(String, DealFinancialInputs)> {
    let (name, base) = match &options.deal {
        Some(key) => match journal.find_deal(key) {
            Some(deal) => (deal.company.clone(), deal.terms),
            None => bail!("No deal matching '{key}' in the journal"),
        },
        None => ("Ad hoc screen".to_string(), DealTerms::default()),
    };
    Ok((name, base.overlay(&options.terms).resolve(defaults)))
}

fn run_single(
    journal: &Journal,
    defaults: &ScreeningDefaults,
    options: &ScreenOptions,
) -> Result<()> {
    let (name, inputs) = resolve_inputs(journal, defaults, options)?;
    info!("Screening {name}");
    debug!(?inputs, "Resolved screening inputs");

    let analysis = analyze(&inputs);
    println!("{}", analysis.display_as_report(&name, &inputs));
    Ok(())
}

/// Analyzes every journal deal with financials, best score first.
pub fn screen_pipeline(
    journal: &Journal,
    defaults: &ScreeningDefaults,
) -> Vec<(String, DealAnalysis)> {
    let mut results: Vec<(String, DealAnalysis)> = journal
        .deals
        .iter()
        .filter(|d| d.terms.has_financials())
        .map(|d| (d.company.clone(), analyze(&d.terms.resolve(defaults))))
        .collect();
    results.sort_by(|a, b| b.1.score.cmp(&a.1.score));
    results
}

fn run_pipeline(journal: &Journal, defaults: &ScreeningDefaults) -> Result<()> {
    info!("Screening all deals with financials");
    let results = screen_pipeline(journal, defaults);

    if results.is_empty() {
        println!("No deals with financials found to screen.");
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Company"),
        ui::header_cell("Multiple"),
        ui::header_cell("Margin"),
        ui::header_cell("DSCR"),
        ui::header_cell("Cash-on-Cash"),
        ui::header_cell("SBA"),
        ui::header_cell("Score"),
    ]);
    for (company, analysis) in &results {
        let optional = |value: f64, text: String| {
            if value > 0.0 {
                ui::value_cell(text)
            } else {
                ui::empty_cell()
            }
        };
        table.add_row(vec![
            Cell::new(company),
            optional(analysis.multiple, format!("{:.1}x", analysis.multiple)),
            optional(analysis.ebitda_margin, ui::percent(analysis.ebitda_margin)),
            optional(analysis.dscr, format!("{:.2}x", analysis.dscr)),
            optional(
                analysis.cash_on_cash_return,
                ui::percent(analysis.cash_on_cash_return),
            ),
            Cell::new(if analysis.loan_eligible { "✅" } else { "❌" }),
            ui::colored_value_cell(
                format!("{} {}", analysis.score, analysis.rating),
                rating_color(analysis.rating),
            ),
        ]);
    }

    println!(
        "{}\n\n{}",
        ui::style_text("Deal Screener", ui::StyleType::Title),
        table
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOURNAL: &str = r#"
deals:
  - id: "d-1"
    company: "Harbor Fleet Services"
    revenue: 5000000
    ebitda: 1000000
    asking_price: 3500000
  - id: "d-2"
    company: "Valley Pest Control"
    revenue: 2000000
    ebitda: 150000
    asking_price: 900000
  - id: "d-3"
    company: "No Numbers Yet LLC"
"#;

    #[test]
    fn test_resolve_inputs_layers_defaults_journal_and_flags() -> Result<()> {
        let journal = Journal::parse(JOURNAL)?;
        let options = ScreenOptions {
            deal: Some("d-1".to_string()),
            terms: DealTerms {
                down_payment_pct: Some(20.0),
                ..DealTerms::default()
            },
            json: false,
        };
        let (name, inputs) = resolve_inputs(&journal, &ScreeningDefaults::default(), &options)?;

        assert_eq!(name, "Harbor Fleet Services");
        assert_eq!(inputs.asking_price, 3_500_000.0);
        assert_eq!(inputs.down_payment_pct, 20.0);
        assert_eq!(inputs.seller_note_pct, 10.0);
        Ok(())
    }

    #[test]
    fn test_resolve_inputs_unknown_deal_fails() -> Result<()> {
        let journal = Journal::parse(JOURNAL)?;
        let options = ScreenOptions {
            deal: Some("nope".to_string()),
            ..ScreenOptions::default()
        };
        let result = resolve_inputs(&journal, &ScreeningDefaults::default(), &options);
        assert!(result.unwrap_err().to_string().contains("No deal matching 'nope'"));
        Ok(())
    }

    #[test]
    fn test_screen_pipeline_ranks_by_score() -> Result<()> {
        let journal = Journal::parse(JOURNAL)?;
        let results = screen_pipeline(&journal, &ScreeningDefaults::default());

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "Harbor Fleet Services");
        assert!(results[0].1.score >= results[1].1.score);
        Ok(())
    }

    #[test]
    fn test_render_json_single_and_pipeline() -> Result<()> {
        let journal = Journal::parse(JOURNAL)?;
        let defaults = ScreeningDefaults::default();

        let single = render_json(
            &journal,
            &defaults,
            &ScreenOptions {
                deal: Some("d-2".to_string()),
                json: true,
                ..ScreenOptions::default()
            },
        )?;
        assert_eq!(single["multiple"].as_f64(), Some(6.0));
        assert_eq!(single["rating"], "WEAK");

        let pipeline = render_json(&journal, &defaults, &ScreenOptions::default())?;
        let entries = pipeline.as_array().expect("pipeline is an array");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["company"], "Harbor Fleet Services");
        assert_eq!(entries[0]["analysis"]["score"], 90);
        Ok(())
    }

    #[test]
    fn test_report_mentions_notes_and_sources() {
        let inputs = DealFinancialInputs {
            revenue: 5_000_000.0,
            ebitda: 1_000_000.0,
            asking_price: 3_500_000.0,
            down_payment_pct: 10.0,
            seller_note_pct: 10.0,
            sba_rate_annual_pct: 10.5,
            sba_term_years: 10.0,
            seller_note_rate_annual_pct: 6.0,
            seller_note_term_years: 5.0,
        };
        let report = analyze(&inputs).display_as_report("Harbor", &inputs);

        assert!(report.contains("Moderate multiple (3-4x)"));
        assert!(report.contains("(15/25)"));
        assert!(report.contains("SBA eligible (≤$5M)"));
        assert!(report.contains("$2.80M"));
        assert!(report.contains("$350K"));
        assert!(report.contains("SBA 7(a) ELIGIBLE"));
    }

    #[test]
    fn test_report_without_data_has_no_score() {
        let inputs = DealFinancialInputs::default();
        let report = analyze(&inputs).display_as_report("Blank", &inputs);
        assert!(report.contains("Enter revenue"));
        assert!(!report.contains("Score:"));
    }
}
