use super::ui;
use crate::core::journal::Journal;
use crate::core::period::Period;
use crate::core::scorecard::{HealthRating, RateMetric, ScorecardReport, Tally, build_report};
use anyhow::Result;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use comfy_table::{Cell, Color, Table};
use std::fmt::Display;
use tracing::info;

const BAR_WIDTH: usize = 24;

#[derive(Debug, Clone, Default)]
pub struct ScorecardOptions {
    /// Evaluate as of the end of this day instead of the current time.
    pub as_of: Option<NaiveDate>,
    pub json: bool,
}

impl ScorecardOptions {
    pub fn now(&self) -> NaiveDateTime {
        match self.as_of {
            Some(date) => date.and_time(
                NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN),
            ),
            None => Local::now().naive_local(),
        }
    }
}

fn rating_style(rating: HealthRating) -> ui::StyleType {
    match rating {
        HealthRating::Strong => ui::StyleType::Good,
        HealthRating::OnPace => ui::StyleType::Caution,
        HealthRating::NeedsAttention => ui::StyleType::Error,
    }
}

fn breakdown_table<K: Display>(heading: &str, tallies: &[Tally<K>]) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell(heading),
        ui::header_cell(""),
        ui::header_cell("Count"),
    ]);
    let max = tallies.first().map_or(0, |t| t.count);
    for tally in tallies {
        table.add_row(vec![
            Cell::new(tally.key.to_string()),
            Cell::new(ui::bar(tally.count, max, BAR_WIDTH)).fg(Color::Blue),
            ui::value_cell(tally.count.to_string()),
        ]);
    }
    table
}

fn rate_line(label: &str, metric: &RateMetric, good: u32, fair: u32) -> String {
    let value = format!("{}%", metric.value);
    let style = ui::tier_style(f64::from(metric.value), f64::from(good), f64::from(fair));
    format!(
        "{label}: {} {}",
        ui::style_text(&value, style),
        ui::style_text(
            &format!(
                "({}/{}, target: {}%)",
                metric.numerator, metric.denominator, metric.target
            ),
            ui::StyleType::Subtle
        )
    )
}

impl ScorecardReport {
    fn goals_table(&self, period: Period) -> Table {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Goal"),
            ui::header_cell("Progress"),
            ui::header_cell(""),
            ui::header_cell("Status"),
        ]);
        for goal in self.goals_for(period) {
            let filled = (goal.progress_pct / 100.0 * 10.0).round() as usize;
            table.add_row(vec![
                Cell::new(goal.name),
                ui::value_cell(format!("{} / {}", goal.actual, goal.target)),
                Cell::new(format!("{}{}", "■".repeat(filled), "□".repeat(10 - filled)))
                    .fg(ui::status_color(goal.status)),
                ui::status_cell(goal.status),
            ]);
        }
        table
    }

    fn stats_table(&self) -> Table {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Total Activities"),
            ui::header_cell("This Month"),
            ui::header_cell("Networking"),
            ui::header_cell("Deals Reviewed"),
            ui::header_cell("Active Pipeline"),
            ui::header_cell("Response Rate"),
        ]);
        let response_color = if self.response_rate.value >= self.response_rate.target {
            Color::Green
        } else {
            Color::Red
        };
        table.add_row(vec![
            ui::value_cell(self.stats.total_activities.to_string()),
            ui::value_cell(self.stats.this_month.to_string()),
            ui::value_cell(self.stats.networking.to_string()),
            ui::value_cell(self.stats.deals_reviewed.to_string()),
            ui::value_cell(self.stats.active_pipeline.to_string()),
            ui::colored_value_cell(format!("{}%", self.response_rate.value), response_color),
        ]);
        table
    }

    pub fn display_as_report(&self) -> String {
        let overall = format!("{} {}", self.overall_score, self.overall_rating);
        let mut output = format!(
            "{} · {}\n\nOverall: {}\n\n",
            ui::style_text("Search Scorecard", ui::StyleType::Title),
            self.month_label,
            ui::style_text(&overall, rating_style(self.overall_rating)),
        );
        output.push_str(&self.stats_table().to_string());

        output.push_str(&format!(
            "\n\n{}\n",
            ui::style_text(
                &format!("Monthly Goals · {}", self.month_label),
                ui::StyleType::TotalLabel
            )
        ));
        output.push_str(&self.goals_table(Period::Month).to_string());
        output.push_str(&format!(
            "\n{}\n{}",
            rate_line("Response Rate (all-time)", &self.response_rate, 40, 40),
            rate_line("CIM Log Compliance", &self.cim_compliance, 90, 0),
        ));

        output.push_str(&format!(
            "\n\n{}\n",
            ui::style_text(
                &format!("Quarterly Goals · {}", self.quarter_label),
                ui::StyleType::TotalLabel
            )
        ));
        output.push_str(&self.goals_table(Period::Quarter).to_string());

        if self.by_contact_type.is_empty() && self.by_venue.is_empty() {
            output.push_str(&format!(
                "\n\n{}",
                ui::style_text("No networking activity logged yet.", ui::StyleType::Subtle)
            ));
        } else {
            if !self.by_contact_type.is_empty() {
                output.push_str("\n\n");
                output.push_str(&breakdown_table("By Contact Type", &self.by_contact_type).to_string());
            }
            if !self.by_venue.is_empty() {
                output.push_str("\n\n");
                output.push_str(&breakdown_table("By Venue", &self.by_venue).to_string());
            }
        }

        output
    }
}

fn report(journal: &Journal, options: &ScorecardOptions) -> ScorecardReport {
    let now = options.now();
    info!("Building scorecard as of {now}");
    build_report(&journal.activities, &journal.deals, now)
}

/// JSON output of `scorecard`.
pub fn render_json(journal: &Journal, options: &ScorecardOptions) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(report(journal, options))?)
}

pub fn run(journal: &Journal, options: &ScorecardOptions) -> Result<()> {
    if options.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&render_json(journal, options)?)?
        );
    } else {
        println!("{}", report(journal, options).display_as_report());
    }
    Ok(())
}
