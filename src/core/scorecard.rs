//! Aggregates the activity journal into goal progress and an overall health score.
use crate::core::pacing::{PaceStatus, pace_status};
use crate::core::period::Period;
use crate::core::records::{
    ActivityKind, ActivityRecord, ContactType, DealRecord, DealStage, Venue,
};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use tracing::debug;

pub const RESPONSE_RATE_TARGET: u32 = 40;
pub const CIM_COMPLIANCE_TARGET: u32 = 100;
/// A CIM review counts as logged once its write-up is longer than this.
pub const CIM_DESCRIPTION_MIN_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalId {
    OutboundContacts,
    IntermediaryContacts,
    CriteriaShared,
    IntrosMade,
    Meetings,
    QualifiedCims,
    InboundLeads,
    WarmIntros,
}

/// A periodic outreach goal: how many qualifying activities are wanted per period.
#[derive(Debug, Clone, Copy)]
pub struct GoalDefinition {
    pub id: GoalId,
    pub name: &'static str,
    pub period: Period,
    pub target: u32,
    /// Only count activities that are not tied to a deal.
    pub networking_only: bool,
    pub qualifies: fn(&ActivityRecord) -> bool,
}

fn is_outbound(a: &ActivityRecord) -> bool {
    a.is_outbound
}

fn is_intermediary_contact(a: &ActivityRecord) -> bool {
    a.contact_type.is_some_and(|c| c.is_intermediary())
}

fn is_public_share(a: &ActivityRecord) -> bool {
    a.is_public_share
}

fn is_intro(a: &ActivityRecord) -> bool {
    a.kind == ActivityKind::IntroMade
}

fn is_meeting(a: &ActivityRecord) -> bool {
    matches!(a.kind, ActivityKind::Meeting | ActivityKind::Coffee)
}

fn is_cim_review(a: &ActivityRecord) -> bool {
    a.kind == ActivityKind::CimReview
}

fn is_lead(a: &ActivityRecord) -> bool {
    a.generated_lead
}

fn is_warm_intro(a: &ActivityRecord) -> bool {
    a.kind == ActivityKind::IntroMade && a.generated_lead
}

pub const GOALS: [GoalDefinition; 8] = [
    GoalDefinition {
        id: GoalId::OutboundContacts,
        name: "Outbound networking contacts",
        period: Period::Month,
        target: 3,
        networking_only: true,
        qualifies: is_outbound,
    },
    GoalDefinition {
        id: GoalId::IntermediaryContacts,
        name: "New broker/banker/advisor contacts",
        period: Period::Month,
        target: 3,
        networking_only: true,
        qualifies: is_intermediary_contact,
    },
    GoalDefinition {
        id: GoalId::CriteriaShared,
        name: "Criteria shared publicly",
        period: Period::Month,
        target: 3,
        networking_only: false,
        qualifies: is_public_share,
    },
    GoalDefinition {
        id: GoalId::IntrosMade,
        name: "Give-first intros made",
        period: Period::Month,
        target: 1,
        networking_only: false,
        qualifies: is_intro,
    },
    GoalDefinition {
        id: GoalId::Meetings,
        name: "Meetings completed",
        period: Period::Quarter,
        target: 3,
        networking_only: true,
        qualifies: is_meeting,
    },
    GoalDefinition {
        id: GoalId::QualifiedCims,
        name: "Qualified CIMs received",
        period: Period::Quarter,
        target: 1,
        networking_only: false,
        qualifies: is_cim_review,
    },
    GoalDefinition {
        id: GoalId::InboundLeads,
        name: "Inbound leads generated",
        period: Period::Quarter,
        target: 2,
        networking_only: false,
        qualifies: is_lead,
    },
    GoalDefinition {
        id: GoalId::WarmIntros,
        name: "Warm intros to sellers/brokers",
        period: Period::Quarter,
        target: 1,
        networking_only: false,
        qualifies: is_warm_intro,
    },
];

impl GoalDefinition {
    /// Counts the qualifying activities inside the goal's current period.
    pub fn actual(&self, activities: &[ActivityRecord], now: NaiveDateTime) -> u32 {
        let start = self.period.start(now);
        let count = activities
            .iter()
            .filter(|a| a.timestamp >= start)
            .filter(|a| !self.networking_only || a.is_networking())
            .filter(|a| (self.qualifies)(a))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    pub fn evaluate(&self, activities: &[ActivityRecord], now: NaiveDateTime) -> GoalResult {
        let actual = self.actual(activities, now);
        GoalResult {
            id: self.id,
            name: self.name,
            period: self.period,
            actual,
            target: self.target,
            status: pace_status(self.period, f64::from(actual), f64::from(self.target), now),
            progress_pct: achievement(f64::from(actual), f64::from(self.target)) * 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalResult {
    pub id: GoalId,
    pub name: &'static str,
    pub period: Period,
    pub actual: u32,
    pub target: u32,
    pub status: PaceStatus,
    /// Progress toward the target, capped at 100.
    pub progress_pct: f64,
}

/// A percentage metric together with the counts it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateMetric {
    pub value: u32,
    pub target: u32,
    pub numerator: usize,
    pub denominator: usize,
}

impl RateMetric {
    fn from_counts(numerator: usize, denominator: usize, target: u32, when_empty: u32) -> Self {
        let value = if denominator > 0 {
            (numerator as f64 / denominator as f64 * 100.0).round() as u32
        } else {
            when_empty
        };
        RateMetric {
            value,
            target,
            numerator,
            denominator,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tally<K> {
    pub key: K,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ActivityStats {
    pub total_activities: usize,
    pub this_month: usize,
    pub networking: usize,
    pub deal_related: usize,
    pub deals_reviewed: usize,
    pub active_pipeline: usize,
    pub passed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthRating {
    Strong,
    OnPace,
    NeedsAttention,
}

impl HealthRating {
    pub fn from_score(score: u32) -> Self {
        match score {
            80.. => HealthRating::Strong,
            50..=79 => HealthRating::OnPace,
            _ => HealthRating::NeedsAttention,
        }
    }
}

impl Display for HealthRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                HealthRating::Strong => "STRONG",
                HealthRating::OnPace => "ON PACE",
                HealthRating::NeedsAttention => "NEEDS ATTENTION",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScorecardReport {
    pub as_of: NaiveDateTime,
    pub month_label: String,
    pub quarter_label: String,
    pub goals: Vec<GoalResult>,
    pub response_rate: RateMetric,
    pub cim_compliance: RateMetric,
    pub by_contact_type: Vec<Tally<ContactType>>,
    pub by_venue: Vec<Tally<Venue>>,
    pub stats: ActivityStats,
    pub overall_score: u32,
    pub overall_rating: HealthRating,
}

impl ScorecardReport {
    pub fn goal(&self, id: GoalId) -> Option<&GoalResult> {
        self.goals.iter().find(|g| g.id == id)
    }

    pub fn goals_for(&self, period: Period) -> impl Iterator<Item = &GoalResult> {
        self.goals.iter().filter(move |g| g.period == period)
    }
}

/// `min(actual / target, 1)`, treating a zero target as met.
fn achievement(actual: f64, target: f64) -> f64 {
    if target <= 0.0 {
        1.0
    } else {
        (actual / target).min(1.0)
    }
}

/// Counts keys in encounter order, then sorts by descending count. The sort is
/// stable so ties keep the order in which keys first appeared.
fn tally<K, I>(keys: I) -> Vec<Tally<K>>
where
    K: Eq + Hash + Copy,
    I: IntoIterator<Item = K>,
{
    let mut positions: HashMap<K, usize> = HashMap::new();
    let mut tallies: Vec<Tally<K>> = Vec::new();
    for key in keys {
        match positions.get(&key) {
            Some(&index) => tallies[index].count += 1,
            None => {
                positions.insert(key, tallies.len());
                tallies.push(Tally { key, count: 1 });
            }
        }
    }
    tallies.sort_by(|a, b| b.count.cmp(&a.count));
    tallies
}

fn response_rate(activities: &[ActivityRecord]) -> RateMetric {
    let (outbound, responses) = activities
        .iter()
        .filter(|a| a.is_networking() && a.is_outbound)
        .fold((0, 0), |(outbound, responses), a| {
            (outbound + 1, responses + usize::from(a.got_response))
        });
    RateMetric::from_counts(responses, outbound, RESPONSE_RATE_TARGET, 0)
}

fn cim_compliance(activities: &[ActivityRecord]) -> RateMetric {
    let (reviews, logged) = activities
        .iter()
        .filter(|a| a.kind == ActivityKind::CimReview)
        .fold((0, 0), |(reviews, logged), a| {
            let is_logged = a.description_len() > CIM_DESCRIPTION_MIN_LEN;
            (reviews + 1, logged + usize::from(is_logged))
        });
    // No reviews yet means nothing was left unlogged.
    RateMetric::from_counts(logged, reviews, CIM_COMPLIANCE_TARGET, 100)
}

fn overall_score(goals: &[GoalResult], response_rate: &RateMetric) -> u32 {
    let goal_ratio = |id: GoalId| {
        goals
            .iter()
            .find(|g| g.id == id)
            .map_or(0.0, |g| achievement(f64::from(g.actual), f64::from(g.target)))
    };
    let ratios = [
        goal_ratio(GoalId::OutboundContacts),
        achievement(
            f64::from(response_rate.value),
            f64::from(response_rate.target),
        ),
        goal_ratio(GoalId::Meetings),
        goal_ratio(GoalId::CriteriaShared),
        goal_ratio(GoalId::InboundLeads),
    ];
    let mean = ratios.iter().sum::<f64>() / ratios.len() as f64;
    (mean * 100.0).round() as u32
}

fn activity_stats(
    activities: &[ActivityRecord],
    deals: &[DealRecord],
    now: NaiveDateTime,
) -> ActivityStats {
    let networking = activities.iter().filter(|a| a.is_networking()).count();
    ActivityStats {
        total_activities: activities.len(),
        this_month: activities
            .iter()
            .filter(|a| Period::Month.contains(now, a.timestamp))
            .count(),
        networking,
        deal_related: activities.len() - networking,
        deals_reviewed: deals.len(),
        active_pipeline: deals.iter().filter(|d| d.stage.is_active()).count(),
        passed: deals
            .iter()
            .filter(|d| d.stage == DealStage::Passed)
            .count(),
    }
}

/// Builds the scorecard for the month and quarter containing `now`.
///
/// Pure over its inputs: the same records and `now` always give the same report.
pub fn build_report(
    activities: &[ActivityRecord],
    deals: &[DealRecord],
    now: NaiveDateTime,
) -> ScorecardReport {
    let goals: Vec<GoalResult> = GOALS
        .iter()
        .map(|goal| goal.evaluate(activities, now))
        .collect();
    for goal in &goals {
        debug!(
            goal = goal.name,
            actual = goal.actual,
            target = goal.target,
            status = %goal.status,
            "Evaluated goal"
        );
    }

    let response_rate = response_rate(activities);
    let cim_compliance = cim_compliance(activities);
    let overall_score = overall_score(&goals, &response_rate);
    debug!(
        response_rate = response_rate.value,
        cim_compliance = cim_compliance.value,
        overall_score,
        "Computed scorecard totals"
    );

    let networking = || activities.iter().filter(|a| a.is_networking());

    ScorecardReport {
        as_of: now,
        month_label: Period::Month.label(now),
        quarter_label: Period::Quarter.label(now),
        goals,
        response_rate,
        cim_compliance,
        by_contact_type: tally(networking().filter_map(|a| a.contact_type)),
        by_venue: tally(networking().filter_map(|a| a.venue)),
        stats: activity_stats(activities, deals, now),
        overall_score,
        overall_rating: HealthRating::from_score(overall_score),
    }
}
