//! Deal and activity records as read from the journal.

use crate::core::config::ScreeningDefaults;
use crate::core::structuring::DealFinancialInputs;
use anyhow::{Result, anyhow};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fmt::Display;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Call,
    Email,
    Meeting,
    Coffee,
    Note,
    CimReview,
    SiteVisit,
    LoiSent,
    Conference,
    Linkedin,
    IntroMade,
    CriteriaShared,
    #[serde(other)]
    Other,
}

impl Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ActivityKind::Call => "Call",
            ActivityKind::Email => "Email",
            ActivityKind::Meeting => "Meeting",
            ActivityKind::Coffee => "Coffee / Virtual",
            ActivityKind::Note => "Note",
            ActivityKind::CimReview => "CIM Review",
            ActivityKind::SiteVisit => "Site Visit",
            ActivityKind::LoiSent => "LOI Sent",
            ActivityKind::Conference => "Conference / Event",
            ActivityKind::Linkedin => "LinkedIn Outreach",
            ActivityKind::IntroMade => "Intro Made",
            ActivityKind::CriteriaShared => "Criteria Shared",
            ActivityKind::Other => "Other",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactType {
    #[serde(rename = "Broker / Intermediary")]
    Broker,
    #[serde(rename = "M&A Advisor")]
    MaAdvisor,
    #[serde(rename = "Banker / Lender")]
    Banker,
    #[serde(rename = "Searcher / Peer")]
    Searcher,
    #[serde(rename = "Investor")]
    Investor,
    #[serde(rename = "CPA / Accountant")]
    Accountant,
    #[serde(rename = "Attorney / Lawyer")]
    Attorney,
    #[serde(rename = "Seller / Owner")]
    Seller,
    #[serde(rename = "Former Colleague")]
    FormerColleague,
    #[serde(rename = "Industry Contact")]
    IndustryContact,
    #[serde(other)]
    Other,
}

impl ContactType {
    /// Contacts that sit between a searcher and sellers and can route deal flow.
    pub fn is_intermediary(&self) -> bool {
        match self {
            ContactType::Broker | ContactType::MaAdvisor | ContactType::Banker => true,
            ContactType::Searcher
            | ContactType::Investor
            | ContactType::Accountant
            | ContactType::Attorney
            | ContactType::Seller
            | ContactType::FormerColleague
            | ContactType::IndustryContact
            | ContactType::Other => false,
        }
    }
}

impl Display for ContactType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ContactType::Broker => "Broker / Intermediary",
            ContactType::MaAdvisor => "M&A Advisor",
            ContactType::Banker => "Banker / Lender",
            ContactType::Searcher => "Searcher / Peer",
            ContactType::Investor => "Investor",
            ContactType::Accountant => "CPA / Accountant",
            ContactType::Attorney => "Attorney / Lawyer",
            ContactType::Seller => "Seller / Owner",
            ContactType::FormerColleague => "Former Colleague",
            ContactType::IndustryContact => "Industry Contact",
            ContactType::Other => "Other",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    Email,
    #[serde(rename = "Phone Call")]
    PhoneCall,
    #[serde(rename = "Video Call / Zoom")]
    VideoCall,
    #[serde(rename = "Coffee / In-Person")]
    InPerson,
    #[serde(rename = "Networking Event")]
    NetworkingEvent,
    #[serde(rename = "Conference / Trade Show")]
    Conference,
    #[serde(rename = "Alumni Mixer")]
    AlumniMixer,
    #[serde(rename = "Cohort Gathering")]
    CohortGathering,
    #[serde(rename = "LinkedIn")]
    Linkedin,
    #[serde(rename = "Chamber of Commerce")]
    ChamberOfCommerce,
    #[serde(rename = "Industry Association")]
    IndustryAssociation,
    #[serde(other)]
    Other,
}

impl Display for Venue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Venue::Email => "Email",
            Venue::PhoneCall => "Phone Call",
            Venue::VideoCall => "Video Call / Zoom",
            Venue::InPerson => "Coffee / In-Person",
            Venue::NetworkingEvent => "Networking Event",
            Venue::Conference => "Conference / Trade Show",
            Venue::AlumniMixer => "Alumni Mixer",
            Venue::CohortGathering => "Cohort Gathering",
            Venue::Linkedin => "LinkedIn",
            Venue::ChamberOfCommerce => "Chamber of Commerce",
            Venue::IndustryAssociation => "Industry Association",
            Venue::Other => "Other",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealStage {
    #[default]
    Identified,
    InitialReview,
    Outreach,
    Diligence,
    Loi,
    Closed,
    Passed,
    #[serde(other)]
    Other,
}

impl DealStage {
    /// Deals still being worked, i.e. neither closed nor passed on.
    pub fn is_active(&self) -> bool {
        match self {
            DealStage::Closed | DealStage::Passed => false,
            DealStage::Identified
            | DealStage::InitialReview
            | DealStage::Outreach
            | DealStage::Diligence
            | DealStage::Loi
            | DealStage::Other => true,
        }
    }
}

impl Display for DealStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DealStage::Identified => "Identified",
            DealStage::InitialReview => "Initial Review",
            DealStage::Outreach => "Outreach",
            DealStage::Diligence => "Due Diligence",
            DealStage::Loi => "LOI / Negotiation",
            DealStage::Closed => "Closed",
            DealStage::Passed => "Passed",
            DealStage::Other => "Other",
        };
        write!(f, "{label}")
    }
}

/// A logged outreach, networking or deal activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    #[serde(rename = "date", deserialize_with = "deserialize_timestamp")]
    pub timestamp: NaiveDateTime,
    pub kind: ActivityKind,
    #[serde(default)]
    pub deal_id: Option<String>,
    #[serde(default)]
    pub contact_type: Option<ContactType>,
    #[serde(default)]
    pub venue: Option<Venue>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_outbound")]
    pub is_outbound: bool,
    #[serde(default)]
    pub got_response: bool,
    #[serde(default)]
    pub is_public_share: bool,
    #[serde(default)]
    pub generated_lead: bool,
}

fn default_outbound() -> bool {
    true
}

impl ActivityRecord {
    pub fn new(timestamp: NaiveDateTime, kind: ActivityKind) -> Self {
        ActivityRecord {
            timestamp,
            kind,
            deal_id: None,
            contact_type: None,
            venue: None,
            description: None,
            is_outbound: true,
            got_response: false,
            is_public_share: false,
            generated_lead: false,
        }
    }

    /// Networking activities are the ones not tied to any deal.
    pub fn is_networking(&self) -> bool {
        self.deal_id.as_deref().is_none_or(|id| id.trim().is_empty())
    }

    pub fn description_len(&self) -> usize {
        self.description
            .as_deref()
            .map_or(0, |text| text.chars().count())
    }
}

/// Financial fields a deal may carry; anything missing falls back to the
/// screening defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DealTerms {
    pub revenue: Option<f64>,
    pub ebitda: Option<f64>,
    pub asking_price: Option<f64>,
    pub down_payment_pct: Option<f64>,
    pub seller_note_pct: Option<f64>,
    pub sba_rate_annual_pct: Option<f64>,
    pub sba_term_years: Option<f64>,
    pub seller_note_rate_annual_pct: Option<f64>,
    pub seller_note_term_years: Option<f64>,
}

impl DealTerms {
    pub fn has_financials(&self) -> bool {
        self.revenue.is_some() || self.ebitda.is_some() || self.asking_price.is_some()
    }

    /// Fields set on `other` win over fields set on `self`.
    pub fn overlay(&self, other: &DealTerms) -> DealTerms {
        DealTerms {
            revenue: other.revenue.or(self.revenue),
            ebitda: other.ebitda.or(self.ebitda),
            asking_price: other.asking_price.or(self.asking_price),
            down_payment_pct: other.down_payment_pct.or(self.down_payment_pct),
            seller_note_pct: other.seller_note_pct.or(self.seller_note_pct),
            sba_rate_annual_pct: other.sba_rate_annual_pct.or(self.sba_rate_annual_pct),
            sba_term_years: other.sba_term_years.or(self.sba_term_years),
            seller_note_rate_annual_pct: other
                .seller_note_rate_annual_pct
                .or(self.seller_note_rate_annual_pct),
            seller_note_term_years: other.seller_note_term_years.or(self.seller_note_term_years),
        }
    }

    pub fn resolve(&self, defaults: &ScreeningDefaults) -> DealFinancialInputs {
        DealFinancialInputs {
            revenue: self.revenue.unwrap_or(0.0),
            ebitda: self.ebitda.unwrap_or(0.0),
            asking_price: self.asking_price.unwrap_or(0.0),
            down_payment_pct: self.down_payment_pct.unwrap_or(defaults.down_payment_pct),
            seller_note_pct: self.seller_note_pct.unwrap_or(defaults.seller_note_pct),
            sba_rate_annual_pct: self
                .sba_rate_annual_pct
                .unwrap_or(defaults.sba_rate_annual_pct),
            sba_term_years: self.sba_term_years.unwrap_or(defaults.sba_term_years),
            seller_note_rate_annual_pct: self
                .seller_note_rate_annual_pct
                .unwrap_or(defaults.seller_note_rate_annual_pct),
            seller_note_term_years: self
                .seller_note_term_years
                .unwrap_or(defaults.seller_note_term_years),
        }
    }
}

/// A business in the acquisition pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDealRecord")]
pub struct DealRecord {
    pub id: String,
    pub company: String,
    pub stage: DealStage,
    pub sector: Option<String>,
    pub source: Option<String>,
    #[serde(flatten)]
    pub terms: DealTerms,
}

/// A deal as written in the journal. Financial fields stay loosely typed so a
/// blank or mistyped amount does not fail the whole journal.
#[derive(Deserialize)]
struct RawDealRecord {
    id: String,
    company: String,
    #[serde(default)]
    stage: DealStage,
    #[serde(default)]
    sector: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(flatten)]
    fields: BTreeMap<String, Value>,
}

/// Reads an amount written either as a number or as numeric text.
fn parse_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|amount| amount.is_finite())
}

impl From<RawDealRecord> for DealRecord {
    fn from(raw: RawDealRecord) -> Self {
        let amount = |field: &str| -> Option<f64> {
            let value = raw.fields.get(field).filter(|v| !v.is_null())?;
            let parsed = parse_amount(value);
            if parsed.is_none() {
                warn!(deal = %raw.id, field, ?value, "Ignoring invalid amount in journal");
            }
            parsed
        };
        let terms = DealTerms {
            revenue: amount("revenue"),
            ebitda: amount("ebitda"),
            asking_price: amount("asking_price"),
            down_payment_pct: amount("down_payment_pct"),
            seller_note_pct: amount("seller_note_pct"),
            sba_rate_annual_pct: amount("sba_rate_annual_pct"),
            sba_term_years: amount("sba_term_years"),
            seller_note_rate_annual_pct: amount("seller_note_rate_annual_pct"),
            seller_note_term_years: amount("seller_note_term_years"),
        };
        DealRecord {
            id: raw.id,
            company: raw.company,
            stage: raw.stage,
            sector: raw.sector,
            source: raw.source,
            terms,
        }
    }
}

/// Parses either a bare `YYYY-MM-DD` date (taken as midnight) or a full timestamp.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| anyhow!("Invalid activity date: {raw}"))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}
