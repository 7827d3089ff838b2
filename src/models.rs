// 🧾 Data model for feed envelopes, funding records and provider fundings
// Everything is built fresh per request and serialised as camelCase JSON.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// ENUMS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FundingLineType {
    Payment,
    Information,
    Aggregate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalculationType {
    Cash,
    Rate,
    PupilNumber,
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueFormat {
    Currency,
    Number,
}

/// How a value rolls up when organisations are aggregated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregationType {
    Sum,
    Average,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FundingPeriodType {
    AcademicYear,
    FinancialYear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupingReason {
    Payment,
    Information,
}

impl GroupingReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupingReason::Payment => "Payment",
            GroupingReason::Information => "Information",
        }
    }
}

/// Every record in the mock is permanently released
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FundingStatus {
    Released,
}

impl FundingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FundingStatus::Released => "Released",
        }
    }
}

// ============================================================================
// PERIODS AND STREAMS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingPeriod {
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub period_type: FundingPeriodType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl FundingPeriod {
    pub fn start_year(&self) -> i32 {
        self.start_date.year()
    }

    pub fn end_year(&self) -> i32 {
        self.end_date.year()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingStreamRef {
    pub code: String,
    pub name: String,
}

// ============================================================================
// FUNDING VALUE TREE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePeriod {
    #[serde(rename = "type")]
    pub period_type: String,
    pub type_value: String,
    pub year: i32,
    pub occurrence: u32,
    pub profiled_value: i64,
    pub distribution_period_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionPeriod {
    pub distribution_period_code: String,
    pub value: i64,
    pub profile_periods: Vec<ProfilePeriod>,
}

/// Leaf input of a calculation; `-1` marks data absent from the fixture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceData {
    pub name: String,
    pub template_reference_id: u32,
    pub value: i64,
    pub format: ValueFormat,
    pub aggregation_type: AggregationType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calculation {
    pub name: String,
    pub template_calculation_id: u32,
    #[serde(rename = "type")]
    pub calculation_type: CalculationType,
    pub value: i64,
    pub value_format: ValueFormat,
    /// Display only
    pub formula_text: String,
    pub aggregation_type: AggregationType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_data: Vec<ReferenceData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub calculations: Vec<Calculation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingLine {
    pub name: String,
    pub template_line_id: u32,
    #[serde(rename = "type")]
    pub line_type: FundingLineType,
    /// Pence
    pub value: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub distribution_periods: Vec<DistributionPeriod>,
    #[serde(default)]
    pub calculations: Vec<Calculation>,
    #[serde(rename = "fundingLines", default)]
    pub children: Vec<FundingLine>,
}

impl FundingLine {
    /// Depth-first walk over this line and every descendant
    pub fn flatten(&self) -> Vec<&FundingLine> {
        let mut lines = vec![self];
        for child in &self.children {
            lines.extend(child.flatten());
        }
        lines
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingValue {
    pub total_value: i64,
    pub funding_lines: Vec<FundingLine>,
}

// ============================================================================
// ORGANISATION GROUPS AND PROVIDERS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganisationIdentifier {
    #[serde(rename = "type")]
    pub identifier_type: String,
    pub value: String,
}

impl OrganisationIdentifier {
    pub fn new(identifier_type: &str, value: impl Into<String>) -> Self {
        OrganisationIdentifier {
            identifier_type: identifier_type.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganisationGroup {
    pub group_type_identifier: String,
    pub identifier_value: String,
    pub group_type_code: String,
    pub group_type_classification: String,
    pub name: String,
    pub searchable_name: String,
    pub identifiers: Vec<OrganisationIdentifier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub identifier: String,
    pub name: String,
    pub searchable_name: String,
    pub ukprn: String,
    pub la_code: String,
    pub provider_type: String,
    pub provider_sub_type: String,
    pub identifiers: Vec<OrganisationIdentifier>,
}

// ============================================================================
// FUNDING RECORDS
// ============================================================================

/// `{stream}_{period}_{identifier}_{version}`
pub fn funding_id(stream_code: &str, period_code: &str, identifier: &str, version: &str) -> String {
    format!("{}_{}_{}_{}", stream_code, period_code, identifier, version)
}

/// Funding for one organisation group (the content of a feed entry)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Funding {
    pub id: String,
    pub funding_version: String,
    pub status: FundingStatus,
    pub funding_stream: FundingStreamRef,
    pub funding_period: FundingPeriod,
    pub organisation_group: OrganisationGroup,
    pub funding_value: FundingValue,
    /// Ids of the provider fundings that make up this group
    pub provider_fundings: Vec<String>,
    pub grouping_reason: GroupingReason,
    pub status_changed_date: DateTime<Utc>,
    pub external_publication_date: DateTime<Utc>,
    pub earliest_payment_available_date: DateTime<Utc>,
}

impl Funding {
    /// Recompose the id from the record's own parts
    pub fn derive_id(&self) -> String {
        funding_id(
            &self.funding_stream.code,
            &self.funding_period.code,
            &self.organisation_group.identifier_value,
            &self.funding_version,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderFunding {
    pub id: String,
    pub funding_version: String,
    pub provider: Provider,
    pub funding_stream_code: String,
    pub funding_period_code: String,
    pub funding_value: FundingValue,
    #[serde(default)]
    pub variation_reasons: Vec<String>,
}

// ============================================================================
// ATOM FEED
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    pub rel: String,
}

impl Link {
    pub fn new(href: impl Into<String>, rel: &str) -> Self {
        Link {
            href: href.into(),
            rel: rel.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedContent {
    pub funding: Funding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub author: Author,
    pub updated: DateTime<Utc>,
    pub link: Vec<Link>,
    pub content: FeedContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub id: String,
    pub title: String,
    pub author: Author,
    pub updated: DateTime<Utc>,
    pub rights: String,
    pub link: Vec<Link>,
    pub atom_entry: Vec<FeedEntry>,
}

impl FeedResponse {
    pub fn link(&self, rel: &str) -> Option<&Link> {
        self.link.iter().find(|link| link.rel == rel)
    }
}

// ============================================================================
// LOGICAL MODEL (templates without values)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateReferenceData {
    pub name: String,
    pub template_reference_id: u32,
    pub format: ValueFormat,
    pub aggregation_type: AggregationType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateCalculation {
    pub name: String,
    pub template_calculation_id: u32,
    #[serde(rename = "type")]
    pub calculation_type: CalculationType,
    pub value_format: ValueFormat,
    pub formula_text: String,
    pub aggregation_type: AggregationType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_data: Vec<TemplateReferenceData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub calculations: Vec<TemplateCalculation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateFundingLine {
    pub name: String,
    pub template_line_id: u32,
    #[serde(rename = "type")]
    pub line_type: FundingLineType,
    pub calculations: Vec<TemplateCalculation>,
    #[serde(rename = "fundingLines")]
    pub children: Vec<TemplateFundingLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicalModel {
    pub funding_stream: FundingStreamRef,
    pub funding_period: FundingPeriod,
    pub funding_lines: Vec<TemplateFundingLine>,
}
