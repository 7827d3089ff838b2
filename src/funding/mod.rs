// 💷 Funding streams
// Polymorphic generators: one per stream, each turning fixtures into feed
// records and provider fundings.

pub mod dsg;
pub mod pesports;
pub mod template;

use crate::error::Result;
use crate::fixture::Fixtures;
use crate::models::{
    funding_id, Funding, FundingPeriod, FundingStatus, FundingStreamRef, FundingValue,
    GroupingReason, LogicalModel, OrganisationGroup, OrganisationIdentifier, Provider,
    ProviderFunding,
};
use crate::reference;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

pub use dsg::DsgGenerator;
pub use pesports::PeSportsGenerator;

/// Every record in the mock is version 1.0
pub const FUNDING_VERSION: &str = "1.0";

// ============================================================================
// CORE TYPES
// ============================================================================

/// FundingStream - the two mock funding streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FundingStream {
    Dsg,
    PeSports,
}

impl FundingStream {
    pub const ALL: [FundingStream; 2] = [FundingStream::Dsg, FundingStream::PeSports];

    /// Code used in ids and filters
    pub fn code(&self) -> &'static str {
        match self {
            FundingStream::Dsg => "DSG",
            FundingStream::PeSports => "PESports",
        }
    }

    /// Human-readable name for display
    pub fn name(&self) -> &'static str {
        match self {
            FundingStream::Dsg => "Dedicated Schools Grant",
            FundingStream::PeSports => "PE and Sport Premium",
        }
    }

    /// Case-insensitive lookup by stream code
    pub fn from_code(code: &str) -> Option<FundingStream> {
        Self::ALL
            .into_iter()
            .find(|stream| stream.code().eq_ignore_ascii_case(code.trim()))
    }

    pub fn as_ref_model(&self) -> FundingStreamRef {
        FundingStreamRef {
            code: self.code().to_string(),
            name: self.name().to_string(),
        }
    }

    /// The single funding period each stream publishes
    pub fn period(&self) -> FundingPeriod {
        match self {
            FundingStream::Dsg => reference::financial_year(2019),
            FundingStream::PeSports => reference::academic_year(2019),
        }
    }

    /// Fixed status-change (and publication) timestamp of every record
    pub fn status_changed_date(&self) -> DateTime<Utc> {
        match self {
            FundingStream::Dsg => timestamp(2019, 3, 28, 9, 30),
            FundingStream::PeSports => timestamp(2019, 9, 2, 9, 30),
        }
    }

    pub fn earliest_payment_available_date(&self) -> DateTime<Utc> {
        match self {
            FundingStream::Dsg => timestamp(2019, 4, 1, 0, 0),
            FundingStream::PeSports => timestamp(2019, 10, 31, 0, 0),
        }
    }
}

fn timestamp(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

/// A provider behind a grouped funding, kept for provider-level filters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRef {
    pub funding_id: String,
    pub ukprn: String,
    pub provider_type: String,
    pub identifiers: Vec<OrganisationIdentifier>,
}

impl ProviderRef {
    pub fn from_provider_funding(funding: &ProviderFunding) -> Self {
        ProviderRef {
            funding_id: funding.id.clone(),
            ukprn: funding.provider.ukprn.clone(),
            provider_type: funding.provider.provider_type.clone(),
            identifiers: funding.provider.identifiers.clone(),
        }
    }
}

/// A feed record plus the providers it groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedFunding {
    pub funding: Funding,
    pub providers: Vec<ProviderRef>,
}

impl GroupedFunding {
    /// Wrap a funding value in a released record for one organisation group
    pub fn assemble(
        stream: FundingStream,
        organisation_group: OrganisationGroup,
        funding_value: FundingValue,
        grouping_reason: GroupingReason,
        providers: Vec<ProviderRef>,
    ) -> Self {
        let funding_period = stream.period();
        let published = stream.status_changed_date();

        let funding = Funding {
            id: funding_id(
                stream.code(),
                &funding_period.code,
                &organisation_group.identifier_value,
                FUNDING_VERSION,
            ),
            funding_version: FUNDING_VERSION.to_string(),
            status: FundingStatus::Released,
            funding_stream: stream.as_ref_model(),
            funding_period,
            organisation_group,
            funding_value,
            provider_fundings: providers.iter().map(|p| p.funding_id.clone()).collect(),
            grouping_reason,
            status_changed_date: published,
            external_publication_date: published,
            earliest_payment_available_date: stream.earliest_payment_available_date(),
        };

        GroupedFunding { funding, providers }
    }
}

/// Single-provider record keyed by the provider's UKPRN
pub fn provider_funding(
    stream: FundingStream,
    provider: Provider,
    funding_value: FundingValue,
) -> ProviderFunding {
    let period = stream.period();
    ProviderFunding {
        id: funding_id(stream.code(), &period.code, &provider.ukprn, FUNDING_VERSION),
        funding_version: FUNDING_VERSION.to_string(),
        provider,
        funding_stream_code: stream.code().to_string(),
        funding_period_code: period.code,
        funding_value,
        variation_reasons: Vec::new(),
    }
}

// ============================================================================
// GENERATOR TRAIT
// ============================================================================

/// StreamGenerator - one implementation per funding stream
///
/// Every call rebuilds from the read-only fixtures; nothing is cached.
pub trait StreamGenerator: Send + Sync {
    fn stream(&self) -> FundingStream;

    /// Every feed record of the stream, unfiltered, in feed order
    fn fundings(&self, fixtures: &Fixtures) -> Result<Vec<GroupedFunding>>;

    /// Every single-provider record of the stream
    fn provider_fundings(&self, fixtures: &Fixtures) -> Result<Vec<ProviderFunding>>;

    /// Template tree without values
    fn logical_model(&self) -> LogicalModel;
}

// ============================================================================
// FACTORY FUNCTIONS
// ============================================================================

/// Get the generator for a stream
pub fn generator_for(stream: FundingStream) -> Box<dyn StreamGenerator> {
    match stream {
        FundingStream::Dsg => Box::new(DsgGenerator::new()),
        FundingStream::PeSports => Box::new(PeSportsGenerator::new()),
    }
}

/// Stream named by the first underscore-delimited segment of an id
///
/// # Examples:
/// ```
/// use funding_feed_mock::funding::{detect_stream, FundingStream};
/// assert_eq!(detect_stream("dsg_FY1920_MOCKUKPRN202_1.0"), Some(FundingStream::Dsg));
/// assert_eq!(detect_stream("XYZ_1"), None);
/// ```
pub fn detect_stream(id: &str) -> Option<FundingStream> {
    let prefix = id.split('_').next()?;
    FundingStream::from_code(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_codes() {
        assert_eq!(FundingStream::Dsg.code(), "DSG");
        assert_eq!(FundingStream::PeSports.code(), "PESports");
        assert_eq!(FundingStream::from_code("pesports"), Some(FundingStream::PeSports));
        assert_eq!(FundingStream::from_code(" Dsg "), Some(FundingStream::Dsg));
        assert_eq!(FundingStream::from_code("GAG"), None);
    }

    #[test]
    fn test_stream_periods() {
        assert_eq!(FundingStream::Dsg.period().code, "FY1920");
        assert_eq!(FundingStream::PeSports.period().code, "AY1920");
        assert!(FundingStream::Dsg.status_changed_date() < FundingStream::PeSports.status_changed_date());
    }

    #[test]
    fn test_detect_stream() {
        assert_eq!(detect_stream("DSG_FY1920_MOCKUKPRN202_1.0"), Some(FundingStream::Dsg));
        assert_eq!(
            detect_stream("PESPORTS_AY1920_MOCKUKPRN2022000_1.0"),
            Some(FundingStream::PeSports)
        );
        assert_eq!(detect_stream(""), None);
        assert_eq!(detect_stream("unknown_FY1920"), None);
    }

    #[test]
    fn test_get_generator() {
        assert_eq!(generator_for(FundingStream::Dsg).stream(), FundingStream::Dsg);
        assert_eq!(generator_for(FundingStream::PeSports).stream(), FundingStream::PeSports);
    }
}
