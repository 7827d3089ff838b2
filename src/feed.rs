// 📰 Feed Filter / Paginator
// Regenerates every stream, applies the caller's filters and cuts an Atom page.
//
// Page numbering is inverted: page 1 holds the newest entries and is the
// "last" link; the highest page number holds the oldest and is "first".

use crate::config::FeedConfig;
use crate::error::{FeedError, Result};
use crate::fixture::Fixtures;
use crate::funding::{generator_for, FundingStream, GroupedFunding, ProviderRef};
use crate::models::{Author, FeedContent, FeedEntry, FeedResponse, Funding, FundingStatus, Link};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tracing::{debug, warn};

pub const FEED_TITLE: &str = "Calculate Funding Service Funding Feed";
pub const FEED_RIGHTS: &str = "Copyright (C) 2019 Department for Education";
pub const AUTHOR_NAME: &str = "Education and Skills Funding Agency";
pub const AUTHOR_EMAIL: &str = "mock-funding-feed@education.gov.uk";

// ============================================================================
// FILTERS
// ============================================================================

/// Query parameters of `/api/feed`; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedFilters {
    pub page_size: Option<usize>,
    pub funding_period_start_year: Option<i32>,
    pub funding_period_end_year: Option<i32>,
    pub funding_period_codes: Vec<String>,
    pub organisation_group_identifiers: Vec<String>,
    pub organisation_group_types: Vec<String>,
    pub organisation_identifiers: Vec<String>,
    pub organisation_types: Vec<String>,
    pub variation_reasons: Vec<String>,
    pub ukprns: Vec<String>,
    pub grouping_reasons: Vec<String>,
    pub statuses: Vec<String>,
    pub min_status_change_date: Option<DateTime<Utc>>,
    pub funding_stream_codes: Vec<String>,
    /// Parsed for compatibility; never applied to the funding tree
    pub funding_line_types: Vec<String>,
    /// Parsed for compatibility; never applied to the funding tree
    pub template_line_ids: Vec<u32>,
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse::<T>().map_err(|_| FeedError::InvalidQuery {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// RFC 3339 timestamp or a plain date (midnight UTC)
fn parse_timestamp(key: &str, value: &str) -> Result<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| FeedError::InvalidQuery {
            key: key.to_string(),
            value: value.to_string(),
        })
}

fn contains_ignore_case(values: &[String], needle: &str) -> bool {
    values.iter().any(|value| value.eq_ignore_ascii_case(needle))
}

impl FeedFilters {
    /// Build filters from raw query pairs
    ///
    /// Keys are case-insensitive, may carry a `[]` suffix and may repeat.
    /// Unknown keys are ignored; a malformed number or date is an error.
    ///
    /// # Examples:
    /// ```
    /// use funding_feed_mock::feed::FeedFilters;
    /// let filters = FeedFilters::from_pairs([
    ///     ("fundingStreamCodes[]", "DSG"),
    ///     ("fundingPeriodStartYear", "2019"),
    /// ]).unwrap();
    /// assert_eq!(filters.funding_stream_codes, vec!["DSG".to_string()]);
    /// assert_eq!(filters.funding_period_start_year, Some(2019));
    /// ```
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filters = FeedFilters::default();

        for (key, value) in pairs {
            let key = key.as_ref();
            let value = value.as_ref();
            let name = key.trim_end_matches("[]").to_ascii_lowercase();
            if value.trim().is_empty() {
                continue;
            }
            let text = value.trim().to_string();

            match name.as_str() {
                "pagesize" => filters.page_size = Some(parse_value(key, value)?),
                "fundingperiodstartyear" => {
                    filters.funding_period_start_year = Some(parse_value(key, value)?)
                }
                "fundingperiodendyear" => {
                    filters.funding_period_end_year = Some(parse_value(key, value)?)
                }
                "fundingperiodcodes" => filters.funding_period_codes.push(text),
                "organisationgroupidentifiers" => filters.organisation_group_identifiers.push(text),
                "organisationgrouptypes" => filters.organisation_group_types.push(text),
                "organisationidentifiers" => filters.organisation_identifiers.push(text),
                "organisationtypes" => filters.organisation_types.push(text),
                "variationreasons" => filters.variation_reasons.push(text),
                "ukprns" => filters.ukprns.push(text),
                "groupingreasons" => filters.grouping_reasons.push(text),
                "statuses" => filters.statuses.push(text),
                "minstatuschangedate" => {
                    filters.min_status_change_date = Some(parse_timestamp(key, value)?)
                }
                "fundingstreamcodes" => filters.funding_stream_codes.push(text),
                "fundinglinetypes" => filters.funding_line_types.push(text),
                "templatelineids" => filters.template_line_ids.push(parse_value(key, value)?),
                _ => debug!(key, "ignoring unknown feed parameter"),
            }
        }

        Ok(filters)
    }

    /// Re-encode the filters as a query string (no leading `?`)
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();

        let mut push_all = |key: &'static str, values: &[String]| {
            for value in values {
                pairs.push((key, value.clone()));
            }
        };
        push_all("fundingPeriodCodes", &self.funding_period_codes);
        push_all("organisationGroupIdentifiers", &self.organisation_group_identifiers);
        push_all("organisationGroupTypes", &self.organisation_group_types);
        push_all("organisationIdentifiers", &self.organisation_identifiers);
        push_all("organisationTypes", &self.organisation_types);
        push_all("variationReasons", &self.variation_reasons);
        push_all("ukprns", &self.ukprns);
        push_all("groupingReasons", &self.grouping_reasons);
        push_all("statuses", &self.statuses);
        push_all("fundingStreamCodes", &self.funding_stream_codes);
        push_all("fundingLineTypes", &self.funding_line_types);

        if let Some(size) = self.page_size {
            pairs.push(("pageSize", size.to_string()));
        }
        if let Some(year) = self.funding_period_start_year {
            pairs.push(("fundingPeriodStartYear", year.to_string()));
        }
        if let Some(year) = self.funding_period_end_year {
            pairs.push(("fundingPeriodEndYear", year.to_string()));
        }
        if let Some(date) = self.min_status_change_date {
            pairs.push(("minStatusChangeDate", date.to_rfc3339()));
        }
        for id in &self.template_line_ids {
            pairs.push(("templateLineIds", id.to_string()));
        }

        pairs
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Stream-level filters: a mismatch empties the whole stream
    pub fn includes_stream(&self, stream: FundingStream) -> bool {
        let period = stream.period();

        if !self.funding_stream_codes.is_empty()
            && !contains_ignore_case(&self.funding_stream_codes, stream.code())
        {
            return false;
        }
        if self.funding_period_start_year.is_some_and(|year| year != period.start_year()) {
            return false;
        }
        if self.funding_period_end_year.is_some_and(|year| year != period.end_year()) {
            return false;
        }
        if !self.funding_period_codes.is_empty()
            && !contains_ignore_case(&self.funding_period_codes, &period.code)
        {
            return false;
        }
        if !self.statuses.is_empty()
            && !contains_ignore_case(&self.statuses, FundingStatus::Released.as_str())
        {
            return false;
        }
        if self
            .min_status_change_date
            .is_some_and(|date| date > stream.status_changed_date())
        {
            return false;
        }
        true
    }

    fn has_provider_filters(&self) -> bool {
        !self.ukprns.is_empty()
            || !self.organisation_identifiers.is_empty()
            || !self.organisation_types.is_empty()
    }

    fn matches_provider(&self, provider: &ProviderRef) -> bool {
        let ukprn_ok = self.ukprns.is_empty() || contains_ignore_case(&self.ukprns, &provider.ukprn);
        let identifier_ok = self.organisation_identifiers.is_empty()
            || provider
                .identifiers
                .iter()
                .any(|id| contains_ignore_case(&self.organisation_identifiers, &id.value));
        let type_ok = self.organisation_types.is_empty()
            || contains_ignore_case(&self.organisation_types, &provider.provider_type);
        ukprn_ok && identifier_ok && type_ok
    }

    /// The group itself is named by a ukprn or organisation identifier filter
    fn matches_group_identity(&self, funding: &Funding) -> bool {
        let group = &funding.organisation_group;
        let wanted = self.ukprns.iter().chain(self.organisation_identifiers.iter());
        let mut values = std::iter::once(&group.identifier_value)
            .chain(group.identifiers.iter().map(|id| &id.value));
        let names: Vec<&String> = wanted.collect();
        values.any(|value| names.iter().any(|name| name.eq_ignore_ascii_case(value)))
    }

    /// Per-entry filters; narrows the child provider fundings
    pub fn apply(&self, grouped: GroupedFunding) -> Option<Funding> {
        let GroupedFunding {
            mut funding,
            providers,
        } = grouped;
        let group = &funding.organisation_group;

        if !self.organisation_group_types.is_empty()
            && !contains_ignore_case(&self.organisation_group_types, &group.group_type_code)
        {
            return None;
        }
        if !self.grouping_reasons.is_empty()
            && !contains_ignore_case(&self.grouping_reasons, funding.grouping_reason.as_str())
        {
            return None;
        }
        if !self.organisation_group_identifiers.is_empty() {
            let matched = std::iter::once(&group.identifier_value)
                .chain(group.identifiers.iter().map(|id| &id.value))
                .any(|value| contains_ignore_case(&self.organisation_group_identifiers, value));
            if !matched {
                return None;
            }
        }

        if self.has_provider_filters() {
            let narrowed: Vec<String> = providers
                .iter()
                .filter(|provider| self.matches_provider(provider))
                .map(|provider| provider.funding_id.clone())
                .collect();

            if narrowed.is_empty() {
                if !self.matches_group_identity(&funding) {
                    return None;
                }
            } else {
                funding.provider_fundings = narrowed;
            }
        }

        if !self.variation_reasons.is_empty() {
            funding.provider_fundings.clear();
        }

        Some(funding)
    }
}

// ============================================================================
// GENERATION
// ============================================================================

/// Every feed record matching the filters, DSG first, in feed order
pub fn generate_feed(fixtures: &Fixtures, filters: &FeedFilters) -> Result<Vec<Funding>> {
    if !filters.funding_line_types.is_empty() || !filters.template_line_ids.is_empty() {
        warn!(
            funding_line_types = ?filters.funding_line_types,
            template_line_ids = ?filters.template_line_ids,
            "funding line filters are not applied to funding trees"
        );
    }

    let mut fundings = Vec::new();
    for stream in FundingStream::ALL {
        if !filters.includes_stream(stream) {
            debug!(stream = stream.code(), "stream excluded by filters");
            continue;
        }

        let generated = generator_for(stream).fundings(fixtures)?;
        let before = generated.len();
        fundings.extend(generated.into_iter().filter_map(|grouped| filters.apply(grouped)));
        debug!(stream = stream.code(), before, after = fundings.len(), "filtered stream");
    }

    Ok(fundings)
}

// ============================================================================
// PAGINATION
// ============================================================================

/// max(1, ceil(total / page_size))
pub fn page_count(total: usize, page_size: usize) -> usize {
    let size = page_size.max(1);
    total.div_ceil(size).max(1)
}

/// Reverse, skip `(page - 1) * size`, take `size`, reverse back
///
/// Pages outside `1..=page_count` are empty.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Vec<T> {
    let size = page_size.max(1);
    if page == 0 || page > page_count(items.len(), size) {
        return Vec::new();
    }

    let mut page_items: Vec<T> = items
        .into_iter()
        .rev()
        .skip((page - 1) * size)
        .take(size)
        .collect();
    page_items.reverse();
    page_items
}

fn page_link(config: &FeedConfig, page: usize, query: &str, rel: &str) -> Link {
    let mut href = config.feed_page_url(page);
    if !query.is_empty() {
        href.push('?');
        href.push_str(query);
    }
    Link::new(href, rel)
}

pub fn feed_entry(config: &FeedConfig, funding: Funding) -> FeedEntry {
    FeedEntry {
        id: funding.id.clone(),
        title: funding.id.clone(),
        summary: format!(
            "{} {} funding for {}",
            funding.funding_stream.name, funding.funding_period.code, funding.organisation_group.name
        ),
        author: author(),
        updated: funding.status_changed_date,
        link: vec![Link::new(config.by_id_url(&funding.id), "Funding")],
        content: FeedContent { funding },
    }
}

fn author() -> Author {
    Author {
        name: AUTHOR_NAME.to_string(),
        email: AUTHOR_EMAIL.to_string(),
    }
}

/// One Atom page; `page_ref` defaults to the newest page (page 1 holds the
/// newest entries, so the default is the highest page number)
pub fn get_page(
    fixtures: &Fixtures,
    filters: &FeedFilters,
    page_ref: Option<usize>,
    config: &FeedConfig,
) -> Result<FeedResponse> {
    let page_size = filters.page_size.unwrap_or(config.default_page_size).max(1);
    let fundings = generate_feed(fixtures, filters)?;
    let total = fundings.len();
    let pages = page_count(total, page_size);
    let page = page_ref.unwrap_or(pages);

    let entries: Vec<FeedEntry> = paginate(fundings, page, page_size)
        .into_iter()
        .map(|funding| feed_entry(config, funding))
        .collect();

    let query = filters.to_query_string();
    let mut link = vec![
        page_link(config, page, &query, "self"),
        page_link(config, pages, &query, "first"),
        page_link(config, 1, &query, "last"),
    ];
    if (1..=pages).contains(&page) {
        if page > 1 {
            link.push(page_link(config, page - 1, &query, "next"));
        }
        if page < pages {
            link.push(page_link(config, page + 1, &query, "previous"));
        }
    }

    let updated = entries
        .iter()
        .map(|entry| entry.updated)
        .max()
        .or_else(|| FundingStream::ALL.iter().map(|s| s.status_changed_date()).max())
        .unwrap_or_default();

    debug!(total, page, pages, page_size, entries = entries.len(), "built feed page");

    Ok(FeedResponse {
        id: config.feed_url(),
        title: FEED_TITLE.to_string(),
        author: author(),
        updated,
        rights: FEED_RIGHTS.to_string(),
        link,
        atom_entry: entries,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> Fixtures {
        Fixtures::embedded().unwrap()
    }

    fn ids(fundings: &[Funding]) -> Vec<String> {
        fundings.iter().map(|f| f.id.clone()).collect()
    }

    #[test]
    fn test_parse_pairs() {
        let filters = FeedFilters::from_pairs([
            ("pageSize", "10"),
            ("statuses[]", "Released"),
            ("statuses[]", "Approved"),
            ("MINSTATUSCHANGEDATE", "2019-03-01"),
            ("templateLineIds", "3"),
            ("somethingElse", "x"),
            ("ukprns", ""),
        ])
        .unwrap();

        assert_eq!(filters.page_size, Some(10));
        assert_eq!(filters.statuses.len(), 2);
        assert_eq!(
            filters.min_status_change_date.unwrap().to_rfc3339(),
            "2019-03-01T00:00:00+00:00"
        );
        assert_eq!(filters.template_line_ids, vec![3]);
        assert!(filters.ukprns.is_empty());
    }

    #[test]
    fn test_parse_rejects_bad_numbers() {
        let err = FeedFilters::from_pairs([("fundingPeriodStartYear", "twenty")]).unwrap_err();
        assert!(err.is_client_error());
        assert!(FeedFilters::from_pairs([("minStatusChangeDate", "yesterday")]).is_err());
    }

    #[test]
    fn test_query_string_round_trip() {
        let filters = FeedFilters::from_pairs([
            ("organisationGroupIdentifiers", "Bristol, City of"),
            ("fundingStreamCodes", "DSG"),
            ("pageSize", "5"),
        ])
        .unwrap();
        let query = filters.to_query_string();
        assert!(query.contains("organisationGroupIdentifiers=Bristol%2C%20City%20of"));

        let pairs: Vec<(String, String)> = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| (k.to_string(), urlencoding::decode(v).unwrap().into_owned()))
            .collect();
        assert_eq!(FeedFilters::from_pairs(pairs).unwrap(), filters);
        assert_eq!(FeedFilters::default().to_query_string(), "");
    }

    #[test]
    fn test_unfiltered_feed_order() {
        let fundings = generate_feed(&fixtures(), &FeedFilters::default()).unwrap();
        assert_eq!(fundings.len(), 161 + 16);
        assert_eq!(fundings[0].funding_stream.code, "DSG");
        assert_eq!(fundings[161].funding_stream.code, "PESports");
    }

    #[test]
    fn test_financial_year_filter() {
        let filters = FeedFilters::from_pairs([
            ("fundingPeriodStartYear", "2019"),
            ("fundingPeriodEndYear", "2020"),
            ("fundingStreamCodes[]", "DSG"),
        ])
        .unwrap();
        let fundings = generate_feed(&fixtures(), &filters).unwrap();
        assert!(!fundings.is_empty());
        assert!(fundings.iter().all(|f| f.funding_period.code == "FY1920"));
    }

    #[test]
    fn test_stream_level_exclusions() {
        let fixtures = fixtures();
        let approved = FeedFilters::from_pairs([("statuses", "Approved"), ("fundingStreamCodes", "DSG")])
            .unwrap();
        assert!(generate_feed(&fixtures, &approved).unwrap().is_empty());

        let late = FeedFilters::from_pairs([("minStatusChangeDate", "2019-06-01T00:00:00Z")]).unwrap();
        let fundings = generate_feed(&fixtures, &late).unwrap();
        assert!(fundings.iter().all(|f| f.funding_stream.code == "PESports"));
        assert_eq!(fundings.len(), 16);

        let wrong_period = FeedFilters::from_pairs([("fundingPeriodCodes", "FY2021")]).unwrap();
        assert!(generate_feed(&fixtures, &wrong_period).unwrap().is_empty());
    }

    #[test]
    fn test_group_type_and_reason_filters() {
        let fixtures = fixtures();
        let regions = FeedFilters::from_pairs([("organisationGroupTypes", "region")]).unwrap();
        assert_eq!(generate_feed(&fixtures, &regions).unwrap().len(), 9);

        let information = FeedFilters::from_pairs([("groupingReasons", "Information")]).unwrap();
        assert_eq!(generate_feed(&fixtures, &information).unwrap().len(), 12);

        let named = FeedFilters::from_pairs([("organisationGroupIdentifiers", "E12000007")]).unwrap();
        let fundings = generate_feed(&fixtures, &named).unwrap();
        assert_eq!(ids(&fundings), vec!["DSG_FY1920_London_1.0"]);
    }

    #[test]
    fn test_ukprn_filter_narrows_children() {
        let filters = FeedFilters::from_pairs([("ukprns", "MOCKUKPRN202")]).unwrap();
        let fundings = generate_feed(&fixtures(), &filters).unwrap();

        // Camden LA, London region, and the PE sport Camden aggregate by identity
        let found = ids(&fundings);
        assert!(found.contains(&"DSG_FY1920_MOCKUKPRN202_1.0".to_string()));
        assert!(found.contains(&"DSG_FY1920_London_1.0".to_string()));
        assert!(found.contains(&"PESports_AY1920_MOCKUKPRN202_1.0".to_string()));

        let london = fundings.iter().find(|f| f.id == "DSG_FY1920_London_1.0").unwrap();
        assert_eq!(london.provider_fundings, vec!["DSG_FY1920_MOCKUKPRN202_1.0".to_string()]);
    }

    #[test]
    fn test_organisation_identifier_matches_laestab() {
        let filters = FeedFilters::from_pairs([
            ("fundingStreamCodes", "PESports"),
            ("organisationIdentifiers", "2022000"),
        ])
        .unwrap();
        let fundings = generate_feed(&fixtures(), &filters).unwrap();

        assert_eq!(ids(&fundings), vec!["PESports_AY1920_MOCKUKPRN202_1.0"]);
        assert_eq!(
            fundings[0].provider_fundings,
            vec!["PESports_AY1920_MOCKUKPRN2022000_1.0".to_string()]
        );
    }

    #[test]
    fn test_organisation_identifier_matches_la_code() {
        let filters = FeedFilters::from_pairs([
            ("fundingStreamCodes", "DSG"),
            ("organisationIdentifiers", "202"),
        ])
        .unwrap();
        let fundings = generate_feed(&fixtures(), &filters).unwrap();

        let camden = fundings
            .iter()
            .find(|f| f.id == "DSG_FY1920_MOCKUKPRN202_1.0")
            .unwrap();
        assert_eq!(camden.provider_fundings, vec!["DSG_FY1920_MOCKUKPRN202_1.0".to_string()]);
        assert!(fundings.iter().all(|f| f.id != "DSG_FY1920_MOCKUKPRN201_1.0"));
    }

    #[test]
    fn test_organisation_identifier_matches_group_identity() {
        let filters = FeedFilters::from_pairs([
            ("fundingStreamCodes", "DSG"),
            ("organisationIdentifiers", "E12000007"),
        ])
        .unwrap();
        let fundings = generate_feed(&fixtures(), &filters).unwrap();

        // No LA carries the region code, so London is kept whole
        assert_eq!(ids(&fundings), vec!["DSG_FY1920_London_1.0"]);
        assert!(fundings[0].provider_fundings.len() > 1);
    }

    #[test]
    fn test_organisation_type_filter() {
        let filters = FeedFilters::from_pairs([
            ("fundingStreamCodes", "PESports"),
            ("organisationTypes", "Academy"),
        ])
        .unwrap();
        let fundings = generate_feed(&fixtures(), &filters).unwrap();
        assert_eq!(fundings.len(), 11);
        assert!(fundings
            .iter()
            .all(|f| f.organisation_group.group_type_code == "Provider"));
    }

    #[test]
    fn test_variation_reasons_clear_children() {
        let filters = FeedFilters::from_pairs([("variationReasons", "NameFieldUpdated")]).unwrap();
        let fundings = generate_feed(&fixtures(), &filters).unwrap();
        assert_eq!(fundings.len(), 177);
        assert!(fundings.iter().all(|f| f.provider_fundings.is_empty()));
    }

    #[test]
    fn test_paginate_helper() {
        let items: Vec<u32> = (1..=7).collect();
        assert_eq!(page_count(7, 3), 3);
        assert_eq!(page_count(0, 3), 1);
        assert_eq!(paginate(items.clone(), 1, 3), vec![5, 6, 7]);
        assert_eq!(paginate(items.clone(), 2, 3), vec![2, 3, 4]);
        assert_eq!(paginate(items.clone(), 3, 3), vec![1]);
        assert!(paginate(items.clone(), 4, 3).is_empty());
        assert!(paginate(items, 0, 3).is_empty());
    }

    #[test]
    fn test_pages_concatenate_to_full_feed() {
        let fixtures = fixtures();
        let config = FeedConfig::default();
        let filters = FeedFilters {
            page_size: Some(20),
            ..FeedFilters::default()
        };
        let full = ids(&generate_feed(&fixtures, &filters).unwrap());
        let pages = page_count(full.len(), 20);

        let mut concatenated = Vec::new();
        for page in (1..=pages).rev() {
            let response = get_page(&fixtures, &filters, Some(page), &config).unwrap();
            concatenated.extend(response.atom_entry.into_iter().map(|e| e.id));
        }
        assert_eq!(concatenated, full);
    }

    #[test]
    fn test_default_page_and_links() {
        let fixtures = fixtures();
        let config = FeedConfig::new("http://mock.test", 50);
        let filters = FeedFilters::from_pairs([("fundingStreamCodes", "DSG")]).unwrap();

        // 161 entries → 4 pages; default is page 4 (the oldest entries)
        let response = get_page(&fixtures, &filters, None, &config).unwrap();
        assert_eq!(response.atom_entry.len(), 11);
        assert_eq!(response.atom_entry[0].id, "DSG_FY1920_MOCKUKPRN201_1.0");

        let query = "?fundingStreamCodes=DSG";
        assert_eq!(
            response.link("self").unwrap().href,
            format!("http://mock.test/api/feed/4{}", query)
        );
        assert_eq!(
            response.link("first").unwrap().href,
            format!("http://mock.test/api/feed/4{}", query)
        );
        assert_eq!(
            response.link("last").unwrap().href,
            format!("http://mock.test/api/feed/1{}", query)
        );
        assert_eq!(
            response.link("next").unwrap().href,
            format!("http://mock.test/api/feed/3{}", query)
        );
        assert!(response.link("previous").is_none());

        let newest = get_page(&fixtures, &filters, Some(1), &config).unwrap();
        assert_eq!(newest.atom_entry.len(), 50);
        assert!(newest.link("next").is_none());
        assert_eq!(
            newest.link("previous").unwrap().href,
            format!("http://mock.test/api/feed/2{}", query)
        );
    }

    #[test]
    fn test_out_of_range_page_is_empty() {
        let response = get_page(&fixtures(), &FeedFilters::default(), Some(99), &FeedConfig::default())
            .unwrap();
        assert!(response.atom_entry.is_empty());
        assert!(response.link("self").unwrap().href.ends_with("/api/feed/99"));
        assert!(response.link("next").is_none());
        assert!(response.link("previous").is_none());

        let zero = get_page(&fixtures(), &FeedFilters::default(), Some(0), &FeedConfig::default())
            .unwrap();
        assert!(zero.atom_entry.is_empty());
        assert!(zero.link("next").is_none());
        assert!(zero.link("previous").is_none());
        assert!(zero.link("first").is_some());
    }

    #[test]
    fn test_empty_feed_has_one_page() {
        let filters = FeedFilters::from_pairs([("statuses", "Approved")]).unwrap();
        let response = get_page(&fixtures(), &filters, None, &FeedConfig::default()).unwrap();
        assert!(response.atom_entry.is_empty());
        assert!(response.link("first").unwrap().href.contains("/api/feed/1?"));
    }
}
