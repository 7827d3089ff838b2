// 🏛️ Organisation Catalog
// Local authorities, regions and local-government groups for DSG, plus the
// school providers and LA aggregates behind PE and Sport Premium.
//
// LAs and regions are derived from the Summary sheet; the three local-government
// groups have no row and exist only through the membership table below.

use crate::error::{FeedError, Result};
use crate::fixture::{DsgSheet, PeSportsRow, Workbook};
use crate::sanitise::sanitise_name;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::ops::RangeInclusive;

/// Summary sheet rows holding one local authority each
pub const LA_ROWS: RangeInclusive<usize> = 5..=153;

/// Summary sheet rows holding the nine regions
pub const REGION_ROWS: RangeInclusive<usize> = 160..=168;

pub const METROPOLITAN_AUTHORITIES: &str = "METROPOLITAN AUTHORITIES";
pub const UNITARY_AUTHORITIES: &str = "UNITARY AUTHORITIES";
pub const UPPER_TIER_AUTHORITIES: &str = "UPPER TIER AUTHORITIES";

pub const LOCAL_GOVERNMENT_GROUPS: [&str; 3] = [
    METROPOLITAN_AUTHORITIES,
    UNITARY_AUTHORITIES,
    UPPER_TIER_AUTHORITIES,
];

/// Pseudo-UKPRN used wherever a real provider reference number would appear
pub fn mock_ukprn(code: impl Display) -> String {
    format!("MOCKUKPRN{}", code)
}

// ============================================================================
// MEMBERSHIP TABLE
// ============================================================================

/// Closed enumeration: region or group name → member LA codes
static GROUP_MEMBERS: &[(&str, &[u32])] = &[
    (
        "North East",
        &[
            390, 391, 392, 393, 394, 805, 806, 807, 808, 840, 841, 929,
        ],
    ),
    (
        "North West",
        &[
            340, 341, 342, 343, 344, 350, 351, 352, 353, 354, 355, 356, 357, 358, 359, 876,
            877, 888, 889, 890, 895, 896, 909,
        ],
    ),
    (
        "Yorkshire and the Humber",
        &[
            370, 371, 372, 373, 380, 381, 382, 383, 384, 810, 811, 812, 813, 815, 816,
        ],
    ),
    (
        "East Midlands",
        &[
            830, 831, 855, 856, 891, 892, 925, 928,
        ],
    ),
    (
        "West Midlands",
        &[
            330, 331, 332, 333, 334, 335, 336, 860, 861, 884, 885, 893, 894, 937,
        ],
    ),
    (
        "East of England",
        &[
            821, 822, 823, 873, 874, 881, 882, 883, 919, 926, 935,
        ],
    ),
    (
        "London",
        &[
            201, 202, 203, 204, 205, 206, 207, 208, 209, 210, 211, 212, 213, 301, 302, 303,
            304, 305, 306, 307, 308, 309, 310, 311, 312, 313, 314, 315, 316, 317, 318, 319,
            320,
        ],
    ),
    (
        "South East",
        &[
            825, 826, 845, 846, 850, 851, 852, 867, 868, 869, 870, 871, 872, 886, 887, 921,
            931, 936, 938,
        ],
    ),
    (
        "South West",
        &[
            800, 801, 802, 803, 838, 839, 865, 866, 878, 879, 880, 908, 916, 933,
        ],
    ),
    (
        "METROPOLITAN AUTHORITIES",
        &[
            330, 331, 332, 333, 334, 335, 336, 340, 341, 342, 343, 344, 350, 351, 352, 353,
            354, 355, 356, 357, 358, 359, 370, 371, 372, 373, 380, 381, 382, 383, 384, 390,
            391, 392, 393, 394,
        ],
    ),
    (
        "UNITARY AUTHORITIES",
        &[
            800, 801, 802, 803, 805, 806, 807, 808, 810, 811, 812, 813, 816, 821, 822, 823,
            826, 831, 838, 839, 840, 841, 846, 851, 852, 856, 861, 865, 866, 867, 868, 869,
            870, 871, 872, 874, 876, 877, 879, 880, 882, 883, 884, 887, 889, 890, 892, 893,
            894, 895, 896, 908, 921, 929,
        ],
    ),
    (
        "UPPER TIER AUTHORITIES",
        &[
            815, 825, 830, 845, 850, 855, 860, 873, 878, 881, 885, 886, 888, 891, 909, 916,
            919, 925, 926, 928, 931, 933, 935, 936, 937, 938,
        ],
    ),
];

/// Member LA codes of a region or local-government group (case-insensitive)
///
/// The table is closed, so an unknown name is a programming error and fatal.
pub fn member_codes(group_name: &str) -> Result<&'static [u32]> {
    GROUP_MEMBERS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(group_name.trim()))
        .map(|(_, codes)| *codes)
        .ok_or_else(|| FeedError::UnknownOrganisationGroup(group_name.to_string()))
}

// ============================================================================
// ORGANISATIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrganisationKind {
    LocalAuthority,
    Region,
    LocalGovernmentGroup,
}

impl OrganisationKind {
    /// Group type code used in organisation groups and filters
    pub fn group_type_code(&self) -> &'static str {
        match self {
            OrganisationKind::LocalAuthority => "LocalAuthority",
            OrganisationKind::Region => "Region",
            OrganisationKind::LocalGovernmentGroup => "LocalGovernmentGroup",
        }
    }
}

/// One DSG organisation, immutable once the catalog is built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organisation {
    pub code: String,
    pub name: String,
    pub ukprn: Option<String>,
    pub spreadsheet_row: Option<usize>,
    pub kind: OrganisationKind,
}

impl Organisation {
    pub fn local_authority(code: u32, name: &str, row: usize) -> Self {
        Organisation {
            code: code.to_string(),
            name: name.to_string(),
            ukprn: Some(mock_ukprn(code)),
            spreadsheet_row: Some(row),
            kind: OrganisationKind::LocalAuthority,
        }
    }

    pub fn region(code: &str, name: &str, row: usize) -> Self {
        Organisation {
            code: code.to_string(),
            name: name.to_string(),
            ukprn: None,
            spreadsheet_row: Some(row),
            kind: OrganisationKind::Region,
        }
    }

    pub fn local_government_group(name: &str) -> Self {
        Organisation {
            code: sanitise_name(name),
            name: name.to_string(),
            ukprn: None,
            spreadsheet_row: None,
            kind: OrganisationKind::LocalGovernmentGroup,
        }
    }

    /// Identifier embedded in feed ids: UKPRN for LAs, sanitised name otherwise
    pub fn primary_identifier(&self) -> String {
        match (&self.kind, &self.ukprn) {
            (OrganisationKind::LocalAuthority, Some(ukprn)) => ukprn.clone(),
            _ => sanitise_name(&self.name),
        }
    }

    pub fn searchable_name(&self) -> String {
        sanitise_name(&self.name)
    }

    /// Check if a name or code refers to this organisation
    pub fn matches(&self, name_or_code: &str) -> bool {
        let needle = name_or_code.trim();
        self.code.eq_ignore_ascii_case(needle)
            || self.name.eq_ignore_ascii_case(needle)
            || self.searchable_name().eq_ignore_ascii_case(needle)
    }
}

// ============================================================================
// DSG CATALOG
// ============================================================================

/// The three disjoint DSG organisation lists
#[derive(Debug, Clone)]
pub struct OrganisationCatalog {
    local_authorities: Vec<Organisation>,
    regions: Vec<Organisation>,
    groups: Vec<Organisation>,
}

impl OrganisationCatalog {
    /// Derive LAs and regions from the Summary sheet and add the literal groups
    pub fn from_workbook(workbook: &Workbook) -> Result<Self> {
        let summary = workbook.sheet(DsgSheet::Summary);

        let mut local_authorities = Vec::with_capacity(LA_ROWS.count());
        for row in LA_ROWS {
            let code_text = summary.text(row, 0).unwrap_or("");
            let code = code_text.parse::<u32>().map_err(|_| {
                FeedError::InvalidFixture(format!(
                    "LA code in {} row {} is not a number: {:?}",
                    summary.name, row, code_text
                ))
            })?;
            let name = required_text(summary.text(row, 1), &summary.name, row)?;
            local_authorities.push(Organisation::local_authority(code, name, row));
        }

        let mut regions = Vec::with_capacity(REGION_ROWS.count());
        for row in REGION_ROWS {
            let code = required_text(summary.text(row, 0), &summary.name, row)?;
            let name = required_text(summary.text(row, 1), &summary.name, row)?;
            regions.push(Organisation::region(code, name, row));
        }

        let groups = LOCAL_GOVERNMENT_GROUPS
            .iter()
            .map(|name| Organisation::local_government_group(name))
            .collect();

        Ok(OrganisationCatalog {
            local_authorities,
            regions,
            groups,
        })
    }

    pub fn local_authorities(&self) -> &[Organisation] {
        &self.local_authorities
    }

    pub fn regions(&self) -> &[Organisation] {
        &self.regions
    }

    pub fn groups(&self) -> &[Organisation] {
        &self.groups
    }

    /// LAs, then regions, then groups
    pub fn all(&self) -> impl Iterator<Item = &Organisation> {
        self.local_authorities
            .iter()
            .chain(self.regions.iter())
            .chain(self.groups.iter())
    }

    pub fn find(&self, name_or_code: &str) -> Option<&Organisation> {
        self.all().find(|org| org.matches(name_or_code))
    }

    pub fn local_authority_by_code(&self, code: u32) -> Option<&Organisation> {
        let code = code.to_string();
        self.local_authorities.iter().find(|la| la.code == code)
    }

    /// Member LAs of a region or group, in table order
    ///
    /// An LA listed in the membership table but absent from the workbook is a
    /// corrupted fixture.
    pub fn members(&self, group_name: &str) -> Result<Vec<&Organisation>> {
        member_codes(group_name)?
            .iter()
            .map(|code| {
                self.local_authority_by_code(*code).ok_or_else(|| {
                    FeedError::InvalidFixture(format!(
                        "LA {} listed under {} is missing from the workbook",
                        code, group_name
                    ))
                })
            })
            .collect()
    }
}

fn required_text<'a>(text: Option<&'a str>, sheet: &str, row: usize) -> Result<&'a str> {
    match text {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(FeedError::InvalidFixture(format!(
            "missing organisation name or code in {} row {}",
            sheet, row
        ))),
    }
}

// ============================================================================
// PE AND SPORT PREMIUM ORGANISATIONS
// ============================================================================

/// Pseudo-UKPRN of a school: LA number followed by establishment number
pub fn school_ukprn(row: &PeSportsRow) -> String {
    mock_ukprn(format!("{}{}", row.la_no, row.la_establishment_no))
}

/// Summed allocation figures (pence) for a school or a group of schools
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationTotals {
    pub eligible_pupils: i64,
    pub total_allocation: i64,
    pub october_payment: i64,
    pub april_payment: i64,
}

impl AllocationTotals {
    pub fn from_row(row: &PeSportsRow) -> Self {
        AllocationTotals {
            eligible_pupils: row.eligible_pupils,
            total_allocation: row.total_allocation,
            october_payment: row.october_payment,
            april_payment: row.april_payment,
        }
    }

    pub fn add(&mut self, other: &AllocationTotals) {
        self.eligible_pupils += other.eligible_pupils;
        self.total_allocation += other.total_allocation;
        self.october_payment += other.october_payment;
        self.april_payment += other.april_payment;
    }
}

/// Schools of one local authority, paid through that authority
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaAggregate<'a> {
    pub la_no: u32,
    pub la_name: String,
    pub members: Vec<&'a PeSportsRow>,
    pub totals: AllocationTotals,
}

impl LaAggregate<'_> {
    pub fn ukprn(&self) -> String {
        mock_ukprn(self.la_no)
    }
}

/// Group rows by LA number, keeping the order in which LAs first appear
pub fn group_by_la<'a, I>(rows: I) -> Vec<LaAggregate<'a>>
where
    I: IntoIterator<Item = &'a PeSportsRow>,
{
    let mut aggregates: Vec<LaAggregate<'a>> = Vec::new();
    let mut positions: HashMap<u32, usize> = HashMap::new();

    for row in rows {
        let position = *positions.entry(row.la_no).or_insert_with(|| {
            aggregates.push(LaAggregate {
                la_no: row.la_no,
                la_name: row.la_name.clone(),
                members: Vec::new(),
                totals: AllocationTotals::default(),
            });
            aggregates.len() - 1
        });

        let aggregate = &mut aggregates[position];
        aggregate.totals.add(&AllocationTotals::from_row(row));
        aggregate.members.push(row);
    }

    aggregates
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{Fixtures, ProviderCategory};
    use std::collections::HashSet;

    fn catalog() -> OrganisationCatalog {
        let workbook = Workbook::embedded().unwrap();
        OrganisationCatalog::from_workbook(&workbook).unwrap()
    }

    #[test]
    fn test_catalog_sizes() {
        let catalog = catalog();
        assert_eq!(catalog.local_authorities().len(), 149);
        assert_eq!(catalog.regions().len(), 9);
        assert_eq!(catalog.groups().len(), 3);
        assert_eq!(catalog.all().count(), 161);
    }

    #[test]
    fn test_camden_is_row_six() {
        let catalog = catalog();
        let camden = catalog.find("Camden").unwrap();
        assert_eq!(camden.code, "202");
        assert_eq!(camden.spreadsheet_row, Some(6));
        assert_eq!(camden.ukprn.as_deref(), Some("MOCKUKPRN202"));
        assert_eq!(camden.primary_identifier(), "MOCKUKPRN202");
        assert_eq!(camden.kind, OrganisationKind::LocalAuthority);
    }

    #[test]
    fn test_region_and_group_identifiers() {
        let catalog = catalog();
        let region = catalog.find("Yorkshire and the Humber").unwrap();
        assert_eq!(region.kind, OrganisationKind::Region);
        assert_eq!(region.code, "E12000003");
        assert_eq!(region.primary_identifier(), "Yorkshire_and_the_Humber");

        let group = catalog.find(METROPOLITAN_AUTHORITIES).unwrap();
        assert_eq!(group.spreadsheet_row, None);
        assert_eq!(group.primary_identifier(), "METROPOLITAN_AUTHORITIES");
    }

    #[test]
    fn test_lists_are_disjoint() {
        let catalog = catalog();
        let ids: HashSet<String> = catalog.all().map(|org| org.primary_identifier()).collect();
        assert_eq!(ids.len(), catalog.all().count());
    }

    #[test]
    fn test_every_la_belongs_to_exactly_one_region() {
        let catalog = catalog();
        let mut seen = HashSet::new();
        for region in catalog.regions() {
            for member in catalog.members(&region.name).unwrap() {
                assert!(seen.insert(member.code.clone()), "{} in two regions", member.name);
            }
        }
        assert_eq!(seen.len(), catalog.local_authorities().len());
    }

    #[test]
    fn test_group_membership() {
        let catalog = catalog();
        let metropolitan = catalog.members("metropolitan authorities").unwrap();
        assert_eq!(metropolitan.len(), 36);
        assert!(metropolitan.iter().any(|la| la.name == "Birmingham"));
        assert_eq!(catalog.members(UPPER_TIER_AUTHORITIES).unwrap().len(), 26);
    }

    #[test]
    fn test_unknown_group_is_fatal() {
        let err = member_codes("Atlantis").unwrap_err();
        assert!(matches!(err, FeedError::UnknownOrganisationGroup(name) if name == "Atlantis"));
    }

    #[test]
    fn test_group_by_la_sums_members() {
        let fixtures = Fixtures::embedded().unwrap();
        let aggregates =
            group_by_la(fixtures.pesports_rows(ProviderCategory::MaintainedSchool));

        let camden = aggregates.iter().find(|agg| agg.la_no == 202).unwrap();
        assert_eq!(camden.ukprn(), "MOCKUKPRN202");
        assert_eq!(camden.members.len(), 5);
        let expected: i64 = camden.members.iter().map(|row| row.total_allocation).sum();
        assert_eq!(camden.totals.total_allocation, expected);

        // First-seen order follows the CSV; Bristol lines split on the quoted comma
        let codes: Vec<u32> = aggregates.iter().map(|agg| agg.la_no).collect();
        assert_eq!(codes, vec![202, 203, 204, 330, 909]);
    }

    #[test]
    fn test_school_ukprn() {
        let fixtures = Fixtures::embedded().unwrap();
        let first = fixtures.pesports_rows(ProviderCategory::MaintainedSchool).next().unwrap();
        assert_eq!(school_ukprn(first), "MOCKUKPRN2022000");
    }
}
