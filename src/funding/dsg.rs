// 🏫 Dedicated Schools Grant
// Funding trees read from fixed cell coordinates of the allocations workbook.
//
// LAs and regions read their own Summary row (and the same row of every
// block sheet); local-government groups have no row and aggregate their
// member LAs positionally.

use super::template::{
    aggregate_funding_lines, build_funding_lines, template_lines, CalcSpec, CellSource, Formula,
    LineSpec, PeriodSpec, RefSpec, NOT_IN_FIXTURE,
};
use super::{provider_funding, FundingStream, GroupedFunding, ProviderRef, StreamGenerator};
use crate::catalog::{Organisation, OrganisationCatalog, OrganisationKind};
use crate::error::{FeedError, Result};
use crate::fixture::{CellMode, DsgSheet, Fixtures, Workbook};
use crate::models::{
    AggregationType, CalculationType, FundingLineType, FundingValue, GroupingReason,
    LogicalModel, OrganisationGroup, OrganisationIdentifier, Provider, ProviderFunding,
    ValueFormat,
};
use std::collections::HashMap;
use tracing::debug;

pub const LOCAL_AUTHORITY_PROVIDER_TYPE: &str = "Local Authority";

// ============================================================================
// CELL ADDRESSING
// ============================================================================

/// Column of a sheet plus the decoding rule; the row comes from the organisation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DsgCell {
    pub sheet: DsgSheet,
    pub col: usize,
    pub mode: CellMode,
}

/// One organisation's row across every sheet of the workbook
#[derive(Debug, Clone, Copy)]
pub struct DsgRow<'a> {
    pub workbook: &'a Workbook,
    pub row: usize,
}

impl CellSource for DsgRow<'_> {
    type Cell = DsgCell;

    fn read(&self, cell: DsgCell) -> Result<i64> {
        self.workbook.cell(cell.sheet, self.row, cell.col, cell.mode)
    }
}

macro_rules! cell {
    ($sheet:ident, $col:expr, $mode:ident) => {
        Formula::Cell(DsgCell {
            sheet: DsgSheet::$sheet,
            col: $col,
            mode: CellMode::$mode,
        })
    };
}

macro_rules! calc {
    ($name:expr, $kind:ident, $value:expr, $format:ident, $text:expr, $agg:ident) => {
        calc!($name, $kind, $value, $format, $text, $agg, &[], &[])
    };
    ($name:expr, $kind:ident, $value:expr, $format:ident, $text:expr, $agg:ident, $refs:expr) => {
        calc!($name, $kind, $value, $format, $text, $agg, $refs, &[])
    };
    ($name:expr, $kind:ident, $value:expr, $format:ident, $text:expr, $agg:ident, $refs:expr, $nested:expr) => {
        CalcSpec {
            name: $name,
            calculation_type: CalculationType::$kind,
            value: $value,
            format: ValueFormat::$format,
            formula_text: $text,
            aggregation: AggregationType::$agg,
            reference_data: $refs,
            calculations: $nested,
        }
    };
}

macro_rules! reference {
    ($name:expr, $value:expr, $format:ident, $agg:ident) => {
        RefSpec {
            name: $name,
            value: $value,
            format: ValueFormat::$format,
            aggregation: AggregationType::$agg,
        }
    };
}

/// Whole-year payment profiled in April 2019
const FY1920_DISTRIBUTION: &[PeriodSpec<DsgCell>] = &[PeriodSpec {
    code: "FY1920",
    month: "April",
    year: 2019,
    value: None,
}];

/// High needs import/export rate per net imported pupil, in pence
const IMPORT_EXPORT_RATE: i64 = 600_000;

// ============================================================================
// TEMPLATE
// ============================================================================

/// Total DSG after deductions
pub static DSG_TOTAL: Formula<DsgCell> = cell!(Summary, 11, MillionsToPence);

pub static DSG_LINES: &[LineSpec<DsgCell>] = &[
    LineSpec {
        name: "Total DSG before deductions",
        line_type: FundingLineType::Aggregate,
        value: cell!(Summary, 6, MillionsToPence),
        distribution: &[],
        calculations: &[],
        children: &[
            LineSpec {
                name: "Schools Block",
                line_type: FundingLineType::Information,
                value: cell!(Summary, 2, MillionsToPence),
                distribution: &[],
                calculations: &[
                    calc!(
                        "Primary unit of funding",
                        Rate,
                        cell!(SchoolsBlock, 4, PoundsToPence),
                        Currency,
                        "Primary unit of funding",
                        Average,
                        &[reference!(
                            "Primary pupil numbers",
                            cell!(SchoolsBlock, 2, Integer),
                            Number,
                            Sum
                        )]
                    ),
                    calc!(
                        "Secondary unit of funding",
                        Rate,
                        cell!(SchoolsBlock, 5, PoundsToPence),
                        Currency,
                        "Secondary unit of funding",
                        Average,
                        &[reference!(
                            "Secondary pupil numbers",
                            cell!(SchoolsBlock, 3, Integer),
                            Number,
                            Sum
                        )]
                    ),
                    calc!(
                        "Primary and secondary funding",
                        Cash,
                        Formula::Sum(&[
                            cell!(SchoolsBlock, 6, MillionsToPence),
                            cell!(SchoolsBlock, 7, MillionsToPence),
                        ]),
                        Currency,
                        "Primary funding + Secondary funding",
                        Sum,
                        &[],
                        &[
                            calc!(
                                "Primary funding",
                                Cash,
                                cell!(SchoolsBlock, 6, MillionsToPence),
                                Currency,
                                "Primary pupil numbers × Primary unit of funding",
                                Sum
                            ),
                            calc!(
                                "Secondary funding",
                                Cash,
                                cell!(SchoolsBlock, 7, MillionsToPence),
                                Currency,
                                "Secondary pupil numbers × Secondary unit of funding",
                                Sum
                            ),
                        ]
                    ),
                    calc!(
                        "Premises funding",
                        Cash,
                        cell!(SchoolsBlock, 8, MillionsToPence),
                        Currency,
                        "Premises funding",
                        Sum
                    ),
                    calc!(
                        "Growth funding",
                        Cash,
                        cell!(SchoolsBlock, 9, MillionsToPence),
                        Currency,
                        "Growth funding",
                        Sum,
                        &[reference!(
                            "Growth factor",
                            Formula::Literal(NOT_IN_FIXTURE),
                            Number,
                            None
                        )]
                    ),
                    calc!(
                        "Mobility funding",
                        Cash,
                        cell!(SchoolsBlock, 10, MillionsToPence),
                        Currency,
                        "Mobility funding",
                        Sum
                    ),
                ],
                children: &[LineSpec {
                    name: "Schools Block after academy recoupment",
                    line_type: FundingLineType::Payment,
                    value: cell!(Summary, 10, MillionsToPence),
                    distribution: FY1920_DISTRIBUTION,
                    calculations: &[calc!(
                        "Academy recoupment",
                        Cash,
                        cell!(Summary, 7, MillionsToPence),
                        Currency,
                        "Academy recoupment",
                        Sum,
                        &[reference!(
                            "Number of academies",
                            Formula::Literal(NOT_IN_FIXTURE),
                            Number,
                            None
                        )]
                    )],
                    children: &[],
                }],
            },
            LineSpec {
                name: "Central School Services Block",
                line_type: FundingLineType::Payment,
                value: cell!(Summary, 3, MillionsToPence),
                distribution: FY1920_DISTRIBUTION,
                calculations: &[
                    calc!(
                        "CSSB per-pupil rate",
                        Rate,
                        cell!(CentralServices, 3, PoundsToPence),
                        Currency,
                        "CSSB per-pupil rate",
                        Average,
                        &[reference!(
                            "CSSB pupil numbers",
                            cell!(CentralServices, 2, Integer),
                            Number,
                            Sum
                        )]
                    ),
                    calc!(
                        "Ongoing responsibilities",
                        Cash,
                        cell!(CentralServices, 4, MillionsToPence),
                        Currency,
                        "CSSB pupil numbers × CSSB per-pupil rate",
                        Sum
                    ),
                    calc!(
                        "Historic commitments",
                        Cash,
                        cell!(CentralServices, 5, MillionsToPence),
                        Currency,
                        "Historic commitments",
                        Sum
                    ),
                ],
                children: &[],
            },
            LineSpec {
                name: "High Needs Block",
                line_type: FundingLineType::Information,
                value: cell!(Summary, 4, MillionsToPence),
                distribution: &[],
                calculations: &[
                    calc!(
                        "Historic spend baseline",
                        Cash,
                        cell!(HighNeeds, 3, MillionsToPence),
                        Currency,
                        "Historic spend baseline",
                        Sum
                    ),
                    calc!(
                        "Formula factors",
                        Cash,
                        cell!(HighNeeds, 4, MillionsToPence),
                        Currency,
                        "Formula factors",
                        Sum,
                        &[reference!(
                            "Population aged 2-18",
                            cell!(HighNeeds, 2, Integer),
                            Number,
                            Sum
                        )]
                    ),
                    calc!(
                        "Import/export adjustment",
                        Cash,
                        Formula::Product(&[
                            cell!(HighNeeds, 5, Integer),
                            Formula::Literal(IMPORT_EXPORT_RATE),
                        ]),
                        Currency,
                        "Net import/export × Import/export rate",
                        Sum,
                        &[
                            reference!(
                                "Net import/export",
                                cell!(HighNeeds, 5, Integer),
                                Number,
                                Sum
                            ),
                            reference!(
                                "Import/export rate",
                                Formula::Literal(IMPORT_EXPORT_RATE),
                                Currency,
                                Average
                            ),
                        ]
                    ),
                    calc!(
                        "Additional high needs funding",
                        Cash,
                        cell!(HighNeeds, 7, MillionsToPence),
                        Currency,
                        "Additional high needs funding",
                        Sum
                    ),
                ],
                children: &[LineSpec {
                    name: "High Needs Block after deductions",
                    line_type: FundingLineType::Payment,
                    value: cell!(HighNeeds, 10, MillionsToPence),
                    distribution: FY1920_DISTRIBUTION,
                    calculations: &[calc!(
                        "High needs place deductions",
                        Cash,
                        cell!(HighNeeds, 9, MillionsToPence),
                        Currency,
                        "Number of deducted places × £6,000",
                        Sum,
                        &[reference!(
                            "Number of deducted places",
                            Formula::Literal(NOT_IN_FIXTURE),
                            Number,
                            None
                        )]
                    )],
                    children: &[],
                }],
            },
            LineSpec {
                name: "Early Years Block",
                line_type: FundingLineType::Payment,
                value: cell!(Summary, 5, MillionsToPence),
                distribution: FY1920_DISTRIBUTION,
                calculations: &[
                    calc!(
                        "Universal entitlement for 3 and 4 year olds",
                        Cash,
                        cell!(EarlyYears, 4, MillionsToPence),
                        Currency,
                        "Universal entitlement PTE × 3 and 4 year old hourly rate × 570",
                        Sum,
                        &[
                            reference!(
                                "Universal entitlement PTE",
                                cell!(EarlyYears, 2, Integer),
                                Number,
                                Sum
                            ),
                            reference!(
                                "3 and 4 year old hourly rate",
                                cell!(EarlyYears, 3, PoundsToPence),
                                Currency,
                                Average
                            ),
                        ]
                    ),
                    calc!(
                        "Additional 15 hours entitlement",
                        Cash,
                        cell!(EarlyYears, 6, MillionsToPence),
                        Currency,
                        "Additional 15 hours PTE × 3 and 4 year old hourly rate × 570",
                        Sum,
                        &[reference!(
                            "Additional 15 hours PTE",
                            cell!(EarlyYears, 5, Integer),
                            Number,
                            Sum
                        )]
                    ),
                    calc!(
                        "2 year old entitlement",
                        Cash,
                        cell!(EarlyYears, 9, MillionsToPence),
                        Currency,
                        "2 year old PTE × 2 year old hourly rate × 570",
                        Sum,
                        &[
                            reference!(
                                "2 year old PTE",
                                cell!(EarlyYears, 7, Integer),
                                Number,
                                Sum
                            ),
                            reference!(
                                "2 year old hourly rate",
                                cell!(EarlyYears, 8, PoundsToPence),
                                Currency,
                                Average
                            ),
                        ]
                    ),
                    calc!(
                        "Early years pupil premium",
                        Cash,
                        cell!(EarlyYears, 10, MillionsToPence),
                        Currency,
                        "Early years pupil premium",
                        Sum
                    ),
                    calc!(
                        "Disability access fund",
                        Cash,
                        cell!(EarlyYears, 11, MillionsToPence),
                        Currency,
                        "Disability access fund",
                        Sum
                    ),
                    calc!(
                        "Maintained nursery school supplementary funding",
                        Cash,
                        cell!(EarlyYears, 12, MillionsToPence),
                        Currency,
                        "Maintained nursery school supplementary funding",
                        Sum,
                        &[reference!(
                            "Number of maintained nursery schools",
                            Formula::Literal(NOT_IN_FIXTURE),
                            Number,
                            None
                        )]
                    ),
                ],
                children: &[],
            },
        ],
    },
    LineSpec {
        name: "Deductions",
        line_type: FundingLineType::Information,
        value: cell!(Summary, 9, MillionsToPence),
        distribution: &[],
        calculations: &[
            calc!(
                "Academy recoupment",
                Cash,
                cell!(Summary, 7, MillionsToPence),
                Currency,
                "Academy recoupment",
                Sum
            ),
            calc!(
                "High needs place deductions",
                Cash,
                cell!(Summary, 8, MillionsToPence),
                Currency,
                "High needs place deductions",
                Sum
            ),
        ],
        children: &[],
    },
];

// ============================================================================
// FUNDING VALUES
// ============================================================================

/// Funding value of an organisation that owns a workbook row
pub fn row_funding_value(workbook: &Workbook, row: usize) -> Result<FundingValue> {
    let source = DsgRow { workbook, row };
    Ok(FundingValue {
        total_value: DSG_TOTAL.evaluate(&source)?,
        funding_lines: build_funding_lines(&source, DSG_LINES)?,
    })
}

/// Funding value of a catalog organisation
///
/// Local-government groups aggregate `member_values`; everything else reads
/// its own row.
pub fn funding_value(
    workbook: &Workbook,
    organisation: &Organisation,
    member_values: &[&FundingValue],
) -> Result<FundingValue> {
    match (organisation.kind, organisation.spreadsheet_row) {
        (OrganisationKind::LocalGovernmentGroup, _) => Ok(aggregate_values(member_values)),
        (_, Some(row)) => row_funding_value(workbook, row),
        (_, None) => Err(FeedError::InvalidFixture(format!(
            "{} has no workbook row",
            organisation.name
        ))),
    }
}

fn aggregate_values(values: &[&FundingValue]) -> FundingValue {
    let trees: Vec<&[_]> = values.iter().map(|v| v.funding_lines.as_slice()).collect();
    FundingValue {
        total_value: values.iter().map(|v| v.total_value).sum(),
        funding_lines: aggregate_funding_lines(&trees),
    }
}

// ============================================================================
// ORGANISATION GROUPS AND PROVIDERS
// ============================================================================

fn la_identifiers(la: &Organisation) -> Vec<OrganisationIdentifier> {
    let mut identifiers = Vec::with_capacity(2);
    if let Some(ukprn) = &la.ukprn {
        identifiers.push(OrganisationIdentifier::new("UKPRN", ukprn.clone()));
    }
    identifiers.push(OrganisationIdentifier::new("LACode", la.code.clone()));
    identifiers
}

pub fn organisation_group(organisation: &Organisation) -> OrganisationGroup {
    let (group_type_identifier, classification, identifiers) = match organisation.kind {
        OrganisationKind::LocalAuthority => ("UKPRN", "LegalEntity", la_identifiers(organisation)),
        OrganisationKind::Region => (
            "Name",
            "GeographicalBoundary",
            vec![OrganisationIdentifier::new("RegionCode", organisation.code.clone())],
        ),
        OrganisationKind::LocalGovernmentGroup => ("Name", "GeographicalBoundary", Vec::new()),
    };

    OrganisationGroup {
        group_type_identifier: group_type_identifier.to_string(),
        identifier_value: organisation.primary_identifier(),
        group_type_code: organisation.kind.group_type_code().to_string(),
        group_type_classification: classification.to_string(),
        name: organisation.name.clone(),
        searchable_name: organisation.searchable_name(),
        identifiers,
    }
}

pub fn la_provider(la: &Organisation) -> Provider {
    let ukprn = la.primary_identifier();
    Provider {
        identifier: ukprn.clone(),
        name: la.name.clone(),
        searchable_name: la.searchable_name(),
        ukprn,
        la_code: la.code.clone(),
        provider_type: LOCAL_AUTHORITY_PROVIDER_TYPE.to_string(),
        provider_sub_type: LOCAL_AUTHORITY_PROVIDER_TYPE.to_string(),
        identifiers: la_identifiers(la),
    }
}

// ============================================================================
// GENERATOR
// ============================================================================

/// Local authority plus its computed funding value
struct LaFunding<'a> {
    organisation: &'a Organisation,
    value: FundingValue,
    provider_funding: ProviderFunding,
}

fn la_fundings<'a>(
    catalog: &'a OrganisationCatalog,
    workbook: &Workbook,
) -> Result<Vec<LaFunding<'a>>> {
    catalog
        .local_authorities()
        .iter()
        .map(|la| {
            let value = funding_value(workbook, la, &[])?;
            let provider_funding =
                provider_funding(FundingStream::Dsg, la_provider(la), value.clone());
            Ok(LaFunding {
                organisation: la,
                value,
                provider_funding,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DsgGenerator;

impl DsgGenerator {
    pub fn new() -> Self {
        DsgGenerator
    }
}

impl StreamGenerator for DsgGenerator {
    fn stream(&self) -> FundingStream {
        FundingStream::Dsg
    }

    fn fundings(&self, fixtures: &Fixtures) -> Result<Vec<GroupedFunding>> {
        let workbook = &fixtures.workbook;
        let catalog = OrganisationCatalog::from_workbook(workbook)?;
        let las = la_fundings(&catalog, workbook)?;

        let by_code: HashMap<&str, &LaFunding> = las
            .iter()
            .map(|la| (la.organisation.code.as_str(), la))
            .collect();

        let mut fundings = Vec::with_capacity(catalog.all().count());

        for la in &las {
            fundings.push(GroupedFunding::assemble(
                FundingStream::Dsg,
                organisation_group(la.organisation),
                la.value.clone(),
                GroupingReason::Payment,
                vec![ProviderRef::from_provider_funding(&la.provider_funding)],
            ));
        }

        for organisation in catalog.regions().iter().chain(catalog.groups()) {
            let mut members = Vec::new();
            for member in catalog.members(&organisation.name)? {
                let la = by_code.get(member.code.as_str()).ok_or_else(|| {
                    FeedError::InvalidFixture(format!("no funding computed for LA {}", member.code))
                })?;
                members.push(*la);
            }

            let member_values: Vec<&FundingValue> = members.iter().map(|la| &la.value).collect();
            let value = funding_value(workbook, organisation, &member_values)?;
            let providers = members
                .iter()
                .map(|la| ProviderRef::from_provider_funding(&la.provider_funding))
                .collect();

            fundings.push(GroupedFunding::assemble(
                FundingStream::Dsg,
                organisation_group(organisation),
                value,
                GroupingReason::Information,
                providers,
            ));
        }

        debug!(entries = fundings.len(), "generated DSG fundings");
        Ok(fundings)
    }

    fn provider_fundings(&self, fixtures: &Fixtures) -> Result<Vec<ProviderFunding>> {
        let catalog = OrganisationCatalog::from_workbook(&fixtures.workbook)?;
        let las = la_fundings(&catalog, &fixtures.workbook)?;
        Ok(las.into_iter().map(|la| la.provider_funding).collect())
    }

    fn logical_model(&self) -> LogicalModel {
        LogicalModel {
            funding_stream: FundingStream::Dsg.as_ref_model(),
            funding_period: FundingStream::Dsg.period(),
            funding_lines: template_lines(DSG_LINES),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::MISSING_EXTENSION_VALUE;

    fn fixtures() -> Fixtures {
        Fixtures::embedded().unwrap()
    }

    #[test]
    fn test_camden_total_value() {
        let fixtures = fixtures();
        let value = row_funding_value(&fixtures.workbook, 6).unwrap();
        let expected = fixtures
            .workbook
            .cell(DsgSheet::Summary, 6, 11, CellMode::MillionsToPence)
            .unwrap();
        assert_eq!(value.total_value, expected);
        assert_eq!(expected, CellMode::MillionsToPence.convert(180.956833));
    }

    #[test]
    fn test_builder_is_deterministic() {
        let fixtures = fixtures();
        let first = row_funding_value(&fixtures.workbook, 6).unwrap();
        let second = row_funding_value(&fixtures.workbook, 6).unwrap();
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn test_tree_shape() {
        let fixtures = fixtures();
        let value = row_funding_value(&fixtures.workbook, 6).unwrap();
        let lines = &value.funding_lines;

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].name, "Total DSG before deductions");
        assert_eq!(lines[1].name, "Deductions");
        assert_eq!(lines[1].template_line_id, 8);

        let ids: Vec<u32> = lines[0].flatten().iter().map(|l| l.template_line_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7]);

        let schools = &lines[0].children[0];
        assert_eq!(schools.calculations[0].template_calculation_id, 1);
        // Primary and secondary funding carries two nested calculations
        assert_eq!(schools.calculations[2].calculations.len(), 2);
        assert_eq!(
            schools.calculations[2].value,
            schools.calculations[2].calculations[0].value
                + schools.calculations[2].calculations[1].value
        );
    }

    #[test]
    fn test_unit_conversions() {
        let fixtures = fixtures();
        let value = row_funding_value(&fixtures.workbook, 6).unwrap();
        let schools = &value.funding_lines[0].children[0];

        // Camden primary unit of funding is £5956.57
        assert_eq!(schools.calculations[0].value, 595657);
        assert_eq!(schools.calculations[0].reference_data[0].value, 14838);

        let growth = &schools.calculations[4];
        assert_eq!(growth.reference_data[0].value, NOT_IN_FIXTURE);
    }

    #[test]
    fn test_import_export_is_a_product() {
        let fixtures = fixtures();
        let value = row_funding_value(&fixtures.workbook, 6).unwrap();
        let high_needs = &value.funding_lines[0].children[2];
        let adjustment = &high_needs.calculations[2];
        assert_eq!(adjustment.reference_data[0].value, -132);
        assert_eq!(adjustment.value, -132 * IMPORT_EXPORT_RATE);
    }

    #[test]
    fn test_region_rows_use_extension_sentinel() {
        let fixtures = fixtures();
        // North East: early years sheet has no regional rows
        let value = row_funding_value(&fixtures.workbook, 160).unwrap();
        let early_years = &value.funding_lines[0].children[3];
        assert_eq!(early_years.name, "Early Years Block");
        assert!(early_years.value > 0);
        assert_eq!(early_years.calculations[0].value, MISSING_EXTENSION_VALUE);

        // Regional unit rates are blank
        let schools = &value.funding_lines[0].children[0];
        assert_eq!(schools.calculations[0].value, MISSING_EXTENSION_VALUE);
    }

    #[test]
    fn test_feed_entries() {
        let fixtures = fixtures();
        let fundings = DsgGenerator::new().fundings(&fixtures).unwrap();
        assert_eq!(fundings.len(), 161);

        let camden = &fundings[1].funding;
        assert_eq!(camden.id, "DSG_FY1920_MOCKUKPRN202_1.0");
        assert_eq!(camden.derive_id(), camden.id);
        assert_eq!(camden.provider_fundings, vec![camden.id.clone()]);
        assert_eq!(camden.organisation_group.group_type_code, "LocalAuthority");

        let region = fundings
            .iter()
            .find(|f| f.funding.organisation_group.name == "North East")
            .unwrap();
        assert_eq!(region.funding.id, "DSG_FY1920_North_East_1.0");
        assert_eq!(region.funding.grouping_reason, GroupingReason::Information);
        assert_eq!(region.providers.len(), 12);
    }

    #[test]
    fn test_group_aggregates_member_las() {
        let fixtures = fixtures();
        let fundings = DsgGenerator::new().fundings(&fixtures).unwrap();

        let group = fundings.last().unwrap();
        assert_eq!(group.funding.id, "DSG_FY1920_UPPER_TIER_AUTHORITIES_1.0");
        assert_eq!(group.providers.len(), 26);

        let member_total: i64 = fundings
            .iter()
            .filter(|f| group.funding.provider_fundings.contains(&f.funding.id))
            .map(|f| f.funding.funding_value.total_value)
            .sum();
        assert_eq!(group.funding.funding_value.total_value, member_total);

        let growth_factor = &group.funding.funding_value.funding_lines[0].children[0]
            .calculations[4]
            .reference_data[0];
        assert_eq!(growth_factor.value, NOT_IN_FIXTURE);
    }

    #[test]
    fn test_provider_funding_names() {
        let fixtures = fixtures();
        let providers = DsgGenerator::new().provider_fundings(&fixtures).unwrap();
        assert_eq!(providers.len(), 149);

        let camden = providers
            .iter()
            .find(|p| p.id == "DSG_FY1920_MOCKUKPRN202_1.0")
            .unwrap();
        assert_eq!(camden.provider.name, "Camden");
        assert_eq!(camden.provider.provider_type, LOCAL_AUTHORITY_PROVIDER_TYPE);
        assert_eq!(camden.funding_period_code, "FY1920");
    }

    #[test]
    fn test_logical_model_matches_values() {
        let model = DsgGenerator::new().logical_model();
        assert_eq!(model.funding_stream.code, "DSG");
        assert_eq!(model.funding_lines.len(), 2);
        assert_eq!(model.funding_lines[1].template_line_id, 8);
        assert_eq!(
            model.funding_lines[0].children[2].calculations[2].reference_data[1].name,
            "Import/export rate"
        );
    }
}
