// ⚽ PE and Sport Premium
// Maintained schools are paid through their LA (one aggregate entry per LA);
// academies are paid directly (one entry each).

use super::template::{
    build_funding_lines, template_lines, CalcSpec, CellSource, Formula, LineSpec, PeriodSpec,
    RefSpec, NOT_IN_FIXTURE,
};
use super::{provider_funding, FundingStream, GroupedFunding, ProviderRef, StreamGenerator};
use crate::catalog::{group_by_la, school_ukprn, AllocationTotals, LaAggregate};
use crate::error::Result;
use crate::fixture::{Fixtures, PeSportsRow, ProviderCategory};
use crate::models::{
    AggregationType, CalculationType, FundingLineType, FundingValue, GroupingReason,
    LogicalModel, OrganisationGroup, OrganisationIdentifier, Provider, ProviderFunding,
    ValueFormat,
};
use crate::sanitise::sanitise_name;
use tracing::debug;

/// Columns of an allocation row (or an LA's summed rows)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationField {
    EligiblePupils,
    TotalAllocation,
    OctoberPayment,
    AprilPayment,
}

impl CellSource for AllocationTotals {
    type Cell = AllocationField;

    fn read(&self, cell: AllocationField) -> Result<i64> {
        Ok(match cell {
            AllocationField::EligiblePupils => self.eligible_pupils,
            AllocationField::TotalAllocation => self.total_allocation,
            AllocationField::OctoberPayment => self.october_payment,
            AllocationField::AprilPayment => self.april_payment,
        })
    }
}

pub static PESPORTS_LINES: &[LineSpec<AllocationField>] = &[LineSpec {
    name: "PE and Sport Premium",
    line_type: FundingLineType::Payment,
    value: Formula::Cell(AllocationField::TotalAllocation),
    distribution: &[
        PeriodSpec {
            code: "FY1920",
            month: "October",
            year: 2019,
            value: Some(Formula::Cell(AllocationField::OctoberPayment)),
        },
        PeriodSpec {
            code: "FY2021",
            month: "April",
            year: 2020,
            value: Some(Formula::Cell(AllocationField::AprilPayment)),
        },
    ],
    calculations: &[
        CalcSpec {
            name: "Total allocation",
            calculation_type: CalculationType::Cash,
            value: Formula::Cell(AllocationField::TotalAllocation),
            format: ValueFormat::Currency,
            formula_text: "Lump sum + Eligible pupils × Per pupil rate",
            aggregation: AggregationType::Sum,
            reference_data: &[
                RefSpec {
                    name: "Eligible pupils",
                    value: Formula::Cell(AllocationField::EligiblePupils),
                    format: ValueFormat::Number,
                    aggregation: AggregationType::Sum,
                },
                RefSpec {
                    name: "Per pupil rate",
                    value: Formula::Literal(NOT_IN_FIXTURE),
                    format: ValueFormat::Currency,
                    aggregation: AggregationType::None,
                },
                RefSpec {
                    name: "Lump sum",
                    value: Formula::Literal(NOT_IN_FIXTURE),
                    format: ValueFormat::Currency,
                    aggregation: AggregationType::None,
                },
            ],
            calculations: &[],
        },
        CalcSpec {
            name: "Eligible pupils",
            calculation_type: CalculationType::PupilNumber,
            value: Formula::Cell(AllocationField::EligiblePupils),
            format: ValueFormat::Number,
            formula_text: "Eligible pupils",
            aggregation: AggregationType::Sum,
            reference_data: &[],
            calculations: &[],
        },
        CalcSpec {
            name: "October payment",
            calculation_type: CalculationType::Cash,
            value: Formula::Cell(AllocationField::OctoberPayment),
            format: ValueFormat::Currency,
            formula_text: "7/12 of Total allocation",
            aggregation: AggregationType::Sum,
            reference_data: &[],
            calculations: &[],
        },
        CalcSpec {
            name: "April payment",
            calculation_type: CalculationType::Cash,
            value: Formula::Cell(AllocationField::AprilPayment),
            format: ValueFormat::Currency,
            formula_text: "5/12 of Total allocation",
            aggregation: AggregationType::Sum,
            reference_data: &[],
            calculations: &[],
        },
    ],
    children: &[],
}];

pub fn funding_value(totals: &AllocationTotals) -> Result<FundingValue> {
    Ok(FundingValue {
        total_value: totals.total_allocation,
        funding_lines: build_funding_lines(totals, PESPORTS_LINES)?,
    })
}

fn school_identifiers(row: &PeSportsRow) -> Vec<OrganisationIdentifier> {
    vec![
        OrganisationIdentifier::new("UKPRN", school_ukprn(row)),
        OrganisationIdentifier::new(
            "LAESTAB",
            format!("{}{}", row.la_no, row.la_establishment_no),
        ),
    ]
}

pub fn school_provider(row: &PeSportsRow) -> Provider {
    let ukprn = school_ukprn(row);
    Provider {
        identifier: ukprn.clone(),
        name: row.school_name.clone(),
        searchable_name: sanitise_name(&row.school_name),
        ukprn,
        la_code: row.la_no.to_string(),
        provider_type: row.category.provider_type().to_string(),
        provider_sub_type: row.category.provider_type().to_string(),
        identifiers: school_identifiers(row),
    }
}

fn school_provider_funding(row: &PeSportsRow) -> Result<ProviderFunding> {
    let value = funding_value(&AllocationTotals::from_row(row))?;
    Ok(provider_funding(
        FundingStream::PeSports,
        school_provider(row),
        value,
    ))
}

fn la_group(aggregate: &LaAggregate<'_>) -> OrganisationGroup {
    let ukprn = aggregate.ukprn();
    OrganisationGroup {
        group_type_identifier: "UKPRN".to_string(),
        identifier_value: ukprn.clone(),
        group_type_code: "LocalAuthority".to_string(),
        group_type_classification: "LegalEntity".to_string(),
        name: aggregate.la_name.clone(),
        searchable_name: sanitise_name(&aggregate.la_name),
        identifiers: vec![
            OrganisationIdentifier::new("UKPRN", ukprn),
            OrganisationIdentifier::new("LACode", aggregate.la_no.to_string()),
        ],
    }
}

fn academy_group(row: &PeSportsRow) -> OrganisationGroup {
    OrganisationGroup {
        group_type_identifier: "UKPRN".to_string(),
        identifier_value: school_ukprn(row),
        group_type_code: "Provider".to_string(),
        group_type_classification: "LegalEntity".to_string(),
        name: row.school_name.clone(),
        searchable_name: sanitise_name(&row.school_name),
        identifiers: school_identifiers(row),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PeSportsGenerator;

impl PeSportsGenerator {
    pub fn new() -> Self {
        PeSportsGenerator
    }
}

impl StreamGenerator for PeSportsGenerator {
    fn stream(&self) -> FundingStream {
        FundingStream::PeSports
    }

    fn fundings(&self, fixtures: &Fixtures) -> Result<Vec<GroupedFunding>> {
        let mut fundings = Vec::new();

        for aggregate in group_by_la(fixtures.pesports_rows(ProviderCategory::MaintainedSchool)) {
            let providers = aggregate
                .members
                .iter()
                .map(|row| school_provider_funding(row).map(|pf| ProviderRef::from_provider_funding(&pf)))
                .collect::<Result<Vec<_>>>()?;

            fundings.push(GroupedFunding::assemble(
                FundingStream::PeSports,
                la_group(&aggregate),
                funding_value(&aggregate.totals)?,
                GroupingReason::Payment,
                providers,
            ));
        }

        for row in fixtures.pesports_rows(ProviderCategory::Academy) {
            let own = school_provider_funding(row)?;
            fundings.push(GroupedFunding::assemble(
                FundingStream::PeSports,
                academy_group(row),
                own.funding_value.clone(),
                GroupingReason::Payment,
                vec![ProviderRef::from_provider_funding(&own)],
            ));
        }

        debug!(entries = fundings.len(), "generated PE and sport fundings");
        Ok(fundings)
    }

    fn provider_fundings(&self, fixtures: &Fixtures) -> Result<Vec<ProviderFunding>> {
        ProviderCategory::ALL
            .into_iter()
            .flat_map(|category| fixtures.pesports_rows(category))
            .map(school_provider_funding)
            .collect()
    }

    fn logical_model(&self) -> LogicalModel {
        LogicalModel {
            funding_stream: FundingStream::PeSports.as_ref_model(),
            funding_period: FundingStream::PeSports.period(),
            funding_lines: template_lines(PESPORTS_LINES),
        }
    }
}
