// 🌳 Declarative funding templates and the single recursive builder
//
// A template is a static tree of line / calculation / reference specs whose
// values are formulas over a stream-specific cell address type. The builder
// walks it in document order: line id, then the line's calculations (calc
// id, its reference data, its nested calculations), then child lines.

use crate::error::Result;
use crate::models::{
    AggregationType, Calculation, CalculationType, DistributionPeriod, FundingLine,
    FundingLineType, ProfilePeriod, ReferenceData, TemplateCalculation, TemplateFundingLine,
    TemplateReferenceData, ValueFormat,
};

/// Reference value for data the fixture does not carry
pub const NOT_IN_FIXTURE: i64 = -1;

// ============================================================================
// FORMULAS
// ============================================================================

/// Resolves stream-specific cell addresses to integer values
pub trait CellSource {
    type Cell: Copy + 'static;

    fn read(&self, cell: Self::Cell) -> Result<i64>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formula<C: 'static> {
    Cell(C),
    Sum(&'static [Formula<C>]),
    Product(&'static [Formula<C>]),
    Literal(i64),
}

impl<C: Copy + 'static> Formula<C> {
    pub fn evaluate<S>(&self, source: &S) -> Result<i64>
    where
        S: CellSource<Cell = C>,
    {
        match self {
            Formula::Cell(cell) => source.read(*cell),
            Formula::Sum(parts) => parts
                .iter()
                .try_fold(0i64, |acc, part| -> Result<i64> { Ok(acc + part.evaluate(source)?) }),
            Formula::Product(parts) => parts
                .iter()
                .try_fold(1i64, |acc, part| -> Result<i64> { Ok(acc * part.evaluate(source)?) }),
            Formula::Literal(value) => Ok(*value),
        }
    }
}

// ============================================================================
// SPECS
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct RefSpec<C: 'static> {
    pub name: &'static str,
    pub value: Formula<C>,
    pub format: ValueFormat,
    pub aggregation: AggregationType,
}

#[derive(Debug, Clone, Copy)]
pub struct CalcSpec<C: 'static> {
    pub name: &'static str,
    pub calculation_type: CalculationType,
    pub value: Formula<C>,
    pub format: ValueFormat,
    pub formula_text: &'static str,
    pub aggregation: AggregationType,
    pub reference_data: &'static [RefSpec<C>],
    pub calculations: &'static [CalcSpec<C>],
}

/// One distribution period with a single calendar-month profile
///
/// `value: None` distributes the whole line value.
#[derive(Debug, Clone, Copy)]
pub struct PeriodSpec<C: 'static> {
    pub code: &'static str,
    pub month: &'static str,
    pub year: i32,
    pub value: Option<Formula<C>>,
}

#[derive(Debug, Clone, Copy)]
pub struct LineSpec<C: 'static> {
    pub name: &'static str,
    pub line_type: FundingLineType,
    pub value: Formula<C>,
    pub distribution: &'static [PeriodSpec<C>],
    pub calculations: &'static [CalcSpec<C>],
    pub children: &'static [LineSpec<C>],
}

// ============================================================================
// ID COUNTERS
// ============================================================================

/// Template id counters scoped to one tree build; each starts at 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateIds {
    line: u32,
    calculation: u32,
    reference: u32,
}

impl TemplateIds {
    pub fn new() -> Self {
        TemplateIds {
            line: 1,
            calculation: 1,
            reference: 1,
        }
    }

    pub fn next_line(&mut self) -> u32 {
        let id = self.line;
        self.line += 1;
        id
    }

    pub fn next_calculation(&mut self) -> u32 {
        let id = self.calculation;
        self.calculation += 1;
        id
    }

    pub fn next_reference(&mut self) -> u32 {
        let id = self.reference;
        self.reference += 1;
        id
    }
}

impl Default for TemplateIds {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// VALUE BUILDER
// ============================================================================

/// Build the funding line tree for one organisation
pub fn build_funding_lines<S>(source: &S, specs: &[LineSpec<S::Cell>]) -> Result<Vec<FundingLine>>
where
    S: CellSource,
{
    let mut ids = TemplateIds::new();
    specs
        .iter()
        .map(|spec| build_line(source, spec, &mut ids))
        .collect()
}

fn build_line<S: CellSource>(
    source: &S,
    spec: &LineSpec<S::Cell>,
    ids: &mut TemplateIds,
) -> Result<FundingLine> {
    let template_line_id = ids.next_line();
    let value = spec.value.evaluate(source)?;

    let mut distribution_periods = Vec::with_capacity(spec.distribution.len());
    for period in spec.distribution {
        let period_value = match &period.value {
            Some(formula) => formula.evaluate(source)?,
            None => value,
        };
        distribution_periods.push(DistributionPeriod {
            distribution_period_code: period.code.to_string(),
            value: period_value,
            profile_periods: vec![ProfilePeriod {
                period_type: "CalendarMonth".to_string(),
                type_value: period.month.to_string(),
                year: period.year,
                occurrence: 1,
                profiled_value: period_value,
                distribution_period_code: period.code.to_string(),
            }],
        });
    }

    let calculations = build_calculations(source, spec.calculations, ids)?;

    let children = spec
        .children
        .iter()
        .map(|child| build_line(source, child, ids))
        .collect::<Result<Vec<_>>>()?;

    Ok(FundingLine {
        name: spec.name.to_string(),
        template_line_id,
        line_type: spec.line_type,
        value,
        distribution_periods,
        calculations,
        children,
    })
}

fn build_calculations<S: CellSource>(
    source: &S,
    specs: &[CalcSpec<S::Cell>],
    ids: &mut TemplateIds,
) -> Result<Vec<Calculation>> {
    let mut calculations = Vec::with_capacity(specs.len());

    for spec in specs {
        let template_calculation_id = ids.next_calculation();
        let value = spec.value.evaluate(source)?;

        let mut reference_data = Vec::with_capacity(spec.reference_data.len());
        for reference in spec.reference_data {
            reference_data.push(ReferenceData {
                name: reference.name.to_string(),
                template_reference_id: ids.next_reference(),
                value: reference.value.evaluate(source)?,
                format: reference.format,
                aggregation_type: reference.aggregation,
            });
        }

        let nested = build_calculations(source, spec.calculations, ids)?;

        calculations.push(Calculation {
            name: spec.name.to_string(),
            template_calculation_id,
            calculation_type: spec.calculation_type,
            value,
            value_format: spec.format,
            formula_text: spec.formula_text.to_string(),
            aggregation_type: spec.aggregation,
            reference_data,
            calculations: nested,
        });
    }

    Ok(calculations)
}

// ============================================================================
// LOGICAL MODEL
// ============================================================================

/// Template tree without values; ids match `build_funding_lines`
pub fn template_lines<C: Copy + 'static>(specs: &[LineSpec<C>]) -> Vec<TemplateFundingLine> {
    let mut ids = TemplateIds::new();
    specs.iter().map(|spec| template_line(spec, &mut ids)).collect()
}

fn template_line<C: Copy + 'static>(spec: &LineSpec<C>, ids: &mut TemplateIds) -> TemplateFundingLine {
    let template_line_id = ids.next_line();
    let calculations = template_calculations(spec.calculations, ids);
    let children = spec
        .children
        .iter()
        .map(|child| template_line(child, ids))
        .collect();

    TemplateFundingLine {
        name: spec.name.to_string(),
        template_line_id,
        line_type: spec.line_type,
        calculations,
        children,
    }
}

fn template_calculations<C: Copy + 'static>(
    specs: &[CalcSpec<C>],
    ids: &mut TemplateIds,
) -> Vec<TemplateCalculation> {
    specs
        .iter()
        .map(|spec| {
            let template_calculation_id = ids.next_calculation();
            let reference_data = spec
                .reference_data
                .iter()
                .map(|reference| TemplateReferenceData {
                    name: reference.name.to_string(),
                    template_reference_id: ids.next_reference(),
                    format: reference.format,
                    aggregation_type: reference.aggregation,
                })
                .collect();
            let calculations = template_calculations(spec.calculations, ids);

            TemplateCalculation {
                name: spec.name.to_string(),
                template_calculation_id,
                calculation_type: spec.calculation_type,
                value_format: spec.format,
                formula_text: spec.formula_text.to_string(),
                aggregation_type: spec.aggregation,
                reference_data,
                calculations,
            }
        })
        .collect()
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// Roll up values of the same template position across organisations
pub fn aggregate_value<I>(values: I, aggregation: AggregationType) -> i64
where
    I: IntoIterator<Item = i64>,
{
    match aggregation {
        AggregationType::Sum => values.into_iter().sum(),
        AggregationType::Average => {
            let (total, count) = values
                .into_iter()
                .fold((0i64, 0i64), |(total, count), value| (total + value, count + 1));
            if count == 0 {
                0
            } else {
                total / count
            }
        }
        AggregationType::None => NOT_IN_FIXTURE,
    }
}

/// Positional merge of trees built from the same template
///
/// Line values and distribution periods are summed; calculations and
/// reference data follow their aggregation type.
pub fn aggregate_funding_lines(trees: &[&[FundingLine]]) -> Vec<FundingLine> {
    let Some(shape) = trees.first() else {
        return Vec::new();
    };

    (0..shape.len())
        .map(|index| {
            let lines: Vec<&FundingLine> = trees.iter().filter_map(|tree| tree.get(index)).collect();
            aggregate_line(&lines)
        })
        .collect()
}

fn aggregate_line(lines: &[&FundingLine]) -> FundingLine {
    let first = lines[0];

    let distribution_periods = first
        .distribution_periods
        .iter()
        .enumerate()
        .map(|(index, period)| {
            let matching: Vec<&DistributionPeriod> = lines
                .iter()
                .filter_map(|line| line.distribution_periods.get(index))
                .collect();
            let value = matching.iter().map(|p| p.value).sum();
            let profile_periods = period
                .profile_periods
                .iter()
                .enumerate()
                .map(|(profile_index, profile)| ProfilePeriod {
                    profiled_value: matching
                        .iter()
                        .filter_map(|p| p.profile_periods.get(profile_index))
                        .map(|p| p.profiled_value)
                        .sum(),
                    ..profile.clone()
                })
                .collect();
            DistributionPeriod {
                distribution_period_code: period.distribution_period_code.clone(),
                value,
                profile_periods,
            }
        })
        .collect();

    let calculations = (0..first.calculations.len())
        .map(|index| {
            let matching: Vec<&Calculation> = lines
                .iter()
                .filter_map(|line| line.calculations.get(index))
                .collect();
            aggregate_calculation(&matching)
        })
        .collect();

    let children: Vec<&[FundingLine]> = lines.iter().map(|line| line.children.as_slice()).collect();

    FundingLine {
        name: first.name.clone(),
        template_line_id: first.template_line_id,
        line_type: first.line_type,
        value: lines.iter().map(|line| line.value).sum(),
        distribution_periods,
        calculations,
        children: aggregate_funding_lines(&children),
    }
}

fn aggregate_calculation(calculations: &[&Calculation]) -> Calculation {
    let first = calculations[0];

    let reference_data = first
        .reference_data
        .iter()
        .enumerate()
        .map(|(index, reference)| ReferenceData {
            value: aggregate_value(
                calculations
                    .iter()
                    .filter_map(|calc| calc.reference_data.get(index))
                    .map(|r| r.value),
                reference.aggregation_type,
            ),
            ..reference.clone()
        })
        .collect();

    let nested = (0..first.calculations.len())
        .map(|index| {
            let matching: Vec<&Calculation> = calculations
                .iter()
                .filter_map(|calc| calc.calculations.get(index))
                .collect();
            aggregate_calculation(&matching)
        })
        .collect();

    Calculation {
        value: aggregate_value(
            calculations.iter().map(|calc| calc.value),
            first.aggregation_type,
        ),
        reference_data,
        calculations: nested,
        ..first.clone()
    }
}

// ============================================================================
// TESTS
// ============================================================================
