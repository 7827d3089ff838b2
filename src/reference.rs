// 📚 Static catalogs: funding periods, funding streams and template models

use crate::funding::{generator_for, FundingStream};
use crate::models::{FundingPeriod, FundingPeriodType, LogicalModel};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// Two-digit year pair used in period codes, e.g. 2019 → "1920"
fn year_pair(start_year: i32) -> String {
    format!("{:02}{:02}", start_year % 100, (start_year + 1) % 100)
}

/// Financial year starting 1 April of `start_year`
///
/// # Examples:
/// ```
/// use funding_feed_mock::reference::financial_year;
/// assert_eq!(financial_year(2019).code, "FY1920");
/// ```
pub fn financial_year(start_year: i32) -> FundingPeriod {
    FundingPeriod {
        code: format!("FY{}", year_pair(start_year)),
        name: format!("Financial year {}-{:02}", start_year, (start_year + 1) % 100),
        period_type: FundingPeriodType::FinancialYear,
        start_date: date(start_year, 4, 1),
        end_date: date(start_year + 1, 3, 31),
    }
}

/// Academic year starting 1 September of `start_year`
pub fn academic_year(start_year: i32) -> FundingPeriod {
    FundingPeriod {
        code: format!("AY{}", year_pair(start_year)),
        name: format!("Academic year {}-{:02}", start_year, (start_year + 1) % 100),
        period_type: FundingPeriodType::AcademicYear,
        start_date: date(start_year, 9, 1),
        end_date: date(start_year + 1, 8, 31),
    }
}

/// Every period the mock knows about
pub fn periods() -> Vec<FundingPeriod> {
    vec![financial_year(2019), financial_year(2020), academic_year(2019)]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingStreamSummary {
    pub code: String,
    pub name: String,
    pub periods: Vec<FundingPeriod>,
}

pub fn funding_streams() -> Vec<FundingStreamSummary> {
    FundingStream::ALL
        .into_iter()
        .map(|stream| FundingStreamSummary {
            code: stream.code().to_string(),
            name: stream.name().to_string(),
            periods: vec![stream.period()],
        })
        .collect()
}

/// Template trees of every stream, without values
pub fn logical_models() -> Vec<LogicalModel> {
    FundingStream::ALL
        .into_iter()
        .map(|stream| generator_for(stream).logical_model())
        .collect()
}
