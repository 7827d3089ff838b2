// 📊 Fixture Reader
// Embedded DSG workbook (five sheet exports) and PE and Sport Premium CSVs
//
// The workbook is addressed by (sheet, row, column) with 0-based rows that
// count title and header lines, exactly like the published spreadsheet.

use crate::error::{FeedError, Result};
use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::debug;

/// Rows below the LA block that only exist for some sheets (regional figures)
pub const EXTENSION_ROWS: Range<usize> = 155..169;

/// Value returned for data intentionally absent in the extension rows
pub const MISSING_EXTENSION_VALUE: i64 = -2;

/// Field count of a PE and Sport Premium CSV record
pub const PESPORTS_FIELD_COUNT: usize = 8;

// ============================================================================
// CELL DECODING
// ============================================================================

/// How a raw spreadsheet number is turned into an integer value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellMode {
    /// Plain count, truncated
    Integer,
    /// £ million → pence (×1e6 pounds, ×1e2 pence)
    MillionsToPence,
    /// £ → pence
    PoundsToPence,
}

impl CellMode {
    pub fn factor(&self) -> f64 {
        match self {
            CellMode::Integer => 1.0,
            CellMode::MillionsToPence => 1e8,
            CellMode::PoundsToPence => 1e2,
        }
    }

    /// Scale and truncate towards zero
    pub fn convert(&self, raw: f64) -> i64 {
        (raw * self.factor()) as i64
    }
}

// ============================================================================
// SHEETS
// ============================================================================

/// Logical sheets of the DSG allocations workbook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DsgSheet {
    Summary,
    SchoolsBlock,
    CentralServices,
    HighNeeds,
    EarlyYears,
}

impl DsgSheet {
    pub const ALL: [DsgSheet; 5] = [
        DsgSheet::Summary,
        DsgSheet::SchoolsBlock,
        DsgSheet::CentralServices,
        DsgSheet::HighNeeds,
        DsgSheet::EarlyYears,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DsgSheet::Summary => "Summary",
            DsgSheet::SchoolsBlock => "Schools block",
            DsgSheet::CentralServices => "Central school services block",
            DsgSheet::HighNeeds => "High needs block",
            DsgSheet::EarlyYears => "Early years block",
        }
    }

    fn index(&self) -> usize {
        match self {
            DsgSheet::Summary => 0,
            DsgSheet::SchoolsBlock => 1,
            DsgSheet::CentralServices => 2,
            DsgSheet::HighNeeds => 3,
            DsgSheet::EarlyYears => 4,
        }
    }

    fn embedded_source(&self) -> &'static str {
        match self {
            DsgSheet::Summary => include_str!("../fixtures/dsg/summary.csv"),
            DsgSheet::SchoolsBlock => include_str!("../fixtures/dsg/schools_block.csv"),
            DsgSheet::CentralServices => include_str!("../fixtures/dsg/central_services.csv"),
            DsgSheet::HighNeeds => include_str!("../fixtures/dsg/high_needs.csv"),
            DsgSheet::EarlyYears => include_str!("../fixtures/dsg/early_years.csv"),
        }
    }
}

/// One sheet: every CSV line is a row, ragged rows allowed
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn from_csv(name: &str, text: &str) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(|field| field.to_string()).collect());
        }

        Ok(Sheet {
            name: name.to_string(),
            rows,
        })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Raw text of a cell; `None` when the row or column does not exist
    pub fn text(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .map(|cell| cell.trim())
    }

    /// Numeric value of a cell; blank, non-numeric and non-finite cells read as `None`
    pub fn number(&self, row: usize, col: usize) -> Option<f64> {
        self.text(row, col)
            .filter(|text| !text.is_empty())
            .and_then(|text| text.parse::<f64>().ok())
            .filter(|value| value.is_finite())
    }

    /// Decode a numeric cell
    ///
    /// Extension rows answer `MISSING_EXTENSION_VALUE` when the row is absent
    /// or the cell is not a number. Anywhere else both cases are fatal.
    pub fn decode(&self, row: usize, col: usize, mode: CellMode) -> Result<i64> {
        let in_extension = EXTENSION_ROWS.contains(&row);

        if row >= self.rows.len() {
            if in_extension {
                return Ok(MISSING_EXTENSION_VALUE);
            }
            return Err(FeedError::RowOutOfRange {
                sheet: self.name.clone(),
                row,
                rows: self.rows.len(),
            });
        }

        match self.number(row, col) {
            Some(raw) => Ok(mode.convert(raw)),
            None if in_extension => Ok(MISSING_EXTENSION_VALUE),
            None => Err(FeedError::NonNumericCell {
                sheet: self.name.clone(),
                row,
                col,
            }),
        }
    }
}

/// The DSG allocations workbook
#[derive(Debug, Clone)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// Parse the sheet exports compiled into the binary
    pub fn embedded() -> Result<Self> {
        Self::from_sources(|sheet| sheet.embedded_source().to_string())
    }

    /// Build a workbook from caller-supplied CSV text per sheet
    pub fn from_sources<F>(mut source: F) -> Result<Self>
    where
        F: FnMut(DsgSheet) -> String,
    {
        let mut sheets = Vec::with_capacity(DsgSheet::ALL.len());
        for sheet in DsgSheet::ALL {
            let parsed = Sheet::from_csv(sheet.name(), &source(sheet))?;
            debug!(sheet = sheet.name(), rows = parsed.row_count(), "loaded sheet");
            sheets.push(parsed);
        }
        Ok(Workbook { sheets })
    }

    pub fn sheet(&self, sheet: DsgSheet) -> &Sheet {
        &self.sheets[sheet.index()]
    }

    pub fn cell(&self, sheet: DsgSheet, row: usize, col: usize, mode: CellMode) -> Result<i64> {
        self.sheet(sheet).decode(row, col, mode)
    }
}

// ============================================================================
// PE AND SPORT PREMIUM CSV
// ============================================================================

/// Provider category; one CSV file per category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderCategory {
    MaintainedSchool,
    Academy,
}

impl ProviderCategory {
    pub const ALL: [ProviderCategory; 2] =
        [ProviderCategory::MaintainedSchool, ProviderCategory::Academy];

    /// Provider type as published in provider funding records
    pub fn provider_type(&self) -> &'static str {
        match self {
            ProviderCategory::MaintainedSchool => "LA maintained school",
            ProviderCategory::Academy => "Academy",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ProviderCategory::MaintainedSchool => "maintained_schools.csv",
            ProviderCategory::Academy => "academies.csv",
        }
    }

    fn embedded_source(&self) -> &'static str {
        match self {
            ProviderCategory::MaintainedSchool => {
                include_str!("../fixtures/pesports/maintained_schools.csv")
            }
            ProviderCategory::Academy => include_str!("../fixtures/pesports/academies.csv"),
        }
    }
}

/// One school line of a PE and Sport Premium allocation file
///
/// Money columns are held in pence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeSportsRow {
    pub la_no: u32,
    pub la_name: String,
    pub la_establishment_no: String,
    pub school_name: String,
    pub eligible_pupils: i64,
    pub total_allocation: i64,
    pub october_payment: i64,
    pub april_payment: i64,
    pub category: ProviderCategory,
}

fn parse_number(field: &str, column: &str, line: usize) -> Result<f64> {
    field
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| {
            FeedError::InvalidFixture(format!(
                "{} on line {} is not a number: {:?}",
                column, line, field
            ))
        })
}

/// Parse one allocation file; records without exactly 8 fields are dropped
///
/// Quotes carry no meaning, so a comma inside a quoted name splits the field.
pub fn parse_pesports_csv(text: &str, category: ProviderCategory) -> Result<Vec<PeSportsRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let line = index + 2; // 1-indexed + header row

        if record.len() != PESPORTS_FIELD_COUNT {
            debug!(
                file = category.file_name(),
                line,
                fields = record.len(),
                "skipping malformed record"
            );
            continue;
        }

        let la_no = record[0].parse::<u32>().map_err(|_| {
            FeedError::InvalidFixture(format!("LA number on line {} is not a number: {:?}", line, &record[0]))
        })?;

        rows.push(PeSportsRow {
            la_no,
            la_name: record[1].to_string(),
            la_establishment_no: record[2].to_string(),
            school_name: record[3].to_string(),
            eligible_pupils: CellMode::Integer
                .convert(parse_number(&record[4], "Eligible pupils", line)?),
            total_allocation: CellMode::PoundsToPence
                .convert(parse_number(&record[5], "Total allocation", line)?),
            october_payment: CellMode::PoundsToPence
                .convert(parse_number(&record[6], "October payment", line)?),
            april_payment: CellMode::PoundsToPence
                .convert(parse_number(&record[7], "April payment", line)?),
            category,
        });
    }

    Ok(rows)
}

// ============================================================================
// FIXTURE SET
// ============================================================================

/// All bundled fixture data, parsed once and shared read-only
#[derive(Debug, Clone)]
pub struct Fixtures {
    pub workbook: Workbook,
    pub pesports: Vec<PeSportsRow>,
}

impl Fixtures {
    pub fn embedded() -> Result<Self> {
        let workbook = Workbook::embedded()?;

        let mut pesports = Vec::new();
        for category in ProviderCategory::ALL {
            let rows = parse_pesports_csv(category.embedded_source(), category)?;
            debug!(file = category.file_name(), rows = rows.len(), "loaded PE and sport rows");
            pesports.extend(rows);
        }

        Ok(Fixtures { workbook, pesports })
    }

    pub fn pesports_rows(&self, category: ProviderCategory) -> impl Iterator<Item = &PeSportsRow> {
        self.pesports.iter().filter(move |row| row.category == category)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_sheet() -> Sheet {
        let mut text = String::new();
        for row in 0..160 {
            text.push_str(&format!("{},name {},{}.5,12.34567891\n", row, row, row));
        }
        text.push_str("E12000001,North East,,\n");
        Sheet::from_csv("Sample", &text).unwrap()
    }

    #[test]
    fn test_cell_mode_factors() {
        assert_eq!(CellMode::Integer.convert(12.9), 12);
        assert_eq!(CellMode::PoundsToPence.convert(5956.57), 595657);
        assert_eq!(CellMode::MillionsToPence.convert(1.5), 150_000_000);
        assert_eq!(CellMode::Integer.convert(-3.7), -3);
    }

    #[test]
    fn test_decode_numeric_cells() {
        let sheet = sample_sheet();
        assert_eq!(sheet.decode(6, 2, CellMode::Integer).unwrap(), 6);
        assert_eq!(sheet.decode(6, 3, CellMode::MillionsToPence).unwrap(), 1_234_567_891);
        assert_eq!(sheet.decode(6, 2, CellMode::PoundsToPence).unwrap(), 650);
    }

    #[test]
    fn test_decode_non_numeric_is_fatal_outside_extension_rows() {
        let sheet = sample_sheet();
        let err = sheet.decode(6, 1, CellMode::Integer).unwrap_err();
        assert!(matches!(err, FeedError::NonNumericCell { row: 6, col: 1, .. }));

        // Column past the end of the row reads as blank
        assert!(sheet.decode(6, 40, CellMode::Integer).is_err());
    }

    #[test]
    fn test_decode_non_finite_is_fatal() {
        let sheet = Sheet::from_csv("Corrupt", "1,NaN,inf,-infinity\n").unwrap();
        for col in 1..=3 {
            let err = sheet.decode(0, col, CellMode::MillionsToPence).unwrap_err();
            assert!(matches!(err, FeedError::NonNumericCell { row: 0, .. }));
        }
    }

    #[test]
    fn test_decode_extension_rows_use_sentinel() {
        let sheet = sample_sheet();
        // Row 160 exists but has blank rate cells
        assert_eq!(sheet.decode(160, 2, CellMode::PoundsToPence).unwrap(), -2);
        // Row 165 does not exist at all
        assert_eq!(sheet.decode(165, 2, CellMode::MillionsToPence).unwrap(), -2);
        // Numeric cells in extension rows decode normally
        assert_eq!(sheet.decode(155, 0, CellMode::Integer).unwrap(), 155);
    }

    #[test]
    fn test_decode_missing_row_outside_extension_is_fatal() {
        let sheet = sample_sheet();
        let err = sheet.decode(200, 0, CellMode::Integer).unwrap_err();
        assert!(matches!(err, FeedError::RowOutOfRange { row: 200, rows: 161, .. }));
    }

    #[test]
    fn test_embedded_workbook_layout() {
        let workbook = Workbook::embedded().unwrap();
        let summary = workbook.sheet(DsgSheet::Summary);
        assert_eq!(summary.text(5, 1), Some("City of London"));
        assert_eq!(summary.text(6, 0), Some("202"));
        assert_eq!(summary.text(6, 1), Some("Camden"));
        assert_eq!(summary.text(160, 1), Some("North East"));
        assert_eq!(summary.row_count(), 169);

        // Early years has no regional rows
        let early_years = workbook.sheet(DsgSheet::EarlyYears);
        assert_eq!(early_years.row_count(), 155);
        assert_eq!(
            workbook.cell(DsgSheet::EarlyYears, 162, 13, CellMode::MillionsToPence).unwrap(),
            -2
        );

        // Regional unit rates are blank
        assert_eq!(
            workbook.cell(DsgSheet::SchoolsBlock, 166, 4, CellMode::PoundsToPence).unwrap(),
            -2
        );
    }

    #[test]
    fn test_parse_pesports_skips_malformed_lines() {
        let text = "LA No,LA Name,LAESTAB,School Name,Eligible pupils,Total allocation,October payment,April payment\n\
                    202,Camden,2000,Argyle Primary School,412,20120.00,11736.67,8383.33\n\
                    202,Camden,2005,Too Few Fields,398\n\
                    801,\"Bristol, City of\",2001,Ashley Down Primary School,630,22300.00,13008.33,9291.67\n\
                    Source: mock\n";
        let rows = parse_pesports_csv(text, ProviderCategory::MaintainedSchool).unwrap();

        // The quoted Bristol name splits into 9 fields
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].school_name, "Argyle Primary School");
        assert_eq!(rows[0].eligible_pupils, 412);
        assert_eq!(rows[0].total_allocation, 2_012_000);
        assert_eq!(rows[0].october_payment, 1_173_667);
        assert_eq!(rows[0].category, ProviderCategory::MaintainedSchool);
    }

    #[test]
    fn test_embedded_quoted_names_are_dropped() {
        let fixtures = Fixtures::embedded().unwrap();
        assert!(fixtures.pesports.iter().all(|row| row.la_no != 801));
        assert_eq!(fixtures.pesports_rows(ProviderCategory::MaintainedSchool).count(), 19);
        assert_eq!(fixtures.pesports_rows(ProviderCategory::Academy).count(), 11);
    }

    #[test]
    fn test_parse_pesports_rejects_bad_numbers() {
        let text = "h1,h2,h3,h4,h5,h6,h7,h8\n202,Camden,2000,Argyle,lots,1.00,1.00,0.00\n";
        let err = parse_pesports_csv(text, ProviderCategory::Academy).unwrap_err();
        assert!(matches!(err, FeedError::InvalidFixture(_)));

        let text = "h1,h2,h3,h4,h5,h6,h7,h8\n202,Camden,2000,Argyle,10,NaN,1.00,0.00\n";
        assert!(parse_pesports_csv(text, ProviderCategory::Academy).is_err());
    }

    #[test]
    fn test_embedded_fixtures() {
        let fixtures = Fixtures::embedded().unwrap();
        assert!(fixtures.pesports_rows(ProviderCategory::MaintainedSchool).count() > 10);
        assert!(fixtures.pesports_rows(ProviderCategory::Academy).count() > 5);
        assert!(fixtures
            .pesports
            .iter()
            .all(|row| row.october_payment + row.april_payment == row.total_allocation));
    }
}
