//! Collects result rows and writes them to an `.xlsx` spreadsheet.

use crate::error::Result;
use crate::models::ResultRecord;
use rust_xlsxwriter::Workbook;
use std::fs;
use std::path::Path;

/// Column headers, in output order.
pub(crate) const COLUMNS: [&str; 5] = [
    "Company",
    "Description",
    "Emails",
    "Search Ranking",
    "Search Query",
];

/// The in-memory table; nothing touches disk until [`ReportWriter::save`].
#[derive(Debug, Default)]
pub(crate) struct ReportWriter {
    records: Vec<ResultRecord>,
}

impl ReportWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: ResultRecord) {
        self.records.push(record);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    /// Writes the whole table to `path` as a single worksheet with a header row.
    /// Missing parent directories are created.
    pub(crate) fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        for (col, header) in COLUMNS.iter().enumerate() {
            worksheet.write_string(0, col as u16, *header)?;
        }

        for (index, record) in self.records.iter().enumerate() {
            let row = index as u32 + 1;
            worksheet.write_string(row, 0, &record.company)?;
            worksheet.write_string(row, 1, &record.description)?;
            worksheet.write_string(row, 2, &record.emails)?;
            worksheet.write_number(row, 3, f64::from(record.search_rank))?;
            worksheet.write_string(row, 4, &record.search_query)?;
        }

        workbook.save(path)?;
        tracing::info!("Wrote {} rows to {}", self.records.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Reader, Xlsx, open_workbook};
    use std::path::PathBuf;

    fn temp_report_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("email-extractor-test-{}", std::process::id()))
            .join(name)
    }

    fn record(company: &str, emails: &str, rank: u32) -> ResultRecord {
        ResultRecord {
            company: company.to_string(),
            description: "Webbyrå i Stockholm".to_string(),
            emails: emails.to_string(),
            search_rank: rank,
            search_query: "webbyrå stockholm".to_string(),
        }
    }

    fn read_rows(path: &Path) -> Vec<Vec<String>> {
        let mut excel: Xlsx<_> = open_workbook(path).unwrap();
        let worksheets = excel.worksheets();
        let (_name, range) = worksheets.first().unwrap();
        range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_save_writes_header_and_rows() {
        let path = temp_report_path("Email Extractor.xlsx");
        let mut report = ReportWriter::new();
        report.push(record("https://a.se", "info@a.se, jobb@a.se", 1));
        report.push(record("https://b.se", "", 2));
        report.save(&path).unwrap();

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], COLUMNS.iter().map(|c| c.to_string()).collect::<Vec<_>>());
        assert_eq!(rows[1][0], "https://a.se");
        assert_eq!(rows[1][2], "info@a.se, jobb@a.se");
        assert_eq!(rows[1][3], "1");
        assert_eq!(rows[2][4], "webbyrå stockholm");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_save_empty_report_has_header_only() {
        let path = temp_report_path("empty.xlsx");
        let report = ReportWriter::new();
        assert_eq!(report.len(), 0);
        report.save(&path).unwrap();

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "Company");

        let _ = fs::remove_file(&path);
    }
}
