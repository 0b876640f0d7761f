//! SpreadsheetML 2003 writer (`.xls`)
//!
//! Emits the XML spreadsheet dialect Excel opens natively. Every cell is
//! written as `ss:Type="String"` and the header row uses a bold, solid-filled
//! style.

use chrono::{SecondsFormat, Utc};
use tracing::debug;

use crate::error::Result;
use crate::export::types::{ExportConfig, ExportData};
use crate::utils::string::escape_xml;

use super::FormatWriter;

const HEADER_STYLE_ID: &str = "Header";

/// Writer for SpreadsheetML documents
#[derive(Debug)]
pub struct SpreadsheetMlWriter {
    title: String,
    author: String,
    sheet_name: String,
    rows: Vec<String>,
}

impl SpreadsheetMlWriter {
    /// Create a writer from export settings
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            title: config.title.clone().unwrap_or_default(),
            author: config.author.clone().unwrap_or_default(),
            sheet_name: config.sheet_name().to_string(),
            rows: Vec::new(),
        }
    }

    fn row_xml(cells: &[String], style: Option<&str>) -> String {
        let style_attr = style
            .map(|id| format!(" ss:StyleID=\"{}\"", id))
            .unwrap_or_default();
        let mut xml = String::from("   <Row>\n");
        for cell in cells {
            xml.push_str(&format!(
                "    <Cell{}><Data ss:Type=\"String\">{}</Data></Cell>\n",
                style_attr,
                escape_xml(cell)
            ));
        }
        xml.push_str("   </Row>\n");
        xml
    }
}

impl FormatWriter for SpreadsheetMlWriter {
    fn write_header(&mut self, headers: &[String]) -> Result<()> {
        self.rows.push(Self::row_xml(headers, Some(HEADER_STYLE_ID)));
        Ok(())
    }

    fn write_row(&mut self, cells: &[String]) -> Result<()> {
        self.rows.push(Self::row_xml(cells, None));
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<ExportData> {
        let created = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<?mso-application progid=\"Excel.Sheet\"?>\n");
        xml.push_str("<Workbook xmlns=\"urn:schemas-microsoft-com:office:spreadsheet\"\n");
        xml.push_str(" xmlns:o=\"urn:schemas-microsoft-com:office:office\"\n");
        xml.push_str(" xmlns:x=\"urn:schemas-microsoft-com:office:excel\"\n");
        xml.push_str(" xmlns:ss=\"urn:schemas-microsoft-com:office:spreadsheet\"\n");
        xml.push_str(" xmlns:html=\"http://www.w3.org/TR/REC-html40\">\n");

        xml.push_str(" <DocumentProperties xmlns=\"urn:schemas-microsoft-com:office:office\">\n");
        xml.push_str(&format!("  <Title>{}</Title>\n", escape_xml(&self.title)));
        xml.push_str(&format!("  <Author>{}</Author>\n", escape_xml(&self.author)));
        xml.push_str(&format!("  <Created>{}</Created>\n", created));
        xml.push_str(" </DocumentProperties>\n");

        xml.push_str(" <Styles>\n");
        xml.push_str(&format!("  <Style ss:ID=\"{}\">\n", HEADER_STYLE_ID));
        xml.push_str("   <Font ss:Bold=\"1\"/>\n");
        xml.push_str("   <Interior ss:Color=\"#D9E1F2\" ss:Pattern=\"Solid\"/>\n");
        xml.push_str("  </Style>\n");
        xml.push_str(" </Styles>\n");

        xml.push_str(&format!(
            " <Worksheet ss:Name=\"{}\">\n",
            escape_xml(&self.sheet_name)
        ));
        xml.push_str("  <Table>\n");
        for row in &self.rows {
            xml.push_str(row);
        }
        xml.push_str("  </Table>\n");
        xml.push_str(" </Worksheet>\n");
        xml.push_str("</Workbook>\n");

        debug!("Finalized SpreadsheetML document ({} rows)", self.rows.len());
        Ok(ExportData::Text(xml))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn render(config: &ExportConfig, header: &[&str], rows: &[&[&str]]) -> String {
        let mut writer = Box::new(SpreadsheetMlWriter::new(config));
        writer.write_header(&strings(header)).unwrap();
        for row in rows {
            writer.write_row(&strings(row)).unwrap();
        }
        writer.finish().unwrap().as_text().unwrap().to_string()
    }

    #[test]
    fn test_document_structure() {
        let config = ExportConfig::new()
            .with_title("History Booking Log")
            .with_author("Reservations")
            .with_sheet_name("Bookings");
        let xml = render(&config, &["Booking ID"], &[&["BK-001"]]);

        assert!(xml.starts_with("<?xml version=\"1.0\""));
        assert!(xml.contains("<Title>History Booking Log</Title>"));
        assert!(xml.contains("<Author>Reservations</Author>"));
        assert!(xml.contains("<Worksheet ss:Name=\"Bookings\">"));
        assert!(xml.contains(
            "<Cell ss:StyleID=\"Header\"><Data ss:Type=\"String\">Booking ID</Data></Cell>"
        ));
        assert!(xml.contains("<Cell><Data ss:Type=\"String\">BK-001</Data></Cell>"));
        assert!(xml.trim_end().ends_with("</Workbook>"));
    }

    #[test]
    fn test_cells_are_escaped() {
        let xml = render(&ExportConfig::new(), &["Hotel"], &[&["Tom & Jerry <Inn>"]]);
        assert!(xml.contains("Tom &amp; Jerry &lt;Inn&gt;"));
        assert!(xml.contains("<Worksheet ss:Name=\"Sheet1\">"));
    }
}
