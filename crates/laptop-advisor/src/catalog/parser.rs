use csv::StringRecord;
use std::io::Read;
use tracing::debug;

pub(crate) const BRAND: &str = "Brand";
pub(crate) const MODEL: &str = "Model";
pub(crate) const PROCESSOR: &str = "Processor";
pub(crate) const MEMORY: &str = "Memory (RAM)";
pub(crate) const STORAGE: &str = "Storage";
pub(crate) const DISPLAY: &str = "Display";
pub(crate) const OPERATING_SYSTEM: &str = "Operating System";
pub(crate) const GRAPHICS: &str = "Graphics";
pub(crate) const PRICE_DETAILS: &str = "Price Details";
pub(crate) const REVIEW_DETAILS: &str = "Review Details";
pub(crate) const AVAILABILITY: &str = "Availability";
pub(crate) const PROMOS: &str = "Promos / Offers";
pub(crate) const QA: &str = "Q&A / FAQ";

/// Raw dataset row: known columns by name, everything else kept as extras.
#[derive(Debug, Default, Clone)]
pub(crate) struct LaptopRow {
    pub(crate) brand: Option<String>,
    pub(crate) model: Option<String>,
    pub(crate) processor: Option<String>,
    pub(crate) memory: Option<String>,
    pub(crate) storage: Option<String>,
    pub(crate) display: Option<String>,
    pub(crate) operating_system: Option<String>,
    pub(crate) graphics: Option<String>,
    pub(crate) price_details: Option<String>,
    pub(crate) review_details: Option<String>,
    pub(crate) availability: Option<String>,
    pub(crate) promos: Option<String>,
    pub(crate) qa: Option<String>,
    pub(crate) extras: Vec<(String, String)>,
}

/// Reads every row the CSV reader can decode. A row that fails to decode is
/// skipped so one bad line never costs the rest of the dataset; only header
/// failures are returned as errors.
pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<LaptopRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for (line, record) in csv_reader.records().enumerate() {
        match record {
            Ok(record) => rows.push(row_from_record(&headers, &record)),
            Err(err) => debug!(line = line + 2, error = %err, "skipping unreadable dataset row"),
        }
    }

    Ok(rows)
}

fn row_from_record(headers: &[String], record: &StringRecord) -> LaptopRow {
    let mut row = LaptopRow::default();

    for (header, value) in headers.iter().zip(record.iter()) {
        let value = non_empty(value);
        let slot = match header.as_str() {
            BRAND => &mut row.brand,
            MODEL => &mut row.model,
            PROCESSOR => &mut row.processor,
            MEMORY => &mut row.memory,
            STORAGE => &mut row.storage,
            DISPLAY => &mut row.display,
            OPERATING_SYSTEM => &mut row.operating_system,
            GRAPHICS => &mut row.graphics,
            PRICE_DETAILS => &mut row.price_details,
            REVIEW_DETAILS => &mut row.review_details,
            AVAILABILITY => &mut row.availability,
            PROMOS => &mut row.promos,
            QA => &mut row.qa,
            other => {
                if let Some(value) = value {
                    row.extras.push((other.to_string(), value));
                }
                continue;
            }
        };
        *slot = value;
    }

    row
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn maps_known_columns_and_keeps_extras() {
        let csv = "\u{feff}Brand,Model,Battery,Price Details,Weight\n\
Lenovo,ThinkPad E14,Up to 10 hours,\"{'Current Price': '$899.00'}\",\n";
        let rows = parse_rows(Cursor::new(csv)).expect("parse");
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.brand.as_deref(), Some("Lenovo"));
        assert_eq!(row.model.as_deref(), Some("ThinkPad E14"));
        assert_eq!(
            row.price_details.as_deref(),
            Some("{'Current Price': '$899.00'}")
        );
        assert_eq!(
            row.extras,
            vec![("Battery".to_string(), "Up to 10 hours".to_string())]
        );
    }

    #[test]
    fn short_rows_and_nan_cells_become_missing_values() {
        let csv = "Brand,Model,Processor\nHP,ProBook 440\nDell,Latitude,NaN\n";
        let rows = parse_rows(Cursor::new(csv)).expect("parse");
        assert_eq!(rows.len(), 2);
        assert!(rows[0].processor.is_none());
        assert!(rows[1].processor.is_none());
    }
}
