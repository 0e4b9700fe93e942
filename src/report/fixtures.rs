//! Workbook fixtures shared by the report tests.
//!
//! Exports are authored as minimal SheetML packages with inline strings, since
//! telemetry exports carry empty-string header cells that umya-spreadsheet
//! will not serialize.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use super::types::CellValue;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

/// Write `rows` into the first sheet of a new workbook, row 1 first.
/// `Some(Empty)` and `Some(Text(""))` become real empty-string cells.
pub fn write_workbook(path: &Path, rows: &[Vec<Option<CellValue>>]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", ROOT_RELS.to_string()),
        ("xl/workbook.xml", WORKBOOK.to_string()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.to_string()),
        ("xl/worksheets/sheet1.xml", sheet_xml(rows)),
    ];

    for (name, body) in parts {
        zip.start_file(name, SimpleFileOptions::default()).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

fn sheet_xml(rows: &[Vec<Option<CellValue>>]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );

    for (row_idx, row) in rows.iter().enumerate() {
        let row_num = row_idx + 1;
        xml.push_str(&format!(r#"<row r="{}">"#, row_num));

        for (col_idx, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", column_index_to_letter(col_idx as u32), row_num);
            match cell {
                None => {}
                Some(CellValue::Empty) => {
                    xml.push_str(&format!(r#"<c r="{}" t="inlineStr"><is><t></t></is></c>"#, reference));
                }
                Some(CellValue::Text(s)) => {
                    xml.push_str(&format!(
                        r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                        reference,
                        escape_xml(s)
                    ));
                }
                Some(CellValue::Number(n)) => {
                    xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, n));
                }
            }
        }

        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

/// Convert column index (0-based) to Excel column letter (A, B, ..., Z, AA, AB, ...)
fn column_index_to_letter(index: u32) -> String {
    let mut result = String::new();
    let mut n = index + 1;

    while n > 0 {
        n -= 1;
        let c = (b'A' + (n % 26) as u8) as char;
        result.insert(0, c);
        n /= 26;
    }

    result
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// A stops-style export: five title rows, the header row, then `data`
pub fn write_stops_export(path: &Path, data: &[(&str, f64, f64, f64)]) {
    let mut rows = vec![
        vec![Some(CellValue::text("Stops report"))],
        vec![Some(CellValue::text("Period"))],
        vec![],
        vec![Some(CellValue::text("Generated by telemetry portal"))],
        vec![],
        vec![
            Some(CellValue::text("Vehicle")),
            Some(CellValue::text("Parking time")),
            Some(CellValue::text("Ignition on")),
            Some(CellValue::text("Engine on")),
        ],
    ];

    for (vehicle, parking, ignition, engine) in data {
        rows.push(vec![
            Some(CellValue::text(*vehicle)),
            Some(CellValue::Number(*parking)),
            Some(CellValue::Number(*ignition)),
            Some(CellValue::Number(*engine)),
        ]);
    }

    write_workbook(path, &rows);
}

/// A work-times export as the portal produces it: four title rows, then a
/// header whose first six cells are blank strings, then `data` rows of
/// (date, licence plate, excessive idling minutes).
pub fn write_work_times_export(path: &Path, data: &[(&str, &str, f64)]) {
    let blank = || Some(CellValue::text(""));
    let mut rows = vec![
        vec![Some(CellValue::text("Work times report"))],
        vec![],
        vec![Some(CellValue::text("Fleet: all vehicles"))],
        vec![],
        vec![
            blank(),
            blank(),
            blank(),
            blank(),
            blank(),
            blank(),
            Some(CellValue::text("Driving time")),
            Some(CellValue::text("Driving time")),
            Some(CellValue::text("Excessive idling")),
            Some(CellValue::text("Distance")),
            Some(CellValue::text("Distance")),
        ],
    ];

    for (date, plate, idling) in data {
        rows.push(vec![
            Some(CellValue::text(*date)),
            Some(CellValue::text(*plate)),
            Some(CellValue::text("Truck")),
            Some(CellValue::text("Delivery truck")),
            Some(CellValue::Number(0.3)),
            Some(CellValue::text("Depot")),
            Some(CellValue::Number(0.25)),
            Some(CellValue::Number(0.25)),
            Some(CellValue::Number(*idling)),
            Some(CellValue::Number(42.0)),
            Some(CellValue::Number(42.0)),
        ]);
    }

    write_workbook(path, &rows);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_index_to_letter() {
        assert_eq!(column_index_to_letter(0), "A");
        assert_eq!(column_index_to_letter(25), "Z");
        assert_eq!(column_index_to_letter(26), "AA");
        assert_eq!(column_index_to_letter(52), "BA");
    }
}
