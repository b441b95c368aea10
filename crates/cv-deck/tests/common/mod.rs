#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use cv_deck::instructions::{InstructionFormatError, InstructionRow, InstructionSource};
use cv_deck::pipeline::RunInputs;
use zip::write::FileOptions;
use zip::ZipWriter;

pub const CV_TEXT: &str = "Experienced engineer...";

pub fn run_stamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 5, 20)
        .expect("valid date")
        .and_hms_opt(14, 30, 0)
        .expect("valid time")
}

/// Instruction rows served from memory so tests do not need a workbook writer.
#[derive(Debug, Clone, Default)]
pub struct StaticRows(pub Vec<InstructionRow>);

impl StaticRows {
    pub fn single(section: &str, field: &str, rule: &str, value: &str) -> Self {
        Self(vec![row(section, field, rule, value)])
    }
}

impl InstructionSource for StaticRows {
    fn read_rows(&self, _path: &Path) -> Result<Vec<InstructionRow>, InstructionFormatError> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyWorkbook;

impl InstructionSource for EmptyWorkbook {
    fn read_rows(&self, path: &Path) -> Result<Vec<InstructionRow>, InstructionFormatError> {
        Err(InstructionFormatError::MissingWorksheet {
            path: path.to_path_buf(),
        })
    }
}

pub fn row(section: &str, field: &str, rule: &str, value: &str) -> InstructionRow {
    [
        ("Section", section),
        ("Field", field),
        ("Rule", rule),
        ("Value", value),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .collect()
}

/// Writes the CV, an instructions placeholder, and a template into `dir`.
pub fn write_inputs(dir: &Path, template: &[u8], job_description: Option<&str>) -> RunInputs {
    let cv = dir.join("resume.txt");
    std::fs::write(&cv, CV_TEXT).expect("write cv");
    let instructions = dir.join("rules.xlsx");
    std::fs::write(&instructions, b"").expect("write instructions");
    let template_path = dir.join("template.pptx");
    std::fs::write(&template_path, template).expect("write template");

    let job_description = job_description.map(|text| {
        let path = dir.join("jd.txt");
        std::fs::write(&path, text).expect("write job description");
        path
    });

    RunInputs {
        cv,
        instructions,
        template: template_path,
        job_description,
        output_dir: dir.join("out"),
    }
}

pub fn output_dir(inputs: &RunInputs) -> PathBuf {
    std::fs::create_dir_all(&inputs.output_dir).expect("create output dir");
    inputs.output_dir.clone()
}

/// Smallest package the PPTX handle accepts: no slides, `layouts` layouts.
pub fn pptx_template(layouts: usize) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();
    let mut add = |name: &str, body: String| {
        zip.start_file(name, options).expect("start part");
        zip.write_all(body.as_bytes()).expect("write part");
    };

    add(
        "[Content_Types].xml",
        r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#.to_string(),
    );
    add(
        "ppt/presentation.xml",
        r#"<?xml version="1.0" encoding="UTF-8"?><p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst/><p:sldSz cx="9144000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#.to_string(),
    );
    add(
        "ppt/_rels/presentation.xml.rels",
        r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/></Relationships>"#.to_string(),
    );
    for number in 1..=layouts {
        add(
            &format!("ppt/slideLayouts/slideLayout{number}.xml"),
            format!(r#"<p:sldLayout xmlns:p="p"><p:cSld name="Layout {number}"/></p:sldLayout>"#),
        );
    }
    drop(add);

    zip.finish().expect("finish template").into_inner()
}

/// Minimal `.xlsx` with one worksheet. Empty strings leave the cell out
/// entirely; numeric strings become number cells.
pub fn xlsx_workbook(rows: &[&[&str]]) -> Vec<u8> {
    let mut sheet_rows = String::new();
    for (row_index, cells) in rows.iter().enumerate() {
        let number = row_index + 1;
        sheet_rows.push_str(&format!(r#"<row r="{number}">"#));
        for (column, value) in cells.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let reference = format!("{}{number}", char::from(b'A' + column as u8));
            if value.parse::<f64>().is_ok() {
                sheet_rows.push_str(&format!(r#"<c r="{reference}"><v>{value}</v></c>"#));
            } else {
                sheet_rows.push_str(&format!(
                    r#"<c r="{reference}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    value.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
                ));
            }
        }
        sheet_rows.push_str("</row>");
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();
    let mut add = |name: &str, body: String| {
        zip.start_file(name, options).expect("start part");
        zip.write_all(body.as_bytes()).expect("write part");
    };

    add(
        "[Content_Types].xml",
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
            r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            r#"</Types>"#
        )
        .to_string(),
    );
    add(
        "_rels/.rels",
        r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#.to_string(),
    );
    add(
        "xl/workbook.xml",
        r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Rules" sheetId="1" r:id="rId1"/></sheets></workbook>"#.to_string(),
    );
    add(
        "xl/_rels/workbook.xml.rels",
        r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#.to_string(),
    );
    add(
        "xl/worksheets/sheet1.xml",
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{sheet_rows}</sheetData></worksheet>"#
        ),
    );
    drop(add);

    zip.finish().expect("finish workbook").into_inner()
}
