//! DOCX, XLSX and PPTX text extraction.
//!
//! Word and PowerPoint files are read straight from their OOXML parts;
//! spreadsheets go through calamine. Slides come out in presentation
//! order, not in the order their parts sit in the package.

use super::ExtractError;
use calamine::{open_workbook, Data, Reader, Xlsx, XlsxError};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader as XmlReader;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

type Package = zip::ZipArchive<File>;

pub(super) fn read_docx(path: &Path) -> Result<String, ExtractError> {
    docx_text(path).map_err(|detail| ExtractError::Office { ext: ".docx", detail })
}

pub(super) fn read_xlsx(path: &Path) -> Result<String, ExtractError> {
    xlsx_text(path).map_err(|detail| ExtractError::Office { ext: ".xlsx", detail })
}

pub(super) fn read_pptx(path: &Path) -> Result<String, ExtractError> {
    pptx_text(path).map_err(|detail| ExtractError::Office { ext: ".pptx", detail })
}

// ---------------------------------------------------------------------------
// Package helpers
// ---------------------------------------------------------------------------

fn open_package(path: &Path) -> Result<Package, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    zip::ZipArchive::new(file).map_err(|e| e.to_string())
}

fn read_part(pkg: &mut Package, name: &str) -> Result<String, String> {
    let mut part = pkg.by_name(name).map_err(|e| format!("{name}: {e}"))?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| format!("{name}: {e}"))?;
    Ok(xml)
}

fn parent_is(stack: &[Vec<u8>], name: &[u8]) -> bool {
    stack.last().map(Vec::as_slice) == Some(name)
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, String> {
    for a in e.attributes() {
        let a = a.map_err(|e| e.to_string())?;
        if a.key.as_ref() == key {
            let value = a.unescape_value().map_err(|e| e.to_string())?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

// ---------------------------------------------------------------------------
// DOCX
// ---------------------------------------------------------------------------

fn docx_text(path: &Path) -> Result<String, String> {
    let mut pkg = open_package(path)?;
    let xml = read_part(&mut pkg, "word/document.xml")?;
    Ok(docx_paragraphs(&xml)?.join("\n"))
}

/// Text of each top-level body paragraph. Table cells and text boxes are skipped.
fn docx_paragraphs(xml: &str) -> Result<Vec<String>, String> {
    let mut reader = XmlReader::from_str(xml);
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;
    // Text boxes appear twice (mc:Choice and mc:Fallback), both inside a body paragraph.
    let mut text_box_depth = 0usize;

    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if name == b"p" && parent_is(&stack, b"body") {
                    current = Some(String::new());
                }
                match name.as_slice() {
                    b"txbxContent" => text_box_depth += 1,
                    b"t" if text_box_depth == 0 => in_text = true,
                    _ => {}
                }
                stack.push(name);
            }
            Event::Empty(e) => {
                let name = e.local_name();
                if name.as_ref() == b"p" && parent_is(&stack, b"body") {
                    paragraphs.push(String::new());
                } else if let Some(text) = current.as_mut() {
                    if text_box_depth == 0 && parent_is(&stack, b"r") {
                        match name.as_ref() {
                            b"tab" => text.push('\t'),
                            b"br" | b"cr" => text.push('\n'),
                            _ => {}
                        }
                    }
                }
            }
            Event::Text(t) if in_text => {
                if let Some(text) = current.as_mut() {
                    text.push_str(&t.unescape().map_err(|e| e.to_string())?);
                }
            }
            Event::End(e) => {
                stack.pop();
                match e.local_name().as_ref() {
                    b"t" => in_text = false,
                    b"txbxContent" => text_box_depth = text_box_depth.saturating_sub(1),
                    b"p" if parent_is(&stack, b"body") => {
                        if let Some(text) = current.take() {
                            paragraphs.push(text);
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

// ---------------------------------------------------------------------------
// XLSX
// ---------------------------------------------------------------------------

fn xlsx_text(path: &Path) -> Result<String, String> {
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e: XlsxError| e.to_string())?;
    let mut content = Vec::new();

    for name in workbook.sheet_names().to_vec() {
        content.push(format!("\n--- Spreadsheet: {name} ---\n"));
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| format!("sheet '{name}': {e}"))?;
        // calamine trims to the first used cell; rows and columns count from A1.
        let Some((first_row, first_col)) = range.start() else {
            continue;
        };
        let lead = vec![String::new(); first_col as usize];
        let blank = vec![String::new(); lead.len() + range.width()].join(", ");
        content.extend((0..first_row).map(|_| blank.clone()));
        for row in range.rows() {
            let cells: Vec<String> = lead.iter().cloned().chain(row.iter().map(cell_text)).collect();
            content.push(cells.join(", "));
        }
    }
    content.push("\n".to_string());

    Ok(content.join("\n"))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// PPTX
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct SlideShape {
    is_title: bool,
    has_text_frame: bool,
    text: String,
}

fn pptx_text(path: &Path) -> Result<String, String> {
    let mut pkg = open_package(path)?;
    let mut content = Vec::new();

    for (index, part) in slide_parts(&mut pkg)?.iter().enumerate() {
        let xml = read_part(&mut pkg, part)?;
        let shapes = slide_shapes(&xml)?;
        let title = shapes
            .iter()
            .find(|s| s.is_title)
            .map(|s| s.text.as_str())
            .unwrap_or("N/A");
        content.push(format!("\n--- Slide {} (Title: {}) ---\n", index + 1, title));
        content.extend(
            shapes
                .into_iter()
                .filter(|s| s.has_text_frame)
                .map(|s| s.text),
        );
    }
    content.push("\n".to_string());

    Ok(content.join("\n"))
}

/// Slide part names in presentation order. The order is that of `sldIdLst`
/// in `presentation.xml`, resolved through its relationships; `slideN.xml`
/// numbering says nothing about where a slide sits in the deck.
fn slide_parts(pkg: &mut Package) -> Result<Vec<String>, String> {
    let presentation = read_part(pkg, "ppt/presentation.xml")?;
    let rels = read_part(pkg, "ppt/_rels/presentation.xml.rels")?;
    let targets = relationship_targets(&rels)?;

    let mut parts = Vec::new();
    for rel_id in slide_rel_ids(&presentation)? {
        match targets.get(&rel_id) {
            Some(target) => parts.push(resolve_target("ppt", target)),
            None => return Err(format!("slide relationship '{rel_id}' has no target")),
        }
    }
    Ok(parts)
}

fn resolve_target(base: &str, target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("{base}/{target}"),
    }
}

fn relationship_targets(xml: &str) -> Result<HashMap<String, String>, String> {
    let mut reader = XmlReader::from_str(xml);
    let mut targets = HashMap::new();
    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attr(&e, b"Id")?, attr(&e, b"Target")?) {
                    targets.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(targets)
}

fn slide_rel_ids(xml: &str) -> Result<Vec<String>, String> {
    let mut reader = XmlReader::from_str(xml);
    let mut ids = Vec::new();
    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sldId" => {
                // The relationship id is the namespaced `r:id`, not the numeric `id`.
                for a in e.attributes() {
                    let a = a.map_err(|e| e.to_string())?;
                    if a.key.prefix().is_some() && a.key.local_name().as_ref() == b"id" {
                        ids.push(a.unescape_value().map_err(|e| e.to_string())?.into_owned());
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(ids)
}

fn is_title_placeholder(e: &BytesStart<'_>) -> Result<bool, String> {
    Ok(matches!(
        attr(e, b"type")?.as_deref(),
        Some("title") | Some("ctrTitle")
    ))
}

/// Top-level shapes of a slide in document order.
fn slide_shapes(xml: &str) -> Result<Vec<SlideShape>, String> {
    let mut reader = XmlReader::from_str(xml);
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut shapes = Vec::new();
    let mut shape: Option<SlideShape> = None;
    let mut paragraphs: Vec<String> = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if let Some(s) = shape.as_mut() {
                    match name.as_slice() {
                        b"txBody" => s.has_text_frame = true,
                        b"p" => paragraphs.push(String::new()),
                        b"t" => in_text = true,
                        b"ph" => s.is_title |= is_title_placeholder(&e)?,
                        _ => {}
                    }
                } else if name == b"sp" && parent_is(&stack, b"spTree") {
                    shape = Some(SlideShape::default());
                    paragraphs.clear();
                }
                stack.push(name);
            }
            Event::Empty(e) => {
                if let Some(s) = shape.as_mut() {
                    match e.local_name().as_ref() {
                        b"ph" => s.is_title |= is_title_placeholder(&e)?,
                        b"p" => paragraphs.push(String::new()),
                        b"br" => {
                            if let Some(p) = paragraphs.last_mut() {
                                p.push('\n');
                            }
                        }
                        _ => {}
                    }
                }
            }
            Event::Text(t) if in_text => {
                if let Some(p) = paragraphs.last_mut() {
                    p.push_str(&t.unescape().map_err(|e| e.to_string())?);
                }
            }
            Event::End(e) => {
                stack.pop();
                match e.local_name().as_ref() {
                    b"t" => in_text = false,
                    b"sp" if parent_is(&stack, b"spTree") => {
                        if let Some(mut s) = shape.take() {
                            s.text = paragraphs.join("\n");
                            paragraphs.clear();
                            shapes.push(s);
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(shapes)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::fixtures::write_zip;
    use tempfile::TempDir;

    const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

    #[test]
    fn docx_joins_body_paragraphs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("memo.docx");
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="{W_NS}"><w:body>
<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>Hello</w:t></w:r><w:r><w:t xml:space="preserve"> world</w:t></w:r></w:p>
<w:p/>
<w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
<w:p><w:r><w:t>Tom &amp; Jerry</w:t><w:tab/><w:t>end</w:t></w:r></w:p>
</w:body></w:document>"#
        );
        write_zip(&path, &[("word/document.xml", document.as_str())]);

        let text = read_docx(&path).unwrap();
        assert_eq!(text, "Hello world\n\nTom & Jerry\tend");
    }

    #[test]
    fn docx_skips_text_boxes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("boxed.docx");
        let text_box = "<w:txbxContent><w:p><w:r><w:t>boxed</w:t></w:r></w:p></w:txbxContent>";
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="{W_NS}" xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006" xmlns:wps="http://schemas.microsoft.com/office/word/2010/wordprocessingShape" xmlns:v="urn:schemas-microsoft-com:vml"><w:body>
<w:p><w:r><w:t>Before</w:t></w:r><w:r><mc:AlternateContent><mc:Choice Requires="wps"><w:drawing><wps:wsp><wps:txbx>{text_box}</wps:txbx></wps:wsp></w:drawing></mc:Choice><mc:Fallback><w:pict><v:shape><v:textbox>{text_box}</v:textbox></v:shape></w:pict></mc:Fallback></mc:AlternateContent></w:r><w:r><w:tab/><w:t>After</w:t></w:r></w:p>
<w:p><w:r><w:t>Next</w:t></w:r></w:p>
</w:body></w:document>"#
        );
        write_zip(&path, &[("word/document.xml", document.as_str())]);

        let text = read_docx(&path).unwrap();
        assert_eq!(text, "Before\tAfter\nNext");
    }

    #[test]
    fn docx_without_document_part_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.docx");
        write_zip(&path, &[("word/other.xml", "<x/>")]);
        let err = read_docx(&path).unwrap_err();
        assert!(err.to_string().contains("(.docx)"));
    }

    const SPREADSHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
    const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
    const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

    /// Workbook with one worksheet per `(name, sheetData rows)` entry.
    fn write_xlsx(path: &Path, sheets: &[(&str, &str)]) {
        let mut content_types = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
"#,
        );
        let mut sheet_list = String::new();
        let mut sheet_rels = String::new();
        let mut parts = Vec::new();
        for (i, (name, rows)) in sheets.iter().enumerate() {
            let n = i + 1;
            content_types.push_str(&format!(
                r#"<Override PartName="/xl/worksheets/sheet{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
"#
            ));
            sheet_list.push_str(&format!(r#"<sheet name="{name}" sheetId="{n}" r:id="rId{n}"/>"#));
            sheet_rels.push_str(&format!(
                r#"<Relationship Id="rId{n}" Type="{REL_NS}/worksheet" Target="worksheets/sheet{n}.xml"/>"#
            ));
            parts.push((
                format!("xl/worksheets/sheet{n}.xml"),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="{SPREADSHEET_NS}"><sheetData>{rows}</sheetData></worksheet>"#
                ),
            ));
        }
        content_types.push_str("</Types>");

        let root_rels = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="{PKG_REL_NS}"><Relationship Id="rId1" Type="{REL_NS}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
        );
        let workbook = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<workbook xmlns="{SPREADSHEET_NS}" xmlns:r="{REL_NS}"><sheets>{sheet_list}</sheets></workbook>"#
        );
        let workbook_rels = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="{PKG_REL_NS}">{sheet_rels}</Relationships>"#
        );

        let mut entries = vec![
            ("[Content_Types].xml", content_types.as_str()),
            ("_rels/.rels", root_rels.as_str()),
            ("xl/workbook.xml", workbook.as_str()),
            ("xl/_rels/workbook.xml.rels", workbook_rels.as_str()),
        ];
        entries.extend(parts.iter().map(|(name, body)| (name.as_str(), body.as_str())));
        write_zip(path, &entries);
    }

    const PEOPLE_ROWS: &str = r#"<row r="1"><c r="A1" t="inlineStr"><is><t>name</t></is></c><c r="B1" t="inlineStr"><is><t>role</t></is></c><c r="C1" t="inlineStr"><is><t>age</t></is></c></row>
<row r="2"><c r="A2" t="inlineStr"><is><t>Ada</t></is></c><c r="C2"><v>36</v></c></row>"#;

    const TOTALS_ROWS: &str =
        r#"<row r="1"><c r="A1" t="inlineStr"><is><t>total</t></is></c><c r="B1"><v>1</v></c></row>"#;

    fn write_team_xlsx(path: &Path) {
        write_xlsx(path, &[("People", PEOPLE_ROWS), ("Totals", TOTALS_ROWS)]);
    }

    #[test]
    fn xlsx_emits_one_header_per_sheet_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("team.xlsx");
        write_team_xlsx(&path);

        let text = read_xlsx(&path).unwrap();
        let headers: Vec<&str> = text
            .lines()
            .filter(|l| l.starts_with("--- Spreadsheet:"))
            .collect();
        assert_eq!(
            headers,
            vec!["--- Spreadsheet: People ---", "--- Spreadsheet: Totals ---"]
        );
        assert!(text.contains("name, role, age"));
        assert!(text.contains("total, 1"));
    }

    #[test]
    fn xlsx_empty_cell_renders_as_empty_string() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("team.xlsx");
        write_team_xlsx(&path);

        let text = read_xlsx(&path).unwrap();
        assert!(text.contains("Ada, , 36"), "got: {text}");
        assert!(!text.contains("None"));
    }

    #[test]
    fn xlsx_rows_and_columns_count_from_a1() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("offset.xlsx");
        let rows = r#"<row r="2"><c r="B2" t="inlineStr"><is><t>x</t></is></c><c r="C2" t="inlineStr"><is><t>y</t></is></c></row>"#;
        write_xlsx(&path, &[("S", rows)]);

        let text = read_xlsx(&path).unwrap();
        assert_eq!(text, "\n--- Spreadsheet: S ---\n\n, , \n, x, y\n\n");
    }

    const P_NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
    const A_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

    fn slide(shapes: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<p:sld xmlns:a="{A_NS}" xmlns:p="{P_NS}" xmlns:r="{REL_NS}"><p:cSld><p:spTree>
<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>
{shapes}
</p:spTree></p:cSld></p:sld>"#
        )
    }

    fn text_shape(placeholder: &str, paragraphs: &[&str]) -> String {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<a:p><a:r><a:t>{p}</a:t></a:r></a:p>"))
            .collect();
        format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Shape"/><p:cNvSpPr/><p:nvPr>{placeholder}</p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/>{body}</p:txBody></p:sp>"#
        )
    }

    #[test]
    fn pptx_slides_follow_presentation_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deck.pptx");

        // slide2.xml is listed first, so it is "Slide 1".
        let presentation = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<p:presentation xmlns:p="{P_NS}" xmlns:r="{REL_NS}"><p:sldIdLst>
<p:sldId id="256" r:id="rId3"/><p:sldId id="257" r:id="rId2"/>
</p:sldIdLst></p:presentation>"#
        );
        let rels = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="{PKG_REL_NS}">
<Relationship Id="rId2" Type="{REL_NS}/slide" Target="slides/slide1.xml"/>
<Relationship Id="rId3" Type="{REL_NS}/slide" Target="slides/slide2.xml"/>
</Relationships>"#
        );
        let titled = slide(&format!(
            "{}{}",
            text_shape(r#"<p:ph type="title"/>"#, &["Quarterly Review"]),
            text_shape("", &["Revenue up", "Costs down"])
        ));
        let untitled = slide(&text_shape("", &["Thanks"]));

        write_zip(
            &path,
            &[
                ("ppt/presentation.xml", presentation.as_str()),
                ("ppt/_rels/presentation.xml.rels", rels.as_str()),
                ("ppt/slides/slide1.xml", untitled.as_str()),
                ("ppt/slides/slide2.xml", titled.as_str()),
            ],
        );

        let text = read_pptx(&path).unwrap();
        let first = text.find("--- Slide 1 (Title: Quarterly Review) ---").unwrap();
        let second = text.find("--- Slide 2 (Title: N/A) ---").unwrap();
        assert!(first < second);
        assert!(text.contains("Revenue up\nCosts down"));
        assert!(text[second..].contains("Thanks"));
    }
}
