//! Minimal PresentationML package handle: enough to append slides carrying
//! their layout's placeholders, fill title placeholders, and drop in text boxes.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::{DeckProvider, DocumentError, Region, SlideDocument};

const CONTENT_TYPES: &str = "[Content_Types].xml";
const PRESENTATION: &str = "ppt/presentation.xml";
const PRESENTATION_RELS: &str = "ppt/_rels/presentation.xml.rels";
const SLIDE_PREFIX: &str = "ppt/slides/slide";
const LAYOUT_PREFIX: &str = "ppt/slideLayouts/slideLayout";

const MAX_PART_PREALLOC: u64 = 1 << 20;

const SLIDE_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const SLIDE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const LAYOUT_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";

const BLANK_SLIDE: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
    r#"<p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
    r#"</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
);

#[derive(Debug, Clone, Copy, Default)]
pub struct PptxDeckProvider;

impl DeckProvider for PptxDeckProvider {
    fn open(&self, template: &Path) -> Result<Box<dyn SlideDocument>, DocumentError> {
        Ok(Box::new(PptxDocument::open(template)?))
    }
}

/// Every package part held in memory, in archive order. Slides are ordered
/// by the number in their part name.
#[derive(Debug, Clone)]
pub struct PptxDocument {
    parts: Vec<(String, Vec<u8>)>,
    slides: Vec<String>,
    layouts: Vec<String>,
}

impl PptxDocument {
    pub fn open(path: &Path) -> Result<Self, DocumentError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read + std::io::Seek>(reader: R) -> Result<Self, DocumentError> {
        let mut archive = ZipArchive::new(reader)?;
        let mut parts = Vec::with_capacity(archive.len());

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let mut bytes = Vec::with_capacity(initial_capacity(entry.size()));
            entry.read_to_end(&mut bytes)?;
            parts.push((name, bytes));
        }

        for required in [CONTENT_TYPES, PRESENTATION, PRESENTATION_RELS] {
            if !parts.iter().any(|(name, _)| name == required) {
                return Err(DocumentError::InvalidTemplate(format!("missing part {required}")));
            }
        }

        let slides = numbered_parts(&parts, SLIDE_PREFIX);
        let layouts = numbered_parts(&parts, LAYOUT_PREFIX);
        debug!(slides = slides.len(), layouts = layouts.len(), "opened presentation package");

        Ok(Self {
            parts,
            slides,
            layouts,
        })
    }

    pub fn write_to<W: Write + std::io::Seek>(&self, writer: W) -> Result<(), DocumentError> {
        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, bytes) in &self.parts {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(bytes)?;
        }
        zip.finish()?;
        Ok(())
    }

    /// XML of the slide at `index`.
    pub fn slide_xml(&self, index: usize) -> Result<String, DocumentError> {
        let name = self.slide_part(index)?.to_string();
        self.part_text(&name)
    }

    fn slide_part(&self, index: usize) -> Result<&str, DocumentError> {
        self.slides
            .get(index)
            .map(String::as_str)
            .ok_or(DocumentError::SlideOutOfRange {
                index,
                count: self.slides.len(),
            })
    }

    fn part_text(&self, name: &str) -> Result<String, DocumentError> {
        let bytes = self
            .parts
            .iter()
            .find(|(part, _)| part == name)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| DocumentError::InvalidTemplate(format!("missing part {name}")))?;
        String::from_utf8(bytes)
            .map_err(|_| DocumentError::InvalidTemplate(format!("part {name} is not UTF-8")))
    }

    fn set_part_text(&mut self, name: &str, text: String) {
        match self.parts.iter_mut().find(|(part, _)| part == name) {
            Some((_, bytes)) => *bytes = text.into_bytes(),
            None => self.parts.push((name.to_string(), text.into_bytes())),
        }
    }

    fn register_slide(&mut self, slide_name: &str, number: usize) -> Result<(), DocumentError> {
        let content_types = self.part_text(CONTENT_TYPES)?;
        let override_entry = format!(
            r#"<Override PartName="/{slide_name}" ContentType="{SLIDE_CONTENT_TYPE}"/>"#
        );
        let content_types = insert_before(&content_types, "</Types>", &override_entry)?;
        self.set_part_text(CONTENT_TYPES, content_types);

        let rels = self.part_text(PRESENTATION_RELS)?;
        let rel_id = format!("rId{}", max_number_after(&rels, r#"Id="rId"#) + 1);
        let relationship = format!(
            r#"<Relationship Id="{rel_id}" Type="{SLIDE_REL_TYPE}" Target="slides/slide{number}.xml"/>"#
        );
        let rels = insert_before(&rels, "</Relationships>", &relationship)?;
        self.set_part_text(PRESENTATION_RELS, rels);

        let presentation = self.part_text(PRESENTATION)?;
        let slide_id = max_number_after(&presentation, r#"<p:sldId id=""#).max(255) + 1;
        let entry = format!(r#"<p:sldId id="{slide_id}" r:id="{rel_id}"/>"#);
        let presentation = if presentation.contains("</p:sldIdLst>") {
            insert_before(&presentation, "</p:sldIdLst>", &entry)?
        } else if presentation.contains("<p:sldIdLst/>") {
            presentation.replacen("<p:sldIdLst/>", &format!("<p:sldIdLst>{entry}</p:sldIdLst>"), 1)
        } else {
            let list = format!("<p:sldIdLst>{entry}</p:sldIdLst>");
            insert_before(&presentation, "<p:sldSz", &list)
                .or_else(|_| insert_before(&presentation, "<p:notesSz", &list))?
        };
        self.set_part_text(PRESENTATION, presentation);
        Ok(())
    }
}

impl SlideDocument for PptxDocument {
    fn slide_count(&self) -> usize {
        self.slides.len()
    }

    fn layout_count(&self) -> usize {
        self.layouts.len()
    }

    fn add_slide(&mut self, layout_index: usize) -> Result<usize, DocumentError> {
        let layout = self
            .layouts
            .get(layout_index)
            .ok_or(DocumentError::LayoutOutOfRange {
                index: layout_index,
                count: self.layouts.len(),
            })?;
        let layout_name = layout.clone();
        let layout_file = layout.rsplit('/').next().unwrap_or(layout.as_str()).to_string();

        let number = self
            .slides
            .iter()
            .filter_map(|name| part_number(name, SLIDE_PREFIX))
            .max()
            .unwrap_or(0)
            + 1;
        let slide_name = format!("{SLIDE_PREFIX}{number}.xml");
        let rels_name = format!("ppt/slides/_rels/slide{number}.xml.rels");
        let rels = format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                "\n",
                r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
                r#"<Relationship Id="rId1" Type="{}" Target="../slideLayouts/{}"/></Relationships>"#
            ),
            LAYOUT_REL_TYPE, layout_file
        );

        let layout_xml = self.part_text(&layout_name)?;
        let slide_xml = insert_before(BLANK_SLIDE, "</p:spTree>", &placeholder_shapes(&layout_xml))?;

        self.register_slide(&slide_name, number)?;
        self.set_part_text(&slide_name, slide_xml);
        self.set_part_text(&rels_name, rels);
        self.slides.push(slide_name);
        Ok(self.slides.len() - 1)
    }

    fn has_title_placeholder(&self, slide: usize) -> Result<bool, DocumentError> {
        let xml = self.slide_xml(slide)?;
        Ok(title_placeholder_offset(&xml).is_some())
    }

    fn set_title_text(&mut self, slide: usize, text: &str) -> Result<(), DocumentError> {
        let name = self.slide_part(slide)?.to_string();
        let xml = self.part_text(&name)?;
        let marker = title_placeholder_offset(&xml).ok_or(DocumentError::MissingTitlePlaceholder)?;

        let shape_start = xml[..marker]
            .rfind("<p:sp>")
            .ok_or_else(|| DocumentError::InvalidTemplate("title placeholder outside p:sp".into()))?;
        let shape_end = xml[marker..]
            .find("</p:sp>")
            .map(|offset| marker + offset)
            .ok_or_else(|| DocumentError::InvalidTemplate("unterminated title shape".into()))?;

        let body = format!(
            "<p:txBody><a:bodyPr/><a:lstStyle/>{}</p:txBody>",
            paragraphs(text)
        );
        let shape = &xml[shape_start..shape_end];
        let new_shape = match (shape.find("<p:txBody>"), shape.find("</p:txBody>")) {
            (Some(open), Some(close)) => format!(
                "{}{}{}",
                &shape[..open],
                body,
                &shape[close + "</p:txBody>".len()..]
            ),
            _ => format!("{shape}{body}"),
        };

        let updated = format!("{}{}{}", &xml[..shape_start], new_shape, &xml[shape_end..]);
        self.set_part_text(&name, updated);
        Ok(())
    }

    fn add_text_region(
        &mut self,
        slide: usize,
        region: Region,
        text: &str,
        word_wrap: bool,
    ) -> Result<(), DocumentError> {
        let name = self.slide_part(slide)?.to_string();
        let xml = self.part_text(&name)?;
        let shape_id = max_number_after(&xml, r#"<p:cNvPr id=""#) + 1;
        let wrap = if word_wrap { "square" } else { "none" };

        let shape = format!(
            concat!(
                r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="TextBox {index}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#,
                r#"<p:spPr><a:xfrm><a:off x="{left}" y="{top}"/><a:ext cx="{width}" cy="{height}"/></a:xfrm>"#,
                r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#,
                r#"<p:txBody><a:bodyPr wrap="{wrap}" rtlCol="0"><a:spAutoFit/></a:bodyPr><a:lstStyle/>{paragraphs}</p:txBody></p:sp>"#
            ),
            id = shape_id,
            index = shape_id - 1,
            left = region.left,
            top = region.top,
            width = region.width,
            height = region.height,
            wrap = wrap,
            paragraphs = paragraphs(text),
        );

        let updated = insert_before(&xml, "</p:spTree>", &shape)?;
        self.set_part_text(&name, updated);
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<(), DocumentError> {
        let file = File::create(path)?;
        self.write_to(file)?;
        debug!(path = %path.display(), "presentation package written");
        Ok(())
    }
}

/// Pre-allocation for a part, bounded so a forged size header cannot force a
/// huge allocation up front.
fn initial_capacity(declared_size: u64) -> usize {
    declared_size.min(MAX_PART_PREALLOC) as usize
}

fn numbered_parts(parts: &[(String, Vec<u8>)], prefix: &str) -> Vec<String> {
    let mut numbered: Vec<(usize, String)> = parts
        .iter()
        .filter_map(|(name, _)| part_number(name, prefix).map(|number| (number, name.clone())))
        .collect();
    numbered.sort();
    numbered.into_iter().map(|(_, name)| name).collect()
}

fn part_number(name: &str, prefix: &str) -> Option<usize> {
    name.strip_prefix(prefix)?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

/// Largest integer that directly follows any occurrence of `marker`.
fn max_number_after(xml: &str, marker: &str) -> usize {
    xml.match_indices(marker)
        .filter_map(|(offset, _)| {
            let digits: String = xml[offset + marker.len()..]
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            digits.parse::<usize>().ok()
        })
        .max()
        .unwrap_or(0)
}

fn insert_before(xml: &str, anchor: &str, fragment: &str) -> Result<String, DocumentError> {
    let offset = xml
        .rfind(anchor)
        .ok_or_else(|| DocumentError::InvalidTemplate(format!("missing {anchor}")))?;
    let mut updated = String::with_capacity(xml.len() + fragment.len());
    updated.push_str(&xml[..offset]);
    updated.push_str(fragment);
    updated.push_str(&xml[offset..]);
    Ok(updated)
}

/// Empty slide shapes for every text-bearing placeholder on a layout. Date,
/// footer, and slide-number placeholders are not carried over.
fn placeholder_shapes(layout_xml: &str) -> String {
    let mut shapes = String::new();
    let mut next_id = 2;
    let mut rest = layout_xml;

    while let Some(start) = rest.find("<p:sp>") {
        let shape_xml = &rest[start..];
        let Some(end) = shape_xml.find("</p:sp>") else {
            break;
        };
        let shape = &shape_xml[..end];
        rest = &shape_xml[end + "</p:sp>".len()..];

        let Some(placeholder) = placeholder_tag(shape) else {
            continue;
        };
        let kind = attribute(placeholder, "type").unwrap_or("obj");
        if matches!(kind, "dt" | "ftr" | "sldNum") {
            continue;
        }
        let name = attribute_of(shape, "<p:cNvPr", "name")
            .map(str::to_string)
            .unwrap_or_else(|| format!("Placeholder {}", next_id - 1));
        let text_body = if matches!(kind, "title" | "ctrTitle" | "subTitle" | "body" | "obj") {
            r#"<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang="en-US" dirty="0"/></a:p></p:txBody>"#
        } else {
            ""
        };

        shapes.push_str(&format!(
            concat!(
                r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#,
                r#"<p:nvPr>{placeholder}</p:nvPr></p:nvSpPr><p:spPr/>{text_body}</p:sp>"#
            ),
            id = next_id,
            name = name,
            placeholder = placeholder,
            text_body = text_body,
        ));
        next_id += 1;
    }
    shapes
}

fn placeholder_tag(shape: &str) -> Option<&str> {
    let start = shape.find("<p:ph")?;
    let tag_end = start + shape[start..].find('>')?;
    if shape[..tag_end].ends_with('/') {
        return Some(&shape[start..=tag_end]);
    }
    let close = start + shape[start..].find("</p:ph>")? + "</p:ph>".len();
    Some(&shape[start..close])
}

fn attribute_of<'a>(xml: &'a str, element: &str, name: &str) -> Option<&'a str> {
    let start = xml.find(element)?;
    let end = start + xml[start..].find('>')?;
    attribute(&xml[start..end], name)
}

fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let marker = format!(" {name}=\"");
    let start = tag.find(&marker)? + marker.len();
    let len = tag[start..].find('"')?;
    Some(&tag[start..start + len])
}

/// Byte offset of the first `<p:ph>` tag typed `title` or `ctrTitle`.
fn title_placeholder_offset(xml: &str) -> Option<usize> {
    xml.match_indices("<p:ph").find_map(|(offset, _)| {
        let tag_end = xml[offset..].find('>')? + offset;
        let tag = &xml[offset..tag_end];
        (tag.contains(r#"type="title""#) || tag.contains(r#"type="ctrTitle""#)).then_some(offset)
    })
}

fn paragraphs(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                r#"<a:p><a:endParaRPr lang="en-US" dirty="0"/></a:p>"#.to_string()
            } else {
                format!(
                    r#"<a:p><a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#,
                    escape_xml(line)
                )
            }
        })
        .collect()
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
