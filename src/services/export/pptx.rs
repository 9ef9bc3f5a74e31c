//! Minimal PresentationML package: one master, one blank layout, a theme, and
//! text-box slides positioned explicitly so no placeholders are needed.

use std::io::{Cursor, Write};

use chrono::NaiveDate;
use quick_xml::escape::escape;
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use super::{ExportDocument, ExportError};

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

// 4:3 slide in EMU.
const SLIDE_CX: i64 = 9_144_000;
const SLIDE_CY: i64 = 6_858_000;
const EMU_PER_INCH: i64 = 914_400;

const CONTENT_SLIDE_TITLE: &str = "Content";

struct TextBox<'a> {
    name: &'a str,
    x: i64,
    y: i64,
    cx: i64,
    cy: i64,
    size_pt: u32,
    bold: bool,
    text: &'a str,
}

/// Drops characters XML 1.0 cannot carry.
fn xml_text(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_control() || *c == '\t' || *c == '\n')
        .collect();
    escape(cleaned.as_str()).into_owned()
}

fn text_box_xml(id: usize, shape: &TextBox<'_>) -> String {
    let paragraphs: String = shape
        .text
        .lines()
        .map(|line| {
            format!(
                r#"<a:p><a:r><a:rPr lang="en-US" sz="{}" b="{}" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#,
                shape.size_pt * 100,
                u8::from(shape.bold),
                xml_text(line)
            )
        })
        .collect();
    let paragraphs = if paragraphs.is_empty() {
        "<a:p/>".to_string()
    } else {
        paragraphs
    };

    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr><p:txBody><a:bodyPr wrap="square"><a:normAutofit/></a:bodyPr><a:lstStyle/>{paragraphs}</p:txBody></p:sp>"#,
        name = xml_text(shape.name),
        x = shape.x,
        y = shape.y,
        cx = shape.cx,
        cy = shape.cy,
    )
}

fn slide_xml(shapes: &[TextBox<'_>]) -> String {
    let body: String = shapes
        .iter()
        .enumerate()
        .map(|(i, shape)| text_box_xml(i + 2, shape))
        .collect();

    format!(
        r#"{XML_DECL}<p:sld xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{body}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#
    )
}

fn title_slide(title: &str, date_line: &str) -> String {
    slide_xml(&[
        TextBox {
            name: "Title",
            x: EMU_PER_INCH / 2,
            y: 2 * EMU_PER_INCH,
            cx: SLIDE_CX - EMU_PER_INCH,
            cy: 3 * EMU_PER_INCH / 2,
            size_pt: 40,
            bold: true,
            text: title,
        },
        TextBox {
            name: "Subtitle",
            x: EMU_PER_INCH / 2,
            y: 4 * EMU_PER_INCH,
            cx: SLIDE_CX - EMU_PER_INCH,
            cy: EMU_PER_INCH,
            size_pt: 20,
            bold: false,
            text: date_line,
        },
    ])
}

fn content_slide(text: &str) -> String {
    slide_xml(&[
        TextBox {
            name: "Title",
            x: EMU_PER_INCH / 2,
            y: EMU_PER_INCH / 3,
            cx: SLIDE_CX - EMU_PER_INCH,
            cy: EMU_PER_INCH,
            size_pt: 32,
            bold: true,
            text: CONTENT_SLIDE_TITLE,
        },
        TextBox {
            name: "Body",
            x: EMU_PER_INCH / 2,
            y: 3 * EMU_PER_INCH / 2,
            cx: SLIDE_CX - EMU_PER_INCH,
            cy: SLIDE_CY - 2 * EMU_PER_INCH,
            size_pt: 18,
            bold: false,
            text,
        },
    ])
}

fn relationship(id: &str, kind: &str, target: &str) -> String {
    format!(r#"<Relationship Id="{id}" Type="{REL_BASE}/{kind}" Target="{target}"/>"#)
}

fn relationships(entries: &[String]) -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        entries.concat()
    )
}

fn content_types(slide_count: usize) -> String {
    let slides: String = (1..=slide_count)
        .map(|n| {
            format!(
                r#"<Override PartName="/ppt/slides/slide{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#
            )
        })
        .collect();

    format!(
        r#"{XML_DECL}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/><Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/><Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>{slides}<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/></Types>"#
    )
}

fn presentation(slide_count: usize) -> String {
    // Slide relationships start after the master (rId1) and theme (rId2).
    let slide_ids: String = (0..slide_count)
        .map(|i| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, i + 3))
        .collect();

    format!(
        r#"{XML_DECL}<p:presentation xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" saveSubsetFonts="1"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{slide_ids}</p:sldIdLst><p:sldSz cx="{SLIDE_CX}" cy="{SLIDE_CY}" type="screen4x3"/><p:notesSz cx="{SLIDE_CY}" cy="{SLIDE_CX}"/></p:presentation>"#
    )
}

fn presentation_rels(slide_count: usize) -> String {
    let mut entries = vec![
        relationship("rId1", "slideMaster", "slideMasters/slideMaster1.xml"),
        relationship("rId2", "theme", "theme/theme1.xml"),
    ];
    entries.extend((1..=slide_count).map(|n| {
        relationship(&format!("rId{}", n + 2), "slide", &format!("slides/slide{}.xml", n))
    }));
    relationships(&entries)
}

fn slide_master() -> String {
    format!(
        r#"{XML_DECL}<p:sldMaster xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#
    )
}

fn slide_layout() -> String {
    format!(
        r#"{XML_DECL}<p:sldLayout xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" type="blank" preserve="1"><p:cSld name="Blank"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#
    )
}

fn theme() -> String {
    let accent = |name: &str, rgb: &str| format!(r#"<a:{name}><a:srgbClr val="{rgb}"/></a:{name}>"#);
    let colors = [
        accent("dk2", "1F497D"),
        accent("lt2", "EEECE1"),
        accent("accent1", "4F81BD"),
        accent("accent2", "C0504D"),
        accent("accent3", "9BBB59"),
        accent("accent4", "8064A2"),
        accent("accent5", "4BACC6"),
        accent("accent6", "F79646"),
        accent("hlink", "0000FF"),
        accent("folHlink", "800080"),
    ]
    .concat();
    let fonts = r#"<a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/>"#;
    let fill = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    let line = format!(r#"<a:ln w="9525">{fill}</a:ln>"#);
    let effect = "<a:effectStyle><a:effectLst/></a:effectStyle>";

    format!(
        r#"{XML_DECL}<a:theme xmlns:a="{NS_A}" name="EduMentor"><a:themeElements><a:clrScheme name="EduMentor"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>{colors}</a:clrScheme><a:fontScheme name="EduMentor"><a:majorFont>{fonts}</a:majorFont><a:minorFont>{fonts}</a:minorFont></a:fontScheme><a:fmtScheme name="EduMentor"><a:fillStyleLst>{fill}{fill}{fill}</a:fillStyleLst><a:lnStyleLst>{line}{line}{line}</a:lnStyleLst><a:effectStyleLst>{effect}{effect}{effect}</a:effectStyleLst><a:bgFillStyleLst>{fill}{fill}{fill}</a:bgFillStyleLst></a:fmtScheme></a:themeElements></a:theme>"#
    )
}

fn core_properties(title: &str) -> String {
    format!(
        r#"{XML_DECL}<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>{}</dc:title><dc:creator>EduMentor</dc:creator></cp:coreProperties>"#,
        xml_text(title)
    )
}

fn app_properties(slide_count: usize) -> String {
    format!(
        r#"{XML_DECL}<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>EduMentor</Application><Slides>{slide_count}</Slides></Properties>"#
    )
}

/// Title slide with the generation date, then one "Content" slide per paragraph.
pub fn render(document: &ExportDocument, generated_on: NaiveDate) -> Result<Vec<u8>, ExportError> {
    let mut slides = vec![title_slide(
        &document.title,
        &format!("Generated on {}", generated_on.format("%Y-%m-%d")),
    )];
    slides.extend(document.paragraphs.iter().map(|p| content_slide(p)));

    let slide_layout_rels = relationships(&[relationship(
        "rId1",
        "slideLayout",
        "../slideLayouts/slideLayout1.xml",
    )]);

    let mut parts: Vec<(String, String)> = vec![
        ("[Content_Types].xml".into(), content_types(slides.len())),
        (
            "_rels/.rels".into(),
            format!(
                r#"{XML_DECL}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{REL_BASE}/officeDocument" Target="ppt/presentation.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/><Relationship Id="rId3" Type="{REL_BASE}/extended-properties" Target="docProps/app.xml"/></Relationships>"#
            ),
        ),
        ("docProps/core.xml".into(), core_properties(&document.title)),
        ("docProps/app.xml".into(), app_properties(slides.len())),
        ("ppt/presentation.xml".into(), presentation(slides.len())),
        ("ppt/_rels/presentation.xml.rels".into(), presentation_rels(slides.len())),
        ("ppt/slideMasters/slideMaster1.xml".into(), slide_master()),
        (
            "ppt/slideMasters/_rels/slideMaster1.xml.rels".into(),
            relationships(&[
                relationship("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
                relationship("rId2", "theme", "../theme/theme1.xml"),
            ]),
        ),
        ("ppt/slideLayouts/slideLayout1.xml".into(), slide_layout()),
        (
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels".into(),
            relationships(&[relationship(
                "rId1",
                "slideMaster",
                "../slideMasters/slideMaster1.xml",
            )]),
        ),
        ("ppt/theme/theme1.xml".into(), theme()),
    ];

    for (i, slide) in slides.into_iter().enumerate() {
        let n = i + 1;
        parts.push((format!("ppt/slides/slide{}.xml", n), slide));
        parts.push((
            format!("ppt/slides/_rels/slide{}.xml.rels", n),
            slide_layout_rels.clone(),
        ));
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, xml) in parts {
        zip.start_file(name, options)
            .map_err(|e| ExportError::PptxError(e.to_string()))?;
        zip.write_all(xml.as_bytes())?;
    }

    let cursor = zip
        .finish()
        .map_err(|e| ExportError::PptxError(e.to_string()))?;
    Ok(cursor.into_inner())
}
