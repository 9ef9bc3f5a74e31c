use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use super::{ExportDocument, ExportError};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const TITLE_SIZE: f32 = 20.0;
const BODY_SIZE: f32 = 11.0;
const LINE_HEIGHT: f32 = 5.5;
const PARAGRAPH_GAP: f32 = 3.0;
/// Roughly what fits between the margins at the body size in Helvetica.
const WRAP_COLUMNS: usize = 88;

/// Cursor over the current page; starts a new page when the bottom margin is reached.
struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl PageWriter {
    fn new(title: &str) -> Self {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let layer = doc.get_page(page).get_layer(layer);
        Self {
            doc,
            layer,
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn ensure_room(&mut self, height: f32) {
        if self.y - height >= MARGIN {
            return;
        }
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn line(&mut self, text: &str, size: f32, height: f32, font: &IndirectFontRef) {
        self.ensure_room(height);
        self.y -= height;
        self.layer.use_text(text, size, Mm(MARGIN), Mm(self.y), font);
    }

    fn gap(&mut self, height: f32) {
        self.y -= height;
    }
}

/// Greedy word wrap. Words longer than a line are split.
pub fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for source_line in text.lines() {
        let mut current = String::new();
        for word in source_line.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > columns {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                lines.push(word.drain(..columns).collect());
            }
            let word: String = word.into_iter().collect();

            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > columns && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&word);
        }
        lines.push(current);
    }

    lines
}

pub fn render(document: &ExportDocument) -> Result<Vec<u8>, ExportError> {
    let mut writer = PageWriter::new(&document.title);
    let title_font = writer
        .doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::PdfError(e.to_string()))?;
    let body_font = writer
        .doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::PdfError(e.to_string()))?;

    for line in wrap_text(&document.title, WRAP_COLUMNS / 2) {
        writer.line(&line, TITLE_SIZE, 9.0, &title_font);
    }
    writer.gap(6.0);

    for paragraph in &document.paragraphs {
        for line in wrap_text(paragraph, WRAP_COLUMNS) {
            writer.line(&line, BODY_SIZE, LINE_HEIGHT, &body_font);
        }
        writer.gap(PARAGRAPH_GAP);
    }

    writer
        .doc
        .save_to_bytes()
        .map_err(|e| ExportError::PdfError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text_respects_columns() {
        let lines = wrap_text("the quick brown fox jumps over the lazy dog", 10);
        assert!(lines.iter().all(|line| line.chars().count() <= 10));
        assert_eq!(lines.join(" "), "the quick brown fox jumps over the lazy dog");
    }

    #[test]
    fn test_wrap_text_keeps_line_breaks_and_splits_long_words() {
        let lines = wrap_text("short\nabcdefghijkl", 5);
        assert_eq!(lines, vec!["short", "abcde", "fghij", "kl"]);
    }

    #[test]
    fn test_render_produces_pdf() {
        let document = ExportDocument {
            title: "Photosynthesis".to_string(),
            paragraphs: (0..120)
                .map(|i| format!("Paragraph {} about chlorophyll and light.", i))
                .collect(),
        };

        let bytes = render(&document).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }
}
