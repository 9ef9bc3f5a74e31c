use std::io::Cursor;

use docx_rs::{BreakType, Docx, Paragraph, Run};

use super::{ExportDocument, ExportError};

/// Half-points, so 48 is 24pt.
const TITLE_SIZE: usize = 48;

pub fn render(document: &ExportDocument) -> Result<Vec<u8>, ExportError> {
    let title = Paragraph::new().add_run(Run::new().add_text(&document.title).bold().size(TITLE_SIZE));
    let mut docx = Docx::new().add_paragraph(title);

    for paragraph in &document.paragraphs {
        let mut run = Run::new();
        for (i, line) in paragraph.lines().enumerate() {
            if i > 0 {
                run = run.add_break(BreakType::TextWrapping);
            }
            run = run.add_text(line);
        }
        docx = docx.add_paragraph(Paragraph::new().add_run(run));
    }

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| ExportError::DocxError(e.to_string()))?;

    Ok(buffer.into_inner())
}
