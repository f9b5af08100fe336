use super::compose::{ComposedDocument, ComposedPage, DrawOp, Rgb};
use crate::error::PipelineError;
use printpdf::*;
use std::io::BufWriter;

fn mm(pt: f32) -> Mm { Mm::from(Pt(pt)) }

fn color(c: Rgb) -> Color { Color::Rgb(printpdf::Rgb::new(c.0, c.1, c.2, None)) }

fn check_geometry(page: &ComposedPage) -> Result<(), PipelineError> {
    let valid = |v: f32| v.is_finite() && v > 0.0;
    if !valid(page.width) || !valid(page.height) {
        return Err(PipelineError::Encoding(format!("invalid page size {}x{}", page.width, page.height)));
    }
    for op in &page.ops {
        let finite = match op {
            DrawOp::Text { x, y, size, .. } => x.is_finite() && y.is_finite() && valid(*size),
            DrawOp::Rule { from, to, thickness, .. } => {
                from.0.is_finite() && from.1.is_finite() && to.0.is_finite() && to.1.is_finite() && valid(*thickness)
            }
        };
        if !finite {
            return Err(PipelineError::Encoding(format!("non-finite geometry in {op:?}")));
        }
    }
    Ok(())
}

/// Serializes a composed document: one PDF page per composed page, one
/// shared Helvetica resource, a text run per text op and a line per rule.
pub fn encode(doc: &ComposedDocument) -> Result<Vec<u8>, PipelineError> {
    let first = doc.pages.first().ok_or_else(|| PipelineError::Encoding("document has no pages".into()))?;
    for page in &doc.pages {
        check_geometry(page)?;
    }

    let (pdf, page1, layer1) = PdfDocument::new(&doc.title, mm(first.width), mm(first.height), "Layer 1");
    let font = pdf
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| PipelineError::Encoding(format!("font embedding failed: {e}")))?;

    for (i, page) in doc.pages.iter().enumerate() {
        let layer = if i == 0 {
            pdf.get_page(page1).get_layer(layer1)
        } else {
            let (p, l) = pdf.add_page(mm(page.width), mm(page.height), format!("Página {}", i + 1));
            pdf.get_page(p).get_layer(l)
        };

        for op in &page.ops {
            match op {
                DrawOp::Text { text, x, y, size, color: c } => {
                    layer.set_fill_color(color(*c));
                    layer.use_text(text.as_str(), *size, mm(*x), mm(*y), &font);
                }
                DrawOp::Rule { from, to, thickness, color: c } => {
                    layer.set_outline_color(color(*c));
                    layer.set_outline_thickness(*thickness);
                    layer.add_line(Line {
                        points: vec![
                            (Point::new(mm(from.0), mm(from.1)), false),
                            (Point::new(mm(to.0), mm(to.1)), false),
                        ],
                        is_closed: false,
                    });
                }
            }
        }
    }

    let mut buf: Vec<u8> = Vec::new();
    {
        let mut writer = BufWriter::new(&mut buf);
        pdf.save(&mut writer).map_err(|e| PipelineError::Encoding(e.to_string()))?;
    }
    Ok(buf)
}
