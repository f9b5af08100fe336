use super::metrics::FontMetrics;
use super::paginate::Page;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const fn gray(v: f32) -> Self { Rgb(v, v, v) }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text { text: String, x: f32, y: f32, size: f32, color: Rgb },
    Rule { from: (f32, f32), to: (f32, f32), thickness: f32, color: Rgb },
}

/// Fixed text drawn on every page.
#[derive(Debug, Clone, PartialEq)]
pub struct Chrome {
    pub header_text: String,
    pub sub_title: String,
    pub footer_left: String,
    pub footer_center: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComposedPage {
    pub width: f32,
    pub height: f32,
    pub ops: Vec<DrawOp>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComposedDocument {
    pub title: String,
    pub chrome: Chrome,
    pub pages: Vec<ComposedPage>,
}

/// Offsets, sizes and colors of the branded template. All values in points;
/// `*_offset` fields are measured down from the top edge.
#[derive(Debug, Clone)]
pub struct TemplateLayout {
    pub width: f32,
    pub height: f32,
    pub margin_x: f32,
    pub header_offset: f32,
    pub header_size: f32,
    pub header_color: Rgb,
    pub title_offset: f32,
    pub title_size: f32,
    pub title_color: Rgb,
    pub rule_offset: f32,
    pub rule_thickness: f32,
    pub rule_color: Rgb,
    pub content_offset: f32,
    pub body_size: f32,
    pub line_height: f32,
    pub body_color: Rgb,
    /// Lowest baseline a body line may sit on.
    pub body_bottom: f32,
    pub footer_y: f32,
    pub footer_size: f32,
    pub footer_color: Rgb,
}

impl TemplateLayout {
    pub fn for_page(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            margin_x: 50.0,
            header_offset: 50.0,
            header_size: 16.0,
            header_color: Rgb(0.1, 0.4, 0.8),
            title_offset: 70.0,
            title_size: 12.0,
            title_color: Rgb::gray(0.2),
            rule_offset: 80.0,
            rule_thickness: 1.0,
            rule_color: Rgb::gray(0.8),
            content_offset: 120.0,
            body_size: 10.0,
            line_height: 14.0,
            body_color: Rgb::gray(0.1),
            body_bottom: 60.0,
            footer_y: 40.0,
            footer_size: 8.0,
            footer_color: Rgb::gray(0.5),
        }
    }

    pub fn usable_width(&self) -> f32 { self.width - 2.0 * self.margin_x }

    pub fn content_top(&self) -> f32 { self.height - self.content_offset }

    /// Vertical room for body lines, from the content top down to `body_bottom`.
    pub fn content_height(&self) -> f32 {
        // The first baseline sits at content_top, so one line height of room
        // is already consumed by it.
        (self.content_top() - self.body_bottom + self.line_height).max(0.0)
    }
}

/// Lays the chrome and each page's body lines out as draw operations.
pub fn compose(pages: &[Page], chrome: &Chrome, layout: &TemplateLayout, font: &FontMetrics) -> ComposedDocument {
    let sub_title = truncate_to_width(&chrome.sub_title, font, layout.title_size, layout.usable_width());
    let composed = pages.iter().map(|page| {
        let mut ops = Vec::with_capacity(page.lines.len() + 7);
        let (w, h, left) = (layout.width, layout.height, layout.margin_x);
        let right = w - layout.margin_x;

        ops.push(DrawOp::Text {
            text: chrome.header_text.clone(),
            x: left,
            y: h - layout.header_offset,
            size: layout.header_size,
            color: layout.header_color,
        });
        ops.push(DrawOp::Text {
            text: sub_title.clone(),
            x: left,
            y: h - layout.title_offset,
            size: layout.title_size,
            color: layout.title_color,
        });
        ops.push(DrawOp::Rule {
            from: (left, h - layout.rule_offset),
            to: (right, h - layout.rule_offset),
            thickness: layout.rule_thickness,
            color: layout.rule_color,
        });

        let top = layout.content_top();
        for (i, line) in page.lines.iter().enumerate() {
            if line.is_blank() {
                continue;
            }
            ops.push(DrawOp::Text {
                text: line.text.clone(),
                x: left,
                y: top - i as f32 * layout.line_height,
                size: layout.body_size,
                color: layout.body_color,
            });
        }

        let fs = layout.footer_size;
        let center_w = font.measure(&chrome.footer_center, fs);
        let label_w = font.measure(&page.page_label, fs);
        for (text, x) in [
            (chrome.footer_left.clone(), left),
            (chrome.footer_center.clone(), (w - center_w) / 2.0),
            (page.page_label.clone(), right - label_w),
        ] {
            ops.push(DrawOp::Text { text, x, y: layout.footer_y, size: fs, color: layout.footer_color });
        }

        ComposedPage { width: w, height: h, ops }
    }).collect();

    ComposedDocument { title: chrome.sub_title.clone(), chrome: chrome.clone(), pages: composed }
}

/// Cuts `text` so it fits in `max_width`, appending an ellipsis when cut.
pub fn truncate_to_width(text: &str, font: &FontMetrics, size: f32, max_width: f32) -> String {
    if font.measure(text, size) <= max_width {
        return text.to_string();
    }
    let budget = max_width - font.measure("…", size);
    let mut out = String::new();
    let mut width = 0.0;
    for c in text.chars() {
        let w = FontMetrics::to_points(u64::from(font.advance(c)), size);
        if width + w > budget {
            break;
        }
        width += w;
        out.push(c);
    }
    format!("{}…", out.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::paginate::{paginate, stamp_page_count};
    use crate::pdf::shaper::ShapedLine;
    use pretty_assertions::assert_eq;

    fn chrome() -> Chrome {
        Chrome {
            header_text: "MedStudy".into(),
            sub_title: "Imunologia - Aula 3".into(),
            footer_left: "Maria Souza - 05/03/2025".into(),
            footer_center: "www.meusaasmedico.com.br".into(),
        }
    }

    fn texts(page: &ComposedPage) -> Vec<&str> {
        page.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            DrawOp::Rule { .. } => None,
        }).collect()
    }

    #[test]
    fn empty_document_draws_full_chrome() {
        let layout = TemplateLayout::for_page(595.28, 841.89);
        let pages = stamp_page_count(paginate(Vec::new(), layout.content_height(), layout.line_height));
        let doc = compose(&pages, &chrome(), &layout, &FontMetrics::helvetica());
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(
            texts(&doc.pages[0]),
            vec!["MedStudy", "Imunologia - Aula 3", "Maria Souza - 05/03/2025", "www.meusaasmedico.com.br", "Página 1 de 1"]
        );
        assert_eq!(doc.pages[0].ops.iter().filter(|op| matches!(op, DrawOp::Rule { .. })).count(), 1);
    }

    #[test]
    fn draw_order_and_body_placement() {
        let layout = TemplateLayout::for_page(595.28, 841.89);
        let lines = vec![
            ShapedLine { text: "um".into(), width_pt: 1.0 },
            ShapedLine { text: String::new(), width_pt: 0.0 },
            ShapedLine { text: "dois".into(), width_pt: 1.0 },
        ];
        let pages = stamp_page_count(paginate(lines, layout.content_height(), layout.line_height));
        let doc = compose(&pages, &chrome(), &layout, &FontMetrics::helvetica());
        let ops = &doc.pages[0].ops;
        assert!(matches!(&ops[0], DrawOp::Text { y, size, .. } if (*y - 791.89).abs() < 1e-3 && *size == 16.0));
        assert!(matches!(&ops[1], DrawOp::Text { y, .. } if (*y - 771.89).abs() < 1e-3));
        assert!(matches!(&ops[2], DrawOp::Rule { from, to, .. } if from.0 == 50.0 && (to.0 - 545.28).abs() < 1e-3));
        // The spacer line is skipped but keeps its slot.
        assert!(matches!(&ops[3], DrawOp::Text { text, y, .. } if text == "um" && (*y - 721.89).abs() < 1e-3));
        assert!(matches!(&ops[4], DrawOp::Text { text, y, .. } if text == "dois" && (*y - 693.89).abs() < 1e-3));
    }

    #[test]
    fn footer_fields_are_aligned_within_margins() {
        let layout = TemplateLayout::for_page(595.28, 841.89);
        let font = FontMetrics::helvetica();
        let pages = stamp_page_count(paginate(Vec::new(), layout.content_height(), layout.line_height));
        let doc = compose(&pages, &chrome(), &layout, &font);
        let footer: Vec<_> = doc.pages[0].ops.iter().rev().take(3).collect();
        let DrawOp::Text { text, x, .. } = footer[0] else { panic!("expected text") };
        assert!((x + font.measure(text, 8.0) - 545.28).abs() < 1e-3);
        let DrawOp::Text { text, x, .. } = footer[1] else { panic!("expected text") };
        let center = x + font.measure(text, 8.0) / 2.0;
        assert!((center - 595.28 / 2.0).abs() < 1e-3);
    }

    #[test]
    fn every_page_carries_the_final_count() {
        let layout = TemplateLayout::for_page(595.28, 841.89);
        let lines = (0..60).map(|i| ShapedLine { text: format!("l{i}"), width_pt: 5.0 }).collect();
        let pages = stamp_page_count(paginate(lines, layout.content_height(), layout.line_height));
        let doc = compose(&pages, &chrome(), &layout, &FontMetrics::helvetica());
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(texts(&doc.pages[0]).last(), Some(&"Página 1 de 2"));
        assert_eq!(texts(&doc.pages[1]).last(), Some(&"Página 2 de 2"));
        let lowest = doc.pages[0].ops.iter().filter_map(|op| match op {
            DrawOp::Text { y, size, .. } if *size == 10.0 => Some(*y),
            _ => None,
        }).fold(f32::MAX, f32::min);
        assert!(lowest >= layout.body_bottom);
    }

    #[test]
    fn long_titles_are_truncated() {
        let font = FontMetrics::helvetica();
        let title = "Atividades Práticas Interdisciplinares de Extensão II ".repeat(4);
        let cut = truncate_to_width(&title, &font, 12.0, 495.28);
        assert!(cut.ends_with('…'));
        assert!(font.measure(&cut, 12.0) <= 495.28);
        assert_eq!(truncate_to_width("Curto", &font, 12.0, 495.28), "Curto");
    }
}
