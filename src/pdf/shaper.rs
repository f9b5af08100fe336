use super::metrics::FontMetrics;

/// A width-bounded line of body text, ready for vertical placement.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedLine {
    pub text: String,
    pub width_pt: f32,
}

impl ShapedLine {
    fn blank() -> Self { Self { text: String::new(), width_pt: 0.0 } }

    pub fn is_blank(&self) -> bool { self.text.is_empty() }
}

/// Greedy word-wrap of `text` into lines no wider than `max_width_pt`.
///
/// Blank input lines separate paragraphs; each paragraph break becomes one
/// empty spacer line in the output. A token that is wider than the line on
/// its own is emitted alone and left to overflow.
pub fn shape(text: &str, font: &FontMetrics, size_pt: f32, max_width_pt: f32) -> Vec<ShapedLine> {
    let space = font.units(" ");
    let fits = |units: u64| FontMetrics::to_points(units, size_pt) <= max_width_pt;

    let mut lines: Vec<ShapedLine> = Vec::new();
    for paragraph in paragraphs(text) {
        if !lines.is_empty() {
            lines.push(ShapedLine::blank());
        }

        let mut current = String::new();
        let mut current_units = 0u64;
        for token in paragraph.iter().flat_map(|l| l.split_whitespace()) {
            let token_units = font.units(token);
            if current.is_empty() {
                current.push_str(token);
                current_units = token_units;
                continue;
            }
            let candidate = current_units + space + token_units;
            if fits(candidate) {
                current.push(' ');
                current.push_str(token);
                current_units = candidate;
            } else {
                lines.push(finish(&mut current, current_units, size_pt));
                current.push_str(token);
                current_units = token_units;
            }
        }
        if !current.is_empty() {
            lines.push(finish(&mut current, current_units, size_pt));
        }
    }
    lines
}

fn finish(current: &mut String, units: u64, size_pt: f32) -> ShapedLine {
    ShapedLine { text: std::mem::take(current), width_pt: FontMetrics::to_points(units, size_pt) }
}

/// Groups input lines into paragraphs, splitting on whitespace-only lines.
fn paragraphs(text: &str) -> Vec<Vec<&str>> {
    let mut out: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}
