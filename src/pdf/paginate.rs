use super::shaper::ShapedLine;

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub lines: Vec<ShapedLine>,
    /// 1-based.
    pub page_index: usize,
    /// Zero until [`stamp_page_count`] runs.
    pub page_count: usize,
    pub page_label: String,
}

impl Page {
    fn open(page_index: usize) -> Self {
        Self { lines: Vec::new(), page_index, page_count: 0, page_label: String::new() }
    }
}

pub fn page_label(page_index: usize, page_count: usize) -> String {
    format!("Página {page_index} de {page_count}")
}

/// First pass: distributes `lines` over pages by a running vertical cursor.
///
/// A line is placed when `cursor + line_height_pt <= content_height_pt`;
/// otherwise the page is closed and the line opens the next one. Every page
/// holds at least one line, and an empty input still yields one page.
pub fn paginate(lines: Vec<ShapedLine>, content_height_pt: f32, line_height_pt: f32) -> Vec<Page> {
    let mut pages = Vec::new();
    let mut page = Page::open(1);
    let mut cursor = 0.0f32;

    for line in lines {
        if cursor + line_height_pt > content_height_pt && !page.lines.is_empty() {
            let next = Page::open(page.page_index + 1);
            pages.push(std::mem::replace(&mut page, next));
            cursor = 0.0;
        }
        page.lines.push(line);
        cursor += line_height_pt;
    }
    pages.push(page);
    pages
}

/// Second pass: stamps the final total into every page once it is known.
pub fn stamp_page_count(mut pages: Vec<Page>) -> Vec<Page> {
    let total = pages.len();
    for page in &mut pages {
        page.page_count = total;
        page.page_label = page_label(page.page_index, total);
    }
    pages
}
