//! Page layout of a report document.
//!
//! A vertical cursor walks the sections in order. Every header, chart and
//! table fragment is placed at the cursor and the cursor moves below it, so
//! placed items never share a vertical extent on a page. All coordinates are
//! in points measured from the top of the page.

use std::ops::Range;

use super::{ReportDocument, Section};

/// Fixed page metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    /// Top, bottom, left and right margin.
    pub margin: f32,
    /// Height of the title band on the first page.
    pub title_band: f32,
    pub header_height: f32,
    /// Drawn width of charts (height follows the aspect ratio).
    pub chart_width: f32,
    /// Space left below a chart.
    pub chart_margin: f32,
    pub row_height: f32,
    /// Space left below a table.
    pub table_margin: f32,
}

impl Default for PageGeometry {
    /// A4 portrait.
    fn default() -> Self {
        Self {
            width: 595.28,
            height: 841.89,
            margin: 40.0,
            title_band: 80.0,
            header_height: 28.0,
            chart_width: 500.0,
            chart_margin: 30.0,
            row_height: 18.0,
            table_margin: 16.0,
        }
    }
}

impl PageGeometry {
    /// Where the cursor starts on the first page, just below the title band.
    pub fn first_page_top(&self) -> f32 {
        self.title_band + self.margin / 2.0
    }

    /// Where the cursor starts on every following page.
    pub fn page_top(&self) -> f32 {
        self.margin
    }

    /// Lowest point content may reach.
    pub fn content_bottom(&self) -> f32 {
        self.height - self.margin
    }

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// Drawn size of a chart: full chart width, shrunk to fit a blank page.
    pub fn chart_size(&self, aspect_height_at_width: f32) -> (f32, f32) {
        let max_height = self.content_bottom() - self.page_top();
        if aspect_height_at_width <= max_height {
            (self.chart_width, aspect_height_at_width)
        } else {
            let scale = max_height / aspect_height_at_width;
            (self.chart_width * scale, max_height)
        }
    }
}

/// What a placement draws.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Header,
    Chart { width: f32 },
    /// Rows `rows` of the section's table, preceded by the head row when
    /// `with_head` is set.
    Table { rows: Range<usize>, with_head: bool },
}

/// One item placed on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Index of the section in the document.
    pub section: usize,
    pub item: Item,
    pub top: f32,
    pub height: f32,
}

impl Placement {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub placements: Vec<Placement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub geometry: PageGeometry,
    pub pages: Vec<PageLayout>,
}

impl Layout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

struct Cursor {
    geometry: PageGeometry,
    pages: Vec<PageLayout>,
    y: f32,
}

impl Cursor {
    fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            pages: vec![PageLayout::default()],
            y: geometry.first_page_top(),
        }
    }

    fn fits(&self, height: f32) -> bool {
        self.y + height <= self.geometry.content_bottom()
    }

    /// Starts a new page unless `height` still fits, or the page is blank.
    fn ensure_room(&mut self, height: f32) {
        if !self.fits(height) && !self.at_page_top() {
            self.pages.push(PageLayout::default());
            self.y = self.geometry.page_top();
        }
    }

    fn at_page_top(&self) -> bool {
        let top = if self.pages.len() == 1 {
            self.geometry.first_page_top()
        } else {
            self.geometry.page_top()
        };
        self.y <= top
    }

    fn place(&mut self, section: usize, item: Item, height: f32) {
        let placement = Placement {
            section,
            item,
            top: self.y,
            height,
        };
        if let Some(page) = self.pages.last_mut() {
            page.placements.push(placement);
        }
        self.y += height;
    }

    fn advance(&mut self, gap: f32) {
        self.y += gap;
    }
}

/// Lays out `document` on pages of `geometry`.
///
/// Sections follow document order. Within a section the header comes first,
/// then the chart, then the table. Tables break between rows and repeat their
/// head row on each continuation page.
pub fn layout(document: &ReportDocument, geometry: PageGeometry) -> Layout {
    let mut cursor = Cursor::new(geometry);

    for (index, section) in document.sections.iter().enumerate() {
        cursor.ensure_room(geometry.header_height);
        cursor.place(index, Item::Header, geometry.header_height);

        if let Some(chart) = &section.chart {
            let (width, height) = geometry.chart_size(chart.height_at(geometry.chart_width));
            cursor.ensure_room(height);
            cursor.place(index, Item::Chart { width }, height);
            cursor.advance(geometry.chart_margin);
        }

        if section.table.is_some() {
            layout_table(&mut cursor, index, section);
            cursor.advance(geometry.table_margin);
        }
    }

    Layout {
        geometry,
        pages: cursor.pages,
    }
}

fn layout_table(cursor: &mut Cursor, index: usize, section: &Section) {
    let Some(table) = &section.table else {
        return;
    };
    let row_height = cursor.geometry.row_height;
    let with_head = table.head.is_some();
    let head_height = if with_head { row_height } else { 0.0 };

    let mut start = 0;
    while start < table.rows.len() || (start == 0 && table.rows.is_empty()) {
        // Keep the head row together with at least one body row.
        cursor.ensure_room(head_height + row_height);
        let room = cursor.geometry.content_bottom() - cursor.y - head_height;
        let fit = ((room / row_height).floor().max(1.0)) as usize;
        let end = (start + fit).min(table.rows.len());
        let height = head_height + (end - start) as f32 * row_height;
        cursor.place(
            index,
            Item::Table {
                rows: start..end,
                with_head,
            },
            height,
        );
        if end == start {
            break;
        }
        start = end;
    }
}
