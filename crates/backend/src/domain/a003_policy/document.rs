//! Printable policy document (A4 PDF).
//!
//! Built-in Helvetica fonts on a grey 0.25pt grid: title, a two-column
//! summary table with a shaded label column, then the covered members table
//! under a shaded header row. Members continue on new pages with the header
//! repeated.

use crate::shared::format::format_amount;
use contracts::domain::a001_agent::aggregate::Agent;
use contracts::domain::a002_policy_holder::aggregate::PolicyHolder;
use contracts::domain::a003_policy::aggregate::Policy;
use contracts::domain::a004_member::aggregate::Member;
use contracts::shared::form::DATE_FORMAT;
use printpdf::{
    BuiltinFont, Color, Greyscale, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rect,
};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 18.0;

const TITLE_SIZE: f32 = 16.0;
const HEADING_SIZE: f32 = 13.0;
const BODY_SIZE: f32 = 10.0;
const ROW_HEIGHT: f32 = 6.5;

/// Width of the summary label column
const LABEL_WIDTH: f32 = 35.0;
/// Full Name, Relationship, DOB; National ID takes the rest
const MEMBER_COLUMNS: [f32; 3] = [60.0, 30.0, 30.0];

/// Cell text inset from the left rule and lift above the bottom rule
const CELL_PADDING: f32 = 1.5;
const TEXT_RISE: f32 = 2.0;

/// Grid pen: 0.25pt mid grey
const GRID_GREY: f32 = 0.5;
const GRID_THICKNESS: f32 = 0.25;
/// Label column fill (whitesmoke) and members header fill (light grey)
const LABEL_SHADE: f32 = 0.96;
const HEADER_SHADE: f32 = 0.83;

/// Rough Helvetica advance at 10pt, used to clip cells to their column
const CHAR_WIDTH_MM: f32 = 1.9;

const MEMBER_HEADER: [&str; 4] = ["Full Name", "Relationship", "DOB", "National ID"];

/// Label/value pairs of the summary table
pub fn summary_rows(
    policy: &Policy,
    holder: &PolicyHolder,
    agent: Option<&Agent>,
) -> Vec<(&'static str, String)> {
    let or_blank = |v: &Option<String>| v.clone().unwrap_or_default();
    vec![
        ("Policyholder", holder.full_name().to_string()),
        ("National ID", or_blank(&holder.national_id)),
        ("Phone", or_blank(&holder.phone)),
        ("Email", or_blank(&holder.email)),
        ("Address", or_blank(&holder.address)),
        ("Agent", agent.map(|a| a.name().to_string()).unwrap_or_default()),
        ("Status", policy.status.to_string()),
        ("Start Date", policy.start_date.format(DATE_FORMAT).to_string()),
        ("Premium", format_amount(policy.premium_amount)),
        (
            "Benefit",
            format!(
                "{} ({})",
                format_amount(policy.benefit_amount),
                or_blank(&policy.benefit_description)
            ),
        ),
    ]
}

pub fn member_rows(members: &[Member]) -> Vec<[String; 4]> {
    members
        .iter()
        .map(|m| {
            [
                m.full_name.clone(),
                m.relationship.clone().unwrap_or_default(),
                m.date_of_birth
                    .map(|d| d.format(DATE_FORMAT).to_string())
                    .unwrap_or_default(),
                m.national_id.clone().unwrap_or_default(),
            ]
        })
        .collect()
}

/// Cut `text` so it fits `width_mm`, marking the cut with "..."
pub fn clip(text: &str, width_mm: f32) -> String {
    let max_chars = ((width_mm - 2.0) / CHAR_WIDTH_MM).floor().max(3.0) as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars - 3).collect();
    format!("{}...", kept)
}

/// Left edge of each column plus the right edge of the last one
fn column_edges(widths: &[f32]) -> Vec<f32> {
    let mut edges = vec![MARGIN];
    for width in widths {
        let last = edges[edges.len() - 1];
        edges.push(last + width);
    }
    edges
}

/// Grid segments of one table row: top and bottom rules, then a vertical at every edge
fn row_rules(edges: &[f32], top: f32, bottom: f32) -> Vec<((f32, f32), (f32, f32))> {
    let (left, right) = match (edges.first(), edges.last()) {
        (Some(l), Some(r)) => (*l, *r),
        _ => return Vec::new(),
    };
    let mut rules = vec![((left, top), (right, top)), ((left, bottom), (right, bottom))];
    rules.extend(edges.iter().map(|x| ((*x, top), (*x, bottom))));
    rules
}

fn grey(level: f32) -> Color {
    Color::Greyscale(Greyscale::new(level, None))
}

struct Writer {
    doc: PdfDocumentReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    layer: PdfLayerReference,
    /// Top of the next line, from the bottom edge
    y: f32,
    pages: usize,
}

impl Writer {
    fn new(title: &str) -> anyhow::Result<Self> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow::anyhow!("PDF font error: {:?}", e))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| anyhow::anyhow!("PDF font error: {:?}", e))?;
        let layer = doc.get_page(page).get_layer(layer);
        let writer = Self {
            doc,
            regular,
            bold,
            layer,
            y: PAGE_HEIGHT - MARGIN,
            pages: 1,
        };
        writer.grid_pen();
        Ok(writer)
    }

    /// Stroke settings are per page
    fn grid_pen(&self) {
        self.layer.set_outline_color(grey(GRID_GREY));
        self.layer.set_outline_thickness(GRID_THICKNESS);
    }

    fn text(&self, text: &str, size: f32, x: f32, baseline: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(text, size, Mm(x), Mm(baseline), font);
    }

    fn shade(&self, left: f32, right: f32, top: f32, bottom: f32, level: f32) {
        self.layer.set_fill_color(grey(level));
        self.layer.add_rect(Rect::new(Mm(left), Mm(bottom), Mm(right), Mm(top)));
        self.layer.set_fill_color(grey(0.0));
    }

    /// Start a new page when less than `needed` mm remain; true if it did
    fn ensure_space(&mut self, needed: f32) -> bool {
        if self.y - needed >= MARGIN {
            return false;
        }
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), format!("Layer {}", self.pages + 1));
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.grid_pen();
        self.y = PAGE_HEIGHT - MARGIN;
        self.pages += 1;
        true
    }

    /// One bordered table row. `shades` holds an optional fill per column
    fn row(&mut self, widths: &[f32], cells: &[&str], shades: &[Option<f32>], bold: &[bool]) {
        let edges = column_edges(widths);
        let top = self.y;
        let bottom = top - ROW_HEIGHT;
        for (i, shade) in shades.iter().enumerate() {
            if let (Some(level), Some(right)) = (shade, edges.get(i + 1)) {
                self.shade(edges[i], *right, top, bottom, *level);
            }
        }
        for (from, to) in row_rules(&edges, top, bottom) {
            self.layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(from.0), Mm(from.1)), false),
                    (Point::new(Mm(to.0), Mm(to.1)), false),
                ],
                is_closed: false,
            });
        }
        for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
            let is_bold = bold.get(i).copied().unwrap_or(false);
            self.text(
                &clip(cell, *width),
                BODY_SIZE,
                edges[i] + CELL_PADDING,
                bottom + TEXT_RISE,
                is_bold,
            );
        }
        self.y = bottom;
    }

    fn member_row(&mut self, cells: &[String; 4], header: bool) {
        let cells: Vec<&str> = cells.iter().map(String::as_str).collect();
        let shade = header.then_some(HEADER_SHADE);
        self.row(&member_widths(), &cells, &[shade; 4], &[header; 4]);
    }

    fn finish(self) -> anyhow::Result<(Vec<u8>, usize)> {
        let pages = self.pages;
        let bytes = self
            .doc
            .save_to_bytes()
            .map_err(|e| anyhow::anyhow!("PDF serialization error: {:?}", e))?;
        Ok((bytes, pages))
    }
}

fn member_widths() -> [f32; 4] {
    let last_width = PAGE_WIDTH - 2.0 * MARGIN - MEMBER_COLUMNS.iter().sum::<f32>();
    [MEMBER_COLUMNS[0], MEMBER_COLUMNS[1], MEMBER_COLUMNS[2], last_width]
}

fn render(
    policy: &Policy,
    holder: &PolicyHolder,
    agent: Option<&Agent>,
    members: &[Member],
) -> anyhow::Result<(Vec<u8>, usize)> {
    let title = format!("Policy Document: {}", policy.policy_number());
    let mut w = Writer::new(&title)?;

    w.text(&title, TITLE_SIZE, MARGIN, w.y - TITLE_SIZE * 0.35, true);
    w.y -= TITLE_SIZE * 0.35 + 8.0;

    let summary_widths = [LABEL_WIDTH, PAGE_WIDTH - 2.0 * MARGIN - LABEL_WIDTH];
    for (label, value) in summary_rows(policy, holder, agent) {
        w.row(
            &summary_widths,
            &[label, value.as_str()],
            &[Some(LABEL_SHADE), None],
            &[true, false],
        );
    }

    w.y -= 8.0;
    w.ensure_space(HEADING_SIZE + 2.0 * ROW_HEIGHT);
    w.text("Covered Members", HEADING_SIZE, MARGIN, w.y - HEADING_SIZE * 0.35, true);
    w.y -= HEADING_SIZE * 0.35 + 4.0;

    let header = MEMBER_HEADER.map(String::from);
    w.member_row(&header, true);
    for row in member_rows(members) {
        if w.ensure_space(ROW_HEIGHT) {
            w.member_row(&header, true);
        }
        w.member_row(&row, false);
    }

    w.finish()
}

/// Policy document as PDF bytes
pub fn render_policy_document(
    policy: &Policy,
    holder: &PolicyHolder,
    agent: Option<&Agent>,
    members: &[Member],
) -> anyhow::Result<Vec<u8>> {
    render(policy, holder, agent, members).map(|(bytes, _)| bytes)
}
