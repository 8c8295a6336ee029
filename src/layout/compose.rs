//! # Page Composition
//!
//! Turns row groups into positioned pages. Every page gets the same
//! skeleton: a header band (the letterhead on the first page, a running
//! header afterwards), the table header row on a filled band, its rows, and
//! a folio label in the bottom margin. The last page also gets the summary
//! block: the totals column on the right and the footer column (bank
//! details, payment instructions, notes, terms, signatory) on the left.
//!
//! Coordinates are in points from the top-left corner of the page; a
//! label's `y` is its baseline. The PDF writer flips them.

use std::ops::Range;

use crate::error::FolioError;
use crate::layout::columns::{column_offsets, resolve_column_widths, ITEM_COLUMNS};
use crate::layout::geometry::{PageGeometry, SUMMARY_LINE_HEIGHT};
use crate::layout::page_break::RowGroup;
use crate::model::{CurrencyCode, Invoice, LineItem};
use crate::money::{format_money, format_percent, format_quantity};
use crate::style::{palette, text_styles, Align, Color, TextStyle};
use crate::text::{mark_cut, measure_width, truncate_to_width, wrap_lines};
use crate::totals::Totals;

/// Horizontal padding inside table cells.
const CELL_PADDING: f64 = 6.0;

/// Largest box the logo is scaled into.
const LOGO_MAX_HEIGHT: f64 = 40.0;
const LOGO_MAX_WIDTH: f64 = 140.0;

/// Share of the content width taken by the footer column of the summary.
const FOOTER_COLUMN_SHARE: f64 = 0.55;

const EMPTY_CELL: &str = "\u{2014}";

/// A single line of text at an absolute position.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub x: f64,
    /// Baseline.
    pub y: f64,
    pub text: String,
    pub style: TextStyle,
}

impl Label {
    /// Place `text` inside the box `[x, x + width]` with the given alignment.
    fn place(x: f64, width: f64, baseline: f64, text: String, style: TextStyle, align: Align) -> Self {
        let text_width = measure_width(&text, style.font, style.size);
        let x = match align {
            Align::Left => x,
            Align::Right => x + width - text_width,
            Align::Center => x + (width - text_width) / 2.0,
        };
        Self { x, y: baseline, text, style }
    }

    pub fn width(&self) -> f64 {
        measure_width(&self.text, self.style.font, self.style.size)
    }
}

/// A filled rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: Color,
}

/// A horizontal hairline.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub x1: f64,
    pub x2: f64,
    pub y: f64,
    pub width: f64,
    pub color: Color,
}

/// Where the logo image is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogoPlacement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    Letterhead,
    Continuation,
}

/// The header band above the table.
#[derive(Debug, Clone)]
pub struct HeaderBlock {
    pub kind: HeaderKind,
    pub labels: Vec<Label>,
    pub logo: Option<LogoPlacement>,
}

/// One positioned line item.
#[derive(Debug, Clone)]
pub struct TableRow {
    /// Index into the invoice's items.
    pub item_index: usize,
    pub top: f64,
    pub cells: Vec<Label>,
}

/// The table header and the rows of one page.
#[derive(Debug, Clone)]
pub struct TableBlock {
    pub header_band: Rect,
    pub header_cells: Vec<Label>,
    pub rows: Vec<TableRow>,
    pub rules: Vec<Rule>,
    /// Bottom edge of the last row, or of the header row on an empty page.
    pub bottom: f64,
}

/// One line of the totals column.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryLine {
    pub label: String,
    pub value: String,
    pub strong: bool,
    /// Draw a rule above this line.
    pub rule_above: bool,
}

/// Totals and footer, drawn on the last page only.
#[derive(Debug, Clone)]
pub struct SummaryBlock {
    pub top: f64,
    /// Lowest point reached by any summary content.
    pub bottom: f64,
    pub lines: Vec<SummaryLine>,
    pub labels: Vec<Label>,
    pub rules: Vec<Rule>,
    pub footer: Vec<Label>,
}

/// A fully composed page.
#[derive(Debug, Clone)]
pub struct Page {
    pub index: usize,
    pub width: f64,
    pub height: f64,
    /// The invoice items on this page.
    pub rows: Range<usize>,
    pub header: HeaderBlock,
    pub table: TableBlock,
    pub summary: Option<SummaryBlock>,
    pub folio: Label,
}

/// A borrowed drawing primitive, in paint order.
#[derive(Debug, Clone, Copy)]
pub enum DrawCommand<'a> {
    Fill(&'a Rect),
    Stroke(&'a Rule),
    Text(&'a Label),
    Logo(&'a LogoPlacement),
}

impl Page {
    pub fn includes_summary(&self) -> bool {
        self.summary.is_some()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Everything on the page, backgrounds first.
    pub fn draw_commands(&self) -> Vec<DrawCommand<'_>> {
        let mut commands = Vec::new();
        if let Some(logo) = &self.header.logo {
            commands.push(DrawCommand::Logo(logo));
        }
        commands.extend(self.header.labels.iter().map(DrawCommand::Text));
        commands.push(DrawCommand::Fill(&self.table.header_band));
        commands.extend(self.table.rules.iter().map(DrawCommand::Stroke));
        commands.extend(self.table.header_cells.iter().map(DrawCommand::Text));
        for row in &self.table.rows {
            commands.extend(row.cells.iter().map(DrawCommand::Text));
        }
        if let Some(summary) = &self.summary {
            commands.extend(summary.rules.iter().map(DrawCommand::Stroke));
            commands.extend(summary.labels.iter().map(DrawCommand::Text));
            commands.extend(summary.footer.iter().map(DrawCommand::Text));
        }
        commands.push(DrawCommand::Text(&self.folio));
        commands
    }

    /// All text labels on the page.
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.draw_commands().into_iter().filter_map(|cmd| match cmd {
            DrawCommand::Text(label) => Some(label),
            _ => None,
        })
    }
}

/// One entry of a stacked text column.
enum Line {
    Text(String, TextStyle),
    Space(f64),
}

/// A rectangular area that text lines are stacked into.
#[derive(Debug, Clone, Copy)]
struct Frame {
    x: f64,
    width: f64,
    top: f64,
    bottom: f64,
    align: Align,
}

/// Stack `lines` top-down into `frame`. Lines are cut to the frame width;
/// when the frame runs out of height the last placed line is marked with
/// an ellipsis. Returns the y reached.
fn stack_lines(lines: &[Line], frame: Frame, out: &mut Vec<Label>) -> f64 {
    let mut y = frame.top;
    let first_placed = out.len();

    for line in lines {
        match line {
            Line::Space(height) => y += height,
            Line::Text(text, style) => {
                let line_height = style.line_height();
                if y + line_height > frame.bottom {
                    if out.len() > first_placed {
                        if let Some(last) = out.last_mut() {
                            let marked = mark_cut(&last.text, frame.width, last.style.font, last.style.size);
                            *last = Label::place(frame.x, frame.width, last.y, marked, last.style, frame.align);
                        }
                    }
                    return y.min(frame.bottom);
                }
                if !text.is_empty() {
                    let fitted = truncate_to_width(text, frame.width, style.font, style.size);
                    out.push(Label::place(frame.x, frame.width, y + style.size, fitted, *style, frame.align));
                }
                y += line_height;
            }
        }
    }
    y
}

/// Lays out pages for one invoice.
#[derive(Debug, Clone)]
pub struct Compositor {
    geometry: PageGeometry,
    logo_size: Option<(u32, u32)>,
}

impl Compositor {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            logo_size: None,
        }
    }

    /// Reserve space for a logo of the given pixel size on the letterhead.
    pub fn with_logo(mut self, width_px: u32, height_px: u32) -> Self {
        if width_px > 0 && height_px > 0 {
            self.logo_size = Some((width_px, height_px));
        }
        self
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Compose one page per row group.
    pub fn compose(&self, invoice: &Invoice, groups: &[RowGroup], totals: &Totals) -> Result<Vec<Page>, FolioError> {
        self.check_groups(invoice, groups)?;

        let g = &self.geometry;
        let widths = resolve_column_widths(&ITEM_COLUMNS, g.content_width());
        let offsets = column_offsets(g.margin, &widths);
        let page_count = groups.len();

        let pages: Vec<Page> = groups
            .iter()
            .enumerate()
            .map(|(index, group)| {
                let header = if index == 0 {
                    self.letterhead(invoice)
                } else {
                    self.running_header(invoice)
                };
                let table = self.table(invoice, group, &offsets, &widths);
                let summary = group
                    .is_last_group
                    .then(|| self.summary(invoice, totals, table.bottom));
                Page {
                    index,
                    width: g.page_width,
                    height: g.page_height,
                    rows: group.range.clone(),
                    header,
                    table,
                    summary,
                    folio: self.folio(index, page_count),
                }
            })
            .collect();

        log::debug!(
            "composed {} pages for invoice {:?}",
            pages.len(),
            invoice.meta.invoice_number
        );
        Ok(pages)
    }

    fn check_groups(&self, invoice: &Invoice, groups: &[RowGroup]) -> Result<(), FolioError> {
        let budget = self.geometry.row_budget()?;
        let Some((last, rest)) = groups.split_last() else {
            return Err(FolioError::Layout("no row groups to compose".to_string()));
        };
        if !last.is_last_group || rest.iter().any(|group| group.is_last_group) {
            return Err(FolioError::Layout(
                "exactly the final row group must carry the summary".to_string(),
            ));
        }
        if last.len() > budget.first_page {
            return Err(FolioError::Layout(format!(
                "last group has {} rows but only {} fit beside the summary",
                last.len(),
                budget.first_page
            )));
        }
        let mut next_start = 0;
        for group in groups {
            if group.range.start > group.range.end {
                return Err(FolioError::Layout(format!("group {:?} is inverted", group.range)));
            }
            if group.range.start != next_start {
                return Err(FolioError::Layout(format!(
                    "group {:?} does not start at row {}",
                    group.range, next_start
                )));
            }
            next_start = group.range.end;
            if group.len() > budget.continuation {
                return Err(FolioError::Layout(format!(
                    "group of {} rows exceeds the page budget of {}",
                    group.len(),
                    budget.continuation
                )));
            }
            if group.range.end > invoice.items.len() {
                return Err(FolioError::Layout(format!(
                    "group {:?} is outside the {} invoice items",
                    group.range,
                    invoice.items.len()
                )));
            }
        }
        if next_start != invoice.items.len() {
            return Err(FolioError::Layout(format!(
                "groups cover {} of {} invoice items",
                next_start,
                invoice.items.len()
            )));
        }
        Ok(())
    }

    fn logo_placement(&self, max_width: f64) -> Option<LogoPlacement> {
        let (w, h) = self.logo_size?;
        let (w, h) = (w as f64, h as f64);
        let scale = (LOGO_MAX_WIDTH.min(max_width) / w).min(LOGO_MAX_HEIGHT / h);
        Some(LogoPlacement {
            x: self.geometry.margin,
            y: self.geometry.margin,
            width: w * scale,
            height: h * scale,
        })
    }

    fn letterhead(&self, invoice: &Invoice) -> HeaderBlock {
        let g = &self.geometry;
        let band_bottom = g.table_header_top() - CELL_PADDING;
        let content_width = g.content_width();
        let column_width = content_width / 3.0;
        let mut labels = Vec::new();

        // Seller, under the logo when there is one.
        let logo = self.logo_placement(column_width - CELL_PADDING);
        let seller_top = logo.map_or(g.margin, |l| l.y + l.height + CELL_PADDING);
        let mut seller = Vec::new();
        for (i, line) in invoice.seller.lines().into_iter().enumerate() {
            let style = if i == 0 { text_styles::SELLER } else { text_styles::BODY };
            seller.push(Line::Text(line.to_string(), style));
        }
        stack_lines(
            &seller,
            Frame {
                x: g.margin,
                width: column_width - CELL_PADDING,
                top: seller_top,
                bottom: band_bottom,
                align: Align::Left,
            },
            &mut labels,
        );

        // Bill to and ship to.
        let mut parties = Vec::new();
        if !invoice.bill_to.is_empty() {
            parties.push(Line::Text("BILL TO".to_string(), text_styles::SECTION));
            parties.extend(
                invoice
                    .bill_to
                    .lines()
                    .into_iter()
                    .map(|line| Line::Text(line.to_string(), text_styles::BODY)),
            );
        }
        if !invoice.ship_to.is_empty() {
            if !parties.is_empty() {
                parties.push(Line::Space(4.0));
            }
            parties.push(Line::Text("SHIP TO".to_string(), text_styles::SECTION));
            parties.extend(
                invoice
                    .ship_to
                    .lines()
                    .into_iter()
                    .map(|line| Line::Text(line.to_string(), text_styles::BODY)),
            );
        }
        stack_lines(
            &parties,
            Frame {
                x: g.margin + column_width,
                width: column_width - CELL_PADDING,
                top: g.margin,
                bottom: band_bottom,
                align: Align::Left,
            },
            &mut labels,
        );

        // Title and meta, right aligned.
        let meta = &invoice.meta;
        let mut right = vec![Line::Text("INVOICE".to_string(), text_styles::TITLE)];
        let fields = [
            ("Invoice No.", meta.invoice_number.as_str()),
            ("Date", meta.invoice_date.as_str()),
            ("Due Date", meta.due_date.as_str()),
            ("Terms", meta.payment_terms.as_str()),
            ("Currency", meta.currency.code()),
        ];
        for (label, value) in fields {
            let value = value.trim();
            if !value.is_empty() {
                right.push(Line::Text(format!("{label}: {value}"), text_styles::BODY));
            }
        }
        stack_lines(
            &right,
            Frame {
                x: g.margin + 2.0 * column_width,
                width: column_width,
                top: g.margin,
                bottom: band_bottom,
                align: Align::Right,
            },
            &mut labels,
        );

        HeaderBlock {
            kind: HeaderKind::Letterhead,
            labels,
            logo,
        }
    }

    fn running_header(&self, invoice: &Invoice) -> HeaderBlock {
        let g = &self.geometry;
        let number = invoice.meta.invoice_number.trim();
        let title = if number.is_empty() {
            "Invoice (continued)".to_string()
        } else {
            format!("Invoice {number} (continued)")
        };

        let mut lines = vec![Line::Text(title, text_styles::RUNNING)];
        let seller = invoice.seller.display_name();
        if !seller.is_empty() {
            lines.push(Line::Text(seller.to_string(), text_styles::BODY));
        }

        let mut labels = Vec::new();
        stack_lines(
            &lines,
            Frame {
                x: g.margin,
                width: g.content_width(),
                top: g.margin,
                bottom: g.table_header_top() - CELL_PADDING,
                align: Align::Left,
            },
            &mut labels,
        );

        HeaderBlock {
            kind: HeaderKind::Continuation,
            labels,
            logo: None,
        }
    }

    fn cell_baseline(&self, top: f64, style: &TextStyle) -> f64 {
        top + self.geometry.row_height / 2.0 + style.size * 0.35
    }

    fn cell(&self, text: &str, top: f64, x: f64, width: f64, style: TextStyle, align: Align) -> Label {
        let inner = (width - 2.0 * CELL_PADDING).max(0.0);
        let fitted = truncate_to_width(text, inner, style.font, style.size);
        Label::place(x + CELL_PADDING, inner, self.cell_baseline(top, &style), fitted, style, align)
    }

    fn table(&self, invoice: &Invoice, group: &RowGroup, offsets: &[f64], widths: &[f64]) -> TableBlock {
        let g = &self.geometry;
        let header_top = g.table_header_top();
        let currency = invoice.meta.currency;

        let header_cells = ITEM_COLUMNS
            .iter()
            .zip(offsets.iter().zip(widths))
            .map(|(col, (&x, &w))| self.cell(col.label, header_top, x, w, text_styles::TABLE_HEADER, col.align))
            .collect();

        let mut rows = Vec::with_capacity(group.len());
        let mut rules = Vec::with_capacity(group.len());
        for (k, (item_index, item)) in group
            .range
            .clone()
            .zip(group.rows(&invoice.items))
            .enumerate()
        {
            let top = g.row_top(k);
            let texts = row_texts(item, currency);
            let cells = ITEM_COLUMNS
                .iter()
                .zip(offsets.iter().zip(widths))
                .zip(texts.iter())
                .map(|((col, (&x, &w)), text)| self.cell(text, top, x, w, text_styles::CELL, col.align))
                .collect();
            rows.push(TableRow { item_index, top, cells });
            rules.push(Rule {
                x1: g.margin,
                x2: g.margin + g.content_width(),
                y: top + g.row_height,
                width: 0.5,
                color: palette::RULE,
            });
        }

        TableBlock {
            header_band: Rect {
                x: g.margin,
                y: header_top,
                width: g.content_width(),
                height: g.row_height,
                fill: palette::HEADER_BAND,
            },
            header_cells,
            rows,
            rules,
            bottom: g.row_top(group.len()),
        }
    }

    fn summary(&self, invoice: &Invoice, totals: &Totals, last_row_bottom: f64) -> SummaryBlock {
        let g = &self.geometry;
        let top = g.summary_top(last_row_bottom);
        let currency = invoice.meta.currency;
        let footer_width = g.content_width() * FOOTER_COLUMN_SHARE;
        let totals_x = g.margin + footer_width;
        let totals_width = g.content_width() - footer_width;

        let lines = summary_lines(invoice, totals, currency);

        let mut labels = Vec::with_capacity(lines.len() * 2);
        let mut rules = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            let line_top = top + i as f64 * SUMMARY_LINE_HEIGHT;
            let style = if line.strong {
                text_styles::SUMMARY_STRONG
            } else {
                text_styles::SUMMARY
            };
            let baseline = line_top + SUMMARY_LINE_HEIGHT / 2.0 + style.size * 0.35;
            if line.rule_above {
                rules.push(Rule {
                    x1: totals_x,
                    x2: totals_x + totals_width,
                    y: line_top,
                    width: 0.75,
                    color: palette::INK,
                });
            }
            labels.push(Label::place(totals_x, totals_width, baseline, line.label.clone(), style, Align::Left));
            let value = truncate_to_width(&line.value, totals_width / 2.0, style.font, style.size);
            labels.push(Label::place(totals_x, totals_width, baseline, value, style, Align::Right));
        }
        let totals_bottom = top + lines.len() as f64 * SUMMARY_LINE_HEIGHT;

        let column_width = footer_width - 2.0 * CELL_PADDING;
        let footer_lines = footer_lines(invoice, column_width);
        let mut footer = Vec::new();
        let footer_bottom = stack_lines(
            &footer_lines,
            Frame {
                x: g.margin,
                width: column_width,
                top,
                bottom: g.content_bottom(),
                align: Align::Left,
            },
            &mut footer,
        );

        SummaryBlock {
            top,
            bottom: totals_bottom.max(footer_bottom),
            lines,
            labels,
            rules,
            footer,
        }
    }

    fn folio(&self, index: usize, page_count: usize) -> Label {
        let g = &self.geometry;
        let style = text_styles::FOLIO;
        Label::place(
            g.margin,
            g.content_width(),
            g.page_height - g.margin / 2.0 + style.size * 0.35,
            format!("Page {} of {}", index + 1, page_count),
            style,
            Align::Center,
        )
    }
}

fn row_texts(item: &LineItem, currency: CurrencyCode) -> [String; 4] {
    let description = item.description.trim();
    [
        if description.is_empty() {
            EMPTY_CELL.to_string()
        } else {
            description.to_string()
        },
        format_quantity(item.quantity),
        format_money(crate::totals::clamp_non_negative(item.unit_price), currency),
        format_money(item.line_total(), currency),
    ]
}

fn summary_lines(invoice: &Invoice, totals: &Totals, currency: CurrencyCode) -> Vec<SummaryLine> {
    let adjustments = &invoice.adjustments;
    let tax_label = if adjustments.tax_enabled {
        format!("Tax ({})", format_percent(adjustments.tax_rate_percent))
    } else {
        "Tax".to_string()
    };
    let line = |label: String, amount: f64, strong: bool| SummaryLine {
        label,
        value: format_money(amount, currency),
        strong,
        rule_above: false,
    };
    vec![
        line("Subtotal".to_string(), totals.subtotal, false),
        line("Discount".to_string(), -totals.discount, false),
        line(tax_label, totals.tax_amount, false),
        SummaryLine {
            rule_above: true,
            ..line("Total".to_string(), totals.total, true)
        },
        line("Paid".to_string(), totals.amount_paid, false),
        line("Balance Due".to_string(), totals.balance_due, true),
    ]
}

fn push_wrapped(lines: &mut Vec<Line>, text: &str, width: f64) {
    let style = text_styles::FOOTER;
    for wrapped in wrap_lines(text.trim(), width, style.font, style.size) {
        lines.push(Line::Text(wrapped, style));
    }
}

fn start_section(lines: &mut Vec<Line>, heading: &str) {
    if !lines.is_empty() {
        lines.push(Line::Space(6.0));
    }
    lines.push(Line::Text(heading.to_string(), text_styles::FOOTER_HEADING));
}

fn footer_lines(invoice: &Invoice, width: f64) -> Vec<Line> {
    let mut lines = Vec::new();

    if !invoice.bank.is_empty() {
        start_section(&mut lines, "BANK DETAILS");
        for (label, value) in invoice.bank.labelled_fields() {
            push_wrapped(&mut lines, &format!("{label}: {value}"), width);
        }
        let extra = invoice.bank.additional_details.trim();
        if !extra.is_empty() {
            push_wrapped(&mut lines, extra, width);
        }
    }

    let texts = [
        ("PAYMENT INSTRUCTIONS", invoice.payment_instructions.as_str()),
        ("NOTES", invoice.notes.as_str()),
        ("TERMS", invoice.terms.as_str()),
    ];
    for (heading, text) in texts {
        if !text.trim().is_empty() {
            start_section(&mut lines, heading);
            push_wrapped(&mut lines, text, width);
        }
    }

    let signatory = invoice.signatory_name.trim();
    if !signatory.is_empty() {
        if !lines.is_empty() {
            lines.push(Line::Space(6.0));
        }
        push_wrapped(&mut lines, &format!("Authorised by: {signatory}"), width);
    }

    lines
}

/// Compose pages for `invoice` with `geometry` and no logo.
pub fn compose(
    invoice: &Invoice,
    groups: &[RowGroup],
    totals: &Totals,
    geometry: &PageGeometry,
) -> Result<Vec<Page>, FolioError> {
    Compositor::new(*geometry).compose(invoice, groups, totals)
}
