//! Plain-text rendering of view models for the terminal.

use std::fmt::Write as _;

use unicode_width::UnicodeWidthStr;
use views::{
    kpi::KpiCard,
    screens::quotation::QuotationSection,
    table::{Cell, CardView, TableBody, TableView},
};

const MIN_COLUMN: usize = 4;
const MAX_COLUMN: usize = 32;
const SEPARATOR: &str = " | ";
/// Row number plus highlight marker in front of every desktop row.
const GUTTER: usize = 4;

pub fn kpis(cards: &[KpiCard]) -> String {
    let line = cards
        .iter()
        .map(|card| match &card.tooltip {
            Some(tooltip) => format!("[ {}: {} ({tooltip}) ]", card.label, card.formatted()),
            None => format!("[ {}: {} ]", card.label, card.formatted()),
        })
        .collect::<Vec<_>>()
        .join("  ");
    format!("{line}\n")
}

pub fn table(view: &TableView, width: u16) -> String {
    let mut out = String::new();
    if let Some(title) = &view.title {
        let _ = writeln!(out, "== {title} ==");
    }

    match &view.body {
        TableBody::Empty(message) => {
            let _ = writeln!(out, "  {message}");
        }
        TableBody::Rows(rows) => {
            out.push_str(&grid(
                &view.headers,
                rows.iter().map(|row| (row.highlighted, row.cells.as_slice())),
                usize::from(width),
            ));
        }
        TableBody::Cards(cards) => {
            for card in cards {
                out.push_str(&card_block(card, usize::from(width)));
            }
        }
    }

    if let Some(bar) = view.pagination {
        let back = if bar.can_go_back() { "<< <" } else { "    " };
        let forward = if bar.can_go_forward() { "> >>" } else { "" };
        let _ = writeln!(out, "{back}  {}  {forward}", bar.label());
    }
    if view.loading {
        out.push_str("Loading...\n");
    }
    out
}

pub fn details(title: &str, pairs: &[(&str, String)]) -> String {
    let label_width = pairs
        .iter()
        .map(|(label, _)| label.width())
        .max()
        .unwrap_or(0);
    let mut out = format!("== {title} ==\n");
    for (label, value) in pairs {
        let _ = writeln!(out, "  {}  {value}", pad(label, label_width));
    }
    out
}

pub fn quotation(heading: &str, sections: &[QuotationSection], width: u16) -> String {
    let mut out = format!("##### {heading} #####\n");
    if sections.is_empty() {
        out.push_str("  (no groups)\n");
    }
    for section in sections {
        let _ = writeln!(out, "== {} ==", section.title);
        out.push_str(&grid(
            &section.headers,
            section.rows.iter().map(|row| (false, row.as_slice())),
            usize::from(width),
        ));
        let _ = writeln!(out, "{:>w$}", format!("TOTAL: {}", section.subtotal), w = GUTTER + 12);
    }
    out
}

fn grid<'a>(
    headers: &[String],
    rows: impl Iterator<Item = (bool, &'a [Cell])> + Clone,
    width: usize,
) -> String {
    let columns = headers.len();
    if columns == 0 {
        return String::new();
    }

    let mut widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.clone()
                .filter_map(|(_, cells)| cells.get(index))
                .map(|cell| cell.display().width())
                .chain([header.width()])
                .max()
                .unwrap_or(0)
                .clamp(MIN_COLUMN, MAX_COLUMN)
        })
        .collect();
    fit_widths(
        &mut widths,
        width.saturating_sub(GUTTER + SEPARATOR.len() * (columns - 1)),
    );

    let mut out = String::new();
    let header_line: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(header, width)| pad(&truncate(header, *width), *width))
        .collect();
    let _ = writeln!(out, "{}{}", " ".repeat(GUTTER), header_line.join(SEPARATOR));
    let rule: usize = widths.iter().sum::<usize>() + SEPARATOR.len() * (columns - 1);
    let _ = writeln!(out, "{}{}", " ".repeat(GUTTER), "-".repeat(rule));

    let mut notes = Vec::new();
    for (number, (highlighted, cells)) in rows.enumerate() {
        let rendered: Vec<Vec<String>> = widths
            .iter()
            .enumerate()
            .map(|(index, width)| {
                let (lines, full) = cell_lines(cells.get(index).unwrap_or(&Cell::Empty), *width);
                if let Some(full) = full {
                    notes.push(format!("{:>2} {}: {full}", number + 1, headers[index]));
                }
                lines
            })
            .collect();
        let height = rendered.iter().map(Vec::len).max().unwrap_or(1);

        for line in 0..height {
            let gutter = if line == 0 {
                format!("{:>2}{} ", number + 1, if highlighted { '*' } else { ' ' })
            } else {
                " ".repeat(GUTTER)
            };
            let parts: Vec<String> = rendered
                .iter()
                .zip(&widths)
                .map(|(lines, width)| pad(lines.get(line).map_or("", String::as_str), *width))
                .collect();
            let _ = writeln!(out, "{gutter}{}", parts.join(SEPARATOR).trim_end());
        }
    }
    out.push_str(&full_values(&notes));
    out
}

fn card_block(card: &CardView, width: usize) -> String {
    let marker = if card.highlighted { "*" } else { " " };
    let mut out = format!("{marker}+ {} ({})\n", card.title, card.subtitle);
    let label_width = card
        .fields
        .iter()
        .map(|field| field.label.width())
        .max()
        .unwrap_or(0)
        .min(width / 2);
    let value_width = width.saturating_sub(label_width + 5).max(MIN_COLUMN);
    let mut notes = Vec::new();
    for field in &card.fields {
        let (lines, full) = cell_lines(&field.value, value_width);
        if let Some(full) = full {
            notes.push(format!("{}: {full}", field.label));
        }
        for (index, line) in lines.iter().enumerate() {
            let label = if index == 0 {
                pad(&truncate(&field.label.to_uppercase(), label_width), label_width)
            } else {
                " ".repeat(label_width)
            };
            let _ = writeln!(out, " | {label}  {line}");
        }
    }
    out.push_str(&full_values(&notes));
    out
}

/// Display lines of a cell, plus its full text when clamping cut it short.
fn cell_lines(cell: &Cell, width: usize) -> (Vec<String>, Option<String>) {
    match cell {
        Cell::Action(action) => (vec![format!("[{}]", action.label)], None),
        other => match other.clamped(width) {
            Some(clamped) => {
                let full = clamped.truncated.then_some(clamped.full);
                (clamped.lines, full)
            }
            None => (vec![other.display()], None),
        },
    }
}

fn full_values(notes: &[String]) -> String {
    if notes.is_empty() {
        return String::new();
    }
    let mut out = String::from("    Full values:\n");
    for note in notes {
        let _ = writeln!(out, "    {note}");
    }
    out
}

/// Shrinks the widest columns until the row fits in `available`.
fn fit_widths(widths: &mut [usize], available: usize) {
    while widths.iter().sum::<usize>() > available {
        let Some(widest) = widths
            .iter_mut()
            .filter(|width| **width > MIN_COLUMN)
            .max_by_key(|width| **width)
        else {
            break;
        };
        *widest -= 1;
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        if (out.width() + ch.to_string().width()) >= width {
            break;
        }
        out.push(ch);
    }
    out.push('…');
    out
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{text}{}", " ".repeat(fill))
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
