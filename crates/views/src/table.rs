//! Generic paginated table with a desktop row layout and a card layout for
//! narrow viewports.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};
use unicode_width::UnicodeWidthChar;

use crate::viewport::LayoutMode;

pub const DEFAULT_ROWS_PER_PAGE: usize = 10;
/// Scalar cells never take more than this many display lines.
pub const CLAMP_LINES: usize = 2;

const DEFAULT_EMPTY_MESSAGE: &str = "No data available.";
const MISSING_CELL: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    /// A control rendered inside the cell; activating it never counts as a row click.
    Action(Action),
    /// Pre-rendered content passed through untouched.
    Markup(String),
    Empty,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn action(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::Action(Action {
            id: id.into(),
            label: label.into(),
        })
    }

    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Empty,
            Value::String(text) => Self::Text(text.clone()),
            Value::Number(number) => number.as_f64().map_or(Self::Empty, Self::Number),
            Value::Bool(flag) => Self::Text(flag.to_string()),
            other => Self::Markup(other.to_string()),
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Text(_) | Self::Number(_))
    }

    pub fn display(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Number(number) => number.to_string(),
            Self::Action(action) => action.label.clone(),
            Self::Markup(markup) => markup.clone(),
            Self::Empty => String::new(),
        }
    }

    /// Scalar content wrapped to `width` columns and clamped; `None` for
    /// controls and markup, which are never clamped.
    pub fn clamped(&self, width: usize) -> Option<Clamped> {
        self.is_scalar()
            .then(|| clamp_lines(&self.display(), width, CLAMP_LINES))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clamped {
    pub lines: Vec<String>,
    pub truncated: bool,
    /// Untruncated value for on-demand disclosure.
    pub full: String,
}

pub fn clamp_lines(text: &str, width: usize, max_lines: usize) -> Clamped {
    let width = width.max(1);
    let max_lines = max_lines.max(1);

    let mut lines = Vec::new();
    for raw in text.lines() {
        let mut current = String::new();
        let mut used = 0;
        for ch in raw.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if used + ch_width > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                used = 0;
            }
            current.push(ch);
            used += ch_width;
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }

    let truncated = lines.len() > max_lines;
    if truncated {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            *last = with_ellipsis(last, width);
        }
    }

    Clamped {
        lines,
        truncated,
        full: text.to_string(),
    }
}

fn with_ellipsis(line: &str, width: usize) -> String {
    let budget = width.saturating_sub(1);
    let mut out = String::new();
    let mut used = 0;
    for ch in line.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > budget {
            break;
        }
        out.push(ch);
        used += ch_width;
    }
    out.push('…');
    out
}

/// Identity of a row: the record's `id` field when it has a usable one,
/// otherwise its position in the whole collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowKey {
    Id(String),
    Index(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub index: usize,
}

/// Server-side reload hook invoked after a page change.
#[async_trait]
pub trait PageLoader: Send + Sync {
    async fn fetch_page(&self, params: PageParams) -> anyhow::Result<()>;
}

pub enum ClickOutcome<'a, T> {
    Row(&'a T),
    Control(Action),
    Absorbed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub title: Option<String>,
    pub headers: Vec<String>,
    pub body: TableBody,
    pub pagination: Option<PaginationBar>,
    pub loading: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableBody {
    Empty(String),
    Rows(Vec<RowView>),
    Cards(Vec<CardView>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub key: RowKey,
    pub cells: Vec<Cell>,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub key: RowKey,
    pub title: String,
    pub subtitle: String,
    pub fields: Vec<CardField>,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardField {
    pub label: String,
    pub value: Cell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationBar {
    pub page: usize,
    pub page_count: usize,
}

impl PaginationBar {
    pub fn can_go_back(&self) -> bool {
        self.page > 1
    }

    pub fn can_go_forward(&self) -> bool {
        self.page < self.page_count
    }

    pub fn label(&self) -> String {
        format!("Page {} of {}", self.page, self.page_count)
    }
}

pub type RowRenderer<T> = Box<dyn Fn(&T) -> Vec<Cell> + Send + Sync>;

pub struct Table<T> {
    headers: Vec<String>,
    data: Vec<T>,
    render_row: Option<RowRenderer<T>>,
    rows_per_page: usize,
    current_page: usize,
    active_row: Option<RowKey>,
    title: Option<String>,
    empty_message: String,
    loading: bool,
}

impl<T: Serialize> Table<T> {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            data: Vec::new(),
            render_row: None,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            current_page: 1,
            active_row: None,
            title: None,
            empty_message: DEFAULT_EMPTY_MESSAGE.to_string(),
            loading: false,
        }
    }

    pub fn with_renderer(mut self, render: impl Fn(&T) -> Vec<Cell> + Send + Sync + 'static) -> Self {
        self.render_row = Some(Box::new(render));
        self
    }

    pub fn with_rows_per_page(mut self, rows_per_page: usize) -> Self {
        self.rows_per_page = rows_per_page.max(1);
        self.current_page = 1;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = message.into();
        self
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    /// Replaces the collection wholesale and returns to the first page.
    pub fn set_data(&mut self, data: Vec<T>) {
        debug!(rows = data.len(), "table data replaced");
        self.data = data;
        self.current_page = 1;
    }

    pub fn page_count(&self) -> usize {
        self.data.len().div_ceil(self.rows_per_page).max(1)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn visible(&self) -> &[T] {
        let start = (self.current_page - 1) * self.rows_per_page;
        let end = (start + self.rows_per_page).min(self.data.len());
        self.data.get(start..end).unwrap_or(&[])
    }

    /// Moves to `page` when it lies in `1..=page_count`; anything else is ignored.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page < 1 || page > self.page_count() {
            return false;
        }
        self.current_page = page;
        true
    }

    pub fn first_page(&mut self) -> bool {
        self.go_to_page(1)
    }

    pub fn previous_page(&mut self) -> bool {
        self.go_to_page(self.current_page.saturating_sub(1))
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.current_page + 1)
    }

    pub fn last_page(&mut self) -> bool {
        self.go_to_page(self.page_count())
    }

    /// Page change followed by a reload through `loader`. The loading flag is
    /// raised for the duration of the call; loader failures are logged and
    /// otherwise ignored.
    pub async fn go_to_page_and_load(&mut self, page: usize, loader: &dyn PageLoader) -> bool {
        if !self.go_to_page(page) {
            return false;
        }

        self.loading = true;
        if let Err(err) = loader.fetch_page(PageParams { index: page }).await {
            error!(page, "table reload failed: {err:#}");
        }
        self.loading = false;
        true
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_active_row(&mut self, key: Option<RowKey>) {
        self.active_row = key;
    }

    pub fn active_row(&self) -> Option<&RowKey> {
        self.active_row.as_ref()
    }

    /// Key of the `row`-th visible record.
    pub fn key_of(&self, row: usize) -> Option<RowKey> {
        let item = self.visible().get(row)?;
        Some(row_key(item, self.absolute_index(row)))
    }

    /// Exactly one cell per header.
    pub fn cells_for(&self, item: &T) -> Vec<Cell> {
        let mut cells = match &self.render_row {
            Some(render) => render(item),
            None => fallback_cells(item),
        };
        cells.resize(self.headers.len(), Cell::Empty);
        cells
    }

    /// Resolves a click on the `row`-th visible record. Clicking a control
    /// or markup cell never reaches the row handler.
    pub fn click(&self, row: usize, column: Option<usize>) -> Option<ClickOutcome<'_, T>> {
        let item = self.visible().get(row)?;
        let Some(column) = column else {
            return Some(ClickOutcome::Row(item));
        };

        let outcome = match self.cells_for(item).into_iter().nth(column) {
            Some(Cell::Action(action)) => ClickOutcome::Control(action),
            Some(Cell::Markup(_)) => ClickOutcome::Absorbed,
            _ => ClickOutcome::Row(item),
        };
        Some(outcome)
    }

    pub fn view(&self, mode: LayoutMode) -> TableView {
        let visible = self.visible();
        let body = if visible.is_empty() {
            TableBody::Empty(self.empty_message.clone())
        } else {
            match mode {
                LayoutMode::Desktop => TableBody::Rows(self.rows(visible)),
                LayoutMode::Mobile => TableBody::Cards(self.cards(visible)),
            }
        };

        let page_count = self.page_count();
        TableView {
            title: self.title.clone(),
            headers: self.headers.clone(),
            body,
            pagination: (page_count > 1).then_some(PaginationBar {
                page: self.current_page,
                page_count,
            }),
            loading: self.is_loading(),
        }
    }

    fn rows(&self, visible: &[T]) -> Vec<RowView> {
        visible
            .iter()
            .enumerate()
            .map(|(row, item)| {
                let key = row_key(item, self.absolute_index(row));
                RowView {
                    highlighted: self.active_row.as_ref() == Some(&key),
                    key,
                    cells: self.cells_for(item),
                }
            })
            .collect()
    }

    fn cards(&self, visible: &[T]) -> Vec<CardView> {
        let subtitle = format!("{} / {} records", visible.len(), self.data.len());
        visible
            .iter()
            .enumerate()
            .map(|(row, item)| {
                let key = row_key(item, self.absolute_index(row));
                let fields = self
                    .headers
                    .iter()
                    .zip(self.cells_for(item))
                    .filter(|(_, cell)| !matches!(cell, Cell::Action(_)))
                    .map(|(label, cell)| CardField {
                        label: label.clone(),
                        value: match cell {
                            Cell::Empty => Cell::text(MISSING_CELL),
                            other => other,
                        },
                    })
                    .collect();
                CardView {
                    highlighted: self.active_row.as_ref() == Some(&key),
                    key,
                    title: self
                        .title
                        .clone()
                        .unwrap_or_else(|| format!("Record {}", row + 1)),
                    subtitle: subtitle.clone(),
                    fields,
                }
            })
            .collect()
    }

    fn absolute_index(&self, row: usize) -> usize {
        (self.current_page - 1) * self.rows_per_page + row
    }
}

fn fallback_cells<T: Serialize>(item: &T) -> Vec<Cell> {
    match serde_json::to_value(item) {
        Ok(Value::Object(fields)) => fields.values().map(Cell::from_json).collect(),
        Ok(Value::Array(values)) => values.iter().map(Cell::from_json).collect(),
        Ok(scalar) => vec![Cell::from_json(&scalar)],
        Err(err) => {
            debug!("row could not be serialized: {err}");
            Vec::new()
        }
    }
}

fn row_key<T: Serialize>(item: &T, index: usize) -> RowKey {
    let id = match serde_json::to_value(item) {
        Ok(Value::Object(mut fields)) => fields.remove("id"),
        _ => None,
    };
    match id {
        Some(Value::String(id)) if !id.is_empty() => RowKey::Id(id),
        Some(Value::Number(id)) if id.as_f64() != Some(0.0) => RowKey::Id(id.to_string()),
        _ => RowKey::Index(index),
    }
}

#[cfg(test)]
#[path = "tests/table_tests.rs"]
mod tests;
