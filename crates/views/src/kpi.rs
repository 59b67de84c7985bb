/// Headline indicator shown above a screen's table.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiCard {
    pub label: String,
    pub value: f64,
    pub decimals: usize,
    pub tooltip: Option<String>,
}

impl KpiCard {
    pub fn count(label: impl Into<String>, value: usize) -> Self {
        Self {
            label: label.into(),
            value: value as f64,
            decimals: 0,
            tooltip: None,
        }
    }

    pub fn amount(label: impl Into<String>, value: f64, decimals: usize) -> Self {
        Self {
            label: label.into(),
            value,
            decimals,
            tooltip: None,
        }
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn formatted(&self) -> String {
        format!("{:.*}", self.decimals, self.value)
    }
}

/// Share of `part` in `total` as a whole percentage, 0 when `total` is 0.
pub fn percentage(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((part.min(total) as f64 / total as f64) * 100.0).round() as u8
}
