use crate::model::champion::Champion;

pub const CELL_WIDTH: u16 = 18;
pub const CELL_SPACING: u16 = 2;
pub const MIN_COLUMNS: usize = 2;
pub const MAX_COLUMNS: usize = 6;

/// Case-insensitive substring match on champion names. A blank query keeps
/// every champion; order is never changed.
pub fn filter_champions<'a>(champions: &'a [Champion], query: &str) -> Vec<&'a Champion> {
    let normalized = query.trim().to_lowercase();
    if normalized.is_empty() {
        return champions.iter().collect();
    }

    champions.iter().filter(|c| c.matches(&normalized)).collect()
}

pub fn grid_columns(width: u16) -> usize {
    let raw = width.saturating_sub(CELL_SPACING) / (CELL_WIDTH + CELL_SPACING);
    usize::from(raw).clamp(MIN_COLUMNS, MAX_COLUMNS)
}

/// The collapsible search input shown in the title bar.
#[derive(Debug, Default)]
pub struct SearchField {
    query: String,
    expanded: bool,
}

impl SearchField {
    pub fn with_query(query: &str) -> Self {
        Self {
            query: query.to_string(),
            expanded: false,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }

    pub fn push(&mut self, c: char) {
        self.query.push(c);
    }

    pub fn pop(&mut self) {
        self.query.pop();
    }

    /// Collapsed field with text in it, the user would otherwise not see that
    /// a filter is active.
    pub fn show_badge(&self) -> bool {
        !self.expanded && !self.query.is_empty()
    }
}
