use chrono::{DateTime, Local};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use crate::{
    model::champion::{Champion, ChampionRotation},
    service::rotation_store::LoadState,
    ui::{
        search::{filter_champions, grid_columns, CELL_SPACING, CELL_WIDTH},
        RenderContext, ACCENT,
    },
};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];
const PLAIN_TEXT_WIDTH: u16 = 100;

pub const NO_MATCH_MESSAGE: &str = "No champions match your search query.";
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load data. Please try again.";

#[derive(Debug, Default)]
pub struct RotationView {
    spinner_frame: usize,
    loaded_at: Option<DateTime<Local>>,
}

impl RotationView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER.len();
    }

    pub fn mark_loaded(&mut self) {
        self.loaded_at = Some(Local::now());
    }

    pub fn render(&self, rc: RenderContext, state: &LoadState, query: &str) {
        let width = rc.block.inner(rc.area).width;

        let lines = match state {
            LoadState::Initial | LoadState::Loading => loading_lines(self.spinner_frame),
            LoadState::Error(_) => error_lines(),
            LoadState::Data(rotation) => {
                let mut lines = Vec::new();
                if let Some(loaded_at) = self.loaded_at {
                    lines.push(Line::from(Span::styled(
                        format!("Updated {}", loaded_at.format("%H:%M:%S")),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
                lines.extend(rotation_lines(rotation, query, width));
                lines
            }
        };

        let paragraph = Paragraph::new(lines)
            .block(rc.block)
            .wrap(Wrap { trim: false })
            .scroll((rc.scroll_offset, 0));
        rc.frame.render_widget(paragraph, rc.area);
    }
}

fn loading_lines(frame: usize) -> Vec<Line<'static>> {
    vec![
        Line::default(),
        Line::from(Span::styled(
            format!("  {} Loading...", SPINNER[frame % SPINNER.len()]),
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ]
}

fn error_lines() -> Vec<Line<'static>> {
    vec![
        Line::default(),
        Line::from(Span::styled(
            format!("  [!] {}", LOAD_FAILED_MESSAGE),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(Span::styled("  Press 'r' to refresh.", Style::default().fg(Color::DarkGray))),
    ]
}

/// Both tiers, regular first, each filtered by `query` on its own.
pub fn rotation_lines(rotation: &ChampionRotation, query: &str, width: u16) -> Vec<Line<'static>> {
    let columns = grid_columns(width);

    let mut lines = vec![
        Line::from(Span::styled(
            "Current champion rotation",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
    ];

    lines.extend(section_lines(
        "Champions available for free",
        None,
        &rotation.regular_champions,
        query,
        columns,
    ));
    lines.push(Line::default());
    lines.extend(section_lines(
        "Champions available for free for new players",
        Some(format!(
            "New players up to level {} get access to a different pool of champions",
            rotation.beginner_max_level
        )),
        &rotation.beginner_champions,
        query,
        columns,
    ));

    lines
}

fn section_lines(
    title: &str,
    subtitle: Option<String>,
    champions: &[Champion],
    query: &str,
    columns: usize,
) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        title.to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    if let Some(subtitle) = subtitle {
        lines.push(Line::from(Span::styled(subtitle, Style::default().fg(Color::DarkGray))));
    }
    lines.push(Line::default());

    let filtered = filter_champions(champions, query);
    if filtered.is_empty() {
        lines.push(Line::from(Span::styled(
            NO_MATCH_MESSAGE,
            Style::default().fg(Color::DarkGray),
        )));
        return lines;
    }

    let cell = usize::from(CELL_WIDTH + CELL_SPACING);
    for row in filtered.chunks(columns) {
        let spans = row
            .iter()
            .map(|champ| Span::raw(format!("{:<cell$}", truncate(&champ.name, CELL_WIDTH))))
            .collect::<Vec<_>>();
        lines.push(Line::from(spans));
    }

    lines
}

fn truncate(name: &str, width: u16) -> String {
    let width = usize::from(width);
    if name.chars().count() <= width {
        return name.to_string();
    }

    let mut short = name.chars().take(width.saturating_sub(1)).collect::<String>();
    short.push('…');
    short
}

/// Same layout as the interactive view, without styling.
pub fn plain_text(rotation: &ChampionRotation, query: &str) -> String {
    rotation_lines(rotation, query, PLAIN_TEXT_WIDTH)
        .iter()
        .map(|line| {
            let text = line.spans.iter().map(|span| span.content.as_ref()).collect::<String>();
            text.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rotation() -> ChampionRotation {
        ChampionRotation {
            beginner_max_level: 10,
            beginner_champions: vec![Champion::new("1", "Annie", "u1"), Champion::new("3", "Shyvana", "u3")],
            regular_champions: vec![Champion::new("2", "Ashe", "u2"), Champion::new("4", "Nunu & Willump", "u4")],
        }
    }

    #[test]
    fn renders_both_tiers_with_level_subtitle() {
        let text = plain_text(&rotation(), "");

        assert!(text.contains("Champions available for free\n"));
        assert!(text.contains("New players up to level 10 get access to a different pool of champions"));
        assert!(text.contains("Annie"));
        assert!(text.contains("Nunu & Willump"));
        assert!(text.find("Ashe").unwrap() < text.find("Annie").unwrap());
    }

    #[test]
    fn filters_each_tier_on_its_own() {
        let text = plain_text(&rotation(), "an");

        assert!(text.contains("Annie"));
        assert!(text.contains("Shyvana"));
        assert!(!text.contains("Ashe"));
        assert_eq!(text.matches(NO_MATCH_MESSAGE).count(), 1);
    }

    #[test]
    fn shows_no_match_message_per_section() {
        let text = plain_text(&rotation(), "teemo");

        assert_eq!(text.matches(NO_MATCH_MESSAGE).count(), 2);
    }

    #[test]
    fn long_names_are_truncated() {
        assert_eq!(truncate("Annie", CELL_WIDTH), "Annie");
        let short = truncate("A very long champion name", CELL_WIDTH);
        assert_eq!(short.chars().count(), usize::from(CELL_WIDTH));
        assert!(short.ends_with('…'));
    }

    #[test]
    fn grid_rows_hold_at_most_the_column_count() {
        let champions = (0..7)
            .map(|i| Champion::new(i.to_string(), format!("Champ{i}"), "u"))
            .collect::<Vec<_>>();

        let lines = section_lines("Title", None, &champions, "", 3);
        let rows = &lines[2..];

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].spans.len(), 3);
        assert_eq!(rows[2].spans.len(), 1);
    }
}
