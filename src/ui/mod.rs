use std::io;

use ratatui::{
    layout::Rect,
    style::Color,
    widgets::Block,
    Frame,
};
use thiserror::Error;

pub mod async_data;
pub mod repl;
pub mod search;
pub mod views;

pub use async_data::AsyncRotation;

pub const ACCENT: Color = Color::Rgb(200, 150, 0);

pub struct RenderContext<'a, 'b> {
    pub frame: &'a mut Frame<'b>,
    pub area: Rect,
    pub scroll_offset: u16,
    pub block: Block<'b>,
}

#[derive(Debug, Error)]
pub enum ReplError {
    #[error("Console error: {0}")]
    Console(#[from] io::Error),
}
