use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Paragraph, Wrap};

use crate::tui::component::Component;
use crate::tui::components::TitleBar;
use crate::tui::navigator::{Navigator, lock};

/// Draw one frame: title bar on top, the active page below.
pub fn draw_ui(frame: &mut Frame, nav: &Navigator, clock: &str) {
    use Constraint::{Length, Min};
    let [title_area, main_area] = Layout::vertical([Length(1), Min(0)]).areas(frame.area());

    TitleBar::new(nav.breadcrumbs(), clock.to_string()).render(frame, title_area);

    match nav.current() {
        Ok(page) => lock(&page).render(frame, main_area, nav),
        Err(e) => draw_error_view(frame, main_area, &e.to_string()),
    }
}

fn draw_error_view(frame: &mut Frame, area: Rect, error_msg: &str) {
    let error_paragraph = Paragraph::new(error_msg)
        .block(
            Block::bordered()
                .title("ERROR")
                .border_style(Style::default().fg(Color::Red)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(error_paragraph, area);
}
