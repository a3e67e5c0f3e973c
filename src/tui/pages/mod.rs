//! # Pages
//!
//! The concrete screens of the application and their registry ids.
//!
//! ```text
//! home ──▶ youtube_home ──▶ youtube_set_url
//!   └────▶ image_to_icon
//! ```
//!
//! Pages talk to each other only through [`Navigator::summary`]: the YouTube
//! home page reads the URL and title the set-url page fetched, the home page
//! reads the last conversion result.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Padding};

use crate::features::image_convert::IconConverter;
use crate::features::youtube::VideoDownloader;
use crate::tui::components::centered_rect;
use crate::tui::navigator::Navigator;
use crate::tui::page::PageId;

pub mod home;
pub mod image_to_icon;
pub mod youtube_home;
pub mod youtube_set_url;

pub use home::HomePage;
pub use image_to_icon::ImageToIconPage;
pub use youtube_home::YouTubeHomePage;
pub use youtube_set_url::YouTubeSetUrlPage;

pub const HOME: PageId = PageId::new("home");
pub const YOUTUBE_HOME: PageId = PageId::new("youtube_home");
pub const YOUTUBE_SET_URL: PageId = PageId::new("youtube_set_url");
pub const IMAGE_TO_ICON: PageId = PageId::new("image_to_icon");

/// Half-period of the text cursor blink.
pub const BLINK_INTERVAL: Duration = Duration::from_millis(500);
/// How long a transient alert stays on screen.
pub const ALERT_DURATION: Duration = Duration::from_secs(3);

/// Register every page. The caller pushes [`HOME`] afterwards.
pub fn register_all(
    nav: &Navigator,
    download_dir: PathBuf,
    icon_sizes: Vec<u32>,
    downloader: Arc<dyn VideoDownloader>,
    converter: Arc<dyn IconConverter>,
) {
    nav.register(HOME, HomePage::new());
    nav.register(
        YOUTUBE_HOME,
        YouTubeHomePage::new(Arc::clone(&downloader), download_dir),
    );
    nav.register(YOUTUBE_SET_URL, YouTubeSetUrlPage::new(downloader));
    nav.register(IMAGE_TO_ICON, ImageToIconPage::new(converter, icon_sizes));
}

const PANEL_WIDTH: u16 = 64;

/// Area for a panel with `content_height` rows inside its borders.
pub(crate) fn centered_panel_area(area: Rect, content_height: u16) -> Rect {
    centered_rect(PANEL_WIDTH, content_height + 2, area)
}

/// Bordered frame shared by all pages.
pub(crate) fn panel(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" {title} "))
        .padding(Padding::horizontal(1))
}

/// Key hints shown on the bottom border.
pub(crate) fn hints(text: &str) -> Line<'static> {
    Line::from(format!(" {text} ")).centered()
}
