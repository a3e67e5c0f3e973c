//! External collaborators the pages drive from background tasks.
//!
//! - [`youtube`]: metadata lookup, downloads and installation of `yt-dlp`
//! - [`image_convert`]: image → `.ico` set conversion

pub mod image_convert;
pub mod youtube;
