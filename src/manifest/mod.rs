pub mod dash;
pub mod ext;
pub mod hls;
pub mod sort;
pub mod utils;

pub use dash::parse_mpd;
pub use ext::{determine_ext, url_or_none};
pub use hls::parse_m3u8;
pub use sort::sort_formats;
