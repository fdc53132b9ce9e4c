use crate::adapter::MovieAdapter;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Url(String),
    Placeholder,
}

// A new load into a busy surface replaces the earlier one.
pub trait ImageLoader: Send + Sync {
    fn load(&self, surface: SurfaceId, source: ImageSource);
}

pub trait MovieRow {
    fn surface(&self) -> SurfaceId;
    fn set_title(&mut self, title: &str);
    // None hides the year label.
    fn set_year(&mut self, year: Option<&str>);
}

pub const DETAIL_DESTINATION: &str = "movie_detail";
pub const MOVIE_ID_ARG: &str = "movieId";

pub type NavArgs = BTreeMap<String, String>;

pub trait Navigator {
    fn navigate(&self, destination: &str, args: NavArgs);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    NotFound,
    SearchFailed(String),
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::NotFound => "No movies found".to_string(),
            Notice::SearchFailed(reason) => format!("Error: {}", reason),
        }
    }
}

pub trait ListScreen {
    fn data_set_changed(&mut self, adapter: &MovieAdapter);
    fn set_clear_button_visible(&mut self, visible: bool);
    // Must not be reported back as a text change.
    fn clear_search_field(&mut self);
    fn show_notice(&mut self, notice: Notice);
}
