use crate::adapter::MovieAdapter;
use crate::controller::UiEvent;
use crate::view::{ImageLoader, ListScreen, MovieRow, NavArgs, Navigator, Notice, SurfaceId, MOVIE_ID_ARG};
use std::io::Write;
use std::sync::Arc;
use tracing::{info, warn};

pub struct TerminalScreen<W: Write> {
    out: W,
    images: Arc<dyn ImageLoader>,
}

impl<W: Write> TerminalScreen<W> {
    pub fn new(out: W, images: Arc<dyn ImageLoader>) -> Self {
        Self { out, images }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn print(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
            warn!("Failed to write to terminal: {}", e);
        }
    }
}

struct TextRow {
    surface: SurfaceId,
    title: String,
    year: Option<String>,
}

impl MovieRow for TextRow {
    fn surface(&self) -> SurfaceId {
        self.surface
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn set_year(&mut self, year: Option<&str>) {
        self.year = year.map(|y| y.to_string());
    }
}

impl<W: Write> ListScreen for TerminalScreen<W> {
    fn data_set_changed(&mut self, adapter: &MovieAdapter) {
        self.print("");
        for position in 0..adapter.item_count() {
            // Rows are recycled by position, so the surface follows the slot, not the movie.
            let mut row = TextRow {
                surface: SurfaceId(position),
                title: String::new(),
                year: None,
            };
            adapter.bind(position, &mut row, self.images.as_ref());
            let line = match row.year {
                Some(year) => format!("{:>3}. {} ({})", position + 1, row.title, year),
                None => format!("{:>3}. {}", position + 1, row.title),
            };
            self.print(&line);
        }
    }

    fn set_clear_button_visible(&mut self, visible: bool) {
        if visible {
            self.print("(type :clear to reset the search)");
        }
    }

    fn clear_search_field(&mut self) {
        self.print("search cleared");
    }

    fn show_notice(&mut self, notice: Notice) {
        self.print(&format!("! {}", notice.message()));
    }
}

pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, destination: &str, args: NavArgs) {
        let id = args.get(MOVIE_ID_ARG).map(String::as_str).unwrap_or("?");
        info!("Navigate to {} with movieId={}", destination, id);
        println!("-> {} {}", destination, id);
    }
}

// Poster fetching off: rows keep their placeholder.
pub struct NoImages;

impl ImageLoader for NoImages {
    fn load(&self, _surface: SurfaceId, _source: crate::view::ImageSource) {}
}

pub fn parse_browse_line(line: &str) -> UiEvent {
    let trimmed = line.trim();
    match trimmed {
        ":clear" => UiEvent::ClearPressed,
        ":quit" | ":q" => UiEvent::Quit,
        _ => {
            if let Some(rest) = trimmed.strip_prefix(":open") {
                if let Ok(n) = rest.trim().parse::<usize>() {
                    if n > 0 {
                        return UiEvent::RowTapped(n - 1);
                    }
                }
            }
            UiEvent::QueryChanged(line.to_string())
        }
    }
}
