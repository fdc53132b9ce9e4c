use crate::models::Movie;
use crate::view::{ImageLoader, ImageSource, MovieRow, NavArgs, Navigator, DETAIL_DESTINATION, MOVIE_ID_ARG};
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub struct MovieAdapter {
    movies: Vec<Movie>,
}

impl MovieAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_movies(&mut self, movies: Vec<Movie>) {
        debug!("Render state replaced: {} -> {} rows", self.movies.len(), movies.len());
        self.movies = movies;
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn item_count(&self) -> usize {
        self.movies.len()
    }

    pub fn bind(&self, position: usize, row: &mut dyn MovieRow, images: &dyn ImageLoader) {
        let Some(movie) = self.movies.get(position) else {
            warn!("Bind requested for row {} of {}", position, self.movies.len());
            return;
        };
        row.set_title(movie.title());

        let year = movie.display_year();
        if year != 0 {
            row.set_year(Some(year.to_string().as_str()));
        } else {
            row.set_year(None);
        }

        images.load(row.surface(), poster_source(movie));
    }

    pub fn on_item_click(&self, position: usize, navigator: &dyn Navigator) {
        let Some(movie) = self.movies.get(position) else {
            warn!("Tap on row {} of {}", position, self.movies.len());
            return;
        };
        let mut args = NavArgs::new();
        args.insert(MOVIE_ID_ARG.to_string(), movie.id.to_string());
        navigator.navigate(DETAIL_DESTINATION, args);
    }
}

pub fn poster_source(movie: &Movie) -> ImageSource {
    // An empty URL counts as no poster.
    match movie.poster_url() {
        Some(url) if !url.is_empty() => ImageSource::Url(url.to_string()),
        _ => ImageSource::Placeholder,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Poster;
    use crate::view::SurfaceId;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Row {
        title: String,
        year: Option<String>,
    }

    impl MovieRow for Row {
        fn surface(&self) -> SurfaceId {
            SurfaceId(7)
        }
        fn set_title(&mut self, title: &str) {
            self.title = title.to_string();
        }
        fn set_year(&mut self, year: Option<&str>) {
            self.year = year.map(|y| y.to_string());
        }
    }

    #[derive(Default)]
    struct Images(Mutex<Vec<(SurfaceId, ImageSource)>>);

    impl ImageLoader for Images {
        fn load(&self, surface: SurfaceId, source: ImageSource) {
            self.0.lock().unwrap().push((surface, source));
        }
    }

    #[derive(Default)]
    struct Nav(Mutex<Vec<(String, NavArgs)>>);

    impl Navigator for Nav {
        fn navigate(&self, destination: &str, args: NavArgs) {
            self.0.lock().unwrap().push((destination.to_string(), args));
        }
    }

    fn movie(id: i64, year: Option<i32>, preview: Option<Option<&str>>) -> Movie {
        Movie {
            id,
            name: Some(format!("Movie {id}")),
            alternative_name: None,
            year,
            poster: preview.map(|p| Poster {
                preview_url: p.map(|s| s.to_string()),
            }),
            rating: None,
        }
    }

    #[test]
    fn year_label_hidden_when_unknown() {
        let mut adapter = MovieAdapter::new();
        adapter.set_movies(vec![movie(1, None, None), movie(2, Some(1999), None)]);
        let images = Images::default();

        let mut row = Row::default();
        row.year = Some("stale".to_string());
        adapter.bind(0, &mut row, &images);
        assert_eq!(row.title, "Movie 1");
        assert_eq!(row.year, None);

        adapter.bind(1, &mut row, &images);
        assert_eq!(row.year.as_deref(), Some("1999"));
    }

    #[test]
    fn poster_falls_back_to_placeholder() {
        let mut adapter = MovieAdapter::new();
        adapter.set_movies(vec![
            movie(1, None, None),
            movie(2, None, Some(Some(""))),
            movie(3, None, Some(None)),
            movie(4, None, Some(Some("https://img/4.jpg"))),
        ]);
        let images = Images::default();
        let mut row = Row::default();
        for i in 0..adapter.item_count() {
            adapter.bind(i, &mut row, &images);
        }
        let loads = images.0.lock().unwrap();
        assert_eq!(
            loads.iter().map(|(_, s)| s.clone()).collect::<Vec<_>>(),
            vec![
                ImageSource::Placeholder,
                ImageSource::Placeholder,
                ImageSource::Placeholder,
                ImageSource::Url("https://img/4.jpg".to_string()),
            ]
        );
        assert!(loads.iter().all(|(surface, _)| *surface == SurfaceId(7)));
    }

    #[test]
    fn tap_navigates_with_movie_id_only() {
        let mut adapter = MovieAdapter::new();
        adapter.set_movies(vec![movie(301, None, None), movie(42, None, None)]);
        let nav = Nav::default();
        adapter.on_item_click(1, &nav);
        adapter.on_item_click(5, &nav);

        let calls = nav.0.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, DETAIL_DESTINATION);
        assert_eq!(calls[0].1.len(), 1);
        assert_eq!(calls[0].1.get(MOVIE_ID_ARG).map(String::as_str), Some("42"));
    }

    #[test]
    fn out_of_range_bind_leaves_row_untouched() {
        let adapter = MovieAdapter::new();
        let images = Images::default();
        let mut row = Row::default();
        adapter.bind(0, &mut row, &images);
        assert!(row.title.is_empty());
        assert!(images.0.lock().unwrap().is_empty());
    }
}
