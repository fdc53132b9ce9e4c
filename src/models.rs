use serde::{Deserialize, Serialize};

pub const UNTITLED: &str = "(untitled)";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    #[serde(default, deserialize_with = "null_as_zero")]
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub alternative_name: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub poster: Option<Poster>,
    #[serde(default)]
    pub rating: Option<Rating>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Poster {
    #[serde(default)]
    pub preview_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    #[serde(default)]
    pub kp: Option<f64>,
    #[serde(default)]
    pub imdb: Option<f64>,
    #[serde(default)]
    pub film_critics: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct MoviePage {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub docs: Vec<Movie>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub pages: Option<u32>,
}

impl Movie {
    pub fn title(&self) -> &str {
        self.name
            .as_deref()
            .or(self.alternative_name.as_deref())
            .unwrap_or(UNTITLED)
    }

    pub fn display_year(&self) -> i32 {
        self.year.unwrap_or(0)
    }

    pub fn poster_url(&self) -> Option<&str> {
        self.poster.as_ref().and_then(|p| p.preview_url.as_deref())
    }
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(0))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Movie>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Movie>>::deserialize(deserializer)?.unwrap_or_default())
}
