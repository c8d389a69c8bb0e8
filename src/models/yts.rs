// ============================================================================
// YTS list_movies API Types
// ============================================================================

use serde::{Deserialize, Serialize};

use super::{CatalogEntry, EntryId, Variant};

/// Envelope returned by `/list_movies.json`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiListResponse {
    pub status: String,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub data: Option<ApiListData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiListData {
    #[serde(default)]
    pub movie_count: Option<u64>,
    #[serde(default)]
    pub movies: Option<Vec<ApiMovie>>,
}

impl ApiListResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    /// Movies in the response; an absent `movies` key means no results
    pub fn into_movies(self) -> Vec<ApiMovie> {
        self.data.and_then(|d| d.movies).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiMovie {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    #[serde(default)]
    pub date_uploaded: Option<String>,
    #[serde(default)]
    pub torrents: Option<Vec<ApiTorrent>>,
    #[serde(default)]
    pub large_cover_image: Option<String>,
    #[serde(default)]
    pub medium_cover_image: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiTorrent {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub seeds: Option<i64>,
    #[serde(default)]
    pub peers: Option<i64>,
}

impl From<ApiTorrent> for Variant {
    fn from(torrent: ApiTorrent) -> Self {
        Variant {
            quality: torrent.quality.unwrap_or_else(|| "Unknown".to_string()),
            size: torrent.size.unwrap_or_else(|| "Unknown".to_string()),
            seeds: torrent.seeds.unwrap_or(0),
            peers: torrent.peers.unwrap_or(0),
            url: torrent.url,
        }
    }
}

impl From<ApiMovie> for CatalogEntry {
    fn from(movie: ApiMovie) -> Self {
        // YTS never issues id 0; treat it like a missing id so it is never notified
        let id = movie.id.filter(|id| *id != 0).map(EntryId);

        let poster_url = movie
            .large_cover_image
            .filter(|url| !url.is_empty())
            .or(movie.medium_cover_image.filter(|url| !url.is_empty()));

        CatalogEntry {
            id,
            title: movie.title.unwrap_or_default(),
            slug: movie.slug,
            year: movie.year,
            rating: movie.rating,
            genres: movie.genres.unwrap_or_default(),
            listed_at: movie.date_uploaded,
            variants: movie
                .torrents
                .unwrap_or_default()
                .into_iter()
                .map(Variant::from)
                .collect(),
            poster_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST_RESPONSE: &str = r#"{
        "status": "ok",
        "status_message": "Query was successful",
        "data": {
            "movie_count": 2,
            "limit": 20,
            "page_number": 1,
            "movies": [
                {
                    "id": 68123,
                    "url": "https://yts.mx/movies/28-years-later-2025",
                    "title": "28 Years Later",
                    "slug": "28-years-later-2025",
                    "year": 2025,
                    "rating": 6.9,
                    "genres": ["Horror", "Thriller"],
                    "medium_cover_image": "https://yts.mx/m.jpg",
                    "large_cover_image": "https://yts.mx/l.jpg",
                    "torrents": [
                        {"url": "https://yts.mx/t/1", "quality": "720p", "size": "1.05 GB", "seeds": 120, "peers": 30},
                        {"url": "https://yts.mx/t/2", "quality": "1080p", "size": "2.1 GB", "seeds": 210, "peers": 64}
                    ],
                    "date_uploaded": "2025-07-10 14:32:11"
                },
                {
                    "id": 68124,
                    "title": "Quiet Film",
                    "year": 2024,
                    "rating": 7
                }
            ]
        }
    }"#;

    #[test]
    fn test_list_response_deserialization() {
        let response: ApiListResponse = serde_json::from_str(LIST_RESPONSE).unwrap();
        assert!(response.is_ok());

        let movies = response.into_movies();
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].id, Some(68123));
        assert_eq!(movies[1].rating, Some(7.0));
        assert!(movies[1].torrents.is_none());
    }

    #[test]
    fn test_error_response_without_data() {
        let json = r#"{"status": "error", "status_message": "Invalid query"}"#;
        let response: ApiListResponse = serde_json::from_str(json).unwrap();
        assert!(!response.is_ok());
        assert_eq!(response.status_message.as_deref(), Some("Invalid query"));
        assert!(response.into_movies().is_empty());
    }

    #[test]
    fn test_empty_result_has_no_movies_key() {
        let json = r#"{"status": "ok", "data": {"movie_count": 0, "limit": 20}}"#;
        let response: ApiListResponse = serde_json::from_str(json).unwrap();
        assert!(response.into_movies().is_empty());
    }

    #[test]
    fn test_api_movie_to_catalog_entry() {
        let response: ApiListResponse = serde_json::from_str(LIST_RESPONSE).unwrap();
        let entry: CatalogEntry = response.into_movies().remove(0).into();

        assert_eq!(entry.id, Some(EntryId(68123)));
        assert_eq!(entry.title, "28 Years Later");
        assert_eq!(entry.slug.as_deref(), Some("28-years-later-2025"));
        assert_eq!(entry.genres, vec!["Horror", "Thriller"]);
        assert_eq!(entry.listed_at.as_deref(), Some("2025-07-10 14:32:11"));
        assert_eq!(entry.poster_url.as_deref(), Some("https://yts.mx/l.jpg"));
        assert_eq!(entry.variants.len(), 2);
        assert_eq!(entry.variants[1].quality, "1080p");
        assert_eq!(entry.variants[1].seeds, 210);
        assert_eq!(entry.variants[1].url.as_deref(), Some("https://yts.mx/t/2"));
    }

    #[test]
    fn test_api_movie_with_sparse_fields() {
        let movie = ApiMovie {
            id: Some(0),
            title: None,
            slug: None,
            year: None,
            rating: None,
            genres: None,
            date_uploaded: None,
            torrents: Some(vec![ApiTorrent {
                url: None,
                quality: None,
                size: None,
                seeds: None,
                peers: None,
            }]),
            large_cover_image: Some(String::new()),
            medium_cover_image: Some("https://yts.mx/m.jpg".to_string()),
        };

        let entry: CatalogEntry = movie.into();
        assert_eq!(entry.id, None);
        assert_eq!(entry.title, "");
        assert!(entry.genres.is_empty());
        assert_eq!(entry.poster_url.as_deref(), Some("https://yts.mx/m.jpg"));
        assert_eq!(entry.variants[0].quality, "Unknown");
        assert_eq!(entry.variants[0].seeds, 0);
    }
}
