use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::{debug, warn};

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

fn title_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^https?://(www\.|m\.)?imdb\.com/title/tt(\d+)/?").unwrap())
}

/// The numeric part of an IMDb title URL ("0926084" for
/// https://www.imdb.com/title/tt0926084), or `None` if the URL is not
/// an IMDb title link.
pub fn parse_title_id(url: &str) -> Option<String> {
    title_url_regex()
        .captures(url.trim())
        .map(|caps| caps[2].to_string())
}

#[derive(Debug, Clone)]
pub struct TitleDetails {
    pub id: String,
    pub title: String,
    pub year: Option<String>,
    pub plot: String,
    pub kind: String,
    pub rating: f64,
    pub votes: u64,
    pub cast: String,
    pub genres: String,
    pub image: Option<String>,
}

impl TitleDetails {
    pub fn heading(&self) -> String {
        match &self.year {
            Some(year) => format!("{} ({})", self.title, year),
            None => self.title.clone(),
        }
    }
}

/// Scrapes title metadata from IMDb and backdrops from fanart.tv.
#[derive(Clone)]
pub struct ImdbClient {
    http: reqwest::Client,
    fanart_api_key: Option<String>,
}

impl ImdbClient {
    pub fn new(http: reqwest::Client, fanart_api_key: Option<String>) -> Self {
        Self {
            http,
            fanart_api_key,
        }
    }

    /// Title details for an IMDb title id. IMDb embeds a JSON-LD block
    /// in every title page; that is the only part of the page we read.
    pub async fn title_details(&self, id: &str) -> anyhow::Result<TitleDetails> {
        let url = format!("https://www.imdb.com/title/tt{}/", id);
        debug!("ImdbClient: Fetching {}", url);

        let page = self
            .http
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let data = extract_json_ld(&page)
            .ok_or_else(|| anyhow::anyhow!("no JSON-LD metadata on title page"))?;

        parse_title_details(id, &data)
    }

    /// A backdrop image URL from fanart.tv, or `None` when no key is
    /// configured, no art exists, or the request fails. Artwork is
    /// decoration; failures are logged and swallowed.
    pub async fn fanart(&self, id: &str, kind: &str) -> Option<String> {
        let api_key = self.fanart_api_key.as_ref()?;
        let endpoint = if kind == "Movie" { "movies" } else { "tv" };
        let url = format!(
            "http://webservice.fanart.tv/v3/{}/tt{}?api_key={}",
            endpoint, id, api_key
        );

        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!("ImdbClient: fanart.tv request failed: {}", err);
                return None;
            }
        };

        let body: Value = response.json().await.ok()?;
        let backgrounds = if kind == "Movie" {
            body.get("moviebackground")?
        } else {
            body.get("tvbackground")?
        };
        backgrounds
            .get(0)?
            .get("url")?
            .as_str()
            .map(str::to_string)
    }
}

/// The `<script type="application/ld+json">` payload of an IMDb title
/// page.
fn extract_json_ld(page: &str) -> Option<Value> {
    let marker = r#"<script type="application/ld+json">"#;
    let start = page.find(marker)? + marker.len();
    let end = page[start..].find("</script>")?;
    serde_json::from_str(&page[start..start + end]).ok()
}

fn parse_title_details(id: &str, data: &Value) -> anyhow::Result<TitleDetails> {
    let title = data
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow::anyhow!("title metadata has no name"))?
        .to_string();

    let year = data
        .get("datePublished")
        .and_then(Value::as_str)
        .and_then(|date| date.get(..4))
        .map(str::to_string);

    let plot = data
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or("No plot available.")
        .to_string();

    let kind = match data.get("@type").and_then(Value::as_str).unwrap_or("Movie") {
        "Movie" => "Movie",
        "TVSeries" => "Series",
        "TVEpisode" => "Series Episode",
        "TVSpecial" => "TV Special",
        "TVMiniSeries" => "Series",
        other => other,
    }
    .to_string();

    let rating = data
        .get("aggregateRating")
        .and_then(|r| r.get("ratingValue"))
        .and_then(Value::as_f64)
        .unwrap_or(0.0);

    let votes = data
        .get("aggregateRating")
        .and_then(|r| r.get("ratingCount"))
        .and_then(Value::as_u64)
        .unwrap_or(0);

    let cast = data
        .get("actor")
        .and_then(Value::as_array)
        .map(|actors| {
            actors
                .iter()
                .filter_map(|actor| actor.get("name").and_then(Value::as_str))
                .take(3)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .filter(|names| !names.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());

    let genres = data
        .get("genre")
        .map(|genre| match genre {
            Value::String(s) => s.clone(),
            Value::Array(list) => list
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            _ => String::new(),
        })
        .filter(|genres| !genres.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());

    let image = data
        .get("image")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(TitleDetails {
        id: id.to_string(),
        title,
        year,
        plot,
        kind,
        rating,
        votes,
        cast,
        genres,
        image,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_title_id() {
        assert_eq!(
            parse_title_id("https://www.imdb.com/title/tt0926084").as_deref(),
            Some("0926084")
        );
        assert_eq!(
            parse_title_id("http://m.imdb.com/title/tt1375666/").as_deref(),
            Some("1375666")
        );
        assert_eq!(parse_title_id("https://example.com/title/tt1"), None);
        assert_eq!(parse_title_id("not a url"), None);
    }

    #[test]
    fn test_parse_title_details() {
        let page = r#"
            <html><head>
            <script type="application/ld+json">{
                "@type": "Movie",
                "name": "Harry Potter and the Deathly Hallows: Part 1",
                "description": "Harry, Ron and Hermione set out...",
                "datePublished": "2010-11-19",
                "image": "https://m.media-amazon.com/poster.jpg",
                "genre": ["Adventure", "Family", "Fantasy"],
                "actor": [
                    {"name": "Daniel Radcliffe"},
                    {"name": "Emma Watson"},
                    {"name": "Rupert Grint"},
                    {"name": "Ralph Fiennes"}
                ],
                "aggregateRating": {"ratingValue": 7.7, "ratingCount": 550000}
            }</script>
            </head></html>
        "#;

        let data = extract_json_ld(page).unwrap();
        let details = parse_title_details("0926084", &data).unwrap();

        assert_eq!(details.heading(), "Harry Potter and the Deathly Hallows: Part 1 (2010)");
        assert_eq!(details.kind, "Movie");
        assert_eq!(details.genres, "Adventure, Family, Fantasy");
        // Cast capped at three names
        assert_eq!(details.cast, "Daniel Radcliffe, Emma Watson, Rupert Grint");
        assert_eq!(details.votes, 550000);
    }

    #[test]
    fn test_extract_json_ld_missing() {
        assert!(extract_json_ld("<html><body>no metadata</body></html>").is_none());
    }
}
