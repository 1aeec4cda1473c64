use std::time::Duration;

use anyhow::Context;

use crate::models::{ArtistMatch, ArtistSearchResponse, SetlistEvent, SetlistPage};

pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
    pub page_delay: Duration,
    pub max_pages: u32,
}

/// Thin wrapper over the setlist.fm REST API. All calls are sequential; the
/// only timing control is a fixed delay between pagination requests.
pub struct SetlistClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    page_delay: Duration,
    max_pages: u32,
}

impl SetlistClient {
    pub fn new(config: ClientConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url,
            api_key: config.api_key,
            page_delay: config.page_delay,
            max_pages: config.max_pages,
        })
    }

    /// Resolves a free-text name to its best match, relevance-sorted. A
    /// non-success status or an empty result both come back as `None`; the
    /// caller gives up on this artist either way.
    pub async fn search_artist(&self, artist_name: &str) -> anyhow::Result<Option<ArtistMatch>> {
        let url = format!("{}/search/artists", self.base_url);
        let response = self
            .http
            .get(&url)
            .header("x-api-key", &self.api_key)
            .header("Accept", "application/json")
            .query(&[("artistName", artist_name), ("sort", "relevance")])
            .send()
            .await
            .context("artist search request failed")?;

        if !response.status().is_success() {
            println!("Artist search returned HTTP {}.", response.status());
            return Ok(None);
        }

        let body: ArtistSearchResponse = response
            .json()
            .await
            .context("artist search returned malformed JSON")?;
        Ok(body.artist.into_iter().next())
    }

    /// Fetches every setlist page for an artist, in server order. Stops on
    /// the server-reported page total, an empty page, a non-success status
    /// (keeping what was collected so far), or the configured page bound.
    pub async fn fetch_all_setlists(&self, mbid: &str) -> anyhow::Result<Vec<SetlistEvent>> {
        let mut events = Vec::new();
        let mut page: u32 = 1;

        loop {
            let Some(body) = self.fetch_setlist_page(mbid, page).await? else {
                break;
            };
            if body.setlist.is_empty() {
                break;
            }
            events.extend(body.setlist);

            if page >= body.total {
                break;
            }
            if page >= self.max_pages {
                println!(
                    "Reached the {} page limit before the server total of {}; stopping.",
                    self.max_pages, body.total
                );
                break;
            }

            page += 1;
            tokio::time::sleep(self.page_delay).await;
        }

        Ok(events)
    }

    async fn fetch_setlist_page(&self, mbid: &str, page: u32) -> anyhow::Result<Option<SetlistPage>> {
        let url = format!("{}/artist/{}/setlists", self.base_url, mbid);
        let response = self
            .http
            .get(&url)
            .header("x-api-key", &self.api_key)
            .header("Accept", "application/json")
            .query(&[("p", page)])
            .send()
            .await
            .with_context(|| format!("setlists request for page {page} failed"))?;

        if !response.status().is_success() {
            println!(
                "Setlists page {page} returned HTTP {}; continuing with what was fetched.",
                response.status()
            );
            return Ok(None);
        }

        let body = response
            .json::<SetlistPage>()
            .await
            .with_context(|| format!("setlists page {page} was malformed JSON"))?;
        Ok(Some(body))
    }
}
