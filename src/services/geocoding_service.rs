use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::GeocodingConfig;
use crate::errors::GeocodeError;
use crate::models::analysis::{Coordinates, NominatimPlace, NominatimReverse};

/// Place name <-> coordinates lookups.
///
/// Neither call fails: a name that cannot be resolved is `None`, and a point
/// without a known address is labelled with its rounded coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, name: &str) -> Option<Coordinates>;

    async fn reverse_resolve(&self, coordinates: Coordinates) -> String;
}

/// Nominatim (OpenStreetMap) client
pub struct NominatimClient {
    client: Client,
    base_url: String,
}

impl NominatimClient {
    pub fn new(config: &GeocodingConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, base_url: config.base_url.trim_end_matches('/').to_string() })
    }

    async fn search(&self, name: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let url = format!("{}/search", self.base_url);
        let response = self.client.get(&url)
            .query(&[("format", "json"), ("limit", "1"), ("q", name)])
            .send().await?
            .error_for_status()?;

        let places: Vec<NominatimPlace> = serde_json::from_str(&response.text().await?)?;
        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };

        let lat = place.lat.parse::<f64>().map_err(|e| GeocodeError::Malformed(e.to_string()))?;
        let lon = place.lon.parse::<f64>().map_err(|e| GeocodeError::Malformed(e.to_string()))?;
        Ok(Some(Coordinates { lat, lon }))
    }

    async fn reverse(&self, coordinates: Coordinates) -> Result<Option<String>, GeocodeError> {
        let url = format!("{}/reverse", self.base_url);
        let response = self.client.get(&url)
            .query(&[
                ("format", "json".to_string()),
                ("lat", coordinates.lat.to_string()),
                ("lon", coordinates.lon.to_string()),
                ("accept-language", "en".to_string()),
            ])
            .send().await?
            .error_for_status()?;

        let reverse: NominatimReverse = serde_json::from_str(&response.text().await?)?;
        Ok(reverse.address.map(|address| {
            let city = address.city
                .or(address.town)
                .or(address.village)
                .unwrap_or_else(|| "Unknown".to_string());
            format!("{}, {}", city, address.state.unwrap_or_default())
        }))
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn resolve(&self, name: &str) -> Option<Coordinates> {
        match self.search(name).await {
            Ok(Some(coordinates)) => {
                debug!("geocoded '{}' to {:.4},{:.4}", name, coordinates.lat, coordinates.lon);
                Some(coordinates)
            }
            Ok(None) => {
                debug!("no geocoding match for '{}'", name);
                None
            }
            Err(e) => {
                warn!("geocoding '{}' failed: {}", name, e);
                None
            }
        }
    }

    async fn reverse_resolve(&self, coordinates: Coordinates) -> String {
        match self.reverse(coordinates).await {
            Ok(Some(label)) => label,
            Ok(None) => coordinate_label(coordinates),
            Err(e) => {
                warn!("reverse geocoding failed: {}", e);
                coordinate_label(coordinates)
            }
        }
    }
}

fn coordinate_label(coordinates: Coordinates) -> String {
    format!("{:.2}, {:.2}", coordinates.lat, coordinates.lon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client_for(url: String) -> NominatimClient {
        NominatimClient::new(&GeocodingConfig {
            base_url: url,
            user_agent: "solar-sensei-test".to_string(),
            timeout_secs: 5,
        }).unwrap()
    }

    #[tokio::test]
    async fn resolves_first_match() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(Matcher::UrlEncoded("q".into(), "Mumbai".into()))
            .with_status(200)
            .with_body(json!([{ "lat": "19.0760", "lon": "72.8777", "display_name": "Mumbai" }]).to_string())
            .create_async()
            .await;

        let coordinates = client_for(server.url()).resolve("Mumbai").await.unwrap();

        assert_eq!(coordinates, Coordinates { lat: 19.076, lon: 72.8777 });
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn empty_result_is_not_found() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        assert!(client_for(server.url()).resolve("Atlantis").await.is_none());
    }

    #[tokio::test]
    async fn server_error_is_not_found() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        assert!(client_for(server.url()).resolve("Mumbai").await.is_none());
    }

    #[tokio::test]
    async fn reverse_prefers_city_then_town() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/reverse")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({ "address": { "town": "Alibag", "state": "Maharashtra" } }).to_string())
            .create_async()
            .await;

        let label = client_for(server.url()).reverse_resolve(Coordinates { lat: 18.64, lon: 72.87 }).await;
        assert_eq!(label, "Alibag, Maharashtra");
    }

    #[tokio::test]
    async fn reverse_falls_back_to_coordinates() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/reverse")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({ "error": "Unable to geocode" }).to_string())
            .create_async()
            .await;

        let label = client_for(server.url()).reverse_resolve(Coordinates { lat: 10.123, lon: -20.456 }).await;
        assert_eq!(label, "10.12, -20.46");
    }
}
