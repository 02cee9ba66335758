use std::time::Duration;

use serde::Deserialize;

const GEO_URL: &str = "http://ip-api.com/json";

#[derive(Deserialize)]
struct GeoResponse {
    city: String,
    country: String,
}

/// Best-effort lookup of a human-readable location for run metadata.
/// Any failure yields `None`; the caller substitutes "Unknown".
pub async fn resolve_location() -> Option<String> {
    let client = reqwest::Client::new();
    match client
        .get(GEO_URL)
        .timeout(Duration::from_secs(10))
        .send()
        .await
    {
        Ok(res) => match res.json::<GeoResponse>().await {
            Ok(geo) => Some(format!("{}, {}", geo.city, geo.country)),
            Err(e) => {
                log::error!("Error when deserializing geolocation response: {:?}", e);
                None
            }
        },
        Err(e) => {
            log::error!("Got error from geolocation api: {:?}", e);
            None
        }
    }
}
