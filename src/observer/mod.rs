mod error;
mod geocoder;
mod location;
mod observer;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

pub use error::LocationError;
pub use geocoder::{Geocoder, WebGeocoder};
pub use location::{parse_location, LocationInput};
pub use observer::ObserverState;

/// Resolves free-text input: literal coordinates directly, place names via
/// the geocoder.
pub async fn resolve<G: Geocoder>(
    input: &str,
    geocoder: &G,
) -> Result<ObserverState, LocationError> {
    match parse_location(input)? {
        LocationInput::Coordinates(observer) => Ok(observer),
        LocationInput::Place(name) => geocoder.geocode(&name).await,
    }
}

/// Asks on stdin until an entry resolves. Empty input selects `default`;
/// end of input falls back to `default` once.
pub async fn prompt<G: Geocoder>(
    geocoder: &G,
    default: &str,
) -> Result<ObserverState, LocationError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout
            .write_all(format!("Enter location (default=\"{}\"): ", default).as_bytes())
            .await?;
        stdout.flush().await?;

        let entry = match lines.next_line().await? {
            Some(line) if !line.trim().is_empty() => line,
            Some(_) => default.to_string(),
            None => return resolve(default, geocoder).await,
        };

        match resolve(&entry, geocoder).await {
            Ok(observer) => return Ok(observer),
            Err(e) => log::warn!("{}", e),
        }
    }
}
