use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("line does not conform to tle format: {0}")]
    Tle(#[from] sgp4::TleError),
    #[error("elements rejected by propagator: {0}")]
    Elements(#[from] sgp4::ElementsError),
}
