use thiserror::Error;

/// Failure to load the process configuration at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure talking to the geocoding service. Never leaves the geocoding client;
/// callers only see "found" or "not found".
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Request(String),

    #[error("geocoding response malformed: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for GeocodeError {
    fn from(e: reqwest::Error) -> Self {
        GeocodeError::Request(e.without_url().to_string())
    }
}

impl From<serde_json::Error> for GeocodeError {
    fn from(e: serde_json::Error) -> Self {
        GeocodeError::Malformed(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ProductionError {
    #[error("missing credential {0}")]
    MissingCredential(&'static str),

    #[error("production request failed: {0}")]
    Request(String),

    #[error("production service returned errors: {0}")]
    Service(String),

    #[error("production response malformed: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ProductionError {
    fn from(e: reqwest::Error) -> Self {
        ProductionError::Request(e.without_url().to_string())
    }
}

impl From<serde_json::Error> for ProductionError {
    fn from(e: serde_json::Error) -> Self {
        ProductionError::Malformed(e.to_string())
    }
}

/// Failure of the advisory text service. Always absorbed by the insight
/// advisor, which switches to its fixed insight set.
#[derive(Debug, Error)]
pub enum AdvisoryError {
    #[error("missing credential {0}")]
    MissingCredential(&'static str),

    #[error("advisory request failed: {0}")]
    Request(String),

    #[error("advisory response malformed: {0}")]
    Malformed(String),

    #[error("advisory response contained no text")]
    EmptyResponse,
}

impl From<reqwest::Error> for AdvisoryError {
    fn from(e: reqwest::Error) -> Self {
        AdvisoryError::Request(e.without_url().to_string())
    }
}

impl From<serde_json::Error> for AdvisoryError {
    fn from(e: serde_json::Error) -> Self {
        AdvisoryError::Malformed(e.to_string())
    }
}

/// Terminal outcomes of one analysis run other than success.
#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error("Location not found")]
    LocationNotFound,

    #[error("Production data unavailable: {0}")]
    ProductionDataUnavailable(String),

    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<ProductionError> for AnalysisError {
    fn from(e: ProductionError) -> Self {
        match e {
            ProductionError::MissingCredential(name) => AnalysisError::ConfigurationMissing(name.to_string()),
            other => AnalysisError::ProductionDataUnavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_production_key_maps_to_configuration_missing() {
        let err: AnalysisError = ProductionError::MissingCredential("NREL_API_KEY").into();
        assert_eq!(err, AnalysisError::ConfigurationMissing("NREL_API_KEY".to_string()));
    }

    #[test]
    fn service_errors_keep_their_reason() {
        let err: AnalysisError = ProductionError::Service("invalid api_key".to_string()).into();
        match err {
            AnalysisError::ProductionDataUnavailable(reason) => assert!(reason.contains("invalid api_key")),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
