use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Classified failures for the plan pipeline. Everything here is meant to be
/// shown to the user as a single message; nothing is retried automatically.
#[derive(Debug, Error)]
pub enum Error {
    /// No credential available. Raised before any network call is attempted.
    #[error(
        "No OpenWeather API key configured.\n\
         Hint: run `airplan configure` or set the OPENWEATHER_API_KEY environment variable."
    )]
    MissingApiKey,

    /// Geocoding returned zero results. User-correctable.
    #[error("City '{0}' not found.\nHint: add a country code, e.g. `--country GB`.")]
    PlaceNotFound(String),

    /// Network failure, non-success status or malformed upstream response.
    #[error("Air quality service unavailable: {0}")]
    Upstream(String),

    /// No activities supplied; rejected before any network call.
    #[error("Add at least one activity.")]
    EmptyActivities,

    /// Reload of a stored plan that does not exist. Non-fatal for the CLI.
    #[error("No stored plan with id {0}.")]
    PlanNotFound(i64),

    #[error("Plan store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error(transparent)]
    Config(#[from] anyhow::Error),
}

impl Error {
    /// Wrap an upstream failure with the call-site context, mirroring the
    /// message shape of transport errors elsewhere in the provider.
    pub fn upstream(context: &str, err: impl std::fmt::Display) -> Self {
        Error::Upstream(format!("{context}: {err}"))
    }
}
