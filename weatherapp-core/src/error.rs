use reqwest::StatusCode;
use thiserror::Error;

/// Failures produced by the location resolver and the weather client.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Permission to access location was denied")]
    PermissionDenied,

    #[error("No position fix available: {0}")]
    LocationUnavailable(String),

    #[error("Failed to send request to OpenWeather ({endpoint})")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("OpenWeather {endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("Failed to parse OpenWeather {endpoint} JSON")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl WeatherError {
    /// True for every failure that originated at the weather API.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            WeatherError::Transport { .. } | WeatherError::Status { .. } | WeatherError::Decode { .. }
        )
    }

    /// Upstream answered 404, which is how an unmatched name search is reported.
    pub fn is_not_found(&self) -> bool {
        matches!(self, WeatherError::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
