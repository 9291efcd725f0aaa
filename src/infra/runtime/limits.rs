use std::time::Duration;

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Build a reqwest client with a bounded connect and total timeout.
pub fn make_http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .timeout(timeout)
        .build()
}
