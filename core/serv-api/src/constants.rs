use std::env;

use url::Url;

pub const DEFAULT_API_HOST: &str = "127.0.0.1";
pub const DEFAULT_API_PORT: u16 = 7465;

/// REST API base address. `FARMGATE_API_URL` overrides the default,
/// explicit CLI flags win over both.
pub fn rest_api_url() -> anyhow::Result<Url> {
    let api_url = env::var("FARMGATE_API_URL")
        .unwrap_or_else(|_| format!("http://{}:{}", DEFAULT_API_HOST, DEFAULT_API_PORT));
    Ok(Url::parse(&api_url)?)
}
