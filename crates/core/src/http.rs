use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use url::Url;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub endpoint: Url,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

impl EndpointConfig {
    pub fn parse(endpoint: &str, api_token: Option<String>) -> Result<Self, url::ParseError> {
        let endpoint = Url::parse(endpoint.trim())?;
        let api_token = api_token.and_then(|value| {
            let token = value.trim().to_string();
            if token.is_empty() {
                None
            } else {
                Some(token)
            }
        });

        Ok(Self {
            endpoint,
            api_token,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    pub(crate) fn client(&self) -> Result<Client, reqwest::Error> {
        Client::builder().timeout(self.timeout).build()
    }

    pub(crate) fn post(&self, client: &Client) -> RequestBuilder {
        let request = client
            .post(self.endpoint.clone())
            .header("content-type", "application/json");

        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EndpointConfig;

    #[test]
    fn blank_token_is_dropped() {
        let config = EndpointConfig::parse(" http://localhost:8080/embed ", Some("  ".to_string()))
            .expect("endpoint should parse");
        assert_eq!(config.endpoint.as_str(), "http://localhost:8080/embed");
        assert!(config.api_token.is_none());
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        assert!(EndpointConfig::parse("not a url", None).is_err());
    }
}
