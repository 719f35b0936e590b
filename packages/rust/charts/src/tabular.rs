//! Remote tabular data (JSON or CSV endpoints) as label/value rows.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use briefwright_shared::{BriefwrightError, Result, build_client, public_target};

use crate::spec::{DataPoint, RawChartSpec};

/// Fetches `{label, value}` rows. Malformed or failed responses yield an
/// empty list.
#[async_trait]
pub trait TabularSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Vec<DataPoint>;
}

/// Reads JSON (any shape [`RawChartSpec::from_json`] accepts) or CSV.
///
/// Private and non-HTTP targets are refused before any request is made.
#[derive(Debug, Clone)]
pub struct HttpTabularSource {
    client: Client,
    /// Permit loopback/private hosts (mock servers in tests).
    allow_private: bool,
}

impl HttpTabularSource {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            allow_private: false,
        })
    }

    #[cfg(test)]
    pub(crate) fn allow_private(mut self) -> Self {
        self.allow_private = true;
        self
    }

    async fn fetch_body(&self, url: &str) -> Result<String> {
        let target = if self.allow_private {
            url::Url::parse(url).map_err(|e| BriefwrightError::validation(format!("{url}: {e}")))?
        } else {
            public_target(url)?
        };

        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(|e| BriefwrightError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BriefwrightError::Network(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| BriefwrightError::Network(format!("{url}: body read failed: {e}")))
    }
}

#[async_trait]
impl TabularSource for HttpTabularSource {
    async fn fetch(&self, url: &str) -> Vec<DataPoint> {
        match self.fetch_body(url).await {
            Ok(body) => {
                let rows = parse_table(&body);
                if rows.is_empty() {
                    debug!(%url, "no tabular rows in response");
                }
                rows
            }
            Err(e) => {
                warn!(%url, error = %e, "tabular fetch failed");
                Vec::new()
            }
        }
    }
}

/// Parse a JSON or CSV body into rows.
pub fn parse_table(body: &str) -> Vec<DataPoint> {
    let trimmed = body.trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        return match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(value) => RawChartSpec::from_json(&value).points(),
            Err(e) => {
                debug!(error = %e, "malformed JSON table");
                Vec::new()
            }
        };
    }
    parse_csv(trimmed)
}

/// First cell is the label, the first numeric cell after it the value.
/// Header rows and rows without a number are skipped.
fn parse_csv(body: &str) -> Vec<DataPoint> {
    body.lines()
        .filter_map(|line| {
            let delimiter = if line.contains('\t') { '\t' } else { ',' };
            let mut cells = line
                .split(delimiter)
                .map(|cell| cell.trim().trim_matches('"').trim());
            let label = cells.next().filter(|l| !l.is_empty())?;
            let value = cells.find_map(|cell| {
                cell.trim_end_matches('%')
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
            })?;
            Some(DataPoint::new(label, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn csv_skips_headers_and_blank_rows() {
        let rows = parse_table("caste,share\nWorkers,80\n\n\"Soldiers\", 15%\nQueens,n/a\n");
        assert_eq!(
            rows,
            vec![DataPoint::new("Workers", 80.0), DataPoint::new("Soldiers", 15.0)]
        );
    }

    #[test]
    fn json_rows_and_garbage() {
        let rows = parse_table(r#"[{"label": "Egg", "value": 3}, {"label": "Larva", "value": 5}]"#);
        assert_eq!(rows.len(), 2);
        assert!(parse_table("{ not json").is_empty());
        assert!(parse_table("").is_empty());
    }

    #[tokio::test]
    async fn fetches_csv_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/castes.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Workers,80\nSoldiers,15\n"))
            .mount(&server)
            .await;

        let source = HttpTabularSource::new(5).unwrap().allow_private();
        let rows = source.fetch(&format!("{}/castes.csv", server.uri())).await;
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn http_errors_degrade_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let source = HttpTabularSource::new(5).unwrap().allow_private();
        assert!(source.fetch(&server.uri()).await.is_empty());
        assert!(source.fetch("not a url").await.is_empty());
    }

    #[tokio::test]
    async fn refuses_private_data_urls() {
        let source = HttpTabularSource::new(5).unwrap();
        for url in [
            "http://127.0.0.1/castes.csv",
            "http://169.254.169.254/latest/meta-data/",
            "file:///etc/passwd",
        ] {
            let refused = source.fetch_body(url).await;
            assert!(
                matches!(refused, Err(BriefwrightError::Validation { .. })),
                "{url}: {refused:?}"
            );
            assert!(source.fetch(url).await.is_empty());
        }
    }
}
