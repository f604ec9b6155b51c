use std::time::Duration;

use serde_json::Value;

use super::types::VocabularyLookup;
use super::VocabularyError;

/// Exact-match descriptor lookup against the NLM MeSH RDF API.
pub struct MeshClient {
    base_url: String,
    client: reqwest::Client,
}

impl MeshClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, VocabularyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| VocabularyError::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

impl VocabularyLookup for MeshClient {
    async fn is_descriptor(&self, term: &str) -> Result<bool, VocabularyError> {
        let url = format!("{}/lookup/descriptor", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("label", term), ("match", "exact"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| VocabularyError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(VocabularyError::Status(response.status().as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| VocabularyError::Parse(e.to_string()))?;

        match body {
            Value::Array(matches) => Ok(!matches.is_empty()),
            other => Err(VocabularyError::Parse(format!(
                "expected an array, got {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Server};
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn non_empty_array_means_valid() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/lookup/descriptor")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("label".into(), "Bronchial Spasm".into()),
                Matcher::UrlEncoded("match".into(), "exact".into()),
            ]))
            .with_status(200)
            .with_body(
                json!([{"resource": "http://id.nlm.nih.gov/mesh/D001986", "label": "Bronchial Spasm"}])
                    .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let client = MeshClient::new(&server.url(), 5).unwrap();
        assert!(client.is_descriptor("Bronchial Spasm").await.unwrap());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn empty_array_means_invalid() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/lookup/descriptor")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = MeshClient::new(&server.url(), 5).unwrap();
        assert!(!client.is_descriptor("Made Up Term").await.unwrap());
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/lookup/descriptor")
            .match_query(Matcher::Any)
            .with_status(502)
            .create_async()
            .await;

        let client = MeshClient::new(&server.url(), 5).unwrap();
        assert!(matches!(
            client.is_descriptor("Asthma").await,
            Err(VocabularyError::Status(502))
        ));
    }
}
