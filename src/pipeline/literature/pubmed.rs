use std::collections::HashSet;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use super::efetch::parse_articles;
use super::types::LiteratureSource;
use super::SourceError;
use crate::config::PubMedSettings;
use crate::models::PaperRecord;

/// Seeds beyond this are ignored by link expansion (request length bound).
pub const MAX_LINK_SEEDS: usize = 5;

/// NCBI E-utilities client for the PubMed database.
pub struct PubMedClient {
    base_url: String,
    tool: String,
    email: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl PubMedClient {
    pub fn new(settings: &PubMedSettings, timeout_secs: u64) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SourceError::Http(e.to_string()))?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            tool: settings.tool.clone(),
            email: settings.email.clone(),
            api_key: settings.api_key.clone(),
            client,
        })
    }

    /// Caller identification sent with every request.
    fn identity(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("tool", self.tool.clone()), ("email", self.email.clone())];
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }
        params
    }

    async fn get(&self, endpoint: &str, params: &[(&str, String)]) -> Result<String, SourceError> {
        let url = format!("{}/{endpoint}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&self.identity())
            .send()
            .await
            .map_err(|e| SourceError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::Http(e.to_string()))
    }

    async fn esearch(&self, query: &str, retmax: usize) -> Result<ESearchResult, SourceError> {
        let params = [
            ("db", "pubmed".to_string()),
            ("term", query.to_string()),
            ("retmax", retmax.to_string()),
            ("retmode", "json".to_string()),
            ("sort", "relevance".to_string()),
        ];
        let body = self.get("esearch.fcgi", &params).await?;
        let parsed: ESearchResponse =
            serde_json::from_str(&body).map_err(|e| SourceError::Parse(e.to_string()))?;
        parsed
            .esearchresult
            .ok_or_else(|| SourceError::Parse("missing esearchresult".into()))
    }

    async fn elink(&self, seeds: &[String], per_seed_limit: usize) -> Result<Vec<String>, SourceError> {
        let mut params = vec![
            ("dbfrom", "pubmed".to_string()),
            ("db", "pubmed".to_string()),
            ("linkname", "pubmed_pubmed".to_string()),
            ("cmd", "neighbor_score".to_string()),
            ("retmode", "json".to_string()),
        ];
        // Repeated `id` parameters yield one linkset per seed.
        params.extend(seeds.iter().map(|id| ("id", id.clone())));

        let body = self.get("elink.fcgi", &params).await?;
        let parsed: ELinkResponse =
            serde_json::from_str(&body).map_err(|e| SourceError::Parse(e.to_string()))?;
        Ok(collect_neighbors(parsed, seeds, per_seed_limit))
    }
}

// ═══════════════════════════════════════════════════════════
// Wire types
// ═══════════════════════════════════════════════════════════

#[derive(Deserialize)]
struct ESearchResponse {
    esearchresult: Option<ESearchResult>,
}

#[derive(Deserialize)]
struct ESearchResult {
    #[serde(default)]
    idlist: Vec<String>,
    /// Returned as a string by the service.
    count: Option<Value>,
}

impl ESearchResult {
    fn total(&self) -> Option<u64> {
        match self.count.as_ref()? {
            Value::String(s) => s.trim().parse().ok(),
            Value::Number(n) => n.as_u64(),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct ELinkResponse {
    #[serde(default)]
    linksets: Vec<LinkSet>,
}

#[derive(Deserialize)]
struct LinkSet {
    #[serde(default)]
    linksetdbs: Vec<LinkSetDb>,
}

#[derive(Deserialize)]
struct LinkSetDb {
    #[serde(default)]
    linkname: String,
    /// Either `{"id": "..", "score": ..}` objects or bare id strings.
    #[serde(default)]
    links: Vec<Value>,
}

fn link_id(link: &Value) -> Option<String> {
    match link {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get("id").and_then(link_id),
        _ => None,
    }
}

/// Union of per-seed neighbors in first-seen order, excluding the seeds.
fn collect_neighbors(response: ELinkResponse, seeds: &[String], per_seed_limit: usize) -> Vec<String> {
    let mut seen: HashSet<String> = seeds.iter().cloned().collect();
    let mut neighbors = Vec::new();

    for linkset in response.linksets {
        for db in linkset.linksetdbs {
            if db.linkname != "pubmed_pubmed" {
                continue;
            }
            for id in db.links.iter().take(per_seed_limit).filter_map(link_id) {
                if seen.insert(id.clone()) {
                    neighbors.push(id);
                }
            }
        }
    }

    neighbors
}

// ═══════════════════════════════════════════════════════════
// LiteratureSource
// ═══════════════════════════════════════════════════════════

impl LiteratureSource for PubMedClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>, SourceError> {
        let result = self.esearch(query, limit).await?;
        tracing::debug!(hits = result.idlist.len(), "PubMed search returned");
        Ok(result.idlist)
    }

    async fn expand_by_network(&self, seeds: &[String], per_seed_limit: usize) -> Vec<String> {
        let seeds = &seeds[..seeds.len().min(MAX_LINK_SEEDS)];
        if seeds.is_empty() {
            return Vec::new();
        }

        match self.elink(seeds, per_seed_limit).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(error = %e, "Citation-network expansion failed");
                Vec::new()
            }
        }
    }

    async fn fetch_details(&self, ids: &[String]) -> Result<Vec<PaperRecord>, SourceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let params = [
            ("db", "pubmed".to_string()),
            ("id", ids.join(",")),
            ("retmode", "xml".to_string()),
        ];
        let body = self.get("efetch.fcgi", &params).await?;
        parse_articles(&body)
    }

    async fn count(&self, query: &str) -> u64 {
        match self.esearch(query, 0).await {
            Ok(result) => result.total().unwrap_or(0),
            Err(e) => {
                tracing::warn!(error = %e, "PubMed count failed, treating as zero");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Server};
    use serde_json::json;

    use super::*;

    fn settings(base_url: &str) -> PubMedSettings {
        PubMedSettings {
            base_url: base_url.to_string(),
            tool: "CaseReport-CATTO".into(),
            email: "author@hospital.jp".into(),
            api_key: None,
        }
    }

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn search_sends_identity_and_returns_idlist() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/esearch.fcgi")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("term".into(), "\"asthma\"[mh]".into()),
                Matcher::UrlEncoded("retmax".into(), "100".into()),
                Matcher::UrlEncoded("sort".into(), "relevance".into()),
                Matcher::UrlEncoded("tool".into(), "CaseReport-CATTO".into()),
                Matcher::UrlEncoded("email".into(), "author@hospital.jp".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"esearchresult": {"count": "2", "idlist": ["11", "22"]}}).to_string())
            .expect(1)
            .create_async()
            .await;

        let client = PubMedClient::new(&settings(&server.url()), 5).unwrap();
        let found = client.search("\"asthma\"[mh]", 100).await.unwrap();

        assert_eq!(found, ids(&["11", "22"]));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn search_failure_is_an_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/esearch.fcgi")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let client = PubMedClient::new(&settings(&server.url()), 5).unwrap();
        assert!(matches!(
            client.search("x", 10).await,
            Err(SourceError::Status { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn count_reads_string_total_and_swallows_errors() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/esearch.fcgi")
            .match_query(Matcher::UrlEncoded("term".into(), "ok".into()))
            .with_status(200)
            .with_body(json!({"esearchresult": {"count": "412", "idlist": []}}).to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/esearch.fcgi")
            .match_query(Matcher::UrlEncoded("term".into(), "broken".into()))
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = PubMedClient::new(&settings(&server.url()), 5).unwrap();
        assert_eq!(client.count("ok").await, 412);
        assert_eq!(client.count("broken").await, 0);
    }

    #[tokio::test]
    async fn expansion_unions_neighbors_and_excludes_seeds() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/elink.fcgi")
            .match_query(Matcher::UrlEncoded("cmd".into(), "neighbor_score".into()))
            .with_status(200)
            .with_body(
                json!({
                    "linksets": [
                        {"ids": ["1"], "linksetdbs": [{
                            "linkname": "pubmed_pubmed",
                            "links": [{"id": "1", "score": 99}, {"id": "7"}, {"id": "8"}]
                        }]},
                        {"ids": ["2"], "linksetdbs": [
                            {"linkname": "pubmed_pubmed_reviews", "links": ["50"]},
                            {"linkname": "pubmed_pubmed", "links": ["8", "9", "10"]}
                        ]}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = PubMedClient::new(&settings(&server.url()), 5).unwrap();
        let neighbors = client.expand_by_network(&ids(&["1", "2"]), 2).await;

        // per-seed limit 2: seed 1 contributes 7 (1 is a seed), seed 2 contributes 8 and 9
        assert_eq!(neighbors, ids(&["7", "8", "9"]));
    }

    #[tokio::test]
    async fn expansion_failure_degrades_to_empty() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/elink.fcgi")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let client = PubMedClient::new(&settings(&server.url()), 5).unwrap();
        assert!(client.expand_by_network(&ids(&["1"]), 10).await.is_empty());
    }

    #[tokio::test]
    async fn empty_inputs_issue_no_requests() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = PubMedClient::new(&settings(&server.url()), 5).unwrap();
        assert!(client.fetch_details(&[]).await.unwrap().is_empty());
        assert!(client.expand_by_network(&[], 10).await.is_empty());
        mock.assert_async().await;
    }

    #[test]
    fn neighbors_respect_per_seed_limit() {
        let response: ELinkResponse = serde_json::from_value(json!({
            "linksets": [{"linksetdbs": [{
                "linkname": "pubmed_pubmed",
                "links": ["3", "4", "5", "6"]
            }]}]
        }))
        .unwrap();
        assert_eq!(collect_neighbors(response, &ids(&["3"]), 3), ids(&["4", "5"]));
    }
}
