//! Normalization of PubMed `efetch` XML into `PaperRecord`s.

use std::sync::LazyLock;

use regex::Regex;
use roxmltree::{Document, Node, ParsingOptions};

use super::SourceError;
use crate::models::{PaperRecord, UNKNOWN_YEAR};

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}").unwrap());

/// Parse an efetch document. Articles without a PMID or title are skipped.
pub fn parse_articles(xml: &str) -> Result<Vec<PaperRecord>, SourceError> {
    // efetch output carries a DOCTYPE declaration.
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(xml, options)
        .map_err(|e| SourceError::Parse(e.to_string()))?;

    let records = doc
        .descendants()
        .filter(|n| is_tag(n, "PubmedArticle"))
        .filter_map(|article| {
            let record = read_article(article);
            if record.is_none() {
                tracing::debug!("Skipping article without PMID or title");
            }
            record
        })
        .collect();

    Ok(records)
}

fn read_article(article: Node) -> Option<PaperRecord> {
    let pmid = first_text(article, "PMID")?;
    let title = first_text(article, "ArticleTitle")?;

    let abstract_text = article
        .descendants()
        .filter(|n| is_tag(n, "AbstractText"))
        .map(|n| text_content(n))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let journal = article
        .descendants()
        .find(|n| is_tag(n, "Journal"))
        .and_then(|j| child(j, "Title"))
        .map(text_content)
        .unwrap_or_default();

    let doi = article
        .descendants()
        .filter(|n| is_tag(n, "ArticleId"))
        .find(|n| n.attribute("IdType") == Some("doi"))
        .map(text_content)
        .filter(|d| !d.is_empty());

    let url = PaperRecord::pubmed_url(&pmid);
    Some(PaperRecord {
        year: publication_year(article),
        pmid,
        title,
        abstract_text,
        journal,
        doi,
        url,
    })
}

/// `PubDate/Year`, else the first four-digit run of `PubDate/MedlineDate`.
fn publication_year(article: Node) -> String {
    let Some(pub_date) = article.descendants().find(|n| is_tag(n, "PubDate")) else {
        return UNKNOWN_YEAR.to_string();
    };

    if let Some(year) = child(pub_date, "Year").map(text_content) {
        if !year.is_empty() {
            return year;
        }
    }

    child(pub_date, "MedlineDate")
        .map(text_content)
        .and_then(|d| YEAR_RE.find(&d).map(|m| m.as_str().to_string()))
        .unwrap_or_else(|| UNKNOWN_YEAR.to_string())
}

fn is_tag(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| is_tag(n, name))
}

fn first_text(node: Node, name: &str) -> Option<String> {
    node.descendants()
        .find(|n| is_tag(n, name))
        .map(text_content)
        .filter(|t| !t.is_empty())
}

/// Concatenated text of a node, including inline markup such as `<i>`.
fn text_content(node: Node) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_string()
}
