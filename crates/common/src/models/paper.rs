//! Publication records as returned by a metadata provider

use serde::{Deserialize, Serialize};

/// Bibliographic metadata for one publication
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationRecord {
    /// Provider-native identifier
    pub id: String,

    pub title: String,

    /// Display names, in author order
    #[serde(default)]
    pub authors: Vec<String>,

    pub year: Option<i32>,

    pub venue: Option<String>,

    /// Citation count reported by the provider (not the in-network degree)
    pub citation_count: Option<u64>,

    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
}

impl PublicationRecord {
    /// Create a record with only an id and a title
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            authors: Vec::new(),
            year: None,
            venue: None,
            citation_count: None,
            abstract_text: None,
        }
    }

    /// Author names joined for display
    pub fn author_line(&self) -> String {
        self.authors.join(", ")
    }
}

/// A fetched record together with its neighbor id lists
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedPaper {
    pub record: PublicationRecord,

    /// Ids of papers citing this one, in provider order
    #[serde(default)]
    pub citations: Vec<String>,

    /// Ids of papers this one cites, in provider order
    #[serde(default)]
    pub references: Vec<String>,
}

impl FetchedPaper {
    pub fn new(record: PublicationRecord) -> Self {
        Self {
            record,
            citations: Vec::new(),
            references: Vec::new(),
        }
    }

    pub fn cited_by<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.citations.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn citing<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.references.extend(ids.into_iter().map(Into::into));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_camel_case() {
        let mut record = PublicationRecord::new("abc", "Attention Is All You Need");
        record.citation_count = Some(100);
        record.abstract_text = Some("Transformers".into());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["citationCount"], 100);
        assert_eq!(json["abstract"], "Transformers");
    }

    #[test]
    fn test_author_line() {
        let mut record = PublicationRecord::new("abc", "Title");
        record.authors = vec!["Ada Lovelace".into(), "Alan Turing".into()];
        assert_eq!(record.author_line(), "Ada Lovelace, Alan Turing");
    }
}
