use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimalRecord {
    pub job_id: String,
    pub generation: String,
    pub display_name: String,
    pub timestamp: String,
    pub source: String,
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnimalRecord {
    pub job_id: String,
    pub generation: String,
    pub display_name: String,
    pub timestamp: Option<String>,
    pub source: Option<String>,
}

// Repeated keys are kept in order so that `latest=true&latest=false`
// is not read as a set flag.
#[derive(Debug, Default)]
pub struct AnimalQuery {
    pairs: Vec<(String, String)>,
}

impl AnimalQuery {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    pub fn is_set(&self, key: &str) -> bool {
        let mut values = self.values(key);
        values.next() == Some("true") && values.next().is_none()
    }

    pub fn value(&self, key: &str) -> Option<String> {
        let values: Vec<&str> = self.values(key).collect();
        if values.is_empty() {
            None
        } else {
            Some(values.join(","))
        }
    }

    fn values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Serialize)]
pub struct StoreResponse {
    pub success: bool,
    pub message: &'static str,
    pub data: AnimalRecord,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestResponse {
    pub success: bool,
    pub data: Option<AnimalRecord>,
    pub has_data: bool,
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub data: Vec<AnimalRecord>,
    pub total: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResponse {
    pub success: bool,
    pub latest: Option<AnimalRecord>,
    pub history: Vec<AnimalRecord>,
    pub total_history: usize,
    pub has_data: bool,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum ReadResponse {
    Latest(LatestResponse),
    History(HistoryResponse),
    Overview(OverviewResponse),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_methods: Option<Vec<&'static str>>,
}
