use serde::Deserialize;

#[derive(Deserialize)]
pub struct UploadQuery {
    pub path: Option<String>,
}

#[derive(Deserialize)]
pub struct InspectQuery {
    pub file: Option<String>,
    pub dir: Option<String>,
}

/// Metadata of a received file part, dumped verbatim in failure reports.
#[derive(Debug)]
pub struct UploadMeta {
    pub field: String,
    pub file_name: String,
    pub size: usize,
}
