/// Column layout and output names of the bank marketing dataset.
///
/// Everything here has a sensible default; callers override fields with
/// struct-update syntax when a dataset deviates.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Columns that must be present after loading.
    pub required_columns: Vec<String>,
    /// Numeric column filtered by an inclusive range.
    pub range_column: String,
    /// Categorical filter columns, in the order they are applied.
    pub categorical_columns: Vec<String>,
    /// Column whose proportions are summarized.
    pub target_column: String,
    /// Field separator of uploaded delimited text.
    pub input_delimiter: u8,
    /// Field separator of exported delimited text.
    pub export_delimiter: u8,
    /// Rows shown in table previews.
    pub preview_rows: usize,
    pub raw_download_name: String,
    pub filtered_download_name: String,
}

const REQUIRED: [&str; 10] = [
    "age",
    "job",
    "marital",
    "default",
    "housing",
    "loan",
    "contact",
    "month",
    "day_of_week",
    "y",
];

const CATEGORICAL: [&str; 8] = [
    "job",
    "marital",
    "default",
    "housing",
    "loan",
    "contact",
    "month",
    "day_of_week",
];

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            required_columns: REQUIRED.iter().map(|c| c.to_string()).collect(),
            range_column: "age".to_string(),
            categorical_columns: CATEGORICAL.iter().map(|c| c.to_string()).collect(),
            target_column: "y".to_string(),
            input_delimiter: b';',
            export_delimiter: b',',
            preview_rows: 50,
            raw_download_name: "bank_raw_y.xlsx".to_string(),
            filtered_download_name: "bank_y.xlsx".to_string(),
        }
    }
}
