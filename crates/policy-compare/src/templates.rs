//! Instruction template sent as the summarizer preamble.
//!
//! The template is prose configuration for the hosted model, not business
//! logic. Bump [`INSTRUCTION_TEMPLATE_VERSION`] whenever the default text
//! changes so logged requests can be matched to the rules that produced them.

use std::path::Path;

use crate::error::ConfigError;

pub const INSTRUCTION_TEMPLATE_VERSION: &str = "2024-06-comparison-v3";

/// Text the model is told to write in cells with no supporting data. The
/// display cleanup pass reuses it for cells the model left blank anyway.
pub const NO_DATA_CELL: &str = "No relevant data found";

const DOCUMENT_COUNT_PLACEHOLDER: &str = "{document_count}";

const DEFAULT_TEMPLATE: &str = r#"# Role
You are an expert insurance broker who reads insurance product documents closely, with broad knowledge of insurance practice and the related legal terms, and gives professional advice in answer to user questions.
You have {document_count} documents at hand. Your task is a side-by-side comparison.

# Execution and conflict handling
- If the brand and product code can be matched in a [file name] (e.g. Farglory HO5, BankTaiwan 1U), ignore noise in the body text and produce the comparison table directly.
- Only when the brand is paired with the wrong code (e.g. TransGlobe HO5) output: "After checking, [code] belongs to [correct company], not [wrong company]. Do you want to search the correct combination?" and do not draw a table.

# Table rules (no blank cells)
- Always use a Markdown table. Keep cell contents concise.
- Fill rule: if a product document does not mention an item, write "No relevant data found".
- Never leave a cell blank: a cell must not contain only spaces, "-", or "null".
- No alignment: do not pad the Markdown with extra consecutive spaces.

# File correction and sources
- The file name is the truth: take the file name from 'link'. If the document says HO6 but the file name is HO5, correct it to HO5.
- Do not cite sources inside the table.
- End with a single "Reference documents" list naming every file consulted, with page numbers and matching codes.
- Format: * 【original file name】 (page N).
"#;

#[derive(Debug, Clone)]
pub struct InstructionTemplate {
    text: String,
    version: String,
}

impl Default for InstructionTemplate {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEMPLATE.to_string(),
            version: INSTRUCTION_TEMPLATE_VERSION.to_string(),
        }
    }
}

impl InstructionTemplate {
    pub fn custom(text: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            version: version.into(),
        }
    }

    /// Load a replacement template. The file stem becomes the version tag.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if text.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "INSTRUCTION_TEMPLATE_FILE",
                reason: format!("{} is empty", path.display()),
            });
        }
        let version = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "custom".to_string());
        Ok(Self::custom(text, version))
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Render the preamble, filling in the document count when it is known.
    pub fn render(&self, document_count: Option<usize>) -> String {
        let count = match document_count {
            Some(n) => n.to_string(),
            None => "several".to_string(),
        };
        self.text.replace(DOCUMENT_COUNT_PLACEHOLDER, &count)
    }
}
