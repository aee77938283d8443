//! Results handed to the chat and summary consumers

use serde::{Deserialize, Serialize};

use crate::analyzer::Stage;
use crate::error::Result;

/// A completed analysis: where the terms came from, their text and a summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    /// URL the content was taken from
    pub url: String,

    /// Extracted Terms of Service text
    pub content: String,

    /// Model-written summary (fixed text in demo mode)
    pub summary: String,

    /// Pipeline stage that produced the content; `None` in demo mode
    #[serde(skip)]
    pub stage: Option<Stage>,
}

/// Serializable outcome of `analyze`: `{success, data}` or `{success, error}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Analysis>,
}

impl From<Result<Analysis>> for AnalysisResult {
    fn from(result: Result<Analysis>) -> Self {
        match result {
            Ok(analysis) => Self {
                success: true,
                error: None,
                data: Some(analysis),
            },
            Err(e) => Self {
                success: false,
                error: Some(e.to_string()),
                data: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    #[test]
    fn test_success_shape() {
        let analysis = Analysis {
            url: "https://supabase.com/terms".to_string(),
            content: "Terms".to_string(),
            summary: "Summary".to_string(),
            stage: Some(Stage::KnownLinks),
        };
        let value = serde_json::to_value(AnalysisResult::from(Ok(analysis))).unwrap();
        assert_eq!(
            value,
            json!({
                "success": true,
                "data": {
                    "url": "https://supabase.com/terms",
                    "content": "Terms",
                    "summary": "Summary"
                }
            })
        );
    }

    #[test]
    fn test_failure_shape() {
        let result = AnalysisResult::from(Err(Error::InvalidUrl("https://a b".to_string())));
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({
                "success": false,
                "error": "Invalid URL: https://a b. Please enter a valid website address."
            })
        );
    }

    #[test]
    fn test_analysis_from_ui_payload() {
        let analysis: Analysis = serde_json::from_value(json!({
            "url": "https://example.com/terms",
            "content": "Terms",
            "summary": "Summary"
        }))
        .unwrap();
        assert_eq!(analysis.stage, None);
        assert_eq!(analysis.url, "https://example.com/terms");
    }
}
