//! AI coaching feedback with a graceful fallback.

use hoopform_core::analysis::{AiAnalysis, AiAnalysisRequest};

use crate::api::AnalysisApi;

/// Feedback plus whether it came from the analysis service.
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub analysis: AiAnalysis,
    /// Error text when the placeholder was substituted.
    pub degraded: Option<String>,
}

impl Feedback {
    pub fn is_fallback(&self) -> bool {
        self.degraded.is_some()
    }
}

/// Request AI analysis, substituting [`AiAnalysis::unavailable`] when the
/// service call fails for any reason.
pub async fn analyze_or_fallback(api: &AnalysisApi, request: &AiAnalysisRequest) -> Feedback {
    match api.analyze(request).await {
        Ok(analysis) => Feedback {
            analysis,
            degraded: None,
        },
        Err(e) => {
            tracing::warn!(
                training_type = %request.training_type,
                error = %e,
                "AI analysis failed, using placeholder",
            );
            Feedback {
                analysis: AiAnalysis::unavailable(),
                degraded: Some(e.to_string()),
            }
        }
    }
}
