//! Free-text summaries: documents, meeting notes and ad hoc questions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::{complete_with, CallOptions, CompletionProvider, CompletionRequest, TokenUsage};
use crate::ReportError;

/// Summaries are prose, so they get a smaller completion budget than reports.
const SUMMARY_MAX_TOKENS: u32 = 4096;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SummaryKind {
    Document,
    Meeting,
    Report,
    #[default]
    General,
}

impl SummaryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Meeting => "meeting",
            Self::Report => "report",
            Self::General => "general",
        }
    }

    fn system_prompt(self) -> &'static str {
        match self {
            Self::Document => {
                "You are a document summarization assistant for a family office platform. \
Summarize legal, financial and estate planning documents: key points, important dates, parties \
involved and actionable items. Use clear sections and bullet points. Be precise with numbers, \
dates and legal terms."
            }
            Self::Meeting => {
                "You are a meeting notes assistant for a family office platform. Organize raw \
notes into a professional format with the sections Summary, Key Points, Action Items and Next \
Steps. Each action item must be specific and actionable."
            }
            Self::Report => {
                "You are a report writing assistant for a family office platform. Write a \
quarterly family office report covering net worth, asset allocation changes, upcoming \
deadlines, recent advisor meetings and recommended actions, in a formal but accessible tone."
            }
            Self::General => {
                "You are a helpful assistant for a family office platform. Give clear, \
professional answers appropriate for high-net-worth families."
            }
        }
    }

    fn user_prompt(self, text: &str) -> String {
        match self {
            Self::Document => format!("Please summarize the following document:\n\n{text}"),
            Self::Meeting => format!("Please clean up and organize these meeting notes:\n\n{text}"),
            Self::Report => format!("Generate a quarterly report based on the following data:\n\n{text}"),
            Self::General => text.to_string(),
        }
    }
}

impl fmt::Display for SummaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SummaryKind {
    type Err = String;

    /// Unknown names fall back to `general`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "document" => Self::Document,
            "meeting" => Self::Meeting,
            "report" => Self::Report,
            _ => Self::General,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub kind: SummaryKind,
    pub text: String,
    pub usage: TokenUsage,
}

pub async fn summarize(
    provider: &dyn CompletionProvider,
    kind: SummaryKind,
    text: &str,
    options: &CallOptions,
) -> Result<Summary, ReportError> {
    if text.trim().is_empty() {
        return Err(ReportError::EmptyInput);
    }
    let request = CompletionRequest {
        model: options.model.clone(),
        system: kind.system_prompt().to_string(),
        prompt: kind.user_prompt(text),
        max_tokens: options.max_tokens.min(SUMMARY_MAX_TOKENS),
    };
    tracing::debug!(kind = %kind, input_chars = text.len(), "requesting summary");
    let completion = complete_with(provider, &request, options).await?;
    Ok(Summary {
        kind,
        text: completion.text,
        usage: completion.usage,
    })
}
