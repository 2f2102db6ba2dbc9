//! Rendering of council reports.
//!
//! Rendering always goes through [`ReportView`], a forgiving projection of the
//! raw model output: whatever is missing or malformed shows up as a
//! placeholder instead of failing the page.

pub mod html;
pub mod session;
pub mod text;

use serde::Deserialize;
use serde_json::Value;

use crate::deserializers::{
    de_option_forgiving, de_option_score_forgiving, de_option_string_forgiving, de_vec_forgiving,
};
use crate::schemas::{Axis, UNKNOWN_MEMBER_ICON, find_member, split_keywords};

pub use session::{ReportSession, SessionError};

pub const NO_EVALUATION_COMMENT: &str = "（評価コメントなし）";
pub const NO_IMPROVEMENT_COMMENT: &str = "（改善ヒントなし）";
pub const MISSING: &str = "—";

/// Caption shown under the overall score
pub fn score_caption(score: u8) -> &'static str {
    match score {
        90.. => "🌟 圧巻の完成度！",
        80..=89 => "✨ すばらしい完成度です！",
        70..=79 => "👍 良い仕上がりです",
        _ => "🔍 まだ伸びしろがあります",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AxesView {
    #[serde(default, deserialize_with = "de_option_score_forgiving")]
    pub mvi: Option<u8>,
    #[serde(default, deserialize_with = "de_option_score_forgiving")]
    pub csi: Option<u8>,
    #[serde(default, deserialize_with = "de_option_score_forgiving")]
    pub res: Option<u8>,
    #[serde(default, deserialize_with = "de_option_score_forgiving")]
    pub arc: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisCommentView {
    #[serde(default, deserialize_with = "de_option_string_forgiving")]
    pub evaluation_comment: Option<String>,
    #[serde(default, deserialize_with = "de_option_string_forgiving")]
    pub improvement_comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AxesCommentsView {
    #[serde(default, deserialize_with = "de_option_forgiving")]
    pub mvi: Option<AxisCommentView>,
    #[serde(default, deserialize_with = "de_option_forgiving")]
    pub csi: Option<AxisCommentView>,
    #[serde(default, deserialize_with = "de_option_forgiving")]
    pub res: Option<AxisCommentView>,
    #[serde(default, deserialize_with = "de_option_forgiving")]
    pub arc: Option<AxisCommentView>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CouncilCommentView {
    #[serde(default, deserialize_with = "de_option_string_forgiving")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de_option_string_forgiving")]
    pub comment: Option<String>,
}

impl CouncilCommentView {
    pub fn icon(&self) -> &'static str {
        self.name
            .as_deref()
            .and_then(find_member)
            .map(|m| m.icon)
            .unwrap_or(UNKNOWN_MEMBER_ICON)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightView {
    #[serde(default, deserialize_with = "de_option_string_forgiving")]
    pub insight_name: Option<String>,
    #[serde(default, deserialize_with = "de_option_string_forgiving")]
    pub keywords: Option<String>,
    #[serde(default, deserialize_with = "de_option_string_forgiving")]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "de_option_string_forgiving")]
    pub question: Option<String>,
}

impl InsightView {
    pub fn keyword_list(&self) -> Vec<&str> {
        self.keywords.as_deref().map(split_keywords).unwrap_or_default()
    }
}

/// Display model for one report
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    #[serde(default, deserialize_with = "de_option_score_forgiving")]
    pub overall_score: Option<u8>,
    #[serde(default, deserialize_with = "de_option_forgiving")]
    pub axes: Option<AxesView>,
    #[serde(default, deserialize_with = "de_option_forgiving")]
    pub axes_comments: Option<AxesCommentsView>,
    #[serde(default, deserialize_with = "de_vec_forgiving")]
    pub council_comments: Vec<CouncilCommentView>,
    #[serde(default, deserialize_with = "de_option_forgiving")]
    pub concluding_insight: Option<InsightView>,
    #[serde(default, deserialize_with = "de_option_string_forgiving")]
    pub home_sennin_comment: Option<String>,
}

impl ReportView {
    /// Project raw model output; a non-object yields an empty view.
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }

    pub fn axis_score(&self, axis: Axis) -> Option<u8> {
        let axes = self.axes.as_ref()?;
        match axis {
            Axis::Mvi => axes.mvi,
            Axis::Csi => axes.csi,
            Axis::Res => axes.res,
            Axis::Arc => axes.arc,
        }
    }

    pub fn axis_comment(&self, axis: Axis) -> Option<&AxisCommentView> {
        let comments = self.axes_comments.as_ref()?;
        match axis {
            Axis::Mvi => comments.mvi.as_ref(),
            Axis::Csi => comments.csi.as_ref(),
            Axis::Res => comments.res.as_ref(),
            Axis::Arc => comments.arc.as_ref(),
        }
    }

    /// Evaluation and improvement text for an axis, with placeholders
    pub fn axis_texts(&self, axis: Axis) -> (&str, &str) {
        let comment = self.axis_comment(axis);
        (
            comment
                .and_then(|c| c.evaluation_comment.as_deref())
                .unwrap_or(NO_EVALUATION_COMMENT),
            comment
                .and_then(|c| c.improvement_comment.as_deref())
                .unwrap_or(NO_IMPROVEMENT_COMMENT),
        )
    }
}
