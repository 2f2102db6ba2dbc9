//! Report data model: the strict `AnalysisResult` contract plus the fixed
//! council roster and evaluation axes it is checked against.

use serde::{Deserialize, Serialize};

/// A persona on the council. The roster is fixed and ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CouncilMember {
    pub name: &'static str,
    pub title: &'static str,
    pub icon: &'static str,
    /// Viewpoint the member comments from, used in the prompt example
    pub focus: &'static str,
}

pub const COUNCIL_SIZE: usize = 11;

/// Canonical council order. Model output must list comments in this order.
pub const COUNCIL_ROSTER: [CouncilMember; COUNCIL_SIZE] = [
    CouncilMember {
        name: "オリジン君",
        title: "本質の探求者",
        icon: "👑",
        focus: "本質を探求する視点",
    },
    CouncilMember {
        name: "インサイト君",
        title: "直感の先駆者",
        icon: "💡",
        focus: "直感的な洞察",
    },
    CouncilMember {
        name: "ストラテジスト君",
        title: "論理の設計者",
        icon: "⚪",
        focus: "論理的・戦略的視点",
    },
    CouncilMember {
        name: "サポーター君",
        title: "チームの支援者",
        icon: "💎",
        focus: "協調性や支援の視点",
    },
    CouncilMember {
        name: "リスクチェッカー君",
        title: "厳格な監査役",
        icon: "⚫",
        focus: "リスク管理の視点",
    },
    CouncilMember {
        name: "バランサー君",
        title: "最適化の調停者",
        icon: "🟢",
        focus: "全体最適の視点",
    },
    CouncilMember {
        name: "パフォーマー君",
        title: "情熱の伝道師",
        icon: "🟠",
        focus: "情熱と実行力の視点",
    },
    CouncilMember {
        name: "アナリスト君",
        title: "データの分析官",
        icon: "🟡",
        focus: "データ分析的視点",
    },
    CouncilMember {
        name: "インタープリター君",
        title: "意図の翻訳家",
        icon: "🌙",
        focus: "意図を読み解く視点",
    },
    CouncilMember {
        name: "リアリスト君",
        title: "現実の実行官",
        icon: "🪨",
        focus: "現実的・実践的視点",
    },
    CouncilMember {
        name: "クエスチョナー君",
        title: "常識への挑戦者",
        icon: "🌀",
        focus: "常識に挑戦する視点",
    },
];

/// Icon used for a council comment whose name is not on the roster.
pub const UNKNOWN_MEMBER_ICON: &str = "🗣";

pub fn find_member(name: &str) -> Option<&'static CouncilMember> {
    COUNCIL_ROSTER.iter().find(|m| m.name == name)
}

/// The four evaluation dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Mvi,
    Csi,
    Res,
    Arc,
}

impl Axis {
    pub const ALL: [Axis; 4] = [Axis::Mvi, Axis::Csi, Axis::Res, Axis::Arc];

    /// JSON key used in `axes` and `axesComments`
    pub fn key(self) -> &'static str {
        match self {
            Axis::Mvi => "mvi",
            Axis::Csi => "csi",
            Axis::Res => "res",
            Axis::Arc => "arc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Axis::Mvi => "MVI",
            Axis::Csi => "CSI",
            Axis::Res => "RES",
            Axis::Arc => "ARC",
        }
    }

    pub fn full_name(self) -> &'static str {
        match self {
            Axis::Mvi => "多角的視点知性",
            Axis::Csi => "コンセプト統合度",
            Axis::Res => "訴求力・共鳴力",
            Axis::Arc => "論理構成度",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Axis::Mvi => "🧠",
            Axis::Csi => "🧬",
            Axis::Res => "🌟",
            Axis::Arc => "❄️",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Axis::Mvi => "多角的な視点から本質を捉え、発展を促す力",
            Axis::Csi => "理念から具体策までが一貫し、統合されているか",
            Axis::Res => "言葉やアウトプットが、他者や市場と響き合う力",
            Axis::Arc => "表現の明快さ、論理の一貫性、構造の完成度",
        }
    }

    /// Scoring criterion shown in the report's criteria section
    pub fn criterion(self) -> &'static str {
        match self {
            Axis::Mvi => "多角的で奥行きある視点を持ち、構造的に掘り下げられているか",
            Axis::Csi => "抽象から具体までが一貫し、独自のコンセプトが流れているか",
            Axis::Res => "言語表現が感情や直感を刺激し、人や場と共鳴できるか",
            Axis::Arc => "説明が整理され、論理が自然に流れているか",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisScores {
    pub mvi: u8,
    pub csi: u8,
    pub res: u8,
    pub arc: u8,
}

impl AxisScores {
    pub fn get(&self, axis: Axis) -> u8 {
        match axis {
            Axis::Mvi => self.mvi,
            Axis::Csi => self.csi,
            Axis::Res => self.res,
            Axis::Arc => self.arc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisComment {
    pub evaluation_comment: String,
    pub improvement_comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxesComments {
    pub mvi: AxisComment,
    pub csi: AxisComment,
    pub res: AxisComment,
    pub arc: AxisComment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouncilComment {
    pub name: String,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcludingInsight {
    pub insight_name: String,
    /// Comma-separated keywords
    pub keywords: String,
    pub comment: String,
    pub question: String,
}

impl ConcludingInsight {
    pub fn keyword_list(&self) -> Vec<&str> {
        split_keywords(&self.keywords)
    }
}

pub(crate) fn split_keywords(keywords: &str) -> Vec<&str> {
    keywords
        .split([',', '、', '，'])
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .collect()
}

/// Body of `POST /api/evaluate`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRequest {
    #[serde(default)]
    pub input_text: String,
}

/// The full council report as produced by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub overall_score: u8,
    pub axes: AxisScores,
    pub axes_comments: AxesComments,
    pub council_comments: Vec<CouncilComment>,
    pub concluding_insight: ConcludingInsight,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_sennin_comment: Option<String>,
}
