//! Evaluation prompt template.
//!
//! The template is built once from the council roster and the axis list, so the
//! persona section and the literal JSON example can never drift from the
//! schema. The only variable part is the (sanitized) user text, which makes
//! prompt construction a pure function of its input.

use once_cell::sync::Lazy;
use std::fmt::Write as _;

use crate::schemas::{Axis, COUNCIL_ROSTER, COUNCIL_SIZE};

const INPUT_SLOT: &str = "{{input}}";

/// Minimum characters requested per council comment
pub const MIN_COMMENT_CHARS: usize = 100;

/// A versioned prompt template with a content checksum for log correlation
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// Stable identifier (format: category-name-vN)
    pub id: &'static str,
    pub version: &'static str,
    /// Git-style SHA1 checksum of the template text
    pub checksum: String,
    template: String,
}

impl PromptTemplate {
    fn new(id: &'static str, version: &'static str, template: String) -> Self {
        let checksum = sha1_checksum(&template);
        Self {
            id,
            version,
            checksum,
            template,
        }
    }

    /// Embed already-sanitized user text into the template.
    pub fn render(&self, sanitized_input: &str) -> String {
        self.template.replacen(INPUT_SLOT, sanitized_input, 1)
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

/// Generate a SHA1 checksum of prompt content
fn sha1_checksum(content: &str) -> String {
    use sha1::{Digest, Sha1};
    let mut hasher = Sha1::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

pub static EVALUATION_PROMPT: Lazy<PromptTemplate> =
    Lazy::new(|| PromptTemplate::new("council-evaluate-v1", "1.0.0", evaluation_template()));

/// Build the full instruction document for one evaluation.
pub fn build_prompt(sanitized_input: &str) -> String {
    EVALUATION_PROMPT.render(sanitized_input)
}

fn evaluation_template() -> String {
    let mut t = String::with_capacity(6 * 1024);

    t.push_str(
        "\n# 絶対遵守の命令：イラディエイトMPA評価システムの完全実行\n\n\
         あなたは、思考支援システム「イラディエイトMPA評価システム™」です。\n\
         あなたのタスクは、後述する【分析対象テキスト】に対し、以下の全ての要素を含む評価結果を、\
         指定された【JSON出力形式】で生成することです。これは絶対的な必須要件です。\n\n\
         ## 必須生成項目リスト\n\n\
         1.  **総合評価と四大評価軸のスコア**\n\
         \x20   - overallScore（0〜100点）\n",
    );
    let keys: Vec<&str> = Axis::ALL.iter().map(|a| a.key()).collect();
    let _ = writeln!(t, "    - axes に {} の各スコア（整数0〜100）\n", keys.join(", "));

    t.push_str(
        "2.  **四大評価軸のコメント**\n\
         \x20   - 各軸について以下2つを含む axesComments を生成すること：\n\
         \x20     - evaluationComment: 現在の状態の評価\n\
         \x20     - improvementComment: より良くするためのヒント\n\n",
    );

    let _ = writeln!(t, "3.  **{COUNCIL_SIZE}人全員の評議会コメント【★絶対必須★】**\n");
    let _ = writeln!(
        t,
        "    必ず以下の{COUNCIL_SIZE}人全員のコメントを生成してください。一人も欠けてはいけません：\n"
    );
    for (idx, member) in COUNCIL_ROSTER.iter().enumerate() {
        let _ = writeln!(t, "    {}. {}（{}）", idx + 1, member.name, member.title);
    }
    let _ = write!(
        t,
        "\n    各人格のコメント要件：\n\
         \x20   - **文字数:** 各コメントは最低{MIN_COMMENT_CHARS}文字以上\n\
         \x20   - **構成:** まず良い点や可能性を具体的に評価し、その後に改善点や深い問いを投げかける\n\
         \x20   - **口調:** 各人格の特性に合った語り口で\n\n"
    );

    t.push_str(
        "4.  **総括インサイト**\n\
         \x20   - insightName: 核心を象徴するインサイト名\n\
         \x20   - keywords: 特徴を表すキーワード（カンマ区切り）\n\
         \x20   - comment: 分析全体を要約するコメント\n\
         \x20   - question: ユーザーの内省を促す問い\n\n\
         5.  **ホメ仙人のユニークなことば**\n\
         \x20   - homeSenninComment: 詩的で温かみのある承認の言葉\n\n\
         ## 分析対象テキスト\n---\n",
    );
    t.push_str(INPUT_SLOT);
    t.push_str("\n---\n\n## JSON出力形式（この構造を厳守すること）\n");
    t.push_str(&json_example());
    let _ = write!(
        t,
        "\n\n【重要】councilCommentsは必ず{COUNCIL_SIZE}人全員分を含めてください。順番も上記の通りにしてください。"
    );
    t
}

/// Literal shape of the expected answer, with prose in place of values.
fn json_example() -> String {
    let mut s = String::from("{\n  \"overallScore\": 総合スコア（0-100の整数）,\n  \"axes\": {\n");
    let last = Axis::ALL.len() - 1;
    for (i, axis) in Axis::ALL.iter().enumerate() {
        let sep = if i == last { "" } else { "," };
        let _ = writeln!(
            s,
            "    \"{}\": {}スコア（0-100の整数）{}",
            axis.key(),
            axis.label(),
            sep
        );
    }
    s.push_str("  },\n  \"axesComments\": {\n");
    for (i, axis) in Axis::ALL.iter().enumerate() {
        let sep = if i == last { "" } else { "," };
        let _ = writeln!(
            s,
            "    \"{}\": {{\n      \"evaluationComment\": \"評価コメント\",\n      \"improvementComment\": \"改善ヒント\"\n    }}{}",
            axis.key(),
            sep
        );
    }
    s.push_str("  },\n  \"councilComments\": [\n");
    for (i, member) in COUNCIL_ROSTER.iter().enumerate() {
        let sep = if i == COUNCIL_SIZE - 1 { "" } else { "," };
        let _ = writeln!(
            s,
            "    {{ \"name\": \"{}\", \"comment\": \"{}からのコメント（{}文字以上）\" }}{}",
            member.name, member.focus, MIN_COMMENT_CHARS, sep
        );
    }
    s.push_str(
        "  ],\n  \"concludingInsight\": {\n\
         \x20   \"insightName\": \"洞察の名前\",\n\
         \x20   \"keywords\": \"キーワード1, キーワード2, キーワード3\",\n\
         \x20   \"comment\": \"総括的な洞察コメント\",\n\
         \x20   \"question\": \"内省を促す問い\"\n\
         \x20 },\n  \"homeSenninComment\": \"詩的で温かみのある承認の言葉\"\n}",
    );
    s
}
