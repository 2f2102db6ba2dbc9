//! Plain-text rendering for the terminal client.

use std::fmt::Write as _;

use crate::report::{MISSING, ReportView, score_caption};
use crate::schemas::{Axis, COUNCIL_SIZE};

pub fn render_text(view: &ReportView) -> String {
    let mut out = String::new();

    match view.overall_score {
        Some(score) => {
            let _ = writeln!(out, "🏆 総合スコア：{score} / 100 点");
            let _ = writeln!(out, "   {}", score_caption(score));
        }
        None => {
            let _ = writeln!(out, "🏆 総合スコア：{MISSING} / 100 点");
        }
    }

    let _ = writeln!(out, "\n== 四大評価軸 ==");
    for axis in Axis::ALL {
        let score = view
            .axis_score(axis)
            .map(|s| s.to_string())
            .unwrap_or_else(|| MISSING.to_string());
        let (evaluation, improvement) = view.axis_texts(axis);
        let _ = writeln!(
            out,
            "{} {} ({}): {}",
            axis.icon(),
            axis.label(),
            axis.full_name(),
            score
        );
        let _ = writeln!(out, "  {evaluation}");
        let _ = writeln!(out, "  🌱 改善ヒント：{improvement}");
    }

    let _ = writeln!(out, "\n== {COUNCIL_SIZE}人の人格コメント ==");
    for entry in &view.council_comments {
        let _ = writeln!(
            out,
            "{} {}",
            entry.icon(),
            entry.name.as_deref().unwrap_or(MISSING)
        );
        let _ = writeln!(out, "  {}", entry.comment.as_deref().unwrap_or(""));
    }

    if let Some(insight) = &view.concluding_insight {
        let _ = writeln!(out, "\n== 🔮 総合インサイト ==");
        let _ = writeln!(
            out,
            "「{}」",
            insight.insight_name.as_deref().unwrap_or(MISSING)
        );
        let keywords = insight.keyword_list();
        if !keywords.is_empty() {
            let tags: Vec<String> = keywords.iter().map(|k| format!("#{k}")).collect();
            let _ = writeln!(out, "{}", tags.join(" "));
        }
        if let Some(comment) = &insight.comment {
            let _ = writeln!(out, "{comment}");
        }
        if let Some(question) = &insight.question {
            let _ = writeln!(out, "🧭 次の問い：{question}");
        }
    }

    if let Some(sennin) = &view.home_sennin_comment {
        let _ = writeln!(out, "\n🧙‍♂️ ホメ仙人のことば\n{sennin}");
    }

    out
}
