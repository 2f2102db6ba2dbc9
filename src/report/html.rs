//! Server-rendered pages: input form, report, login.

use std::fmt::Write as _;

use crate::report::{MISSING, ReportView, score_caption};
use crate::schemas::{Axis, COUNCIL_ROSTER, COUNCIL_SIZE};

pub const TITLE: &str = "イラディエイト評価システム™";

const STYLE: &str = "body{font-family:sans-serif;background:#0f172a;color:#e5e7eb;margin:0}\
main{max-width:56rem;margin:0 auto;padding:2rem 1rem}\
h1,h2,h3{color:#5eead4}\
.card{background:#1e293b;border:1px solid #334155;border-radius:1rem;padding:1rem;margin:.75rem 0}\
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(12rem,1fr));gap:.75rem}\
.error{background:#7f1d1d;border:1px solid #ef4444;border-radius:.5rem;padding:.75rem}\
.hint{color:#93c5fd;font-style:italic}\
.pre{white-space:pre-line}\
textarea{width:100%;height:20rem;background:#020617;color:#fff;border-radius:1rem;padding:1rem}\
button,.button{background:#14b8a6;color:#fff;border:0;border-radius:9999px;padding:.75rem 2rem;font-weight:bold;text-decoration:none}\
button:disabled{opacity:.5}\
footer{text-align:center;color:#6b7280;margin-top:4rem}";

pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"ja\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<style>{}</style>\n</head>\n<body>\n<main>\n{}\n\
         <footer>&copy; {}</footer>\n</main>\n</body>\n</html>\n",
        escape(title),
        STYLE,
        body,
        TITLE
    )
}

fn header(out: &mut String) {
    let _ = writeln!(
        out,
        "<header><h1>{TITLE}</h1><p>あなたの内部を可視化する</p></header>"
    );
}

/// Landing page: axis and council introduction plus the input form.
pub fn render_form(input: &str, error: Option<&str>, max_chars: usize) -> String {
    let mut b = String::new();
    header(&mut b);

    b.push_str("<section><h2>コアなる四軸評価</h2><div class=\"grid\">\n");
    for axis in Axis::ALL {
        let _ = writeln!(
            b,
            "<div class=\"card\"><div>{}</div><h3>{}</h3><p>{}</p><p>{}</p></div>",
            axis.icon(),
            axis.label(),
            axis.full_name(),
            axis.description()
        );
    }
    b.push_str("</div></section>\n");

    let _ = writeln!(
        b,
        "<section><h2>あなたの内に眠る、{COUNCIL_SIZE}の人格</h2><div class=\"grid\">"
    );
    for member in COUNCIL_ROSTER {
        let _ = writeln!(
            b,
            "<div class=\"card\"><div>{}</div><h3>{}</h3><p>{}</p></div>",
            member.icon, member.name, member.title
        );
    }
    b.push_str("</div></section>\n");

    let _ = write!(
        b,
        "<section id=\"analysis-form\" class=\"card\">\n\
         <h2>さあ、あなたの思考を解き放とう</h2>\n\
         <p>文章、企画、アイデア、悩み... 何でも入力してください</p>\n\
         <form method=\"post\" action=\"/report\" \
         onsubmit=\"var b=this.querySelector('button');b.disabled=true;b.textContent='分析中...';\
         document.getElementById('loading').hidden=false;\">\n\
         <textarea name=\"inputText\" maxlength=\"{max}\" required \
         placeholder=\"ここに分析したい内容を入力してください...\" \
         oninput=\"document.getElementById('count').textContent=this.value.length\">{text}</textarea>\n\
         <p><span id=\"count\">{count}</span> / {max}</p>\n",
        max = max_chars,
        text = escape(input),
        count = input.chars().count()
    );
    if let Some(err) = error {
        let _ = writeln!(b, "<div class=\"error\" role=\"alert\">{}</div>", escape(err));
    }
    let _ = write!(
        b,
        "<p><button type=\"submit\">分析を開始する</button></p>\n\
         <p id=\"loading\" hidden>{COUNCIL_SIZE}人格があなたの思考を分析中です...</p>\n\
         </form>\n</section>\n"
    );

    page(TITLE, &b)
}

/// Full report page. Missing parts render as placeholders.
pub fn render_report(view: &ReportView) -> String {
    let mut b = String::new();
    header(&mut b);

    b.push_str(
        "<section id=\"result-section\">\n\
         <p><a class=\"button\" href=\"/\">新しい分析を始める</a></p>\n\
         <h2>分析結果</h2>\n",
    );

    match view.overall_score {
        Some(score) => {
            let _ = writeln!(
                b,
                "<p class=\"score\">🏆 総合スコア：<strong>{score} / 100 点</strong></p>\n<p class=\"hint\">{}</p>",
                score_caption(score)
            );
        }
        None => {
            let _ = writeln!(
                b,
                "<p class=\"score\">🏆 総合スコア：<strong>{MISSING} / 100 点</strong></p>"
            );
        }
    }

    b.push_str("<h3>四大評価軸:</h3>\n<div class=\"grid\">\n");
    for axis in Axis::ALL {
        let score = view
            .axis_score(axis)
            .map(|s| s.to_string())
            .unwrap_or_else(|| MISSING.to_string());
        let (evaluation, improvement) = view.axis_texts(axis);
        let _ = writeln!(
            b,
            "<div class=\"card\"><p><strong>{} {}: {}</strong></p><p class=\"pre\">{}</p>\
             <p class=\"hint\">🌱 改善ヒント：{}</p></div>",
            axis.icon(),
            axis.label(),
            score,
            escape(evaluation),
            escape(improvement)
        );
    }
    b.push_str("</div>\n");

    let _ = writeln!(b, "<h3>{COUNCIL_SIZE}人の人格コメント:</h3>\n<ul>");
    for entry in &view.council_comments {
        let _ = writeln!(
            b,
            "<li class=\"card\"><strong>{} {}</strong><p class=\"pre\">{}</p></li>",
            entry.icon(),
            escape(entry.name.as_deref().unwrap_or(MISSING)),
            escape(entry.comment.as_deref().unwrap_or(""))
        );
    }
    b.push_str("</ul>\n");

    let insight = view.concluding_insight.clone().unwrap_or_default();
    let _ = writeln!(
        b,
        "<section class=\"card\"><h3>🔮 総合インサイト</h3>\
         <p><strong>「{}」</strong></p>",
        escape(insight.insight_name.as_deref().unwrap_or(MISSING))
    );
    let keywords = insight.keyword_list();
    if !keywords.is_empty() {
        let tags: Vec<String> = keywords.iter().map(|k| format!("#{}", escape(k))).collect();
        let _ = writeln!(b, "<p>{}</p>", tags.join(" "));
    }
    let _ = writeln!(
        b,
        "<p class=\"pre\">{}</p><p class=\"hint\">🧭 次の問い：{}</p></section>",
        escape(insight.comment.as_deref().unwrap_or("")),
        escape(insight.question.as_deref().unwrap_or(""))
    );

    let _ = writeln!(
        b,
        "<section class=\"card\"><h3>🧙‍♂️ ホメ仙人のことば</h3><p class=\"pre\">{}</p></section>",
        escape(view.home_sennin_comment.as_deref().unwrap_or(""))
    );

    b.push_str("<details class=\"card\"><summary>🧾 評価基準を見る</summary>\n<h4>四大評価軸の基準</h4>\n<ul>\n");
    for axis in Axis::ALL {
        let _ = writeln!(
            b,
            "<li><strong>{}：</strong> {}</li>",
            axis.label(),
            axis.criterion()
        );
    }
    let _ = write!(
        b,
        "</ul>\n<h4>{COUNCIL_SIZE}人格のコメント方針</h4>\n\
         <p>各人格は独自の視点からコメントします。たとえば「ストラテジスト君」は論理性、\
         「サポーター君」は思いやり、「クエスチョナー君」は常識への挑戦といった観点で洞察を述べます。</p>\n\
         </details>\n</section>\n"
    );

    page(&format!("分析結果 | {TITLE}"), &b)
}

/// Password form for the access gate
pub fn render_login(error: Option<&str>) -> String {
    let mut b = String::from(
        "<section class=\"card\"><h1>認証</h1>\n\
         <form method=\"post\" action=\"/login\">\n\
         <label for=\"password\">パスワードを入力</label>\n\
         <p><input type=\"password\" id=\"password\" name=\"password\" required></p>\n",
    );
    if let Some(err) = error {
        let _ = writeln!(b, "<div class=\"error\" role=\"alert\">{}</div>", escape(err));
    }
    b.push_str("<p><button type=\"submit\">認証する</button></p>\n</form>\n</section>");
    page(&format!("認証 | {TITLE}"), &b)
}
