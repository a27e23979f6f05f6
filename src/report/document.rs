//! Print-oriented HTML report.

use super::format::Formatter;
use crate::models::{AnalyticsPayload, DisplayMode, QuestionSummary, ReportMetadata};

const STYLE: &str = r#"
        * { box-sizing: border-box; }
        body { font-family: "DejaVu Sans", Arial, sans-serif; color: #0f172a; font-size: 12px; line-height: 1.5; margin: 0; padding: 28px; }
        h1 { font-size: 20px; margin: 0 0 4px; color: #1e293b; }
        h2 { font-size: 15px; margin: 0 0 12px; color: #1e293b; }
        p { margin: 0 0 12px; }
        .muted { color: #64748b; }
        .summary { margin: 16px 0 24px; padding: 16px; border: 1px solid #e2e8f0; border-radius: 12px; background: #f8fafc; }
        .summary dl { margin: 0; display: grid; grid-template-columns: 160px auto; row-gap: 6px; column-gap: 12px; }
        .summary dt { font-weight: 600; color: #1e293b; }
        .summary dd { margin: 0; }
        .question { page-break-inside: avoid; margin-bottom: 28px; padding-bottom: 20px; border-bottom: 1px solid #e2e8f0; }
        table { width: 100%; border-collapse: collapse; }
        th, td { padding: 8px 10px; text-align: left; border: 1px solid #e2e8f0; }
        th { background: #e2e8f0; font-size: 11px; text-transform: uppercase; }
        .bar-cell { width: 45%; }
        .bar { position: relative; height: 12px; background: #e2e8f0; border-radius: 9999px; overflow: hidden; }
        .bar span { position: absolute; left: 0; top: 0; bottom: 0; background: #0ea5e9; border-radius: 9999px; }
        .count, .percent { width: 70px; text-align: right; }
        .name-list { margin: 0; padding-left: 20px; }
        .no-data { padding: 12px; background: #f1f5f9; color: #64748b; border-radius: 8px; border: 1px dashed #cbd5f5; }
        .footer { margin-top: 32px; font-size: 11px; color: #64748b; }
"#;

/// Shown in place of a table or list when a question has no answers.
pub const NO_DATA: &str = "Tidak ada data.";

/// Render the HTML report.
pub fn generate_html_report(
    payload: &AnalyticsPayload,
    metadata: &ReportMetadata,
    formatter: &Formatter,
    app_name: &str,
) -> String {
    let title = escape_html(&metadata.survey_title);
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"id\">\n<head>\n");
    html.push_str("    <meta charset=\"utf-8\">\n");
    html.push_str(&format!("    <title>Analitik {}</title>\n", title));
    html.push_str(&format!("    <style>{}    </style>\n", STYLE));
    html.push_str("</head>\n<body>\n");

    html.push_str(&format!("    <h1>Analitik – {}</h1>\n", title));
    html.push_str(&format!(
        "    <p class=\"muted\">Dibuat pada {}</p>\n",
        formatter.timestamp(&metadata.generated_at)
    ));

    html.push_str(&summary_block(payload));

    for summary in payload.analytics.values() {
        html.push_str(&question_section(summary, formatter));
    }

    html.push_str(&format!(
        "    <p class=\"footer\">Laporan ini dibuat secara otomatis oleh sistem survei pada {}</p>\n",
        escape_html(app_name)
    ));
    html.push_str("</body>\n</html>\n");

    html
}

fn summary_block(payload: &AnalyticsPayload) -> String {
    let stats = &payload.stats;
    let rows = [
        ("Total Respon", stats.total_responses.to_string()),
        ("Total Pertanyaan", stats.total_questions.to_string()),
        ("Jawaban Terekam", stats.total_answered.to_string()),
        ("Completion Rate", format!("{}%", stats.completion_rate)),
    ];

    let mut block = String::from("    <section class=\"summary\">\n        <dl>\n");
    for (term, value) in rows {
        block.push_str(&format!(
            "            <dt>{}</dt>\n            <dd>{}</dd>\n",
            term, value
        ));
    }
    block.push_str("        </dl>\n    </section>\n");
    block
}

fn question_section(summary: &QuestionSummary, formatter: &Formatter) -> String {
    let mut section = String::from("    <section class=\"question\">\n");
    let title = if summary.title.is_empty() {
        "-"
    } else {
        summary.title.as_str()
    };
    section.push_str(&format!("        <h2>{}</h2>\n", escape_html(title)));

    match summary.display {
        DisplayMode::List => section.push_str(&entry_list(summary)),
        DisplayMode::Distribution => {
            section.push_str(&distribution_table(summary, formatter));
            if let Some(average) = summary.average {
                section.push_str(&format!(
                    "        <p class=\"muted\" style=\"margin-top: 12px;\">Rata-rata nilai: {}</p>\n",
                    formatter.average(average)
                ));
            }
        }
    }

    section.push_str("    </section>\n");
    section
}

fn entry_list(summary: &QuestionSummary) -> String {
    let entries = summary.entries.as_deref().unwrap_or_default();
    let mut out = format!(
        "        <p class=\"muted\">Total jawaban: {}</p>\n",
        entries.len()
    );

    if entries.is_empty() {
        out.push_str(&no_data());
        return out;
    }

    out.push_str("        <ol class=\"name-list\">\n");
    for entry in entries {
        out.push_str(&format!("            <li>{}</li>\n", escape_html(entry)));
    }
    out.push_str("        </ol>\n");
    out
}

fn distribution_table(summary: &QuestionSummary, formatter: &Formatter) -> String {
    let mut out = format!(
        "        <p class=\"muted\">Total respon kombinasi: {}</p>\n",
        summary.total
    );

    if !summary.has_data() {
        out.push_str(&no_data());
        return out;
    }

    out.push_str("        <table>\n            <thead>\n                <tr>\n");
    out.push_str("                    <th>Jawaban</th>\n");
    out.push_str("                    <th class=\"bar-cell\">Visualisasi</th>\n");
    out.push_str("                    <th class=\"count\">Jumlah</th>\n");
    out.push_str("                    <th class=\"percent\">Persentase</th>\n");
    out.push_str("                </tr>\n            </thead>\n            <tbody>\n");

    for (label, count) in &summary.counts {
        let share = summary.share(*count);
        let width = (share * 100.0).clamp(0.0, 100.0);
        out.push_str("                <tr>\n");
        out.push_str(&format!("                    <td>{}</td>\n", escape_html(label)));
        out.push_str(&format!(
            "                    <td class=\"bar-cell\"><div class=\"bar\"><span style=\"width: {:.2}%\"></span></div></td>\n",
            width
        ));
        out.push_str(&format!("                    <td class=\"count\">{}</td>\n", count));
        out.push_str(&format!(
            "                    <td class=\"percent\">{}</td>\n",
            formatter.percent(share)
        ));
        out.push_str("                </tr>\n");
    }

    out.push_str("            </tbody>\n        </table>\n");
    out
}

fn no_data() -> String {
    format!("        <div class=\"no-data\">{}</div>\n", NO_DATA)
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SurveyStats;
    use chrono::{TimeZone, Utc};

    fn metadata() -> ReportMetadata {
        ReportMetadata {
            survey_title: "Survei <Layanan>".to_string(),
            generated_at: Utc.with_ymd_and_hms(2025, 3, 1, 2, 0, 0).unwrap(),
        }
    }

    fn payload() -> AnalyticsPayload {
        let mut payload = AnalyticsPayload::default();

        let mut rating = QuestionSummary::empty("Nilai layanan");
        rating.counts.insert("Baik (4)".to_string(), 2);
        rating.counts.insert("Cukup (3)".to_string(), 1);
        rating.total = 3;
        rating.average = Some(3.6667);
        payload.analytics.insert("rating".to_string(), rating);

        let mut feedback = QuestionSummary::empty("Saran");
        feedback.display = DisplayMode::List;
        feedback.counts.insert("Lebih cepat".to_string(), 1);
        feedback.total = 1;
        feedback.entries = Some(vec!["Lebih cepat".to_string()]);
        payload.analytics.insert("saran".to_string(), feedback);

        payload
            .analytics
            .insert("kosong".to_string(), QuestionSummary::empty("Kosong"));

        payload.stats = SurveyStats::new(3, 3, 4);
        payload
    }

    #[test]
    fn test_generate_html_report() {
        let html = generate_html_report(&payload(), &metadata(), &Formatter::default(), "Portal");

        assert!(html.contains("<title>Analitik Survei &lt;Layanan&gt;</title>"));
        assert!(html.contains("Dibuat pada 01-03-2025 09:00"));
        assert!(html.contains("<dd>44%</dd>"));
        assert!(html.contains("<td>Baik (4)</td>"));
        assert!(html.contains("<td class=\"percent\">66,7%</td>"));
        assert!(html.contains("width: 66.67%"));
        assert!(html.contains("Rata-rata nilai: 3,67"));
        assert!(html.contains("<li>Lebih cepat</li>"));
        assert!(html.contains("Total jawaban: 1"));
        assert!(html.contains("sistem survei pada Portal"));
    }

    #[test]
    fn test_empty_question_renders_no_data() {
        let html = generate_html_report(&payload(), &metadata(), &Formatter::default(), "Portal");
        let kosong = html.split("<h2>Kosong</h2>").nth(1).unwrap();

        assert!(kosong.contains("Total respon kombinasi: 0"));
        assert!(kosong.contains(NO_DATA));
        assert!(!kosong.contains("Rata-rata"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html("\"x\" <y>"), "&quot;x&quot; &lt;y&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }
}
