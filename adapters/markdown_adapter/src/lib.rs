use chatlens_core::domain::{AnalysisReport, DayCount, MonthCount, PeriodMatrix};
use chatlens_core::ports::{ReportWriter, Result};
use chatlens_core::utils::sanitize_filename;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub mod wordcloud;

/// Markdown report writer adapter implementation
///
/// Writes `<member>-insights.md`, `<member>-wordcloud.svg` and
/// `<member>-report.json` into the output folder.
pub struct MarkdownWriterAdapter {
    output_folder: PathBuf,
}

impl MarkdownWriterAdapter {
    pub fn new(output_folder: impl Into<PathBuf>) -> Self {
        Self {
            output_folder: output_folder.into(),
        }
    }

    fn file_stem(&self, member: &str) -> String {
        let stem = sanitize_filename(member).replace(' ', "-");
        if stem.is_empty() {
            "report".to_string()
        } else {
            stem
        }
    }

    fn format_counts_table(&self, header: &str, rows: &[(String, usize)]) -> String {
        if rows.is_empty() {
            return "*No messages*\n\n".to_string();
        }
        let mut output = String::new();
        output.push_str(&format!("| {} | num_messages |\n|---|---:|\n", header));
        for (label, count) in rows {
            output.push_str(&format!("| {} | {} |\n", label, count));
        }
        output.push('\n');
        output
    }

    fn format_period_matrix(&self, matrix: &PeriodMatrix) -> String {
        let mut output = String::new();
        output.push_str("| day |");
        for period in &matrix.periods {
            output.push_str(&format!(" {} |", period));
        }
        output.push_str("\n|---|");
        output.push_str(&"---:|".repeat(matrix.periods.len()));
        output.push('\n');
        for (day, row) in matrix.days.iter().zip(&matrix.counts) {
            output.push_str(&format!("| {} |", day));
            for count in row {
                output.push_str(&format!(" {} |", count));
            }
            output.push('\n');
        }
        output.push('\n');
        output
    }

    /// Formats the full insights report as markdown
    fn format_markdown(&self, report: &AnalysisReport, wordcloud_file: &str) -> String {
        let insights = &report.insights;
        let months = |rows: &[MonthCount]| -> Vec<(String, usize)> {
            rows.iter().map(|r| (r.month.clone(), r.num_messages)).collect()
        };
        let days = |rows: &[DayCount]| -> Vec<(String, usize)> {
            rows.iter().map(|r| (r.day.clone(), r.num_messages)).collect()
        };

        let mut output = String::new();
        output.push_str(&format!("# Chat insights: {}\n\n", report.member));

        output.push_str("| Total Messages | Total Words | Total Media Shared | Total Links Shared |\n");
        output.push_str("|---:|---:|---:|---:|\n");
        output.push_str(&format!(
            "| {} | {} | {} | {} |\n\n",
            insights.total_messages,
            insights.total_words,
            insights.total_media_shared,
            insights.total_links_shared
        ));

        let monthly = months(&insights.monthly_activity);
        output.push_str("## Monthly Activity\n\n");
        output.push_str(&self.format_counts_table("month", &monthly));

        let daily = days(&insights.daily_activity);
        output.push_str("## Daily Activity\n\n");
        output.push_str(&self.format_counts_table("day", &daily));

        let busy_days = days(&insights.most_busy_days);
        output.push_str("## Most Busy Days\n\n");
        output.push_str(&self.format_counts_table("day", &busy_days));

        let busy_months = months(&insights.most_busy_months);
        output.push_str("## Most Busy Months\n\n");
        output.push_str(&self.format_counts_table("month", &busy_months));

        output.push_str("## Period-wise Activity\n\n");
        output.push_str(&self.format_period_matrix(&insights.periodwise_activity));

        let users: Vec<(String, usize)> = insights
            .most_busy_users
            .iter()
            .map(|u| (u.username.clone(), u.num_messages))
            .collect();
        output.push_str("## Most Busy Users\n\n");
        output.push_str(&self.format_counts_table("username", &users));

        output.push_str("## Most Common Words\n\n");
        output.push_str(&format!("![Word cloud]({})\n\n", wordcloud_file));
        if report.vocabulary.is_empty() {
            output.push_str("*No words*\n\n");
        } else {
            output.push_str("| term | count |\n|---|---:|\n");
            for entry in &report.vocabulary {
                output.push_str(&format!("| {} | {} |\n", entry.term, entry.count));
            }
            output.push('\n');
        }

        output.push_str("## Participants\n\n");
        for participant in &report.participants {
            output.push_str(&format!("- {}\n", participant));
        }

        output
    }
}

impl ReportWriter for MarkdownWriterAdapter {
    fn write(&self, report: &AnalysisReport) -> Result<()> {
        // Create output directory if it doesn't exist
        let output_dir = Path::new(&self.output_folder);
        fs::create_dir_all(output_dir)?;

        let stem = self.file_stem(&report.member);
        let wordcloud_file = format!("{}-wordcloud.svg", stem);

        fs::write(
            output_dir.join(&wordcloud_file),
            wordcloud::render_svg(&report.vocabulary),
        )?;
        fs::write(
            output_dir.join(format!("{}-insights.md", stem)),
            self.format_markdown(report, &wordcloud_file),
        )?;
        fs::write(
            output_dir.join(format!("{}-report.json", stem)),
            serde_json::to_string_pretty(report)?,
        )?;

        info!("Wrote report for {} to {}", report.member, output_dir.display());
        Ok(())
    }
}
