//! Console and JSON rendering of score reports

use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::report::ScoreReport;
use crate::processing::ats_calculator::WEIGHTS;
use crate::processing::schema::InfoValue;
use colored::{Color, Colorize};

pub trait OutputFormatter {
    fn format_report(&self, report: &ScoreReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Human-readable report with optional colors
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str) -> String {
        if self.use_colors {
            format!("\n{}\n", title.color(Color::Blue).bold())
        } else {
            format!("\n{}\n", title)
        }
    }

    fn format_score_badge(&self, score: f64) -> String {
        let (badge, color) = if score >= 85.0 {
            ("EXCELLENT", Color::Green)
        } else if score >= 70.0 {
            ("GOOD", Color::Yellow)
        } else {
            ("NEEDS WORK", Color::Red)
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn score_color(score: f64) -> Color {
        if score >= 0.8 {
            Color::Green
        } else if score >= 0.5 {
            Color::Yellow
        } else {
            Color::Red
        }
    }

    fn format_info_value(value: &InfoValue) -> String {
        match value {
            InfoValue::Items(items) if items.is_empty() => "-".to_string(),
            InfoValue::Items(items) => items.join(", "),
            InfoValue::Years(years) => format!("{} years", years),
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &ScoreReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("ATS SCORE"));
        output.push_str(&format!("Resume: {}\n", report.resume_path));
        output.push_str(&format!("Job:    {}\n", report.job_path));
        output.push_str(&format!("Model:  {}\n\n", report.embedding_model));
        output.push_str(&format!(
            "Overall Score: {:.1} / 100 {}\n",
            report.score,
            self.format_score_badge(report.score)
        ));

        output.push_str(&self.format_header("Category Scores"));
        for (name, weight) in WEIGHTS {
            let line = match report.category_scores.get(name) {
                Some(score) => self.colorize(&format!("{:.3}", score), Self::score_color(*score)),
                None => self.colorize("n/a", Color::BrightBlack),
            };
            output.push_str(&format!("  {:<20} {}  (weight {:.0}%)\n", name, line, weight * 100.0));
        }

        if let Some(feedback) = &report.feedback {
            output.push_str(&self.format_header("Feedback"));
            for sentence in feedback.lines() {
                output.push_str(&format!("  - {}\n", self.colorize(sentence, Color::Cyan)));
            }
        }

        if self.detailed {
            output.push_str(&self.format_header("Extracted Information"));
            for (category, job_value) in report.job_info.iter() {
                output.push_str(&format!("  {}\n", self.colorize(category.as_str(), Color::Magenta)));
                output.push_str(&format!("    job:    {}\n", Self::format_info_value(job_value)));
                let resume_value = report
                    .resume_info
                    .get(category)
                    .map(Self::format_info_value)
                    .unwrap_or_else(|| "-".to_string());
                output.push_str(&format!("    resume: {}\n", resume_value));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &ScoreReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

/// Formatter for `format`
pub fn formatter_for(format: OutputFormat, use_colors: bool, detailed: bool) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Console => Box::new(ConsoleFormatter::new(use_colors, detailed)),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::ats_calculator::CategoryScores;
    use crate::processing::schema::{Category, InfoStructure};

    fn sample_report() -> ScoreReport {
        let mut category_scores = CategoryScores::new();
        category_scores.insert("skills".to_string(), 0.75);
        category_scores.insert("text_similarity".to_string(), 0.6);

        let mut job_info = InfoStructure::new();
        job_info.insert(Category::Skills, InfoValue::Items(vec!["rust".to_string()]));
        let mut resume_info = InfoStructure::new();
        resume_info.insert(Category::Skills, InfoValue::Items(Vec::new()));

        ScoreReport {
            resume_path: "resume.txt".to_string(),
            job_path: "job.md".to_string(),
            embedding_model: "hashing".to_string(),
            score: 28.5,
            category_scores,
            feedback: Some("Your overall match with the job requirements needs improvement.".to_string()),
            resume_info,
            job_info,
        }
    }

    #[test]
    fn test_console_report_without_colors() {
        let output = ConsoleFormatter::new(false, true)
            .format_report(&sample_report())
            .unwrap();

        assert!(output.contains("Overall Score: 28.5 / 100 [NEEDS WORK]"));
        assert!(output.contains("skills               0.750  (weight 30%)"));
        assert!(output.contains("job_title            n/a"));
        assert!(output.contains("  - Your overall match"));
        assert!(output.contains("    job:    rust"));
        assert!(output.contains("    resume: -"));
    }

    #[test]
    fn test_json_report() {
        let output = JsonFormatter::new(false).format_report(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["score"], 28.5);
        assert_eq!(value["job_info"]["skills"][0], "rust");
        assert_eq!(formatter_for(OutputFormat::Json, false, false).supports_format(), OutputFormat::Json);
    }
}
