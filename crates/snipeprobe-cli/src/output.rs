//! Result formatting

use console::{style, Term};
use snipeprobe::ScenarioReport;

/// Writes scenario results to the terminal
#[derive(Debug)]
pub struct Reporter {
    term: Term,
    use_color: bool,
    quiet: bool,
}

impl Reporter {
    /// Reporter on stdout
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stdout(),
            use_color,
            quiet,
        }
    }

    /// The two summary lines, then step timings unless quiet
    pub fn report(&self, report: &ScenarioReport) -> std::io::Result<()> {
        let [tag_line, done_line] = report.summary_lines();
        self.term.write_line(&tag_line)?;
        if self.use_color {
            self.term
                .write_line(&style(done_line).green().bold().to_string())?;
        } else {
            self.term.write_line(&done_line)?;
        }
        if self.quiet {
            return Ok(());
        }
        for line in detail_lines(report) {
            if self.use_color {
                self.term.write_line(&style(line).dim().to_string())?;
            } else {
                self.term.write_line(&line)?;
            }
        }
        Ok(())
    }
}

/// Seed, picks and per-step timings
#[must_use]
pub fn detail_lines(report: &ScenarioReport) -> Vec<String> {
    let mut lines = vec![
        format!("  seed: {}", report.seed),
        format!(
            "  company: {} | model: {} | assignee: {} | location: {}",
            report.choices.company,
            report.choices.model,
            report.choices.assignee,
            report.choices.location
        ),
    ];
    if let Some(id) = &report.asset_id {
        lines.push(format!("  asset id: {id}"));
    }
    if !report.search_settled {
        lines.push("  search results did not settle before the ceiling".to_string());
    }
    lines.extend(
        report
            .steps
            .iter()
            .map(|step| format!("  {:<8} {:>6}ms", step.name, step.elapsed.as_millis())),
    );
    lines.push(format!("  total    {:>6}ms", report.duration.as_millis()));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipeprobe::{AssetChoices, Seed, StepTiming};
    use std::time::Duration;

    fn report() -> ScenarioReport {
        ScenarioReport {
            asset_tag: "1637283".to_string(),
            display_name: "Macbook Pro 13 - abc".to_string(),
            asset_id: Some("4711".to_string()),
            choices: AssetChoices {
                company: "Acme".to_string(),
                model: "Macbook Pro".to_string(),
                assignee: "Admin User".to_string(),
                location: "Cruickshank".to_string(),
            },
            seed: Seed::from_u64(2024),
            search_settled: false,
            steps: vec![StepTiming {
                name: "login",
                elapsed: Duration::from_millis(812),
            }],
            duration: Duration::from_millis(4_200),
        }
    }

    #[test]
    fn test_detail_lines() {
        let lines = detail_lines(&report());
        assert_eq!(lines[0], "  seed: 2024");
        assert!(lines[1].contains("company: Acme"));
        assert!(lines.iter().any(|l| l == "  asset id: 4711"));
        assert!(lines.iter().any(|l| l.contains("did not settle")));
        assert!(lines.iter().any(|l| l.starts_with("  login") && l.ends_with("812ms")));
        assert_eq!(lines.last().map(String::as_str), Some("  total      4200ms"));
    }
}
