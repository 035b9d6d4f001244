// SPDX-License-Identifier: Apache-2.0

//! Automation rule verdict and rule cards.

use std::io::{self, Write};

use console::style;

use super::upload::{AutomationRule, UploadResult};
use crate::error::ScanError;

/// Outcome of evaluating automation rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Verdict {
    /// Number of triggered rules.
    pub triggered: usize,
    /// At least one triggered rule fails the pipeline.
    pub fail_pipeline: bool,
}

impl Verdict {
    /// Converts the verdict into the scan result.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::PipelineFailed` when a triggered rule fails the pipeline.
    pub fn into_result(self) -> Result<(), ScanError> {
        if self.fail_pipeline {
            Err(ScanError::PipelineFailed)
        } else {
            Ok(())
        }
    }
}

/// Evaluates the rules of an upload result.
#[must_use]
pub fn evaluate(rules: &[AutomationRule]) -> Verdict {
    rules
        .iter()
        .filter(|rule| rule.triggered)
        .fold(Verdict::default(), |mut verdict, rule| {
            verdict.triggered += 1;
            verdict.fail_pipeline |= rule.fail_pipeline();
            verdict
        })
}

/// Writes a card for one automation rule.
pub fn render_rule_card(w: &mut dyn Write, rule: &AutomationRule) -> io::Result<()> {
    let status = match (rule.triggered, rule.fail_pipeline()) {
        (true, true) => style("FAILED").red().bold(),
        (true, false) => style("TRIGGERED").yellow().bold(),
        (false, _) => style("PASSED").green().bold(),
    };

    let description = if rule.rule_description.is_empty() {
        "Unnamed rule"
    } else {
        &rule.rule_description
    };

    writeln!(w, "{status} {}", style(description).bold())?;
    if !rule.rule_actions.is_empty() {
        writeln!(w, "  Actions: {}", rule.rule_actions.join(", "))?;
    }
    if !rule.rule_link.is_empty() {
        writeln!(w, "  Manage rule: {}", style(&rule.rule_link).cyan())?;
    }
    writeln!(w)
}

/// Writes the result summary: vulnerability count, rule cards and the details link.
pub fn render_result(w: &mut dyn Write, result: &UploadResult) -> io::Result<()> {
    writeln!(
        w,
        "\n{} vulnerabilities found\n",
        style(result.vulnerabilities_found).bold()
    )?;
    for rule in &result.automation_rules {
        render_rule_card(w, rule)?;
    }
    writeln!(w, "For full details, visit: {}\n", style(&result.details_url).cyan())
}
