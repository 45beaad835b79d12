use crate::report::Report;
use crate::rules::{Finding, Severity};

/// How many affected ids to show inline per finding.
const NODE_PREVIEW: usize = 5;

/// Render a report as console output, most severe findings first.
pub fn render(report: &Report) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n  Scan {} — institution {} ({} mode, {} ms)\n",
        report.id, report.institution_id, report.mode, report.duration_ms
    ));

    if report.findings.is_empty() {
        output.push_str("\n  No data-quality findings detected.\n\n");
        return output;
    }

    let mut sorted: Vec<&Finding> = report.findings.iter().collect();
    sorted.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.rule_id.cmp(&b.rule_id))
    });

    output.push_str(&format!(
        "\n  {} finding(s): {} critical, {} warning, {} info\n\n",
        report.total_findings, report.critical_count, report.warning_count, report.info_count
    ));

    for finding in &sorted {
        let severity_tag = match finding.severity {
            Severity::Critical => "[CRITICAL]",
            Severity::Warning => "[WARNING] ",
            Severity::Info => "[INFO]    ",
        };

        output.push_str(&format!(
            "  {} {} {}\n",
            severity_tag, finding.rule_id, finding.message
        ));
        if !finding.affected_nodes.is_empty() {
            let preview = finding.affected_nodes[..finding.affected_nodes.len().min(NODE_PREVIEW)]
                .join(", ");
            let rest = finding.affected_nodes.len().saturating_sub(NODE_PREVIEW);
            if rest > 0 {
                output.push_str(&format!("           nodes: {preview} (+{rest} more)\n"));
            } else {
                output.push_str(&format!("           nodes: {preview}\n"));
            }
        }
        output.push_str(&format!("           fix: {}\n", finding.suggested_fix));
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ScanMode;

    fn finding(rule_id: &str, severity: Severity, nodes: usize) -> Finding {
        Finding {
            rule_id: rule_id.into(),
            severity,
            affected_nodes: (0..nodes).map(|i| format!("n{i}")).collect(),
            message: format!("{nodes} item(s) affected"),
            suggested_fix: "fix it".into(),
        }
    }

    #[test]
    fn clean_report_renders_healthy_message() {
        let report = Report::assemble("inst-1", ScanMode::Full, vec![], 2);
        let text = render(&report);
        assert!(text.contains("No data-quality findings detected"));
    }

    #[test]
    fn critical_findings_render_first() {
        let report = Report::assemble(
            "inst-1",
            ScanMode::Full,
            vec![
                finding("info-rule", Severity::Info, 1),
                finding("critical-rule", Severity::Critical, 1),
            ],
            2,
        );
        let text = render(&report);
        let critical_pos = text.find("critical-rule").unwrap();
        let info_pos = text.find("info-rule").unwrap();
        assert!(critical_pos < info_pos);
    }

    #[test]
    fn long_node_lists_are_previewed() {
        let report = Report::assemble(
            "inst-1",
            ScanMode::Full,
            vec![finding("big-rule", Severity::Warning, 12)],
            2,
        );
        let text = render(&report);
        assert!(text.contains("(+7 more)"));
    }
}
