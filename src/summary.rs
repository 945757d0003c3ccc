//! Plain-text report summary for downstream delivery.
//!
//! The engine does not send anything itself. [`ReportSummary`] renders the
//! subject line and text body that a mail or chat collaborator forwards to the
//! payroll accountant.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::models::{Modification, ReconciliationReport};

const RULE_WIDTH: usize = 50;

/// Subject and body summarising one reconciliation report.
///
/// # Example
///
/// ```
/// use payroll_recon::models::ReconciliationReport;
/// use payroll_recon::summary::ReportSummary;
///
/// let report = ReconciliationReport::assemble(12, vec![], vec![], vec![], vec![]);
/// let summary = ReportSummary::from_report(&report);
///
/// assert!(summary.subject.starts_with("Rapport Traitement Paies - "));
/// assert!(summary.text_body.contains("Employés traités: 12"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    /// Subject line, stamped with the report time.
    pub subject: String,
    /// Plain-text body.
    pub text_body: String,
}

impl ReportSummary {
    /// Renders the summary of a report.
    pub fn from_report(report: &ReconciliationReport) -> Self {
        let subject = format!(
            "Rapport Traitement Paies - {}",
            report.timestamp.format("%d/%m/%Y %H:%M")
        );

        let mut body = String::new();
        body.push_str("RAPPORT DE TRAITEMENT AUTOMATIQUE DES PAIES\n");
        body.push_str(&"=".repeat(RULE_WIDTH));
        body.push_str("\n\nRÉSUMÉ\n------\n");
        body.push_str(&format!("Employés traités: {}\n", report.processed_count));
        body.push_str(&format!(
            "Modifications automatiques: {}\n",
            report.automatic_count
        ));
        body.push_str(&format!(
            "Cas signalés pour révision: {}\n",
            report.flagged_count
        ));
        body.push_str(&format!("Anomalies détectées: {}\n", report.anomalies.len()));

        push_modifications(
            &mut body,
            "MODIFICATIONS AUTOMATIQUES",
            report.automatic_modifications(),
        );
        push_modifications(
            &mut body,
            "MODIFICATIONS À VALIDER",
            report.modifications_for_review(),
        );

        if !report.flagged_cases.is_empty() {
            push_heading(&mut body, "CAS SIGNALÉS POUR RÉVISION");
            for case in &report.flagged_cases {
                body.push_str(&format!(
                    "\n{} ({})\n  Raison: {}\n",
                    case.employee_name, case.employee_id, case.reason
                ));
                if let Some(remark) = &case.remark {
                    body.push_str(&format!("  Remarque: {}\n", remark));
                }
            }
        }

        Self {
            subject,
            text_body: body,
        }
    }
}

fn push_heading(body: &mut String, title: &str) {
    body.push('\n');
    body.push_str(title);
    body.push('\n');
    body.push_str(&"-".repeat(RULE_WIDTH));
    body.push('\n');
}

fn push_modifications<'a>(
    body: &mut String,
    title: &str,
    modifications: impl Iterator<Item = &'a Modification>,
) {
    let mut modifications = modifications.peekable();
    if modifications.peek().is_none() {
        return;
    }

    push_heading(body, title);
    for m in modifications {
        let confidence = (m.confidence * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        body.push_str(&format!(
            "\n{} ({})\n  Champ: {}\n  {} → {}\n  Raison: {}\n  Confiance: {}%\n",
            m.employee_name,
            m.employee_id,
            m.field,
            cents(m.old_value),
            cents(m.new_value),
            m.reason,
            confidence.normalize(),
        ));
        if !m.applied {
            body.push_str("  Non appliquée\n");
        }
    }
}

fn cents(value: Decimal) -> String {
    format!(
        "{:.2}",
        value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}
