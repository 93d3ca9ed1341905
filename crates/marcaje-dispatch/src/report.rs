//! Outcome → notification mapping.
//!
//! The one place email subjects and bodies are composed, for every outcome
//! shape: success, simulated success, failure, and the holiday
//! short-circuit.

use marcaje_core::{ActionOutcome, RunSummary, WorkItem};

/// Subject and body for one item's outcome email.
pub fn notification_for(item: &WorkItem, outcome: &ActionOutcome) -> (String, String) {
    match outcome {
        ActionOutcome::Success(receipt) => {
            let marker = if receipt.simulated { " (simulada)" } else { "" };
            let subject = format!(
                "{}{} completada - RUT: {}",
                receipt.action,
                marker,
                item.rut
            );
            let mut body = if receipt.simulated {
                format!(
                    "🧪 Modo debug activo: no se ejecutó marcaje real.\nHora local: {}",
                    receipt.timestamp.format("%H:%M:%S")
                )
            } else {
                format!(
                    "✅ {} realizada con éxito a las {} (hora local).",
                    receipt.action,
                    receipt.timestamp.format("%H:%M:%S")
                )
            };
            match &item.location_hint {
                Some(hint) => body.push_str(&format!("\n📍 Ubicación: {hint}")),
                None => body.push_str("\n📍 Ubicación: Sin coordenadas"),
            }
            (subject, body)
        }
        ActionOutcome::Failure { reason } => (
            format!("Error en marcaje - RUT: {}", item.rut),
            format!("❌ Error en marcaje para RUT {}:\n{}", item.rut, reason),
        ),
    }
}

/// Subject and body for the "today is a holiday" email.
pub fn holiday_notification(title: &str, kind: &str, source: &str) -> (String, String) {
    (
        format!("🎉 Feriado: {title} - No hay marcaje"),
        format!(
            "Hoy es feriado ({title}), no se realizará marcaje.\nTipo: {kind}\nFuente: {source}"
        ),
    )
}

/// One-line run summary for the log.
pub fn summary_line(summary: &RunSummary) -> String {
    format!(
        "total={} succeeded={} failed={} collisions={}",
        summary.total, summary.succeeded, summary.failed, summary.collisions
    )
}
