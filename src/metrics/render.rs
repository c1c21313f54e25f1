//! Prometheus text-exposition rendering for an ordered batch of samples.
//!
//! The batch keeps per-scraper emission order, so the renderer walks it
//! front to back and prints the `# HELP`/`# TYPE` header the first time
//! each metric name appears.

use crate::metrics::Sample;
use std::collections::HashSet;
use std::fmt::Write;

/// Render a batch of samples in the Prometheus text exposition format.
pub fn render_text(samples: &[Sample]) -> String {
    let mut out = String::new();
    let mut described: HashSet<&'static str> = HashSet::new();

    for sample in samples {
        if described.insert(sample.name) {
            let _ = writeln!(out, "# HELP {} {}", sample.name, sample.help);
            let _ = writeln!(out, "# TYPE {} {}", sample.name, sample.kind.as_str());
        }
        let _ = write!(out, "{}", sample.name);
        if !sample.labels.is_empty() {
            let _ = write!(out, "{{");
            for (i, (key, value)) in sample.labels.iter().enumerate() {
                if i > 0 {
                    let _ = write!(out, ",");
                }
                let _ = write!(out, "{}=\"{}\"", key, escape_label_value(value));
            }
            let _ = write!(out, "}}");
        }
        let _ = writeln!(out, " {}", sample.value);
    }

    out
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
