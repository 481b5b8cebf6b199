//! Terminal output formatting with colors and box drawing.

use colored::Colorize;

use crate::result::SignificanceResult;

/// Number of pairs listed in the summary.
const TOP_PAIRS: usize = 10;

/// Format a result for human-readable terminal output.
///
/// Lists the run parameters, then the pairs significant at `alpha`
/// (adjusted p-value when available), strongest |r| first.
pub fn format_result(result: &SignificanceResult, alpha: f64) -> String {
    let mut output = String::new();
    let sep = "\u{2500}".repeat(62);
    let meta = &result.metadata;

    output.push_str("correl-nets\n");
    output.push_str(&sep);
    output.push_str("\n\n");

    output.push_str(&format!(
        "  Input: {} features x {} samples ({} pairs)\n",
        meta.features,
        meta.samples,
        result.table.len()
    ));
    output.push_str(&format!(
        "  Bootstraps: {} on {} worker(s), seed 0x{:016x}\n",
        meta.bootstraps, meta.workers, meta.seed
    ));
    output.push_str(&format!("  Correction: {}\n", meta.p_adjust));
    output.push_str(&format!("  Runtime: {:.2} s\n\n", meta.runtime_secs));

    let mut hits: Vec<_> = result.significant(alpha).collect();
    hits.sort_by(|a, b| b.r.abs().total_cmp(&a.r.abs()));

    if hits.is_empty() {
        output.push_str(&format!(
            "  {}\n",
            format!("No pairs significant at alpha = {alpha}").yellow().bold()
        ));
    } else {
        output.push_str(&format!(
            "  {}\n\n",
            format!("{} pair(s) significant at alpha = {alpha}", hits.len())
                .green()
                .bold()
        ));
        for rec in hits.iter().take(TOP_PAIRS) {
            let p = rec.adjusted_p.or(rec.p).unwrap_or(f64::NAN);
            let r = format!("{:+.3}", rec.r);
            let r = if rec.r >= 0.0 { r.green() } else { r.red() };
            output.push_str(&format!(
                "    {} ~ {}  r={}  p={:.3}\n",
                rec.feature1, rec.feature2, r, p
            ));
        }
        if hits.len() > TOP_PAIRS {
            output.push_str(&format!("    ... and {} more\n", hits.len() - TOP_PAIRS));
        }
    }

    output.push('\n');
    output.push_str(&sep);
    output.push('\n');
    output.push_str(&format!(
        "Note: p-values are resolved in steps of 1/{}.\n",
        meta.bootstraps
    ));

    output
}
