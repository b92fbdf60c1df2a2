//! Fit quality and formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the numerical pipeline stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::domain::{ChannelWindow, IntegratedIntensity, LawKind, LdCoefficientFit};
use crate::models::evaluate_at;

/// How well one law reproduces the integrated intensities it was fitted on.
#[derive(Debug, Clone, PartialEq)]
pub struct LawQuality {
    pub law: LawKind,
    pub n: usize,
    pub rms: f64,
    pub max_abs: f64,
}

/// Residual statistics per law, over each law's own admissible mu samples.
pub fn law_quality(integrated: &IntegratedIntensity, fit: &LdCoefficientFit) -> Vec<LawQuality> {
    LawKind::ALL
        .into_iter()
        .filter_map(|law| {
            let law_fit = fit.get(law)?;
            let residuals: Vec<f64> = law_fit
                .mu_used
                .iter()
                .filter_map(|&mu| {
                    let i = integrated.mu.iter().position(|&m| m == mu)?;
                    Some(integrated.values[i] - evaluate_at(law, mu, &law_fit.coefficients))
                })
                .collect();
            let n = residuals.len();
            let sse: f64 = residuals.iter().map(|r| r * r).sum();
            let rms = if n > 0 { (sse / n as f64).sqrt() } else { f64::NAN };
            let max_abs = residuals.iter().fold(0.0_f64, |acc, r| acc.max(r.abs()));
            Some(LawQuality { law, n, rms, max_abs })
        })
        .collect()
}

/// Format the run summary: channel, integrated intensities, coefficients and
/// fit quality per law.
pub fn format_fit_summary(
    window: &ChannelWindow,
    integrated: &IntegratedIntensity,
    fit: &LdCoefficientFit,
) -> String {
    let mut out = String::new();

    out.push_str("=== Limb darkening fit ===\n");
    out.push_str(&format!(
        "Channel: [{:.3}, {:.3}] nm\n",
        window.cuton_nm(),
        window.cutoff_nm()
    ));

    out.push_str("\nIntegrated intensity:\n");
    out.push_str(&format!("{:>8} {:>12}\n", "mu", "I/I0"));
    out.push_str(&format!("{:-<8} {:-<12}\n", "", ""));
    for (mu, v) in integrated.mu.iter().zip(integrated.values.iter()) {
        out.push_str(&format!("{mu:>8.4} {v:>12.6}\n"));
    }

    out.push_str("\nCoefficients:\n");
    let quality = law_quality(integrated, fit);
    for q in &quality {
        out.push_str(&format!(
            "- {:<20} n={:<3} rms={:.3e} max={:.3e} c={}\n",
            q.law.display_name(),
            q.n,
            q.rms,
            q.max_abs,
            fmt_vec(fit.coefficients(q.law))
        ));
    }

    out
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6}")).collect();
    format!("[{}]", parts.join(", "))
}
