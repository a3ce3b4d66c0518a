use anyhow::Context;
use remcore::CalculationResultSet;
use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

const FORMULA: &str = "Total Deer / (Trap Nights × Movement Rate × Detection Distance × (2 + Angle Left + Angle Right))";

/// Human-readable summary of a calculation, densities to four decimals.
pub fn render_text(result: &CalculationResultSet) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Density Results ({} cameras)", result.camera_count());
    let _ = writeln!(out, "  average density        {:.4}", result.average_density);
    let _ = writeln!(out, "  standard deviation     {:.4}", result.standard_deviation);
    let _ = writeln!(out, "  total trap nights      {}", result.total_trap_nights);
    let _ = writeln!(out, "  average detection rate {:.4}", result.average_detection_rate);
    let _ = writeln!(
        out,
        "  average angles (deg)   left {:.2}, right {:.2}",
        result.average_angle_left, result.average_angle_right
    );
    let _ = writeln!(out, "Per-camera density");
    for camera in &result.per_camera {
        let _ = writeln!(out, "  {:<16} {:.4}", camera.camera_id, camera.density);
    }
    let _ = writeln!(out, "Formula: {}", FORMULA);
    out
}

pub fn summary_line(result: &CalculationResultSet) -> String {
    format!(
        "cameras={} average_density={:.6} standard_deviation={:.6} total_trap_nights={} average_detection_rate={:.6}\n",
        result.camera_count(),
        result.average_density,
        result.standard_deviation,
        result.total_trap_nights,
        result.average_detection_rate
    )
}

/// Appends a one-line summary to `path`, creating parent directories as needed.
pub fn append_report(path: &Path, result: &CalculationResultSet) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating report directory {}", parent.display()))?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening report {}", path.display()))?;
    file.write_all(summary_line(result).as_bytes())
        .with_context(|| format!("writing report {}", path.display()))?;
    Ok(())
}
