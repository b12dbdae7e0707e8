use std::path::Path;

use crate::pipeline::stage7_report::{FinalSummary, Stage7Error};

pub fn write_summary(out_dir: &Path, summary: &FinalSummary) -> Result<(), Stage7Error> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(out_dir.join("summary.json"), json)?;
    Ok(())
}
