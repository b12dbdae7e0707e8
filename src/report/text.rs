use crate::pipeline::stage7_report::FinalSummary;

pub fn render_report(summary: &FinalSummary) -> String {
    let mut out = String::new();
    out.push_str("Kira Co-DEG Report\n");
    out.push_str("==================\n\n");
    out.push_str("Core genes are ranked by degree among concordant co-DEGs. ");
    out.push_str("Interaction evidence is taken as given and AUC values describe single-gene separation only.\n\n");

    out.push_str("Datasets:\n");
    for d in &summary.datasets {
        out.push_str(&format!(
            "- {}: {} genes, {} samples ({} disease, {} control)\n",
            d.name, d.n_genes, d.n_samples, d.n_disease, d.n_control
        ));
    }
    out.push('\n');

    out.push_str("Differential expression:\n");
    for c in &summary.conditions {
        out.push_str(&format!(
            "- {}: {} up, {} down of {} tested",
            c.name, c.degs_up, c.degs_down, c.genes_tested
        ));
        if c.genes_failed > 0 {
            out.push_str(&format!(" ({} not testable)", c.genes_failed));
        }
        out.push('\n');
    }
    out.push_str(&format!(
        "- co-DEGs: {} up, {} down, {} discordant\n\n",
        summary.co_degs.concordant_up, summary.co_degs.concordant_down, summary.co_degs.discordant
    ));

    out.push_str("Interaction network:\n");
    out.push_str(&format!(
        "- {} vertices, {} edges\n",
        summary.network.vertices, summary.network.edges
    ));
    if summary.network.core_genes.is_empty() {
        out.push_str("- no core genes\n");
    } else {
        out.push_str(&format!(
            "- core genes: {}\n",
            summary.network.core_genes.join(", ")
        ));
    }
    out.push('\n');

    if !summary.enrichment.is_empty() {
        out.push_str(&format!(
            "Enrichment (adjusted p < {}):\n",
            summary.config.report_alpha
        ));
        for e in &summary.enrichment {
            out.push_str(&format!(
                "- {}: {} significant of {} tested\n",
                e.category_name, e.significant_terms, e.tested_terms
            ));
            for term in &e.top_terms {
                out.push_str(&format!("    {}\n", term));
            }
        }
        out.push('\n');
    }

    out.push_str("Validation:\n");
    if summary.validation.is_empty() {
        out.push_str("- nothing to validate\n");
    }
    for v in &summary.validation {
        match v.auc {
            Some(auc) => out.push_str(&format!("- {} [{}]: AUC {:.4}\n", v.gene, v.cohort, auc)),
            None => out.push_str(&format!("- {} [{}]: {}\n", v.gene, v.cohort, v.status)),
        }
    }
    out.push('\n');

    out
}
