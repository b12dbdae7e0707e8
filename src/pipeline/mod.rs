pub mod stage1_load;
pub mod stage2_deg;
pub mod stage3_codeg;
pub mod stage4_network;
pub mod stage5_enrichment;
pub mod stage6_validate;
pub mod stage7_report;
