pub mod fdr;
pub mod hypergeom;
pub mod roc;
pub mod welch;
