//! Post-processing of summaries returned by the search service.

pub mod citation_reconciler;
pub mod response_cleanup;

pub use citation_reconciler::{
    apply_mappings, build_mappings, canonical_filename, reconcile, strip_noise, TitleMapping,
};
pub use response_cleanup::finalize_for_display;
