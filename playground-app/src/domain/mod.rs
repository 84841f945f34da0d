mod analysis;
mod extraction;
mod kpi_snapshot;
mod retrospective;

pub use analysis::{Analysis, AnalysisKind, SectionPresence};
pub use extraction::{
    ContactInfo, ExtractionResult, Headings, PageStructure, PricingSignals, SocialProof,
    TechnologyStack,
};
pub use kpi_snapshot::KpiSnapshot;
pub use retrospective::DecisionRetrospective;
