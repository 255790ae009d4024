//! Dashboard synthesis from telemetry discovery snapshots.
//!
//! This crate turns a [`DiscoverySnapshot`] (event types, their attributes
//! and standalone metrics) into a multi-page [`DashboardDefinition`]:
//!
//! - **Classification**: every name lands in exactly one [`Category`] via a
//!   priority-ordered [`Taxonomy`]
//! - **Golden signals**: names are mapped onto latency, traffic, errors and
//!   saturation buckets
//! - **Correlations**: same-category pairs matching known naming patterns
//! - **Synthesis**: a page plan, generated NRQL queries and a greedy
//!   12-column grid layout
//!
//! The pipeline is synchronous and pure. The only asynchronous boundary is
//! the [`DashboardCollaborator`] used to validate queries and deploy.
//!
//! # Example
//!
//! ```rust
//! use signalboard_core::{AccountId, Attribute, DashboardBuilder, DiscoverySnapshot, EventType};
//!
//! let snapshot = DiscoverySnapshot::new(AccountId(1)).with_event_type(
//!     EventType::new("KafkaBrokerSample", 126)
//!         .with_attribute(Attribute::numeric("broker.messagesInPerSecond")),
//! );
//!
//! let builder = DashboardBuilder::with_defaults()?;
//! let output = builder.build(&snapshot)?;
//! assert_eq!(output.definition.pages.last().map(|p| p.name.as_str()), Some("All Metrics Catalog"));
//! # Ok::<(), signalboard_core::SignalboardError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod analysis;
pub mod assembler;
pub mod builder;
pub mod collaborator;
pub mod config;
pub mod correlator;
pub mod error;
pub mod insights;
pub mod layout;
pub mod planner;
pub mod query;
pub mod signals;
pub mod synthesizer;
pub mod taxonomy;
pub mod types;
pub mod visualization;
pub mod widgets;

pub use analysis::{Analysis, Analyzer, ClassifiedItem, EventTypeSummary, MetricSummary, guess_unit};
pub use assembler::{DashboardDefinition, Page, Permissions, assemble};
pub use builder::{BuildOutput, DashboardBuilder};
pub use collaborator::{
    DashboardCollaborator, DeployedDashboard, NullCollaborator, QueryResponse, ValidationReport,
    validate_queries,
};
pub use config::BuilderConfig;
pub use correlator::{CorrelationEdge, CorrelationKind, Correlator, detect_correlations};
pub use error::{CollaboratorError, Result, SignalboardError};
pub use insights::{Insight, Severity, generate_insights};
pub use layout::{GridPacker, Layout};
pub use planner::{DashboardPlan, PageKind, PlannedPage, PlannedSection, plan};
pub use signals::map_signals;
pub use synthesizer::synthesize;
pub use taxonomy::{Taxonomy, TaxonomyOverrides};
pub use types::{
    AccountId, Attribute, Category, DiscoverySnapshot, EventType, GoldenSignal, MetricDescriptor,
    MetricKind, Relationship, ValueType,
};
pub use visualization::Visualization;
pub use widgets::{NrqlQuery, Widget};
