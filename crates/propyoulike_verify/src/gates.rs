//! Post-build gate chain.
//!
//! Gates read the output directory only. Each gate fails on its first
//! violation and the chain stops at the first failing gate.

use crate::error::{GateError, GateResult};
use crate::report::GateReport;
use crate::scan::{DistPage, PageRole, discover};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Presence gate label
pub const PRESENCE: &str = "PRESENCE";
/// Structure gate label
pub const STRUCTURE: &str = "STRUCTURE";
/// Canonical/OG gate label
pub const CANONICAL: &str = "CANONICAL";
/// Structured-data gate label
pub const STRUCTURED_DATA: &str = "STRUCTURED_DATA";

/// What the gates check against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Output directory
    pub dist: PathBuf,
    /// Public origin, used to compute expected URLs
    pub origin: String,
    /// Legal page slugs that must exist
    pub legal_pages: Vec<String>,
}

/// Output directory plus discovered pages
#[derive(Debug, Clone)]
pub struct DistContext {
    config: GateConfig,
    pages: Vec<DistPage>,
}

impl DistContext {
    /// Scan the output directory once for all gates
    ///
    /// # Errors
    ///
    /// Returns error if the output directory is missing or unreadable
    pub fn scan(config: GateConfig) -> GateResult<Self> {
        let pages = discover(&config.dist, PRESENCE)?;
        Ok(Self { config, pages })
    }

    /// Gate configuration
    #[must_use]
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Output directory
    #[must_use]
    pub fn dist(&self) -> &Path {
        &self.config.dist
    }

    /// Every discovered project and builder page
    #[must_use]
    pub fn pages(&self) -> &[DistPage] {
        &self.pages
    }

    /// Pages with a given role
    pub fn pages_with(&self, role: PageRole) -> impl Iterator<Item = &DistPage> {
        self.pages.iter().filter(move |p| p.role == role)
    }
}

/// One gate of the chain
pub trait Gate {
    /// Label printed on failure
    fn name(&self) -> &'static str;

    /// Run the gate
    ///
    /// # Errors
    ///
    /// Returns the first violation found
    fn check(&self, ctx: &DistContext) -> GateResult<GateReport>;
}

/// Required legal pages, sitemap, at least one hub and one project page
#[derive(Debug, Clone, Copy, Default)]
pub struct PresenceGate;

impl Gate for PresenceGate {
    fn name(&self) -> &'static str {
        PRESENCE
    }

    fn check(&self, ctx: &DistContext) -> GateResult<GateReport> {
        let mut report = GateReport::new(PRESENCE);
        for slug in &ctx.config.legal_pages {
            let rel = format!("legal/{}/index.html", slug);
            if !ctx.dist().join(&rel).is_file() {
                return Err(GateError::missing(PRESENCE, format!("legal page {} is missing", rel)));
            }
            report.push(rel, "present");
        }
        if !ctx.dist().join("sitemap.xml").is_file() {
            return Err(GateError::missing(PRESENCE, "sitemap.xml is missing"));
        }
        report.push("sitemap.xml", "present");

        let hubs = ctx.pages_with(PageRole::Builder).count();
        if hubs == 0 {
            return Err(GateError::missing(PRESENCE, "no builder hub pages were generated"));
        }
        report.push("builder hubs", format!("{} found", hubs));

        let projects = ctx.pages_with(PageRole::Project).count();
        if projects == 0 {
            return Err(GateError::missing(PRESENCE, "no project pages were generated"));
        }
        report.push("project pages", format!("{} found", projects));

        for hub in ctx.pages_with(PageRole::Builder) {
            let prefix = format!("{}-", hub.slug);
            let owned = ctx
                .pages_with(PageRole::Project)
                .filter(|p| p.slug.starts_with(&prefix))
                .count();
            if owned == 0 {
                return Err(GateError::missing(
                    PRESENCE,
                    format!("builder hub {} has no project pages", hub.label()),
                ));
            }
            report.push(hub.label(), format!("{} project pages", owned));
        }
        Ok(report)
    }
}

/// Non-empty `<title>` and meta description on every page
#[derive(Debug, Clone, Copy, Default)]
pub struct StructureGate;

impl Gate for StructureGate {
    fn name(&self) -> &'static str {
        STRUCTURE
    }

    fn check(&self, ctx: &DistContext) -> GateResult<GateReport> {
        let mut report = GateReport::new(STRUCTURE);
        for page in ctx.pages() {
            let scan = page.scan(STRUCTURE)?;
            if scan.title.as_deref().is_none_or(str::is_empty) {
                return Err(GateError::missing(
                    STRUCTURE,
                    format!("{} has no <title>", page.label()),
                ));
            }
            if scan.description.as_deref().is_none_or(|d| d.trim().is_empty()) {
                return Err(GateError::missing(
                    STRUCTURE,
                    format!("{} has no meta description", page.label()),
                ));
            }
            report.push(page.label(), "title and description present");
        }
        Ok(report)
    }
}

/// Canonical and `og:url` equal the URL computed from the directory name
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalGate;

impl Gate for CanonicalGate {
    fn name(&self) -> &'static str {
        CANONICAL
    }

    fn check(&self, ctx: &DistContext) -> GateResult<GateReport> {
        let mut report = GateReport::new(CANONICAL);
        for page in ctx.pages() {
            let scan = page.scan(CANONICAL)?;
            let expected = page.expected_url(&ctx.config.origin);
            for (tag, found) in [("canonical", &scan.canonical), ("og:url", &scan.og_url)] {
                match found {
                    None => {
                        return Err(GateError::missing(
                            CANONICAL,
                            format!("{} has no {} tag", page.label(), tag),
                        ));
                    }
                    Some(found) if found != &expected => {
                        return Err(GateError::Mismatch {
                            gate: CANONICAL,
                            reason: format!(
                                "{} {} is {:?}, expected {:?}",
                                page.label(),
                                tag,
                                found,
                                expected
                            ),
                        });
                    }
                    Some(_) => {}
                }
            }
            report.push(page.label(), expected);
        }
        Ok(report)
    }
}

/// Required JSON-LD types parse and carry their mandatory fields
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredDataGate;

fn non_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => map
            .iter()
            .any(|(k, v)| !k.starts_with('@') && non_empty(Some(v))),
        Some(_) => true,
    }
}

fn types_of(value: &Value) -> Vec<&str> {
    match value.get("@type") {
        Some(Value::String(t)) => vec![t.as_str()],
        Some(Value::Array(ts)) => ts.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

/// Flatten a block: a top-level array or `@graph` contributes each element
fn nodes(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.into_iter().flat_map(nodes).collect(),
        Value::Object(mut map) => match map.remove("@graph") {
            Some(graph) => nodes(graph),
            None => vec![Value::Object(map)],
        },
        _ => Vec::new(),
    }
}

impl StructuredDataGate {
    fn require<'a>(
        page: &DistPage,
        nodes: &'a [Value],
        kind: &str,
        fields: &[&str],
    ) -> GateResult<&'a Value> {
        let node = nodes
            .iter()
            .find(|n| types_of(n).contains(&kind))
            .ok_or_else(|| {
                GateError::missing(
                    STRUCTURED_DATA,
                    format!("{} has no {} JSON-LD block", page.label(), kind),
                )
            })?;
        Self::fields(page, node, kind, fields)?;
        Ok(node)
    }

    fn fields(page: &DistPage, node: &Value, kind: &str, fields: &[&str]) -> GateResult<()> {
        for field in fields {
            if !non_empty(node.get(*field)) {
                return Err(GateError::missing(
                    STRUCTURED_DATA,
                    format!("{} {} is missing {}", page.label(), kind, field),
                ));
            }
        }
        Ok(())
    }
}

impl Gate for StructuredDataGate {
    fn name(&self) -> &'static str {
        STRUCTURED_DATA
    }

    fn check(&self, ctx: &DistContext) -> GateResult<GateReport> {
        let mut report = GateReport::new(STRUCTURED_DATA);
        for page in ctx.pages() {
            let scan = page.scan(STRUCTURED_DATA)?;
            let mut all = Vec::new();
            for (i, raw) in scan.json_ld.iter().enumerate() {
                let value: Value =
                    serde_json::from_str(raw).map_err(|e| GateError::MalformedStructuredData {
                        gate: STRUCTURED_DATA,
                        path: page.label(),
                        block: i + 1,
                        reason: e.to_string(),
                    })?;
                all.extend(nodes(value));
            }

            match page.role {
                PageRole::Project => {
                    Self::require(page, &all, "Residence", &["name", "address"])?;
                    for offer in all.iter().filter(|n| types_of(n).contains(&"Offer")) {
                        Self::fields(page, offer, "Offer", &["price", "priceCurrency"])?;
                    }
                }
                PageRole::Builder => {
                    Self::require(page, &all, "Organization", &["name"])?;
                    Self::require(page, &all, "ItemList", &["itemListElement"])?;
                }
            }
            report.push(page.label(), format!("{} JSON-LD blocks valid", scan.json_ld.len()));
        }
        Ok(report)
    }
}

/// Ordered gates; stops at the first failure
pub struct GateChain {
    gates: Vec<Box<dyn Gate>>,
}

impl GateChain {
    /// Empty chain
    #[must_use]
    pub fn new() -> Self {
        Self { gates: Vec::new() }
    }

    /// Presence, structure, canonical, structured data
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .with_gate(PresenceGate)
            .with_gate(StructureGate)
            .with_gate(CanonicalGate)
            .with_gate(StructuredDataGate)
    }

    /// Append a gate
    #[must_use]
    pub fn with_gate(mut self, gate: impl Gate + 'static) -> Self {
        self.gates.push(Box::new(gate));
        self
    }

    /// Gate labels in order
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.gates.iter().map(|g| g.name()).collect()
    }

    /// Run every gate in order
    ///
    /// # Errors
    ///
    /// Returns the first gate failure
    pub fn run(&self, ctx: &DistContext) -> GateResult<Vec<GateReport>> {
        self.run_with(ctx, |_| {})
    }

    /// Run every gate in order, calling `on_pass` as each gate passes
    ///
    /// # Errors
    ///
    /// Returns the first gate failure
    pub fn run_with<F>(&self, ctx: &DistContext, mut on_pass: F) -> GateResult<Vec<GateReport>>
    where
        F: FnMut(&GateReport),
    {
        let mut reports = Vec::with_capacity(self.gates.len());
        for gate in &self.gates {
            let report = gate.check(ctx).inspect_err(|e| {
                tracing::error!(gate = gate.name(), error = %e, "gate failed");
            })?;
            tracing::info!(gate = gate.name(), checks = report.checks.len(), "gate passed");
            on_pass(&report);
            reports.push(report);
        }
        Ok(reports)
    }
}

impl Default for GateChain {
    fn default() -> Self {
        Self::standard()
    }
}
