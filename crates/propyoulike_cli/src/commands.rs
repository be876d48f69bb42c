//! Commands other than `build`.

use crate::TemplateKind;
use crate::output;
use crate::pipeline::{self, BuildOptions, PipelineError, PipelineResult, StepFailure};
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use console::style;
use propyoulike_content::{ContentStore, ProjectIndex, Resolver};
use propyoulike_schema::{BatchReport, Validator, builder_schema, project_schema};
use serde_json::Value;

fn open_resolver(options: &BuildOptions) -> PipelineResult<Resolver> {
    let store = ContentStore::open(&options.content)?;
    let site = pipeline::site_config(&store, options.origin.as_deref())?;
    let index = ProjectIndex::build(&store)?;
    Ok(Resolver::new(store, site, index)?)
}

/// Print one resolved project
pub fn resolve(options: &BuildOptions, slug: &str) -> Result<()> {
    let mut resolver = open_resolver(options).wrap_err("failed to load content")?;
    let project = resolver
        .resolve(slug)
        .wrap_err_with(|| format!("failed to resolve {}", slug))?;
    println!("{}", serde_json::to_string_pretty(project.data())?);
    Ok(())
}

/// Report-mode validation of every project
pub fn validation_report(options: &BuildOptions) -> Result<BatchReport> {
    let mut resolver = open_resolver(options).wrap_err("failed to load content")?;
    Ok(resolver.report())
}

/// Print the validation report; invalid projects do not fail the command
pub fn validate(options: &BuildOptions, json: bool) -> Result<()> {
    let report = validation_report(options)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    for row in &report.rows {
        if row.valid && row.warnings.is_empty() {
            println!("{} {}", style("✓").green(), row.id);
        } else if row.valid {
            println!("{} {} ({} advisory)", style("✓").green(), row.id, row.warnings.len());
        } else {
            println!("{} {}", style("✗").red(), row.id);
        }
        for warning in &row.warnings {
            output::warning(&format!("  {}", warning));
        }
    }
    println!("{}", report.summary());
    Ok(())
}

/// Gate an existing output directory
pub fn verify(options: &BuildOptions) -> std::result::Result<(), StepFailure> {
    let site = ContentStore::open(&options.content)
        .map_err(PipelineError::from)
        .and_then(|store| pipeline::site_config(&store, options.origin.as_deref()))
        .map_err(|source| StepFailure {
            label: "LOAD".to_string(),
            source,
        })?;
    pipeline::run_gates(&options.dist, &site).map_err(|e| StepFailure {
        label: e.gate().to_string(),
        source: e.into(),
    })?;
    Ok(())
}

/// Authoring template for a schema, checked in template mode
pub fn template_value(kind: TemplateKind) -> Value {
    let schema = match kind {
        TemplateKind::Project => project_schema(),
        TemplateKind::Builder => builder_schema(),
    };
    let template = schema.template();
    let validation = Validator::template().validate(&schema, &template);
    for issue in validation.issues() {
        tracing::debug!(path = %issue.path, "{}", issue.message);
    }
    template
}

/// Print an authoring template
pub fn template(kind: TemplateKind) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&template_value(kind))?);
    Ok(())
}

/// Write the index artifact only
pub fn index(options: &BuildOptions) -> Result<()> {
    let store = ContentStore::open(&options.content).wrap_err("failed to open content store")?;
    let index = ProjectIndex::build(&store).wrap_err("failed to build project index")?;
    let path = pipeline::write_index(&index, &options.dist).wrap_err("failed to write index")?;
    for skipped in index.skipped() {
        output::warning(&format!("skipped {}: {}", skipped.path, skipped.error));
    }
    output::success("index", &format!("({} projects) {}", index.len(), path.display()));
    Ok(())
}
