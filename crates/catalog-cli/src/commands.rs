//! CLI command implementations

use anyhow::{Context as _, Result, bail};
use catalog_core::config::CONFIG_FILE;
use catalog_core::{
    Catalog, Config, Extractor, FileStatus, IngestOptions, IngestPlan, JsonDraftExtractor,
    NormalizeOptions, NormalizeReport, ReferenceScope, plan_ingest,
};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Resolved configuration shared by every command
pub struct Context {
    config: Config,
    source: Option<PathBuf>,
    json: bool,
}

impl Context {
    pub fn new(config: Option<PathBuf>, root: Option<PathBuf>, json: bool) -> Result<Self> {
        let (mut config, source) = Config::discover(config.as_deref())?;
        if let Some(root) = root {
            config.data_dir = root;
        }
        tracing::debug!(root = %config.data_dir.display(), "catalog root");
        Ok(Self {
            config,
            source,
            json,
        })
    }

    fn catalog(&self) -> Result<Catalog> {
        self.catalog_with(self.config.clone())
    }

    fn catalog_with(&self, config: Config) -> Result<Catalog> {
        Catalog::from_config(config).with_context(|| {
            format!(
                "no catalog at {} (set data_dir or pass --root)",
                self.config.data_dir.display()
            )
        })
    }
}

pub fn ingest(
    ctx: &Context,
    draft: Option<PathBuf>,
    period: &str,
    unordered: bool,
    dry_run: bool,
) -> Result<()> {
    let catalog = ctx.catalog()?;
    let extractor = match draft {
        Some(path) if path != Path::new("-") => JsonDraftExtractor::from_path(path),
        _ => JsonDraftExtractor::stdin(),
    };

    let draft = extractor.extract()?;
    let plan = plan_ingest(&catalog, period, &draft, IngestOptions { unordered })?;

    if dry_run {
        print_plan(&plan, ctx.json)?;
        return Ok(());
    }

    let report = plan.commit(&catalog)?;
    if ctx.json {
        println!("{}", serde_json::to_string(&report)?);
        return Ok(());
    }

    if report.issue_added {
        let order = report
            .order
            .map(|o| format!(" at order {}", o))
            .unwrap_or_default();
        println!(
            "{} Added {} to {}{}",
            "✓".green(),
            report.issue_id.cyan(),
            report.period_id,
            order
        );
    } else {
        println!(
            "{} {} already in {}",
            "✓".green(),
            report.issue_id.cyan(),
            report.period_id
        );
    }
    print_added("writers", &report.writers_added);
    print_added("pencillers", &report.pencillers_added);
    Ok(())
}

#[derive(Serialize)]
struct PlanSummary<'a> {
    period_id: &'a str,
    issue_id: &'a str,
    order: Option<u32>,
    issue_is_new: bool,
    writers: Vec<&'a str>,
    pencillers: Vec<&'a str>,
}

fn print_plan(plan: &IngestPlan, json: bool) -> Result<()> {
    let summary = PlanSummary {
        period_id: &plan.period_id,
        issue_id: &plan.issue.id,
        order: plan.issue.order,
        issue_is_new: plan.issue_is_new(),
        writers: plan.writers.added().map(|c| c.id.as_str()).collect(),
        pencillers: plan.pencillers.added().map(|c| c.id.as_str()).collect(),
    };

    if json {
        println!("{}", serde_json::to_string(&summary)?);
        return Ok(());
    }

    if plan.is_noop() {
        println!("Nothing to do: {} is already ingested", summary.issue_id.cyan());
        return Ok(());
    }
    if summary.issue_is_new {
        println!("Would add to {}: {}", summary.period_id, plan.issue);
    }
    print_added("writers", &summary.writers);
    print_added("pencillers", &summary.pencillers);
    Ok(())
}

fn print_added<S: AsRef<str>>(label: &str, ids: &[S]) {
    if !ids.is_empty() {
        let ids: Vec<&str> = ids.iter().map(AsRef::as_ref).collect();
        println!("  New {}: {}", label, ids.join(", "));
    }
}

/// Stages of the normalization pass a command runs
pub enum Pass {
    All { labels: bool },
    Reorder,
    Labels,
}

impl Pass {
    fn options(&self) -> NormalizeOptions {
        match self {
            Pass::All { labels } => NormalizeOptions {
                labels: *labels,
                ..NormalizeOptions::default()
            },
            Pass::Reorder => NormalizeOptions {
                reorder: true,
                ..NormalizeOptions::none()
            },
            Pass::Labels => NormalizeOptions {
                labels: true,
                ..NormalizeOptions::none()
            },
        }
    }
}

pub fn normalize(ctx: &Context, pass: Pass, periods: Vec<String>, dry_run: bool) -> Result<()> {
    let catalog = ctx.catalog()?;
    let options = NormalizeOptions {
        dry_run,
        periods,
        ..pass.options()
    };

    let report = catalog_core::normalize(&catalog, &options)?;
    print_report(&catalog, &report, ctx.json)
}

pub fn check(
    ctx: &Context,
    periods: Vec<String>,
    scope: Option<String>,
    strict: bool,
) -> Result<()> {
    let mut config = ctx.config.clone();
    if let Some(scope) = scope {
        config.validate.scope = scope.parse::<ReferenceScope>()?;
    }
    let catalog = ctx.catalog_with(config)?;
    let options = NormalizeOptions {
        check: true,
        periods,
        ..NormalizeOptions::none()
    };

    let report = catalog_core::normalize(&catalog, &options)?;
    print_report(&catalog, &report, ctx.json)?;

    if strict && !report.is_clean() {
        bail!(
            "{} dangling reference(s), {} unresolved edition issue(s)",
            report.dangling.len(),
            report.unresolved.len()
        );
    }
    Ok(())
}

#[derive(Tabled)]
struct ReferenceRow {
    #[tabled(rename = "Period")]
    period: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Issue")]
    issue: String,
}

fn print_report(catalog: &Catalog, report: &NormalizeReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(report)?);
        return Ok(());
    }

    for file in &report.files {
        let path = file
            .path
            .strip_prefix(catalog.root())
            .unwrap_or(&file.path)
            .display();
        match &file.status {
            FileStatus::Written => {
                println!("{} {} ({} changes)", "✓".green(), path, file.changes)
            }
            FileStatus::Planned => {
                println!("{} {} ({} changes)", "~".yellow(), path, file.changes)
            }
            FileStatus::Skipped { reason } => {
                println!("{} {}: {}", "✗".red(), path, reason)
            }
            FileStatus::Unchanged | FileStatus::Missing => {}
        }
    }

    let mut rows: Vec<ReferenceRow> = report
        .dangling
        .iter()
        .map(|d| ReferenceRow {
            period: d.period_id.clone(),
            source: format!("event {}", d.event_id),
            issue: d.issue_id.clone(),
        })
        .collect();
    rows.extend(report.unresolved.iter().map(|u| ReferenceRow {
        period: u.period_id.clone(),
        source: format!("edition {}", u.edition_id),
        issue: u.issue_id.clone(),
    }));
    if !rows.is_empty() {
        println!("{}", "Unknown issue references:".bold());
        println!("{}", Table::new(rows).with(Style::rounded()));
    }

    let written = report.count(&FileStatus::Written);
    let planned = report.count(&FileStatus::Planned);
    let unchanged = report.count(&FileStatus::Unchanged);
    let skipped = report.skipped().count();
    let mut summary = format!("{} written, {} unchanged", written, unchanged);
    if planned > 0 {
        summary.push_str(&format!(", {} planned", planned));
    }
    if skipped > 0 {
        summary.push_str(&format!(", {} skipped", skipped));
    }
    println!("{}", summary.dimmed());
    Ok(())
}

pub fn format_title(ctx: &Context, ids: &[String]) -> Result<()> {
    let formatter = ctx.config.title_formatter();
    let titles: Vec<(&str, String)> = ids
        .iter()
        .map(|id| (id.as_str(), formatter.format(id)))
        .collect();

    if ctx.json {
        let map: serde_json::Map<String, serde_json::Value> = titles
            .into_iter()
            .map(|(id, title)| (id.to_string(), title.into()))
            .collect();
        println!("{}", serde_json::to_string(&map)?);
    } else {
        for (_, title) in titles {
            println!("{}", title);
        }
    }
    Ok(())
}

#[derive(Serialize, Tabled)]
struct PeriodRow {
    #[tabled(rename = "Period")]
    period: String,
    #[tabled(rename = "Issues")]
    issues: String,
    #[tabled(rename = "Events")]
    events: String,
    #[tabled(rename = "Editions")]
    editions: String,
}

fn count<T>(loaded: catalog_core::Result<Vec<T>>) -> String {
    match loaded {
        Ok(records) => records.len().to_string(),
        Err(catalog_core::Error::MissingFile(_)) => "-".to_string(),
        Err(_) => "error".to_string(),
    }
}

pub fn periods(ctx: &Context) -> Result<()> {
    let catalog = ctx.catalog()?;
    let rows: Vec<PeriodRow> = catalog
        .periods()?
        .into_iter()
        .map(|period| PeriodRow {
            issues: count(catalog.load_issues(&period)),
            events: count(catalog.load_events(&period)),
            editions: count(catalog.load_editions(&period)),
            period,
        })
        .collect();

    if ctx.json {
        println!("{}", serde_json::to_string(&rows)?);
    } else if rows.is_empty() {
        println!("No periods in {}", catalog.root().display());
    } else {
        println!("{}", Table::new(rows).with(Style::rounded()));
    }
    Ok(())
}

pub fn config_show(ctx: &Context) -> Result<()> {
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&ctx.config)?);
    } else {
        let content = toml::to_string_pretty(&ctx.config)?;
        println!("{}", content);
    }
    Ok(())
}

pub fn config_init(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    std::fs::write(path, Config::default_with_comments())?;
    println!("{} Created {}", "✓".green(), path.display());
    Ok(())
}

pub fn config_path(ctx: &Context) -> Result<()> {
    match &ctx.source {
        Some(path) => println!("{}", path.display()),
        None => println!("No config file found (looked for ./{}); using defaults", CONFIG_FILE),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_stage_passes() {
        let reorder = Pass::Reorder.options();
        assert!(reorder.reorder && !reorder.labels && !reorder.format_editions && !reorder.check);

        let labels = Pass::Labels.options();
        assert!(labels.labels && !labels.reorder && !labels.format_editions);

        let all = Pass::All { labels: false }.options();
        assert!(all.reorder && all.format_editions && all.check && !all.labels);
    }
}
