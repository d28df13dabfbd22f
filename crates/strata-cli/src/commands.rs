use std::fs;
use std::path::Path;

use anyhow::Context;
use colored::{ColoredString, Colorize};
use serde_json::Value;
use strata_canon::CanonHasher;
use strata_diff::{apply, diff, PatchKind, PatchOp};
use strata_engine::{
    Actor, AnalysisReport, CustomizationKind, ImpactRecord, MergeEngine, NewCustomization,
    ResourceRef, Severity, SnapshotDraft, TenantId,
};

use crate::cli::{AnalyzeArgs, ApplyArgs, ChecksumArgs, Cli, Command, DiffArgs, OutputFormat};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Checksum(args) => cmd_checksum(args, &cli.format),
        Command::Diff(args) => cmd_diff(args, &cli.format),
        Command::Apply(args) => cmd_apply(args),
        Command::Analyze(args) => cmd_analyze(args, &cli.format),
    }
}

fn read_body(path: &Path) -> anyhow::Result<Value> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {} as JSON", path.display()))
}

fn cmd_checksum(args: ChecksumArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let body = read_body(&args.file)?;
    let checksum = CanonHasher::CONFIG.checksum(&body)?;
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "checksum": checksum.to_hex() })
        ),
        OutputFormat::Text => println!("{}", checksum.to_hex()),
    }
    Ok(())
}

fn cmd_diff(args: DiffArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let old = read_body(&args.old)?;
    let new = read_body(&args.new)?;
    let ops = diff(&old, &new);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ops)?),
        OutputFormat::Text => {
            if ops.is_empty() {
                println!("Bodies are canonically equal.");
            }
            for op in &ops {
                println!("{}", render_op(op));
            }
        }
    }
    Ok(())
}

fn cmd_apply(args: ApplyArgs) -> anyhow::Result<()> {
    let body = read_body(&args.file)?;
    let ops: Vec<PatchOp> = serde_json::from_value(read_body(&args.patch)?)
        .with_context(|| format!("parsing {} as patch operations", args.patch.display()))?;
    let patched = apply(&body, &ops)?;
    println!("{}", serde_json::to_string_pretty(&patched)?);
    Ok(())
}

/// Stage the three bodies in a throwaway engine and run the real
/// analyzer over them, so the classification shown here is exactly what
/// a full deployment would compute.
fn cmd_analyze(args: AnalyzeArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let base = read_body(&args.base)?;
    let new = read_body(&args.new)?;
    let tenant_body = read_body(&args.tenant)?;

    let engine = MergeEngine::new();
    let resource = ResourceRef::new("config", &args.key);
    let tenant = TenantId::new("local");
    let actor = Actor::new("strata-cli");

    engine.publish_snapshot(SnapshotDraft::new(resource.clone(), "1.0.0", "1", base))?;
    engine.publish_snapshot(SnapshotDraft::new(resource.clone(), "2.0.0", "1", new))?;
    engine.create_customization(NewCustomization {
        tenant_id: tenant.clone(),
        resource,
        kind: CustomizationKind::Override,
        base_platform_version: Some("1.0.0".into()),
        body: tenant_body,
        created_by: actor.clone(),
    })?;
    let manifest = engine.derive_manifest("1.0.0", "2.0.0")?;
    let report = engine.analyze_impact(&tenant, &manifest.id, false, &actor)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => render_report(&report),
    }
    Ok(())
}

fn render_report(report: &AnalysisReport) {
    if report.impacts.is_empty() {
        println!("{} No impact: the change does not touch this body.", "✓".green());
        return;
    }
    for record in &report.impacts {
        render_record(record);
    }
    let summary: Vec<String> = report
        .summary
        .iter()
        .map(|(severity, count)| format!("{count} {severity}"))
        .collect();
    println!("\n{} record(s): {}", report.impacts.len(), summary.join(", "));
}

fn render_record(record: &ImpactRecord) {
    println!(
        "{}  {}  severity: {}  suggested: {:?}",
        record.impact_type.to_string().bold(),
        record.resource.to_string().cyan(),
        severity_colored(record.severity),
        record.suggested_resolution,
    );
    for conflict in &record.conflicts {
        println!(
            "  {} {:?}",
            conflict.path.yellow(),
            conflict.conflict_type
        );
        if let Some(value) = &conflict.tenant_value {
            println!("    tenant:       {value}");
        }
        if let Some(value) = &conflict.platform_old_value {
            println!("    platform old: {value}");
        }
        if let Some(value) = &conflict.platform_new_value {
            println!("    platform new: {value}");
        }
    }
    if let Some(preview) = &record.preview_merged_value {
        println!("  merge preview: {preview}");
    }
}

fn render_op(op: &PatchOp) -> String {
    let value = op
        .value
        .as_ref()
        .map(|v| format!(" = {v}"))
        .unwrap_or_default();
    match op.op {
        PatchKind::Add => format!("{} {}{}", "add".green(), op.path, value),
        PatchKind::Remove => format!("{} {}", "remove".red(), op.path),
        PatchKind::Replace => format!("{} {}{}", "replace".yellow(), op.path, value),
    }
}

fn severity_colored(severity: Severity) -> ColoredString {
    match severity {
        Severity::Critical => "critical".red().bold(),
        Severity::High => "high".red(),
        Severity::Medium => "medium".yellow(),
        Severity::Low => "low".normal(),
        Severity::None => "none".dimmed(),
    }
}
