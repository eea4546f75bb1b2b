// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod plan;
pub mod registry;
pub mod report;
pub mod server;
pub mod task;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_or_default};
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions};
use crate::exec::{ExecutorBackend, PlanExecutor};
use crate::fs::RealFileSystem;
use crate::plan::Pipeline;
use crate::registry::PathRegistry;
use crate::report::{PsiClient, ReportContext, run_report};
use crate::server::{ReloadHub, ServerOptions, Tunnel, open_tunnel, start_server};
use crate::task::TaskContext;
use crate::types::Target;
use crate::watch::{build_watch_profiles, spawn_watcher};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and pipeline validation
/// - the pipeline's plan, run once
/// - server, tunnel and report stages
/// - file watchers and the watch runtime
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_or_default(&config_path)?;
    let registry = PathRegistry::new(project_root_dir(&config_path), &cfg.paths);

    let pipeline = Pipeline::for_name(args.pipeline, &registry, &cfg);
    pipeline.validate()?;

    if args.dry_run {
        print!("{}", pipeline.describe());
        return Ok(());
    }

    let ctx = Arc::new(TaskContext::new(
        registry.clone(),
        &cfg,
        Arc::new(RealFileSystem),
    ));
    let executor = Arc::new(PlanExecutor::new(Arc::clone(&ctx), pipeline.policy));

    info!(pipeline = %pipeline.name, "running plan");
    let summary = executor.execute(pipeline.plan.clone()).await?;
    let failed = summary.failures().count();
    if failed > 0 {
        warn!(pipeline = %pipeline.name, failed, "plan finished with failed tasks");
    } else {
        info!(pipeline = %pipeline.name, tasks = summary.records.len(), "plan finished");
    }

    if args.once {
        return Ok(());
    }

    serve_and_watch(&pipeline, &cfg, &registry, executor).await
}

/// Start the pipeline's long-running stages and block until Ctrl-C.
async fn serve_and_watch(
    pipeline: &Pipeline,
    cfg: &ConfigFile,
    registry: &PathRegistry,
    executor: Arc<PlanExecutor>,
) -> Result<()> {
    let hub = ReloadHub::new();
    let stage = pipeline.server;

    let server = start_server(
        ServerOptions {
            host: cfg.server.host.clone(),
            port: stage.port,
            root: registry.output_root(stage.target).to_path_buf(),
            live_reload: cfg.server.live_reload,
        },
        hub.clone(),
    )
    .await?;
    println!("Serving {} at {}", tree_label(stage.target), server.url());

    let tunnel = if stage.tunnel && cfg.tunnel.enabled {
        let tunnel = open_tunnel(&cfg.tunnel, cfg.tunnel_startup_timeout, server.port()).await?;
        println!("Tunnel {}: {}", tree_label(stage.target), tunnel.url());
        Some(tunnel)
    } else {
        None
    };

    if pipeline.report && cfg.report.enabled {
        report(cfg, registry, executor.context(), tunnel.as_ref()).await?;
    }

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let _watcher = if pipeline.bindings.is_empty() {
        None
    } else {
        let profiles = build_watch_profiles(&pipeline.bindings)?;
        Some(spawn_watcher(
            registry.project_root(),
            &registry.src.root,
            profiles,
            rt_tx.clone(),
        )?)
    };

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let core = CoreRuntime::new(&pipeline.bindings, RuntimeOptions::default());
    let runtime = Runtime::new(core, rt_rx, rt_tx, executor, Arc::new(hub));
    runtime.run().await?;

    drop(tunnel);
    drop(server);
    Ok(())
}

async fn report(
    cfg: &ConfigFile,
    registry: &PathRegistry,
    ctx: &TaskContext,
    tunnel: Option<&Tunnel>,
) -> Result<()> {
    let Some(tunnel) = tunnel else {
        warn!("no public tunnel URL; skipping PageSpeed report");
        return Ok(());
    };

    let report_ctx =
        ReportContext::from_build_dir(tunnel.url(), ctx.fs.as_ref(), &registry.build.root)?;
    let client = PsiClient::new(&cfg.report);
    run_report(
        &client,
        &report_ctx,
        &cfg.report.strategies,
        cfg.report_delay,
        &mut std::io::stdout(),
    )
    .await?;
    Ok(())
}

fn tree_label(target: Target) -> &'static str {
    match target {
        Target::Dev => "Dev",
        Target::Library => "Library",
        Target::Build => "Build",
    }
}

/// Figure out the project root.
///
/// - If the config path has a non-empty parent (e.g. "site/Frontpipe.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Frontpipe.toml" (parent = ""),
///   we fall back to the current working directory "."
fn project_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
