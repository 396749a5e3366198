use crate::project;
use colored::Colorize;
use stackflow_engine::{EngineError, Evaluator, GraphBuilder, SimulatedRealizer};
use std::time::Duration;

pub async fn handle(stack_name: &str, concurrency: usize, json: bool) -> anyhow::Result<()> {
    let loaded = project::load(stack_name)?;
    let project_name = loaded.stack.name.clone();
    let order = GraphBuilder::from_stack(loaded.stack)?.build()?;

    let evaluator = Evaluator::new().with_concurrency(concurrency);
    let cancel = evaluator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    if !json {
        println!(
            "{} {} ({}) with the dry-run realizer, {} resources",
            "Realizing".blue(),
            project_name.cyan(),
            stack_name.cyan(),
            order.len()
        );
    }

    let realizer = SimulatedRealizer::new(stack_name).with_latency(Duration::from_millis(5));
    let realization = match evaluator.realize(order, &realizer).await {
        Ok(realization) => realization,
        Err(e) => {
            if !json {
                report_failure(&e);
            }
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&realization)?);
        return Ok(());
    }

    for name in &realization.completed {
        println!("  {} {}", "✓".green(), name);
    }
    if !realization.exports.is_empty() {
        println!();
        println!("Outputs:");
        for (name, value) in &realization.exports {
            println!("  {} = {}", name.cyan(), value);
        }
    }
    println!();
    println!(
        "{} {} in {}ms",
        "✓".green().bold(),
        realization.summary(),
        realization.duration_ms
    );

    Ok(())
}

fn report_failure(error: &EngineError) {
    for name in error.completed() {
        println!("  {} {}", "✓".green(), name);
    }
    match error {
        EngineError::RealizationFailure { node, .. } => {
            eprintln!("  {} {}", "✗".red(), node);
            eprintln!(
                "{}",
                "Resources realized before the failure are kept as they are.".yellow()
            );
        }
        EngineError::UnresolvedReference { reference, .. } => {
            eprintln!("  {} {}", "✗".red(), reference.node);
            eprintln!(
                "{}",
                format!("'{}' did not report '{}'", reference.node, reference.field).yellow()
            );
        }
        EngineError::Cancelled { remaining, .. } => {
            eprintln!(
                "{}",
                format!("Cancelled, {} resources not realized", remaining).yellow()
            );
        }
        _ => {}
    }
}
