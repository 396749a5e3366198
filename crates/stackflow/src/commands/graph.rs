use crate::project;
use colored::Colorize;
use stackflow_engine::GraphBuilder;

pub fn handle(stack_name: &str) -> anyhow::Result<()> {
    let loaded = project::load(stack_name)?;
    let project_name = loaded.stack.name.clone();
    let order = GraphBuilder::from_stack(loaded.stack)?.build()?;
    let exports = order.exports().clone();

    println!(
        "Evaluation order for {} ({}):",
        project_name.cyan(),
        stack_name.cyan()
    );

    let width = order.names().iter().map(|n| n.len()).max().unwrap_or(0);
    for (step, node) in order.enumerate() {
        let name = format!("{:width$}", node.name(), width = width);
        let name = if node.is_lookup() {
            name.yellow()
        } else {
            name.bold()
        };
        let deps: Vec<&str> = node.dependencies().into_iter().collect();

        if deps.is_empty() {
            println!("  {:>3}. {}  {}", step + 1, name, node.kind().dimmed());
        } else {
            println!(
                "  {:>3}. {}  {}  ← {}",
                step + 1,
                name,
                node.kind().dimmed(),
                deps.join(", ")
            );
        }
    }

    if !exports.is_empty() {
        println!();
        println!("Outputs:");
        for (name, reference) in &exports {
            println!("  {} ← {}", name.cyan(), reference);
        }
    }

    Ok(())
}
