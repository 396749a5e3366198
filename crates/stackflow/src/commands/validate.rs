use crate::project;
use colored::Colorize;
use stackflow_engine::GraphBuilder;

pub fn handle(stack_name: &str) -> anyhow::Result<()> {
    println!("{}", "Validating stack...".blue());

    let loaded = match project::load(stack_name) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ Stack error".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };
    println!("Stack file: {}", loaded.path.display().to_string().cyan());

    let stack = loaded.stack;
    let project_name = stack.name.clone();
    let resources = stack.resources.len();
    let lookups = stack.lookups().count();
    let tag_sets: Vec<String> = stack.tag_sets.keys().cloned().collect();
    let outputs: Vec<String> = stack.outputs.keys().cloned().collect();

    let order = match GraphBuilder::from_stack(stack).and_then(GraphBuilder::build) {
        Ok(order) => order,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ Graph error".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    println!("{}", "✓ Stack is valid!".green().bold());
    println!();
    println!("Summary:");
    println!("  Project: {}", project_name.cyan());
    println!("  Stack: {}", stack_name.cyan());
    println!(
        "  Resources: {} ({} managed, {} lookups)",
        resources,
        resources - lookups,
        lookups
    );
    if !tag_sets.is_empty() {
        println!("  Tag sets: {}", tag_sets.join(", "));
    }
    if !outputs.is_empty() {
        println!("  Outputs: {}", outputs.join(", "));
    }
    println!("  Evaluation order: {} steps", order.len());

    Ok(())
}
