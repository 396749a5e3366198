use colored::Colorize;
use stackflow_core::NamingConvention;

pub fn handle(stack_name: &str, owner: &str, rule: &str) -> anyhow::Result<()> {
    let naming = NamingConvention::new(owner)?;
    let names = naming.all_names(stack_name, rule)?;

    println!(
        "Names for stack {} (owner {}):",
        stack_name.cyan(),
        naming.owner().cyan()
    );
    let width = names.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    for (key, name) in names {
        println!("  {:width$}  {}", key, name.green(), width = width);
    }

    Ok(())
}
