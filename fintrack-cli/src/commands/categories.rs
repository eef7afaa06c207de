//! Categories command

use anyhow::Result;

use super::{get_context, Logger};
use crate::output;

pub async fn run(json: bool, logger: &Logger) -> Result<()> {
    let ctx = get_context(logger)?;
    let categories = ctx.category_service.list().await?;

    if json {
        return output::print_json(&categories);
    }

    if categories.is_empty() {
        println!("No categories found.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Name", "Slug"]);
    for c in &categories {
        table.add_row(vec![c.id.as_str(), c.name.as_str(), c.slug.as_str()]);
    }
    println!("{}", table);
    Ok(())
}
