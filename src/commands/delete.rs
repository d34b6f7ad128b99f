use anyhow::Result;
use owo_colors::OwoColorize;
use repeatcal_core::EventId;
use repeatcal_core::operations::EventOperations;
use repeatcal_core::store::EventStore;

use crate::render::pluralize;

pub async fn run<S: EventStore>(
    ops: &mut EventOperations<S>,
    id: &str,
    whole_series: bool,
) -> Result<()> {
    ops.refresh().await?;

    let id = EventId::from(id);
    let target = ops
        .find(&id)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Event '{id}' not found"))?;

    if whole_series {
        let series_id = target.series_id().cloned().ok_or_else(|| {
            anyhow::anyhow!(
                "'{}' is not part of a recurring series. Delete it without --series",
                target.seed.title
            )
        })?;
        let count = ops.events().iter().filter(|e| e.belongs_to(&series_id)).count();

        ops.delete_series(&series_id).await?;
        println!(
            "{}",
            format!(
                "  Deleted series: {} ({count} {})",
                target.seed.title,
                pluralize("occurrence", count)
            )
            .red()
        );
    } else {
        ops.delete(&id).await?;
        println!("{}", format!("  Deleted: {}", target.seed.title).red());
    }

    Ok(())
}
