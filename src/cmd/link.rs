//! Directions link builder: `route-panel link <START> <END>`.

use anyhow::{Context, Result};

pub fn cmd_link(start: &str, end: &str, open: bool, check: bool) -> Result<()> {
    use route_panel::link;

    let url = link::build(start, end);
    if url.is_empty() {
        anyhow::bail!("Both a start and an end address are required");
    }
    println!("{}", url);

    if check {
        let (origin, destination) =
            link::decode_query(&url).context("Built link has no origin or destination")?;
        if origin != start || destination != end {
            anyhow::bail!(
                "Link does not round-trip: got origin '{}' and destination '{}'",
                origin,
                destination
            );
        }
        println!("origin: {}", origin);
        println!("destination: {}", destination);
    }

    if open {
        open_in_browser(&url)?;
    }
    Ok(())
}

/// Open `url` in a new browser context.
pub fn open_in_browser(url: &str) -> Result<()> {
    open::that(url).with_context(|| format!("Failed to open {} in the browser", url))
}
