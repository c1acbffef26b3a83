//! Icons used by the panel renderer.

use console::Emoji;

// Status indicators
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static HOURGLASS: Emoji<'_, '_> = Emoji("⏳ ", "[..]");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[i]");

// Route indicators
pub static MAP: Emoji<'_, '_> = Emoji("🗺️  ", "[MAP]");
pub static PICKUP: Emoji<'_, '_> = Emoji("📦 ", "[FROM]");
pub static DELIVERY: Emoji<'_, '_> = Emoji("🏁 ", "[TO]");
