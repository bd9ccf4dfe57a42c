use serenity::all::CreateEmbed;

/// Brand colors used across all bot embeds.
pub struct Colors;

impl Colors {
    pub const BRAND: u32 = 0x5865F2;
    pub const SUCCESS: u32 = 0x00FF7F;
    pub const WARNING: u32 = 0xFFD700;
    pub const ERROR: u32 = 0xFF4444;
}

/// Create a standard bot-themed embed with default color, footer, and timestamp.
pub fn brand_embed() -> CreateEmbed {
    base_embed(Colors::BRAND)
}

/// Create a success-themed embed (green).
pub fn success_embed() -> CreateEmbed {
    base_embed(Colors::SUCCESS)
}

/// Create a warning-themed embed (gold).
pub fn warning_embed() -> CreateEmbed {
    base_embed(Colors::WARNING)
}

/// Create an error-themed embed (red).
pub fn error_embed() -> CreateEmbed {
    base_embed(Colors::ERROR)
}

fn base_embed(color: u32) -> CreateEmbed {
    CreateEmbed::default()
        .color(color)
        .footer(serenity::all::CreateEmbedFooter::new("RequestBot"))
        .timestamp(serenity::model::Timestamp::now())
}
