use serenity::{
    all::Timestamp,
    builder::{CreateEmbed, CreateEmbedFooter},
};
use std::time::Duration;

use crate::{
    audio::{node::Notice, player::SessionSnapshot, queue::QueuePage, track::Track},
    bot::handlers::{BotStats, Reply},
};

/// Paleta de colores estandarizada para el bot
pub mod colors {
    use serenity::all::Colour;

    pub const SUCCESS_GREEN: Colour = Colour::from_rgb(67, 181, 129);
    pub const ERROR_RED: Colour = Colour::from_rgb(220, 53, 69);
    pub const WARNING_ORANGE: Colour = Colour::from_rgb(255, 193, 7);
    pub const INFO_BLUE: Colour = Colour::from_rgb(52, 144, 220);
    pub const MUSIC_PURPLE: Colour = Colour::from_rgb(138, 43, 226);
    pub const NEUTRAL_GRAY: Colour = Colour::from_rgb(108, 117, 125);
}

/// Footer estandarizado para todos los embeds
const STANDARD_FOOTER: &str = "🎵 Music Bot";

fn base(title: &str, colour: serenity::all::Colour) -> CreateEmbed {
    CreateEmbed::default()
        .title(title)
        .color(colour)
        .timestamp(Timestamp::now())
        .footer(CreateEmbedFooter::new(STANDARD_FOOTER))
}

pub fn create_error_embed(title: &str, description: &str) -> CreateEmbed {
    base(&format!("❌ {}", title), colors::ERROR_RED).description(description)
}

pub fn create_success_embed(title: &str, description: &str) -> CreateEmbed {
    base(&format!("✅ {}", title), colors::SUCCESS_GREEN).description(description)
}

pub fn create_info_embed(title: &str, description: &str) -> CreateEmbed {
    base(title, colors::INFO_BLUE).description(description)
}

/// Embed del mensaje de estado "reproduciendo ahora"
pub fn create_now_playing_embed(track: &Track, paused: bool) -> CreateEmbed {
    let title = if paused { "⏸️ Paused" } else { "🎵 Now Playing" };
    let mut embed = base(title, colors::MUSIC_PURPLE)
        .description(format!("**{}**", track_link(track)))
        .field("🎤 Artist", artist(track), true)
        .field("⏱️ Duration", duration_label(track), true)
        .field("👤 Requested by", format!("<@{}>", track.requester), true);

    if let Some(artwork) = &track.artwork_url {
        embed = embed.thumbnail(artwork);
    }
    embed
}

/// Renderiza los avisos que publica el reproductor por su cuenta
pub fn notice_embed(notice: &Notice) -> CreateEmbed {
    match notice {
        Notice::NowPlaying { track, paused, .. } => create_now_playing_embed(track, *paused),
        Notice::QueueEnded => base("📭 Queue finished", colors::NEUTRAL_GRAY)
            .description("No more tracks in the queue. Use `/play` to add more."),
        Notice::PlayerError { message } => create_error_embed("Player error", message),
        Notice::TrackException { title, message } => base("⚠️ Track error", colors::WARNING_ORANGE)
            .description(format!("Could not play **{}**: {}", title, message)),
        Notice::TrackStuck { title } => base("⚠️ Track stuck", colors::WARNING_ORANGE)
            .description(format!("**{}** got stuck and was skipped.", title)),
    }
}

/// Renderiza la respuesta de un comando
pub fn reply_embed(reply: &Reply) -> CreateEmbed {
    match reply {
        Reply::Started { track } => create_now_playing_embed(track, false),
        Reply::Queued { track, position } => create_track_added_embed(track, *position),
        Reply::PlaylistQueued { name, count, started } => {
            let mut description = format!("Added **{}** tracks from **{}**", count, name);
            if let Some(track) = started {
                description.push_str(&format!("\nNow playing: **{}**", track_link(track)));
            }
            create_success_embed("Playlist queued", &description)
        }
        Reply::NoResults { query } => {
            create_error_embed("No results", &format!("Nothing found for `{}`.", query))
        }
        Reply::Paused => create_success_embed("Paused", "Playback paused."),
        Reply::Resumed => create_success_embed("Resumed", "Playback resumed."),
        Reply::Skipped { next: Some(track) } => {
            create_success_embed("Skipped", &format!("Now playing **{}**", track_link(track)))
        }
        Reply::Skipped { next: None } => create_success_embed("Skipped", "That was the last track."),
        Reply::Stopped => create_success_embed("Stopped", "Playback stopped and the queue was cleared."),
        Reply::Queue { snapshot, page } => create_queue_embed(snapshot, page),
        Reply::NowPlaying(snapshot) => create_now_playing_snapshot_embed(snapshot),
        Reply::Shuffled { count } => {
            create_success_embed("Shuffled", &format!("Shuffled **{}** tracks.", count))
        }
        Reply::Loop(mode) => create_success_embed("Loop mode", &format!("Loop mode set to **{}**.", mode)),
        Reply::Removed { position, track } => create_success_embed(
            "Removed",
            &format!("Removed **{}** from position {}.", track.title, position),
        ),
        Reply::Moved { track, from, to } => create_success_embed(
            "Moved",
            &format!("Moved **{}** from position {} to {}.", track.title, from, to),
        ),
        Reply::Cleared { count } => {
            create_success_embed("Queue cleared", &format!("Removed **{}** tracks.", count))
        }
        Reply::Volume { level } => create_volume_embed(*level),
        Reply::Persistent(enabled) => create_success_embed(
            "24/7 mode",
            if *enabled {
                "24/7 mode **enabled**. I will stay in the voice channel."
            } else {
                "24/7 mode **disabled**."
            },
        ),
        Reply::Filter(preset) => {
            create_success_embed("Filter applied", &format!("Now using **{}**.", preset.label()))
        }
        Reply::Help { prefix } => create_help_embed(prefix.as_deref()),
        Reply::Pong { latency } => create_info_embed(
            "🏓 Pong!",
            &format!(
                "API latency: **{}**",
                latency.map_or("unknown".to_string(), |l| format!("{}ms", l.as_millis()))
            ),
        ),
        Reply::Stats(stats) => create_stats_embed(stats),
        Reply::Invite(Some(url)) => create_info_embed("📨 Invite", &format!("[Add me to your server]({})", url)),
        Reply::Invite(None) => create_error_embed("Invite", "The invite link is not configured."),
        Reply::Support { support, github } => {
            let mut lines = Vec::new();
            if let Some(url) = support {
                lines.push(format!("💬 [Support server]({})", url));
            }
            if let Some(url) = github {
                lines.push(format!("🐙 [GitHub]({})", url));
            }
            if lines.is_empty() {
                lines.push("No support links are configured.".to_string());
            }
            create_info_embed("🛟 Support", &lines.join("\n"))
        }
        Reply::Usage(usage) => create_error_embed("Invalid usage", usage),
        Reply::Failed(message) => create_error_embed("Error", message),
    }
}

pub fn create_track_added_embed(track: &Track, position: usize) -> CreateEmbed {
    let mut embed = create_success_embed("Added to queue", &format!("**{}**", track_link(track)))
        .field("🎤 Artist", artist(track), true)
        .field("⏱️ Duration", duration_label(track), true)
        .field("📍 Position", position.to_string(), true);

    if let Some(artwork) = &track.artwork_url {
        embed = embed.thumbnail(artwork);
    }
    embed
}

fn create_now_playing_snapshot_embed(snapshot: &SessionSnapshot) -> CreateEmbed {
    let Some(track) = &snapshot.current else {
        return create_error_embed("Error", "Nothing is playing right now.");
    };
    create_now_playing_embed(track, snapshot.paused)
        .field("🔁 Loop", snapshot.loop_mode.to_string(), true)
        .field("🔊 Volume", format!("{}%", snapshot.volume), true)
        .field("📜 Up next", format!("{} track(s)", snapshot.queue_len), true)
}

pub fn create_queue_embed(snapshot: &SessionSnapshot, page: &QueuePage) -> CreateEmbed {
    let mut description = String::new();

    if let Some(current) = &snapshot.current {
        description.push_str(&format!(
            "**Now playing:**\n{} `{}`\n\n",
            track_link(current),
            duration_label(current)
        ));
    }

    if page.items.is_empty() {
        description.push_str("*The queue is empty.*");
    } else {
        description.push_str("**Up next:**\n");
        for (offset, track) in page.items.iter().enumerate() {
            description.push_str(&format!(
                "`{}.` {} `{}`\n",
                page.first_position + offset,
                track_link(track),
                duration_label(track)
            ));
        }
    }

    let remaining = page.remaining_after();
    if remaining > 0 {
        description.push_str(&format!("\n...and {} more", remaining));
    }

    base("📜 Queue", colors::INFO_BLUE)
        .description(description)
        .field("Tracks", page.total_items.to_string(), true)
        .field("Total duration", format_duration(snapshot.queue_duration), true)
        .field("Loop", snapshot.loop_mode.to_string(), true)
        .footer(CreateEmbedFooter::new(format!(
            "Page {}/{} • {}",
            page.current_page,
            page.total_pages.max(1),
            STANDARD_FOOTER
        )))
}

pub fn create_volume_embed(level: u8) -> CreateEmbed {
    let emoji = match level {
        0 => "🔇",
        1..=30 => "🔈",
        31..=70 => "🔉",
        _ => "🔊",
    };
    base(&format!("{} Volume", emoji), colors::SUCCESS_GREEN)
        .description(format!("{} **{}%**", create_volume_bar(level), level))
}

pub fn create_help_embed(prefix: Option<&str>) -> CreateEmbed {
    let mut embed = base("🎵 Music Bot - Commands", colors::INFO_BLUE)
        .field(
            "🎵 Playback",
            "• `/play <query>` - Play a song or playlist\n\
            • `/pause` / `/resume` - Pause or resume\n\
            • `/skip` - Skip the current track\n\
            • `/stop` - Stop and clear the queue\n\
            • `/nowplaying` - Show the current track",
            false,
        )
        .field(
            "📜 Queue",
            "• `/queue [page]` - Show the queue\n\
            • `/shuffle` - Shuffle the queue\n\
            • `/loop <off|track|queue>` - Set the loop mode\n\
            • `/remove <position>` - Remove a track\n\
            • `/move <from> <to>` - Move a track\n\
            • `/clearqueue` - Clear the queue",
            false,
        )
        .field(
            "🎛️ Audio",
            "• `/volume [level]` - Show or set the volume\n\
            • `/filter <preset>` - Apply an audio filter\n\
            • `/247` - Toggle 24/7 mode",
            false,
        )
        .field(
            "ℹ️ Info",
            "• `/ping` • `/stats` • `/invite` • `/support`",
            false,
        );

    if let Some(prefix) = prefix {
        embed = embed.description(format!(
            "Every command also works with the `{}` prefix, e.g. `{}play lofi`.",
            prefix, prefix
        ));
    }
    embed
}

pub fn create_stats_embed(stats: &BotStats) -> CreateEmbed {
    let uptime = Duration::from_secs(stats.uptime.as_secs());
    base("📊 Statistics", colors::MUSIC_PURPLE)
        .field("🏠 Servers", stats.guilds.to_string(), true)
        .field("🔊 Active players", stats.sessions.to_string(), true)
        .field("🎵 Playing", stats.playing.to_string(), true)
        .field("⏱️ Uptime", humantime::format_duration(uptime).to_string(), true)
        .field("📦 Version", stats.version, true)
}

fn track_link(track: &Track) -> String {
    match &track.uri {
        Some(uri) => format!("[{}]({})", track.title, uri),
        None => track.title.clone(),
    }
}

fn artist(track: &Track) -> &str {
    if track.author.is_empty() {
        "Unknown"
    } else {
        &track.author
    }
}

fn duration_label(track: &Track) -> String {
    track
        .duration
        .map(format_duration)
        .unwrap_or_else(|| "🔴 Live".to_string())
}

fn create_volume_bar(level: u8) -> String {
    let segments = 10;
    let filled = (level as usize * segments).div_ceil(100).min(segments);
    let empty = segments - filled;

    let bar = "█".repeat(filled) + &"▒".repeat(empty);
    format!("`[{}]`", bar)
}

/// Formatea una duración en formato legible
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}
