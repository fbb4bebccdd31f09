use anyhow::Result;
use serenity::{
    builder::{CreateCommand, CreateCommandOption},
    model::{application::CommandOptionType, id::GuildId},
    prelude::Context,
};

use crate::audio::filters::FilterPreset;

/// Todos los comandos slash del bot
pub fn all_commands() -> Vec<CreateCommand> {
    vec![
        play_command(),
        pause_command(),
        resume_command(),
        skip_command(),
        stop_command(),
        queue_command(),
        nowplaying_command(),
        shuffle_command(),
        loop_command(),
        remove_command(),
        move_command(),
        clearqueue_command(),
        volume_command(),
        twenty_four_seven_command(),
        filter_command(),
        help_command(),
        ping_command(),
        stats_command(),
        invite_command(),
        support_command(),
    ]
}

/// Registra comandos globales
pub async fn register_global_commands(ctx: &Context) -> Result<()> {
    for command in all_commands() {
        ctx.http.create_global_command(&command).await?;
    }

    Ok(())
}

/// Registra comandos para una guild específica (desarrollo)
pub async fn register_guild_commands(ctx: &Context, guild_id: GuildId) -> Result<()> {
    guild_id.set_commands(&ctx.http, all_commands()).await?;

    Ok(())
}

fn position_option(name: &str, description: &str) -> CreateCommandOption {
    CreateCommandOption::new(CommandOptionType::Integer, name, description)
        .min_int_value(1)
        .required(true)
}

// Comandos de reproducción

fn play_command() -> CreateCommand {
    CreateCommand::new("play")
        .description("Play a song or playlist")
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "query", "Song name or URL")
                .required(true),
        )
}

fn pause_command() -> CreateCommand {
    CreateCommand::new("pause").description("Pause the current track")
}

fn resume_command() -> CreateCommand {
    CreateCommand::new("resume").description("Resume playback")
}

fn skip_command() -> CreateCommand {
    CreateCommand::new("skip").description("Skip the current track")
}

fn stop_command() -> CreateCommand {
    CreateCommand::new("stop").description("Stop playback and clear the queue")
}

// Comandos de cola

fn queue_command() -> CreateCommand {
    CreateCommand::new("queue")
        .description("Show the queue")
        .add_option(
            CreateCommandOption::new(CommandOptionType::Integer, "page", "Page number")
                .min_int_value(1),
        )
}

fn nowplaying_command() -> CreateCommand {
    CreateCommand::new("nowplaying").description("Show the current track")
}

fn shuffle_command() -> CreateCommand {
    CreateCommand::new("shuffle").description("Shuffle the queue")
}

fn loop_command() -> CreateCommand {
    CreateCommand::new("loop")
        .description("Set the loop mode")
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "mode", "Loop mode")
                .add_string_choice("Off", "off")
                .add_string_choice("Track", "track")
                .add_string_choice("Queue", "queue")
                .required(true),
        )
}

fn remove_command() -> CreateCommand {
    CreateCommand::new("remove")
        .description("Remove a track from the queue")
        .add_option(position_option("position", "Position in the queue"))
}

fn move_command() -> CreateCommand {
    CreateCommand::new("move")
        .description("Move a track to another position")
        .add_option(position_option("from", "Current position"))
        .add_option(position_option("to", "New position"))
}

fn clearqueue_command() -> CreateCommand {
    CreateCommand::new("clearqueue").description("Remove every upcoming track")
}

// Comandos de audio

fn volume_command() -> CreateCommand {
    CreateCommand::new("volume")
        .description("Show or set the volume")
        .add_option(
            CreateCommandOption::new(CommandOptionType::Integer, "level", "Volume (0-100)")
                .min_int_value(0)
                .max_int_value(100),
        )
}

fn twenty_four_seven_command() -> CreateCommand {
    CreateCommand::new("247").description("Toggle 24/7 mode")
}

fn filter_command() -> CreateCommand {
    let option = FilterPreset::ALL.iter().fold(
        CreateCommandOption::new(CommandOptionType::String, "preset", "Filter preset").required(true),
        |option, preset| option.add_string_choice(preset.label(), preset.value()),
    );

    CreateCommand::new("filter")
        .description("Apply an audio filter")
        .add_option(option)
}

// Comandos informativos

fn help_command() -> CreateCommand {
    CreateCommand::new("help").description("Show every command")
}

fn ping_command() -> CreateCommand {
    CreateCommand::new("ping").description("Check the bot latency")
}

fn stats_command() -> CreateCommand {
    CreateCommand::new("stats").description("Show bot statistics")
}

fn invite_command() -> CreateCommand {
    CreateCommand::new("invite").description("Get the invite link")
}

fn support_command() -> CreateCommand {
    CreateCommand::new("support").description("Get support links")
}
