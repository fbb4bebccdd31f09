//! # Bot Module
//!
//! Discord surface of the music bot.
//!
//! [`MusicBot`] implements Serenity's [`EventHandler`] and turns gateway
//! events into normalized [`handlers::Command`]s:
//!
//! - Slash commands and prefix messages become commands for the
//!   [`handlers::Dispatcher`]
//! - Buttons and the filter menu on the status message map to the same
//!   commands
//! - Voice state updates detect the bot being kicked from its channel
//!
//! Audio node events take a separate path through [`events::EventRelay`].

use anyhow::Result;
use serenity::{
    all::{
        ActivityData, ChannelId, CommandDataOptionValue, CommandInteraction, ComponentInteraction,
        ComponentInteractionDataKind, Context, EventHandler, GuildId, Interaction, Message, Ready,
        UserId, VoiceState,
    },
    async_trait,
    builder::{
        CreateInteractionResponse, CreateInteractionResponseMessage, CreateMessage,
        EditInteractionResponse, EditMessage,
    },
};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::{debug, error, info, warn};

pub mod commands;
pub mod events;
pub mod handlers;
pub mod notifier;

use crate::{
    config::Config,
    ui::{
        buttons::{now_playing_components, reply_components},
        embeds::{create_error_embed, reply_embed},
    },
};
use handlers::{Command, Dispatcher, GatewayInfo, Invocation, Reply, SlashOptions, SlashValue};

pub struct MusicBot {
    config: Arc<Config>,
    dispatcher: Arc<Dispatcher>,
}

impl MusicBot {
    pub fn new(config: Arc<Config>, dispatcher: Arc<Dispatcher>) -> Self {
        Self { config, dispatcher }
    }

    /// Registra los comandos slash, por guild si `GUILD_ID` está definido
    async fn register_commands(&self, ctx: &Context) -> Result<()> {
        info!("📝 Registrando comandos slash...");

        match self.config.guild_id {
            Some(guild_id) => {
                let guild_id = GuildId::new(guild_id);
                info!("🏠 Registrando comandos para guild específica: {}", guild_id);
                commands::register_guild_commands(ctx, guild_id).await?;
                info!("✅ Comandos de guild registrados para: {}", guild_id);
            }
            None => {
                info!("🌐 Registrando comandos globalmente");
                commands::register_global_commands(ctx).await?;
                info!("✅ Comandos globales registrados");
            }
        }

        Ok(())
    }

    fn invocation(
        &self,
        ctx: &Context,
        guild_id: GuildId,
        channel_id: ChannelId,
        user_id: UserId,
        latency: Option<Duration>,
    ) -> Invocation {
        Invocation {
            guild_id,
            channel_id,
            user_id,
            voice_channel: voice_channel_of(ctx, guild_id, user_id),
            gateway: GatewayInfo {
                guild_count: ctx.cache.guild_count(),
                latency,
            },
        }
    }

    async fn handle_command(&self, ctx: &Context, command: CommandInteraction) -> Result<()> {
        let Some(guild_id) = command.guild_id else {
            let response = CreateInteractionResponseMessage::new()
                .embed(create_error_embed("Error", "Commands only work inside a server."))
                .ephemeral(true);
            command
                .create_response(&ctx.http, CreateInteractionResponse::Message(response))
                .await?;
            return Ok(());
        };

        // El tiempo del defer sirve como latencia de la API
        let started = Instant::now();
        command.defer(&ctx.http).await?;
        let latency = started.elapsed();

        let options: SlashOptions = command
            .data
            .options
            .iter()
            .filter_map(|option| {
                let value = match &option.value {
                    CommandDataOptionValue::String(value) => SlashValue::Str(value.clone()),
                    CommandDataOptionValue::Integer(value) => SlashValue::Int(*value),
                    _ => return None,
                };
                Some((option.name.clone(), value))
            })
            .collect();

        let reply = match Command::from_slash(&command.data.name, &options) {
            Some(Ok(parsed)) => {
                let invocation =
                    self.invocation(ctx, guild_id, command.channel_id, command.user.id, Some(latency));
                self.dispatcher.execute(&invocation, parsed).await
            }
            Some(Err(e)) => e.into(),
            None => {
                warn!("Comando desconocido: {}", command.data.name);
                Reply::Failed("Unknown command.".to_string())
            }
        };

        command
            .edit_response(
                &ctx.http,
                EditInteractionResponse::new()
                    .embed(reply_embed(&reply))
                    .components(reply_components(&reply)),
            )
            .await?;
        Ok(())
    }

    async fn handle_component(&self, ctx: &Context, component: ComponentInteraction) -> Result<()> {
        let Some(guild_id) = component.guild_id else {
            return Ok(());
        };

        let values = match &component.data.kind {
            ComponentInteractionDataKind::StringSelect { values } => values.clone(),
            _ => Vec::new(),
        };
        let Some(command) = Command::from_component(&component.data.custom_id, &values) else {
            debug!("Componente ignorado: {}", component.data.custom_id);
            return Ok(());
        };

        // Los botones de refresco reemplazan el mensaje en el lugar
        if matches!(command, Command::Help | Command::Stats) {
            let invocation = self.invocation(ctx, guild_id, component.channel_id, component.user.id, None);
            let reply = self.dispatcher.execute(&invocation, command).await;
            let response = CreateInteractionResponseMessage::new()
                .embed(reply_embed(&reply))
                .components(reply_components(&reply));
            component
                .create_response(&ctx.http, CreateInteractionResponse::UpdateMessage(response))
                .await?;
            return Ok(());
        }

        component.defer_ephemeral(&ctx.http).await?;

        let disables_message = matches!(command, Command::Skip | Command::Stop);
        let invocation = self.invocation(ctx, guild_id, component.channel_id, component.user.id, None);
        let reply = self.dispatcher.execute(&invocation, command).await;

        if disables_message && !reply.is_failure() {
            let edit = EditMessage::new().components(now_playing_components(false, true));
            if let Err(e) = component
                .channel_id
                .edit_message(&ctx.http, component.message.id, edit)
                .await
            {
                warn!("⚠️ No se pudieron desactivar los controles: {}", e);
            }
        }

        component
            .edit_response(&ctx.http, EditInteractionResponse::new().embed(reply_embed(&reply)))
            .await?;
        Ok(())
    }

    async fn handle_prefix(&self, ctx: &Context, msg: &Message) -> Result<()> {
        let Some(guild_id) = msg.guild_id else {
            return Ok(());
        };
        let Some(parsed) = Command::from_prefix(&msg.content, &self.config.prefix) else {
            return Ok(());
        };

        let reply = match parsed {
            Ok(command) => {
                let latency = if command == Command::Ping {
                    let started = Instant::now();
                    msg.channel_id.broadcast_typing(&ctx.http).await?;
                    Some(started.elapsed())
                } else {
                    None
                };
                let invocation = self.invocation(ctx, guild_id, msg.channel_id, msg.author.id, latency);
                self.dispatcher.execute(&invocation, command).await
            }
            Err(e) => e.into(),
        };

        let message = CreateMessage::new()
            .embed(reply_embed(&reply))
            .components(reply_components(&reply))
            .reference_message(msg);
        msg.channel_id.send_message(&ctx.http, message).await?;
        Ok(())
    }
}

/// Canal de voz en el que está el usuario, según la caché
fn voice_channel_of(ctx: &Context, guild_id: GuildId, user_id: UserId) -> Option<ChannelId> {
    let guild = ctx.cache.guild(guild_id)?;
    let channel = guild.voice_states.get(&user_id)?.channel_id;
    channel
}

#[async_trait]
impl EventHandler for MusicBot {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🤖 {} está en línea!", ready.user.name);
        info!("📊 Conectado a {} servidores", ready.guilds.len());

        if let Err(e) = self.register_commands(&ctx).await {
            error!("❌ Error al registrar comandos: {:?}", e);
        }

        ctx.set_activity(Some(ActivityData::listening("/play")));
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Command(command) => {
                if let Err(e) = self.handle_command(&ctx, command).await {
                    error!("Error manejando comando: {:?}", e);
                }
            }
            Interaction::Component(component) => {
                if let Err(e) = self.handle_component(&ctx, component).await {
                    error!("Error manejando componente: {:?}", e);
                }
            }
            _ => {}
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if !self.config.enable_prefix || msg.author.bot {
            return;
        }
        if let Err(e) = self.handle_prefix(&ctx, &msg).await {
            error!("Error manejando comando con prefijo: {:?}", e);
        }
    }

    async fn voice_state_update(&self, ctx: Context, old: Option<VoiceState>, new: VoiceState) {
        // Detectar si el bot fue desconectado
        let current_user_id = ctx.cache.current_user().id;
        if new.user_id == current_user_id && old.is_some() && new.channel_id.is_none() {
            if let Some(guild_id) = new.guild_id {
                info!("🔌 Bot desconectado en guild {}", guild_id);
                self.dispatcher.player().voice_disconnected(guild_id).await;
            }
        }
    }
}
