use serenity::{
    all::ButtonStyle,
    builder::{CreateActionRow, CreateButton, CreateSelectMenu, CreateSelectMenuKind, CreateSelectMenuOption},
};

use crate::{audio::filters::FilterPreset, bot::handlers::Reply};

/// IDs personalizados para los componentes
pub mod button_ids {
    pub const PAUSE_RESUME: &str = "pause_resume";
    pub const SKIP: &str = "skip";
    pub const STOP: &str = "stop";
    pub const LOOP: &str = "loop";
    pub const QUEUE: &str = "queue";
    pub const FILTER_MENU: &str = "filter";
    pub const REFRESH_HELP: &str = "refresh_help";
    pub const REFRESH_STATS: &str = "refresh_stats";
}

/// Controles del mensaje "reproduciendo ahora"
pub fn player_buttons(paused: bool, disabled: bool) -> CreateActionRow {
    let pause_resume = CreateButton::new(button_ids::PAUSE_RESUME)
        .emoji(if paused { '▶' } else { '⏸' })
        .label(if paused { "Resume" } else { "Pause" })
        .style(ButtonStyle::Primary)
        .disabled(disabled);

    let skip = CreateButton::new(button_ids::SKIP)
        .emoji('⏭')
        .label("Skip")
        .style(ButtonStyle::Secondary)
        .disabled(disabled);

    let stop = CreateButton::new(button_ids::STOP)
        .emoji('⏹')
        .label("Stop")
        .style(ButtonStyle::Danger)
        .disabled(disabled);

    let loop_btn = CreateButton::new(button_ids::LOOP)
        .emoji('🔁')
        .label("Loop")
        .style(ButtonStyle::Secondary)
        .disabled(disabled);

    let queue = CreateButton::new(button_ids::QUEUE)
        .emoji('📜')
        .label("Queue")
        .style(ButtonStyle::Secondary)
        .disabled(disabled);

    CreateActionRow::Buttons(vec![pause_resume, skip, stop, loop_btn, queue])
}

/// Menú desplegable con los filtros disponibles
pub fn filter_menu(disabled: bool) -> CreateActionRow {
    let options = FilterPreset::ALL
        .iter()
        .map(|preset| CreateSelectMenuOption::new(preset.label(), preset.value()))
        .collect();

    let menu = CreateSelectMenu::new(button_ids::FILTER_MENU, CreateSelectMenuKind::String { options })
        .placeholder("🎛️ Apply an audio filter")
        .disabled(disabled);

    CreateActionRow::SelectMenu(menu)
}

/// Componentes completos del mensaje de estado
pub fn now_playing_components(paused: bool, disabled: bool) -> Vec<CreateActionRow> {
    vec![player_buttons(paused, disabled), filter_menu(disabled)]
}

/// Botón para refrescar un embed informativo
pub fn refresh_button(custom_id: &str) -> CreateActionRow {
    CreateActionRow::Buttons(vec![CreateButton::new(custom_id)
        .emoji('🔄')
        .label("Refresh")
        .style(ButtonStyle::Secondary)])
}

/// Botones de enlace hacia soporte y repositorio
pub fn link_buttons(support: Option<&str>, github: Option<&str>) -> Option<CreateActionRow> {
    let buttons: Vec<CreateButton> = [("Support server", support), ("GitHub", github)]
        .into_iter()
        .filter_map(|(label, url)| url.map(|url| CreateButton::new_link(url).label(label)))
        .collect();

    (!buttons.is_empty()).then(|| CreateActionRow::Buttons(buttons))
}

/// Componentes que acompañan la respuesta de un comando
pub fn reply_components(reply: &Reply) -> Vec<CreateActionRow> {
    match reply {
        Reply::Help { .. } => vec![refresh_button(button_ids::REFRESH_HELP)],
        Reply::Stats(_) => vec![refresh_button(button_ids::REFRESH_STATS)],
        Reply::Support { support, github } => link_buttons(support.as_deref(), github.as_deref())
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_info_replies_carry_components() {
        assert_eq!(reply_components(&Reply::Paused).len(), 0);
        assert_eq!(reply_components(&Reply::Help { prefix: None }).len(), 1);
        let support = Reply::Support {
            support: None,
            github: None,
        };
        assert_eq!(reply_components(&support).len(), 0);
    }

    #[test]
    fn link_row_only_when_urls_exist() {
        assert!(link_buttons(None, None).is_none());
        assert!(link_buttons(Some("https://discord.gg/x"), None).is_some());
    }

    #[test]
    fn status_message_has_buttons_and_menu() {
        let rows = now_playing_components(false, true);
        assert_eq!(rows.len(), 2);
        assert!(matches!(rows[0], CreateActionRow::Buttons(ref buttons) if buttons.len() == 5));
        assert!(matches!(rows[1], CreateActionRow::SelectMenu(_)));
    }
}
