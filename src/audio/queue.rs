use rand::{seq::SliceRandom, Rng};
use std::{collections::VecDeque, time::Duration};
use tracing::{debug, info};

use super::track::Track;

/// Cola FIFO de pistas pendientes. Los índices son base 0; la conversión
/// desde las posiciones base 1 del usuario la hace la sesión.
#[derive(Debug, Default, Clone)]
pub struct MusicQueue {
    items: VecDeque<Track>,
}

impl MusicQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Agrega un track al final de la cola
    pub fn push(&mut self, track: Track) {
        debug!("➕ Agregado a la cola: {}", track.title);
        self.items.push_back(track);
    }

    /// Agrega múltiples tracks (playlist) conservando su orden
    pub fn extend(&mut self, tracks: impl IntoIterator<Item = Track>) -> usize {
        let before = self.items.len();
        self.items.extend(tracks);
        let added = self.items.len() - before;
        info!("➕ Agregadas {} canciones a la cola", added);
        added
    }

    /// Saca el siguiente track (FIFO)
    pub fn pop_front(&mut self) -> Option<Track> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.items.iter()
    }

    /// Elimina el track en `index`; `None` si está fuera de rango
    pub fn remove(&mut self, index: usize) -> Option<Track> {
        let removed = self.items.remove(index)?;
        debug!("❌ Track eliminado en posición {}", index);
        Some(removed)
    }

    /// Mueve un track a una nueva posición. Devuelve `None` si alguno de
    /// los índices está fuera de rango, sin tocar la cola.
    pub fn move_track(&mut self, from: usize, to: usize) -> Option<&Track> {
        if from >= self.items.len() || to >= self.items.len() {
            return None;
        }

        if from != to {
            let item = self.items.remove(from)?;
            self.items.insert(to, item);
            debug!("📍 Track movido de posición {} a {}", from, to);
        }

        self.items.get(to)
    }

    /// Mezcla la cola (Fisher-Yates)
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.items.make_contiguous().shuffle(rng);
        info!("🔀 Cola mezclada");
    }

    /// Limpia la cola y devuelve cuántos tracks había
    pub fn clear(&mut self) -> usize {
        let count = self.items.len();
        self.items.clear();
        info!("🗑️ Cola limpiada ({} canciones)", count);
        count
    }

    pub fn total_duration(&self) -> Duration {
        self.items.iter().filter_map(|item| item.duration).sum()
    }

    /// Obtiene una página específica de la cola, páginas base 1
    pub fn page(&self, page: usize, items_per_page: usize) -> QueuePage {
        let items_per_page = items_per_page.max(1);
        let total_items = self.items.len();
        let total_pages = total_items.div_ceil(items_per_page).max(1);
        let current_page = page.clamp(1, total_pages);
        let start = (current_page - 1) * items_per_page;

        QueuePage {
            items: self
                .items
                .iter()
                .skip(start)
                .take(items_per_page)
                .cloned()
                .collect(),
            first_position: start + 1,
            current_page,
            total_pages,
            total_items,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueuePage {
    pub items: Vec<Track>,
    /// Posición (base 1) del primer elemento de la página
    pub first_position: usize,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl QueuePage {
    /// Tracks que no entran en esta página ni en las anteriores
    pub fn remaining_after(&self) -> usize {
        self.total_items
            .saturating_sub(self.first_position - 1 + self.items.len())
    }
}
