//! Helpers keeping the playlist and its shuffled view consistent.

use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::library::Track;

/// Locate `track` in `list`: the shared pointer first, then the name.
pub(crate) fn position_of(list: &[Arc<Track>], track: &Arc<Track>) -> Option<usize> {
    list.iter()
        .position(|t| Arc::ptr_eq(t, track))
        .or_else(|| list.iter().position(|t| t.name == track.name))
}

/// A uniform permutation of `playlist` with `front` (if present) moved to position 0.
pub(crate) fn shuffled_with_front<R: Rng + ?Sized>(
    playlist: &[Arc<Track>],
    front: Option<&Arc<Track>>,
    rng: &mut R,
) -> Vec<Arc<Track>> {
    let mut order = playlist.to_vec();
    order.shuffle(rng);

    if let Some(pos) = front.and_then(|t| position_of(&order, t)) {
        let track = order.remove(pos);
        order.insert(0, track);
    }
    order
}

/// Rebuild `shuffled` out of the playlist's own shared tracks, matching by name.
///
/// Returns `None` when `shuffled` is not a permutation of `playlist`.
pub(crate) fn relink(playlist: &[Arc<Track>], shuffled: &[Arc<Track>]) -> Option<Vec<Arc<Track>>> {
    if playlist.len() != shuffled.len() {
        return None;
    }

    let mut used = vec![false; playlist.len()];
    let mut view = Vec::with_capacity(shuffled.len());
    for track in shuffled {
        let i = (0..playlist.len()).find(|&i| !used[i] && playlist[i].name == track.name)?;
        used[i] = true;
        view.push(Arc::clone(&playlist[i]));
    }
    Some(view)
}
