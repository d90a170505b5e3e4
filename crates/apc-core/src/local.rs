//! In-memory host model
//!
//! Behaves like the host for everything the surface touches: duplicating a
//! track inserts the copy after the original and selects it, loading an item
//! appends a device to the selected track's chain, the last track cannot be
//! deleted.

use crate::browser::{Browser, BrowserCategory, BrowserItem};
use crate::error::HostError;
use crate::song::{DeviceInfo, FoldState, MonitoringState, Song, TrackId, TrackKind};
use crate::Host;
use serde::{Deserialize, Serialize};

/// A track held by [`LocalSong`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTrack {
    pub id: TrackId,
    pub name: String,
    pub kind: TrackKind,
    pub monitoring: MonitoringState,
    pub fold: FoldState,
    pub devices: Vec<DeviceInfo>,
}

/// In-memory song
#[derive(Debug, Clone, Default)]
pub struct LocalSong {
    tracks: Vec<LocalTrack>,
    selected: Option<TrackId>,
    next_id: u64,
}

impl LocalSong {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a track and return its id
    ///
    /// The first track added becomes the selection.
    pub fn add_track(&mut self, name: impl Into<String>, kind: TrackKind) -> TrackId {
        let track = self.new_track(name.into(), kind);
        let id = track.id;
        self.tracks.push(track);
        if self.selected.is_none() {
            self.selected = Some(id);
        }
        id
    }

    pub fn track(&self, id: TrackId) -> Option<&LocalTrack> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn track_mut(&mut self, id: TrackId) -> Option<&mut LocalTrack> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    fn new_track(&mut self, name: String, kind: TrackKind) -> LocalTrack {
        let id = TrackId(self.next_id);
        self.next_id += 1;
        LocalTrack {
            id,
            name,
            kind,
            monitoring: MonitoringState::default(),
            fold: FoldState::default(),
            devices: Vec::new(),
        }
    }

    fn get(&self, id: TrackId) -> Result<&LocalTrack, HostError> {
        self.track(id).ok_or(HostError::TrackNotFound(id))
    }

    fn get_mut(&mut self, id: TrackId) -> Result<&mut LocalTrack, HostError> {
        self.track_mut(id).ok_or(HostError::TrackNotFound(id))
    }

    fn check_index(&self, index: usize) -> Result<(), HostError> {
        if index < self.tracks.len() {
            Ok(())
        } else {
            Err(HostError::InvalidTrackIndex {
                index,
                count: self.tracks.len(),
            })
        }
    }
}

impl Song for LocalSong {
    fn tracks(&self) -> Vec<TrackId> {
        self.tracks.iter().map(|t| t.id).collect()
    }

    fn track_index(&self, track: TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == track)
    }

    fn selected_track(&self) -> Option<TrackId> {
        self.selected
    }

    fn select_track(&mut self, track: TrackId) -> Result<(), HostError> {
        self.get(track)?;
        self.selected = Some(track);
        Ok(())
    }

    fn create_midi_track(&mut self, index: Option<usize>) -> Result<TrackId, HostError> {
        let position = match index {
            Some(i) if i > self.tracks.len() => {
                return Err(HostError::InvalidTrackIndex {
                    index: i,
                    count: self.tracks.len(),
                })
            }
            Some(i) => i,
            None => self.tracks.len(),
        };
        let name = format!("{}-MIDI", self.tracks.len() + 1);
        let track = self.new_track(name, TrackKind::Midi);
        let id = track.id;
        self.tracks.insert(position, track);
        log::debug!("LocalSong: created MIDI track {} at {}", id, position);
        Ok(id)
    }

    fn duplicate_track(&mut self, index: usize) -> Result<TrackId, HostError> {
        self.check_index(index)?;
        let original = self.tracks[index].clone();
        let mut copy = self.new_track(original.name.clone(), original.kind);
        copy.monitoring = original.monitoring;
        copy.fold = original.fold;
        copy.devices = original.devices;
        let id = copy.id;
        self.tracks.insert(index + 1, copy);
        self.selected = Some(id);
        log::debug!("LocalSong: duplicated track {} as {}", original.id, id);
        Ok(id)
    }

    fn delete_track(&mut self, index: usize) -> Result<(), HostError> {
        self.check_index(index)?;
        if self.tracks.len() == 1 {
            return Err(HostError::LastTrack);
        }
        let removed = self.tracks.remove(index);
        if self.selected == Some(removed.id) {
            let next = index.min(self.tracks.len() - 1);
            self.selected = Some(self.tracks[next].id);
        }
        log::debug!("LocalSong: deleted track {}", removed.id);
        Ok(())
    }

    fn track_kind(&self, track: TrackId) -> Result<TrackKind, HostError> {
        Ok(self.get(track)?.kind)
    }

    fn monitoring_state(&self, track: TrackId) -> Result<MonitoringState, HostError> {
        Ok(self.get(track)?.monitoring)
    }

    fn set_monitoring_state(
        &mut self,
        track: TrackId,
        state: MonitoringState,
    ) -> Result<(), HostError> {
        let t = self.get_mut(track)?;
        if !t.kind.can_be_armed() {
            return Err(HostError::Unsupported {
                track,
                operation: "input monitoring",
            });
        }
        t.monitoring = state;
        Ok(())
    }

    fn fold_state(&self, track: TrackId) -> Result<FoldState, HostError> {
        Ok(self.get(track)?.fold)
    }

    fn set_fold_state(&mut self, track: TrackId, state: FoldState) -> Result<(), HostError> {
        let t = self.get_mut(track)?;
        if !t.kind.is_foldable() {
            return Err(HostError::Unsupported {
                track,
                operation: "folding",
            });
        }
        t.fold = state;
        Ok(())
    }

    fn devices(&self, track: TrackId) -> Result<Vec<DeviceInfo>, HostError> {
        Ok(self.get(track)?.devices.clone())
    }
}

/// In-memory catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalBrowser {
    pub instruments: Vec<BrowserItem>,
    pub drums: Vec<BrowserItem>,
    pub audio_effects: Vec<BrowserItem>,
}

impl LocalBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the items of one category, consuming self
    pub fn with_category(mut self, category: BrowserCategory, items: Vec<BrowserItem>) -> Self {
        *self.items_mut(category) = items;
        self
    }

    fn items_mut(&mut self, category: BrowserCategory) -> &mut Vec<BrowserItem> {
        match category {
            BrowserCategory::Instruments => &mut self.instruments,
            BrowserCategory::Drums => &mut self.drums,
            BrowserCategory::AudioEffects => &mut self.audio_effects,
        }
    }
}

impl Browser for LocalBrowser {
    fn category(&self, category: BrowserCategory) -> &[BrowserItem] {
        match category {
            BrowserCategory::Instruments => &self.instruments,
            BrowserCategory::Drums => &self.drums,
            BrowserCategory::AudioEffects => &self.audio_effects,
        }
    }
}

/// In-memory host: song + catalog + item loading
#[derive(Debug, Clone, Default)]
pub struct LocalHost {
    pub song: LocalSong,
    pub browser: LocalBrowser,
    /// Every item loaded so far, with the track it landed on
    pub loaded: Vec<(TrackId, String)>,
}

impl LocalHost {
    pub fn new(song: LocalSong, browser: LocalBrowser) -> Self {
        Self {
            song,
            browser,
            loaded: Vec::new(),
        }
    }
}

impl Host for LocalHost {
    type Song = LocalSong;
    type Browser = LocalBrowser;

    fn song(&self) -> &LocalSong {
        &self.song
    }

    fn song_mut(&mut self) -> &mut LocalSong {
        &mut self.song
    }

    fn browser(&self) -> &LocalBrowser {
        &self.browser
    }

    fn load_item(&mut self, item: &BrowserItem) -> Result<(), HostError> {
        let track = self.song.selected_track().ok_or(HostError::NoSelectedTrack)?;
        let target = self.song.get_mut(track)?;
        target.devices.push(DeviceInfo {
            name: item.name.clone(),
            uri: item.uri.clone(),
        });
        self.loaded.push((track, item.name.clone()));
        log::debug!("LocalHost: loaded '{}' onto track {}", item.name, track);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song_with(kinds: &[TrackKind]) -> (LocalSong, Vec<TrackId>) {
        let mut song = LocalSong::new();
        let ids = kinds
            .iter()
            .enumerate()
            .map(|(i, kind)| song.add_track(format!("Track {}", i + 1), *kind))
            .collect();
        (song, ids)
    }

    #[test]
    fn test_first_track_is_selected() {
        let (song, ids) = song_with(&[TrackKind::Midi, TrackKind::Audio]);
        assert_eq!(song.selected_track(), Some(ids[0]));
    }

    #[test]
    fn test_duplicate_inserts_after_and_selects() {
        let (mut song, ids) = song_with(&[TrackKind::Midi, TrackKind::Audio]);
        song.set_monitoring_state(ids[0], MonitoringState::In).unwrap();

        let copy = song.duplicate_track(0).unwrap();

        assert_eq!(song.tracks(), vec![ids[0], copy, ids[1]]);
        assert_eq!(song.selected_track(), Some(copy));
        assert_eq!(song.monitoring_state(copy).unwrap(), MonitoringState::In);
    }

    #[test]
    fn test_delete_moves_selection() {
        let (mut song, ids) = song_with(&[TrackKind::Midi, TrackKind::Audio]);
        song.delete_track(0).unwrap();
        assert_eq!(song.tracks(), vec![ids[1]]);
        assert_eq!(song.selected_track(), Some(ids[1]));

        assert_eq!(song.delete_track(0), Err(HostError::LastTrack));
        assert!(matches!(
            song.delete_track(4),
            Err(HostError::InvalidTrackIndex { index: 4, count: 1 })
        ));
    }

    #[test]
    fn test_create_midi_track_appends() {
        let (mut song, ids) = song_with(&[TrackKind::Audio]);
        let created = song.create_midi_track(None).unwrap();
        assert_eq!(song.tracks(), vec![ids[0], created]);
        assert_eq!(song.track_kind(created).unwrap(), TrackKind::Midi);
        // Creation does not move the selection
        assert_eq!(song.selected_track(), Some(ids[0]));
    }

    #[test]
    fn test_state_guards() {
        let (mut song, ids) = song_with(&[TrackKind::Return, TrackKind::Midi]);
        assert!(song
            .set_monitoring_state(ids[0], MonitoringState::Off)
            .is_err());
        assert!(song.set_fold_state(ids[1], FoldState::Folded).is_err());
        assert!(!song.can_be_armed(ids[0]).unwrap());
        assert!(song.can_be_armed(ids[1]).unwrap());
    }

    #[test]
    fn test_load_item_targets_selected_track() {
        let (mut song, ids) = song_with(&[TrackKind::Midi, TrackKind::Audio]);
        song.select_track(ids[1]).unwrap();
        let mut host = LocalHost::new(song, LocalBrowser::new());

        host.load_item(&BrowserItem::new("Reverb", "query:AudioFx#Reverb"))
            .unwrap();

        let devices = host.song().devices(ids[1]).unwrap();
        assert_eq!(devices.last().map(|d| d.name.as_str()), Some("Reverb"));
        assert!(host.song().devices(ids[0]).unwrap().is_empty());
        assert_eq!(host.loaded, vec![(ids[1], "Reverb".to_string())]);
    }

    #[test]
    fn test_browser_yaml() {
        let yaml = r#"
instruments:
  - name: "Wavetable"
    uri: "query:Synths#Wavetable"
    children:
      - name: "Basic Shapes"
        uri: "query:Synths#Wavetable:Basic%20Shapes"
audio_effects:
  - name: "Reverb"
    uri: "query:AudioFx#Reverb"
"#;
        let browser: LocalBrowser = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(browser.category(BrowserCategory::Instruments).len(), 1);
        assert!(browser.category(BrowserCategory::Drums).is_empty());
        assert_eq!(
            browser.category(BrowserCategory::Instruments)[0].children[0].name,
            "Basic Shapes"
        );
        assert!(browser.category(BrowserCategory::AudioEffects)[0].is_leaf());
    }
}
