//! Device-loading plugin surface
//!
//! The second surface on the same hardware. Its only job is the pad grid:
//! at setup it loads the pad mapping file and lights the mapped pads, then
//! every pad press loads the mapped device (and preset) into the set.
//!
//! # Event flow
//!
//! ```text
//! APC64 → midir callback → flume channel → PluginSurface::drain → PadDispatcher → Host
//! ```

use crate::capabilities::all_pads;
use crate::config::{default_config_path, load_surface_config, SurfaceConfig};
use crate::connection::MidiConnection;
use crate::dispatcher::{PadDispatcher, PadOutcome};
use crate::feedback::{LedSink, MidiOutputHandler, PadLights, Rgb};
use crate::input::{MidiInputEvent, MidiInputHandler};
use crate::mapping::load_mappings;
use crate::SurfaceError;
use apc_core::Host;
use flume::Receiver;
use std::path::Path;

/// Capacity of the callback → surface event channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

pub struct PluginSurface<S: LedSink> {
    config: SurfaceConfig,
    lights: PadLights<S>,
    /// Present once setup has loaded the mapping file
    dispatcher: Option<PadDispatcher>,
}

impl<S: LedSink> PluginSurface<S> {
    pub fn new(config: SurfaceConfig, sink: S) -> Self {
        Self {
            config,
            lights: PadLights::new(sink),
            dispatcher: None,
        }
    }

    /// Create a surface from a YAML settings file (defaults if missing)
    pub fn from_settings_file(path: &Path, sink: S) -> Self {
        Self::new(load_surface_config(path), sink)
    }

    /// Load the mapping file and show which pads are assigned
    ///
    /// A missing or malformed mapping file fails setup; the surface stays
    /// inert rather than running with a partial table.
    pub fn setup(&mut self) -> Result<(), SurfaceError> {
        let path = self.config.mapping_path();
        let table = load_mappings(&path)?;
        log::info!(
            "plugin: loaded {} pad mappings from {:?}",
            table.len(),
            path
        );

        let dispatcher = PadDispatcher::new(table)
            .with_acknowledge_color(Rgb::new(self.config.acknowledge_color));
        dispatcher.initialize_lights(&mut self.lights, all_pads());
        self.dispatcher = Some(dispatcher);
        Ok(())
    }

    pub fn is_set_up(&self) -> bool {
        self.dispatcher.is_some()
    }

    pub fn dispatcher(&self) -> Option<&PadDispatcher> {
        self.dispatcher.as_ref()
    }

    pub fn lights(&self) -> &PadLights<S> {
        &self.lights
    }

    /// Handle one parsed event; anything but a pad note is ignored
    pub fn handle_event<H: Host>(&mut self, host: &mut H, event: &MidiInputEvent) -> PadOutcome {
        let (Some(dispatcher), Some(pad)) = (self.dispatcher.as_ref(), event.pad_event()) else {
            return PadOutcome::Ignored;
        };
        dispatcher.on_pad_event(host, &mut self.lights, pad.index, pad.velocity)
    }

    /// Handle raw MIDI bytes from the controller
    pub fn handle_midi<H: Host>(&mut self, host: &mut H, data: &[u8]) -> PadOutcome {
        match MidiInputEvent::parse(data) {
            Some(event) => self.handle_event(host, &event),
            None => PadOutcome::Ignored,
        }
    }

    /// Handle every pending event; returns how many were received
    pub fn drain<H: Host>(&mut self, host: &mut H, events: &Receiver<MidiInputEvent>) -> usize {
        let mut count = 0;
        while let Ok(event) = events.try_recv() {
            self.handle_event(host, &event);
            count += 1;
        }
        count
    }

    /// Turn the pads off
    pub fn disconnect(&mut self) {
        self.lights.clear_all();
        self.dispatcher = None;
        log::info!("plugin: disconnected");
    }
}

/// A plugin surface attached to real MIDI ports
pub struct PluginConnection {
    pub surface: PluginSurface<MidiOutputHandler>,
    pub events: Receiver<MidiInputEvent>,
    /// Keeps the input callback alive
    _input: MidiInputHandler,
}

impl PluginConnection {
    /// Open the ports matching `config.port_match` and set the surface up
    pub fn connect(config: SurfaceConfig) -> Result<Self, SurfaceError> {
        let (event_tx, events) = flume::bounded(EVENT_CHANNEL_CAPACITY);
        let input = MidiInputHandler::connect(&config.port_match, event_tx)?;
        let output = MidiConnection::connect_output(&config.port_match)?;

        let mut surface = PluginSurface::new(config, MidiOutputHandler::new(output));
        surface.setup()?;

        Ok(Self {
            surface,
            events,
            _input: input,
        })
    }

    /// Open the ports using the settings file at `settings_path`
    ///
    /// Falls back to `default_config_path()` when no path is given.
    pub fn open(settings_path: Option<&Path>) -> Result<Self, SurfaceError> {
        let settings_path = settings_path
            .map(Path::to_path_buf)
            .unwrap_or_else(default_config_path);
        Self::connect(load_surface_config(&settings_path))
    }

    /// Handle everything received since the last call
    pub fn poll<H: Host>(&mut self, host: &mut H) -> usize {
        self.surface.drain(host, &self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::LightState;
    use crate::mapping::ConfigError;
    use apc_core::local::{LocalBrowser, LocalHost, LocalSong};
    use apc_core::{BrowserCategory, BrowserItem, Song, TrackKind};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn mapping_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn config_for(file: &NamedTempFile) -> SurfaceConfig {
        SurfaceConfig {
            mapping_file: Some(file.path().to_path_buf()),
            ..SurfaceConfig::default()
        }
    }

    fn host() -> LocalHost {
        let mut song = LocalSong::new();
        song.add_track("Drums", TrackKind::Audio);
        let browser = LocalBrowser::new()
            .with_category(
                BrowserCategory::Instruments,
                vec![BrowserItem::new("Analog", "query:Synths#Analog")],
            )
            .with_category(
                BrowserCategory::AudioEffects,
                vec![BrowserItem::new("Echo", "query:AudioFx#Echo")],
            );
        LocalHost::new(song, browser)
    }

    fn surface(contents: &str) -> (PluginSurface<Vec<Vec<u8>>>, NamedTempFile) {
        let file = mapping_file(contents);
        let mut surface = PluginSurface::new(config_for(&file), Vec::new());
        surface.setup().unwrap();
        (surface, file)
    }

    #[test]
    fn test_setup_lights_mapped_pads() {
        let (surface, _file) = surface("1:1, Analog, \n8:8, Echo,\n");

        assert!(surface.is_set_up());
        // (1,1) is the top-left pad, (8,8) the bottom-right one
        assert_eq!(surface.lights().light(80), LightState::PENDING);
        assert_eq!(surface.lights().light(31), LightState::PENDING);
        assert_eq!(surface.lights().light(24), LightState::Off);
        assert_eq!(surface.lights().sink().len(), 64);
    }

    #[test]
    fn test_settings_file_sets_acknowledge_color() {
        let dir = tempfile::tempdir().unwrap();
        let mappings = dir.path().join("mappings.txt");
        std::fs::write(&mappings, "1:8, Analog,\n").unwrap();
        let settings = dir.path().join("apc64.yaml");
        std::fs::write(
            &settings,
            format!(
                "mapping_file: '{}'\nacknowledge_color: 5\n",
                mappings.display()
            ),
        )
        .unwrap();

        let mut surface = PluginSurface::from_settings_file(&settings, Vec::<Vec<u8>>::new());
        surface.setup().unwrap();
        let mut host = host();
        surface.handle_midi(&mut host, &[0x90, 24, 100]);

        assert_eq!(surface.lights().light(24), LightState::On(Rgb::RED));
    }

    #[test]
    fn test_missing_settings_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = dir.path().join("apc64.yaml");
        let surface = PluginSurface::from_settings_file(&settings, Vec::<Vec<u8>>::new());
        assert!(!surface.is_set_up());
        assert_eq!(surface.config.acknowledge_color, Rgb::GREY.midi_value());
    }

    #[test]
    fn test_setup_fails_without_mapping_file() {
        let config = SurfaceConfig {
            mapping_file: Some("/nonexistent/apc64/mappings.txt".into()),
            ..SurfaceConfig::default()
        };
        let mut surface = PluginSurface::new(config, Vec::<Vec<u8>>::new());

        assert!(matches!(
            surface.setup(),
            Err(SurfaceError::Config(ConfigError::Io { .. }))
        ));
        assert!(!surface.is_set_up());
    }

    #[test]
    fn test_raw_pad_press_loads_devices() {
        let (mut surface, _file) = surface("1:8, Analog,\n2:8, Echo,\n");
        let mut host = host();

        let instrument = surface.handle_midi(&mut host, &[0x90, 24, 100]);
        assert!(matches!(instrument, PadOutcome::Placed(_)));
        assert_eq!(host.song.len(), 2);

        // Release does nothing
        assert!(matches!(
            surface.handle_midi(&mut host, &[0x80, 24, 0]),
            PadOutcome::Ignored
        ));

        let selected = host.song.selected_track().unwrap();
        let effect = surface.handle_midi(&mut host, &[0x90, 25, 100]);
        let PadOutcome::Placed(placement) = effect else {
            panic!("expected placement");
        };
        assert_eq!(placement.track, selected);
        assert_eq!(host.song.len(), 2);
        assert_eq!(surface.lights().light(25), LightState::On(Rgb::GREY));
    }

    #[test]
    fn test_non_pad_messages_are_ignored() {
        let (mut surface, _file) = surface("1:8, Analog,\n");
        let mut host = host();

        // Wrong channel, out-of-grid note, control change, clock
        let messages: [&[u8]; 4] = [&[0x91, 24, 100], &[0x90, 10, 100], &[0xB0, 24, 100], &[0xF8]];
        for data in messages {
            assert!(matches!(
                surface.handle_midi(&mut host, data),
                PadOutcome::Ignored
            ));
        }
        assert!(host.loaded.is_empty());
    }

    #[test]
    fn test_drain_handles_queued_events() {
        let (mut surface, _file) = surface("1:8, Analog,\n");
        let mut host = host();
        let (tx, rx) = flume::bounded(8);
        tx.send(MidiInputEvent::parse(&[0x90, 24, 100]).unwrap()).unwrap();
        tx.send(MidiInputEvent::parse(&[0x80, 24, 0]).unwrap()).unwrap();

        assert_eq!(surface.drain(&mut host, &rx), 2);
        assert_eq!(host.loaded.len(), 1);
        assert_eq!(surface.drain(&mut host, &rx), 0);
    }

    #[test]
    fn test_disconnect_turns_pads_off() {
        let (mut surface, _file) = surface("1:8, Analog,\n");
        surface.disconnect();
        assert_eq!(surface.lights().sink().last(), Some(&vec![0x96, 24, 0]));
        assert!(!surface.is_set_up());
    }
}
