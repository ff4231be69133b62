//! Callback Types
//!
//! Event types delivered by the sound engine and the flag set callers use to
//! request them.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use breach_core::{EventId, GameObjectId, PlayingId};

// ═══════════════════════════════════════════════════════════════════════════════
// CALLBACK TYPE
// ═══════════════════════════════════════════════════════════════════════════════

/// A single callback event delivered by the sound engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum CallbackType {
    /// Event finished, no further callbacks will follow
    EndOfEvent = 0x0001,
    /// Dynamic sequence item ended
    EndOfDynamicSequenceItem = 0x0002,
    /// Marker reached in a playing sound
    Marker = 0x0004,
    /// Duration of the sound, sent once per voice
    Duration = 0x0008,
    SpeakerVolumeMatrix = 0x0010,
    /// Source starved for data
    Starvation = 0x0020,
    MusicPlaylistSelect = 0x0040,
    MusicPlayStarted = 0x0080,
    MusicSyncBeat = 0x0100,
    MusicSyncBar = 0x0200,
    MusicSyncEntry = 0x0400,
    MusicSyncExit = 0x0800,
    MusicSyncGrid = 0x1000,
    MusicSyncUserCue = 0x2000,
    MusicSyncPoint = 0x4000,
    MidiEvent = 0x10000,
}

impl CallbackType {
    const ALL: [CallbackType; 16] = [
        CallbackType::EndOfEvent,
        CallbackType::EndOfDynamicSequenceItem,
        CallbackType::Marker,
        CallbackType::Duration,
        CallbackType::SpeakerVolumeMatrix,
        CallbackType::Starvation,
        CallbackType::MusicPlaylistSelect,
        CallbackType::MusicPlayStarted,
        CallbackType::MusicSyncBeat,
        CallbackType::MusicSyncBar,
        CallbackType::MusicSyncEntry,
        CallbackType::MusicSyncExit,
        CallbackType::MusicSyncGrid,
        CallbackType::MusicSyncUserCue,
        CallbackType::MusicSyncPoint,
        CallbackType::MidiEvent,
    ];

    /// Flag bit for this type
    #[inline]
    pub fn flag(self) -> CallbackFlags {
        CallbackFlags::from_bits_retain(self as u32)
    }

    /// Terminal types end the registration they are delivered to
    #[inline]
    pub fn is_terminal(self) -> bool {
        self == CallbackType::EndOfEvent
    }

    /// Decode a raw engine value, `None` unless exactly one known bit
    pub fn from_bits(bits: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| *t as u32 == bits)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CALLBACK FLAGS
// ═══════════════════════════════════════════════════════════════════════════════

bitflags! {
    /// Callback types requested when posting an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct CallbackFlags: u32 {
        const END_OF_EVENT = 0x0001;
        const END_OF_DYNAMIC_SEQUENCE_ITEM = 0x0002;
        const MARKER = 0x0004;
        const DURATION = 0x0008;
        const SPEAKER_VOLUME_MATRIX = 0x0010;
        const STARVATION = 0x0020;
        const MUSIC_PLAYLIST_SELECT = 0x0040;
        const MUSIC_PLAY_STARTED = 0x0080;
        const MUSIC_SYNC_BEAT = 0x0100;
        const MUSIC_SYNC_BAR = 0x0200;
        const MUSIC_SYNC_ENTRY = 0x0400;
        const MUSIC_SYNC_EXIT = 0x0800;
        const MUSIC_SYNC_GRID = 0x1000;
        const MUSIC_SYNC_USER_CUE = 0x2000;
        const MUSIC_SYNC_POINT = 0x4000;
        const MUSIC_SYNC_ALL = 0x7f00;
        const MIDI_EVENT = 0x10000;
        /// Request-only: enable play position queries for the playing id
        const ENABLE_GET_SOURCE_PLAY_POSITION = 0x100000;
        /// Request-only: enable music play position queries
        const ENABLE_GET_MUSIC_PLAY_POSITION = 0x200000;
        /// Request-only: enable stream buffering queries
        const ENABLE_GET_SOURCE_STREAM_BUFFERING = 0x400000;
    }
}

impl CallbackFlags {
    /// Whether a callback of the given type should reach the user handler
    #[inline]
    pub fn wants(self, callback_type: CallbackType) -> bool {
        self.contains(callback_type.flag())
    }
}

impl From<CallbackType> for CallbackFlags {
    fn from(t: CallbackType) -> Self {
        t.flag()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CALLBACK INFO
// ═══════════════════════════════════════════════════════════════════════════════

/// Type-specific callback data
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum CallbackPayload {
    #[default]
    None,
    /// Marker reached
    Marker {
        identifier: u32,
        position: u32,
        label: String,
    },
    /// Voice duration
    Duration {
        duration_ms: f32,
        estimated_duration_ms: f32,
        audio_node_id: u32,
        media_id: u32,
        streaming: bool,
    },
    /// Music sync point (beat, bar, entry, exit, grid, user cue)
    MusicSync {
        segment_position_ms: i32,
        beat_duration: f32,
        bar_duration: f32,
        user_cue_name: Option<String>,
    },
    /// Raw MIDI message
    Midi { status: u8, data1: u8, data2: u8 },
}

/// Callback information passed to handlers
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CallbackInfo {
    /// Game object the event was posted on
    pub game_object: GameObjectId,
    /// Playing ID of the event instance
    pub playing_id: PlayingId,
    /// Event ID
    pub event_id: EventId,
    /// Type-specific data
    pub payload: CallbackPayload,
}

impl CallbackInfo {
    pub fn new(game_object: GameObjectId, playing_id: PlayingId, event_id: EventId) -> Self {
        Self {
            game_object,
            playing_id,
            event_id,
            payload: CallbackPayload::None,
        }
    }

    pub fn with_payload(mut self, payload: CallbackPayload) -> Self {
        self.payload = payload;
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
