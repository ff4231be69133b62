//! Authoring item types
//!
//! Object categories of the sound authoring project, as named in exported
//! project data, plus the browser/folder names used by tooling.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use breach_core::BreachError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    Event,
    AuxBus,
    Switch,
    State,
    GameParameter,
    DialogueEvent,
    EffectShareSet,
    Trigger,
    AcousticTexture,
    AudioDeviceShareSet,
    ActorMixer,
    Bus,
    Project,
    StandaloneWorkUnit,
    NestedWorkUnit,
    PhysicalFolder,
    Folder,
    Sound,
    SwitchContainer,
    RandomSequenceContainer,
    BlendContainer,
    MotionBus,
    StateGroup,
    SwitchGroup,
    InitBank,
    AudioNode,
    None,
}

pub const EVENTS_BROWSER_NAME: &str = "Events";
pub const DIALOGUE_EVENTS_BROWSER_NAME: &str = "Dynamic Dialogue";
pub const BUSSES_BROWSER_NAME: &str = "Busses";
pub const ACOUSTIC_TEXTURES_BROWSER_NAME: &str = "Virtual Acoustics";
pub const AUDIO_DEVICE_SHARE_SET_BROWSER_NAME: &str = "Device ShareSets";
pub const STATES_BROWSER_NAME: &str = "States";
pub const SWITCHES_BROWSER_NAME: &str = "Switches";
pub const GAME_PARAMETERS_BROWSER_NAME: &str = "Game Parameters";
pub const TRIGGERS_BROWSER_NAME: &str = "Triggers";
pub const SHARE_SETS_BROWSER_NAME: &str = "Effect ShareSets";
pub const ORPHAN_ASSETS_BROWSER_NAME: &str = "Orphan Assets";

/// Browser sections, in display order
pub const BROWSER_DISPLAY_NAMES: [&str; 11] = [
    EVENTS_BROWSER_NAME,
    DIALOGUE_EVENTS_BROWSER_NAME,
    BUSSES_BROWSER_NAME,
    ACOUSTIC_TEXTURES_BROWSER_NAME,
    AUDIO_DEVICE_SHARE_SET_BROWSER_NAME,
    STATES_BROWSER_NAME,
    SWITCHES_BROWSER_NAME,
    GAME_PARAMETERS_BROWSER_NAME,
    TRIGGERS_BROWSER_NAME,
    SHARE_SETS_BROWSER_NAME,
    ORPHAN_ASSETS_BROWSER_NAME,
];

/// Names as they appear in exported project data
const NAMED_TYPES: [(&str, ItemType); 23] = [
    ("AcousticTexture", ItemType::AcousticTexture),
    ("AudioDevice", ItemType::AudioDeviceShareSet),
    ("ActorMixer", ItemType::ActorMixer),
    ("AuxBus", ItemType::AuxBus),
    ("BlendContainer", ItemType::BlendContainer),
    ("Bus", ItemType::Bus),
    ("DialogueEvent", ItemType::DialogueEvent),
    ("Event", ItemType::Event),
    ("Folder", ItemType::Folder),
    ("GameParameter", ItemType::GameParameter),
    ("MotionBus", ItemType::MotionBus),
    ("PhysicalFolder", ItemType::PhysicalFolder),
    ("Project", ItemType::Project),
    ("RandomSequenceContainer", ItemType::RandomSequenceContainer),
    ("Sound", ItemType::Sound),
    ("State", ItemType::State),
    ("StateGroup", ItemType::StateGroup),
    ("Switch", ItemType::Switch),
    ("SwitchContainer", ItemType::SwitchContainer),
    ("SwitchGroup", ItemType::SwitchGroup),
    ("Trigger", ItemType::Trigger),
    ("WorkUnit", ItemType::StandaloneWorkUnit),
    ("Effect", ItemType::EffectShareSet),
];

impl ItemType {
    /// Last type that has its own browser section
    pub const LAST_BROWSER_TYPE: ItemType = ItemType::AudioDeviceShareSet;

    /// Lookup by exported name, `ItemType::None` if unknown
    pub fn from_name(name: &str) -> Self {
        NAMED_TYPES
            .iter()
            .find(|(n, _)| *n == name)
            .map_or(ItemType::None, |(_, t)| *t)
    }

    pub fn is_browser_type(self) -> bool {
        self != ItemType::None && (self as u32) <= (Self::LAST_BROWSER_TYPE as u32)
    }

    /// Project folder holding work units of this type
    pub fn folder_name(self) -> Option<&'static str> {
        let name = match self {
            ItemType::Event => "Events",
            ItemType::AuxBus => "Busses",
            ItemType::Switch => "Switches",
            ItemType::State => "States",
            ItemType::GameParameter => "Game Parameters",
            ItemType::DialogueEvent => "Dynamic Dialogue",
            ItemType::EffectShareSet => "Effects",
            ItemType::Trigger => "Triggers",
            ItemType::AcousticTexture => "Virtual Acoustics",
            ItemType::AudioDeviceShareSet => "Devices",
            _ => return None,
        };
        Some(name)
    }
}

impl FromStr for ItemType {
    type Err = BreachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match ItemType::from_name(s) {
            ItemType::None => Err(BreachError::UnknownItemType(s.to_string())),
            t => Ok(t),
        }
    }
}
