//! Identifiers shared between gameplay code and the sound engine

/// Game object identifier (sound emitter), assigned by the host engine
pub type GameObjectId = u64;

/// Unique identifier for a playing event instance
pub type PlayingId = u32;

/// Short id of an authored event
pub type EventId = u32;

/// Invalid game object
pub const INVALID_GAME_OBJECT: GameObjectId = GameObjectId::MAX;

/// Invalid playing ID, returned by the engine when a post fails
pub const INVALID_PLAYING_ID: PlayingId = 0;

/// Check that a game object id can be handed to the sound engine
#[inline]
pub fn is_valid_game_object(id: GameObjectId) -> bool {
    id != INVALID_GAME_OBJECT
}
