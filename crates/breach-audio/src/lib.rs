//! Breach Audio Integration
//!
//! Game-side glue between gameplay objects and the external sound engine:
//! - Callback packages for posted events (function, delegate, latent action)
//! - `CallbackManager` registry routing engine callbacks to those packages
//! - Cancellation by cookie or delegate identity
//! - Game thread marshalling for delegate callbacks
//! - `AudioDevice` facade posting events through a `SoundEngine`
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  CALLBACK REGISTRY ARCHITECTURE                  │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                  │
//! │   Game Thread                         Sound Engine Thread        │
//! │   ┌──────────────────────┐           ┌──────────────────────┐   │
//! │   │ post_event_*()       │           │ dispatch(ctx, type)  │   │
//! │   │ cancel_event_cb()    │──Mutex───▶│  └─ handle_action()  │   │
//! │   │ (un)register_object()│           │                      │   │
//! │   │ pump_game_thread()   │◀──queue───│  delegate callbacks  │   │
//! │   └──────────────────────┘           └──────────────────────┘   │
//! │                                                                  │
//! │   RegistryState                                                  │
//! │   ├── game object → { package id → package }                    │
//! │   └── lookup key  → [ package ]                                  │
//! │                                                                  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use breach_audio::{CallbackManager, CallbackTarget, CallbackFlags, Cookie};
//!
//! let manager = CallbackManager::default();
//! manager.register_game_object(42);
//!
//! let package = manager.create_callback_package(
//!     CallbackTarget::function(on_end, Cookie(0xABCD)),
//!     CallbackFlags::END_OF_EVENT,
//!     42,
//!     false,
//! );
//! // hand `package` to the engine; it comes back through manager.dispatch()
//!
//! manager.cancel_event_callback(Cookie(0xABCD));
//! ```

pub mod callback;
pub mod config;
pub mod device;
pub mod dispatch;
pub mod item_type;
pub mod latent;
pub mod manager;
pub mod package;
pub mod platform;

// Re-exports
pub use callback::{CallbackFlags, CallbackInfo, CallbackPayload, CallbackType};
pub use config::{CallbackManagerConfig, DelegateDelivery};
pub use device::{AudioDevice, SoundEngine};
pub use dispatch::{GameThreadQueue, GameThreadSender, GameThreadTask};
pub use item_type::ItemType;
pub use latent::{ValidityToken, WaitEndOfEventAction};
pub use manager::CallbackManager;
pub use package::{
    CallbackPackage, CallbackTarget, Cookie, DelegateId, EventCallbackFn, EventDelegate,
    LookupKey, PackageId, PackageKind,
};
pub use platform::{
    AudioApi, AudioPath, DeviceCaps, InitSettings, PlatformInitSettings, ThreadProperties,
    fast_path_settings,
};
