pub mod commands;
pub mod config;
pub mod editor;
pub mod events;
pub mod input;
pub mod plugins;
pub mod shortcuts;
pub mod store;

pub use commands::{Command, History, HistoryStep};
pub use config::EditorConfig;
pub use editor::{Editor, Gesture};
pub use events::{EditorEvent, Emitter, Event, EventKind, ListenerId};
pub use input::{InputEvent, Modifiers};
pub use plugins::{CommitReason, GridSnap, Hook, Plugin, PluginContext};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use store::{EditorState, Selection, Store, SubscriptionId};
