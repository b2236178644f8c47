// Scrollkeeper services
// Stateless or host-facing building blocks: storage backends, scheduling, animation, settings.

pub mod scheduler;
pub mod scroll_animator;
pub mod session_storage;
pub mod settings_engine;
