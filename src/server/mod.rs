// Server module entry
// Listener creation, the accept loop and per-connection serving

pub mod access;
pub mod connection;
pub mod listener;
pub mod signal;

// loop is a keyword, so the file is mapped to server_loop
#[path = "loop.rs"]
pub mod server_loop;

pub use listener::create_reusable_listener;
pub use server_loop::start_server_loop;
pub use signal::spawn_shutdown_listener;
