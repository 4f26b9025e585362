pub mod banner;
pub mod progress;
pub mod tui;

pub use tui::Console;

/// Prints the welcome banner and applies the theme for all subsequent inquire prompts.
/// Call once at startup, after tracing init.
pub fn init_ui(admin_addr: &str) {
    banner::print_welcome(admin_addr);
    tui::apply_theme();
}
