//! Startup banner: "WP-DIGEST" in figlet with a vertical gradient.

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

/// WordPress blue (#21759b).
const PRESS_BLUE: (u8, u8, u8) = (0x21, 0x75, 0x9b);
/// Digest amber (#f7b32b), the default accent colour of the mail.
const DIGEST_AMBER: (u8, u8, u8) = (0xf7, 0xb3, 0x2b);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let r = (f64::from(a.0) * (1.0 - t) + f64::from(b.0) * t).round() as u8;
    let g = (f64::from(a.1) * (1.0 - t) + f64::from(b.1) * t).round() as u8;
    let bl = (f64::from(a.2) * (1.0 - t) + f64::from(b.2) * t).round() as u8;
    (r, g, bl)
}

fn art() -> String {
    FIGfont::standard()
        .ok()
        .and_then(|font| font.convert("WP-DIGEST").map(|f| f.to_string()))
        .unwrap_or_else(|| "WP-DIGEST\n".to_string())
}

/// Prints the banner, then version and the admin address.
pub fn print_welcome(admin_addr: &str) {
    let mut out = stdout();
    let art = art();
    let lines: Vec<&str> = art.lines().collect();
    let total = lines.len().max(1);

    for (i, line) in lines.iter().enumerate() {
        let t = if total <= 1 {
            1.0
        } else {
            i as f64 / (total - 1) as f64
        };
        let (r, g, b) = lerp_rgb(PRESS_BLUE, DIGEST_AMBER, t);
        let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
        let _ = out.execute(Print(line));
        let _ = out.execute(Print("\r\n"));
        let _ = out.execute(ResetColor);
    }

    let version = env!("CARGO_PKG_VERSION");
    let _ = out.execute(SetForegroundColor(Color::Rgb {
        r: DIGEST_AMBER.0,
        g: DIGEST_AMBER.1,
        b: DIGEST_AMBER.2,
    }));
    let _ = out.execute(Print(format!("v{}\r\n", version)));
    let _ = out.execute(Print(format!("Admin: http://{}/admin\r\n", admin_addr)));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}
