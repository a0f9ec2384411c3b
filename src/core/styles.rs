//! Style roles mapping logical output elements to `colored::Color`
//!
//! Colouring is applied only when the `enabled` flag passed to `paint()` is
//! true, so no global colour state is needed.
//!
//! ```
//! use plugcalc::core::styles::StyleRole;
//! assert_eq!(StyleRole::Header.paint("Plugins", false), "Plugins");
//! assert!(StyleRole::Header.paint("Plugins", true).starts_with("\x1b["));
//! ```

use colored::Color;

macro_rules! style {
    ( $( $variant:ident => $color:expr ),+ $(,)? ) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        pub enum StyleRole { $( $variant ),+ }

        impl StyleRole {
            pub fn color(self) -> Option<Color> {
                match self { $( StyleRole::$variant => $color ),+ }
            }
        }
    }
}

style! {
    Header    => Some(Color::Yellow),
    Plugin    => Some(Color::Cyan),
    Operation => Some(Color::Green),
    Result    => None,
    Notice    => Some(Color::Blue),
    Error     => Some(Color::BrightRed),
    Disabled  => Some(Color::BrightBlack),
}

impl StyleRole {
    pub fn paint(self, text: &str, enabled: bool) -> String {
        match self.color().and_then(ansi_code).filter(|_| enabled) {
            Some(code) => format!("\x1b[{}m{}\x1b[0m", code, text),
            None => text.to_string(),
        }
    }

    /// prettytable `style_spec` foreground for this role
    pub fn to_prettytable_spec(self) -> Option<&'static str> {
        Some(match self.color()? {
            Color::Black => "Fk",
            Color::Red => "Fr",
            Color::Green => "Fg",
            Color::Yellow => "Fy",
            Color::Blue => "Fb",
            Color::Magenta => "Fm",
            Color::Cyan => "Fc",
            Color::White => "Fw",
            Color::BrightBlack => "FK",
            Color::BrightRed => "FR",
            Color::BrightGreen => "FG",
            Color::BrightYellow => "FY",
            Color::BrightBlue => "FB",
            Color::BrightMagenta => "FM",
            Color::BrightCyan => "FC",
            Color::BrightWhite => "FW",
            _ => return None,
        })
    }
}

fn ansi_code(color: Color) -> Option<String> {
    use Color::*;
    let code = match color {
        Black => "30",
        Red => "31",
        Green => "32",
        Yellow => "33",
        Blue => "34",
        Magenta => "35",
        Cyan => "36",
        White => "37",
        BrightBlack => "90",
        BrightRed => "91",
        BrightGreen => "92",
        BrightYellow => "93",
        BrightBlue => "94",
        BrightMagenta => "95",
        BrightCyan => "96",
        BrightWhite => "97",
        TrueColor { r, g, b } => return Some(format!("38;2;{};{};{}", r, g, b)),
        _ => return None,
    };
    Some(code.to_string())
}

fn color_to_ansi(color: Color) -> Option<clap::builder::styling::AnsiColor> {
    Some(match color {
        Color::Black => clap::builder::styling::AnsiColor::Black,
        Color::Red => clap::builder::styling::AnsiColor::Red,
        Color::Green => clap::builder::styling::AnsiColor::Green,
        Color::Yellow => clap::builder::styling::AnsiColor::Yellow,
        Color::Blue => clap::builder::styling::AnsiColor::Blue,
        Color::Magenta => clap::builder::styling::AnsiColor::Magenta,
        Color::Cyan => clap::builder::styling::AnsiColor::Cyan,
        Color::White => clap::builder::styling::AnsiColor::White,
        Color::BrightBlack => clap::builder::styling::AnsiColor::BrightBlack,
        Color::BrightRed => clap::builder::styling::AnsiColor::BrightRed,
        Color::BrightGreen => clap::builder::styling::AnsiColor::BrightGreen,
        Color::BrightYellow => clap::builder::styling::AnsiColor::BrightYellow,
        Color::BrightBlue => clap::builder::styling::AnsiColor::BrightBlue,
        Color::BrightMagenta => clap::builder::styling::AnsiColor::BrightMagenta,
        Color::BrightCyan => clap::builder::styling::AnsiColor::BrightCyan,
        Color::BrightWhite => clap::builder::styling::AnsiColor::BrightWhite,
        _ => return None,
    })
}

/// clap help styles built from the same roles
pub fn palette_to_clap(enabled: bool) -> clap::builder::Styles {
    use clap::builder::styling::{Color as ClapColor, Style};
    if !enabled {
        return clap::builder::Styles::plain();
    }

    let style = |role: StyleRole, bold: bool| {
        let mut s = Style::new();
        if let Some(col) = role.color().and_then(color_to_ansi) {
            s = s.fg_color(Some(ClapColor::Ansi(col)));
        }
        if bold {
            s = s.bold();
        }
        s
    };

    clap::builder::Styles::styled()
        .header(style(StyleRole::Header, true))
        .usage(style(StyleRole::Header, true))
        .literal(style(StyleRole::Operation, false))
        .placeholder(style(StyleRole::Plugin, false))
        .error(style(StyleRole::Error, true))
}
