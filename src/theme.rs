use clap::ValueEnum;
use ratatui::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Theme {
    Light,
    Dark,
}

pub struct Palette {
    pub fg: Color,
    pub bg: Color,
    pub dim: Color,
    pub accent: Color,
    pub header: Color,
    pub stripe: Color,
    pub cursor_fg: Color,
    pub cursor_bg: Color,
    pub success: Color,
    pub failure: Color,
}

impl Theme {
    pub fn toggle(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "☀ light",
            Theme::Dark => "☾ dark",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Dark => Palette {
                fg: Color::Rgb(230, 237, 247),
                bg: Color::Rgb(5, 9, 15),
                dim: Color::Rgb(127, 139, 160),
                accent: Color::Rgb(92, 176, 255),
                header: Color::Rgb(122, 198, 255),
                stripe: Color::Rgb(17, 26, 38),
                cursor_fg: Color::Rgb(5, 9, 15),
                cursor_bg: Color::Rgb(92, 176, 255),
                success: Color::Rgb(63, 182, 139),
                failure: Color::Rgb(240, 99, 92),
            },
            Theme::Light => Palette {
                fg: Color::Rgb(12, 22, 37),
                bg: Color::Rgb(248, 251, 255),
                dim: Color::Rgb(91, 102, 120),
                accent: Color::Rgb(37, 99, 235),
                header: Color::Rgb(29, 78, 216),
                stripe: Color::Rgb(237, 241, 247),
                cursor_fg: Color::Rgb(255, 255, 255),
                cursor_bg: Color::Rgb(37, 99, 235),
                success: Color::Rgb(14, 166, 108),
                failure: Color::Rgb(225, 29, 72),
            },
        }
    }
}
