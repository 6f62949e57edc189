use ratatui::style::Color;

use crate::config::ThemeColors;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TuiTheme {
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub border_fg: Color,
    pub help_fg: Color,
    /// Favourite stars, active selector and tag chips.
    pub accent_fg: Color,
}

impl Default for TuiTheme {
    fn default() -> Self {
        TuiTheme {
            highlight_fg: Color::Black,
            highlight_bg: Color::Cyan,
            border_fg: Color::Gray,
            help_fg: Color::Yellow,
            accent_fg: Color::Magenta,
        }
    }
}

impl TuiTheme {
    /// Defaults with any parseable overrides applied; unparseable values are ignored.
    pub fn from_colors(colors: Option<&ThemeColors>) -> Self {
        let base = TuiTheme::default();
        let Some(c) = colors else {
            return base;
        };
        let pick = |v: &Option<String>, fallback: Color| {
            v.as_deref().and_then(parse_color).unwrap_or(fallback)
        };
        TuiTheme {
            highlight_fg: pick(&c.highlight_fg, base.highlight_fg),
            highlight_bg: pick(&c.highlight_bg, base.highlight_bg),
            border_fg: pick(&c.border_fg, base.border_fg),
            help_fg: pick(&c.help_fg, base.help_fg),
            accent_fg: pick(&c.accent_fg, base.accent_fg),
        }
    }
}

pub fn parse_color(s: &str) -> Option<Color> {
    let k = s.trim().to_ascii_lowercase();
    match k.as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        "gray" | "grey" => Some(Color::Gray),
        "darkgray" | "darkgrey" => Some(Color::DarkGray),
        _ => {
            if let Some(hex) = k.strip_prefix('#') {
                return parse_hex(hex);
            }
            if let Some(rest) = k.strip_prefix("rgb(") {
                return parse_rgb_tuple(rest);
            }
            None
        }
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

fn parse_rgb_tuple(rest: &str) -> Option<Color> {
    let t = rest.strip_suffix(')')?;
    let parts: Vec<_> = t.split(',').map(|p| p.trim()).collect();
    if parts.len() != 3 {
        return None;
    }
    let r = parts[0].parse::<u8>().ok()?;
    let g = parts[1].parse::<u8>().ok()?;
    let b = parts[2].parse::<u8>().ok()?;
    Some(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_hex_and_rgb() {
        assert_eq!(parse_color("Cyan"), Some(Color::Cyan));
        assert_eq!(parse_color("#0a0B0c"), Some(Color::Rgb(10, 11, 12)));
        assert_eq!(parse_color("rgb(1, 2, 3)"), Some(Color::Rgb(1, 2, 3)));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("chartreuse"), None);
    }

    #[test]
    fn overrides_apply_per_field() {
        let colors = ThemeColors {
            accent_fg: Some("green".into()),
            border_fg: Some("not-a-colour".into()),
            ..Default::default()
        };
        let t = TuiTheme::from_colors(Some(&colors));
        assert_eq!(t.accent_fg, Color::Green);
        assert_eq!(t.border_fg, TuiTheme::default().border_fg);
    }
}
