use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Styles for each kind of line the CLI prints
#[derive(Debug, Clone)]
pub struct Theme {
    /// Banner and section titles
    pub title: Style,
    pub ok: Style,
    pub failure: Style,
    /// Left-hand side of `label: value` lines
    pub label: Style,
    /// Icon in front of `label: value` lines
    pub accent: Style,
    /// Empty-list notice and totals
    pub faint: Style,
}

impl Theme {
    /// Pick a theme for stdout, honoring `NO_COLOR`
    pub fn detect() -> Self {
        let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self::for_output(console::Term::stdout().is_term(), no_color)
    }

    pub fn for_output(is_term: bool, no_color: bool) -> Self {
        if is_term && !no_color {
            Self::colored()
        } else {
            Self::plain()
        }
    }

    pub fn colored() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            ok: Style::new().green().bold(),
            failure: Style::new().red().bold(),
            label: Style::new().white().dimmed(),
            accent: Style::new().magenta(),
            faint: Style::new().bright_black(),
        }
    }

    pub fn plain() -> Self {
        let none = Style::new();
        Self {
            title: none.clone(),
            ok: none.clone(),
            failure: none.clone(),
            label: none.clone(),
            accent: none.clone(),
            faint: none,
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use owo_colors::OwoColorize;

    #[test]
    fn test_plain_output_has_no_escapes() {
        for theme in [Theme::for_output(false, false), Theme::for_output(true, true)] {
            let text = "Students".style(theme.title.clone()).to_string();
            assert_eq!(text, "Students");
        }
    }

    #[test]
    fn test_terminal_output_is_colored() {
        let theme = Theme::for_output(true, false);
        let text = "Students".style(theme.title.clone()).to_string();
        assert!(text.contains('\u{1b}'));
    }
}
