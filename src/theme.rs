//! Color theme.
use crate::color::{self, Color};
use crate::syntax::Category;
use std::collections::HashMap;

/// Colors used when drawing text, keyed by token category.
///
/// Categories without an assigned color are drawn in the text color. A few languages
/// assign a different color to a category than the rest, and those take precedence
/// over the palette unless the palette entry was set explicitly by configuration.
pub struct Theme {
    pub text_color: Color,
    palette: HashMap<Category, u8>,
    overrides: HashMap<(String, Category), u8>,
}

impl Theme {
    const TEXT_FG: u8 = 15;
    const TEXT_BG: u8 = 233;

    const PALETTE: &[(Category, u8)] = &[
        (Category::Keyword, color::BLUE),
        (Category::String, color::GREEN),
        (Category::Comment, color::CYAN),
        (Category::Function, color::YELLOW),
        (Category::Number, color::MAGENTA),
        (Category::Operator, color::RED),
        (Category::Tag, color::RED),
        (Category::Attribute, color::BLUE),
        (Category::Property, color::BLUE),
        (Category::Value, color::GREEN),
        (Category::Preprocessor, color::YELLOW),
        (Category::Variable, color::MAGENTA),
        (Category::Symbol, color::CYAN),
        (Category::Entity, color::GREEN),
        (Category::Cdata, color::CYAN),
        (Category::Doctype, color::YELLOW),
        (Category::Processing, color::MAGENTA),
        (Category::Table, color::GREEN),
        (Category::Key, color::BLUE),
        (Category::Boolean, color::YELLOW),
        (Category::Date, color::MAGENTA),
        (Category::Array, color::CYAN),
        (Category::Anchor, color::BLUE),
        (Category::Alias, color::YELLOW),
        (Category::Directive, color::CYAN),
        (Category::List, color::GREEN),
        (Category::Document, color::BLUE),
        (Category::Header, color::BLUE),
        (Category::Bold, color::YELLOW),
        (Category::Italic, color::CYAN),
        (Category::Code, color::GREEN),
        (Category::Link, color::MAGENTA),
        (Category::Image, color::MAGENTA),
        (Category::Quote, color::CYAN),
        (Category::Rule, color::WHITE),
        (Category::Strikethrough, color::RED),
        (Category::Highlight, color::YELLOW),
        (Category::Footnote, color::CYAN),
        (Category::Task, color::GREEN),
    ];

    const OVERRIDES: &[(&'static str, Category, u8)] = &[
        ("json", Category::Operator, color::CYAN),
        ("json", Category::Key, color::GREEN),
        ("toml", Category::Key, color::BLUE),
        ("yaml", Category::Key, color::GREEN),
        ("yaml", Category::Tag, color::RED),
        ("yaml", Category::List, color::GREEN),
        ("markdown", Category::List, color::WHITE),
        ("markdown", Category::Table, color::WHITE),
        ("markdown", Category::Code, color::GREEN),
    ];

    pub fn new() -> Theme {
        Theme {
            text_color: Color::new(Self::TEXT_FG, Self::TEXT_BG),
            palette: Self::PALETTE.iter().copied().collect(),
            overrides: Self::OVERRIDES
                .iter()
                .map(|&(lang, cat, fg)| ((lang.to_string(), cat), fg))
                .collect(),
        }
    }

    /// Assigns `fg` to `category` for every language.
    pub fn set(&mut self, category: Category, fg: u8) {
        self.palette.insert(category, fg);
        self.overrides.retain(|(_, cat), _| *cat != category);
    }

    /// Returns the color for tokens of `category` in `language`.
    pub fn color_of(&self, language: Option<&str>, category: Category) -> Color {
        language
            .and_then(|lang| self.overrides.get(&(lang.to_string(), category)))
            .or_else(|| self.palette.get(&category))
            .map(|fg| self.text_color.with_fg(*fg))
            .unwrap_or(self.text_color)
    }
}

impl Default for Theme {
    fn default() -> Theme {
        Theme::new()
    }
}
