//! Syntax configuration.
//!
//! Each language is described by an ordered table of token classes, where every class
//! pairs a [`Category`] with a regular expression. Order matters: when two classes
//! match overlapping text, the class listed first wins.
//!
//! A [`Registry`] compiles all tables once, after which it is only ever read.
//! Additional languages can be supplied as TOML files of the following form:
//!
//! ```toml
//! [id]
//! name = "ini"
//! extensions = ["ini", "cfg"]
//!
//! [tokens]
//! comments = '^;.*$'
//! keys = '^(?<tok>[a-z]+)\s*='
//! ```
//!
//! A pattern may define a capture group named `tok`, in which case only the text of
//! that group is treated as the token. This stands in for lookaround, which the regex
//! engine does not support.

use crate::error::{Error, Result};
use crate::lang;
use crate::sys::{self, AsString};
use indexmap::IndexMap;
use regex_lite::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// The category of a token, which determines how it is colored.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Category {
    Plain,
    Keyword,
    String,
    Comment,
    Function,
    Number,
    Operator,
    Tag,
    Attribute,
    Property,
    Value,
    Selector,
    Preprocessor,
    Variable,
    Symbol,
    Entity,
    Cdata,
    Doctype,
    Processing,
    Table,
    Key,
    Boolean,
    Date,
    Array,
    Anchor,
    Alias,
    Directive,
    List,
    Document,
    Whitespace,
    Header,
    Bold,
    Italic,
    Code,
    Link,
    Image,
    Quote,
    Rule,
    Strikethrough,
    Highlight,
    Footnote,
    Task,
}

impl Category {
    /// Names accepted for each category in syntax tables and configuration files.
    /// The first name listed for a category is its canonical name.
    const NAMES: &[(&'static str, Category)] = &[
        ("plain", Category::Plain),
        ("keywords", Category::Keyword),
        ("strings", Category::String),
        ("comments", Category::Comment),
        ("functions", Category::Function),
        ("numbers", Category::Number),
        ("operators", Category::Operator),
        ("tags", Category::Tag),
        ("attributes", Category::Attribute),
        ("properties", Category::Property),
        ("values", Category::Value),
        ("selectors", Category::Selector),
        ("preprocessor", Category::Preprocessor),
        ("variables", Category::Variable),
        ("symbols", Category::Symbol),
        ("entities", Category::Entity),
        ("cdata", Category::Cdata),
        ("doctype", Category::Doctype),
        ("processing", Category::Processing),
        ("tables", Category::Table),
        ("keys", Category::Key),
        ("booleans", Category::Boolean),
        ("dates", Category::Date),
        ("arrays", Category::Array),
        ("anchors", Category::Anchor),
        ("aliases", Category::Alias),
        ("directives", Category::Directive),
        ("lists", Category::List),
        ("documents", Category::Document),
        ("whitespace", Category::Whitespace),
        ("headers", Category::Header),
        ("bold", Category::Bold),
        ("italic", Category::Italic),
        ("code", Category::Code),
        ("links", Category::Link),
        ("images", Category::Image),
        ("blockquotes", Category::Quote),
        ("horizontal_rules", Category::Rule),
        ("strikethrough", Category::Strikethrough),
        ("highlight", Category::Highlight),
        ("footnotes", Category::Footnote),
        ("task_lists", Category::Task),
        ("code_blocks", Category::Code),
        ("inline_code", Category::Code),
        ("numbered_lists", Category::List),
    ];

    /// Returns the category named `name`.
    pub fn parse(name: &str) -> Result<Category> {
        Self::NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, cat)| *cat)
            .ok_or_else(|| Error::invalid_category(name))
    }

    /// Returns the canonical name of this category.
    pub fn name(&self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(_, cat)| cat == self)
            .map(|(n, _)| *n)
            .unwrap_or("plain")
    }
}

/// A syntax configuration for one language.
pub struct Syntax {
    /// The canonical name of the language.
    pub name: String,

    /// Token classes in order of priority.
    classes: Vec<TokenClass>,
}

/// A regular expression whose matches are tokens of `category`.
pub struct TokenClass {
    pub category: Category,
    pub re: Regex,

    /// `true` if the expression defines a `tok` group that narrows the token.
    pub focused: bool,
}

impl Syntax {
    /// Creates a new syntax identified by `name` using `tokens`, which are tuples of
    /// category name and regular expression in order of priority.
    ///
    /// If any of the category names is unknown or any of the regular expressions is
    /// malformed, then an error is returned.
    pub fn new<S: AsRef<str>>(name: &str, tokens: &[(S, S)]) -> Result<Syntax> {
        let classes = tokens
            .iter()
            .map(|(category, pattern)| {
                let category = Category::parse(category.as_ref())?;
                let pattern = pattern.as_ref();
                let re = Regex::new(pattern).map_err(|e| Error::invalid_regex(pattern, &e))?;
                let focused = re.capture_names().any(|n| n == Some("tok"));
                Ok(TokenClass {
                    category,
                    re,
                    focused,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Syntax {
            name: name.to_string(),
            classes,
        })
    }

    pub fn classes(&self) -> &[TokenClass] {
        &self.classes
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ExternalSyntax {
    id: ExternalId,
    tokens: Option<IndexMap<String, String>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ExternalId {
    name: String,
    extensions: Option<Vec<String>>,
}

/// A read-only collection of syntax configurations keyed by language name.
pub struct Registry {
    syntax_map: HashMap<String, Syntax>,
    ext_map: HashMap<String, String>,
}

impl Registry {
    /// Returns a registry containing the built-in languages.
    pub fn new() -> Result<Registry> {
        let mut syntax_map = HashMap::new();
        for (name, tokens) in BUILTIN {
            syntax_map.insert(name.to_string(), Syntax::new(name, tokens)?);
        }
        Ok(Registry {
            syntax_map,
            ext_map: HashMap::new(),
        })
    }

    /// Returns a registry with the built-in languages plus every syntax file ending in
    /// `.toml` in `dir`. A syntax file replaces a built-in language of the same name.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Registry> {
        let mut registry = Registry::new()?;
        for path in sys::list_dir(dir) {
            if path.extension().is_some_and(|ext| ext == "toml") {
                registry.add_file(&path)?;
            }
        }
        Ok(registry)
    }

    pub fn find(&self, language: &str) -> Option<&Syntax> {
        self.syntax_map.get(language)
    }

    /// Returns the language for `path`, preferring extensions declared in syntax
    /// files over the built-in extension table.
    pub fn language_for<P: AsRef<Path>>(&self, path: P) -> Option<String> {
        let path = path.as_ref();
        path.extension()
            .and_then(|ext| self.ext_map.get(&ext.to_string_lossy().to_lowercase()))
            .cloned()
            .or_else(|| lang::from_path(path).map(|lang| lang.to_string()))
    }

    fn add_file(&mut self, path: &Path) -> Result<()> {
        let ext = Self::read_file(path)?;
        let tokens = ext
            .tokens
            .map(|tokens| tokens.into_iter().collect::<Vec<_>>())
            .unwrap_or_default();
        let syntax = Syntax::new(&ext.id.name, &tokens)?;
        for e in ext.id.extensions.unwrap_or_default() {
            self.ext_map.insert(e.to_lowercase(), ext.id.name.clone());
        }
        debug!(language = %ext.id.name, path = %path.as_string(), "loaded syntax");
        self.syntax_map.insert(ext.id.name, syntax);
        Ok(())
    }

    fn read_file(path: &Path) -> Result<ExternalSyntax> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(&path.as_string(), e))?;
        toml::from_str::<ExternalSyntax>(&content)
            .map_err(|e| Error::syntax(&path.as_string(), &e))
    }
}

type Table = (&'static str, &'static [(&'static str, &'static str)]);

const C_KEYWORDS: &str = r##"\b(int|char|float|double|void|struct|union|enum|typedef|static|extern|const|volatile|register|auto|signed|unsigned|short|long|if|else|switch|case|default|for|while|do|break|continue|return|goto|sizeof)\b"##;
const CPP_KEYWORDS: &str = r##"\b(class|namespace|template|typename|public|private|protected|virtual|override|final|explicit|friend|inline|mutable|operator|using|typedef|constexpr|decltype|auto|nullptr|true|false|and|or|not|bitand|bitor|compl|and_eq|or_eq|xor_eq|not_eq)\b"##;
const PREPROCESSOR: &str =
    r##"#\s*(include|define|undef|ifdef|ifndef|endif|if|else|elif|line|error|pragma)"##;
const FUNCTIONS: &str = r##"\b([a-zA-Z_]\w*)\s*\("##;
const OPERATORS: &str = r##"[+\-*/=<>!&|^~]+"##;
const NUMBERS: &str = r##"\b\d+(\.\d+)?\b"##;
const QUOTED: &str = r##"('.*?'|".*?")"##;
const SLASH_COMMENTS: &str = r##"(//.*?$|/\*.*?\*/)"##;
const HASH_COMMENTS: &str = r##"(#.*?)$"##;
const DATES: &str = r##"\d{4}-\d{2}-\d{2}(T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})?)?"##;

/// Built-in languages and their token classes in order of priority.
const BUILTIN: [Table; 19] = [
    (
        "python",
        &[
            ("keywords", r##"\b(def|class|if|else|elif|while|for|in|try|except|finally|with|as|import|from|return|break|continue|pass|raise|yield|async|await|True|False|None)\b"##),
            ("strings", QUOTED),
            ("comments", HASH_COMMENTS),
            ("functions", FUNCTIONS),
            ("numbers", NUMBERS),
            ("operators", OPERATORS),
        ],
    ),
    (
        "json",
        &[
            ("strings", r##"(".*?")"##),
            ("numbers", r##"\b\d+(\.\d+)?(e[+-]?\d+)?\b"##),
            ("booleans", r##"\b(true|false|null)\b"##),
            ("keys", r##"(?<tok>"[a-zA-Z0-9_-]+")\s*:"##),
            ("operators", r##"[{}\[\]:,]"##),
            ("whitespace", r##"\s+"##),
        ],
    ),
    (
        "toml",
        &[
            ("comments", HASH_COMMENTS),
            ("strings", r##"('.*?'|".*?"|""".*?""")"##),
            ("numbers", r##"\b\d+(\.\d+)?(e[+-]?\d+)?\b"##),
            ("booleans", r##"\b(true|false)\b"##),
            ("dates", DATES),
            ("tables", r##"^\[.*?\]"##),
            ("arrays", r##"\[.*?\]"##),
            ("keys", r##"^(?<tok>[a-zA-Z0-9_-]+)\s*="##),
            ("operators", r##"[=]"##),
        ],
    ),
    (
        "javascript",
        &[
            ("keywords", r##"\b(function|var|let|const|if|else|while|for|in|of|try|catch|finally|return|break|continue|switch|case|default|class|extends|new|this|super|import|export|async|await|true|false|null|undefined)\b"##),
            ("strings", r##"('.*?'|".*?"|`.*?`)"##),
            ("comments", SLASH_COMMENTS),
            ("functions", FUNCTIONS),
            ("numbers", NUMBERS),
            ("operators", OPERATORS),
        ],
    ),
    (
        "html",
        &[
            ("tags", r##"(<[^>]+>)"##),
            ("strings", QUOTED),
            ("comments", r##"(<!--.*?-->)"##),
            ("attributes", r##"(\w+)="##),
            ("operators", OPERATORS),
        ],
    ),
    (
        "css",
        &[
            ("properties", r##"([a-zA-Z-]+):"##),
            ("values", r##":\s*([^;]+)"##),
            ("comments", r##"(/\*.*?\*/)"##),
            ("selectors", r##"([.#]?[a-zA-Z][\w-]*)"##),
            ("numbers", r##"\b\d+(\.\d+)?(px|em|rem|%|vh|vw)?\b"##),
        ],
    ),
    (
        "java",
        &[
            ("keywords", r##"\b(public|private|protected|class|interface|extends|implements|static|final|void|int|long|float|double|boolean|char|String|if|else|while|for|do|switch|case|break|continue|return|try|catch|finally|throw|throws|new|this|super|import|package)\b"##),
            ("strings", QUOTED),
            ("comments", SLASH_COMMENTS),
            ("functions", FUNCTIONS),
            ("numbers", NUMBERS),
            ("operators", OPERATORS),
        ],
    ),
    (
        "bash",
        &[
            ("keywords", r##"\b(if|then|else|elif|fi|for|while|until|do|done|case|esac|function|return|exit|break|continue|local|readonly|declare|export|source|\.|echo|printf|test|[|]|&&|\|\|)\b"##),
            ("strings", QUOTED),
            ("comments", HASH_COMMENTS),
            ("functions", r##"\b([a-zA-Z_]\w*)\s*\(\)"##),
            ("numbers", r##"\b\d+\b"##),
            ("operators", OPERATORS),
        ],
    ),
    (
        "rust",
        &[
            ("keywords", r##"\b(fn|let|mut|const|if|else|while|for|in|loop|match|return|break|continue|struct|enum|impl|trait|use|mod|pub|unsafe|async|await|true|false|None|Some|Ok|Err)\b"##),
            ("strings", r##"('.*?'|".*?"|r#".*?"#)"##),
            ("comments", SLASH_COMMENTS),
            ("functions", FUNCTIONS),
            ("numbers", NUMBERS),
            ("operators", OPERATORS),
        ],
    ),
    (
        "go",
        &[
            ("keywords", r##"\b(func|var|const|if|else|for|range|switch|case|default|return|break|continue|defer|go|chan|select|struct|interface|type|import|package)\b"##),
            ("strings", QUOTED),
            ("comments", SLASH_COMMENTS),
            ("functions", FUNCTIONS),
            ("numbers", NUMBERS),
            ("operators", OPERATORS),
        ],
    ),
    (
        "c",
        &[
            ("keywords", C_KEYWORDS),
            ("strings", QUOTED),
            ("comments", SLASH_COMMENTS),
            ("functions", FUNCTIONS),
            ("numbers", r##"\b\d+(\.\d+)?(u|U|l|L|f|F)?\b"##),
            ("operators", OPERATORS),
            ("preprocessor", PREPROCESSOR),
        ],
    ),
    (
        "cpp",
        &[
            ("keywords", CPP_KEYWORDS),
            ("strings", r##"('.*?'|".*?"|R"\(.*?\)")"##),
            ("comments", SLASH_COMMENTS),
            ("functions", FUNCTIONS),
            ("numbers", r##"\b\d+(\.\d+)?(u|U|l|L|f|F)?\b"##),
            ("operators", OPERATORS),
            ("preprocessor", PREPROCESSOR),
        ],
    ),
    (
        "php",
        &[
            ("keywords", r##"\b(abstract|and|array|as|break|callable|case|catch|class|clone|const|continue|declare|default|die|do|echo|else|elseif|empty|enddeclare|endfor|endforeach|endif|endswitch|endwhile|eval|exit|extends|final|finally|for|foreach|function|global|goto|if|implements|include|include_once|instanceof|insteadof|interface|isset|list|namespace|new|or|print|private|protected|public|require|require_once|return|static|switch|throw|trait|try|unset|use|var|while|xor|yield)\b"##),
            ("strings", r##"('.*?'|".*?"|`.*?`)"##),
            ("comments", r##"(//.*?$|/\*.*?\*/|#.*?$)"##),
            ("functions", FUNCTIONS),
            ("numbers", NUMBERS),
            ("operators", OPERATORS),
            ("variables", r##"\$[a-zA-Z_\x7f-\xff][a-zA-Z0-9_\x7f-\xff]*"##),
        ],
    ),
    (
        "ruby",
        &[
            ("keywords", r##"\b(alias|and|begin|break|case|class|def|defined\?|do|else|elsif|end|ensure|false|for|if|in|module|next|nil|not|or|redo|rescue|retry|return|self|super|then|true|undef|unless|until|when|while|yield)\b"##),
            ("strings", r##"('.*?'|".*?"|%[qQ]?[\[\(].*?[\]\)])"##),
            ("comments", r##"(#.*?$|=begin.*?=end)"##),
            ("functions", r##"\b(?<tok>[a-zA-Z_]\w*\s*)\("##),
            ("numbers", NUMBERS),
            ("operators", OPERATORS),
            ("symbols", r##":[a-zA-Z_]\w*"##),
        ],
    ),
    (
        "swift",
        &[
            ("keywords", r##"\b(associatedtype|class|deinit|enum|extension|fileprivate|func|import|init|inout|internal|let|open|operator|private|protocol|public|rethrows|static|struct|subscript|typealias|var|break|case|continue|default|defer|do|else|fallthrough|for|guard|if|in|repeat|return|switch|where|while|as|Any|catch|false|is|nil|super|self|Self|throw|throws|true|try|#available|#colorLiteral|#column|#else|#elseif|#endif|#file|#fileLiteral|#function|#if|#imageLiteral|#line|#selector|#sourceLocation)\b"##),
            ("strings", r##"('.*?'|".*?"|"""[\s\S]*?""")"##),
            ("comments", SLASH_COMMENTS),
            ("functions", FUNCTIONS),
            ("numbers", NUMBERS),
            ("operators", OPERATORS),
        ],
    ),
    (
        "kotlin",
        &[
            ("keywords", r##"\b(as|break|class|continue|do|else|false|for|fun|if|in|interface|is|null|object|package|return|super|this|throw|true|try|typealias|typeof|val|var|when|while|by|catch|constructor|delegate|dynamic|field|file|finally|get|import|init|param|property|receiver|set|setparam|where|actual|abstract|annotation|companion|const|crossinline|data|enum|expect|external|final|infix|inline|inner|internal|lateinit|noinline|open|operator|out|override|private|protected|public|reified|sealed|suspend|tailrec|vararg)\b"##),
            ("strings", r##"('.*?'|".*?"|""".*?""")"##),
            ("comments", SLASH_COMMENTS),
            ("functions", FUNCTIONS),
            ("numbers", r##"\b\d+(\.\d+)?(L|F|D)?\b"##),
            ("operators", OPERATORS),
        ],
    ),
    (
        "xml",
        &[
            ("tags", r##"(<[^>]+>)"##),
            ("strings", QUOTED),
            ("comments", r##"(<!--.*?-->)"##),
            ("attributes", r##"(\w+)="##),
            ("operators", OPERATORS),
            ("entities", r##"&[a-zA-Z]+;"##),
            ("cdata", r##"<!\[CDATA\[.*?\]\]>"##),
            ("doctype", r##"<!DOCTYPE.*?>"##),
            ("processing", r##"<\?.*?\?>"##),
        ],
    ),
    (
        "yaml",
        &[
            ("comments", HASH_COMMENTS),
            ("strings", r##"('.*?'|".*?"|>.*?$|\|.*?$)"##),
            ("numbers", r##"\b\d+(\.\d+)?(e[+-]?\d+)?\b"##),
            ("booleans", r##"\b(true|false|yes|no|on|off)\b"##),
            ("dates", DATES),
            ("keys", r##"^(?<tok>[a-zA-Z0-9_-]+)\s*:"##),
            ("anchors", r##"&[a-zA-Z0-9_-]+"##),
            ("aliases", r##"\*[a-zA-Z0-9_-]+"##),
            ("tags", r##"![a-zA-Z0-9_-]+"##),
            ("directives", r##"^%[A-Z]+"##),
            ("operators", r##"[=:]"##),
            ("lists", r##"^\s*-\s"##),
            ("documents", r##"^---$|^\.\.\.$"##),
        ],
    ),
    (
        "markdown",
        &[
            ("headers", r##"^(#{1,6})\s+(.+)$"##),
            ("bold", r##"\*\*(.+?)\*\*"##),
            ("italic", r##"\*(.+?)\*"##),
            ("code_blocks", r##"```[\s\S]*?```"##),
            ("inline_code", r##"`[^`]+`"##),
            ("links", r##"\[([^\]]+)\]\(([^)]+)\)"##),
            ("images", r##"!\[([^\]]*)\]\(([^)]+)\)"##),
            ("lists", r##"^(\s*)[*+-]\s+(.+)$"##),
            ("numbered_lists", r##"^(\s*)\d+\.\s+(.+)$"##),
            ("blockquotes", r##"^>\s+(.+)$"##),
            ("horizontal_rules", r##"^[-*_]{3,}$"##),
            ("tables", r##"^\|.+\|$"##),
            ("strikethrough", r##"~~(.+?)~~"##),
            ("highlight", r##"==(.+?)=="##),
            ("footnotes", r##"\[\^([^\]]+)\]"##),
            ("task_lists", r##"^(\s*)[*+-]\s+\[([ xX])\]\s+(.+)$"##),
        ],
    ),
];

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::io::Write;

    const NAME: &str = "foo";

    const TOKENS: [(&str, &str); 3] = [
        ("numbers", r#"-?\d+(?:\.\d+)?"#),
        ("strings", r#""(?:[^"\\]|(?:\\.))*""#),
        ("keywords", r#"\b(?:foo|bar)\b"#),
    ];

    #[test]
    fn new_syntax() {
        let syntax = build_syntax();
        assert_eq!(syntax.name, NAME);
        let cats = syntax
            .classes()
            .iter()
            .map(|c| c.category)
            .collect::<Vec<_>>();
        assert_eq!(
            cats,
            vec![Category::Number, Category::String, Category::Keyword]
        );
    }

    #[test]
    fn invalid_token() {
        assert!(Syntax::new(NAME, &[("strings", "(bad")]).is_err());
        assert!(Syntax::new(NAME, &[("bogus", "ok")]).is_err());
    }

    #[test]
    fn focus_group_detected() {
        let syntax = Syntax::new(NAME, &[("keys", r"^(?<tok>\w+)\s*="), ("keywords", r"\bx\b")])
            .unwrap();
        assert!(syntax.classes()[0].focused);
        assert!(!syntax.classes()[1].focused);
    }

    #[test]
    fn category_names() {
        assert_eq!(Category::parse("keywords").unwrap(), Category::Keyword);
        assert_eq!(Category::parse("inline_code").unwrap(), Category::Code);
        assert_eq!(Category::Code.name(), "code");
        assert_eq!(Category::List.name(), "lists");
        assert!(Category::parse("nope").is_err());
    }

    #[test]
    fn builtin_languages_compile() {
        let registry = Registry::new().unwrap();
        for (name, tokens) in BUILTIN {
            let syntax = registry.find(name).unwrap();
            assert_eq!(syntax.classes().len(), tokens.len());
        }
        assert!(registry.find("text").is_none());
    }

    #[test]
    fn language_lookup() {
        let registry = Registry::new().unwrap();
        assert_eq!(registry.language_for("src/main.rs").as_deref(), Some("rust"));
        assert_eq!(registry.language_for("notes.unknown"), None);
    }

    #[test]
    fn load_syntax_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = fs::File::create(dir.path().join("ini.toml")).unwrap();
        writeln!(
            file,
            "[id]\nname = \"ini\"\nextensions = [\"ini\", \"CFG\"]\n\n[tokens]\ncomments = '^;.*$'\nkeys = '^(?<tok>[a-z]+)\\s*='"
        )
        .unwrap();
        fs::write(dir.path().join("README.md"), "ignored").unwrap();

        let registry = Registry::load_dir(dir.path()).unwrap();
        let syntax = registry.find("ini").unwrap();
        assert_eq!(syntax.classes().len(), 2);
        assert_eq!(syntax.classes()[1].category, Category::Key);
        assert_eq!(registry.language_for("app.cfg").as_deref(), Some("ini"));
        assert!(registry.find("python").is_some());
    }

    #[test]
    fn load_bad_syntax_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.toml"), "[id]\nname = 1\n").unwrap();
        assert!(matches!(
            Registry::load_dir(dir.path()),
            Err(Error::Syntax { .. })
        ));
    }

    pub fn build_syntax() -> Syntax {
        Syntax::new(NAME, &TOKENS).unwrap()
    }
}
