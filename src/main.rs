//! The *hydro* batch driver.
//!
//! Copyright 2026 The hydroedit Authors
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! you may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//! <https://www.apache.org/licenses/LICENSE-2.0>
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.
use hydroedit::config::Configuration;
use hydroedit::editor::Editor;
use hydroedit::error::{Error, Result};
use hydroedit::etc;
use hydroedit::log;
use hydroedit::opt::{Mode, Options};
use hydroedit::syntax::Registry;
use std::process::ExitCode;
use tracing::info;

/// Usage documentation for display to terminal.
const USAGE: &str = include_str!("include/usage.in");

// Version and build information.
const PACKAGE_NAME: &str = env!("CARGO_PKG_NAME");
const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");
const BUILD_HASH: &str = env!("BUILD_HASH");
const BUILD_DATE: &str = env!("BUILD_DATE");

fn main() -> ExitCode {
    match run() {
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(1)
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn run() -> Result<()> {
    let opts = Options::parse(std::env::args().skip(1))?;
    if opts.help {
        println!("{USAGE}");
        Ok(())
    } else if opts.version {
        println!("{PACKAGE_NAME} {PACKAGE_VERSION} ({BUILD_HASH} {BUILD_DATE})");
        Ok(())
    } else {
        run_opts(&opts)
    }
}

fn run_opts(opts: &Options) -> Result<()> {
    if let Some(ref log_path) = opts.log_path {
        log::init(log_path)?;
    }

    // Load optional configuration from either standard location or path specified on
    // command line, and apply command line options afterwards since these override
    // all other settings.
    let mut config = if let Some(ref config_path) = opts.config_path {
        Configuration::load_file(config_path)?
    } else {
        Configuration::load()?
    };
    config.apply_opts(opts);

    let registry = if let Some(ref syntax_dir) = opts.syntax_dir {
        Registry::load_dir(syntax_dir)?
    } else {
        Registry::new()?
    };

    let file = match &opts.files[..] {
        [file] => file,
        [] => return Err(Error::expected_value("FILE")),
        [_, extra, ..] => return Err(Error::unexpected_arg(extra)),
    };
    info!(file = %file, "opening");
    let mut editor = Editor::open(file, &config, &registry);
    run_mode(&mut editor, opts.mode.as_ref().unwrap_or(&Mode::Stat), &config)
}

fn run_mode(editor: &mut Editor<'_>, mode: &Mode, config: &Configuration) -> Result<()> {
    match mode {
        Mode::Wrap => {
            for line in editor.display_map().lines() {
                let mark = if line.continuation { '+' } else { ' ' };
                println!("{:>6}{mark} {}", line.row + 1, line.text);
            }
        }
        Mode::Highlight => {
            let doc = editor.document();
            for (row, line) in doc.lines().iter().enumerate() {
                let spans = editor
                    .colorize(line)
                    .iter()
                    .map(|(color, span)| {
                        format!("{}@{}:{:?}", span.category.name(), color.fg, span.text)
                    })
                    .collect::<Vec<_>>();
                println!("{:>6}  {}", row + 1, spans.join(" "));
            }
        }
        Mode::Find(term) => {
            editor.search_begin();
            editor.search_set_term(term);
            let doc = editor.document();
            for m in editor.search().matches() {
                let text = etc::slice(doc.line(m.pos.row), m.pos.col, m.pos.col + m.len);
                println!("{} {text:?}", m.pos);
            }
            println!("{}", editor.search_summary());
        }
        Mode::Replace(term, replacement) => {
            let count = editor.replace_all(term, replacement, config.settings.case_sensitive);
            if count > 0 {
                editor.save()?;
            }
            println!("{count}");
        }
        Mode::Format => {
            if editor.format() {
                editor.save()?;
            }
            if let Some(msg) = editor.document().message() {
                println!("{msg}");
            }
        }
        Mode::Stat => {
            let lines = editor.display_map().len();
            let doc = editor.document();
            println!("{}", doc.status());
            println!("language: {}", doc.language().unwrap_or("none"));
            println!("lines: {}", doc.line_count());
            println!("line ending: {}", doc.line_ending().name());
            println!("display lines: {lines}");
        }
    }
    Ok(())
}
